//! Path lookups against a store snapshot, e.g. `channels[0].topic.text`.

use serde_json::Value;

use crate::error::StoreError;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment<'a> {
    Key(&'a str),
    Index(usize),
}

fn parse(path: &str) -> Result<Vec<Segment<'_>>, StoreError> {
    let invalid = || StoreError::InvalidPath(path.to_owned());
    let mut segments = Vec::new();

    for part in path.split('.') {
        let (key, mut rest) = match part.find('[') {
            Some(open) => part.split_at(open),
            None => (part, ""),
        };
        if key.is_empty() && (segments.is_empty() || rest.is_empty()) {
            return Err(invalid());
        }
        if !key.is_empty() {
            segments.push(Segment::Key(key));
        }
        while !rest.is_empty() {
            let close = rest.find(']').ok_or_else(invalid)?;
            let index = rest[1..close].parse().map_err(|_| invalid())?;
            segments.push(Segment::Index(index));
            rest = &rest[close + 1..];
            if !rest.is_empty() && !rest.starts_with('[') {
                return Err(invalid());
            }
        }
    }
    Ok(segments)
}

/// Resolve `path` inside `root`.
///
/// A missing key or out-of-range index yields `Ok(None)`. Indexing into a
/// non-array or keying into a non-object is an error.
pub(crate) fn lookup<'v>(root: &'v Value, path: &str) -> Result<Option<&'v Value>, StoreError> {
    let mut current = root;
    for segment in parse(path)? {
        let next = match segment {
            Segment::Key(key) => current
                .as_object()
                .ok_or_else(|| StoreError::NotAnObject(path.to_owned()))?
                .get(key),
            Segment::Index(index) => current
                .as_array()
                .ok_or_else(|| StoreError::NotAnArray(path.to_owned()))?
                .get(index),
        };
        match next {
            Some(value) => current = value,
            None => return Ok(None),
        }
    }
    Ok(Some(current))
}
