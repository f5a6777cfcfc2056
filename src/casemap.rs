//! RFC 1459 case mapping.
//!
//! Channel and nick lookups in the store compare names the way servers do:
//! ASCII letters fold to lowercase, and `[]\~` are the uppercase forms of
//! `{}|^`.

#[inline]
fn fold(c: char) -> char {
    match c {
        '[' => '{',
        ']' => '}',
        '\\' => '|',
        '~' => '^',
        'A'..='Z' => c.to_ascii_lowercase(),
        _ => c,
    }
}

/// Convert a string to IRC lowercase using RFC 1459 case mapping.
pub fn irc_to_lower(s: &str) -> String {
    s.chars().map(fold).collect()
}

/// Compare two names case-insensitively under RFC 1459 case mapping.
pub fn irc_eq(a: &str, b: &str) -> bool {
    a.len() == b.len() && a.chars().map(fold).eq(b.chars().map(fold))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_irc_to_lower() {
        assert_eq!(irc_to_lower("#Chan[1]"), "#chan{1}");
        assert_eq!(irc_to_lower("Nick\\Away~"), "nick|away^");
    }

    #[test]
    fn test_irc_eq() {
        assert!(irc_eq("#Rust", "#rust"));
        assert!(irc_eq("bob[m]", "BOB{M}"));
        assert!(!irc_eq("bob", "bobby"));
        assert!(!irc_eq("#a", "#b"));
    }
}
