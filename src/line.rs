//! Line codec for tokio.
//!
//! Splits the inbound byte stream into lines without their `\r\n`
//! terminator and appends `\r\n` to outbound lines. Inbound bytes are
//! decoded lossily, so a stray non-UTF-8 byte degrades one line instead of
//! failing the stream; with the `encoding` feature any `encoding_rs` label
//! can be used instead.
//!
//! A line longer than the codec limit is discarded up to its terminator and
//! decoding resumes with the next line.

#[cfg(feature = "encoding")]
use std::io;

use bytes::BytesMut;
#[cfg(feature = "encoding")]
use encoding::Encoding;
use tokio_util::codec::{Decoder, Encoder};
use tracing::warn;

use crate::error::{ProtocolError, Result};

/// Maximum length of an untagged line in bytes, terminator included.
pub const MAX_LINE_LEN: usize = 512;

/// Space reserved for IRCv3 message tags, including the `@` and trailing space.
pub const MAX_TAGS_LEN: usize = 8191;

/// Default codec limit: tag space plus the untagged line.
pub const DEFAULT_MAX_LEN: usize = MAX_TAGS_LEN + MAX_LINE_LEN;

/// Line-based codec for IRC traffic.
#[derive(Debug)]
pub struct LineCodec {
    #[cfg(feature = "encoding")]
    encoding: &'static Encoding,
    /// Index of next byte to check for newline
    next_index: usize,
    max_len: usize,
    /// Bytes dropped so far from an oversized line still missing its `\n`.
    discarding: Option<usize>,
}

impl LineCodec {
    /// Create a codec for the given encoding label, e.g. `"utf-8"`.
    ///
    /// Without the `encoding` feature the label is ignored and lines are
    /// decoded as UTF-8.
    pub fn new(_label: &str) -> Result<Self> {
        Ok(Self {
            #[cfg(feature = "encoding")]
            encoding: Encoding::for_label(_label.as_bytes()).ok_or_else(|| {
                ProtocolError::Io(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("unknown encoding: {}", _label),
                ))
            })?,
            next_index: 0,
            max_len: DEFAULT_MAX_LEN,
            discarding: None,
        })
    }

    /// Create a codec with a custom maximum line length.
    pub fn with_max_len(label: &str, max_len: usize) -> Result<Self> {
        let mut codec = Self::new(label)?;
        codec.max_len = max_len;
        Ok(codec)
    }

    fn decode_bytes(&self, line: &[u8]) -> String {
        #[cfg(feature = "encoding")]
        let (data, _enc, _had_errors) = self.encoding.decode(line);

        #[cfg(not(feature = "encoding"))]
        let data = String::from_utf8_lossy(line);

        data.into_owned()
    }
}

fn is_illegal_control_char(ch: char) -> bool {
    matches!(ch, '\0' | '\r' | '\n')
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>> {
        loop {
            let newline = src[self.next_index..].iter().position(|b| *b == b'\n');

            if let Some(dropped) = self.discarding {
                match newline {
                    Some(offset) => {
                        let _ = src.split_to(offset + 1);
                        self.discarding = None;
                        warn!(
                            length = dropped + offset + 1,
                            limit = self.max_len,
                            "oversized line dropped"
                        );
                        continue;
                    }
                    None => {
                        self.discarding = Some(dropped + src.len());
                        src.clear();
                        return Ok(None);
                    }
                }
            }

            match newline {
                Some(offset) => {
                    let line = src.split_to(self.next_index + offset + 1);
                    self.next_index = 0;

                    if line.len() > self.max_len {
                        warn!(length = line.len(), limit = self.max_len, "oversized line dropped");
                        continue;
                    }

                    let data = self.decode_bytes(&line);
                    return Ok(Some(data.trim_end_matches(['\r', '\n']).to_owned()));
                }
                None if src.len() > self.max_len => {
                    self.discarding = Some(src.len());
                    self.next_index = 0;
                    src.clear();
                    return Ok(None);
                }
                None => {
                    self.next_index = src.len();
                    return Ok(None);
                }
            }
        }
    }
}

impl Encoder<String> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> Result<()> {
        if let Some(ch) = line.chars().find(|c| is_illegal_control_char(*c)) {
            return Err(ProtocolError::IllegalControlChar(ch));
        }

        #[cfg(feature = "encoding")]
        {
            let (bytes, _enc, _had_errors) = self.encoding.encode(&line);
            dst.extend_from_slice(&bytes);
        }

        #[cfg(not(feature = "encoding"))]
        {
            dst.extend_from_slice(line.as_bytes());
        }

        dst.extend_from_slice(b"\r\n");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_strips_terminator() {
        let mut codec = LineCodec::new("utf-8").unwrap();
        let mut buf = BytesMut::from("PING :test\r\nPING :two\n");

        assert_eq!(codec.decode(&mut buf).unwrap(), Some("PING :test".to_string()));
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("PING :two".to_string()));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_partial_line() {
        let mut codec = LineCodec::new("utf-8").unwrap();
        let mut buf = BytesMut::from("PING :");

        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        buf.extend_from_slice(b"later\r\n");
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("PING :later".to_string()));
    }

    #[test]
    fn test_default_limit_leaves_room_for_tags() {
        let mut codec = LineCodec::new("utf-8").unwrap();
        let tags = format!("@+example={}", "x".repeat(4000));
        let mut buf = BytesMut::from(format!("{} PRIVMSG #a :hi\r\n", tags).as_str());

        let line = codec.decode(&mut buf).unwrap().unwrap();
        assert!(line.ends_with("PRIVMSG #a :hi"));
    }

    #[test]
    fn test_decode_skips_oversized_line() {
        let mut codec = LineCodec::with_max_len("utf-8", 10).unwrap();
        let mut buf = BytesMut::from("this is way too long\r\nPING :a\r\n");

        assert_eq!(codec.decode(&mut buf).unwrap(), Some("PING :a".to_string()));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_skips_oversized_line_across_reads() {
        let mut codec = LineCodec::with_max_len("utf-8", 10).unwrap();
        let mut buf = BytesMut::from("PRIVMSG #a :this");

        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        assert!(buf.is_empty());

        buf.extend_from_slice(b" keeps going");
        assert_eq!(codec.decode(&mut buf).unwrap(), None);

        buf.extend_from_slice(b" and ends\r\nPING :b\r\n");
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("PING :b".to_string()));
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
    }

    #[cfg(not(feature = "encoding"))]
    #[test]
    fn test_decode_invalid_utf8_is_lossy() {
        let mut codec = LineCodec::new("utf-8").unwrap();
        let mut buf = BytesMut::from(&b"PRIVMSG #a :caf\xe9\r\n"[..]);

        let line = codec.decode(&mut buf).unwrap().unwrap();
        assert!(line.starts_with("PRIVMSG #a :caf"));
    }

    #[test]
    fn test_encode_appends_crlf() {
        let mut codec = LineCodec::new("utf-8").unwrap();
        let mut buf = BytesMut::new();

        codec.encode("PONG :test".to_string(), &mut buf).unwrap();
        assert_eq!(&buf[..], b"PONG :test\r\n");
    }

    #[test]
    fn test_encode_rejects_embedded_newline() {
        let mut codec = LineCodec::new("utf-8").unwrap();
        let mut buf = BytesMut::new();

        assert!(matches!(
            codec.encode("PRIVMSG #a :x\r\nQUIT".to_string(), &mut buf),
            Err(ProtocolError::IllegalControlChar('\r'))
        ));
        assert!(buf.is_empty());
    }
}
