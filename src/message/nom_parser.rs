//! Nom-based IRC line parser.
//!
//! This module provides zero-copy parsing of IRC lines using the nom
//! parser combinator library.

use nom::{
    bytes::complete::{take_until, take_while1},
    character::complete::{char, space0},
    combinator::opt,
    error::{context, ErrorKind, VerboseError},
    sequence::preceded,
    IResult,
};

type ParseResult<I, O> = IResult<I, O, VerboseError<I>>;

/// Parse IRCv3 message tags (the part after `@` and before the first space).
///
/// Tags are not interpreted by this crate, but a server may still send them.
fn parse_tags(input: &str) -> ParseResult<&str, &str> {
    context(
        "parsing IRCv3 message tags",
        preceded(char('@'), take_until(" ")),
    )(input)
}

/// Parse message prefix (the part after `:` and before the first space).
fn parse_prefix(input: &str) -> ParseResult<&str, &str> {
    context(
        "parsing message prefix",
        preceded(char(':'), take_while1(|c| c != ' ')),
    )(input)
}

/// Parse the command name (alphanumeric characters).
fn parse_command(input: &str) -> ParseResult<&str, &str> {
    context(
        "parsing IRC command",
        take_while1(|c: char| c.is_ascii_alphanumeric()),
    )(input)
}

/// Parse a complete IRC line into its components.
///
/// IRC line format:
/// ```text
/// [@tags] [:prefix] <command> [params...] [:trailing]
/// ```
pub fn parse_message(input: &str) -> ParseResult<&str, ParsedMessage<'_>> {
    let (input, tags) = context("parsing optional tags", opt(parse_tags))(input)?;
    let (input, _) = space0(input)?;

    let (input, prefix) = context("parsing optional prefix", opt(parse_prefix))(input)?;
    let (input, _) = space0(input)?;

    let (input, command) = context("parsing required command", parse_command)(input)?;

    // The command token must end at a space or at the end of the line.
    if let Some(c) = input.chars().next() {
        if c != ' ' {
            return Err(nom::Err::Error(VerboseError {
                errors: vec![(input, nom::error::VerboseErrorKind::Nom(ErrorKind::AlphaNumeric))],
            }));
        }
    }

    let mut params: Vec<&str> = Vec::new();
    let mut rest = input;

    loop {
        let trimmed = rest.trim_start_matches(' ');
        if trimmed.is_empty() {
            rest = trimmed;
            break;
        }

        if let Some(trailing) = trimmed.strip_prefix(':') {
            // Trailing parameter: everything after the first `:`, spaces and
            // further colons included.
            params.push(trailing);
            rest = "";
            break;
        }

        let end = trimmed.find(' ').unwrap_or(trimmed.len());
        params.push(&trimmed[..end]);
        rest = &trimmed[end..];
    }

    Ok((
        rest,
        ParsedMessage {
            tags,
            prefix,
            command,
            params,
        },
    ))
}

/// A parsed IRC line with borrowed string slices.
///
/// This is the intermediate representation produced by the nom parser.
/// It holds references into the original input string.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedMessage<'a> {
    /// Raw tags string (without the leading `@`), if present.
    pub tags: Option<&'a str>,
    /// Raw prefix string (without the leading `:`), if present.
    pub prefix: Option<&'a str>,
    /// The command name.
    pub command: &'a str,
    /// Command parameters, including trailing.
    pub params: Vec<&'a str>,
}

impl<'a> ParsedMessage<'a> {
    /// Parse an IRC line into a `ParsedMessage`.
    ///
    /// Returns detailed error information for debugging failed parses.
    pub fn parse(input: &'a str) -> Result<Self, DetailedParseError> {
        match parse_message(input) {
            Ok((_remaining, msg)) => Ok(msg),
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
                let mut context_info = None;
                let mut position = input.len();
                let mut kind = ErrorKind::Tag;

                for (error_input, error_kind) in &e.errors {
                    position = input.len() - error_input.len();
                    match error_kind {
                        nom::error::VerboseErrorKind::Context(ctx) => {
                            context_info = Some(*ctx);
                        }
                        nom::error::VerboseErrorKind::Nom(ek) => {
                            kind = *ek;
                        }
                        nom::error::VerboseErrorKind::Char(_) => {
                            kind = ErrorKind::Char;
                        }
                    }
                }

                Err(DetailedParseError {
                    input: input.to_string(),
                    position,
                    context: context_info,
                    kind,
                })
            }
            Err(nom::Err::Incomplete(_)) => Err(DetailedParseError {
                input: input.to_string(),
                position: input.len(),
                context: Some("incomplete input"),
                kind: ErrorKind::Eof,
            }),
        }
    }
}

/// Detailed parse error with position and context information.
#[derive(Debug, Clone)]
pub struct DetailedParseError {
    /// The original input string that failed to parse.
    pub input: String,
    /// Character position where parsing failed.
    pub position: usize,
    /// Context about what was being parsed when the error occurred.
    pub context: Option<&'static str>,
    /// The nom error kind.
    pub kind: ErrorKind,
}

impl DetailedParseError {
    /// Whether the failure happened inside the prefix.
    pub fn in_prefix(&self) -> bool {
        self.context == Some("parsing message prefix")
            || (self.input.starts_with(':') && !self.input.contains(' '))
    }
}

impl std::fmt::Display for DetailedParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error at position {}", self.position)?;
        if let Some(ctx) = self.context {
            write!(f, " while {}", ctx)?;
        }
        write!(f, ": {:?}", self.kind)?;

        if self.position < self.input.len() {
            let before = &self.input[..self.position];
            let after = &self.input[self.position..];
            write!(f, "\n  Input: {}<<<HERE>>>{}", before, after)?;
        } else {
            write!(f, "\n  Input: {}<<<EOF>>>", self.input)?;
        }

        Ok(())
    }
}

impl std::error::Error for DetailedParseError {}
