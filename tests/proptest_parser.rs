//! Property-based tests for the line parser, the command normalizer and
//! message splitting.

use proptest::prelude::*;
use slirc_session::response::normalize;
use slirc_session::{Action, ConfigBuilder, Message, Session};

fn nickname_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z\\[\\]\\\\^_`{|}][a-zA-Z0-9\\-\\[\\]\\\\^_`{|}]{0,8}")
        .expect("valid regex")
}

fn channel_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("#[a-zA-Z0-9_\\-]{1,30}").expect("valid regex")
}

/// Message text without CR, LF or NUL.
fn message_text_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[^\r\n\0]{0,400}").expect("valid regex")
}

/// Parameters that can sit in the middle of a line.
fn middle_param_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9#&*=@+.,_\\-]{1,20}").expect("valid regex")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn parser_never_panics(line in "\\PC{0,600}") {
        let _ = Message::parse(&line);
    }

    #[test]
    fn session_survives_arbitrary_lines(lines in prop::collection::vec("\\PC{0,200}", 1..20)) {
        let mut session = Session::new(ConfigBuilder::new("bob").build().unwrap());
        session.start();
        for line in &lines {
            let _ = session.handle_line(line);
        }
    }

    #[test]
    fn normalize_is_idempotent(command in "[A-Z0-9_]{0,12}") {
        let once = normalize(&command).into_owned();
        prop_assert_eq!(normalize(&once).into_owned(), once);
    }

    #[test]
    fn numeric_lines_keep_params_when_normalized(
        code in 1u16..1000,
        nick in nickname_strategy(),
        middle in prop::collection::vec(middle_param_strategy(), 0..5),
        trailing in message_text_strategy(),
    ) {
        let mut line = format!(":irc.example.net {:03} {}", code, nick);
        for param in &middle {
            line.push(' ');
            line.push_str(param);
        }
        line.push_str(" :");
        line.push_str(&trailing);

        let msg = Message::parse(&line).unwrap();
        let normalized = msg.clone().normalized();
        prop_assert_eq!(&normalized.params, &msg.params);
        prop_assert_eq!(normalized.params.last().map(String::as_str), Some(trailing.as_str()));
    }

    #[test]
    fn privmsg_display_round_trip(
        nick in nickname_strategy(),
        channel in channel_strategy(),
        text in message_text_strategy(),
    ) {
        let line = format!(":{}!u@host PRIVMSG {} :{}", nick, channel, text);
        let msg = Message::parse(&line).unwrap();
        let reparsed = Message::parse(&msg.to_string()).unwrap();
        prop_assert_eq!(msg, reparsed);
    }

    #[test]
    fn privmsg_split_drops_only_empty_lines(
        target in channel_strategy(),
        lines in prop::collection::vec("[^\r\n\0]{0,40}", 1..8),
    ) {
        let text = lines.join("\n");
        let encoded = Action::privmsg(target.clone(), text).encode().unwrap();

        let expected: Vec<String> = lines
            .iter()
            .filter(|l| !l.is_empty())
            .map(|l| format!("PRIVMSG {} :{}", target, l))
            .collect();
        prop_assert_eq!(encoded, expected);
    }
}
