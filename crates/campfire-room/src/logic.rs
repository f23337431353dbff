//! Text classification for the adventure state machine, and the
//! canned system messages the storyteller posts around transitions.
//!
//! Classification looks at text only. Whether a trigger actually fires
//! depends on the room's authoritative state, which the actor re-reads
//! from the repository per message; a trigger that does not apply in
//! the current state is demoted to ordinary chat.

/// Author name attached to storyteller messages.
pub const SYSTEM_AUTHOR: &str = "storyteller";

const BEGIN_TRIGGER: &str = "begin adventure";
const END_TRIGGER: &str = "end adventure";

/// What a chat line means to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Exactly the begin phrase, after trimming and lowercasing.
    Begin,
    /// Exactly the end phrase, after trimming and lowercasing.
    End,
    /// A bare option number 1 through 4.
    Reply(u8),
    /// Anything else.
    Plain,
}

/// Classifies one chat line.
///
/// Matching is tolerant of surrounding whitespace and letter case, and
/// nothing else: `"Begin Adventure"` fires, `"begin adventure!"` does
/// not.
pub fn classify(text: &str) -> Trigger {
    let normalized = text.trim().to_lowercase();
    match normalized.as_str() {
        BEGIN_TRIGGER => Trigger::Begin,
        END_TRIGGER => Trigger::End,
        other => match other.parse::<u8>() {
            Ok(n @ 1..=4) => Trigger::Reply(n),
            _ => Trigger::Plain,
        },
    }
}

/// The setting menu posted when an adventure starts.
pub fn options_message() -> String {
    "Okay, let's go on an adventure! Choose a setting:\n\
     1. Medieval Fantasy\n\
     2. 1920's Detective\n\
     3. CyberPunk\n\
     4. Present Day"
        .to_owned()
}

/// Posted when an adventure ends.
pub fn end_message() -> String {
    "Thanks for playing!".to_owned()
}

/// Posted when the narrator cannot be reached or times out.
pub fn fallback_message() -> String {
    "The storyteller seems to be lost in thought. Please try again."
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_begin_ignores_case_and_whitespace() {
        assert_eq!(classify("begin adventure"), Trigger::Begin);
        assert_eq!(classify("  Begin Adventure  "), Trigger::Begin);
        assert_eq!(classify("BEGIN ADVENTURE"), Trigger::Begin);
    }

    #[test]
    fn test_classify_end_ignores_case_and_whitespace() {
        assert_eq!(classify("end adventure"), Trigger::End);
        assert_eq!(classify("\tEnd Adventure\n"), Trigger::End);
    }

    #[test]
    fn test_classify_rejects_inexact_trigger_phrases() {
        assert_eq!(classify("begin adventure!"), Trigger::Plain);
        assert_eq!(classify("begin  adventure"), Trigger::Plain);
        assert_eq!(classify("please begin adventure"), Trigger::Plain);
    }

    #[test]
    fn test_classify_option_numbers_one_through_four() {
        assert_eq!(classify("1"), Trigger::Reply(1));
        assert_eq!(classify(" 4 "), Trigger::Reply(4));
    }

    #[test]
    fn test_classify_rejects_out_of_range_numbers() {
        assert_eq!(classify("0"), Trigger::Plain);
        assert_eq!(classify("5"), Trigger::Plain);
        assert_eq!(classify("42"), Trigger::Plain);
        assert_eq!(classify("-1"), Trigger::Plain);
        assert_eq!(classify("1.5"), Trigger::Plain);
    }

    #[test]
    fn test_classify_ordinary_chat() {
        assert_eq!(classify("hello everyone"), Trigger::Plain);
        assert_eq!(classify(""), Trigger::Plain);
    }
}
