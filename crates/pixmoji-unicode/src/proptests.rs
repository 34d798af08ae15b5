use super::*;
use pixmoji_core::types::TokenKind;
use proptest::prelude::*;

fn piece() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9 ,.!?]{1,6}",
        Just("😀".to_string()),
        Just("👋".to_string()),
        Just("👍🏽".to_string()),
        Just("👨\u{200d}💻".to_string()),
        Just("\n".to_string()),
    ]
}

fn mixed_text() -> impl Strategy<Value = String> {
    prop::collection::vec(piece(), 0..24).prop_map(|pieces| pieces.concat())
}

// Property: tokenizing the same text twice gives the same lines
proptest! {
    #[test]
    fn prop_tokenize_is_deterministic(s in mixed_text()) {
        let first = tokenize(&s);
        let second = tokenize(&s);
        prop_assert_eq!(first, second);
    }
}

// Property: one line per `\n`-separated segment
proptest! {
    #[test]
    fn prop_line_count_matches_newlines(s in mixed_text()) {
        let lines = tokenize(&s);
        prop_assert_eq!(lines.len(), s.matches('\n').count() + 1);
    }
}

// Property: without custom tags, concatenating token contents restores each line
proptest! {
    #[test]
    fn prop_tokens_reassemble_line(s in mixed_text()) {
        let lines = tokenize(&s);
        for (line, segment) in lines.iter().zip(s.split('\n')) {
            let joined: String = line.iter().map(|t| t.content()).collect();
            prop_assert_eq!(joined.as_str(), segment);
        }
    }
}

// Property: text tokens never sit next to each other and are never empty
proptest! {
    #[test]
    fn prop_text_runs_are_maximal(s in mixed_text()) {
        for line in tokenize(&s) {
            for pair in line.tokens().windows(2) {
                prop_assert!(
                    !(pair[0].kind() == TokenKind::Text && pair[1].kind() == TokenKind::Text)
                );
            }
            prop_assert!(line.iter().all(|t| !t.content().is_empty()));
        }
    }
}

// Property: arbitrary printable text never panics and never invents content
proptest! {
    #[test]
    fn prop_arbitrary_text_preserves_length(s in "[^<\n]*") {
        let lines = tokenize(&s);
        prop_assert_eq!(lines.len(), 1);
        let total: usize = lines[0].iter().map(|t| t.content().len()).sum();
        prop_assert_eq!(total, s.len());
    }
}
