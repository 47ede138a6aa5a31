//! Post-processing of generated text.
//!
//! Completion models tend to keep writing past the end of their turn: a new
//! `### Instruction` header, a code `import`, or an invented `Human:` / `AI:`
//! exchange. Every caller cuts the first choice at the earliest stop marker
//! and trims the result.

/// Stop markers used by the question-answering, chat and generation call sites.
pub const DEFAULT_STOP_MARKERS: &[&str] = &["#", "import", "Human", "human", "AI:"];

/// Reduced marker set used only by the toxicity check, whose prompts may
/// legitimately contain dialogue.
pub const REDUCED_STOP_MARKERS: &[&str] = &["#", "import"];

/// Cut `text` before the first occurrence of any marker, then trim.
///
/// Markers are applied in order, each against the already-truncated text,
/// which leaves the prefix before the earliest marker overall.
///
/// ```
/// use edgequake_rag::postprocess::truncate_at_stop_markers;
///
/// assert_eq!(
///     truncate_at_stop_markers("The answer is 42 #extra stuff", &["#"]),
///     "The answer is 42"
/// );
/// ```
pub fn truncate_at_stop_markers<S: AsRef<str>>(text: &str, markers: &[S]) -> String {
    let mut completion = text;
    for marker in markers {
        let marker = marker.as_ref();
        if marker.is_empty() {
            continue;
        }
        if let Some(pos) = completion.find(marker) {
            completion = &completion[..pos];
        }
    }
    completion.trim().to_string()
}

/// Default marker set as owned strings, for configuration defaults.
pub fn default_stop_markers() -> Vec<String> {
    DEFAULT_STOP_MARKERS.iter().map(|m| m.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncates_at_hash() {
        assert_eq!(
            truncate_at_stop_markers("The answer is 42 #extra stuff", &["#"]),
            "The answer is 42"
        );
    }

    #[test]
    fn test_earliest_marker_wins_regardless_of_list_order() {
        let text = "Sure thing.\nHuman: what next?\n### Instruction";
        assert_eq!(
            truncate_at_stop_markers(text, DEFAULT_STOP_MARKERS),
            "Sure thing."
        );
    }

    #[test]
    fn test_ai_marker_and_trim() {
        let text = "  Hello there!  \nAI: hello again";
        assert_eq!(
            truncate_at_stop_markers(text, DEFAULT_STOP_MARKERS),
            "Hello there!"
        );
    }

    #[test]
    fn test_reduced_set_keeps_dialogue_markers() {
        let text = "Human beings are curious. # trailing";
        assert_eq!(
            truncate_at_stop_markers(text, REDUCED_STOP_MARKERS),
            "Human beings are curious."
        );
        assert_eq!(truncate_at_stop_markers(text, DEFAULT_STOP_MARKERS), "");
    }

    #[test]
    fn test_full_set_strips_invented_dialogue() {
        let text = " The endpoint was added in March.\nHuman: thanks\nAI: you're welcome";
        assert_eq!(
            truncate_at_stop_markers(text, DEFAULT_STOP_MARKERS),
            "The endpoint was added in March."
        );
        assert_eq!(
            truncate_at_stop_markers(text, REDUCED_STOP_MARKERS),
            text.trim()
        );
    }

    #[test]
    fn test_no_marker_only_trims() {
        assert_eq!(
            truncate_at_stop_markers("\n  plain answer \n", DEFAULT_STOP_MARKERS),
            "plain answer"
        );
    }

    #[test]
    fn test_marker_matching_is_case_sensitive_substring() {
        // "important" contains "import".
        assert_eq!(
            truncate_at_stop_markers("It is important to rest.", REDUCED_STOP_MARKERS),
            "It is"
        );
    }

    #[test]
    fn test_owned_marker_list() {
        let markers = default_stop_markers();
        assert_eq!(markers.len(), 5);
        assert_eq!(truncate_at_stop_markers("ok AI: more", &markers), "ok");
    }
}
