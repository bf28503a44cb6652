use once_cell::sync::Lazy;
use regex::Regex;

static DISALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s-]").expect("valid regex"));

/// Words never worth reporting as a topic on their own
const TOPIC_STOP_LIST: &[&str] = &[
    "the", "and", "for", "with", "this", "that", "very", "good", "bad",
];

const MIN_CHARS: usize = 2;
const MAX_CHARS: usize = 25;

/// Normalize a raw candidate, or `None` if it should be dropped.
pub fn clean_topic(raw: &str) -> Option<String> {
    let cleaned = DISALLOWED.replace_all(raw, "").to_lowercase();
    let cleaned = cleaned.trim();

    let chars = cleaned.chars().count();
    if !(MIN_CHARS..=MAX_CHARS).contains(&chars) {
        return None;
    }
    if cleaned.chars().all(char::is_numeric) {
        return None;
    }
    if TOPIC_STOP_LIST.contains(&cleaned) {
        return None;
    }
    Some(cleaned.to_string())
}
