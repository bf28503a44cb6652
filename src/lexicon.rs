//! Word lists shared by the rule-based components.
//!
//! The polarity values follow the usual adjective-lexicon convention: `[-1, 1]` per word,
//! intensifiers scale the following word, negators flip and damp it.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// English stop words. Lowercase.
pub static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "about", "above", "after", "again", "against", "all", "almost", "also", "although",
        "am", "among", "an", "and", "another", "any", "anyone", "anything", "are", "around",
        "as", "at", "be", "became", "because", "become", "been", "before", "being", "below",
        "beside", "between", "both", "but", "by", "ca", "can", "cannot", "could", "did", "do",
        "does", "doing", "done", "down", "due", "during", "each", "either", "else", "enough",
        "even", "ever", "every", "everyone", "everything", "few", "for", "from", "further",
        "get", "give", "go", "had", "has", "have", "having", "he", "her", "here", "hers",
        "herself", "him", "himself", "his", "how", "however", "i", "if", "in", "into", "is",
        "it", "its", "itself", "just", "last", "least", "less", "made", "make", "many", "may",
        "me", "meanwhile", "might", "mine", "more", "most", "mostly", "much", "must", "my",
        "myself", "neither", "never", "next", "no", "nobody", "none", "nor", "not", "nothing",
        "now", "of", "off", "often", "on", "once", "one", "only", "onto", "or", "other",
        "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own", "part", "per",
        "perhaps", "please", "put", "quite", "rather", "really", "same", "say", "see", "seem",
        "seemed", "several", "she", "should", "show", "since", "so", "some", "someone",
        "something", "sometimes", "still", "such", "take", "than", "that", "the", "their",
        "theirs", "them", "themselves", "then", "there", "these", "they", "this", "those",
        "though", "through", "thus", "to", "together", "too", "top", "toward", "towards",
        "two", "under", "until", "up", "upon", "us", "used", "using", "various", "very", "via",
        "was", "we", "well", "were", "what", "whatever", "when", "where", "whether", "which",
        "while", "who", "whole", "whom", "whose", "why", "will", "with", "within", "without",
        "would", "yet", "you", "your", "yours", "yourself", "yourselves",
    ]
    .into_iter()
    .collect()
});

/// Word polarity in `[-1, 1]`.
pub static POLARITY: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        // positive
        ("excellent", 1.0),
        ("outstanding", 0.9),
        ("amazing", 0.6),
        ("great", 0.8),
        ("wonderful", 1.0),
        ("fantastic", 0.9),
        ("perfect", 1.0),
        ("superb", 1.0),
        ("brilliant", 0.9),
        ("awesome", 1.0),
        ("good", 0.7),
        ("nice", 0.6),
        ("lovely", 0.5),
        ("pleasant", 0.73),
        ("friendly", 0.375),
        ("helpful", 0.5),
        ("clean", 0.37),
        ("spotless", 0.8),
        ("comfortable", 0.4),
        ("comfy", 0.4),
        ("spacious", 0.4),
        ("cozy", 0.5),
        ("delicious", 1.0),
        ("tasty", 0.5),
        ("beautiful", 0.85),
        ("best", 1.0),
        ("happy", 0.8),
        ("enjoyed", 0.5),
        ("enjoy", 0.4),
        ("love", 0.5),
        ("loved", 0.7),
        ("recommend", 0.4),
        ("recommended", 0.4),
        ("welcoming", 0.5),
        ("attentive", 0.5),
        ("peaceful", 0.4),
        ("fresh", 0.3),
        ("modern", 0.2),
        ("efficient", 0.4),
        ("polite", 0.4),
        ("courteous", 0.4),
        ("relaxing", 0.5),
        ("stunning", 0.8),
        ("impressive", 0.6),
        ("professional", 0.3),
        ("convenient", 0.4),
        ("fine", 0.4),
        ("thanks", 0.2),
        // negative
        ("terrible", -1.0),
        ("awful", -1.0),
        ("horrible", -1.0),
        ("disgusting", -1.0),
        ("worst", -1.0),
        ("bad", -0.7),
        ("poor", -0.4),
        ("dirty", -0.6),
        ("filthy", -0.8),
        ("rude", -0.6),
        ("noisy", -0.4),
        ("smelly", -0.5),
        ("broken", -0.4),
        ("uncomfortable", -0.5),
        ("disappointing", -0.6),
        ("disappointed", -0.75),
        ("unhelpful", -0.5),
        ("unfriendly", -0.5),
        ("unprofessional", -0.5),
        ("slow", -0.3),
        ("overpriced", -0.5),
        ("overcharged", -0.6),
        ("worse", -0.4),
        ("nasty", -0.8),
        ("unacceptable", -0.8),
        ("angry", -0.5),
        ("annoying", -0.6),
        ("stained", -0.4),
        ("moldy", -0.6),
        ("mouldy", -0.6),
        ("cramped", -0.4),
        ("boring", -0.5),
        ("mediocre", -0.3),
        ("cold", -0.3),
        ("late", -0.3),
        ("delayed", -0.3),
    ])
});

/// Multipliers applied to the next polar word.
pub static INTENSIFIERS: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        ("very", 1.3),
        ("really", 1.2),
        ("extremely", 1.5),
        ("so", 1.2),
        ("super", 1.3),
        ("incredibly", 1.5),
        ("absolutely", 1.4),
        ("totally", 1.3),
        ("quite", 1.1),
        ("highly", 1.3),
    ])
});

pub const NEGATION_FACTOR: f64 = -0.5;

pub fn is_negator(word: &str) -> bool {
    matches!(word, "not" | "never" | "no" | "nothing" | "hardly") || word.ends_with("n't")
}

/// Polar words that read as verbs or nouns rather than adjectives.
const NON_ADJECTIVE_POLAR: &[&str] = &[
    "enjoyed",
    "enjoy",
    "love",
    "loved",
    "recommend",
    "recommended",
    "thanks",
    "delayed",
    "overcharged",
];

static EXTRA_ADJECTIVES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "urgent", "small", "big", "large", "huge", "tiny", "new", "old", "hot", "warm", "cool",
        "quiet", "busy", "crowded", "expensive", "cheap", "free", "early", "extra", "main",
        "whole", "long", "short", "full", "empty", "loud", "safe", "unsafe", "dark", "bright",
        "calm", "ready", "available", "unavailable", "wrong", "right", "sure", "open", "closed",
    ]
    .into_iter()
    .collect()
});

static KNOWN_NOUNS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "hotel", "stay", "experience", "issue", "problem", "view", "towel", "pillow", "lobby",
        "bar", "night", "pool", "gym", "spa", "wifi", "internet", "tv", "staff", "room",
        "service", "breakfast", "lunch", "dinner", "food", "meal", "restaurant", "kitchen",
        "chef", "bed", "shower", "toilet", "bathroom", "bedroom", "minibar", "reception",
        "desk", "manager", "waiter", "waitress", "price", "cost", "value", "money", "location",
        "area", "neighborhood", "parking", "transport", "booking", "reservation", "website",
        "payment", "check-in", "check-out", "elevator", "heating", "noise", "atmosphere",
        "ambiance", "housekeeping", "hygiene", "mess", "carpet", "window", "door", "key",
        "card", "floor", "coffee", "tea", "drink", "water", "air", "conditioning", "balcony",
        "beach", "garden", "terrace", "suite", "checkout", "checkin", "guest", "employee",
        "team", "time", "hour", "minute", "day", "weekend", "trip", "visit", "family", "kid",
        "child", "children", "bill", "charge", "refund", "smell", "bug", "cockroach", "sheet",
    ]
    .into_iter()
    .collect()
});

static KNOWN_VERBS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "stayed", "arrived", "checked", "asked", "told", "waited", "booked", "paid", "found",
        "came", "went", "took", "said", "left", "got", "felt", "looked", "needed", "wanted",
        "tried", "called", "complained", "received", "recommend", "recommended", "love",
        "loved", "enjoy", "enjoyed", "like", "liked", "hate", "hated", "thank", "thanks",
        "fix", "fixed", "clean", "cleaned", "provide", "provided", "offer", "offered",
        "smelled", "charged", "overcharged", "delayed", "cancelled", "canceled", "return",
        "come", "stay", "wait",
    ]
    .into_iter()
    .collect()
});

pub(crate) fn is_known_noun(word: &str) -> bool {
    KNOWN_NOUNS.contains(word)
}

/// Coarse part-of-speech guess for a lowercase word outside the stop list.
pub(crate) fn guess_pos(word: &str) -> WordClass {
    if KNOWN_NOUNS.contains(word) {
        return WordClass::Noun;
    }
    if (POLARITY.contains_key(word) && !NON_ADJECTIVE_POLAR.contains(&word))
        || EXTRA_ADJECTIVES.contains(word)
    {
        return WordClass::Adjective;
    }
    if KNOWN_VERBS.contains(word) {
        return WordClass::Verb;
    }
    if INTENSIFIERS.contains_key(word) {
        return WordClass::Adverb;
    }
    if word.chars().all(|c| c.is_ascii_digit()) {
        return WordClass::Number;
    }
    if word.len() > 4 && word.ends_with("ly") {
        return WordClass::Adverb;
    }
    if word.len() > 4 && (word.ends_with("ed") || word.ends_with("ing")) {
        return WordClass::Verb;
    }
    const ADJ_SUFFIXES: [&str; 7] = ["ful", "ous", "ive", "able", "ible", "less", "ish"];
    if word.len() > 5 && ADJ_SUFFIXES.iter().any(|s| word.ends_with(s)) {
        return WordClass::Adjective;
    }
    WordClass::Noun
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WordClass {
    Noun,
    Adjective,
    Verb,
    Adverb,
    Number,
}
