//! Part-of-speech and entity-aware parsing.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::error::Result;
use crate::lexicon::{self, INTENSIFIERS, STOP_WORDS, WordClass};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartOfSpeech {
    Noun,
    ProperNoun,
    Adjective,
    Verb,
    Adverb,
    Determiner,
    Pronoun,
    Number,
    Punctuation,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedToken {
    pub text: String,
    pub lemma: String,
    pub pos: PartOfSpeech,
    pub is_stop: bool,
    pub is_punct: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityLabel {
    Org,
    Product,
    Event,
    Facility,
    Person,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedEntity {
    pub text: String,
    pub label: EntityLabel,
}

/// Result of parsing one text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedText {
    pub tokens: Vec<ParsedToken>,
    pub noun_chunks: Vec<String>,
    pub entities: Vec<NamedEntity>,
}

#[async_trait]
pub trait LinguisticParser: Send + Sync {
    async fn parse(&self, text: &str) -> Result<ParsedText>;
    fn name(&self) -> &str;
}

static TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\p{L}\p{N}]+(?:['’-][\p{L}\p{N}]+)*|[^\s\p{L}\p{N}]")
        .expect("valid token regex")
});

const DETERMINERS: &[&str] = &[
    "a", "an", "the", "this", "that", "these", "those", "my", "our", "your", "their", "his",
    "her", "its", "some", "any", "every", "each", "no",
];

const PRONOUNS: &[&str] = &[
    "i", "me", "we", "us", "you", "he", "she", "it", "they", "them", "him", "myself",
    "ourselves",
];

const FACILITY_WORDS: &[&str] = &[
    "hotel", "inn", "resort", "spa", "restaurant", "bar", "airport", "hostel", "motel",
    "lodge", "cafe", "museum", "station", "beach", "park", "casino",
];

/// Lexicon-driven tagger, noun chunker and entity recognizer.
///
/// Deterministic and dependency-free at runtime; good enough for the short English texts
/// guests leave, not a general-purpose parser.
#[derive(Debug, Clone, Default)]
pub struct RuleBasedParser;

impl RuleBasedParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse_sync(&self, text: &str) -> ParsedText {
        let normalized: String = text.nfkc().collect();
        let tokens = tag(&normalized);
        let noun_chunks = noun_chunks(&tokens);
        let entities = entities(&tokens);
        ParsedText {
            tokens,
            noun_chunks,
            entities,
        }
    }
}

#[async_trait]
impl LinguisticParser for RuleBasedParser {
    async fn parse(&self, text: &str) -> Result<ParsedText> {
        Ok(self.parse_sync(text))
    }

    fn name(&self) -> &str {
        "rules"
    }
}

fn tag(text: &str) -> Vec<ParsedToken> {
    let mut out = Vec::new();
    let mut sentence_start = true;

    for m in TOKEN.find_iter(text) {
        let raw = m.as_str();
        let is_punct = !raw.chars().next().is_some_and(char::is_alphanumeric);
        if is_punct {
            out.push(ParsedToken {
                text: raw.to_string(),
                lemma: raw.to_string(),
                pos: PartOfSpeech::Punctuation,
                is_stop: false,
                is_punct: true,
            });
            sentence_start = matches!(raw, "." | "!" | "?");
            continue;
        }

        let lower = raw.to_lowercase();
        let is_stop = STOP_WORDS.contains(lower.as_str());
        let pos = classify(raw, &lower, is_stop, sentence_start);
        let lemma = match pos {
            PartOfSpeech::Noun => singularize(&lower),
            PartOfSpeech::ProperNoun => raw.to_string(),
            _ => lower.clone(),
        };
        out.push(ParsedToken {
            text: raw.to_string(),
            lemma,
            pos,
            is_stop,
            is_punct: false,
        });
        sentence_start = false;
    }
    out
}

fn classify(raw: &str, lower: &str, is_stop: bool, sentence_start: bool) -> PartOfSpeech {
    if DETERMINERS.contains(&lower) {
        return PartOfSpeech::Determiner;
    }
    if PRONOUNS.contains(&lower) {
        return PartOfSpeech::Pronoun;
    }
    if is_stop {
        return if INTENSIFIERS.contains_key(lower) {
            PartOfSpeech::Adverb
        } else {
            PartOfSpeech::Other
        };
    }

    let guess = lexicon::guess_pos(lower);
    let capitalized = raw.chars().next().is_some_and(char::is_uppercase);
    let all_caps = raw.chars().count() >= 2 && raw.chars().all(char::is_uppercase);
    if guess == WordClass::Noun
        && ((capitalized && !sentence_start) || (all_caps && !lexicon::is_known_noun(lower)))
    {
        return PartOfSpeech::ProperNoun;
    }

    match guess {
        WordClass::Noun => PartOfSpeech::Noun,
        WordClass::Adjective => PartOfSpeech::Adjective,
        WordClass::Verb => PartOfSpeech::Verb,
        WordClass::Adverb => PartOfSpeech::Adverb,
        WordClass::Number => PartOfSpeech::Number,
    }
}

fn singularize(word: &str) -> String {
    if word.len() > 3 {
        if let Some(stem) = word.strip_suffix("ies") {
            return format!("{stem}y");
        }
        if let Some(stem) = word.strip_suffix("sses") {
            return format!("{stem}ss");
        }
        if word.ends_with('s') && !["ss", "us", "is"].iter().any(|s| word.ends_with(s)) {
            return word[..word.len() - 1].to_string();
        }
    }
    word.to_string()
}

fn is_nominal(pos: PartOfSpeech) -> bool {
    matches!(pos, PartOfSpeech::Noun | PartOfSpeech::ProperNoun)
}

/// Drop a leading determiner from a noun chunk: "the room" reads as "room".
pub(crate) fn without_determiner(chunk: &str) -> &str {
    match chunk.split_once(' ') {
        Some((first, rest)) if DETERMINERS.contains(&first.to_lowercase().as_str()) => rest,
        _ => chunk,
    }
}

/// `Det? (Adv? Adj)* Noun+`, determiner included in the chunk text.
fn noun_chunks(tokens: &[ParsedToken]) -> Vec<String> {
    let pos_at = |i: usize| tokens.get(i).map(|t| t.pos);
    let mut chunks = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        let mut j = i;
        if pos_at(j) == Some(PartOfSpeech::Determiner) {
            j += 1;
        }
        loop {
            match (pos_at(j), pos_at(j + 1)) {
                (Some(PartOfSpeech::Adverb), Some(PartOfSpeech::Adjective)) => j += 2,
                (Some(PartOfSpeech::Adjective), _) => j += 1,
                _ => break,
            }
        }
        let noun_start = j;
        while pos_at(j).is_some_and(is_nominal) {
            j += 1;
        }

        if j > noun_start {
            let words: Vec<&str> = tokens[i..j].iter().map(|t| t.text.as_str()).collect();
            chunks.push(words.join(" "));
            i = j;
        } else {
            i += 1;
        }
    }
    chunks
}

fn entities(tokens: &[ParsedToken]) -> Vec<NamedEntity> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        if tokens[i].pos != PartOfSpeech::ProperNoun {
            i += 1;
            continue;
        }
        let start = i;
        while i < tokens.len() && tokens[i].pos == PartOfSpeech::ProperNoun {
            i += 1;
        }
        let run = &tokens[start..i];
        let label = if run
            .iter()
            .any(|t| FACILITY_WORDS.contains(&t.text.to_lowercase().as_str()))
        {
            EntityLabel::Facility
        } else if run.len() > 1 || run[0].text.chars().all(char::is_uppercase) {
            EntityLabel::Org
        } else {
            EntityLabel::Person
        };
        let text: Vec<&str> = run.iter().map(|t| t.text.as_str()).collect();
        out.push(NamedEntity {
            text: text.join(" "),
            label,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos_of(parsed: &ParsedText, word: &str) -> PartOfSpeech {
        parsed
            .tokens
            .iter()
            .find(|t| t.text == word)
            .map(|t| t.pos)
            .unwrap()
    }

    #[test]
    fn tags_lexicon_words_and_punctuation() {
        let parsed = RuleBasedParser::new().parse_sync("The room was dirty!");
        assert_eq!(pos_of(&parsed, "The"), PartOfSpeech::Determiner);
        assert_eq!(pos_of(&parsed, "room"), PartOfSpeech::Noun);
        assert_eq!(pos_of(&parsed, "dirty"), PartOfSpeech::Adjective);
        let bang = parsed.tokens.last().unwrap();
        assert!(bang.is_punct);
        assert!(parsed.tokens.iter().find(|t| t.text == "was").unwrap().is_stop);
    }

    #[test]
    fn plural_nouns_are_lemmatized() {
        let parsed = RuleBasedParser::new().parse_sync("towels and pillows and amenities");
        let lemmas: Vec<_> = parsed.tokens.iter().map(|t| t.lemma.as_str()).collect();
        assert!(lemmas.contains(&"towel"));
        assert!(lemmas.contains(&"pillow"));
        assert!(lemmas.contains(&"amenity"));
    }

    #[test]
    fn chunks_join_adjectives_and_nouns() {
        let parsed =
            RuleBasedParser::new().parse_sync("We had a very noisy room and friendly staff.");
        assert!(parsed.noun_chunks.contains(&"a very noisy room".to_string()));
        assert!(parsed.noun_chunks.contains(&"friendly staff".to_string()));
    }

    #[test]
    fn leading_determiner_is_dropped_on_request() {
        assert_eq!(without_determiner("The room"), "room");
        assert_eq!(without_determiner("friendly staff"), "friendly staff");
        assert_eq!(without_determiner("room"), "room");
    }

    #[test]
    fn capitalized_runs_become_entities() {
        let parsed = RuleBasedParser::new()
            .parse_sync("We stayed at the Grand Plaza Hotel and met Maria. Booking via IBM travel.");
        let grand = parsed
            .entities
            .iter()
            .find(|e| e.text == "Grand Plaza Hotel")
            .unwrap();
        assert_eq!(grand.label, EntityLabel::Facility);
        let maria = parsed.entities.iter().find(|e| e.text == "Maria").unwrap();
        assert_eq!(maria.label, EntityLabel::Person);
        let ibm = parsed.entities.iter().find(|e| e.text == "IBM").unwrap();
        assert_eq!(ibm.label, EntityLabel::Org);
    }

    #[test]
    fn sentence_initial_capitals_are_not_entities() {
        let parsed = RuleBasedParser::new().parse_sync("Breakfast was cold. Coffee too.");
        assert!(parsed.entities.is_empty());
        assert_eq!(pos_of(&parsed, "Breakfast"), PartOfSpeech::Noun);
    }

    #[test]
    fn compatibility_forms_are_normalized() {
        let parsed = RuleBasedParser::new().parse_sync("ｗｉｆｉ");
        assert_eq!(parsed.tokens[0].text, "wifi");
    }
}
