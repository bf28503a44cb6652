use once_cell::sync::Lazy;
use regex::Regex;

use crate::lexicon::{INTENSIFIERS, NEGATION_FACTOR, POLARITY, is_negator};
use crate::utils::clamp_signed_unit;

static TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\p{L}\p{N}]+(?:['’][\p{L}]+)?|!").expect("valid token regex"));

const EXCLAMATION_BOOST: f64 = 1.1;
const NEGATION_WINDOW: usize = 2;

/// Average word polarity of `text` in `[-1, 1]`; 0.0 when no lexicon word occurs.
pub fn lexical_polarity(text: &str) -> f64 {
    let lowered = text.to_lowercase().replace('’', "'");
    let tokens: Vec<&str> = TOKEN.find_iter(&lowered).map(|m| m.as_str()).collect();

    let mut contributions = Vec::new();
    for (i, token) in tokens.iter().enumerate() {
        let Some(&base) = POLARITY.get(*token) else {
            continue;
        };
        let mut value = base;
        if i > 0
            && let Some(factor) = INTENSIFIERS.get(tokens[i - 1])
        {
            value *= factor;
        }
        if tokens[i.saturating_sub(NEGATION_WINDOW)..i]
            .iter()
            .any(|t| is_negator(t))
        {
            value *= NEGATION_FACTOR;
        }
        if tokens.get(i + 1) == Some(&"!") {
            value *= EXCLAMATION_BOOST;
        }
        contributions.push(clamp_signed_unit(value));
    }

    if contributions.is_empty() {
        return 0.0;
    }
    contributions.iter().sum::<f64>() / contributions.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complaint_averages_strongly_negative() {
        let p = lexical_polarity(
            "This is terrible! The room was dirty and the service was awful. Very urgent issue!",
        );
        assert!((p - (-2.6 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn intensifier_scales_following_word() {
        let plain = lexical_polarity("the room was clean");
        let boosted = lexical_polarity("the room was very clean");
        assert!((plain - 0.37).abs() < 1e-9);
        assert!((boosted - 0.481).abs() < 1e-9);
    }

    #[test]
    fn negation_flips_and_damps() {
        assert!((lexical_polarity("the staff were not friendly") - (-0.1875)).abs() < 1e-9);
        assert!(lexical_polarity("the breakfast wasn't bad") > 0.0);
    }

    #[test]
    fn curly_apostrophes_negate_too() {
        assert!(lexical_polarity("the bed wasn’t comfortable") < 0.0);
    }

    #[test]
    fn no_lexicon_words_is_neutral() {
        assert_eq!(lexical_polarity("we arrived at noon"), 0.0);
        assert_eq!(lexical_polarity(""), 0.0);
    }

    #[test]
    fn contributions_never_leave_range() {
        let p = lexical_polarity("absolutely perfect! extremely excellent!");
        assert_eq!(p, 1.0);
    }
}
