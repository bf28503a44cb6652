//! Map a classifier distribution onto the signed sentiment scale.

use crate::backends::ClassScore;
use crate::types::SentimentLabel;
use crate::utils::{clamp_signed_unit, clamp_unit};

/// Chance level for three classes
const BASELINE: f64 = 0.33;
const POLAR_SLOPE: f64 = 1.5;
const NEUTRAL_SLOPE: f64 = 0.6;

/// Pick the most probable class. The first class wins ties. `None` for an empty distribution.
pub fn best_class(scores: &[ClassScore]) -> Option<ClassScore> {
    let mut best: Option<ClassScore> = None;
    for score in scores {
        match best {
            Some(b) if score.probability <= b.probability => {}
            _ => best = Some(*score),
        }
    }
    best
}

/// Turn the winning class into `(sentiment, confidence)`, both clamped.
pub fn to_scale(best: ClassScore) -> (f64, f64) {
    let confidence = clamp_unit(best.probability);
    let excess = confidence - BASELINE;
    let sentiment = match best.label {
        SentimentLabel::Positive => 0.5 + excess * POLAR_SLOPE,
        SentimentLabel::Negative => -0.5 - excess * POLAR_SLOPE,
        SentimentLabel::Neutral => excess * NEUTRAL_SLOPE,
    };
    (clamp_signed_unit(sentiment), confidence)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dist(neg: f64, neu: f64, pos: f64) -> Vec<ClassScore> {
        vec![
            ClassScore::new(SentimentLabel::Negative, neg),
            ClassScore::new(SentimentLabel::Neutral, neu),
            ClassScore::new(SentimentLabel::Positive, pos),
        ]
    }

    #[test]
    fn confident_negative_maps_below_minus_half() {
        let best = best_class(&dist(0.9, 0.07, 0.03)).unwrap();
        let (sentiment, confidence) = to_scale(best);
        assert_eq!(best.label, SentimentLabel::Negative);
        assert!((confidence - 0.9).abs() < 1e-9);
        // -0.5 - 0.57 * 1.5 clamps to -1
        assert_eq!(sentiment, -1.0);
    }

    #[test]
    fn weak_positive_stays_positive() {
        let best = best_class(&dist(0.3, 0.3, 0.4)).unwrap();
        let (sentiment, _) = to_scale(best);
        assert!((sentiment - 0.605).abs() < 1e-9);
    }

    #[test]
    fn neutral_below_baseline_goes_slightly_negative() {
        let best = best_class(&dist(0.33, 0.34, 0.33)).unwrap();
        assert_eq!(best.label, SentimentLabel::Neutral);
        let (sentiment, _) = to_scale(ClassScore::new(SentimentLabel::Neutral, 0.2));
        assert!(sentiment < 0.0 && sentiment > -0.1);
    }

    #[test]
    fn ties_go_to_the_first_class() {
        let best = best_class(&dist(0.4, 0.4, 0.2)).unwrap();
        assert_eq!(best.label, SentimentLabel::Negative);
        assert!(best_class(&[]).is_none());
    }

    #[test]
    fn out_of_range_probabilities_are_clamped() {
        let (sentiment, confidence) = to_scale(ClassScore::new(SentimentLabel::Positive, 1.7));
        assert_eq!(confidence, 1.0);
        assert_eq!(sentiment, 1.0);
    }
}
