use crate::labels::LabelSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const PROBABILITY_TOLERANCE: f32 = 1e-6;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClassificationError {
    #[error("Model returned {outputs} scores for {labels} labels")]
    LabelMismatch { outputs: usize, labels: usize },
    #[error("Model returned a non-finite score at index {0}")]
    NonFinite(usize),
    #[error("Model score {value} at index {index} is not a probability")]
    NotAProbability { index: usize, value: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub class: String,
    /// Percentage with two decimals, e.g. `"92.34"`.
    pub confidence: String,
}

/// Picks the highest scoring class. The first index wins on ties.
pub fn classify(
    probabilities: &[f32],
    labels: &LabelSet,
) -> Result<Prediction, ClassificationError> {
    if labels.is_empty() || probabilities.len() != labels.len() {
        return Err(ClassificationError::LabelMismatch {
            outputs: probabilities.len(),
            labels: labels.len(),
        });
    }

    let mut best: Option<(usize, f32)> = None;
    for (index, &value) in probabilities.iter().enumerate() {
        if !value.is_finite() {
            return Err(ClassificationError::NonFinite(index));
        }
        if !(-PROBABILITY_TOLERANCE..=1.0 + PROBABILITY_TOLERANCE).contains(&value) {
            return Err(ClassificationError::NotAProbability { index, value });
        }
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ => best = Some((index, value)),
        }
    }

    let mismatch = ClassificationError::LabelMismatch {
        outputs: probabilities.len(),
        labels: labels.len(),
    };
    let (index, confidence) = best.ok_or(mismatch.clone())?;
    let class = labels.get(index).ok_or(mismatch)?.to_string();

    Ok(Prediction {
        class,
        confidence: format_confidence(confidence),
    })
}

/// Rounds half away from zero, so `90.625` becomes `"90.63"`.
fn format_confidence(probability: f32) -> String {
    let percentage = f64::from(probability.clamp(0.0, 1.0)) * 100.0;
    format!("{:.2}", (percentage * 100.0).round() / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mango_labels() -> LabelSet {
        LabelSet::new(
            [
                "Anthracnose",
                "Bacterial Canker",
                "Cutting Weevil",
                "Die Back",
                "Gall Midge",
                "Healthy",
                "Powdery Mildew",
                "Sooty Mould",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_classify_picks_argmax() {
        let scores = [0.01, 0.02, 0.0, 0.01, 0.0134, 0.9234, 0.02, 0.0032];

        let prediction = classify(&scores, &mango_labels()).unwrap();

        assert_eq!(prediction.class, "Healthy");
        assert_eq!(prediction.confidence, "92.34");
    }

    #[test]
    fn test_classify_first_index_wins_ties() {
        let scores = [0.0, 0.5, 0.0, 0.0, 0.0, 0.0, 0.5, 0.0];

        let prediction = classify(&scores, &mango_labels()).unwrap();

        assert_eq!(prediction.class, "Bacterial Canker");
        assert_eq!(prediction.confidence, "50.00");
    }

    #[test]
    fn test_classify_confidence_bounds() {
        let mut scores = [0.0; 8];
        scores[7] = 1.0;
        let prediction = classify(&scores, &mango_labels()).unwrap();
        assert_eq!(prediction.class, "Sooty Mould");
        assert_eq!(prediction.confidence, "100.00");

        let prediction = classify(&[0.0; 8], &mango_labels()).unwrap();
        assert_eq!(prediction.class, "Anthracnose");
        assert_eq!(prediction.confidence, "0.00");
    }

    #[test]
    fn test_classify_clamps_rounding_noise() {
        let mut scores = [0.0; 8];
        scores[3] = 1.000_000_1;

        let prediction = classify(&scores, &mango_labels()).unwrap();

        assert_eq!(prediction.class, "Die Back");
        assert_eq!(prediction.confidence, "100.00");
    }

    #[test]
    fn test_format_confidence_rounds_ties_up() {
        assert_eq!(format_confidence(0.90625), "90.63");
        assert_eq!(format_confidence(0.40625), "40.63");
        assert_eq!(format_confidence(0.15625), "15.63");
        assert_eq!(format_confidence(0.03125), "3.13");
        assert_eq!(format_confidence(0.5), "50.00");
    }

    #[test]
    fn test_classify_rejects_label_mismatch() {
        let result = classify(&[0.2, 0.8], &mango_labels());

        assert_eq!(
            result,
            Err(ClassificationError::LabelMismatch {
                outputs: 2,
                labels: 8
            })
        );
    }

    #[test]
    fn test_classify_rejects_nan() {
        let mut scores = [0.1; 8];
        scores[2] = f32::NAN;

        assert_eq!(
            classify(&scores, &mango_labels()),
            Err(ClassificationError::NonFinite(2))
        );
    }

    #[test]
    fn test_classify_rejects_logits() {
        let scores = [3.2, -1.0, 0.5, 0.0, 0.0, 7.5, 0.0, 0.0];

        assert!(matches!(
            classify(&scores, &mango_labels()),
            Err(ClassificationError::NotAProbability { index: 0, .. })
        ));
    }

    #[test]
    fn test_prediction_serializes_to_wire_format() {
        let prediction = Prediction {
            class: "Healthy".into(),
            confidence: "92.34".into(),
        };

        let json = serde_json::to_value(&prediction).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"class": "Healthy", "confidence": "92.34"})
        );
    }
}
