//! Complexity Classifier
//!
//! Scores a question from keyword hits, length, question marks and a
//! reasoning-request pattern. Pure: no I/O, no state, same input same class.

use crate::config::ClassifierSettings;
use crate::constants::classifier::{
    COMPLEX_KEYWORD_WEIGHT, LONG_QUESTION_CHARS, REASONING_WEIGHT, SIMPLE_KEYWORD_WEIGHT,
};
use crate::types::ComplexityClass;

/// Score breakdown, kept for diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplexityScore {
    pub complex_hits: Vec<String>,
    pub simple_hits: Vec<String>,
    pub long_question: bool,
    pub multiple_questions: bool,
    pub reasoning_requested: bool,
    pub total: i32,
}

/// Score `text` against the configured keywords and pattern
pub fn score(text: &str, settings: &ClassifierSettings) -> ComplexityScore {
    let lowered = text.to_lowercase();

    let complex_hits: Vec<String> = settings
        .complex_keywords
        .iter()
        .filter(|k| lowered.contains(k.as_str()))
        .cloned()
        .collect();
    let simple_hits: Vec<String> = settings
        .simple_keywords
        .iter()
        .filter(|k| lowered.contains(k.as_str()))
        .cloned()
        .collect();
    let long_question = text.chars().count() > LONG_QUESTION_CHARS;
    let multiple_questions = text.matches('?').count() > 1;
    let reasoning_requested = settings.reasoning_pattern.is_match(&lowered);

    let total = complex_hits.len() as i32 * COMPLEX_KEYWORD_WEIGHT
        - simple_hits.len() as i32 * SIMPLE_KEYWORD_WEIGHT
        + i32::from(long_question)
        + i32::from(multiple_questions)
        + if reasoning_requested { REASONING_WEIGHT } else { 0 };

    ComplexityScore {
        complex_hits,
        simple_hits,
        long_question,
        multiple_questions,
        reasoning_requested,
        total,
    }
}

/// COMPLEX_TEXT when the score reaches the threshold
pub fn classify(text: &str, settings: &ClassifierSettings) -> ComplexityClass {
    class_for(score(text, settings).total, settings.threshold)
}

pub fn class_for(total: i32, threshold: i32) -> ComplexityClass {
    if total >= threshold {
        ComplexityClass::ComplexText
    } else {
        ComplexityClass::SimpleAudio
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::classifier::{DEFAULT_REASONING_PATTERN, DEFAULT_THRESHOLD};
    use proptest::prelude::*;

    fn settings() -> ClassifierSettings {
        ClassifierSettings::new(
            ["pourquoi", "comment", "expliqu", "analyse", "compare", "différence"]
                .map(String::from)
                .to_vec(),
            ["quelle heure", "heure", "quel jour", "date", "météo", "bonjour"]
                .map(String::from)
                .to_vec(),
            DEFAULT_THRESHOLD,
            DEFAULT_REASONING_PATTERN,
        )
        .unwrap()
    }

    #[test]
    fn test_french_analytical_question_is_complex() {
        let settings = settings();
        let question = "Pourquoi le ciel est bleu et comment ça marche ?";
        let breakdown = score(question, &settings);

        assert_eq!(breakdown.complex_hits, vec!["pourquoi", "comment"]);
        assert!(breakdown.reasoning_requested);
        assert_eq!(breakdown.total, 6);
        assert_eq!(classify(question, &settings), ComplexityClass::ComplexText);
    }

    #[test]
    fn test_french_time_question_is_simple() {
        let settings = settings();
        let breakdown = score("Quelle heure est-il ?", &settings);

        assert_eq!(breakdown.simple_hits, vec!["quelle heure", "heure"]);
        assert_eq!(breakdown.total, -2);
        assert_eq!(
            classify("Quelle heure est-il ?", &settings),
            ComplexityClass::SimpleAudio
        );
    }

    #[test]
    fn test_length_and_question_marks() {
        let settings = settings();
        let long = "a".repeat(101);
        assert!(score(&long, &settings).long_question);
        assert!(!score(&"é".repeat(100), &settings).long_question);

        let breakdown = score("Tu vas bien ? Et toi ?", &settings);
        assert!(breakdown.multiple_questions);
        assert_eq!(breakdown.total, 1);
    }

    #[test]
    fn test_threshold_boundary() {
        assert_eq!(class_for(3, 3), ComplexityClass::ComplexText);
        assert_eq!(class_for(2, 3), ComplexityClass::SimpleAudio);
    }

    #[test]
    fn test_empty_question_is_simple() {
        assert_eq!(classify("", &settings()), ComplexityClass::SimpleAudio);
    }

    proptest! {
        #[test]
        fn classification_is_deterministic(text in "\\PC{0,160}") {
            let settings = settings();
            prop_assert_eq!(classify(&text, &settings), classify(&text, &settings));
            prop_assert_eq!(score(&text, &settings), score(&text, &settings));
        }

        #[test]
        fn classification_ignores_case(text in "[a-zA-Z ?]{0,120}") {
            let settings = settings();
            prop_assert_eq!(
                classify(&text.to_uppercase(), &settings),
                classify(&text.to_lowercase(), &settings)
            );
        }
    }
}
