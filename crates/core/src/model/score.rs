use serde::Serialize;
use thiserror::Error;

use super::question::{Question, QuestionMode};

/// Errors raised by the scoring engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScoreError {
    /// Collectors reject empty submissions before scoring; the engine still
    /// refuses them rather than divide by zero.
    #[error("cannot score an empty answer set")]
    EmptyAnswerSet,
}

/// Outcome of evaluating one submitted answer set against a question.
///
/// Created fresh on every evaluation and consumed by the feedback sequence;
/// never retained beyond it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult {
    pub score_percentage: f32,
    pub passed: bool,
    pub evaluated_answers: Vec<String>,
}

/// Score a submitted answer set against the question's correctness rules.
///
/// Pure and deterministic: identical inputs always produce identical results.
/// Set-based modes score `correct / submitted * 100`; placement scores all or
/// nothing (partial credit is applied downstream as a progress delta, not as a
/// score).
///
/// # Errors
///
/// Returns `ScoreError::EmptyAnswerSet` if `answers` is empty.
pub fn evaluate(question: &Question, answers: &[String]) -> Result<ScoreResult, ScoreError> {
    if answers.is_empty() {
        return Err(ScoreError::EmptyAnswerSet);
    }

    let score_percentage = match question.mode() {
        QuestionMode::ChoiceSet | QuestionMode::FreeText => {
            let correct = answers
                .iter()
                .filter(|answer| question.is_canonical(answer))
                .count();
            #[allow(clippy::cast_precision_loss)]
            let ratio = correct as f32 / answers.len() as f32;
            ratio * 100.0
        }
        QuestionMode::Placement => {
            if question.is_canonical(&answers[0]) {
                100.0
            } else {
                0.0
            }
        }
    };

    Ok(ScoreResult {
        score_percentage,
        passed: score_percentage >= question.passing_score_percentage(),
        evaluated_answers: answers.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_owned()).collect()
    }

    #[test]
    fn free_text_partial_score_fails_below_threshold() {
        let question = Question::free_text(
            "Name programming languages",
            owned(&["python", "java"]),
            3,
            5,
            false,
            70.0,
        )
        .unwrap();

        let result = evaluate(&question, &owned(&["python", "java", "ruby"])).unwrap();

        assert!((result.score_percentage - 200.0 / 3.0).abs() < 0.01);
        assert!(!result.passed);
        assert_eq!(result.evaluated_answers.len(), 3);
    }

    #[test]
    fn choice_set_counts_correct_selections() {
        let question =
            Question::choice_set("Which are languages?", owned(&["python", "java"]), 70.0).unwrap();

        let result = evaluate(&question, &owned(&["Python", "Excel", "Java"])).unwrap();

        assert!((result.score_percentage - 200.0 / 3.0).abs() < 0.01);
        assert!(!result.passed);
    }

    #[test]
    fn placement_is_all_or_nothing() {
        let question = Question::placement("Place the operation", owned(&["addition"])).unwrap();

        let hit = evaluate(&question, &owned(&["addition"])).unwrap();
        assert!((hit.score_percentage - 100.0).abs() < f32::EPSILON);
        assert!(hit.passed);

        let miss = evaluate(&question, &owned(&["subtraction"])).unwrap();
        assert!(miss.score_percentage.abs() < f32::EPSILON);
        assert!(!miss.passed);
    }

    #[test]
    fn empty_answer_set_is_rejected() {
        let question = Question::choice_set("Pick", owned(&["python"]), 50.0).unwrap();
        assert_eq!(evaluate(&question, &[]), Err(ScoreError::EmptyAnswerSet));
    }

    #[test]
    fn score_stays_within_bounds() {
        let question = Question::free_text("Q", owned(&["a"]), 1, 4, true, 50.0).unwrap();
        for answers in [owned(&["a"]), owned(&["b"]), owned(&["a", "a", "b", "b"])] {
            let result = evaluate(&question, &answers).unwrap();
            assert!((0.0..=100.0).contains(&result.score_percentage));
        }
    }
}
