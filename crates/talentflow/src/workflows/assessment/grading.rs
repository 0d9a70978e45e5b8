use std::collections::BTreeSet;

use super::domain::{Answer, Question, QuestionKind};

/// Marks and review flag produced for one answer before any manual review.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoGrade {
    pub marks_awarded: f64,
    pub needs_review: bool,
}

impl AutoGrade {
    fn full(question: &Question) -> Self {
        Self {
            marks_awarded: question.marks,
            needs_review: false,
        }
    }

    fn zero() -> Self {
        Self {
            marks_awarded: 0.0,
            needs_review: false,
        }
    }

    fn review() -> Self {
        Self {
            marks_awarded: 0.0,
            needs_review: true,
        }
    }
}

/// Grade an answer against its question. Unanswered questions score zero.
pub fn auto_grade(question: &Question, answer: Option<&Answer>) -> AutoGrade {
    let Some(answer) = answer else {
        return AutoGrade::zero();
    };

    match (question.kind, answer) {
        (QuestionKind::McqSingle, Answer::Options(selected)) => {
            match (selected.as_slice(), question.correct_options.as_slice()) {
                ([picked], [correct]) if picked == correct => AutoGrade::full(question),
                _ => AutoGrade::zero(),
            }
        }
        (QuestionKind::McqMultiple, Answer::Options(selected)) => {
            let selected: BTreeSet<usize> = selected.iter().copied().collect();
            let correct: BTreeSet<usize> = question.correct_options.iter().copied().collect();
            if !correct.is_empty() && selected == correct {
                AutoGrade::full(question)
            } else {
                AutoGrade::zero()
            }
        }
        (QuestionKind::Text, Answer::Text(text)) => match question.correct_answer.as_deref() {
            Some(expected) if text.trim().eq_ignore_ascii_case(expected.trim()) => {
                AutoGrade::full(question)
            }
            Some(_) => AutoGrade::zero(),
            None => AutoGrade::review(),
        },
        (QuestionKind::Coding, Answer::Text(_)) => AutoGrade::review(),
        _ => AutoGrade::zero(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::assessment::domain::{Difficulty, QuestionId, TestId};

    fn question(kind: QuestionKind, correct_options: Vec<usize>, answer: Option<&str>) -> Question {
        Question {
            id: QuestionId(1),
            test_id: TestId(1),
            kind,
            prompt: "Pick".to_string(),
            options: vec!["a".into(), "b".into(), "c".into()],
            correct_answer: answer.map(str::to_string),
            correct_options,
            marks: 4.0,
            difficulty: Difficulty::Easy,
        }
    }

    #[test]
    fn single_choice_needs_exactly_the_right_option() {
        let q = question(QuestionKind::McqSingle, vec![1], None);
        assert_eq!(auto_grade(&q, Some(&Answer::Options(vec![1]))).marks_awarded, 4.0);
        assert_eq!(auto_grade(&q, Some(&Answer::Options(vec![1, 2]))).marks_awarded, 0.0);
        assert_eq!(auto_grade(&q, Some(&Answer::Options(vec![0]))).marks_awarded, 0.0);
    }

    #[test]
    fn multiple_choice_compares_sets() {
        let q = question(QuestionKind::McqMultiple, vec![0, 2], None);
        assert_eq!(
            auto_grade(&q, Some(&Answer::Options(vec![2, 0, 2]))).marks_awarded,
            4.0
        );
        assert_eq!(auto_grade(&q, Some(&Answer::Options(vec![0]))).marks_awarded, 0.0);
    }

    #[test]
    fn text_without_key_goes_to_review() {
        let keyed = question(QuestionKind::Text, vec![], Some("Ownership"));
        assert_eq!(
            auto_grade(&keyed, Some(&Answer::Text("  ownership ".into()))).marks_awarded,
            4.0
        );

        let open = question(QuestionKind::Text, vec![], None);
        let grade = auto_grade(&open, Some(&Answer::Text("borrowing".into())));
        assert!(grade.needs_review);
        assert_eq!(grade.marks_awarded, 0.0);
    }

    #[test]
    fn coding_is_always_reviewed_and_blanks_score_zero() {
        let coding = question(QuestionKind::Coding, vec![], None);
        assert!(auto_grade(&coding, Some(&Answer::Text("fn main() {}".into()))).needs_review);
        assert_eq!(auto_grade(&coding, None), AutoGrade::zero());
    }

    #[test]
    fn mismatched_answer_shapes_score_zero() {
        let q = question(QuestionKind::McqSingle, vec![0], None);
        assert_eq!(auto_grade(&q, Some(&Answer::Text("a".into()))), AutoGrade::zero());
    }
}
