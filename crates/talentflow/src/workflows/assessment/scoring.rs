use serde::Serialize;

use super::domain::Response;

/// Bound a reviewer-entered mark to `[0, max]`.
///
/// Anything that is not a finite number scores zero, and a maximum that is itself
/// negative or non-finite collapses the range to zero.
pub fn clamp_mark(raw: f64, max: f64) -> f64 {
    let max = if max.is_finite() { max.max(0.0) } else { 0.0 };
    if !raw.is_finite() {
        return 0.0;
    }
    raw.min(max).max(0.0)
}

/// Aggregate result of one attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttemptSummary {
    pub correct: usize,
    pub incorrect: usize,
    pub partial: usize,
    pub pending_review: usize,
    pub total_score: f64,
    pub total_possible: f64,
    pub percentage: u32,
    pub passed: bool,
}

/// Score an attempt against a passing percentage.
///
/// A response is correct when it earned its full marks, incorrect when it earned
/// nothing, and partial otherwise. An empty attempt scores 0%.
pub fn summarize(responses: &[Response], passing_marks: u8) -> AttemptSummary {
    let mut summary = AttemptSummary {
        correct: 0,
        incorrect: 0,
        partial: 0,
        pending_review: 0,
        total_score: 0.0,
        total_possible: 0.0,
        percentage: 0,
        passed: false,
    };

    for response in responses {
        let awarded = clamp_mark(response.marks_awarded, response.max_marks);
        summary.total_score += awarded;
        summary.total_possible += response.max_marks.max(0.0);

        if response.needs_review {
            summary.pending_review += 1;
        }
        if awarded == response.max_marks {
            summary.correct += 1;
        } else if awarded == 0.0 {
            summary.incorrect += 1;
        } else {
            summary.partial += 1;
        }
    }

    summary.percentage = percentage(summary.total_score, summary.total_possible);
    summary.passed = summary.percentage >= u32::from(passing_marks);
    summary
}

fn percentage(score: f64, possible: f64) -> u32 {
    if possible <= 0.0 {
        return 0;
    }
    (score / possible * 100.0).round().clamp(0.0, 100.0) as u32
}
