use std::collections::HashSet;

use runner_schema::{Question, LANE_COUNT};

use crate::RhythmError;

/// Codes that make a question bank unusable for generation. The others are
/// authoring mistakes a level can still be built around.
const BLOCKING: [&str; 3] = ["E2001", "E2002", "E2003"];

/// Every problem found in `questions`, in file order.
pub fn question_errors(questions: &[Question]) -> Vec<RhythmError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for q in questions {
        if !seen.insert(q.id.as_str()) {
            errors.push(
                RhythmError::new("E2003", format!("duplicate question id: {}", q.id)).with_question(&q.id),
            );
        }
        if q.answers.is_empty() {
            errors.push(
                RhythmError::new("E2002", format!("question {} has no answers", q.id)).with_question(&q.id),
            );
            continue;
        }
        if q.answers.len() > LANE_COUNT {
            errors.push(
                RhythmError::new(
                    "E2001",
                    format!("question {} has {} answers; the grid holds 9", q.id, q.answers.len()),
                )
                .with_question(&q.id),
            );
        }

        let mut answer_ids = HashSet::new();
        for a in &q.answers {
            if !answer_ids.insert(a.id.as_str()) {
                errors.push(
                    RhythmError::new("E2004", format!("question {} repeats answer id {}", q.id, a.id))
                        .with_question(&q.id),
                );
            }
        }
        if q.correct_answer().is_none() {
            errors.push(
                RhythmError::new("E2005", format!("question {} has no correct answer", q.id))
                    .with_question(&q.id),
            );
        }
    }
    errors
}

/// Every question needs at least one answer, at most one per lane, and a
/// unique id. Returns the first violation in file order.
pub fn validate_questions(questions: &[Question]) -> Result<(), RhythmError> {
    match question_errors(questions)
        .into_iter()
        .find(|err| BLOCKING.contains(&err.code))
    {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
