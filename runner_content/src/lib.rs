use std::{fs, path::Path};

use anyhow::Context;
use runner_rhythm::RhythmError;
use runner_schema::Question;
use serde::Deserialize;

/// A question file is either a bare array or `{ "questions": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum QuestionFile {
    List(Vec<Question>),
    Wrapped { questions: Vec<Question> },
}

impl QuestionFile {
    fn into_questions(self) -> Vec<Question> {
        match self {
            QuestionFile::List(questions) | QuestionFile::Wrapped { questions } => questions,
        }
    }
}

/// Every problem found in `questions`, in file order.
///
/// This is the same scan the generator runs before accepting a bank; it
/// refuses only E2001..E2003, while `check` reports every entry.
pub fn validate_questions(questions: &[Question]) -> Vec<RhythmError> {
    runner_rhythm::question_errors(questions)
}

fn checked(questions: Vec<Question>) -> anyhow::Result<Vec<Question>> {
    match validate_questions(&questions).into_iter().next() {
        Some(err) => Err(err.into()),
        None => Ok(questions),
    }
}

/// Parses a question file without validating it.
pub fn parse_questions_json(json: &str) -> anyhow::Result<Vec<Question>> {
    let file: QuestionFile = serde_json::from_str(json).context("failed to parse questions json")?;
    Ok(file.into_questions())
}

pub fn load_questions_json_from_path(path: impl AsRef<Path>) -> anyhow::Result<Vec<Question>> {
    let path = path.as_ref();
    let bytes = fs::read(path).with_context(|| format!("failed to read questions: {}", path.display()))?;
    let file: QuestionFile = serde_json::from_slice(&bytes)
        .with_context(|| format!("failed to parse questions json: {}", path.display()))?;
    checked(file.into_questions()).with_context(|| format!("invalid questions: {}", path.display()))
}

pub fn load_questions_json_from_str(json: &str) -> anyhow::Result<Vec<Question>> {
    checked(parse_questions_json(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO: &str = r#"[
        {
            "id": "capital-fr",
            "question": "Capital of France?",
            "sources": [{ "url": "https://example.org/fr", "passage": "Paris is..." }],
            "answers": [
                { "id": "paris", "label": "Paris", "isCorrect": true },
                { "id": "lyon", "label": "Lyon", "isCorrect": false }
            ]
        },
        {
            "id": "capital-de",
            "question": "Capital of Germany?",
            "answers": [
                { "id": "berlin", "label": "Berlin", "is_correct": true },
                { "id": "bonn", "label": "Bonn", "is_correct": false }
            ]
        }
    ]"#;

    #[test]
    fn loads_bare_array_with_either_casing() {
        let questions = load_questions_json_from_str(TWO).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].sources.len(), 1);
        assert!(questions[1].sources.is_empty());
        assert_eq!(questions[1].correct_answer().unwrap().id, "berlin");
    }

    #[test]
    fn loads_wrapped_object() {
        let json = format!(r#"{{ "questions": {TWO} }}"#);
        let questions = load_questions_json_from_str(&json).unwrap();
        assert_eq!(questions[0].id, "capital-fr");
    }

    #[test]
    fn reports_every_problem() {
        let json = r#"[
            { "id": "a", "question": "?", "answers": [] },
            { "id": "a", "question": "?", "answers": [
                { "id": "x", "label": "X", "isCorrect": false },
                { "id": "x", "label": "X again", "isCorrect": false }
            ] }
        ]"#;
        let questions = parse_questions_json(json).unwrap();
        let errors = validate_questions(&questions);
        let codes: Vec<&str> = errors.iter().map(|e| e.code).collect();
        assert_eq!(codes, vec!["E2002", "E2003", "E2004", "E2005"]);
        assert!(errors.iter().all(|e| e.question_id.as_deref() == Some("a")));

        let err = load_questions_json_from_str(json).unwrap_err();
        assert_eq!(err.to_string(), "E2002: question a has no answers");
    }

    #[test]
    fn too_many_answers_for_the_grid() {
        let answers: Vec<String> = (0..10)
            .map(|i| format!(r#"{{ "id": "a{i}", "label": "{i}", "isCorrect": {} }}"#, i == 0))
            .collect();
        let json = format!(r#"[{{ "id": "big", "question": "?", "answers": [{}] }}]"#, answers.join(","));
        let err = load_questions_json_from_str(&json).unwrap_err();
        let content = err.downcast_ref::<RhythmError>().unwrap();
        assert_eq!(content.code, "E2001");
        assert_eq!(content.to_string(), "E2001: question big has 10 answers; the grid holds 9");
    }

    #[test]
    fn check_and_generator_agree_on_blocking_problems() {
        let json = r#"[
            { "id": "fine", "question": "?", "answers": [{ "id": "x", "label": "X", "isCorrect": true }] },
            { "id": "fine", "question": "?", "answers": [{ "id": "y", "label": "Y", "isCorrect": true }] }
        ]"#;
        let questions = parse_questions_json(json).unwrap();
        let listed = validate_questions(&questions);
        assert_eq!(listed.len(), 1);

        let refused = runner_rhythm::validate_questions(&questions).unwrap_err();
        assert_eq!(refused.code, listed[0].code);
        assert_eq!(refused.to_string(), listed[0].to_string());
        assert_eq!(
            load_questions_json_from_str(json).unwrap_err().to_string(),
            "E2003: duplicate question id: fine"
        );
    }

    #[test]
    fn path_errors_carry_context() {
        let err = load_questions_json_from_path("does/not/exist.json").unwrap_err();
        assert!(err.to_string().starts_with("failed to read questions: "));
    }
}
