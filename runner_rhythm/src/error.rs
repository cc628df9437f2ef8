use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RhythmErrorKind {
    Config,
    Content,
}

impl RhythmErrorKind {
    pub(crate) fn from_code(code: &'static str) -> Self {
        match code {
            // Config
            "E1001" | "E1002" | "E1003" | "E1004" | "E1005" | "E1006" | "E1007" | "E1008" => Self::Config,

            // Content
            "E2001" | "E2002" | "E2003" | "E2004" | "E2005" => Self::Content,

            _ => Self::Config,
        }
    }
}

#[derive(Debug, Error, Clone)]
#[error("{code}: {message}")]
pub struct RhythmError {
    pub code: &'static str,
    pub kind: RhythmErrorKind,
    pub message: String,

    pub question_id: Option<String>,
    pub field: Option<&'static str>,
}

impl RhythmError {
    pub(crate) fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            kind: RhythmErrorKind::from_code(code),
            message: message.into(),

            question_id: None,
            field: None,
        }
    }

    pub fn with_question(mut self, question_id: impl Into<String>) -> Self {
        self.question_id = Some(question_id.into());
        self
    }

    pub fn with_field(mut self, field: &'static str) -> Self {
        self.field = Some(field);
        self
    }
}
