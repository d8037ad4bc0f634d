use crate::utils::prelude::Span;

#[derive(Debug, Clone, PartialEq)]
pub enum LexicalErrorType {
    IllegalCharacter { ch: char },
    ExpectedCharacter { expected: char, after: char },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LexicalError {
    pub error: LexicalErrorType,
    pub span: Span
}

impl LexicalError {
    pub fn details(&self) -> String {
        match &self.error {
            LexicalErrorType::IllegalCharacter { ch } => {
                format!("'{}'", ch)
            },
            LexicalErrorType::ExpectedCharacter { expected, after } => {
                format!("' {} ' after ( ' {} ' )", expected, after)
            }
        }
    }
}
