use crate::utils::prelude::Span;

#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorType {
    ExpectedExpression,
    ExpectedComparand,
    ExpectedAtom,
    ExpectedIdent,
    ExpectedOperator,
    ExpectedOneOf { expected: Vec<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub error: ParseErrorType,
    pub span: Span
}

impl ParseError {
    pub fn details(&self) -> String {
        match &self.error {
            ParseErrorType::ExpectedExpression => {
                "Expected 'LET', int, float, identifier, '+', '-', '(', '[', \
                 'IF', 'FOR', 'WHILE', 'FUNC' or 'NOT'".to_string()
            },
            ParseErrorType::ExpectedComparand => {
                "Expected int, float, identifier, '+', '-', '(', '[' or 'NOT'".to_string()
            },
            ParseErrorType::ExpectedAtom => {
                "Expected int, float, identifier, '+', '-', '(', '[', \
                 'IF', 'FOR', 'WHILE' or 'FUNC'".to_string()
            },
            ParseErrorType::ExpectedIdent => {
                "Expected identifier".to_string()
            },
            ParseErrorType::ExpectedOperator => {
                "Expected an operator '+', '-', '*' or '/'".to_string()
            },
            ParseErrorType::ExpectedOneOf { expected } => {
                format!("Expected {}", expected.join(" or "))
            }
        }
    }
}

pub fn parse_error<T>(error: ParseErrorType, span: Span) -> Result<T, ParseError> {
    Err(ParseError { error, span })
}
