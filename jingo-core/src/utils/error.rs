use termcolor::Buffer;
use thiserror::Error;

use crate::{
    lexer::prelude::{LexicalError, LexicalErrorType},
    parser::prelude::ParseError,
    runtime::prelude::RuntimeError,
};
use super::diagnostic::Diagnostic;

#[derive(Debug, Error, Clone)]
pub enum Error {
    #[error("failed to tokenize source code")]
    Lexical(LexicalError),
    #[error("failed to parse source code")]
    Parse(ParseError),
    #[error("evaluation failed")]
    Runtime(RuntimeError),
    #[error("IO operation failed")]
    StdIo {
        err: std::io::ErrorKind
    },
}

impl Error {
    pub fn pretty_string(&self) -> String {
        let mut nocolor = Buffer::no_color();
        self.pretty(&mut nocolor);
        String::from_utf8(nocolor.into_inner()).expect("Error printing produced invalid utf8")
    }

    pub fn pretty(&self, buf: &mut Buffer) {
        use std::io::Write;

        match self.to_diagnostic() {
            Some(diagnostic) => diagnostic.write(buf),
            None => write!(buf, "{self}").expect("write error"),
        }
    }

    pub fn to_diagnostic(&self) -> Option<Diagnostic> {
        match self {
            Error::Lexical(error) => {
                let title = match error.error {
                    LexicalErrorType::IllegalCharacter { .. } => "Illegal Char",
                    LexicalErrorType::ExpectedCharacter { .. } => "Expected Character",
                };

                Some(Diagnostic {
                    title: title.into(),
                    text: error.details(),
                    span: error.span.clone(),
                    traceback: None,
                })
            },
            Error::Parse(error) => Some(Diagnostic {
                title: "Invalid Syntax".into(),
                text: error.details(),
                span: error.span.clone(),
                traceback: None,
            }),
            Error::Runtime(error) => Some(Diagnostic {
                title: "Runtime Error".into(),
                text: error.details(),
                span: error.span.clone(),
                traceback: Some(error.traceback()),
            }),
            Error::StdIo { .. } => None,
        }
    }
}
