use std::rc::Rc;

use crate::environment::prelude::Context;
use crate::utils::prelude::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexAction {
    Retrieve,
    Remove,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeErrorKind {
    DivisionByZero,
    IllegalOperation,
    UndefinedVariable { name: String },
    ArityMismatch { name: String, expected: usize, got: usize },
    IndexOutOfRange { index: f64, action: IndexAction },
    NonZeroStepRequired,
    CallDepthExceeded,
    InvalidArgument { message: &'static str },
}

#[derive(Debug, Clone)]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub span: Span,
    pub context: Rc<Context>,
}

impl RuntimeError {
    pub fn new(kind: RuntimeErrorKind, span: Span, context: Rc<Context>) -> Self {
        Self { kind, span, context }
    }

    pub fn details(&self) -> String {
        match &self.kind {
            RuntimeErrorKind::DivisionByZero => {
                "Division By Zero".to_string()
            },
            RuntimeErrorKind::IllegalOperation => {
                "Illegal Operation".to_string()
            },
            RuntimeErrorKind::UndefinedVariable { name } => {
                format!("{name} is not defined ")
            },
            RuntimeErrorKind::ArityMismatch { name, expected, got } => {
                if got > expected {
                    format!("{} too many args passed into '{}' ", got - expected, name)
                } else {
                    format!("{} too few args passed into '{}' ", expected - got, name)
                }
            },
            RuntimeErrorKind::IndexOutOfRange { index, action } => {
                let action = match action {
                    IndexAction::Retrieve => "retrieved",
                    IndexAction::Remove => "removed",
                };

                format!("Element at this index {index} Could not be {action} from the list ")
            },
            RuntimeErrorKind::NonZeroStepRequired => {
                "STEP value must be non zero".to_string()
            },
            RuntimeErrorKind::CallDepthExceeded => {
                "Maximum call depth exceeded".to_string()
            },
            RuntimeErrorKind::InvalidArgument { message } => {
                message.to_string()
            }
        }
    }

    /// Walks the call-site ancestry from the failure outward, oldest frame
    /// first.
    pub fn traceback(&self) -> String {
        let mut result = String::new();
        let mut pos = self.span.start.clone();
        let mut context = Some(self.context.clone());

        while let Some(current) = context {
            result = format!(
                "File:  {}, line {} , in {}\n{}",
                pos.source_name,
                pos.line + 1,
                current.display_name,
                result
            );

            if let Some(entry_pos) = &current.parent_entry_pos {
                pos = entry_pos.clone();
            }

            context = current.parent.clone();
        }

        format!("Traceback (most recent call last ):\n{result}")
    }
}
