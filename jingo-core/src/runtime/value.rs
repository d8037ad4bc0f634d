use std::cell::RefCell;
use std::fmt::Display;
use std::rc::Rc;

use crate::environment::prelude::Context;
use crate::utils::prelude::Span;
use super::builtins::Builtin;
use super::error::{IndexAction, RuntimeError, RuntimeErrorKind};
use super::function::UserFunction;

/// A runtime value. The span and context record where it was produced or
/// most recently re-homed; they feed error attribution only, never name
/// resolution.
#[derive(Debug, Clone)]
pub struct Value {
    pub kind: ValueKind,
    pub span: Span,
    pub context: Rc<Context>,
}

#[derive(Debug, Clone)]
pub enum ValueKind {
    Number(f64),
    Str(String),
    List(Rc<RefCell<Vec<Value>>>),
    Function(Rc<UserFunction>),
    Builtin(Builtin),
}

impl Value {
    pub fn new(kind: ValueKind, span: Span, context: Rc<Context>) -> Self {
        Self { kind, span, context }
    }

    pub fn number(value: f64, span: Span, context: Rc<Context>) -> Self {
        Self::new(ValueKind::Number(value), span, context)
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn with_context(mut self, context: Rc<Context>) -> Self {
        self.context = context;
        self
    }

    pub fn set_context(&mut self, context: Rc<Context>) {
        self.context = context;
    }

    pub fn as_number(&self) -> Option<f64> {
        match self.kind {
            ValueKind::Number(value) => Some(value),
            _ => None
        }
    }

    pub fn is_true(&self) -> bool {
        match &self.kind {
            ValueKind::Number(value) => *value != 0.0,
            ValueKind::Str(value) => !value.is_empty(),
            ValueKind::List(_) | ValueKind::Function(_) | ValueKind::Builtin(_) => false,
        }
    }

    // Derived values keep this value's stamps until the evaluator re-homes
    // them to the producing node.
    fn derive(&self, kind: ValueKind) -> Value {
        Value::new(kind, self.span.clone(), self.context.clone())
    }

    fn derive_number(&self, value: f64) -> Value {
        self.derive(ValueKind::Number(value))
    }

    fn derive_bool(&self, value: bool) -> Value {
        self.derive_number(if value { 1.0 } else { 0.0 })
    }

    fn illegal_operation(&self, other: &Value) -> RuntimeError {
        RuntimeError::new(
            RuntimeErrorKind::IllegalOperation,
            Span::new(self.span.start.clone(), other.span.end.clone()),
            self.context.clone()
        )
    }

    fn illegal_unary_operation(&self) -> RuntimeError {
        RuntimeError::new(
            RuntimeErrorKind::IllegalOperation,
            self.span.clone(),
            self.context.clone()
        )
    }

    pub fn add(&self, other: &Value) -> Result<Value, RuntimeError> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(left), ValueKind::Number(right)) => {
                Ok(self.derive_number(left + right))
            },
            (ValueKind::Str(left), ValueKind::Str(right)) => {
                Ok(self.derive(ValueKind::Str(format!("{left}{right}"))))
            },
            // Appending never touches the left operand's backing storage;
            // the new list shares element values, not the storage itself.
            (ValueKind::List(elements), _) => {
                let mut elements = elements.borrow().clone();
                elements.push(other.clone());

                Ok(self.derive(ValueKind::List(Rc::new(RefCell::new(elements)))))
            },
            _ => Err(self.illegal_operation(other))
        }
    }

    pub fn sub(&self, other: &Value) -> Result<Value, RuntimeError> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(left), ValueKind::Number(right)) => {
                Ok(self.derive_number(left - right))
            },
            (ValueKind::List(elements), ValueKind::Number(index)) => {
                let mut elements = elements.borrow().clone();

                match resolve_index(elements.len(), *index) {
                    Some(resolved) => {
                        elements.remove(resolved);

                        Ok(self.derive(ValueKind::List(Rc::new(RefCell::new(elements)))))
                    },
                    None => Err(RuntimeError::new(
                        RuntimeErrorKind::IndexOutOfRange {
                            index: *index,
                            action: IndexAction::Remove,
                        },
                        other.span.clone(),
                        self.context.clone()
                    ))
                }
            },
            _ => Err(self.illegal_operation(other))
        }
    }

    pub fn mul(&self, other: &Value) -> Result<Value, RuntimeError> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(left), ValueKind::Number(right)) => {
                Ok(self.derive_number(left * right))
            },
            (ValueKind::Str(value), ValueKind::Number(count)) => {
                if count.fract() != 0.0 {
                    return Err(self.illegal_operation(other));
                }

                let count = (*count).max(0.0) as usize;

                Ok(self.derive(ValueKind::Str(value.repeat(count))))
            },
            (ValueKind::List(left), ValueKind::List(right)) => {
                let mut elements = left.borrow().clone();
                elements.extend(right.borrow().iter().cloned());

                Ok(self.derive(ValueKind::List(Rc::new(RefCell::new(elements)))))
            },
            _ => Err(self.illegal_operation(other))
        }
    }

    pub fn div(&self, other: &Value) -> Result<Value, RuntimeError> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(left), ValueKind::Number(right)) => {
                if *right == 0.0 {
                    return Err(RuntimeError::new(
                        RuntimeErrorKind::DivisionByZero,
                        other.span.clone(),
                        self.context.clone()
                    ));
                }

                Ok(self.derive_number(left / right))
            },
            // Division against a number subscripts the list; the element
            // keeps its own stamps.
            (ValueKind::List(elements), ValueKind::Number(index)) => {
                let elements = elements.borrow();

                match resolve_index(elements.len(), *index) {
                    Some(resolved) => Ok(elements[resolved].clone()),
                    None => Err(RuntimeError::new(
                        RuntimeErrorKind::IndexOutOfRange {
                            index: *index,
                            action: IndexAction::Retrieve,
                        },
                        other.span.clone(),
                        self.context.clone()
                    ))
                }
            },
            _ => Err(self.illegal_operation(other))
        }
    }

    pub fn pow(&self, other: &Value) -> Result<Value, RuntimeError> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(left), ValueKind::Number(right)) => {
                Ok(self.derive_number(left.powf(*right)))
            },
            _ => Err(self.illegal_operation(other))
        }
    }

    pub fn eq(&self, other: &Value) -> Result<Value, RuntimeError> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(left), ValueKind::Number(right)) => {
                Ok(self.derive_bool(left == right))
            },
            _ => Err(self.illegal_operation(other))
        }
    }

    pub fn ne(&self, other: &Value) -> Result<Value, RuntimeError> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(left), ValueKind::Number(right)) => {
                Ok(self.derive_bool(left != right))
            },
            _ => Err(self.illegal_operation(other))
        }
    }

    pub fn lt(&self, other: &Value) -> Result<Value, RuntimeError> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(left), ValueKind::Number(right)) => {
                Ok(self.derive_bool(left < right))
            },
            _ => Err(self.illegal_operation(other))
        }
    }

    pub fn lte(&self, other: &Value) -> Result<Value, RuntimeError> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(left), ValueKind::Number(right)) => {
                Ok(self.derive_bool(left <= right))
            },
            _ => Err(self.illegal_operation(other))
        }
    }

    pub fn gt(&self, other: &Value) -> Result<Value, RuntimeError> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(left), ValueKind::Number(right)) => {
                Ok(self.derive_bool(left > right))
            },
            _ => Err(self.illegal_operation(other))
        }
    }

    pub fn gte(&self, other: &Value) -> Result<Value, RuntimeError> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(left), ValueKind::Number(right)) => {
                Ok(self.derive_bool(left >= right))
            },
            _ => Err(self.illegal_operation(other))
        }
    }

    // AND and OR pick an operand by the left side's truthiness and truncate
    // it toward zero.
    pub fn and(&self, other: &Value) -> Result<Value, RuntimeError> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(left), ValueKind::Number(right)) => {
                let picked = if *left != 0.0 { *right } else { *left };

                Ok(self.derive_number(picked.trunc()))
            },
            _ => Err(self.illegal_operation(other))
        }
    }

    pub fn or(&self, other: &Value) -> Result<Value, RuntimeError> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(left), ValueKind::Number(right)) => {
                let picked = if *left != 0.0 { *left } else { *right };

                Ok(self.derive_number(picked.trunc()))
            },
            _ => Err(self.illegal_operation(other))
        }
    }

    pub fn not(&self) -> Result<Value, RuntimeError> {
        match self.kind {
            ValueKind::Number(value) => {
                Ok(self.derive_number(if value == 0.0 { 1.0 } else { 0.0 }))
            },
            _ => Err(self.illegal_unary_operation())
        }
    }
}

// A negative index counts from the end of the list; a fractional one
// truncates toward zero.
fn resolve_index(len: usize, index: f64) -> Option<usize> {
    let index = index.trunc() as i64;
    let resolved = if index < 0 { index + len as i64 } else { index };

    if resolved >= 0 && (resolved as usize) < len {
        Some(resolved as usize)
    } else {
        None
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ValueKind::Number(value) => write!(f, "{value}"),
            ValueKind::Str(value) => write!(f, "{value}"),
            ValueKind::List(elements) => {
                let elements = elements.borrow().iter()
                    .map(|element| element.to_string())
                    .collect::<Vec<String>>();

                write!(f, "[{} ]", elements.join(", "))
            },
            ValueKind::Function(function) => {
                write!(f, "<Function {}>", function.display_name())
            },
            ValueKind::Builtin(builtin) => {
                write!(f, "<built-in function {}>", builtin.name())
            }
        }
    }
}
