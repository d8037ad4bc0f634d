use std::rc::Rc;

use crate::environment::prelude::Context;
use crate::utils::prelude::Span;
use super::error::{RuntimeError, RuntimeErrorKind};
use super::value::{Value, ValueKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Print,
    PrintReturn,
    Input,
    InputInt,
    Clear,
    IsNumber,
    IsString,
    IsList,
    IsFunction,
    Append,
    Pop,
    Extend,
}

/// The fixed set of global function bindings. Every fresh global scope is
/// populated from this table; user assignments shadow entries in that scope
/// without touching the table itself.
pub const BUILTIN_BINDINGS: [(&str, Builtin); 12] = [
    ("PRINT", Builtin::Print),
    ("PRINT_RETURN", Builtin::PrintReturn),
    ("INPUT", Builtin::Input),
    ("INPUT_INT", Builtin::InputInt),
    ("CLEAR", Builtin::Clear),
    ("IS_NUMBER", Builtin::IsNumber),
    ("IS_STRING", Builtin::IsString),
    ("IS_LIST", Builtin::IsList),
    ("IS_FUNCTION", Builtin::IsFunction),
    ("APPEND", Builtin::Append),
    ("POP", Builtin::Pop),
    ("EXTEND", Builtin::Extend),
];

impl Builtin {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Print => "print",
            Self::PrintReturn => "print_return",
            Self::Input => "input",
            Self::InputInt => "input_int",
            Self::Clear => "clear",
            Self::IsNumber => "is_number",
            Self::IsString => "is_string",
            Self::IsList => "is_list",
            Self::IsFunction => "is_function",
            Self::Append => "append",
            Self::Pop => "pop",
            Self::Extend => "extend",
        }
    }

    pub fn params(&self) -> &'static [&'static str] {
        match self {
            Self::Print
            | Self::PrintReturn
            | Self::IsNumber
            | Self::IsString
            | Self::IsList
            | Self::IsFunction => &["value"],
            Self::Input
            | Self::InputInt
            | Self::Clear => &[],
            Self::Append => &["list", "value"],
            Self::Pop => &["list", "index"],
            Self::Extend => &["list1", "list2"],
        }
    }

    /// Runs the native operation inside `context`, whose scope already holds
    /// the arity-checked arguments bound by parameter name.
    pub fn call(&self, context: &Rc<Context>, span: &Span) -> Result<Value, RuntimeError> {
        match self {
            Self::Print => {
                println!("{}", arg(context, "value"));

                Ok(null(span, context))
            },
            Self::PrintReturn => {
                let text = arg(context, "value").to_string();

                Ok(Value::new(ValueKind::Str(text), span.clone(), context.clone()))
            },
            Self::Input => {
                Ok(Value::new(ValueKind::Str(read_line()), span.clone(), context.clone()))
            },
            Self::InputInt => loop {
                let text = read_line();

                match text.parse::<i64>() {
                    Ok(number) => {
                        return Ok(Value::number(number as f64, span.clone(), context.clone()));
                    },
                    Err(_) => println!("{text} must be an integer"),
                }
            },
            Self::Clear => {
                let program = if cfg!(windows) { "cls" } else { "clear" };
                let _ = std::process::Command::new(program).status();

                Ok(null(span, context))
            },
            Self::IsNumber => {
                let is_number = matches!(arg(context, "value").kind, ValueKind::Number(_));

                Ok(bool_value(is_number, span, context))
            },
            Self::IsString => {
                let is_string = matches!(arg(context, "value").kind, ValueKind::Str(_));

                Ok(bool_value(is_string, span, context))
            },
            Self::IsList => {
                let is_list = matches!(arg(context, "value").kind, ValueKind::List(_));

                Ok(bool_value(is_list, span, context))
            },
            Self::IsFunction => {
                let is_function = matches!(
                    arg(context, "value").kind,
                    ValueKind::Function(_) | ValueKind::Builtin(_)
                );

                Ok(bool_value(is_function, span, context))
            },
            Self::Append => {
                let list = arg(context, "list");
                let value = arg(context, "value");

                let ValueKind::List(elements) = &list.kind else {
                    return Err(invalid_argument("First argument must be list", span, context));
                };

                elements.borrow_mut().push(value);

                Ok(null(span, context))
            },
            // The index argument is checked but the removal always takes the
            // last element.
            Self::Pop => {
                let list = arg(context, "list");
                let index = arg(context, "index");

                let ValueKind::List(elements) = &list.kind else {
                    return Err(invalid_argument("First Argument must be a list", span, context));
                };

                if !matches!(index.kind, ValueKind::Number(_)) {
                    return Err(invalid_argument("Second Argument must be a number", span, context));
                }

                let popped = elements.borrow_mut().pop();
                match popped {
                    Some(element) => Ok(element),
                    None => Err(invalid_argument("Indexing Out Of Bound", span, context))
                }
            },
            Self::Extend => {
                let first = arg(context, "list1");
                let second = arg(context, "list2");

                let ValueKind::List(left) = &first.kind else {
                    return Err(invalid_argument("First Argument must be a list", span, context));
                };
                let ValueKind::List(right) = &second.kind else {
                    return Err(invalid_argument("Second Argument must be a list", span, context));
                };

                // Extending a list with itself must not hold two borrows of
                // the same storage.
                if Rc::ptr_eq(left, right) {
                    let elements = left.borrow().clone();
                    left.borrow_mut().extend(elements);
                } else {
                    left.borrow_mut().extend(right.borrow().iter().cloned());
                }

                Ok(null(span, context))
            }
        }
    }
}

fn arg(context: &Rc<Context>, name: &str) -> Value {
    context.scope.borrow().get(name).expect("argument bound by arity check")
}

fn null(span: &Span, context: &Rc<Context>) -> Value {
    Value::number(0.0, span.clone(), context.clone())
}

fn bool_value(value: bool, span: &Span, context: &Rc<Context>) -> Value {
    Value::number(if value { 1.0 } else { 0.0 }, span.clone(), context.clone())
}

fn invalid_argument(message: &'static str, span: &Span, context: &Rc<Context>) -> RuntimeError {
    RuntimeError::new(
        RuntimeErrorKind::InvalidArgument { message },
        span.clone(),
        context.clone()
    )
}

fn read_line() -> String {
    let mut input = String::new();
    let _ = std::io::stdin().read_line(&mut input);

    if let Some('\n') = input.chars().next_back() {
        input.pop();
    }
    if let Some('\r') = input.chars().next_back() {
        input.pop();
    }

    input
}
