#[cfg(test)]
mod tests;

use std::cell::RefCell;
use std::rc::Rc;

use crate::{
    environment::prelude::{Context, SymbolTable, MAX_CALL_DEPTH},
    lexer::prelude::tokenize,
    parser::prelude::{
        parse, BinOp, BinaryOp, Block, Call, For, FuncDef, If, ListLiteral,
        Node, UnOp, UnaryOp, VarAccess, VarAssign, While
    },
    runtime::prelude::{
        RuntimeError, RuntimeErrorKind, UserFunction, Value, ValueKind, BUILTIN_BINDINGS
    },
    utils::prelude::{Error, Position, Span},
};

/// Evaluates a whole source text against a fresh global context.
pub fn run(source_name: &str, text: &str) -> Result<Option<Value>, Error> {
    run_in_context(source_name, text, &global_context())
}

/// Evaluates a source text against an existing global context, so callers
/// like the REPL can carry bindings from one run to the next.
pub fn run_in_context(
    source_name: &str,
    text: &str,
    context: &Rc<Context>
) -> Result<Option<Value>, Error> {
    let tokens = tokenize(source_name, text).map_err(Error::Lexical)?;
    let ast = parse(tokens).map_err(Error::Parse)?;

    let value = eval(&ast, context).map_err(Error::Runtime)?;

    Ok(Some(value))
}

/// A fresh outermost frame holding the constants and built-in functions.
pub fn global_context() -> Rc<Context> {
    let context = Context::global("<program>", SymbolTable::new());

    let origin = Position::new("<globals>", "");
    let span = Span::new(origin.clone(), origin);

    {
        let mut scope = context.scope.borrow_mut();

        scope.set("NULL", Value::number(0.0, span.clone(), context.clone()));
        scope.set("TRUE", Value::number(1.0, span.clone(), context.clone()));
        scope.set("FALSE", Value::number(0.0, span.clone(), context.clone()));
        scope.set("MATH_PI", Value::number(std::f64::consts::PI, span.clone(), context.clone()));

        for (name, builtin) in BUILTIN_BINDINGS {
            scope.set(name, Value::new(ValueKind::Builtin(builtin), span.clone(), context.clone()));
        }
    }

    context
}

/// Evaluates one node. The first error unwinds the whole expression; nothing
/// is recoverable below the enclosing call boundary.
pub fn eval(node: &Node, context: &Rc<Context>) -> Result<Value, RuntimeError> {
    match node {
        Node::Number(number) => {
            Ok(Value::number(number.value, number.location.clone(), context.clone()))
        },
        Node::String(string) => {
            Ok(Value::new(
                ValueKind::Str(string.value.clone()),
                string.location.clone(),
                context.clone()
            ))
        },
        Node::VarAccess(access) => eval_var_access(access, context),
        Node::VarAssign(assign) => eval_var_assign(assign, context),
        Node::Binary(binary) => eval_binary(binary, context),
        Node::Unary(unary) => eval_unary(unary, context),
        Node::List(list) => eval_list(list, context),
        Node::If(if_) => eval_if(if_, context),
        Node::For(for_) => eval_for(for_, context),
        Node::While(while_) => eval_while(while_, context),
        Node::FuncDef(func) => eval_func_def(func, context),
        Node::Call(call) => eval_call(call, context),
        Node::Block(block) => eval_block(block, context),
    }
}

fn eval_var_access(access: &VarAccess, context: &Rc<Context>) -> Result<Value, RuntimeError> {
    let value = context.scope.borrow().get(&access.name);

    match value {
        // The copy is re-homed so later error spans point at this use, not
        // at the original definition.
        Some(value) => Ok(value
            .with_span(access.location.clone())
            .with_context(context.clone())),
        None => Err(RuntimeError::new(
            RuntimeErrorKind::UndefinedVariable { name: access.name.clone() },
            access.location.clone(),
            context.clone()
        ))
    }
}

// Assignment always binds into the innermost scope, shadowing instead of
// rebinding an enclosing entry.
fn eval_var_assign(assign: &VarAssign, context: &Rc<Context>) -> Result<Value, RuntimeError> {
    let value = eval(&assign.value, context)?;

    context.scope.borrow_mut().set(&assign.name, value.clone());

    Ok(value)
}

fn eval_binary(binary: &BinaryOp, context: &Rc<Context>) -> Result<Value, RuntimeError> {
    // Both operands always evaluate eagerly, AND/OR included; there is no
    // short-circuit.
    let left = eval(&binary.left, context)?;
    let right = eval(&binary.right, context)?;

    let result = match binary.op {
        BinOp::Add => left.add(&right),
        BinOp::Sub => left.sub(&right),
        BinOp::Mul => left.mul(&right),
        BinOp::Div => left.div(&right),
        BinOp::Pow => left.pow(&right),
        BinOp::Ee => left.eq(&right),
        BinOp::Ne => left.ne(&right),
        BinOp::Lt => left.lt(&right),
        BinOp::Gt => left.gt(&right),
        BinOp::Lte => left.lte(&right),
        BinOp::Gte => left.gte(&right),
        BinOp::And => left.and(&right),
        BinOp::Or => left.or(&right),
    }?;

    Ok(result
        .with_span(binary.location.clone())
        .with_context(context.clone()))
}

fn eval_unary(unary: &UnaryOp, context: &Rc<Context>) -> Result<Value, RuntimeError> {
    let operand = eval(&unary.operand, context)?;

    let result = match unary.op {
        UnOp::Neg => {
            let minus_one = Value::number(-1.0, unary.location.clone(), context.clone());

            operand.mul(&minus_one)?
        },
        UnOp::Pos => operand,
        UnOp::Not => operand.not()?,
    };

    Ok(result.with_span(unary.location.clone()))
}

fn eval_list(list: &ListLiteral, context: &Rc<Context>) -> Result<Value, RuntimeError> {
    let mut elements = vec![];

    for element in &list.elements {
        elements.push(eval(element, context)?);
    }

    Ok(Value::new(
        ValueKind::List(Rc::new(RefCell::new(elements))),
        list.location.clone(),
        context.clone()
    ))
}

// A statement list evaluates to the list of its statements' values; whether
// that list survives or collapses to null is the enclosing construct's call.
fn eval_block(block: &Block, context: &Rc<Context>) -> Result<Value, RuntimeError> {
    let mut values = vec![];

    for statement in &block.statements {
        values.push(eval(statement, context)?);
    }

    Ok(Value::new(
        ValueKind::List(Rc::new(RefCell::new(values))),
        block.location.clone(),
        context.clone()
    ))
}

fn eval_if(if_: &If, context: &Rc<Context>) -> Result<Value, RuntimeError> {
    for case in &if_.cases {
        let condition = eval(&case.condition, context)?;

        if condition.is_true() {
            let value = eval(&case.body, context)?;

            return Ok(if case.returns_null {
                null_value(&if_.location, context)
            } else {
                value
            });
        }
    }

    if let Some(else_case) = &if_.else_case {
        let value = eval(&else_case.body, context)?;

        return Ok(if else_case.returns_null {
            null_value(&if_.location, context)
        } else {
            value
        });
    }

    Ok(null_value(&if_.location, context))
}

fn eval_for(for_: &For, context: &Rc<Context>) -> Result<Value, RuntimeError> {
    let start = expect_number(eval(&for_.start, context)?)?;
    let end = expect_number(eval(&for_.end, context)?)?;

    let step = match &for_.step {
        Some(step) => expect_number(eval(step, context)?)?,
        None => if start <= end { 1.0 } else { -1.0 }
    };

    if step == 0.0 {
        return Err(RuntimeError::new(
            RuntimeErrorKind::NonZeroStepRequired,
            for_.location.clone(),
            context.clone()
        ));
    }

    let mut elements = vec![];
    let mut i = start;

    loop {
        let proceed = if step < 0.0 { i > end } else { i < end };

        if !proceed {
            break;
        }

        // The loop variable is bound before the body runs, but the cursor
        // already advances in between.
        context.scope.borrow_mut().set(
            &for_.var_name,
            Value::number(i, for_.location.clone(), context.clone())
        );
        i += step;

        elements.push(eval(&for_.body, context)?);
    }

    Ok(if for_.returns_null {
        null_value(&for_.location, context)
    } else {
        Value::new(
            ValueKind::List(Rc::new(RefCell::new(elements))),
            for_.location.clone(),
            context.clone()
        )
    })
}

fn eval_while(while_: &While, context: &Rc<Context>) -> Result<Value, RuntimeError> {
    let mut elements = vec![];

    loop {
        let condition = eval(&while_.condition, context)?;

        if !condition.is_true() {
            break;
        }

        elements.push(eval(&while_.body, context)?);
    }

    Ok(if while_.returns_null {
        null_value(&while_.location, context)
    } else {
        Value::new(
            ValueKind::List(Rc::new(RefCell::new(elements))),
            while_.location.clone(),
            context.clone()
        )
    })
}

fn eval_func_def(func: &FuncDef, context: &Rc<Context>) -> Result<Value, RuntimeError> {
    let function = UserFunction {
        name: func.name.clone(),
        params: func.params.clone(),
        body: func.body.clone(),
        returns_null: func.returns_null,
        defining_context: context.clone(),
    };

    let value = Value::new(
        ValueKind::Function(Rc::new(function)),
        func.location.clone(),
        context.clone()
    );

    if let Some(name) = &func.name {
        context.scope.borrow_mut().set(name, value.clone());
    }

    Ok(value)
}

fn eval_call(call: &Call, context: &Rc<Context>) -> Result<Value, RuntimeError> {
    let callee = eval(&call.callee, context)?
        .with_span(call.location.clone())
        .with_context(context.clone());

    let mut args = vec![];

    for arg in &call.args {
        args.push(eval(arg, context)?);
    }

    let result = call_value(&callee, args)?;

    Ok(result
        .with_span(call.location.clone())
        .with_context(context.clone()))
}

/// Invokes a function value already re-homed to its call site. A frame's
/// scope hangs off the *defining* context (closure lookup) while the frame
/// itself hangs off the *call site* (traceback).
pub fn call_value(callee: &Value, args: Vec<Value>) -> Result<Value, RuntimeError> {
    match &callee.kind {
        ValueKind::Function(function) => {
            let exec_context = enter_frame(
                callee,
                function.display_name(),
                &function.defining_context
            )?;

            bind_args(callee, function.display_name(), &function.params, args, &exec_context)?;

            let value = eval(&function.body, &exec_context)?;

            Ok(if function.returns_null {
                null_value(&callee.span, &exec_context)
            } else {
                value
            })
        },
        ValueKind::Builtin(builtin) => {
            let exec_context = enter_frame(callee, builtin.name(), &callee.context)?;

            bind_args(callee, builtin.name(), builtin.params(), args, &exec_context)?;

            builtin.call(&exec_context, &callee.span)
        },
        _ => Err(RuntimeError::new(
            RuntimeErrorKind::IllegalOperation,
            callee.span.clone(),
            callee.context.clone()
        ))
    }
}

fn enter_frame(
    callee: &Value,
    display_name: &str,
    defining_context: &Rc<Context>
) -> Result<Rc<Context>, RuntimeError> {
    let call_site = callee.context.clone();

    if call_site.depth + 1 > MAX_CALL_DEPTH {
        return Err(RuntimeError::new(
            RuntimeErrorKind::CallDepthExceeded,
            callee.span.clone(),
            call_site
        ));
    }

    let scope = SymbolTable::with_parent(defining_context.scope.clone());

    Ok(Context::frame(
        display_name,
        call_site,
        callee.span.start.clone(),
        scope
    ))
}

fn bind_args<S: AsRef<str>>(
    callee: &Value,
    name: &str,
    params: &[S],
    args: Vec<Value>,
    exec_context: &Rc<Context>
) -> Result<(), RuntimeError> {
    if args.len() != params.len() {
        return Err(RuntimeError::new(
            RuntimeErrorKind::ArityMismatch {
                name: name.to_string(),
                expected: params.len(),
                got: args.len(),
            },
            callee.span.clone(),
            callee.context.clone()
        ));
    }

    let mut scope = exec_context.scope.borrow_mut();

    for (param, mut arg) in params.iter().zip(args) {
        arg.set_context(exec_context.clone());
        scope.set(param.as_ref(), arg);
    }

    Ok(())
}

fn expect_number(value: Value) -> Result<f64, RuntimeError> {
    value.as_number().ok_or_else(|| RuntimeError::new(
        RuntimeErrorKind::IllegalOperation,
        value.span.clone(),
        value.context.clone()
    ))
}

fn null_value(span: &Span, context: &Rc<Context>) -> Value {
    Value::number(0.0, span.clone(), context.clone())
}
