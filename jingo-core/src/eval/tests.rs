use super::{global_context, run, run_in_context};
use crate::lexer::prelude::tokenize;
use crate::runtime::prelude::{IndexAction, RuntimeErrorKind, Value, ValueKind};
use crate::utils::prelude::{render_arrows, Error};

fn eval_program(input: &str) -> Vec<Value> {
    let value = run("<test>", input)
        .expect("program must evaluate")
        .expect("program must produce a value");

    match &value.kind {
        ValueKind::List(values) => values.borrow().clone(),
        other => panic!("expected a statement result list, got {other:?}"),
    }
}

fn last_value(input: &str) -> Value {
    eval_program(input).pop().expect("at least one statement")
}

fn last_number(input: &str) -> f64 {
    last_value(input).as_number().expect("expected a number result")
}

fn runtime_error(input: &str) -> RuntimeErrorKind {
    match run("<test>", input) {
        Err(Error::Runtime(err)) => err.kind,
        other => panic!("expected a runtime error, got {other:?}"),
    }
}

#[test]
fn test_arithmetic_precedence() {
    assert_eq!(last_number("1 + 2 * 3"), 7.0);
    assert_eq!(last_number("(1 + 2) * 3"), 9.0);
    assert_eq!(last_number("10 - 4 - 3"), 3.0);
    assert_eq!(last_number("7 / 2"), 3.5);
    assert_eq!(last_number("2 ^ 3 ^ 2"), 512.0);
    assert_eq!(last_number("-2 ^ 2"), -4.0);
    assert_eq!(last_number("5 * -2"), -10.0);
}

#[test]
fn test_division_by_zero() {
    assert_eq!(runtime_error("1 / 0"), RuntimeErrorKind::DivisionByZero);
    assert_eq!(runtime_error("1 / (2 - 2)"), RuntimeErrorKind::DivisionByZero);
}

#[test]
fn test_and_or_evaluate_both_sides() {
    // No short-circuit: a failing right operand is reached even when the
    // left side already decides the outcome.
    assert_eq!(runtime_error("0 AND 1 / 0"), RuntimeErrorKind::DivisionByZero);
    assert_eq!(runtime_error("1 OR 1 / 0"), RuntimeErrorKind::DivisionByZero);

    assert_eq!(last_number("2 AND 3"), 3.0);
    assert_eq!(last_number("0 AND 3"), 0.0);
    assert_eq!(last_number("2 OR 3"), 2.0);
    assert_eq!(last_number("0 OR 5"), 5.0);
    assert_eq!(last_number("NOT 0"), 1.0);
    assert_eq!(last_number("NOT 5"), 0.0);
}

#[test]
fn test_comparisons() {
    assert_eq!(last_number("1 < 2"), 1.0);
    assert_eq!(last_number("2 <= 1"), 0.0);
    assert_eq!(last_number("2 == 2"), 1.0);
    assert_eq!(last_number("2 != 2"), 0.0);
    assert_eq!(last_number("MATH_PI > 3"), 1.0);
}

#[test]
fn test_variables() {
    assert_eq!(last_number("LET a = 5"), 5.0);
    assert_eq!(last_number("LET a = 5\na + 1"), 6.0);
    assert_eq!(last_number("LET a = 1\nLET a = a + 1\na"), 2.0);

    assert_eq!(
        runtime_error("missing"),
        RuntimeErrorKind::UndefinedVariable { name: "missing".to_string() }
    );
}

#[test]
fn test_global_constants_and_shadowing() {
    assert_eq!(last_number("NULL"), 0.0);
    assert_eq!(last_number("TRUE"), 1.0);
    assert_eq!(last_number("FALSE"), 0.0);
    assert!((last_number("MATH_PI") - std::f64::consts::PI).abs() < f64::EPSILON);

    // Assignment shadows a built-in name in the global scope.
    assert_eq!(last_number("LET TRUE = 5\nTRUE"), 5.0);
}

#[test]
fn test_strings() {
    assert_eq!(last_value(r#""ab" + "cd""#).to_string(), "abcd");
    assert_eq!(last_value(r#""ab" * 3"#).to_string(), "ababab");

    // Unary minus multiplies by -1, which empties a string.
    assert_eq!(last_value(r#"-"ab""#).to_string(), "");

    assert_eq!(
        runtime_error(r#""a" == "a""#),
        RuntimeErrorKind::IllegalOperation
    );
}

#[test]
fn test_list_operator_conventions() {
    assert_eq!(last_number("[1, 2, 3] / 1"), 2.0);
    assert_eq!(last_number("[1, 2, 3] / -1"), 3.0);
    assert_eq!(last_value("[1, 2, 3] - 1").to_string(), "[1, 3 ]");
    assert_eq!(last_value("[1, 2] * [3]").to_string(), "[1, 2, 3 ]");
    assert_eq!(last_value("[1, 2] + 3").to_string(), "[1, 2, 3 ]");

    assert_eq!(
        runtime_error("[1, 2, 3] / 5"),
        RuntimeErrorKind::IndexOutOfRange { index: 5.0, action: IndexAction::Retrieve }
    );
    assert_eq!(
        runtime_error("[1, 2, 3] - 7"),
        RuntimeErrorKind::IndexOutOfRange { index: 7.0, action: IndexAction::Remove }
    );
}

#[test]
fn test_if_forms() {
    assert_eq!(last_number("IF 1 THEN 2 ELSE 3"), 2.0);
    assert_eq!(last_number("IF 0 THEN 2 ELSE 3"), 3.0);
    assert_eq!(last_number("IF 0 THEN 2 ELIF 1 THEN 4 ELSE 5"), 4.0);

    // No truthy case and no else yields null.
    assert_eq!(last_number("IF 0 THEN 2"), 0.0);

    // The block form discards its branch value.
    assert_eq!(last_number("IF 1 THEN\n5\nEND"), 0.0);
}

#[test]
fn test_for_loops() {
    assert_eq!(last_value("FOR i = 1 TO 5 THEN i").to_string(), "[1, 2, 3, 4 ]");
    assert_eq!(last_value("FOR i = 3 TO 0 THEN i").to_string(), "[3, 2, 1 ]");
    assert_eq!(last_value("FOR i = 0 TO 10 STEP 5 THEN i").to_string(), "[0, 5 ]");

    // A degenerate empty range is not an error.
    assert_eq!(last_value("FOR i = 0 TO 0 THEN i").to_string(), "[ ]");

    assert_eq!(
        runtime_error("FOR i = 1 TO 5 STEP 0 THEN i"),
        RuntimeErrorKind::NonZeroStepRequired
    );

    // Block form yields null.
    assert_eq!(last_number("FOR i = 0 TO 3 THEN\ni\nEND"), 0.0);

    // The loop variable stays bound after the loop.
    assert_eq!(last_number("FOR i = 0 TO 3 THEN i\ni"), 3.0);
}

#[test]
fn test_while_loops() {
    let input = "LET i = 0\nWHILE i < 3 THEN LET i = i + 1";
    assert_eq!(last_value(input).to_string(), "[1, 2, 3 ]");

    let input = "LET i = 0\nWHILE i < 3 THEN\nLET i = i + 1\nEND";
    assert_eq!(last_number(input), 0.0);
}

#[test]
fn test_function_forms() {
    assert_eq!(last_number("FUNC add(a, b) -> a + b\nadd(1, 2)"), 3.0);

    // A block-bodied function always returns null, whatever its body
    // computes.
    assert_eq!(last_number("FUNC f()\n1 + 1\nEND\nf()"), 0.0);

    // An anonymous function is a value and can be called in place.
    assert_eq!(last_number("(FUNC (x) -> x * 2)(5)"), 10.0);
}

#[test]
fn test_arity_checking() {
    assert_eq!(
        runtime_error("FUNC f(a) -> a\nf(1, 2)"),
        RuntimeErrorKind::ArityMismatch { name: "f".to_string(), expected: 1, got: 2 }
    );
    assert_eq!(
        runtime_error("FUNC f(a, b) -> a\nf(1)"),
        RuntimeErrorKind::ArityMismatch { name: "f".to_string(), expected: 2, got: 1 }
    );
}

#[test]
fn test_calling_a_non_function() {
    assert_eq!(
        runtime_error("LET a = 1\na(2)"),
        RuntimeErrorKind::IllegalOperation
    );
}

#[test]
fn test_closures_capture_the_defining_scope() {
    // The returned function still sees the outer call's parameter after
    // that call has returned.
    let input = "FUNC make(x) -> FUNC () -> x\nLET f = make(7)\nf()";
    assert_eq!(last_number(input), 7.0);

    // Free names resolve lexically, not through the call site.
    let input = "LET x = 10\nFUNC get() -> x\nFUNC wrapper(x) -> get()\nwrapper(99)";
    assert_eq!(last_number(input), 10.0);
}

#[test]
fn test_assignment_binds_the_innermost_scope() {
    let input = "LET a = 1\nFUNC set() -> LET a = 2\nset()\na";
    assert_eq!(last_number(input), 1.0);
}

#[test]
fn test_recursion() {
    let input = "FUNC fact(n) -> IF n < 2 THEN 1 ELSE n * fact(n - 1)\nfact(5)";
    assert_eq!(last_number(input), 120.0);
}

#[test]
fn test_unbounded_recursion_is_reported() {
    assert_eq!(
        runtime_error("FUNC f() -> f()\nf()"),
        RuntimeErrorKind::CallDepthExceeded
    );
}

#[test]
fn test_type_predicates() {
    assert_eq!(last_number("IS_NUMBER(1)"), 1.0);
    assert_eq!(last_number(r#"IS_NUMBER("x")"#), 0.0);
    assert_eq!(last_number(r#"IS_STRING("x")"#), 1.0);
    assert_eq!(last_number("IS_LIST([])"), 1.0);
    assert_eq!(last_number("IS_FUNCTION(PRINT)"), 1.0);
    assert_eq!(last_number("FUNC f() -> 1\nIS_FUNCTION(f)"), 1.0);
    assert_eq!(last_number("IS_FUNCTION(1)"), 0.0);
}

#[test]
fn test_print_builtins() {
    assert_eq!(last_number("PRINT(123)"), 0.0);

    let value = last_value(r#"PRINT_RETURN("hi")"#);
    assert!(matches!(&value.kind, ValueKind::Str(text) if text == "hi"));

    let value = last_value("PRINT_RETURN([1, 2])");
    assert!(matches!(&value.kind, ValueKind::Str(text) if text == "[1, 2 ]"));
}

#[test]
fn test_append_mutates_in_place() {
    let input = "LET a = [1]\nAPPEND(a, 2)\na";
    assert_eq!(last_value(input).to_string(), "[1, 2 ]");

    // Two bindings of one list share its backing storage.
    let input = "LET a = [1]\nLET b = a\nAPPEND(a, 2)\nb";
    assert_eq!(last_value(input).to_string(), "[1, 2 ]");

    assert_eq!(
        runtime_error("APPEND(1, 2)"),
        RuntimeErrorKind::InvalidArgument { message: "First argument must be list" }
    );
}

#[test]
fn test_pop_ignores_its_index_argument() {
    // The index is arity- and type-checked, yet the last element pops.
    assert_eq!(last_number("LET a = [1, 2]\nPOP(a, 0)"), 2.0);
    assert_eq!(last_value("LET a = [1, 2]\nPOP(a, 0)\na").to_string(), "[1 ]");

    assert_eq!(
        runtime_error("POP([1])"),
        RuntimeErrorKind::ArityMismatch { name: "pop".to_string(), expected: 2, got: 1 }
    );
    assert_eq!(
        runtime_error(r#"POP([1], "x")"#),
        RuntimeErrorKind::InvalidArgument { message: "Second Argument must be a number" }
    );
    assert_eq!(
        runtime_error("POP([], 0)"),
        RuntimeErrorKind::InvalidArgument { message: "Indexing Out Of Bound" }
    );
}

#[test]
fn test_extend() {
    let input = "LET a = [1]\nEXTEND(a, [2, 3])\na";
    assert_eq!(last_value(input).to_string(), "[1, 2, 3 ]");

    let input = "LET a = [1, 2]\nEXTEND(a, a)\na";
    assert_eq!(last_value(input).to_string(), "[1, 2, 1, 2 ]");

    assert_eq!(
        runtime_error("EXTEND([1], 2)"),
        RuntimeErrorKind::InvalidArgument { message: "Second Argument must be a list" }
    );
}

#[test]
fn test_block_result_collects_statement_values() {
    let value = run("<test>", "1 + 1\n2 + 2")
        .expect("program must evaluate")
        .expect("program must produce a value");

    assert_eq!(value.to_string(), "[2, 4 ]");
}

#[test]
fn test_context_persists_across_runs() {
    let context = global_context();

    run_in_context("<stdin>", "LET a = 5", &context).expect("first line evaluates");

    let value = run_in_context("<stdin>", "a + 1", &context)
        .expect("second line evaluates")
        .expect("second line produces a value");

    assert_eq!(value.to_string(), "[6 ]");
}

#[test]
fn test_runtime_error_rendering() {
    let err = run("<test>", "LET x = 1\n1 / 0").expect_err("division fails");
    let rendered = err.pretty_string();

    assert!(rendered.contains("Runtime Error : Division By Zero"));
    assert!(rendered.contains("File <test> , line : 2 column: 4 "));
    assert!(rendered.contains("Traceback (most recent call last ):"));
    assert!(rendered.contains("File:  <test>, line 2 , in <program>"));
    assert!(rendered.contains("1 / 0\n    ^"));
}

#[test]
fn test_traceback_lists_call_frames() {
    let err = run("<test>", "FUNC boom() -> 1 / 0\nboom()").expect_err("call fails");
    let rendered = err.pretty_string();

    let program_frame = rendered.find(", in <program>").expect("program frame listed");
    let boom_frame = rendered.find(", in boom").expect("function frame listed");

    // Oldest frame first.
    assert!(program_frame < boom_frame);
}

#[test]
fn test_lexical_and_syntax_error_rendering() {
    let err = run("<test>", "LET $ = 1").expect_err("illegal character fails");
    let rendered = err.pretty_string();

    assert!(rendered.starts_with("Illegal Char : '$'File <test> , line : 1 column: 4 "));
    assert!(rendered.contains("LET $ = 1\n    ^"));

    let err = run("<test>", "1 +").expect_err("dangling operator fails");
    assert!(err.pretty_string().starts_with("Invalid Syntax : "));
}

// Re-deriving the printed line and column gives back the span's 1-based
// line and 0-based column.
#[test]
fn test_error_position_round_trip() {
    let source = "LET ok = 1\nLET x = missing";

    let err = match run("<test>", source) {
        Err(Error::Runtime(err)) => err,
        other => panic!("expected a runtime error, got {other:?}"),
    };

    let rendered = Error::Runtime(err.clone()).pretty_string();

    let line: u32 = extract_between(&rendered, "line : ", " column")
        .parse()
        .expect("printed line parses");
    let column: u32 = extract_between(&rendered, "column: ", " ")
        .parse()
        .expect("printed column parses");

    assert_eq!(line, err.span.start.line + 1);
    assert_eq!(column, err.span.start.column);
}

fn extract_between<'a>(text: &'a str, prefix: &str, suffix: &str) -> &'a str {
    let start = text.find(prefix).expect("prefix present") + prefix.len();
    let end = text[start..].find(suffix).expect("suffix present") + start;

    &text[start..end]
}

#[test]
fn test_render_arrows_underlines_the_span() {
    let source = "LET a = 1";
    let tokens = tokenize("<test>", source).expect("source tokenizes");

    // The `a` identifier token.
    let (start, _, end) = &tokens[1];

    assert_eq!(render_arrows(source, start, end), "LET a = 1\n    ^");
}
