use crate::lexer::prelude::tokenize;
use super::prelude::{parse, Node, ParseError, ParseErrorType};

fn parse_source(input: &str) -> Result<Node, ParseError> {
    let tokens = tokenize("<test>", input).expect("test source must tokenize");

    parse(tokens)
}

fn parsed_display(input: &str) -> String {
    parse_source(input).expect("test source must parse").to_string()
}

#[test]
fn test_precedence() -> Result<(), ParseError> {
    assert_eq!(parsed_display("1 + 2 * 3"), "(1 + (2 * 3))");
    assert_eq!(parsed_display("1 * 2 + 3"), "((1 * 2) + 3)");
    assert_eq!(parsed_display("(1 + 2) * 3"), "((1 + 2) * 3)");
    assert_eq!(parsed_display("1 + 2 == 4 - 1"), "((1 + 2) == (4 - 1))");
    assert_eq!(parsed_display("1 < 2 AND 3 > 2"), "((1 < 2) AND (3 > 2))");

    Ok(())
}

#[test]
fn test_left_associative_chains() -> Result<(), ParseError> {
    assert_eq!(parsed_display("10 - 4 - 3"), "((10 - 4) - 3)");
    assert_eq!(parsed_display("8 / 2 / 2"), "((8 / 2) / 2)");

    Ok(())
}

#[test]
fn test_power_is_right_associative() -> Result<(), ParseError> {
    assert_eq!(parsed_display("2 ^ 3 ^ 2"), "(2 ^ (3 ^ 2))");

    Ok(())
}

#[test]
fn test_unary_binding() -> Result<(), ParseError> {
    // Unary minus binds tighter than `*` but looser than `^`.
    assert_eq!(parsed_display("-2 ^ 2"), "(- (2 ^ 2))");
    assert_eq!(parsed_display("-2 * 3"), "((- 2) * 3)");
    assert_eq!(parsed_display("NOT 1 == 2"), "(NOT (1 == 2))");
    assert_eq!(parsed_display("+-1"), "(+ (- 1))");

    Ok(())
}

#[test]
fn test_assignment() -> Result<(), ParseError> {
    assert_eq!(parsed_display("LET a = 1 + 2"), "LET a = (1 + 2)");
    assert_eq!(parsed_display("LET a = LET b = 2"), "LET a = LET b = 2");

    Ok(())
}

#[test]
fn test_calls_and_lists() -> Result<(), ParseError> {
    assert_eq!(parsed_display("f(1, 2)"), "f(1, 2)");
    assert_eq!(parsed_display("f()"), "f()");
    assert_eq!(parsed_display("[1, 2, 3]"), "[1, 2, 3]");
    assert_eq!(parsed_display("[]"), "[]");
    assert_eq!(parsed_display("[1, 2] / 0"), "([1, 2] / 0)");

    Ok(())
}

#[test]
fn test_statement_list() -> Result<(), ParseError> {
    let input = "\n\n1 + 1\n\n2 + 2\n\n";

    let node = parse_source(input)?;

    if let Node::Block(block) = &node {
        assert_eq!(block.statements.len(), 2);
    } else {
        panic!("expected a statement list, got {node:?}");
    }

    assert_eq!(node.to_string(), "(1 + 1); (2 + 2)");

    Ok(())
}

#[test]
fn test_if_chain_structure() -> Result<(), ParseError> {
    let node = parse_source("IF 1 THEN 2 ELIF 3 THEN 4 ELSE 5")?;

    let Node::Block(block) = node else {
        panic!("expected a statement list");
    };
    let Node::If(if_) = &block.statements[0] else {
        panic!("expected an if expression, got {:?}", block.statements[0]);
    };

    assert_eq!(if_.cases.len(), 2);
    assert!(if_.cases.iter().all(|case| !case.returns_null));

    let else_case = if_.else_case.as_ref().expect("else case is present");
    assert!(!else_case.returns_null);

    Ok(())
}

#[test]
fn test_block_forms_return_null() -> Result<(), ParseError> {
    let node = parse_source("IF 1 THEN\n2\nEND")?;

    let Node::Block(block) = node else {
        panic!("expected a statement list");
    };
    let Node::If(if_) = &block.statements[0] else {
        panic!("expected an if expression");
    };

    assert!(if_.cases[0].returns_null);

    let node = parse_source("FUNC f()\n1\nEND")?;

    let Node::Block(block) = node else {
        panic!("expected a statement list");
    };
    let Node::FuncDef(func) = &block.statements[0] else {
        panic!("expected a function definition");
    };

    assert!(func.returns_null);
    assert_eq!(func.name.as_deref(), Some("f"));

    Ok(())
}

#[test]
fn test_arrow_function_keeps_value() -> Result<(), ParseError> {
    let node = parse_source("FUNC add(a, b) -> a + b")?;

    let Node::Block(block) = node else {
        panic!("expected a statement list");
    };
    let Node::FuncDef(func) = &block.statements[0] else {
        panic!("expected a function definition");
    };

    assert!(!func.returns_null);
    assert_eq!(func.params, vec!["a".to_string(), "b".to_string()]);

    Ok(())
}

#[test]
fn test_for_with_step() -> Result<(), ParseError> {
    let node = parse_source("FOR i = 0 TO 10 STEP 2 THEN i")?;

    let Node::Block(block) = node else {
        panic!("expected a statement list");
    };
    let Node::For(for_) = &block.statements[0] else {
        panic!("expected a for expression");
    };

    assert_eq!(for_.var_name, "i");
    assert!(for_.step.is_some());
    assert!(!for_.returns_null);

    Ok(())
}

#[test]
fn test_multiline_function_body() -> Result<(), ParseError> {
    let input = "FUNC f(a)\nLET b = a + 1\nb * 2\nEND";

    let node = parse_source(input)?;

    let Node::Block(block) = node else {
        panic!("expected a statement list");
    };
    let Node::FuncDef(func) = &block.statements[0] else {
        panic!("expected a function definition");
    };

    let Node::Block(body) = func.body.as_ref() else {
        panic!("expected a block body");
    };

    assert_eq!(body.statements.len(), 2);

    Ok(())
}

// A failed speculative statement rolls the cursor back, so a terminator
// after blank lines never raises from inside the list itself.
#[test]
fn test_backtracking_stops_at_block_terminator() -> Result<(), ParseError> {
    let input = "WHILE 0 THEN\n1\n\n\nEND";

    parse_source(input)?;

    Ok(())
}

#[test]
fn test_trailing_input_is_an_error() {
    let err = parse_source("1 2").expect_err("trailing input must not parse");

    assert_eq!(err.error, ParseErrorType::ExpectedOperator);
}

#[test]
fn test_shallow_error_only_when_nothing_consumed() {
    // Nothing consumed: the shallow expression-level label wins.
    let err = parse_source(")").expect_err("`)` alone must not parse");
    assert_eq!(err.error, ParseErrorType::ExpectedExpression);

    // `1 +` consumes tokens before failing, so the deeper error survives.
    let err = parse_source("1 +").expect_err("`1 +` must not parse");
    assert_eq!(err.error, ParseErrorType::ExpectedAtom);
}

#[test]
fn test_missing_identifier_after_let() {
    let err = parse_source("LET = 1").expect_err("`LET` needs a name");

    assert_eq!(err.error, ParseErrorType::ExpectedIdent);
}

#[test]
fn test_spans_cover_parsed_text() -> Result<(), ParseError> {
    let node = parse_source("1 + 23")?;

    let Node::Block(block) = &node else {
        panic!("expected a statement list");
    };
    let binary = block.statements[0].location();

    assert_eq!(binary.start.offset, 0);
    assert_eq!(binary.end.offset, 6);

    let node = parse_source("[1, 2]")?;

    let Node::Block(block) = &node else {
        panic!("expected a statement list");
    };
    let list = block.statements[0].location();

    assert_eq!(list.start.offset, 0);
    assert_eq!(list.end.offset, 6);

    Ok(())
}
