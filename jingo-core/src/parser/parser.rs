use std::rc::Rc;

use crate::{lexer::prelude::{Spanned, Token}, utils::prelude::{Position, Span}};
use super::ast::*;
use super::error::{parse_error, ParseError, ParseErrorType};

/// Parses a token sequence (as produced by `lexer::tokenize`) into one AST
/// root. The cursor must land exactly on the EOF token; trailing input is a
/// syntax error rather than silently discarded.
pub fn parse(tokens: Vec<Spanned>) -> Result<Node, ParseError> {
    Parser::new(tokens).parse()
}

pub struct Parser {
    tokens: Vec<Spanned>,
    index: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Spanned>) -> Self {
        Self { tokens, index: 0 }
    }

    fn current(&self) -> &Spanned {
        &self.tokens[self.index]
    }

    fn current_token(&self) -> &Token {
        &self.tokens[self.index].1
    }

    fn current_span(&self) -> Span {
        let (start, _, end) = self.current();

        Span::new(start.clone(), end.clone())
    }

    fn advance(&mut self) {
        // The trailing EOF token is never stepped past.
        if self.index + 1 < self.tokens.len() {
            self.index += 1;
        }
    }

    fn expect(&mut self, token: Token) -> Result<(Position, Position), ParseError> {
        if self.current_token() == &token {
            let start = self.current().0.clone();
            let end = self.current().2.clone();
            self.advance();

            Ok((start, end))
        } else {
            parse_error(
                ParseErrorType::ExpectedOneOf {
                    expected: vec![format!("'{}'", token.as_literal())]
                },
                self.current_span()
            )
        }
    }

    fn expect_ident(&mut self) -> Result<(Position, String, Position), ParseError> {
        if let (start, Token::Ident(name), end) = self.current().clone() {
            self.advance();

            Ok((start, name, end))
        } else {
            parse_error(ParseErrorType::ExpectedIdent, self.current_span())
        }
    }

    /// A failed sub-parse may only be relabelled with a shallow "expected"
    /// error when it consumed no tokens; a deeper error always survives.
    fn relabel_if_unconsumed(
        &self,
        result: Result<Node, ParseError>,
        start_index: usize,
        error: ParseErrorType
    ) -> Result<Node, ParseError> {
        match result {
            Err(_) if self.index == start_index => parse_error(error, self.current_span()),
            other => other
        }
    }

    pub fn parse(&mut self) -> Result<Node, ParseError> {
        let node = self.statements()?;

        if !matches!(self.current_token(), Token::Eof) {
            return parse_error(ParseErrorType::ExpectedOperator, self.current_span());
        }

        Ok(node)
    }

    // statements -> expr {NEWLINE+ expr}
    fn statements(&mut self) -> Result<Node, ParseError> {
        let pos_start = self.current().0.clone();
        let mut statements = vec![];

        while matches!(self.current_token(), Token::Newline) {
            self.advance();
        }

        statements.push(self.expr()?);

        loop {
            let mut newline_count = 0;

            while matches!(self.current_token(), Token::Newline) {
                self.advance();
                newline_count += 1;
            }

            if newline_count == 0 {
                break;
            }

            // Speculative attempt: on failure the cursor is restored and
            // statement collection simply stops, so a block terminator or
            // trailing blank lines never raise here.
            let snapshot = self.index;

            match self.expr() {
                Ok(statement) => statements.push(statement),
                Err(_) => {
                    self.index = snapshot;
                    break;
                }
            }
        }

        let location = Span::new(pos_start, self.current().2.clone());

        Ok(Node::Block(Block { statements, location }))
    }

    // expr -> LET IDENT = expr | comp_expr {(AND | OR) comp_expr}
    fn expr(&mut self) -> Result<Node, ParseError> {
        if matches!(self.current_token(), Token::Let) {
            self.advance();

            let (name_start, name, _) = self.expect_ident()?;
            self.expect(Token::Eq)?;

            let value = self.expr()?;
            let location = Span::new(name_start, value.location().end.clone());

            return Ok(Node::VarAssign(VarAssign {
                name,
                value: Box::new(value),
                location,
            }));
        }

        let start_index = self.index;
        let result = self.or_chain();

        self.relabel_if_unconsumed(result, start_index, ParseErrorType::ExpectedExpression)
    }

    fn or_chain(&mut self) -> Result<Node, ParseError> {
        let mut left = self.comp_expr()?;

        loop {
            let op = match self.current_token() {
                Token::And => BinOp::And,
                Token::Or => BinOp::Or,
                _ => break
            };

            self.advance();
            let right = self.comp_expr()?;
            left = Node::binary(left, op, right);
        }

        Ok(left)
    }

    // comp_expr -> NOT comp_expr | arith_expr {(== | != | < | > | <= | >=) arith_expr}
    fn comp_expr(&mut self) -> Result<Node, ParseError> {
        if matches!(self.current_token(), Token::Not) {
            let op_start = self.current().0.clone();
            self.advance();

            let operand = self.comp_expr()?;
            let location = Span::new(op_start, operand.location().end.clone());

            return Ok(Node::Unary(UnaryOp {
                op: UnOp::Not,
                operand: Box::new(operand),
                location,
            }));
        }

        let start_index = self.index;
        let result = self.compare_chain();

        self.relabel_if_unconsumed(result, start_index, ParseErrorType::ExpectedComparand)
    }

    fn compare_chain(&mut self) -> Result<Node, ParseError> {
        let mut left = self.arith_expr()?;

        loop {
            let op = match self.current_token() {
                Token::Ee => BinOp::Ee,
                Token::Ne => BinOp::Ne,
                Token::Lt => BinOp::Lt,
                Token::Gt => BinOp::Gt,
                Token::Lte => BinOp::Lte,
                Token::Gte => BinOp::Gte,
                _ => break
            };

            self.advance();
            let right = self.arith_expr()?;
            left = Node::binary(left, op, right);
        }

        Ok(left)
    }

    // arith_expr -> term {(+ | -) term}
    fn arith_expr(&mut self) -> Result<Node, ParseError> {
        let mut left = self.term()?;

        loop {
            let op = match self.current_token() {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                _ => break
            };

            self.advance();
            let right = self.term()?;
            left = Node::binary(left, op, right);
        }

        Ok(left)
    }

    // term -> factor {(* | /) factor}
    fn term(&mut self) -> Result<Node, ParseError> {
        let mut left = self.factor()?;

        loop {
            let op = match self.current_token() {
                Token::Mul => BinOp::Mul,
                Token::Div => BinOp::Div,
                _ => break
            };

            self.advance();
            let right = self.factor()?;
            left = Node::binary(left, op, right);
        }

        Ok(left)
    }

    // factor -> (+ | -) factor | power
    fn factor(&mut self) -> Result<Node, ParseError> {
        let op = match self.current_token() {
            Token::Plus => Some(UnOp::Pos),
            Token::Minus => Some(UnOp::Neg),
            _ => None
        };

        if let Some(op) = op {
            let op_start = self.current().0.clone();
            self.advance();

            let operand = self.factor()?;
            let location = Span::new(op_start, operand.location().end.clone());

            return Ok(Node::Unary(UnaryOp {
                op,
                operand: Box::new(operand),
                location,
            }));
        }

        self.power()
    }

    // power -> call {^ factor}; the factor right operand makes `^`
    // right-associative.
    fn power(&mut self) -> Result<Node, ParseError> {
        let mut left = self.call()?;

        while matches!(self.current_token(), Token::Pow) {
            self.advance();
            let right = self.factor()?;
            left = Node::binary(left, BinOp::Pow, right);
        }

        Ok(left)
    }

    // call -> atom [( [expr {, expr}] )]
    fn call(&mut self) -> Result<Node, ParseError> {
        let atom = self.atom()?;

        if !matches!(self.current_token(), Token::LParen) {
            return Ok(atom);
        }

        self.advance();

        let mut args = vec![];

        if matches!(self.current_token(), Token::RParen) {
            self.advance();
        } else {
            args.push(self.expr()?);

            while matches!(self.current_token(), Token::Comma) {
                self.advance();
                args.push(self.expr()?);
            }

            if !matches!(self.current_token(), Token::RParen) {
                return parse_error(
                    ParseErrorType::ExpectedOneOf { expected: vec!["','".into(), "')'".into()] },
                    self.current_span()
                );
            }

            self.advance();
        }

        let end = args.last()
            .map(|arg| arg.location().end.clone())
            .unwrap_or_else(|| atom.location().end.clone());
        let location = Span::new(atom.location().start.clone(), end);

        Ok(Node::Call(Call {
            callee: Box::new(atom),
            args,
            location,
        }))
    }

    // atom -> literal | identifier | ( expr ) | list | if | for | while | func
    fn atom(&mut self) -> Result<Node, ParseError> {
        let (start, token, end) = self.current().clone();
        let location = Span::new(start, end);

        match token {
            Token::Int(value) => {
                self.advance();

                Ok(Node::Number(NumberLiteral { value: value as f64, location }))
            },
            Token::Float(value) => {
                self.advance();

                Ok(Node::Number(NumberLiteral { value, location }))
            },
            Token::Str(value) => {
                self.advance();

                Ok(Node::String(StringLiteral { value, location }))
            },
            Token::Ident(name) => {
                self.advance();

                Ok(Node::VarAccess(VarAccess { name, location }))
            },
            Token::LParen => {
                self.advance();
                let expr = self.expr()?;

                if !matches!(self.current_token(), Token::RParen) {
                    return parse_error(
                        ParseErrorType::ExpectedOneOf { expected: vec!["')'".into()] },
                        self.current_span()
                    );
                }

                self.advance();

                Ok(expr)
            },
            Token::LSquare => self.list_expr(),
            Token::If => self.if_expr(),
            Token::For => self.for_expr(),
            Token::While => self.while_expr(),
            Token::Func => self.func_def(),
            _ => parse_error(ParseErrorType::ExpectedAtom, location)
        }
    }

    // list -> [ [expr {, expr}] ]
    fn list_expr(&mut self) -> Result<Node, ParseError> {
        let (pos_start, _) = self.expect(Token::LSquare)?;
        let mut elements = vec![];

        if matches!(self.current_token(), Token::RSquare) {
            let end = self.current().2.clone();
            self.advance();

            return Ok(Node::List(ListLiteral {
                elements,
                location: Span::new(pos_start, end),
            }));
        }

        elements.push(self.expr()?);

        while matches!(self.current_token(), Token::Comma) {
            self.advance();
            elements.push(self.expr()?);
        }

        if !matches!(self.current_token(), Token::RSquare) {
            return parse_error(
                ParseErrorType::ExpectedOneOf { expected: vec!["','".into(), "']'".into()] },
                self.current_span()
            );
        }

        let end = self.current().2.clone();
        self.advance();

        Ok(Node::List(ListLiteral {
            elements,
            location: Span::new(pos_start, end),
        }))
    }

    fn if_expr(&mut self) -> Result<Node, ParseError> {
        let (cases, else_case) = self.if_cases(Token::If)?;

        let start = cases[0].condition.location().start.clone();
        let end = match &else_case {
            Some(else_case) => else_case.body.location().end.clone(),
            None => cases[cases.len() - 1].body.location().end.clone()
        };

        Ok(Node::If(If {
            cases,
            else_case,
            location: Span::new(start, end),
        }))
    }

    // Parses one IF/ELIF clause plus everything it chains onto.
    fn if_cases(&mut self, keyword: Token) -> Result<(Vec<IfCase>, Option<Box<ElseCase>>), ParseError> {
        self.expect(keyword)?;

        let condition = self.expr()?;
        self.expect(Token::Then)?;

        let mut cases = vec![];

        if matches!(self.current_token(), Token::Newline) {
            self.advance();

            let body = self.statements()?;
            cases.push(IfCase { condition, body, returns_null: true });

            // END closes the chain right here; otherwise ELIF/ELSE may
            // continue it.
            if matches!(self.current_token(), Token::End) {
                self.advance();

                return Ok((cases, None));
            }

            let (more_cases, else_case) = self.elif_or_else()?;
            cases.extend(more_cases);

            Ok((cases, else_case))
        } else {
            let body = self.expr()?;
            cases.push(IfCase { condition, body, returns_null: false });

            let (more_cases, else_case) = self.elif_or_else()?;
            cases.extend(more_cases);

            Ok((cases, else_case))
        }
    }

    fn elif_or_else(&mut self) -> Result<(Vec<IfCase>, Option<Box<ElseCase>>), ParseError> {
        if matches!(self.current_token(), Token::Elif) {
            self.if_cases(Token::Elif)
        } else {
            Ok((vec![], self.else_case()?))
        }
    }

    fn else_case(&mut self) -> Result<Option<Box<ElseCase>>, ParseError> {
        if !matches!(self.current_token(), Token::Else) {
            return Ok(None);
        }

        self.advance();

        if matches!(self.current_token(), Token::Newline) {
            self.advance();

            let body = self.statements()?;
            self.expect(Token::End)?;

            Ok(Some(Box::new(ElseCase { body, returns_null: true })))
        } else {
            let body = self.expr()?;

            Ok(Some(Box::new(ElseCase { body, returns_null: false })))
        }
    }

    fn for_expr(&mut self) -> Result<Node, ParseError> {
        self.expect(Token::For)?;

        let (var_start, var_name, _) = self.expect_ident()?;
        self.expect(Token::Eq)?;

        let start = self.expr()?;
        self.expect(Token::To)?;
        let end = self.expr()?;

        let step = if matches!(self.current_token(), Token::Step) {
            self.advance();

            Some(Box::new(self.expr()?))
        } else {
            None
        };

        self.expect(Token::Then)?;

        let (body, returns_null) = self.loop_body()?;
        let location = Span::new(var_start, body.location().end.clone());

        Ok(Node::For(For {
            var_name,
            start: Box::new(start),
            end: Box::new(end),
            step,
            body: Box::new(body),
            returns_null,
            location,
        }))
    }

    fn while_expr(&mut self) -> Result<Node, ParseError> {
        self.expect(Token::While)?;

        let condition = self.expr()?;
        self.expect(Token::Then)?;

        let (body, returns_null) = self.loop_body()?;
        let location = Span::new(condition.location().start.clone(), body.location().end.clone());

        Ok(Node::While(While {
            condition: Box::new(condition),
            body: Box::new(body),
            returns_null,
            location,
        }))
    }

    // Either a single-line body or a newline-led block closed by END.
    fn loop_body(&mut self) -> Result<(Node, bool), ParseError> {
        if matches!(self.current_token(), Token::Newline) {
            self.advance();

            let body = self.statements()?;
            self.expect(Token::End)?;

            Ok((body, true))
        } else {
            Ok((self.expr()?, false))
        }
    }

    fn func_def(&mut self) -> Result<Node, ParseError> {
        let (func_start, _) = self.expect(Token::Func)?;

        let name = if let Token::Ident(_) = self.current_token() {
            let (_, name, _) = self.expect_ident()?;

            Some(name)
        } else {
            None
        };

        if name.is_some() {
            self.expect(Token::LParen)?;
        } else if matches!(self.current_token(), Token::LParen) {
            self.advance();
        } else {
            return parse_error(
                ParseErrorType::ExpectedOneOf { expected: vec!["identifier".into(), "'('".into()] },
                self.current_span()
            );
        }

        let mut params = vec![];

        if let Token::Ident(_) = self.current_token() {
            let (_, param, _) = self.expect_ident()?;
            params.push(param);

            while matches!(self.current_token(), Token::Comma) {
                self.advance();

                let (_, param, _) = self.expect_ident()?;
                params.push(param);
            }
        }

        if !matches!(self.current_token(), Token::RParen) {
            let expected = if params.is_empty() {
                vec!["identifier".into(), "')'".into()]
            } else {
                vec!["','".into(), "')'".into()]
            };

            return parse_error(
                ParseErrorType::ExpectedOneOf { expected },
                self.current_span()
            );
        }

        self.advance();

        if matches!(self.current_token(), Token::Arrow) {
            self.advance();

            let body = self.expr()?;
            let location = Span::new(func_start, body.location().end.clone());

            return Ok(Node::FuncDef(FuncDef {
                name,
                params,
                body: Rc::new(body),
                returns_null: false,
                location,
            }));
        }

        if !matches!(self.current_token(), Token::Newline) {
            return parse_error(
                ParseErrorType::ExpectedOneOf { expected: vec!["'->'".into(), "a new line".into()] },
                self.current_span()
            );
        }

        self.advance();

        let body = self.statements()?;
        self.expect(Token::End)?;

        let location = Span::new(func_start, body.location().end.clone());

        Ok(Node::FuncDef(FuncDef {
            name,
            params,
            body: Rc::new(body),
            returns_null: true,
            location,
        }))
    }
}
