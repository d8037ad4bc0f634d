use std::fmt::Display;
use std::rc::Rc;

use crate::utils::prelude::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Ee,
    Ne,
    Lt,
    Gt,
    Lte,
    Gte,
    And,
    Or,
}

impl Display for BinOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Pow => "^",
            Self::Ee => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Lte => "<=",
            Self::Gte => ">=",
            Self::And => "AND",
            Self::Or => "OR",
        };

        write!(f, "{symbol}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Pos,
    Neg,
    Not,
}

impl Display for UnOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            Self::Pos => "+",
            Self::Neg => "-",
            Self::Not => "NOT",
        };

        write!(f, "{symbol}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberLiteral {
    pub value: f64,
    pub location: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteral {
    pub value: String,
    pub location: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarAccess {
    pub name: String,
    pub location: Span,
}

// LET <identifier> = <expr>
#[derive(Debug, Clone, PartialEq)]
pub struct VarAssign {
    pub name: String,
    pub value: Box<Node>,
    pub location: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOp {
    pub left: Box<Node>,
    pub op: BinOp,
    pub right: Box<Node>,
    pub location: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryOp {
    pub op: UnOp,
    pub operand: Box<Node>,
    pub location: Span,
}

// [ <expr> {, <expr>} ]
#[derive(Debug, Clone, PartialEq)]
pub struct ListLiteral {
    pub elements: Vec<Node>,
    pub location: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfCase {
    pub condition: Node,
    pub body: Node,
    pub returns_null: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElseCase {
    pub body: Node,
    pub returns_null: bool,
}

// IF <expr> THEN <body> {ELIF <expr> THEN <body>} [ELSE <body>]
#[derive(Debug, Clone, PartialEq)]
pub struct If {
    pub cases: Vec<IfCase>,
    pub else_case: Option<Box<ElseCase>>,
    pub location: Span,
}

// FOR <identifier> = <expr> TO <expr> [STEP <expr>] THEN <body>
#[derive(Debug, Clone, PartialEq)]
pub struct For {
    pub var_name: String,
    pub start: Box<Node>,
    pub end: Box<Node>,
    pub step: Option<Box<Node>>,
    pub body: Box<Node>,
    pub returns_null: bool,
    pub location: Span,
}

// WHILE <expr> THEN <body>
#[derive(Debug, Clone, PartialEq)]
pub struct While {
    pub condition: Box<Node>,
    pub body: Box<Node>,
    pub returns_null: bool,
    pub location: Span,
}

// FUNC [<identifier>] ( [<identifier> {, <identifier>}] ) -> <expr>
// or, with a block body, FUNC ... ( ... ) NEWLINE <statements> END
#[derive(Debug, Clone, PartialEq)]
pub struct FuncDef {
    pub name: Option<String>,
    pub params: Vec<String>,
    pub body: Rc<Node>,
    pub returns_null: bool,
    pub location: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub callee: Box<Node>,
    pub args: Vec<Node>,
    pub location: Span,
}

// <expr> {NEWLINE+ <expr>}
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Node>,
    pub location: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Number(NumberLiteral),
    String(StringLiteral),
    VarAccess(VarAccess),
    VarAssign(VarAssign),
    Binary(BinaryOp),
    Unary(UnaryOp),
    List(ListLiteral),
    If(If),
    For(For),
    While(While),
    FuncDef(FuncDef),
    Call(Call),
    Block(Block),
}

impl Node {
    pub fn location(&self) -> &Span {
        match self {
            Self::Number(number) => &number.location,
            Self::String(string) => &string.location,
            Self::VarAccess(access) => &access.location,
            Self::VarAssign(assign) => &assign.location,
            Self::Binary(binary) => &binary.location,
            Self::Unary(unary) => &unary.location,
            Self::List(list) => &list.location,
            Self::If(if_) => &if_.location,
            Self::For(for_) => &for_.location,
            Self::While(while_) => &while_.location,
            Self::FuncDef(func) => &func.location,
            Self::Call(call) => &call.location,
            Self::Block(block) => &block.location,
        }
    }

    // The span always stretches from the leftmost child to the rightmost.
    pub fn binary(left: Node, op: BinOp, right: Node) -> Node {
        let location = Span::new(
            left.location().start.clone(),
            right.location().end.clone()
        );

        Node::Binary(BinaryOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
            location,
        })
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(number) => write!(f, "{}", number.value),
            Self::String(string) => write!(f, "\"{}\"", string.value),
            Self::VarAccess(access) => write!(f, "{}", access.name),
            Self::VarAssign(assign) => write!(f, "LET {} = {}", assign.name, assign.value),
            Self::Binary(binary) => {
                write!(f, "({} {} {})", binary.left, binary.op, binary.right)
            },
            Self::Unary(unary) => write!(f, "({} {})", unary.op, unary.operand),
            Self::List(list) => {
                let elements = list.elements.iter()
                    .map(|element| element.to_string())
                    .collect::<Vec<String>>();

                write!(f, "[{}]", elements.join(", "))
            },
            Self::If(if_) => {
                for (idx, case) in if_.cases.iter().enumerate() {
                    let keyword = if idx == 0 { "IF" } else { " ELIF" };
                    write!(f, "{keyword} {} THEN {}", case.condition, case.body)?;
                }

                if let Some(else_case) = &if_.else_case {
                    write!(f, " ELSE {}", else_case.body)?;
                }

                Ok(())
            },
            Self::For(for_) => {
                write!(f, "FOR {} = {} TO {}", for_.var_name, for_.start, for_.end)?;

                if let Some(step) = &for_.step {
                    write!(f, " STEP {step}")?;
                }

                write!(f, " THEN {}", for_.body)
            },
            Self::While(while_) => {
                write!(f, "WHILE {} THEN {}", while_.condition, while_.body)
            },
            Self::FuncDef(func) => {
                write!(
                    f,
                    "FUNC {}({}) -> {}",
                    func.name.as_deref().unwrap_or(""),
                    func.params.join(", "),
                    func.body
                )
            },
            Self::Call(call) => {
                let args = call.args.iter()
                    .map(|arg| arg.to_string())
                    .collect::<Vec<String>>();

                write!(f, "{}({})", call.callee, args.join(", "))
            },
            Self::Block(block) => {
                let statements = block.statements.iter()
                    .map(|statement| statement.to_string())
                    .collect::<Vec<String>>();

                write!(f, "{}", statements.join("; "))
            }
        }
    }
}
