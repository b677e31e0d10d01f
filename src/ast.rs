use std::fmt;
use std::rc::Rc;

use crate::lexer::number_literal;
use crate::token::TokenKind;

/// Infix operators. `and`/`or` live here too but are short-circuited by
/// the evaluator instead of going through the normal operand path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOp {
    Add,
    Sub,
    Mul,
    Div,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    And,
    Or,
}

impl InfixOp {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        let op = match kind {
            TokenKind::Plus => InfixOp::Add,
            TokenKind::Minus => InfixOp::Sub,
            TokenKind::Star => InfixOp::Mul,
            TokenKind::Slash => InfixOp::Div,
            TokenKind::EqualEqual => InfixOp::Equal,
            TokenKind::BangEqual => InfixOp::NotEqual,
            TokenKind::Less => InfixOp::Less,
            TokenKind::LessEqual => InfixOp::LessEqual,
            TokenKind::Greater => InfixOp::Greater,
            TokenKind::GreaterEqual => InfixOp::GreaterEqual,
            TokenKind::And => InfixOp::And,
            TokenKind::Or => InfixOp::Or,
            _ => return None,
        };
        Some(op)
    }
}

impl fmt::Display for InfixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InfixOp::Add => "+",
            InfixOp::Sub => "-",
            InfixOp::Mul => "*",
            InfixOp::Div => "/",
            InfixOp::Equal => "==",
            InfixOp::NotEqual => "!=",
            InfixOp::Less => "<",
            InfixOp::LessEqual => "<=",
            InfixOp::Greater => ">",
            InfixOp::GreaterEqual => ">=",
            InfixOp::And => "and",
            InfixOp::Or => "or",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOp {
    Neg,
    Not,
}

impl fmt::Display for PrefixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PrefixOp::Neg => "-",
            PrefixOp::Not => "!",
        })
    }
}

/// An expression together with the line of its originating token.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub line: usize,
}

impl Expr {
    pub fn new(kind: ExprKind, line: usize) -> Self {
        Self { kind, line }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Nil,
    Boolean(bool),
    Number(f64),
    String(Rc<str>),
    Identifier(Rc<str>),
    Group(Box<Expr>),
    Prefix {
        op: PrefixOp,
        right: Box<Expr>,
    },
    Infix {
        op: InfixOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Assign {
        name: Rc<str>,
        value: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expression(Expr),
    Print(Expr),
    Block(Vec<Stmt>),
    Var {
        name: Rc<str>,
        initializer: Expr,
        line: usize,
    },
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
        line: usize,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
        line: usize,
    },
    For {
        init: Option<Box<Stmt>>,
        condition: Option<Expr>,
        step: Option<Box<Stmt>>,
        body: Box<Stmt>,
        line: usize,
    },
    Return {
        value: Option<Expr>,
        line: usize,
    },
    Function {
        name: Rc<str>,
        params: Vec<Rc<str>>,
        body: Vec<Stmt>,
        line: usize,
    },
}

/// A parsed program. Its `Display` impl is the canonical rendering
/// emitted by parse mode.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stmt in &self.statements {
            write!(f, "{}", stmt)?;
        }
        Ok(())
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Nil => f.write_str("nil"),
            ExprKind::Boolean(b) => write!(f, "{}", b),
            ExprKind::Number(n) => f.write_str(&number_literal(*n)),
            ExprKind::String(s) => f.write_str(s),
            ExprKind::Identifier(name) => f.write_str(name),
            ExprKind::Group(inner) => write!(f, "(group {})", inner),
            ExprKind::Prefix { op, right } => write!(f, "({} {})", op, right),
            ExprKind::Infix { op, left, right } => write!(f, "({} {} {})", op, left, right),
            ExprKind::Assign { name, value } => write!(f, "{} = {};", name, value),
            ExprKind::Call { callee, args } => {
                write!(f, "{}(", callee)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
        }
    }
}

// Statement rendering shows an absent `for` clause as a bare separator.
impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Expression(expr) => write!(f, "{}", expr),
            Stmt::Print(expr) => write!(f, "(print {})", expr),
            Stmt::Block(stmts) => {
                f.write_str("{")?;
                for stmt in stmts {
                    write!(f, "{}", stmt)?;
                }
                f.write_str("}")
            }
            Stmt::Var {
                name, initializer, ..
            } => write!(f, "var {} = {};", name, initializer),
            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                write!(f, "if {} {}", condition, then_branch)?;
                if let Some(alt) = else_branch {
                    write!(f, " else {}", alt)?;
                }
                Ok(())
            }
            Stmt::While {
                condition, body, ..
            } => write!(f, "while {} {}", condition, body),
            Stmt::For {
                init,
                condition,
                step,
                body,
                ..
            } => {
                f.write_str("for (")?;
                if let Some(init) = init {
                    write!(f, "{}", init)?;
                }
                f.write_str("; ")?;
                if let Some(condition) = condition {
                    write!(f, "{}", condition)?;
                }
                f.write_str("; ")?;
                if let Some(step) = step {
                    write!(f, "{}", step)?;
                }
                write!(f, ") {}", body)
            }
            Stmt::Return { value, .. } => match value {
                Some(value) => write!(f, "return {};", value),
                None => f.write_str("return;"),
            },
            Stmt::Function {
                name, params, body, ..
            } => {
                write!(f, "fun {}(", name)?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str(param)?;
                }
                f.write_str(") {")?;
                for stmt in body {
                    write!(f, "{}", stmt)?;
                }
                f.write_str("}")
            }
        }
    }
}
