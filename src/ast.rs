use std::rc::Rc;

use crate::lexer::Tokenizer;
use crate::token::Operator;

/// Source position attached to every AST node for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pos {
    pub file: Rc<str>,
    pub line: usize,
    pub col: usize,
}

impl Pos {
    /// Captures the start position of the tokenizer's current token.
    pub fn of(tokenizer: &Tokenizer) -> Pos {
        Pos {
            file: Rc::from(tokenizer.filename()),
            line: tokenizer.token_line,
            col: tokenizer.token_col,
        }
    }
}

/// One `key: value` entry of an object literal.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectEntry {
    pub key: String,
    pub value: Expr,
}

/// Expression nodes. This is a closed set; the compiler matches on it
/// exhaustively and faults on the variants it does not yet lower.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Null(Pos),
    Number {
        value: f64,
        pos: Pos,
    },
    Str {
        value: String,
        pos: Pos,
    },
    Variable {
        name: String,
        pos: Pos,
    },
    This(Pos),
    Unary {
        op: Operator,
        operand: Box<Expr>,
        pos: Pos,
    },
    Binary {
        left: Box<Expr>,
        op: Operator,
        right: Box<Expr>,
        pos: Pos,
    },
    /// `target` is always a `Variable` or `Member`; the parser rejects any
    /// other left operand as an invalid lvalue.
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
        pos: Pos,
    },
    Member {
        object: Box<Expr>,
        name: String,
        pos: Pos,
    },
    ObjectLiteral {
        entries: Vec<ObjectEntry>,
        pos: Pos,
    },
    ArrayLiteral {
        values: Vec<Expr>,
        pos: Pos,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        pos: Pos,
    },
    Function {
        name: String,
        params: Vec<String>,
        body: Block,
        pos: Pos,
    },
}

impl Expr {
    pub fn pos(&self) -> &Pos {
        match self {
            Expr::Null(pos)
            | Expr::This(pos)
            | Expr::Number { pos, .. }
            | Expr::Str { pos, .. }
            | Expr::Variable { pos, .. }
            | Expr::Unary { pos, .. }
            | Expr::Binary { pos, .. }
            | Expr::Assign { pos, .. }
            | Expr::Member { pos, .. }
            | Expr::ObjectLiteral { pos, .. }
            | Expr::ArrayLiteral { pos, .. }
            | Expr::Call { pos, .. }
            | Expr::Function { pos, .. } => pos,
        }
    }

    /// True when this expression may stand on the left of an assignment.
    pub fn is_lvalue(&self) -> bool {
        matches!(self, Expr::Variable { .. } | Expr::Member { .. })
    }
}

/// Statement nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `include <name> [as <alias>]`. Recorded by the compiler, resolved by
    /// the host. Legal only at module top level.
    Include {
        name: String,
        alias: String,
        pos: Pos,
    },
    If {
        condition: Expr,
        then_block: Block,
        else_branch: Option<Box<Stmt>>,
        pos: Pos,
    },
    /// `for <variable> in <collection> <block>`. Header placeholder; the
    /// compiler does not lower loop bodies yet.
    For {
        variable: String,
        collection: Expr,
        body: Block,
        pos: Pos,
    },
    Expression(Expr),
    Return {
        value: Expr,
        pos: Pos,
    },
    ReturnNull(Pos),
    Block(Block),
}

impl Stmt {
    pub fn pos(&self) -> &Pos {
        match self {
            Stmt::Include { pos, .. }
            | Stmt::If { pos, .. }
            | Stmt::For { pos, .. }
            | Stmt::Return { pos, .. }
            | Stmt::ReturnNull(pos) => pos,
            Stmt::Expression(expr) => expr.pos(),
            Stmt::Block(block) => &block.pos,
        }
    }
}

/// A braced sequence of statements. Each nested block opens a fresh lexical
/// scope in the compiler.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub pos: Pos,
}

/// A parsed module: its filename label and top-level statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub name: String,
    pub statements: Vec<Stmt>,
}
