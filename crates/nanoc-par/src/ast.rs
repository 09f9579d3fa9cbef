//! Syntax tree node definitions.
//!
//! A tree is a tagged record: a [`NodeKind`], the token it was built from
//! (used for identifier spelling and, for `Num`, already-parsed value),
//! and an ordered list of children whose arity depends on the kind, as
//! documented on each variant below.

use nanoc_lex::Token;

/// The closed set of syntax tree tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Translation unit. Children: `Func` nodes in source order.
    Root,
    /// Function definition. Children: `[Args, body]`; name is in `token`.
    Func,
    /// Formal parameter list. Children: `Var` nodes.
    Args,
    /// Compound statement. Children: statements in order.
    Block,
    /// Integer literal; value lives in `Node::val`.
    Num,
    /// Variable reference; name is in `token`.
    Var,
    /// Local definition. Children: `[lvar]` or `[lvar, init]`.
    Let,
    /// Assignment expression. Children: `[lvalue, expr]`.
    Assign,
    /// Return statement. Children: `[expr]`.
    Return,
    /// Conditional. Children: `[cond, then, else]` — `else` is a
    /// synthetic `Num 0` when the source omits it.
    If,
    /// Unbounded loop. Children: `[body]`.
    Loop,
    /// Function call; callee name is in `token`. Children: argument
    /// expressions, in order.
    Call,
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl NodeKind {
    /// Name used in the `-d` tree dump format.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Root => "ROOT",
            NodeKind::Func => "FUNC",
            NodeKind::Args => "ARGS",
            NodeKind::Block => "BLOCK",
            NodeKind::Num => "NUM",
            NodeKind::Var => "VAR",
            NodeKind::Let => "LET",
            NodeKind::Assign => "ASSIGN",
            NodeKind::Return => "RETURN",
            NodeKind::If => "IF",
            NodeKind::Loop => "LOOP",
            NodeKind::Call => "CALL",
            NodeKind::Add => "ADD",
            NodeKind::Sub => "SUB",
            NodeKind::Mul => "MUL",
            NodeKind::Div => "DIV",
            NodeKind::Eq => "EQ",
            NodeKind::Ne => "NE",
            NodeKind::Lt => "LT",
            NodeKind::Le => "LE",
            NodeKind::Gt => "GT",
            NodeKind::Ge => "GE",
        }
    }
}

/// A syntax tree node.
#[derive(Clone, Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub token: Token,
    pub val: i64,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind, token: Token, children: Vec<Node>) -> Self {
        Self {
            kind,
            token,
            val: 0,
            children,
        }
    }

    pub fn leaf(kind: NodeKind, token: Token) -> Self {
        Self::new(kind, token, Vec::new())
    }

    pub fn num(token: Token, val: i64) -> Self {
        Self {
            kind: NodeKind::Num,
            token,
            val,
            children: Vec::new(),
        }
    }

    /// The identifier this node names, sliced from `source`. Valid for
    /// `Var`, `Call`, `Let`, and `Func` nodes.
    pub fn name<'a>(&self, source: &'a str) -> &'a str {
        self.token.lexeme(source)
    }
}
