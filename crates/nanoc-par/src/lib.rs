//! nanoc-par — the recursive-descent parser stage.
//!
//! Consumes the flat token sequence `nanoc-lex` produces and builds the
//! syntax tree `nanoc-gen` walks. There is no error recovery: the first
//! malformed construct is a fatal `ParseError`, propagated with `?` all
//! the way out.

mod ast;
mod error;

pub use ast::{Node, NodeKind};
pub use error::ParseError;

use nanoc_lex::{Token, TokenKind};

/// Parse a complete token stream into a `Root` node.
///
/// `source` is only needed to read back `Num` lexemes as integers; every
/// other decision is made on `TokenKind` alone.
pub fn parse(tokens: &[Token], source: &str) -> Result<Node, ParseError> {
    let mut parser = Parser {
        tokens,
        source,
        pos: 0,
    };
    parser.parse_program()
}

struct Parser<'a> {
    tokens: &'a [Token],
    source: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn current(&self) -> Token {
        self.tokens[self.pos]
    }

    fn peek(&self) -> TokenKind {
        self.current().kind
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek() == kind
    }

    fn advance(&mut self) -> Token {
        let tok = self.current();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(ParseError::unexpected(self.peek(), self.current().span.lo, expected))
        }
    }

    fn synthetic_num(&self, val: i64) -> Node {
        Node::num(Token::new(TokenKind::Num, self.current().span), val)
    }

    // program := Root (FUN ident args stmt ';'*)* Eof
    fn parse_program(&mut self) -> Result<Node, ParseError> {
        let root_tok = self.expect(TokenKind::Root, "start of input")?;
        let mut funcs = Vec::new();
        while !self.check(TokenKind::Eof) {
            funcs.push(self.parse_function()?);
            while self.eat(TokenKind::Semi).is_some() {}
        }
        self.expect(TokenKind::Eof, "end of input")?;
        Ok(Node::new(NodeKind::Root, root_tok, funcs))
    }

    // FUN ident args stmt
    fn parse_function(&mut self) -> Result<Node, ParseError> {
        self.expect(TokenKind::Fun, "'fun'")?;
        let name = self.expect(TokenKind::Ident, "function name")?;
        let args = self.parse_args()?;
        let body = self.parse_stmt()?;
        Ok(Node::new(NodeKind::Func, name, vec![args, body]))
    }

    // '(' (ident (',' ident)*)? ')'
    fn parse_args(&mut self) -> Result<Node, ParseError> {
        let lparen = self.expect(TokenKind::LParen, "'('")?;
        let mut params = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                let ident = self.expect(TokenKind::Ident, "parameter name")?;
                params.push(Node::leaf(NodeKind::Var, ident));
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "')'")?;
        Ok(Node::new(NodeKind::Args, lparen, params))
    }

    fn parse_stmt(&mut self) -> Result<Node, ParseError> {
        match self.peek() {
            TokenKind::Loop => {
                let tok = self.advance();
                let body = self.parse_stmt()?;
                Ok(Node::new(NodeKind::Loop, tok, vec![body]))
            }

            TokenKind::If => {
                let tok = self.advance();
                self.expect(TokenKind::LParen, "'('")?;
                let cond = self.parse_stmt()?;
                self.expect(TokenKind::RParen, "')'")?;
                let then_branch = self.parse_stmt()?;
                let else_branch = if self.eat(TokenKind::Else).is_some() {
                    self.parse_stmt()?
                } else {
                    self.synthetic_num(0)
                };
                Ok(Node::new(NodeKind::If, tok, vec![cond, then_branch, else_branch]))
            }

            TokenKind::LBrace => {
                let tok = self.advance();
                let mut stmts = Vec::new();
                if !self.check(TokenKind::RBrace) {
                    stmts.push(self.parse_stmt()?);
                    while self.eat(TokenKind::Semi).is_some() {
                        if self.check(TokenKind::RBrace) {
                            break;
                        }
                        stmts.push(self.parse_stmt()?);
                    }
                }
                self.expect(TokenKind::RBrace, "'}'")?;
                Ok(Node::new(NodeKind::Block, tok, stmts))
            }

            TokenKind::Let => {
                self.advance();
                let ident = self.expect(TokenKind::Ident, "variable name")?;
                // The LET node's own token spells the identifier, not the
                // keyword, so debug dumps and codegen can both read the
                // name straight off the node.
                let lvar = Node::leaf(NodeKind::Var, ident);
                let children = if self.eat(TokenKind::Assign).is_some() {
                    let init = self.parse_assign()?;
                    vec![lvar, init]
                } else {
                    vec![lvar]
                };
                Ok(Node::new(NodeKind::Let, ident, children))
            }

            TokenKind::Return => {
                let tok = self.advance();
                // Parsed as a full `stmt`, not just `assign`, so a
                // return's operand can itself be an `if` or a block —
                // e.g. `return if (c) 10 else 20;` — the same way a call
                // argument or an `if` condition can.
                let value = self.parse_stmt()?;
                Ok(Node::new(NodeKind::Return, tok, vec![value]))
            }

            _ => self.parse_assign(),
        }
    }

    // assign := equality ('=' assign)?   (right-associative)
    fn parse_assign(&mut self) -> Result<Node, ParseError> {
        let lhs = self.parse_equality()?;
        if let Some(tok) = self.eat(TokenKind::Assign) {
            let rhs = self.parse_assign()?;
            Ok(Node::new(NodeKind::Assign, tok, vec![lhs, rhs]))
        } else {
            Ok(lhs)
        }
    }

    fn parse_equality(&mut self) -> Result<Node, ParseError> {
        let mut lhs = self.parse_relational()?;
        loop {
            let kind = match self.peek() {
                TokenKind::Eq => NodeKind::Eq,
                TokenKind::Ne => NodeKind::Ne,
                _ => break,
            };
            let tok = self.advance();
            let rhs = self.parse_relational()?;
            lhs = Node::new(kind, tok, vec![lhs, rhs]);
        }
        Ok(lhs)
    }

    fn parse_relational(&mut self) -> Result<Node, ParseError> {
        let mut lhs = self.parse_add()?;
        loop {
            let kind = match self.peek() {
                TokenKind::Lt => NodeKind::Lt,
                TokenKind::Le => NodeKind::Le,
                TokenKind::Gt => NodeKind::Gt,
                TokenKind::Ge => NodeKind::Ge,
                _ => break,
            };
            let tok = self.advance();
            let rhs = self.parse_add()?;
            lhs = Node::new(kind, tok, vec![lhs, rhs]);
        }
        Ok(lhs)
    }

    fn parse_add(&mut self) -> Result<Node, ParseError> {
        let mut lhs = self.parse_mul()?;
        loop {
            let kind = match self.peek() {
                TokenKind::Plus => NodeKind::Add,
                TokenKind::Minus => NodeKind::Sub,
                _ => break,
            };
            let tok = self.advance();
            let rhs = self.parse_mul()?;
            lhs = Node::new(kind, tok, vec![lhs, rhs]);
        }
        Ok(lhs)
    }

    fn parse_mul(&mut self) -> Result<Node, ParseError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let kind = match self.peek() {
                TokenKind::Star => NodeKind::Mul,
                TokenKind::Slash => NodeKind::Div,
                _ => break,
            };
            let tok = self.advance();
            let rhs = self.parse_unary()?;
            lhs = Node::new(kind, tok, vec![lhs, rhs]);
        }
        Ok(lhs)
    }

    // unary := ('+' | '-') unary | factor
    // Unary plus is a no-op; unary minus desugars to SUB(NUM 0, operand).
    fn parse_unary(&mut self) -> Result<Node, ParseError> {
        match self.peek() {
            TokenKind::Plus => {
                self.advance();
                self.parse_unary()
            }
            TokenKind::Minus => {
                let tok = self.advance();
                let operand = self.parse_unary()?;
                let zero = Node::num(Token::new(TokenKind::Num, tok.span), 0);
                Ok(Node::new(NodeKind::Sub, tok, vec![zero, operand]))
            }
            _ => self.parse_factor(),
        }
    }

    // factor := '(' assign ')' | NUM | ident ('(' (stmt (',' stmt)*)? ')')?
    fn parse_factor(&mut self) -> Result<Node, ParseError> {
        match self.peek() {
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_assign()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(inner)
            }

            TokenKind::Num => {
                let tok = self.advance();
                let lexeme = tok.lexeme(self.source);
                let val: i64 = lexeme
                    .parse()
                    .map_err(|_| ParseError::unexpected(TokenKind::Num, tok.span.lo, "integer literal"))?;
                Ok(Node::num(tok, val))
            }

            TokenKind::Ident => {
                let tok = self.advance();
                if self.eat(TokenKind::LParen).is_some() {
                    let mut args = Vec::new();
                    if !self.check(TokenKind::RParen) {
                        loop {
                            args.push(self.parse_stmt()?);
                            if self.eat(TokenKind::Comma).is_none() {
                                break;
                            }
                        }
                    }
                    self.expect(TokenKind::RParen, "')'")?;
                    Ok(Node::new(NodeKind::Call, tok, args))
                } else {
                    Ok(Node::leaf(NodeKind::Var, tok))
                }
            }

            other => Err(ParseError::unexpected(other, self.current().span.lo, "expression")),
        }
    }
}

/// Render the tree in the `-d` debug-dump format: one `SyntaxType: <kind>
/// (<val>)` line per node, indented two spaces per depth level.
pub fn dump(root: &Node) -> String {
    let mut out = String::new();
    dump_node(root, 0, &mut out);
    out
}

fn dump_node(node: &Node, depth: usize, out: &mut String) {
    out.push_str(&"  ".repeat(depth));
    out.push_str(&format!("SyntaxType: {} ({})\n", node.kind.name(), node.val));
    for child in &node.children {
        dump_node(child, depth + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nanoc_lex::tokenize;

    fn parse_src(src: &str) -> Node {
        let tokens = tokenize(src).unwrap();
        parse(&tokens, src).unwrap()
    }

    fn only_func(src: &str) -> Node {
        let root = parse_src(src);
        assert_eq!(root.kind, NodeKind::Root);
        root.children.into_iter().next().expect("at least one function")
    }

    #[test]
    fn minimal_function() {
        let func = only_func("fun main() { return 0; }");
        assert_eq!(func.kind, NodeKind::Func);
        assert_eq!(func.name("fun main() { return 0; }"), "main");
        assert_eq!(func.children.len(), 2);
        assert_eq!(func.children[0].kind, NodeKind::Args);
        assert_eq!(func.children[1].kind, NodeKind::Block);
    }

    #[test]
    fn arithmetic_precedence() {
        let src = "fun main() { return 1 + 2 * 3; }";
        let func = only_func(src);
        let ret = &func.children[1].children[0];
        assert_eq!(ret.kind, NodeKind::Return);
        let add = &ret.children[0];
        assert_eq!(add.kind, NodeKind::Add);
        assert_eq!(add.children[1].kind, NodeKind::Mul);
    }

    #[test]
    fn unary_minus_desugars_to_sub() {
        let src = "fun main() { return -5; }";
        let func = only_func(src);
        let ret = &func.children[1].children[0];
        let sub = &ret.children[0];
        assert_eq!(sub.kind, NodeKind::Sub);
        assert_eq!(sub.children[0].kind, NodeKind::Num);
        assert_eq!(sub.children[0].val, 0);
        assert_eq!(sub.children[1].val, 5);
    }

    #[test]
    fn if_without_else_gets_synthetic_zero() {
        let src = "fun main() { if (1) { return 1; } }";
        let func = only_func(src);
        let if_node = &func.children[1].children[0];
        assert_eq!(if_node.kind, NodeKind::If);
        assert_eq!(if_node.children.len(), 3);
        let else_branch = &if_node.children[2];
        assert_eq!(else_branch.kind, NodeKind::Num);
        assert_eq!(else_branch.val, 0);
    }

    #[test]
    fn let_node_token_spells_identifier() {
        let src = "fun main() { let x = 9; return x; }";
        let func = only_func(src);
        let let_node = &func.children[1].children[0];
        assert_eq!(let_node.kind, NodeKind::Let);
        assert_eq!(let_node.name(src), "x");
    }

    #[test]
    fn return_of_bare_if_without_braces() {
        let src = "fun main() { return if (1 == 1) 10 else 20; }";
        let func = only_func(src);
        let ret = &func.children[1].children[0];
        assert_eq!(ret.kind, NodeKind::Return);
        assert_eq!(ret.children[0].kind, NodeKind::If);
    }

    #[test]
    fn call_with_multiple_arguments() {
        let src = "fun main() { return add(1, 2, 3); }";
        let func = only_func(src);
        let ret = &func.children[1].children[0];
        let call = &ret.children[0];
        assert_eq!(call.kind, NodeKind::Call);
        assert_eq!(call.name(src), "add");
        assert_eq!(call.children.len(), 3);
    }

    #[test]
    fn assignment_is_right_associative() {
        let src = "fun main() { let x = 0; let y = 0; x = y = 1; return x; }";
        let root = parse_src(src);
        let func = &root.children[0];
        let block = &func.children[1];
        let assign = &block.children[2];
        assert_eq!(assign.kind, NodeKind::Assign);
        assert_eq!(assign.children[1].kind, NodeKind::Assign);
    }

    #[test]
    fn loop_wraps_a_single_statement() {
        let src = "fun main() { loop { return 1; } }";
        let func = only_func(src);
        let loop_node = &func.children[1].children[0];
        assert_eq!(loop_node.kind, NodeKind::Loop);
        assert_eq!(loop_node.children.len(), 1);
        assert_eq!(loop_node.children[0].kind, NodeKind::Block);
    }

    #[test]
    fn first_syntax_error_is_fatal() {
        let src = "fun main() { return ; }";
        let tokens = tokenize(src).unwrap();
        let err = parse(&tokens, src).unwrap_err();
        match err {
            ParseError::UnexpectedToken { expected, .. } => assert_eq!(expected, "expression"),
            other => panic!("expected UnexpectedToken, got {other:?}"),
        }
    }

    #[test]
    fn unclosed_paren_reports_eof() {
        let src = "fun main() { return (1; }";
        let tokens = tokenize(src).unwrap();
        let err = parse(&tokens, src).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { .. }));
    }

    #[test]
    fn multiple_functions_in_one_program() {
        let src = "fun add(a, b) { return a + b; } fun main() { return add(1, 2); }";
        let root = parse_src(src);
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].name(src), "add");
        assert_eq!(root.children[1].name(src), "main");
    }

    #[test]
    fn dump_format_is_indented_two_spaces_per_level() {
        let func = only_func("fun main() { return 0; }");
        let text = dump(&func);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "SyntaxType: FUNC (0)");
        assert!(lines[1].starts_with("  SyntaxType: ARGS"));
    }
}
