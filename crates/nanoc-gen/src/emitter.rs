//! Per-function lowering: the register/label counters and the textual
//! templating that turns a syntax tree into LLVM IR.
//!
//! A `code(gen, format, ...)` vsprintf-style append pattern: each
//! lowering step calls [`FuncEmitter::line`] to append one IR line to a
//! growing output buffer tracked by a single incrementing index, rather
//! than building a builder-style instruction graph.

use std::fmt::Write as _;

use nanoc_par::{Node, NodeKind};

use crate::error::EmitError;

/// Lowers one function body, tracking the two per-function counters the
/// contract requires: a register counter (named values) and a label
/// counter (basic blocks).
pub struct FuncEmitter<'a> {
    source: &'a str,
    debug: bool,
    reg: u32,
    label: u32,
    /// The block label most recently opened — the predecessor a `phi`
    /// must cite once the arm that opened it terminates.
    current_label: Option<String>,
    /// Set once the open block has emitted its terminator; the next
    /// lowering step must open a fresh block before writing anything.
    terminated: bool,
    buf: String,
}

impl<'a> FuncEmitter<'a> {
    pub fn new(source: &'a str, debug: bool, param_count: usize) -> Self {
        Self {
            source,
            debug,
            reg: param_count as u32,
            label: 0,
            current_label: None,
            terminated: false,
            buf: String::new(),
        }
    }

    pub fn into_buf(self) -> String {
        self.buf
    }

    fn line(&mut self, text: &str) {
        self.buf.push_str(text);
        self.buf.push('\n');
    }

    fn comment(&mut self, text: &str) {
        if self.debug {
            self.line(&format!("  ; {text}"));
        }
    }

    fn alloc_reg(&mut self) -> u32 {
        self.reg += 1;
        self.reg
    }

    fn open_label(&mut self, name: String) {
        self.buf.push('\n');
        let _ = writeln!(self.buf, "{name}:");
        self.current_label = Some(name);
        self.terminated = false;
    }

    /// A terminator implicitly consumes the next register name even
    /// though no instruction spells it out.
    fn bump_after_terminator(&mut self) {
        self.reg += 1;
        self.terminated = true;
    }

    /// Every lowering step assumes it is writing into an open block; if
    /// the previous statement already terminated one (a `return` deep
    /// inside a `Block`, say), open a fresh unreachable-but-well-formed
    /// block before continuing.
    fn ensure_open_block(&mut self) {
        if self.terminated {
            self.label += 1;
            let name = format!("unreachable{}", self.label);
            self.open_label(name);
        }
    }

    fn next_label(&mut self, prefix: &str) -> String {
        let n = self.label;
        self.label += 1;
        format!("{prefix}{n}")
    }

    /// Lower a literal integer the way every `NUM` node is lowered:
    /// allocate a slot, store the immediate, load it back.
    ///
    /// `val` is truncated to `i32` here, at the emission boundary — it is
    /// parsed and carried as `i64` so a decimal literal up to 64 bits wide
    /// round-trips through the tree, but the language's only value type is
    /// 32-bit, and LLVM rejects an `i32` constant that doesn't fit.
    fn lower_literal(&mut self, val: i64) -> u32 {
        self.comment("Assign NUM");
        let slot = self.alloc_reg();
        self.line(&format!("  %{slot} = alloca i32, align 4"));
        self.line(&format!("  store i32 {}, i32* %{slot}, align 4", val as i32));
        let loaded = self.alloc_reg();
        self.line(&format!("  %{loaded} = load i32, i32* %{slot}, align 4"));
        loaded
    }

    /// Lower `node`, returning the register holding its 32-bit result.
    pub fn lower(&mut self, node: &Node) -> Result<u32, EmitError> {
        self.ensure_open_block();
        match node.kind {
            NodeKind::Num => Ok(self.lower_literal(node.val)),
            NodeKind::Var => self.lower_var(node),
            NodeKind::Let => self.lower_let(node),
            NodeKind::Assign => self.lower_assign(node),
            NodeKind::Call => self.lower_call(node),
            NodeKind::Return => self.lower_return(node),
            NodeKind::Add | NodeKind::Sub | NodeKind::Mul | NodeKind::Div => self.lower_arith(node),
            NodeKind::Eq | NodeKind::Ne | NodeKind::Lt | NodeKind::Le | NodeKind::Gt | NodeKind::Ge => {
                self.lower_cmp(node)
            }
            NodeKind::Block => self.lower_block(node),
            NodeKind::If => self.lower_if(node),
            NodeKind::Loop => self.lower_loop(node),
            NodeKind::Root | NodeKind::Func | NodeKind::Args => {
                unreachable!("{:?} is not a statement or expression", node.kind)
            }
        }
    }

    fn lower_var(&mut self, node: &Node) -> Result<u32, EmitError> {
        let name = node.name(self.source);
        self.comment(&format!("Load VAR {name}"));
        let reg = self.alloc_reg();
        self.line(&format!("  %{reg} = load i32, i32* %{name}, align 4"));
        Ok(reg)
    }

    fn lower_let(&mut self, node: &Node) -> Result<u32, EmitError> {
        let lvar = &node.children[0];
        let name = lvar.name(self.source);
        self.comment(&format!("Declare LET {name}"));
        self.line(&format!("  %{name} = alloca i32, align 4"));
        if let Some(init) = node.children.get(1) {
            let init_reg = self.lower(init)?;
            self.line(&format!("  store i32 %{init_reg}, i32* %{name}, align 4"));
            // The just-stored register already holds the slot's value,
            // so `let`'s own result is that register directly — reading
            // it straight back with a redundant load is left to whoever
            // later references the variable as a `Var`.
            Ok(init_reg)
        } else {
            let reg = self.alloc_reg();
            self.line(&format!("  %{reg} = load i32, i32* %{name}, align 4"));
            Ok(reg)
        }
    }

    fn lower_assign(&mut self, node: &Node) -> Result<u32, EmitError> {
        let name = node.children[0].name(self.source);
        let rhs = self.lower(&node.children[1])?;
        self.comment(&format!("Assign VAR {name}"));
        self.line(&format!("  store i32 %{rhs}, i32* %{name}, align 4"));
        Ok(rhs)
    }

    fn lower_call(&mut self, node: &Node) -> Result<u32, EmitError> {
        let callee = node.name(self.source);
        let mut arg_regs = Vec::with_capacity(node.children.len());
        for arg in &node.children {
            arg_regs.push(self.lower(arg)?);
        }
        self.comment(&format!("Call {callee}"));
        let reg = self.alloc_reg();
        let arg_types = vec!["i32"; arg_regs.len()].join(", ");
        let arg_list = arg_regs
            .iter()
            .map(|r| format!("i32 %{r}"))
            .collect::<Vec<_>>()
            .join(", ");
        self.line(&format!(
            "  %{reg} = call i32 ({arg_types}) @{callee}({arg_list})"
        ));
        Ok(reg)
    }

    fn lower_return(&mut self, node: &Node) -> Result<u32, EmitError> {
        let reg = self.lower(&node.children[0])?;
        self.comment("Return");
        self.line(&format!("  ret i32 %{reg}"));
        self.bump_after_terminator();
        Ok(reg)
    }

    fn lower_arith(&mut self, node: &Node) -> Result<u32, EmitError> {
        self.comment("Calculate LHS");
        let lhs = self.lower(&node.children[0])?;
        self.comment("Calculate RHS");
        let rhs = self.lower(&node.children[1])?;
        let op = match node.kind {
            NodeKind::Add => "add",
            NodeKind::Sub => "sub",
            NodeKind::Mul => "mul",
            NodeKind::Div => "sdiv",
            _ => unreachable!(),
        };
        self.comment(&format!("Calculate {}", node.kind.name()));
        let reg = self.alloc_reg();
        self.line(&format!("  %{reg} = {op} i32 %{lhs}, %{rhs}"));
        Ok(reg)
    }

    fn lower_cmp(&mut self, node: &Node) -> Result<u32, EmitError> {
        let lhs = self.lower(&node.children[0])?;
        let rhs = self.lower(&node.children[1])?;
        let cond = match node.kind {
            NodeKind::Eq => "eq",
            NodeKind::Ne => "ne",
            NodeKind::Lt => "slt",
            NodeKind::Le => "sle",
            NodeKind::Gt => "sgt",
            NodeKind::Ge => "sge",
            _ => unreachable!(),
        };
        self.comment(&format!("Compare {}", node.kind.name()));
        let cmp_reg = self.alloc_reg();
        self.line(&format!("  %{cmp_reg} = icmp {cond} i32 %{lhs}, %{rhs}"));
        let zext_reg = self.alloc_reg();
        self.line(&format!("  %{zext_reg} = zext i1 %{cmp_reg} to i32"));
        Ok(zext_reg)
    }

    fn lower_block(&mut self, node: &Node) -> Result<u32, EmitError> {
        let mut last = 0;
        for (i, child) in node.children.iter().enumerate() {
            last = self.lower(child)?;
            if i + 1 < node.children.len() {
                self.ensure_open_block();
            }
        }
        if node.children.is_empty() {
            last = self.lower_literal(0);
        }
        Ok(last)
    }

    fn lower_if(&mut self, node: &Node) -> Result<u32, EmitError> {
        let then_label = self.next_label("if.then");
        let else_label = self.next_label("if.else");
        let end_label = self.next_label("if.end");

        self.comment("Evaluate IF condition");
        let cond = self.lower(&node.children[0])?;
        let test = self.alloc_reg();
        self.line(&format!("  %{test} = icmp ne i32 %{cond}, 0"));
        self.line(&format!(
            "  br i1 %{test}, label %{then_label}, label %{else_label}"
        ));
        self.bump_after_terminator();

        self.open_label(then_label);
        let then_reg = self.lower(&node.children[1])?;
        let then_incoming = if self.terminated {
            None
        } else {
            let label = self.current_label.clone().unwrap();
            self.line(&format!("  br label %{end_label}"));
            self.bump_after_terminator();
            Some((then_reg, label))
        };

        self.open_label(else_label);
        let else_reg = self.lower(&node.children[2])?;
        let else_incoming = if self.terminated {
            None
        } else {
            let label = self.current_label.clone().unwrap();
            self.line(&format!("  br label %{end_label}"));
            self.bump_after_terminator();
            Some((else_reg, label))
        };

        self.open_label(end_label);
        let incoming: Vec<(u32, String)> = [then_incoming, else_incoming].into_iter().flatten().collect();
        if incoming.is_empty() {
            self.line("  unreachable");
            self.terminated = true;
            return Ok(self.alloc_reg());
        }

        let reg = self.alloc_reg();
        let arms = incoming
            .iter()
            .map(|(r, label)| format!("[ %{r}, %{label} ]"))
            .collect::<Vec<_>>()
            .join(", ");
        self.line(&format!("  %{reg} = phi i32 {arms}"));
        Ok(reg)
    }

    fn lower_loop(&mut self, node: &Node) -> Result<u32, EmitError> {
        let head_label = self.next_label("loop.head");
        self.line(&format!("  br label %{head_label}"));
        self.bump_after_terminator();

        self.open_label(head_label.clone());
        self.lower(&node.children[0])?;
        if !self.terminated {
            self.line(&format!("  br label %{head_label}"));
            self.bump_after_terminator();
        }
        // No `break` exists in this language, so control never falls
        // through a loop; callers that try to use its value see an
        // unreachable register, matching the other unreachable-arm case.
        Ok(self.alloc_reg())
    }
}
