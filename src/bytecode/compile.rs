use crate::ast::{Block, Expr, Pos, Program, Stmt};
use crate::bytecode::{CompiledProgram, IncludeRef, OpCode};
use crate::error::ScriptError;
use crate::object::UserFunction;
use crate::token::Operator;

// =============================================================================
// SYMBOL TABLE - lexical scopes to physical local slots
// =============================================================================

/// A chain of lexical scopes, one per nested block.
///
/// Lookup walks the chain inward to outward. A name not bound anywhere in the
/// chain is allocated in the *outermost* table of the enclosing function, so
/// every use of one name within one function shares a single physical slot,
/// regardless of block nesting. There is no block-level shadowing.
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: Vec<String>,
    parent: Option<Box<SymbolTable>>,
}

impl SymbolTable {
    pub fn new() -> SymbolTable {
        SymbolTable::default()
    }

    fn child(parent: SymbolTable) -> SymbolTable {
        SymbolTable {
            symbols: Vec::new(),
            parent: Some(Box::new(parent)),
        }
    }

    pub fn has_symbol(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Slot index of `name`, allocating a new slot on first sight.
    pub fn symbol_index(&mut self, name: &str) -> usize {
        match self.lookup(name) {
            Some(index) => index,
            None => self.allocate(name),
        }
    }

    /// Total number of slots across the whole chain.
    pub fn total_len(&self) -> usize {
        self.outer_len() + self.symbols.len()
    }

    fn outer_len(&self) -> usize {
        self.parent.as_ref().map_or(0, |p| p.total_len())
    }

    fn lookup(&self, name: &str) -> Option<usize> {
        if let Some(parent) = &self.parent {
            if let Some(index) = parent.lookup(name) {
                return Some(index);
            }
        }

        self.symbols
            .iter()
            .position(|s| s == name)
            .map(|pos| pos + self.outer_len())
    }

    fn allocate(&mut self, name: &str) -> usize {
        match &mut self.parent {
            Some(parent) => parent.allocate(name),
            None => {
                self.symbols.push(name.to_string());
                self.symbols.len() - 1
            }
        }
    }
}

// =============================================================================
// COMPILER - AST to bytecode
// =============================================================================

/// Walks the AST and emits a flat bytecode stream plus constant pools.
///
/// Two compilation contexts exist. At module top level every bare variable
/// read or write is dynamic property traffic against the root object, keyed
/// by interned name. Inside a function body, names resolve through the
/// symbol table to local slot indices.
///
/// All mutable state (scope chain, pools, code buffer) is private to one
/// compiler instance and discarded wholesale when `compile_program` returns.
pub struct Compiler {
    code: Vec<i32>,
    strings: Vec<String>,
    numbers: Vec<f64>,
    includes: Vec<IncludeRef>,
    symbols: SymbolTable,
    symbol_count: usize,
    compiling_main: bool,
}

impl Compiler {
    pub fn new() -> Compiler {
        Compiler {
            code: Vec::new(),
            strings: Vec::new(),
            numbers: Vec::new(),
            includes: Vec::new(),
            symbols: SymbolTable::new(),
            symbol_count: 0,
            compiling_main: false,
        }
    }

    /// Compiles a parsed module into its finished program image.
    pub fn compile_program(mut self, program: &Program) -> Result<CompiledProgram, ScriptError> {
        self.compiling_main = true;

        for statement in &program.statements {
            self.compile_statement(statement)?;
        }
        self.emit(OpCode::Return);

        Ok(CompiledProgram {
            main: self.generate_function(),
            strings: self.strings,
            numbers: self.numbers,
            includes: self.includes,
        })
    }

    /// Compiles a block in function context (locals resolve to slots).
    /// Exposed so hosts and tests can compile function bodies directly.
    pub fn compile_block(&mut self, block: &Block) -> Result<(), ScriptError> {
        self.open_block();

        for statement in &block.statements {
            self.compile_statement(statement)?;
        }

        self.close_block();
        Ok(())
    }

    /// Snapshot of the code emitted so far as a function.
    pub fn generate_function(&self) -> UserFunction {
        UserFunction {
            code: self.code.clone(),
            variable_count: self.symbol_count.max(self.symbols.total_len()),
        }
    }

    fn open_block(&mut self) {
        let parent = std::mem::take(&mut self.symbols);
        self.symbols = SymbolTable::child(parent);
    }

    fn close_block(&mut self) {
        self.symbol_count = self.symbol_count.max(self.symbols.total_len());

        if let Some(parent) = self.symbols.parent.take() {
            self.symbols = *parent;
        }
    }

    fn compile_statement(&mut self, statement: &Stmt) -> Result<(), ScriptError> {
        match statement {
            Stmt::Expression(expr) => self.compile_expression(expr),
            Stmt::Return { value, .. } => {
                self.compile_expression(value)?;
                self.emit(OpCode::Return);
                Ok(())
            }
            Stmt::ReturnNull(_) => {
                self.emit(OpCode::ReturnNull);
                Ok(())
            }
            Stmt::Block(block) => self.compile_block(block),
            Stmt::Include { name, alias, .. } => {
                // Recorded only; resolving the script is a host concern.
                self.includes.push(IncludeRef {
                    name: name.clone(),
                    alias: alias.clone(),
                });
                Ok(())
            }
            Stmt::If { pos, .. } => Err(self.error("'if' statements are not compiled yet", pos)),
            Stmt::For { pos, .. } => Err(self.error("'for' statements are not compiled yet", pos)),
        }
    }

    fn compile_expression(&mut self, expression: &Expr) -> Result<(), ScriptError> {
        match expression {
            Expr::Null(_) => {
                self.emit(OpCode::PushNull);
                Ok(())
            }
            Expr::Number { value, .. } => {
                self.compile_number(*value);
                Ok(())
            }
            Expr::Str { value, .. } => {
                let index = self.string_index(value);
                self.emit_with(OpCode::PushString, index);
                Ok(())
            }
            Expr::Binary {
                left, op, right, pos,
            } => self.compile_binary(left, *op, right, pos),
            Expr::Unary { op, operand, pos } => self.compile_unary(*op, operand, pos),
            Expr::Assign { target, value, .. } => {
                // Right-hand side first, then the store.
                self.compile_expression(value)?;
                self.compile_left_value(target)
            }
            Expr::Variable { name, .. } => {
                if self.compiling_main {
                    self.emit(OpCode::PushRoot);
                    let index = self.string_index(name);
                    self.emit_with(OpCode::PushMemberValue, index);
                } else {
                    let slot = self.symbols.symbol_index(name) as i32;
                    self.emit_with(OpCode::PushVar, slot);
                }
                Ok(())
            }
            Expr::This(pos) => {
                if self.compiling_main {
                    self.emit(OpCode::PushRoot);
                    Ok(())
                } else {
                    Err(self.error("'this' is not compiled in function bodies yet", pos))
                }
            }
            Expr::Member { object, name, .. } => {
                self.compile_expression(object)?;
                let index = self.string_index(name);
                self.emit_with(OpCode::PushMemberValue, index);
                Ok(())
            }
            Expr::ObjectLiteral { pos, .. } => {
                Err(self.error("object literals are not compiled yet", pos))
            }
            Expr::ArrayLiteral { pos, .. } => {
                Err(self.error("array literals are not compiled yet", pos))
            }
            Expr::Call { pos, .. } => Err(self.error("function calls are not compiled yet", pos)),
            Expr::Function { pos, .. } => {
                Err(self.error("function declarations are not compiled yet", pos))
            }
        }
    }

    fn compile_binary(
        &mut self,
        left: &Expr,
        op: Operator,
        right: &Expr,
        pos: &Pos,
    ) -> Result<(), ScriptError> {
        self.compile_expression(left)?;
        self.compile_expression(right)?;

        let opcode = match op {
            Operator::Plus => OpCode::Add,
            Operator::Minus => OpCode::Sub,
            Operator::Star => OpCode::Mul,
            Operator::Slash => OpCode::Div,
            Operator::Percent => OpCode::Mod,
            other => {
                return Err(self.error(format!("operator '{}' is not compiled yet", other), pos));
            }
        };
        self.emit(opcode);

        Ok(())
    }

    fn compile_unary(&mut self, op: Operator, operand: &Expr, pos: &Pos) -> Result<(), ScriptError> {
        match op {
            // `-x` lowers to `0 - x`; there is no dedicated negate opcode.
            Operator::Minus => {
                self.emit_with(OpCode::PushInt, 0);
                self.compile_expression(operand)?;
                self.emit(OpCode::Sub);
                Ok(())
            }
            Operator::Plus => self.compile_expression(operand),
            other => Err(self.error(format!("unary '{}' is not compiled yet", other), pos)),
        }
    }

    fn compile_left_value(&mut self, target: &Expr) -> Result<(), ScriptError> {
        match target {
            Expr::Variable { name, .. } => {
                if self.compiling_main {
                    let index = self.string_index(name);
                    self.emit_with(OpCode::AssignGlobal, index);
                } else {
                    let slot = self.symbols.symbol_index(name) as i32;
                    self.emit_with(OpCode::AssignVar, slot);
                }
                Ok(())
            }
            Expr::Member { pos, .. } => {
                Err(self.error("member assignment is not compiled yet", pos))
            }
            other => Err(self.error("invalid assignment target", other.pos())),
        }
    }

    /// Integral numbers become an inline immediate; everything else interns
    /// into the number pool.
    fn compile_number(&mut self, value: f64) {
        let int_value = value as i32;

        if int_value as f64 == value {
            self.emit_with(OpCode::PushInt, int_value);
        } else {
            let index = self.number_index(value);
            self.emit_with(OpCode::PushNumber, index);
        }
    }

    fn string_index(&mut self, text: &str) -> i32 {
        if let Some(index) = self.strings.iter().position(|s| s == text) {
            return index as i32;
        }

        self.strings.push(text.to_string());
        (self.strings.len() - 1) as i32
    }

    fn number_index(&mut self, value: f64) -> i32 {
        if let Some(index) = self.numbers.iter().position(|n| *n == value) {
            return index as i32;
        }

        self.numbers.push(value);
        (self.numbers.len() - 1) as i32
    }

    fn emit(&mut self, op: OpCode) {
        self.code.push(op as i32);
    }

    fn emit_with(&mut self, op: OpCode, operand: i32) {
        self.code.push(op as i32);
        self.code.push(operand);
    }

    fn error(&self, message: impl Into<String>, pos: &Pos) -> ScriptError {
        ScriptError::compiler(message, pos.file.as_ref(), pos.line, pos.col)
    }
}

impl Default for Compiler {
    fn default() -> Compiler {
        Compiler::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Tokenizer;
    use crate::parser::Parser;
    use std::rc::Rc;

    fn parse_program(source: &str) -> Program {
        let mut tokenizer = Tokenizer::new(source, "test.cgs").unwrap();
        Parser::new(&mut tokenizer).parse_program().unwrap()
    }

    fn parse_block(source: &str) -> Block {
        let mut tokenizer = Tokenizer::new(source, "test.cgs").unwrap();
        Parser::new(&mut tokenizer).parse_block().unwrap()
    }

    fn compile(source: &str) -> CompiledProgram {
        Compiler::new().compile_program(&parse_program(source)).unwrap()
    }

    fn compile_err(source: &str) -> ScriptError {
        Compiler::new()
            .compile_program(&parse_program(source))
            .unwrap_err()
    }

    fn pos() -> Pos {
        Pos {
            file: Rc::from("test.cgs"),
            line: 1,
            col: 1,
        }
    }

    // =========================================================================
    // Symbol table
    // =========================================================================

    #[test]
    fn test_symbol_table_allocates_in_order() {
        let mut table = SymbolTable::new();

        assert_eq!(table.symbol_index("a"), 0);
        assert_eq!(table.symbol_index("b"), 1);
        assert_eq!(table.symbol_index("a"), 0);
        assert_eq!(table.total_len(), 2);
    }

    #[test]
    fn test_symbol_table_chain_shares_slots() {
        let mut outer = SymbolTable::new();
        outer.symbol_index("a");

        let mut inner = SymbolTable::child(outer);
        // `a` resolves through the chain to the existing slot.
        assert_eq!(inner.symbol_index("a"), 0);
        // A fresh name allocates in the outermost table.
        assert_eq!(inner.symbol_index("b"), 1);
        assert!(inner.has_symbol("b"));
        assert_eq!(inner.total_len(), 2);
    }

    // =========================================================================
    // Function-context compilation
    // =========================================================================

    #[test]
    fn test_block_variable_count() {
        let block = parse_block("{x = 1}");
        let mut compiler = Compiler::new();

        compiler.compile_block(&block).unwrap();
        let function = compiler.generate_function();

        assert_eq!(function.variable_count, 1);
        assert_eq!(
            function.code,
            vec![OpCode::PushInt as i32, 1, OpCode::AssignVar as i32, 0]
        );
    }

    #[test]
    fn test_block_with_two_statements() {
        let block = parse_block("{1+2;2}");
        let mut compiler = Compiler::new();

        compiler.compile_block(&block).unwrap();

        assert_eq!(block.statements.len(), 2);
        assert_eq!(compiler.generate_function().variable_count, 0);
    }

    #[test]
    fn test_same_name_in_nested_blocks_shares_one_slot() {
        // { x = 1; { x = 2 }; { x = 3 } } — every x uses slot 0.
        let assign = |value: f64| {
            Stmt::Expression(Expr::Assign {
                target: Box::new(Expr::Variable {
                    name: "x".to_string(),
                    pos: pos(),
                }),
                value: Box::new(Expr::Number { value, pos: pos() }),
                pos: pos(),
            })
        };
        let inner = |value: f64| {
            Stmt::Block(Block {
                statements: vec![assign(value)],
                pos: pos(),
            })
        };
        let block = Block {
            statements: vec![assign(1.0), inner(2.0), inner(3.0)],
            pos: pos(),
        };

        let mut compiler = Compiler::new();
        compiler.compile_block(&block).unwrap();
        let function = compiler.generate_function();

        assert_eq!(function.variable_count, 1);
        let slots: Vec<i32> = function
            .code
            .chunks(2)
            .filter(|chunk| chunk[0] == OpCode::AssignVar as i32)
            .map(|chunk| chunk[1])
            .collect();
        assert_eq!(slots, vec![0, 0, 0]);
    }

    #[test]
    fn test_sibling_blocks_never_alias_unrelated_names() {
        // { { a = 1 }; { b = 2 } } — a and b get distinct slots.
        let assign = |name: &str, value: f64| {
            Stmt::Block(Block {
                statements: vec![Stmt::Expression(Expr::Assign {
                    target: Box::new(Expr::Variable {
                        name: name.to_string(),
                        pos: pos(),
                    }),
                    value: Box::new(Expr::Number { value, pos: pos() }),
                    pos: pos(),
                })],
                pos: pos(),
            })
        };
        let block = Block {
            statements: vec![assign("a", 1.0), assign("b", 2.0)],
            pos: pos(),
        };

        let mut compiler = Compiler::new();
        compiler.compile_block(&block).unwrap();
        let function = compiler.generate_function();

        assert_eq!(function.variable_count, 2);
        let slots: Vec<i32> = function
            .code
            .chunks(2)
            .filter(|chunk| chunk[0] == OpCode::AssignVar as i32)
            .map(|chunk| chunk[1])
            .collect();
        assert_eq!(slots, vec![0, 1]);
    }

    #[test]
    fn test_local_read_uses_push_var() {
        let block = parse_block("{x = 1\ny = x}");
        let mut compiler = Compiler::new();

        compiler.compile_block(&block).unwrap();
        let function = compiler.generate_function();

        assert_eq!(
            function.code,
            vec![
                OpCode::PushInt as i32,
                1,
                OpCode::AssignVar as i32,
                0,
                OpCode::PushVar as i32,
                0,
                OpCode::AssignVar as i32,
                1,
            ]
        );
    }

    // =========================================================================
    // Top-level compilation
    // =========================================================================

    #[test]
    fn test_global_assignment_and_read() {
        let program = compile("a = 1\nb = a");

        // a = 1: PushInt 1, AssignGlobal "a"
        // b = a: PushRoot, PushMemberValue "a", AssignGlobal "b"
        assert_eq!(
            program.main.code,
            vec![
                OpCode::PushInt as i32,
                1,
                OpCode::AssignGlobal as i32,
                0,
                OpCode::PushRoot as i32,
                OpCode::PushMemberValue as i32,
                0,
                OpCode::AssignGlobal as i32,
                1,
                OpCode::Return as i32,
            ]
        );
        assert_eq!(program.strings, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(program.main.variable_count, 0);
    }

    #[test]
    fn test_binary_operands_compile_left_then_right() {
        let program = compile("return 1+2");

        assert_eq!(
            program.main.code,
            vec![
                OpCode::PushInt as i32,
                1,
                OpCode::PushInt as i32,
                2,
                OpCode::Add as i32,
                OpCode::Return as i32,
                OpCode::Return as i32,
            ]
        );
    }

    #[test]
    fn test_string_interning_dedupes() {
        let program = compile("a = 'x'\nb = 'x'");

        assert_eq!(
            program.strings,
            vec!["x".to_string(), "a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn test_number_interning_dedupes() {
        let program = compile("a = 2.5\nb = 2.5\nc = 3.5");

        assert_eq!(program.numbers, vec![2.5, 3.5]);
    }

    #[test]
    fn test_integral_literal_is_an_immediate() {
        let program = compile("a = 3");

        assert!(program.numbers.is_empty());
        assert_eq!(program.main.code[0], OpCode::PushInt as i32);
        assert_eq!(program.main.code[1], 3);
    }

    #[test]
    fn test_unary_minus_lowers_to_subtraction() {
        let program = compile("return -2.5");

        assert_eq!(
            program.main.code,
            vec![
                OpCode::PushInt as i32,
                0,
                OpCode::PushNumber as i32,
                0,
                OpCode::Sub as i32,
                OpCode::Return as i32,
                OpCode::Return as i32,
            ]
        );
        assert_eq!(program.numbers, vec![2.5]);
    }

    #[test]
    fn test_member_read_compiles() {
        let program = compile("m = .modules");

        assert_eq!(
            program.main.code,
            vec![
                OpCode::PushRoot as i32,
                OpCode::PushMemberValue as i32,
                0,
                OpCode::AssignGlobal as i32,
                1,
                OpCode::Return as i32,
            ]
        );
        assert_eq!(
            program.strings,
            vec!["modules".to_string(), "m".to_string()]
        );
    }

    #[test]
    fn test_bare_return_emits_return_null() {
        let program = compile("return");

        assert_eq!(
            program.main.code,
            vec![OpCode::ReturnNull as i32, OpCode::Return as i32]
        );
    }

    #[test]
    fn test_include_is_recorded_not_compiled() {
        let program = compile("include utils as u\na = 1");

        assert_eq!(
            program.includes,
            vec![IncludeRef {
                name: "utils".to_string(),
                alias: "u".to_string(),
            }]
        );
        assert_eq!(program.main.code[0], OpCode::PushInt as i32);
    }

    // =========================================================================
    // Deliberate extension points
    // =========================================================================

    #[test]
    fn test_call_is_a_compiler_fault() {
        let err = compile_err("f(1, 2)");
        assert!(err.to_string().contains("function calls"));
        assert_eq!(err.position(), Some((1, 1)));
    }

    #[test]
    fn test_object_literal_is_a_compiler_fault() {
        let err = compile_err("o = { a: 1 }");
        assert!(err.to_string().contains("object literals"));
    }

    #[test]
    fn test_member_assignment_is_a_compiler_fault() {
        let err = compile_err("a.b = 1");
        assert!(err.to_string().contains("member assignment"));
    }

    #[test]
    fn test_if_statement_is_a_compiler_fault() {
        let err = compile_err("if a {\nb = 1\n}");
        assert!(err.to_string().contains("'if'"));
    }

    #[test]
    fn test_unary_not_is_a_compiler_fault() {
        let err = compile_err("a = !b");
        assert!(err.to_string().contains("unary '!'"));
    }

    #[test]
    fn test_array_literal_is_a_compiler_fault() {
        let err = compile_err("a = [1, 2]");
        assert!(err.to_string().contains("array literals"));
    }

    #[test]
    fn test_this_in_function_body_is_a_compiler_fault() {
        let block = parse_block("{x = .y}");
        let mut compiler = Compiler::new();

        let err = compiler.compile_block(&block).unwrap_err();
        assert!(err.to_string().contains("'this'"));
    }

    #[test]
    fn test_comparison_and_logical_operators_are_compiler_faults() {
        // `==` and `&&` never parse into binary nodes today, so drive the
        // compiler with hand-built trees.
        let binary = |op: Operator| {
            Program {
                name: "test.cgs".to_string(),
                statements: vec![Stmt::Expression(Expr::Binary {
                    left: Box::new(Expr::Number {
                        value: 1.0,
                        pos: pos(),
                    }),
                    op,
                    right: Box::new(Expr::Number {
                        value: 2.0,
                        pos: pos(),
                    }),
                    pos: pos(),
                })],
            }
        };

        let err = Compiler::new().compile_program(&binary(Operator::Equal)).unwrap_err();
        assert!(err.to_string().contains("'=='"));

        let err = Compiler::new().compile_program(&binary(Operator::AndAnd)).unwrap_err();
        assert!(err.to_string().contains("'&&'"));
    }
}
