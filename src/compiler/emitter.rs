//! Lowers a parsed program into a `CompiledProgram`: a tree walk that emits
//! operand-tagged instructions into a `Chunk` per callable, threading a
//! `SymbolTable` for name resolution and a small set of stacks for loop
//! control flow and `goto`.

use crate::compiler::chunk::{Chunk, ClassEntry, CompiledProgram, FunctionEntry, ParamInfo};
use crate::compiler::opcode::{assign_op_kind, cast_kind, Instruction, Opcode, Operand};
use crate::compiler::symbol_table::{Symbol as CompilerSymbol, SymbolTable};
use crate::core::interner::Interner;
use crate::core::value::{Symbol, Value};
use crate::parser::ast::visitor::{walk_expr, Visitor};
use crate::parser::ast::{
    AssignOp, BinaryOp, CastKind, ClassMember, Expr, ExprId, MatchArm, Param, Program, Stmt,
    StmtId, UnaryOp,
};
use std::collections::HashMap;
use std::mem;

/// Unescape a double-quoted or heredoc string body, processing the escape
/// sequences PHP recognizes in that context.
fn unescape_string(s: &[u8]) -> Vec<u8> {
    let mut result = Vec::new();
    let mut i = 0;
    while i < s.len() {
        if s[i] == b'\\' && i + 1 < s.len() {
            match s[i + 1] {
                b'n' => result.push(b'\n'),
                b'r' => result.push(b'\r'),
                b't' => result.push(b'\t'),
                b'\\' => result.push(b'\\'),
                b'$' => result.push(b'$'),
                b'"' => result.push(b'"'),
                b'\'' => result.push(b'\''),
                b'v' => result.push(b'\x0B'),
                b'e' => result.push(b'\x1B'),
                b'f' => result.push(b'\x0C'),
                b'0' => result.push(b'\0'),
                b'x' if i + 3 < s.len() => {
                    if let (Some(h1), Some(h2)) = (
                        char::from(s[i + 2]).to_digit(16),
                        char::from(s[i + 3]).to_digit(16),
                    ) {
                        result.push((h1 * 16 + h2) as u8);
                        i += 2;
                    } else {
                        result.push(b'\\');
                        result.push(s[i + 1]);
                    }
                }
                b'0'..=b'7' => {
                    let mut octal_val = s[i + 1] - b'0';
                    let mut consumed = 1;
                    if i + 2 < s.len() && (b'0'..=b'7').contains(&s[i + 2]) {
                        octal_val = octal_val * 8 + (s[i + 2] - b'0');
                        consumed = 2;
                        if i + 3 < s.len() && (b'0'..=b'7').contains(&s[i + 3]) {
                            octal_val = octal_val * 8 + (s[i + 3] - b'0');
                            consumed = 3;
                        }
                    }
                    result.push(octal_val);
                    i += consumed;
                }
                _ => {
                    result.push(b'\\');
                    result.push(s[i + 1]);
                }
            }
            i += 2;
        } else {
            result.push(s[i]);
            i += 1;
        }
    }
    result
}

struct LoopInfo {
    break_jumps: Vec<usize>,
    continue_jumps: Vec<usize>,
}

/// Per-callable compilation state: the chunk under construction, its flat
/// local-slot assignment, and its `goto` bookkeeping. Swapped out wholesale
/// whenever the emitter descends into a nested function/closure/method body.
#[derive(Default)]
struct Frame {
    chunk: Chunk,
    slots: HashMap<CompilerSymbol, u32>,
    next_local: u32,
    next_temp: u32,
    loop_stack: Vec<LoopInfo>,
    labels: HashMap<Symbol, u32>,
    pending_gotos: Vec<(usize, Symbol)>,
}

pub struct Emitter<'src> {
    source: &'src [u8],
    interner: &'src mut Interner,
    symbols: SymbolTable,
    frame: Frame,
    current_line: u32,
    functions: indexmap::IndexMap<Symbol, FunctionEntry>,
    closures: Vec<FunctionEntry>,
    classes: indexmap::IndexMap<Symbol, ClassEntry>,
}

impl<'src> Emitter<'src> {
    pub fn new(source: &'src [u8], interner: &'src mut Interner) -> Self {
        Self {
            source,
            interner,
            symbols: SymbolTable::new(),
            frame: Frame::default(),
            current_line: 1,
            functions: indexmap::IndexMap::new(),
            closures: Vec::new(),
            classes: indexmap::IndexMap::new(),
        }
    }

    pub fn compile_program(mut self, program: &Program<'_>) -> CompiledProgram {
        for stmt in program.statements {
            self.compile_stmt(stmt);
        }
        self.resolve_pending_gotos();
        self.frame.chunk.num_locals = self.frame.next_local;
        CompiledProgram {
            main: self.frame.chunk,
            functions: self.functions,
            closures: self.closures,
            classes: self.classes,
        }
    }

    // ---- low-level emission helpers ----------------------------------

    fn emit(&mut self, opcode: Opcode) -> usize {
        self.frame.chunk.push(Instruction::new(opcode, self.current_line))
    }

    /// Emit an instruction and set its operands in one step.
    fn emit_with(&mut self, opcode: Opcode, f: impl FnOnce(&mut Instruction)) -> usize {
        let idx = self.emit(opcode);
        f(self.at(idx));
        idx
    }

    fn at(&mut self, idx: usize) -> &mut Instruction {
        &mut self.frame.chunk.instructions[idx]
    }

    /// Emit an unconditional jump with a placeholder target, to be resolved
    /// later via `patch_jump`/`patch_jump_to_here`.
    fn emit_jump(&mut self) -> usize {
        let idx = self.emit(Opcode::Jmp);
        self.at(idx).op1 = Operand::jump(0);
        idx
    }

    /// Emit a conditional jump (`JmpZ`/`JmpNz`) testing `cond`, with a
    /// placeholder target in `op2` to be resolved later.
    fn emit_cond_jump(&mut self, opcode: Opcode, cond: Operand) -> usize {
        let idx = self.emit(opcode);
        let instr = self.at(idx);
        instr.op1 = cond;
        instr.op2 = Operand::jump(0);
        idx
    }

    fn new_temp(&mut self) -> Operand {
        let t = self.frame.next_temp;
        self.frame.next_temp += 1;
        Operand::temp(t)
    }

    fn const_operand(&mut self, value: Value) -> Operand {
        Operand::constant(self.frame.chunk.add_constant(value))
    }

    fn slot_for(&mut self, symbol: CompilerSymbol) -> u32 {
        if let Some(&slot) = self.frame.slots.get(&symbol) {
            return slot;
        }
        let slot = self.frame.next_local;
        self.frame.next_local += 1;
        self.frame.slots.insert(symbol, slot);
        slot
    }

    fn intern_bytes(&mut self, bytes: &[u8]) -> Symbol {
        self.interner.intern(bytes)
    }

    fn resolve_or_define(&mut self, name: Symbol) -> CompilerSymbol {
        self.symbols
            .resolve(name)
            .unwrap_or_else(|| self.symbols.define(name))
    }

    fn resolve_var_operand(&mut self, var_span_bytes: &[u8]) -> Operand {
        let name = self.intern_bytes(var_span_bytes);
        let sym = self.resolve_or_define(name);
        Operand::compiled_var(self.slot_for(sym))
    }

    fn resolve_pending_gotos(&mut self) {
        let pending = mem::take(&mut self.frame.pending_gotos);
        for (idx, label) in pending {
            if let Some(&target) = self.frame.labels.get(&label) {
                self.frame.chunk.patch_jump(idx, target);
            }
            // An unresolved label is a compile error in a real front end;
            // the dispatch loop is out of scope here, so we leave the jump
            // pointing at itself rather than panicking mid-compile.
        }
    }

    // ---- statements ----------------------------------------------------

    fn compile_stmts(&mut self, stmts: &[StmtId<'_>]) {
        for stmt in stmts {
            self.compile_stmt(stmt);
        }
    }

    fn compile_stmt(&mut self, stmt: &Stmt<'_>) {
        match stmt {
            Stmt::Echo { exprs, .. } => {
                for expr in *exprs {
                    let operand = self.compile_expr(expr);
                    self.emit_with(Opcode::Echo, |i| i.op1 = operand);
                }
            }
            Stmt::Return { expr, .. } => {
                let operand = match expr {
                    Some(expr) => self.compile_expr(expr),
                    None => Operand::UNUSED,
                };
                self.emit_with(Opcode::Return, |i| i.op1 = operand);
            }
            Stmt::Expression { expr, .. } => {
                self.compile_expr(expr);
            }
            Stmt::If {
                condition,
                then_block,
                else_block,
                ..
            } => self.compile_if(condition, then_block, *else_block),
            Stmt::While { condition, body, .. } => self.compile_while(condition, body),
            Stmt::DoWhile { body, condition, .. } => self.compile_do_while(body, condition),
            Stmt::For {
                init,
                condition,
                loop_expr,
                body,
                ..
            } => self.compile_for(init, condition, loop_expr, body),
            Stmt::Foreach {
                expr,
                key_var,
                value_var,
                body,
                ..
            } => self.compile_foreach(expr, *key_var, value_var, body),
            Stmt::Block { statements, .. } => self.compile_stmts(statements),
            Stmt::Function {
                name, params, body, ..
            } => self.compile_named_function(name.text(self.source), params, body),
            Stmt::Class {
                name,
                members,
                ..
            } => self.compile_class(name.text(self.source), members),
            Stmt::Interface { .. } | Stmt::Trait { .. } | Stmt::Enum { .. } => {
                // Interfaces, traits, and enum member resolution are a
                // runtime-class-table concern; no instructions are emitted
                // for their declarations themselves.
            }
            Stmt::Namespace { body, .. } => {
                if let Some(body) = body {
                    self.compile_stmts(body);
                }
            }
            Stmt::Use { .. } | Stmt::Const { .. } | Stmt::Global { .. } => {
                // Name-resolution bookkeeping only; nothing to execute.
            }
            Stmt::Switch { condition, cases, .. } => self.compile_switch(condition, cases),
            Stmt::Try { body, catches, finally, .. } => {
                self.compile_try(body, catches, *finally)
            }
            Stmt::Throw { expr, .. } => {
                let operand = self.compile_expr(expr);
                self.emit_with(Opcode::Throw, |i| i.op1 = operand);
            }
            Stmt::Break { level, .. } => self.compile_break_continue(*level, true),
            Stmt::Continue { level, .. } => self.compile_break_continue(*level, false),
            Stmt::Static { vars, .. } => {
                for var in *vars {
                    let operand = self.resolve_var_operand(variable_name_bytes(var.var, self.source));
                    if let Some(default) = var.default {
                        let value = self.compile_expr(default);
                        self.emit_with(Opcode::Assign, |i| {
                            i.op1 = operand;
                            i.op2 = value;
                        });
                    }
                }
            }
            Stmt::Unset { vars, .. } => {
                for var in *vars {
                    if let Expr::ArrayDimFetch { array, dim: Some(dim), .. } = *var {
                        let arr = self.compile_expr(array);
                        let key = self.compile_expr(dim);
                        self.emit_with(Opcode::UnsetDim, |i| {
                            i.op1 = arr;
                            i.op2 = key;
                        });
                    }
                    // Unsetting a plain local is a frame-lifetime concern for
                    // the dispatch loop; no opcode is needed at compile time.
                }
            }
            Stmt::InlineHtml { value, .. } => {
                let operand = self.const_operand(Value::str(value.to_vec()));
                self.emit_with(Opcode::Echo, |i| i.op1 = operand);
            }
            Stmt::Label { name, .. } => {
                let sym = self.intern_bytes(name.text(self.source));
                let here = self.frame.chunk.len() as u32;
                self.frame.labels.insert(sym, here);
            }
            Stmt::Goto { label, .. } => {
                let sym = self.intern_bytes(label.text(self.source));
                let idx = self.emit(Opcode::Jmp);
                self.at(idx).op1 = Operand::jump(0);
                self.frame.pending_gotos.push((idx, sym));
            }
            Stmt::Declare { body, .. } => self.compile_stmts(body),
            Stmt::Nop { .. } | Stmt::Error { .. } | Stmt::HaltCompiler { .. } => {}
        }
    }

    fn compile_if(
        &mut self,
        condition: &Expr<'_>,
        then_block: &[StmtId<'_>],
        else_block: Option<&[StmtId<'_>]>,
    ) {
        let cond = self.compile_expr(condition);
        let jmpz = self.emit_cond_jump(Opcode::JmpZ, cond);
        self.compile_stmts(then_block);
        match else_block {
            Some(else_block) => {
                let jmp_end = self.emit_jump();
                self.frame.chunk.patch_jump_to_here(jmpz);
                self.compile_stmts(else_block);
                self.frame.chunk.patch_jump_to_here(jmp_end);
            }
            None => self.frame.chunk.patch_jump_to_here(jmpz),
        }
    }

    fn compile_while(&mut self, condition: &Expr<'_>, body: &[StmtId<'_>]) {
        let loop_start = self.frame.chunk.len();
        let cond = self.compile_expr(condition);
        let jmpz = self.emit_cond_jump(Opcode::JmpZ, cond);
        self.frame.loop_stack.push(LoopInfo { break_jumps: Vec::new(), continue_jumps: Vec::new() });
        self.compile_stmts(body);
        let loop_info = self.frame.loop_stack.pop().unwrap();
        for idx in loop_info.continue_jumps {
            self.frame.chunk.patch_jump(idx, loop_start as u32);
        }
        let jmp_back = self.emit(Opcode::Jmp);
        self.at(jmp_back).op1 = Operand::jump(loop_start as u32);
        self.frame.chunk.patch_jump_to_here(jmpz);
        for idx in loop_info.break_jumps {
            self.frame.chunk.patch_jump_to_here(idx);
        }
    }

    fn compile_do_while(&mut self, body: &[StmtId<'_>], condition: &Expr<'_>) {
        let body_start = self.frame.chunk.len();
        self.frame.loop_stack.push(LoopInfo { break_jumps: Vec::new(), continue_jumps: Vec::new() });
        self.compile_stmts(body);
        let cond_start = self.frame.chunk.len();
        let loop_info = self.frame.loop_stack.pop().unwrap();
        for idx in loop_info.continue_jumps {
            self.frame.chunk.patch_jump(idx, cond_start as u32);
        }
        let cond = self.compile_expr(condition);
        let jmpnz = self.emit(Opcode::JmpNz);
        self.at(jmpnz).op1 = cond;
        self.at(jmpnz).op2 = Operand::jump(body_start as u32);
        for idx in loop_info.break_jumps {
            self.frame.chunk.patch_jump_to_here(idx);
        }
    }

    fn compile_for(
        &mut self,
        init: &[ExprId<'_>],
        condition: &[ExprId<'_>],
        loop_expr: &[ExprId<'_>],
        body: &[StmtId<'_>],
    ) {
        for expr in init {
            self.compile_expr(expr);
        }
        let loop_start = self.frame.chunk.len();
        let jmpz = condition.last().map(|cond| {
            let operand = self.compile_expr(cond);
            self.emit_cond_jump(Opcode::JmpZ, operand)
        });
        self.frame.loop_stack.push(LoopInfo { break_jumps: Vec::new(), continue_jumps: Vec::new() });
        self.compile_stmts(body);
        let continue_target = self.frame.chunk.len();
        let loop_info = self.frame.loop_stack.pop().unwrap();
        for idx in loop_info.continue_jumps {
            self.frame.chunk.patch_jump(idx, continue_target as u32);
        }
        for expr in loop_expr {
            self.compile_expr(expr);
        }
        let jmp_back = self.emit(Opcode::Jmp);
        self.at(jmp_back).op1 = Operand::jump(loop_start as u32);
        if let Some(jmpz) = jmpz {
            self.frame.chunk.patch_jump_to_here(jmpz);
        }
        for idx in loop_info.break_jumps {
            self.frame.chunk.patch_jump_to_here(idx);
        }
    }

    fn compile_foreach(
        &mut self,
        expr: &Expr<'_>,
        key_var: Option<ExprId<'_>>,
        value_var: &Expr<'_>,
        body: &[StmtId<'_>],
    ) {
        let source = self.compile_expr(expr);
        let iter = self.new_temp();
        self.emit_with(Opcode::IterInit, |i| {
            i.op1 = source;
            i.op3 = iter;
        });
        let loop_start = self.frame.chunk.len();
        let jmpz = self.emit(Opcode::IterValid);
        self.at(jmpz).op1 = iter;
        self.at(jmpz).op2 = Operand::jump(0); // patched below, target = after loop

        if let Some(key_var) = key_var {
            let key_dest = self.compile_lvalue(key_var);
            self.emit_with(Opcode::IterGetKey, |i| {
                i.op1 = iter;
                i.op3 = key_dest;
            });
        }
        let value_dest = self.compile_lvalue(value_var);
        self.emit_with(Opcode::IterGetVal, |i| {
            i.op1 = iter;
            i.op3 = value_dest;
        });

        self.frame.loop_stack.push(LoopInfo { break_jumps: Vec::new(), continue_jumps: Vec::new() });
        self.compile_stmts(body);
        let continue_target = self.frame.chunk.len();
        let loop_info = self.frame.loop_stack.pop().unwrap();
        for idx in loop_info.continue_jumps {
            self.frame.chunk.patch_jump(idx, continue_target as u32);
        }
        self.emit_with(Opcode::IterNext, |i| i.op1 = iter);
        let jmp_back = self.emit(Opcode::Jmp);
        self.at(jmp_back).op1 = Operand::jump(loop_start as u32);
        self.frame.chunk.patch_jump_to_here(jmpz);
        self.emit_with(Opcode::IterFree, |i| i.op1 = iter);
        for idx in loop_info.break_jumps {
            self.frame.chunk.patch_jump_to_here(idx);
        }
    }

    fn compile_switch(&mut self, condition: &Expr<'_>, cases: &[crate::parser::ast::Case<'_>]) {
        let subject = self.compile_expr(condition);
        self.frame.loop_stack.push(LoopInfo { break_jumps: Vec::new(), continue_jumps: Vec::new() });

        // Phase 1: test every case's condition against the subject with a
        // loose-equality comparison, each test a forward jump (placeholder
        // target) into that case's body. `default`'s placement is recorded
        // but not tested here — it only runs when nothing else matches.
        let mut case_tests: Vec<Option<usize>> = Vec::with_capacity(cases.len());
        let mut default_index = None;
        for (i, case) in cases.iter().enumerate() {
            match case.condition {
                Some(cond) => {
                    let value = self.compile_expr(cond);
                    let cmp = self.new_temp();
                    self.emit_with(Opcode::IsEqual, |ins| {
                        ins.op1 = subject;
                        ins.op2 = value;
                        ins.op3 = cmp;
                    });
                    case_tests.push(Some(self.emit_cond_jump(Opcode::JmpNz, cmp)));
                }
                None => {
                    default_index = Some(i);
                    case_tests.push(None);
                }
            }
        }
        let fallback_jmp = self.emit_jump();

        // Phase 2: emit every case's body in source order (so fall-through
        // between cases, absent an explicit `break`, works naturally),
        // recording where each one starts.
        let mut case_starts = vec![0u32; cases.len()];
        for (i, case) in cases.iter().enumerate() {
            case_starts[i] = self.frame.chunk.len() as u32;
            self.compile_stmts(case.body);
        }
        let end = self.frame.chunk.len() as u32;

        for (i, test) in case_tests.into_iter().enumerate() {
            if let Some(idx) = test {
                self.frame.chunk.patch_jump(idx, case_starts[i]);
            }
        }
        let fallback_target = default_index.map(|i| case_starts[i]).unwrap_or(end);
        self.frame.chunk.patch_jump(fallback_jmp, fallback_target);

        let loop_info = self.frame.loop_stack.pop().unwrap();
        for idx in loop_info.break_jumps {
            self.frame.chunk.patch_jump(idx, end);
        }
        for idx in loop_info.continue_jumps {
            self.frame.chunk.patch_jump(idx, end);
        }
    }

    fn compile_try(
        &mut self,
        body: &[StmtId<'_>],
        catches: &[crate::parser::ast::Catch<'_>],
        finally: Option<&[StmtId<'_>]>,
    ) {
        self.emit(Opcode::CatchBegin);
        self.compile_stmts(body);
        self.emit(Opcode::CatchEnd);
        let jmp_past_catches = self.emit_jump();
        for catch in catches {
            if let Some(var) = catch.var {
                self.resolve_var_operand(var.text(self.source));
            }
            self.compile_stmts(catch.body);
        }
        self.frame.chunk.patch_jump_to_here(jmp_past_catches);
        if let Some(finally) = finally {
            self.compile_stmts(finally);
        }
    }

    fn compile_break_continue(&mut self, level: Option<ExprId<'_>>, is_break: bool) {
        let level = match level {
            Some(Expr::Integer { value, .. }) => {
                String::from_utf8_lossy(value).parse::<usize>().unwrap_or(1)
            }
            _ => 1,
        };
        let depth = self.frame.loop_stack.len();
        if level == 0 || level > depth {
            return;
        }
        let target_idx = depth - level;
        let idx = self.emit(Opcode::Jmp);
        self.at(idx).op1 = Operand::jump(0);
        if is_break {
            self.frame.loop_stack[target_idx].break_jumps.push(idx);
        } else {
            self.frame.loop_stack[target_idx].continue_jumps.push(idx);
        }
    }

    // ---- functions, closures, classes -----------------------------------

    fn bind_params(&mut self, params: &[Param<'_>]) -> Vec<ParamInfo> {
        params
            .iter()
            .map(|param| {
                let name = self.intern_bytes(param.name.text(self.source));
                let sym = self.symbols.define(name);
                self.slot_for(sym);
                if let Some(default) = param.default {
                    // Default-value expressions are compiled lazily by the
                    // dispatch loop against the caller's argument count;
                    // here we only need the constant/expression recorded.
                    let _ = self.compile_expr(default);
                }
                ParamInfo {
                    name,
                    has_default: param.default.is_some(),
                    by_ref: param.by_ref,
                    variadic: param.variadic,
                }
            })
            .collect()
    }

    fn compile_named_function(&mut self, name_bytes: &[u8], params: &[Param<'_>], body: &[StmtId<'_>]) {
        let name = self.intern_bytes(name_bytes);
        let outer_symbols = mem::replace(&mut self.symbols, SymbolTable::new());
        let outer_frame = mem::replace(&mut self.frame, Frame::default());

        let param_infos = self.bind_params(params);
        self.compile_stmts(body);
        self.resolve_pending_gotos();

        let mut frame = mem::replace(&mut self.frame, outer_frame);
        frame.chunk.num_locals = frame.next_local;
        self.symbols = outer_symbols;

        self.functions.insert(
            name,
            FunctionEntry {
                name,
                params: param_infos,
                captures: Vec::new(),
                chunk: frame.chunk,
            },
        );
    }

    fn compile_class(&mut self, name_bytes: &[u8], members: &[ClassMember<'_>]) {
        let name = self.intern_bytes(name_bytes);
        let mut entry = ClassEntry { name, methods: indexmap::IndexMap::new() };
        for member in members {
            if let ClassMember::Method {
                name: method_name,
                params,
                body,
                ..
            } = member
            {
                let method_sym = self.intern_bytes(method_name.text(self.source));
                let outer_symbols = mem::replace(&mut self.symbols, SymbolTable::new());
                let outer_frame = mem::replace(&mut self.frame, Frame::default());

                let param_infos = self.bind_params(params);
                self.compile_stmts(body);
                self.resolve_pending_gotos();

                let mut frame = mem::replace(&mut self.frame, outer_frame);
                frame.chunk.num_locals = frame.next_local;
                self.symbols = outer_symbols;

                entry.methods.insert(
                    method_sym,
                    FunctionEntry {
                        name: method_sym,
                        params: param_infos,
                        captures: Vec::new(),
                        chunk: frame.chunk,
                    },
                );
            }
        }
        self.classes.insert(name, entry);
    }

    /// Compile a `Closure` body with an explicit `use(...)` capture list
    /// (by-value unless `ClosureUse::by_ref`), returning its chunk index
    /// into `self.closures`.
    fn compile_closure(
        &mut self,
        params: &[Param<'_>],
        uses: &[crate::parser::ast::ClosureUse<'_>],
        body: &[StmtId<'_>],
    ) -> u32 {
        let capture_names: Vec<(Symbol, bool)> = uses
            .iter()
            .map(|u| (self.intern_bytes(u.var.text(self.source)), u.by_ref))
            .collect();
        self.compile_closure_with_captures(params, &capture_names, |emitter| {
            emitter.compile_stmts(body)
        })
    }

    /// Compile an arrow function: all outer-scope variables it references
    /// are captured by value automatically, matching `fn($x) => ...`
    /// semantics, so the capture list is discovered rather than declared.
    fn compile_arrow_function(&mut self, params: &[Param<'_>], expr: ExprId<'_>) -> u32 {
        let param_names: std::collections::HashSet<&[u8]> = params
            .iter()
            .map(|p| p.name.text(self.source))
            .collect();
        let mut collector = VariableCollector {
            source: self.source,
            exclude: param_names,
            seen: std::collections::HashSet::new(),
            found: Vec::new(),
        };
        collector.visit_expr(expr);
        let capture_names: Vec<(Symbol, bool)> = collector
            .found
            .into_iter()
            .map(|bytes| (self.intern_bytes(&bytes), false))
            .collect();
        self.compile_closure_with_captures(params, &capture_names, |emitter| {
            let operand = emitter.compile_expr(expr);
            emitter.emit_with(Opcode::Return, |i| i.op1 = operand);
        })
    }

    fn compile_closure_with_captures(
        &mut self,
        params: &[Param<'_>],
        capture_names: &[(Symbol, bool)],
        compile_body: impl FnOnce(&mut Self),
    ) -> u32 {
        self.symbols.enter_scope();
        let outer_frame = mem::replace(&mut self.frame, Frame::default());

        let mut captures = Vec::with_capacity(capture_names.len());
        for &(name, _) in capture_names {
            let outer = self.resolve_or_define(name);
            self.slot_for(outer);
            captures.push(outer);
        }
        let param_infos = self.bind_params(params);
        compile_body(self);
        self.resolve_pending_gotos();

        let _ = self.symbols.exit_scope();
        let mut frame = mem::replace(&mut self.frame, outer_frame);
        frame.chunk.num_locals = frame.next_local;

        let closure_index = self.closures.len() as u32;
        self.closures.push(FunctionEntry {
            name: Symbol(u32::MAX),
            params: param_infos,
            captures,
            chunk: frame.chunk,
        });

        for &(name, by_ref) in capture_names {
            let outer_operand = self.resolve_var_operand_from_symbol(name);
            let opcode = if by_ref { Opcode::BindUseRef } else { Opcode::BindUse };
            self.emit_with(opcode, |i| {
                i.op1 = outer_operand;
                i.extended_value = closure_index;
            });
        }
        closure_index
    }

    fn resolve_var_operand_from_symbol(&mut self, name: Symbol) -> Operand {
        let sym = self.resolve_or_define(name);
        Operand::compiled_var(self.slot_for(sym))
    }

    // ---- expressions -----------------------------------------------------

    fn compile_expr(&mut self, expr: &Expr<'_>) -> Operand {
        match expr {
            Expr::Integer { value, .. } => {
                let n = String::from_utf8_lossy(value)
                    .replace('_', "")
                    .parse::<i64>()
                    .unwrap_or(0);
                self.const_operand(Value::Int(n))
            }
            Expr::Float { value, .. } => {
                let n: f64 = String::from_utf8_lossy(value).replace('_', "").parse().unwrap_or(0.0);
                self.const_operand(Value::Float(n))
            }
            Expr::Boolean { value, .. } => self.const_operand(Value::Bool(*value)),
            Expr::Null { .. } => self.const_operand(Value::Null),
            Expr::String { value, .. } => self.const_operand(Value::str(unescape_string(value))),
            Expr::Variable { name, .. } => self.resolve_var_operand(name.as_str(self.source)),
            Expr::InterpolatedString { parts, .. } => self.compile_interpolated(parts),
            Expr::Binary { left, op, right, .. } => self.compile_binary(left, *op, right),
            Expr::Unary { op, expr, .. } => self.compile_unary(*op, expr),
            Expr::PostInc { var, .. } => self.compile_incdec(var, Opcode::PostInc),
            Expr::PostDec { var, .. } => self.compile_incdec(var, Opcode::PostDec),
            Expr::Assign { var, expr, .. } => self.compile_assign(var, expr),
            Expr::AssignRef { var, expr, .. } => {
                let dest = self.compile_lvalue(var);
                let src = self.compile_expr(expr);
                self.emit_with(Opcode::AssignRef, |i| {
                    i.op1 = dest;
                    i.op2 = src;
                });
                dest
            }
            Expr::AssignOp { var, op, expr, .. } => self.compile_assign_op(var, *op, expr),
            Expr::Ternary {
                condition,
                if_true,
                if_false,
                ..
            } => self.compile_ternary(condition, *if_true, if_false),
            Expr::Cast { kind, expr, .. } => self.compile_cast(*kind, expr),
            Expr::Clone { expr, .. } => {
                let operand = self.compile_expr(expr);
                let dest = self.new_temp();
                self.emit_with(Opcode::CloneOp, |i| {
                    i.op1 = operand;
                    i.op3 = dest;
                });
                dest
            }
            Expr::Array { items, .. } => self.compile_array(items),
            Expr::ArrayDimFetch { array, dim, .. } => {
                let arr = self.compile_expr(array);
                let dest = self.new_temp();
                match dim {
                    Some(dim) => {
                        let key = self.compile_expr(dim);
                        self.emit_with(Opcode::FetchDimR, |i| {
                            i.op1 = arr;
                            i.op2 = key;
                            i.op3 = dest;
                        });
                    }
                    None => {
                        self.emit_with(Opcode::FetchDimR, |i| {
                            i.op1 = arr;
                            i.op3 = dest;
                        });
                    }
                }
                dest
            }
            Expr::PropertyFetch { target, property, .. }
            | Expr::NullsafePropertyFetch { target, property, .. } => {
                let obj = self.compile_expr(target);
                let name = self.property_name_operand(property);
                let dest = self.new_temp();
                self.emit_with(Opcode::FetchProp, |i| {
                    i.op1 = obj;
                    i.op2 = name;
                    i.op3 = dest;
                });
                dest
            }
            Expr::ClassConstFetch { class, constant, .. } => {
                let class_operand = self.class_name_operand(class);
                let name = self.property_name_operand(constant);
                let dest = self.new_temp();
                self.emit_with(Opcode::FetchClassConst, |i| {
                    i.op1 = class_operand;
                    i.op2 = name;
                    i.op3 = dest;
                });
                dest
            }
            Expr::New { class, args, .. } => {
                let class_operand = self.class_name_operand(class);
                let dest = self.new_temp();
                self.emit_with(Opcode::New, |i| {
                    i.op1 = class_operand;
                    i.op3 = dest;
                });
                for arg in *args {
                    let value = self.compile_expr(arg.value);
                    self.emit_with(Opcode::SendVal, |i| i.op1 = value);
                }
                dest
            }
            Expr::Call { func, args, .. } => self.compile_call(func, args, None),
            Expr::MethodCall { target, method, args, .. }
            | Expr::NullsafeMethodCall { target, method, args, .. } => {
                self.compile_call(method, args, Some(target))
            }
            Expr::StaticCall { class, method, args, .. } => {
                let class_operand = self.class_name_operand(class);
                let method_operand = self.property_name_operand(method);
                self.emit_with(Opcode::InitStaticMethodCall, |i| {
                    i.op1 = class_operand;
                    i.op2 = method_operand;
                });
                self.emit_call_args(args);
                let dest = self.new_temp();
                self.emit_with(Opcode::DoFcall, |i| i.op3 = dest);
                dest
            }
            Expr::Print { expr, .. } => {
                let operand = self.compile_expr(expr);
                self.emit_with(Opcode::Echo, |i| i.op1 = operand);
                self.const_operand(Value::Int(1))
            }
            Expr::Isset { vars, .. } => {
                let dest = self.new_temp();
                let mut result = self.const_operand(Value::Bool(true));
                for var in *vars {
                    if let Expr::ArrayDimFetch { array, dim: Some(dim), .. } = *var {
                        let arr = self.compile_expr(array);
                        let key = self.compile_expr(dim);
                        self.emit_with(Opcode::FetchDimIsset, |i| {
                            i.op1 = arr;
                            i.op2 = key;
                            i.op3 = dest;
                        });
                        result = dest;
                    } else {
                        let _ = self.compile_expr(var);
                    }
                }
                result
            }
            Expr::Empty { expr, .. } => {
                let operand = self.compile_expr(expr);
                let dest = self.new_temp();
                self.emit_with(Opcode::BoolNot, |i| {
                    i.op1 = operand;
                    i.op3 = dest;
                });
                dest
            }
            Expr::Match { condition, arms, .. } => self.compile_match(condition, arms),
            Expr::Closure {
                params, uses, body, ..
            } => {
                let closure_index = self.compile_closure(params, uses, body);
                self.const_operand(Value::Int(closure_index as i64))
            }
            Expr::ArrowFunction { params, expr, .. } => {
                let closure_index = self.compile_arrow_function(params, expr);
                self.const_operand(Value::Int(closure_index as i64))
            }
            Expr::MagicConst { .. } => self.const_operand(Value::Null),
            Expr::Die { expr, .. } | Expr::Exit { expr, .. } => {
                if let Some(expr) = expr {
                    self.compile_expr(expr);
                }
                self.emit(Opcode::Return);
                self.const_operand(Value::Null)
            }
            Expr::Eval { expr, .. } | Expr::Include { expr, .. } => {
                self.compile_expr(expr)
            }
            Expr::ShellExec { parts, .. } => self.compile_interpolated(parts),
            Expr::IndirectVariable { name, .. } => self.compile_expr(name),
            Expr::Yield { value, .. } => match value {
                Some(v) => self.compile_expr(v),
                None => self.const_operand(Value::Null),
            },
            Expr::AnonymousClass { .. } | Expr::VariadicPlaceholder { .. } | Expr::Error { .. } => {
                self.const_operand(Value::Null)
            }
        }
    }

    fn emit_call_args(&mut self, args: &[crate::parser::ast::Arg<'_>]) {
        for arg in args {
            let value = self.compile_expr(arg.value);
            self.emit_with(Opcode::SendVal, |i| i.op1 = value);
        }
    }

    fn compile_call(
        &mut self,
        func: &Expr<'_>,
        args: &[crate::parser::ast::Arg<'_>],
        method_target: Option<&Expr<'_>>,
    ) -> Operand {
        match method_target {
            Some(target) => {
                let obj = self.compile_expr(target);
                let method_operand = self.property_name_operand(func);
                self.emit_with(Opcode::InitMethodCall, |i| {
                    i.op1 = obj;
                    i.op2 = method_operand;
                });
            }
            None => {
                let name_operand = self.callee_name_operand(func);
                self.emit_with(Opcode::InitFcall, |i| i.op1 = name_operand);
            }
        }
        self.emit_call_args(args);
        let dest = self.new_temp();
        self.emit_with(Opcode::DoFcall, |i| i.op3 = dest);
        dest
    }

    fn callee_name_operand(&mut self, func: &Expr<'_>) -> Operand {
        match func {
            Expr::Error { span } | Expr::Variable { span, .. } => {
                let bytes = span.as_str(self.source);
                self.const_operand(Value::str(bytes.to_vec()))
            }
            other => {
                let bytes = other.span().as_str(self.source);
                self.const_operand(Value::str(bytes.to_vec()))
            }
        }
    }

    fn property_name_operand(&mut self, expr: &Expr<'_>) -> Operand {
        let bytes = expr.span().as_str(self.source);
        self.const_operand(Value::str(bytes.to_vec()))
    }

    fn class_name_operand(&mut self, expr: &Expr<'_>) -> Operand {
        if matches!(expr, Expr::Variable { .. }) {
            return self.compile_expr(expr);
        }
        let bytes = expr.span().as_str(self.source);
        self.const_operand(Value::str(bytes.to_vec()))
    }

    fn compile_interpolated(&mut self, parts: &[ExprId<'_>]) -> Operand {
        let mut acc = self.const_operand(Value::str(Vec::new()));
        for part in parts {
            let piece = self.compile_expr(part);
            let dest = self.new_temp();
            self.emit_with(Opcode::Concat, |i| {
                i.op1 = acc;
                i.op2 = piece;
                i.op3 = dest;
            });
            acc = dest;
        }
        acc
    }

    fn compile_array(&mut self, items: &[crate::parser::ast::ArrayItem<'_>]) -> Operand {
        let dest = self.new_temp();
        self.emit_with(Opcode::InitArray, |i| i.op3 = dest);
        for item in items {
            let value = self.compile_expr(item.value);
            match item.key {
                Some(key) => {
                    let key_operand = self.compile_expr(key);
                    self.emit_with(Opcode::AddArrayElement, |i| {
                        i.op1 = value;
                        i.op2 = key_operand;
                        i.op3 = dest;
                    });
                }
                None => {
                    self.emit_with(Opcode::AddArrayElement, |i| {
                        i.op1 = value;
                        i.op3 = dest;
                    });
                }
            }
        }
        dest
    }

    /// Compile `var` for use as a write target, returning the operand that
    /// later writes should target. Only variables and array-dim fetches are
    /// supported destinations here; property writes go through
    /// `compile_assign`'s own `AssignProp` path.
    fn compile_lvalue(&mut self, var: &Expr<'_>) -> Operand {
        match var {
            Expr::Variable { name, .. } => self.resolve_var_operand(name.as_str(self.source)),
            Expr::ArrayDimFetch { array, dim, .. } => {
                let arr = self.compile_expr(array);
                let dest = self.new_temp();
                match dim {
                    Some(dim) => {
                        let key = self.compile_expr(dim);
                        self.emit_with(Opcode::FetchDimW, |i| {
                            i.op1 = arr;
                            i.op2 = key;
                            i.op3 = dest;
                        });
                    }
                    None => {
                        self.emit_with(Opcode::FetchDimW, |i| {
                            i.op1 = arr;
                            i.op3 = dest;
                        });
                    }
                }
                dest
            }
            other => self.compile_expr(other),
        }
    }

    fn compile_assign(&mut self, var: &Expr<'_>, expr: &Expr<'_>) -> Operand {
        if let Expr::PropertyFetch { target, property, .. } = var {
            let obj = self.compile_expr(target);
            let name = self.property_name_operand(property);
            let value = self.compile_expr(expr);
            self.emit_with(Opcode::AssignProp, |i| {
                i.op1 = obj;
                i.op2 = name;
                i.op3 = value;
            });
            return value;
        }
        if let Expr::ArrayDimFetch { array, dim, .. } = var {
            let arr = self.compile_expr(array);
            let value = match dim {
                Some(dim) => {
                    let key = self.compile_expr(dim);
                    let value = self.compile_expr(expr);
                    self.emit_with(Opcode::FetchDimW, |i| {
                        i.op1 = arr;
                        i.op2 = key;
                        i.op3 = value;
                    });
                    value
                }
                None => {
                    let value = self.compile_expr(expr);
                    self.emit_with(Opcode::AddArrayElement, |i| {
                        i.op1 = value;
                        i.op3 = arr;
                    });
                    value
                }
            };
            return value;
        }
        let dest = self.compile_lvalue(var);
        let value = self.compile_expr(expr);
        self.emit_with(Opcode::Assign, |i| {
            i.op1 = dest;
            i.op2 = value;
        });
        dest
    }

    fn compile_assign_op(&mut self, var: &Expr<'_>, op: AssignOp, expr: &Expr<'_>) -> Operand {
        let dest = self.compile_lvalue(var);
        let value = self.compile_expr(expr);
        self.emit_with(Opcode::AssignOp, |i| {
            i.op1 = dest;
            i.op2 = value;
            i.extended_value = assign_op_extended(op);
        });
        dest
    }

    fn compile_incdec(&mut self, var: &Expr<'_>, opcode: Opcode) -> Operand {
        let dest = self.compile_lvalue(var);
        let result = self.new_temp();
        self.emit_with(opcode, |i| {
            i.op1 = dest;
            i.op3 = result;
        });
        result
    }

    fn compile_unary(&mut self, op: UnaryOp, expr: &Expr<'_>) -> Operand {
        match op {
            UnaryOp::PreInc => self.compile_preincdec(expr, Opcode::PreInc),
            UnaryOp::PreDec => self.compile_preincdec(expr, Opcode::PreDec),
            UnaryOp::Reference => self.compile_lvalue(expr),
            UnaryOp::ErrorSuppress => self.compile_expr(expr),
            UnaryOp::Plus => {
                let zero = self.const_operand(Value::Int(0));
                let operand = self.compile_expr(expr);
                let dest = self.new_temp();
                self.emit_with(Opcode::Add, |i| {
                    i.op1 = zero;
                    i.op2 = operand;
                    i.op3 = dest;
                });
                dest
            }
            UnaryOp::Minus => {
                let zero = self.const_operand(Value::Int(0));
                let operand = self.compile_expr(expr);
                let dest = self.new_temp();
                self.emit_with(Opcode::Sub, |i| {
                    i.op1 = zero;
                    i.op2 = operand;
                    i.op3 = dest;
                });
                dest
            }
            UnaryOp::Not => {
                let operand = self.compile_expr(expr);
                let dest = self.new_temp();
                self.emit_with(Opcode::BoolNot, |i| {
                    i.op1 = operand;
                    i.op3 = dest;
                });
                dest
            }
            UnaryOp::BitNot => {
                let operand = self.compile_expr(expr);
                let dest = self.new_temp();
                self.emit_with(Opcode::BitNot, |i| {
                    i.op1 = operand;
                    i.op3 = dest;
                });
                dest
            }
        }
    }

    fn compile_preincdec(&mut self, var: &Expr<'_>, opcode: Opcode) -> Operand {
        let dest = self.compile_lvalue(var);
        self.emit_with(opcode, |i| {
            i.op1 = dest;
            i.op3 = dest;
        });
        dest
    }

    fn compile_cast(&mut self, kind: CastKind, expr: &Expr<'_>) -> Operand {
        let operand = self.compile_expr(expr);
        let dest = self.new_temp();
        self.emit_with(Opcode::Cast, |i| {
            i.op1 = operand;
            i.op3 = dest;
            i.extended_value = cast_kind_extended(kind);
        });
        dest
    }

    fn compile_ternary(
        &mut self,
        condition: &Expr<'_>,
        if_true: Option<ExprId<'_>>,
        if_false: &Expr<'_>,
    ) -> Operand {
        let dest = self.new_temp();
        match if_true {
            Some(if_true) => {
                let cond = self.compile_expr(condition);
                let jmpz = self.emit_cond_jump(Opcode::JmpZ, cond);
                let t = self.compile_expr(if_true);
                self.emit_with(Opcode::QmAssign, |i| {
                    i.op1 = t;
                    i.op3 = dest;
                });
                let jmp_end = self.emit_jump();
                self.frame.chunk.patch_jump_to_here(jmpz);
                let f = self.compile_expr(if_false);
                self.emit_with(Opcode::QmAssign, |i| {
                    i.op1 = f;
                    i.op3 = dest;
                });
                self.frame.chunk.patch_jump_to_here(jmp_end);
            }
            None => {
                let cond = self.compile_expr(condition);
                let jmpset = self.emit(Opcode::JmpSet);
                self.at(jmpset).tap(|i| {
                    i.op1 = cond;
                    i.op2 = Operand::jump(0);
                    i.op3 = dest;
                });
                let f = self.compile_expr(if_false);
                self.emit_with(Opcode::QmAssign, |i| {
                    i.op1 = f;
                    i.op3 = dest;
                });
                self.frame.chunk.patch_jump_to_here(jmpset);
            }
        }
        dest
    }

    fn compile_match(&mut self, condition: &Expr<'_>, arms: &[MatchArm<'_>]) -> Operand {
        let subject = self.compile_expr(condition);
        let dest = self.new_temp();
        let mut end_jumps = Vec::new();
        let mut default_arm = None;

        // Arms lay out sequentially: each arm's `IsIdentical` tests (one per
        // comma-separated condition, matching any of them selects the arm),
        // then its body, then the next arm's tests — so no cross-arm
        // back-patching is needed, only within-arm jumps to "this arm's body"
        // and "the next arm's tests".
        for arm in arms {
            let Some(conditions) = arm.conditions else {
                default_arm = Some(arm);
                continue;
            };
            let mut match_jumps = Vec::with_capacity(conditions.len());
            for &cond in conditions {
                let value = self.compile_expr(cond);
                let cmp = self.new_temp();
                self.emit_with(Opcode::IsIdentical, |i| {
                    i.op1 = subject;
                    i.op2 = value;
                    i.op3 = cmp;
                });
                match_jumps.push(self.emit_cond_jump(Opcode::JmpNz, cmp));
            }
            let next_arm_jmp = self.emit_jump();
            for idx in match_jumps {
                self.frame.chunk.patch_jump_to_here(idx);
            }
            let body = self.compile_expr(arm.body);
            self.emit_with(Opcode::QmAssign, |i| {
                i.op1 = body;
                i.op3 = dest;
            });
            end_jumps.push(self.emit_jump());
            self.frame.chunk.patch_jump_to_here(next_arm_jmp);
        }
        match default_arm {
            Some(arm) => {
                let body = self.compile_expr(arm.body);
                self.emit_with(Opcode::QmAssign, |i| {
                    i.op1 = body;
                    i.op3 = dest;
                });
            }
            None => {
                self.emit_with(Opcode::MatchError, |i| i.op1 = subject);
            }
        }
        for idx in end_jumps {
            self.frame.chunk.patch_jump_to_here(idx);
        }
        dest
    }

    fn compile_binary(&mut self, left: &Expr<'_>, op: BinaryOp, right: &Expr<'_>) -> Operand {
        match op {
            BinaryOp::LogicalAnd | BinaryOp::And => self.compile_logical(left, right, true),
            BinaryOp::LogicalOr | BinaryOp::Or => self.compile_logical(left, right, false),
            BinaryOp::Coalesce => {
                let l = self.compile_expr(left);
                let r = self.compile_expr(right);
                let dest = self.new_temp();
                self.emit_with(Opcode::Coalesce, |i| {
                    i.op1 = l;
                    i.op2 = r;
                    i.op3 = dest;
                });
                dest
            }
            BinaryOp::Gt | BinaryOp::GtEq => {
                // No dedicated "greater than" opcode: `a > b` compiles as
                // `b < a` with operands swapped, same as `a >= b` / `b <= a`.
                let l = self.compile_expr(left);
                let r = self.compile_expr(right);
                let dest = self.new_temp();
                self.emit_with(binary_opcode(op), |i| {
                    i.op1 = r;
                    i.op2 = l;
                    i.op3 = dest;
                });
                dest
            }
            _ => {
                let l = self.compile_expr(left);
                let r = self.compile_expr(right);
                let dest = self.new_temp();
                self.emit_with(binary_opcode(op), |i| {
                    i.op1 = l;
                    i.op2 = r;
                    i.op3 = dest;
                });
                dest
            }
        }
    }

    fn compile_logical(&mut self, left: &Expr<'_>, right: &Expr<'_>, is_and: bool) -> Operand {
        let dest = self.new_temp();
        let l = self.compile_expr(left);
        let short_circuit = self.emit_cond_jump(if is_and { Opcode::JmpZ } else { Opcode::JmpNz }, l);
        let r = self.compile_expr(right);
        self.emit_with(Opcode::QmAssign, |i| {
            i.op1 = r;
            i.op3 = dest;
        });
        let jmp_end = self.emit_jump();
        self.frame.chunk.patch_jump_to_here(short_circuit);
        let short_value = self.const_operand(Value::Bool(!is_and));
        self.emit_with(Opcode::QmAssign, |i| {
            i.op1 = short_value;
            i.op3 = dest;
        });
        self.frame.chunk.patch_jump_to_here(jmp_end);
        dest
    }
}

trait Tap {
    fn tap(&mut self, f: impl FnOnce(&mut Self)) -> &mut Self;
}

impl Tap for Instruction {
    fn tap(&mut self, f: impl FnOnce(&mut Self)) -> &mut Self {
        f(self);
        self
    }
}

fn binary_opcode(op: BinaryOp) -> Opcode {
    match op {
        BinaryOp::Plus => Opcode::Add,
        BinaryOp::Minus => Opcode::Sub,
        BinaryOp::Mul => Opcode::Mul,
        BinaryOp::Div => Opcode::Div,
        BinaryOp::Mod => Opcode::Mod,
        BinaryOp::Pow => Opcode::Pow,
        BinaryOp::Concat => Opcode::Concat,
        BinaryOp::BitAnd => Opcode::BitAnd,
        BinaryOp::BitOr => Opcode::BitOr,
        BinaryOp::BitXor => Opcode::BitXor,
        BinaryOp::ShiftLeft => Opcode::ShiftLeft,
        BinaryOp::ShiftRight => Opcode::ShiftRight,
        BinaryOp::Eq | BinaryOp::EqEq => Opcode::IsEqual,
        BinaryOp::NotEq => Opcode::IsNotEqual,
        BinaryOp::EqEqEq => Opcode::IsIdentical,
        BinaryOp::NotEqEq => Opcode::IsNotIdentical,
        BinaryOp::Lt => Opcode::IsSmaller,
        BinaryOp::LtEq => Opcode::IsSmallerOrEqual,
        BinaryOp::Gt => Opcode::IsSmaller,
        BinaryOp::GtEq => Opcode::IsSmallerOrEqual,
        BinaryOp::Spaceship => Opcode::Spaceship,
        BinaryOp::Instanceof => Opcode::Instanceof,
        BinaryOp::LogicalXor => Opcode::BoolXor,
        BinaryOp::And | BinaryOp::Or | BinaryOp::LogicalAnd | BinaryOp::LogicalOr | BinaryOp::Coalesce => {
            unreachable!("short-circuit operators are lowered by compile_binary directly")
        }
    }
}

fn cast_kind_extended(kind: CastKind) -> u32 {
    match kind {
        CastKind::Int => cast_kind::INT,
        CastKind::Bool => cast_kind::BOOL,
        CastKind::Float => cast_kind::FLOAT,
        CastKind::String => cast_kind::STRING,
        CastKind::Array => cast_kind::ARRAY,
        CastKind::Object => cast_kind::OBJECT,
        CastKind::Unset | CastKind::Void => cast_kind::UNSET,
    }
}

fn assign_op_extended(op: AssignOp) -> u32 {
    match op {
        AssignOp::Plus => assign_op_kind::PLUS,
        AssignOp::Minus => assign_op_kind::MINUS,
        AssignOp::Mul => assign_op_kind::MUL,
        AssignOp::Div => assign_op_kind::DIV,
        AssignOp::Mod => assign_op_kind::MOD,
        AssignOp::Concat => assign_op_kind::CONCAT,
        AssignOp::BitAnd => assign_op_kind::BIT_AND,
        AssignOp::BitOr => assign_op_kind::BIT_OR,
        AssignOp::BitXor => assign_op_kind::BIT_XOR,
        AssignOp::ShiftLeft => assign_op_kind::SHIFT_LEFT,
        AssignOp::ShiftRight => assign_op_kind::SHIFT_RIGHT,
        AssignOp::Pow => assign_op_kind::POW,
        AssignOp::Coalesce => assign_op_kind::COALESCE,
    }
}

fn variable_name_bytes<'a>(expr: &'a Expr<'_>, source: &'a [u8]) -> &'a [u8] {
    match expr {
        Expr::Variable { name, .. } => name.as_str(source),
        other => other.span().as_str(source),
    }
}

/// Collects the distinct variable names an arrow-function body references,
/// excluding its own parameters — the implicit by-value capture list.
struct VariableCollector<'a> {
    source: &'a [u8],
    exclude: std::collections::HashSet<&'a [u8]>,
    seen: std::collections::HashSet<Vec<u8>>,
    found: Vec<Vec<u8>>,
}

impl<'ast, 'a> Visitor<'ast> for VariableCollector<'a> {
    fn visit_expr(&mut self, expr: ExprId<'ast>) -> bool {
        if let Expr::Variable { name, .. } = *expr {
            let bytes = name.as_str(self.source);
            if !self.exclude.contains(bytes) && self.seen.insert(bytes.to_vec()) {
                self.found.push(bytes.to_vec());
            }
        }
        walk_expr(self, expr);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::opcode::OperandKind;
    use crate::core::interner::Interner;
    use crate::parser::lexer::Lexer;
    use crate::parser::parser::Parser;
    use bumpalo::Bump;

    fn compile(source: &str) -> CompiledProgram {
        let bytes = source.as_bytes();
        let arena = Bump::new();
        let lexer = Lexer::new(bytes);
        let mut parser = Parser::new(lexer, &arena);
        let program = parser.parse_program();
        let mut interner = Interner::new();
        let emitter = Emitter::new(bytes, &mut interner);
        emitter.compile_program(&program)
    }

    fn count(chunk: &Chunk, opcode: Opcode) -> usize {
        chunk.instructions.iter().filter(|i| i.opcode == opcode).count()
    }

    #[test]
    fn constant_pool_deduplicates_equal_scalars() {
        let program = compile("<?php $a = 1; $b = 1; $c = 1;");
        let ones = program.main.constants.iter().filter(|v| **v == Value::Int(1)).count();
        assert_eq!(ones, 1);
    }

    #[test]
    fn echo_list_emits_one_echo_per_expression() {
        let program = compile("<?php echo $a, $b, $c;");
        assert_eq!(count(&program.main, Opcode::Echo), 3);
    }

    #[test]
    fn addition_emits_single_add_over_two_constants() {
        let program = compile("<?php 1 + 2;");
        let adds: Vec<_> = program
            .main
            .instructions
            .iter()
            .filter(|i| i.opcode == Opcode::Add)
            .collect();
        assert_eq!(adds.len(), 1);
        let add = adds[0];
        assert_eq!(add.op1.kind, OperandKind::Const);
        assert_eq!(add.op2.kind, OperandKind::Const);
        assert_eq!(program.main.constants[add.op1.value as usize], Value::Int(1));
        assert_eq!(program.main.constants[add.op2.value as usize], Value::Int(2));
    }

    #[test]
    fn int_cast_carries_its_kind_in_extended_value() {
        let program = compile("<?php (int)$x;");
        let cast = program
            .main
            .instructions
            .iter()
            .find(|i| i.opcode == Opcode::Cast)
            .expect("a Cast instruction");
        assert_eq!(cast.extended_value, cast_kind::INT);
    }

    #[test]
    fn simple_assigns_add_and_echo() {
        let program = compile("<?php $a = 1; $b = 2; $c = $a + $b; echo $c;");
        assert_eq!(count(&program.main, Opcode::Assign), 2);
        assert_eq!(count(&program.main, Opcode::Add), 1);
        assert_eq!(count(&program.main, Opcode::Echo), 1);
    }

    #[test]
    fn echo_string_then_return_int() {
        let program = compile("<?php echo \"hi\"; return 1;");
        assert_eq!(count(&program.main, Opcode::Echo), 1);
        assert_eq!(count(&program.main, Opcode::Return), 1);
    }

    #[test]
    fn function_with_params_body_and_return_type_is_hoisted() {
        let program = compile("<?php function add(int $a, int $b): int { return $a + $b; }");
        assert!(program.main.instructions.is_empty());
        assert_eq!(program.functions.len(), 1);
        let (_, entry) = program.functions.iter().next().unwrap();
        assert_eq!(entry.params.len(), 2);
        assert_eq!(count(&entry.chunk, Opcode::Add), 1);
        assert_eq!(count(&entry.chunk, Opcode::Return), 1);
    }

    #[test]
    fn if_elseif_else_has_exactly_three_reachable_echoes() {
        let program = compile(
            "<?php if ($a) { echo 1; } elseif ($b) { echo 2; } else { echo 3; }",
        );
        assert_eq!(count(&program.main, Opcode::Echo), 3);
        assert_eq!(count(&program.main, Opcode::JmpZ), 2);
    }

    #[test]
    fn closure_captures_by_value_and_by_reference() {
        let program = compile("<?php $f = function($x) use ($y, &$z) { return $x + $y; };");
        assert_eq!(program.closures.len(), 1);
        assert_eq!(count(&program.main, Opcode::BindUse), 1);
        assert_eq!(count(&program.main, Opcode::BindUseRef), 1);
        let closure = &program.closures[0];
        assert_eq!(closure.captures.len(), 2);
        assert_eq!(count(&closure.chunk, Opcode::Add), 1);
        assert_eq!(count(&closure.chunk, Opcode::Return), 1);
    }

    #[test]
    fn match_uses_identity_comparison_and_supports_multi_condition_arms() {
        let program = compile("<?php $r = match ($x) { 1, 2 => 'low', 3 => 'high', default => 'other' };");
        assert_eq!(count(&program.main, Opcode::IsIdentical), 3);
        assert_eq!(count(&program.main, Opcode::MatchError), 0);
    }

    #[test]
    fn switch_falls_through_cases_without_break() {
        let program = compile(
            "<?php switch ($x) { case 1: echo 'a'; case 2: echo 'b'; break; default: echo 'c'; }",
        );
        assert_eq!(count(&program.main, Opcode::IsEqual), 2);
        assert_eq!(count(&program.main, Opcode::Echo), 3);
    }

    #[test]
    fn array_dim_assign_evaluates_key_before_value() {
        let program = compile("<?php $a[k()] = v();");
        let callee_names: Vec<String> = program
            .main
            .instructions
            .iter()
            .filter(|i| i.opcode == Opcode::InitFcall)
            .map(|i| match &program.main.constants[i.op1.value as usize] {
                Value::Str(s) => String::from_utf8_lossy(s.as_slice()).into_owned(),
                other => panic!("expected a string constant, got {other:?}"),
            })
            .collect();
        assert_eq!(callee_names, vec!["k", "v"]);
    }

    #[test]
    fn logical_xor_lowers_to_bool_xor_not_an_equality_check() {
        let program = compile("<?php $r = $a xor $b;");
        assert_eq!(count(&program.main, Opcode::BoolXor), 1);
        assert_eq!(count(&program.main, Opcode::IsNotEqual), 0);
    }
}
