//! Code generation: slot allocation, lowering to basic blocks, and
//! jump patching.
use log::{debug, trace};
use smol_str::SmolStr;
use std::collections::HashMap;

use super::{
    block::{resolve_jumps, BasicBlock, BlockId},
    builtins,
};
use crate::{
    error::{CompileError, CompileResult},
    parsing::{
        BinOp, BlockStmt, CallExpr, CondBody, DeclStmt, Expr, FuncDef, IfStmt, LitValue,
        Program, ReturnStmt, Stmt, VarType, WhileStmt,
    },
    tokens::Position,
};
use r0_bytecode::{Function, GlobalDef, Instr, ProgramImage};

/// Name of the synthesized entry function that runs global
/// initializers. Part of the compilation contract with the VM.
const START_FUNC: &str = "_start";

/// Storage class of a resolved variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarScope {
    Local,
    Global,
    Param,
}

/// A variable resolved to its storage slot. Offsets are slot indices,
/// not byte addresses: parameters start at `return_slots`, locals and
/// globals start at 0 within their own tables.
#[derive(Debug, Clone, Copy)]
pub struct Variable {
    pub scope: VarScope,
    pub ty: VarType,
    pub offset: u32,
}

/// Function record under construction: the image header fields plus
/// the basic blocks and the local slot map that exist only while
/// compiling.
struct FuncRecord {
    name_index: u32,
    return_slots: u32,
    param_slots: u32,
    loc_slots: u32,
    blocks: Vec<BasicBlock>,
    locals: HashMap<SmolStr, Variable>,
}

impl FuncRecord {
    fn new() -> Self {
        Self {
            name_index: 0,
            return_slots: 0,
            param_slots: 0,
            loc_slots: 0,
            blocks: vec![],
            locals: HashMap::new(),
        }
    }

    fn add_param(&mut self, name: SmolStr, ty: VarType) {
        let offset = self.return_slots + self.param_slots;
        self.param_slots += 1;
        self.locals.insert(
            name,
            Variable {
                scope: VarScope::Param,
                ty,
                offset,
            },
        );
    }

    fn add_local(&mut self, name: SmolStr, ty: VarType) {
        let offset = self.loc_slots;
        self.loc_slots += 1;
        self.locals.insert(
            name,
            Variable {
                scope: VarScope::Local,
                ty,
                offset,
            },
        );
    }
}

/// Entry in the function name map.
#[derive(Debug, Clone, Copy)]
struct FuncEntry {
    /// Index into the function table; `None` for VM builtins.
    def: Option<usize>,
    /// `call` operand for user functions (function-table index) or
    /// `callname` operand for builtins (global-table index of the
    /// name).
    offset: u32,
    has_return: bool,
}

/// Two-pass code generator.
///
/// Pass 1 walks the program to lay out storage: global slots, function
/// records with their return/parameter/local slot counts, and the
/// global-table entries holding function names. Pass 2 walks it again
/// to emit instructions into basic blocks, which are sealed into their
/// function record and flattened with patched jumps at the end.
pub struct CodeGen {
    globals: Vec<GlobalDef>,
    functions: Vec<FuncRecord>,
    global_vars: HashMap<SmolStr, Variable>,
    function_map: HashMap<SmolStr, FuncEntry>,
    /// Function record receiving code in pass 2.
    current: Option<usize>,
    /// Block receiving instructions. `codes` in the VM's parlance.
    block: Option<BasicBlock>,
    next_block: u32,
}

impl CodeGen {
    pub fn new() -> Self {
        Self {
            globals: vec![],
            functions: vec![],
            global_vars: HashMap::new(),
            function_map: HashMap::new(),
            current: None,
            block: None,
            next_block: 0,
        }
    }

    pub fn compile(mut self, program: &Program) -> CompileResult<ProgramImage> {
        debug!("pass 1: slot allocation");
        self.alloc_slots(program);
        debug!("pass 2: instruction emission");
        self.emit_program(program)?;
        Ok(self.finish())
    }
}

/// Pass 1: slot allocation.
impl CodeGen {
    fn alloc_slots(&mut self, program: &Program) {
        for decl in &program.globals {
            self.add_global_var(decl);
        }
        for func in &program.functions {
            self.alloc_func(func);
        }
        // The implicit entry function goes last in the table.
        self.add_func_def(START_FUNC, FuncRecord::new());
    }

    fn add_global_var(&mut self, decl: &DeclStmt) {
        let var = Variable {
            scope: VarScope::Global,
            ty: decl.ty,
            offset: self.globals.len() as u32,
        };
        self.global_vars.insert(decl.name.clone(), var);
        self.globals.push(GlobalDef::placeholder(decl.is_const));
    }

    fn alloc_func(&mut self, func: &FuncDef) {
        let mut record = FuncRecord::new();

        if func.return_type != VarType::Void {
            record.return_slots = 1;
        }

        for param in &func.params {
            record.add_param(param.name.clone(), param.ty);
        }

        // Only the top level of the body is searched for locals; all
        // locals of a function share one flat frame.
        for stmt in &func.body.statements {
            if let Stmt::Decl(decl) = stmt {
                record.add_local(decl.name.clone(), decl.ty);
            }
        }

        self.add_func_def(&func.name, record);
    }

    /// Append the record to the function table and its name to the
    /// global table.
    fn add_func_def(&mut self, name: &str, mut record: FuncRecord) {
        let entry = FuncEntry {
            def: Some(self.functions.len()),
            offset: self.functions.len() as u32,
            has_return: record.return_slots > 0,
        };

        record.name_index = self.globals.len() as u32;
        self.globals.push(GlobalDef::name(name));

        self.functions.push(record);
        self.function_map.insert(SmolStr::new(name), entry);
    }
}

/// Pass 2: instruction emission.
impl CodeGen {
    fn emit_program(&mut self, program: &Program) -> CompileResult<()> {
        self.emit_start_func(program)?;
        for func in &program.functions {
            self.emit_func(func)?;
        }
        Ok(())
    }

    /// `_start` stores every global initializer into its slot. There is
    /// no implicit call to user `main`; the VM's entry convention is
    /// `_start` itself.
    fn emit_start_func(&mut self, program: &Program) -> CompileResult<()> {
        trace!("emitting {}", START_FUNC);
        self.open_function(self.func_index(START_FUNC));

        for decl in &program.globals {
            if let Some(init) = &decl.initializer {
                self.assign_var(&decl.name, init, decl.pos)?;
            }
        }

        self.close_function();
        Ok(())
    }

    fn emit_func(&mut self, func: &FuncDef) -> CompileResult<()> {
        trace!("emitting function '{}'", func.name);
        self.open_function(self.func_index(&func.name));
        self.emit_block_stmt(&func.body)?;
        self.close_function();
        Ok(())
    }

    fn emit_block_stmt(&mut self, block: &BlockStmt) -> CompileResult<()> {
        for stmt in &block.statements {
            self.emit_stmt(stmt)?;
        }
        Ok(())
    }

    fn emit_stmt(&mut self, stmt: &Stmt) -> CompileResult<()> {
        match stmt {
            Stmt::Decl(decl) => self.emit_decl(decl),
            Stmt::Block(block) => self.emit_block_stmt(block),
            Stmt::Expr(stmt) => self.emit_expr(&stmt.expr),
            Stmt::If(stmt) => self.emit_if(stmt),
            Stmt::While(stmt) => self.emit_while(stmt),
            Stmt::Return(stmt) => self.emit_return(stmt),
        }
    }

    fn emit_decl(&mut self, decl: &DeclStmt) -> CompileResult<()> {
        // Slot allocation only visited the top level of the body, so a
        // declaration in a nested block has no slot to store into.
        if self.lookup_var(&decl.name).is_none() {
            return Err(CompileError::semantic(
                decl.pos,
                format!(
                    "local variable '{}' declared inside a nested block is not supported",
                    decl.name
                ),
            ));
        }

        if let Some(init) = &decl.initializer {
            self.assign_var(&decl.name, init, decl.pos)?;
        }
        Ok(())
    }

    fn emit_return(&mut self, stmt: &ReturnStmt) -> CompileResult<()> {
        if let Some(expr) = &stmt.expr {
            // The return slot sits below the parameters.
            self.emit(Instr::Arga(0));
            self.emit_expr(expr)?;
            self.emit(Instr::Store64);
        }
        self.emit(Instr::Ret);
        Ok(())
    }

    /// Lower one `condition { body }` arm. Falls through to `next` when
    /// the condition is false; the body exits to `end`.
    fn emit_cond_body(
        &mut self,
        cond_body: &CondBody,
        next: BlockId,
        end: BlockId,
    ) -> CompileResult<()> {
        self.emit_expr(&cond_body.condition)?;
        self.emit(Instr::BrFalse(0));
        self.set_branch(next);

        self.start_new_block();
        self.emit_block_stmt(&cond_body.body)?;
        self.emit(Instr::Br(0));
        self.set_branch(end);
        Ok(())
    }

    fn emit_if(&mut self, stmt: &IfStmt) -> CompileResult<()> {
        let mut next = self.new_block();
        let end = self.new_block();

        self.emit_cond_body(&stmt.if_part, next.id, end.id)?;

        for cond_body in &stmt.elif_part {
            self.seal();
            self.open(next);
            next = self.new_block();
            self.emit_cond_body(cond_body, next.id, end.id)?;
        }

        self.seal();
        self.open(next);
        if let Some(else_part) = &stmt.else_part {
            self.emit_block_stmt(else_part)?;
        }

        self.seal();
        self.open(end);
        Ok(())
    }

    fn emit_while(&mut self, stmt: &WhileStmt) -> CompileResult<()> {
        self.start_new_block();
        let cond_id = self.current_block_id();
        self.emit_expr(&stmt.condition)?;
        self.emit(Instr::BrFalse(0));
        // The exit target does not exist yet; patched below.

        self.start_new_block();
        self.emit_block_stmt(&stmt.body)?;
        self.emit(Instr::Br(0));
        self.set_branch(cond_id);

        self.start_new_block();
        let after_id = self.current_block_id();
        self.set_branch_of(cond_id, after_id);
        Ok(())
    }

    fn emit_expr(&mut self, expr: &Expr) -> CompileResult<()> {
        match expr {
            Expr::Literal(e) => {
                match e.value {
                    LitValue::Int(value) => self.emit(Instr::Push(value as u64)),
                    LitValue::Double(value) => self.emit(Instr::Push(value.to_bits())),
                }
                Ok(())
            }

            Expr::Ident(e) => {
                self.push_var_addr(&e.name, e.pos)?;
                self.emit(Instr::Load64);
                Ok(())
            }

            Expr::Assign(e) => self.assign_var(&e.lhs, &e.rhs, e.pos),

            Expr::Negate(e) => {
                self.emit_expr(&e.operand)?;
                self.emit(match e.ty.ty {
                    VarType::Int => Instr::NegI,
                    _ => Instr::NegF,
                });
                Ok(())
            }

            Expr::Binary(e) => {
                self.emit_expr(&e.left)?;
                self.emit_expr(&e.right)?;
                // Comparisons dispatch on the operand type; their own
                // result type is bool.
                self.emit_binary_op(e.op, e.left.ty().ty);
                Ok(())
            }

            Expr::Call(e) => self.emit_call(e),
        }
    }

    /// Arithmetic lowers to one typed opcode. A comparison lowers to a
    /// three-way `cmp`, leaving -1, 0 or +1, followed by opcodes that
    /// collapse it to the boolean the operator describes.
    fn emit_binary_op(&mut self, op: BinOp, operand_ty: VarType) {
        let is_int = operand_ty == VarType::Int;

        let compare = |gen: &mut Self| {
            gen.emit(if is_int { Instr::CmpI } else { Instr::CmpF });
        };

        match op {
            BinOp::Add => self.emit(if is_int { Instr::AddI } else { Instr::AddF }),
            BinOp::Sub => self.emit(if is_int { Instr::SubI } else { Instr::SubF }),
            BinOp::Mul => self.emit(if is_int { Instr::MulI } else { Instr::MulF }),
            BinOp::Div => self.emit(if is_int { Instr::DivI } else { Instr::DivF }),
            BinOp::Lt => {
                compare(self);
                self.emit(Instr::SetLt);
            }
            BinOp::Gt => {
                compare(self);
                self.emit(Instr::SetGt);
            }
            BinOp::LtEq => {
                compare(self);
                self.emit(Instr::SetGt);
                self.emit(Instr::Not);
            }
            BinOp::GtEq => {
                compare(self);
                self.emit(Instr::SetLt);
                self.emit(Instr::Not);
            }
            // Equal iff the compare yielded 0.
            BinOp::Eq => {
                compare(self);
                self.emit(Instr::Not);
            }
            BinOp::NotEq => compare(self),
        }
    }

    fn emit_call(&mut self, call: &CallExpr) -> CompileResult<()> {
        let entry = self.function_entry(&call.callee);

        let slots = call.args.len() as u32 + entry.has_return as u32;
        self.emit(Instr::StackAlloc(slots));

        for arg in &call.args {
            self.emit_expr(arg)?;
        }

        match entry.def {
            Some(_) => self.emit(Instr::Call(entry.offset)),
            None => self.emit(Instr::CallName(entry.offset)),
        }
        Ok(())
    }

    /// Resolve a callee. The first use of a VM builtin appends its name
    /// to the global table; `callname` refers to it by that index.
    fn function_entry(&mut self, name: &SmolStr) -> FuncEntry {
        if let Some(entry) = self.function_map.get(name) {
            return *entry;
        }

        let builtin =
            builtins::lookup(name).expect("analysis resolved a call to an unknown function");
        let entry = FuncEntry {
            def: None,
            offset: self.globals.len() as u32,
            has_return: builtin.return_type != VarType::Void,
        };
        self.globals.push(GlobalDef::name(builtin.name));
        self.function_map.insert(name.clone(), entry);
        entry
    }

    fn assign_var(&mut self, name: &SmolStr, expr: &Expr, pos: Position) -> CompileResult<()> {
        self.push_var_addr(name, pos)?;
        self.emit_expr(expr)?;
        self.emit(Instr::Store64);
        Ok(())
    }

    fn push_var_addr(&mut self, name: &SmolStr, pos: Position) -> CompileResult<()> {
        let var = self.lookup_var(name).ok_or_else(|| {
            CompileError::semantic(
                pos,
                format!(
                    "local variable '{}' declared inside a nested block is not supported",
                    name
                ),
            )
        })?;

        self.emit(match var.scope {
            VarScope::Local => Instr::Loca(var.offset),
            VarScope::Global => Instr::Globa(var.offset),
            VarScope::Param => Instr::Arga(var.offset),
        });
        Ok(())
    }

    /// The current function's frame first, then the global table.
    fn lookup_var(&self, name: &str) -> Option<Variable> {
        self.current
            .and_then(|index| self.functions[index].locals.get(name))
            .or_else(|| self.global_vars.get(name))
            .copied()
    }
}

/// Block bookkeeping.
impl CodeGen {
    fn new_block(&mut self) -> BasicBlock {
        let id = BlockId(self.next_block);
        self.next_block += 1;
        BasicBlock::new(id)
    }

    fn open_function(&mut self, index: usize) {
        self.current = Some(index);
        let block = self.new_block();
        self.open(block);
    }

    /// Guarantee the trailing `ret`, then seal the last block.
    fn close_function(&mut self) {
        let ends_with_ret = self
            .block
            .as_ref()
            .map(BasicBlock::ends_with_ret)
            .unwrap_or(false);
        if !ends_with_ret {
            self.emit(Instr::Ret);
        }
        self.seal();
        self.current = None;
    }

    fn emit(&mut self, instr: Instr) {
        trace!("emit {}", instr);
        self.block
            .as_mut()
            .expect("no open block to emit into")
            .push(instr);
    }

    fn current_block_id(&self) -> BlockId {
        self.block.as_ref().expect("no open block").id
    }

    fn set_branch(&mut self, target: BlockId) {
        self.block.as_mut().expect("no open block").branch = Some(target);
    }

    /// Set the branch target of an already sealed block.
    fn set_branch_of(&mut self, block: BlockId, target: BlockId) {
        let index = self.current.expect("no current function");
        self.functions[index]
            .blocks
            .iter_mut()
            .find(|candidate| candidate.id == block)
            .expect("block was not sealed into the current function")
            .branch = Some(target);
    }

    /// Seal the open block into the current function's block list.
    fn seal(&mut self) {
        if let Some(block) = self.block.take() {
            let index = self.current.expect("no current function");
            self.functions[index].blocks.push(block);
        }
    }

    fn open(&mut self, block: BasicBlock) {
        debug_assert!(self.block.is_none(), "a block is already open");
        self.block = Some(block);
    }

    /// Seal the open block and continue in a fresh one.
    fn start_new_block(&mut self) {
        self.seal();
        let block = self.new_block();
        self.open(block);
    }

    fn func_index(&self, name: &str) -> usize {
        self.function_map
            .get(name)
            .and_then(|entry| entry.def)
            .expect("function was not allocated in pass 1")
    }
}

/// Jump resolution and image assembly.
impl CodeGen {
    fn finish(self) -> ProgramImage {
        let functions = self
            .functions
            .into_iter()
            .map(|record| Function {
                name_index: record.name_index,
                return_slots: record.return_slots,
                param_slots: record.param_slots,
                loc_slots: record.loc_slots,
                instructions: resolve_jumps(record.blocks),
            })
            .collect();

        ProgramImage {
            globals: self.globals,
            functions,
        }
    }
}

impl Default for CodeGen {
    fn default() -> Self {
        Self::new()
    }
}
