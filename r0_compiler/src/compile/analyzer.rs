//! Semantic analysis: scope resolution and type checking.
use log::debug;
use smol_str::SmolStr;

use super::{
    builtins,
    symbol::{Binding, FuncBinding, ScopeStack, VarBinding},
};
use crate::{
    error::{CompileError, CompileResult},
    parsing::{
        BlockStmt, DeclStmt, Expr, FuncDef, Program, ReturnStmt, Stmt, VarType,
    },
};

/// Walks the tree once, resolving names against the scope stack and
/// checking the type rules. Computed types are written back into the
/// expression nodes for the code generator. The first violation aborts
/// the walk.
pub struct Analyzer {
    scopes: ScopeStack,
}

impl Analyzer {
    pub fn new() -> Self {
        let mut scopes = ScopeStack::new();

        // The VM runtime functions live in the outermost scope, below
        // everything the program declares.
        for builtin in builtins::BUILTINS {
            scopes.current_mut().insert(
                SmolStr::new(builtin.name),
                Binding::Func(FuncBinding {
                    params: builtin.params.to_vec(),
                    return_type: builtin.return_type,
                }),
            );
        }

        Self { scopes }
    }

    pub fn check(mut self, program: &mut Program) -> CompileResult<()> {
        debug!("semantic analysis started");

        // All function names become visible before any body is checked,
        // which allows forward references and mutual recursion.
        for func in &program.functions {
            let binding = Binding::Func(FuncBinding {
                params: func.params.iter().map(|param| param.ty).collect(),
                return_type: func.return_type,
            });
            if !self.scopes.current_mut().insert(func.name.clone(), binding) {
                return Err(CompileError::semantic(
                    func.pos,
                    format!("redeclared function '{}'", func.name),
                ));
            }
        }

        for decl in &mut program.globals {
            self.check_decl(decl)?;
        }
        for func in &mut program.functions {
            self.check_func(func)?;
        }

        debug!("semantic analysis finished");
        Ok(())
    }

    fn check_func(&mut self, func: &mut FuncDef) -> CompileResult<()> {
        self.scopes.push();

        for param in &func.params {
            let binding = Binding::Var(VarBinding {
                ty: param.ty,
                is_const: param.is_const,
            });
            if !self.scopes.current_mut().insert(param.name.clone(), binding) {
                return Err(CompileError::semantic(
                    param.pos,
                    format!("duplicated parameter name '{}'", param.name),
                ));
            }
        }

        self.check_block(&mut func.body)?;

        self.scopes.pop();
        Ok(())
    }

    fn check_block(&mut self, block: &mut BlockStmt) -> CompileResult<()> {
        // The function-visit already opened a scope holding the
        // parameters; a function body must not push another.
        if !block.is_func_body {
            self.scopes.push();
        }
        for stmt in &mut block.statements {
            self.check_stmt(stmt)?;
        }
        if !block.is_func_body {
            self.scopes.pop();
        }
        Ok(())
    }

    fn check_stmt(&mut self, stmt: &mut Stmt) -> CompileResult<()> {
        match stmt {
            Stmt::Decl(decl) => self.check_decl(decl),
            Stmt::Block(block) => self.check_block(block),
            Stmt::Expr(stmt) => self.check_expr(&mut stmt.expr),
            Stmt::If(stmt) => {
                self.check_expr(&mut stmt.if_part.condition)?;
                self.check_block(&mut stmt.if_part.body)?;
                for cond_body in &mut stmt.elif_part {
                    self.check_expr(&mut cond_body.condition)?;
                    self.check_block(&mut cond_body.body)?;
                }
                if let Some(else_part) = &mut stmt.else_part {
                    self.check_block(else_part)?;
                }
                Ok(())
            }
            Stmt::While(stmt) => {
                self.check_expr(&mut stmt.condition)?;
                self.check_block(&mut stmt.body)
            }
            Stmt::Return(stmt) => self.check_return(stmt),
        }
    }

    fn check_decl(&mut self, decl: &mut DeclStmt) -> CompileResult<()> {
        let binding = Binding::Var(VarBinding {
            ty: decl.ty,
            is_const: decl.is_const,
        });
        if !self.scopes.current_mut().insert(decl.name.clone(), binding) {
            return Err(CompileError::semantic(
                decl.pos,
                format!("redeclaration of symbol '{}'", decl.name),
            ));
        }

        if let Some(init) = &mut decl.initializer {
            self.check_expr(init)?;
            if init.ty().ty != decl.ty {
                return Err(CompileError::semantic(
                    init.pos(),
                    format!(
                        "cannot assign expression of type {} to variable '{}' of type {}",
                        init.ty().ty,
                        decl.name,
                        decl.ty
                    ),
                ));
            }
        }
        Ok(())
    }

    fn check_return(&mut self, stmt: &mut ReturnStmt) -> CompileResult<()> {
        if stmt.return_type == VarType::Void {
            if stmt.expr.is_some() {
                return Err(CompileError::semantic(
                    stmt.pos,
                    format!(
                        "returned a value from function '{}' which returns void",
                        stmt.func_name
                    ),
                ));
            }
            return Ok(());
        }

        match &mut stmt.expr {
            None => Err(CompileError::semantic(
                stmt.pos,
                format!(
                    "missing return value in function '{}' which returns {}",
                    stmt.func_name, stmt.return_type
                ),
            )),
            Some(expr) => {
                self.check_expr(expr)?;
                if expr.ty().ty != stmt.return_type {
                    return Err(CompileError::semantic(
                        stmt.pos,
                        format!("return type mismatch in function '{}'", stmt.func_name),
                    ));
                }
                Ok(())
            }
        }
    }

    fn check_expr(&mut self, expr: &mut Expr) -> CompileResult<()> {
        match expr {
            // Literal types are computed by the parser.
            Expr::Literal(_) => Ok(()),

            Expr::Ident(e) => match self.scopes.lookup_var(&e.name) {
                Some(var) => {
                    e.ty.ty = var.ty;
                    Ok(())
                }
                None => Err(CompileError::semantic(
                    e.pos,
                    format!("undeclared variable '{}'", e.name),
                )),
            },

            Expr::Assign(e) => {
                let var = self.scopes.lookup_var(&e.lhs).ok_or_else(|| {
                    CompileError::semantic(
                        e.pos,
                        format!("cannot assign to an undefined variable '{}'", e.lhs),
                    )
                })?;
                if var.is_const {
                    return Err(CompileError::semantic(
                        e.pos,
                        format!("cannot assign to const variable '{}'", e.lhs),
                    ));
                }

                self.check_expr(&mut e.rhs)?;
                if e.rhs.ty().ty != var.ty {
                    return Err(CompileError::semantic(
                        e.rhs.pos(),
                        format!(
                            "cannot assign expression of type {} to variable '{}' of type {}",
                            e.rhs.ty().ty,
                            e.lhs,
                            var.ty
                        ),
                    ));
                }

                // Assignment expression has void type.
                e.ty.ty = VarType::Void;
                Ok(())
            }

            Expr::Call(e) => {
                let func = match self.scopes.lookup_func(&e.callee) {
                    Some(func) => func.clone(),
                    None => {
                        return Err(CompileError::semantic(
                            e.pos,
                            format!("undefined function '{}'", e.callee),
                        ));
                    }
                };

                if func.params.len() != e.args.len() {
                    return Err(CompileError::semantic(
                        e.pos,
                        format!(
                            "expected {} arguments to function '{}', found {}",
                            func.params.len(),
                            e.callee,
                            e.args.len()
                        ),
                    ));
                }

                for (arg, &param_ty) in e.args.iter_mut().zip(&func.params) {
                    self.check_expr(arg)?;
                    if arg.ty().ty != param_ty {
                        return Err(CompileError::semantic(
                            arg.pos(),
                            format!(
                                "argument type mismatch: expected {}, found {} when calling function '{}'",
                                param_ty,
                                arg.ty().ty,
                                e.callee
                            ),
                        ));
                    }
                }

                e.ty.ty = func.return_type;
                Ok(())
            }

            Expr::Binary(e) => {
                self.check_expr(&mut e.left)?;
                self.check_expr(&mut e.right)?;
                let left_ty = e.left.ty().ty;
                let right_ty = e.right.ty().ty;

                if left_ty != right_ty
                    || left_ty == VarType::Void
                    || left_ty == VarType::Bool
                {
                    return Err(CompileError::semantic(
                        e.pos,
                        format!(
                            "both operands of binary operator '{}' must have the same int or double type",
                            e.op
                        ),
                    ));
                }

                e.ty.ty = if e.op.is_comparison() {
                    VarType::Bool
                } else {
                    left_ty
                };
                Ok(())
            }

            Expr::Negate(e) => {
                self.check_expr(&mut e.operand)?;
                let operand_ty = e.operand.ty().ty;
                if operand_ty == VarType::Void || operand_ty == VarType::Bool {
                    return Err(CompileError::semantic(
                        e.pos,
                        format!("the operand of '-' cannot have type {}", operand_ty),
                    ));
                }
                e.ty.ty = operand_ty;
                Ok(())
            }
        }
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}
