//! Indented tree printer for the parsed program. For debugging and
//! test assertions on tree shape.
use std::fmt;

use super::{BlockStmt, DeclStmt, Expr, FuncDef, Program, Stmt};

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Program")?;
        for decl in &self.globals {
            write_decl(f, decl, 1)?;
        }
        for func in &self.functions {
            write_func(f, func, 1)?;
        }
        Ok(())
    }
}

fn indent(f: &mut fmt::Formatter, depth: usize) -> fmt::Result {
    write!(f, "{:width$}", "", width = depth * 2)
}

fn write_decl(f: &mut fmt::Formatter, decl: &DeclStmt, depth: usize) -> fmt::Result {
    indent(f, depth)?;
    let keyword = if decl.is_const { "Const" } else { "Let" };
    writeln!(f, "{} {}: {}", keyword, decl.name, decl.ty)?;
    if let Some(init) = &decl.initializer {
        write_expr(f, init, depth + 1)?;
    }
    Ok(())
}

fn write_func(f: &mut fmt::Formatter, func: &FuncDef, depth: usize) -> fmt::Result {
    indent(f, depth)?;
    write!(f, "Fn {}(", func.name)?;
    for (i, param) in func.params.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        if param.is_const {
            write!(f, "const ")?;
        }
        write!(f, "{}: {}", param.name, param.ty)?;
    }
    writeln!(f, ") -> {}", func.return_type)?;
    write_block(f, &func.body, depth + 1)
}

fn write_block(f: &mut fmt::Formatter, block: &BlockStmt, depth: usize) -> fmt::Result {
    indent(f, depth)?;
    writeln!(f, "Block")?;
    for stmt in &block.statements {
        write_stmt(f, stmt, depth + 1)?;
    }
    Ok(())
}

fn write_stmt(f: &mut fmt::Formatter, stmt: &Stmt, depth: usize) -> fmt::Result {
    match stmt {
        Stmt::Decl(decl) => write_decl(f, decl, depth),
        Stmt::Block(block) => write_block(f, block, depth),
        Stmt::Expr(stmt) => write_expr(f, &stmt.expr, depth),
        Stmt::If(stmt) => {
            indent(f, depth)?;
            writeln!(f, "If")?;
            write_expr(f, &stmt.if_part.condition, depth + 1)?;
            write_block(f, &stmt.if_part.body, depth + 1)?;
            for cond_body in &stmt.elif_part {
                indent(f, depth)?;
                writeln!(f, "Elif")?;
                write_expr(f, &cond_body.condition, depth + 1)?;
                write_block(f, &cond_body.body, depth + 1)?;
            }
            if let Some(else_part) = &stmt.else_part {
                indent(f, depth)?;
                writeln!(f, "Else")?;
                write_block(f, else_part, depth + 1)?;
            }
            Ok(())
        }
        Stmt::While(stmt) => {
            indent(f, depth)?;
            writeln!(f, "While")?;
            write_expr(f, &stmt.condition, depth + 1)?;
            write_block(f, &stmt.body, depth + 1)
        }
        Stmt::Return(stmt) => {
            indent(f, depth)?;
            writeln!(f, "Return")?;
            if let Some(expr) = &stmt.expr {
                write_expr(f, expr, depth + 1)?;
            }
            Ok(())
        }
    }
}

fn write_expr(f: &mut fmt::Formatter, expr: &Expr, depth: usize) -> fmt::Result {
    indent(f, depth)?;
    match expr {
        Expr::Literal(e) => writeln!(f, "Literal {}", e.lexeme),
        Expr::Ident(e) => writeln!(f, "Ident {}", e.name),
        Expr::Assign(e) => {
            writeln!(f, "Assign {}", e.lhs)?;
            write_expr(f, &e.rhs, depth + 1)
        }
        Expr::Call(e) => {
            writeln!(f, "Call {}", e.callee)?;
            for arg in &e.args {
                write_expr(f, arg, depth + 1)?;
            }
            Ok(())
        }
        Expr::Binary(e) => {
            writeln!(f, "BinaryOp {}", e.op)?;
            write_expr(f, &e.left, depth + 1)?;
            write_expr(f, &e.right, depth + 1)
        }
        Expr::Negate(e) => {
            writeln!(f, "Negate")?;
            write_expr(f, &e.operand, depth + 1)
        }
    }
}
