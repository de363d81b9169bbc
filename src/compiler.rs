use std::collections::HashMap;
use std::rc::Rc;

use log::debug;
use thiserror::Error;

use crate::ast::{
    AugOp, BinOp, BoolOp, CmpOp, Expr, ExprKind, Module, NameConstant, Stmt, StmtKind, UnaryOp,
};
use crate::bytecode::{CodeObject, Constant, Instruction, OpCode};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("unsupported assignment target at line {line}")]
    UnsupportedAssignTarget { line: usize },
    #[error("unsupported augmented assignment target at line {line}")]
    UnsupportedAugAssignTarget { line: usize },
    #[error("unsupported for-loop target at line {line}")]
    UnsupportedForTarget { line: usize },
    #[error("boolean operation needs at least 2 values at line {line}")]
    BoolOpArity { line: usize },
}

/// Single-pass bytecode compiler with backpatched forward jumps.
///
/// Each function body gets a fresh compiler at depth + 1; the three pools
/// deduplicate through side maps. The loop stack records loop-start indices
/// for future break/continue support.
pub struct Compiler {
    instructions: Vec<Instruction>,
    consts: Vec<Constant>,
    names: Vec<String>,
    varnames: Vec<String>,
    const_map: HashMap<String, usize>,
    name_map: HashMap<String, usize>,
    varname_map: HashMap<String, usize>,
    loop_stack: Vec<usize>,
    scope_depth: usize,
}

pub fn compile(module: &Module) -> Result<CodeObject, CompileError> {
    Compiler::new().compile_module(module)
}

impl Compiler {
    pub fn new() -> Self {
        Self {
            instructions: Vec::new(),
            consts: Vec::new(),
            names: Vec::new(),
            varnames: Vec::new(),
            const_map: HashMap::new(),
            name_map: HashMap::new(),
            varname_map: HashMap::new(),
            loop_stack: Vec::new(),
            scope_depth: 0,
        }
    }

    fn emit(&mut self, op: OpCode, arg: u32) -> usize {
        let pos = self.instructions.len();
        self.instructions.push(Instruction::new(op, arg));
        pos
    }

    fn patch(&mut self, pos: usize, arg: u32) {
        self.instructions[pos].arg = arg;
    }

    fn here(&self) -> u32 {
        self.instructions.len() as u32
    }

    fn add_constant(&mut self, constant: Constant) -> u32 {
        let key = format!("{}:{}", constant.tag_name(), constant.render());
        if let Some(&idx) = self.const_map.get(&key) {
            return idx as u32;
        }
        let idx = self.consts.len();
        self.consts.push(constant);
        self.const_map.insert(key, idx);
        idx as u32
    }

    fn add_name(&mut self, name: &str) -> u32 {
        if let Some(&idx) = self.name_map.get(name) {
            return idx as u32;
        }
        let idx = self.names.len();
        self.names.push(name.to_string());
        self.name_map.insert(name.to_string(), idx);
        idx as u32
    }

    fn add_varname(&mut self, name: &str) -> u32 {
        if let Some(&idx) = self.varname_map.get(name) {
            return idx as u32;
        }
        let idx = self.varnames.len();
        self.varnames.push(name.to_string());
        self.varname_map.insert(name.to_string(), idx);
        idx as u32
    }

    fn compile_module(mut self, module: &Module) -> Result<CodeObject, CompileError> {
        let last = module.body.len().checked_sub(1);
        for (i, stmt) in module.body.iter().enumerate() {
            // A trailing expression statement becomes the run's result
            // instead of being popped.
            if Some(i) == last {
                if let StmtKind::Expr(expr) = &stmt.kind {
                    self.compile_expr(expr)?;
                    self.emit(OpCode::ReturnValue, 0);
                    return Ok(self.finish(0, "<module>", "<module>", 1));
                }
            }
            self.compile_stmt(stmt)?;
        }

        let none = self.add_constant(Constant::None);
        self.emit(OpCode::LoadConst, none);
        self.emit(OpCode::ReturnValue, 0);

        Ok(self.finish(0, "<module>", "<module>", 1))
    }

    fn compile_function(
        mut self,
        name: &str,
        params: &[String],
        body: &[Stmt],
        firstlineno: usize,
    ) -> Result<CodeObject, CompileError> {
        for param in params {
            self.add_varname(param);
        }

        for stmt in body {
            self.compile_stmt(stmt)?;
        }

        let none = self.add_constant(Constant::None);
        self.emit(OpCode::LoadConst, none);
        self.emit(OpCode::ReturnValue, 0);

        Ok(self.finish(params.len(), "<function>", name, firstlineno))
    }

    fn finish(
        self,
        argcount: usize,
        filename: &str,
        name: &str,
        firstlineno: usize,
    ) -> CodeObject {
        debug!(
            "compiled {name}: {} instructions, {} consts, {} names, {} varnames",
            self.instructions.len(),
            self.consts.len(),
            self.names.len(),
            self.varnames.len()
        );
        CodeObject {
            instructions: self.instructions,
            consts: self.consts,
            names: self.names,
            varnames: self.varnames,
            argcount,
            filename: filename.to_string(),
            name: name.to_string(),
            firstlineno,
        }
    }

    fn store_name(&mut self, name: &str) {
        if self.scope_depth == 0 {
            let idx = self.add_name(name);
            self.emit(OpCode::StoreName, idx);
        } else {
            let idx = self.add_varname(name);
            self.emit(OpCode::StoreFast, idx);
        }
    }

    fn load_target_name(&mut self, name: &str) {
        if self.scope_depth == 0 {
            let idx = self.add_name(name);
            self.emit(OpCode::LoadName, idx);
        } else {
            let idx = self.add_varname(name);
            self.emit(OpCode::LoadFast, idx);
        }
    }

    fn compile_stmt(&mut self, stmt: &Stmt) -> Result<(), CompileError> {
        match &stmt.kind {
            StmtKind::Assign { target, value } => self.compile_assign(target, value),
            StmtKind::AugAssign { target, op, value } => {
                self.compile_aug_assign(target, *op, value)
            }
            StmtKind::Expr(expr) => {
                self.compile_expr(expr)?;
                self.emit(OpCode::PopTop, 0);
                Ok(())
            }
            StmtKind::Print(values) => self.compile_print(values),
            StmtKind::If { test, body, orelse } => self.compile_if(test, body, orelse),
            StmtKind::While { test, body } => self.compile_while(test, body),
            StmtKind::For { target, iter, body } => self.compile_for(target, iter, body),
            StmtKind::FuncDef { name, params, body } => {
                self.compile_func_def(name, params, body, stmt.position.line)
            }
            StmtKind::Return(value) => {
                match value {
                    Some(expr) => self.compile_expr(expr)?,
                    None => {
                        let none = self.add_constant(Constant::None);
                        self.emit(OpCode::LoadConst, none);
                    }
                }
                self.emit(OpCode::ReturnValue, 0);
                Ok(())
            }
            StmtKind::Pass => Ok(()),
        }
    }

    fn compile_assign(&mut self, target: &Expr, value: &Expr) -> Result<(), CompileError> {
        self.compile_expr(value)?;

        match &target.kind {
            ExprKind::Name(name) => {
                self.store_name(name);
                Ok(())
            }
            ExprKind::Subscript {
                value: container,
                index,
            } => {
                self.compile_expr(container)?;
                self.compile_expr(index)?;
                self.emit(OpCode::StoreSubscr, 0);
                Ok(())
            }
            _ => Err(CompileError::UnsupportedAssignTarget {
                line: target.position.line,
            }),
        }
    }

    fn compile_aug_assign(
        &mut self,
        target: &Expr,
        op: AugOp,
        value: &Expr,
    ) -> Result<(), CompileError> {
        let ExprKind::Name(name) = &target.kind else {
            return Err(CompileError::UnsupportedAugAssignTarget {
                line: target.position.line,
            });
        };

        self.load_target_name(name);
        self.compile_expr(value)?;
        match op {
            AugOp::Add => self.emit(OpCode::BinaryAdd, 0),
            AugOp::Sub => self.emit(OpCode::BinarySub, 0),
        };
        self.store_name(name);
        Ok(())
    }

    fn compile_print(&mut self, values: &[Expr]) -> Result<(), CompileError> {
        for (i, value) in values.iter().enumerate() {
            self.compile_expr(value)?;
            self.emit(OpCode::PrintExpr, 0);
            if i < values.len() - 1 {
                // Separator writes raw string contents (PRINT_EXPR arg 1)
                // so the space is not quoted like an ordinary string value.
                let space = self.add_constant(Constant::Str(" ".to_string()));
                self.emit(OpCode::LoadConst, space);
                self.emit(OpCode::PrintExpr, 1);
            }
        }
        self.emit(OpCode::PrintNewline, 0);
        Ok(())
    }

    fn compile_if(
        &mut self,
        test: &Expr,
        body: &[Stmt],
        orelse: &[Stmt],
    ) -> Result<(), CompileError> {
        self.compile_expr(test)?;
        let jump_if_false = self.emit(OpCode::PopJumpIfFalse, 0);

        for stmt in body {
            self.compile_stmt(stmt)?;
        }

        if orelse.is_empty() {
            let target = self.here();
            self.patch(jump_if_false, target);
            return Ok(());
        }

        let jump_end = self.emit(OpCode::JumpForward, 0);
        let target = self.here();
        self.patch(jump_if_false, target);

        for stmt in orelse {
            self.compile_stmt(stmt)?;
        }
        let offset = self.here() - jump_end as u32 - 1;
        self.patch(jump_end, offset);

        Ok(())
    }

    fn compile_while(&mut self, test: &Expr, body: &[Stmt]) -> Result<(), CompileError> {
        let loop_start = self.instructions.len();
        self.loop_stack.push(loop_start);

        self.compile_expr(test)?;
        let jump_if_false = self.emit(OpCode::PopJumpIfFalse, 0);

        for stmt in body {
            self.compile_stmt(stmt)?;
        }

        self.emit(OpCode::JumpAbsolute, loop_start as u32);
        let target = self.here();
        self.patch(jump_if_false, target);

        self.loop_stack.pop();
        Ok(())
    }

    fn compile_for(
        &mut self,
        target: &Expr,
        iter: &Expr,
        body: &[Stmt],
    ) -> Result<(), CompileError> {
        self.compile_expr(iter)?;
        self.emit(OpCode::GetIter, 0);

        let loop_start = self.instructions.len();
        self.loop_stack.push(loop_start);
        let for_iter = self.emit(OpCode::ForIter, 0);

        match &target.kind {
            ExprKind::Name(name) => self.store_name(name),
            _ => {
                return Err(CompileError::UnsupportedForTarget {
                    line: target.position.line,
                });
            }
        }

        for stmt in body {
            self.compile_stmt(stmt)?;
        }

        self.emit(OpCode::JumpAbsolute, loop_start as u32);
        let end = self.here();
        self.patch(for_iter, end);

        self.loop_stack.pop();
        Ok(())
    }

    fn compile_func_def(
        &mut self,
        name: &str,
        params: &[String],
        body: &[Stmt],
        line: usize,
    ) -> Result<(), CompileError> {
        let mut compiler = Compiler::new();
        compiler.scope_depth = self.scope_depth + 1;
        let code = compiler.compile_function(name, params, body, line)?;

        // The globals binding is attached by the VM at call time.
        let idx = self.add_constant(Constant::Code {
            code: Rc::new(code),
            name: name.to_string(),
        });
        self.emit(OpCode::LoadConst, idx);
        let name_idx = self.add_name(name);
        self.emit(OpCode::StoreName, name_idx);

        Ok(())
    }

    fn compile_expr(&mut self, expr: &Expr) -> Result<(), CompileError> {
        match &expr.kind {
            ExprKind::BinaryOp { left, op, right } => {
                self.compile_expr(left)?;
                self.compile_expr(right)?;
                let opcode = match op {
                    BinOp::Add => OpCode::BinaryAdd,
                    BinOp::Sub => OpCode::BinarySub,
                    BinOp::Mul => OpCode::BinaryMul,
                    BinOp::Div => OpCode::BinaryDiv,
                    BinOp::Mod => OpCode::BinaryMod,
                };
                self.emit(opcode, 0);
                Ok(())
            }
            ExprKind::UnaryOp { op, operand } => {
                self.compile_expr(operand)?;
                let opcode = match op {
                    UnaryOp::Pos => OpCode::UnaryPos,
                    UnaryOp::Neg => OpCode::UnaryNeg,
                    UnaryOp::Not => OpCode::UnaryNot,
                };
                self.emit(opcode, 0);
                Ok(())
            }
            ExprKind::BoolOp { op, values } => self.compile_bool_op(*op, values, expr),
            ExprKind::Compare { left, ops, rights } => {
                self.compile_expr(left)?;
                for (op, right) in ops.iter().zip(rights) {
                    self.compile_expr(right)?;
                    let opcode = match op {
                        CmpOp::Eq => OpCode::CompareEq,
                        CmpOp::NotEq => OpCode::CompareNe,
                        CmpOp::Lt => OpCode::CompareLt,
                        CmpOp::LtEq => OpCode::CompareLe,
                        CmpOp::Gt => OpCode::CompareGt,
                        CmpOp::GtEq => OpCode::CompareGe,
                        CmpOp::In => OpCode::CompareIn,
                    };
                    self.emit(opcode, 0);
                }
                Ok(())
            }
            ExprKind::Call { callee, args } => {
                self.compile_expr(callee)?;
                for arg in args {
                    self.compile_expr(arg)?;
                }
                self.emit(OpCode::CallFunction, args.len() as u32);
                Ok(())
            }
            ExprKind::Subscript { value, index } => {
                self.compile_expr(value)?;
                self.compile_expr(index)?;
                self.emit(OpCode::BinarySubscr, 0);
                Ok(())
            }
            ExprKind::Name(name) => {
                if self.scope_depth == 0 {
                    let idx = self.add_name(name);
                    self.emit(OpCode::LoadName, idx);
                } else if let Some(&idx) = self.varname_map.get(name) {
                    self.emit(OpCode::LoadFast, idx as u32);
                } else {
                    let idx = self.add_name(name);
                    self.emit(OpCode::LoadGlobal, idx);
                }
                Ok(())
            }
            ExprKind::Int(value) => {
                let idx = self.add_constant(Constant::Int(*value));
                self.emit(OpCode::LoadConst, idx);
                Ok(())
            }
            ExprKind::Float(value) => {
                let idx = self.add_constant(Constant::Float(*value));
                self.emit(OpCode::LoadConst, idx);
                Ok(())
            }
            ExprKind::Str(value) => {
                let idx = self.add_constant(Constant::Str(value.clone()));
                self.emit(OpCode::LoadConst, idx);
                Ok(())
            }
            ExprKind::NameConstant(constant) => {
                let constant = match constant {
                    NameConstant::True => Constant::Bool(true),
                    NameConstant::False => Constant::Bool(false),
                    NameConstant::None => Constant::None,
                };
                let idx = self.add_constant(constant);
                self.emit(OpCode::LoadConst, idx);
                Ok(())
            }
            ExprKind::List(elements) => {
                for element in elements {
                    self.compile_expr(element)?;
                }
                self.emit(OpCode::BuildList, elements.len() as u32);
                Ok(())
            }
            ExprKind::Dict { keys, values } => {
                for (key, value) in keys.iter().zip(values) {
                    self.compile_expr(key)?;
                    self.compile_expr(value)?;
                }
                self.emit(OpCode::BuildDict, keys.len() as u32);
                Ok(())
            }
        }
    }

    /// `and` pop-jumps to the exit on false, `or` on true; the duplicated
    /// operand survives the jump as the expression result, and the PopTop on
    /// the fall-through path makes room for the next operand.
    fn compile_bool_op(
        &mut self,
        op: BoolOp,
        values: &[Expr],
        expr: &Expr,
    ) -> Result<(), CompileError> {
        if values.len() < 2 {
            return Err(CompileError::BoolOpArity {
                line: expr.position.line,
            });
        }

        self.compile_expr(&values[0])?;

        let mut jumps = Vec::new();
        for value in &values[1..] {
            self.emit(OpCode::DupTop, 0);
            let jump_op = match op {
                BoolOp::And => OpCode::PopJumpIfFalse,
                BoolOp::Or => OpCode::PopJumpIfTrue,
            };
            jumps.push(self.emit(jump_op, 0));
            self.emit(OpCode::PopTop, 0);
            self.compile_expr(value)?;
        }

        let exit = self.here();
        for pos in jumps {
            self.patch(pos, exit);
        }

        Ok(())
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}
