use std::fmt;
use std::rc::Rc;

pub mod serialize;

/// Stack-machine opcode set executed by the VM.
///
/// Arguments are pool indices, local slots, absolute instruction indices
/// (relative for `JumpForward`), or element/argument counts depending on the
/// opcode; opcodes without an argument carry 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OpCode {
    LoadConst = 0,
    LoadName,
    StoreName,
    LoadGlobal,
    StoreGlobal,
    LoadFast,
    StoreFast,

    BinaryAdd,
    BinarySub,
    BinaryMul,
    BinaryDiv,
    BinaryMod,

    UnaryPos,
    UnaryNeg,
    UnaryNot,

    CompareEq,
    CompareNe,
    CompareLt,
    CompareLe,
    CompareGt,
    CompareGe,
    CompareIn,

    JumpForward,
    JumpIfFalse,
    JumpIfTrue,
    JumpAbsolute,
    PopJumpIfFalse,
    PopJumpIfTrue,

    BuildList,
    BuildDict,

    BinarySubscr,
    StoreSubscr,

    CallFunction,
    ReturnValue,

    PrintExpr,
    PrintNewline,

    PopTop,
    RotTwo,
    RotThree,
    DupTop,

    GetIter,
    ForIter,

    Nop,
}

impl OpCode {
    pub fn from_u8(byte: u8) -> Option<Self> {
        const ALL: [OpCode; 43] = [
            OpCode::LoadConst,
            OpCode::LoadName,
            OpCode::StoreName,
            OpCode::LoadGlobal,
            OpCode::StoreGlobal,
            OpCode::LoadFast,
            OpCode::StoreFast,
            OpCode::BinaryAdd,
            OpCode::BinarySub,
            OpCode::BinaryMul,
            OpCode::BinaryDiv,
            OpCode::BinaryMod,
            OpCode::UnaryPos,
            OpCode::UnaryNeg,
            OpCode::UnaryNot,
            OpCode::CompareEq,
            OpCode::CompareNe,
            OpCode::CompareLt,
            OpCode::CompareLe,
            OpCode::CompareGt,
            OpCode::CompareGe,
            OpCode::CompareIn,
            OpCode::JumpForward,
            OpCode::JumpIfFalse,
            OpCode::JumpIfTrue,
            OpCode::JumpAbsolute,
            OpCode::PopJumpIfFalse,
            OpCode::PopJumpIfTrue,
            OpCode::BuildList,
            OpCode::BuildDict,
            OpCode::BinarySubscr,
            OpCode::StoreSubscr,
            OpCode::CallFunction,
            OpCode::ReturnValue,
            OpCode::PrintExpr,
            OpCode::PrintNewline,
            OpCode::PopTop,
            OpCode::RotTwo,
            OpCode::RotThree,
            OpCode::DupTop,
            OpCode::GetIter,
            OpCode::ForIter,
            OpCode::Nop,
        ];
        ALL.get(byte as usize).copied()
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OpCode::LoadConst => "LOAD_CONST",
            OpCode::LoadName => "LOAD_NAME",
            OpCode::StoreName => "STORE_NAME",
            OpCode::LoadGlobal => "LOAD_GLOBAL",
            OpCode::StoreGlobal => "STORE_GLOBAL",
            OpCode::LoadFast => "LOAD_FAST",
            OpCode::StoreFast => "STORE_FAST",
            OpCode::BinaryAdd => "BINARY_ADD",
            OpCode::BinarySub => "BINARY_SUB",
            OpCode::BinaryMul => "BINARY_MUL",
            OpCode::BinaryDiv => "BINARY_DIV",
            OpCode::BinaryMod => "BINARY_MOD",
            OpCode::UnaryPos => "UNARY_POS",
            OpCode::UnaryNeg => "UNARY_NEG",
            OpCode::UnaryNot => "UNARY_NOT",
            OpCode::CompareEq => "COMPARE_EQ",
            OpCode::CompareNe => "COMPARE_NE",
            OpCode::CompareLt => "COMPARE_LT",
            OpCode::CompareLe => "COMPARE_LE",
            OpCode::CompareGt => "COMPARE_GT",
            OpCode::CompareGe => "COMPARE_GE",
            OpCode::CompareIn => "COMPARE_IN",
            OpCode::JumpForward => "JUMP_FORWARD",
            OpCode::JumpIfFalse => "JUMP_IF_FALSE",
            OpCode::JumpIfTrue => "JUMP_IF_TRUE",
            OpCode::JumpAbsolute => "JUMP_ABSOLUTE",
            OpCode::PopJumpIfFalse => "POP_JUMP_IF_FALSE",
            OpCode::PopJumpIfTrue => "POP_JUMP_IF_TRUE",
            OpCode::BuildList => "BUILD_LIST",
            OpCode::BuildDict => "BUILD_DICT",
            OpCode::BinarySubscr => "BINARY_SUBSCR",
            OpCode::StoreSubscr => "STORE_SUBSCR",
            OpCode::CallFunction => "CALL_FUNCTION",
            OpCode::ReturnValue => "RETURN_VALUE",
            OpCode::PrintExpr => "PRINT_EXPR",
            OpCode::PrintNewline => "PRINT_NEWLINE",
            OpCode::PopTop => "POP_TOP",
            OpCode::RotTwo => "ROT_TWO",
            OpCode::RotThree => "ROT_THREE",
            OpCode::DupTop => "DUP_TOP",
            OpCode::GetIter => "GET_ITER",
            OpCode::ForIter => "FOR_ITER",
            OpCode::Nop => "NOP",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub op: OpCode,
    pub arg: u32,
}

impl Instruction {
    pub fn new(op: OpCode, arg: u32) -> Self {
        Self { op, arg }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.op, self.arg)
    }
}

/// Constant-pool entry.
///
/// Only scalars and function code objects are representable; list and dict
/// literals always compile to `BUILD_LIST`/`BUILD_DICT` so that each
/// execution builds a fresh container.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Code { code: Rc<CodeObject>, name: String },
}

impl Constant {
    /// Tag + rendering used for constant-pool deduplication and disassembly.
    pub fn render(&self) -> String {
        match self {
            Constant::None => "None".to_string(),
            Constant::Bool(true) => "True".to_string(),
            Constant::Bool(false) => "False".to_string(),
            Constant::Int(value) => value.to_string(),
            Constant::Float(value) => value.to_string(),
            Constant::Str(value) => format!("{value:?}"),
            Constant::Code { code, name } => {
                format!("<code {} at line {}>", name, code.firstlineno)
            }
        }
    }

    pub fn tag_name(&self) -> &'static str {
        match self {
            Constant::None => "none",
            Constant::Bool(_) => "bool",
            Constant::Int(_) => "int",
            Constant::Float(_) => "float",
            Constant::Str(_) => "str",
            Constant::Code { .. } => "code",
        }
    }
}

/// Immutable compiled unit: instructions plus the three pools and metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeObject {
    pub instructions: Vec<Instruction>,
    pub consts: Vec<Constant>,
    pub names: Vec<String>,
    pub varnames: Vec<String>,
    pub argcount: usize,
    pub filename: String,
    pub name: String,
    pub firstlineno: usize,
}

impl CodeObject {
    pub fn disassemble(&self) -> String {
        let mut result = format!("Code object: {}\n", self.name);
        result += &format!(
            "Args: {}, Consts: {}, Names: {}, Vars: {}\n",
            self.argcount,
            self.consts.len(),
            self.names.len(),
            self.varnames.len()
        );
        result += "\nConstants:\n";
        for (i, constant) in self.consts.iter().enumerate() {
            result += &format!("  {}: {}\n", i, constant.render());
        }
        result += "\nNames:\n";
        for (i, name) in self.names.iter().enumerate() {
            result += &format!("  {i}: {name}\n");
        }
        result += "\nVarnames:\n";
        for (i, name) in self.varnames.iter().enumerate() {
            result += &format!("  {i}: {name}\n");
        }
        result += "\nInstructions:\n";
        for (i, instruction) in self.instructions.iter().enumerate() {
            result += &format!("  {i:3}: {instruction}\n");
        }
        result
    }
}

impl fmt::Display for CodeObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CodeObject{{name={}, argcount={}, instructions={}, consts={}, names={}}}",
            self.name,
            self.argcount,
            self.instructions.len(),
            self.consts.len(),
            self.names.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcode_bytes_round_trip() {
        for byte in 0..=u8::MAX {
            if let Some(op) = OpCode::from_u8(byte) {
                assert_eq!(op as u8, byte);
            }
        }
        assert_eq!(OpCode::from_u8(OpCode::Nop as u8), Some(OpCode::Nop));
        assert_eq!(OpCode::from_u8(OpCode::Nop as u8 + 1), None);
    }

    #[test]
    fn disassembly_lists_pools_and_instructions() {
        let code = CodeObject {
            instructions: vec![
                Instruction::new(OpCode::LoadConst, 0),
                Instruction::new(OpCode::ReturnValue, 0),
            ],
            consts: vec![Constant::Int(42)],
            names: vec!["x".to_string()],
            varnames: vec![],
            argcount: 0,
            filename: "<module>".to_string(),
            name: "<module>".to_string(),
            firstlineno: 1,
        };
        let listing = code.disassemble();
        assert!(listing.contains("LOAD_CONST 0"));
        assert!(listing.contains("RETURN_VALUE 0"));
        assert!(listing.contains("0: 42"));
        assert!(listing.contains("0: x"));
    }
}
