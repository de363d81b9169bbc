//! Self-framed binary encoding for compiled code objects.
//!
//! Layout: 4-byte magic, one version byte, then a code-object record. A
//! record is argcount, filename, name, first line, the instruction vector
//! (opcode byte + unsigned varint argument), the constant pool (tag byte +
//! payload), the name table, and the varname table, every sequence length
//! prefixed with an unsigned varint. Function constants nest a full record.
//! Forward compatibility is not a goal; the version byte only guards against
//! loading a stream this build cannot understand.

use std::io::{Read, Write};
use std::rc::Rc;

use thiserror::Error;

use crate::bytecode::{CodeObject, Constant, Instruction, OpCode};

const MAGIC: [u8; 4] = *b"PYBC";
const VERSION: u8 = 1;

const TAG_NONE: u8 = 0;
const TAG_BOOL: u8 = 1;
const TAG_INT: u8 = 2;
const TAG_FLOAT: u8 = 3;
const TAG_STR: u8 = 4;
const TAG_CODE: u8 = 5;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("not a bytecode stream (bad magic)")]
    BadMagic,
    #[error("unsupported bytecode version {0}")]
    UnsupportedVersion(u8),
    #[error("invalid opcode byte {0}")]
    InvalidOpcode(u8),
    #[error("invalid constant tag {0}")]
    InvalidConstantTag(u8),
    #[error("string is not valid utf-8")]
    InvalidUtf8,
    #[error("varint exceeds 64 bits")]
    VarintTooLong,
}

fn write_uvarint<W: Write>(w: &mut W, mut value: u64) -> Result<(), FormatError> {
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        w.write_all(&[byte])?;
        if value == 0 {
            return Ok(());
        }
    }
}

fn read_uvarint<R: Read>(r: &mut R) -> Result<u64, FormatError> {
    let mut value = 0u64;
    let mut shift = 0u32;
    loop {
        let byte = read_u8(r)?;
        if shift >= 64 || (shift == 63 && byte > 1) {
            return Err(FormatError::VarintTooLong);
        }
        value |= u64::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            return Ok(value);
        }
        shift += 7;
    }
}

fn zigzag_encode(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

fn zigzag_decode(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

fn read_u8<R: Read>(r: &mut R) -> Result<u8, FormatError> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

fn write_str<W: Write>(w: &mut W, value: &str) -> Result<(), FormatError> {
    write_uvarint(w, value.len() as u64)?;
    w.write_all(value.as_bytes())?;
    Ok(())
}

fn read_str<R: Read>(r: &mut R) -> Result<String, FormatError> {
    let len = read_uvarint(r)? as usize;
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf)?;
    String::from_utf8(buf).map_err(|_| FormatError::InvalidUtf8)
}

fn write_constant<W: Write>(w: &mut W, constant: &Constant) -> Result<(), FormatError> {
    match constant {
        Constant::None => w.write_all(&[TAG_NONE])?,
        Constant::Bool(value) => {
            w.write_all(&[TAG_BOOL, u8::from(*value)])?;
        }
        Constant::Int(value) => {
            w.write_all(&[TAG_INT])?;
            write_uvarint(w, zigzag_encode(*value))?;
        }
        Constant::Float(value) => {
            w.write_all(&[TAG_FLOAT])?;
            w.write_all(&value.to_le_bytes())?;
        }
        Constant::Str(value) => {
            w.write_all(&[TAG_STR])?;
            write_str(w, value)?;
        }
        Constant::Code { code, name } => {
            w.write_all(&[TAG_CODE])?;
            write_record(w, code)?;
            write_str(w, name)?;
        }
    }
    Ok(())
}

fn read_constant<R: Read>(r: &mut R) -> Result<Constant, FormatError> {
    match read_u8(r)? {
        TAG_NONE => Ok(Constant::None),
        TAG_BOOL => Ok(Constant::Bool(read_u8(r)? != 0)),
        TAG_INT => Ok(Constant::Int(zigzag_decode(read_uvarint(r)?))),
        TAG_FLOAT => {
            let mut buf = [0u8; 8];
            r.read_exact(&mut buf)?;
            Ok(Constant::Float(f64::from_le_bytes(buf)))
        }
        TAG_STR => Ok(Constant::Str(read_str(r)?)),
        TAG_CODE => {
            let code = read_record(r)?;
            let name = read_str(r)?;
            Ok(Constant::Code {
                code: Rc::new(code),
                name,
            })
        }
        tag => Err(FormatError::InvalidConstantTag(tag)),
    }
}

fn write_record<W: Write>(w: &mut W, code: &CodeObject) -> Result<(), FormatError> {
    write_uvarint(w, code.argcount as u64)?;
    write_str(w, &code.filename)?;
    write_str(w, &code.name)?;
    write_uvarint(w, code.firstlineno as u64)?;

    write_uvarint(w, code.instructions.len() as u64)?;
    for instruction in &code.instructions {
        w.write_all(&[instruction.op as u8])?;
        write_uvarint(w, u64::from(instruction.arg))?;
    }

    write_uvarint(w, code.consts.len() as u64)?;
    for constant in &code.consts {
        write_constant(w, constant)?;
    }

    write_uvarint(w, code.names.len() as u64)?;
    for name in &code.names {
        write_str(w, name)?;
    }

    write_uvarint(w, code.varnames.len() as u64)?;
    for name in &code.varnames {
        write_str(w, name)?;
    }

    Ok(())
}

fn read_record<R: Read>(r: &mut R) -> Result<CodeObject, FormatError> {
    let argcount = read_uvarint(r)? as usize;
    let filename = read_str(r)?;
    let name = read_str(r)?;
    let firstlineno = read_uvarint(r)? as usize;

    let ninstructions = read_uvarint(r)? as usize;
    let mut instructions = Vec::with_capacity(ninstructions.min(1 << 16));
    for _ in 0..ninstructions {
        let byte = read_u8(r)?;
        let op = OpCode::from_u8(byte).ok_or(FormatError::InvalidOpcode(byte))?;
        let arg = read_uvarint(r)? as u32;
        instructions.push(Instruction::new(op, arg));
    }

    let nconsts = read_uvarint(r)? as usize;
    let mut consts = Vec::with_capacity(nconsts.min(1 << 16));
    for _ in 0..nconsts {
        consts.push(read_constant(r)?);
    }

    let nnames = read_uvarint(r)? as usize;
    let mut names = Vec::with_capacity(nnames.min(1 << 16));
    for _ in 0..nnames {
        names.push(read_str(r)?);
    }

    let nvarnames = read_uvarint(r)? as usize;
    let mut varnames = Vec::with_capacity(nvarnames.min(1 << 16));
    for _ in 0..nvarnames {
        varnames.push(read_str(r)?);
    }

    Ok(CodeObject {
        instructions,
        consts,
        names,
        varnames,
        argcount,
        filename,
        name,
        firstlineno,
    })
}

impl CodeObject {
    pub fn serialize<W: Write>(&self, w: &mut W) -> Result<(), FormatError> {
        w.write_all(&MAGIC)?;
        w.write_all(&[VERSION])?;
        write_record(w, self)
    }

    pub fn deserialize<R: Read>(r: &mut R) -> Result<CodeObject, FormatError> {
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(FormatError::BadMagic);
        }
        let version = read_u8(r)?;
        if version != VERSION {
            return Err(FormatError::UnsupportedVersion(version));
        }
        read_record(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_function_code() -> CodeObject {
        CodeObject {
            instructions: vec![
                Instruction::new(OpCode::LoadFast, 0),
                Instruction::new(OpCode::ReturnValue, 0),
            ],
            consts: vec![Constant::None],
            names: vec![],
            varnames: vec!["n".to_string()],
            argcount: 1,
            filename: "<function>".to_string(),
            name: "identity".to_string(),
            firstlineno: 1,
        }
    }

    fn sample_module_code() -> CodeObject {
        CodeObject {
            instructions: vec![
                Instruction::new(OpCode::LoadConst, 0),
                Instruction::new(OpCode::StoreName, 0),
                Instruction::new(OpCode::LoadConst, 1),
                Instruction::new(OpCode::ReturnValue, 0),
            ],
            consts: vec![
                Constant::Code {
                    code: Rc::new(sample_function_code()),
                    name: "identity".to_string(),
                },
                Constant::None,
            ],
            names: vec!["identity".to_string()],
            varnames: vec![],
            argcount: 0,
            filename: "<module>".to_string(),
            name: "<module>".to_string(),
            firstlineno: 1,
        }
    }

    #[test]
    fn round_trips_structurally() {
        let code = sample_module_code();
        let mut buf = Vec::new();
        code.serialize(&mut buf).expect("serialize");
        let restored = CodeObject::deserialize(&mut buf.as_slice()).expect("deserialize");
        assert_eq!(restored, code);
    }

    #[test]
    fn round_trips_every_scalar_constant() {
        let mut code = sample_function_code();
        code.consts = vec![
            Constant::None,
            Constant::Bool(true),
            Constant::Bool(false),
            Constant::Int(0),
            Constant::Int(-1),
            Constant::Int(i64::MAX),
            Constant::Int(i64::MIN),
            Constant::Float(3.25),
            Constant::Float(-0.5),
            Constant::Str("hello\nworld".to_string()),
            Constant::Str(String::new()),
        ];
        let mut buf = Vec::new();
        code.serialize(&mut buf).expect("serialize");
        let restored = CodeObject::deserialize(&mut buf.as_slice()).expect("deserialize");
        assert_eq!(restored.consts, code.consts);
    }

    #[test]
    fn rejects_bad_magic() {
        let err = CodeObject::deserialize(&mut &b"NOPE\x01"[..]).expect_err("should fail");
        assert!(matches!(err, FormatError::BadMagic));
    }

    #[test]
    fn rejects_unknown_version() {
        let mut buf = Vec::new();
        sample_function_code().serialize(&mut buf).expect("serialize");
        buf[4] = 99;
        let err = CodeObject::deserialize(&mut buf.as_slice()).expect_err("should fail");
        assert!(matches!(err, FormatError::UnsupportedVersion(99)));
    }

    #[test]
    fn rejects_truncated_stream() {
        let mut buf = Vec::new();
        sample_module_code().serialize(&mut buf).expect("serialize");
        buf.truncate(buf.len() / 2);
        let err = CodeObject::deserialize(&mut buf.as_slice()).expect_err("should fail");
        assert!(matches!(err, FormatError::Io(_)));
    }

    #[test]
    fn zigzag_is_symmetric() {
        for value in [0i64, 1, -1, 63, -64, i64::MAX, i64::MIN] {
            assert_eq!(zigzag_decode(zigzag_encode(value)), value);
        }
    }
}
