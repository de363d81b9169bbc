#![allow(dead_code)]
use std::fs;

use pystack::ast::Module;
use pystack::bytecode::CodeObject;
use pystack::{compiler, lexer, parser};

pub const WORKLOADS: [(&str, &str); 2] = [
    ("loop", "tests/programs/bench_loop.py"),
    ("fib", "tests/programs/bench_fib.py"),
];

pub fn load_source(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|err| panic!("read {path}: {err}"))
}

pub fn load_module(path: &str) -> Module {
    let source = load_source(path);
    let tokens = lexer::tokenize(&source);
    parser::parse_tokens(tokens).unwrap_or_else(|err| panic!("parse {path}: {err}"))
}

pub fn load_code(path: &str) -> CodeObject {
    let module = load_module(path);
    compiler::compile(&module).unwrap_or_else(|err| panic!("compile {path}: {err}"))
}
