#![allow(dead_code)]
use std::fs;

use pyast::ast::Module;
use pyast::{lexer, parser};

pub const WORKLOADS: [(&str, &str); 2] = [
    ("comprehensive", "tests/programs/comprehensive.py"),
    ("nesting", "tests/programs/nesting.py"),
];

pub fn workloads() -> impl Iterator<Item = (&'static str, &'static str)> {
    WORKLOADS.iter().copied()
}

pub fn load_source(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|err| panic!("read {path}: {err}"))
}

pub fn load_module(path: &str) -> Module {
    let source = load_source(path);
    let tokens = lexer::tokenize(&source).unwrap_or_else(|err| panic!("tokenize {path}: {err}"));
    parser::parse_tokens(tokens).unwrap_or_else(|err| panic!("parse {path}: {err}"))
}
