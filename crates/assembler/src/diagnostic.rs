// Copyright (c) 2023 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions,
// more details in file LICENSE, LICENSE.additional and CONTRIBUTING.

//! A diagnostic-carrying wrapper around the core `assemble` entry point.
//!
//! `assemble` itself collapses every failure mode to `None` so that pass
//! one and pass two stay simple and symmetric. This module re-derives
//! *which* line broke and *why*, by walking both passes a second time,
//! rather than threading error information through the core.

use std::fmt;

use sicxe_types::catalogue;
use sicxe_types::{Line, SymbolTable};

use crate::encode::encode_line;
use crate::passes::sizeof_line;
use crate::state::AssemblerState;

/// The line on which assembly first failed, and a human-readable reason.
///
/// `line` is the 0-based index into the `Line` slice passed to
/// `assemble_checked`, not a source file line number -- a caller that
/// parsed with `source::parse_program_with_lines` has the mapping back to
/// the original text and is expected to apply it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembleError {
    pub line: usize,
    pub message: String,
}

impl AssembleError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for AssembleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for AssembleError {}

/// Same result as `assemble`, but with the first failing line and a reason
/// attached instead of a bare `None`.
pub fn assemble_checked(lines: &[Line]) -> Result<Vec<Vec<u8>>, AssembleError> {
    let symbol_table = first_pass_checked(lines)?;
    second_pass_checked(lines, symbol_table)
}

fn first_pass_checked(lines: &[Line]) -> Result<SymbolTable, AssembleError> {
    let mut state = AssemblerState::new();
    for (index, line) in lines.iter().enumerate() {
        if let Some(label) = &line.label {
            let address = state.get_address();
            state.define_symbol(label, address);
        }
        match sizeof_line(line, &state) {
            Some(size) => state.advance(size),
            None => return Err(AssembleError::new(index, describe_failure(line))),
        }
    }
    Ok(state.into_symbol_table())
}

fn second_pass_checked(
    lines: &[Line],
    symbol_table: SymbolTable,
) -> Result<Vec<Vec<u8>>, AssembleError> {
    let mut state = AssemblerState::with_symbol_table(symbol_table);
    let mut output = Vec::with_capacity(lines.len());
    for (index, line) in lines.iter().enumerate() {
        match encode_line(line, &mut state) {
            Some(bytes) => output.push(bytes),
            None => return Err(AssembleError::new(index, describe_failure(line))),
        }
    }
    Ok(output)
}

fn describe_failure(line: &Line) -> String {
    let is_operation = catalogue::lookup_operation(&line.mnemonic.name).is_some();
    let is_directive = catalogue::lookup_directive(&line.mnemonic.name).is_some();

    if !is_operation && !is_directive {
        format!("unresolvable mnemonic '{}'", line.mnemonic.name)
    } else if is_operation {
        format!(
            "no permitted format for '{}' matches this operand shape",
            line.mnemonic.name
        )
    } else {
        format!(
            "'{}' requires a literal operand, not a symbolic one",
            line.mnemonic.name
        )
    }
}
