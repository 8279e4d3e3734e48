// Copyright (c) 2023 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions,
// more details in file LICENSE, LICENSE.additional and CONTRIBUTING.

//! A two-pass SIC/XE assembler core, plus the line parser, diagnostics,
//! and listing renderer built around it.
//!
//! The core (`assemble`) takes already-parsed `Line`s and returns bytes;
//! it has no notion of source text, file paths, or error messages. Those
//! live in `source`, `diagnostic`, and `objfile` respectively, each a thin
//! layer over the same two passes.

pub mod bits;
pub mod diagnostic;
pub mod encode;
pub mod format;
pub mod objfile;
pub mod passes;
pub mod source;
pub mod state;

use sicxe_types::Line;

/// Assembles a program: pass one binds every label to an address, pass two
/// encodes each line against the resulting symbol table.
///
/// Returns `None` iff any line failed to encode; otherwise one byte
/// vector per input line, in input order. Callers who need to know which
/// line failed and why should use `diagnostic::assemble_checked` instead.
pub fn assemble(lines: &[Line]) -> Option<Vec<Vec<u8>>> {
    let symbol_table = passes::first_pass(lines);
    passes::second_pass(lines, symbol_table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sicxe_types::{AddressingMode, Mnemonic, Operand};

    #[test]
    fn assembles_a_small_program_end_to_end() {
        let lines = vec![
            Line::new(
                None,
                Mnemonic::new("LDA", false),
                vec![Operand::symbol("FIVE", AddressingMode::Simple)],
            ),
            Line::new(None, Mnemonic::new("RSUB", false), vec![]),
            Line::new(
                Some("FIVE"),
                Mnemonic::new("WORD", false),
                vec![Operand::literal(5, AddressingMode::Simple)],
            ),
        ];
        let bytes = assemble(&lines).unwrap();
        assert_eq!(bytes.len(), 3);
        assert_eq!(bytes[1], vec![0x4C, 0x00, 0x00]);
        assert_eq!(bytes[2], vec![0x00, 0x00, 0x05]);
    }

    #[test]
    fn a_single_bad_line_fails_the_whole_assembly() {
        let lines = vec![Line::new(None, Mnemonic::new("NOPE", false), vec![])];
        assert_eq!(assemble(&lines), None);
    }
}
