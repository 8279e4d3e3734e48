// Copyright (c) 2023 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions,
// more details in file LICENSE, LICENSE.additional and CONTRIBUTING.

use sicxe_types::catalogue;
use sicxe_types::{Format, Line, SymbolTable};

use crate::encode::minimal_be_bytes;
use crate::format::select_format;
use crate::state::AssemblerState;

/// Predicts the byte count a line will occupy, without encoding it.
///
/// Two strategies are tried in order: as an instruction (the chosen
/// format's numeric value *is* the size), then as a directive (a fixed
/// lookup). Neither matching yields `None`.
pub fn sizeof_line(line: &Line, state: &AssemblerState) -> Option<usize> {
    if let Some(op) = catalogue::lookup_operation(&line.mnemonic.name) {
        select_format(op, line, state).map(Format::size)
    } else if let Some(directive) = catalogue::lookup_directive(&line.mnemonic.name) {
        directive_size(directive, line)
    } else {
        None
    }
}

fn directive_size(directive: catalogue::Directive, line: &Line) -> Option<usize> {
    use catalogue::Directive::*;

    let literal = |line: &Line| match &line.operands.first()?.value {
        sicxe_types::OperandValue::Literal(value) => Some(*value),
        sicxe_types::OperandValue::Symbol(_) => None,
    };

    match directive {
        Byte => Some(minimal_be_bytes(literal(line)?).len()),
        Word => literal(line).map(|_| 3),
        Resb => literal(line).map(|n| n as usize),
        Resw => literal(line).map(|n| 3 * n as usize),
        Start => literal(line).map(|n| n as usize),
        End => Some(0),
    }
}

/// Binds every uniquely-labelled line to its address and returns the
/// completed symbol table.
///
/// If a line's size cannot be predicted, the pass stops silently: no
/// further labels are bound. This mirrors the source's behavior and is
/// almost certainly a latent bug (see the design notes) -- a correct
/// implementation would surface it as a diagnostic, which the
/// `diagnostic` module does without changing this function's behavior.
pub fn first_pass(lines: &[Line]) -> SymbolTable {
    let mut state = AssemblerState::new();
    for line in lines {
        if let Some(label) = &line.label {
            let address = state.get_address();
            state.define_symbol(label, address);
        }
        match sizeof_line(line, &state) {
            Some(size) => state.advance(size),
            None => break,
        }
    }
    state.into_symbol_table()
}

/// Encodes every line against the symbol table pass one produced. The
/// symbol table is read-only here; only the location counter advances.
/// Fails the whole assembly if any single line fails to encode.
pub fn second_pass(lines: &[Line], symbol_table: SymbolTable) -> Option<Vec<Vec<u8>>> {
    let mut state = AssemblerState::with_symbol_table(symbol_table);
    let mut output = Vec::with_capacity(lines.len());
    for line in lines {
        output.push(crate::encode::encode_line(line, &mut state)?);
    }
    Some(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sicxe_types::{AddressingMode, Mnemonic, Operand};

    #[test]
    fn first_pass_binds_label_before_advancing() {
        let lines = vec![
            Line::new(
                Some("FIVE"),
                Mnemonic::new("WORD", false),
                vec![Operand::literal(5, AddressingMode::Simple)],
            ),
            Line::new(
                Some("SIX"),
                Mnemonic::new("WORD", false),
                vec![Operand::literal(6, AddressingMode::Simple)],
            ),
        ];
        let symbols = first_pass(&lines);
        assert_eq!(symbols.lookup("FIVE"), Some(0));
        assert_eq!(symbols.lookup("SIX"), Some(3));
    }

    #[test]
    fn first_pass_truncates_silently_on_unsized_line() {
        let lines = vec![
            Line::new(Some("A"), Mnemonic::new("RESW", false), vec![Operand::literal(1, AddressingMode::Simple)]),
            // a directive with a symbolic (non-literal) operand has no predictable size
            Line::new(Some("B"), Mnemonic::new("RESW", false), vec![Operand::symbol("N", AddressingMode::Simple)]),
            Line::new(Some("C"), Mnemonic::new("RESW", false), vec![Operand::literal(1, AddressingMode::Simple)]),
        ];
        let symbols = first_pass(&lines);
        assert_eq!(symbols.lookup("A"), Some(0));
        assert_eq!(symbols.lookup("B"), Some(3));
        assert_eq!(symbols.lookup("C"), None);
    }

    #[test]
    fn second_pass_fails_whole_assembly_on_bad_line() {
        let lines = vec![Line::new(None, Mnemonic::new("NOPE", false), vec![])];
        let symbols = first_pass(&lines);
        assert_eq!(second_pass(&lines, symbols), None);
    }
}
