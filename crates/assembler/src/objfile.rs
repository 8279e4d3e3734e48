// Copyright (c) 2023 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions,
// more details in file LICENSE, LICENSE.additional and CONTRIBUTING.

//! Rendering assembled output for a human to read: an address/bytes/source
//! listing, and a flat byte stream for writing to disk.

use sicxe_types::{AddressingMode, Line, OperandValue};

use crate::passes::sizeof_line;
use crate::state::AssemblerState;

/// The address each line starts at, as pass one would have assigned it.
///
/// `assemble`'s output carries bytes but not addresses, so a listing has
/// to recompute them; it does so the same way pass one does, walking the
/// size oracle without binding the symbol table, which is exactly what
/// keeps pass-one sizing independent of resolved addresses in the first
/// place. If a line's size can't be predicted the walk stops there, same
/// as `first_pass`.
fn line_addresses(lines: &[Line]) -> Vec<u32> {
    let mut state = AssemblerState::new();
    let mut addresses = Vec::with_capacity(lines.len());
    for line in lines {
        addresses.push(state.get_address());
        match sizeof_line(line, &state) {
            Some(size) => state.advance(size),
            None => break,
        }
    }
    addresses
}

/// Concatenates every line's bytes into a single flat stream, in order.
pub fn flatten(bytes: &[Vec<u8>]) -> Vec<u8> {
    bytes.iter().flatten().copied().collect()
}

/// One line per input line: its pass-one address, its encoded bytes in
/// hex, and a re-rendered form of its source text.
///
/// `lines` and `bytes` must correspond to the same successful `assemble`
/// call; a mismatched length falls back to `0` for any address past the
/// point pass one's size oracle stopped predicting.
pub fn render_listing(lines: &[Line], bytes: &[Vec<u8>]) -> String {
    let addresses = line_addresses(lines);
    let mut out = String::new();
    for (index, line) in lines.iter().enumerate() {
        let address = addresses.get(index).copied().unwrap_or(0);
        let hex = bytes
            .get(index)
            .map(|line_bytes| {
                line_bytes
                    .iter()
                    .map(|b| format!("{:02X}", b))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default();
        out.push_str(&format!("{:06X}  {:<24}{}\n", address, hex, format_source(line)));
    }
    out
}

fn format_source(line: &Line) -> String {
    let mut parts = Vec::new();
    if let Some(label) = &line.label {
        parts.push(label.clone());
    }
    let mnemonic = if line.mnemonic.extended {
        format!("+{}", line.mnemonic.name)
    } else {
        line.mnemonic.name.clone()
    };
    parts.push(mnemonic);
    if !line.operands.is_empty() {
        let operands = line
            .operands
            .iter()
            .map(format_operand)
            .collect::<Vec<_>>()
            .join(",");
        parts.push(operands);
    }
    parts.join(" ")
}

fn format_operand(operand: &sicxe_types::Operand) -> String {
    let prefix = match operand.mode {
        AddressingMode::Immediate => "#",
        AddressingMode::Indirect => "@",
        AddressingMode::Simple => "",
    };
    let value = match &operand.value {
        OperandValue::Literal(value) => value.to_string(),
        OperandValue::Symbol(name) => name.clone(),
    };
    format!("{}{}", prefix, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sicxe_types::{Mnemonic, Operand};

    #[test]
    fn listing_pairs_each_line_with_an_increasing_address() {
        let lines = vec![
            Line::new(
                Some("FIVE"),
                Mnemonic::new("WORD", false),
                vec![Operand::literal(5, AddressingMode::Simple)],
            ),
            Line::new(None, Mnemonic::new("RSUB", false), vec![]),
        ];
        let bytes = crate::assemble(&lines).unwrap();
        let listing = render_listing(&lines, &bytes);
        assert!(listing.contains("000000"));
        assert!(listing.contains("000003"));
        assert!(listing.contains("FIVE WORD 5"));
    }

    #[test]
    fn flatten_concatenates_in_order() {
        let bytes = vec![vec![1, 2], vec![3], vec![4, 5, 6]];
        assert_eq!(flatten(&bytes), vec![1, 2, 3, 4, 5, 6]);
    }
}
