// Copyright (c) 2023 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions,
// more details in file LICENSE, LICENSE.additional and CONTRIBUTING.

use sicxe_types::catalogue::{self, Directive, INDEXING_REGISTER};
use sicxe_types::{AddressingMode, Format, Line, OpDesc, Operand, OperandValue};

use crate::bits::{pack_bits, to_bits};
use crate::format::{is_absolute_required, resolve_operand_address, select_format};
use crate::state::AssemblerState;

/// Encodes one line, advancing `state`'s location counter by the number of
/// bytes emitted as its last act. Returns `None` if the mnemonic is
/// unresolvable (neither an instruction nor a directive) or its operands
/// do not match any permitted shape.
pub fn encode_line(line: &Line, state: &mut AssemblerState) -> Option<Vec<u8>> {
    if let Some(op) = catalogue::lookup_operation(&line.mnemonic.name) {
        encode_instruction(op, line, state)
    } else if let Some(directive) = catalogue::lookup_directive(&line.mnemonic.name) {
        encode_directive(directive, line, state)
    } else {
        None
    }
}

fn encode_instruction(op: &OpDesc, line: &Line, state: &mut AssemblerState) -> Option<Vec<u8>> {
    match select_format(op, line, state)? {
        Format::One => {
            state.advance(1);
            Some(vec![op.opcode])
        }
        Format::Two => encode_format2(line, state),
        Format::Three => encode_format3(op, line, state),
        Format::Four => encode_format4(op, line, state),
    }
}

fn register_or_literal_code(operand: &Operand) -> Option<u8> {
    match &operand.value {
        OperandValue::Symbol(name) => catalogue::lookup_register(name),
        OperandValue::Literal(value) => Some(*value as u8),
    }
}

fn encode_format2(line: &Line, state: &mut AssemblerState) -> Option<Vec<u8>> {
    let op = catalogue::lookup_operation(&line.mnemonic.name)?;
    let r1 = register_or_literal_code(line.operands.first()?)?;
    let r2 = match line.operands.get(1) {
        Some(second) => register_or_literal_code(second)?,
        None => 0,
    };
    state.advance(2);
    Some(vec![op.opcode, (r1 << 4) | (r2 & 0x0F)])
}

/// `n`, `i`, and `x` are derived the same way regardless of whether the
/// line ends up format 3 or format 4.
fn nix_flags(line: &Line) -> (bool, bool, bool) {
    let Some(first) = line.operands.first() else {
        return (true, true, false);
    };
    let n = matches!(first.mode, AddressingMode::Indirect | AddressingMode::Simple);
    let i = matches!(first.mode, AddressingMode::Immediate | AddressingMode::Simple);
    let x = line.operands.len() == 2
        && first.mode == AddressingMode::Simple
        && matches!(
            &line.operands[1].value,
            OperandValue::Symbol(name) if name == INDEXING_REGISTER
        )
        && line.operands[1].mode == AddressingMode::Simple;
    (n, i, x)
}

fn pack_format3(opcode: u8, n: bool, i: bool, x: bool, b: bool, p: bool, disp12: u32) -> Vec<u8> {
    let mut bits = to_bits((opcode >> 2) as u32, 6);
    bits.push(n);
    bits.push(i);
    bits.push(x);
    bits.push(b);
    bits.push(p);
    bits.push(false); // e=0 in format 3
    bits.extend(to_bits(disp12, 12));
    pack_bits(&bits)
}

fn pack_format4(opcode: u8, n: bool, i: bool, x: bool, addr20: u32) -> Vec<u8> {
    let mut bits = to_bits((opcode >> 2) as u32, 6);
    bits.push(n);
    bits.push(i);
    bits.push(x);
    bits.push(false); // b=0
    bits.push(false); // p=0
    bits.push(true); // e=1
    bits.extend(to_bits(addr20, 20));
    pack_bits(&bits)
}

/// Encodes a format-3 line, upgrading to format 4 in place if the
/// displacement does not fit either `p` or `b` range. This is the one
/// point where pass two can emit more bytes than pass one predicted (see
/// the design notes): the size oracle runs `select_format` the same way,
/// but the range check here uses `PC + 3`, not the plain current address
/// the selector checks, so the two can disagree once addresses are
/// resolved.
fn encode_format3(op: &OpDesc, line: &Line, state: &mut AssemblerState) -> Option<Vec<u8>> {
    let (n, i, x) = nix_flags(line);

    let Some(value_operand) = line.operands.first() else {
        state.advance(3);
        return Some(pack_format3(op.opcode, true, true, false, false, false, 0));
    };

    if is_absolute_required(value_operand) {
        let OperandValue::Literal(value) = &value_operand.value else {
            unreachable!("is_absolute_required guarantees a literal");
        };
        let disp12 = (*value as u32) & 0xFFF;
        state.advance(3);
        return Some(pack_format3(op.opcode, n, i, x, false, false, disp12));
    }

    let operand_address = resolve_operand_address(value_operand, state);
    let disp = operand_address as i64 - (state.get_address() as i64 + 3);
    let p = (-2048..2048).contains(&disp);
    let b = !p && (0..4096).contains(&disp);

    if p || b {
        let disp12 = (disp as i32 as u32) & 0xFFF;
        state.advance(3);
        Some(pack_format3(op.opcode, n, i, x, b, p, disp12))
    } else {
        encode_format4(op, line, state)
    }
}

fn encode_format4(op: &OpDesc, line: &Line, state: &mut AssemblerState) -> Option<Vec<u8>> {
    let (n, i, x) = nix_flags(line);
    let addr = match line.operands.first() {
        Some(value_operand) => resolve_operand_address(value_operand, state) & 0xFFFFF,
        None => 0,
    };
    state.advance(4);
    Some(pack_format4(op.opcode, n, i, x, addr))
}

fn literal_value(operand: Option<&Operand>) -> Option<i64> {
    match &operand?.value {
        OperandValue::Literal(value) => Some(*value),
        OperandValue::Symbol(_) => None,
    }
}

/// The shortest big-endian byte sequence whose unsigned interpretation
/// equals `value`; `0` is one byte, `0x00`.
pub fn minimal_be_bytes(value: i64) -> Vec<u8> {
    let magnitude = value as u64;
    if magnitude == 0 {
        return vec![0];
    }
    let mut bytes = magnitude.to_be_bytes().to_vec();
    while bytes.len() > 1 && bytes[0] == 0 {
        bytes.remove(0);
    }
    bytes
}

fn encode_directive(directive: Directive, line: &Line, state: &mut AssemblerState) -> Option<Vec<u8>> {
    match directive {
        Directive::Byte => {
            let bytes = minimal_be_bytes(literal_value(line.operands.first())?);
            state.advance(bytes.len());
            Some(bytes)
        }
        Directive::Word => {
            let value = literal_value(line.operands.first())?;
            let bytes = vec![
                ((value >> 16) & 0xFF) as u8,
                ((value >> 8) & 0xFF) as u8,
                (value & 0xFF) as u8,
            ];
            state.advance(3);
            Some(bytes)
        }
        Directive::Resb => {
            let n = literal_value(line.operands.first())? as usize;
            state.advance(n);
            Some(vec![0u8; n])
        }
        Directive::Resw => {
            let n = literal_value(line.operands.first())? as usize;
            state.advance(3 * n);
            Some(vec![0u8; 3 * n])
        }
        // The ISA reference has `START n` set the load address to `n`; the
        // source this is ported from instead reserves `n` bytes like
        // `RESB n`. Preserved bug-for-bug -- see the design notes.
        Directive::Start => {
            let n = literal_value(line.operands.first())? as usize;
            state.advance(n);
            Some(vec![0u8; n])
        }
        Directive::End => Some(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sicxe_types::Mnemonic;

    fn line(label: Option<&str>, mnemonic: &str, extended: bool, operands: Vec<Operand>) -> Line {
        Line::new(label, Mnemonic::new(mnemonic, extended), operands)
    }

    #[test]
    fn lda_pc_relative_forward_reference() {
        let mut state = AssemblerState::new();
        state.define_symbol("FIVE", 0x006);
        let l = line(None, "LDA", false, vec![Operand::symbol("FIVE", AddressingMode::Simple)]);
        assert_eq!(encode_line(&l, &mut state), Some(vec![0x03, 0x20, 0x03]));
        assert_eq!(state.get_address(), 3);
    }

    #[test]
    fn lda_immediate_is_absolute() {
        let mut state = AssemblerState::new();
        let l = line(None, "LDA", false, vec![Operand::literal(5, AddressingMode::Immediate)]);
        assert_eq!(encode_line(&l, &mut state), Some(vec![0x01, 0x00, 0x05]));
    }

    #[test]
    fn extended_lda_is_format_four() {
        let mut state = AssemblerState::new();
        state.define_symbol("FIVE", 0x00ABCD);
        let l = line(None, "LDA", true, vec![Operand::symbol("FIVE", AddressingMode::Simple)]);
        assert_eq!(encode_line(&l, &mut state), Some(vec![0x03, 0x10, 0xAB, 0xCD]));
    }

    #[test]
    fn rsub_has_no_operands() {
        let mut state = AssemblerState::new();
        let l = line(None, "RSUB", false, vec![]);
        assert_eq!(encode_line(&l, &mut state), Some(vec![0x4C, 0x00, 0x00]));
    }

    #[test]
    fn clear_a() {
        let mut state = AssemblerState::new();
        let l = line(None, "CLEAR", false, vec![Operand::symbol("A", AddressingMode::Simple)]);
        assert_eq!(encode_line(&l, &mut state), Some(vec![0xB4, 0x00]));
    }

    #[test]
    fn compr_a_x() {
        let mut state = AssemblerState::new();
        let l = line(
            None,
            "COMPR",
            false,
            vec![
                Operand::symbol("A", AddressingMode::Simple),
                Operand::symbol("X", AddressingMode::Simple),
            ],
        );
        assert_eq!(encode_line(&l, &mut state), Some(vec![0xA0, 0x01]));
    }

    #[test]
    fn byte_directive_emits_minimal_representation() {
        let mut state = AssemblerState::new();
        let l = line(
            None,
            "BYTE",
            false,
            vec![Operand::literal(0x414243, AddressingMode::Immediate)],
        );
        assert_eq!(encode_line(&l, &mut state), Some(vec![0x41, 0x42, 0x43]));
    }

    #[test]
    fn word_directive_is_always_three_bytes() {
        let mut state = AssemblerState::new();
        let l = line(None, "WORD", false, vec![Operand::literal(10, AddressingMode::Simple)]);
        assert_eq!(encode_line(&l, &mut state), Some(vec![0x00, 0x00, 0x0A]));
    }

    #[test]
    fn resw_zero_fills_and_advances_by_three_per_word() {
        let mut state = AssemblerState::new();
        state.set_address(0x100);
        let l = line(None, "RESW", false, vec![Operand::literal(2, AddressingMode::Simple)]);
        assert_eq!(encode_line(&l, &mut state), Some(vec![0u8; 6]));
        assert_eq!(state.get_address(), 0x106);
    }

    #[test]
    fn unresolvable_mnemonic_fails() {
        let mut state = AssemblerState::new();
        let l = line(None, "NOPE", false, vec![]);
        assert_eq!(encode_line(&l, &mut state), None);
    }

    #[test]
    fn out_of_range_format_three_upgrades_to_format_four() {
        let mut state = AssemblerState::new();
        state.define_symbol("FAR", 0x020000);
        let l = line(None, "LDA", false, vec![Operand::symbol("FAR", AddressingMode::Simple)]);
        let bytes = encode_line(&l, &mut state).unwrap();
        assert_eq!(bytes.len(), 4);
        assert_eq!(state.get_address(), 4);
    }
}
