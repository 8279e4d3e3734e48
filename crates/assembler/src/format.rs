// Copyright (c) 2023 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions,
// more details in file LICENSE, LICENSE.additional and CONTRIBUTING.

use sicxe_types::{Address, AddressingMode, Format, Line, OpDesc, Operand, OperandValue};

use crate::state::AssemblerState;

/// Resolves an operand to the address it contributes to displacement
/// arithmetic: a literal's own value, a symbol's bound address, or (for a
/// symbol with no binding yet) the current address.
///
/// The last case is what keeps pass-one size prediction stable: every
/// symbolic format-3 operand looks reachable during pass one, because the
/// only symbols a well-formed program resolves are ones `first_pass` will
/// have bound by the time pass two runs.
pub fn resolve_operand_address(operand: &Operand, state: &AssemblerState) -> Address {
    match &operand.value {
        OperandValue::Literal(value) => *value as Address,
        OperandValue::Symbol(name) => state
            .lookup_symbol(name)
            .unwrap_or_else(|| state.get_address()),
    }
}

/// An operand is absolute-required iff it is a literal value in
/// `Immediate` mode; its "address" for displacement purposes is the
/// literal itself, so `b`/`p` never apply to it.
pub fn is_absolute_required(operand: &Operand) -> bool {
    matches!(operand.value, OperandValue::Literal(_)) && operand.mode == AddressingMode::Immediate
}

fn register_or_literal_code(operand: &Operand) -> Option<u8> {
    match &operand.value {
        OperandValue::Symbol(name) => sicxe_types::catalogue::lookup_register(name),
        OperandValue::Literal(value) => Some(*value as u8),
    }
}

/// Chooses the format a line will be encoded in: walks the mnemonic's
/// permitted formats in order and returns the first one whose operand
/// shape validates.
///
/// This must not depend on resolved symbol addresses (see
/// `resolve_operand_address`), since it runs identically during pass one
/// (before the symbol table is complete) and pass two.
pub fn select_format(op: &OpDesc, line: &Line, state: &AssemblerState) -> Option<Format> {
    for &format in op.formats {
        match format {
            Format::One => {
                if line.operands.is_empty() {
                    return Some(Format::One);
                }
            }
            Format::Two => {
                if (1..=2).contains(&line.operands.len())
                    && line.operands.iter().all(|o| register_or_literal_code(o).is_some())
                {
                    return Some(Format::Two);
                }
            }
            Format::Three => {
                if line.mnemonic.extended {
                    continue;
                }
                let Some(value_operand) = line.operands.first() else {
                    // Zero operands: `n=i=1, disp=0` always fits.
                    return Some(Format::Three);
                };
                if is_absolute_required(value_operand) {
                    return Some(Format::Three);
                }
                let operand_address = resolve_operand_address(value_operand, state);
                // NOTE: this is the literal source condition, not the
                // corrected `-2048 <= disp < 4096` a stricter implementation
                // would use -- see the design notes on the near-tautology.
                let disp = state.get_address() as i64 - operand_address as i64;
                if disp >= -2048 || disp < 4096 {
                    return Some(Format::Three);
                }
            }
            Format::Four => {
                return Some(Format::Four);
            }
        }
    }
    None
}
