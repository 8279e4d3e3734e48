// Copyright (c) 2023 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions,
// more details in file LICENSE, LICENSE.additional and CONTRIBUTING.

pub mod catalogue;

use std::collections::HashMap;

/// A 20-bit unsigned magnitude held in a 32-bit slot.
///
/// All address arithmetic is modular in 32 bits; displacements are
/// computed as signed 32-bit subtractions and then narrowed.
pub type Address = u32;

/// A mapping from label to the address it was bound to during pass one.
///
/// Last-write-wins: re-defining a label silently overwrites the previous
/// binding (see the assembler crate's design notes).
#[derive(Debug, Default, Clone)]
pub struct SymbolTable {
    symbols: HashMap<String, Address>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            symbols: HashMap::new(),
        }
    }

    pub fn lookup(&self, name: &str) -> Option<Address> {
        self.symbols.get(name).copied()
    }

    pub fn define(&mut self, name: &str, address: Address) {
        self.symbols.insert(name.to_string(), address);
    }
}

/// How an operand's value participates in addressing.
#[repr(u8)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum AddressingMode {
    /// `n=1, i=1` -- the "SIC-compatible" form with no explicit `#`/`@`.
    Simple = 0x0,
    /// `n=0, i=1` -- `#value`, the operand's value is used directly.
    Immediate,
    /// `n=1, i=0` -- `@value`, the operand's value names an address of an address.
    Indirect,
}

/// The value carried by an operand: either a literal or a symbolic reference.
#[derive(Debug, PartialEq, Clone)]
pub enum OperandValue {
    Literal(i64),
    Symbol(String),
}

/// A single operand of an instruction or directive line.
#[derive(Debug, PartialEq, Clone)]
pub struct Operand {
    pub value: OperandValue,
    pub mode: AddressingMode,
}

impl Operand {
    pub fn literal(value: i64, mode: AddressingMode) -> Self {
        Self {
            value: OperandValue::Literal(value),
            mode,
        }
    }

    pub fn symbol(name: impl Into<String>, mode: AddressingMode) -> Self {
        Self {
            value: OperandValue::Symbol(name.into()),
            mode,
        }
    }
}

/// The mnemonic token of a line: its name plus whether it carried the `+`
/// extended-format prefix.
#[derive(Debug, PartialEq, Clone)]
pub struct Mnemonic {
    pub name: String,
    pub extended: bool,
}

impl Mnemonic {
    pub fn new(name: impl Into<String>, extended: bool) -> Self {
        Self {
            name: name.into(),
            extended,
        }
    }
}

/// One parsed source line: an optional label, a mnemonic (instruction or
/// directive), and its operands.
///
/// This is the external `Line` type the core assembler consumes; in this
/// repository it is produced by `sicxe_assembler::source`, but the core
/// itself has no dependency on how a `Line` came to exist.
#[derive(Debug, PartialEq, Clone)]
pub struct Line {
    pub label: Option<String>,
    pub mnemonic: Mnemonic,
    pub operands: Vec<Operand>,
}

impl Line {
    pub fn new(label: Option<&str>, mnemonic: Mnemonic, operands: Vec<Operand>) -> Self {
        Self {
            label: label.map(str::to_string),
            mnemonic,
            operands,
        }
    }
}

/// The four SIC/XE instruction formats, tried in this order by the format
/// selector when a mnemonic permits more than one.
#[repr(u8)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Format {
    One = 1,
    Two = 2,
    Three = 3,
    Four = 4,
}

impl Format {
    /// The size in bytes this format occupies absent the format-3-to-4
    /// displacement-overflow upgrade (see the encoder's design notes).
    pub fn size(self) -> usize {
        self as u8 as usize
    }
}

/// Reference data: a mnemonic's opcode and the formats it is allowed to
/// take, tried in the order listed.
#[derive(Debug, Clone)]
pub struct OpDesc {
    pub mnemonic: &'static str,
    pub opcode: u8,
    pub formats: &'static [Format],
}
