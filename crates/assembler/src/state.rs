// Copyright (c) 2023 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions,
// more details in file LICENSE, LICENSE.additional and CONTRIBUTING.

use sicxe_types::{Address, SymbolTable};

/// The mutable state threaded through both passes of the assembler: the
/// location counter and the symbol table it is building (pass one) or
/// reading (pass two).
///
/// A fresh `AssemblerState` is created per `assemble` call and lives only
/// for the duration of that call; there is no shared or global state.
#[derive(Debug, Default)]
pub struct AssemblerState {
    current_address: Address,
    symbol_table: SymbolTable,
}

impl AssemblerState {
    pub fn new() -> Self {
        Self {
            current_address: 0,
            symbol_table: SymbolTable::new(),
        }
    }

    pub fn with_symbol_table(symbol_table: SymbolTable) -> Self {
        Self {
            current_address: 0,
            symbol_table,
        }
    }

    pub fn get_address(&self) -> Address {
        self.current_address
    }

    pub fn set_address(&mut self, address: Address) {
        self.current_address = address;
    }

    /// Marks the transition between passes. Equivalent to `set_address(0)`
    /// today; kept as its own method because a future `START` origin would
    /// change what "reset" means without disturbing callers.
    pub fn reset_address(&mut self) {
        self.set_address(0);
    }

    pub fn advance(&mut self, by: usize) {
        self.current_address = self.current_address.wrapping_add(by as u32);
    }

    pub fn lookup_symbol(&self, name: &str) -> Option<Address> {
        self.symbol_table.lookup(name)
    }

    pub fn define_symbol(&mut self, name: &str, address: Address) {
        self.symbol_table.define(name, address);
    }

    pub fn symbol_table(&self) -> &SymbolTable {
        &self.symbol_table
    }

    pub fn into_symbol_table(self) -> SymbolTable {
        self.symbol_table
    }
}
