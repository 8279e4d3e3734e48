// Copyright (c) 2023 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions,
// more details in file LICENSE, LICENSE.additional and CONTRIBUTING.

//! A thin driver around `sicxe_assembler`: read a source file (or stdin),
//! assemble it, and print either a listing or the line that broke.

use std::env;
use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;

use sicxe_assembler::{diagnostic, objfile, source};

fn main() -> ExitCode {
    let text = match read_input() {
        Ok(text) => text,
        Err(err) => {
            eprintln!("error: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let numbered = source::parse_program_with_lines(&text);
    let lines: Vec<_> = numbered.iter().map(|(_, line)| line.clone()).collect();

    match diagnostic::assemble_checked(&lines) {
        Ok(bytes) => {
            print!("{}", objfile::render_listing(&lines, &bytes));
            ExitCode::SUCCESS
        }
        Err(err) => {
            let source_line = numbered.get(err.line).map(|(n, _)| *n).unwrap_or(err.line);
            eprintln!("error: line {}: {}", source_line, err.message);
            ExitCode::FAILURE
        }
    }
}

fn read_input() -> io::Result<String> {
    match env::args().nth(1) {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}
