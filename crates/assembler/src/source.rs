// Copyright (c) 2023 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions,
// more details in file LICENSE, LICENSE.additional and CONTRIBUTING.

//! A small line-oriented parser that turns raw `.sic` source text into the
//! `Line` sequence the core assembler consumes.
//!
//! This is scaffolding, not a general SIC/XE grammar: no literal pools, no
//! expressions, no continuation lines. Those are out of scope for the core
//! this parser feeds (see the crate's design notes).

use sicxe_types::{AddressingMode, Line, Mnemonic, Operand};

/// Parses `text` into a `Line` sequence, discarding source line numbers.
pub fn parse_program(text: &str) -> Vec<Line> {
    parse_program_with_lines(text)
        .into_iter()
        .map(|(_, line)| line)
        .collect()
}

/// Parses `text` into `(source_line_number, Line)` pairs, 1-based, so a
/// caller (such as the CLI) can map a failure reported against the `Line`
/// sequence back to the text the user actually wrote.
pub fn parse_program_with_lines(text: &str) -> Vec<(usize, Line)> {
    text.lines()
        .enumerate()
        .filter_map(|(zero_based, raw)| {
            let stripped = strip_comment(raw);
            if stripped.trim().is_empty() {
                return None;
            }
            Some((zero_based + 1, parse_line(raw, stripped)))
        })
        .collect()
}

fn strip_comment(raw: &str) -> &str {
    match raw.find(';') {
        Some(index) => &raw[..index],
        None => raw,
    }
}

/// A line with a label in the classic SIC/XE source convention starts in
/// column 1; an indented line has none. `raw` (before comment stripping)
/// carries that leading whitespace; `stripped` carries the tokens.
fn parse_line(raw: &str, stripped: &str) -> Line {
    let has_label = !raw.starts_with(char::is_whitespace);
    let mut tokens = stripped.split_whitespace();

    let label = if has_label { tokens.next() } else { None };
    let mnemonic_token = tokens.next().unwrap_or("");

    let (name, extended) = match mnemonic_token.strip_prefix('+') {
        Some(rest) => (rest, true),
        None => (mnemonic_token, false),
    };

    let operand_text: String = tokens.collect::<Vec<_>>().join(" ");
    let operands = operand_text
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(parse_operand)
        .collect();

    Line::new(label, Mnemonic::new(name, extended), operands)
}

fn parse_operand(token: &str) -> Operand {
    let (mode, rest) = if let Some(rest) = token.strip_prefix('#') {
        (AddressingMode::Immediate, rest)
    } else if let Some(rest) = token.strip_prefix('@') {
        (AddressingMode::Indirect, rest)
    } else {
        (AddressingMode::Simple, token)
    };

    match parse_integer(rest) {
        Some(value) => Operand::literal(value, mode),
        None => Operand::symbol(rest, mode),
    }
}

fn parse_integer(text: &str) -> Option<i64> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()
    } else {
        text.parse::<i64>().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn labelled_line_binds_the_first_column_token() {
        let lines = parse_program("FIVE WORD 5");
        assert_eq!(lines[0].label.as_deref(), Some("FIVE"));
        assert_eq!(lines[0].mnemonic.name, "WORD");
    }

    #[test]
    fn indented_line_has_no_label() {
        let lines = parse_program("    LDA FIVE");
        assert_eq!(lines[0].label, None);
        assert_eq!(lines[0].mnemonic.name, "LDA");
    }

    #[test]
    fn extended_prefix_sets_the_flag_and_is_stripped_from_the_name() {
        let lines = parse_program("    +LDA FIVE");
        assert!(lines[0].mnemonic.extended);
        assert_eq!(lines[0].mnemonic.name, "LDA");
    }

    #[test]
    fn comma_separated_operands_split_into_two_operands() {
        let lines = parse_program("    COMPR A,X");
        assert_eq!(lines[0].operands.len(), 2);
    }

    #[test]
    fn immediate_and_indirect_prefixes_set_addressing_mode() {
        let lines = parse_program("    LDA #5\n    LDA @FIVE");
        assert_eq!(lines[0].operands[0].mode, AddressingMode::Immediate);
        assert_eq!(lines[1].operands[0].mode, AddressingMode::Indirect);
    }

    #[test]
    fn hex_literal_operand_is_parsed_as_a_literal() {
        let lines = parse_program("    BYTE 0x414243");
        assert_eq!(
            lines[0].operands[0].value,
            sicxe_types::OperandValue::Literal(0x414243)
        );
    }

    #[test]
    fn comment_only_and_blank_lines_are_skipped() {
        let numbered = parse_program_with_lines("; a comment\n\n    RSUB");
        assert_eq!(numbered.len(), 1);
        assert_eq!(numbered[0].0, 3);
    }
}
