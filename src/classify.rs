/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! Classifying a column into a syntactic kind, and the total validators
//! that back that classification: register names, label names, numeric
//! literals and operand addressing modes.

use crate::model::AddressingMode;
use crate::tables;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Column {
    LabelDef(String),
    DirectiveEntry,
    DirectiveExtern,
    DirectiveData,
    DirectiveString,
    Operation,
    Unknown,
}

/// Classifies a single whitespace-delimited token.
pub fn column_type(token: &str) -> Column {
    if token.len() <= 1 {
        return Column::Unknown;
    }

    if let Some(rest) = token.strip_prefix('.') {
        return match rest {
            "data" => Column::DirectiveData,
            "string" => Column::DirectiveString,
            "entry" => Column::DirectiveEntry,
            "extern" => Column::DirectiveExtern,
            _ => Column::Unknown,
        };
    }

    if let Some(name) = token.strip_suffix(':') {
        return if is_valid_label_name(token, 0, 1) {
            Column::LabelDef(name.to_string())
        } else {
            Column::Unknown
        };
    }

    if tables::lookup_operation(token).is_some() {
        Column::Operation
    } else {
        Column::Unknown
    }
}

/// `r0`..`r7`, optionally preceded by `start` characters (so `@r3` passes
/// with `start == 1`). The register must run to the end of the string.
pub fn is_valid_register_name(s: &str, start: usize) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() < start + 2 {
        return false;
    }
    if bytes[start] != b'r' {
        return false;
    }
    if !(b'0'..=b'7').contains(&bytes[start + 1]) {
        return false;
    }
    bytes.len() == start + 2
}

/// `[A-Za-z][A-Za-z0-9]*` over `s[start .. len - end_offset]`, excluding
/// anything that is also a valid register name.
pub fn is_valid_label_name(s: &str, start: usize, end_offset: usize) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() <= end_offset {
        return false;
    }
    let end = bytes.len() - end_offset;
    if end <= start {
        return false;
    }

    if is_valid_register_name(&s[start..end], 0) {
        return false;
    }

    for (i, &b) in bytes[start..end].iter().enumerate() {
        let ok = if i == 0 {
            b.is_ascii_alphabetic()
        } else {
            b.is_ascii_alphanumeric()
        };
        if !ok {
            return false;
        }
    }
    true
}

/// Optional leading `+`/`-`, then one or more decimal digits, starting at
/// `start` (so `#-12` passes with `start == 1`).
pub fn is_valid_numeric_literal(s: &str, start: usize) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() <= start {
        return false;
    }

    let mut saw_digit = false;
    for (i, &b) in bytes[start..].iter().enumerate() {
        let ok = if i == 0 {
            b.is_ascii_digit() || b == b'-' || b == b'+'
        } else {
            b.is_ascii_digit()
        };
        if !ok {
            return false;
        }
        if b.is_ascii_digit() {
            saw_digit = true;
        }
    }
    saw_digit
}

pub fn get_register(s: &str, start: usize) -> u8 {
    s.as_bytes()[start + 1] - b'0'
}

/// Parses a signed decimal literal into its 16-bit two's-complement
/// representation. Overflow wraps silently; no diagnostic is raised.
pub fn parse_numeric_literal(s: &str, start: usize) -> u16 {
    let bytes = s.as_bytes();
    let mut i = start;
    let mut negative = false;
    if bytes[i] == b'-' {
        negative = true;
        i += 1;
    } else if bytes[i] == b'+' {
        i += 1;
    }

    let mut value: u16 = 0;
    for &b in &bytes[i..] {
        value = value.wrapping_mul(10).wrapping_add((b - b'0') as u16);
    }

    if negative {
        value = (!value).wrapping_add(1);
    }
    value
}

/// Derives the addressing mode of an operand token, or `None` if it is
/// malformed in every recognised way.
pub fn operand_to_addressing(operand: &str) -> Option<AddressingMode> {
    if operand.starts_with('#') {
        return if is_valid_numeric_literal(operand, 1) {
            Some(AddressingMode::Instant(
                parse_numeric_literal(operand, 1) as i16 as i32,
            ))
        } else {
            None
        };
    }

    if operand.starts_with('@') {
        if is_valid_register_name(operand, 1) {
            return Some(AddressingMode::IndirectRegister(get_register(operand, 1)));
        }
        if is_valid_label_name(operand, 1, 0) {
            return Some(AddressingMode::Indirect(operand[1..].to_string()));
        }
        return None;
    }

    if is_valid_register_name(operand, 0) {
        return Some(AddressingMode::DirectRegister(get_register(operand, 0)));
    }
    if is_valid_label_name(operand, 0, 0) {
        return Some(AddressingMode::Direct(operand.to_string()));
    }
    None
}
