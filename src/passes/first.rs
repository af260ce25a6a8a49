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

//! First pass: builds the symbol table and lays down the object code,
//! leaving a placeholder cell everywhere a symbol reference still needs
//! resolving.

use crate::classify::{self, Column};
use crate::context::AssemblerContext;
use crate::encoder::encode;
use crate::errors::PassReport;
use crate::lexer::{clean_line, column, subcolumn};
use crate::model::{Instruction, LinkEntry, LinkKind, ObjectCell, RelocType, Symbol, SymbolKind};
use crate::tables::lookup_operation;

const MAX_LINE_LEN: usize = 80;

pub fn first_pass(source: &str, ctx: &mut AssemblerContext, report: &mut PassReport) {
    for (idx, raw) in source.lines().enumerate() {
        let line_no = idx + 1;
        if raw.len() > MAX_LINE_LEN {
            report.warning(line_no, "line is longer than 80 characters");
        }

        let clean = clean_line(raw);
        if clean.is_empty() || clean.starts_with(';') {
            continue;
        }

        process_line(&clean, 0, ctx, report, line_no);
    }
}

fn process_line(line: &str, column_index: usize, ctx: &mut AssemblerContext, report: &mut PassReport, line_no: usize) {
    let Some(col_str) = column(line, column_index) else {
        report.error(line_no, "expected a column");
        return;
    };

    match classify::column_type(col_str) {
        Column::LabelDef(_) => process_label(line, ctx, report, line_no),
        Column::DirectiveEntry => process_link(line, column_index + 1, LinkKind::Entry, ctx, report, line_no),
        Column::DirectiveExtern => process_link(line, column_index + 1, LinkKind::Extern, ctx, report, line_no),
        Column::DirectiveData => process_numbers(line, column_index + 1, ctx, report, line_no),
        Column::DirectiveString => process_string(line, column_index + 1, ctx, report, line_no),
        Column::Operation => process_operation(line, column_index, ctx, report, line_no),
        Column::Unknown => report.error(line_no, format!("unknown column type: {col_str}")),
    }
}

fn process_label(line: &str, ctx: &mut AssemblerContext, report: &mut PassReport, line_no: usize) {
    let label_col = column(line, 0).expect("label column already matched");
    let name = label_col.trim_end_matches(':').to_string();
    let Some(col2) = column(line, 1) else {
        report.error(line_no, format!("nothing follows label: {name}"));
        return;
    };

    match classify::column_type(col2) {
        Column::Operation => {
            if ctx.symbols.contains(&name) {
                report.error(line_no, format!("symbol is already defined: {name}"));
            } else {
                ctx.add_symbol(
                    name,
                    Symbol {
                        value: ctx.ic,
                        kind: SymbolKind::Absolute,
                    },
                    line_no,
                    report,
                );
            }
            process_line(line, 1, ctx, report, line_no);
        }
        Column::DirectiveEntry | Column::DirectiveExtern => {
            report.warning(line_no, format!("label in front of a compiler directive: {line}"));
        }
        Column::DirectiveData | Column::DirectiveString => {
            if ctx.symbols.contains(&name) {
                report.error(line_no, format!("symbol is already defined: {name}"));
            } else {
                ctx.add_symbol(
                    name,
                    Symbol {
                        value: ctx.dc,
                        kind: SymbolKind::Relocatable,
                    },
                    line_no,
                    report,
                );
            }
            process_line(line, 1, ctx, report, line_no);
        }
        _ => report.error(line_no, format!("unknown label type: {col2}")),
    }
}

fn process_link(
    line: &str,
    column_index: usize,
    kind: LinkKind,
    ctx: &mut AssemblerContext,
    report: &mut PassReport,
    line_no: usize,
) {
    let Some(label) = column(line, column_index) else {
        report.error(line_no, format!("expected label: {line}"));
        return;
    };

    if !classify::is_valid_label_name(label, 0, 0) {
        report.error(line_no, format!("invalid label: {label}"));
        return;
    }

    ctx.add_link_entry(
        LinkEntry {
            name: label.to_string(),
            value: 0xFFFF,
            kind,
            line: line_no,
        },
        report,
    );
}

fn process_numbers(line: &str, column_index: usize, ctx: &mut AssemblerContext, report: &mut PassReport, line_no: usize) {
    let Some(list) = column(line, column_index) else {
        report.error(line_no, format!("expected numbers, got: {line}"));
        return;
    };

    let mut i = 0;
    while let Some(number) = subcolumn(list, ',', i) {
        if !classify::is_valid_numeric_literal(number, 0) {
            report.error(line_no, format!("not a valid numeric literal: '{number}'"));
            return;
        }
        let value = classify::parse_numeric_literal(number, 0);
        ctx.add_data_word(value, line_no, report);
        i += 1;
    }
}

fn process_string(line: &str, column_index: usize, ctx: &mut AssemblerContext, report: &mut PassReport, line_no: usize) {
    let Some(string) = column(line, column_index) else {
        report.error(line_no, format!("expected a string literal: {line}"));
        return;
    };

    let bytes = string.as_bytes();
    if bytes.is_empty() || bytes[0] != b'"' {
        report.error(line_no, format!("not a valid string literal: '{string}'"));
        return;
    }

    let mut i = 1;
    while i < bytes.len() && bytes[i] != b'"' {
        ctx.add_data_word(bytes[i] as u16, line_no, report);
        i += 1;
    }
    ctx.add_data_word(0, line_no, report);

    if i != bytes.len().saturating_sub(1) {
        report.warning(line_no, format!("unclosed string literal: '{string}'"));
    }
}

fn process_operation(line: &str, column_index: usize, ctx: &mut AssemblerContext, report: &mut PassReport, line_no: usize) {
    let Some(mnemonic) = column(line, column_index) else {
        report.error(line_no, format!("invalid operation: {line}"));
        return;
    };
    let Some(op) = lookup_operation(mnemonic) else {
        report.error(line_no, format!("invalid operation: {line}"));
        return;
    };

    let operands_col = column(line, column_index + 1);
    let operand1 = operands_col.and_then(|o| subcolumn(o, ',', 0));
    let operand2 = operands_col.and_then(|o| subcolumn(o, ',', 1));
    let operand_count = operand1.is_some() as u8 + operand2.is_some() as u8;

    if operand_count != op.arity {
        report.error(
            line_no,
            format!(
                "wrong number of operands at '{}', expected {}, got {}",
                mnemonic, op.arity, operand_count
            ),
        );
        return;
    }

    match op.arity {
        0 => {
            let instr = Instruction {
                opcode: op.opcode,
                ..Default::default()
            };
            ctx.add_object_cell(
                ObjectCell {
                    value: encode(&instr),
                    reloc: RelocType::Absolute,
                },
                line_no,
                report,
            );
        }
        1 => {
            let operand = operand1.unwrap();
            let Some(mode) = classify::operand_to_addressing(operand) else {
                report.error(line_no, format!("wrong destination addressing mode '{operand}'"));
                return;
            };
            if !op.dest_legal.contains(&mode.mode_index()) {
                report.error(line_no, format!("wrong destination addressing mode '{operand}'"));
                return;
            }

            let instr = Instruction {
                opcode: op.opcode,
                dest_mode: mode.mode_index(),
                dest_reg: mode.register_field(),
                ..Default::default()
            };
            ctx.add_object_cell(
                ObjectCell {
                    value: encode(&instr),
                    reloc: RelocType::Absolute,
                },
                line_no,
                report,
            );
            if mode.needs_extra_word() {
                ctx.add_placeholder(line_no, report);
            }
        }
        2 => {
            let src_operand = operand1.unwrap();
            let dest_operand = operand2.unwrap();

            let Some(src_mode) = classify::operand_to_addressing(src_operand) else {
                report.error(line_no, format!("wrong source addressing mode '{src_operand}'"));
                return;
            };
            if !op.src_legal.contains(&src_mode.mode_index()) {
                report.error(line_no, format!("wrong source addressing mode '{src_operand}'"));
                return;
            }

            let Some(dest_mode) = classify::operand_to_addressing(dest_operand) else {
                report.error(line_no, format!("wrong destination addressing mode '{dest_operand}'"));
                return;
            };
            if !op.dest_legal.contains(&dest_mode.mode_index()) {
                report.error(line_no, format!("wrong destination addressing mode '{dest_operand}'"));
                return;
            }

            let instr = Instruction {
                opcode: op.opcode,
                src_mode: src_mode.mode_index(),
                src_reg: src_mode.register_field(),
                dest_mode: dest_mode.mode_index(),
                dest_reg: dest_mode.register_field(),
            };
            ctx.add_object_cell(
                ObjectCell {
                    value: encode(&instr),
                    reloc: RelocType::Absolute,
                },
                line_no,
                report,
            );
            if src_mode.needs_extra_word() {
                ctx.add_placeholder(line_no, report);
            }
            if dest_mode.needs_extra_word() {
                ctx.add_placeholder(line_no, report);
            }
        }
        _ => unreachable!("operation arity is always 0, 1 or 2"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(source: &str) -> (AssemblerContext, PassReport) {
        let mut ctx = AssemblerContext::new();
        let mut report = PassReport::default();
        first_pass(source, &mut ctx, &mut report);
        (ctx, report)
    }

    #[test]
    fn hlt_emits_single_absolute_word() {
        let (ctx, report) = run("hlt\n");
        assert_eq!(report.error_count(), 0);
        assert_eq!(ctx.object_code.len(), 1);
        assert_eq!(ctx.object_code[0].value, 0xF000);
    }

    #[test]
    fn immediate_operand_emits_placeholder() {
        let (ctx, report) = run("mov #-1, r2\n");
        assert_eq!(report.error_count(), 0);
        assert_eq!(ctx.object_code.len(), 2);
        assert_eq!(ctx.object_code[1].value, 0xFFFF);
    }

    #[test]
    fn label_before_data_is_relocatable() {
        let (ctx, report) = run("A: .data 42\n");
        assert_eq!(report.error_count(), 0);
        let sym = ctx.symbols.get("A").unwrap();
        assert_eq!(sym.kind, SymbolKind::Relocatable);
        assert_eq!(sym.value, 0);
    }

    #[test]
    fn duplicate_symbol_is_an_error() {
        let (_, report) = run("A: .data 1\nA: .data 2\n");
        assert_eq!(report.error_count(), 1);
    }

    #[test]
    fn wrong_addressing_mode_is_rejected() {
        let (_, report) = run("lea #1, r2\n");
        assert_eq!(report.error_count(), 1);
    }
}
