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

//! Second pass: relocates symbols, resolves the link table, and walks back
//! over the instruction region to overwrite every placeholder cell left by
//! the first pass with its final value.

use crate::classify::{self, Column};
use crate::context::AssemblerContext;
use crate::errors::PassReport;
use crate::lexer::{clean_line, column, subcolumn};
use crate::model::{AddressingMode, ExternRef, LinkKind, ObjectCell, RelocType, SymbolKind};
use crate::tables::lookup_operation;

pub fn second_pass(source: &str, ctx: &mut AssemblerContext, report: &mut PassReport) {
    let ic_final = ctx.object_code.len() as u16;
    update_tables(ctx, ic_final, report);

    let mut cursor: usize = 0;
    for (idx, raw) in source.lines().enumerate() {
        let line_no = idx + 1;
        let clean = clean_line(raw);
        if clean.is_empty() || clean.starts_with(';') {
            continue;
        }
        process_line(&clean, 0, ctx, report, line_no, &mut cursor);
    }
}

/// Relocates data-backed symbols, resolves link-table entries against the
/// final symbol table, and appends the data image to the object code.
fn update_tables(ctx: &mut AssemblerContext, ic_final: u16, report: &mut PassReport) {
    let AssemblerContext {
        symbols,
        link_table,
        data_image,
        object_code,
        ..
    } = ctx;

    for (_, sym) in symbols.iter_mut() {
        if sym.kind == SymbolKind::Relocatable {
            sym.value = sym.value.wrapping_add(ic_final);
        }
    }

    for link in link_table.iter_mut() {
        match symbols.get_mut(&link.name) {
            Some(sym) => match link.kind {
                LinkKind::Extern => {
                    sym.kind = SymbolKind::External;
                    link.value = sym.value;
                }
                LinkKind::Entry => {
                    link.value = sym.value;
                }
            },
            None => {
                if link.kind == LinkKind::Entry {
                    report.error(link.line, format!("entry label not defined: {}", link.name));
                }
            }
        }
    }

    object_code.extend(data_image.iter().map(|&value| ObjectCell {
        value,
        reloc: RelocType::Data,
    }));
}

fn process_line(
    line: &str,
    column_index: usize,
    ctx: &mut AssemblerContext,
    report: &mut PassReport,
    line_no: usize,
    cursor: &mut usize,
) {
    let Some(col_str) = column(line, column_index) else {
        report.error(line_no, "expected a column");
        return;
    };

    match classify::column_type(col_str) {
        Column::LabelDef(_) => process_label(line, ctx, report, line_no, cursor),
        Column::DirectiveEntry | Column::DirectiveExtern | Column::DirectiveData | Column::DirectiveString => {}
        Column::Operation => process_operation(line, column_index, ctx, report, line_no, cursor),
        Column::Unknown => report.error(line_no, format!("unknown column type: {col_str}")),
    }
}

fn process_label(line: &str, ctx: &mut AssemblerContext, report: &mut PassReport, line_no: usize, cursor: &mut usize) {
    let Some(col2) = column(line, 1) else {
        return;
    };

    match classify::column_type(col2) {
        Column::Operation => process_line(line, 1, ctx, report, line_no, cursor),
        Column::DirectiveEntry | Column::DirectiveExtern | Column::DirectiveData | Column::DirectiveString => {}
        _ => report.error(line_no, format!("unknown column type: {col2}")),
    }
}

fn process_operation(
    line: &str,
    column_index: usize,
    ctx: &mut AssemblerContext,
    report: &mut PassReport,
    line_no: usize,
    cursor: &mut usize,
) {
    let Some(mnemonic) = column(line, column_index) else {
        return;
    };
    let Some(op) = lookup_operation(mnemonic) else {
        return;
    };

    let operands_col = column(line, column_index + 1);
    let operand1 = operands_col.and_then(|o| subcolumn(o, ',', 0));
    let operand2 = operands_col.and_then(|o| subcolumn(o, ',', 1));

    *cursor += 1; // step past the instruction word itself

    match op.arity {
        0 => {}
        1 => {
            if let Some(operand) = operand1 {
                resolve_and_patch(operand, line_no, ctx, report, cursor);
            }
        }
        2 => {
            if let Some(operand) = operand1 {
                resolve_and_patch(operand, line_no, ctx, report, cursor);
            }
            if let Some(operand) = operand2 {
                resolve_and_patch(operand, line_no, ctx, report, cursor);
            }
        }
        _ => unreachable!("operation arity is always 0, 1 or 2"),
    }
}

struct Resolved {
    value: u16,
    reloc: RelocType,
    external_name: Option<String>,
}

/// Looks up the value and relocation class a resolved operand word should
/// carry. `Direct`/`Indirect` addressing resolves against the symbol table
/// first, then falls back to an `.extern`-declared link entry; the
/// resulting cell type depends only on the addressing mode and whether the
/// name was external, never on the referenced symbol's own storage class.
fn resolve_operand(mode: &AddressingMode, line_no: usize, ctx: &AssemblerContext, report: &mut PassReport) -> Option<Resolved> {
    match mode {
        AddressingMode::Instant(value) => Some(Resolved {
            value: *value as u16,
            reloc: RelocType::Absolute,
            external_name: None,
        }),
        AddressingMode::Direct(name) | AddressingMode::Indirect(name) => {
            if let Some(sym) = ctx.symbols.get(name) {
                Some(Resolved {
                    value: sym.value,
                    reloc: RelocType::Relocatable,
                    external_name: None,
                })
            } else if ctx
                .link_table
                .iter()
                .any(|link| link.name == *name && link.kind == LinkKind::Extern)
            {
                Some(Resolved {
                    value: 0xFFFF,
                    reloc: RelocType::External,
                    external_name: Some(name.clone()),
                })
            } else {
                report.error(line_no, format!("symbol not defined and not external: {name}"));
                None
            }
        }
        AddressingMode::DirectRegister(_) | AddressingMode::IndirectRegister(_) => None,
    }
}

fn resolve_and_patch(operand: &str, line_no: usize, ctx: &mut AssemblerContext, report: &mut PassReport, cursor: &mut usize) {
    let Some(mode) = classify::operand_to_addressing(operand) else {
        return;
    };
    if !mode.needs_extra_word() {
        return;
    }

    if let Some(resolved) = resolve_operand(&mode, line_no, ctx, report) {
        if let Some(cell) = ctx.object_code.get_mut(*cursor) {
            *cell = ObjectCell {
                value: resolved.value,
                reloc: resolved.reloc,
            };
        }
        if let Some(name) = resolved.external_name {
            ctx.externs.push(ExternRef {
                name,
                site: *cursor as u16,
            });
        }
    }
    *cursor += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::PassReport as Report;
    use crate::passes::first::first_pass;

    fn run(source: &str) -> (AssemblerContext, Report) {
        let mut ctx = AssemblerContext::new();
        let mut report = Report::default();
        first_pass(source, &mut ctx, &mut report);
        assert_eq!(report.error_count(), 0, "first pass failed: {:?}", report.diagnostics);
        let mut second = Report::default();
        second_pass(source, &mut ctx, &mut second);
        (ctx, second)
    }

    #[test]
    fn direct_operand_resolves_to_relocatable_data_symbol() {
        let (ctx, report) = run("mov A, r3\nA: .data 42\n");
        assert_eq!(report.error_count(), 0);
        // instruction word at 0, operand word at 1, data appended after ic_final
        assert_eq!(ctx.object_code[1].reloc as u8, RelocType::Relocatable as u8);
        assert_eq!(ctx.object_code[1].value, ctx.symbols.get("A").unwrap().value);
    }

    #[test]
    fn extern_jump_resolves_with_external_type_and_records_extern() {
        let (ctx, report) = run(".extern K\njsr K\n");
        assert_eq!(report.error_count(), 0);
        assert_eq!(ctx.object_code[1].reloc as u8, RelocType::External as u8);
        assert_eq!(ctx.externs.len(), 1);
        assert_eq!(ctx.externs[0].name, "K");
    }

    #[test]
    fn undefined_symbol_is_an_error() {
        let (_, report) = run("mov MISSING, r1\n");
        assert_eq!(report.error_count(), 1);
    }

    #[test]
    fn entry_without_definition_is_an_error() {
        let (_, report) = run(".entry L\nhlt\n");
        assert_eq!(report.error_count(), 1);
    }
}
