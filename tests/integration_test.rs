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

use std::path::Path;

use tas::assemble;
use tas::errors::AssembleError;
use tas::file_reader::MockFileReader;
use tas::model::{LinkKind, RelocType};

fn mock(source: &str) -> MockFileReader {
    let mut reader = MockFileReader::default();
    reader.add_file("in.s", source);
    reader
}

#[test]
fn hlt_is_one_absolute_cell_with_no_linkage() {
    let reader = mock("hlt\n");
    let assembled = assemble(Path::new("in.s"), &reader).expect("assembles cleanly");

    let ctx = assembled.context;
    assert_eq!(ctx.object_code.len(), 1);
    assert_eq!(ctx.object_code[0].value, 0xF000);
    assert_eq!(ctx.object_code[0].reloc as u8, RelocType::Absolute as u8);
    assert!(ctx.link_table.is_empty());
    assert!(ctx.externs.is_empty());
}

#[test]
fn immediate_move_encodes_two_s_complement_literal() {
    let reader = mock("mov #-1, r2\n");
    let assembled = assemble(Path::new("in.s"), &reader).expect("assembles cleanly");

    let ctx = assembled.context;
    assert_eq!(ctx.object_code.len(), 2);
    assert_eq!(ctx.object_code[0].value, 0x001A);
    assert_eq!(ctx.object_code[1].value, 0xFFFF);
    assert_eq!(ctx.object_code[0].reloc as u8, RelocType::Absolute as u8);
    assert_eq!(ctx.object_code[1].reloc as u8, RelocType::Absolute as u8);
}

#[test]
fn entry_on_a_data_label_resolves_through_both_passes() {
    let reader = mock(".entry L\nL: .data 7,8\n");
    let assembled = assemble(Path::new("in.s"), &reader).expect("assembles cleanly");

    let ctx = assembled.context;
    assert_eq!(ctx.object_code.len(), 2);
    assert!(ctx.object_code.iter().all(|c| c.reloc as u8 == RelocType::Data as u8));

    let entry = ctx
        .link_table
        .iter()
        .find(|l| l.kind == LinkKind::Entry && l.name == "L")
        .expect("entry recorded");
    assert_eq!(entry.value, 0);
    assert!(ctx.externs.is_empty());
}

#[test]
fn extern_jsr_records_external_reference_at_its_site() {
    let reader = mock(".extern K\njsr K\n");
    let assembled = assemble(Path::new("in.s"), &reader).expect("assembles cleanly");

    let ctx = assembled.context;
    assert_eq!(ctx.object_code.len(), 2);
    assert_eq!(ctx.object_code[1].reloc as u8, RelocType::External as u8);
    assert_eq!(ctx.externs.len(), 1);
    assert_eq!(ctx.externs[0].name, "K");
    assert_eq!(ctx.externs[0].site, 1);
}

#[test]
fn forward_reference_to_a_data_label_is_relocated_past_the_code_image() {
    let reader = mock("mov A, r3\nA: .data 42\n");
    let assembled = assemble(Path::new("in.s"), &reader).expect("assembles cleanly");

    let ctx = assembled.context;
    assert_eq!(ctx.object_code.len(), 3);
    assert_eq!(ctx.object_code[1].value, 2);
    assert_eq!(ctx.object_code[1].reloc as u8, RelocType::Relocatable as u8);
    assert_eq!(ctx.object_code[2].value, 42);
    assert_eq!(ctx.object_code[2].reloc as u8, RelocType::Data as u8);
}

#[test]
fn duplicate_symbol_fails_the_first_pass() {
    let reader = mock("X: .data 1\nX: .data 2\n");
    let err = assemble(Path::new("in.s"), &reader).expect_err("duplicate symbol must fail");

    match err {
        AssembleError::FirstPassFailed(report) => assert_eq!(report.error_count(), 1),
        other => panic!("expected a first-pass failure, got {other:?}"),
    }
}

#[test]
fn string_literal_round_trips_to_null_terminated_words() {
    let reader = mock(".string \"AB\"\n");
    let assembled = assemble(Path::new("in.s"), &reader).expect("assembles cleanly");

    assert_eq!(assembled.context.data_image, vec![0x41, 0x42, 0x00]);
}

#[test]
fn unresolved_symbol_fails_the_second_pass() {
    let reader = mock("mov MISSING, r1\n");
    let err = assemble(Path::new("in.s"), &reader).expect_err("unresolved symbol must fail");

    match err {
        AssembleError::SecondPassFailed(report) => assert_eq!(report.error_count(), 1),
        other => panic!("expected a second-pass failure, got {other:?}"),
    }
}

#[test]
fn missing_source_file_is_an_io_error() {
    let reader = MockFileReader::default();
    let err = assemble(Path::new("missing.s"), &reader).expect_err("file does not exist");
    assert!(matches!(err, AssembleError::Io(_, _)));
}

#[test]
fn wrong_operand_count_is_a_first_pass_error() {
    let reader = mock("mov r1\n");
    let err = assemble(Path::new("in.s"), &reader).expect_err("mov needs two operands");
    match err {
        AssembleError::FirstPassFailed(report) => assert_eq!(report.error_count(), 1),
        other => panic!("expected a first-pass failure, got {other:?}"),
    }
}
