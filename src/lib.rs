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

//! A two-pass assembler for a toy 16-bit instruction set.
//!
//! [`assemble`] is the single entry point: it reads a source file through a
//! [`FileReader`], runs the first and second passes, and returns either the
//! fully resolved [`AssemblerContext`] or the failing pass's diagnostics.

pub mod classify;
pub mod context;
pub mod encoder;
pub mod errors;
pub mod file_reader;
pub mod lexer;
pub mod model;
pub mod object_writer;
pub mod passes;
pub mod tables;

use std::path::Path;

use context::AssemblerContext;
use errors::{AssembleError, PassReport};
use file_reader::FileReader;

/// The outcome of a fully successful assembly: the resolved tables plus the
/// (necessarily empty-of-errors) diagnostics from each pass, since warnings
/// may still have been raised.
pub struct Assembled {
    pub context: AssemblerContext,
    pub first_pass: PassReport,
    pub second_pass: PassReport,
}

pub fn assemble<F: FileReader>(source_path: &Path, reader: &F) -> Result<Assembled, AssembleError> {
    let source = reader
        .read_to_string(source_path)
        .map_err(|e| AssembleError::Io(source_path.display().to_string(), e.to_string()))?;

    let mut ctx = AssemblerContext::new();
    let mut first_report = PassReport::default();
    passes::first::first_pass(&source, &mut ctx, &mut first_report);

    if first_report.error_count() > 0 {
        return Err(AssembleError::FirstPassFailed(first_report));
    }

    let mut second_report = PassReport::default();
    passes::second::second_pass(&source, &mut ctx, &mut second_report);

    if second_report.error_count() > 0 {
        return Err(AssembleError::SecondPassFailed(second_report));
    }

    Ok(Assembled {
        context: ctx,
        first_pass: first_report,
        second_pass: second_report,
    })
}
