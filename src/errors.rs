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

//! Diagnostics and the top-level error type of the assembler.
//!
//! Every error and warning produced by the pipeline is line-scoped; neither
//! pass aborts on an individual diagnostic, so a pass collects its
//! diagnostics into a `PassReport` rather than returning on the first one.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn error(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn warning(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}

/// Accumulated diagnostics of a single pass.
#[derive(Debug, Default)]
pub struct PassReport {
    pub diagnostics: Vec<Diagnostic>,
}

impl PassReport {
    pub fn push(&mut self, diag: Diagnostic) {
        self.diagnostics.push(diag);
    }

    pub fn error(&mut self, line: usize, message: impl Into<String>) {
        self.push(Diagnostic::error(line, message));
    }

    pub fn warning(&mut self, line: usize, message: impl Into<String>) {
        self.push(Diagnostic::warning(line, message));
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }
}

#[derive(Error, Debug)]
pub enum AssembleError {
    #[error("unable to open '{0}': {1}")]
    Io(String, String),

    #[error("first pass failed with {} error(s)", .0.error_count())]
    FirstPassFailed(PassReport),

    #[error("second pass failed with {} error(s)", .0.error_count())]
    SecondPassFailed(PassReport),
}
