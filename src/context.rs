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

//! Mutable state threaded through both passes: the symbol table, the link
//! table, the growing object and data images, and the external-reference
//! list gathered while resolving the second pass.
//!
//! Kept as a plain struct passed by reference rather than process-wide
//! statics, so nothing here survives between independent calls to
//! [`crate::assemble`].

use crate::errors::PassReport;
use crate::model::{ExternRef, LinkEntry, ObjectCell, Symbol};
use crate::tables::TABLE_CAP;

/// An insertion-ordered symbol table. A `Vec` rather than a `HashMap` keeps
/// listing output in declaration order.
#[derive(Debug, Default)]
pub struct SymbolTable(Vec<(String, Symbol)>);

impl SymbolTable {
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|(n, _)| n == name)
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        self.0.iter_mut().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    pub fn insert(&mut self, name: String, symbol: Symbol) {
        self.0.push((name, symbol));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Symbol)> {
        self.0.iter().map(|(n, s)| (n, s))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut Symbol)> {
        self.0.iter_mut().map(|(n, s)| (&*n, s))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct AssemblerContext {
    pub symbols: SymbolTable,
    pub link_table: Vec<LinkEntry>,
    pub externs: Vec<ExternRef>,
    pub data_image: Vec<u16>,
    pub object_code: Vec<ObjectCell>,
    pub ic: u16,
    pub dc: u16,
}

impl AssemblerContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a symbol, reporting `TableFull` instead of inserting once the
    /// table reaches [`TABLE_CAP`].
    pub fn add_symbol(&mut self, name: String, symbol: Symbol, line: usize, report: &mut PassReport) {
        if self.symbols.len() >= TABLE_CAP {
            report.error(line, "symbol table is full");
            return;
        }
        self.symbols.insert(name, symbol);
    }

    pub fn add_link_entry(&mut self, entry: LinkEntry, report: &mut PassReport) {
        if self.link_table.len() >= TABLE_CAP {
            report.error(entry.line, "link table is full");
            return;
        }
        self.link_table.push(entry);
    }

    pub fn add_data_word(&mut self, word: u16, line: usize, report: &mut PassReport) {
        if self.data_image.len() >= TABLE_CAP {
            report.error(line, "data image is full");
            return;
        }
        self.data_image.push(word);
        self.dc += 1;
    }

    /// Pushes a resolved object cell and advances `ic`.
    pub fn add_object_cell(&mut self, cell: ObjectCell, line: usize, report: &mut PassReport) {
        if self.object_code.len() >= TABLE_CAP {
            report.error(line, "object code table is full");
            return;
        }
        self.object_code.push(cell);
        self.ic += 1;
    }

    /// Pushes a placeholder cell awaiting resolution in the second pass.
    pub fn add_placeholder(&mut self, line: usize, report: &mut PassReport) {
        self.add_object_cell(ObjectCell::placeholder(), line, report);
    }
}
