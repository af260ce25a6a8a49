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

//! Core value types shared by the classifier, the two passes and the
//! encoder: addressing modes, the bit-packed instruction record, symbols,
//! link-table entries, object cells and external-reference records.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressingMode {
    Instant(i32),
    Direct(String),
    Indirect(String),
    DirectRegister(u8),
    IndirectRegister(u8),
}

impl AddressingMode {
    /// The numeric index used both for legality checks and for the bit
    /// layout of the instruction word (0..4).
    pub fn mode_index(&self) -> u8 {
        match self {
            AddressingMode::Instant(_) => 0,
            AddressingMode::Direct(_) => 1,
            AddressingMode::Indirect(_) => 2,
            AddressingMode::DirectRegister(_) => 3,
            AddressingMode::IndirectRegister(_) => 4,
        }
    }

    /// Whether resolving this operand requires an extra 16-bit word.
    pub fn needs_extra_word(&self) -> bool {
        matches!(
            self,
            AddressingMode::Instant(_) | AddressingMode::Direct(_) | AddressingMode::Indirect(_)
        )
    }

    /// The register field packed into the instruction word; zero for modes
    /// that do not carry a register.
    pub fn register_field(&self) -> u8 {
        match self {
            AddressingMode::DirectRegister(r) | AddressingMode::IndirectRegister(r) => *r,
            _ => 0,
        }
    }

    /// For `Direct`/`Indirect`, the label name referenced by this operand.
    pub fn label_name(&self) -> Option<&str> {
        match self {
            AddressingMode::Direct(name) | AddressingMode::Indirect(name) => Some(name),
            _ => None,
        }
    }
}

/// The fields packed into a single 16-bit instruction word, per the bit
/// layout: opcode(4) | src mode(3) | src reg(3) | dest mode(3) | dest reg(3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Instruction {
    pub opcode: u8,
    pub src_mode: u8,
    pub src_reg: u8,
    pub dest_mode: u8,
    pub dest_reg: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Absolute,
    Relocatable,
    External,
}

impl SymbolKind {
    pub fn as_char(self) -> char {
        match self {
            SymbolKind::Absolute => 'a',
            SymbolKind::Relocatable => 'r',
            SymbolKind::External => 'e',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub value: u16,
    pub kind: SymbolKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Extern,
    Entry,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEntry {
    pub name: String,
    pub value: u16,
    pub kind: LinkKind,
    /// Line on which the `.entry`/`.extern` directive appeared, used only
    /// for diagnostics raised during the pass-two table-update phase.
    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelocType {
    Absolute,
    Relocatable,
    External,
    Placeholder,
    Data,
}

impl RelocType {
    pub fn as_char(self) -> char {
        match self {
            RelocType::Absolute => 'a',
            RelocType::Relocatable => 'r',
            RelocType::External => 'e',
            RelocType::Placeholder => '?',
            RelocType::Data => ' ',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectCell {
    pub value: u16,
    pub reloc: RelocType,
}

impl ObjectCell {
    pub fn placeholder() -> Self {
        Self {
            value: 0xFFFF,
            reloc: RelocType::Placeholder,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternRef {
    pub name: String,
    pub site: u16,
}
