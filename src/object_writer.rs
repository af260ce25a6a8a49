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

//! Serialising the assembled image: the text object format, the flat
//! binary format, and the `-l` debug listings.

use std::io::{self, Write};

use crate::context::AssemblerContext;
use crate::model::{LinkKind, RelocType};

/// Writes the `.cbegin`/`.lbegin`/`.ebegin` sectioned text format described
/// by the external object-file interface. Link/extern sections are omitted
/// entirely when their backing tables are empty.
pub fn write_object_text<W: Write>(ctx: &AssemblerContext, out: &mut W) -> io::Result<()> {
    let code_len = ctx.ic;
    let data_len = ctx.dc;

    writeln!(out, ".cbegin")?;
    writeln!(out, "{code_len:x} {data_len:x}")?;
    for (addr, cell) in ctx.object_code.iter().enumerate() {
        writeln!(out, "{:04x} {:04x} {}", addr, cell.value, cell.reloc.as_char())?;
    }
    writeln!(out, ".cend")?;

    let entries: Vec<_> = ctx
        .link_table
        .iter()
        .filter(|link| link.kind == LinkKind::Entry)
        .collect();
    if !entries.is_empty() {
        writeln!(out, ".lbegin")?;
        for entry in entries {
            writeln!(out, "{} {:04x}", entry.name, entry.value)?;
        }
        writeln!(out, ".lend")?;
    }

    if !ctx.externs.is_empty() {
        writeln!(out, ".ebegin")?;
        for ext in &ctx.externs {
            writeln!(out, "{} {:04x}", ext.name, ext.site)?;
        }
        writeln!(out, ".eend")?;
    }

    Ok(())
}

/// Writes the final code image as raw little-endian 16-bit words. Callers
/// must reject this ahead of time when externs exist.
pub fn write_binary<W: Write>(ctx: &AssemblerContext, out: &mut W) -> io::Result<()> {
    for cell in &ctx.object_code {
        out.write_all(&cell.value.to_le_bytes())?;
    }
    Ok(())
}

/// Prints the symbol table, in the shape used by `-l` listings.
pub fn print_symbol_table<W: Write>(ctx: &AssemblerContext, out: &mut W) -> io::Result<()> {
    writeln!(out, "-- symbol table --")?;
    for (name, sym) in ctx.symbols.iter() {
        writeln!(out, "{} {:04x} {}", name, sym.value, sym.kind.as_char())?;
    }
    Ok(())
}

pub fn print_link_table<W: Write>(ctx: &AssemblerContext, out: &mut W) -> io::Result<()> {
    writeln!(out, "-- link table --")?;
    for link in &ctx.link_table {
        let kind = match link.kind {
            LinkKind::Entry => 'n',
            LinkKind::Extern => 'e',
        };
        writeln!(out, "{} {:04x} {}", link.name, link.value, kind)?;
    }
    Ok(())
}

pub fn print_extern_table<W: Write>(ctx: &AssemblerContext, out: &mut W) -> io::Result<()> {
    writeln!(out, "-- extern table --")?;
    for ext in &ctx.externs {
        writeln!(out, "{} {:04x}", ext.name, ext.site)?;
    }
    Ok(())
}

pub fn print_data_image<W: Write>(ctx: &AssemblerContext, out: &mut W) -> io::Result<()> {
    writeln!(out, "-- data image --")?;
    for (i, word) in ctx.data_image.iter().enumerate() {
        writeln!(out, "{i:04x} {word:04x}")?;
    }
    Ok(())
}

pub fn print_object_code<W: Write>(ctx: &AssemblerContext, out: &mut W) -> io::Result<()> {
    writeln!(out, "-- object code --")?;
    for (addr, cell) in ctx.object_code.iter().enumerate() {
        let ty = if cell.reloc as u8 == RelocType::Data as u8 { '_' } else { cell.reloc.as_char() };
        writeln!(out, "{addr:04x} {:04x} {ty}", cell.value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::PassReport;
    use crate::passes::{first::first_pass, second::second_pass};

    #[test]
    fn hlt_produces_one_absolute_cell() {
        let mut ctx = AssemblerContext::new();
        let mut report = PassReport::default();
        first_pass("hlt\n", &mut ctx, &mut report);
        second_pass("hlt\n", &mut ctx, &mut report);

        let mut buf = Vec::new();
        write_object_text(&ctx, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with(".cbegin\n1 0\n0000 f000 a\n.cend\n"));
        assert!(!text.contains(".lbegin"));
        assert!(!text.contains(".ebegin"));
    }

    #[test]
    fn extern_reference_gets_an_ebegin_section() {
        let mut ctx = AssemblerContext::new();
        let mut report = PassReport::default();
        let src = ".extern K\njsr K\n";
        first_pass(src, &mut ctx, &mut report);
        second_pass(src, &mut ctx, &mut report);

        let mut buf = Vec::new();
        write_object_text(&ctx, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains(".ebegin\nK 0001\n.eend\n"));
    }

    #[test]
    fn binary_output_is_little_endian_words() {
        let mut ctx = AssemblerContext::new();
        let mut report = PassReport::default();
        first_pass("hlt\n", &mut ctx, &mut report);
        second_pass("hlt\n", &mut ctx, &mut report);

        let mut buf = Vec::new();
        write_binary(&ctx, &mut buf).unwrap();
        assert_eq!(buf, vec![0x00, 0xF0]);
    }
}
