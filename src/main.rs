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

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;

use tas::context::AssemblerContext;
use tas::errors::PassReport;
use tas::file_reader::{AsmFileReader, FileReader};
use tas::object_writer;
use tas::passes::{first::first_pass, second::second_pass};

/// A two-pass assembler for a toy 16-bit instruction set.
#[derive(Parser, Debug)]
#[command(name = "tas", disable_help_flag = true, disable_version_flag = true)]
struct Opts {
    /// Print the symbol, link, extern, data and object tables after each pass.
    #[arg(short = 'l')]
    list: bool,

    /// Suppress output-file creation.
    #[arg(short = 'n')]
    no_output: bool,

    /// Emit a flat binary image instead of the ASCII object file.
    #[arg(short = 'b')]
    binary: bool,

    /// Print usage and exit.
    #[arg(short = 'h')]
    help: bool,

    source: Option<PathBuf>,
}

const USAGE: &str = "toy two-pass assembler\n\n\
usage: tas <options> source-file\n\n\
options:\n\
  -l : prints debugging lists after each pass\n\
  -n : creates no output files\n\
  -b : creates a binary output file\n\
  -h : shows this text\n";

fn basename(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn print_diagnostics(base: &str, report: &PassReport) {
    for diag in &report.diagnostics {
        let label = match diag.severity {
            tas::errors::Severity::Error => "error",
            tas::errors::Severity::Warning => "warning",
        };
        eprintln!("{}:{}: {}: {}", base, diag.line, label, diag.message);
    }
}

fn print_listing_after_first(ctx: &AssemblerContext) {
    println!("\n--- Results of the first pass:");
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let _ = object_writer::print_symbol_table(ctx, &mut out);
    let _ = object_writer::print_link_table(ctx, &mut out);
    let _ = object_writer::print_data_image(ctx, &mut out);
    let _ = object_writer::print_object_code(ctx, &mut out);
}

fn print_listing_after_second(ctx: &AssemblerContext) {
    println!("\n--- Results of the second pass:");
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let _ = object_writer::print_symbol_table(ctx, &mut out);
    let _ = object_writer::print_link_table(ctx, &mut out);
    let _ = object_writer::print_extern_table(ctx, &mut out);
    let _ = object_writer::print_object_code(ctx, &mut out);
}

fn main() -> ExitCode {
    let opts = Opts::parse();

    if opts.help {
        print!("{USAGE}");
        return ExitCode::from(0);
    }

    let Some(source_path) = opts.source else {
        print!("{USAGE}");
        return ExitCode::from(1);
    };

    let base = basename(&source_path);
    let reader = AsmFileReader;
    let source = match reader.read_to_string(&source_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("unable to open '{}': {}", source_path.display(), e);
            return ExitCode::from(1);
        }
    };

    let mut ctx = AssemblerContext::new();
    let mut first_report = PassReport::default();
    first_pass(&source, &mut ctx, &mut first_report);
    print_diagnostics(&base, &first_report);

    if first_report.error_count() > 0 {
        eprintln!("first pass failed with {} error(s)", first_report.error_count());
        return ExitCode::from(2);
    }
    if opts.list {
        print_listing_after_first(&ctx);
    }

    let mut second_report = PassReport::default();
    second_pass(&source, &mut ctx, &mut second_report);
    print_diagnostics(&base, &second_report);

    if second_report.error_count() > 0 {
        eprintln!("second pass failed with {} error(s)", second_report.error_count());
        return ExitCode::from(3);
    }
    if opts.list {
        print_listing_after_second(&ctx);
    }

    if opts.no_output {
        return ExitCode::from(0);
    }

    if opts.binary {
        if !ctx.externs.is_empty() {
            eprintln!("unable to create binary file if source contains .extern-s");
            return ExitCode::from(4);
        }

        let bin_path = source_path.with_extension("bin");
        match File::create(&bin_path).and_then(|mut f| object_writer::write_binary(&ctx, &mut f)) {
            Ok(()) => ExitCode::from(0),
            Err(e) => {
                eprintln!("binary file creation failed: {e}");
                ExitCode::from(5)
            }
        }
    } else {
        let object_path = source_path.with_extension("oc");
        match File::create(&object_path).and_then(|mut f| object_writer::write_object_text(&ctx, &mut f)) {
            Ok(()) => ExitCode::from(0),
            Err(e) => {
                eprintln!("object file creation failed: {e}");
                ExitCode::from(4)
            }
        }
    }
}
