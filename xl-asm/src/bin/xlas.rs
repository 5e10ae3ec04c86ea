use clap::Parser;
use colored::*;
use std::path::PathBuf;
use std::process::ExitCode;
use xl_asm::assemble_file;

/// The XL assembler. Reads XL assembly source and writes a raw binary
/// image for loading at $8000.
#[derive(Parser)]
#[command(name = "xlas", disable_help_subcommand = true)]
struct Cli {
    /// Assembly source file
    input: PathBuf,
    /// Output image file
    output: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let image = match assemble_file(&cli.input) {
        Ok(image) => image,
        Err(err) => {
            eprintln!("{} {}", "error:".bright_red(), err);
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = std::fs::write(&cli.output, &image) {
        eprintln!(
            "{} {}: {}",
            "error:".bright_red(),
            cli.output.display(),
            err
        );
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
