use clap::Parser;
use colored::*;
use std::path::PathBuf;
use std::process::ExitCode;
use xl_core::constants::IMAGE_SIZE;
use xl_core::disasm;

/// The XL disassembler. Prints a listing of each program image.
#[derive(Parser)]
#[command(name = "xldis", disable_help_subcommand = true)]
struct Cli {
    /// Program images to disassemble
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    for input in &cli.inputs {
        let image = match std::fs::read(input) {
            Ok(image) => image,
            Err(err) => {
                eprintln!("{} {}: {}", "error:".bright_red(), input.display(), err);
                return ExitCode::FAILURE;
            }
        };
        if image.len() < IMAGE_SIZE {
            eprintln!(
                "{} {}: too few bytes in the file",
                "error:".bright_red(),
                input.display()
            );
            return ExitCode::FAILURE;
        }
        println!("   '{}'", input.display());
        print!("{}", disasm::disassemble(&image[..IMAGE_SIZE]));
    }
    ExitCode::SUCCESS
}
