use clap::Parser;
use colored::*;
use std::path::PathBuf;
use std::process::ExitCode;
use xl_core::cpu_xl::CpuXl;
use xl_vm::{run, Machine};

/// The XL virtual machine. Runs program images at the designed CPU speed,
/// with character I/O mapped at $00FF.
#[derive(Parser)]
#[command(name = "xlx", disable_help_subcommand = true)]
struct Cli {
    /// Program images to run, one after another
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    for input in &cli.inputs {
        let machine = match Machine::from_file(input) {
            Ok(machine) => machine,
            Err(err) => {
                eprintln!("{} {}", "error:".bright_red(), err);
                return ExitCode::FAILURE;
            }
        };
        let mut cpu = CpuXl::new(machine);
        if let Err(err) = run::run(&mut cpu) {
            eprintln!("{} {}", "error:".bright_red(), err);
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}
