use clap::Parser;
use colored::*;
use std::path::PathBuf;
use std::process::ExitCode;
use xl_core::cpu_xl::CpuXl;
use xl_vm::{run, Machine};

/// The XL debug virtual machine: runs unpaced and traces every retired
/// instruction and register change to stderr.
#[derive(Parser)]
#[command(name = "xlxdb", disable_help_subcommand = true)]
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
        cpu.bus.echo_io = true;
        if let Err(err) = run::run_debug(&mut cpu) {
            eprintln!("{} {}", "error:".bright_red(), err);
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}
