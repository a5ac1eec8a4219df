mod repl;

use clap::Parser;
use std::process;

use strand::error::format_error;
use strand::runtime::Runtime;
use strand::vm::{Vm, VmConfig};

#[derive(Parser)]
#[command(name = "strand")]
#[command(about = "A stack-based bytecode VM for the Strand language", long_about = None)]
struct Cli {
    /// Source file to run; starts the REPL when omitted.
    file: Option<String>,

    /// Write a per-instruction trace to stderr.
    #[arg(long)]
    trace: bool,

    /// Print execution metrics after the run.
    #[arg(long)]
    metrics: bool,

    /// Maximum call depth before a StackOverflow fault.
    #[arg(long, default_value_t = 256)]
    max_call_depth: usize,

    /// Abort after this many executed instructions.
    #[arg(long)]
    max_instructions: Option<u64>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = VmConfig {
        max_call_depth: cli.max_call_depth,
        max_instructions: cli.max_instructions,
    };

    match &cli.file {
        Some(file) => run_file(file, &cli, config),
        None => repl::start(&Runtime::with_config(config)),
    }
}

fn run_file(path: &str, cli: &Cli, config: VmConfig) {
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error reading '{}': {}", path, e);
            process::exit(1);
        }
    };

    let runtime = Runtime::with_config(config.clone());

    let program = match runtime.parse(&source) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{}", format_error(&e, &source, path));
            process::exit(1);
        }
    };

    let mut vm = Vm::with_config(config);
    if cli.trace {
        vm.set_trace_sink(Box::new(std::io::stderr()));
    }

    let start = std::time::Instant::now();
    let outcome = match vm.execute(&program) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("{}", format_error(&e, &source, path));
            process::exit(1);
        }
    };
    let total_elapsed = start.elapsed();

    for line in &outcome.output {
        println!("{}", line);
    }

    if cli.metrics {
        eprintln!("instructions : {}", outcome.instructions);
        eprintln!("peak stack   : {}", outcome.peak_stack);
        eprintln!("vm time      : {:?}", outcome.elapsed);
        eprintln!("total time   : {:?}", total_elapsed);
    }
}
