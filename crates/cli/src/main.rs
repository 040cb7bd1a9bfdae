//! Instruction-fetch core simulator CLI.
//!
//! This binary drives the fetch-core simulator from the command line. It performs:
//! 1. **Run:** Simulate a `.mem` program image against a branch ground truth and report statistics.
//! 2. **Branches:** Generate a `branches.mem` ground-truth table from a trace or a program.
//! 3. **Assemble:** Turn assembly source into `program.mem` and `branches.mem`.

use std::cell::RefCell;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process;
use std::rc::Rc;

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use ifetch_core::common::SimError;
use ifetch_core::config::Config;
use ifetch_core::sim::assembler::{self, EXAMPLE_PROGRAM};
use ifetch_core::sim::{BranchTable, Simulator, WaveDump, extract_branches, loader};

#[derive(Parser, Debug)]
#[command(
    name = "ifetch",
    author,
    version,
    about = "Cycle-accurate instruction-fetch core simulator",
    long_about = "Simulate a branch-predicting fetch stage over a .mem program image.\n\nExamples:\n  ifetch run program.mem --branches branches.mem\n  ifetch run program.mem --trace-file branch_trace.txt --latency 3 --dump wave.jsonl\n  ifetch branches --program program.mem -o branches.mem\n  ifetch assemble loop.asm -p program.mem -b branches.mem\n  ifetch assemble --example"
)]
struct Cli {
    /// Emit per-cycle trace lines (same as `RUST_LOG=trace`).
    #[arg(long, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Simulate a program image.
    Run {
        /// Program image (`.mem`, one hex word per line).
        program: PathBuf,

        /// Ground-truth table (`branches.mem`).
        #[arg(long, conflicts_with = "trace_file")]
        branches: Option<PathBuf>,

        /// Branch trace (`PC TAKEN TARGET` per line).
        #[arg(long)]
        trace_file: Option<PathBuf>,

        /// JSON configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Cycles to simulate (overrides the configuration).
        #[arg(short = 'n', long)]
        cycles: Option<u64>,

        /// Fixed memory latency in cycles (overrides the configuration;
        /// simple controller only).
        #[arg(long)]
        latency: Option<u64>,

        /// Write a JSON-lines wave dump here.
        #[arg(long)]
        dump: Option<PathBuf>,

        /// Statistics sections to print (summary, fetch, branch, buffer, coverage).
        #[arg(long, value_delimiter = ',')]
        stats: Vec<String>,

        /// Keep running after a contract violation.
        #[arg(long)]
        keep_going: bool,
    },

    /// Build a `branches.mem` ground-truth table.
    Branches {
        /// Branch trace to read outcomes from.
        #[arg(long, conflicts_with = "program", required_unless_present = "program")]
        trace_file: Option<PathBuf>,

        /// Program image to extract branches from statically.
        #[arg(long)]
        program: Option<PathBuf>,

        /// Output file.
        #[arg(short, long, default_value = "branches.mem")]
        output: PathBuf,
    },

    /// Assemble a source file into `program.mem` and `branches.mem`.
    Assemble {
        /// Assembly source.
        #[arg(required_unless_present = "example", conflicts_with = "example")]
        source: Option<PathBuf>,

        /// Write and assemble the built-in example program (`example.asm`).
        #[arg(long)]
        example: bool,

        /// Branch trace supplying real outcomes instead of static analysis.
        #[arg(short, long)]
        trace_file: Option<PathBuf>,

        /// Program image output.
        #[arg(short, long, default_value = "program.mem")]
        program_out: PathBuf,

        /// Ground-truth table output.
        #[arg(short, long, default_value = "branches.mem")]
        branch_out: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.trace);

    let result = match cli.command {
        Commands::Run {
            program,
            branches,
            trace_file,
            config,
            cycles,
            latency,
            dump,
            stats,
            keep_going,
        } => cmd_run(&RunArgs {
            program,
            branches,
            trace_file,
            config,
            cycles,
            latency,
            dump,
            stats,
            keep_going,
            trace: cli.trace,
        }),
        Commands::Branches {
            trace_file,
            program,
            output,
        } => cmd_branches(trace_file, program, &output),
        Commands::Assemble {
            source,
            example,
            trace_file,
            program_out,
            branch_out,
        } => cmd_assemble(
            source.as_deref(),
            example,
            trace_file.as_deref(),
            &program_out,
            &branch_out,
        ),
    };

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            error!("[!] FATAL: {e}");
            process::exit(1);
        }
    }
}

/// Installs the `fmt` subscriber; `RUST_LOG` wins over `--trace`.
fn init_tracing(trace: bool) {
    let default = if trace { "trace" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[derive(Debug)]
struct RunArgs {
    program: PathBuf,
    branches: Option<PathBuf>,
    trace_file: Option<PathBuf>,
    config: Option<PathBuf>,
    cycles: Option<u64>,
    latency: Option<u64>,
    dump: Option<PathBuf>,
    stats: Vec<String>,
    keep_going: bool,
    trace: bool,
}

/// Runs the simulator over a program image.
///
/// Ground truth comes from `--branches`, `--trace-file`, or static analysis
/// of the program when neither is given.
///
/// # Returns
///
/// `false` when the run saw a contract violation or a scoreboard mismatch.
fn cmd_run(args: &RunArgs) -> Result<bool, SimError> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(latency) = args.latency {
        config.memory.set_latency(latency)?;
    }
    if let Some(cycles) = args.cycles {
        config.general.max_cycles = cycles;
    }
    config.general.trace |= args.trace;
    config.general.stop_on_violation &= !args.keep_going;

    let program = loader::load_program_mem(&args.program)?;
    let ground_truth = if let Some(path) = &args.branches {
        loader::load_branch_mem(path)?
    } else if let Some(path) = &args.trace_file {
        BranchTable::from_records(&loader::load_branch_trace(path)?)
    } else {
        BranchTable::from_records(&extract_branches(&program))
    };

    println!("[*] Program: {} ({} words)", args.program.display(), program.len());
    println!(
        "    Cycles: {}  Memory: {}  Ground truth: {} branches",
        config.general.max_cycles,
        config.memory.describe(),
        ground_truth.len()
    );

    let mut sim = Simulator::new(&config, program, ground_truth)?;

    let dump = match &args.dump {
        Some(path) => {
            let file = File::create(path).map_err(|e| SimError::io(path, e))?;
            let dump = Rc::new(RefCell::new(WaveDump::new(BufWriter::new(file))));
            sim.add_observer(Box::new(Rc::clone(&dump)));
            Some((path, dump))
        }
        None => None,
    };

    let outcome = sim.run(config.general.max_cycles);

    if let Some((path, dump)) = dump {
        let mut dump = dump.borrow_mut();
        dump.flush().map_err(|e| SimError::io(path, e))?;
        println!("[*] Wave dump: {} cycles -> {}", dump.lines(), path.display());
    }

    sim.stats().print_sections(&args.stats);
    let _ = outcome?;

    let mut ok = true;
    if let Some(violation) = sim.checker().first_violation() {
        error!(
            "[!] {} contract violations, first: {violation}",
            sim.checker().violations().len()
        );
        ok = false;
    }
    let scoreboard = sim.scoreboard();
    if !scoreboard.is_clean() {
        error!("[!] {} scoreboard mismatches", scoreboard.mismatches());
        for m in scoreboard.first_mismatches() {
            warn!(
                "    cycle {}: pc {:#010x} expected {:08X} got {:08X}",
                m.cycle, m.pc, m.expected, m.actual
            );
        }
        ok = false;
    }
    if ok {
        info!(
            "{} cycles clean: {} delivered, {} matched",
            sim.cycle(),
            sim.stats().words_delivered,
            scoreboard.matches()
        );
    }
    Ok(ok)
}

/// Writes a `branches.mem` table built from a trace or a program.
fn cmd_branches(
    trace_file: Option<PathBuf>,
    program: Option<PathBuf>,
    output: &Path,
) -> Result<bool, SimError> {
    let records = match (trace_file, program) {
        (Some(path), _) => loader::load_branch_trace(path)?,
        (None, Some(path)) => extract_branches(&loader::load_program_mem(path)?),
        (None, None) => {
            return Err(SimError::InvalidConfig(
                "specify --trace-file or --program".into(),
            ));
        }
    };
    let table = BranchTable::from_records(&records);
    loader::save_branch_mem(output, &table)?;
    info!(
        "{} branches -> {} table entries in {}",
        records.len(),
        table.len(),
        output.display()
    );
    Ok(true)
}

/// Assembles a source file (or the built-in example) and writes the program
/// image plus its ground-truth table.
fn cmd_assemble(
    source: Option<&Path>,
    example: bool,
    trace_file: Option<&Path>,
    program_out: &Path,
    branch_out: &Path,
) -> Result<bool, SimError> {
    let program = if example {
        let path = program_out.with_file_name("example.asm");
        fs::write(&path, EXAMPLE_PROGRAM).map_err(|e| SimError::io(&path, e))?;
        info!("wrote example program to {}", path.display());
        assembler::assemble_source(EXAMPLE_PROGRAM, &path)?
    } else if let Some(path) = source {
        assembler::load_assembly(path)?
    } else {
        return Err(SimError::InvalidConfig(
            "specify a source file or --example".into(),
        ));
    };
    loader::save_program_mem(program_out, &program)?;

    let records = match trace_file {
        Some(path) => loader::load_branch_trace(path)?,
        None => extract_branches(&program),
    };
    let table = BranchTable::from_records(&records);
    loader::save_branch_mem(branch_out, &table)?;
    info!(
        "{} instructions -> {}, {} branches -> {}",
        program.len(),
        program_out.display(),
        records.len(),
        branch_out.display()
    );
    Ok(true)
}
