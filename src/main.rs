use clap::{ArgAction, Parser};
use colored::Colorize;
use eyre::Result;
use std::io;
use std::path::PathBuf;
use std::process;
use todolist::{Console, DEFAULT_EXPORT_FILE, TaskStore};
use tracing::{Level, info};

#[derive(Parser)]
#[command(name = "todolist")]
#[command(about = "Interactive to-do list: add, display and complete tasks, then save them as CSV")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// File written on Save & Exit
    #[arg(short, long, default_value = DEFAULT_EXPORT_FILE)]
    output: PathBuf,

    /// Load tasks from the output file before starting
    #[arg(short, long)]
    resume: bool,

    /// Increase log verbosity (logs go to stderr)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing; stdout belongs to the menu
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(log_level(cli.verbose))
        .init();

    let mut store = TaskStore::new();
    if cli.resume {
        let count = store.import(&cli.output)?;
        info!(file = ?cli.output, count, "Resumed previous session");
    }

    let mut console = Console::new(store, io::stdin().lock(), io::stdout().lock(), cli.output);
    console.run()?;

    Ok(())
}

fn log_level(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}
