//! goflow: step-tracing Go interpreter with terminal playback
//!
//! # Usage
//!
//! ```bash
//! # Trace a program and replay it in the terminal UI
//! goflow play demos/fib.go
//!
//! # Print the full trace response as JSON (use `-` to read stdin)
//! goflow trace demos/fib.go --pretty
//!
//! # Print only the static outline
//! goflow outline demos/fib.go
//! ```

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::{Args, Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info};

use goflow::interpreter::constants::{DEFAULT_MAX_CALL_DEPTH, DEFAULT_MAX_LOOP_ITERATIONS};
use goflow::interpreter::Limits;
use goflow::outline;
use goflow::parser::parse_source;
use goflow::response::TraceResponse;
use goflow::snapshot::Playback;
use goflow::trace_source;
use goflow::ui::App;

#[derive(Parser)]
#[command(
    name = "goflow",
    version = env!("CARGO_PKG_VERSION"),
    about = "Trace a small Go program step by step and replay it"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Maximum nesting of user function calls before a call is abandoned
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_CALL_DEPTH)]
    max_call_depth: usize,

    /// Maximum iterations of any single loop execution
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_LOOP_ITERATIONS)]
    max_loop_iterations: usize,

    /// Enable verbose logging (use multiple times for increased verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress everything but errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Args)]
struct SourceArgs {
    /// Go source file, or `-` for stdin
    file: PathBuf,
}

#[derive(Args)]
struct TraceArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Pretty-print the JSON
    #[arg(long)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Trace a program and step through it in the terminal UI
    Play(SourceArgs),

    /// Trace a program and print the response document as JSON
    Trace(TraceArgs),

    /// Print the static outline of a program as JSON
    Outline(TraceArgs),
}

impl Commands {
    fn is_interactive(&self) -> bool {
        matches!(self, Commands::Play(_))
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    setup_logging(&cli)?;

    let limits = Limits {
        max_call_depth: cli.max_call_depth,
        max_loop_iterations: cli.max_loop_iterations,
    };

    match cli.command {
        Commands::Play(args) => play(&args.file, limits),
        Commands::Trace(args) => {
            let source = read_source(&args.source.file)?;
            let response = TraceResponse::from_source(&source, limits);
            print_json(&response, args.pretty)?;
            if !response.success {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Outline(args) => {
            let source = read_source(&args.source.file)?;
            let program = match parse_source(&source) {
                Ok(program) => program,
                Err(e) => {
                    error!("{}", e);
                    eprintln!("{}", e);
                    std::process::exit(1);
                }
            };
            let outline = outline::extract(&program);
            info!(nodes = outline.node_count(), "extracted outline");
            print_json(&outline, args.pretty)
        }
    }
}

fn setup_logging(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::EnvFilter;

    // The TUI owns the terminal, so without a log file it stays silent
    let silent = cli.command.is_interactive() && cli.log_file.is_none();

    let filter = if let Ok(filter) = EnvFilter::try_from_default_env() {
        filter
    } else if cli.quiet {
        EnvFilter::new("error")
    } else if silent && cli.verbose == 0 {
        EnvFilter::new("off")
    } else {
        match cli.verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .with_level(true);

    match &cli.log_file {
        Some(path) => {
            let file = fs::File::create(path)?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(io::stderr).init(),
    }

    Ok(())
}

fn read_source(path: &Path) -> io::Result<String> {
    if path.as_os_str() == "-" {
        let mut source = String::new();
        io::stdin().read_to_string(&mut source)?;
        return Ok(source);
    }
    fs::read_to_string(path)
        .map_err(|e| io::Error::new(e.kind(), format!("failed to read '{}': {}", path.display(), e)))
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<(), Box<dyn std::error::Error>> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", json);
    Ok(())
}

fn play(path: &Path, limits: Limits) -> Result<(), Box<dyn std::error::Error>> {
    let source = read_source(path)?;

    info!(file = %path.display(), "tracing program");
    let trace = match trace_source(&source, limits) {
        Ok(trace) => trace,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    info!(steps = trace.len(), "trace recorded");

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(Playback::new(trace), source);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}
