use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use rulekit_eval::{builders, Event, Pipeline, Registry, SinkConfig};

#[derive(Parser)]
#[command(name = "rulekit")]
#[command(about = "Compile and evaluate security telemetry stage definitions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a stage definition file and print the operator tree
    Compile {
        /// Path to a JSON stage definition
        path: PathBuf,

        /// Registry name to compile the definition under
        #[arg(short, long, default_value = "stage.normalize")]
        stage: String,
    },

    /// Compile a stage definition, then evaluate JSON events against it
    ///
    /// Events come from --event as a single JSON string, or as NDJSON
    /// (newline-delimited JSON) from stdin. Each output event is printed
    /// as one JSON line, in arrival order.
    Eval {
        /// Path to a JSON stage definition
        path: PathBuf,

        /// Registry name to compile the definition under
        #[arg(short, long, default_value = "stage.normalize")]
        stage: String,

        /// A single event as a JSON string (if omitted, reads NDJSON from stdin)
        #[arg(short, long)]
        event: Option<String>,

        /// Active-response queue socket path
        #[arg(long, default_value = rulekit_eval::AR_QUEUE_PATH)]
        ar_queue: PathBuf,

        /// Pretty-print output events
        #[arg(short, long)]
        pretty: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compile { path, stage } => cmd_compile(path, stage),
        Commands::Eval {
            path,
            stage,
            event,
            ar_queue,
            pretty,
        } => cmd_eval(path, stage, event, ar_queue, pretty),
    }
}

// ---------------------------------------------------------------------------
// Subcommand implementations
// ---------------------------------------------------------------------------

fn cmd_compile(path: PathBuf, stage: String) {
    let registry = default_registry(SinkConfig::default());
    let definition = load_definition(&path);

    match Pipeline::compile(&registry, &stage, &definition) {
        Ok(pipeline) => {
            print!("{}", pipeline.root().describe());
        }
        Err(e) => {
            eprintln!("Error compiling {}: {e}", path.display());
            process::exit(1);
        }
    }
}

fn cmd_eval(
    path: PathBuf,
    stage: String,
    event_json: Option<String>,
    ar_queue: PathBuf,
    pretty: bool,
) {
    let registry = default_registry(SinkConfig::new(ar_queue));
    let definition = load_definition(&path);

    let pipeline = match Pipeline::compile(&registry, &stage, &definition) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("Error compiling {}: {e}", path.display());
            process::exit(1);
        }
    };

    if let Some(json_str) = event_json {
        eval_one(&pipeline, &json_str, pretty);
        return;
    }

    // NDJSON from stdin, one event per line
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                eprintln!("Error reading stdin: {e}");
                process::exit(1);
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        eval_one(&pipeline, &line, pretty);
    }
}

fn eval_one(pipeline: &Pipeline, json_str: &str, pretty: bool) {
    let value: serde_json::Value = match serde_json::from_str(json_str) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Invalid JSON event: {e}");
            process::exit(1);
        }
    };

    for output in pipeline.process(Event::from_value(value)) {
        print_json(output.as_value(), pretty);
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn default_registry(sink_config: SinkConfig) -> Registry {
    let mut registry = Registry::new();
    builders::register_defaults(&mut registry, sink_config);
    registry
}

fn load_definition(path: &PathBuf) -> serde_json::Value {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading {}: {e}", path.display());
            process::exit(1);
        }
    };
    match serde_json::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            eprintln!("Error parsing {}: {e}", path.display());
            process::exit(1);
        }
    }
}

fn print_json(value: &serde_json::Value, pretty: bool) {
    let out = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    match out {
        Ok(s) => println!("{s}"),
        Err(e) => {
            eprintln!("Error serializing output: {e}");
            process::exit(1);
        }
    }
}
