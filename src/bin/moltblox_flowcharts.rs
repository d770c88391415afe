//! Moltblox Flowcharts CLI
//!
//! Commands: build (default), validate, dump
//! JSON goes to stdout, logs to stderr
//! Returns 2 on validation failure

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use moltblox_flowcharts::{
    pipeline::format_thousands, BuildOptions, FlowchartDocument, FlowchartPipeline, PipelineError,
    DEFAULT_OUTPUT,
};

#[derive(Parser)]
#[command(name = "moltblox-flowcharts")]
#[command(about = "Render the Moltblox flowchart deck to PDF")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the deck to a PDF file
    Build {
        /// Output PDF path
        #[arg(short, long, default_value = DEFAULT_OUTPUT)]
        output: PathBuf,

        /// JSON content file replacing the built-in deck
        #[arg(short, long)]
        content: Option<PathBuf>,

        /// Print the build report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate deck content
    Validate {
        /// JSON content file, defaults to the built-in deck
        #[arg(short, long)]
        content: Option<PathBuf>,
    },

    /// Print the built-in deck as JSON
    Dump,
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

fn load_pipeline(content: Option<&Path>) -> Result<FlowchartPipeline, PipelineError> {
    match content {
        Some(path) => FlowchartPipeline::from_file(path),
        None => Ok(FlowchartPipeline::default()),
    }
}

fn exit_code(err: &PipelineError) -> ExitCode {
    match err {
        PipelineError::ValidationFailed(_) => ExitCode::from(2),
        _ => ExitCode::FAILURE,
    }
}

fn build(output: PathBuf, content: Option<PathBuf>, json: bool) -> ExitCode {
    let result = load_pipeline(content.as_deref()).and_then(|pipeline| {
        let options = BuildOptions { output, ..BuildOptions::default() };
        pipeline.build(&options)
    });

    match result {
        Ok(report) if json => match serde_json::to_string_pretty(&report) {
            Ok(text) => {
                println!("{}", text);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Failed to encode report: {}", e);
                ExitCode::FAILURE
            }
        },
        Ok(report) => {
            println!("Generated: {}", report.output.display());
            println!("Size: {} bytes", format_thousands(report.bytes));
            ExitCode::SUCCESS
        }
        Err(e) => {
            if json {
                let output = serde_json::json!({
                    "success": false,
                    "error": e.to_string(),
                });
                println!("{}", output);
            } else {
                eprintln!("Error: {}", e);
            }
            exit_code(&e)
        }
    }
}

fn validate(content: Option<PathBuf>) -> ExitCode {
    let pipeline = match load_pipeline(content.as_deref()) {
        Ok(p) => p,
        Err(e) => {
            println!("{}", serde_json::json!({ "valid": false, "error": e.to_string() }));
            return ExitCode::FAILURE;
        }
    };

    let result = pipeline.validate();
    match serde_json::to_string_pretty(&result) {
        Ok(text) => println!("{}", text),
        Err(e) => {
            eprintln!("Failed to encode validation result: {}", e);
            return ExitCode::FAILURE;
        }
    }

    if result.valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    }
}

fn dump() -> ExitCode {
    match FlowchartDocument::moltblox().to_json_pretty() {
        Ok(text) => {
            println!("{}", text);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    match cli.command {
        None => build(PathBuf::from(DEFAULT_OUTPUT), None, false),
        Some(Commands::Build { output, content, json }) => build(output, content, json),
        Some(Commands::Validate { content }) => validate(content),
        Some(Commands::Dump) => dump(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_failure_exits_with_2() {
        let err = PipelineError::ValidationFailed("split_total: Page 4".into());
        assert_eq!(exit_code(&err), ExitCode::from(2));
    }

    #[test]
    fn test_other_failures_exit_with_1() {
        let err = PipelineError::Io {
            path: "out.pdf".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(exit_code(&err), ExitCode::FAILURE);
    }

    #[test]
    fn test_cli_defaults_to_build() {
        let cli = Cli::try_parse_from(["moltblox-flowcharts"]).unwrap();
        assert!(cli.command.is_none());

        let cli = Cli::try_parse_from(["moltblox-flowcharts", "build", "--output", "deck.pdf", "--json"]).unwrap();
        match cli.command {
            Some(Commands::Build { output, json, .. }) => {
                assert_eq!(output, PathBuf::from("deck.pdf"));
                assert!(json);
            }
            _ => panic!("expected build command"),
        }
    }
}
