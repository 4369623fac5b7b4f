//! ExamForge CLI
//!
//! Commands: templates, validate, generate
//! Reports in JSON on stdout; version diagnostics as plain text
//! Returns non-zero on validation failure

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use examforge_core::{
    config::ProjectConfig,
    pipeline::{GenerationPipeline, PipelineError},
    templates::{TemplateError, TemplateSet},
};

#[derive(Parser)]
#[command(name = "examforge-cli")]
#[command(about = "ExamForge CLI - LaTeX Exam Project Generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a custom template set directory (defaults to the built-in set)
    #[arg(short, long)]
    templates_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the active template set
    Templates,

    /// Validate the version fields of a replay file
    Validate {
        /// Replay JSON file with the resolved answers
        #[arg(short, long)]
        replay: PathBuf,
    },

    /// Generate a project from a replay file
    Generate {
        /// Replay JSON file with the resolved answers
        #[arg(short, long)]
        replay: PathBuf,

        /// Directory the project is generated into
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },
}

fn load_templates(dir: &Option<PathBuf>) -> Result<TemplateSet, TemplateError> {
    match dir {
        Some(d) => TemplateSet::load_from_dir(d),
        None => TemplateSet::builtin(),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let templates = match load_templates(&cli.templates_dir) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Failed to load templates: {e}");
            return ExitCode::FAILURE;
        }
    };

    let pipeline = GenerationPipeline::new(templates);

    match cli.command {
        Commands::Templates => {
            println!(
                "{}",
                serde_json::to_string_pretty(pipeline.template_manifest()).unwrap()
            );
            ExitCode::SUCCESS
        }

        Commands::Validate { replay } => {
            let config = match ProjectConfig::from_replay_file(&replay) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("{e}");
                    return ExitCode::FAILURE;
                }
            };

            match pipeline.validate_config(&config) {
                // Silent on success; the diagnostic text is the contract on failure.
                Ok(_) => ExitCode::SUCCESS,
                Err(e) => {
                    println!("Error: {e}");
                    ExitCode::from(2) // Validation failure
                }
            }
        }

        Commands::Generate { replay, output_dir } => {
            let config = match ProjectConfig::from_replay_file(&replay) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("{e}");
                    return ExitCode::FAILURE;
                }
            };

            match pipeline.generate(&config, &output_dir) {
                Ok(report) => {
                    let output = serde_json::json!({
                        "success": true,
                        "report": report,
                    });
                    println!("{}", serde_json::to_string_pretty(&output).unwrap());
                    ExitCode::SUCCESS
                }
                Err(PipelineError::Validation(e)) => {
                    println!("Error: {e}");
                    ExitCode::from(2) // Validation failure
                }
                Err(e) => {
                    eprintln!("{e}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}
