//! resume-scanner: score a resume against a job description

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use resume_scanner::cli::{self, Cli, Commands, ConfigAction, ModelAction};
use resume_scanner::config::Config;
use resume_scanner::error::{Result, ScanError};
use resume_scanner::input::InputManager;
use resume_scanner::output::formatter::{save_report_to_file, suggest_filename, ReportGenerator};
use resume_scanner::output::ScanReport;
use resume_scanner::processing::encoder_manager::EncoderModelManager;
use resume_scanner::processing::matcher::{
    MatchFailure, MatchMode, MatchOrchestrator, MatchOutcome, MatchRequest,
};
use resume_scanner::processing::semantic::shared_encoder;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

const EXIT_FAILURE: i32 = 1;
const EXIT_NOT_PASSED: i32 = 2;

const SUPPORTED_EXTENSIONS: [&str; 4] = ["pdf", "txt", "md", "markdown"];

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(EXIT_FAILURE);
        }
    };

    match run_command(cli.command, config, config_path).await {
        Ok(code) => process::exit(code),
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("{}", e.user_message());
            process::exit(EXIT_FAILURE);
        }
    }
}

/// Returns the process exit code
async fn run_command(command: Commands, mut config: Config, config_path: PathBuf) -> Result<i32> {
    match command {
        Commands::Scan {
            resume,
            job,
            mode,
            encoder,
            top_n,
            critical,
            output,
            save,
            detailed,
        } => {
            cli::validate_file_extension(&resume, &SUPPORTED_EXTENSIONS)
                .map_err(|e| ScanError::InvalidInput(format!("Resume file: {}", e)))?;
            cli::validate_file_extension(&job, &SUPPORTED_EXTENSIONS)
                .map_err(|e| ScanError::InvalidInput(format!("Job description file: {}", e)))?;

            let mode: MatchMode = mode
                .as_deref()
                .unwrap_or(config.scoring.default_mode.as_str())
                .parse()?;
            let output_format = match output {
                Some(format) => cli::parse_output_format(&format).map_err(ScanError::InvalidInput)?,
                None => config.output.format,
            };
            if let Some(model) = encoder {
                config.encoder.default_model = model;
            }
            let selection = cli::critical_selection(&critical, top_n.unwrap_or(config.scoring.top_n));

            info!("Scanning {} against {} in {} mode", resume.display(), job.display(), mode);

            let mut input_manager = InputManager::new();
            let resume_text = input_manager.extract(&resume).await?;
            let job_text = input_manager.extract_text(&job).await?;

            let warm_up = if mode == MatchMode::Semantic {
                warm_up_encoder(&config).await
            } else {
                Ok(())
            };

            let orchestrator = MatchOrchestrator::new(&config);
            let request = MatchRequest::new(job_text, resume_text.text, mode).with_critical(selection);
            let outcome = analyze_after_warm_up(warm_up, orchestrator, request).await?;

            let report = ScanReport::new(
                outcome,
                &resume.display().to_string(),
                &job.display().to_string(),
                resume_text.pages,
            );

            let generator = ReportGenerator::with_options(
                config.output.color_output && save.is_none(),
                detailed || config.output.detailed,
                true,
            );
            let rendered = generator.generate_report(&report, &output_format)?;

            match save {
                Some(path) => {
                    let path = if path.is_dir() {
                        path.join(suggest_filename(&output_format, &resume.to_string_lossy(), true))
                    } else {
                        path
                    };
                    save_report_to_file(&rendered, &path)?;
                    println!("Report saved to {}", path.display());
                }
                None => println!("{}", rendered),
            }

            Ok(match report.passed() {
                Some(true) => 0,
                Some(false) => EXIT_NOT_PASSED,
                None => EXIT_FAILURE,
            })
        }

        Commands::Models { action } => {
            let mut manager = EncoderModelManager::new(&config.encoder).await?;

            match action {
                ModelAction::List => {
                    println!("Available encoder models\n");
                    for model in manager.list_available_models() {
                        let status = if manager.is_model_downloaded(&model.name) {
                            "downloaded".green()
                        } else {
                            "not downloaded".yellow()
                        };
                        let default_marker = if model.name == config.encoder.default_model {
                            " (default)"
                        } else {
                            ""
                        };
                        println!(
                            "  • {}{} [{}] - {} MB, {} dims",
                            model.name, default_marker, status, model.size_mb, model.dimensions
                        );
                        println!("    {} | {}", model.repo_id, model.description);
                    }
                }

                ModelAction::Download { model, force } => {
                    let spinner = spinner(&format!("Downloading {}...", model));
                    let result = manager.download_model(&model, force).await;
                    spinner.finish_and_clear();
                    let path = result?;
                    println!("Model {} ready at {}", model, path.display());
                }

                ModelAction::Remove { model } => {
                    manager.remove_model(&model).await?;
                    println!("Removed model {}", model);
                }

                ModelAction::Info { model } => {
                    let info = manager
                        .get_model_info(&model)
                        .ok_or_else(|| ScanError::ModelError(format!("Unknown encoder model: {}", model)))?;
                    println!("Name: {}", info.name);
                    println!("Repository: {}", info.repo_id);
                    println!("Size: {} MB", info.size_mb);
                    println!("Dimensions: {}", info.dimensions);
                    println!("Description: {}", info.description);
                    println!("Downloaded: {}", manager.is_model_downloaded(&info.name));
                }
            }

            Ok(0)
        }

        Commands::Config { action } => {
            match action {
                Some(ConfigAction::Show) | None => {
                    let rendered = toml::to_string_pretty(&config)
                        .map_err(|e| ScanError::Configuration(format!("Failed to serialize config: {}", e)))?;
                    println!("# {}\n", config_path.display());
                    println!("{}", rendered);
                }

                Some(ConfigAction::Reset) => {
                    Config::default().save_to(&config_path)?;
                    println!("Configuration reset: {}", config_path.display());
                }

                Some(ConfigAction::Path) => {
                    println!("{}", config_path.display());
                }
            }

            Ok(0)
        }
    }
}

/// Load the shared encoder off the async runtime so the spinner keeps ticking
async fn warm_up_encoder(config: &Config) -> Result<()> {
    let encoder_config = config.encoder.clone();
    let spinner = spinner(&format!("Loading encoder {}...", encoder_config.default_model));

    let loaded = tokio::task::spawn_blocking(move || shared_encoder(&encoder_config).map(|_| ())).await;
    spinner.finish_and_clear();

    match loaded {
        Ok(Ok(())) => {
            info!("Encoder ready");
            Ok(())
        }
        Ok(Err(e)) => {
            warn!("Encoder failed to load: {}", e);
            Err(e)
        }
        Err(e) => Err(ScanError::ModelError(format!("Encoder loading task failed: {}", e))),
    }
}

/// A failed warm-up becomes the scan's failure; the orchestrator would otherwise retry the load
async fn analyze_after_warm_up(
    warm_up: Result<()>,
    orchestrator: MatchOrchestrator<'static>,
    request: MatchRequest,
) -> Result<MatchOutcome> {
    if let Err(e) = warm_up {
        return Ok(MatchOutcome::Failure(MatchFailure::from(&e)));
    }

    tokio::task::spawn_blocking(move || orchestrator.run(&request))
        .await
        .map_err(|e| ScanError::AnalysisFailed(format!("Analysis task failed: {}", e)))
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed}] {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
