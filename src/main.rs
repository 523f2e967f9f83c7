//! Planlens CLI entrypoint.
//!
//! This is the main entrypoint for the planlens command-line tool.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use plan_lens::analyzer::PlanAnalyzer;
use plan_lens::cli::{Cli, Commands, ConfigCommands, OutputFormatter, SummaryOptions};
use plan_lens::config::{find_config_file, AnalysisConfig, ConfigParser, ConfigValidator};
use plan_lens::error::Result;
use plan_lens::plan::PlanLoader;

use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Name of the file written by `init`.
const INIT_CONFIG_FILE: &str = "planlens.yaml";

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse_args();

    // Initialize logging
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
///
/// Logs go to stderr so that reports on stdout stay machine-readable.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Dispatches the parsed command.
fn run(cli: Cli) -> Result<()> {
    let formatter = OutputFormatter::new(cli.output);

    match cli.command {
        Commands::Summarize {
            plan,
            details,
            show_unchanged,
            no_group,
        } => {
            let options = SummaryOptions {
                details,
                show_unchanged,
            };
            cmd_summarize(cli.config.as_deref(), &plan, options, no_group, &formatter)
        }
        Commands::Init { path, force } => cmd_init(&path, force),
        Commands::Config { command } => match command {
            ConfigCommands::Validate { warnings } => {
                cmd_config_validate(cli.config.as_deref(), warnings, &formatter)
            }
            ConfigCommands::Show => cmd_config_show(cli.config.as_deref(), &formatter),
        },
    }
}

/// Summarize a plan.
fn cmd_summarize(
    config_path: Option<&Path>,
    plan_path: &Path,
    options: SummaryOptions,
    no_group: bool,
    formatter: &OutputFormatter,
) -> Result<()> {
    let config = load_config(config_path)?;
    let plan = PlanLoader::new().load_file(plan_path)?;

    let analyzer = PlanAnalyzer::new(config);
    let report = analyzer.analyze(&plan);

    let groups = if no_group {
        Vec::new()
    } else {
        report.provider_groups(analyzer.grouper())
    };
    debug!(groups = groups.len(), "Rendering report");

    write_stdout(&formatter.format_report(&report, &groups, options))
}

/// Write a default configuration file.
fn cmd_init(path: &Path, force: bool) -> Result<()> {
    info!("Initializing planlens configuration in: {}", path.display());

    let config_path = path.join(INIT_CONFIG_FILE);
    if !force && config_path.exists() {
        eprintln!("Configuration file already exists: {}", config_path.display());
        eprintln!("Use --force to overwrite.");
        return Ok(());
    }

    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }

    let content = serde_yaml::to_string(&AnalysisConfig::default())
        .map_err(|e| plan_lens::error::PlanLensError::internal(e.to_string()))?;
    std::fs::write(&config_path, content)?;
    eprintln!("Created: {}", config_path.display());

    eprintln!("\nNext steps:");
    eprintln!("  1. List sensitive resource types and properties in {INIT_CONFIG_FILE}");
    eprintln!("  2. Run 'planlens config validate' to check it");
    eprintln!("  3. Run 'terraform show -json plan.out > plan.json'");
    eprintln!("  4. Run 'planlens summarize plan.json'");

    Ok(())
}

/// Validate configuration.
fn cmd_config_validate(
    config_path: Option<&Path>,
    show_warnings: bool,
    formatter: &OutputFormatter,
) -> Result<()> {
    let config = load_raw_config(config_path)?;
    let result = ConfigValidator::new().validate(&config)?;
    write_stdout(&formatter.format_validation(&result, show_warnings))
}

/// Print the effective configuration.
fn cmd_config_show(config_path: Option<&Path>, formatter: &OutputFormatter) -> Result<()> {
    let config = load_config(config_path)?;
    write_stdout(&formatter.format_config(&config))
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Resolves the configuration file path.
///
/// An explicit path wins; otherwise the search starts at the working
/// directory.
fn resolve_config_path(config_path: Option<&Path>) -> Option<PathBuf> {
    config_path.map_or_else(
        || {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            find_config_file(cwd)
        },
        |path| Some(path.to_path_buf()),
    )
}

/// Loads the configuration with environment overrides, without validating.
fn load_raw_config(config_path: Option<&Path>) -> Result<AnalysisConfig> {
    let Some(config_file) = resolve_config_path(config_path) else {
        let parser = ConfigParser::new();
        parser.load_dotenv()?;
        let mut config = AnalysisConfig::default();
        ConfigParser::apply_overrides(&mut config, |name| std::env::var(name).ok())?;
        return Ok(config);
    };
    debug!("Loading configuration from: {}", config_file.display());

    let parser = ConfigParser::new().with_base_path(
        config_file
            .parent()
            .unwrap_or_else(|| Path::new(".")),
    );
    parser.load_dotenv()?;
    parser.load_with_env(&config_file)
}

/// Loads and validates the configuration, logging any warnings.
fn load_config(config_path: Option<&Path>) -> Result<AnalysisConfig> {
    let config = load_raw_config(config_path)?;
    let result = ConfigValidator::new().validate(&config)?;
    for warning in &result.warnings {
        warn!("{warning}");
    }
    Ok(config)
}

/// Writes rendered output to stdout.
fn write_stdout(content: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(content.as_bytes())?;
    if !content.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;
    Ok(())
}
