//! nacforge CLI - 802.1X / MAB switch configuration wizard
//!
//! This tool manages nacforge.toml deployment files, collects answers to
//! the deployment wizard, renders vendor configuration and scores it
//! against best-practice rules.

use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

mod config;
mod error;
mod output;
mod wizard;

use nacforge::observability::{self, LogConfig};
use nacforge::schema::{Answers, Schema};
use nacforge::snapshot::SnapshotStore;
use nacforge::{compliance, generator, vendor, ConfigGenerator, DeploymentSettings, Template};

use config::ProjectConfig;
use error::{CliError, Result};

/// nacforge - Network access control configuration generator
#[derive(Parser)]
#[command(name = "nacforge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to nacforge.toml configuration file
    #[arg(short, long, default_value = "nacforge.toml", global = true, env = "NACFORGE_CONFIG")]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new nacforge.toml
    Init {
        /// Switch vendor
        #[arg(long, default_value = "cisco")]
        vendor: String,

        /// Switch platform
        #[arg(long, default_value = "ios-xe")]
        platform: String,

        /// Overwrite existing configuration
        #[arg(long)]
        force: bool,
    },

    /// List supported vendors, platforms and their capabilities
    Vendors {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the deployment wizard questions
    Questions {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Answer the deployment wizard and produce a configuration file
    Wizard {
        /// Read answers from a TOML or JSON file instead of prompting
        #[arg(short, long)]
        answers: Option<PathBuf>,

        /// Write the result to the configuration file instead of printing it
        #[arg(long)]
        write: bool,

        /// Overwrite an existing configuration file with --write
        #[arg(long)]
        force: bool,
    },

    /// Generate switch configuration
    Generate {
        /// Custom template to render instead of the platform's own
        #[arg(short, long)]
        template: Option<PathBuf>,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Don't write files, print the configuration instead
        #[arg(long)]
        dry_run: bool,

        /// Also save the result as a named snapshot
        #[arg(long)]
        snapshot: Option<String>,

        /// Snapshot description
        #[arg(long, requires = "snapshot")]
        description: Option<String>,
    },

    /// Score the configuration against best-practice rules
    Score {
        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Treat warnings as errors
        #[arg(short, long)]
        strict: bool,

        /// Fail when the score is below this value
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=100))]
        min_score: Option<u32>,
    },

    /// Check for drift between config and the generated file
    Check {
        /// Output directory to check
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Custom template the file was generated with
        #[arg(short, long)]
        template: Option<PathBuf>,
    },

    /// Manage saved snapshots
    Snapshot {
        #[command(subcommand)]
        action: SnapshotAction,
    },
}

#[derive(Subcommand)]
enum SnapshotAction {
    /// List saved snapshots
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a snapshot and its configuration
    Show {
        /// Snapshot id or unique prefix
        id: String,
    },

    /// Delete a snapshot
    Delete {
        /// Snapshot id or unique prefix
        id: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut log_config = LogConfig::from_env();
    if cli.verbose {
        log_config = log_config.verbose();
    }
    if let Err(e) = observability::init(log_config) {
        output::warning(&e.to_string());
    }

    let result = match cli.command {
        Commands::Init {
            vendor,
            platform,
            force,
        } => cmd_init(&cli.config, &vendor, &platform, force),

        Commands::Vendors { json } => cmd_vendors(json),

        Commands::Questions { json } => cmd_questions(json),

        Commands::Wizard {
            answers,
            write,
            force,
        } => cmd_wizard(
            &cli.config,
            answers.as_deref(),
            write,
            force,
            &mut io::stdout().lock(),
        ),

        Commands::Generate {
            template,
            output,
            dry_run,
            snapshot,
            description,
        } => cmd_generate(
            &cli.config,
            template.as_deref(),
            output,
            dry_run,
            snapshot,
            description.as_deref().unwrap_or_default(),
            &mut io::stdout().lock(),
        ),

        Commands::Score {
            json,
            strict,
            min_score,
        } => cmd_score(&cli.config, json, strict, min_score),

        Commands::Check { output, template } => cmd_check(&cli.config, output, template.as_deref()),

        Commands::Snapshot { action } => cmd_snapshot(&cli.config, action),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// Command Implementations
// =============================================================================

fn cmd_init(config_path: &Path, vendor_id: &str, platform_id: &str, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        return Err(CliError::AlreadyExists {
            path: config_path.to_path_buf(),
        });
    }

    let (vendor, platform) = resolve_platform(vendor_id, platform_id)?;
    let settings = DeploymentSettings {
        vendor: vendor.id.to_string(),
        platform: platform.id.to_string(),
        ..DeploymentSettings::default()
    };
    let project = ProjectConfig::new(settings);

    let content = format!(
        "# nacforge deployment\n\
         # Platform: {}\n\
         # Fill in the [radius] servers and shared_secret, then run 'nacforge score'.\n\n{}",
        platform.name,
        project.to_toml()?
    );
    write_file(config_path, &content)?;

    output::success(&format!("Created {}", config_path.display()));
    output::info(&format!("Platform: {}", platform.name));
    output::info("Run 'nacforge wizard --write' to answer the questions interactively");

    Ok(())
}

fn cmd_vendors(json: bool) -> Result<()> {
    if json {
        output::print_json(&vendor::catalog())?;
    } else {
        output::print_catalog(vendor::catalog());
    }
    Ok(())
}

fn cmd_questions(json: bool) -> Result<()> {
    let schema = Schema::deployment();
    if json {
        output::print_json(&schema)?;
    } else {
        output::print_schema(&schema);
    }
    Ok(())
}

/// Without `--write` the TOML is the only thing written to `out`
fn cmd_wizard(
    config_path: &Path,
    answers_file: Option<&Path>,
    write: bool,
    force: bool,
    out: &mut impl Write,
) -> Result<()> {
    if write && config_path.exists() && !force {
        return Err(CliError::AlreadyExists {
            path: config_path.to_path_buf(),
        });
    }

    let schema = Schema::deployment();
    let answers = match answers_file {
        Some(path) => load_answers(path)?,
        None => wizard::prompt(&schema, io::stdin().lock(), io::stderr())?,
    };

    let settings = schema.collect(&answers).map_err(|e| {
        for field in e.field_errors() {
            output::error(&field.to_string());
        }
        e
    })?;

    tracing::debug!(vendor = %settings.vendor, platform = %settings.platform, "answers collected");
    let project = ProjectConfig::new(settings);
    let content = project.to_toml()?;

    if write {
        write_file(config_path, &content)?;
        output::success(&format!("Wrote {}", config_path.display()));
        if answers_file.is_none() {
            output::subheader("Answers:");
            for (id, value) in wizard::masked(&schema, &answers) {
                println!("  {} = {}", id, value);
            }
        }
    } else {
        write!(out, "{}", content)?;
    }

    let report = compliance::evaluate(&project.settings);
    let summary = format!(
        "Compliance score {}/{} ({}); run 'nacforge score' for details",
        report.score,
        compliance::ComplianceReport::MAX_SCORE,
        report.grade()
    );
    if write {
        output::info(&summary);
    } else {
        output::note(&summary);
    }

    Ok(())
}

fn cmd_generate(
    config_path: &Path,
    template: Option<&Path>,
    output: Option<PathBuf>,
    dry_run: bool,
    snapshot: Option<String>,
    description: &str,
    out: &mut impl Write,
) -> Result<()> {
    let project = ProjectConfig::from_file(config_path)?;
    let output_dir = output.unwrap_or_else(|| project.output_dir(config_path));

    let mut generator = ConfigGenerator::new(project.settings.clone());
    if let Some(path) = template {
        generator = generator.template(load_template(path)?);
    }
    let config = generator.generate()?;

    for warning in &config.warnings {
        output::warning(warning);
    }

    if dry_run {
        write!(out, "{}", config.content)?;
    } else {
        let path = config.write(&output_dir)?;
        output::success(&format!("Generated {}", path.display()));
        output::info(&format!("SHA-256 {}", config.hash));
    }

    if let Some(name) = snapshot {
        let mut store = SnapshotStore::open(project.snapshot_path(config_path))?;
        let id = store.save(name, description, &config).short_id();
        store.persist()?;
        let saved = format!("Saved snapshot {}", id);
        if dry_run {
            output::note(&saved);
        } else {
            output::success(&saved);
        }
    }

    Ok(())
}

fn cmd_score(config_path: &Path, json: bool, strict: bool, min_score: Option<u32>) -> Result<()> {
    let project = ProjectConfig::from_file(config_path)?;
    let report = compliance::evaluate(&project.settings);

    if json {
        println!("{}", report.to_json()?);
    } else {
        output::print_report(&report);
    }

    let issues = report.issues().count();
    if issues > 0 {
        return Err(CliError::ComplianceFailed { count: issues });
    }

    let warnings = report.warnings().count();
    if strict && warnings > 0 {
        return Err(CliError::StrictWarnings { count: warnings });
    }

    if let Some(minimum) = min_score {
        if report.score < minimum {
            return Err(CliError::ScoreBelowMinimum {
                score: report.score,
                minimum,
            });
        }
    }

    Ok(())
}

fn cmd_check(config_path: &Path, output: Option<PathBuf>, template: Option<&Path>) -> Result<()> {
    let project = ProjectConfig::from_file(config_path)?;
    let output_dir = output.unwrap_or_else(|| project.output_dir(config_path));
    let (vendor, platform) =
        resolve_platform(&project.settings.vendor, &project.settings.platform)?;

    output::info(&format!("Checking drift against {}...", output_dir.display()));

    let Some((path, date)) = generator::latest_in(&output_dir, vendor.id, platform.id)? else {
        return Err(CliError::NotGenerated {
            vendor: vendor.id.to_string(),
            platform: platform.id.to_string(),
            dir: output_dir,
        });
    };

    let mut generator = ConfigGenerator::new(project.settings).date(date);
    if let Some(path) = template {
        generator = generator.template(load_template(path)?);
    }
    let config = generator.generate()?;
    if config.matches_disk(&output_dir)? {
        output::success(&format!("{} is in sync with the configuration", path.display()));
        Ok(())
    } else {
        output::info("Run 'nacforge generate' to regenerate");
        Err(CliError::DriftDetected { path })
    }
}

fn cmd_snapshot(config_path: &Path, action: SnapshotAction) -> Result<()> {
    let store_path = match ProjectConfig::from_file(config_path) {
        Ok(project) => project.snapshot_path(config_path),
        Err(CliError::ConfigNotFound { .. }) => ProjectConfig::default().snapshot_path(config_path),
        Err(e) => return Err(e),
    };
    let mut store = SnapshotStore::open(&store_path)?;

    match action {
        SnapshotAction::List { json } => {
            if json {
                output::print_json(&store.list())?;
            } else {
                output::print_snapshots(store.list());
            }
        }
        SnapshotAction::Show { id } => output::print_snapshot(store.get(&id)?),
        SnapshotAction::Delete { id } => {
            let removed = store.remove(&id)?;
            store.persist()?;
            output::success(&format!("Deleted snapshot {} ({})", removed.short_id(), removed.name));
        }
    }

    Ok(())
}

// =============================================================================
// Helpers
// =============================================================================

fn resolve_platform(
    vendor_id: &str,
    platform_id: &str,
) -> Result<(&'static vendor::Vendor, &'static vendor::Platform)> {
    vendor::find(vendor_id, platform_id).ok_or_else(|| {
        let known: Vec<_> = vendor::catalog()
            .iter()
            .flat_map(|v| v.platforms.iter().map(move |p| format!("{}/{}", v.id, p.id)))
            .collect();
        CliError::invalid(
            "platform",
            format!(
                "unknown platform {}/{} (expected one of: {})",
                vendor_id,
                platform_id,
                known.join(", ")
            ),
        )
    })
}

fn load_template(path: &Path) -> Result<Template> {
    let source = std::fs::read_to_string(path).map_err(|e| CliError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(Template::parse(&source)?)
}

fn load_answers(path: &Path) -> Result<Answers> {
    let content = std::fs::read_to_string(path).map_err(|e| CliError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let answers = if is_json {
        Answers::from_json(&content)?
    } else {
        Answers::from_toml(&content)?
    };
    Ok(answers)
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| CliError::FileWrite {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    std::fs::write(path, content).map_err(|e| CliError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}
