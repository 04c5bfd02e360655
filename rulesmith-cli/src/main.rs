use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

// Import from rulesmith-core
use rulesmith_core::{
    compile_patterns, ConfiguratorSettings, LocalProject, PassOutcome, PluginConfiguration,
    ProjectConfigurator, ProjectHost,
};

// Import CLI utilities
use rulesmith::RemoteRuleSets;

#[derive(Parser)]
#[command(name = "rulesmith")]
#[command(about = "Translate maven-pmd-plugin configuration into a project PMD rule set")]
struct Cli {
    /// Path to configurator settings file (YAML format)
    #[arg(short, long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve rule sets, compile path filters and write the project rule set
    Configure {
        /// Project directory
        #[arg(short, long, default_value = ".")]
        project: PathBuf,

        /// Plugin configuration file (YAML format)
        #[arg(short = 'P', long)]
        plugin: PathBuf,

        /// Extra directory searched for rule set files (repeatable)
        #[arg(long = "search-path")]
        search_paths: Vec<PathBuf>,

        /// Only use cached copies of remote rule sets
        #[arg(long)]
        offline: bool,

        /// Download remote rule sets even when cached
        #[arg(long)]
        refresh: bool,
    },

    /// Disable analysis and remove the generated files
    Unconfigure {
        /// Project directory
        #[arg(short, long, default_value = ".")]
        project: PathBuf,
    },

    /// Print the include/exclude filters a plugin configuration compiles to
    Patterns {
        /// Plugin configuration file (YAML format)
        #[arg(short = 'P', long)]
        plugin: PathBuf,

        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Configure {
            project,
            plugin,
            search_paths,
            offline,
            refresh,
        } => {
            let mut settings = load_settings(cli.settings.as_deref());
            settings.search_paths.extend(search_paths);
            configure(settings, &project, &plugin, offline, refresh)
        }
        Command::Unconfigure { project } => {
            let settings = load_settings(cli.settings.as_deref());
            unconfigure(settings, &project)
        }
        Command::Patterns { plugin, format } => patterns(&plugin, format),
    }
}

fn load_settings(path: Option<&Path>) -> ConfiguratorSettings {
    let settings = ConfiguratorSettings::load_with_fallback(path);
    if let Some(path) = path {
        println!("📋 Loaded settings from: {}", path.display());
    } else {
        println!("📋 Using default settings");
    }
    settings
}

fn configure(
    settings: ConfiguratorSettings,
    project_dir: &Path,
    plugin: &Path,
    offline: bool,
    refresh: bool,
) -> Result<()> {
    println!("🦀 Rulesmith PMD configurator");

    let plugin = PluginConfiguration::load_from_file(plugin)?;
    let execution = plugin.single_execution()?;
    let mut project = LocalProject::open(project_dir)?;

    println!("📄 Project: {}", project.root().display());
    println!("   - Execution: {}", execution.id);
    println!("   - Rule sets: {}", execution.rulesets.len());

    let remote = RemoteRuleSets::new()?.offline(offline).refresh(refresh);
    let configurator = ProjectConfigurator::new(settings).with_opener(remote.into_opener());
    let analysis_nature = configurator.settings().analysis_nature.clone();

    match configurator.configure(&mut project, execution)? {
        PassOutcome::Applied { rule_set_file } => {
            println!("✅ Analysis configured");
            println!("💾 Rule set saved to: {}", rule_set_file.display());
            if project.has_nature(&analysis_nature) {
                println!("🏷️  Nature enabled: {analysis_nature}");
            }
        }
        PassOutcome::Degraded {
            rule_set_file,
            error,
        } => {
            eprintln!("❌ Rule set file may be incomplete: {}", rule_set_file.display());
            eprintln!("   {error}");
            std::process::exit(1);
        }
        PassOutcome::SkippedDueToError { reason } => {
            println!("⚠️  {reason}");
            println!("   Project left unchanged.");
        }
        PassOutcome::RolledBack { reason } => {
            eprintln!("❌ Project properties could not be stored: {reason}");
            eprintln!("   Analysis configuration removed.");
            std::process::exit(1);
        }
    }

    Ok(())
}

fn unconfigure(settings: ConfiguratorSettings, project_dir: &Path) -> Result<()> {
    let mut project = LocalProject::open(project_dir)?;
    ProjectConfigurator::new(settings).unconfigure(&mut project)?;
    println!("🧹 Analysis configuration removed from: {}", project.root().display());
    Ok(())
}

fn patterns(plugin: &Path, format: OutputFormat) -> Result<()> {
    let plugin = PluginConfiguration::load_from_file(plugin)?;
    let execution = plugin.single_execution()?;
    let compiled = compile_patterns(&execution.pattern_inputs());

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "execution": execution.id,
                "excludes": compiled.excludes,
                "includes": compiled.includes,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            println!("🚫 Exclude patterns ({}):", compiled.excludes.len());
            for pattern in &compiled.excludes {
                println!("   {pattern}");
            }
            println!("✅ Include patterns ({}):", compiled.includes.len());
            for pattern in &compiled.includes {
                println!("   {pattern}");
            }
        }
    }

    Ok(())
}
