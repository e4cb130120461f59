use clap::{Parser, Subcommand, ValueEnum};
use pipeline_config_lint::Result;
use pipeline_config_lint::docs::{
    self, ComponentKind, LintLevel, Provider, SanitiseConfig, get_inference_candidate,
    sanitise_component_config,
};
use pipeline_config_lint::document::{Document, lint_document};

use anyhow::{Context, bail};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pipeline-config-lint")]
#[command(about = "Lint and sanitise pipeline component configs", long_about = None)]
struct Cli {
    /// Log filter, e.g. `debug` or `pipeline_config_lint=trace`. Overridden by RUST_LOG.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

#[derive(Clone, Copy, ValueEnum)]
enum LintFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Lint pipeline documents. Exits non-zero when any error is found.
    Lint {
        #[arg(required = true)]
        files: Vec<String>,

        #[arg(long, value_enum, default_value = "text")]
        format: LintFormat,
    },
    /// Reduce a single component config to the fields relevant to its type.
    Sanitise {
        #[arg(long)]
        kind: ComponentKind,

        #[arg(long)]
        remove_type_field: bool,

        #[arg(long)]
        remove_deprecated: bool,

        #[arg(long)]
        for_example: bool,

        #[arg(long, value_enum, default_value = "yaml")]
        output: OutputFormat,

        file: String,
    },
    /// Print the type a single component config resolves to.
    Infer {
        #[arg(long)]
        kind: ComponentKind,

        #[arg(long, default_value = "")]
        default: String,

        file: String,
    },
    /// List registered components.
    List {
        #[arg(long)]
        kind: Option<ComponentKind>,
    },
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    match cli.cmd {
        Commands::Lint { files, format } => {
            let mut errors = 0;
            let mut report = serde_json::Map::new();
            for path in &files {
                let doc = Document::load(path)?;
                let lints = lint_document(&doc.source, &doc.value, docs::registry::global());
                errors += lints.iter().filter(|l| l.level == LintLevel::Error).count();
                match format {
                    LintFormat::Text => {
                        for lint in &lints {
                            println!(
                                "{}:{}:{}: {}: {}",
                                path, lint.line, lint.column, lint.level, lint.what
                            );
                        }
                    }
                    LintFormat::Json => {
                        report.insert(path.clone(), serde_json::to_value(&lints)?);
                    }
                }
            }
            if let LintFormat::Json = format {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            if errors > 0 {
                bail!("{} lint error(s) found", errors);
            }
        }
        Commands::Sanitise {
            kind,
            remove_type_field,
            remove_deprecated,
            for_example,
            output,
            file,
        } => {
            let mut doc = Document::load(&file)?;
            let conf = SanitiseConfig {
                remove_type_field,
                remove_deprecated,
                for_example,
                ..SanitiseConfig::default()
            };
            sanitise_component_config(kind, &mut doc.value, &conf)
                .with_context(|| format!("sanitise {} config {}", kind, file))?;
            match output {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&doc.value)?),
                OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&doc.value)?),
            }
        }
        Commands::Infer { kind, default, file } => {
            let doc = Document::load(&file)?;
            let (name, spec) =
                get_inference_candidate(docs::registry::global(), kind, &default, &doc.value)
                    .with_context(|| format!("infer {} type of {}", kind, file))?;
            println!("{} ({}, {})", name, spec.kind, spec.status);
        }
        Commands::List { kind } => {
            let registry = docs::registry::global();
            registry.refresh_plugins();
            let kinds = match kind {
                Some(k) => vec![k],
                None => ComponentKind::ALL.to_vec(),
            };
            for k in kinds {
                for spec in registry.components(k) {
                    let plugin = if spec.plugin { " [plugin]" } else { "" };
                    println!(
                        "{:<10} {:<14} {:<12} {}{}",
                        k, spec.name, spec.status, spec.summary, plugin
                    );
                }
            }
        }
    }

    Ok(())
}
