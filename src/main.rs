use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use rulecraft_core::config::RuleCraftConfig;
use rulecraft_core::{logging, serde_utils};
use rulecraft_rules::{
    evaluate, explain, load_rule, RuleApiBuilder, RuleServiceConfig, SessionRegistry,
};
use tracing::info;

mod output;

#[derive(Parser)]
#[command(name = "rulecraft")]
#[command(about = "Build, check and test boolean filtering rules over JSON documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that a rule file is well formed
    Validate {
        /// Rule file (JSON or YAML)
        rule: PathBuf,
    },
    /// Evaluate a rule against sample documents
    Eval(EvalArgs),
    /// Print a rule file as canonical JSON
    Fmt {
        /// Rule file (JSON or YAML)
        rule: PathBuf,
    },
    /// Serve the editing and evaluation HTTP API
    Serve {
        /// Address to bind, overrides RULECRAFT_HTTP_BIND
        #[arg(long)]
        bind: Option<String>,
    },
}

#[derive(Args)]
struct EvalArgs {
    /// Rule file (JSON or YAML)
    rule: PathBuf,
    /// JSON files holding the documents to test
    #[arg(required = true)]
    documents: Vec<PathBuf>,
    /// Treat a top-level array as a list of documents
    #[arg(long, default_value_t = false)]
    each: bool,
    /// Print the result of every visited node
    #[arg(long, default_value_t = false)]
    explain: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = RuleCraftConfig::from_env().context("failed to load configuration")?;
    if let Err(err) = logging::init_tracing(config.log_level.as_deref().or(Some("warn"))) {
        eprintln!("failed to initialise tracing: {err}");
    }

    match cli.command {
        Commands::Validate { rule } => {
            let node = load_rule(&rule)?;
            output::print_valid(&rule, &node);
        }
        Commands::Eval(args) => run_eval(args)?,
        Commands::Fmt { rule } => {
            let node = load_rule(&rule)?;
            println!("{}", serde_utils::to_pretty_json(&node)?);
        }
        Commands::Serve { bind } => run_server(config, bind).await?,
    }

    Ok(())
}

fn run_eval(args: EvalArgs) -> anyhow::Result<()> {
    let rule = load_rule(&args.rule)?;
    let mut matched = 0usize;
    let mut total = 0usize;

    for path in &args.documents {
        let documents = serde_utils::read_documents(path, args.each)
            .with_context(|| format!("failed to read documents from {}", path.display()))?;
        for (index, document) in documents.iter().enumerate() {
            let label = if documents.len() > 1 {
                format!("{}[{}]", path.display(), index)
            } else {
                path.display().to_string()
            };
            let result = evaluate(&rule, document);
            output::print_result(&label, result);
            if args.explain {
                output::print_trace(&explain(&rule, document));
            }
            total += 1;
            matched += usize::from(result);
        }
    }

    output::print_summary(matched, total);
    Ok(())
}

async fn run_server(config: RuleCraftConfig, bind: Option<String>) -> anyhow::Result<()> {
    let catalog = config.load_catalog()?;
    let registry = SessionRegistry::new(catalog, config.history_depth);
    let mut service_config = RuleServiceConfig::from(&config);
    if let Some(bind) = bind {
        service_config.bind_address = bind;
    }

    let shutdown = RuleApiBuilder::new(registry).serve(service_config).await?;
    tokio::signal::ctrl_c().await?;
    info!("shutting down rule service");
    let _ = shutdown.send(());
    Ok(())
}
