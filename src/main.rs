//! Proposal Agency CLI
//!
//! Generates client proposals from a JSON brief or a bundled example,
//! or serves the pipeline over HTTP.

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use proposal_agency::mcp::Payload;
use proposal_agency::orchestrator::{
    demo_project, example_project, GenerationHistory, HistoryEntry, ProposalOrchestrator, BUDGET_RANGES,
    EXAMPLE_NAMES,
};
use proposal_agency::proposal::FinalProposal;
use proposal_agency::server::{run_server, AppState};
use proposal_agency::utils::init_tracing;
use proposal_agency::{ProjectBrief, ProposalConfig};

#[derive(Parser)]
#[command(name = "proposal_agency")]
#[command(about = "Automated proposal and pricing agents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a proposal from a JSON brief
    Generate {
        /// Path to the project brief
        #[arg(short, long)]
        brief: PathBuf,

        /// Directory for the generated files
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },

    /// Generate a proposal for the demo project or a named example
    Demo {
        /// Example name (ecommerce, enterprise, mobile); the full demo when omitted
        #[arg(short, long)]
        example: Option<String>,

        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },

    /// List the bundled example briefs and budget ranges
    Examples,

    /// Show recent generation runs
    History {
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Start the HTTP server
    Serve {
        /// Server port (defaults to PROPOSAL_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing()?;

    let cli = Cli::parse();
    let config = ProposalConfig::from_env()?;

    match cli.command {
        Commands::Generate { brief, out } => {
            let json = tokio::fs::read_to_string(&brief)
                .await
                .with_context(|| format!("Failed to read brief {:?}", brief))?;
            let brief: ProjectBrief = serde_json::from_str(&json).context("Failed to parse project brief")?;
            if let Err(missing) = brief.validate() {
                bail!("Please fill in all required fields: {}", missing.join(", "));
            }
            generate(&config, brief, &out).await
        }
        Commands::Demo { example, out } => {
            let brief = match example.as_deref() {
                None | Some("demo") => demo_project(),
                Some(name) => example_project(name).with_context(|| {
                    format!("Unknown example '{}' (available: {})", name, EXAMPLE_NAMES.join(", "))
                })?,
            };
            generate(&config, brief, &out).await
        }
        Commands::Examples => {
            println!("📋 Examples: demo, {}", EXAMPLE_NAMES.join(", "));
            println!("💵 Budget ranges:");
            for range in BUDGET_RANGES {
                println!("   - {}", range);
            }
            Ok(())
        }
        Commands::History { limit } => {
            let history = GenerationHistory::persistent(&config.history_path).await?;
            let entries = history.recent(limit).await;
            if entries.is_empty() {
                println!("No proposals generated yet.");
            }
            for entry in entries {
                let status = if entry.success { "✅" } else { "❌" };
                println!(
                    "{} {} - {} ({})",
                    status,
                    entry.client_name,
                    entry.project_title,
                    entry.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M")
                );
            }
            Ok(())
        }
        Commands::Serve { port } => {
            let orchestrator = ProposalOrchestrator::from_config(&config).await?;
            let state = AppState {
                orchestrator: Arc::new(orchestrator),
                history: Arc::new(GenerationHistory::in_memory()),
            };
            run_server(state, port.unwrap_or(config.port)).await
        }
    }
}

async fn generate(config: &ProposalConfig, brief: ProjectBrief, out: &Path) -> Result<()> {
    println!("🤖 Initializing AI agents...");
    let orchestrator = ProposalOrchestrator::from_config(config).await?;
    let history = GenerationHistory::persistent(&config.history_path).await?;

    let result = orchestrator.generate_complete_proposal(brief).await;
    history.record_or_warn(HistoryEntry::from_result(&result)).await;

    match result.into_payload() {
        Payload::ProposalCompleted(done) => {
            print_summary(&done);
            let (document_path, data_path) = done.save(out).await?;
            println!("💾 Saved {}", document_path.display());
            println!("💾 Saved {}", data_path.display());
            Ok(())
        }
        Payload::GenerationError(failed) => bail!("Generation failed: {}", failed.error),
        other => bail!("Unexpected result type {}", other.message_type()),
    }
}

fn print_summary(done: &FinalProposal) {
    let pricing = &done.proposal.pricing;
    println!("\n🎉 Proposal generated successfully!");
    println!("{}", "═".repeat(60));
    if pricing.discount_amount > 0.0 {
        println!(
            "💰 Total cost:        ${:.2} ({:.1}% discount)",
            pricing.total,
            pricing.discount_percent_of_base()
        );
    } else {
        println!("💰 Total cost:        ${:.2} (no discount applied)", pricing.total);
    }
    println!("📝 Proposal sections: {}", done.proposal.sections.iter().count());
    println!("🔍 Relevant cases:    {}", done.proposal.relevant_cases.len());
    println!("📄 Document:          {}", done.document.format);
    for note in &done.stage_notes {
        println!("⚠️  {}", note);
    }
    println!("{}", "═".repeat(60));
}
