//! Roundtable - multi-persona discussion simulator
//!
//! Entry point for the `roundtable` binary: runs simulated discussions,
//! analyzes recorded ones, and manages catalogs and configuration.

mod cli;

use std::fs;
use std::path::Path;

use clap::Parser;
use serde::Serialize;
use tracing::{debug, info};

use roundtable::config::{self, RoundtableConfig};
use roundtable::discussion::{TurnEngine, TurnOutcome, TurnRecord, MODERATOR};
use roundtable::engine::{analyze_flow, get_insights, ConversationInsights, FlowAnalysis, MessageHistoryItem};
use roundtable::error::{Error, Result};
use roundtable::generator::ScriptedGenerator;
use roundtable::logging::{self, LogGuards};
use roundtable::persona::{list_roles, PersonaCatalog};
use roundtable::triggers::TriggerTable;

use crate::cli::{CatalogArgs, CatalogSubcommand, Cli, Commands, ConfigSubcommand};

fn main() {
    // Parse CLI arguments first (before logging, so we know verbosity)
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprint!("{}", e.format_for_terminal());
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Version => {
            print_version();
            Ok(())
        }
        Commands::Config { subcommand } => {
            logging::init_simple(tracing::Level::WARN)?;
            handle_config_command(subcommand)
        }
        Commands::Catalog { subcommand } => {
            logging::init_simple(if cli.verbose > 0 {
                tracing::Level::DEBUG
            } else {
                tracing::Level::WARN
            })?;
            handle_catalog_command(subcommand)
        }
        Commands::Simulate {
            topic,
            turns,
            seed,
            config,
            catalog,
            json,
        } => {
            let mut cfg = RoundtableConfig::load(config.as_deref())?;
            apply_catalog_args(&mut cfg, &catalog);
            if seed.is_some() {
                cfg.engine.seed = seed;
            }
            let _log_guards = init_logging_from_config(&cfg, cli.verbose, cli.quiet)?;

            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|e| Error::Internal(format!("Failed to create runtime: {}", e)))?;
            rt.block_on(run_simulation(cfg, topic, turns, json))
        }
        Commands::Analyze { history, config, json } => {
            let cfg = RoundtableConfig::load(config.as_deref())?;
            let _log_guards = init_logging_from_config(&cfg, cli.verbose, cli.quiet)?;
            run_analysis(&cfg, Path::new(&history), json)
        }
    }
}

/// Initialize logging from configuration
fn init_logging_from_config(config: &RoundtableConfig, verbose: u8, quiet: bool) -> Result<LogGuards> {
    logging::init_logging(&config.logging, verbose, quiet)
}

fn print_version() {
    println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
}

// ─────────────────────────────────────────────────────────────────
// Catalog Loading
// ─────────────────────────────────────────────────────────────────

fn apply_catalog_args(config: &mut RoundtableConfig, args: &CatalogArgs) {
    if let Some(ref path) = args.personas {
        config.catalog.personas_file = Some(config::expand_path(path));
    }
    if let Some(ref path) = args.triggers {
        config.catalog.triggers_file = Some(config::expand_path(path));
    }
}

fn load_catalog(config: &RoundtableConfig) -> Result<PersonaCatalog> {
    match config.personas_path() {
        Some(path) => PersonaCatalog::load(path),
        None => PersonaCatalog::bundled(),
    }
}

fn load_triggers(config: &RoundtableConfig) -> Result<TriggerTable> {
    match config.triggers_path() {
        Some(path) => TriggerTable::load(path),
        None => TriggerTable::bundled(),
    }
}

fn build_engine(config: &RoundtableConfig) -> Result<TurnEngine> {
    let catalog = load_catalog(config)?;
    let triggers = load_triggers(config)?;
    Ok(TurnEngine::new(catalog, triggers, config.clone()))
}

// ─────────────────────────────────────────────────────────────────
// Simulate
// ─────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct SimulationReport<'a> {
    discussion_id: String,
    topic: &'a str,
    seed: Option<u64>,
    turns: Vec<TurnOutcome>,
    history: &'a [MessageHistoryItem],
    flow: FlowAnalysis,
    insights: ConversationInsights,
}

async fn run_simulation(config: RoundtableConfig, topic: String, turns: u32, json: bool) -> Result<()> {
    let engine = build_engine(&config)?;
    let generator = ScriptedGenerator::new();
    let mut discussion = engine.start(topic);

    info!(
        discussion = %discussion.id(),
        topic = %discussion.topic(),
        personas = engine.catalog().len(),
        turns,
        seed = ?config.engine.seed,
        "Starting simulation"
    );

    if !json {
        println!("Topic: {}", discussion.topic());
        println!();
    }

    let mut outcomes = Vec::with_capacity(turns as usize);
    for _ in 0..turns {
        let outcome = engine.run_turn(&mut discussion, &generator).await?;
        match outcome {
            TurnOutcome::Spoke(ref record) => {
                if !json {
                    print_turn(record);
                }
            }
            TurnOutcome::Silent { .. } => {
                let prompt = engine.moderator_prompt(&discussion);
                debug!(prompt = %prompt, "Inserting moderator prompt");
                if !json {
                    println!("      [{}] {}", MODERATOR, prompt);
                }
                discussion.record_message(MODERATOR, prompt);
            }
        }
        outcomes.push(outcome);
    }

    let flow = analyze_flow(discussion.history(), discussion.last_scores());
    let insights = get_insights(discussion.history(), discussion.state());

    if json {
        let report = SimulationReport {
            discussion_id: discussion.id().to_string(),
            topic: discussion.topic(),
            seed: config.engine.seed,
            turns: outcomes,
            history: discussion.history(),
            flow,
            insights,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!();
        print_flow(&flow);
        print_insights(&insights);
    }

    Ok(())
}

fn print_turn(record: &TurnRecord) {
    println!(
        "{:>4}. {} ({}): {}",
        record.turn, record.persona_name, record.act, record.content
    );
}

// ─────────────────────────────────────────────────────────────────
// Analyze
// ─────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct AnalysisReport {
    flow: FlowAnalysis,
    insights: ConversationInsights,
}

fn run_analysis(config: &RoundtableConfig, path: &Path, json: bool) -> Result<()> {
    let content = fs::read_to_string(path).map_err(|e| Error::IoRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let history: Vec<MessageHistoryItem> = serde_json::from_str(&content)?;
    info!(path = %path.display(), messages = history.len(), "History loaded");

    let engine = build_engine(config)?;
    let state = engine.replay_state(&history);

    let report = AnalysisReport {
        flow: analyze_flow(&history, &[]),
        insights: get_insights(&history, &state),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_flow(&report.flow);
        print_insights(&report.insights);
    }
    Ok(())
}

fn print_flow(flow: &FlowAnalysis) {
    println!("Flow:");
    println!("  Quality:       {:.2}", flow.flow_quality);
    println!("  Diversity:     {:.2}", flow.diversity_score);
    println!("  Back-to-back:  {}", flow.back_to_back_count);
    println!("  Domination:    {:.2}", flow.domination_score);
    for suggestion in &flow.suggestions {
        println!("  - {}", suggestion);
    }
}

fn print_insights(insights: &ConversationInsights) {
    println!("Insights:");
    println!("  Messages:      {}", insights.total_messages);
    println!("  Participants:  {}", insights.unique_participants);
    println!("  Avg length:    {:.1} chars", insights.average_message_length);
    println!("  Tone:          {}", insights.emotional_tone);
    println!("  Energy:        {:.2}", insights.conversation_energy);
    println!("  Stability:     {}", insights.topic_stability);
    if let Some(ref trending) = insights.trending_persona {
        println!("  Trending:      {}", trending);
    }
    for share in &insights.top_contributors {
        println!("  {:<14} {:>3} ({:.0}%)", share.persona_id, share.messages, share.percentage);
    }
}

// ─────────────────────────────────────────────────────────────────
// Catalog & Config Commands
// ─────────────────────────────────────────────────────────────────

fn handle_catalog_command(subcommand: CatalogSubcommand) -> Result<()> {
    match subcommand {
        CatalogSubcommand::List { catalog } => {
            let mut cfg = RoundtableConfig::default();
            apply_catalog_args(&mut cfg, &catalog);
            let personas = load_catalog(&cfg)?;

            for p in personas.personas() {
                println!(
                    "{:<10} {:<12} {:<12} {:<13} {:<7} {:.2}  {}",
                    p.id,
                    p.display_name(),
                    p.role.slug(),
                    p.tone.as_str(),
                    p.energy_level.as_str(),
                    p.empathy_level,
                    p.expertise.join(", ")
                );
            }
        }
        CatalogSubcommand::Validate { catalog } => {
            let mut cfg = RoundtableConfig::default();
            apply_catalog_args(&mut cfg, &catalog);
            let personas = load_catalog(&cfg)?;
            let triggers = load_triggers(&cfg)?;

            let missing = personas.missing_trigger_roles(&triggers);
            for role in &missing {
                println!("warning: no trigger entry for role '{}', using defaults", role);
            }
            println!("Catalog is valid: {} personas.", personas.len());
        }
        CatalogSubcommand::Roles => {
            for listing in list_roles() {
                println!("{:<12} {}", listing.role.slug(), listing.description);
            }
        }
    }

    Ok(())
}

/// Handle configuration subcommands
fn handle_config_command(subcommand: ConfigSubcommand) -> Result<()> {
    match subcommand {
        ConfigSubcommand::Show { config } => {
            let cfg = RoundtableConfig::load(config.as_deref())?;
            println!("{}", toml::to_string_pretty(&cfg)?);
        }
        ConfigSubcommand::Init { path, force } => {
            let written = config::init_config(path.as_deref(), force)?;
            println!("Configuration written to {}", written.display());
        }
        ConfigSubcommand::Validate { config } => {
            RoundtableConfig::load(config.as_deref())?;
            println!("Configuration is valid.");
        }
    }

    Ok(())
}
