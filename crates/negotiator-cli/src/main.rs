use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use negotiator_cache::SessionStore;
use negotiator_core::{AnalysisRequest, ConfigManager, EngagementLabel, LoggingConfig, NegotiatorConfig};
use negotiator_engine::{LeveragePlan, NegotiationEngine, StakeholderAnalysis};
use negotiator_mcp_tools::{NegotiationToolExecutor, NegotiationToolSchemas, ToolError};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use std::fs;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tabled::{Table, Tabled};
use tracing::{debug, info};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "negotiator")]
#[command(about = "Stakeholder salience analysis and influence planning for humanitarian negotiations", long_about = None)]
#[command(version)]
struct Cli {
    /// Output format (json, pretty, table)
    #[arg(short, long, global = true, default_value = "pretty")]
    output: OutputFormat,

    /// Configuration file
    #[arg(short, long, global = true, env = "NEGOTIATOR_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
    Table,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank stakeholders and map influence from a JSON request file
    Analyze {
        /// Session key the analysis is cached under
        #[arg(short, long, default_value = "cli")]
        session: String,

        /// JSON file holding {"context", "stakeholders"}
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Analyze a request file, then plan influence on one stakeholder
    Leverage {
        /// JSON file holding {"context", "stakeholders"}
        #[arg(short, long)]
        input: PathBuf,

        /// Exact name of the stakeholder to influence
        #[arg(short, long)]
        target: String,

        #[arg(short, long, default_value = "cli")]
        session: String,
    },

    /// Replay JSON-lines tool calls ({"tool", "arguments"}) against one engine
    Session {
        /// Input file; stdin when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// List the tool schemas
    Schemas,

    /// Print the effective configuration
    Config,
}

/// One line of a replayed tool session
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SessionCall {
    tool: String,
    #[serde(default)]
    arguments: JsonValue,
}

#[derive(Tabled)]
struct StakeholderRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "Stakeholder")]
    name: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Tier")]
    tier: String,
    #[tabled(rename = "Stance")]
    stance: String,
    #[tabled(rename = "Salience")]
    salience: String,
    #[tabled(rename = "P / U / L")]
    attributes: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let manager = match &cli.config {
        Some(path) => ConfigManager::from_file(path),
        None => ConfigManager::load(),
    }
    .context("Failed to load configuration")?;

    init_tracing(&manager.config().logging, cli.verbose);

    match execute_command(&cli, manager.config()) {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

/// Logs go to stderr so stdout stays machine-readable. `RUST_LOG` wins over the configured level.
fn init_tracing(logging: &LoggingConfig, verbose: bool) {
    let default_level = if verbose { "debug" } else { logging.level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let registry = tracing_subscriber::registry().with(filter);

    match logging.format.as_str() {
        "json" => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init(),
        "compact" => registry
            .with(tracing_subscriber::fmt::layer().compact().with_writer(io::stderr))
            .init(),
        _ => registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init(),
    }
}

fn execute_command(cli: &Cli, config: &NegotiatorConfig) -> Result<()> {
    match &cli.command {
        Commands::Analyze { session, input } => {
            let engine = NegotiationEngine::new(config);
            let request = read_request(input)?;
            let analysis = engine
                .analyze_stakeholders(session, request)
                .context("Stakeholder analysis failed")?;
            print_analysis(&cli.output, &analysis)
        }
        Commands::Leverage { input, target, session } => {
            let engine = NegotiationEngine::new(config);
            let request = read_request(input)?;
            engine
                .analyze_stakeholders(session, request)
                .context("Stakeholder analysis failed")?;
            let plan = engine
                .leverage_influence(session, target, None)
                .with_context(|| format!("Could not plan influence on '{}'", target))?;
            print_plan(&cli.output, &plan)
        }
        Commands::Session { input } => {
            let executor = NegotiationToolExecutor::new(Arc::new(NegotiationEngine::new(config)));
            let stdout = io::stdout();
            let replayed = match input {
                Some(path) => {
                    let file = fs::File::open(path)
                        .with_context(|| format!("Failed to open session file {}", path.display()))?;
                    replay_session(&executor, BufReader::new(file), stdout.lock())?
                }
                None => replay_session(&executor, io::stdin().lock(), stdout.lock())?,
            };
            info!(calls = replayed, "Session replay finished");
            Ok(())
        }
        Commands::Schemas => {
            let schemas = serde_json::to_value(NegotiationToolSchemas::all())?;
            print_output(&cli.output, &schemas)
        }
        Commands::Config => print_output(&cli.output, &serde_json::to_value(config)?),
    }
}

fn read_request(path: &Path) -> Result<AnalysisRequest> {
    let raw = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not a valid analysis request", path.display()))
}

/// Run each JSON line through the executor and write one JSON line back.
/// Malformed lines produce an error payload and do not stop the replay.
fn replay_session<S, R, W>(executor: &NegotiationToolExecutor<S>, reader: R, mut writer: W) -> Result<usize>
where
    S: SessionStore<StakeholderAnalysis>,
    R: BufRead,
    W: Write,
{
    let mut calls = 0;
    for (index, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read session input")?;
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<SessionCall>(&line) {
            Ok(call) => {
                debug!(line = index + 1, tool = %call.tool, "Replaying tool call");
                executor.execute_to_json(&call.tool, call.arguments)
            }
            Err(e) => {
                let mut payload = ToolError::InvalidParameters {
                    tool: "session".to_string(),
                    message: e.to_string(),
                }
                .to_json();
                payload["error"]["line"] = json!(index + 1);
                payload
            }
        };

        writeln!(writer, "{}", serde_json::to_string(&response)?)?;
        calls += 1;
    }
    writer.flush()?;
    Ok(calls)
}

fn print_analysis(format: &OutputFormat, analysis: &StakeholderAnalysis) -> Result<()> {
    if let OutputFormat::Json = format {
        return print_output(format, &serde_json::to_value(analysis)?);
    }

    println!("{} {}", "Analysis".cyan().bold(), analysis.analysis_id.to_string().yellow());
    println!("{}: {}", "Context".cyan().bold(), analysis.context);
    println!();

    let rows: Vec<StakeholderRow> = analysis
        .stakeholders
        .iter()
        .enumerate()
        .map(|(i, s)| StakeholderRow {
            rank: i + 1,
            name: s.name.clone(),
            role: s.role_or_default().to_string(),
            tier: s.tier.label().to_string(),
            stance: s.engagement.to_string(),
            salience: format!("{:.2}", s.salience),
            attributes: format!("{:.2} / {:.2} / {:.2}", s.power, s.urgency, s.legitimacy),
        })
        .collect();
    println!("{}", Table::new(rows));

    println!();
    for tier in &analysis.priority_summary.tiers {
        println!(
            "{} ({}): {}",
            tier.label.cyan().bold(),
            tier.count.to_string().yellow(),
            tier.stakeholders.join(", ")
        );
    }

    let relationships = &analysis.relationships;
    if !relationships.key_connectors.is_empty() {
        println!();
        println!("{}", "Key connectors".cyan().bold());
        for connector in &relationships.key_connectors {
            println!("  {} influences {}", connector.name.green(), connector.influences_count);
        }
    }

    for warning in analysis.warnings() {
        println!("{} {}", "Warning:".yellow().bold(), warning);
    }
    Ok(())
}

fn print_plan(format: &OutputFormat, plan: &LeveragePlan) -> Result<()> {
    if let OutputFormat::Json = format {
        return print_output(format, &serde_json::to_value(plan)?);
    }

    let stance = match plan.target_result.engagement {
        EngagementLabel::Supportive => plan.target_result.engagement.to_string().green(),
        EngagementLabel::Neutral => plan.target_result.engagement.to_string().yellow(),
        EngagementLabel::Adversarial => plan.target_result.engagement.to_string().red(),
    };
    println!("{} {} ({}, {})", "Target".cyan().bold(), plan.target.bold(), stance, plan.target_result.tier);
    println!("{}: {}", "Approach".cyan().bold(), plan.primary_approach);
    println!("{}", plan.overall_strategy);

    if !plan.allies.is_empty() {
        println!("{}: {}", "Allies".cyan().bold(), plan.ally_names().join(", ").green());
    }
    if !plan.opponents.is_empty() {
        println!("{}: {}", "Opponents".cyan().bold(), plan.opponent_names().join(", ").red());
    }

    println!();
    println!("{}", "Tactics".cyan().bold());
    for (i, tactic) in plan.tactics.iter().enumerate() {
        println!("{}. {}", (i + 1).to_string().yellow(), tactic.description);
        for action in &tactic.actions {
            println!("     - {}", action);
        }
    }

    if !plan.coalition_opportunities.is_empty() {
        println!();
        println!("{}", "Coalition opportunities".cyan().bold());
        for coalition in &plan.coalition_opportunities {
            println!("  {}: {}", coalition.description, coalition.members.join(", "));
        }
    }

    println!();
    println!("{}", "Risks".cyan().bold());
    for risk in &plan.risks {
        println!("  {} {}", risk.risk.red(), format!("-> {}", risk.mitigation).dimmed());
    }
    Ok(())
}

fn print_output(format: &OutputFormat, value: &JsonValue) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        OutputFormat::Pretty | OutputFormat::Table => {
            print_pretty(value)?;
        }
    }
    Ok(())
}

fn print_pretty(value: &JsonValue) -> Result<()> {
    match value {
        JsonValue::Object(map) => {
            for (key, val) in map {
                let key_colored = key.cyan().bold();
                match val {
                    JsonValue::String(s) => {
                        println!("{}: {}", key_colored, s.green());
                    }
                    JsonValue::Number(n) => {
                        println!("{}: {}", key_colored, n.to_string().yellow());
                    }
                    JsonValue::Bool(b) => {
                        let val_colored = if *b { "true".green() } else { "false".red() };
                        println!("{}: {}", key_colored, val_colored);
                    }
                    _ => {
                        println!("{}: {}", key_colored, val);
                    }
                }
            }
        }
        JsonValue::Array(arr) => {
            for (i, item) in arr.iter().enumerate() {
                println!("\n{}{}:", "Item ".cyan(), (i + 1).to_string().yellow());
                print_pretty(item)?;
            }
        }
        _ => {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
    }
    Ok(())
}
