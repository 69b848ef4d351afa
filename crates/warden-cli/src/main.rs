//! Warden command-line interface.
//!
//! The glue around the engine: loads a rules document, replays a recorded
//! action trace through one session, and hands the report to stdout.
//! Human-readable by default, `--json` for the stable machine shape.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use warden_core::{evaluate_trace, read_trace_file, rules::schema, Report, RuleSet};

#[derive(Parser)]
#[command(
    name = "warden",
    version,
    about = "Compliance evaluation for agent action traces"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate a recorded trace against a rules document
    Evaluate {
        /// Path to the rules document (YAML, or JSON with a .json extension)
        #[arg(long)]
        rules: PathBuf,

        /// Path to the recorded trace (JSON array of actions)
        #[arg(long)]
        trace: PathBuf,

        /// Emit the report as JSON instead of human-readable text
        #[arg(long)]
        json: bool,
    },

    /// Validate a rules document against the embedded JSON Schema
    Validate {
        /// Path to the rules document (YAML, or JSON with a .json extension)
        #[arg(long)]
        rules: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Evaluate { rules, trace, json } => evaluate(&rules, &trace, json),
        Command::Validate { rules } => validate(&rules),
    }
}

fn evaluate(rules_path: &Path, trace_path: &Path, json: bool) -> Result<()> {
    let rules = load_rules(rules_path)?;
    info!(
        test_id = %rules.test_id,
        constraints = rules.constraints.len(),
        "rules loaded"
    );

    let actions = read_trace_file(trace_path)
        .with_context(|| format!("failed to read trace from {}", trace_path.display()))?;
    info!(actions = actions.len(), "trace loaded");

    let report = evaluate_trace(rules, actions)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_report(&report));
    }

    Ok(())
}

fn validate(rules_path: &Path) -> Result<()> {
    let contents = std::fs::read_to_string(rules_path)
        .with_context(|| format!("failed to read rules from {}", rules_path.display()))?;

    let value: serde_json::Value = if is_json(rules_path) {
        serde_json::from_str(&contents).context("rules document is not valid JSON")?
    } else {
        serde_yaml::from_str(&contents).context("rules document is not valid YAML")?
    };

    match schema::validate_rules_schema(&value) {
        Ok(()) => {
            println!("{}: OK", rules_path.display());
            Ok(())
        }
        Err(errors) => {
            for error in &errors {
                eprintln!("  {error}");
            }
            bail!(
                "{}: {} schema violation(s)",
                rules_path.display(),
                errors.len()
            );
        }
    }
}

fn load_rules(path: &Path) -> Result<RuleSet> {
    let loaded = if is_json(path) {
        RuleSet::from_json_file(path)
    } else {
        RuleSet::from_yaml_file(path)
    };

    loaded.with_context(|| format!("failed to load rules from {}", path.display()))
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

fn render_report(report: &Report) -> String {
    let bar = "=".repeat(40);
    let mut lines = vec![
        bar.clone(),
        format!("REPORT: {}", report.test_id),
        bar.clone(),
        format!("Objective: {}", report.objective),
        format!("Final Score: {}/100", report.final_score),
        format!("Status: {}", report.status),
        String::new(),
    ];

    if report.violations.is_empty() {
        lines.push("No violations detected.".to_string());
    } else {
        lines.push("Violations:".to_string());
        for violation in &report.violations {
            lines.push(format!(
                " - [{}] {} (-{})",
                violation.id, violation.message, violation.penalty
            ));
        }
    }

    lines.push(bar);
    lines.push(String::new());
    lines.join("\n")
}
