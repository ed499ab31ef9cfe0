//! TSender CLI entry point: amounts -> total, form -> validate -> airdrop plan -> output.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};
use is_terminal::IsTerminal;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use tsender_core::{
    compute_total, format_total_tokens, format_total_wei, parse_wei_token, plan_airdrop,
    split_list, truncate_address, try_compute_total, validate_address, AgentError, AirdropForm,
    AirdropPlan, AirdropRequest, AmountListError, ChainRegistry, OutputMode, PlanStep, RowIssue,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Auto,
    Json,
    Human,
}

#[derive(Debug, Parser)]
#[command(name = "tsender", version)]
#[command(about = "TSender: aggregate airdrop amounts and plan approve + airdropERC20 calls")]
struct Cli {
    /// Output format: auto (tty=human, pipe=agent), json (agent), human (operator).
    #[arg(long, value_enum, default_value = "auto", global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Aggregate a comma/newline separated amounts list.
    Total(TotalArgs),
    /// Validate an airdrop form and lay out the transactions to send.
    Plan(PlanArgs),
}

#[derive(Debug, Args)]
struct AmountsInput {
    /// Amounts list, separated by commas and/or newlines.
    #[arg(long, conflicts_with = "amounts_file", required_unless_present = "amounts_file")]
    amounts: Option<String>,

    /// File containing the amounts list.
    #[arg(long)]
    amounts_file: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct TotalArgs {
    #[command(flatten)]
    input: AmountsInput,

    /// Fail on malformed entries instead of reporting a total of 0.
    #[arg(long)]
    strict: bool,
}

#[derive(Debug, Args)]
struct PlanArgs {
    /// Chain id the airdrop targets (31337 anvil, 324 zksync, 1 mainnet).
    #[arg(long, default_value_t = 31_337)]
    chain_id: u64,

    /// ERC-20 token contract address.
    #[arg(long)]
    token: String,

    /// Recipient addresses, separated by commas and/or newlines.
    #[arg(long, conflicts_with = "recipients_file", required_unless_present = "recipients_file")]
    recipients: Option<String>,

    /// File containing the recipients list.
    #[arg(long)]
    recipients_file: Option<PathBuf>,

    #[command(flatten)]
    amounts: AmountsInput,

    /// Allowance already granted to the TSender contract, in wei.
    #[arg(long, default_value = "0")]
    allowance: String,

    /// JSON registry mapping chain ids to TSender contract addresses.
    #[arg(long, conflicts_with = "tsender", required_unless_present = "tsender")]
    registry: Option<PathBuf>,

    /// TSender contract address for the selected chain.
    #[arg(long)]
    tsender: Option<String>,

    /// Bypass confirmation prompts (required for agent mode).
    #[arg(long)]
    force: bool,
}

/// Agent-mode payload for the `total` command.
#[derive(Debug, Serialize)]
struct TotalReport {
    total: f64,
    wei: String,
    tokens: String,
    count: usize,
}

/// Detect output mode based on CLI flags and TTY detection.
fn detect_output_mode(output: OutputFormat) -> OutputMode {
    match output {
        OutputFormat::Human => OutputMode::Human,
        OutputFormat::Json => OutputMode::Agent,
        OutputFormat::Auto => {
            if std::io::stdout().is_terminal() {
                OutputMode::Human
            } else {
                OutputMode::Agent
            }
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn spinner(mode: OutputMode, message: &str) -> Option<ProgressBar> {
    if mode != OutputMode::Human {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    Some(pb)
}

fn human_header(title: &str) {
    println!(
        "{}",
        "╔═══════════════════════════════════════════════════════════════╗".bright_white()
    );
    println!("{}", format!("║  {:<61}║", title).bright_white());
    println!(
        "{}",
        "╚═══════════════════════════════════════════════════════════════╝".bright_white()
    );
    println!();
}

fn bold_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn header_cells(names: &[&str]) -> Vec<Cell> {
    names
        .iter()
        .map(|name| Cell::new(name).add_attribute(Attribute::Bold))
        .collect()
}

fn render_totals_table(report: &TotalReport) -> Table {
    let mut table = bold_table();
    table.set_header(header_cells(&["Entries", "Total (Wei)", "Total (Tokens)"]));
    table.add_row(vec![
        Cell::new(report.count),
        Cell::new(&report.wei),
        Cell::new(&report.tokens),
    ]);
    table
}

fn render_plan_table(request: &AirdropRequest) -> Table {
    let mut table = bold_table();
    table.set_header(header_cells(&["#", "Recipient", "Amount (Wei)", "Status"]));

    for (i, r) in request.recipients.iter().enumerate() {
        let status = format!("{} {}", "✓".green(), "Valid".green());
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(truncate_address(&r.address.to_checksum())),
            Cell::new(r.amount_wei),
            Cell::new(status),
        ]);
    }

    table
}

fn render_issues_table(issues: &[RowIssue]) -> Table {
    let mut table = bold_table();
    table.set_header(header_cells(&["Field", "Entry", "Message"]));

    for issue in issues {
        let entry = issue
            .entry
            .map(|e| e.to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            Cell::new(&issue.field),
            Cell::new(entry),
            Cell::new(&issue.message),
        ]);
    }

    table
}

fn confirm_or_abort(force: bool) -> Result<bool> {
    if force {
        return Ok(true);
    }

    println!(
        "{}",
        "⚠️  This plan will approve and transfer tokens once signed.\n    Type 'yes' to continue, or 'no' to cancel:"
            .yellow()
    );
    print!("> ");
    io::stdout().flush().context("failed to flush stdout")?;

    let stdin = io::stdin();
    let mut line = String::new();
    stdin
        .lock()
        .read_line(&mut line)
        .context("failed to read stdin")?;
    let answer = line.trim().to_lowercase();

    Ok(answer == "y" || answer == "yes")
}

fn emit_agent_error(err: AgentError) -> Result<()> {
    let json = serde_json::to_string(&err).context("failed to serialize agent error")?;
    eprintln!("{json}");
    Ok(())
}

/// Read a list from its inline flag or its file flag.
fn read_list(inline: Option<String>, file: Option<&Path>, what: &str) -> Result<String> {
    match (inline, file) {
        (Some(text), _) => Ok(text),
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {what} file: {:?}", path)),
        (None, None) => bail!("no {what} given"),
    }
}

fn report_rejection(mode: OutputMode, title: &str, issues: Vec<RowIssue>) -> Result<()> {
    match mode {
        OutputMode::Human => {
            human_header(title);
            println!(
                "{} {}",
                "✗".red(),
                "Validation failed. No plan was constructed.".red()
            );
            println!();
            println!("{}", render_issues_table(&issues));
            println!();
            println!("{}", "Fix the errors above and re-run.".yellow());
        }
        OutputMode::Agent => {
            emit_agent_error(AgentError {
                error: "validation_failed".to_string(),
                code: 1,
                details: Some(issues),
            })?;
        }
    }
    std::process::exit(1);
}

fn run_total(mode: OutputMode, args: TotalArgs) -> Result<()> {
    let text = read_list(args.input.amounts, args.input.amounts_file.as_deref(), "amounts")?;

    let total = if args.strict {
        match try_compute_total(&text) {
            Ok(t) => t.total,
            Err(AmountListError::InvalidToken { index, token, source }) => {
                let issue = RowIssue::new(
                    "amounts",
                    Some(index + 1),
                    format!("'{token}': {source}"),
                );
                return report_rejection(mode, "TSENDER — Amounts Rejected", vec![issue]);
            }
        }
    } else {
        compute_total(&text)
    };

    let report = TotalReport {
        total,
        wei: format_total_wei(total),
        tokens: format_total_tokens(total),
        count: split_list(&text).len(),
    };

    match mode {
        OutputMode::Human => {
            human_header("TSENDER — Total Amounts");
            println!("{}", render_totals_table(&report));
        }
        OutputMode::Agent => {
            let json = serde_json::to_string(&report).context("failed to serialize total")?;
            print!("{json}");
        }
    }

    Ok(())
}

fn load_registry(args: &PlanArgs) -> Result<ChainRegistry> {
    if let Some(tsender) = &args.tsender {
        let addr = validate_address(tsender)
            .with_context(|| format!("invalid --tsender address: {tsender}"))?;
        return Ok(ChainRegistry::new().with_tsender(args.chain_id, addr));
    }
    match &args.registry {
        Some(path) => ChainRegistry::from_path(path).context("failed to load chain registry"),
        None => bail!("either --registry or --tsender is required"),
    }
}

fn print_plan_summary(plan: &AirdropPlan) {
    let chain = plan.chain.map(|c| c.as_str()).unwrap_or("custom");
    println!(
        "{} {} ({})",
        "Chain:".bright_white().bold(),
        plan.chain_id,
        chain
    );
    println!(
        "{} {}",
        "Total (Wei):".bright_white().bold(),
        format_total_wei(plan.total).bright_white().bold()
    );
    println!(
        "{} {}",
        "Total (Tokens):".bright_white().bold(),
        format_total_tokens(plan.total).bright_white().bold()
    );
    println!(
        "{} {}",
        "Recipients:".bright_white().bold(),
        plan.recipient_count.to_string().bright_white().bold()
    );
    println!(
        "{} {}",
        "Current allowance:".bright_white().bold(),
        plan.allowance
    );
    println!();

    for (i, step) in plan.steps.iter().enumerate() {
        let line = match step {
            PlanStep::Approve(call) => format!(
                "approve {} to spend {} wei of {}",
                call.spender.to_checksum(),
                call.amount,
                call.token.to_checksum()
            ),
            PlanStep::Airdrop(call) => format!(
                "airdropERC20 on {} ({} recipients, {} wei)",
                call.tsender.to_checksum(),
                call.recipients.len(),
                call.total
            ),
        };
        println!("  {}. {}", i + 1, line);
    }
    println!();
}

fn run_plan(mode: OutputMode, args: PlanArgs) -> Result<()> {
    // Agent mode is non-interactive; enforce --force for plans that move funds.
    if mode == OutputMode::Agent && !args.force {
        let err = AgentError {
            error: "confirmation_required".to_string(),
            code: 2,
            details: None,
        };
        emit_agent_error(err)?;
        std::process::exit(2);
    }

    let allowance = parse_wei_token(args.allowance.trim())
        .with_context(|| format!("invalid --allowance: {}", args.allowance))?;
    let registry = load_registry(&args)?;
    let recipients = read_list(
        args.recipients.clone(),
        args.recipients_file.as_deref(),
        "recipients",
    )?;
    let amounts = read_list(
        args.amounts.amounts.clone(),
        args.amounts.amounts_file.as_deref(),
        "amounts",
    )?;

    let pb = spinner(mode, "Validating airdrop…");
    let form = AirdropForm::with_inputs(&args.token, &recipients, &amounts);
    let result = AirdropRequest::from_form(&form, args.chain_id, &registry);
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    let request = match result {
        Ok(request) => request,
        Err(err) => {
            let issues = if err.issues().is_empty() {
                vec![RowIssue::new("input", None, err.to_string())]
            } else {
                err.issues().to_vec()
            };
            return report_rejection(mode, "TSENDER — Airdrop Rejected", issues);
        }
    };

    let plan = plan_airdrop(&request, allowance);

    match mode {
        OutputMode::Human => {
            human_header("TSENDER — Airdrop Review");
            println!("{}", render_plan_table(&request));
            println!();
            print_plan_summary(&plan);

            let proceed = confirm_or_abort(args.force)?;
            if !proceed {
                println!("{}", "Aborted. No plan was produced.".yellow());
                return Ok(());
            }

            println!();
            println!("{}", "Plan constructed.".green().bold());
            println!(
                "{}",
                "───────────────────────────────────────────────────────────────".bright_black()
            );
            println!(
                "{}",
                "Plan JSON (for the signing wallet):".bright_white().bold()
            );
            let json = serde_json::to_string_pretty(&plan).context("failed to serialize plan")?;
            println!("{json}");
        }
        OutputMode::Agent => {
            let json = serde_json::to_string(&plan).context("failed to serialize plan")?;
            print!("{json}");
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();
    let mode = detect_output_mode(cli.output);

    match cli.command {
        Command::Total(args) => run_total(mode, args),
        Command::Plan(args) => run_plan(mode, args),
    }
}
