use anyhow::Context;
use colored::Colorize;

use tally_node::{SkipReason, StaticSubmitter, TallyNode};
use tally_server::{ServerConfig, TallyServer};

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Demo(_) => cmd_demo(cli.format).await,
        Command::Serve(args) => cmd_serve(args).await,
    }
}

async fn cmd_demo(format: OutputFormat) -> anyhow::Result<()> {
    let node = TallyNode::new();
    let submitter = StaticSubmitter::ephemeral();

    node.append(&submitter, "alpha", 7).await?;
    let hidden = node.append_name_only(&submitter, "beta").await?;
    node.append_sum_of_two(&submitter, 20, 22).await?;

    let report = node.refresh().await?;

    if matches!(format, OutputFormat::Json) {
        let view = node.history();
        println!("{}", serde_json::to_string_pretty(view.as_ref())?);
        return Ok(());
    }

    println!(
        "{} Appended {} records as {}",
        "✓".green().bold(),
        "3".bold(),
        submitter.account().to_string().cyan()
    );
    println!(
        "{} Published view: {} shown, {} skipped",
        "✓".green().bold(),
        report.published,
        report.skipped.len()
    );
    print_history(&node);

    // Drop one transaction's commit metadata: the record stays in the
    // ledger but falls out of the displayable view.
    println!(
        "\nForgetting commit metadata for {}...",
        hidden.tx.to_string().yellow()
    );
    node.commits().forget(&hidden.tx)?;
    let report = node.refresh().await?;
    println!(
        "{} Published view: {} shown, {} skipped",
        "✓".green().bold(),
        report.published,
        report.skipped.len()
    );
    for skipped in &report.skipped {
        println!(
            "  hidden: {} ({})",
            format!("#{}", skipped.id).yellow(),
            reason_text(skipped.reason)
        );
    }
    print_history(&node);

    let audit = node.audit().await?;
    if audit.is_clean() {
        println!(
            "\n{} Ledger and journal agree: {} records, {} notifications",
            "✓".green().bold(),
            audit.record_count,
            audit.notification_count
        );
    } else {
        println!(
            "\n{} Audit found {} violations",
            "✗".red().bold(),
            audit.violations.len()
        );
    }
    Ok(())
}

fn print_history(node: &TallyNode) {
    let view = node.history();
    println!("\nHistory (newest first):");
    for entry in &view.entries {
        println!(
            "  {}  {:<10} sum={:<6} commit {}  {}",
            format!("#{}", entry.record.id).yellow().bold(),
            format!("{:?}", entry.record.name),
            entry.record.sum,
            entry.commit_number.to_string().cyan(),
            entry.tx.to_string().dimmed()
        );
    }
}

fn reason_text(reason: SkipReason) -> &'static str {
    match reason {
        SkipReason::DuplicateNotification => "duplicate announcement",
        SkipReason::DuplicateTx => "transaction reused",
        SkipReason::UncommittedTx => "no commit metadata",
        SkipReason::RecordOutOfRange => "not in the ledger",
        SkipReason::RecordUnavailable => "record lookup failed",
    }
}

async fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = &args.bind {
        config.bind_addr = bind
            .parse()
            .with_context(|| format!("invalid bind address: {bind}"))?;
    }
    if let Some(allow) = args.allow_anonymous_append {
        config.allow_anonymous_append = allow;
    }

    let server = TallyServer::new(config);
    server.serve().await?;
    Ok(())
}
