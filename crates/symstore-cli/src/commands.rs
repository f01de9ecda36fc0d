use std::path::Path;

use colored::Colorize;
use serde::Serialize;
use symstore_reader::{CancellationToken, Loaded, ReaderConfig, SkippedLine, SymbolStore};
use symstore_types::{Operation, RefPointer, Transaction, TransactionDetail};
use tracing::warn;

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let store = open_store(&cli)?;
    let cancel = CancellationToken::new();
    cancel_on_interrupt(cancel.clone());

    let Cli { command, format, .. } = cli;
    match command {
        Command::Server(args) => {
            let loaded = store.load_server(&cancel).await?;
            cmd_log(loaded, args, &format)
        }
        Command::History(args) => {
            let loaded = store.load_history(&cancel).await?;
            cmd_log(loaded, args, &format)
        }
        Command::Details(args) => cmd_details(&store, args, &format, &cancel).await,
        Command::Refs(args) => cmd_refs(&store, args, &format, &cancel).await,
        Command::Discover(_) => cmd_discover(&store, &format).await,
    }
}

fn open_store(cli: &Cli) -> anyhow::Result<SymbolStore> {
    let mut config = match &cli.config {
        Some(path) => ReaderConfig::load(path)?,
        None => ReaderConfig::default(),
    };
    if let Some(jobs) = cli.jobs {
        config = config.with_max_concurrent_files(jobs);
    }
    Ok(SymbolStore::with_config(&cli.store, config))
}

fn cancel_on_interrupt(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received; cancelling");
            cancel.cancel();
        }
    });
}

fn emit_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_log(
    loaded: Loaded<Vec<Transaction>>,
    args: LogArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let loaded = loaded.map(|txs| most_recent(txs, args.limit));
    if let OutputFormat::Json = format {
        return emit_json(&loaded);
    }

    if loaded.value.is_empty() {
        println!("No transactions.");
    }
    for tx in &loaded.value {
        let op = match tx.operation {
            Operation::Add => tx.operation.as_str().green(),
            Operation::Del => tx.operation.as_str().red(),
        };
        println!(
            "{} {} {:<4} {}  {} {}",
            tx.file_name().yellow(),
            op,
            tx.kind.as_str(),
            tx.created.format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
            tx.product_name.bold(),
            tx.version.cyan(),
        );
        if !tx.comment.is_empty() {
            println!("    {}", tx.comment);
        }
    }
    print_skipped(None, &loaded.skipped);
    Ok(())
}

async fn cmd_details(
    store: &SymbolStore,
    args: DetailsArgs,
    format: &OutputFormat,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let details = match args.id {
        Some(id) => vec![store.load_transaction_detail(id, cancel).await?],
        None => store.load_transaction_details(cancel).await?,
    };
    if let OutputFormat::Json = format {
        return emit_json(&details);
    }

    if details.is_empty() {
        println!("No transaction details.");
    }
    for Loaded { value, skipped } in &details {
        print_detail(value);
        print_skipped(Some(&value.file_name()), skipped);
    }
    Ok(())
}

fn print_detail(detail: &TransactionDetail) {
    println!(
        "{} ({} artifacts)",
        detail.file_name().yellow().bold(),
        detail.artifacts.len()
    );
    for artifact in &detail.artifacts {
        println!("  {} <- {}", artifact.stored_path, artifact.original_path.dimmed());
    }
}

async fn cmd_refs(
    store: &SymbolStore,
    args: RefsArgs,
    format: &OutputFormat,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let pointers = store.load_ref_pointers(cancel).await?;
    let pointers = filter_by_symbol(pointers, args.symbol.as_deref());
    if let OutputFormat::Json = format {
        return emit_json(&pointers);
    }

    if pointers.is_empty() {
        println!("No reference pointers.");
    }
    for Loaded { value, skipped } in &pointers {
        print_ref_pointer(value);
        print_skipped(Some(&value.sub_path().display().to_string()), skipped);
    }
    Ok(())
}

fn print_ref_pointer(pointer: &RefPointer) {
    println!(
        "{} {}",
        pointer.symbol_file_name().bold(),
        pointer.hash().cyan()
    );
    for entry in &pointer.entries {
        println!(
            "  {} {:<4} {} {}",
            symstore_types::format_transaction_id(entry.id).yellow(),
            entry.kind.as_str(),
            entry.pe_type.as_str(),
            entry.original_path
        );
    }
}

async fn cmd_discover(store: &SymbolStore, format: &OutputFormat) -> anyhow::Result<()> {
    let paths = store.discover_ref_pointers().await?;
    let relative: Vec<_> = paths
        .iter()
        .map(|p| relative_to(store.root(), p))
        .collect();
    if let OutputFormat::Json = format {
        return emit_json(&relative);
    }

    for path in &relative {
        println!("{path}");
    }
    println!("{} refs.ptr files", relative.len().to_string().bold());
    Ok(())
}

fn print_skipped(source: Option<&str>, skipped: &[SkippedLine]) {
    if skipped.is_empty() {
        return;
    }
    let label = source.map(|s| format!(" in {s}")).unwrap_or_default();
    println!(
        "{} {} malformed line(s) skipped{}",
        "!".red().bold(),
        skipped.len(),
        label
    );
    for line in skipped {
        println!("    {}: {}", line.line_number, line.raw.dimmed());
    }
}

/// Keep the last `limit` transactions, preserving log order.
fn most_recent(mut txs: Vec<Transaction>, limit: Option<usize>) -> Vec<Transaction> {
    if let Some(limit) = limit {
        let excess = txs.len().saturating_sub(limit);
        txs.drain(..excess);
    }
    txs
}

fn filter_by_symbol(
    pointers: Vec<Loaded<RefPointer>>,
    symbol: Option<&str>,
) -> Vec<Loaded<RefPointer>> {
    match symbol {
        Some(symbol) => pointers
            .into_iter()
            .filter(|p| p.value.symbol_file_name().eq_ignore_ascii_case(symbol))
            .collect(),
        None => pointers,
    }
}

fn relative_to(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
