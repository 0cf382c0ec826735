use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::Path;

use anyhow::Context;
use bsl_sdk::{BlobStore, Document, Lookup, Meta, SlotId, StoreConfig};
use colored::Colorize;
use serde_json::json;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    let mut store = BlobStore::open(config).context("failed to open store")?;
    match cli.command {
        Command::Add(args) => cmd_add(&mut store, args, &cli.format),
        Command::Get(args) => cmd_get(&store, args),
        Command::List(args) => cmd_list(&store, args, &cli.format),
        Command::Info => cmd_info(&store, &cli.format),
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<StoreConfig> {
    let mut config = match &cli.config {
        Some(path) => StoreConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => StoreConfig::default(),
    };
    if let Some(root) = &cli.root {
        config.root = root.clone();
    }
    if let Some(capacity) = cli.capacity {
        config.capacity = capacity;
    }
    Ok(config)
}

fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
    }
}

fn cmd_add(store: &mut BlobStore, args: AddArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let document = read_input(&args.path)?;
    let meta: Meta = match &args.meta {
        Some(text) => serde_json::from_str(text).context("--meta is not valid JSON")?,
        None => json!({}),
    };
    let slot = store.add(&document, args.name.as_deref(), meta)?;
    match format {
        OutputFormat::Json => println!("{}", json!({ "slot": slot, "name": args.name })),
        OutputFormat::Text => {
            print!("{} Stored {} bytes in slot {}", "✓".green().bold(), document.len(), slot.to_string().bold());
            match &args.name {
                Some(name) => println!(" as {}", name.yellow()),
                None => println!(),
            }
        }
    }
    Ok(())
}

fn cmd_get(store: &BlobStore, args: GetArgs) -> anyhow::Result<()> {
    let doc = match store.get(&args.key)? {
        Lookup::Found(doc) => doc,
        Lookup::NotBound(name) => {
            eprintln!("{} no document is bound to {}", "!".yellow().bold(), name.yellow());
            return Ok(());
        }
    };
    match &args.output {
        Some(path) => std::fs::write(path, &doc.data)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => std::io::stdout().write_all(&doc.data)?,
    }
    Ok(())
}

fn summary(doc: &Document) -> serde_json::Value {
    json!({
        "slot": doc.slot,
        "name": doc.name,
        "size": doc.data.len(),
        "meta": doc.meta,
    })
}

fn cmd_list(store: &BlobStore, args: ListArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let limit = args.limit.unwrap_or(usize::MAX);
    for doc in store.iter().take(limit) {
        let doc = doc?;
        match format {
            OutputFormat::Json => println!("{}", summary(&doc)),
            OutputFormat::Text => println!(
                "{:>6}  {:<20}  {:>8} B  {}",
                doc.slot.to_string().yellow(),
                doc.name.as_deref().unwrap_or("-").cyan(),
                doc.data.len(),
                doc.meta.to_string().dimmed(),
            ),
        }
    }
    Ok(())
}

fn cmd_info(store: &BlobStore, format: &OutputFormat) -> anyhow::Result<()> {
    let names = store.names();
    let bound: BTreeMap<String, SlotId> = names.iter().cloned().collect();
    match format {
        OutputFormat::Json => println!(
            "{}",
            json!({
                "root": store.root(),
                "capacity": store.capacity(),
                "occupied": store.len(),
                "head": store.head(),
                "names": bound,
            })
        ),
        OutputFormat::Text => {
            println!("Store: {}", store.root().display().to_string().bold());
            println!("  Capacity: {}", store.capacity());
            println!("  Occupied: {}", store.len());
            match store.head() {
                Some(head) => println!("  Head: slot {}", head.to_string().yellow()),
                None => println!("  Head: {}", "empty".dimmed()),
            }
            if names.is_empty() {
                println!("  Names: {}", "none".dimmed());
            } else {
                println!("  Names:");
                for (name, slot) in &names {
                    println!("    {} → {}", name.cyan(), slot);
                }
            }
        }
    }
    Ok(())
}
