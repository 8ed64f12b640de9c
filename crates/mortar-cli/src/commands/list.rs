//! `mortar list`: the built-in blocks and filters.

use serde::Serialize;

use mortar_adapters::{standard_blocks, standard_filters};

use crate::{
    cli::{ListArgs, ListFormat},
    error::{CliError, CliResult},
    output::OutputManager,
};

#[derive(Debug, Serialize)]
struct Entry {
    kind: &'static str,
    name: String,
    aliases: Vec<String>,
    /// Names that may follow the opening marker (`endfor`, `else`, ...).
    closing: Vec<String>,
    description: String,
}

pub fn execute(args: ListArgs, output: OutputManager) -> CliResult<()> {
    let entries: Vec<Entry> = catalog()
        .into_iter()
        .filter(|e| match (args.blocks, args.filters) {
            (true, _) => e.kind != "filter",
            (_, true) => e.kind == "filter",
            _ => true,
        })
        .collect();

    match args.format {
        ListFormat::Table => {
            output.header("Blocks and filters:")?;
            for entry in &entries {
                let mut line = format!("  {:<7} {:<12} {}", entry.kind, entry.name, entry.description);
                if !entry.aliases.is_empty() {
                    line.push_str(&format!(" (also: {})", entry.aliases.join(", ")));
                }
                if !entry.closing.is_empty() {
                    line.push_str(&format!(" [{}]", entry.closing.join(" ")));
                }
                output.print(&line)?;
            }
        }
        ListFormat::List => {
            for entry in &entries {
                output.print(&entry.name)?;
            }
        }
        ListFormat::Json => {
            let value = serde_json::to_value(&entries).map_err(|e| CliError::InvalidInput {
                message: format!("Failed to serialise the listing: {e}"),
                source: Some(Box::new(e)),
            })?;
            output.json(&value)?;
        }
    }

    Ok(())
}

fn catalog() -> Vec<Entry> {
    let mut entries = Vec::new();

    for handler in standard_blocks() {
        let Some((name, aliases)) = handler.names().split_first() else {
            continue;
        };
        let closing: Vec<String> = handler
            .closing_names(name)
            .iter()
            .map(|n| n.to_string())
            .collect();
        entries.push(Entry {
            kind: if closing.is_empty() { "inline" } else { "block" },
            name: name.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            closing,
            description: handler.describe().to_owned(),
        });
    }

    for filter in standard_filters() {
        let Some((name, aliases)) = filter.names().split_first() else {
            continue;
        };
        entries.push(Entry {
            kind: "filter",
            name: name.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            closing: Vec::new(),
            description: filter.describe().to_owned(),
        });
    }

    entries
}
