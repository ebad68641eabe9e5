use clap::Parser;
use std::fs;
use trichter::prelude::*;

/// A structural validation CLI for funnel graphs
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the funnel flow JSON file
    flow_path: String,
    /// Optional path to the funnel metadata JSON file
    meta_path: Option<String>,

    /// Print the funnel as an annotated ASCII tree
    #[arg(short, long)]
    outline: bool,

    /// Print the highlight sets as JSON instead of text
    #[arg(short, long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();

    let flow_json = fs::read_to_string(&cli.flow_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read flow file '{}': {}",
            &cli.flow_path, e
        ))
    });
    let flow: FunnelFlow = serde_json::from_str(&flow_json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse flow JSON: {}", e)));

    let meta = match &cli.meta_path {
        Some(path) => {
            let meta_json = fs::read_to_string(path).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to read metadata file '{}': {}", path, e))
            });
            serde_json::from_str(&meta_json)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse metadata JSON: {}", e)))
        }
        None => {
            println!("No metadata file provided. Using defaults (no trigger configured).");
            FunnelMeta::default()
        }
    };

    let highlights = Highlights::compute(&flow);
    let status = compute_draft_status(&flow, &meta);

    if cli.outline {
        println!("\n{}", FlowOutline::with_highlights(&flow, &highlights));
    }

    if cli.json {
        let report = serde_json::json!({
            "highlights": highlights,
            "status": status,
        });
        println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
    } else {
        print_report(&flow, &highlights, &status);
    }

    if status.is_draft {
        std::process::exit(1);
    }
}

fn print_report(flow: &FunnelFlow, highlights: &Highlights, status: &DraftStatus) {
    println!("\n--- Structure Summary ---");
    println!("Stages: {}", flow.stages.len());
    println!("Blocks: {}", flow.blocks.len());

    println!("\n--- Validation Report ---");
    if highlights.is_clean() {
        println!("No structural problems found.");
    } else {
        for invalid in &highlights.invalid_options {
            println!(
                "Invalid option: block '{}' option {} ({:?})",
                invalid.block_id, invalid.option_index, invalid.reason
            );
        }
        for id in &highlights.orphaned_block_ids {
            println!("Orphaned block: '{}' (no normal inbound from the previous stage)", id);
        }
        for id in &highlights.broken_block_ids {
            println!("Broken block: '{}' (no path to the next stage)", id);
        }
    }

    println!("\n--- Deployability ---");
    if status.is_draft {
        println!(
            "DRAFT: {}",
            status.reason_text().unwrap_or_else(|| "unknown".to_string())
        );
    } else {
        println!("Live-ready.");
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
