use clap::Parser;
use rand::Rng;
use rand::rngs::ThreadRng;
use std::fs;
use trichter::prelude::*;

/// A CLI tool to generate random funnel flows for validator stress tests
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated JSON file to
    #[arg(short, long, default_value = "generated_funnel.json")]
    output: String,

    /// The number of stages to generate
    #[arg(long, default_value_t = 4)]
    stages: usize,

    /// The maximum number of blocks per stage
    #[arg(long, default_value_t = 3)]
    max_blocks: usize,

    /// Disconnect some blocks so the validator has orphans and broken
    /// blocks to find
    #[arg(long)]
    damage: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut rng = rand::rng();

    if cli.stages == 0 || cli.max_blocks == 0 {
        eprintln!("Error: --stages and --max-blocks must both be at least 1");
        std::process::exit(1);
    }

    println!(
        "Generating a funnel ({} stage(s), up to {} block(s) each)...",
        cli.stages, cli.max_blocks
    );

    let mut flow = generate_flow(&mut rng, cli.stages, cli.max_blocks);
    if cli.damage {
        damage_flow(&mut rng, &mut flow);
    }

    let highlights = Highlights::compute(&flow);
    println!(
        "-> {} invalid option(s), {} orphaned, {} broken.",
        highlights.invalid_options.len(),
        highlights.orphaned_block_ids.len(),
        highlights.broken_block_ids.len()
    );

    let json_output = serde_json::to_string_pretty(&flow)?;
    fs::write(&cli.output, json_output)?;

    println!("Successfully generated and saved funnel to '{}'", cli.output);

    Ok(())
}

fn generate_flow(rng: &mut ThreadRng, stage_count: usize, max_blocks: usize) -> FunnelFlow {
    let mut flow = FunnelFlow::default();

    for stage_index in 0..stage_count {
        let name = stage_name(stage_index, stage_count);
        let mut stage = Stage::new(&format!("stage_{}", stage_index), name);
        if name == "OFFER" {
            stage.card_type = Some(CardType::Product);
        }

        let block_count = if stage_index == 0 {
            1
        } else {
            rng.random_range(1..=max_blocks)
        };
        for block_index in 0..block_count {
            let id = format!("b{}_{}", stage_index, block_index);
            let mut block = Block::new(&id, &format!("Message for {}", id));
            if stage.card_type == Some(CardType::Product) {
                block.resource_id = Some(format!("prod_{}", rng.random_range(100..1000)));
            }
            stage.block_ids.push(id.clone());
            flow.blocks.insert(id, block);
        }
        flow.stages.push(stage);
    }
    flow.start_block_id = "b0_0".to_string();

    connect_stages(rng, &mut flow);
    flow
}

/// Wires every adjacent stage pair: each block branches to a random block
/// of the next stage, and every next-stage block is guaranteed a normal
/// inbound so the generated funnel starts out clean.
fn connect_stages(rng: &mut ThreadRng, flow: &mut FunnelFlow) {
    for stage_index in 0..flow.stages.len().saturating_sub(1) {
        let sources = flow.stages[stage_index].block_ids.clone();
        let targets = flow.stages[stage_index + 1].block_ids.clone();

        for source in &sources {
            let target = &targets[rng.random_range(0..targets.len())];
            push_option(flow, source, target);
        }
        for target in &targets {
            let fed = sources.iter().any(|source| {
                flow.blocks.get(source).is_some_and(|block| {
                    block
                        .options
                        .iter()
                        .any(|o| o.next_block_id.as_deref() == Some(target.as_str()))
                })
            });
            if !fed {
                let source = sources[rng.random_range(0..sources.len())].clone();
                push_option(flow, &source, target);
            }
        }
    }
}

fn push_option(flow: &mut FunnelFlow, source: &str, target: &str) {
    if let Some(block) = flow.blocks.get_mut(source) {
        block.options.push(BlockOption {
            text: format!("Go to {}", target),
            next_block_id: Some(target.to_string()),
        });
    }
}

/// Cuts a few connections so orphans and broken blocks appear.
fn damage_flow(rng: &mut ThreadRng, flow: &mut FunnelFlow) {
    let mut cut = 0;
    let block_ids: Vec<String> = flow
        .stages
        .iter()
        .flat_map(|s| s.block_ids.iter().cloned())
        .collect();
    for id in block_ids {
        if rng.random_range(0..3) == 0 {
            if let Some(block) = flow.blocks.get_mut(&id) {
                for option in &mut block.options {
                    option.next_block_id = None;
                    cut += 1;
                }
            }
        }
    }
    println!("-> Cut {} connection(s).", cut);
}

fn stage_name(index: usize, count: usize) -> &'static str {
    if index == 0 {
        "WELCOME"
    } else if index + 1 == count {
        "OFFER"
    } else if index % 2 == 1 {
        "TRANSITION"
    } else {
        "OFFER"
    }
}
