use ahash::AHashMap;
use serde::Serialize;

use crate::crosslink;
use crate::flow::{Block, FunnelFlow};

/// One option that points somewhere it should not. Never fatal: invalid
/// options are surfaced as highlights and draft reasons, editing continues.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidOption {
    pub block_id: String,
    pub option_index: usize,
    pub reason: InvalidOptionReason,
}

/// Why an option is invalid, in check order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum InvalidOptionReason {
    /// The target id exists nowhere in the block table. Tolerated, never
    /// auto-fixed.
    MissingTarget,
    /// The target block exists but belongs to no stage.
    TargetOutsideStages,
    /// The target sits in an earlier stage than the option's owner.
    TargetInEarlierStage,
}

/// Scans every option in the flow and reports the invalid ones.
///
/// Reserved cross-link mirror slots are exempt from the stage checks (cross
/// jumps, backward ones included, are intentional there) but not from the
/// missing-target check. Unconnected options (`None` target) are the legal
/// transient state and are not invalid; `find_broken_blocks` picks them up.
///
/// Pure and total: the same flow always yields the same list, in stage
/// order, with blocks outside every stage checked last in id order.
pub fn find_invalid_options(flow: &FunnelFlow) -> Vec<InvalidOption> {
    let mut position = AHashMap::new();
    for (index, stage) in flow.progression_stages().iter().enumerate() {
        for id in &stage.block_ids {
            position.insert(id.clone(), index);
        }
    }

    let mut found = Vec::new();
    for stage in &flow.stages {
        for id in &stage.block_ids {
            if let Some(block) = flow.blocks.get(id) {
                check_block(flow, &position, block, &mut found);
            }
        }
    }

    let mut strays: Vec<&Block> = flow
        .blocks
        .values()
        .filter(|b| flow.stage_index_of_block(&b.id).is_none())
        .collect();
    strays.sort_by(|a, b| a.id.cmp(&b.id));
    for block in strays {
        check_block(flow, &position, block, &mut found);
    }
    found
}

fn check_block(
    flow: &FunnelFlow,
    position: &AHashMap<String, usize>,
    block: &Block,
    found: &mut Vec<InvalidOption>,
) {
    for (index, option) in block.options.iter().enumerate() {
        let Some(target) = option.next_block_id.as_deref() else {
            continue;
        };
        let reason = if !flow.blocks.contains_key(target) {
            Some(InvalidOptionReason::MissingTarget)
        } else if crosslink::is_mirror_slot(block, index) {
            None
        } else if flow.stage_index_of_block(target).is_none() {
            Some(InvalidOptionReason::TargetOutsideStages)
        } else {
            match (position.get(&block.id), position.get(target)) {
                (Some(owner), Some(found_at)) if found_at < owner => {
                    Some(InvalidOptionReason::TargetInEarlierStage)
                }
                _ => None,
            }
        };
        if let Some(reason) = reason {
            found.push(InvalidOption {
                block_id: block.id.clone(),
                option_index: index,
                reason,
            });
        }
    }
}
