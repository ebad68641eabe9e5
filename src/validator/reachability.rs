use ahash::AHashMap;
use itertools::Itertools;

use crate::crosslink;
use crate::flow::{Block, FunnelFlow, Stage};

/// Reports every block that normal flow cannot reach.
///
/// A block in any progression stage after the first is orphaned when no
/// block in the immediately preceding stage has a normal option targeting
/// it. Cross-stage mirror slots never feed a block: a block reachable only
/// through an upsell/downsell jump is still orphaned with respect to
/// normal flow.
pub fn find_orphaned_blocks(flow: &FunnelFlow) -> Vec<String> {
    let mut orphaned = Vec::new();
    for (prev, stage) in flow.progression_stages().into_iter().tuple_windows() {
        for block_id in &stage.block_ids {
            let fed = prev
                .block_ids
                .iter()
                .filter_map(|id| flow.blocks.get(id))
                .any(|feeder| feeds(feeder, block_id));
            if !fed {
                orphaned.push(block_id.clone());
            }
        }
    }
    orphaned
}

fn feeds(feeder: &Block, block_id: &str) -> bool {
    feeder.options.iter().enumerate().any(|(index, option)| {
        !crosslink::is_mirror_slot(feeder, index)
            && option.next_block_id.as_deref() == Some(block_id)
    })
}

/// Reports every block with no way forward.
///
/// A cross-stage pointer that leaves the owning stage always provides a
/// forward path. Without one, a block before the last progression stage is
/// broken when the next stage is empty (nowhere to go) or none of its
/// options land there; a block in the last stage is broken when it has
/// options but every one of them is unconnected.
pub fn find_broken_blocks(flow: &FunnelFlow) -> Vec<String> {
    let stages = flow.progression_stages();
    let mut position = AHashMap::new();
    for (index, stage) in stages.iter().enumerate() {
        for id in &stage.block_ids {
            position.insert(id.clone(), index);
        }
    }

    let mut broken = Vec::new();
    for (index, stage) in stages.iter().enumerate() {
        let next_stage = stages.get(index + 1);
        for block_id in &stage.block_ids {
            let Some(block) = flow.blocks.get(block_id) else {
                continue;
            };
            if escapes_stage(block, &position, index) {
                continue;
            }
            let is_broken = match next_stage {
                Some(next) => !reaches_stage(block, next),
                None => {
                    !block.options.is_empty()
                        && block.options.iter().all(|o| o.next_block_id.is_none())
                }
            };
            if is_broken {
                broken.push(block_id.clone());
            }
        }
    }
    broken
}

/// True if an upsell/downsell pointer lands in a different progression
/// stage than the owner's.
fn escapes_stage(block: &Block, position: &AHashMap<String, usize>, own_index: usize) -> bool {
    [&block.upsell_block_id, &block.downsell_block_id]
        .into_iter()
        .flatten()
        .any(|target| position.get(target).is_some_and(|&p| p != own_index))
}

fn reaches_stage(block: &Block, stage: &Stage) -> bool {
    block.options.iter().any(|option| {
        option
            .next_block_id
            .as_deref()
            .is_some_and(|target| stage.block_ids.iter().any(|id| id == target))
    })
}
