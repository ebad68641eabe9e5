//! Rules for the two special cross-stage pointers a block may hold.
//!
//! Upsell and downsell pointers are distinct from ordinary options: they may
//! jump anywhere in the funnel (backward included), they are mutually
//! exclusive per target, and they are restated as reserved mirror slots at
//! the front of the owning block's options list so the branch is visible to
//! the chat walker. Arrows that skip past the immediately next stage get a
//! funnel-unique visual style from a pool this module manages; what a style
//! looks like is the renderer's business.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::flow::{ArrowStyle, Block, BlockOption, FunnelFlow};

/// Which of the two cross-stage pointers an action addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsellKind {
    Upsell,
    Downsell,
}

/// Returns a flow with the pointer of `kind` on `source_id` set to
/// `target_id`.
///
/// If the *other* pointer currently holds the same target it is cleared
/// first (a target cannot be both upsell and downsell). The mirror slot is
/// created or rewired to restate the pointer, and the arrow style is
/// refreshed: cleared when the target sits in the immediately next
/// progression stage, otherwise assigned a previously unused style.
pub fn assign(
    flow: &FunnelFlow,
    source_id: &str,
    kind: UpsellKind,
    target_id: &str,
    option_text: &str,
) -> Result<FunnelFlow, GraphError> {
    if !flow.blocks.contains_key(target_id) {
        return Err(GraphError::BlockNotFound {
            block_id: target_id.to_string(),
        });
    }
    let mut next = flow.clone();
    let source_index = next.progression_index_of_block(source_id);
    let target_index = next.progression_index_of_block(target_id);

    {
        let block = next
            .blocks
            .get_mut(source_id)
            .ok_or_else(|| GraphError::BlockNotFound {
                block_id: source_id.to_string(),
            })?;

        match kind {
            UpsellKind::Upsell => {
                if block.downsell_block_id.as_deref() == Some(target_id) {
                    clear_in_place(block, UpsellKind::Downsell);
                }
            }
            UpsellKind::Downsell => {
                if block.upsell_block_id.as_deref() == Some(target_id) {
                    clear_in_place(block, UpsellKind::Upsell);
                }
            }
        }

        let (upsell_slot, downsell_slot) = mirror_slots(block);
        let slot = match kind {
            UpsellKind::Upsell => upsell_slot,
            UpsellKind::Downsell => downsell_slot,
        };
        match kind {
            UpsellKind::Upsell => {
                block.upsell_style = None;
                block.upsell_block_id = Some(target_id.to_string());
            }
            UpsellKind::Downsell => {
                block.downsell_style = None;
                block.downsell_block_id = Some(target_id.to_string());
            }
        }
        match slot {
            Some(position) => {
                block.options[position].text = option_text.to_string();
                block.options[position].next_block_id = Some(target_id.to_string());
            }
            None => {
                // the upsell mirror always sits ahead of the downsell mirror
                let at = match kind {
                    UpsellKind::Upsell => 0,
                    UpsellKind::Downsell => usize::from(upsell_slot.is_some()),
                };
                block.options.insert(
                    at.min(block.options.len()),
                    BlockOption {
                        text: option_text.to_string(),
                        next_block_id: Some(target_id.to_string()),
                    },
                );
            }
        }
    }

    let skips_next_stage = match (source_index, target_index) {
        (Some(source), Some(target)) => target != source + 1,
        // a target outside the progression always renders as a
        // cross-stage arrow
        _ => true,
    };
    let style = skips_next_stage.then(|| pick_unused_style(&next));
    if let Some(block) = next.blocks.get_mut(source_id) {
        match kind {
            UpsellKind::Upsell => block.upsell_style = style,
            UpsellKind::Downsell => block.downsell_style = style,
        }
    }
    Ok(next)
}

/// Returns a flow with the pointer of `kind` on `source_id` cleared, along
/// with its mirror slot and arrow style.
pub fn clear(
    flow: &FunnelFlow,
    source_id: &str,
    kind: UpsellKind,
) -> Result<FunnelFlow, GraphError> {
    let mut next = flow.clone();
    let block = next
        .blocks
        .get_mut(source_id)
        .ok_or_else(|| GraphError::BlockNotFound {
            block_id: source_id.to_string(),
        })?;
    clear_in_place(block, kind);
    Ok(next)
}

/// Picks the first arrow style not assigned anywhere in the funnel, so two
/// concurrent cross-stage links never render identically.
pub fn pick_unused_style(flow: &FunnelFlow) -> ArrowStyle {
    let used: AHashSet<u8> = flow
        .blocks
        .values()
        .flat_map(|b| b.upsell_style.iter().chain(b.downsell_style.iter()))
        .map(|s| s.0)
        .collect();
    let id = (0..=u8::MAX).find(|i| !used.contains(i)).unwrap_or(u8::MAX);
    ArrowStyle(id)
}

/// True if the option at `index` is a reserved cross-link mirror slot.
///
/// A mirror is the first option among the first two whose target restates
/// the owning pointer; an ordinary option that merely shares a target with
/// a pointer is not a mirror.
pub fn is_mirror_slot(block: &Block, index: usize) -> bool {
    let (upsell_slot, downsell_slot) = mirror_slots(block);
    upsell_slot == Some(index) || downsell_slot == Some(index)
}

/// Resolves the positions of the two mirror slots, upsell first. The
/// downsell resolution skips the upsell's slot so one option can never
/// stand in for both pointers.
pub(crate) fn mirror_slots(block: &Block) -> (Option<usize>, Option<usize>) {
    let find = |target: Option<&str>, skip: Option<usize>| -> Option<usize> {
        let target = target?;
        block
            .options
            .iter()
            .take(2)
            .enumerate()
            .find(|(index, option)| {
                Some(*index) != skip && option.next_block_id.as_deref() == Some(target)
            })
            .map(|(index, _)| index)
    };
    let upsell = find(block.upsell_block_id.as_deref(), None);
    let downsell = find(block.downsell_block_id.as_deref(), upsell);
    (upsell, downsell)
}

/// Clears one pointer on a block together with its mirror slot and style.
pub(crate) fn clear_in_place(block: &mut Block, kind: UpsellKind) {
    let (upsell_slot, downsell_slot) = mirror_slots(block);
    let slot = match kind {
        UpsellKind::Upsell => {
            block.upsell_style = None;
            block.upsell_block_id = None;
            upsell_slot
        }
        UpsellKind::Downsell => {
            block.downsell_style = None;
            block.downsell_block_id = None;
            downsell_slot
        }
    };
    if let Some(position) = slot {
        block.options.remove(position);
    }
}
