use ahash::AHashSet;

use crate::crosslink::{self, UpsellKind};
use crate::flow::{Block, FunnelFlow};

/// Held while the operator decides what kind of card the freshly
/// synthesized stage produces.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingCardType {
    pub source_block_id: String,
    pub option_text: String,
    /// `Some` when the action rewires an existing option (a reconnect).
    pub option_index: Option<usize>,
    pub new_block_id: String,
    pub new_stage_id: String,
    /// The option's target before the reconnect started, restored on cancel.
    pub previous_next_block_id: Option<String>,
    /// `Some` when the action assigns a cross-stage pointer instead of a
    /// normal option.
    pub upsell_kind: Option<UpsellKind>,
}

/// Held while the operator picks the target block: the placeholder just
/// created, or an existing one.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingOptionTarget {
    pub source_block_id: String,
    pub option_text: String,
    pub option_index: Option<usize>,
    pub new_block_id: String,
    /// `Some` when the stage holding the placeholder was synthesized as
    /// part of this action.
    pub new_stage_id: Option<String>,
    /// Blocks that already lived in the target stage when the action began.
    pub sibling_block_ids: Vec<String>,
    pub previous_next_block_id: Option<String>,
    pub upsell_kind: Option<UpsellKind>,
    /// Set for a cross-link action anchored in the last stage: no existing
    /// block above the source may be chosen, only the placeholder.
    pub only_placeholder_selectable: bool,
}

/// Held between the impact preview and the confirming invocation of a
/// delete.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingDelete {
    pub block_id: String,
    pub impact: DeleteImpact,
}

/// Everything a delete would touch, computed without mutating the flow so
/// the operator can be shown the blast radius first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteImpact {
    /// Normal options anywhere that target the doomed block, as
    /// `(owning block id, option index)`. Mirror slots are reported
    /// through the pointer lists instead.
    pub inbound_options: Vec<(String, usize)>,
    /// Blocks whose upsell pointer targets the doomed block.
    pub inbound_upsells: Vec<String>,
    /// Blocks whose downsell pointer targets the doomed block.
    pub inbound_downsells: Vec<String>,
    /// Where the doomed block itself leads, deduplicated in option order.
    pub outgoing_targets: Vec<String>,
}

impl DeleteImpact {
    pub fn compute(flow: &FunnelFlow, block_id: &str) -> Self {
        let mut impact = DeleteImpact::default();

        let mut visit = |block: &Block| {
            for (index, option) in block.options.iter().enumerate() {
                if crosslink::is_mirror_slot(block, index) {
                    continue;
                }
                if option.next_block_id.as_deref() == Some(block_id) {
                    impact.inbound_options.push((block.id.clone(), index));
                }
            }
            if block.upsell_block_id.as_deref() == Some(block_id) {
                impact.inbound_upsells.push(block.id.clone());
            }
            if block.downsell_block_id.as_deref() == Some(block_id) {
                impact.inbound_downsells.push(block.id.clone());
            }
        };
        for stage in &flow.stages {
            for id in &stage.block_ids {
                if let Some(block) = flow.blocks.get(id) {
                    visit(block);
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
            visit(block);
        }

        if let Some(block) = flow.blocks.get(block_id) {
            let mut seen = AHashSet::new();
            let pointers = [&block.upsell_block_id, &block.downsell_block_id];
            let targets = block
                .options
                .iter()
                .filter_map(|o| o.next_block_id.as_ref())
                .chain(pointers.into_iter().flatten());
            for target in targets {
                if seen.insert(target.clone()) {
                    impact.outgoing_targets.push(target.clone());
                }
            }
        }
        impact
    }

    pub fn is_empty(&self) -> bool {
        self.inbound_options.is_empty()
            && self.inbound_upsells.is_empty()
            && self.inbound_downsells.is_empty()
            && self.outgoing_targets.is_empty()
    }
}
