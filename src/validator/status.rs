use std::fmt;

use serde::Serialize;

use crate::flow::{
    CardType, FunnelFlow, FunnelMeta, MerchantType, OFFER_STAGE_NAME, PLACEHOLDER_ID_PREFIX, Stage,
};
use crate::validator::{find_broken_blocks, find_invalid_options, find_orphaned_blocks};

/// Whether the funnel may go live, and if not, the highest-priority reason.
/// All checks are advisory: a draft funnel stays fully editable.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftStatus {
    pub is_draft: bool,
    pub reason: Option<DraftReason>,
}

impl DraftStatus {
    fn live() -> Self {
        DraftStatus {
            is_draft: false,
            reason: None,
        }
    }

    fn draft(reason: DraftReason) -> Self {
        DraftStatus {
            is_draft: true,
            reason: Some(reason),
        }
    }

    /// Operator-facing text for the winning reason.
    pub fn reason_text(&self) -> Option<String> {
        self.reason.map(|r| r.to_string())
    }
}

/// The deployability checks, in priority order. When several fail at once
/// the first one listed here wins; this order is the canonical tie-break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DraftReason {
    MissingTrigger,
    EmptyStage,
    InvalidOptions,
    UnconnectedPlaceholder,
    OrphanedBlocks,
    BrokenBlocks,
    MissingProductResource,
}

impl fmt::Display for DraftReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DraftReason::MissingTrigger => "set a membership or app trigger to go live",
            DraftReason::EmptyStage => "add at least one card to every stage",
            DraftReason::InvalidOptions => "fix options pointing at missing or earlier cards",
            DraftReason::UnconnectedPlaceholder => "connect the newly added card",
            DraftReason::OrphanedBlocks => "connect every card to its previous stage",
            DraftReason::BrokenBlocks => "give every card a path to the next stage",
            DraftReason::MissingProductResource => "select a product for all product cards",
        };
        f.write_str(text)
    }
}

/// Evaluates the deployability checks in their fixed priority order and
/// returns on the first failure.
pub fn compute_draft_status(flow: &FunnelFlow, meta: &FunnelMeta) -> DraftStatus {
    if !meta.has_trigger() {
        return DraftStatus::draft(DraftReason::MissingTrigger);
    }

    let stages = flow.progression_stages();
    if stages.len() > 2
        && stages[1..stages.len() - 1]
            .iter()
            .any(|s| s.block_ids.is_empty())
    {
        return DraftStatus::draft(DraftReason::EmptyStage);
    }

    if !find_invalid_options(flow).is_empty() {
        return DraftStatus::draft(DraftReason::InvalidOptions);
    }

    let unconnected_placeholder = flow
        .blocks
        .values()
        .any(|b| b.id.starts_with(PLACEHOLDER_ID_PREFIX) && !b.has_forward_connection());
    if unconnected_placeholder {
        return DraftStatus::draft(DraftReason::UnconnectedPlaceholder);
    }

    if !find_orphaned_blocks(flow).is_empty() {
        return DraftStatus::draft(DraftReason::OrphanedBlocks);
    }

    if !find_broken_blocks(flow).is_empty() {
        return DraftStatus::draft(DraftReason::BrokenBlocks);
    }

    for stage in &stages {
        if !stage_requires_resource(stage, meta) {
            continue;
        }
        let missing = stage
            .block_ids
            .iter()
            .filter_map(|id| flow.blocks.get(id))
            .any(|b| b.resource_id.is_none());
        if missing {
            return DraftStatus::draft(DraftReason::MissingProductResource);
        }
    }

    DraftStatus::live()
}

/// A stage's blocks need a product resource when the stage is a product
/// card stage, or when it carries no card type but the merchant sells
/// upsells and the stage is an offer stage.
fn stage_requires_resource(stage: &Stage, meta: &FunnelMeta) -> bool {
    match stage.card_type {
        Some(CardType::Product) => true,
        Some(CardType::Qualification) => false,
        None => meta.merchant_type == MerchantType::Upsell && stage.name == OFFER_STAGE_NAME,
    }
}
