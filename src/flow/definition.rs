use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Id prefix for blocks minted by the editor during an in-progress action.
/// The draft-status check for "new card not yet connected" keys off it.
pub const PLACEHOLDER_ID_PREFIX: &str = "placeholder_";

/// Id prefix for stages synthesized by the editor.
pub const STAGE_ID_PREFIX: &str = "stage_";

/// Name of the synthetic stage holding the one-shot direct-message block.
/// This stage sits outside the funnel's temporal progression.
pub const SEND_DM_STAGE_NAME: &str = "SEND_DM";

/// Fixed id of the synthetic direct-message stage.
pub const SEND_DM_STAGE_ID: &str = "stage_send_dm";

/// Fixed id of the one-shot direct-message block.
pub const SEND_DM_BLOCK_ID: &str = "block_send_dm";

/// Stage name whose blocks require a product resource for upsell merchants.
pub const OFFER_STAGE_NAME: &str = "OFFER";

/// Name given to a synthesized stage finalized as a qualification stage.
pub const QUALIFICATION_STAGE_NAME: &str = "QUALIFICATION";

/// The complete, canonical definition of a conversational funnel graph.
/// This is the single structure every other part of the crate consumes:
/// the mutation primitives produce new values of it, the validator reads
/// it, and the editing state machine commits it to the persistence sink.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelFlow {
    /// Entry point of the conversation.
    pub start_block_id: String,
    /// Ordered stages; the order is the funnel's temporal progression.
    pub stages: Vec<Stage>,
    /// Every block in the funnel, keyed by id.
    pub blocks: AHashMap<String, Block>,
}

/// One phase of the conversation: an ordered grouping of blocks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub id: String,
    /// Category label, e.g. "WELCOME", "OFFER", "TRANSITION". Some names
    /// carry semantics: `SEND_DM` marks the synthetic DM stage, `OFFER`
    /// feeds the product-resource draft check.
    pub name: String,
    pub explanation: String,
    /// Blocks rendered left-to-right in this stage.
    pub block_ids: Vec<String>,
    /// Inherited by new blocks created inside the stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_type: Option<CardType>,
}

/// The kind of card a stage produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    Qualification,
    Product,
}

/// A single message node with branching options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: String,
    pub message: String,
    /// Branches a customer can pick. When the block owns a cross-stage
    /// pointer, the reserved mirror slots sit at the front of this list.
    pub options: Vec<BlockOption>,
    /// Opaque link to an external product resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    /// Cross-stage upsell pointer. Mutually exclusive with the downsell
    /// pointer per target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upsell_block_id: Option<String>,
    /// Cross-stage downsell pointer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downsell_block_id: Option<String>,
    /// Visual style assigned to the upsell arrow when it skips past the
    /// immediately next stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upsell_style: Option<ArrowStyle>,
    /// Visual style assigned to the downsell arrow, same rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downsell_style: Option<ArrowStyle>,
    /// Marks the single one-shot direct-message block.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub send_dm_block: bool,
}

/// One branch leading to another block. A `None` target is the transient
/// "unconnected" state, only expected while an edit is in flight.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockOption {
    pub text: String,
    pub next_block_id: Option<String>,
}

/// Opaque id of a visual style for cross-stage arrows. The pool is
/// funnel-scoped; only "used vs. unused" is core semantics, what a style
/// looks like is the renderer's business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArrowStyle(pub u8);

impl Block {
    /// Creates a bare block with a message and no connections.
    pub fn new(id: &str, message: &str) -> Self {
        Block {
            id: id.to_string(),
            message: message.to_string(),
            ..Block::default()
        }
    }

    /// True if any branch or cross-stage pointer leads somewhere.
    pub fn has_forward_connection(&self) -> bool {
        self.upsell_block_id.is_some()
            || self.downsell_block_id.is_some()
            || self.options.iter().any(|o| o.next_block_id.is_some())
    }
}

impl Stage {
    pub fn new(id: &str, name: &str) -> Self {
        Stage {
            id: id.to_string(),
            name: name.to_string(),
            ..Stage::default()
        }
    }
}

impl FunnelFlow {
    /// The lifecycle's creation point: one welcome block in one WELCOME
    /// stage, no connections.
    pub fn minimal() -> Self {
        let welcome = Block::new("block_welcome", "");
        let mut stage = Stage::new("stage_welcome", "WELCOME");
        stage.block_ids.push(welcome.id.clone());

        let mut blocks = AHashMap::new();
        blocks.insert(welcome.id.clone(), welcome);

        FunnelFlow {
            start_block_id: "block_welcome".to_string(),
            stages: vec![stage],
            blocks,
        }
    }

    pub fn stage(&self, stage_id: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.id == stage_id)
    }

    pub fn block(&self, block_id: &str) -> Option<&Block> {
        self.blocks.get(block_id)
    }

    /// Index (into `stages`) of the stage whose list contains the block.
    pub fn stage_index_of_block(&self, block_id: &str) -> Option<usize> {
        self.stages
            .iter()
            .position(|s| s.block_ids.iter().any(|id| id == block_id))
    }

    pub fn stage_of_block(&self, block_id: &str) -> Option<&Stage> {
        self.stage_index_of_block(block_id)
            .map(|idx| &self.stages[idx])
    }

    /// The stages that form the temporal progression, i.e. everything
    /// except the synthetic SEND_DM stage. All stage-adjacency reasoning
    /// (orphans, broken blocks, "next stage") runs over this view.
    pub fn progression_stages(&self) -> Vec<&Stage> {
        self.stages
            .iter()
            .filter(|s| s.name != SEND_DM_STAGE_NAME)
            .collect()
    }

    /// Position of a block within the progression, if it belongs to one
    /// of the progression stages.
    pub fn progression_index_of_block(&self, block_id: &str) -> Option<usize> {
        self.progression_stages()
            .iter()
            .position(|s| s.block_ids.iter().any(|id| id == block_id))
    }
}
