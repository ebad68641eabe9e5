//! Pure copy-on-write mutation primitives over [`FunnelFlow`].
//!
//! Every operation takes `&self` and returns a fresh flow. The editing
//! state machine commits by replacing its working copy wholesale and
//! discards by dropping it, so nothing here ever mutates shared state.

use crate::crosslink;
use crate::error::GraphError;
use crate::flow::{
    Block, BlockOption, FunnelFlow, SEND_DM_BLOCK_ID, SEND_DM_STAGE_ID, SEND_DM_STAGE_NAME, Stage,
};

impl FunnelFlow {
    /// Returns a flow with `block` appended to the given stage's block list
    /// and inserted into the block table.
    pub fn add_block_to_stage(&self, stage_id: &str, block: Block) -> Result<FunnelFlow, GraphError> {
        if self.blocks.contains_key(&block.id) {
            return Err(GraphError::DuplicateBlockId {
                block_id: block.id.clone(),
            });
        }
        let mut next = self.clone();
        let stage = next
            .stages
            .iter_mut()
            .find(|s| s.id == stage_id)
            .ok_or_else(|| GraphError::StageNotFound {
                stage_id: stage_id.to_string(),
            })?;
        stage.block_ids.push(block.id.clone());
        next.blocks.insert(block.id.clone(), block);
        Ok(next)
    }

    /// Returns a flow with the block deleted.
    ///
    /// The block leaves both the block table and its stage's list; a stage
    /// emptied this way is removed unless it is the first stage. Options
    /// anywhere that targeted the block are cleared to unconnected (the
    /// option itself is kept), and cross-stage pointers at it are cleared
    /// together with their mirror slots.
    pub fn remove_block(&self, block_id: &str) -> Result<FunnelFlow, GraphError> {
        if !self.blocks.contains_key(block_id) {
            return Err(GraphError::BlockNotFound {
                block_id: block_id.to_string(),
            });
        }
        let mut next = self.clone();
        next.blocks.remove(block_id);

        if let Some(pos) = next
            .stages
            .iter()
            .position(|s| s.block_ids.iter().any(|id| id == block_id))
        {
            let stage = &mut next.stages[pos];
            stage.block_ids.retain(|id| id != block_id);
            if stage.block_ids.is_empty() && pos != 0 {
                next.stages.remove(pos);
            }
        }

        clear_references_to(&mut next, block_id);

        if next.start_block_id == block_id {
            next.start_block_id = next
                .stages
                .first()
                .and_then(|s| s.block_ids.first())
                .cloned()
                .unwrap_or_default();
        }
        Ok(next)
    }

    /// Returns a flow with `stage` inserted immediately after the stage at
    /// `after_index`.
    pub fn append_stage(&self, after_index: usize, stage: Stage) -> Result<FunnelFlow, GraphError> {
        if after_index >= self.stages.len() {
            return Err(GraphError::StageIndexOutOfRange {
                index: after_index,
                len: self.stages.len(),
            });
        }
        if self.stages.iter().any(|s| s.id == stage.id) {
            return Err(GraphError::DuplicateStageId {
                stage_id: stage.id.clone(),
            });
        }
        let mut next = self.clone();
        next.stages.insert(after_index + 1, stage);
        Ok(next)
    }

    /// Returns a flow with one option's target rewired.
    pub fn set_option(
        &self,
        block_id: &str,
        option_index: usize,
        next_block_id: Option<String>,
    ) -> Result<FunnelFlow, GraphError> {
        let mut next = self.clone();
        let block = next
            .blocks
            .get_mut(block_id)
            .ok_or_else(|| GraphError::BlockNotFound {
                block_id: block_id.to_string(),
            })?;
        let len = block.options.len();
        let option = block
            .options
            .get_mut(option_index)
            .ok_or(GraphError::OptionIndexOutOfRange {
                block_id: block_id.to_string(),
                index: option_index,
                len,
            })?;
        option.next_block_id = next_block_id;
        Ok(next)
    }

    /// Returns a flow with a new option appended to the block's branches.
    pub fn push_option(&self, block_id: &str, option: BlockOption) -> Result<FunnelFlow, GraphError> {
        let mut next = self.clone();
        let block = next
            .blocks
            .get_mut(block_id)
            .ok_or_else(|| GraphError::BlockNotFound {
                block_id: block_id.to_string(),
            })?;
        block.options.push(option);
        Ok(next)
    }

    /// Returns a flow with the block's message text replaced.
    pub fn update_block_message(
        &self,
        block_id: &str,
        message: &str,
    ) -> Result<FunnelFlow, GraphError> {
        let mut next = self.clone();
        let block = next
            .blocks
            .get_mut(block_id)
            .ok_or_else(|| GraphError::BlockNotFound {
                block_id: block_id.to_string(),
            })?;
        block.message = message.to_string();
        Ok(next)
    }

    /// Returns a flow with the block's product resource replaced.
    pub fn set_block_resource(
        &self,
        block_id: &str,
        resource_id: Option<String>,
    ) -> Result<FunnelFlow, GraphError> {
        let mut next = self.clone();
        let block = next
            .blocks
            .get_mut(block_id)
            .ok_or_else(|| GraphError::BlockNotFound {
                block_id: block_id.to_string(),
            })?;
        block.resource_id = resource_id;
        Ok(next)
    }

    /// Returns a flow with the one-shot direct-message block synced to the
    /// given text.
    ///
    /// The DM block lives in its own synthetic stage prepended to the flow
    /// exactly while it has real content: a non-empty text creates or
    /// updates block and stage, an empty text removes both together.
    pub fn set_send_dm_message(&self, text: &str) -> FunnelFlow {
        let mut next = self.clone();
        let existing = next
            .blocks
            .values()
            .find(|b| b.send_dm_block)
            .map(|b| b.id.clone());

        match (existing, text.is_empty()) {
            (Some(id), true) => {
                next.blocks.remove(&id);
                if let Some(pos) = next
                    .stages
                    .iter()
                    .position(|s| s.name == SEND_DM_STAGE_NAME)
                {
                    next.stages[pos].block_ids.retain(|b| *b != id);
                    if next.stages[pos].block_ids.is_empty() {
                        next.stages.remove(pos);
                    }
                }
                clear_references_to(&mut next, &id);
            }
            (Some(id), false) => {
                if let Some(block) = next.blocks.get_mut(&id) {
                    block.message = text.to_string();
                }
            }
            (None, false) => {
                let mut block = Block::new(SEND_DM_BLOCK_ID, text);
                block.send_dm_block = true;
                let mut stage = Stage::new(SEND_DM_STAGE_ID, SEND_DM_STAGE_NAME);
                stage.block_ids.push(block.id.clone());
                next.blocks.insert(block.id.clone(), block);
                next.stages.insert(0, stage);
            }
            (None, true) => {}
        }
        next
    }
}

/// Clears every reference to `block_id` across the flow: cross-stage
/// pointers (with their mirror slots and styles) first, then the remaining
/// normal options, which are kept but set to unconnected.
fn clear_references_to(flow: &mut FunnelFlow, block_id: &str) {
    for block in flow.blocks.values_mut() {
        if block.upsell_block_id.as_deref() == Some(block_id) {
            crosslink::clear_in_place(block, crosslink::UpsellKind::Upsell);
        }
        if block.downsell_block_id.as_deref() == Some(block_id) {
            crosslink::clear_in_place(block, crosslink::UpsellKind::Downsell);
        }
        for option in &mut block.options {
            if option.next_block_id.as_deref() == Some(block_id) {
                option.next_block_id = None;
            }
        }
    }
}
