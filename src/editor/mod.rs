//! The connection-editing state machine.
//!
//! [`ConnectionEditor`] wraps the pure graph primitives and the validator
//! behind the interactive protocol a builder UI drives: every edit runs on
//! a working copy of the flow, exactly one action can be pending at a
//! time, and nothing reaches the persistence collaborator until the
//! terminal transition of the action commits. Cancelling restores the flow
//! value that existed before the action began.

use crate::crosslink::{self, UpsellKind};
use crate::error::{EditError, GraphError};
use crate::flow::{
    Block, BlockOption, CardType, FunnelFlow, FunnelMeta, OFFER_STAGE_NAME,
    PLACEHOLDER_ID_PREFIX, QUALIFICATION_STAGE_NAME, STAGE_ID_PREFIX, Stage,
};
use crate::validator::{DraftStatus, Highlights, compute_draft_status};

mod pending;
pub use pending::{DeleteImpact, PendingCardType, PendingDelete, PendingOptionTarget};

/// The persistence collaborator. Called once per committed mutation; it
/// owns storage and propagation to other consumers (renderer, chat-preview
/// walker). The core does not retry on its behalf.
pub trait FlowSink {
    fn on_update(&mut self, flow: &FunnelFlow);
}

/// A sink that drops every update, for read-only inspection tools.
#[derive(Debug, Default)]
pub struct DiscardSink;

impl FlowSink for DiscardSink {
    fn on_update(&mut self, _flow: &FunnelFlow) {}
}

/// Adapts a closure into a [`FlowSink`].
pub struct FnSink<F: FnMut(&FunnelFlow)>(pub F);

impl<F: FnMut(&FunnelFlow)> FlowSink for FnSink<F> {
    fn on_update(&mut self, flow: &FunnelFlow) {
        (self.0)(flow)
    }
}

/// Every piece of in-flight editing state, as one tagged union: only one
/// edit can be pending, and every field needed to resume or cancel it is
/// colocated with its tag.
#[derive(Debug, Clone, PartialEq)]
pub enum EditingState {
    Idle,
    PendingCardTypeSelection(PendingCardType),
    PendingOptionSelection(PendingOptionTarget),
    PendingDelete(PendingDelete),
}

impl EditingState {
    pub fn is_idle(&self) -> bool {
        matches!(self, EditingState::Idle)
    }
}

/// The interactive editing protocol over a funnel graph.
pub struct ConnectionEditor<S: FlowSink> {
    flow: FunnelFlow,
    state: EditingState,
    highlights: Highlights,
    /// Snapshot taken when an action begins, restored on cancel.
    saved: Option<FunnelFlow>,
    sink: S,
    id_seq: u64,
}

impl<S: FlowSink> ConnectionEditor<S> {
    pub fn new(flow: FunnelFlow, sink: S) -> Self {
        let highlights = Highlights::compute(&flow);
        ConnectionEditor {
            flow,
            state: EditingState::Idle,
            highlights,
            saved: None,
            sink,
            id_seq: 0,
        }
    }

    /// The current working copy.
    pub fn flow(&self) -> &FunnelFlow {
        &self.flow
    }

    pub fn state(&self) -> &EditingState {
        &self.state
    }

    /// Highlight sets from the last committed mutation.
    pub fn highlights(&self) -> &Highlights {
        &self.highlights
    }

    pub fn draft_status(&self, meta: &FunnelMeta) -> DraftStatus {
        compute_draft_status(&self.flow, meta)
    }

    pub fn into_flow(self) -> FunnelFlow {
        self.flow
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Starts attaching a new branch from `source_block_id`.
    ///
    /// A placeholder block is created in the next stage, or — when the
    /// source sits in the last stage — a stage is synthesized first and
    /// the card-type question is asked before target selection.
    pub fn begin_option_edit(
        &mut self,
        source_block_id: &str,
        option_text: &str,
    ) -> Result<(), EditError> {
        if !self.state.is_idle() {
            return Err(EditError::SelectionAlreadyPending);
        }
        self.begin_connect(source_block_id, option_text, None, None)
    }

    /// Starts rewiring an existing option to a different target. The
    /// option's previous target is remembered and restored on cancel.
    pub fn begin_option_reconnect(
        &mut self,
        source_block_id: &str,
        option_index: usize,
    ) -> Result<(), EditError> {
        if !self.state.is_idle() {
            return Err(EditError::SelectionAlreadyPending);
        }
        let block = self
            .flow
            .block(source_block_id)
            .ok_or_else(|| GraphError::BlockNotFound {
                block_id: source_block_id.to_string(),
            })?;
        let option =
            block
                .options
                .get(option_index)
                .ok_or(GraphError::OptionIndexOutOfRange {
                    block_id: source_block_id.to_string(),
                    index: option_index,
                    len: block.options.len(),
                })?;
        let option_text = option.text.clone();
        self.begin_connect(source_block_id, &option_text, Some(option_index), None)
    }

    /// Starts assigning an upsell or downsell pointer from
    /// `source_block_id`.
    ///
    /// Re-invoking the same action while it is already pending is a no-op;
    /// switching kind on the same source discards the stale placeholder
    /// before starting over. Any other overlap is a precondition
    /// violation.
    pub fn begin_upsell(
        &mut self,
        source_block_id: &str,
        kind: UpsellKind,
        option_text: &str,
    ) -> Result<(), EditError> {
        match &self.state {
            EditingState::Idle => {}
            EditingState::PendingCardTypeSelection(p)
                if p.source_block_id == source_block_id && p.upsell_kind.is_some() =>
            {
                if p.upsell_kind == Some(kind) {
                    return Ok(());
                }
                self.cancel()?;
            }
            EditingState::PendingOptionSelection(p)
                if p.source_block_id == source_block_id && p.upsell_kind.is_some() =>
            {
                if p.upsell_kind == Some(kind) {
                    return Ok(());
                }
                self.cancel()?;
            }
            _ => return Err(EditError::SelectionAlreadyPending),
        }
        self.begin_connect(source_block_id, option_text, None, Some(kind))
    }

    /// Finalizes the synthesized stage's card type.
    ///
    /// A reconnect commits directly to the placeholder; anything else
    /// moves on to target selection.
    pub fn choose_card_type(&mut self, card_type: CardType) -> Result<(), EditError> {
        let EditingState::PendingCardTypeSelection(pending) = &self.state else {
            return Err(EditError::NoCardTypePending);
        };
        let pending = pending.clone();

        let mut flow = self.flow.clone();
        if let Some(stage) = flow.stages.iter_mut().find(|s| s.id == pending.new_stage_id) {
            stage.card_type = Some(card_type);
            stage.name = match card_type {
                CardType::Product => OFFER_STAGE_NAME,
                CardType::Qualification => QUALIFICATION_STAGE_NAME,
            }
            .to_string();
        }
        self.flow = flow;

        if let (Some(index), None) = (pending.option_index, pending.upsell_kind) {
            self.flow = self.flow.set_option(
                &pending.source_block_id,
                index,
                Some(pending.new_block_id.clone()),
            )?;
            self.state = EditingState::Idle;
            self.commit();
            return Ok(());
        }

        self.state = EditingState::PendingOptionSelection(PendingOptionTarget {
            source_block_id: pending.source_block_id,
            option_text: pending.option_text,
            option_index: pending.option_index,
            new_block_id: pending.new_block_id,
            new_stage_id: Some(pending.new_stage_id),
            sibling_block_ids: Vec::new(),
            previous_next_block_id: pending.previous_next_block_id,
            upsell_kind: pending.upsell_kind,
            only_placeholder_selectable: pending.upsell_kind.is_some(),
        });
        Ok(())
    }

    /// Commits the pending action to the chosen target and returns to
    /// idle.
    ///
    /// Choosing the placeholder keeps it; choosing an existing block
    /// discards the placeholder (and a synthesized stage it leaves empty)
    /// before wiring the connection. The committed flow is pushed to the
    /// sink.
    pub fn choose_target(&mut self, target_block_id: &str) -> Result<(), EditError> {
        let EditingState::PendingOptionSelection(pending) = &self.state else {
            return Err(EditError::NoTargetPending);
        };
        let pending = pending.clone();

        if let Some(kind) = pending.upsell_kind {
            return self.commit_cross_target(pending, kind, target_block_id);
        }

        let keep_placeholder = target_block_id == pending.new_block_id;
        if !keep_placeholder
            && !pending
                .sibling_block_ids
                .iter()
                .any(|id| id == target_block_id)
        {
            return Err(EditError::TargetNotSelectable {
                block_id: target_block_id.to_string(),
            });
        }

        let mut flow = self.flow.clone();
        if !keep_placeholder {
            flow = flow.remove_block(&pending.new_block_id)?;
        }
        flow = match pending.option_index {
            Some(index) => flow.set_option(
                &pending.source_block_id,
                index,
                Some(target_block_id.to_string()),
            )?,
            None => flow.push_option(
                &pending.source_block_id,
                BlockOption {
                    text: pending.option_text.clone(),
                    next_block_id: Some(target_block_id.to_string()),
                },
            )?,
        };
        self.flow = flow;
        self.state = EditingState::Idle;
        self.commit();
        Ok(())
    }

    /// Aborts the pending action without persisting anything. For
    /// connection actions the flow is restored to the value it had before
    /// the action began (placeholder gone, a reconnect's previous target
    /// back in place); a pending delete is simply discarded.
    pub fn cancel(&mut self) -> Result<(), EditError> {
        match &self.state {
            EditingState::Idle => Err(EditError::NothingPending),
            EditingState::PendingDelete(_) => {
                self.state = EditingState::Idle;
                Ok(())
            }
            _ => {
                if let Some(saved) = self.saved.take() {
                    self.flow = saved;
                }
                self.state = EditingState::Idle;
                Ok(())
            }
        }
    }

    /// First phase of a delete: computes and returns the impact without
    /// mutating anything.
    pub fn begin_delete(&mut self, block_id: &str) -> Result<DeleteImpact, EditError> {
        if !self.state.is_idle() {
            return Err(EditError::SelectionAlreadyPending);
        }
        if !self.flow.blocks.contains_key(block_id) {
            return Err(GraphError::BlockNotFound {
                block_id: block_id.to_string(),
            }
            .into());
        }
        let impact = DeleteImpact::compute(&self.flow, block_id);
        self.state = EditingState::PendingDelete(PendingDelete {
            block_id: block_id.to_string(),
            impact: impact.clone(),
        });
        Ok(impact)
    }

    /// Second phase of a delete: removes the block, recomputes the
    /// highlight sets on the resulting graph and persists it. The
    /// highlights stay on until the operator reconnects everything.
    pub fn confirm_delete(&mut self) -> Result<(), EditError> {
        let EditingState::PendingDelete(pending) = &self.state else {
            return Err(EditError::NoDeletePending);
        };
        let block_id = pending.block_id.clone();
        self.flow = self.flow.remove_block(&block_id)?;
        self.state = EditingState::Idle;
        self.commit();
        Ok(())
    }

    /// Committed single-block edit: replaces the message text.
    pub fn update_block_message(
        &mut self,
        block_id: &str,
        message: &str,
    ) -> Result<(), EditError> {
        if !self.state.is_idle() {
            return Err(EditError::SelectionAlreadyPending);
        }
        self.flow = self.flow.update_block_message(block_id, message)?;
        self.commit();
        Ok(())
    }

    /// Committed single-block edit: replaces the product resource.
    pub fn set_block_resource(
        &mut self,
        block_id: &str,
        resource_id: Option<String>,
    ) -> Result<(), EditError> {
        if !self.state.is_idle() {
            return Err(EditError::SelectionAlreadyPending);
        }
        self.flow = self.flow.set_block_resource(block_id, resource_id)?;
        self.commit();
        Ok(())
    }

    /// Committed edit of the one-shot DM text; creates or removes the
    /// synthetic SEND_DM stage as the content appears or goes away.
    pub fn set_send_dm_message(&mut self, text: &str) -> Result<(), EditError> {
        if !self.state.is_idle() {
            return Err(EditError::SelectionAlreadyPending);
        }
        self.flow = self.flow.set_send_dm_message(text);
        self.commit();
        Ok(())
    }

    /// Shared entry for the connection flows: snapshots the flow, mints
    /// the placeholder, and decides which selection question comes first.
    fn begin_connect(
        &mut self,
        source_block_id: &str,
        option_text: &str,
        option_index: Option<usize>,
        upsell_kind: Option<UpsellKind>,
    ) -> Result<(), EditError> {
        let source = self
            .flow
            .block(source_block_id)
            .ok_or_else(|| GraphError::BlockNotFound {
                block_id: source_block_id.to_string(),
            })?;
        let previous_next_block_id = match option_index {
            Some(index) => {
                source
                    .options
                    .get(index)
                    .ok_or(GraphError::OptionIndexOutOfRange {
                        block_id: source_block_id.to_string(),
                        index,
                        len: source.options.len(),
                    })?
                    .next_block_id
                    .clone()
            }
            None => None,
        };
        let source_stage_index = self.flow.stage_index_of_block(source_block_id).ok_or_else(
            || EditError::BlockOutsideStages {
                block_id: source_block_id.to_string(),
            },
        )?;
        let source_progression_index = self
            .flow
            .progression_index_of_block(source_block_id)
            .ok_or_else(|| EditError::BlockOutsideStages {
                block_id: source_block_id.to_string(),
            })?;

        let next_stage = self
            .flow
            .progression_stages()
            .get(source_progression_index + 1)
            .map(|s| (s.id.clone(), s.block_ids.clone()));

        let snapshot = self.flow.clone();
        let new_block_id = self.mint_block_id();

        match next_stage {
            None => {
                let new_stage_id = self.mint_stage_id();
                let flow = self
                    .flow
                    .append_stage(source_stage_index, Stage::new(&new_stage_id, ""))?
                    .add_block_to_stage(&new_stage_id, Block::new(&new_block_id, ""))?;
                self.flow = flow;
                self.saved = Some(snapshot);
                self.state = EditingState::PendingCardTypeSelection(PendingCardType {
                    source_block_id: source_block_id.to_string(),
                    option_text: option_text.to_string(),
                    option_index,
                    new_block_id,
                    new_stage_id,
                    previous_next_block_id,
                    upsell_kind,
                });
            }
            Some((stage_id, sibling_block_ids)) => {
                let flow = self
                    .flow
                    .add_block_to_stage(&stage_id, Block::new(&new_block_id, ""))?;
                self.flow = flow;
                self.saved = Some(snapshot);
                self.state = EditingState::PendingOptionSelection(PendingOptionTarget {
                    source_block_id: source_block_id.to_string(),
                    option_text: option_text.to_string(),
                    option_index,
                    new_block_id,
                    new_stage_id: None,
                    sibling_block_ids,
                    previous_next_block_id,
                    upsell_kind,
                    only_placeholder_selectable: false,
                });
            }
        }
        Ok(())
    }

    /// Terminal transition of the upsell/downsell flow: writes the pointer
    /// through the link manager and persists.
    fn commit_cross_target(
        &mut self,
        pending: PendingOptionTarget,
        kind: UpsellKind,
        target_block_id: &str,
    ) -> Result<(), EditError> {
        let keep_placeholder = target_block_id == pending.new_block_id;
        if pending.only_placeholder_selectable && !keep_placeholder {
            return Err(EditError::TargetNotSelectable {
                block_id: target_block_id.to_string(),
            });
        }
        if target_block_id == pending.source_block_id {
            return Err(EditError::TargetNotSelectable {
                block_id: target_block_id.to_string(),
            });
        }
        if !self.flow.blocks.contains_key(target_block_id) {
            return Err(GraphError::BlockNotFound {
                block_id: target_block_id.to_string(),
            }
            .into());
        }

        let mut flow = self.flow.clone();
        if !keep_placeholder {
            flow = flow.remove_block(&pending.new_block_id)?;
        }
        flow = crosslink::assign(
            &flow,
            &pending.source_block_id,
            kind,
            target_block_id,
            &pending.option_text,
        )?;
        self.flow = flow;
        self.state = EditingState::Idle;
        self.commit();
        Ok(())
    }

    /// Seals a mutation: the highlight sets are refreshed on the new flow
    /// and the sink is notified exactly once.
    fn commit(&mut self) {
        self.saved = None;
        self.highlights = Highlights::compute(&self.flow);
        self.sink.on_update(&self.flow);
    }

    fn mint_block_id(&mut self) -> String {
        loop {
            self.id_seq += 1;
            let id = format!("{}{}", PLACEHOLDER_ID_PREFIX, self.id_seq);
            if !self.flow.blocks.contains_key(&id) {
                return id;
            }
        }
    }

    fn mint_stage_id(&mut self) -> String {
        loop {
            self.id_seq += 1;
            let id = format!("{}{}", STAGE_ID_PREFIX, self.id_seq);
            if self.flow.stage(&id).is_none() {
                return id;
            }
        }
    }
}
