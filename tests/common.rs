//! Common test utilities for building funnel flows and metadata.
use trichter::prelude::*;

/// A sink that records every committed flow, so tests can assert on what
/// would have been persisted.
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub updates: Vec<FunnelFlow>,
}

impl FlowSink for RecordingSink {
    fn on_update(&mut self, flow: &FunnelFlow) {
        self.updates.push(flow.clone());
    }
}

/// Creates the baseline two-stage funnel:
///
/// `WELCOME:[w1] -> OFFER:[o1]`, with `w1.options = [Go -> o1]`, the offer
/// stage a product card stage and `o1` holding a resource.
#[allow(dead_code)]
pub fn two_stage_flow() -> FunnelFlow {
    let mut w1 = Block::new("w1", "Welcome! Ready for more?");
    w1.options.push(BlockOption {
        text: "Go".to_string(),
        next_block_id: Some("o1".to_string()),
    });
    let mut o1 = Block::new("o1", "Here is the offer");
    o1.resource_id = Some("prod_1".to_string());

    let mut welcome = Stage::new("stage_welcome", "WELCOME");
    welcome.block_ids.push("w1".to_string());
    let mut offer = Stage::new("stage_offer", "OFFER");
    offer.card_type = Some(CardType::Product);
    offer.block_ids.push("o1".to_string());

    let mut flow = FunnelFlow {
        start_block_id: "w1".to_string(),
        stages: vec![welcome, offer],
        blocks: Default::default(),
    };
    flow.blocks.insert("w1".to_string(), w1);
    flow.blocks.insert("o1".to_string(), o1);
    flow
}

/// Creates a three-stage funnel:
///
/// `WELCOME:[w1] -> TRANSITION:[t1] -> OFFER:[o1, o2]`, fully connected,
/// every offer block holding a resource.
#[allow(dead_code)]
pub fn three_stage_flow() -> FunnelFlow {
    let mut w1 = Block::new("w1", "Welcome!");
    w1.options.push(BlockOption {
        text: "Start".to_string(),
        next_block_id: Some("t1".to_string()),
    });
    let mut t1 = Block::new("t1", "One question before the offers");
    t1.options.push(BlockOption {
        text: "Offer A".to_string(),
        next_block_id: Some("o1".to_string()),
    });
    t1.options.push(BlockOption {
        text: "Offer B".to_string(),
        next_block_id: Some("o2".to_string()),
    });
    let mut o1 = Block::new("o1", "The premium plan");
    o1.resource_id = Some("prod_premium".to_string());
    let mut o2 = Block::new("o2", "The starter plan");
    o2.resource_id = Some("prod_starter".to_string());

    let mut welcome = Stage::new("stage_welcome", "WELCOME");
    welcome.block_ids.push("w1".to_string());
    let mut transition = Stage::new("stage_transition", "TRANSITION");
    transition.card_type = Some(CardType::Qualification);
    transition.block_ids.push("t1".to_string());
    let mut offer = Stage::new("stage_offer", "OFFER");
    offer.card_type = Some(CardType::Product);
    offer.block_ids.push("o1".to_string());
    offer.block_ids.push("o2".to_string());

    let mut flow = FunnelFlow {
        start_block_id: "w1".to_string(),
        stages: vec![welcome, transition, offer],
        blocks: Default::default(),
    };
    flow.blocks.insert("w1".to_string(), w1);
    flow.blocks.insert("t1".to_string(), t1);
    flow.blocks.insert("o1".to_string(), o1);
    flow.blocks.insert("o2".to_string(), o2);
    flow
}

/// Metadata with a membership trigger configured, eligible to go live.
#[allow(dead_code)]
pub fn meta_with_trigger() -> FunnelMeta {
    FunnelMeta {
        membership_trigger_type: Some("membership".to_string()),
        ..FunnelMeta::default()
    }
}
