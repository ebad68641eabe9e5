//! Unit tests for the structural validator.
mod common;
use common::*;
use trichter::prelude::*;

#[test]
fn test_scenario_a_clean_flow_is_live_ready() {
    let flow = two_stage_flow();
    assert!(find_orphaned_blocks(&flow).is_empty());
    assert!(find_broken_blocks(&flow).is_empty());
    assert!(find_invalid_options(&flow).is_empty());

    let status = compute_draft_status(&flow, &meta_with_trigger());
    assert!(!status.is_draft);
    assert_eq!(status.reason, None);
}

#[test]
fn test_scenario_b_product_card_without_resource() {
    let mut flow = two_stage_flow();
    flow.blocks.get_mut("o1").unwrap().resource_id = None;

    let status = compute_draft_status(&flow, &meta_with_trigger());
    assert!(status.is_draft);
    assert_eq!(status.reason, Some(DraftReason::MissingProductResource));
    assert_eq!(
        status.reason_text().as_deref(),
        Some("select a product for all product cards")
    );
}

#[test]
fn test_invalid_options_is_idempotent() {
    let mut flow = two_stage_flow();
    flow.blocks.get_mut("w1").unwrap().options.push(BlockOption {
        text: "Ghost".to_string(),
        next_block_id: Some("nope".to_string()),
    });

    let first = find_invalid_options(&flow);
    let second = find_invalid_options(&flow);
    assert_eq!(first, second);
    assert_eq!(first.len(), 1);
}

#[test]
fn test_missing_target_reported_first() {
    let mut flow = two_stage_flow();
    flow.blocks.get_mut("w1").unwrap().options.push(BlockOption {
        text: "Ghost".to_string(),
        next_block_id: Some("nope".to_string()),
    });

    let invalid = find_invalid_options(&flow);
    assert_eq!(invalid[0].block_id, "w1");
    assert_eq!(invalid[0].option_index, 1);
    assert_eq!(invalid[0].reason, InvalidOptionReason::MissingTarget);
}

#[test]
fn test_target_outside_stages_reported() {
    let mut flow = two_stage_flow();
    // a block that exists in the table but belongs to no stage
    flow.blocks
        .insert("stray".to_string(), Block::new("stray", "floating"));
    flow.blocks.get_mut("w1").unwrap().options.push(BlockOption {
        text: "Float".to_string(),
        next_block_id: Some("stray".to_string()),
    });

    let invalid = find_invalid_options(&flow);
    assert_eq!(invalid.len(), 1);
    assert_eq!(invalid[0].reason, InvalidOptionReason::TargetOutsideStages);
}

#[test]
fn test_backward_option_reported() {
    let mut flow = two_stage_flow();
    flow.blocks.get_mut("o1").unwrap().options.push(BlockOption {
        text: "Back".to_string(),
        next_block_id: Some("w1".to_string()),
    });

    let invalid = find_invalid_options(&flow);
    assert_eq!(invalid.len(), 1);
    assert_eq!(invalid[0].block_id, "o1");
    assert_eq!(invalid[0].reason, InvalidOptionReason::TargetInEarlierStage);
}

#[test]
fn test_backward_cross_link_is_exempt() {
    let flow = two_stage_flow();
    // a downsell jumping back to the welcome block is intentional
    let flow = trichter::crosslink::assign(&flow, "o1", UpsellKind::Downsell, "w1", "Not now")
        .expect("assign should succeed");

    assert!(find_invalid_options(&flow).is_empty());
}

#[test]
fn test_unconnected_option_is_not_invalid() {
    let mut flow = two_stage_flow();
    flow.blocks.get_mut("w1").unwrap().options.push(BlockOption {
        text: "Later".to_string(),
        next_block_id: None,
    });
    assert!(find_invalid_options(&flow).is_empty());
}

#[test]
fn test_orphan_detection() {
    let flow = two_stage_flow();
    let flow = flow
        .add_block_to_stage("stage_offer", Block::new("o2", "Unreachable offer"))
        .unwrap();

    assert_eq!(find_orphaned_blocks(&flow), vec!["o2".to_string()]);
}

#[test]
fn test_cross_link_does_not_feed_a_block() {
    let flow = two_stage_flow();
    let flow = flow
        .add_block_to_stage("stage_offer", Block::new("o2", "Upsell-only offer"))
        .unwrap();
    // o2 is reachable only through the upsell jump
    let flow = trichter::crosslink::assign(&flow, "w1", UpsellKind::Upsell, "o2", "More!")
        .expect("assign should succeed");

    // still orphaned with respect to normal flow
    assert_eq!(find_orphaned_blocks(&flow), vec!["o2".to_string()]);
    // but the normal option on w1 keeps feeding o1
    assert!(!find_orphaned_blocks(&flow).contains(&"o1".to_string()));
}

#[test]
fn test_broken_when_no_option_reaches_next_stage() {
    let mut flow = two_stage_flow();
    flow.blocks.get_mut("w1").unwrap().options.clear();

    assert_eq!(find_broken_blocks(&flow), vec!["w1".to_string()]);
}

#[test]
fn test_broken_when_next_stage_is_empty() {
    let mut flow = two_stage_flow();
    // malformed but well-typed: the validator reports instead of failing
    flow.stages[1].block_ids.clear();
    flow.blocks.remove("o1");
    flow.blocks.get_mut("w1").unwrap().options[0].next_block_id = None;

    assert_eq!(find_broken_blocks(&flow), vec!["w1".to_string()]);
}

#[test]
fn test_upsell_two_stages_ahead_is_not_broken() {
    let mut flow = three_stage_flow();
    // w2 has no normal options at all, only an upsell skipping TRANSITION
    flow = flow
        .add_block_to_stage("stage_welcome", Block::new("w2", "Fast lane"))
        .unwrap();
    flow = trichter::crosslink::assign(&flow, "w2", UpsellKind::Upsell, "o1", "Jump")
        .expect("assign should succeed");

    assert!(!find_broken_blocks(&flow).contains(&"w2".to_string()));
    // the skipping arrow got a funnel-unique style
    assert!(flow.block("w2").unwrap().upsell_style.is_some());
}

#[test]
fn test_last_stage_block_with_only_unconnected_options_is_broken() {
    let mut flow = two_stage_flow();
    flow.blocks.get_mut("o1").unwrap().options.push(BlockOption {
        text: "Dangling".to_string(),
        next_block_id: None,
    });

    assert_eq!(find_broken_blocks(&flow), vec!["o1".to_string()]);
}

#[test]
fn test_terminal_block_without_options_is_fine() {
    let flow = two_stage_flow();
    assert!(find_broken_blocks(&flow).is_empty());
}

#[test]
fn test_draft_priority_trigger_beats_everything() {
    let mut flow = two_stage_flow();
    flow.blocks.get_mut("w1").unwrap().options.push(BlockOption {
        text: "Ghost".to_string(),
        next_block_id: Some("nope".to_string()),
    });

    let status = compute_draft_status(&flow, &FunnelMeta::default());
    assert_eq!(status.reason, Some(DraftReason::MissingTrigger));

    let status = compute_draft_status(&flow, &meta_with_trigger());
    assert_eq!(status.reason, Some(DraftReason::InvalidOptions));
}

#[test]
fn test_draft_priority_empty_stage_beats_invalid_options() {
    let mut flow = three_stage_flow();
    flow.blocks.get_mut("w1").unwrap().options.push(BlockOption {
        text: "Ghost".to_string(),
        next_block_id: Some("nope".to_string()),
    });
    flow.stages[1].block_ids.clear();
    flow.blocks.remove("t1");

    let status = compute_draft_status(&flow, &meta_with_trigger());
    assert_eq!(status.reason, Some(DraftReason::EmptyStage));
}

#[test]
fn test_draft_unconnected_placeholder() {
    let flow = two_stage_flow();
    let flow = flow
        .add_block_to_stage("stage_offer", Block::new("placeholder_1", ""))
        .unwrap()
        .set_option("w1", 0, Some("placeholder_1".to_string()))
        .unwrap();
    let mut flow = flow;
    flow.blocks.get_mut("placeholder_1").unwrap().resource_id = Some("prod_2".to_string());

    let status = compute_draft_status(&flow, &meta_with_trigger());
    assert_eq!(status.reason, Some(DraftReason::UnconnectedPlaceholder));
}

#[test]
fn test_draft_priority_orphans_before_broken() {
    let mut flow = two_stage_flow();
    // o2 is orphaned; w1 is broken once its option is cleared
    flow = flow
        .add_block_to_stage("stage_offer", Block::new("o2", "Lost"))
        .unwrap();
    flow.blocks.get_mut("o2").unwrap().resource_id = Some("prod_2".to_string());
    flow.blocks.get_mut("w1").unwrap().options[0].next_block_id = None;

    let status = compute_draft_status(&flow, &meta_with_trigger());
    assert_eq!(status.reason, Some(DraftReason::OrphanedBlocks));
}

#[test]
fn test_offer_stage_requires_resource_for_upsell_merchants() {
    let mut flow = two_stage_flow();
    // no stage-level card type: the merchant type decides
    flow.stages[1].card_type = None;
    flow.blocks.get_mut("o1").unwrap().resource_id = None;

    let mut meta = meta_with_trigger();
    meta.merchant_type = MerchantType::Upsell;
    let status = compute_draft_status(&flow, &meta);
    assert_eq!(status.reason, Some(DraftReason::MissingProductResource));

    meta.merchant_type = MerchantType::Qualification;
    let status = compute_draft_status(&flow, &meta);
    assert!(!status.is_draft);
}

#[test]
fn test_highlights_bundle_matches_parts() {
    let mut flow = two_stage_flow();
    flow = flow
        .add_block_to_stage("stage_offer", Block::new("o2", "Lost"))
        .unwrap();

    let highlights = Highlights::compute(&flow);
    assert_eq!(highlights.invalid_options, find_invalid_options(&flow));
    assert_eq!(highlights.orphaned_block_ids, find_orphaned_blocks(&flow));
    assert_eq!(highlights.broken_block_ids, find_broken_blocks(&flow));
    assert!(!highlights.is_clean());
}
