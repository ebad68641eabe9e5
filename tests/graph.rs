//! Unit tests for the pure graph mutation primitives.
mod common;
use common::*;
use trichter::error::GraphError;
use trichter::flow::{SEND_DM_STAGE_NAME, Stage};
use trichter::prelude::*;

#[test]
fn test_add_block_appends_to_stage() {
    let flow = two_stage_flow();
    let next = flow
        .add_block_to_stage("stage_offer", Block::new("o2", "Another offer"))
        .expect("add should succeed");

    assert_eq!(next.stage("stage_offer").unwrap().block_ids, vec!["o1", "o2"]);
    assert!(next.blocks.contains_key("o2"));
    // the original flow is untouched
    assert_eq!(flow.stage("stage_offer").unwrap().block_ids, vec!["o1"]);
}

#[test]
fn test_add_block_unknown_stage_fails() {
    let flow = two_stage_flow();
    let err = flow
        .add_block_to_stage("stage_missing", Block::new("x", ""))
        .unwrap_err();
    assert_eq!(
        err,
        GraphError::StageNotFound {
            stage_id: "stage_missing".to_string()
        }
    );
}

#[test]
fn test_add_block_duplicate_id_fails() {
    let flow = two_stage_flow();
    let err = flow
        .add_block_to_stage("stage_offer", Block::new("w1", ""))
        .unwrap_err();
    assert!(matches!(err, GraphError::DuplicateBlockId { .. }));
}

#[test]
fn test_remove_block_clears_inbound_options() {
    let flow = two_stage_flow();
    let next = flow.remove_block("o1").expect("remove should succeed");

    // the option survives, its target is cleared to unconnected
    let w1 = next.block("w1").unwrap();
    assert_eq!(w1.options.len(), 1);
    assert_eq!(w1.options[0].text, "Go");
    assert_eq!(w1.options[0].next_block_id, None);
}

#[test]
fn test_remove_block_drops_emptied_stage() {
    let flow = two_stage_flow();
    let next = flow.remove_block("o1").unwrap();
    assert_eq!(next.stages.len(), 1);
    assert_eq!(next.stages[0].name, "WELCOME");
}

#[test]
fn test_remove_block_keeps_emptied_first_stage() {
    let flow = two_stage_flow();
    let next = flow.remove_block("w1").unwrap();
    assert_eq!(next.stages.len(), 2);
    assert!(next.stages[0].block_ids.is_empty());
}

#[test]
fn test_remove_block_reassigns_start() {
    let flow = three_stage_flow();
    let next = flow
        .add_block_to_stage("stage_welcome", Block::new("w2", "Alt welcome"))
        .unwrap()
        .remove_block("w1")
        .unwrap();
    assert_eq!(next.start_block_id, "w2");
}

#[test]
fn test_remove_block_clears_cross_pointers() {
    let flow = three_stage_flow();
    let flow = trichter::crosslink::assign(&flow, "w1", UpsellKind::Upsell, "o1", "Skip ahead")
        .expect("assign should succeed");
    let w1 = flow.block("w1").unwrap();
    assert_eq!(w1.upsell_block_id.as_deref(), Some("o1"));
    assert_eq!(w1.options.len(), 2); // mirror slot + "Start"

    let next = flow.remove_block("o1").unwrap();
    let w1 = next.block("w1").unwrap();
    assert_eq!(w1.upsell_block_id, None);
    assert_eq!(w1.upsell_style, None);
    // the mirror slot went with the pointer, the normal option stayed
    assert_eq!(w1.options.len(), 1);
    assert_eq!(w1.options[0].text, "Start");
}

#[test]
fn test_remove_unknown_block_fails() {
    let flow = two_stage_flow();
    assert!(matches!(
        flow.remove_block("ghost").unwrap_err(),
        GraphError::BlockNotFound { .. }
    ));
}

#[test]
fn test_append_stage_inserts_after_index() {
    let flow = two_stage_flow();
    let next = flow
        .append_stage(0, Stage::new("stage_mid", "TRANSITION"))
        .expect("append should succeed");
    let names: Vec<&str> = next.stages.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["WELCOME", "TRANSITION", "OFFER"]);
}

#[test]
fn test_append_stage_out_of_range_fails() {
    let flow = two_stage_flow();
    let err = flow
        .append_stage(2, Stage::new("stage_mid", "TRANSITION"))
        .unwrap_err();
    assert_eq!(err, GraphError::StageIndexOutOfRange { index: 2, len: 2 });
}

#[test]
fn test_set_option_rewires_target() {
    let flow = three_stage_flow();
    let next = flow.set_option("t1", 1, Some("o1".to_string())).unwrap();
    assert_eq!(
        next.block("t1").unwrap().options[1].next_block_id.as_deref(),
        Some("o1")
    );
}

#[test]
fn test_set_option_bad_index_fails() {
    let flow = two_stage_flow();
    let err = flow.set_option("w1", 5, None).unwrap_err();
    assert_eq!(
        err,
        GraphError::OptionIndexOutOfRange {
            block_id: "w1".to_string(),
            index: 5,
            len: 1
        }
    );
}

#[test]
fn test_set_option_unknown_block_fails() {
    let flow = two_stage_flow();
    assert!(matches!(
        flow.set_option("ghost", 0, None).unwrap_err(),
        GraphError::BlockNotFound { .. }
    ));
}

#[test]
fn test_send_dm_stage_lifecycle() {
    let flow = two_stage_flow();

    let with_dm = flow.set_send_dm_message("Hey, you left something behind");
    assert_eq!(with_dm.stages[0].name, SEND_DM_STAGE_NAME);
    let dm_block = with_dm
        .blocks
        .values()
        .find(|b| b.send_dm_block)
        .expect("dm block exists");
    assert_eq!(dm_block.message, "Hey, you left something behind");
    // the synthetic stage is outside the progression
    assert_eq!(with_dm.progression_stages().len(), 2);

    // clearing the text removes block and stage together
    let cleared = with_dm.set_send_dm_message("");
    assert_eq!(cleared, flow);
}
