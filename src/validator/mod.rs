//! The structural validator: pure, total functions over any well-typed
//! flow. Malformed input is reported as invalid/orphaned/broken, never
//! panicked on, and never blocks further editing. Every caller that
//! commits a mutation goes through [`Highlights::compute`] so the operator
//! always sees one consistent picture.

mod options;
mod reachability;
mod status;

pub use options::{InvalidOption, InvalidOptionReason, find_invalid_options};
pub use reachability::{find_broken_blocks, find_orphaned_blocks};
pub use status::{DraftReason, DraftStatus, compute_draft_status};

use crate::flow::FunnelFlow;
use serde::Serialize;

/// The three highlight sets the builder UI renders, recomputed after every
/// committed mutation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlights {
    pub invalid_options: Vec<InvalidOption>,
    pub orphaned_block_ids: Vec<String>,
    pub broken_block_ids: Vec<String>,
}

impl Highlights {
    pub fn compute(flow: &FunnelFlow) -> Self {
        Highlights {
            invalid_options: find_invalid_options(flow),
            orphaned_block_ids: find_orphaned_blocks(flow),
            broken_block_ids: find_broken_blocks(flow),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.invalid_options.is_empty()
            && self.orphaned_block_ids.is_empty()
            && self.broken_block_ids.is_empty()
    }
}
