//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the
//! trichter crate. Import this module to get access to the core
//! functionality without having to import each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! use trichter::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let snapshot = FlowSnapshot::from_file("path/to/funnel.bin")?;
//! let status = compute_draft_status(&snapshot.flow, &snapshot.meta);
//! println!("draft: {} ({:?})", status.is_draft, status.reason_text());
//! # Ok(())
//! # }
//! ```

// The canonical model
pub use crate::flow::{
    ArrowStyle, Block, BlockOption, CardType, FunnelFlow, FunnelMeta, IntoFunnelFlow,
    MerchantType, Stage,
};
pub use crate::flow::{FlowSnapshot, PLACEHOLDER_ID_PREFIX, SEND_DM_STAGE_NAME};

// Structural validation
pub use crate::validator::{
    DraftReason, DraftStatus, Highlights, InvalidOption, InvalidOptionReason,
    compute_draft_status, find_broken_blocks, find_invalid_options, find_orphaned_blocks,
};

// Connection editing
pub use crate::crosslink::UpsellKind;
pub use crate::editor::{
    ConnectionEditor, DeleteImpact, DiscardSink, EditingState, FlowSink, FnSink,
};

// Rendering
pub use crate::outline::FlowOutline;

// Error types
pub use crate::error::{EditError, FlowConversionError, GraphError, SnapshotError};

// Standard library re-exports commonly used with this crate
pub use std::collections::HashMap;

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
