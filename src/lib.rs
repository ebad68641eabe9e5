//! # Trichter - Funnel Graph Modeling and Validation Engine
//!
//! **Trichter** is the structural core of a visual funnel builder: a chat
//! bot walks customers through a directed graph of message blocks grouped
//! into ordered stages, and an operator edits that graph one connection at
//! a time. The hard part is not drawing boxes and arrows — it is keeping
//! the graph structurally sound across incremental edits: every block
//! reachable and terminating, cross-stage upsell/downsell links coexisting
//! with normal forward links, and a live answer to "can this funnel go
//! live yet?" after every change.
//!
//! ## Core Workflow
//!
//! The engine is designed to be format-agnostic. It operates on a canonical
//! internal model of a funnel graph. The primary workflow is:
//!
//! 1.  **Load Your Data**: Parse your builder's wire format into your own
//!     Rust structs, or start from [`FunnelFlow::minimal`].
//! 2.  **Convert to the Canonical Model**: Implement the
//!     [`IntoFunnelFlow`](flow::IntoFunnelFlow) trait for your structs to
//!     provide a translation layer into a [`FunnelFlow`](flow::FunnelFlow).
//! 3.  **Edit**: Drive a [`ConnectionEditor`](editor::ConnectionEditor)
//!     through the interactive protocol — begin an action, answer its
//!     selection questions, commit or cancel. Committed flows are handed to
//!     your [`FlowSink`](editor::FlowSink) for persistence.
//! 4.  **Validate**: The [`validator`] recomputes orphaned, broken and
//!     invalid-option highlights after every commit, and
//!     [`compute_draft_status`](validator::compute_draft_status) reports
//!     whether the funnel is live-ready and, if not, why.
//!
//! ## Quick Start
//!
//! ```rust
//! use trichter::prelude::*;
//!
//! fn main() -> Result<()> {
//!     // A minimal funnel: one welcome block, no connections yet.
//!     let flow = FunnelFlow::minimal();
//!
//!     // The editor owns the working copy; the sink receives every commit.
//!     let mut editor = ConnectionEditor::new(
//!         flow,
//!         FnSink(|_flow: &FunnelFlow| {
//!             // persist the committed flow here
//!         }),
//!     );
//!
//!     // Attach a branch from the welcome block. There is no next stage
//!     // yet, so the editor synthesizes one and asks for its card type.
//!     editor.begin_option_edit("block_welcome", "Show me!")?;
//!     editor.choose_card_type(CardType::Product)?;
//!
//!     // Keep the freshly created placeholder as the branch target.
//!     let placeholder_id = match editor.state() {
//!         EditingState::PendingOptionSelection(pending) => pending.new_block_id.clone(),
//!         _ => unreachable!(),
//!     };
//!     editor.choose_target(&placeholder_id)?;
//!
//!     // The highlight sets are fresh after every commit.
//!     assert!(editor.highlights().orphaned_block_ids.is_empty());
//!
//!     // Deployability: no trigger configured yet, so this is a draft.
//!     let meta = FunnelMeta::default();
//!     let status = editor.draft_status(&meta);
//!     assert!(status.is_draft);
//!     println!("draft reason: {:?}", status.reason_text());
//!     Ok(())
//! }
//! ```

pub mod crosslink;
pub mod editor;
pub mod error;
pub mod flow;
pub mod graph;
pub mod outline;
pub mod prelude;
pub mod validator;
