use super::definition::FunnelFlow;
use crate::error::FlowConversionError;

/// A trait for custom data models that can be converted into a canonical
/// `FunnelFlow`.
///
/// This is the primary extension point for keeping the core format-agnostic.
/// Builder frontends parse their own wire format (JSON, a database row,
/// whatever) into their own structs and implement this trait to hand the
/// core a canonical graph.
///
/// # Example
///
/// ```rust,no_run
/// use trichter::flow::{Block, FunnelFlow, IntoFunnelFlow};
/// use trichter::error::FlowConversionError;
///
/// // 1. Define your custom structs for parsing your format.
/// struct MyCustomStep { id: String, prompt: String }
/// struct MyCustomFunnel { steps: Vec<MyCustomStep> }
///
/// // 2. Implement `IntoFunnelFlow` for your top-level struct.
/// impl IntoFunnelFlow for MyCustomFunnel {
///     fn into_funnel_flow(self) -> Result<FunnelFlow, FlowConversionError> {
///         let mut flow = FunnelFlow::minimal();
///         for step in self.steps {
///             // Your logic to map steps onto stages and blocks.
///             let block = Block::new(&step.id, &step.prompt);
///             flow = flow
///                 .add_block_to_stage("stage_welcome", block)
///                 .map_err(|e| FlowConversionError::ValidationError(e.to_string()))?;
///         }
///         Ok(flow)
///     }
/// }
/// ```
pub trait IntoFunnelFlow {
    /// Consumes the object and converts it into a canonical funnel graph.
    fn into_funnel_flow(self) -> Result<FunnelFlow, FlowConversionError>;
}
