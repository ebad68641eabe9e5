use thiserror::Error;

/// Errors from the pure graph mutation primitives.
///
/// These are precondition violations: the caller referenced an id that does
/// not exist or an index that is out of range. Structural problems in a
/// well-formed flow (orphans, broken blocks, dangling options) are never
/// errors; the validator reports them as data.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Stage '{stage_id}' does not exist in this funnel")]
    StageNotFound { stage_id: String },

    #[error("Block '{block_id}' does not exist in this funnel")]
    BlockNotFound { block_id: String },

    #[error("Block '{block_id}' has {len} option(s), index {index} is out of range")]
    OptionIndexOutOfRange {
        block_id: String,
        index: usize,
        len: usize,
    },

    #[error("Stage index {index} is out of range for {len} stage(s)")]
    StageIndexOutOfRange { index: usize, len: usize },

    #[error("A block with id '{block_id}' already exists in this funnel")]
    DuplicateBlockId { block_id: String },

    #[error("A stage with id '{stage_id}' already exists in this funnel")]
    DuplicateStageId { stage_id: String },
}

/// Precondition violations in the connection-editing state machine.
///
/// These indicate a bug in the calling UI layer (two actions were allowed
/// to overlap, or a stale id was passed in) and fail loudly instead of
/// silently no-opping.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("An editing action is already pending; commit or cancel it first")]
    SelectionAlreadyPending,

    #[error("No card-type selection is pending")]
    NoCardTypePending,

    #[error("No target selection is pending")]
    NoTargetPending,

    #[error("No delete is pending")]
    NoDeletePending,

    #[error("No editing action is pending")]
    NothingPending,

    #[error("Block '{block_id}' is not selectable for the pending action")]
    TargetNotSelectable { block_id: String },

    #[error("Block '{block_id}' belongs to no stage and cannot anchor a connection")]
    BlockOutsideStages { block_id: String },
}

/// Errors that can occur when converting a custom builder format into a
/// canonical `FunnelFlow`.
#[derive(Error, Debug, Clone)]
pub enum FlowConversionError {
    #[error("Invalid funnel data: {0}")]
    ValidationError(String),
}

/// Errors from the snapshot persistence helpers.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("{0}")]
    Generic(String),
}
