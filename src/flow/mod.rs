pub mod conversion;
pub mod definition;
pub mod meta;
pub mod snapshot;

pub use conversion::*;
pub use definition::*;
pub use meta::*;
pub use snapshot::*;
