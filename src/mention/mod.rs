pub mod record;
pub mod snapshot;
pub mod store;

pub use record::*;
pub use snapshot::*;
pub use store::*;
