pub mod error;
pub mod events;
pub mod integration;
pub mod status;

pub use error::{CoreError, Result};
pub use events::{ChangeEvent, ChangeEventType, EventBroadcaster, Kind};
pub use integration::{Integration, IntegrationRevision};
pub use status::{IntegrationStatus, RevisionState};
