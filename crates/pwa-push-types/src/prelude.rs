pub use crate::error::{ClResult, Error};
pub use crate::types::{SubsId, Timestamp, UserId};

pub use tracing::{debug, error, info, warn};

// vim: ts=4
