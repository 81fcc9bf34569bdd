pub use crate::app::App;
pub use pwa_push_types::prelude::*;

// vim: ts=4
