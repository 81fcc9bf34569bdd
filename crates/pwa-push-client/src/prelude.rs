pub use pwa_push_types::prelude::*;

// vim: ts=4
