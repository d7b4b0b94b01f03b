//! Circuit network representation, construction and validation.
//!
//! The [`Network`] holds every device, its pins and their connections in a
//! form suitable for simulation. The [`Builder`] fills it in from parsed
//! statements and [`check_network`] verifies it is complete.

mod builder;
mod graph;
mod types;
mod validate;

pub use builder::Builder;
pub use graph::{signal_text, Circuit, Network};
pub use types::*;
pub use validate::check_network;
