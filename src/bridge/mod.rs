//! Message routing from source channels to mirrors.
//!
//! ## Module Structure
//!
//! - `registry`: channel to mirror lookup (`MirrorRegistry`)
//! - `orchestrator`: per-message pipeline (`Bridge`)

pub mod orchestrator;
pub mod registry;

pub use orchestrator::{Bridge, MirrorOutcome};
pub use registry::MirrorRegistry;
