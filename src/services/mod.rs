//! Service layer for qalam business logic.
//!
//! Services are separated from UI concerns and can be driven by the CLI or
//! any other front end.

pub mod pipeline;

pub use pipeline::Orchestrator;
