//! Command handlers for the Verity CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod ask;
pub mod index;
pub mod stats;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use index::IndexCommand;
pub use stats::StatsCommand;
