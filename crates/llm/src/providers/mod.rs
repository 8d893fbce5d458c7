//! Chat provider implementations.

pub mod cohere;

pub use cohere::CohereClient;
