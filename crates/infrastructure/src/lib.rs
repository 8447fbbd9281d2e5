//! Ferrous Policy Infrastructure Layer
pub mod filter;

pub use filter::{DomainSet, DomainTrie, ListParser, PolicyEngine};
