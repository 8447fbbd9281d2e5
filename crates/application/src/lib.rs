//! Ferrous Policy Application Layer
pub mod context;
pub mod ports;

pub use context::QueryContext;
