//! Domain filtering: list structures, blocklist parsing and the policy engine.

pub mod domain_set;
pub mod domain_trie;
pub mod engine;
pub mod parser;

pub use domain_set::DomainSet;
pub use domain_trie::DomainTrie;
pub use engine::{PolicyEngine, PolicyEngineBuilder};
pub use parser::{ListParser, ParseSummary, DEFAULT_FETCH_TIMEOUT};
