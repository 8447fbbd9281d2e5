use crate::QueryContext;
use async_trait::async_trait;
use ferrous_policy_domain::{DomainError, ListSource, PolicyResult, PolicyStats};

/// Surface consumed by the DNS resolution path, the management API and the
/// status endpoint.
#[async_trait]
pub trait PolicyEnginePort: Send + Sync {
    fn evaluate(&self, domain: &str) -> PolicyResult;
    fn evaluate_with_context(
        &self,
        ctx: &QueryContext,
        domain: &str,
    ) -> Result<PolicyResult, DomainError>;

    fn add_to_whitelist(&self, domain: &str) -> bool;
    fn add_to_blacklist(&self, domain: &str) -> bool;
    fn remove_from_whitelist(&self, domain: &str) -> bool;
    fn remove_from_blacklist(&self, domain: &str) -> bool;

    fn set_enabled(&self, enabled: bool);
    fn stats(&self) -> PolicyStats;
    fn sources(&self) -> Vec<ListSource>;

    async fn reload(&self) -> Result<(), DomainError>;
    async fn close(&self);
}
