use compact_str::CompactString;
use dashmap::DashSet;
use ferrous_policy_domain::normalize_domain;
use rustc_hash::FxBuildHasher;

/// Exact-match domain set. No wildcard semantics.
pub struct DomainSet {
    inner: DashSet<CompactString, FxBuildHasher>,
}

impl DomainSet {
    pub fn new() -> Self {
        Self {
            inner: DashSet::with_hasher(FxBuildHasher),
        }
    }

    pub fn add(&self, domain: &str) -> bool {
        let domain = normalize_domain(domain);
        if domain.is_empty() {
            return false;
        }
        self.inner.insert(CompactString::new(domain))
    }

    #[inline]
    pub fn contains(&self, domain: &str) -> bool {
        self.inner.contains(normalize_domain(domain).as_str())
    }

    pub fn remove(&self, domain: &str) -> bool {
        self.inner.remove(normalize_domain(domain).as_str()).is_some()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn clear(&self) {
        self.inner.clear();
    }
}

impl Default for DomainSet {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: AsRef<str>> FromIterator<S> for DomainSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let set = DomainSet::new();
        for domain in iter {
            set.add(domain.as_ref());
        }
        set
    }
}
