use compact_str::CompactString;
use ferrous_policy_domain::normalize_domain;
use rustc_hash::FxBuildHasher;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct TrieNode {
    children: HashMap<CompactString, TrieNode, FxBuildHasher>,
    is_end: bool,
    is_wild: bool,
}

impl TrieNode {
    #[inline]
    fn is_dead(&self) -> bool {
        !self.is_end && self.children.is_empty()
    }
}

/// Suffix trie keyed by domain labels in reverse order, so
/// `ads.example.com` is stored as `com -> example -> ads`.
///
/// A node marked wildcard matches itself and every strict subdomain.
/// Each trie carries its own lock; `len` never takes it.
#[derive(Default)]
pub struct DomainTrie {
    root: RwLock<TrieNode>,
    size: AtomicUsize,
}

impl DomainTrie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `domain`, OR-ing in the wildcard flag.
    ///
    /// Returns `true` only when the domain was not already terminal. Blank
    /// names are ignored.
    pub fn add(&self, domain: &str, wildcard: bool) -> bool {
        let domain = normalize_domain(domain);
        if domain.is_empty() {
            return false;
        }

        let mut root = self.write();
        let mut node = &mut *root;
        for label in domain.split('.').rev() {
            node = node.children.entry(CompactString::new(label)).or_default();
        }
        node.is_wild |= wildcard;
        if node.is_end {
            return false;
        }
        node.is_end = true;
        self.size.fetch_add(1, Ordering::Relaxed);
        true
    }

    #[inline]
    pub fn contains(&self, domain: &str) -> bool {
        self.contains_normalized(&normalize_domain(domain))
    }

    /// Lookup for a name already passed through [`normalize_domain`].
    pub(crate) fn contains_normalized(&self, domain: &str) -> bool {
        if domain.is_empty() {
            return false;
        }

        let labels: SmallVec<[&str; 8]> = domain.split('.').rev().collect();
        let n = labels.len();
        let root = self.read();
        let mut node = &*root;

        for (i, label) in labels.iter().enumerate() {
            match node.children.get(*label) {
                Some(child) => {
                    if child.is_wild && i + 1 < n {
                        return true;
                    }
                    node = child;
                }
                None => return false,
            }
        }

        node.is_end
    }

    /// Clears the marking for `domain` and prunes nodes left without
    /// children or marking. Returns whether anything was removed.
    pub fn remove(&self, domain: &str) -> bool {
        let domain = normalize_domain(domain);
        if domain.is_empty() {
            return false;
        }

        let labels: SmallVec<[&str; 8]> = domain.split('.').rev().collect();
        let mut root = self.write();
        let removed = remove_path(&mut root, &labels);
        if removed {
            self.size.fetch_sub(1, Ordering::Relaxed);
        }
        removed
    }

    /// Copies every terminal marking of `other` into `self`.
    ///
    /// Wildcards are OR'd, never cleared. Locks are taken in address order so
    /// two opposite merges cannot deadlock.
    pub fn merge(&self, other: &DomainTrie) {
        if std::ptr::eq(self, other) {
            return;
        }

        let (src, mut dst) = if (self as *const Self) < (other as *const Self) {
            let dst = self.write();
            (other.read(), dst)
        } else {
            let src = other.read();
            (src, self.write())
        };

        let added = merge_nodes(&mut dst, &src);
        self.size.fetch_add(added, Ordering::Relaxed);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.size.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let old = {
            let mut root = self.write();
            self.size.store(0, Ordering::Relaxed);
            std::mem::take(&mut *root)
        };
        drop(old);
    }

    fn read(&self) -> RwLockReadGuard<'_, TrieNode> {
        self.root.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, TrieNode> {
        self.root.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for DomainTrie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainTrie")
            .field("len", &self.len())
            .finish()
    }
}

fn remove_path(node: &mut TrieNode, labels: &[&str]) -> bool {
    let Some((label, rest)) = labels.split_first() else {
        if !node.is_end {
            return false;
        }
        node.is_end = false;
        node.is_wild = false;
        return true;
    };

    let Some(child) = node.children.get_mut(*label) else {
        return false;
    };
    let removed = remove_path(child, rest);
    if removed && child.is_dead() {
        node.children.remove(*label);
    }
    removed
}

fn merge_nodes(dst: &mut TrieNode, src: &TrieNode) -> usize {
    let mut added = 0;
    for (label, src_child) in &src.children {
        let dst_child = dst.children.entry(label.clone()).or_default();
        if src_child.is_end {
            if !dst_child.is_end {
                dst_child.is_end = true;
                added += 1;
            }
            dst_child.is_wild |= src_child.is_wild;
        }
        added += merge_nodes(dst_child, src_child);
    }
    added
}
