use super::domain_trie::DomainTrie;
use super::parser::ListParser;
use arc_swap::ArcSwap;
use async_trait::async_trait;
use ferrous_policy_application::ports::PolicyEnginePort;
use ferrous_policy_application::QueryContext;
use ferrous_policy_domain::{
    normalize_domain, Action, BlocklistUrl, DomainError, ListSource, PolicyConfig, PolicyResult,
    PolicyStats, RefreshMode, BLACKLIST_NAME, WHITELIST_NAME,
};
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::instrument::WithSubscriber;
use tracing::subscriber::NoSubscriber;
use tracing::{debug, error, info, warn, Dispatch};

/// Per-query allow/block authority.
///
/// The whitelist trie is fixed for the engine's lifetime and mutated in
/// place. The blacklist trie sits behind an [`ArcSwap`] so a refresh can
/// publish a fully built replacement while queries keep reading the old one.
pub struct PolicyEngine {
    state: Arc<EngineState>,
    shutdown: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    loaded: watch::Receiver<bool>,
    closed: AtomicBool,
}

struct EngineState {
    whitelist: DomainTrie,
    blacklist: ArcSwap<DomainTrie>,
    sources: RwLock<HashMap<Arc<str>, ListSource>>,
    remote: Vec<BlocklistUrl>,
    static_blacklist: Vec<String>,
    parser: ListParser,
    enabled: AtomicBool,
    block_action: Action,
    log_blocked: bool,
    log_allowed: bool,
    refresh_mode: RefreshMode,
    queries_total: AtomicU64,
    queries_blocked: AtomicU64,
    queries_allowed: AtomicU64,
    /// `None` logs through whatever subscriber is current at each call.
    dispatch: Option<Dispatch>,
}

pub struct PolicyEngineBuilder {
    config: PolicyConfig,
    parser: Option<ListParser>,
    dispatch: Option<Dispatch>,
}

impl PolicyEngineBuilder {
    pub fn with_parser(mut self, parser: ListParser) -> Self {
        self.parser = Some(parser);
        self
    }

    /// Routes every log line of the engine, including its background tasks,
    /// to `dispatch` instead of the subscriber current at build time.
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    /// Seeds the static lists and starts the background loader (and the
    /// refresh task when an interval is set). Requires a tokio runtime only
    /// when remote sources are configured.
    ///
    /// Without [`with_dispatch`](Self::with_dispatch) the subscriber current
    /// at build time is captured. If none is set yet, the engine follows the
    /// global subscriber instead, so one installed later still gets its logs.
    pub fn build(self) -> Result<PolicyEngine, DomainError> {
        let config = self.config;
        let parser = match self.parser {
            Some(parser) => parser,
            None => ListParser::with_timeout(config.fetch_timeout())?,
        };
        let dispatch = self.dispatch.or_else(|| {
            tracing::dispatcher::get_default(|d| (!d.is::<NoSubscriber>()).then(|| d.clone()))
        });

        let sources: HashMap<Arc<str>, ListSource> = config
            .blocklist_urls
            .iter()
            .map(|s| (Arc::from(s.name.as_str()), ListSource::from_config(s)))
            .collect();

        let state = Arc::new(EngineState {
            whitelist: ListParser::parse_domains_slice(&config.whitelist_domains),
            blacklist: ArcSwap::from_pointee(ListParser::parse_domains_slice(
                &config.blacklist_domains,
            )),
            sources: RwLock::new(sources),
            remote: config.blocklist_urls.clone(),
            static_blacklist: config.blacklist_domains.clone(),
            parser,
            enabled: AtomicBool::new(config.enabled),
            block_action: config.block_action,
            log_blocked: config.log_blocked,
            log_allowed: config.log_allowed,
            refresh_mode: config.refresh_mode,
            queries_total: AtomicU64::new(0),
            queries_blocked: AtomicU64::new(0),
            queries_allowed: AtomicU64::new(0),
            dispatch,
        });

        let shutdown = CancellationToken::new();
        let (loaded_tx, loaded_rx) = watch::channel(state.remote.is_empty());
        let mut tasks = Vec::new();

        if !state.remote.is_empty() {
            let runtime = Handle::try_current()
                .map_err(|_| DomainError::RuntimeUnavailable)?;

            tasks.push(spawn_with_dispatch(
                &runtime,
                state.dispatch.as_ref(),
                initial_load(state.clone(), shutdown.clone(), loaded_tx),
            ));

            if let Some(interval) = config.refresh_interval() {
                tasks.push(spawn_with_dispatch(
                    &runtime,
                    state.dispatch.as_ref(),
                    refresh_loop(state.clone(), interval, shutdown.clone()),
                ));
            }
        }

        state.log(|| {
            info!(
                enabled = config.enabled,
                whitelist = state.whitelist.len(),
                blacklist = state.blacklist.load().len(),
                sources = state.remote.len(),
                refresh_interval_secs = config.refresh_interval_secs,
                "Policy engine initialized"
            )
        });

        Ok(PolicyEngine {
            state,
            shutdown,
            tasks: Mutex::new(tasks),
            loaded: loaded_rx,
            closed: AtomicBool::new(false),
        })
    }
}

impl PolicyEngine {
    pub fn builder(config: PolicyConfig) -> PolicyEngineBuilder {
        PolicyEngineBuilder {
            config,
            parser: None,
            dispatch: None,
        }
    }

    pub fn new(config: PolicyConfig) -> Result<Self, DomainError> {
        Self::builder(config).build()
    }

    #[inline]
    pub fn evaluate(&self, domain: &str) -> PolicyResult {
        self.state.evaluate(domain)
    }

    /// Like [`evaluate`](Self::evaluate), but a cancelled or expired context
    /// returns its error without evaluating or counting the query.
    pub fn evaluate_with_context(
        &self,
        ctx: &QueryContext,
        domain: &str,
    ) -> Result<PolicyResult, DomainError> {
        if let Some(err) = ctx.err() {
            return Err(err);
        }
        Ok(self.state.evaluate(domain))
    }

    pub fn add_to_whitelist(&self, domain: &str) -> bool {
        let added = self.state.whitelist.add(domain, true);
        self.state
            .log(|| info!(domain = %domain, added, "Whitelist entry added"));
        added
    }

    pub fn add_to_blacklist(&self, domain: &str) -> bool {
        let added = self.state.blacklist.load().add(domain, true);
        self.state
            .log(|| info!(domain = %domain, added, "Blacklist entry added"));
        added
    }

    pub fn remove_from_whitelist(&self, domain: &str) -> bool {
        let removed = self.state.whitelist.remove(domain);
        self.state
            .log(|| info!(domain = %domain, removed, "Whitelist entry removed"));
        removed
    }

    pub fn remove_from_blacklist(&self, domain: &str) -> bool {
        let removed = self.state.blacklist.load().remove(domain);
        self.state
            .log(|| info!(domain = %domain, removed, "Blacklist entry removed"));
        removed
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.state.enabled.store(enabled, Ordering::Relaxed);
        self.state.log(|| info!(enabled, "Policy filtering toggled"));
    }

    pub fn is_enabled(&self) -> bool {
        self.state.enabled.load(Ordering::Relaxed)
    }

    pub fn stats(&self) -> PolicyStats {
        let state = &self.state;
        PolicyStats {
            queries_total: state.queries_total.load(Ordering::Relaxed),
            queries_blocked: state.queries_blocked.load(Ordering::Relaxed),
            queries_allowed: state.queries_allowed.load(Ordering::Relaxed),
            whitelist_size: state.whitelist.len(),
            blacklist_size: state.blacklist.load().len(),
            enabled: state.enabled.load(Ordering::Relaxed),
        }
    }

    /// Load state of every remote source, sorted by name.
    pub fn sources(&self) -> Vec<ListSource> {
        let mut sources: Vec<ListSource> = self
            .state
            .sources
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .cloned()
            .collect();
        sources.sort_by(|a, b| a.name.cmp(&b.name));
        sources
    }

    /// Resolves once the initial background load has finished.
    pub async fn loaded(&self) {
        let mut rx = self.loaded.clone();
        let _ = rx.wait_for(|done| *done).await;
    }

    /// Rebuilds the blacklist from the remote sources now. Returns the size
    /// of the published trie.
    pub async fn reload(&self) -> Result<usize, DomainError> {
        match &self.state.dispatch {
            Some(dispatch) => self.state.reload().with_subscriber(dispatch.clone()).await,
            None => self.state.reload().await,
        }
    }

    /// Stops and joins the background tasks. Safe to call more than once.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.shutdown.cancel();

        let handles = {
            let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
            std::mem::take(&mut *tasks)
        };
        for handle in handles {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    self.state
                        .log(|| warn!(error = %e, "Policy engine task ended abnormally"));
                }
            }
        }

        self.state.log(|| info!("Policy engine closed"));
    }
}

impl Drop for PolicyEngine {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

impl EngineState {
    #[inline]
    fn log(&self, f: impl FnOnce()) {
        match &self.dispatch {
            Some(dispatch) => tracing::dispatcher::with_default(dispatch, f),
            None => f(),
        }
    }

    fn evaluate(&self, domain: &str) -> PolicyResult {
        self.queries_total.fetch_add(1, Ordering::Relaxed);

        if !self.enabled.load(Ordering::Relaxed) {
            self.queries_allowed.fetch_add(1, Ordering::Relaxed);
            return PolicyResult::allow();
        }

        let name = normalize_domain(domain);

        if self.whitelist.contains_normalized(&name) {
            self.queries_allowed.fetch_add(1, Ordering::Relaxed);
            if self.log_allowed {
                self.log(|| info!(domain = %name, list = WHITELIST_NAME, "Query allowed"));
            }
            return PolicyResult::whitelisted(name);
        }

        if self.blacklist.load().contains_normalized(&name) {
            self.queries_blocked.fetch_add(1, Ordering::Relaxed);
            if self.log_blocked {
                self.log(|| {
                    info!(
                        domain = %name,
                        list = BLACKLIST_NAME,
                        action = %self.block_action,
                        "Query blocked"
                    )
                });
            }
            return PolicyResult::blacklisted(self.block_action, name);
        }

        self.queries_allowed.fetch_add(1, Ordering::Relaxed);
        if self.log_allowed {
            self.log(|| info!(domain = %name, "Query allowed"));
        }
        PolicyResult::allow()
    }

    fn update_source(&self, name: &str, f: impl FnOnce(&mut ListSource)) {
        let mut sources = self.sources.write().unwrap_or_else(|e| e.into_inner());
        if let Some(source) = sources.get_mut(name) {
            f(source);
        }
    }

    async fn fetch_source(&self, source: &BlocklistUrl) -> Option<DomainTrie> {
        match self.parser.parse_source(&source.url, source.format).await {
            Ok(trie) => {
                info!(
                    source = %source.name,
                    domains = trie.len(),
                    "Loaded blocklist source"
                );
                self.update_source(&source.name, |s| s.record_success(trie.len()));
                Some(trie)
            }
            Err(e) => {
                warn!(
                    source = %source.name,
                    url = %source.url,
                    error = %e,
                    "Failed to load blocklist source"
                );
                self.update_source(&source.name, |s| s.record_failure(&e));
                None
            }
        }
    }

    /// Fetches every remote source concurrently and merges each one into
    /// `target` as soon as it arrives. Returns the number of failed sources.
    async fn load_remote_into(&self, target: &DomainTrie) -> usize {
        let mut pending: FuturesUnordered<_> =
            self.remote.iter().map(|s| self.fetch_source(s)).collect();

        let mut failed = 0;
        while let Some(result) = pending.next().await {
            match result {
                Some(trie) => target.merge(&trie),
                None => failed += 1,
            }
        }
        failed
    }

    async fn reload(&self) -> Result<usize, DomainError> {
        if self.remote.is_empty() {
            return Ok(self.blacklist.load().len());
        }

        info!(mode = ?self.refresh_mode, "Blacklist rebuild started");

        let fresh = match self.refresh_mode {
            RefreshMode::Replace => DomainTrie::new(),
            RefreshMode::Reseed => ListParser::parse_domains_slice(&self.static_blacklist),
        };

        let failed = self.load_remote_into(&fresh).await;
        if failed == self.remote.len() {
            error!(
                sources = failed,
                "Every blocklist source failed; keeping the current blacklist"
            );
            return Err(DomainError::AllSourcesFailed(failed));
        }

        let size = fresh.len();
        self.blacklist.store(Arc::new(fresh));

        info!(domains = size, failed, "Blacklist rebuild completed");
        Ok(size)
    }
}

fn spawn_with_dispatch<F>(
    runtime: &Handle,
    dispatch: Option<&Dispatch>,
    task: F,
) -> JoinHandle<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    match dispatch {
        Some(dispatch) => runtime.spawn(task.with_subscriber(dispatch.clone())),
        None => runtime.spawn(task),
    }
}

async fn initial_load(
    state: Arc<EngineState>,
    shutdown: CancellationToken,
    loaded: watch::Sender<bool>,
) {
    info!(sources = state.remote.len(), "Initial blocklist load started");

    let live = state.blacklist.load_full();
    tokio::select! {
        _ = shutdown.cancelled() => {
            info!("Initial blocklist load cancelled");
            return;
        }
        failed = state.load_remote_into(&live) => {
            info!(
                domains = state.blacklist.load().len(),
                failed,
                "Initial blocklist load completed"
            );
        }
    }

    let _ = loaded.send(true);
}

async fn refresh_loop(state: Arc<EngineState>, interval: Duration, shutdown: CancellationToken) {
    info!(
        interval_secs = interval.as_secs(),
        "Starting blocklist refresh job"
    );

    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {}
        }

        debug!("Blocklist refresh job: reloading blocklist sources");
        let outcome = tokio::select! {
            _ = shutdown.cancelled() => break,
            result = state.reload() => result,
        };
        match outcome {
            Ok(size) => info!(domains = size, "Blocklist refresh job: reload completed"),
            Err(e) => error!(error = %e, "Blocklist refresh job: reload failed"),
        }
    }

    info!("Blocklist refresh job: shutting down");
}

#[async_trait]
impl PolicyEnginePort for PolicyEngine {
    fn evaluate(&self, domain: &str) -> PolicyResult {
        PolicyEngine::evaluate(self, domain)
    }

    fn evaluate_with_context(
        &self,
        ctx: &QueryContext,
        domain: &str,
    ) -> Result<PolicyResult, DomainError> {
        PolicyEngine::evaluate_with_context(self, ctx, domain)
    }

    fn add_to_whitelist(&self, domain: &str) -> bool {
        PolicyEngine::add_to_whitelist(self, domain)
    }

    fn add_to_blacklist(&self, domain: &str) -> bool {
        PolicyEngine::add_to_blacklist(self, domain)
    }

    fn remove_from_whitelist(&self, domain: &str) -> bool {
        PolicyEngine::remove_from_whitelist(self, domain)
    }

    fn remove_from_blacklist(&self, domain: &str) -> bool {
        PolicyEngine::remove_from_blacklist(self, domain)
    }

    fn set_enabled(&self, enabled: bool) {
        PolicyEngine::set_enabled(self, enabled)
    }

    fn stats(&self) -> PolicyStats {
        PolicyEngine::stats(self)
    }

    fn sources(&self) -> Vec<ListSource> {
        PolicyEngine::sources(self)
    }

    async fn reload(&self) -> Result<(), DomainError> {
        PolicyEngine::reload(self).await.map(|_| ())
    }

    async fn close(&self) {
        PolicyEngine::close(self).await
    }
}
