//! The classifier: the single entry point for callers
//!
//! ```text
//! classify() -> ResultCache::get() --hit--> cached ResultFields
//!                      |
//!                    miss
//!                      v
//!              ArcSwap::load() -> match_user_agent() -> ResultCache::put()
//!
//! refresh() -> SignatureSource::fetch() -> SignatureCompiler::compile()
//!           -> TableStore::save() -> ArcSwap::store() -> ResultCache::clear()
//! ```
//!
//! Readers never block on a refresh: each `classify` call loads the current
//! table pointer once and matches against that table in full, even if a
//! refresh swaps in a new one meanwhile.

use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwap;
use tracing::{debug, info, trace, warn};

use crate::cache::{CacheStats, ResultCache};
use crate::config::Config;
use crate::errors::{ClassifierError, ClassifierResult};
use crate::models::ResultFields;
use crate::signatures::{SignatureCompiler, SignatureTable, match_user_agent};
use crate::sources::{HttpSignatureSource, SignatureSource};
use crate::storage::{FileTableStore, TableStore};

/// Where the table a classifier was constructed with came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableOrigin {
    /// Decoded from the table store
    Persisted,
    /// Downloaded and compiled during `load`
    Fetched,
    /// Handed to [`Classifier::from_table`]
    Provided,
}

pub struct Classifier {
    table: ArcSwap<SignatureTable>,
    origin: TableOrigin,
    cache: ResultCache,
    compiler: SignatureCompiler,
    source: Arc<dyn SignatureSource>,
    store: Arc<dyn TableStore>,
    /// Serializes refreshes; classification never takes it
    refresh_lock: tokio::sync::Mutex<()>,
}

impl Classifier {
    /// Build a classifier using the HTTP source and file store from `config`
    pub async fn from_config(config: &Config) -> ClassifierResult<Self> {
        config.validate()?;
        let source = Arc::new(HttpSignatureSource::from_config(&config.source)?);
        let store = Arc::new(FileTableStore::from_config(&config.storage).await?);
        Self::load(config, source, store).await
    }

    /// Use the persisted table when one is available, otherwise refresh.
    ///
    /// An unreadable or outdated persisted table is treated as absent. Fails
    /// with [`ClassifierError::RefreshFailed`] if no table can be obtained.
    pub async fn load(
        config: &Config,
        source: Arc<dyn SignatureSource>,
        store: Arc<dyn TableStore>,
    ) -> ClassifierResult<Self> {
        config.validate()?;
        let compiler = SignatureCompiler::new(config.source.info_url.clone());

        let (table, origin) = match load_persisted(store.as_ref()).await {
            Some(table) => (table, TableOrigin::Persisted),
            None => {
                info!("No usable persisted signature table, fetching from {}", source.describe());
                let table = fetch_and_compile(source.as_ref(), &compiler)
                    .await
                    .map_err(ClassifierError::refresh_failed)?;
                persist(store.as_ref(), &table).await;
                (table, TableOrigin::Fetched)
            }
        };

        let mut classifier = Self::from_table(table, config, source, store)?;
        classifier.origin = origin;
        Ok(classifier)
    }

    /// Wrap an already compiled table
    pub fn from_table(
        table: SignatureTable,
        config: &Config,
        source: Arc<dyn SignatureSource>,
        store: Arc<dyn TableStore>,
    ) -> ClassifierResult<Self> {
        Ok(Self {
            table: ArcSwap::from_pointee(table),
            origin: TableOrigin::Provided,
            cache: ResultCache::new(config.cache.capacity)?,
            compiler: SignatureCompiler::new(config.source.info_url.clone()),
            source,
            store,
            refresh_lock: tokio::sync::Mutex::new(()),
        })
    }

    /// Classify a user agent string.
    ///
    /// Only an empty input is an error; unmatched strings classify to
    /// [`ResultFields::default`].
    pub fn classify(&self, user_agent: &str) -> ClassifierResult<ResultFields> {
        if user_agent.is_empty() {
            return Err(ClassifierError::invalid_input("user agent string is empty"));
        }

        if let Some(cached) = self.cache.get(user_agent) {
            trace!("Cache hit for {:?}", user_agent);
            return Ok(cached);
        }

        let table = self.table.load();
        let outcome = match_user_agent(&table, user_agent)?;
        trace!("Classified {:?} as {:?}", user_agent, outcome.kind);

        self.cache.put(user_agent, outcome.fields.clone());
        Ok(outcome.fields)
    }

    /// Download, compile and swap in a new table.
    ///
    /// On failure the current table and cached results stay untouched.
    pub async fn refresh(&self) -> ClassifierResult<()> {
        let _guard = self.refresh_lock.lock().await;
        let start_time = Instant::now();
        info!("Refreshing signature table from {}", self.source.describe());

        let table = match fetch_and_compile(self.source.as_ref(), &self.compiler).await {
            Ok(table) => table,
            Err(e) => {
                warn!("Signature table refresh failed, keeping current table: {}", e);
                return Err(ClassifierError::refresh_failed(e));
            }
        };

        persist(self.store.as_ref(), &table).await;
        self.table.store(Arc::new(table));
        // results computed against the old table must not outlive it
        self.cache.clear();

        info!(
            "Signature table refreshed in {:.2}s",
            start_time.elapsed().as_secs_f64()
        );
        Ok(())
    }

    /// The table currently used for matching
    pub fn table(&self) -> Arc<SignatureTable> {
        self.table.load_full()
    }

    /// How the initial table was obtained; unaffected by later refreshes
    pub fn origin(&self) -> TableOrigin {
        self.origin
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

async fn fetch_and_compile(
    source: &dyn SignatureSource,
    compiler: &SignatureCompiler,
) -> ClassifierResult<SignatureTable> {
    let text = source.fetch().await?;
    compiler.compile(&text)
}

async fn load_persisted(store: &dyn TableStore) -> Option<SignatureTable> {
    match store.exists().await {
        Ok(true) => {}
        Ok(false) => return None,
        Err(e) => {
            warn!("Could not check for persisted signature table: {}", e);
            return None;
        }
    }

    let bytes = match store.load().await {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return None,
        Err(e) => {
            warn!("Could not read persisted signature table: {}", e);
            return None;
        }
    };

    match SignatureTable::from_bytes(&bytes) {
        Ok(table) => {
            debug!("Using persisted signature table");
            Some(table)
        }
        Err(e) => {
            warn!("Discarding persisted signature table: {}", e);
            None
        }
    }
}

/// Saving is best effort; the in-memory table is authoritative
async fn persist(store: &dyn TableStore, table: &SignatureTable) {
    let result = match table.to_bytes() {
        Ok(bytes) => store.save(&bytes).await,
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        warn!("Failed to persist signature table: {}", e);
    }
}
