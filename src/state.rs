//! Shared catalog state for the server and the command line.
//!
//! Loaded catalogs are kept in an LRU cache keyed by canonical directory.
//! Concurrent requests for the same directory await one shared load, which
//! runs on the blocking pool and goes through the on-disk cache when enabled.

use crate::cache::{CatalogCache, fingerprint};
use crate::catalog::Catalog;
use crate::codec::SECTIONS_FILE;
use crate::config::{Config, expand_tilde};
use crate::error::CatalogError;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use lru::LruCache;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, RwLock};

/// A loaded catalog and the fingerprint of the files it came from.
type Loaded = (u64, Arc<Catalog>);

type SharedLoad = Shared<BoxFuture<'static, Result<Loaded, String>>>;

type Catalogs = Arc<RwLock<LruCache<PathBuf, Loaded>>>;

type InFlight = Arc<Mutex<HashMap<PathBuf, (u64, SharedLoad)>>>;

pub struct IndexState {
    config: Config,

    /// Parsed catalogs, most recently used last
    cache: Catalogs,

    /// Loads in progress, tagged with their load id (can be awaited by multiple callers)
    in_flight: InFlight,

    next_load: AtomicU64,

    disk_cache: Option<CatalogCache>,
}

impl std::fmt::Debug for IndexState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexState")
            .field("search_dir", &self.config.search_dir)
            .field("cache_size", &self.cache.try_read().map(|c| c.len()).ok())
            .field("disk_cache", &self.disk_cache.as_ref().map(CatalogCache::dir))
            .finish()
    }
}

impl IndexState {
    pub fn new(config: Config) -> Self {
        let capacity = NonZeroUsize::new(config.catalog_capacity).unwrap_or(NonZeroUsize::MIN);
        let disk_cache = config
            .cache_enabled
            .then(|| CatalogCache::new(config.cache_dir.clone()));
        Self {
            cache: Arc::new(RwLock::new(LruCache::new(capacity))),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            next_load: AtomicU64::new(0),
            disk_cache,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolves a requested directory (or the configured one) to a canonical path.
    ///
    /// A documentation root holding a `search/` subdirectory resolves to that subdirectory.
    pub async fn resolve_dir(&self, requested: Option<&str>) -> Result<PathBuf, String> {
        let dir = match requested.map(str::trim).filter(|d| !d.is_empty()) {
            Some(dir) => PathBuf::from(expand_tilde(dir).as_ref()),
            None => self.config.search_dir.clone().ok_or_else(|| {
                "No search directory given and none configured.\n\n\
                 Pass `directory`, set DOXYSEARCH_SEARCH_DIR, or add `search_dir` to the config file."
                    .to_string()
            })?,
        };

        let canonical = tokio::fs::canonicalize(&dir)
            .await
            .map_err(|_| format!("Search directory not found: {}", dir.display()))?;

        let nested = canonical.join("search");
        if !canonical.join(SECTIONS_FILE).exists() && nested.join(SECTIONS_FILE).exists() {
            return Ok(nested);
        }
        Ok(canonical)
    }

    /// Returns the catalog for a directory, loading it if needed.
    ///
    /// A cached catalog is reused only while the directory's files are unchanged.
    pub async fn get_catalog(&self, requested: Option<&str>) -> Result<Arc<Catalog>, String> {
        let dir = self.resolve_dir(requested).await?;
        self.get_catalog_at(&dir).await
    }

    pub async fn get_catalog_at(&self, dir: &Path) -> Result<Arc<Catalog>, String> {
        let current = {
            let dir = dir.to_path_buf();
            tokio::task::spawn_blocking(move || fingerprint(&dir))
                .await
                .map_err(|e| format!("Fingerprint task failed: {}", e))?
        };

        // 1. Check memory cache
        {
            let mut cache = self.cache.write().await;
            let hit = cache.get(dir).map(|(print, catalog)| (*print, catalog.clone()));
            if let Some((print, catalog)) = hit {
                if current.as_ref().is_ok_and(|now| *now == print) {
                    tracing::debug!("Cache hit for {}", dir.display());
                    return Ok(catalog);
                }
                tracing::info!("Search files changed in {}, reloading", dir.display());
                cache.pop(dir);
            }
        }

        // 2. Check for an in-flight load
        let maybe_future = {
            let in_flight = self.in_flight.lock().await;
            in_flight.get(dir).map(|(_, future)| future.clone())
        };
        if let Some(future) = maybe_future {
            tracing::debug!("Awaiting in-flight load for {}", dir.display());
            let (print, catalog) = future.await?;
            if current.as_ref().is_ok_and(|now| *now == print) {
                return Ok(catalog);
            }
            tracing::info!("Search files in {} changed during load, reloading", dir.display());
        }

        // 3. Start a new load
        self.load(dir).await.map(|(_, catalog)| catalog)
    }

    /// Joins the load in progress for `dir` or spawns one.
    ///
    /// The spawned task fills the LRU and clears its own in-flight entry, so a
    /// caller that stops waiting leaves no stale entry behind.
    async fn load(&self, dir: &Path) -> Result<Loaded, String> {
        let shared = {
            let mut in_flight = self.in_flight.lock().await;
            // Another caller may have started while we were fingerprinting
            if let Some((_, future)) = in_flight.get(dir) {
                future.clone()
            } else {
                let id = self.next_load.fetch_add(1, Ordering::Relaxed);
                let task = tokio::spawn(run_load(
                    dir.to_path_buf(),
                    id,
                    self.disk_cache.clone(),
                    Arc::clone(&self.cache),
                    Arc::clone(&self.in_flight),
                ));
                let future: BoxFuture<'static, Result<Loaded, String>> = Box::pin(async move {
                    task.await
                        .unwrap_or_else(|e| Err(format!("Load task failed: {}", e)))
                });
                let shared = future.shared();
                in_flight.insert(dir.to_path_buf(), (id, shared.clone()));
                tracing::info!("Loading search index from {}", dir.display());
                shared
            }
        };

        shared.await
    }

    pub async fn is_cached(&self, dir: &Path) -> bool {
        self.cache.read().await.contains(dir)
    }

    pub async fn clear_cache(&self) {
        self.cache.write().await.clear();
        self.in_flight.lock().await.clear();
    }
}

async fn run_load(
    dir: PathBuf,
    id: u64,
    disk_cache: Option<CatalogCache>,
    cache: Catalogs,
    in_flight: InFlight,
) -> Result<Loaded, String> {
    let blocking_dir = dir.clone();
    let result = match tokio::task::spawn_blocking(move || {
        load_blocking(&blocking_dir, disk_cache.as_ref())
    })
    .await
    {
        Ok(loaded) => loaded
            .map(|(print, catalog)| (print, Arc::new(catalog)))
            .map_err(|e| e.to_string()),
        Err(e) => Err(format!("Load task failed: {}", e)),
    };

    if let Ok((print, catalog)) = &result {
        cache.write().await.put(dir.clone(), (*print, Arc::clone(catalog)));
    }

    let mut in_flight = in_flight.lock().await;
    if in_flight.get(&dir).is_some_and(|(current, _)| *current == id) {
        in_flight.remove(&dir);
    }
    result
}

fn load_blocking(dir: &Path, disk_cache: Option<&CatalogCache>) -> Result<(u64, Catalog), CatalogError> {
    if !dir.is_dir() {
        return Err(CatalogError::NotFound {
            path: dir.to_path_buf(),
        });
    }
    let print = fingerprint(dir).map_err(|e| CatalogError::io(dir, e))?;

    if let Some(cache) = disk_cache
        && let Some(catalog) = cache.load(dir, print)
    {
        return Ok((print, catalog));
    }

    let catalog = Catalog::load(dir)?;
    tracing::info!(
        "Parsed {} sections from {}",
        catalog.sections().sections.len(),
        dir.display()
    );

    if let Some(cache) = disk_cache {
        cache.store(dir, print, &catalog);
    }
    Ok((print, catalog))
}

/// Preloads the configured search directory in the background.
pub fn spawn_warmup(state: Arc<IndexState>) -> Option<tokio::task::JoinHandle<()>> {
    state.config.search_dir.as_ref()?;

    Some(tokio::spawn(async move {
        match state.get_catalog(None).await {
            Ok(catalog) => tracing::info!(
                "Preloaded search index {} ({} entries)",
                catalog.root().display(),
                catalog.entry_count()
            ),
            Err(e) => tracing::warn!("Preloading search index failed: {}", e),
        }
    }))
}
