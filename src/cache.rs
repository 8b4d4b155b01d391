//! On-disk cache of parsed catalogs.
//!
//! Each search directory maps to one postcard file named after the xxh3 hash of
//! its canonical path. The file records a fingerprint of the directory's `.js`
//! files (name, size, modification time); a cache file whose fingerprint no
//! longer matches is deleted and rebuilt.

use crate::catalog::Catalog;
use ignore::WalkBuilder;
use postcard::to_io;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use xxhash_rust::xxh3::{Xxh3, xxh3_64};

/// Bumped whenever the serialized catalog layout changes.
const CACHE_FORMAT: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct CachedCatalog {
    format: u32,
    fingerprint: u64,
    catalog: Catalog,
}

/// Fingerprint of a search directory's `.js` files.
pub fn fingerprint(dir: &Path) -> std::io::Result<u64> {
    let mut files = Vec::new();
    let walker = WalkBuilder::new(dir)
        .max_depth(Some(1))
        .standard_filters(false)
        .build();

    for entry in walker {
        let entry = entry.map_err(|e| {
            e.into_io_error()
                .unwrap_or_else(|| std::io::Error::other("directory walk failed"))
        })?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("js") {
            continue;
        }
        let metadata = entry.metadata().map_err(|e| {
            e.into_io_error()
                .unwrap_or_else(|| std::io::Error::other("metadata unavailable"))
        })?;
        let modified = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map_or(0, |d| d.as_nanos());
        files.push((entry.file_name().to_string_lossy().into_owned(), metadata.len(), modified));
    }

    // Walk order is not guaranteed
    files.sort();

    let mut hasher = Xxh3::new();
    for (name, len, modified) in &files {
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
        hasher.update(&len.to_le_bytes());
        hasher.update(&modified.to_le_bytes());
    }
    Ok(hasher.digest())
}

/// Directory of cached catalogs.
#[derive(Debug, Clone)]
pub struct CatalogCache {
    dir: PathBuf,
}

impl CatalogCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Cache file for a search directory.
    pub fn path_for(&self, source: &Path) -> PathBuf {
        let canonical = source.canonicalize().unwrap_or_else(|_| source.to_path_buf());
        let hash = xxh3_64(canonical.to_string_lossy().as_bytes());
        self.dir.join(format!("{:016x}.catalog", hash))
    }

    /// Returns the cached catalog if its fingerprint matches; removes stale files.
    pub fn load(&self, source: &Path, fingerprint: u64) -> Option<Catalog> {
        let path = self.path_for(source);
        let bytes = std::fs::read(&path).ok()?;

        match postcard::from_bytes::<CachedCatalog>(&bytes) {
            Ok(cached) if cached.format == CACHE_FORMAT && cached.fingerprint == fingerprint => {
                tracing::debug!("Using cached catalog {}", path.display());
                Some(cached.catalog)
            }
            Ok(_) => {
                tracing::info!(
                    "Cache stale, will reparse search index (file: {})",
                    path.display()
                );
                let _ = std::fs::remove_file(&path);
                None
            }
            Err(e) => {
                tracing::warn!("Failed to deserialize cached catalog at {}: {}", path.display(), e);
                let _ = std::fs::remove_file(&path);
                None
            }
        }
    }

    /// Writes a catalog to the cache. Failures are logged, never returned.
    pub fn store(&self, source: &Path, fingerprint: u64, catalog: &Catalog) {
        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            tracing::warn!("Failed to create cache directory {}: {}", self.dir.display(), e);
            return;
        }

        let path = self.path_for(source);
        let tmp = path.with_extension("tmp");
        let cached = CachedCatalog {
            format: CACHE_FORMAT,
            fingerprint,
            catalog: catalog.clone(),
        };

        let written = std::fs::File::create(&tmp)
            .map_err(|e| e.to_string())
            .and_then(|file| to_io(&cached, file).map(|_| ()).map_err(|e| e.to_string()))
            .and_then(|()| std::fs::rename(&tmp, &path).map_err(|e| e.to_string()));

        match written {
            Ok(()) => tracing::debug!("Cached catalog to {}", path.display()),
            Err(e) => {
                tracing::warn!("Failed to write catalog cache {}: {}", path.display(), e);
                let _ = std::fs::remove_file(&tmp);
            }
        }
    }
}
