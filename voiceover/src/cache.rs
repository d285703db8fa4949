//! Content-addressed audio cache.
//!
//! The cache is a flat directory of audio files named after the request's
//! cache key. The presence of a file is the only hit signal; there is no
//! index, no eviction and no locking. Two writers racing on the same key both
//! call the provider and the last rename wins.

use crate::error::Result;
use crate::request::GenerationRequest;
use serde::Serialize;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Record returned for every narration, whether freshly synthesized or cached.
///
/// Only produced by a [`CacheStore`], which ties it to its directory; the
/// serialized form carries the asset path relative to that directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheEntry {
    /// Original text, markup intact.
    pub input_text: String,
    pub input_data: GenerationRequest,
    /// Asset path relative to the cache directory.
    pub original_audio: String,
    #[serde(skip)]
    cache_dir: PathBuf,
}

impl CacheEntry {
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn absolute_path(&self) -> PathBuf {
        self.cache_dir.join(&self.original_audio)
    }
}

#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Look up `request` under its key-derived asset name.
    pub fn lookup(&self, text: &str, request: &GenerationRequest) -> Result<Option<CacheEntry>> {
        self.lookup_as(text, request, &request.asset_name()?)
    }

    /// Look up `request` under an explicit asset name.
    pub fn lookup_as(
        &self,
        text: &str,
        request: &GenerationRequest,
        asset: &str,
    ) -> Result<Option<CacheEntry>> {
        let path = self.dir.join(asset);
        match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => {
                debug!(path = ?path, "cache hit");
                Ok(Some(self.entry(text, request, asset)))
            }
            Ok(_) => {
                debug!(path = ?path, "cache path is not a file, treating as miss");
                Ok(None)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = ?path, "cache miss");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Persist `audio` under the key-derived asset name.
    pub fn store(&self, text: &str, request: &GenerationRequest, audio: &[u8]) -> Result<CacheEntry> {
        self.store_as(text, request, &request.asset_name()?, audio)
    }

    /// Persist `audio` under an explicit asset name.
    ///
    /// The bytes go to a uniquely named temporary sibling first and are
    /// renamed into place, so readers never observe a partial file and
    /// concurrent writers of one key each land a whole file.
    pub fn store_as(
        &self,
        text: &str,
        request: &GenerationRequest,
        asset: &str,
        audio: &[u8],
    ) -> Result<CacheEntry> {
        let path = self.dir.join(asset);
        let parent = path.parent().unwrap_or(&self.dir);
        fs::create_dir_all(parent)?;

        let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
        tmp.write_all(audio)?;
        tmp.persist(&path).map_err(|e| e.error)?;
        debug!(path = ?path, bytes = audio.len(), "stored audio");
        Ok(self.entry(text, request, asset))
    }

    fn entry(&self, text: &str, request: &GenerationRequest, asset: &str) -> CacheEntry {
        CacheEntry {
            input_text: text.to_string(),
            input_data: request.clone(),
            original_audio: asset.to_string(),
            cache_dir: self.dir.clone(),
        }
    }
}
