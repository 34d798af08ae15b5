//! Decoded emoji bitmaps keyed by [`AssetKey`]
//!
//! Both flavours wrap a moka cache and lean on its per-key init
//! coalescing: while one caller is loading a key, every other caller asking
//! for the same key waits for that load and shares its outcome. Failed
//! loads are handed to the waiters but never stored.
//!
//! With caching turned off the entry is dropped as soon as the load
//! settles, so deduplication still covers concurrent requests while later
//! requests fetch again.

use std::future::Future;
use std::sync::Arc;

use image::RgbaImage;
use pixmoji_core::types::AssetKey;
use pixmoji_core::FetchError;
use thiserror::Error;

/// Why a lookup produced no bitmap
#[derive(Debug, Error)]
pub enum Miss {
    #[error("HTTP status {0}")]
    Status(u16),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Undecodable image: {0}")]
    Decode(String),

    #[error("Image has no pixels")]
    Empty,
}

/// Decode fetched bytes into an RGBA bitmap
///
/// A zero-width or zero-height image counts as a miss so that the space
/// reservation never divides by zero.
pub fn decode(bytes: &[u8]) -> Result<Arc<RgbaImage>, Miss> {
    let bitmap = image::load_from_memory(bytes)
        .map_err(|e| Miss::Decode(e.to_string()))?
        .to_rgba8();

    if bitmap.width() == 0 || bitmap.height() == 0 {
        return Err(Miss::Empty);
    }
    Ok(Arc::new(bitmap))
}

/// Blocking bitmap cache
#[derive(Clone)]
pub struct AssetCache {
    inner: moka::sync::Cache<AssetKey, Arc<RgbaImage>>,
    retain: bool,
}

impl AssetCache {
    pub fn new(retain: bool) -> Self {
        Self {
            inner: moka::sync::Cache::builder().build(),
            retain,
        }
    }

    pub fn retains(&self) -> bool {
        self.retain
    }

    pub fn set_retain(&mut self, retain: bool) {
        self.retain = retain;
        if !retain {
            self.clear();
        }
    }

    /// Return the cached bitmap for `key` or run `load` exactly once for
    /// all concurrent callers
    pub fn get_or_load<L>(&self, key: &AssetKey, load: L) -> Result<Arc<RgbaImage>, Arc<Miss>>
    where
        L: FnOnce() -> Result<Arc<RgbaImage>, Miss>,
    {
        if let Some(hit) = self.inner.get(key) {
            log::debug!("Asset cache hit for {key}");
            return Ok(hit);
        }

        let outcome = self.inner.try_get_with(key.clone(), load);
        if !self.retain {
            self.inner.invalidate(key);
        }
        outcome
    }

    pub fn len(&self) -> usize {
        self.inner.run_pending_tasks();
        self.inner.entry_count() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.inner.invalidate_all();
        self.inner.run_pending_tasks();
    }
}

/// Non-blocking bitmap cache
#[derive(Clone)]
pub struct AsyncAssetCache {
    inner: moka::future::Cache<AssetKey, Arc<RgbaImage>>,
    retain: bool,
}

impl AsyncAssetCache {
    pub fn new(retain: bool) -> Self {
        Self {
            inner: moka::future::Cache::builder().build(),
            retain,
        }
    }

    pub fn retains(&self) -> bool {
        self.retain
    }

    pub async fn set_retain(&mut self, retain: bool) {
        self.retain = retain;
        if !retain {
            self.clear().await;
        }
    }

    pub async fn get_or_load<L>(
        &self,
        key: &AssetKey,
        load: L,
    ) -> Result<Arc<RgbaImage>, Arc<Miss>>
    where
        L: Future<Output = Result<Arc<RgbaImage>, Miss>>,
    {
        if let Some(hit) = self.inner.get(key).await {
            log::debug!("Asset cache hit for {key}");
            return Ok(hit);
        }

        let outcome = self.inner.try_get_with(key.clone(), load).await;
        if !self.retain {
            self.inner.invalidate(key).await;
        }
        outcome
    }

    pub async fn len(&self) -> usize {
        self.inner.run_pending_tasks().await;
        self.inner.entry_count() as usize
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn clear(&self) {
        self.inner.invalidate_all();
        self.inner.run_pending_tasks().await;
    }
}
