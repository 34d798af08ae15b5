//! Token in, bitmap (or nothing) out

use std::sync::Arc;

use image::RgbaImage;
use pixmoji_core::types::{AssetKey, ResolvedAsset, Token};
use pixmoji_core::{AsyncFetch, Fetch, Result};

use crate::cache::{decode, AssetCache, AsyncAssetCache, Miss};
use crate::provider::ProviderConfig;

fn settle(
    token: &Token,
    key: &AssetKey,
    outcome: std::result::Result<Arc<RgbaImage>, Arc<Miss>>,
) -> ResolvedAsset {
    match outcome {
        Ok(bitmap) => {
            log::trace!(
                "Resolved {key} to a {}x{} bitmap",
                bitmap.width(),
                bitmap.height()
            );
            ResolvedAsset::found(key.key.clone(), bitmap)
        },
        Err(miss) => {
            log::debug!("No bitmap for {key}, printing {:?} as text: {miss}", token.content());
            ResolvedAsset::absent(key.key.clone())
        },
    }
}

/// Blocking asset source
///
/// Fetch failures of any kind come back as [`ResolvedAsset::absent`].
pub struct AssetSource<F: Fetch> {
    fetcher: F,
    provider: ProviderConfig,
    cache: AssetCache,
}

impl<F: Fetch> AssetSource<F> {
    pub fn new(fetcher: F, provider: impl Into<ProviderConfig>) -> Self {
        Self {
            fetcher,
            provider: provider.into(),
            cache: AssetCache::new(true),
        }
    }

    pub fn with_caching(mut self, enabled: bool) -> Self {
        self.cache.set_retain(enabled);
        self
    }

    pub fn provider(&self) -> &ProviderConfig {
        &self.provider
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn fetcher_mut(&mut self) -> &mut F {
        &mut self.fetcher
    }

    pub fn caching(&self) -> bool {
        self.cache.retains()
    }

    pub fn set_caching(&mut self, enabled: bool) {
        self.cache.set_retain(enabled);
    }

    /// Look up the bitmap for an emoji token
    pub fn resolve(&self, token: &Token) -> ResolvedAsset {
        let (Some(key), Some(url)) = (AssetKey::for_token(token), self.provider.url_for(token))
        else {
            return ResolvedAsset::absent(token.content());
        };

        let outcome = self.cache.get_or_load(&key, || {
            log::debug!("Fetching {key} from {url} via {}", self.fetcher.name());
            let response = self.fetcher.fetch(&url)?;
            if !response.is_success() {
                return Err(Miss::Status(response.status));
            }
            decode(&response.body)
        });

        settle(token, &key, outcome)
    }

    /// Resolve several tokens one after another
    pub fn resolve_all<'a, I>(&self, tokens: I) -> Vec<ResolvedAsset>
    where
        I: IntoIterator<Item = &'a Token>,
    {
        tokens.into_iter().map(|token| self.resolve(token)).collect()
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Drop cached bitmaps and release the network session
    pub fn close(&mut self) {
        self.cache.clear();
        self.fetcher.close();
    }

    pub fn reopen(&mut self) -> Result<()> {
        self.fetcher.reopen()
    }
}

/// Non-blocking asset source
///
/// Lookups for distinct tokens may overlap; lookups for the same key share
/// a single fetch.
pub struct AsyncAssetSource<F: AsyncFetch> {
    fetcher: F,
    provider: ProviderConfig,
    cache: AsyncAssetCache,
}

impl<F: AsyncFetch> AsyncAssetSource<F> {
    pub fn new(fetcher: F, provider: impl Into<ProviderConfig>) -> Self {
        Self {
            fetcher,
            provider: provider.into(),
            cache: AsyncAssetCache::new(true),
        }
    }

    pub async fn with_caching(mut self, enabled: bool) -> Self {
        self.cache.set_retain(enabled).await;
        self
    }

    pub fn provider(&self) -> &ProviderConfig {
        &self.provider
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn fetcher_mut(&mut self) -> &mut F {
        &mut self.fetcher
    }

    pub fn caching(&self) -> bool {
        self.cache.retains()
    }

    pub async fn set_caching(&mut self, enabled: bool) {
        self.cache.set_retain(enabled).await;
    }

    pub async fn resolve(&self, token: &Token) -> ResolvedAsset {
        let (Some(key), Some(url)) = (AssetKey::for_token(token), self.provider.url_for(token))
        else {
            return ResolvedAsset::absent(token.content());
        };

        let load = async {
            log::debug!("Fetching {key} from {url} via {}", self.fetcher.name());
            let response = self.fetcher.fetch(&url).await?;
            if !response.is_success() {
                return Err(Miss::Status(response.status));
            }
            decode(&response.body)
        };
        let outcome = self.cache.get_or_load(&key, load).await;

        settle(token, &key, outcome)
    }

    /// Resolve every token with overlapping fetches, results in input order
    pub async fn resolve_all<'a, I>(&self, tokens: I) -> Vec<ResolvedAsset>
    where
        I: IntoIterator<Item = &'a Token>,
    {
        futures::future::join_all(tokens.into_iter().map(|token| self.resolve(token))).await
    }

    pub async fn cache_len(&self) -> usize {
        self.cache.len().await
    }

    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    pub async fn close(&mut self) {
        self.cache.clear().await;
        self.fetcher.close();
    }

    pub fn reopen(&mut self) -> Result<()> {
        self.fetcher.reopen()
    }
}
