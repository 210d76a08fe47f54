//! Keyword search with "load more" pagination over the remote API.
//!
//! Each request is split into a synchronous `start_*` step that mutates the
//! session (reset happens here, before any network I/O) and a `finish` step
//! that applies the response. Every request carries the generation it was
//! issued under; a reset bumps the generation, so responses that arrive for
//! a superseded keyword are dropped instead of overwriting newer state.

use crate::api::SearchBackend;
use crate::error::StorefrontError;
use crate::filter::{apply_filters, FilterState};
use crate::model::{Product, SearchMeta, SearchPage};

pub const PAGE_SIZE: u32 = 50;
pub const MIN_RATING: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestKind {
    Reset,
    LoadMore,
}

/// A page fetch issued by the session, to be run against a backend and
/// handed back to `SearchSession::finish`.
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub keyword: String,
    pub page: u32,
    generation: u64,
    kind: RequestKind,
}

impl PageRequest {
    pub async fn run<B: SearchBackend + ?Sized>(
        &self,
        backend: &B,
    ) -> Result<SearchPage, StorefrontError> {
        backend
            .fetch_page(&self.keyword, MIN_RATING, self.page, PAGE_SIZE)
            .await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The response was applied; carries the number of products it added.
    Applied(usize),
    /// A newer reset superseded this request.
    Stale,
    Failed,
}

/// Counts shown around the product grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultCounts {
    pub shown: usize,
    pub accumulated: usize,
    pub total: u64,
}

impl ResultCounts {
    /// Client-side filters (or the keyword) hide some accumulated products.
    pub fn is_narrowed(&self) -> bool {
        self.shown < self.accumulated
    }
}

#[derive(Debug)]
pub struct SearchSession {
    keyword: String,
    products: Vec<Product>,
    page: u32,
    total: u64,
    state: LoadState,
    generation: u64,
}

impl SearchSession {
    pub fn new() -> Self {
        Self {
            keyword: String::new(),
            products: Vec::new(),
            page: 1,
            total: 0,
            state: LoadState::Idle,
            generation: 0,
        }
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Clear everything for a new keyword and return the page-1 request.
    pub fn start_reset(&mut self, keyword: &str) -> PageRequest {
        self.generation += 1;
        self.keyword = keyword.to_string();
        self.products.clear();
        self.total = 0;
        self.page = 1;
        self.state = LoadState::Loading;
        tracing::debug!("Reset search for '{}' (generation {})", keyword, self.generation);

        PageRequest {
            keyword: self.keyword.clone(),
            page: 1,
            generation: self.generation,
            kind: RequestKind::Reset,
        }
    }

    pub fn start_load_more(&mut self) -> PageRequest {
        self.state = LoadState::Loading;
        PageRequest {
            keyword: self.keyword.clone(),
            page: self.page + 1,
            generation: self.generation,
            kind: RequestKind::LoadMore,
        }
    }

    pub fn finish(
        &mut self,
        request: &PageRequest,
        result: Result<SearchPage, StorefrontError>,
    ) -> Outcome {
        if request.generation != self.generation {
            tracing::debug!(
                "Discarding stale response for '{}' page {}",
                request.keyword,
                request.page
            );
            return Outcome::Stale;
        }

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                tracing::error!("Search for '{}' page {} failed: {}", request.keyword, request.page, e);
                self.state = LoadState::Error;
                return Outcome::Failed;
            }
        };

        let added = page.products.len();
        self.total = estimate_total(&page.meta, self.total, added);
        match request.kind {
            RequestKind::Reset => self.products = page.products,
            RequestKind::LoadMore => self.products.extend(page.products),
        }
        self.page = request.page;
        self.state = LoadState::Idle;

        tracing::info!(
            "Page {} added {} products ({} accumulated, ~{} total)",
            request.page,
            added,
            self.products.len(),
            self.total
        );
        Outcome::Applied(added)
    }

    pub async fn reset<B: SearchBackend + ?Sized>(&mut self, backend: &B, keyword: &str) -> Outcome {
        let request = self.start_reset(keyword);
        let result = request.run(backend).await;
        self.finish(&request, result)
    }

    pub async fn load_more<B: SearchBackend + ?Sized>(&mut self, backend: &B) -> Outcome {
        let request = self.start_load_more();
        let result = request.run(backend).await;
        self.finish(&request, result)
    }

    pub fn filtered<'a>(&'a self, filters: &FilterState) -> Vec<&'a Product> {
        apply_filters(&self.products, &self.keyword, filters)
    }

    pub fn counts(&self, shown: usize) -> ResultCounts {
        ResultCounts {
            shown,
            accumulated: self.products.len(),
            total: self.total,
        }
    }
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Best-effort total: explicit `total`, else `items × lastPage`, else the
/// previous estimate, else the size of the page just fetched.
pub fn estimate_total(meta: &SearchMeta, previous: u64, page_len: usize) -> u64 {
    if let Some(total) = meta.total.filter(|t| *t != 0) {
        return total;
    }
    if let Some(last_page) = meta.last_page.filter(|p| *p != 0) {
        if let Some(items) = meta.items {
            return items.saturating_mul(last_page);
        }
    }
    if previous != 0 {
        previous
    } else {
        page_len as u64
    }
}
