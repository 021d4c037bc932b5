//! Cache-first, paginated nearby search per grid cell.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use place_sweep_cache::{CacheRecord, JsonStore};
use place_sweep_geography_models::GridCell;
use place_sweep_places_models::{Place, SearchNearbyRequest};

use crate::{FetchOutcome, Pacing, PlacesError, PlacesProvider, RateLimitPolicy};

/// Tunables for [`SearchGateway`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSettings {
    /// Provider category filter.
    pub included_types: Vec<String>,
    /// Results requested per page.
    pub page_size: u32,
    /// Maximum pages fetched per cell.
    pub max_pages: u32,
    /// Wait before each continuation request.
    pub page_delay: Duration,
    /// Added to the cell diagonal when sizing the search circle.
    pub radius_buffer_m: f64,
    /// Upper bound on the search radius.
    pub max_radius_m: u32,
    /// Rate-limit handling.
    pub rate_limit: RateLimitPolicy,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            included_types: vec!["restaurant".to_string()],
            page_size: 20,
            max_pages: 3,
            page_delay: Duration::from_secs(2),
            radius_buffer_m: 100.0,
            max_radius_m: 50_000,
            rate_limit: RateLimitPolicy::default(),
        }
    }
}

impl SearchSettings {
    /// Most results one cell can return.
    #[must_use]
    pub const fn result_ceiling(&self) -> u32 {
        self.page_size * self.max_pages
    }
}

/// All pages of one cell, before website filtering.
struct CellPages {
    places: Vec<Place>,
    saturated: bool,
}

/// Runs one nearby search per cell, backed by the grid cache namespace.
pub struct SearchGateway {
    provider: Arc<dyn PlacesProvider>,
    cache: JsonStore,
    settings: SearchSettings,
    saturated: AtomicUsize,
}

impl SearchGateway {
    /// Creates a gateway over `cache` (the grid namespace).
    #[must_use]
    pub fn new(provider: Arc<dyn PlacesProvider>, cache: JsonStore, settings: SearchSettings) -> Self {
        Self {
            provider,
            cache,
            settings,
            saturated: AtomicUsize::new(0),
        }
    }

    /// The active settings.
    #[must_use]
    pub const fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Number of cells fetched during this run whose results may have been
    /// truncated by the page cap.
    #[must_use]
    pub fn saturated_cells(&self) -> usize {
        self.saturated.load(Ordering::Relaxed)
    }

    /// Returns the website-bearing places in `cell`.
    ///
    /// A cached cell (empty or not) is answered without any network call.
    /// Otherwise every page is fetched, filtered, and persisted before the
    /// outcome is returned. Rate-limited and failed cells leave the cache
    /// untouched so the next run retries them.
    pub async fn search(&self, cell: &GridCell) -> FetchOutcome<Vec<Place>> {
        let key = cell.cache_key();

        match self.cache.get::<Vec<Place>>(&key).await {
            CacheRecord::Present(places) => return FetchOutcome::Cached(places),
            CacheRecord::Empty => return FetchOutcome::Cached(Vec::new()),
            CacheRecord::Absent => {}
        }

        let radius = cell.search_radius_meters(self.settings.radius_buffer_m, self.settings.max_radius_m);
        let label = format!("cell {key}");

        let this = self;
        let result = self
            .settings
            .rate_limit
            .run(&label, move || this.fetch_pages(cell, radius))
            .await;

        let pages = match result {
            Ok(pages) => pages,
            Err(PlacesError::RateLimited) => {
                log::warn!("Giving up on {label} after repeated rate limiting");
                return FetchOutcome::RateLimited;
            }
            Err(e) => {
                log::warn!("Search failed for {label}: {e}");
                return FetchOutcome::Failed(e.to_string());
            }
        };

        if pages.saturated {
            self.saturated.fetch_add(1, Ordering::Relaxed);
            log::warn!(
                "Possible undercoverage in {label}: {} results hit the {}-result ceiling",
                pages.places.len(),
                self.settings.result_ceiling()
            );
        }

        let total = pages.places.len();
        let places: Vec<Place> = pages
            .places
            .into_iter()
            .filter(Place::has_website)
            .collect();
        log::debug!("{label}: {} of {total} places have a website", places.len());

        let stored = if places.is_empty() {
            self.cache.put_empty(&key).await
        } else {
            self.cache.put_present(&key, &places).await
        };

        if let Err(e) = stored {
            log::warn!("Failed to cache {label}: {e}");
            return FetchOutcome::Failed(e.to_string());
        }

        FetchOutcome::Fetched(places)
    }

    async fn fetch_pages(&self, cell: &GridCell, radius: u32) -> Result<CellPages, PlacesError> {
        let page_size = self.settings.page_size;
        let mut request = SearchNearbyRequest::first_page(
            cell.center(),
            radius,
            &self.settings.included_types,
            page_size,
        );
        let mut places = Vec::new();
        let mut pages = 0;

        loop {
            let response = self.provider.search_nearby(&request).await?;
            pages += 1;
            let page_len = response.places.len();
            places.extend(response.places);

            let token = response.next_page_token.filter(|t| !t.is_empty());
            let full_page = u32::try_from(page_len).is_ok_and(|n| n >= page_size);

            if pages >= self.settings.max_pages {
                return Ok(CellPages {
                    places,
                    saturated: token.is_some() || full_page,
                });
            }

            let Some(token) = token else {
                if full_page {
                    log::debug!("Got {page_len} results on page {pages} but no continuation token");
                }
                return Ok(CellPages {
                    places,
                    saturated: full_page,
                });
            };

            Pacing::new(self.settings.page_delay).pause().await;
            request = SearchNearbyRequest::next_page(token, page_size);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::path::PathBuf;
    use std::sync::Mutex;

    use place_sweep_cache::CacheNamespace;
    use place_sweep_places_models::{PlaceDetails, SearchNearbyResponse};

    use super::*;

    /// Replays scripted search pages and records every request.
    #[derive(Default)]
    struct ScriptedSearch {
        pages: Mutex<VecDeque<Result<SearchNearbyResponse, PlacesError>>>,
        requests: Mutex<Vec<SearchNearbyRequest>>,
    }

    impl ScriptedSearch {
        fn new(pages: Vec<Result<SearchNearbyResponse, PlacesError>>) -> Arc<Self> {
            Arc::new(Self {
                pages: Mutex::new(pages.into()),
                requests: Mutex::default(),
            })
        }

        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait::async_trait]
    impl PlacesProvider for ScriptedSearch {
        async fn search_nearby(
            &self,
            request: &SearchNearbyRequest,
        ) -> Result<SearchNearbyResponse, PlacesError> {
            self.requests.lock().unwrap().push(request.clone());
            self.pages
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(SearchNearbyResponse::default()))
        }

        async fn place_details(&self, _place_id: &str) -> Result<PlaceDetails, PlacesError> {
            unreachable!("search tests never request details")
        }
    }

    fn place(id: &str, website: Option<&str>) -> Place {
        Place {
            id: id.to_string(),
            website_uri: website.map(String::from),
            ..Place::default()
        }
    }

    fn page(places: Vec<Place>, token: Option<&str>) -> Result<SearchNearbyResponse, PlacesError> {
        Ok(SearchNearbyResponse {
            places,
            next_page_token: token.map(String::from),
        })
    }

    fn fast_settings() -> SearchSettings {
        SearchSettings {
            page_delay: Duration::ZERO,
            rate_limit: RateLimitPolicy {
                cooldown: Duration::ZERO,
                max_attempts: 3,
            },
            ..SearchSettings::default()
        }
    }

    fn cache(name: &str) -> (PathBuf, JsonStore) {
        let root = std::env::temp_dir().join(format!("place_sweep_search_test_{name}"));
        let _ = std::fs::remove_dir_all(&root);
        let store = JsonStore::open(&root, CacheNamespace::Grid).unwrap();
        (root, store)
    }

    fn cell() -> GridCell {
        GridCell {
            lat_low: 40.75,
            lon_low: -73.99,
            lat_high: 40.76,
            lon_high: -73.98,
        }
    }

    #[tokio::test]
    async fn follows_pages_and_keeps_only_places_with_websites() {
        let (root, store) = cache("pages");
        let provider = ScriptedSearch::new(vec![
            page(vec![place("a", Some("https://a.example")), place("b", None)], Some("t1")),
            page(vec![place("c", Some("https://c.example"))], None),
        ]);
        let gateway = SearchGateway::new(provider.clone(), store.clone(), fast_settings());

        let outcome = gateway.search(&cell()).await;

        let FetchOutcome::Fetched(places) = outcome else {
            panic!("expected a fetch, got {outcome:?}");
        };
        let ids: Vec<&str> = places.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);

        let requests = provider.requests.lock().unwrap().clone();
        assert_eq!(requests.len(), 2);
        let circle = requests[0].location_restriction.unwrap().circle;
        assert_eq!(circle.center, cell().center());
        assert!((circle.radius - f64::from(cell().search_radius_meters(100.0, 50_000))).abs() < 1e-9);
        assert_eq!(requests[1].page_token.as_deref(), Some("t1"));
        assert!(requests[1].location_restriction.is_none());

        assert_eq!(
            store.get::<Vec<Place>>(&cell().cache_key()).await,
            CacheRecord::Present(places)
        );
        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn cached_cell_makes_no_calls() {
        let (root, store) = cache("cached");
        store.put_empty(&cell().cache_key()).await.unwrap();
        let provider = ScriptedSearch::new(vec![]);
        let gateway = SearchGateway::new(provider.clone(), store, fast_settings());

        let outcome = gateway.search(&cell()).await;

        assert_eq!(outcome, FetchOutcome::Cached(Vec::new()));
        assert!(!outcome.used_api());
        assert_eq!(provider.calls(), 0);
        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn websiteless_results_are_cached_as_empty() {
        let (root, store) = cache("websiteless");
        let provider = ScriptedSearch::new(vec![page(vec![place("a", None)], None)]);
        let gateway = SearchGateway::new(provider.clone(), store.clone(), fast_settings());

        assert_eq!(gateway.search(&cell()).await, FetchOutcome::Fetched(Vec::new()));
        assert_eq!(
            store.get::<Vec<Place>>(&cell().cache_key()).await,
            CacheRecord::Empty
        );

        // A second pass is answered from the cache.
        assert_eq!(gateway.search(&cell()).await, FetchOutcome::Cached(Vec::new()));
        assert_eq!(provider.calls(), 1);
        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn rate_limit_then_success_ends_present() {
        let (root, store) = cache("rate_limit_recovers");
        let provider = ScriptedSearch::new(vec![
            Err(PlacesError::RateLimited),
            page(vec![place("a", Some("https://a.example"))], None),
        ]);
        let gateway = SearchGateway::new(provider.clone(), store.clone(), fast_settings());

        let outcome = gateway.search(&cell()).await;

        assert!(matches!(outcome, FetchOutcome::Fetched(ref places) if places.len() == 1));
        assert_eq!(provider.calls(), 2);
        assert!(matches!(
            store.get::<Vec<Place>>(&cell().cache_key()).await,
            CacheRecord::Present(_)
        ));
        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn persistent_rate_limit_leaves_cell_absent() {
        let (root, store) = cache("rate_limit_exhausted");
        let provider = ScriptedSearch::new(vec![
            Err(PlacesError::RateLimited),
            Err(PlacesError::RateLimited),
            Err(PlacesError::RateLimited),
        ]);
        let gateway = SearchGateway::new(provider.clone(), store.clone(), fast_settings());

        assert_eq!(gateway.search(&cell()).await, FetchOutcome::RateLimited);
        assert_eq!(provider.calls(), 3);
        assert!(store.get::<Vec<Place>>(&cell().cache_key()).await.is_absent());
        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn transient_failure_leaves_cell_absent() {
        let (root, store) = cache("transient");
        let provider = ScriptedSearch::new(vec![Err(PlacesError::Api {
            status: 500,
            message: "backend".to_string(),
        })]);
        let gateway = SearchGateway::new(provider.clone(), store.clone(), fast_settings());

        assert!(matches!(gateway.search(&cell()).await, FetchOutcome::Failed(_)));
        assert!(!store.contains(&cell().cache_key()).await);
        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn page_cap_with_token_counts_as_saturated() {
        let (root, store) = cache("saturated");
        let settings = SearchSettings {
            max_pages: 2,
            page_size: 1,
            ..fast_settings()
        };
        let provider = ScriptedSearch::new(vec![
            page(vec![place("a", Some("https://a.example"))], Some("t1")),
            page(vec![place("b", Some("https://b.example"))], Some("t2")),
            page(vec![place("never", Some("https://c.example"))], None),
        ]);
        let gateway = SearchGateway::new(provider.clone(), store, settings);

        let places = gateway.search(&cell()).await.into_value().unwrap();

        assert_eq!(places.len(), 2);
        assert_eq!(provider.calls(), 2);
        assert_eq!(gateway.saturated_cells(), 1);
        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn full_page_without_token_counts_as_saturated() {
        let (root, store) = cache("full_page_no_token");
        let full: Vec<Place> = (0..20)
            .map(|i| place(&format!("p{i}"), Some("https://p.example")))
            .collect();
        let provider = ScriptedSearch::new(vec![page(full, None)]);
        let gateway = SearchGateway::new(provider.clone(), store, fast_settings());

        let places = gateway.search(&cell()).await.into_value().unwrap();

        assert_eq!(places.len(), 20);
        assert_eq!(provider.calls(), 1);
        assert_eq!(gateway.saturated_cells(), 1);
        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn short_last_page_is_not_saturated() {
        let (root, store) = cache("short_page");
        let provider = ScriptedSearch::new(vec![page(
            vec![place("a", Some("https://a.example"))],
            None,
        )]);
        let gateway = SearchGateway::new(provider, store, fast_settings());

        assert!(gateway.search(&cell()).await.is_success());
        assert_eq!(gateway.saturated_cells(), 0);
        let _ = std::fs::remove_dir_all(&root);
    }
}
