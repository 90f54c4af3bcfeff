/// In-memory cache of the visit map
///
/// The cache owns its `HistorySource`. A successful load swaps the whole map
/// in one step, so readers holding an older `Rc<VisitMap>` keep a consistent
/// snapshot. Loads are not de-duplicated: concurrent refreshes each read the
/// file and the last one to finish wins.
use crate::error::LoadError;
use crate::source::HistorySource;
use crate::visit::{Visit, VisitMap};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Unloaded,
    Loading,
    Loaded,
}

pub struct VisitCache<S> {
    source: S,
    map: RefCell<Option<Rc<VisitMap>>>,
    in_flight: Cell<usize>,
}

impl<S: HistorySource> VisitCache<S> {
    pub fn new(source: S) -> Self {
        VisitCache {
            source,
            map: RefCell::new(None),
            in_flight: Cell::new(0),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn state(&self) -> CacheState {
        if self.in_flight.get() > 0 {
            CacheState::Loading
        } else if self.map.borrow().is_some() {
            CacheState::Loaded
        } else {
            CacheState::Unloaded
        }
    }

    /// The currently cached map, if any
    pub fn current(&self) -> Option<Rc<VisitMap>> {
        self.map.borrow().clone()
    }

    /// Reload the map from the source.
    ///
    /// The cache is only replaced when the file parses into a non-empty map.
    /// An empty export returns `LoadError::Empty` and leaves the previous map
    /// in place.
    pub async fn refresh(&self) -> Result<Rc<VisitMap>, LoadError> {
        log::info!("Urls map refresh requested!");
        let _loading = LoadingGuard::enter(&self.in_flight);

        let result = self.load().await;
        match &result {
            Ok(map) => {
                *self.map.borrow_mut() = Some(Rc::clone(map));
            }
            Err(LoadError::Empty) => {
                log::warn!("History file has no entries, keeping previous map");
            }
            Err(e) => {
                log::error!("Failed to load visit map: {}", e);
            }
        }
        result
    }

    async fn load(&self) -> Result<Rc<VisitMap>, LoadError> {
        let text = self.source.read_history().await?;
        let map = VisitMap::from_json(&text)?;
        log::info!("Loaded map of length {}", map.len());

        if map.is_empty() {
            return Err(LoadError::Empty);
        }
        Ok(Rc::new(map))
    }

    /// Cached map, loading it first if nothing is cached yet
    pub async fn get(&self) -> Result<Rc<VisitMap>, LoadError> {
        match self.current() {
            Some(map) => Ok(map),
            None => self.refresh().await,
        }
    }

    /// Exact-URL lookup against whatever is cached right now
    pub fn lookup(&self, url: &str) -> Option<Visit> {
        self.map
            .borrow()
            .as_ref()
            .and_then(|map| map.get(url).cloned())
    }

    /// Load if needed, then look up `url`
    pub async fn visits_for(&self, url: &str) -> Result<Option<Visit>, LoadError> {
        let map = self.get().await?;
        Ok(map.get(url).cloned())
    }
}

/// Counts a load as in flight until dropped, including when the refresh
/// future itself is dropped before completing.
struct LoadingGuard<'a> {
    counter: &'a Cell<usize>,
}

impl<'a> LoadingGuard<'a> {
    fn enter(counter: &'a Cell<usize>) -> Self {
        counter.set(counter.get() + 1);
        LoadingGuard { counter }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.counter.set(self.counter.get() - 1);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use futures::executor::block_on;
    use futures::future::{self, Either};
    use serde_json::json;
    use std::collections::VecDeque;
    use std::future::Future;
    use std::pin::pin;
    use std::task::Poll;

    /// Serves canned responses in order and counts reads
    #[derive(Default)]
    pub(crate) struct FakeSource {
        responses: RefCell<VecDeque<Result<String, LoadError>>>,
        filters: Vec<String>,
        pub(crate) reads: Cell<usize>,
    }

    impl FakeSource {
        pub(crate) fn with(responses: Vec<Result<&str, LoadError>>) -> Self {
            FakeSource {
                responses: RefCell::new(
                    responses
                        .into_iter()
                        .map(|r| r.map(str::to_string))
                        .collect(),
                ),
                filters: Vec::new(),
                reads: Cell::new(0),
            }
        }

        pub(crate) fn with_filters(mut self, filters: &[&str]) -> Self {
            self.filters = filters.iter().map(|f| f.to_string()).collect();
            self
        }
    }

    impl HistorySource for FakeSource {
        async fn read_history(&self) -> Result<String, LoadError> {
            self.reads.set(self.reads.get() + 1);
            yield_once().await;
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or(Err(LoadError::Read("no more responses".to_string())))
        }

        async fn extra_filters(&self) -> Vec<String> {
            self.filters.clone()
        }
    }

    /// Lets other futures run before the read completes
    async fn yield_once() {
        let mut yielded = false;
        future::poll_fn(|cx| {
            if yielded {
                Poll::Ready(())
            } else {
                yielded = true;
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        })
        .await
    }

    /// Never resolves
    struct HangingSource;

    impl HistorySource for HangingSource {
        async fn read_history(&self) -> Result<String, LoadError> {
            future::pending().await
        }
    }

    const HISTORY: &str = r#"{
        "https://github.com": ["10 Oct 2018", "github"],
        "https://rust-lang.org": [["01 Jan 2019", "02 Jan 2019"], []]
    }"#;

    const OTHER_HISTORY: &str = r#"{"https://example.com": ["today", null]}"#;

    #[test]
    fn test_starts_unloaded() {
        let cache = VisitCache::new(FakeSource::default());

        assert_eq!(cache.state(), CacheState::Unloaded);
        assert!(cache.current().is_none());
        assert_eq!(cache.source().reads.get(), 0);
    }

    #[test]
    fn test_refresh_populates_cache() {
        let cache = VisitCache::new(FakeSource::with(vec![Ok(HISTORY)]));

        let map = block_on(cache.refresh()).unwrap();

        assert_eq!(map.len(), 2);
        assert_eq!(cache.state(), CacheState::Loaded);
        assert_eq!(
            cache.lookup("https://rust-lang.org"),
            Some(Visit::new(json!(["01 Jan 2019", "02 Jan 2019"]), json!([])))
        );
        assert!(Rc::ptr_eq(&map, &cache.current().unwrap()));
    }

    #[test]
    fn test_refresh_replaces_wholesale() {
        let cache = VisitCache::new(FakeSource::with(vec![Ok(HISTORY), Ok(OTHER_HISTORY)]));

        let first = block_on(cache.refresh()).unwrap();
        block_on(cache.refresh()).unwrap();

        assert_eq!(cache.lookup("https://github.com"), None);
        assert!(cache.lookup("https://example.com").is_some());
        // old snapshot is untouched
        assert!(first.contains("https://github.com"));
    }

    #[test]
    fn test_empty_map_keeps_unloaded() {
        let cache = VisitCache::new(FakeSource::with(vec![Ok("{}")]));

        assert_eq!(block_on(cache.refresh()), Err(LoadError::Empty));
        assert_eq!(cache.state(), CacheState::Unloaded);
    }

    #[test]
    fn test_empty_map_keeps_previous_map() {
        let cache = VisitCache::new(FakeSource::with(vec![Ok(HISTORY), Ok("{}")]));

        let before = block_on(cache.refresh()).unwrap();
        assert_eq!(block_on(cache.refresh()), Err(LoadError::Empty));

        assert!(Rc::ptr_eq(&before, &cache.current().unwrap()));
    }

    #[test]
    fn test_malformed_content_keeps_previous_map() {
        let cache = VisitCache::new(FakeSource::with(vec![Ok(HISTORY), Ok("{\"broken\": ")]));

        let before = block_on(cache.refresh()).unwrap();
        let result = block_on(cache.refresh());

        assert!(matches!(result, Err(LoadError::Parse(_))));
        assert!(Rc::ptr_eq(&before, &cache.current().unwrap()));
        assert_eq!(cache.state(), CacheState::Loaded);
    }

    #[test]
    fn test_read_failure_is_returned() {
        let cache = VisitCache::new(FakeSource::with(vec![Err(LoadError::NotConfigured)]));

        assert_eq!(block_on(cache.refresh()), Err(LoadError::NotConfigured));
        assert_eq!(cache.state(), CacheState::Unloaded);
    }

    #[test]
    fn test_get_on_unloaded_loads_once() {
        let cache = VisitCache::new(FakeSource::with(vec![Ok(HISTORY)]));

        let map = block_on(cache.get()).unwrap();

        assert_eq!(map.len(), 2);
        assert_eq!(cache.source().reads.get(), 1);
    }

    #[test]
    fn test_get_on_loaded_does_not_load() {
        let cache = VisitCache::new(FakeSource::with(vec![Ok(HISTORY)]));
        block_on(cache.refresh()).unwrap();

        let map = block_on(cache.get()).unwrap();

        assert_eq!(map.len(), 2);
        assert_eq!(cache.source().reads.get(), 1);
    }

    #[test]
    fn test_concurrent_gets_each_load() {
        let cache = VisitCache::new(FakeSource::with(vec![Ok(HISTORY), Ok(OTHER_HISTORY)]));

        let (a, b) = block_on(future::join(cache.get(), cache.get()));

        assert_eq!(a.unwrap().len(), 2);
        assert_eq!(b.unwrap().len(), 1);
        assert_eq!(cache.source().reads.get(), 2);
    }

    #[test]
    fn test_concurrent_refreshes_last_writer_wins() {
        let cache = VisitCache::new(FakeSource::with(vec![Ok(HISTORY), Ok(OTHER_HISTORY)]));

        let (first, second) = block_on(future::join(cache.refresh(), cache.refresh()));

        assert!(first.unwrap().contains("https://github.com"));
        let second = second.unwrap();
        assert!(Rc::ptr_eq(&second, &cache.current().unwrap()));
        assert_eq!(cache.lookup("https://github.com"), None);
        assert!(cache.lookup("https://example.com").is_some());
        assert_eq!(cache.state(), CacheState::Loaded);
    }

    #[test]
    fn test_lookup_unloaded_and_absent() {
        let cache = VisitCache::new(FakeSource::with(vec![Ok(HISTORY)]));
        assert_eq!(cache.lookup("https://github.com"), None);

        block_on(cache.refresh()).unwrap();

        assert_eq!(cache.lookup("https://gitlab.com"), None);
        assert_eq!(
            cache.lookup("https://github.com"),
            Some(Visit::new(json!("10 Oct 2018"), json!("github")))
        );
        // lookup never loads
        assert_eq!(cache.source().reads.get(), 1);
    }

    #[test]
    fn test_visits_for_loads_on_demand() {
        let cache = VisitCache::new(FakeSource::with(vec![Ok(HISTORY)]));

        let visit = block_on(cache.visits_for("https://github.com")).unwrap();
        let missing = block_on(cache.visits_for("https://gitlab.com")).unwrap();

        assert!(visit.is_some());
        assert!(missing.is_none());
        assert_eq!(cache.source().reads.get(), 1);
    }

    #[test]
    fn test_state_is_loading_while_in_flight() {
        let cache = VisitCache::new(HangingSource);

        block_on(async {
            let mut refresh = pin!(cache.refresh());
            future::poll_fn(|cx| {
                assert!(refresh.as_mut().poll(cx).is_pending());
                Poll::Ready(())
            })
            .await;
            assert_eq!(cache.state(), CacheState::Loading);
        });
    }

    #[test]
    fn test_dropped_refresh_leaves_loading() {
        let cache = VisitCache::new(HangingSource);

        block_on(async {
            let refresh = pin!(cache.refresh());
            let ready = pin!(future::ready(()));
            match future::select(refresh, ready).await {
                Either::Left(_) => panic!("hanging source resolved"),
                Either::Right(_) => {}
            }
        });

        assert_eq!(cache.state(), CacheState::Unloaded);
    }
}
