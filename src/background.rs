/// Background event handlers: install, tab updates and runtime messages
use crate::cache::VisitCache;
use crate::error::{Error, LoadError, Result};
use crate::filter::UrlFilter;
use crate::indicator::Indicator;
use crate::message::{Request, Response};
use crate::source::HistorySource;
use crate::visit::{Visit, VisitMap};
use std::cell::RefCell;
use std::rc::Rc;

/// Tab and toolbar access needed by the handlers
#[allow(async_fn_in_trait)]
pub trait Browser {
    async fn active_tab_url(&self) -> Result<Option<String>>;

    async fn show_indicator(&self, tab_id: i32, indicator: &Indicator) -> Result<()>;
}

pub struct Background<S, B> {
    cache: VisitCache<S>,
    browser: B,
    filter: RefCell<UrlFilter>,
}

impl<S: HistorySource, B: Browser> Background<S, B> {
    pub fn new(source: S, browser: B) -> Self {
        Background {
            cache: VisitCache::new(source),
            browser,
            filter: RefCell::new(UrlFilter::default()),
        }
    }

    pub fn cache(&self) -> &VisitCache<S> {
        &self.cache
    }

    /// Extension installed or updated: warm the cache
    pub async fn on_installed(&self) {
        if let Ok(map) = self.reload().await {
            log::info!("Visit map ready with {} urls", map.len());
        }
    }

    /// Some tab changed: update the toolbar entry of `tab_id`
    pub async fn on_tab_updated(&self, tab_id: i32) -> Result<()> {
        let visit = match self.active_visit().await {
            Ok(visit) => visit,
            Err(Error::Load(e)) => {
                log::warn!("Showing tab {} as not visited: {}", tab_id, e);
                None
            }
            Err(e) => return Err(e),
        };

        self.browser
            .show_indicator(tab_id, &Indicator::from_lookup(visit))
            .await
    }

    pub async fn handle(&self, request: Request) -> Result<Response> {
        match request {
            Request::GetVisits => Ok(Response::Visits(self.active_visit().await?)),
            Request::RefreshMap => {
                let map = self.reload().await?;
                Ok(Response::Refreshed { urls: map.len() })
            }
        }
    }

    /// Re-read the URL filters and the visit map
    async fn reload(&self) -> std::result::Result<Rc<VisitMap>, LoadError> {
        self.reload_filter().await;
        self.cache.refresh().await
    }

    async fn reload_filter(&self) {
        let extra = self.cache.source().extra_filters().await;
        *self.filter.borrow_mut() = UrlFilter::with_patterns_or_builtin(&extra);
    }

    /// Visit record for the active tab, loading the map when needed
    async fn active_visit(&self) -> Result<Option<Visit>> {
        let Some(url) = self.browser.active_tab_url().await? else {
            return Ok(None);
        };

        if self.cache.current().is_none() {
            self.reload_filter().await;
        }
        if self.filter.borrow().is_filtered(&url) {
            log::debug!("Skipping lookup for {}", url);
            return Ok(None);
        }

        Ok(self.cache.visits_for(&url).await?)
    }
}
