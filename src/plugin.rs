//! Plugin host for the structural search panel
//!
//! The host framework calls the lifecycle hooks; the presentation layer is
//! passed in as a `SearchView` on each call. The orchestrator and inventory
//! provider are handed over at construction, so nothing is looked up from
//! global state.

use crate::inventory::{Inventory, InventoryProvider};
use crate::output::{Notification, SearchView};
use crate::search::{
    Orchestrator, PageFetcher, ScraperDocument, SearchQuery, SearchReport, StructuralDocument,
};
use crate::state::SearchSession;
use crate::{LensError, SearchError};

/// Search panel plugin: owns the session and drives searches
pub struct SearchPlugin<F, D = ScraperDocument> {
    orchestrator: Orchestrator<F, D>,
    provider: Box<dyn InventoryProvider>,
    session: Option<SearchSession>,
    inventory: Option<Inventory>,
    active: bool,
}

impl<F: PageFetcher, D: StructuralDocument> SearchPlugin<F, D> {
    pub fn new(orchestrator: Orchestrator<F, D>, provider: Box<dyn InventoryProvider>) -> Self {
        Self {
            orchestrator,
            provider,
            session: None,
            inventory: None,
            active: false,
        }
    }

    /// The current session, once the plugin is loaded
    pub fn session(&self) -> Option<&SearchSession> {
        self.session.as_ref()
    }

    /// The inventory the next search will sweep
    pub fn inventory(&self) -> Option<&Inventory> {
        self.inventory.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Creates the idle session
    pub fn on_load(&mut self) {
        self.session = Some(SearchSession::new());
        tracing::debug!("Search plugin loaded");
    }

    /// Shows the panel, loading the inventory when the host supplies none
    pub fn on_activate(
        &mut self,
        view: &mut dyn SearchView,
        data: Option<Inventory>,
    ) -> Result<(), LensError> {
        let inventory = match data {
            Some(inventory) => inventory,
            None => self.provider.load_inventory()?,
        };

        tracing::debug!(
            "Search panel activated with {} pages ({} searchable)",
            inventory.urls.len(),
            inventory.searchable_count()
        );

        self.inventory = Some(inventory);
        self.active = true;
        self.render(view);
        Ok(())
    }

    pub fn on_deactivate(&mut self) {
        self.active = false;
        tracing::debug!("Search panel deactivated");
    }

    /// Takes a refreshed inventory from the host
    ///
    /// Existing results are re-rendered with the new page metadata; the
    /// search itself is not re-run.
    pub fn on_data_update(&mut self, view: &mut dyn SearchView, data: Inventory) {
        self.inventory = Some(data);

        if self.session.as_ref().is_some_and(SearchSession::has_results) {
            self.render(view);
        }
    }

    /// Runs a search for `selector` and shows its outcome
    pub async fn search(
        &mut self,
        view: &mut dyn SearchView,
        selector: &str,
    ) -> Result<SearchReport, SearchError> {
        let query = SearchQuery::new(selector);
        let outcome = self.run(&query).await;

        view.notify(&Notification::for_outcome(selector, &outcome));
        self.render(view);

        outcome
    }

    async fn run(&mut self, query: &SearchQuery) -> Result<SearchReport, SearchError> {
        let selector = query.validate()?;
        let session = self.session.get_or_insert_with(SearchSession::new);

        if self.inventory.is_none() {
            match self.provider.load_inventory() {
                Ok(inventory) => self.inventory = Some(inventory),
                Err(e) => {
                    let err =
                        SearchError::Unexpected(format!("Failed to load crawl inventory: {}", e));
                    session.begin(selector, 0)?;
                    session.fail(err.to_string());
                    return Err(err);
                }
            }
        }

        let pages = self
            .inventory
            .as_ref()
            .map(|inventory| inventory.urls.as_slice())
            .unwrap_or_default();

        self.orchestrator.run_search(session, query, pages).await
    }

    fn render(&self, view: &mut dyn SearchView) {
        let Some(session) = self.session.as_ref() else {
            return;
        };

        let empty = Inventory::default();
        let inventory = self.inventory.as_ref().unwrap_or(&empty);
        let report = session.results().refresh_metadata(&inventory.urls);

        view.render(session, &report, inventory);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::{CrawlPageRecord, InventoryError, InventoryResult, StaticInventory};
    use crate::search::{FetchError, PageContent};
    use crate::state::SearchState;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct MapFetcher(HashMap<String, String>);

    #[async_trait]
    impl PageFetcher for MapFetcher {
        async fn fetch(&self, url: &str) -> Result<PageContent, FetchError> {
            Ok(self
                .0
                .get(url)
                .map(PageContent::found)
                .unwrap_or_else(PageContent::unavailable))
        }
    }

    struct BrokenInventory;

    impl InventoryProvider for BrokenInventory {
        fn load_inventory(&self) -> InventoryResult<Inventory> {
            Err(InventoryError::Unavailable("crawler offline".to_string()))
        }
    }

    #[derive(Default)]
    struct RecordingView {
        notifications: Vec<Notification>,
        renders: Vec<(SearchState, SearchReport, usize)>,
    }

    impl SearchView for RecordingView {
        fn notify(&mut self, notification: &Notification) {
            self.notifications.push(notification.clone());
        }

        fn render(&mut self, session: &SearchSession, report: &SearchReport, inventory: &Inventory) {
            self.renders
                .push((session.state(), report.clone(), inventory.urls.len()));
        }
    }

    fn inventory() -> Inventory {
        Inventory::from_pages(vec![
            CrawlPageRecord::new("https://example.com/", 200, "text/html").with_title("Home"),
            CrawlPageRecord::new("https://example.com/blog", 200, "text/html").with_title("Blog"),
            CrawlPageRecord::new("https://example.com/old", 404, "text/html"),
        ])
    }

    fn plugin_with(provider: Box<dyn InventoryProvider>) -> SearchPlugin<MapFetcher> {
        let pages = HashMap::from([
            (
                "https://example.com/".to_string(),
                "<article></article><article></article>".to_string(),
            ),
            (
                "https://example.com/blog".to_string(),
                "<article></article><article></article><article></article>".to_string(),
            ),
            (
                "https://example.com/old".to_string(),
                "<article></article>".to_string(),
            ),
        ]);
        SearchPlugin::new(Orchestrator::new(MapFetcher(pages)), provider)
    }

    fn plugin() -> SearchPlugin<MapFetcher> {
        plugin_with(Box::new(StaticInventory::new(inventory())))
    }

    #[test]
    fn test_on_load_creates_idle_session() {
        let mut plugin = plugin();
        assert!(plugin.session().is_none());

        plugin.on_load();
        assert_eq!(plugin.session().map(SearchSession::state), Some(SearchState::Idle));
    }

    #[test]
    fn test_activate_loads_inventory_when_none_supplied() {
        let mut plugin = plugin();
        let mut view = RecordingView::default();
        plugin.on_load();

        plugin.on_activate(&mut view, None).unwrap();

        assert!(plugin.is_active());
        assert_eq!(plugin.inventory().map(|i| i.urls.len()), Some(3));
        assert_eq!(view.renders.len(), 1);
        assert_eq!(view.renders[0].0, SearchState::Idle);

        plugin.on_deactivate();
        assert!(!plugin.is_active());
    }

    #[test]
    fn test_activate_prefers_supplied_data() {
        let mut plugin = plugin_with(Box::new(BrokenInventory));
        let mut view = RecordingView::default();
        plugin.on_load();

        plugin
            .on_activate(&mut view, Some(Inventory::from_pages(vec![])))
            .unwrap();
        assert_eq!(view.renders[0].2, 0);
    }

    #[test]
    fn test_activate_surfaces_inventory_errors() {
        let mut plugin = plugin_with(Box::new(BrokenInventory));
        let mut view = RecordingView::default();
        plugin.on_load();

        let result = plugin.on_activate(&mut view, None);
        assert!(matches!(result, Err(LensError::Inventory(_))));
        assert!(view.renders.is_empty());
    }

    #[tokio::test]
    async fn test_search_notifies_and_renders() {
        let mut plugin = plugin();
        let mut view = RecordingView::default();
        plugin.on_load();
        plugin.on_activate(&mut view, None).unwrap();

        let report = plugin.search(&mut view, "article").await.unwrap();

        assert_eq!(report.total_matches, 5);
        assert_eq!(report.results[0].url, "https://example.com/blog");
        assert_eq!(
            view.notifications,
            vec![Notification::Success(
                "Found 5 matching elements on 2 pages".to_string()
            )]
        );
        let (state, rendered, _) = view.renders.last().unwrap();
        assert_eq!(*state, SearchState::Completed);
        assert_eq!(rendered, &report);
    }

    #[tokio::test]
    async fn test_search_without_matches_is_informational() {
        let mut plugin = plugin();
        let mut view = RecordingView::default();
        plugin.on_load();

        let report = plugin.search(&mut view, "table").await.unwrap();

        assert!(report.is_empty());
        assert!(matches!(view.notifications[0], Notification::Info(_)));
    }

    #[tokio::test]
    async fn test_blank_search_leaves_session_alone() {
        let mut plugin = plugin();
        let mut view = RecordingView::default();
        plugin.on_load();
        plugin.search(&mut view, "article").await.unwrap();

        let result = plugin.search(&mut view, "   ").await;

        assert!(matches!(result, Err(SearchError::Validation(_))));
        assert!(view.notifications.last().unwrap().is_error());
        let session = plugin.session().unwrap();
        assert_eq!(session.state(), SearchState::Completed);
        assert_eq!(session.selector(), "article");
    }

    #[tokio::test]
    async fn test_inventory_failure_fails_the_session() {
        let mut plugin = plugin_with(Box::new(BrokenInventory));
        let mut view = RecordingView::default();
        plugin.on_load();

        let result = plugin.search(&mut view, "article").await;

        assert!(matches!(result, Err(SearchError::Unexpected(_))));
        let session = plugin.session().unwrap();
        assert_eq!(session.state(), SearchState::Failed);
        assert!(session.last_error().unwrap().contains("crawler offline"));
        assert!(view.notifications[0].is_error());
    }

    #[tokio::test]
    async fn test_data_update_refreshes_metadata_without_rerunning() {
        let mut plugin = plugin();
        let mut view = RecordingView::default();
        plugin.on_load();

        // No results yet: nothing to re-render
        plugin.on_data_update(&mut view, inventory());
        assert!(view.renders.is_empty());

        plugin.search(&mut view, "article").await.unwrap();
        let renders_before = view.renders.len();

        let mut refreshed = inventory();
        refreshed.urls[1].title = Some("Blog (updated)".to_string());
        plugin.on_data_update(&mut view, refreshed);

        assert_eq!(view.renders.len(), renders_before + 1);
        let (_, rendered, _) = view.renders.last().unwrap();
        assert_eq!(rendered.results[0].title.as_deref(), Some("Blog (updated)"));
        assert_eq!(rendered.total_matches, 5);
        // The stored session keeps what the run recorded
        assert_eq!(
            plugin.session().unwrap().results().results[0].title.as_deref(),
            Some("Blog")
        );
    }
}
