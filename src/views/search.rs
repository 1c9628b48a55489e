use chrono::{DateTime, Utc};

use super::{list_state, ViewState};
use crate::app::AppContext;
use crate::error::Error;
use crate::items::{filter_items, LostItem, RecencyFilter};
use crate::ui::Toast;

/// Public search over every registered item
pub struct SearchView {
    ctx: AppContext,
    items: Vec<LostItem>,
    loading: bool,
    term: String,
    filter: RecencyFilter,
}

impl SearchView {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            items: Vec::new(),
            loading: true,
            term: String::new(),
            filter: RecencyFilter::default(),
        }
    }

    /// Seed the term from the page's `q` query parameter
    pub fn with_query(mut self, query: &str) -> Self {
        if let Some((_, term)) = url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
            .find(|(key, _)| key == "q")
        {
            self.term = term.into_owned();
        }
        self
    }

    /// Fetch all items, newest first
    pub async fn load(&mut self) -> Result<(), Error> {
        self.loading = true;
        let result = self.ctx.client.items().list().await;
        self.loading = false;

        match result {
            Ok(items) => {
                log::debug!("search loaded {} items", items.len());
                self.items = items;
                Ok(())
            }
            Err(e) => {
                log::error!("Error fetching items: {}", e);
                self.ctx.notifier.notify(Toast::error(e.user_message()));
                Err(e)
            }
        }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn set_term(&mut self, term: &str) {
        self.term = term.to_string();
    }

    pub fn filter(&self) -> RecencyFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: RecencyFilter) {
        self.filter = filter;
    }

    /// Query string reflecting the current term; empty when there is none
    pub fn search_params(&self) -> String {
        let term = self.term.trim();
        if term.is_empty() {
            return String::new();
        }
        url::form_urlencoded::Serializer::new(String::new())
            .append_pair("q", term)
            .finish()
    }

    /// Items matching the current term and filter
    pub fn visible(&self, now: DateTime<Utc>) -> Vec<LostItem> {
        filter_items(&self.items, &self.term, self.filter, now)
    }

    pub fn state(&self, now: DateTime<Utc>) -> ViewState<Vec<LostItem>> {
        list_state(self.loading, &self.visible(now), "No items found")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::Monitor;
    use crate::ui::testing::Recorder;
    use crate::Findora;
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn view(server: &MockServer, recorder: &Arc<Recorder>) -> SearchView {
        SearchView::new(AppContext::new(
            Findora::new(&server.uri(), "anon"),
            recorder.clone(),
            recorder.clone(),
            Monitor::disabled(),
        ))
    }

    #[tokio::test]
    async fn test_load_and_filter() {
        let server = MockServer::start().await;
        let recorder = Arc::new(Recorder::default());

        Mock::given(method("GET"))
            .and(path("/rest/v1/lost_items"))
            .and(query_param("order", "created_at.desc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "id": "1", "name": "Blue Wallet", "phone": "1",
                    "place_found": "Library", "location_to_collect": "Desk",
                    "created_at": "2024-05-19T10:00:00Z"
                },
                {
                    "id": "2", "name": "Keys", "phone": "2",
                    "place_found": "Gym", "location_to_collect": "Desk",
                    "created_at": "2024-04-01T10:00:00Z"
                }
            ])))
            .mount(&server)
            .await;

        let mut view = view(&server, &recorder).with_query("?q=library");
        assert_eq!(view.term(), "library");
        view.load().await.unwrap();

        let now = "2024-05-20T12:00:00Z".parse().unwrap();
        let ready = view.state(now).ready().unwrap();
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].id, "1");

        view.set_term("");
        view.set_filter(RecencyFilter::Recent);
        assert_eq!(view.visible(now).len(), 1);

        view.set_term("umbrella");
        assert_eq!(view.state(now), ViewState::Empty("No items found"));
    }

    #[tokio::test]
    async fn test_load_failure_keeps_list() {
        let server = MockServer::start().await;
        let recorder = Arc::new(Recorder::default());

        Mock::given(method("GET"))
            .and(path("/rest/v1/lost_items"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "message": "relation \"lost_items\" does not exist"
            })))
            .mount(&server)
            .await;

        let mut view = view(&server, &recorder);
        assert!(view.load().await.is_err());
        assert_eq!(
            recorder.toasts(),
            vec![Toast::error("relation \"lost_items\" does not exist")]
        );
        assert!(view.visible(Utc::now()).is_empty());
    }

    #[test]
    fn test_search_params() {
        let view = SearchView::new(AppContext::new(
            Findora::new("http://localhost:9", "anon"),
            Arc::new(Recorder::default()),
            Arc::new(Recorder::default()),
            Monitor::disabled(),
        ));
        let mut view = view.with_query("q=blue+wallet");
        assert_eq!(view.term(), "blue wallet");
        assert_eq!(view.search_params(), "q=blue+wallet");

        view.set_term("  ");
        assert_eq!(view.search_params(), "");
    }
}
