use super::{list_state, ViewState};
use crate::app::AppContext;
use crate::error::Error;
use crate::items::LostItem;
use crate::ui::Toast;

/// Moderation list of every item. Mount only behind an admin gate.
pub struct AdminView {
    ctx: AppContext,
    items: Vec<LostItem>,
    loading: bool,
    deleting: Option<String>,
}

impl AdminView {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            items: Vec::new(),
            loading: true,
            deleting: None,
        }
    }

    pub async fn load(&mut self) -> Result<(), Error> {
        self.loading = true;
        let result = self.ctx.client.items().list().await;
        self.loading = false;

        match result {
            Ok(items) => {
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

    /// Delete one item and drop it from the list
    pub async fn delete(&mut self, item_id: &str) -> Result<(), Error> {
        self.deleting = Some(item_id.to_string());
        let result = self.ctx.client.items().delete(item_id).await;
        self.deleting = None;

        match result {
            Ok(()) => {
                self.items.retain(|item| item.id != item_id);
                self.ctx.notifier.notify(Toast::success("Item deleted successfully"));
                Ok(())
            }
            Err(e) => {
                log::error!("Error deleting item {}: {}", item_id, e);
                self.ctx.notifier.notify(Toast::error(e.user_message()));
                Err(e)
            }
        }
    }

    /// The item currently being deleted
    pub fn deleting(&self) -> Option<&str> {
        self.deleting.as_deref()
    }

    pub fn state(&self) -> ViewState<Vec<LostItem>> {
        list_state(self.loading, &self.items, "No lost items have been posted yet")
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

    async fn loaded(server: &MockServer, recorder: &Arc<Recorder>) -> AdminView {
        Mock::given(method("GET"))
            .and(path("/rest/v1/lost_items"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "id": "a", "name": "Umbrella", "phone": "1",
                    "place_found": "Bus", "location_to_collect": "Desk",
                    "created_at": "2024-05-19T10:00:00Z"
                },
                {
                    "id": "b", "name": "Scarf", "phone": "2",
                    "place_found": "Hall", "location_to_collect": "Desk",
                    "created_at": "2024-05-18T10:00:00Z"
                }
            ])))
            .mount(server)
            .await;

        let mut view = AdminView::new(AppContext::new(
            Findora::new(&server.uri(), "anon"),
            recorder.clone(),
            recorder.clone(),
            Monitor::disabled(),
        ));
        assert!(view.state().is_loading());
        view.load().await.unwrap();
        view
    }

    #[tokio::test]
    async fn test_delete_removes_item() {
        let server = MockServer::start().await;
        let recorder = Arc::new(Recorder::default());
        let mut view = loaded(&server, &recorder).await;

        Mock::given(method("DELETE"))
            .and(path("/rest/v1/lost_items"))
            .and(query_param("id", "eq.a"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        view.delete("a").await.unwrap();
        assert_eq!(view.deleting(), None);

        let remaining = view.state().ready().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, "b");
        assert_eq!(recorder.toasts(), vec![Toast::success("Item deleted successfully")]);
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_list() {
        let server = MockServer::start().await;
        let recorder = Arc::new(Recorder::default());
        let mut view = loaded(&server, &recorder).await;

        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "message": "permission denied for table lost_items"
            })))
            .mount(&server)
            .await;

        assert!(view.delete("a").await.is_err());
        assert_eq!(view.state().ready().unwrap().len(), 2);
        assert_eq!(
            recorder.toasts(),
            vec![Toast::error("permission denied for table lost_items")]
        );
    }
}
