//! Table operations through the backend's REST API

mod query;

use serde::Serialize;

use crate::fetch::ApiContext;

pub use query::*;

/// Client for one table
pub struct PostgrestClient {
    /// The base URL for the backend
    url: String,

    /// The table name
    table: String,

    /// Credentials and HTTP client
    api: ApiContext,
}

impl PostgrestClient {
    pub(crate) fn new(url: &str, table: &str, api: ApiContext) -> Self {
        Self {
            url: url.to_string(),
            table: table.to_string(),
            api,
        }
    }

    /// Get the base URL for REST API requests
    fn get_url(&self) -> String {
        format!("{}/rest/v1/{}", self.url, self.table)
    }

    /// Select specific columns from the table
    pub fn select(&self, columns: &str) -> SelectBuilder {
        SelectBuilder::new(self.get_url(), self.api.clone(), columns)
    }

    /// Insert data into the table
    pub fn insert<T: Serialize>(&self, values: T) -> InsertBuilder<T> {
        InsertBuilder::new(self.get_url(), self.api.clone(), values)
    }

    /// Upsert data in the table (insert or update if it exists)
    pub fn upsert<T: Serialize>(&self, values: T) -> UpsertBuilder<T> {
        UpsertBuilder::new(self.get_url(), self.api.clone(), values)
    }

    /// Delete data from the table
    pub fn delete(&self) -> DeleteBuilder {
        DeleteBuilder::new(self.get_url(), self.api.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use reqwest::Client;
    use serde_json::{json, Value};
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn api(token: Option<&str>) -> ApiContext {
        ApiContext {
            client: Client::new(),
            key: "anon".to_string(),
            token: token.map(str::to_string),
            monitor: None,
        }
    }

    #[tokio::test]
    async fn test_select_sends_filters_and_bearer() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/lost_items"))
            .and(query_param("select", "*"))
            .and(query_param("user_id", "eq.u-1"))
            .and(query_param("order", "created_at.desc"))
            .and(header("apikey", "anon"))
            .and(header("Authorization", "Bearer user-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": "a" }])))
            .expect(1)
            .mount(&server)
            .await;

        let table = PostgrestClient::new(&server.uri(), "lost_items", api(Some("user-token")));
        let rows: Vec<Value> = table
            .select("*")
            .eq("user_id", "u-1")
            .order("created_at", false)
            .execute()
            .await
            .unwrap();

        assert_eq!(rows, vec![json!({ "id": "a" })]);
    }

    #[tokio::test]
    async fn test_single_missing_row_is_none() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/profiles"))
            .and(query_param("limit", "1"))
            .and(header("Authorization", "Bearer anon"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let table = PostgrestClient::new(&server.uri(), "profiles", api(None));
        let row: Option<Value> = table.select("*").eq("id", "u-1").single().await.unwrap();
        assert!(row.is_none());
    }

    #[tokio::test]
    async fn test_backend_error_is_database_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/lost_items"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "code": "42501",
                "message": "new row violates row-level security policy"
            })))
            .mount(&server)
            .await;

        let table = PostgrestClient::new(&server.uri(), "lost_items", api(None));
        let err = table
            .insert(json!({ "name": "Wallet" }))
            .execute::<Value>()
            .await
            .unwrap_err();

        match err {
            Error::Database(msg) => assert_eq!(msg, "new row violates row-level security policy"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unfiltered_delete_is_refused() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(204))
            .expect(0)
            .mount(&server)
            .await;

        let table = PostgrestClient::new(&server.uri(), "lost_items", api(None));
        let err = table.delete().execute().await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
