//! Query builders for table and RPC calls

use reqwest::Method;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;

use crate::error::Error;
use crate::fetch::ApiContext;

/// Base query builder
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    /// Query parameters
    params: HashMap<String, String>,
}

impl QueryBuilder {
    /// Create a new QueryBuilder
    pub fn new() -> Self {
        Self {
            params: HashMap::new(),
        }
    }

    /// Add a parameter to the query
    pub fn add_param(&mut self, key: &str, value: &str) {
        self.params.insert(key.to_string(), value.to_string());
    }

    /// Get the query parameters
    pub fn get_params(&self) -> &HashMap<String, String> {
        &self.params
    }

    fn eq(&mut self, column: &str, value: &str) {
        self.add_param(column, &format!("eq.{}", value));
    }
}

/// Builder for SELECT queries
pub struct SelectBuilder {
    url: String,
    api: ApiContext,
    query: QueryBuilder,
}

impl SelectBuilder {
    pub(crate) fn new(url: String, api: ApiContext, columns: &str) -> Self {
        let mut query = QueryBuilder::new();
        query.add_param("select", columns);

        Self { url, api, query }
    }

    /// Filter rows where column equals a value
    pub fn eq<T: ToString>(&mut self, column: &str, value: T) -> &mut Self {
        self.query.eq(column, &value.to_string());
        self
    }

    /// Limit the number of rows returned
    pub fn limit(&mut self, count: u32) -> &mut Self {
        self.query.add_param("limit", &count.to_string());
        self
    }

    /// Order the results by a column
    pub fn order(&mut self, column: &str, ascending: bool) -> &mut Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.query.add_param("order", &format!("{}.{}", column, direction));
        self
    }

    /// Execute the query and return the results
    pub async fn execute<T: DeserializeOwned>(&self) -> Result<Vec<T>, Error> {
        let result = self
            .api
            .request(Method::GET, &self.url)
            .on_error(Error::Database)
            .query(self.query.get_params().clone())
            .execute::<Vec<T>>()
            .await?;
        Ok(result)
    }

    /// Execute the query and return the first row, if any.
    ///
    /// A missing row is `None` rather than an error.
    pub async fn single<T: DeserializeOwned>(&mut self) -> Result<Option<T>, Error> {
        self.limit(1);

        let results = self.execute::<T>().await?;
        Ok(results.into_iter().next())
    }
}

/// Builder for INSERT queries
pub struct InsertBuilder<T: Serialize> {
    url: String,
    api: ApiContext,
    values: T,
}

impl<T: Serialize> InsertBuilder<T> {
    pub(crate) fn new(url: String, api: ApiContext, values: T) -> Self {
        Self { url, api, values }
    }

    /// Execute the insert and return the inserted rows.
    ///
    /// A backend that stores the rows without sending them back yields an
    /// empty list.
    pub async fn execute<R: DeserializeOwned>(&self) -> Result<Vec<R>, Error> {
        let text = self
            .api
            .request(Method::POST, &self.url)
            .header("Prefer", "return=representation")
            .on_error(Error::Database)
            .json(&self.values)?
            .execute_text()
            .await?;

        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&text)?)
    }
}

/// Builder for UPSERT queries
pub struct UpsertBuilder<T: Serialize> {
    url: String,
    api: ApiContext,
    values: T,
    on_conflict: Option<String>,
}

impl<T: Serialize> UpsertBuilder<T> {
    pub(crate) fn new(url: String, api: ApiContext, values: T) -> Self {
        Self {
            url,
            api,
            values,
            on_conflict: None,
        }
    }

    /// Specify the column(s) to check for conflicts
    pub fn on_conflict(&mut self, column: &str) -> &mut Self {
        self.on_conflict = Some(column.to_string());
        self
    }

    /// Execute the upsert and return the resulting rows
    pub async fn execute<R: DeserializeOwned>(&self) -> Result<Vec<R>, Error> {
        let mut params = HashMap::new();
        if let Some(ref conflict) = self.on_conflict {
            params.insert("on_conflict".to_string(), conflict.clone());
        }

        let result = self
            .api
            .request(Method::POST, &self.url)
            .header("Prefer", "return=representation,resolution=merge-duplicates")
            .on_error(Error::Database)
            .query(params)
            .json(&self.values)?
            .execute::<Vec<R>>()
            .await?;
        Ok(result)
    }
}

/// Builder for DELETE queries
pub struct DeleteBuilder {
    url: String,
    api: ApiContext,
    query: QueryBuilder,
}

impl DeleteBuilder {
    pub(crate) fn new(url: String, api: ApiContext) -> Self {
        Self {
            url,
            api,
            query: QueryBuilder::new(),
        }
    }

    /// Filter rows where column equals a value
    pub fn eq<V: ToString>(&mut self, column: &str, value: V) -> &mut Self {
        self.query.eq(column, &value.to_string());
        self
    }

    /// Execute the delete.
    ///
    /// Refuses to run without a filter.
    pub async fn execute(&self) -> Result<(), Error> {
        if self.query.get_params().is_empty() {
            return Err(Error::validation("delete requires a filter"));
        }

        self.api
            .request(Method::DELETE, &self.url)
            .header("Prefer", "return=minimal")
            .on_error(Error::Database)
            .query(self.query.get_params().clone())
            .execute_empty()
            .await
    }
}

/// Builder for RPC (stored procedure) calls
pub struct RpcBuilder<T: Serialize> {
    url: String,
    api: ApiContext,
    params: T,
}

impl<T: Serialize> RpcBuilder<T> {
    pub(crate) fn new(url: String, api: ApiContext, params: T) -> Self {
        Self { url, api, params }
    }

    /// Execute the RPC call and return the result
    pub async fn execute<R: DeserializeOwned>(&self) -> Result<R, Error> {
        let result = self
            .api
            .request(Method::POST, &self.url)
            .on_error(Error::Database)
            .json(&self.params)?
            .execute::<R>()
            .await?;
        Ok(result)
    }
}
