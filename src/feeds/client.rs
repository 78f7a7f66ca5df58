use super::FeedOperations;
use super::types::{
    FeedResponse, ListEntryJson, SpreadsheetEntryJson, WorksheetEntryJson, row_insert_body,
    worksheet_insert_body,
};
use crate::error::{AppError, Result};
use crate::models::{Credentials, NewWorksheet, Row, SpreadsheetEntry, WorksheetEntry};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

/// HTTP binding for the feed API's JSON dialect.
pub struct FeedClient {
    client: Client,
    credentials: Credentials,
}

impl FeedClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::ClientBuilder::new()
            .build()
            .map_err(|e| AppError::Service(format!("Failed to build reqwest client: {}", e)))?;

        Ok(Self {
            client,
            credentials: Credentials::Anonymous,
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Credentials::Anonymous => request,
            Credentials::Password { username, password } => {
                request.basic_auth(username, Some(password))
            }
            Credentials::Token(token) => request.bearer_auth(token),
        }
    }

    async fn fetch_entries<E: DeserializeOwned>(&self, url: &Url) -> Result<Option<Vec<E>>> {
        let response = self
            .authorize(self.client.get(json_url(url)))
            .send()
            .await?;
        let response = ensure_success(response, "fetch feed").await?;

        let body: FeedResponse<E> = response.json().await?;

        Ok(body.feed.map(|feed| feed.entry))
    }

    async fn post_entry(&self, url: &Url, body: serde_json::Value, action: &str) -> Result<()> {
        let response = self
            .authorize(self.client.post(json_url(url)))
            .json(&body)
            .send()
            .await?;
        ensure_success(response, action).await?;

        Ok(())
    }
}

#[async_trait]
impl FeedOperations for FeedClient {
    fn set_credentials(&mut self, credentials: Credentials) {
        self.credentials = credentials;
    }

    #[instrument(name = "Fetching spreadsheets feed", skip_all)]
    async fn spreadsheets(&self, url: &Url) -> Result<Vec<SpreadsheetEntry>> {
        self.fetch_entries::<SpreadsheetEntryJson>(url)
            .await?
            .unwrap_or_default()
            .into_iter()
            .map(SpreadsheetEntry::try_from)
            .collect()
    }

    #[instrument(name = "Fetching worksheets feed", skip_all)]
    async fn worksheets(&self, url: &Url) -> Result<Vec<WorksheetEntry>> {
        self.fetch_entries::<WorksheetEntryJson>(url)
            .await?
            .unwrap_or_default()
            .into_iter()
            .map(WorksheetEntry::try_from)
            .collect()
    }

    #[instrument(name = "Fetching list feed", skip_all)]
    async fn rows(&self, url: &Url) -> Result<Option<Vec<Row>>> {
        let entries = self.fetch_entries::<ListEntryJson>(url).await?;
        debug!(rows = entries.as_ref().map(Vec::len), "Fetched list feed");

        Ok(entries.map(|entries| entries.into_iter().map(Row::from).collect()))
    }

    async fn insert_worksheet(&self, url: &Url, worksheet: &NewWorksheet) -> Result<()> {
        self.post_entry(url, worksheet_insert_body(worksheet), "insert worksheet")
            .await
    }

    async fn insert_row(&self, url: &Url, row: &Row) -> Result<()> {
        self.post_entry(url, row_insert_body(row), "insert row").await
    }

    async fn delete_worksheet(&self, worksheet: &WorksheetEntry) -> Result<()> {
        let edit_url = worksheet.edit_url.as_ref().ok_or_else(|| {
            AppError::Service(format!(
                "Worksheet '{}' has no edit link",
                worksheet.title
            ))
        })?;

        let response = self
            .authorize(self.client.delete(edit_url.clone()))
            .send()
            .await?;
        ensure_success(response, "delete worksheet").await?;

        Ok(())
    }
}

fn json_url(url: &Url) -> Url {
    let mut url = url.clone();
    url.query_pairs_mut().append_pair("alt", "json");
    url
}

async fn ensure_success(response: Response, action: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = format!("Failed to {}: {} - {}", action, status, body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AppError::Auth(message)),
        _ => Err(AppError::Service(message)),
    }
}
