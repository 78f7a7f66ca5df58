mod client;
pub mod endpoint;
pub mod types;

pub use client::FeedClient;
pub use endpoint::build_feed_url;

use crate::error::Result;
use crate::models::{Credentials, NewWorksheet, Row, SpreadsheetEntry, WorksheetEntry};
use async_trait::async_trait;
use url::Url;

/// Remote feed service: fetches feeds, inserts entries, deletes worksheets.
#[async_trait]
pub trait FeedOperations {
    /// Credentials used for every subsequent request.
    fn set_credentials(&mut self, credentials: Credentials);

    async fn spreadsheets(&self, url: &Url) -> Result<Vec<SpreadsheetEntry>>;

    async fn worksheets(&self, url: &Url) -> Result<Vec<WorksheetEntry>>;

    /// `None` when the service returned no feed at all.
    async fn rows(&self, url: &Url) -> Result<Option<Vec<Row>>>;

    async fn insert_worksheet(&self, url: &Url, worksheet: &NewWorksheet) -> Result<()>;

    async fn insert_row(&self, url: &Url, row: &Row) -> Result<()>;

    async fn delete_worksheet(&self, worksheet: &WorksheetEntry) -> Result<()>;
}
