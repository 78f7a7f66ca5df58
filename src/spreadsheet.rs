use crate::cache::WorksheetCache;
use crate::config::{Config, Endpoints, MIN_ROW_DELAY};
use crate::error::{AppError, Result};
use crate::feeds::{FeedOperations, build_feed_url};
use crate::format::{DelimitedFormatter, RowFormatter};
use crate::models::{Credentials, NewWorksheet, Row, SpreadsheetRef, WorksheetEntry};
use indicatif::ProgressStyle;
use std::collections::{BTreeSet, HashSet};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{Span, debug, info, instrument};
use tracing_indicatif::span_ext::IndicatifSpanExt;
use url::Url;

/// Client for one remote spreadsheet, holding the rows of every worksheet it
/// has loaded.
///
/// Requests are issued one at a time. Operations that touch the worksheet
/// cache take `&mut self`; share a client across tasks only behind a lock.
pub struct SpreadsheetClient<F> {
    spreadsheet: SpreadsheetRef,
    credentials: Credentials,
    endpoints: Endpoints,
    row_delay: Duration,
    service: F,
    cache: WorksheetCache,
}

impl<F> SpreadsheetClient<F>
where
    F: FeedOperations + Sync,
{
    pub fn new(
        spreadsheet: SpreadsheetRef,
        credentials: Credentials,
        endpoints: Endpoints,
        mut service: F,
    ) -> Self {
        service.set_credentials(credentials.clone());

        Self {
            spreadsheet,
            credentials,
            endpoints,
            row_delay: MIN_ROW_DELAY,
            service,
            cache: WorksheetCache::new(),
        }
    }

    pub fn from_config(config: &Config, service: F) -> Self {
        Self::new(
            config.spreadsheet.spreadsheet_ref(),
            config.credentials.credentials(),
            config.endpoints.clone(),
            service,
        )
        .with_row_delay(config.write.row_delay())
    }

    /// Pause between consecutive row inserts, clamped to at least 1ms.
    pub fn with_row_delay(mut self, delay: Duration) -> Self {
        self.row_delay = delay.max(MIN_ROW_DELAY);
        self
    }

    pub fn spreadsheet(&self) -> &SpreadsheetRef {
        &self.spreadsheet
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    fn spreadsheets_feed_url(&self) -> Result<Url> {
        build_feed_url(
            &self.endpoints.spreadsheets,
            None,
            self.spreadsheet.visibility(),
            self.spreadsheet.projection(),
        )
    }

    fn worksheets_feed_url(&self) -> Result<Url> {
        build_feed_url(
            &self.endpoints.worksheets,
            Some(self.spreadsheet.key()),
            self.spreadsheet.visibility(),
            self.spreadsheet.projection(),
        )
    }

    async fn find_worksheet(&self, title: &str) -> Result<Option<WorksheetEntry>> {
        let url = self.worksheets_feed_url()?;
        let worksheet = self
            .service
            .worksheets(&url)
            .await?
            .into_iter()
            .find(|worksheet| worksheet.title == title);

        if worksheet.is_none() {
            debug!(title, "No worksheet with matching title");
        }

        Ok(worksheet)
    }

    /// Create a worksheet in every spreadsheet whose title equals this
    /// client's spreadsheet title. The new worksheet is not loaded.
    #[instrument(name = "Adding worksheet", skip(self))]
    pub async fn add_worksheet(&self, name: &str, col_count: u32, row_count: u32) -> Result<()> {
        let url = self.spreadsheets_feed_url()?;
        let spreadsheets = self.service.spreadsheets(&url).await?;

        let worksheet = NewWorksheet {
            title: name.to_string(),
            col_count,
            row_count,
        };

        let mut inserted = 0;
        for spreadsheet in spreadsheets
            .iter()
            .filter(|spreadsheet| spreadsheet.title == self.spreadsheet.title())
        {
            self.service
                .insert_worksheet(&spreadsheet.worksheet_feed_url, &worksheet)
                .await?;
            inserted += 1;
        }

        match inserted {
            0 => debug!(spreadsheet = self.spreadsheet.title(), "No spreadsheet with matching title"),
            _ => info!(inserted, "Worksheet added"),
        }

        Ok(())
    }

    /// Load the rows of `title` unless they are already cached.
    #[instrument(name = "Loading worksheet", skip(self))]
    pub async fn load_worksheet(&mut self, title: &str) -> Result<()> {
        if self.cache.is_loaded(title) {
            debug!("Worksheet already loaded");
            return Ok(());
        }

        let Some(worksheet) = self.find_worksheet(title).await? else {
            return Ok(());
        };

        match self.service.rows(&worksheet.list_feed_url).await? {
            Some(rows) => {
                debug!(rows = rows.len(), "Worksheet loaded");
                self.cache.put(title, rows);
            }
            None => debug!("Worksheet has no list feed"),
        }

        Ok(())
    }

    /// Fetch every worksheet again, replacing whatever is cached.
    ///
    /// Loaded worksheets missing from the remote list are dropped.
    #[instrument(name = "Loading all worksheets", skip(self))]
    pub async fn load_all_worksheets(&mut self) -> Result<()> {
        let url = self.worksheets_feed_url()?;
        let worksheets = self.service.worksheets(&url).await?;

        let remote: HashSet<&str> = worksheets.iter().map(|ws| ws.title.as_str()).collect();
        self.cache.retain_loaded(|title| remote.contains(title));

        for worksheet in &worksheets {
            if let Some(rows) = self.service.rows(&worksheet.list_feed_url).await? {
                debug!(title = %worksheet.title, rows = rows.len(), "Worksheet loaded");
                self.cache.put(worksheet.title.clone(), rows);
            }
        }

        Ok(())
    }

    /// Delete every worksheet titled `title`.
    ///
    /// The cached rows are dropped before the remote call and stay dropped
    /// even if the call fails.
    #[instrument(name = "Deleting worksheet", skip(self))]
    pub async fn delete_worksheet(&mut self, title: &str) -> Result<()> {
        if title.is_empty() {
            return Ok(());
        }

        self.cache.tombstone(title);

        let url = self.worksheets_feed_url()?;
        let worksheets = self.service.worksheets(&url).await?;

        for worksheet in worksheets.iter().filter(|worksheet| worksheet.title == title) {
            self.service.delete_worksheet(worksheet).await?;
            info!("Worksheet deleted");
        }

        Ok(())
    }

    /// Append `rows` to the worksheet titled `title`, one request per row.
    ///
    /// Rows inserted before a failure stay inserted. The cache is not
    /// touched; reload the worksheet to see the new rows.
    #[instrument(name = "Writing worksheet", skip(self, rows), fields(rows = rows.len()))]
    pub async fn write_to_worksheet(&self, title: &str, rows: &[Row]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }

        let Some(worksheet) = self.find_worksheet(title).await? else {
            return Ok(());
        };

        let span = Span::current();
        span.pb_set_style(
            &ProgressStyle::with_template(
                "[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}",
            )
            .map_err(|e| AppError::Other(e.into()))?,
        );
        span.pb_set_message("Inserting rows");
        span.pb_set_length(rows.len() as u64);

        for (idx, row) in rows.iter().enumerate() {
            if idx > 0 {
                tokio::time::sleep(self.row_delay).await;
            }
            self.service
                .insert_row(&worksheet.list_feed_url, row)
                .await?;
            span.pb_inc(1);
        }

        info!("Rows written");

        Ok(())
    }

    pub fn get_entries(&self, title: &str) -> Option<&[Row]> {
        self.cache.get(title)
    }

    pub fn get_loaded_worksheet_titles(&self) -> BTreeSet<String> {
        self.cache.titles()
    }

    /// Print a loaded worksheet to standard output, tab separated.
    pub fn print_worksheet(&self, title: &str) -> Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.print_worksheet_with(title, &mut out, &DelimitedFormatter::tab())
    }

    /// Print a loaded worksheet to `path`, tab separated. The file is truncated.
    pub fn print_worksheet_to_file(&self, title: &str, path: &Path) -> Result<()> {
        self.print_worksheet_to_file_with(title, path, &DelimitedFormatter::tab())
    }

    /// The file is only created once `title` is known to be loaded.
    pub fn print_worksheet_to_file_with(
        &self,
        title: &str,
        path: &Path,
        formatter: &dyn RowFormatter,
    ) -> Result<()> {
        let rows = self
            .get_entries(title)
            .ok_or_else(|| AppError::NotLoaded(title.to_string()))?;

        let mut out = BufWriter::new(File::create(path)?);
        write_rows(rows, &mut out, formatter)?;
        out.flush()?;
        Ok(())
    }

    /// Print a header line built from the first row's tags, then one line per row.
    pub fn print_worksheet_with(
        &self,
        title: &str,
        out: &mut dyn Write,
        formatter: &dyn RowFormatter,
    ) -> Result<()> {
        let rows = self
            .get_entries(title)
            .ok_or_else(|| AppError::NotLoaded(title.to_string()))?;
        write_rows(rows, out, formatter)
    }

    /// Write each loaded worksheet to `dir/<spreadsheet title>.<worksheet title>`.
    #[instrument(name = "Printing all worksheets", skip(self))]
    pub fn print_all_worksheets(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let formatter = DelimitedFormatter::tab();
        let mut written = Vec::new();

        for (title, rows) in self.cache.loaded() {
            let name = format!("{}.{}", self.spreadsheet.title(), title);
            let path = dir.join(file_name_for(&name));
            let mut out = BufWriter::new(File::create(&path)?);
            write_rows(rows, &mut out, &formatter)?;
            out.flush()?;
            debug!(path = ?path, "Worksheet written");
            written.push(path);
        }

        written.sort();
        Ok(written)
    }
}

// Titles come from the server; keep them to a single path component.
fn file_name_for(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect()
}

fn write_rows(rows: &[Row], out: &mut dyn Write, formatter: &dyn RowFormatter) -> Result<()> {
    let Some(first) = rows.first() else {
        return Ok(());
    };

    writeln!(out, "{}", formatter.format(first, true))?;
    for row in rows {
        writeln!(out, "{}", formatter.format(row, false))?;
    }

    Ok(())
}

#[cfg(test)]
pub(crate) mod mocks {
    use super::*;
    use crate::models::SpreadsheetEntry;
    use crate::models::entry::test_helpers::{mock_spreadsheet, mock_worksheet};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use std::time::Instant;

    pub(crate) const TEST_KEY: &str = "K1";
    pub(crate) const TEST_TITLE: &str = "Budget";

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum Call {
        Spreadsheets(String),
        Worksheets(String),
        Rows(String),
        InsertWorksheet(String, NewWorksheet),
        InsertRow(String, Row),
        DeleteWorksheet(String),
    }

    #[derive(Clone, Default)]
    pub(crate) struct MockFeedService {
        pub spreadsheets: Vec<SpreadsheetEntry>,
        pub worksheets: Arc<Mutex<Vec<(WorksheetEntry, Option<Vec<Row>>)>>>,
        pub fail_deletes: bool,
        pub fail_row_insert_at: Option<usize>,
        pub credentials: Arc<Mutex<Option<Credentials>>>,
        pub calls: Arc<Mutex<Vec<Call>>>,
        pub insert_times: Arc<Mutex<Vec<Instant>>>,
    }

    impl MockFeedService {
        pub(crate) fn with_worksheets(worksheets: &[(&str, Option<Vec<Row>>)]) -> Self {
            Self {
                spreadsheets: vec![mock_spreadsheet(TEST_TITLE, TEST_KEY)],
                worksheets: Arc::new(Mutex::new(
                    worksheets
                        .iter()
                        .map(|(title, rows)| (mock_worksheet(title), rows.clone()))
                        .collect(),
                )),
                ..Default::default()
            }
        }

        pub(crate) fn remove_worksheet(&self, title: &str) {
            self.worksheets
                .lock()
                .unwrap()
                .retain(|(ws, _)| ws.title != title);
        }

        pub(crate) fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        pub(crate) fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
            self.calls().iter().filter(|call| pred(call)).count()
        }

        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl FeedOperations for MockFeedService {
        fn set_credentials(&mut self, credentials: Credentials) {
            *self.credentials.lock().unwrap() = Some(credentials);
        }

        async fn spreadsheets(&self, url: &Url) -> Result<Vec<SpreadsheetEntry>> {
            self.record(Call::Spreadsheets(url.to_string()));
            Ok(self.spreadsheets.clone())
        }

        async fn worksheets(&self, url: &Url) -> Result<Vec<WorksheetEntry>> {
            self.record(Call::Worksheets(url.to_string()));
            let worksheets = self.worksheets.lock().unwrap();
            Ok(worksheets.iter().map(|(ws, _)| ws.clone()).collect())
        }

        async fn rows(&self, url: &Url) -> Result<Option<Vec<Row>>> {
            self.record(Call::Rows(url.to_string()));
            let rows = self
                .worksheets
                .lock()
                .unwrap()
                .iter()
                .find(|(ws, _)| &ws.list_feed_url == url)
                .and_then(|(_, rows)| rows.clone());
            Ok(rows)
        }

        async fn insert_worksheet(&self, url: &Url, worksheet: &NewWorksheet) -> Result<()> {
            self.record(Call::InsertWorksheet(url.to_string(), worksheet.clone()));
            Ok(())
        }

        async fn insert_row(&self, url: &Url, row: &Row) -> Result<()> {
            let mut times = self.insert_times.lock().unwrap();
            if self.fail_row_insert_at == Some(times.len()) {
                return Err(AppError::Service("insert rejected".to_string()));
            }
            times.push(Instant::now());
            self.record(Call::InsertRow(url.to_string(), row.clone()));
            Ok(())
        }

        async fn delete_worksheet(&self, worksheet: &WorksheetEntry) -> Result<()> {
            self.record(Call::DeleteWorksheet(worksheet.title.clone()));
            match self.fail_deletes {
                true => Err(AppError::Service("delete rejected".to_string())),
                false => Ok(()),
            }
        }
    }

    pub(crate) fn client_against(service: MockFeedService) -> SpreadsheetClient<MockFeedService> {
        SpreadsheetClient::new(
            SpreadsheetRef::new(TEST_KEY, TEST_TITLE),
            Credentials::Password {
                username: "me@example.com".to_string(),
                password: "secret".to_string(),
            },
            Endpoints {
                spreadsheets: "https://feeds.test/spreadsheets".to_string(),
                worksheets: "https://feeds.test/worksheets".to_string(),
            },
            service,
        )
    }
}
