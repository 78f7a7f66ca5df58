use crate::error::{AppError, Result};
use crate::feeds::types::{
    EDIT_REL, LIST_FEED_REL, Link, ListEntryJson, SpreadsheetEntryJson, WORKSHEETS_FEED_REL,
    WorksheetEntryJson,
};
use url::Url;

/// One record of a worksheet: tag/value pairs in column order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row {
    cells: Vec<(String, String)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `tag` to `value`, keeping the tag's position if it already exists.
    pub fn insert(&mut self, tag: impl Into<String>, value: impl Into<String>) {
        let tag = tag.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(t, _)| *t == tag) {
            Some(cell) => cell.1 = value,
            None => self.cells.push((tag, value)),
        }
    }

    pub fn with(mut self, tag: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(tag, value);
        self
    }

    pub fn get(&self, tag: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(t, _)| t == tag)
            .map(|(_, v)| v.as_str())
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(t, _)| t.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(_, v)| v.as_str())
    }

    pub fn cells(&self) -> &[(String, String)] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<T, V> FromIterator<(T, V)> for Row
where
    T: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (T, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (tag, value) in iter {
            row.insert(tag, value);
        }
        row
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreadsheetEntry {
    pub title: String,
    pub worksheet_feed_url: Url,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorksheetEntry {
    pub title: String,
    pub list_feed_url: Url,
    pub edit_url: Option<Url>,
    pub col_count: u32,
    pub row_count: u32,
}

/// Local representation of a worksheet that is about to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWorksheet {
    pub title: String,
    pub col_count: u32,
    pub row_count: u32,
}

fn find_link(links: &[Link], rel: &str) -> Option<Result<Url>> {
    links.iter().find(|link| link.rel == rel).map(|link| {
        Url::parse(&link.href).map_err(|source| AppError::InvalidUrl {
            url: link.href.clone(),
            source,
        })
    })
}

fn parse_count(field: &str, value: Option<&str>) -> Result<u32> {
    match value {
        None => Ok(0),
        Some(v) => v
            .parse()
            .map_err(|e| AppError::Service(format!("Invalid {} '{}': {}", field, v, e))),
    }
}

impl TryFrom<SpreadsheetEntryJson> for SpreadsheetEntry {
    type Error = AppError;

    fn try_from(json: SpreadsheetEntryJson) -> Result<Self> {
        let worksheet_feed_url = find_link(&json.link, WORKSHEETS_FEED_REL).ok_or_else(|| {
            AppError::Service(format!(
                "Spreadsheet '{}' has no worksheets feed link",
                json.title.text
            ))
        })??;

        Ok(SpreadsheetEntry {
            title: json.title.text,
            worksheet_feed_url,
        })
    }
}

impl TryFrom<WorksheetEntryJson> for WorksheetEntry {
    type Error = AppError;

    fn try_from(json: WorksheetEntryJson) -> Result<Self> {
        let list_feed_url = find_link(&json.link, LIST_FEED_REL).ok_or_else(|| {
            AppError::Service(format!(
                "Worksheet '{}' has no list feed link",
                json.title.text
            ))
        })??;
        let edit_url = find_link(&json.link, EDIT_REL).transpose()?;
        let col_count = parse_count(
            "column count",
            json.col_count.as_ref().map(|c| c.text.as_str()),
        )?;
        let row_count = parse_count("row count", json.row_count.as_ref().map(|c| c.text.as_str()))?;

        Ok(WorksheetEntry {
            title: json.title.text,
            list_feed_url,
            edit_url,
            col_count,
            row_count,
        })
    }
}

impl From<ListEntryJson> for Row {
    fn from(json: ListEntryJson) -> Self {
        json.into_cells().collect()
    }
}
