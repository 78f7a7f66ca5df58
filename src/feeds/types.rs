use crate::models::{NewWorksheet, Row};
use serde::Deserialize;
use serde_json::{Map, Value, json};

pub(crate) const WORKSHEETS_FEED_REL: &str =
    "http://schemas.google.com/spreadsheets/2006#worksheetsfeed";
pub(crate) const LIST_FEED_REL: &str = "http://schemas.google.com/spreadsheets/2006#listfeed";
pub(crate) const EDIT_REL: &str = "edit";

// Column values of a list entry live under "gsx$<tag>".
const CUSTOM_ELEMENT_PREFIX: &str = "gsx$";

#[derive(Debug, Deserialize)]
pub(super) struct FeedResponse<E> {
    pub(super) feed: Option<Feed<E>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Feed<E> {
    #[serde(default = "Vec::new")]
    pub(super) entry: Vec<E>,
}

// Text constructs are wrapped as {"$t": "..."}.
#[derive(Debug, Deserialize)]
pub struct TextConstruct {
    #[serde(rename = "$t", default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
}

#[derive(Debug, Deserialize)]
pub struct SpreadsheetEntryJson {
    pub title: TextConstruct,
    #[serde(default)]
    pub link: Vec<Link>,
}

#[derive(Debug, Deserialize)]
pub struct WorksheetEntryJson {
    pub title: TextConstruct,
    #[serde(default)]
    pub link: Vec<Link>,
    #[serde(rename = "gs$colCount")]
    pub col_count: Option<TextConstruct>,
    #[serde(rename = "gs$rowCount")]
    pub row_count: Option<TextConstruct>,
}

/// A raw list entry. Field order is kept as sent by the server.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct ListEntryJson(pub Map<String, Value>);

impl ListEntryJson {
    pub fn into_cells(self) -> impl Iterator<Item = (String, String)> {
        self.0.into_iter().filter_map(|(key, value)| {
            let tag = key.strip_prefix(CUSTOM_ELEMENT_PREFIX)?.to_string();
            let text = match value.get("$t") {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => String::new(),
            };
            Some((tag, text))
        })
    }
}

pub(super) fn worksheet_insert_body(worksheet: &NewWorksheet) -> Value {
    json!({
        "entry": {
            "title": { "$t": worksheet.title },
            "gs$colCount": { "$t": worksheet.col_count.to_string() },
            "gs$rowCount": { "$t": worksheet.row_count.to_string() },
        }
    })
}

pub(super) fn row_insert_body(row: &Row) -> Value {
    let mut entry = Map::new();
    for (tag, value) in row.cells() {
        entry.insert(
            format!("{}{}", CUSTOM_ELEMENT_PREFIX, tag),
            json!({ "$t": value }),
        );
    }
    json!({ "entry": entry })
}
