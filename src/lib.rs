//! Client for spreadsheet feed APIs: list, load, add, delete and write
//! worksheets, and print their rows as delimited text.

pub mod cache;
pub mod config;
pub mod error;
pub mod feeds;
pub mod format;
pub mod models;
pub mod spreadsheet;

pub use spreadsheet::SpreadsheetClient;
