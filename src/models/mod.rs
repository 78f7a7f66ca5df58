pub mod entry;
pub mod spreadsheet;

pub use entry::{NewWorksheet, Row, SpreadsheetEntry, WorksheetEntry};
pub use spreadsheet::{Credentials, Projection, SpreadsheetRef, Visibility};
