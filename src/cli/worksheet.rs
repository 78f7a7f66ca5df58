use clap::Subcommand;
use sheetfeed::SpreadsheetClient;
use sheetfeed::config::Config;
use sheetfeed::error::{AppError, Result};
use sheetfeed::feeds::FeedClient;
use sheetfeed::format::{DelimitedFormatter, PIPE, TAB};
use sheetfeed::models::Row;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Subcommand, Debug)]
pub enum WorksheetAction {
    /// List worksheets with their row counts
    List,
    /// Print the rows of a worksheet
    Print {
        title: String,
        /// Write to this file instead of standard output
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Column separator: "tab", "pipe" or any literal string
        #[arg(short, long)]
        separator: Option<String>,
    },
    /// Write every worksheet to its own file in a directory
    Export { dir: PathBuf },
    /// Create a new worksheet
    Add {
        name: String,
        #[arg(long, default_value_t = 26)]
        cols: u32,
        #[arg(long, default_value_t = 1000)]
        rows: u32,
    },
    /// Delete a worksheet
    Delete { title: String },
    /// Append rows from a tab-separated file whose first line holds the column tags
    Write {
        title: String,
        #[arg(short, long)]
        input: PathBuf,
    },
}

impl WorksheetAction {
    pub async fn execute(&self) -> Result<()> {
        let mut client = connect()?;

        match self {
            WorksheetAction::List => {
                client.load_all_worksheets().await?;
                for title in client.get_loaded_worksheet_titles() {
                    let rows = client.get_entries(&title).map_or(0, |rows| rows.len());
                    println!("{}\t{}", title, rows);
                }
            }
            WorksheetAction::Print {
                title,
                output,
                separator,
            } => {
                client.load_worksheet(title).await?;
                print(&client, title, output.as_deref(), separator.as_deref())?;
            }
            WorksheetAction::Export { dir } => {
                client.load_all_worksheets().await?;
                let written = client.print_all_worksheets(dir)?;
                info!(files = written.len(), dir = ?dir, "Worksheets exported");
            }
            WorksheetAction::Add { name, cols, rows } => {
                client.add_worksheet(name, *cols, *rows).await?;
            }
            WorksheetAction::Delete { title } => {
                client.delete_worksheet(title).await?;
            }
            WorksheetAction::Write { title, input } => {
                let rows = read_rows(File::open(input)?)?;
                client.write_to_worksheet(title, &rows).await?;
            }
        }

        Ok(())
    }
}

fn connect() -> Result<SpreadsheetClient<FeedClient>> {
    let config = Config::load()?;
    let service = FeedClient::new()?;

    Ok(SpreadsheetClient::from_config(&config, service))
}

fn print(
    client: &SpreadsheetClient<FeedClient>,
    title: &str,
    output: Option<&Path>,
    separator: Option<&str>,
) -> Result<()> {
    let Some(separator) = separator else {
        return match output {
            Some(path) => client.print_worksheet_to_file(title, path),
            None => client.print_worksheet(title),
        };
    };

    let formatter = formatter_for(separator);
    match output {
        Some(path) => client.print_worksheet_to_file_with(title, path, &formatter),
        None => {
            let stdout = io::stdout();
            client.print_worksheet_with(title, &mut stdout.lock(), &formatter)
        }
    }
}

fn formatter_for(separator: &str) -> DelimitedFormatter {
    match separator {
        "tab" => DelimitedFormatter::new(TAB),
        "pipe" => DelimitedFormatter::new(PIPE),
        other => DelimitedFormatter::new(other),
    }
}

/// Parse tab-separated input; the header line supplies the tags.
fn read_rows<R: Read>(input: R) -> Result<Vec<Row>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::Csv(format!("Failed to read headers: {}", e)))?
        .clone();

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result
            .map_err(|e| AppError::Csv(format!("Failed to parse row {}: {}", idx + 2, e)))?;
        rows.push(headers.iter().zip(record.iter()).collect());
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetfeed::format::RowFormatter;

    #[test]
    fn test_read_rows() {
        let input = "name\tamt\nAnn\t10\nBob\t20\n";
        let rows = read_rows(input.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].tags().collect::<Vec<_>>(), vec!["name", "amt"]);
        assert_eq!(rows[1].get("name"), Some("Bob"));
        assert_eq!(rows[1].get("amt"), Some("20"));
    }

    #[test]
    fn test_read_rows_header_only() {
        let rows = read_rows("name\tamt\n".as_bytes()).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_read_rows_ragged_line() {
        let err = read_rows("name\tamt\nAnn\n".as_bytes()).unwrap_err();
        assert!(matches!(err, AppError::Csv(_)), "got {:?}", err);
    }

    #[test]
    fn test_formatter_for() {
        let row: Row = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(formatter_for("tab").format(&row, false), "1\t2");
        assert_eq!(formatter_for("pipe").format(&row, false), "1|2");
        assert_eq!(formatter_for(",").format(&row, true), "a,b");
    }
}
