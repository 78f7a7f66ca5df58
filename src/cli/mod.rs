mod show;
mod worksheet;

use clap::{Parser, Subcommand};
use sheetfeed::error::Result;

pub use show::ShowResource;
pub use worksheet::WorksheetAction;

#[derive(Parser, Debug)]
#[command(name = "sheetfeed")]
#[command(about = "Read and write worksheets of a remote spreadsheet", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub async fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Show { resource } => resource.execute().await,
            Commands::Worksheet { action } => action.execute().await,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Show {
        #[command(subcommand)]
        resource: ShowResource,
    },
    Worksheet {
        #[command(subcommand)]
        action: WorksheetAction,
    },
}
