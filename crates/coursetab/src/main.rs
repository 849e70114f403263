use crate::prelude::*;
use clap::Parser;

mod catalog;
mod csv_io;
mod error;
mod inspect;
mod prelude;
mod report;
mod tables;
mod timetable;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Extract course catalog and timetable PDFs into CSV tables"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Whether to display additional information.
    #[clap(long, env = "COURSETAB_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Extract courses, prerequisites and corequisites from the catalog PDF
    Catalog(crate::catalog::App),

    /// Extract offerings from the timetable PDF
    Timetable(crate::timetable::App),

    /// Add a year_level column to a courses CSV
    YearLevel(crate::tables::YearLevelApp),

    /// Remove rows with a repeated key from a CSV
    Dedup(crate::tables::DedupApp),

    /// Dump what the PDF layer sees on each page
    Inspect(crate::inspect::App),
}

fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Catalog(sub_app) => crate::catalog::run(sub_app, app.global),
        SubCommands::Timetable(sub_app) => crate::timetable::run(sub_app, app.global),
        SubCommands::YearLevel(sub_app) => crate::tables::year_level(sub_app, app.global),
        SubCommands::Dedup(sub_app) => crate::tables::dedup(sub_app, app.global),
        SubCommands::Inspect(sub_app) => crate::inspect::run(sub_app, app.global),
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
