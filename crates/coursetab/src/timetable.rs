use std::path::PathBuf;

use coursetab_core::schema::OFFERING_HEADERS;
use coursetab_core::timetable::{Offering, TimetableConfig, TimetableExtractor, TimetablePage};
use pdf::parser::layout::TextLine;
use pdf::parser::table::TableSettings;

use crate::csv_io::write_records;
use crate::prelude::*;

#[derive(Debug, clap::Args)]
#[command(about = "Extract meeting sections from a timetable PDF")]
pub struct App {
    /// Path to the timetable PDF
    #[clap(env = "COURSETAB_TIMETABLE_PDF")]
    path: PathBuf,

    /// Session label written to every row, e.g. "Winter 2026"
    #[arg(long, env = "COURSETAB_SESSION")]
    session: String,

    /// Output file [default: offerings_<session>.csv]
    #[arg(long, env = "COURSETAB_OFFERINGS")]
    output: Option<PathBuf>,

    /// Cells a table row needs to be read as a meeting row
    #[arg(long, env = "COURSETAB_MIN_COLUMNS", default_value_t = 10)]
    min_columns: usize,
}

impl App {
    fn output(&self) -> Result<PathBuf> {
        match &self.output {
            Some(path) => Ok(path.clone()),
            None => Ok(PathBuf::from(f!("offerings_{}.csv", session_slug(&self.session)?))),
        }
    }
}

pub fn run(app: App, global: crate::Global) -> Result<()> {
    let output = app.output()?;
    let config = TimetableConfig {
        min_table_columns: app.min_columns,
        ..TimetableConfig::default()
    };

    let document = pdf::Document::open(&app.path)
        .wrap_err_with(|| f!("Failed to open {}", app.path.display()))?;
    let pages = crate::report::extract_pages(&document)?;

    let settings = TableSettings::default();
    let mut extractor = TimetableExtractor::new(app.session.as_str(), config);
    for page in &pages {
        let page = timetable_page(page, &settings);
        log::debug!("{} lines, {} tables", page.lines.len(), page.tables.len());
        extractor.push_page(&page);
    }
    let extraction = extractor.finish();

    log::info!("Extracted {} offerings", extraction.offerings.len());
    crate::report::log_diagnostics(&extraction.diagnostics);

    let count = write_records(
        &output,
        &OFFERING_HEADERS,
        extraction.offerings.iter().map(Offering::to_record),
    )?;

    crate::report::print_summary(&[("offerings", count, output.as_path())], global.verbose);
    crate::report::print_diagnostic_counts(&extraction.diagnostics, global.verbose);

    Ok(())
}

/// Lower-case words of the session label joined by `_`.
fn session_slug(session: &str) -> Result<String> {
    let slug = session
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_");

    if slug.is_empty() {
        return Err(Error::InvalidSession(session.to_string()).into());
    }

    Ok(slug)
}

/// Page text lines and detected table grids in the shape the extractor
/// reads.
fn timetable_page(page: &pdf::Page, settings: &TableSettings) -> TimetablePage {
    TimetablePage {
        lines: page.lines().iter().map(TextLine::text).collect(),
        tables: page
            .extract_tables(settings)
            .into_iter()
            .map(|table| table.rows)
            .collect(),
    }
}
