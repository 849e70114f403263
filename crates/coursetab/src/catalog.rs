use std::path::{Path, PathBuf};

use coursetab_core::catalog::{
    extract_catalog, CatalogConfig, CatalogExtraction, Course, Requisite, DEFAULT_NAME_LINE_LIMIT,
    DEFAULT_TRAILER,
};
use coursetab_core::schema::{COREQUISITE_HEADERS, COURSE_HEADERS, PREREQUISITE_HEADERS};

use crate::csv_io::write_records;
use crate::prelude::*;

#[derive(Debug, clap::Args)]
#[command(about = "Extract courses and requisites from a two-column catalog PDF")]
pub struct App {
    /// Path to the course catalog PDF
    #[clap(env = "COURSETAB_CATALOG_PDF")]
    path: PathBuf,

    /// Courses output file
    #[arg(long, env = "COURSETAB_COURSES", default_value = "courses.csv")]
    courses: PathBuf,

    /// Prerequisite edges output file
    #[arg(long, env = "COURSETAB_PREREQUISITES", default_value = "prerequisites.csv")]
    prerequisites: PathBuf,

    /// Corequisite edges output file
    #[arg(long, env = "COURSETAB_COREQUISITES", default_value = "corequisites.csv")]
    corequisites: PathBuf,

    /// Text that ends every course section
    #[arg(long, env = "COURSETAB_TRAILER", default_value = DEFAULT_TRAILER)]
    trailer: String,

    /// Longest line (in characters) still read as part of a course name
    #[arg(long, env = "COURSETAB_NAME_LINE_LIMIT", default_value_t = DEFAULT_NAME_LINE_LIMIT)]
    name_line_limit: usize,

    /// Regex matching field labels, e.g. "(Prerequisite|Exclusion):"
    #[arg(long, env = "COURSETAB_FIELD_PATTERN")]
    field_pattern: Option<String>,
}

impl App {
    fn config(&self) -> Result<CatalogConfig> {
        let mut config = CatalogConfig {
            trailer: self.trailer.clone(),
            name_line_limit: self.name_line_limit,
            ..CatalogConfig::default()
        };

        if let Some(pattern) = &self.field_pattern {
            config = config
                .with_field_pattern(pattern)
                .map_err(Error::InvalidFieldPattern)?;
        }

        Ok(config)
    }
}

pub fn run(app: App, global: crate::Global) -> Result<()> {
    let config = app.config()?;

    let document = pdf::Document::open(&app.path)
        .wrap_err_with(|| f!("Failed to open {}", app.path.display()))?;
    let pages = crate::report::extract_pages(&document)?;

    let extraction = extract_catalog(column_regions(&pages), &config);
    log::info!(
        "Extracted {} courses, {} prerequisites and {} corequisites",
        extraction.courses.len(),
        extraction.prerequisites.len(),
        extraction.corequisites.len()
    );
    crate::report::log_diagnostics(&extraction.diagnostics);

    let counts = write_outputs(&app, &extraction)?;

    crate::report::print_summary(
        &[
            ("courses", counts[0], app.courses.as_path()),
            ("prerequisites", counts[1], app.prerequisites.as_path()),
            ("corequisites", counts[2], app.corequisites.as_path()),
        ],
        global.verbose,
    );
    crate::report::print_diagnostic_counts(&extraction.diagnostics, global.verbose);

    Ok(())
}

/// The text of every page's left column followed by its right column.
fn column_regions(pages: &[pdf::Page]) -> Vec<String> {
    pages
        .iter()
        .flat_map(|page| {
            let (left, right) = page.halves();
            [left.extract_text(), right.extract_text()]
        })
        .collect()
}

fn write_outputs(app: &App, extraction: &CatalogExtraction) -> Result<[usize; 3]> {
    Ok([
        write_records(
            &app.courses,
            &COURSE_HEADERS,
            extraction.courses.iter().map(Course::to_record),
        )?,
        write_requisites(&app.prerequisites, &PREREQUISITE_HEADERS, &extraction.prerequisites)?,
        write_requisites(&app.corequisites, &COREQUISITE_HEADERS, &extraction.corequisites)?,
    ])
}

fn write_requisites(path: &Path, headers: &[&str], edges: &[Requisite]) -> Result<usize> {
    write_records(path, headers, edges.iter().map(Requisite::to_record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pdf::parser::layout::TextSpan;

    #[derive(Debug, clap::Parser)]
    struct Cli {
        #[command(flatten)]
        app: App,
    }

    fn span(x: f32, y: f32, text: &str) -> TextSpan {
        TextSpan {
            text: text.to_string(),
            x,
            y,
            width: text.len() as f32 * 4.0,
            font_size: 8.0,
            font_name: "Helvetica".to_string(),
        }
    }

    #[test]
    fn test_regions_read_left_column_before_right() {
        let page = pdf::Page {
            number: 1,
            bbox: pdf::BBox::new(0.0, 0.0, 600.0, 800.0),
            spans: vec![
                span(320.0, 40.0, "right top"),
                span(20.0, 40.0, "left top"),
                span(20.0, 60.0, "left bottom"),
            ],
        };

        let regions = column_regions(&[page]);

        assert_eq!(regions, vec!["left top\nleft bottom", "right top"]);
    }

    #[test]
    fn test_defaults_match_catalog_layout() {
        let cli = Cli::parse_from(["coursetab", "catalog.pdf"]);

        assert_eq!(cli.app.courses, PathBuf::from("courses.csv"));
        assert_eq!(cli.app.trailer, DEFAULT_TRAILER);
        assert_eq!(cli.app.config().unwrap().name_line_limit, DEFAULT_NAME_LINE_LIMIT);
    }

    #[test]
    fn test_bad_field_pattern_is_rejected() {
        let cli = Cli::parse_from(["coursetab", "catalog.pdf", "--field-pattern", "(Note"]);

        assert!(cli.app.config().is_err());
    }

    #[test]
    fn test_writes_all_three_tables() {
        let dir = tempfile::tempdir().unwrap();
        let courses = dir.path().join("courses.csv");
        let prerequisites = dir.path().join("prerequisites.csv");
        let corequisites = dir.path().join("corequisites.csv");
        let cli = Cli::parse_from([
            "coursetab",
            "catalog.pdf",
            "--courses",
            courses.to_str().unwrap(),
            "--prerequisites",
            prerequisites.to_str().unwrap(),
            "--corequisites",
            corequisites.to_str().unwrap(),
        ]);
        let region = "ABCD01H3Y: Things\nAbout things.\n\
                      Prerequisite: ABCD02H3, ABCD03H3\n\
                      Link to UTSC Timetable\n";
        let extraction = extract_catalog([region], &cli.app.config().unwrap());

        let counts = write_outputs(&cli.app, &extraction).unwrap();

        assert_eq!(counts, [1, 2, 0]);
        let edges = std::fs::read_to_string(&prerequisites).unwrap();
        assert_eq!(
            edges,
            "prerequisite_code,course_code\nABCD02H3,ABCD01H3Y\nABCD03H3,ABCD01H3Y\n"
        );
        let header = std::fs::read_to_string(&courses).unwrap();
        assert!(header.starts_with("code,breadth_requirement,course_experience,"));
        assert_eq!(
            std::fs::read_to_string(&corequisites).unwrap(),
            "corequisite_code,course_code\n"
        );
    }
}
