use std::path::PathBuf;

use pdf::parser::table::{Table, TableSettings};
use serde::Serialize;

use crate::prelude::{println, *};

#[derive(Debug, clap::Args)]
#[command(about = "Dump page text, column regions and detected tables as JSON")]
pub struct App {
    /// Path to the PDF
    path: PathBuf,

    /// Only dump this page (1-based)
    #[arg(long, env = "COURSETAB_INSPECT_PAGE")]
    page: Option<u32>,

    /// Dump the left and right halves instead of the whole page text
    #[arg(long, env = "COURSETAB_INSPECT_COLUMNS")]
    columns: bool,
}

#[derive(Debug, Serialize)]
pub struct PageDump {
    pub page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<String>,
    pub tables: Vec<Table>,
}

pub fn run(app: App, _global: crate::Global) -> Result<()> {
    let document = pdf::Document::open(&app.path)
        .wrap_err_with(|| f!("Failed to open {}", app.path.display()))?;

    let pages = match app.page {
        Some(page) => {
            let count = document.page_count();
            if page == 0 || page as usize > count {
                return Err(Error::PageOutOfRange { page, count }.into());
            }
            vec![document.page(page)?]
        }
        None => crate::report::extract_pages(&document)?,
    };

    let settings = TableSettings::default();
    let dumps: Vec<PageDump> = pages
        .iter()
        .map(|page| dump_page(page, app.columns, &settings))
        .collect();

    println!("{}", serde_json::to_string_pretty(&dumps)?);
    Ok(())
}

fn dump_page(page: &pdf::Page, columns: bool, settings: &TableSettings) -> PageDump {
    let (text, left, right) = if columns {
        let (left, right) = page.halves();
        (None, Some(left.extract_text()), Some(right.extract_text()))
    } else {
        (Some(page.extract_text()), None, None)
    };

    PageDump {
        page: page.number,
        text,
        left,
        right,
        tables: page.extract_tables(settings),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdf::parser::layout::TextSpan;

    fn page() -> pdf::Page {
        let span = |x: f32, text: &str| TextSpan {
            text: text.to_string(),
            x,
            y: 40.0,
            width: 20.0,
            font_size: 8.0,
            font_name: "Helvetica".to_string(),
        };
        pdf::Page {
            number: 2,
            bbox: pdf::BBox::new(0.0, 0.0, 600.0, 800.0),
            spans: vec![span(20.0, "west"), span(400.0, "east")],
        }
    }

    #[test]
    fn test_whole_page_dump_has_text_only() {
        let dump = dump_page(&page(), false, &TableSettings::default());
        let json = serde_json::to_value(&dump).unwrap();

        assert_eq!(json["page"], 2);
        assert_eq!(json["text"], "west east");
        assert!(json.get("left").is_none());
        assert_eq!(json["tables"], serde_json::json!([]));
    }

    #[test]
    fn test_column_dump_splits_halves() {
        let dump = dump_page(&page(), true, &TableSettings::default());

        assert_eq!(dump.text, None);
        assert_eq!(dump.left.as_deref(), Some("west"));
        assert_eq!(dump.right.as_deref(), Some("east"));
    }
}
