use std::path::PathBuf;

use coursetab_core::postprocess::{add_year_level, dedup_by_key};

use crate::csv_io::{read_table, write_table};
use crate::prelude::*;

#[derive(Debug, clap::Args)]
#[command(about = "Append a year_level column derived from the course code")]
pub struct YearLevelApp {
    /// Input CSV
    #[clap(env = "COURSETAB_YEAR_LEVEL_INPUT", default_value = "./tables/courses.csv")]
    input: PathBuf,

    /// Output CSV
    #[clap(
        env = "COURSETAB_YEAR_LEVEL_OUTPUT",
        default_value = "./tables/courses_with_year.csv"
    )]
    output: PathBuf,

    /// Column holding the course code
    #[arg(long, env = "COURSETAB_CODE_COLUMN", default_value = "code")]
    column: String,
}

#[derive(Debug, clap::Args)]
#[command(about = "Keep the first row for every distinct key")]
pub struct DedupApp {
    /// Input CSV
    #[clap(env = "COURSETAB_DEDUP_INPUT", default_value = "courses.csv")]
    input: PathBuf,

    /// Output CSV [default: overwrite the input]
    #[arg(long, env = "COURSETAB_DEDUP_OUTPUT")]
    output: Option<PathBuf>,

    /// Key column
    #[arg(long, env = "COURSETAB_DEDUP_KEY", default_value = "code")]
    key: String,
}

pub fn year_level(app: YearLevelApp, global: crate::Global) -> Result<()> {
    let table = read_table(&app.input)?;
    let table = add_year_level(&table, &app.column)
        .wrap_err_with(|| f!("Failed to process {}", app.input.display()))?;

    let count = write_table(&app.output, &table)?;
    log::info!("Added year levels to {count} rows");

    crate::report::print_summary(&[("year_level", count, app.output.as_path())], global.verbose);
    Ok(())
}

pub fn dedup(app: DedupApp, global: crate::Global) -> Result<()> {
    let output = app.output.unwrap_or_else(|| app.input.clone());

    let table = read_table(&app.input)?;
    let before = table.rows.len();
    let table = dedup_by_key(&table, &app.key)
        .wrap_err_with(|| f!("Failed to process {}", app.input.display()))?;

    let count = write_table(&output, &table)?;
    log::info!("Removed {} duplicate rows", before - count);

    crate::report::print_summary(&[("dedup", count, output.as_path())], global.verbose);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn global() -> crate::Global {
        crate::Global { verbose: false }
    }

    #[test]
    fn test_year_level_appends_column() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("courses.csv");
        let output = dir.path().join("out").join("courses_with_year.csv");
        std::fs::write(&input, "code,name\nABCA01H3,Intro\nABCD01H3,Capstone\nXY,Odd\n").unwrap();

        year_level(
            YearLevelApp {
                input,
                output: output.clone(),
                column: "code".to_string(),
            },
            global(),
        )
        .unwrap();

        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "code,name,year_level\nABCA01H3,Intro,1st year\nABCD01H3,Capstone,4th year\nXY,Odd,\n"
        );
    }

    #[test]
    fn test_year_level_without_code_column_fails() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("courses.csv");
        let output = dir.path().join("out.csv");
        std::fs::write(&input, "name\nIntro\n").unwrap();

        let result = year_level(
            YearLevelApp {
                input,
                output: output.clone(),
                column: "code".to_string(),
            },
            global(),
        );

        assert!(result.is_err());
        assert!(!output.exists());
    }

    #[test]
    fn test_dedup_rewrites_input_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("courses.csv");
        std::fs::write(&input, "code,name\nA,first\nB,other\nA,second\n").unwrap();

        dedup(
            DedupApp {
                input: input.clone(),
                output: None,
                key: "code".to_string(),
            },
            global(),
        )
        .unwrap();

        assert_eq!(
            std::fs::read_to_string(&input).unwrap(),
            "code,name\nA,first\nB,other\n"
        );
    }

    #[test]
    fn test_dedup_with_unknown_key_fails() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("courses.csv");
        std::fs::write(&input, "code\nA\n").unwrap();

        let result = dedup(
            DedupApp {
                input,
                output: None,
                key: "id".to_string(),
            },
            global(),
        );

        assert!(result.is_err());
    }
}
