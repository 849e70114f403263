use std::path::Path;

use coursetab_core::postprocess::CsvTable;

use crate::prelude::*;

/// Read a whole CSV file, header row included.
pub fn read_table(path: &Path) -> Result<CsvTable> {
    let mut reader = csv::Reader::from_path(path)
        .wrap_err_with(|| f!("Failed to open {}", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .wrap_err_with(|| f!("Failed to read the header row of {}", path.display()))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(CsvTable::new(headers, rows))
}

pub fn write_table(path: &Path, table: &CsvTable) -> Result<usize> {
    write_records(path, &table.headers, table.rows.iter())
}

/// Write `headers` and then every record to `path`, creating its parent
/// directory. Returns the number of records written.
pub fn write_records<H, R, I>(path: &Path, headers: &[H], records: I) -> Result<usize>
where
    H: AsRef<[u8]>,
    R: IntoIterator,
    R::Item: AsRef<[u8]>,
    I: IntoIterator<Item = R>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .wrap_err_with(|| f!("Failed to create {}", parent.display()))?;
    }

    let mut writer = csv::Writer::from_path(path)
        .wrap_err_with(|| f!("Failed to create {}", path.display()))?;

    writer.write_record(headers)?;

    let mut count = 0;
    for record in records {
        writer.write_record(record)?;
        count += 1;
    }
    writer.flush()?;

    log::debug!("Wrote {count} records to {}", path.display());
    Ok(count)
}
