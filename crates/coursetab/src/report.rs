use colored::Colorize;
use coursetab_core::diagnostics::Diagnostic;
use indicatif::{ProgressBar, ProgressStyle};

use crate::prelude::{println, *};

/// Log every diagnostic at its level, then the totals.
pub fn log_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        if diagnostic.is_warning() {
            log::warn!("{diagnostic}");
        } else {
            log::debug!("{diagnostic}");
        }
    }

    let warnings = diagnostics.iter().filter(|d| d.is_warning()).count();
    log::info!(
        "{} diagnostics ({warnings} warnings, {} skipped rows)",
        diagnostics.len(),
        diagnostics.len() - warnings
    );
}

/// Extract every page of `document` behind a progress bar on stderr.
pub fn extract_pages(document: &pdf::Document) -> Result<Vec<pdf::Page>> {
    let count = document.page_count();
    let bar = ProgressBar::new(count as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut pages = Vec::with_capacity(count);
    for number in 1..=count as u32 {
        bar.set_message(f!("page {number}"));
        pages.push(
            document
                .page(number)
                .wrap_err_with(|| f!("Failed to read page {number}"))?,
        );
        bar.inc(1);
    }
    bar.finish_and_clear();

    Ok(pages)
}

/// Print the files a command wrote. With `verbose`, also print a table of
/// counts per output.
pub fn print_summary(rows: &[(&str, usize, &std::path::Path)], verbose: bool) {
    if !verbose {
        for (_, _, path) in rows {
            println!("{} {}", "wrote".green(), path.display());
        }
        return;
    }

    let mut table = new_table();
    table.add_row(prettytable::row!["OUTPUT".bold(), "ROWS".bold(), "PATH".bold()]);
    for (label, count, path) in rows {
        table.add_row(prettytable::row![
            label.cyan(),
            count.to_string().green(),
            path.display()
        ]);
    }
    table.printstd();
}

/// Tally of diagnostics by kind, for the verbose summary.
pub fn print_diagnostic_counts(diagnostics: &[Diagnostic], verbose: bool) {
    if !verbose || diagnostics.is_empty() {
        return;
    }

    let mut counts: std::collections::BTreeMap<&str, usize> = Default::default();
    for diagnostic in diagnostics {
        *counts.entry(kind(diagnostic)).or_default() += 1;
    }

    let mut table = new_table();
    table.add_row(prettytable::row!["DIAGNOSTIC".bold(), "COUNT".bold()]);
    for (kind, count) in counts {
        table.add_row(prettytable::row![kind.yellow(), count]);
    }
    table.printstd();
}

fn kind(diagnostic: &Diagnostic) -> &'static str {
    match diagnostic {
        Diagnostic::UnknownBreadthRequirement { .. } => "unknown_breadth_requirement",
        Diagnostic::UnknownDeliveryMode { .. } => "unknown_delivery_mode",
        Diagnostic::InvalidField { .. } => "invalid_field",
        Diagnostic::MisalignedSection { .. } => "misaligned_section",
        Diagnostic::ShortRow { .. } => "short_row",
    }
}
