//! CSV export for stored daily records.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::record::DailyRecord;
use crate::sim::types::HOURS_PER_DAY;

/// Series name used for the whole-home row.
const TOTAL_SERIES: &str = "total";

/// Exports daily records to a CSV file at the given path.
///
/// Each record yields one row per appliance series followed by a `total`
/// row. Produces deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(records: &[DailyRecord], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(records, buf)
}

/// Writes daily records as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(records: &[DailyRecord], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    let mut header = vec![
        "home_id".to_string(),
        "date".to_string(),
        "series".to_string(),
        "total_g".to_string(),
    ];
    header.extend((0..HOURS_PER_DAY).map(|h| format!("h{h:02}")));
    wtr.write_record(&header)?;

    for r in records {
        let date = r.date.to_string();
        for (series, values) in &r.emissions {
            let total: f64 = values.iter().sum();
            wtr.write_record(row(&r.home_id, &date, series, total, values))?;
        }
        wtr.write_record(row(&r.home_id, &date, TOTAL_SERIES, r.total(), &r.total_hourly))?;
    }

    wtr.flush()?;
    Ok(())
}

fn row(home_id: &str, date: &str, series: &str, total: f64, values: &[f64]) -> Vec<String> {
    let mut fields = Vec::with_capacity(4 + values.len());
    fields.push(home_id.to_string());
    fields.push(date.to_string());
    fields.push(series.to_string());
    fields.push(format!("{total:.2}"));
    fields.extend(values.iter().map(|v| format!("{v:.2}")));
    fields
}
