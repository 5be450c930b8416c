use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use tracing::info;

use crate::record::AssessmentRecord;

const COLUMNS: [&str; 6] = ["name", "url", "duration", "remote", "adaptive", "test_type"];

/// Write every record as one CSV row. The output file is replaced
/// wholesale on each run.
pub fn write_csv(records: &[AssessmentRecord], path: &Path) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(file);

    writeln!(out, "{}", COLUMNS.join(","))?;
    for record in records {
        let row = [
            escape(&record.name),
            escape(&record.url),
            escape(&record.duration),
            escape(&record.remote.to_string()),
            escape(&record.adaptive.to_string()),
            escape(&record.test_type),
        ];
        writeln!(out, "{}", row.join(","))?;
    }
    out.flush()
        .with_context(|| format!("writing {}", path.display()))?;

    info!("wrote {} rows to {}", records.len(), path.display());
    Ok(())
}

/// Quote a field when it holds a comma, quote, or line break. Embedded
/// quotes double up.
fn escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
