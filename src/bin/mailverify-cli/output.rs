use anyhow::Result;
#[cfg(not(feature = "with-serde"))]
use anyhow::bail;
use mailverify_lib::VerificationResult;

use crate::args::Format;

pub fn write_reports(rows: &[VerificationResult], format: Format) -> Result<()> {
    match format {
        Format::Human => {
            for row in rows {
                println!("{}", render_human(row));
            }
            Ok(())
        }
        Format::Json => write_json(rows),
        Format::Ndjson => write_ndjson(rows),
    }
}

pub fn render_human(row: &VerificationResult) -> String {
    if row.verified {
        return format!("[VERIFIED]    {}", row.email);
    }
    let message = row.message.as_deref().unwrap_or_default().trim_end();
    match row.stage {
        Some(stage) => format!("[UNVERIFIED]  {} :: stage {stage}: {message}", row.email),
        None => format!("[UNVERIFIED]  {} :: {message}", row.email),
    }
}

pub fn any_unverified(rows: &[VerificationResult]) -> bool {
    rows.iter().any(|row| !row.verified)
}

#[cfg(feature = "with-serde")]
fn write_json(rows: &[VerificationResult]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(rows)?);
    Ok(())
}

#[cfg(feature = "with-serde")]
fn write_ndjson(rows: &[VerificationResult]) -> Result<()> {
    for row in rows {
        println!("{}", serde_json::to_string(row)?);
    }
    Ok(())
}

#[cfg(not(feature = "with-serde"))]
fn write_json(_rows: &[VerificationResult]) -> Result<()> {
    bail!("format=json requires the 'with-serde' feature")
}

#[cfg(not(feature = "with-serde"))]
fn write_ndjson(_rows: &[VerificationResult]) -> Result<()> {
    bail!("format=ndjson requires the 'with-serde' feature")
}
