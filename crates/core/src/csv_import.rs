//! Bulk testimonial upload from a CSV file with a header row.
//!
//! Invalid rows are skipped and reported; they never abort the batch.

use std::collections::HashMap;

use crate::error::CoreError;
use crate::testimonial::{
    validate_new_testimonial, Source, TestimonialInput, ValidTestimonial, MAX_TEXT_LEN,
};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Columns read from the upload. Anything else is ignored.
pub const CSV_COLUMNS: &[&str] = &["name", "text", "role", "company", "avatar_url", "source"];

/// Parsed upload: rows ready to insert plus per-row skip reasons.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvImportOutcome {
    pub rows: Vec<ValidTestimonial>,
    pub skipped: usize,
    pub errors: Vec<String>,
}

impl CsvImportOutcome {
    fn skip(&mut self, row: usize, reason: impl std::fmt::Display) {
        self.skipped += 1;
        self.errors.push(format!("Row {row}: {reason}"));
    }
}

/// Parse `bytes` as CSV. Header names match case-insensitively; data rows
/// are numbered from 1.
pub fn parse_csv(bytes: &[u8]) -> CsvImportOutcome {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let mut outcome = CsvImportOutcome::default();

    let columns: HashMap<String, usize> = match reader.headers() {
        Ok(headers) => headers
            .iter()
            .enumerate()
            .map(|(idx, h)| (h.trim().to_ascii_lowercase(), idx))
            .collect(),
        Err(e) => {
            outcome.errors.push(format!("Header: {e}"));
            return outcome;
        }
    };

    for (idx, record) in reader.records().enumerate() {
        let row = idx + 1;
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                outcome.skip(row, e);
                continue;
            }
        };

        let field = |name: &str| -> Option<String> {
            columns
                .get(name)
                .and_then(|&i| record.get(i))
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let (Some(name), Some(text)) = (field("name"), field("text")) else {
            outcome.skip(row, "missing name or text");
            continue;
        };
        if text.chars().count() > MAX_TEXT_LEN {
            outcome.skip(row, format!("text exceeds {MAX_TEXT_LEN} characters"));
            continue;
        }

        let source = field("source")
            .map(|s| Source::parse_or_manual(&s))
            .unwrap_or(Source::Manual);
        let input = TestimonialInput {
            name,
            role: field("role"),
            company: field("company"),
            avatar_url: field("avatar_url"),
            text,
            source: Some(source.as_str().to_string()),
            source_url: None,
        };

        match validate_new_testimonial(&input, Source::Manual) {
            Ok(valid) => outcome.rows.push(valid),
            Err(CoreError::Validation(msg)) => outcome.skip(row, msg),
            Err(e) => outcome.skip(row, e),
        }
    }

    outcome
}
