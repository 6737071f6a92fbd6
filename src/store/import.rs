//! CSV bulk import pipeline
//!
//! Rows are validated locally, then submitted through the cache one at a
//! time so every record gets its own accounting slot: validation rejects
//! are skipped with a message, backend duplicate rejections count
//! separately, and any other submission error lands in the failure list
//! without aborting the batch.

use std::collections::BTreeMap;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use url::Url;

use crate::core::{Result, StoreError};
use crate::entities::{Company, Contact, EntityKind};
use crate::gateway::wire;
use crate::store::{decode_records, CancelFlag, CrmStore};

/// One row of a company import file, already split out of the CSV.
/// Both header conventions feed the same fields.
#[derive(Debug, Clone, Default)]
pub struct ImportRow {
    pub name: Option<String>,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub sector: Option<String>,
    pub place_of_office: Option<String>,
    pub head_office: Option<String>,
}

impl ImportRow {
    /// Build a row from a header-keyed record, accepting both the
    /// human-readable titles ("Company Name") and snake_case keys.
    pub fn from_record(record: &BTreeMap<String, String>) -> Self {
        let field = |title: &str, key: &str| row_field(record, title, key);
        Self {
            name: field("Company Name", "company_name").or_else(|| field("Name", "name")),
            industry: field("Industry", "industry"),
            website: field("Website", "website"),
            phone: field("Phone", "phone"),
            email: field("Email", "email"),
            sector: field("Sector", "sector"),
            place_of_office: field("Place of Office", "place_of_office"),
            head_office: field("Head Office", "head_office"),
        }
    }

    /// Check the row and shape it into a create input. `row` is the
    /// 1-based position used in rejection messages. A rejected row
    /// carries every problem found, not just the first.
    pub fn validate(&self, row: usize) -> std::result::Result<Company, Vec<String>> {
        let mut errors = Vec::new();
        let name = match self.name.as_deref() {
            Some(name) if !name.is_empty() => Some(name.to_string()),
            _ => {
                errors.push(format!("row {}: company name is required", row));
                None
            }
        };
        let label = name.clone().unwrap_or_else(|| format!("row {}", row));
        if let Some(website) = self.website.as_deref() {
            if !valid_website(website) {
                errors.push(format!("{}: invalid website '{}'", label, website));
            }
        }
        if let Some(email) = self.email.as_deref() {
            if !valid_email(email) {
                errors.push(format!("{}: invalid email '{}'", label, email));
            }
        }
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(Company {
            name: name.unwrap_or_default(),
            industry: self.industry.clone(),
            website: self.website.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
            sector: self.sector.clone(),
            place_of_office: self.place_of_office.clone(),
            head_office: self.head_office.clone(),
            ..Default::default()
        })
    }
}

fn row_field(record: &BTreeMap<String, String>, title: &str, key: &str) -> Option<String> {
    let value = record.get(title).or_else(|| record.get(key))?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// A website must carry an explicit http(s) scheme and a host; a bare
/// domain does not count as a URL here.
pub fn valid_website(raw: &str) -> bool {
    match Url::parse(raw) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host_str().is_some(),
        Err(_) => false,
    }
}

pub fn valid_email(raw: &str) -> bool {
    if raw.chars().any(char::is_whitespace) {
        return false;
    }
    match raw.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    }
}

/// Read import rows out of a CSV file, keyed by its header row
pub fn rows_from_csv_path(path: &Path) -> Result<Vec<ImportRow>> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_path(path)?;
    let headers = reader.headers()?.clone();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let map: BTreeMap<String, String> = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.to_string(), v.to_string()))
            .collect();
        rows.push(ImportRow::from_record(&map));
    }
    Ok(rows)
}

/// Per-row outcome accounting for one import run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportSummary {
    pub imported: usize,
    /// Rows rejected by local validation
    pub skipped: usize,
    /// Rows the backend rejected as already existing
    pub duplicates: usize,
    /// Rows that failed submission for any other reason
    pub failed: usize,
    pub errors: Vec<String>,
    pub failures: Vec<RowFailure>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowFailure {
    /// 1-based row position in the input
    pub row: usize,
    pub name: String,
    pub reason: String,
}

impl CrmStore {
    /// Import companies row by row. Never aborts early; every row ends
    /// up in exactly one summary bucket. The company collection is
    /// force-refreshed afterwards so server-side defaulting is visible;
    /// a refresh failure does not fail the import.
    pub fn import_companies(&self, rows: &[ImportRow], cancel: &CancelFlag) -> Result<ImportSummary> {
        let mut summary = ImportSummary::default();
        for (index, row) in rows.iter().enumerate() {
            let number = index + 1;
            let company = match row.validate(number) {
                Ok(company) => company,
                Err(reasons) => {
                    summary.skipped += 1;
                    summary.errors.extend(reasons);
                    continue;
                }
            };
            match self.add_company(&company) {
                Ok(_) => summary.imported += 1,
                Err(StoreError::Duplicate { .. }) => summary.duplicates += 1,
                Err(err) => {
                    summary.failed += 1;
                    summary.failures.push(RowFailure {
                        row: number,
                        name: company.name.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }
        if summary.imported > 0 {
            self.refresh_companies(cancel).ok();
        }
        Ok(summary)
    }

    /// Bulk-create contacts through the batch endpoint, prepending the
    /// canonical records the backend returns.
    pub fn import_contacts(&self, drafts: &[Contact]) -> Result<Vec<Contact>> {
        let mut payload = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let mut value = serde_json::to_value(draft)?;
            wire::strip_server_fields(&mut value);
            payload.push(value);
        }
        let created = self.backend.import_batch(EntityKind::Contact, payload)?;
        let mut state = self.state.write().unwrap();
        let records = decode_records::<Contact>(created, &state.refs())?;
        for record in &records {
            state.contacts.insert_head(record.clone());
        }
        state.recompute();
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn both_header_conventions_resolve() {
        let titled = ImportRow::from_record(&record(&[
            ("Company Name", "Acme"),
            ("Place of Office", "Oslo"),
        ]));
        assert_eq!(titled.name.as_deref(), Some("Acme"));
        assert_eq!(titled.place_of_office.as_deref(), Some("Oslo"));

        let snake = ImportRow::from_record(&record(&[
            ("company_name", "Acme"),
            ("place_of_office", "Oslo"),
        ]));
        assert_eq!(snake.name.as_deref(), Some("Acme"));
        assert_eq!(snake.place_of_office.as_deref(), Some("Oslo"));
    }

    #[test]
    fn blank_cells_become_none() {
        let row = ImportRow::from_record(&record(&[("Company Name", "  "), ("Email", "")]));
        assert!(row.name.is_none());
        assert!(row.email.is_none());
    }

    #[test]
    fn validate_requires_name() {
        let errors = ImportRow::default().validate(3).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("row 3"));
        assert!(errors[0].contains("name is required"));
    }

    #[test]
    fn validate_rejects_bad_website_and_email() {
        let row = ImportRow {
            name: Some("Acme".into()),
            website: Some("not-a-url".into()),
            ..Default::default()
        };
        assert!(row.validate(1).unwrap_err()[0].contains("invalid website"));

        let row = ImportRow {
            name: Some("Acme".into()),
            email: Some("nobody".into()),
            ..Default::default()
        };
        assert!(row.validate(1).unwrap_err()[0].contains("invalid email"));
    }

    #[test]
    fn validate_collects_every_problem_in_a_row() {
        let row = ImportRow {
            website: Some("not-a-url".into()),
            email: Some("nobody".into()),
            ..Default::default()
        };
        let errors = row.validate(2).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors[0].contains("name is required"));
        assert!(errors[1].contains("invalid website"));
        assert!(errors[2].contains("invalid email"));
    }

    #[test]
    fn website_requires_explicit_scheme() {
        assert!(valid_website("https://acme.example/about"));
        assert!(valid_website("http://acme.example"));
        assert!(!valid_website("not-a-url"));
        assert!(!valid_website("acme.example"));
        assert!(!valid_website("ftp://acme.example"));
        assert!(!valid_website(""));
    }

    #[test]
    fn email_shape_checks() {
        assert!(valid_email("sales@acme.example"));
        assert!(!valid_email("sales@acme"));
        assert!(!valid_email("@acme.example"));
        assert!(!valid_email("two words@acme.example"));
    }
}
