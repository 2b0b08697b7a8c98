use std::sync::OnceLock;

use regex::Regex;

use facture_core::{CellValue, PageRecord, RowRecord};

use crate::fallback::extract_fragments;
use crate::normalize::normalize_cell;
use crate::reader::Document;
use crate::table::clean_table;
use crate::vendor::VendorClassifier;

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

// Labeled header lines above the item table, as printed on the invoices
// this pipeline was built against.
re!(re_invoice_id, r"(?im)^\s*invoice\s*id\s*:\s*(.+?)\s*$");
re!(re_customer, r"(?im)^\s*customer\s*name\s*:\s*(.+?)\s*$");
re!(re_phone_line, r"(?im)^\s*phone\s*:\s*(.+?)\s*$");
re!(re_email_line, r"(?im)^\s*email\s*:\s*(.+?)\s*$");
re!(re_date_line, r"(?im)^\s*date\s*:\s*(.+?)\s*$");

/// Everything one document walk produced. `tables_extracted` is handed back
/// to the batch processor, which owns the run counters.
#[derive(Debug, Default)]
pub struct WalkOutcome {
    pub records: Vec<PageRecord>,
    pub tables_extracted: u64,
}

/// Walk one opened document page by page, in order.
///
/// A page with at least one detected table contributes one record per
/// cleaned table row; a table-less page with text contributes fallback
/// fragments; a page with neither contributes nothing and is not an error.
/// Ordering across pages, and across tables within a page, is preserved.
pub fn walk_document(document: &Document, classifier: &VendorClassifier) -> WalkOutcome {
    let mut outcome = WalkOutcome::default();

    for (page_no, page) in document.pages.iter().enumerate() {
        if !page.tables.is_empty() {
            let page_fields = PageFields::scan(page.text.as_str(), classifier);
            for table in &page.tables {
                let rows = clean_table(table);
                tracing::debug!(page = page_no + 1, rows = rows.len(), "cleaned table");
                outcome.tables_extracted += 1;
                for mut row in rows {
                    page_fields.enrich(&mut row);
                    outcome.records.push(PageRecord::Row(row));
                }
            }
        } else if !page.text.trim().is_empty() {
            tracing::debug!(page = page_no + 1, "no table detected, using fallback extraction");
            outcome.records.extend(
                extract_fragments(&page.text).into_iter().map(PageRecord::Fragment),
            );
        }
    }

    outcome
}

/// Document-level fields parsed from a page's labeled header lines, plus the
/// classified vendor. Invoice identity lives above the item table in the
/// source documents, so each table row is enriched with these — a field the
/// table itself provided is never overwritten.
struct PageFields {
    fields: Vec<(&'static str, CellValue)>,
}

impl PageFields {
    fn scan(text: &str, classifier: &VendorClassifier) -> Self {
        let mut fields = Vec::new();

        let labeled: [(&'static str, &Regex); 5] = [
            ("invoice_id", re_invoice_id()),
            ("customer_name", re_customer()),
            ("phone", re_phone_line()),
            ("email", re_email_line()),
            ("date", re_date_line()),
        ];
        for (name, re) in labeled {
            if let Some(c) = re.captures(text).and_then(|c| c.get(1)) {
                fields.push((name, normalize_cell(c.as_str())));
            }
        }

        fields.push(("vendor", CellValue::Text(classifier.classify(text).to_string())));

        Self { fields }
    }

    fn enrich(&self, record: &mut RowRecord) {
        for (name, value) in &self.fields {
            if !record.contains(name) {
                record.insert(*name, value.clone());
            }
        }
    }
}
