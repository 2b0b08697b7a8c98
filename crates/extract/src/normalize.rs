use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

use facture_core::CellValue;

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

re!(re_integer, r"^\d+$");
re!(re_decimal, r"^\d+\.\d+$");
re!(re_currency, r"^[\$£€](\d+\.\d+)$");
re!(re_date_iso, r"^(\d{4})-(\d{2})-(\d{2})$");
re!(re_date_slash, r"^(\d{1,2})/(\d{1,2})/(\d{4})$");

// ── Cell normalization ───────────────────────────────────────────────────────

/// Coerce one raw cell into a typed value. Total over all inputs: anything
/// malformed or ambiguous passes through as trimmed `Text`, never an error.
///
/// Rules are tried in order, first match wins:
/// whitespace-only → `Empty`; all digits → `Int`; `N.N` → `Number`;
/// `$`/`£`/`€` prefix on `N.N` → `Number` with the symbol stripped (the
/// currency identity is discarded); `YYYY-MM-DD` then `D/M/YYYY` → `Date`.
///
/// Slash dates are read as day/month/year — one fixed policy rather than
/// locale-dependent variation. A pattern match that is not a valid calendar
/// date falls through to `Text`.
pub fn normalize_cell(raw: &str) -> CellValue {
    let cell = raw.trim();
    if cell.is_empty() {
        return CellValue::Empty;
    }

    if re_integer().is_match(cell) {
        if let Ok(n) = cell.parse::<i64>() {
            return CellValue::Int(n);
        }
    }

    if re_decimal().is_match(cell) {
        if let Ok(d) = Decimal::from_str(cell) {
            return CellValue::Number(d);
        }
    }

    if let Some(c) = re_currency().captures(cell) {
        if let Some(d) = c.get(1).and_then(|m| Decimal::from_str(m.as_str()).ok()) {
            return CellValue::Number(d);
        }
    }

    if let Some(d) = parse_date(cell) {
        return CellValue::Date(d);
    }

    CellValue::Text(cell.to_string())
}

/// Parse a cell-sized date. ISO wins whenever both forms could match.
pub fn parse_date(cell: &str) -> Option<NaiveDate> {
    if let Some(c) = re_date_iso().captures(cell) {
        let y: i32 = c.get(1)?.as_str().parse().ok()?;
        let m: u32 = c.get(2)?.as_str().parse().ok()?;
        let d: u32 = c.get(3)?.as_str().parse().ok()?;
        return NaiveDate::from_ymd_opt(y, m, d);
    }
    if let Some(c) = re_date_slash().captures(cell) {
        let d: u32 = c.get(1)?.as_str().parse().ok()?;
        let m: u32 = c.get(2)?.as_str().parse().ok()?;
        let y: i32 = c.get(3)?.as_str().parse().ok()?;
        return NaiveDate::from_ymd_opt(y, m, d);
    }
    None
}

// ── Tests ─────────────────────────────────────────────────────────────────────
