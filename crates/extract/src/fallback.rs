use std::sync::OnceLock;

use regex::Regex;

use facture_core::{Fragment, FragmentKind};

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

re!(re_email, r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}");
// Country code + three separated groups, e.g. "+1-741-505-87" or
// "001-648-572-49". Four separated runs keep ISO dates (three runs) out.
// No leading \b: a word boundary never sits between whitespace and "+".
re!(re_phone, r"\+?\d{1,3}[-.\s]\(?\d{3}\)?[-.\s]\d{3}[-.\s]\d{2,4}\b");
re!(re_date, r"\b\d{1,2}/\d{1,2}/\d{4}\b|\b\d{4}-\d{2}-\d{2}\b");

/// Best-effort extraction for a page with no detected table: independent
/// global scans for emails, phones, and dates, one grouping fragment per
/// non-empty category, plus always one raw-text fragment so no page content
/// is silently dropped. Malformed matches are excluded by the patterns
/// themselves, not post-filtered.
pub fn extract_fragments(text: &str) -> Vec<Fragment> {
    let mut fragments = Vec::new();

    let emails = find_all(re_email(), text);
    if !emails.is_empty() {
        fragments.push(Fragment::new(FragmentKind::Email, emails));
    }

    let phones = find_all(re_phone(), text);
    if !phones.is_empty() {
        fragments.push(Fragment::new(FragmentKind::Phones, phones));
    }

    let dates = find_all(re_date(), text);
    if !dates.is_empty() {
        fragments.push(Fragment::new(FragmentKind::Dates, dates));
    }

    fragments.push(Fragment::new(
        FragmentKind::RawText,
        vec![text.trim().to_string()],
    ));

    fragments
}

fn find_all(re: &Regex, text: &str) -> Vec<String> {
    re.find_iter(text).map(|m| m.as_str().to_string()).collect()
}
