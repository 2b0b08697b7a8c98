use serde::Serialize;
use std::fmt;

/// Run-level counters, owned exclusively by the batch processor.
/// Reset at the start of a run, read-only once the run finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub documents_processed: u64,
    pub tables_extracted: u64,
    pub errors: u64,
}

impl RunStats {
    pub fn reset(&mut self) {
        *self = RunStats::default();
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} documents processed, {} tables extracted, {} errors",
            self.documents_processed, self.tables_extracted, self.errors
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_zeroes_all_counters() {
        let mut s = RunStats { documents_processed: 3, tables_extracted: 7, errors: 1 };
        s.reset();
        assert_eq!(s, RunStats::default());
    }

    #[test]
    fn display_reads_as_summary_line() {
        let s = RunStats { documents_processed: 2, tables_extracted: 4, errors: 0 };
        assert_eq!(s.to_string(), "2 documents processed, 4 tables extracted, 0 errors");
    }
}
