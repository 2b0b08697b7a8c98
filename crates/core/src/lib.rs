pub mod record;
pub mod stats;
pub mod value;

pub use record::{Fragment, FragmentKind, PageRecord, RawTable, RowRecord};
pub use stats::RunStats;
pub use value::CellValue;
