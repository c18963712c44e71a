//! xlsx persistence: reading the property worksheet and writing the
//! two-sheet result workbook

mod reader;
mod writer;

pub use reader::{cell_text, read_source, SourceSheet};
pub use writer::{copy_to_dir, ensure_fits, write_workbook, MAX_RESULT_COLUMNS};
