//! Comma-separated backing-file codec.
//!
//! The reader turns a file into ordered rows of owned field strings and
//! tolerates dirty input: blank lines and rows with broken quoting are
//! skipped and counted instead of failing the whole read. The writer emits
//! RFC 4180 text, quoting only fields that need it.

pub mod reader;
pub mod writer;

pub use reader::{RowScan, parse_rows, read_rows};
pub use writer::{append_row, encode_row, write_all_rows};

/// Field separator.
pub const DELIMITER: u8 = b',';
/// Quote character.
pub const QUOTE: u8 = b'"';
/// Line terminator emitted by the writer.
pub const LINE_ENDING: &str = "\n";
