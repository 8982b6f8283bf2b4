//! Typed records for the flatstore collections.
//!
//! Rows arrive from the backing file as plain strings. Each [`Record`]
//! implementation decodes them once into numeric types (prices in cents,
//! sentiment scores as `f64`) and renders strings again only when a record
//! is written back.

pub mod app;
pub mod decode;
pub mod price;
pub mod record;
pub mod review;

pub use app::App;
pub use decode::{DecodeReport, decode_rows};
pub use price::Price;
pub use record::{DecodeReject, Record, identity_matches, is_missing_identity};
pub use review::Review;
