pub mod text;

pub use text::{format_timestamp, truncate};
