pub mod artifact_io;
pub mod csv_io;
pub mod error;

pub use artifact_io::{decode_versioned, encode_versioned, peek_header, PayloadHeader};
pub use csv_io::{read_csv, read_csv_bytes, NA_VALUES};
pub use error::{IoError, IoResult};
