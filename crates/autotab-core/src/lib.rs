pub mod dtype;
pub mod error;
pub mod frame;
pub mod matrix;
pub mod record;
pub mod value;

pub use dtype::DType;
pub use error::{FrameError, FrameResult};
pub use frame::{Column, DataFrame};
pub use matrix::Matrix;
pub use record::Record;
pub use value::{Value, ValueKey};
