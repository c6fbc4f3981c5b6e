pub mod column_transformer;
pub mod encoder;
pub mod error;
pub mod imputer;
pub mod scaler;
pub mod split;

pub use column_transformer::*;
pub use encoder::*;
pub use error::{PreprocessError, PreprocessResult};
pub use imputer::*;
pub use scaler::*;
pub use split::*;
