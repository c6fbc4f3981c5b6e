pub mod decision_tree;
pub mod error;
pub mod random_forest;

pub use decision_tree::*;
pub use error::{TreeError, TreeResult};
pub use random_forest::*;
