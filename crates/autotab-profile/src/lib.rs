pub mod column_map;
pub mod config;
pub mod profiler;
pub mod schema;
pub mod stats;

pub use column_map::ColumnMap;
pub use config::{ProfileConfig, SchemaConfig};
pub use profiler::{ProfileReport, Profiler};
pub use schema::{ColumnSchema, SchemaInferencer, SemanticType};
