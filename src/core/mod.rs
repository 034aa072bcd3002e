pub mod audit;
pub mod config;
pub mod schema;
pub mod types;

pub use audit::ParseLog;
pub use config::ParserConfig;
pub use schema::{FieldKey, FinancialSchema};
pub use types::{
    BoundingBox, DetectedTable, DocumentScale, ExtractionCandidate, Metadata, ParseResult,
    PositionedWord, ScaleUnit, TableCell, TableType,
};
