pub mod core;
pub mod edgar;
pub mod input;

// Re-exports
pub use crate::core::{FieldKey, FinancialSchema, ParseResult, ParserConfig, PositionedWord};
pub use edgar::parsing::{parse, ParsePipeline};
