pub mod confidence;
pub mod derive;
pub mod extract;
pub mod fields;
pub mod metadata;
pub mod number;
pub mod pipeline;
pub mod plausibility;
pub mod scale;
pub mod table;
pub mod text;
pub mod validate;

pub use fields::{default_fields, FieldSpec};
pub use number::parse_amount;
pub use pipeline::{parse, ParsePipeline};
