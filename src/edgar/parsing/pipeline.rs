use serde_json::{json, Map, Value};

use super::confidence::score;
use super::derive::derive_relationships;
use super::extract::FieldExtractor;
use super::fields::{default_fields, FieldSpec};
use super::metadata::extract_metadata;
use super::plausibility::filter_implausible;
use super::scale::detect_scale;
use super::table::build_tables;
use super::text::normalize_text;
use super::validate::validate;
use crate::core::{FinancialSchema, ParseLog, ParseResult, ParserConfig, PositionedWord};

/// Runs every stage in a fixed order over one document.
pub struct ParsePipeline {
    config: ParserConfig,
    fields: Vec<FieldSpec>,
}

impl Default for ParsePipeline {
    fn default() -> Self {
        Self::new(ParserConfig::default())
    }
}

impl ParsePipeline {
    pub fn new(config: ParserConfig) -> Self {
        Self {
            config,
            fields: default_fields().to_vec(),
        }
    }

    /// Replaces the field table, e.g. with a synthetic pattern set.
    pub fn with_fields(mut self, fields: Vec<FieldSpec>) -> Self {
        self.fields = fields;
        self
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn parse(&self, raw_text: &str, positioned_words: Option<&[PositionedWord]>) -> ParseResult {
        let mut log = ParseLog::new();
        log.push(format!(
            "Parsing {} characters, {} positioned words",
            raw_text.chars().count(),
            positioned_words.map(|w| w.len()).unwrap_or(0)
        ));

        let text = normalize_text(raw_text);
        let scale = detect_scale(&text, &mut log);

        let tables = match positioned_words {
            Some(words) if !words.is_empty() => build_tables(words, &self.config.table, &mut log),
            _ => {
                log.push("No positioned words supplied, skipping table reconstruction");
                Vec::new()
            }
        };

        let metadata = extract_metadata(&text, &self.config.sections, &mut log);

        let extractor = FieldExtractor::new(
            &text,
            &tables,
            scale,
            &self.config.confidence,
            &self.config.sections,
        );
        log.push(format!(
            "Located {} consolidated section(s) covering {} characters",
            extractor.sections().len(),
            extractor.captured_chars()
        ));

        let mut schema = FinancialSchema::new();
        for spec in &self.fields {
            if let Some(candidate) = extractor.extract(spec, &mut log) {
                schema.set(spec.key, candidate);
            }
        }

        filter_implausible(&mut schema, &mut log);
        derive_relationships(&mut schema, &self.config.confidence, &mut log);
        let warnings = validate(&schema, &mut log);
        let confidence_score = score(&schema, warnings.len(), &self.config.scoring, &mut log);

        log::info!(
            "Parsed {} field(s), {} table(s), confidence {}",
            schema.populated_count(),
            tables.len(),
            confidence_score
        );

        ParseResult {
            metadata,
            schema,
            tables_detected: tables,
            scale,
            confidence_score,
            warnings,
            parse_log: log.into_lines(),
        }
    }
}

/// Parses with the default configuration.
pub fn parse(raw_text: &str, positioned_words: Option<&[PositionedWord]>) -> ParseResult {
    ParsePipeline::default().parse(raw_text, positioned_words)
}

impl ParseResult {
    /// Flat projection for older consumers: metadata strings, one
    /// `<category>_<slot>` number per populated field, the score and warnings.
    pub fn to_legacy_json(&self) -> Value {
        let mut flat = Map::new();

        let metadata = &self.metadata;
        for (name, value) in [
            ("company_name", &metadata.company_name),
            ("ticker", &metadata.ticker),
            ("cik", &metadata.cik),
            ("period_end_date", &metadata.period_end_date),
            ("filing_date", &metadata.filing_date),
            ("document_type", &metadata.document_type),
            ("fiscal_year", &metadata.fiscal_year),
            ("fiscal_quarter", &metadata.fiscal_quarter),
        ] {
            flat.insert(name.to_string(), json!(value));
        }

        for (key, candidate) in self.schema.populated() {
            flat.insert(format!("{}_{}", key.category(), key.slot_name()), json!(candidate.value));
        }

        flat.insert("confidence".to_string(), json!(self.confidence_score));
        flat.insert("warnings".to_string(), json!(self.warnings));
        Value::Object(flat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FieldKey;

    #[test]
    fn test_text_mode_end_to_end() {
        let text = "(in millions)\nCONSOLIDATED STATEMENTS OF OPERATIONS\nTotal revenues   125,843\n\
Net income   21,000\nSee accompanying notes\n";
        let result = parse(text, None);

        assert_eq!(result.schema.value(FieldKey::RevenuesTotal), Some(125_843_000_000.0));
        assert_eq!(result.schema.value(FieldKey::IncomeNetIncome), Some(21_000_000_000.0));
        assert!(result.tables_detected.is_empty());
        assert!(result.scale.detected);
    }

    #[test]
    fn test_page_breaks_survive_normalization() {
        let result = parse("(in millions)\ncover page\x0c\nTotal revenues   125,843\n", None);
        let revenue = result.schema.get(FieldKey::RevenuesTotal).unwrap();
        assert_eq!(revenue.value, 125_843_000_000.0);
        assert_eq!(revenue.page, 1);
    }

    #[test]
    fn test_stages_run_in_order() {
        let words: Vec<PositionedWord> = Vec::new();
        let result = parse("(in thousands)\nTotal revenues  5,000", Some(words.as_slice()));
        let scale_line = result.parse_log.iter().position(|l| l.contains("Detected document scale"));
        let table_line = result.parse_log.iter().position(|l| l.contains("skipping table"));
        let score_line = result.parse_log.iter().position(|l| l.contains("Confidence score"));

        assert!(scale_line < table_line);
        assert!(table_line < score_line);
        assert!(result.parse_log.last().unwrap().contains("Confidence score"));
    }

    #[test]
    fn test_synthetic_field_table() {
        let spec = FieldSpec::new(FieldKey::AssetsGoodwill, "goodwill", &[r"widgets\s+on\s+hand"]).unwrap();
        let pipeline = ParsePipeline::default().with_fields(vec![spec]);
        let result = pipeline.parse("Widgets on hand   1,500\nTotal revenues  9,000", None);

        assert_eq!(result.schema.value(FieldKey::AssetsGoodwill), Some(1_500_000_000.0));
        assert!(!result.schema.contains(FieldKey::RevenuesTotal));
    }

    #[test]
    fn test_legacy_projection_is_flat() {
        let result = parse("(in millions)\nTotal revenues  125,843", None);
        let legacy = result.to_legacy_json();

        assert_eq!(legacy["revenues_total"], json!(125_843_000_000.0));
        assert_eq!(legacy["company_name"], json!(""));
        assert_eq!(legacy["confidence"], json!(result.confidence_score));
        assert!(legacy.get("assets_total").is_none());
        assert!(legacy.as_object().unwrap().values().all(|v| !v.is_object()));
    }
}
