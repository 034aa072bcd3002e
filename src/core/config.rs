use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Geometry tolerances for table reconstruction, in page pixels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// A new column starts when a word sits farther than this from the last anchor.
    pub column_tolerance: f64,
    /// Maximum distance for assigning a word to an existing column.
    pub assignment_tolerance: f64,
    /// Adjacent label words closer than this are merged into one cell.
    pub word_merge_gap: f64,
    pub min_numeric_tokens: usize,
    pub min_table_rows: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            column_tolerance: 20.0,
            assignment_tolerance: 30.0,
            word_merge_gap: 12.0,
            min_numeric_tokens: 2,
            min_table_rows: 3,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceConfig {
    pub table_unique: u8,
    pub table_multiple: u8,
    pub table_adjacent_bonus: u8,
    pub table_adjacent_columns: usize,
    pub same_line_consolidated: u8,
    pub same_line_full: u8,
    pub next_line_consolidated: u8,
    pub next_line_full: u8,
    pub large_value_bonus: u8,
    pub large_value_threshold: f64,
    pub spacing_bonus: u8,
    pub derived: u8,
    pub derived_free_cash_flow: u8,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            table_unique: 95,
            table_multiple: 90,
            table_adjacent_bonus: 3,
            table_adjacent_columns: 3,
            same_line_consolidated: 90,
            same_line_full: 80,
            next_line_consolidated: 75,
            next_line_full: 65,
            large_value_bonus: 5,
            large_value_threshold: 10e9,
            spacing_bonus: 5,
            derived: 90,
            derived_free_cash_flow: 95,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub critical_weight: u32,
    pub important_weight: u32,
    pub optional_weight: u32,
    pub warning_penalty: u32,
    pub max_warning_penalty: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            critical_weight: 3,
            important_weight: 2,
            optional_weight: 1,
            warning_penalty: 5,
            max_warning_penalty: 20,
        }
    }
}

/// Text window sizes, in characters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionConfig {
    pub section_chars: usize,
    pub sparse_threshold: usize,
    pub metadata_short_window: usize,
    pub metadata_long_window: usize,
}

impl Default for SectionConfig {
    fn default() -> Self {
        Self {
            section_chars: 10_000,
            sparse_threshold: 500,
            metadata_short_window: 1_000,
            metadata_long_window: 3_000,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub table: TableConfig,
    pub confidence: ConfidenceConfig,
    pub scoring: ScoringConfig,
    pub sections: SectionConfig,
}

impl ParserConfig {
    /// Defaults, with geometry and section sizes overridable from the environment.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(v) = env_number::<f64>("STATEMENT_EXTRACTOR_COLUMN_TOLERANCE")? {
            config.table.column_tolerance = v;
        }
        if let Some(v) = env_number::<f64>("STATEMENT_EXTRACTOR_ASSIGNMENT_TOLERANCE")? {
            config.table.assignment_tolerance = v;
        }
        if let Some(v) = env_number::<f64>("STATEMENT_EXTRACTOR_WORD_MERGE_GAP")? {
            config.table.word_merge_gap = v;
        }
        if let Some(v) = env_number::<usize>("STATEMENT_EXTRACTOR_SECTION_CHARS")? {
            config.sections.section_chars = v;
        }

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path))
    }
}

fn env_number<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| anyhow!("{} must be a number, got {:?}", name, raw)),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_config_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"table": {{"column_tolerance": 12.5}}}}"#).unwrap();

        let config = ParserConfig::from_file(file.path()).unwrap();
        assert_eq!(config.table.column_tolerance, 12.5);
        assert_eq!(config.table.assignment_tolerance, 30.0);
        assert_eq!(config.confidence, ConfidenceConfig::default());
    }

    #[test]
    fn test_malformed_config_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(ParserConfig::from_file(file.path()).is_err());
    }
}
