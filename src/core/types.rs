use serde::{Deserialize, Serialize};
use std::fmt;

use super::schema::FinancialSchema;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Smallest box covering both `self` and `other`.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        BoundingBox {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }
}

/// A single OCR token with its position on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedWord {
    pub text: String,
    #[serde(rename = "bbox")]
    pub bounding_box: BoundingBox,
    #[serde(default)]
    pub confidence: f64,
    #[serde(rename = "line")]
    pub line_index: usize,
    #[serde(rename = "page")]
    pub page_index: usize,
}

impl PositionedWord {
    pub fn new(text: &str, bounding_box: BoundingBox, line_index: usize, page_index: usize) -> Self {
        Self {
            text: text.to_string(),
            bounding_box,
            confidence: 100.0,
            line_index,
            page_index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    pub text: String,
    pub bounding_box: BoundingBox,
    pub row: usize,
    pub column: usize,
    pub is_header: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableType {
    BalanceSheet,
    IncomeStatement,
    CashFlow,
    Unknown,
}

impl fmt::Display for TableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableType::BalanceSheet => write!(f, "balance_sheet"),
            TableType::IncomeStatement => write!(f, "income_statement"),
            TableType::CashFlow => write!(f, "cash_flow"),
            TableType::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedTable {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<TableCell>>,
    pub bounding_box: BoundingBox,
    pub page: usize,
    pub table_type: TableType,
}

/// One located value for a schema field. Values are absolute currency units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionCandidate {
    pub value: f64,
    pub source: String,
    pub confidence: u8,
    pub page: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl ExtractionCandidate {
    pub fn new(value: f64, source: impl Into<String>, confidence: u8, page: usize) -> Self {
        Self {
            value,
            source: source.into(),
            confidence: confidence.min(100),
            page,
            bounding_box: None,
            context: None,
        }
    }

    pub fn with_bounding_box(mut self, bounding_box: BoundingBox) -> Self {
        self.bounding_box = Some(bounding_box);
        self
    }

    pub fn with_context(mut self, context: &str) -> Self {
        const MAX_CONTEXT_CHARS: usize = 160;
        let trimmed = context.trim();
        self.context = Some(trimmed.chars().take(MAX_CONTEXT_CHARS).collect());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleUnit {
    Thousands,
    Millions,
    Billions,
}

impl ScaleUnit {
    pub fn multiplier(&self) -> f64 {
        match self {
            ScaleUnit::Thousands => 1e3,
            ScaleUnit::Millions => 1e6,
            ScaleUnit::Billions => 1e9,
        }
    }

    pub fn from_word(word: &str) -> Option<Self> {
        let word = word.to_lowercase();
        if word.starts_with("thousand") || word.starts_with("000") {
            Some(ScaleUnit::Thousands)
        } else if word.starts_with("million") {
            Some(ScaleUnit::Millions)
        } else if word.starts_with("billion") {
            Some(ScaleUnit::Billions)
        } else {
            None
        }
    }
}

impl fmt::Display for ScaleUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaleUnit::Thousands => write!(f, "thousands"),
            ScaleUnit::Millions => write!(f, "millions"),
            ScaleUnit::Billions => write!(f, "billions"),
        }
    }
}

/// Multiplier applied to numerals that carry no magnitude suffix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DocumentScale {
    pub unit: ScaleUnit,
    pub multiplier: f64,
    /// False when the scale is the millions default rather than read from the text.
    pub detected: bool,
}

impl DocumentScale {
    pub fn detected(unit: ScaleUnit) -> Self {
        Self {
            unit,
            multiplier: unit.multiplier(),
            detected: true,
        }
    }
}

impl Default for DocumentScale {
    fn default() -> Self {
        Self {
            unit: ScaleUnit::Millions,
            multiplier: ScaleUnit::Millions.multiplier(),
            detected: false,
        }
    }
}

/// Filing metadata. Missing values are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub company_name: String,
    pub ticker: String,
    pub cik: String,
    pub period_end_date: String,
    pub filing_date: String,
    pub document_type: String,
    pub fiscal_year: String,
    pub fiscal_quarter: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseResult {
    pub metadata: Metadata,
    pub schema: FinancialSchema,
    pub tables_detected: Vec<DetectedTable>,
    pub scale: DocumentScale,
    pub confidence_score: u8,
    pub warnings: Vec<String>,
    pub parse_log: Vec<String>,
}
