use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use strum::{EnumIter, IntoEnumIterator};

/// Periodic report forms that carry financial statements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, EnumIter)]
#[serde(try_from = "String")]
pub enum ReportType {
    Form10K,
    Form10KA,
    Form10Q,
    Form10QA,
    Form20F,
    Form40F,
    Form6K,
    Form8K,
    FormS1,
    Other(String),
}

impl TryFrom<String> for ReportType {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        ReportType::from_str(&s)
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportType::Form10K => write!(f, "10-K"),
            ReportType::Form10KA => write!(f, "10-K/A"),
            ReportType::Form10Q => write!(f, "10-Q"),
            ReportType::Form10QA => write!(f, "10-Q/A"),
            ReportType::Form20F => write!(f, "20-F"),
            ReportType::Form40F => write!(f, "40-F"),
            ReportType::Form6K => write!(f, "6-K"),
            ReportType::Form8K => write!(f, "8-K"),
            ReportType::FormS1 => write!(f, "S-1"),
            ReportType::Other(s) => write!(f, "{}", s),
        }
    }
}

pub static REPORT_TYPES: Lazy<String> = Lazy::new(|| {
    ReportType::iter()
        .filter(|t| !matches!(t, ReportType::Other(_)))
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(", ")
});

impl ReportType {
    pub fn list_types() -> &'static str {
        &REPORT_TYPES
    }

    /// Maps cover-page wording ("ANNUAL REPORT PURSUANT TO SECTION 13...") to a form.
    pub fn from_cover_phrase(phrase: &str) -> Option<ReportType> {
        let lower = phrase.to_lowercase();
        if lower.contains("annual report") {
            Some(ReportType::Form10K)
        } else if lower.contains("quarterly report") {
            Some(ReportType::Form10Q)
        } else {
            None
        }
    }

    pub fn is_annual(&self) -> bool {
        matches!(
            self,
            ReportType::Form10K | ReportType::Form10KA | ReportType::Form20F | ReportType::Form40F
        )
    }

    pub fn is_quarterly(&self) -> bool {
        matches!(self, ReportType::Form10Q | ReportType::Form10QA)
    }
}

impl FromStr for ReportType {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<ReportType, std::string::String> {
        let normalized = s.trim().to_uppercase().replace(' ', "");
        match normalized.as_str() {
            "10-K" | "10K" => Ok(ReportType::Form10K),
            "10-K/A" | "10K/A" => Ok(ReportType::Form10KA),
            "10-Q" | "10Q" => Ok(ReportType::Form10Q),
            "10-Q/A" | "10Q/A" => Ok(ReportType::Form10QA),
            "20-F" | "20F" => Ok(ReportType::Form20F),
            "40-F" | "40F" => Ok(ReportType::Form40F),
            "6-K" | "6K" => Ok(ReportType::Form6K),
            "8-K" | "8K" => Ok(ReportType::Form8K),
            "S-1" | "S1" => Ok(ReportType::FormS1),
            _ => Ok(ReportType::Other(s.trim().to_string())),
        }
    }
}
