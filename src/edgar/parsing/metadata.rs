use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::str::FromStr;

use super::text::char_window;
use crate::core::config::SectionConfig;
use crate::core::{Metadata, ParseLog};
use crate::edgar::report::ReportType;

/// Boilerplate that a cover-page pattern can capture instead of a value.
const BLACKLIST: &[&str] = &[
    "SECURITIES",
    "COMMISSION",
    "EXCHANGE ACT",
    "WASHINGTON",
    "UNITED STATES",
    "FORM 10",
    "ANNUAL REPORT",
    "QUARTERLY REPORT",
    "PURSUANT",
    "TABLE OF CONTENTS",
];

const TICKER_BLACKLIST: &[&str] = &["THE", "INC", "LLC", "NYSE", "SEC", "USA", "NONE", "NA", "LLP", "PAR"];

#[derive(Clone, Copy)]
enum Window {
    Short,
    Long,
}

struct MetadataRule {
    window: Window,
    patterns: Vec<Regex>,
}

impl MetadataRule {
    fn new(window: Window, patterns: &[&str]) -> Self {
        Self {
            window,
            patterns: patterns.iter().map(|p| Regex::new(p).unwrap()).collect(),
        }
    }

    /// First capture, in pattern order, that survives `accept`.
    fn find(&self, text: &str, config: &SectionConfig, accept: impl Fn(&str) -> bool) -> Option<String> {
        let limit = match self.window {
            Window::Short => config.metadata_short_window,
            Window::Long => config.metadata_long_window,
        };
        let window = char_window(text, limit);

        self.patterns.iter().find_map(|re| {
            re.captures_iter(window)
                .filter_map(|caps| caps.get(1))
                .map(|m| clean_capture(m.as_str()))
                .find(|value| !value.is_empty() && accept(value.as_str()))
        })
    }
}

static COMPANY_NAME: Lazy<MetadataRule> = Lazy::new(|| {
    MetadataRule::new(
        Window::Long,
        &[
            r"(?im)^[ \t]*([^\n]{2,100}?)[ \t]*\n[ \t]*\(?exact\s+name\s+of\s+registrant",
            r"(?i)company\s+conformed\s+name:\s*([^\n]+)",
            r"(?m)^[ \t]*([A-Z][A-Za-z0-9.,&'\- ]{1,80}?(?:Inc\.?|Incorporated|Corporation|Corp\.?|Company|Co\.|Ltd\.?|Limited|LLC|L\.P\.|plc|PLC|N\.V\.|S\.A\.|AG|Holdings|Group))[ \t]*$",
        ],
    )
});

static TICKER: Lazy<MetadataRule> = Lazy::new(|| {
    MetadataRule::new(
        Window::Long,
        &[
            r"(?i:trading\s+symbol\(?s?\)?)[:\s]+([A-Z]{1,5}(?:\.[A-Z])?)\b",
            r"\(\s*(?i:nasdaq|nyse|nyse\s+american|amex)\s*:\s*([A-Z]{1,5}(?:\.[A-Z])?)\s*\)",
            r"(?i:nasdaq|nyse)[^:\n]{0,20}:\s*([A-Z]{1,5}(?:\.[A-Z])?)\b",
            r"(?i:ticker\s+symbol)[:\s]+([A-Z]{1,5}(?:\.[A-Z])?)\b",
            r"(?m)^[ \t]*(?i:common\s+stock)[^\n]*?[ \t]{2,}([A-Z]{1,5})[ \t]{2,}",
        ],
    )
});

static CIK: Lazy<MetadataRule> = Lazy::new(|| {
    MetadataRule::new(
        Window::Long,
        &[
            r"(?i)central\s+index\s+key:?\s*(\d{4,10})",
            r"(?i)\bCIK\b[:#\s]*(?:no\.?\s*)?(\d{4,10})",
            r"(?i)commission\s+file\s+number\s+for\s+cik\s*(\d{4,10})",
        ],
    )
});

static PERIOD_END: Lazy<MetadataRule> = Lazy::new(|| {
    MetadataRule::new(
        Window::Long,
        &[
            r"(?i)conformed\s+period\s+of\s+report:\s*(\d{8})",
            r"(?i)for\s+the\s+(?:fiscal\s+)?(?:year|quarter(?:ly\s+period)?|quarterly\s+period|period|transition\s+period)\s+ended:?\s+([A-Za-z]+\.?\s+\d{1,2},?\s+\d{4})",
            r"(?i)(?:fiscal\s+)?(?:year|quarter|period)\s+ended\s+([A-Za-z]+\.?\s+\d{1,2},?\s+\d{4})",
            r"(?i)as\s+of\s+([A-Za-z]+\s+\d{1,2},\s+\d{4})",
        ],
    )
});

static FILING_DATE: Lazy<MetadataRule> = Lazy::new(|| {
    MetadataRule::new(
        Window::Long,
        &[
            r"(?i)filed\s+as\s+of\s+date:\s*(\d{8})",
            r"(?i)(?:date\s+filed|filing\s+date|filed\s+on)[:\s]+([A-Za-z]+\.?\s+\d{1,2},?\s+\d{4}|\d{4}-\d{2}-\d{2})",
        ],
    )
});

static DOCUMENT_TYPE: Lazy<MetadataRule> = Lazy::new(|| {
    MetadataRule::new(
        Window::Short,
        &[
            r"(?i)conformed\s+submission\s+type:\s*(\S+)",
            r"(?i)\bform\s+(10-K(?:/A)?|10-Q(?:/A)?|20-F|40-F|8-K|6-K)\b",
            r"(?i)\b(annual\s+report|quarterly\s+report)\s+pursuant",
        ],
    )
});

static FISCAL_YEAR: Lazy<MetadataRule> = Lazy::new(|| {
    MetadataRule::new(
        Window::Long,
        &[
            r"(?i)fiscal\s+year\s+(?:ended\s+[A-Za-z]+\s+\d{1,2},\s+)?(\d{4})",
            r"(?i)\bfiscal\s+(\d{4})\b",
            r"(?i)\bFY\s?(\d{4})\b",
        ],
    )
});

static FISCAL_QUARTER: Lazy<MetadataRule> = Lazy::new(|| {
    MetadataRule::new(
        Window::Long,
        &[
            r"(?i)\b(first|second|third|fourth)\s+(?:fiscal\s+)?quarter\b",
            r"(?i)\bQ([1-4])\b",
            r"(?i)\bquarter\s+([1-4])\b",
        ],
    )
});

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

fn clean_capture(raw: &str) -> String {
    WHITESPACE
        .replace_all(raw.trim(), " ")
        .trim_matches(|c: char| c == ',' || c == ';' || c == ':')
        .trim()
        .to_string()
}

fn not_boilerplate(value: &str) -> bool {
    let upper = value.to_uppercase();
    !BLACKLIST.iter().any(|b| upper.contains(b))
}

fn plausible_ticker(value: &str) -> bool {
    !TICKER_BLACKLIST.contains(&value)
}

/// Normalizes `20240928`, `September 28, 2024` or `Sept. 28 2024` to ISO
/// dates. Unparseable values come back unchanged.
pub fn normalize_date(raw: &str) -> String {
    let cleaned = raw.replace('.', "").replace(',', "");
    let cleaned = cleaned.trim();

    let parsed = NaiveDate::parse_from_str(cleaned, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(cleaned, "%Y-%m-%d"))
        .or_else(|_| NaiveDate::parse_from_str(cleaned, "%B %d %Y"))
        .or_else(|_| NaiveDate::parse_from_str(cleaned, "%b %d %Y"))
        .or_else(|_| {
            // "Sept 28 2024"
            let mut parts = cleaned.splitn(2, ' ');
            let month: String = parts.next().unwrap_or_default().chars().take(3).collect();
            let rest = parts.next().unwrap_or_default();
            NaiveDate::parse_from_str(&format!("{} {}", month, rest), "%b %d %Y")
        });

    match parsed {
        Ok(date) => date.format("%Y-%m-%d").to_string(),
        Err(_) => raw.to_string(),
    }
}

fn normalize_quarter(raw: &str) -> String {
    match raw.to_lowercase().as_str() {
        "first" | "1" => "Q1".to_string(),
        "second" | "2" => "Q2".to_string(),
        "third" | "3" => "Q3".to_string(),
        "fourth" | "4" => "Q4".to_string(),
        other => other.to_uppercase(),
    }
}

fn normalize_document_type(raw: &str) -> String {
    ReportType::from_cover_phrase(raw)
        .or_else(|| ReportType::from_str(raw).ok())
        .map(|report| report.to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// Derives filing metadata from the opening of the document. Every field
/// degrades to an empty string on its own.
pub fn extract_metadata(text: &str, config: &SectionConfig, log: &mut ParseLog) -> Metadata {
    let company_name = COMPANY_NAME
        .find(text, config, not_boilerplate)
        .unwrap_or_default();
    let ticker = TICKER.find(text, config, plausible_ticker).unwrap_or_default();
    let cik = CIK.find(text, config, |_| true).unwrap_or_default();
    let period_end_date = PERIOD_END
        .find(text, config, |_| true)
        .map(|d| normalize_date(&d))
        .unwrap_or_default();
    let filing_date = FILING_DATE
        .find(text, config, |_| true)
        .map(|d| normalize_date(&d))
        .unwrap_or_default();
    let document_type = DOCUMENT_TYPE
        .find(text, config, |_| true)
        .map(|t| normalize_document_type(&t))
        .unwrap_or_default();

    let fiscal_year = FISCAL_YEAR
        .find(text, config, |_| true)
        .or_else(|| {
            NaiveDate::parse_from_str(&period_end_date, "%Y-%m-%d")
                .ok()
                .map(|d| d.format("%Y").to_string())
        })
        .unwrap_or_default();
    let report = Some(document_type.as_str())
        .filter(|t| !t.is_empty())
        .and_then(|t| ReportType::from_str(t).ok());
    if let Some(ReportType::Other(unknown)) = &report {
        log.push(format!(
            "Unrecognized document type {:?} (known: {})",
            unknown,
            ReportType::list_types()
        ));
    }

    // Annual reports mention quarters in passing; only quarterly ones have
    // one, and it is never the fourth.
    let quarter = |accept: &dyn Fn(&str) -> bool| {
        FISCAL_QUARTER
            .find(text, config, accept)
            .map(|q| normalize_quarter(&q))
            .unwrap_or_default()
    };
    let fiscal_quarter = match &report {
        Some(r) if r.is_annual() => String::new(),
        Some(r) if r.is_quarterly() => quarter(&|q: &str| normalize_quarter(q) != "Q4"),
        _ => quarter(&|_: &str| true),
    };

    let metadata = Metadata {
        company_name,
        ticker,
        cik,
        period_end_date,
        filing_date,
        document_type,
        fiscal_year,
        fiscal_quarter,
    };

    log.push(format!(
        "Metadata: company={:?} ticker={:?} cik={:?} type={:?} period_end={:?}",
        metadata.company_name,
        metadata.ticker,
        metadata.cik,
        metadata.document_type,
        metadata.period_end_date
    ));
    metadata
}
