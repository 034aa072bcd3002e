use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::{DocumentScale, ParseLog, ScaleUnit};

// Tried in order; the first match wins. Each pattern captures the unit word.
static SCALE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\(\s*(?:dollars\s+|amounts\s+|\$\s*)?in\s+(millions)",
        r"(?i)\(\s*(?:dollars\s+|amounts\s+|\$\s*)?in\s+(thousands)",
        r"(?i)\(\s*(?:dollars\s+|amounts\s+|\$\s*)?in\s+(billions)",
        r"(?i)(?:amounts|dollars|figures)\s+(?:are\s+)?(?:expressed\s+|stated\s+|presented\s+|shown\s+)?in\s+(millions|thousands|billions)",
        r"(?i)in\s+(millions|thousands|billions)\s+of\s+(?:u\.?s\.?\s+)?dollars",
        r"(?i)\$\s*in\s+(millions|thousands|billions)",
        r"(?i)\((000)'?s\s+omitted\)",
        r"(?i)\bin\s+\$?(000)'?s\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Reads the document-wide scale declaration, defaulting to millions.
pub fn detect_scale(text: &str, log: &mut ParseLog) -> DocumentScale {
    for pattern in SCALE_PATTERNS.iter() {
        let unit = pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| ScaleUnit::from_word(m.as_str()));

        if let Some(unit) = unit {
            log.push(format!(
                "Detected document scale: {} (x{})",
                unit,
                unit.multiplier()
            ));
            return DocumentScale::detected(unit);
        }
    }

    let scale = DocumentScale::default();
    log.push(format!(
        "No scale declaration found, assuming {} (x{})",
        scale.unit, scale.multiplier
    ));
    scale
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(text: &str) -> DocumentScale {
        detect_scale(text, &mut ParseLog::new())
    }

    #[test]
    fn test_parenthesized_declarations() {
        assert_eq!(detect("(in millions, except per share data)").unit, ScaleUnit::Millions);
        assert_eq!(detect("(In thousands)").unit, ScaleUnit::Thousands);
        assert_eq!(detect("(Dollars in billions)").unit, ScaleUnit::Billions);
        assert!(detect("(in millions)").detected);
    }

    #[test]
    fn test_phrase_declarations() {
        assert_eq!(detect("All amounts are expressed in thousands").unit, ScaleUnit::Thousands);
        assert_eq!(detect("in millions of U.S. dollars").unit, ScaleUnit::Millions);
        assert_eq!(detect("$ in billions").unit, ScaleUnit::Billions);
        assert_eq!(detect("(000's omitted)").unit, ScaleUnit::Thousands);
    }

    #[test]
    fn test_pattern_order_decides_between_declarations() {
        let scale = detect("Shares (in thousands)\nBalance sheet (in millions)");
        assert_eq!(scale.unit, ScaleUnit::Millions);
        assert_eq!(scale.multiplier, 1e6);
    }

    #[test]
    fn test_default_is_assumed_millions() {
        let mut log = ParseLog::new();
        let scale = detect_scale("", &mut log);
        assert_eq!(scale.unit, ScaleUnit::Millions);
        assert_eq!(scale.multiplier, 1e6);
        assert!(!scale.detected);
        assert_eq!(log.len(), 1);
    }
}
