use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::core::PositionedWord;

/// Reads extracted filing text. Invalid UTF-8 is replaced rather than rejected.
pub fn load_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read text file {:?}", path))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Reads OCR word records: a JSON array of
/// `{"text", "bbox": {"x", "y", "width", "height"}, "confidence", "line", "page"}`.
pub fn load_positioned_words(path: &Path) -> Result<Vec<PositionedWord>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read words file {:?}", path))?;
    let words: Vec<PositionedWord> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse positioned words in {:?}", path))?;
    log::debug!("Loaded {} positioned words from {:?}", words.len(), path);
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_positioned_words() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"text": "Total", "bbox": {{"x": 10, "y": 20, "width": 30, "height": 10}}, "line": 1, "page": 0}}]"#
        )
        .unwrap();

        let words = load_positioned_words(file.path()).unwrap();
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].text, "Total");
        assert_eq!(words[0].bounding_box.x, 10.0);
        assert_eq!(words[0].line_index, 1);
    }

    #[test]
    fn test_malformed_words_report_the_path() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = load_positioned_words(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse positioned words"));
    }

    #[test]
    fn test_load_text_tolerates_invalid_utf8() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"Total revenues \xff 125,843").unwrap();
        let text = load_text(file.path()).unwrap();
        assert!(text.contains("125,843"));
    }
}
