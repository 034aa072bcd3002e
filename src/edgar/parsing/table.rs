use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

use super::number::is_numeric_token;
use crate::core::config::TableConfig;
use crate::core::{DetectedTable, ParseLog, PositionedWord, TableCell, TableType};

static CASH_FLOW_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)cash\s+flows?|operating\s+activities|investing\s+activities|financing\s+activities")
        .unwrap()
});
static BALANCE_SHEET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)balance\s+sheets?|financial\s+position|total\s+assets|total\s+liabilities|(?:stockholders|shareholders)['’]?\s+equity",
    )
    .unwrap()
});
static INCOME_STATEMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)statements?\s+of\s+(?:income|operations|earnings)|revenues?|net\s+sales|net\s+income|operating\s+income|gross\s+profit",
    )
    .unwrap()
});

/// Lines above a numeric run that are consulted when classifying it.
const CLASSIFY_CONTEXT_LINES: usize = 3;

type Line = (usize, Vec<PositionedWord>);

/// Reconstructs tables from OCR word geometry, page by page.
pub fn build_tables(
    words: &[PositionedWord],
    config: &TableConfig,
    log: &mut ParseLog,
) -> Vec<DetectedTable> {
    let mut pages: BTreeMap<usize, BTreeMap<usize, Vec<PositionedWord>>> = BTreeMap::new();
    for word in words {
        if word.text.trim().is_empty() {
            continue;
        }
        pages
            .entry(word.page_index)
            .or_default()
            .entry(word.line_index)
            .or_default()
            .push(word.clone());
    }

    let mut tables = Vec::new();
    for (page, lines) in pages {
        let lines: Vec<Line> = lines
            .into_iter()
            .map(|(index, mut line)| {
                line.sort_by(|a, b| a.bounding_box.x.total_cmp(&b.bounding_box.x));
                (index, merge_word_runs(line, config.word_merge_gap))
            })
            .collect();

        for run in numeric_runs(&lines, config) {
            let context_start = run.start.saturating_sub(CLASSIFY_CONTEXT_LINES);
            let context = lines[context_start..run.start]
                .iter()
                .filter(|(_, words)| !is_numeric_dense(words, config))
                .flat_map(|(_, words)| words.iter().map(|w| w.text.as_str()))
                .join(" ");

            let table = build_table(&lines[run], &context, page, config);
            let columns = table.rows.iter().flatten().map(|c| c.column + 1).max().unwrap_or(0);
            log.push(format!(
                "Detected {} table on page {}: {} rows x {} columns",
                table.table_type,
                page,
                table.rows.len(),
                columns
            ));
            tables.push(table);
        }
    }

    log.push(format!(
        "Table reconstruction produced {} table(s) from {} positioned words",
        tables.len(),
        words.len()
    ));
    tables
}

fn is_numeric_dense(words: &[PositionedWord], config: &TableConfig) -> bool {
    words.iter().filter(|w| is_numeric_token(&w.text)).count() >= config.min_numeric_tokens
}

/// Index ranges of maximal runs of numeric-dense lines long enough to be tables.
fn numeric_runs(lines: &[Line], config: &TableConfig) -> Vec<std::ops::Range<usize>> {
    let mut runs = Vec::new();
    let mut start = None;

    for (i, (_, words)) in lines.iter().enumerate() {
        match (is_numeric_dense(words, config), start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                if i - s >= config.min_table_rows {
                    runs.push(s..i);
                }
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        if lines.len() - s >= config.min_table_rows {
            runs.push(s..lines.len());
        }
    }

    runs
}

/// Joins adjacent label fragments ("Total" + "liabilities") and glues a lone
/// `$` onto the amount that follows it. Amounts are never merged together.
fn merge_word_runs(words: Vec<PositionedWord>, max_gap: f64) -> Vec<PositionedWord> {
    let mut merged: Vec<PositionedWord> = Vec::with_capacity(words.len());

    for word in words {
        if let Some(last) = merged.last_mut() {
            let gap = word.bounding_box.x - last.bounding_box.right();
            let both_labels = !is_numeric_token(&last.text) && !is_numeric_token(&word.text);
            let currency_prefix = last.text == "$" && is_numeric_token(&word.text);

            if gap <= max_gap && (both_labels || currency_prefix) {
                let separator = if currency_prefix { "" } else { " " };
                last.text = format!("{}{}{}", last.text, separator, word.text);
                last.bounding_box = last.bounding_box.union(&word.bounding_box);
                last.confidence = last.confidence.min(word.confidence);
                continue;
            }
        }
        merged.push(word);
    }

    merged
}

/// Greedy 1-D clustering: sorted positions open a new column whenever they
/// sit farther than `tolerance` from the current column's anchor.
pub fn cluster_columns(positions: &[f64], tolerance: f64) -> Vec<f64> {
    let mut sorted = positions.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mut anchors: Vec<f64> = Vec::new();
    for x in sorted {
        match anchors.last() {
            Some(anchor) if x - anchor <= tolerance => {}
            _ => anchors.push(x),
        }
    }
    anchors
}

/// Nearest anchor within `tolerance`, or a new trailing column.
pub fn assign_column(x: f64, anchors: &mut Vec<f64>, tolerance: f64) -> usize {
    let nearest = anchors
        .iter()
        .enumerate()
        .map(|(i, anchor)| (i, (x - anchor).abs()))
        .min_by(|a, b| a.1.total_cmp(&b.1));

    match nearest {
        Some((i, distance)) if distance <= tolerance => i,
        _ => {
            anchors.push(x);
            anchors.len() - 1
        }
    }
}

fn build_table(run: &[Line], context: &str, page: usize, config: &TableConfig) -> DetectedTable {
    let positions: Vec<f64> = run
        .iter()
        .flat_map(|(_, words)| words.iter().map(|w| w.bounding_box.x))
        .collect();
    let mut anchors = cluster_columns(&positions, config.column_tolerance);

    let mut rows = Vec::with_capacity(run.len());
    for (row, (_, words)) in run.iter().enumerate() {
        let mut columns: BTreeMap<usize, Vec<&PositionedWord>> = BTreeMap::new();
        for word in words {
            let column = assign_column(word.bounding_box.x, &mut anchors, config.assignment_tolerance);
            columns.entry(column).or_default().push(word);
        }

        let cells: Vec<TableCell> = columns
            .into_iter()
            .map(|(column, words)| TableCell {
                text: words.iter().map(|w| w.text.as_str()).join(" "),
                bounding_box: words
                    .iter()
                    .skip(1)
                    .fold(words[0].bounding_box, |acc, w| acc.union(&w.bounding_box)),
                row,
                column,
                is_header: row == 0,
            })
            .collect();
        rows.push(cells);
    }

    let headers: Vec<String> = rows
        .first()
        .map(|cells| cells.iter().map(|c| c.text.clone()).collect())
        .unwrap_or_default();
    let title = headers.join(" ");
    let bounding_box = rows
        .iter()
        .flatten()
        .map(|c| c.bounding_box)
        .reduce(|acc, b| acc.union(&b))
        .unwrap_or_default();
    let table_type = classify_table(&format!("{} {}", context, title));

    DetectedTable {
        title,
        headers,
        rows,
        bounding_box,
        page,
        table_type,
    }
}

pub fn classify_table(text: &str) -> TableType {
    if CASH_FLOW_RE.is_match(text) {
        TableType::CashFlow
    } else if BALANCE_SHEET_RE.is_match(text) {
        TableType::BalanceSheet
    } else if INCOME_STATEMENT_RE.is_match(text) {
        TableType::IncomeStatement
    } else {
        TableType::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BoundingBox;

    fn word(text: &str, x: f64, line: usize) -> PositionedWord {
        let width = text.len() as f64 * 6.0;
        PositionedWord::new(text, BoundingBox::new(x, line as f64 * 20.0, width, 10.0), line, 0)
    }

    fn statement_words() -> Vec<PositionedWord> {
        vec![
            word("CONSOLIDATED", 10.0, 0),
            word("BALANCE", 92.0, 0),
            word("SHEETS", 140.0, 0),
            word("Assets", 10.0, 1),
            word("2024", 300.0, 1),
            word("2023", 400.0, 1),
            word("Total", 10.0, 2),
            word("assets", 46.0, 2),
            word("98,100", 302.0, 2),
            word("91,000", 398.0, 2),
            word("Total", 10.0, 3),
            word("liabilities", 46.0, 3),
            word("45,200", 305.0, 3),
            word("44,000", 401.0, 3),
        ]
    }

    #[test]
    fn test_cluster_columns_with_tolerance() {
        let anchors = cluster_columns(&[300.0, 10.0, 305.0, 318.0, 321.0, 400.0], 20.0);
        assert_eq!(anchors, vec![10.0, 300.0, 321.0, 400.0]);
    }

    #[test]
    fn test_assign_column_falls_back_to_new_trailing_column() {
        let mut anchors = vec![10.0, 300.0];
        assert_eq!(assign_column(325.0, &mut anchors, 30.0), 1);
        assert_eq!(assign_column(500.0, &mut anchors, 30.0), 2);
        assert_eq!(anchors, vec![10.0, 300.0, 500.0]);
    }

    #[test]
    fn test_builds_balance_sheet_table() {
        let mut log = ParseLog::new();
        let tables = build_tables(&statement_words(), &TableConfig::default(), &mut log);
        assert_eq!(tables.len(), 1);

        let table = &tables[0];
        assert_eq!(table.table_type, TableType::BalanceSheet);
        assert_eq!(table.title, "Assets 2024 2023");
        assert_eq!(table.headers, vec!["Assets", "2024", "2023"]);
        assert_eq!(table.rows.len(), 3);
        assert!(table.rows[0].iter().all(|c| c.is_header));

        let liabilities: Vec<&str> = table.rows[2].iter().map(|c| c.text.as_str()).collect();
        assert_eq!(liabilities, vec!["Total liabilities", "45,200", "44,000"]);
        assert_eq!(table.rows[2][1].column, 1);
        assert!(!log.is_empty());
    }

    #[test]
    fn test_short_numeric_runs_are_not_tables() {
        let words: Vec<PositionedWord> = statement_words()
            .into_iter()
            .filter(|w| w.line_index < 3)
            .collect();
        let tables = build_tables(&words, &TableConfig::default(), &mut ParseLog::new());
        assert!(tables.is_empty());
    }

    #[test]
    fn test_pages_are_kept_apart() {
        let mut words = statement_words();
        for w in words.iter_mut().filter(|w| w.line_index >= 2) {
            w.page_index = 1;
        }
        let tables = build_tables(&words, &TableConfig::default(), &mut ParseLog::new());
        assert!(tables.is_empty());
    }

    #[test]
    fn test_currency_symbol_joins_amount() {
        let merged = merge_word_runs(
            vec![word("Cash", 10.0, 0), word("$", 290.0, 0), word("1,200", 298.0, 0)],
            12.0,
        );
        let texts: Vec<&str> = merged.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["Cash", "$1,200"]);
    }

    #[test]
    fn test_classify_table() {
        assert_eq!(classify_table("Net cash provided by operating activities"), TableType::CashFlow);
        assert_eq!(classify_table("Total revenues 2024 2023"), TableType::IncomeStatement);
        assert_eq!(classify_table("Segment 2024 2023"), TableType::Unknown);
    }
}
