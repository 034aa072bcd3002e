use once_cell::sync::Lazy;
use regex::Regex;

use super::fields::FieldSpec;
use super::number::{is_numeric_token, is_year_like, numeric_tokens, parse_amount};
use super::text::char_window;
use crate::core::config::{ConfidenceConfig, SectionConfig};
use crate::core::{DetectedTable, DocumentScale, ExtractionCandidate, ParseLog, TableType};

static SECTION_HEADERS: Lazy<Vec<(TableType, Regex)>> = Lazy::new(|| {
    vec![
        (
            TableType::BalanceSheet,
            Regex::new(r"(?i)consolidated\s+balance\s+sheets?|consolidated\s+statements?\s+of\s+financial\s+(?:position|condition)").unwrap(),
        ),
        (
            TableType::IncomeStatement,
            Regex::new(r"(?i)consolidated\s+statements?\s+of\s+(?:income|operations|earnings)").unwrap(),
        ),
        (
            TableType::CashFlow,
            Regex::new(r"(?i)consolidated\s+statements?\s+of\s+cash\s+flows?").unwrap(),
        ),
    ]
});

static SECTION_STOP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)see\s+(?:the\s+)?accompanying\s+notes|the\s+accompanying\s+notes|notes\s+to\s+(?:the\s+)?(?:condensed\s+)?consolidated\s+financial\s+statements|consolidated\s+statements?\s+of\s+(?:comprehensive|stockholders|shareholders|changes)",
    )
    .unwrap()
});

static TABLE_SPACING: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S(?: {2,}|\t)\S").unwrap());

static NOTE_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\(\s*notes?\s+\d{1,2}[a-z]?(?:\s*(?:,|and|&)\s*\d{1,2}[a-z]?)*\s*\)|\bnote\s+\d{1,2}[a-z]?\b").unwrap()
});

const PAGE_BREAK: char = '\x0c';

/// A consolidated statement block located by its heading.
#[derive(Debug, Clone)]
pub struct StatementSection<'a> {
    pub kind: TableType,
    pub offset: usize,
    pub text: &'a str,
}

/// Finds consolidated statement blocks: each runs from its heading for at
/// most `section_chars` characters, cut short at a stop marker or the next
/// statement heading.
pub fn locate_sections<'a>(text: &'a str, config: &SectionConfig) -> Vec<StatementSection<'a>> {
    let mut sections = Vec::new();

    for (kind, header) in SECTION_HEADERS.iter() {
        for found in header.find_iter(text) {
            let offset = found.end();
            let window = char_window(&text[offset..], config.section_chars);

            let next_header = SECTION_HEADERS
                .iter()
                .filter_map(|(_, re)| re.find(window).map(|m| m.start()));
            let stop = SECTION_STOP.find(window).map(|m| m.start());
            let end = next_header.chain(stop).min().unwrap_or(window.len());

            sections.push(StatementSection {
                kind: *kind,
                offset,
                text: &window[..end],
            });
        }
    }

    sections.sort_by_key(|s| s.offset);
    sections
}

#[derive(Default)]
struct LineMatches {
    same_line: Vec<ExtractionCandidate>,
    next_line: Vec<ExtractionCandidate>,
}

/// Locates candidates for one field at a time from tables and raw text.
pub struct FieldExtractor<'a> {
    text: &'a str,
    tables: &'a [DetectedTable],
    sections: Vec<StatementSection<'a>>,
    captured_chars: usize,
    scale: DocumentScale,
    confidence: &'a ConfidenceConfig,
    sparse_threshold: usize,
}

impl<'a> FieldExtractor<'a> {
    pub fn new(
        text: &'a str,
        tables: &'a [DetectedTable],
        scale: DocumentScale,
        confidence: &'a ConfidenceConfig,
        sections: &SectionConfig,
    ) -> Self {
        let located = locate_sections(text, sections);
        let captured_chars = located.iter().map(|s| s.text.chars().count()).sum();
        Self {
            text,
            tables,
            sections: located,
            captured_chars,
            scale,
            confidence,
            sparse_threshold: sections.sparse_threshold,
        }
    }

    pub fn sections(&self) -> &[StatementSection<'a>] {
        &self.sections
    }

    pub fn captured_chars(&self) -> usize {
        self.captured_chars
    }

    /// Best candidate for `spec` across tables and text, or `None`.
    pub fn extract(&self, spec: &FieldSpec, log: &mut ParseLog) -> Option<ExtractionCandidate> {
        let mut pool = self.table_candidates(spec);
        let from_tables = pool.len();
        pool.extend(self.text_candidates(spec));

        let total = pool.len();
        match select_best(spec, pool) {
            Some(best) => {
                log.push(format!(
                    "{}: selected {} from {} candidate(s) ({} from tables) via {} at confidence {}",
                    spec.key,
                    best.value,
                    total,
                    from_tables,
                    best.source,
                    best.confidence
                ));
                Some(best)
            }
            None => {
                log.push(format!("{}: not found", spec.key));
                None
            }
        }
    }

    /// Label cell followed by the leftmost in-range numeric cell to its right.
    pub fn table_candidates(&self, spec: &FieldSpec) -> Vec<ExtractionCandidate> {
        let mut candidates = Vec::new();

        for table in self.tables {
            for row in &table.rows {
                let mut cells: Vec<_> = row.iter().collect();
                cells.sort_by(|a, b| a.bounding_box.x.total_cmp(&b.bounding_box.x));

                let Some(label_idx) = cells.iter().position(|c| spec.match_label(&c.text).is_some())
                else {
                    continue;
                };
                let label = cells[label_idx];

                let numeric: Vec<_> = cells[label_idx + 1..]
                    .iter()
                    .filter(|c| is_numeric_token(&c.text))
                    .collect();
                let Some((cell, value)) = numeric.iter().find_map(|c| {
                    parse_amount(&c.text, &self.scale)
                        .filter(|v| spec.within_bounds(*v))
                        .map(|v| (*c, v))
                }) else {
                    continue;
                };

                let mut confidence = if numeric.len() == 1 {
                    self.confidence.table_unique
                } else {
                    self.confidence.table_multiple
                };
                if cell.column.abs_diff(label.column) <= self.confidence.table_adjacent_columns {
                    confidence = confidence.saturating_add(self.confidence.table_adjacent_bonus);
                }

                let row_text = cells.iter().map(|c| c.text.as_str()).collect::<Vec<_>>().join(" | ");
                candidates.push(
                    ExtractionCandidate::new(
                        value,
                        format!("table '{}' page {} row {}", table.title, table.page, label.row),
                        confidence,
                        table.page,
                    )
                    .with_bounding_box(cell.bounding_box)
                    .with_context(&row_text),
                );
            }
        }

        candidates
    }

    /// Consolidated sections first; the whole document only when they are
    /// sparse or produced nothing. Same-line hits inside a consolidated
    /// section win outright over every other text candidate.
    pub fn text_candidates(&self, spec: &FieldSpec) -> Vec<ExtractionCandidate> {
        let mut consolidated = LineMatches::default();
        for section in &self.sections {
            let found = self.scan_block(spec, section.text, section.offset, Some(section.kind));
            consolidated.same_line.extend(found.same_line);
            consolidated.next_line.extend(found.next_line);
        }

        if !consolidated.same_line.is_empty() {
            return consolidated.same_line;
        }

        let mut candidates = consolidated.next_line;
        if candidates.is_empty() || self.captured_chars < self.sparse_threshold {
            let full = self.scan_block(spec, self.text, 0, None);
            candidates.extend(full.same_line);
            candidates.extend(full.next_line);
        }
        candidates
    }

    fn scan_block(
        &self,
        spec: &FieldSpec,
        block: &str,
        offset: usize,
        section: Option<TableType>,
    ) -> LineMatches {
        let mut found = LineMatches::default();
        let lines: Vec<&str> = block.split('\n').collect();
        let mut page = self.text[..offset].matches(PAGE_BREAK).count();

        let (same_base, next_base, origin) = match section {
            Some(kind) => (
                self.confidence.same_line_consolidated,
                self.confidence.next_line_consolidated,
                format!("consolidated {} section", kind),
            ),
            None => (
                self.confidence.same_line_full,
                self.confidence.next_line_full,
                "full text".to_string(),
            ),
        };

        for (i, line) in lines.iter().enumerate() {
            page += line.matches(PAGE_BREAK).count();

            let Some(label_end) = spec.match_label(line) else {
                continue;
            };

            if let Some(value) = self.first_amount(spec, &line[label_end..]) {
                let mut confidence = self.size_bonus(same_base, value);
                if TABLE_SPACING.is_match(line.trim()) {
                    confidence = confidence.saturating_add(self.confidence.spacing_bonus);
                }
                found.same_line.push(
                    ExtractionCandidate::new(value, format!("{}, same line", origin), confidence, page)
                        .with_context(line),
                );
                continue;
            }

            let next = lines[i + 1..].iter().find(|l| !l.trim().is_empty());
            if let Some(next) = next.filter(|l| starts_with_amount(l)) {
                if let Some(value) = self.first_amount(spec, next) {
                    found.next_line.push(
                        ExtractionCandidate::new(
                            value,
                            format!("{}, next line", origin),
                            self.size_bonus(next_base, value),
                            page,
                        )
                        .with_context(&format!("{} / {}", line.trim(), next.trim())),
                    );
                }
            }
        }

        found
    }

    /// First in-range amount in `text`, skipping year headings and "Note N"
    /// references.
    fn first_amount(&self, spec: &FieldSpec, text: &str) -> Option<f64> {
        let text = NOTE_REFERENCE.replace_all(text, " ");
        numeric_tokens(&text)
            .into_iter()
            .filter(|t| !is_year_like(t))
            .filter_map(|t| parse_amount(t, &self.scale))
            .find(|v| spec.within_bounds(*v))
    }

    fn size_bonus(&self, base: u8, value: f64) -> u8 {
        if value.abs() > self.confidence.large_value_threshold {
            base.saturating_add(self.confidence.large_value_bonus)
        } else {
            base
        }
    }
}

/// A continuation line carrying only values, no label of its own.
fn starts_with_amount(line: &str) -> bool {
    line.trim_start()
        .chars()
        .next()
        .map(|c| c.is_ascii_digit() || matches!(c, '$' | '(' | '-'))
        .unwrap_or(false)
}

/// Picks the top candidate. Critical fields prefer the larger magnitude when
/// two candidates differ by more than half of the larger; otherwise higher
/// confidence wins. Ties keep pool order.
pub fn select_best(spec: &FieldSpec, candidates: Vec<ExtractionCandidate>) -> Option<ExtractionCandidate> {
    let critical = spec.is_critical();
    candidates
        .into_iter()
        .filter(|c| spec.within_bounds(c.value))
        .reduce(|best, challenger| {
            if outranks(&challenger, &best, critical) {
                challenger
            } else {
                best
            }
        })
}

fn outranks(challenger: &ExtractionCandidate, incumbent: &ExtractionCandidate, critical: bool) -> bool {
    if critical {
        let (a, b) = (challenger.value.abs(), incumbent.value.abs());
        let larger = a.max(b);
        if larger > 0.0 && (a - b).abs() > 0.5 * larger {
            return a > b;
        }
    }
    challenger.confidence > incumbent.confidence
}
