use html_escape::decode_html_entities;
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static SCRIPT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<script.*?</script>").unwrap());
static STYLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<style.*?</style>").unwrap());
static BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<br\s*/?>|</p>|</div>|</tr>|</h\d>").unwrap());
static CELL_END_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</t[dh]>").unwrap());
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"</?[A-Za-z][^>]*>").unwrap());

/// Normalizes OCR or HTML-derived filing text without collapsing the
/// horizontal spacing that marks table-like lines.
pub fn normalize_text(content: &str) -> String {
    let mut text = content.replace("\r\n", "\n").replace('\r', "\n");

    if TAG_RE.is_match(&text) {
        text = SCRIPT_RE.replace_all(&text, "").into_owned();
        text = STYLE_RE.replace_all(&text, "").into_owned();
        text = BREAK_RE.replace_all(&text, "\n").into_owned();
        text = CELL_END_RE.replace_all(&text, "  ").into_owned();
        text = TAG_RE.replace_all(&text, "").into_owned();
    }

    text = decode_html_entities(&text).into_owned();

    // NFKC folds non-breaking spaces and full-width digits into ASCII.
    text = text.nfkc().collect::<String>();
    text = text.replace(['\u{2212}', '\u{2013}'], "-");

    // Form feeds mark page breaks and must survive trimming.
    text.lines()
        .map(|line| line.trim_end_matches(|c: char| c.is_whitespace() && c != '\x0c'))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The first `n` characters of `text`.
pub fn char_window(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
