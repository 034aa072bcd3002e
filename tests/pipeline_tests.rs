use statement_extractor::core::audit::message_of;
use statement_extractor::core::{BoundingBox, ParseResult, ScaleUnit, TableType};
use statement_extractor::{input, parse, FieldKey, ParsePipeline, ParserConfig, PositionedWord};
use std::fs;
use tempfile::tempdir;

fn word(text: &str, x: f64, line: usize) -> PositionedWord {
    let width = text.len() as f64 * 6.0;
    PositionedWord::new(text, BoundingBox::new(x, line as f64 * 20.0, width, 10.0), line, 0)
}

fn liabilities_words() -> Vec<PositionedWord> {
    vec![
        word("CONSOLIDATED", 10.0, 0),
        word("BALANCE", 92.0, 0),
        word("SHEETS", 140.0, 0),
        word("Liabilities", 10.0, 1),
        word("2024", 300.0, 1),
        word("2023", 400.0, 1),
        word("Accounts", 10.0, 2),
        word("payable", 64.0, 2),
        word("12,000", 300.0, 2),
        word("11,000", 400.0, 2),
        word("Total", 10.0, 3),
        word("liabilities", 46.0, 3),
        word("45,200", 300.0, 3),
        word("2024", 400.0, 3),
    ]
}

fn without_timestamps(mut result: ParseResult) -> ParseResult {
    result.parse_log = result
        .parse_log
        .iter()
        .map(|line| message_of(line).to_string())
        .collect();
    result
}

#[test]
fn test_text_only_revenue_uses_declared_scale() {
    let result = parse("(in millions)\nTotal revenues  125,843", None);

    let revenue = result.schema.get(FieldKey::RevenuesTotal).unwrap();
    assert_eq!(revenue.value, 125_843_000_000.0);
    assert!(revenue.confidence >= 80);
    assert!(result.tables_detected.is_empty());
    assert_eq!(result.scale.unit, ScaleUnit::Millions);
}

#[test]
fn test_billions_scale_keeps_small_amounts() {
    let result = parse("(in billions)\nTotal revenues   94\nNet income   23\nTotal assets   352\n", None);

    assert_eq!(result.scale.unit, ScaleUnit::Billions);
    assert_eq!(result.schema.value(FieldKey::RevenuesTotal), Some(94e9));
    assert_eq!(result.schema.value(FieldKey::IncomeNetIncome), Some(23e9));
    assert_eq!(result.schema.value(FieldKey::AssetsTotal), Some(352e9));
}

#[test]
fn test_operating_loss_parsed_as_negative() {
    let result = parse("(in millions)\nTotal revenues   9,000\nOperating loss   (2,000)\n", None);
    assert_eq!(result.schema.value(FieldKey::IncomeOperatingIncome), Some(-2e9));
}

#[test]
fn test_table_value_nearest_label_wins_over_year() {
    let words = liabilities_words();
    let result = parse("", Some(&words[..]));

    assert_eq!(result.tables_detected.len(), 1);
    let table = &result.tables_detected[0];
    assert_eq!(table.table_type, TableType::BalanceSheet);
    let last_row: Vec<&str> = table.rows[2].iter().map(|c| c.text.as_str()).collect();
    assert_eq!(last_row, vec!["Total liabilities", "45,200", "2024"]);

    // No scale declaration: the millions default applies.
    assert!(!result.scale.detected);
    let liabilities = result.schema.get(FieldKey::LiabilitiesTotal).unwrap();
    assert_eq!(liabilities.value, 45_200_000_000.0);
    assert!(liabilities.source.starts_with("table"));
    assert_eq!(result.schema.value(FieldKey::LiabilitiesAccountsPayable), Some(12_000_000_000.0));
}

#[test]
fn test_free_cash_flow_subtracts_capex_magnitude() {
    let text = "(in millions)\nCONSOLIDATED STATEMENTS OF CASH FLOWS\n\
Net cash provided by operating activities   110,000\n\
Purchases of property and equipment   (10,000)\n\
See accompanying notes\n";
    let result = parse(text, None);

    assert_eq!(result.schema.value(FieldKey::CashFlowOperating), Some(110e9));
    assert_eq!(result.schema.value(FieldKey::CashFlowCapex), Some(-10e9));
    let fcf = result.schema.get(FieldKey::CashFlowFreeCashFlow).unwrap();
    assert_eq!(fcf.value, 100e9);
    assert_eq!(fcf.confidence, 95);
}

#[test]
fn test_liabilities_matching_assets_are_discarded() {
    let result = parse("(in millions)\nTotal assets   900,000\nTotal liabilities   899,500\n", None);

    assert_eq!(result.schema.value(FieldKey::AssetsTotal), Some(900e9));
    assert!(!result.schema.contains(FieldKey::LiabilitiesTotal));
    assert!(!result.schema.contains(FieldKey::EquityTotal));
    assert!(result
        .parse_log
        .iter()
        .any(|line| message_of(line).starts_with("Discarded liabilities.total")));
}

#[test]
fn test_equity_is_derived_when_missing() {
    let result = parse("(in millions)\nTotal assets   100,000\nTotal liabilities   40,000\n", None);

    let equity = result.schema.get(FieldKey::EquityTotal).unwrap();
    assert_eq!(equity.value, 60e9);
    assert_eq!(equity.confidence, 90);
    assert!(equity.source.contains("derived"));
    assert!(result.warnings.is_empty());
}

#[test]
fn test_parse_is_idempotent_apart_from_timestamps() {
    let words = liabilities_words();
    let text = "(in thousands)\nCONSOLIDATED STATEMENTS OF OPERATIONS\nTotal revenues  125,843\nNet income  9,000\n";

    let first = without_timestamps(parse(text, Some(&words[..])));
    let second = without_timestamps(parse(text, Some(&words[..])));
    assert_eq!(first, second);
}

#[test]
fn test_empty_input_is_not_an_error() {
    let result = parse("", None);

    assert_eq!(result.schema.populated_count(), 0);
    assert_eq!(result.confidence_score, 0);
    assert!(result.warnings.is_empty());
    assert!(result.tables_detected.is_empty());
    assert_eq!(result.metadata.company_name, "");
    assert!(!result.parse_log.is_empty());
}

#[test]
fn test_legacy_projection() {
    let text = "FORM 10-K\nFor the fiscal year ended December 31, 2023\n(in millions)\n\
Total revenues   80,000\nNet income   12,000\n";
    let legacy = parse(text, None).to_legacy_json();

    assert_eq!(legacy["document_type"], "10-K");
    assert_eq!(legacy["period_end_date"], "2023-12-31");
    assert_eq!(legacy["fiscal_year"], "2023");
    assert_eq!(legacy["revenues_total"], 80e9);
    assert_eq!(legacy["income_net_income"], 12e9);
    assert!(legacy["warnings"].as_array().unwrap().is_empty());
}

#[test]
fn test_inputs_loaded_from_disk() {
    let dir = tempdir().unwrap();
    let text_path = dir.path().join("filing.txt");
    let words_path = dir.path().join("words.json");
    let config_path = dir.path().join("config.json");

    fs::write(&text_path, "").unwrap();
    fs::write(&words_path, serde_json::to_string(&liabilities_words()).unwrap()).unwrap();
    fs::write(&config_path, r#"{"table": {"column_tolerance": 15.0}}"#).unwrap();

    let config = ParserConfig::from_file(&config_path).unwrap();
    assert_eq!(config.table.column_tolerance, 15.0);
    assert_eq!(config.table.assignment_tolerance, 30.0);

    let text = input::load_text(&text_path).unwrap();
    let words = input::load_positioned_words(&words_path).unwrap();
    let result = ParsePipeline::new(config).parse(&text, Some(&words[..]));

    assert_eq!(result.schema.value(FieldKey::LiabilitiesTotal), Some(45_200_000_000.0));
}
