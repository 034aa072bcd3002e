use crate::core::config::ScoringConfig;
use crate::core::{FieldKey, FinancialSchema, ParseLog};

pub const CRITICAL_FIELDS: [FieldKey; 5] = [
    FieldKey::RevenuesTotal,
    FieldKey::IncomeNetIncome,
    FieldKey::AssetsTotal,
    FieldKey::LiabilitiesTotal,
    FieldKey::EquityTotal,
];

pub const IMPORTANT_FIELDS: [FieldKey; 4] = [
    FieldKey::IncomeOperatingIncome,
    FieldKey::CashFlowOperating,
    FieldKey::AssetsCash,
    FieldKey::RevenuesGrossProfit,
];

pub const OPTIONAL_FIELDS: [FieldKey; 4] = [
    FieldKey::CashFlowCapex,
    FieldKey::ExpensesResearchDevelopment,
    FieldKey::AssetsCurrent,
    FieldKey::LiabilitiesCurrent,
];

/// 0-100 completeness score: weighted field presence minus a capped
/// per-warning penalty.
pub fn score(schema: &FinancialSchema, warning_count: usize, config: &ScoringConfig, log: &mut ParseLog) -> u8 {
    let tiers = [
        (&CRITICAL_FIELDS[..], config.critical_weight),
        (&IMPORTANT_FIELDS[..], config.important_weight),
        (&OPTIONAL_FIELDS[..], config.optional_weight),
    ];

    let mut achieved = 0u32;
    let mut total = 0u32;
    for (fields, weight) in tiers {
        for key in fields {
            total += weight;
            if schema.contains(*key) {
                achieved += weight;
            }
        }
    }

    let completeness = if total == 0 {
        0
    } else {
        (100.0 * f64::from(achieved) / f64::from(total)).round() as i64
    };
    let penalty = (u64::from(config.warning_penalty) * warning_count as u64).min(u64::from(config.max_warning_penalty));
    let score = (completeness - penalty as i64).clamp(0, 100) as u8;

    log.push(format!(
        "Confidence score {} (weight {}/{}, {} warning(s), penalty {})",
        score, achieved, total, warning_count, penalty
    ));
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ExtractionCandidate;

    fn schema_with(keys: &[FieldKey]) -> FinancialSchema {
        let mut schema = FinancialSchema::new();
        for key in keys {
            schema.set(*key, ExtractionCandidate::new(1e9, "test", 90, 0));
        }
        schema
    }

    fn all_weighted() -> Vec<FieldKey> {
        CRITICAL_FIELDS
            .iter()
            .chain(IMPORTANT_FIELDS.iter())
            .chain(OPTIONAL_FIELDS.iter())
            .copied()
            .collect()
    }

    #[test]
    fn test_full_and_empty_schemas() {
        let config = ScoringConfig::default();
        let full = schema_with(&all_weighted());
        assert_eq!(score(&full, 0, &config, &mut ParseLog::new()), 100);
        assert_eq!(score(&FinancialSchema::new(), 0, &config, &mut ParseLog::new()), 0);
    }

    #[test]
    fn test_weights() {
        let config = ScoringConfig::default();
        // 3 of 27
        let schema = schema_with(&[FieldKey::RevenuesTotal]);
        assert_eq!(score(&schema, 0, &config, &mut ParseLog::new()), 11);
        // 15 of 27
        let schema = schema_with(&CRITICAL_FIELDS);
        assert_eq!(score(&schema, 0, &config, &mut ParseLog::new()), 56);
    }

    #[test]
    fn test_warning_penalty_is_capped_and_clamped() {
        let config = ScoringConfig::default();
        let full = schema_with(&all_weighted());
        assert_eq!(score(&full, 2, &config, &mut ParseLog::new()), 90);
        assert_eq!(score(&full, 10, &config, &mut ParseLog::new()), 80);
        assert_eq!(score(&FinancialSchema::new(), 3, &config, &mut ParseLog::new()), 0);
    }

    #[test]
    fn test_unweighted_fields_do_not_count() {
        let schema = schema_with(&[FieldKey::AssetsGoodwill, FieldKey::CashFlowFreeCashFlow]);
        assert_eq!(score(&schema, 0, &ScoringConfig::default(), &mut ParseLog::new()), 0);
    }
}
