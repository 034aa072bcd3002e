use crate::core::{FieldKey, FinancialSchema, ParseLog};

const LIABILITIES_ASSETS_MARGIN: f64 = 0.01;
const INCOME_REVENUE_RATIO: f64 = 1.2;

/// Unsets values that break hard accounting bounds relative to other
/// extracted values. Offending slots are cleared, never corrected.
pub fn filter_implausible(schema: &mut FinancialSchema, log: &mut ParseLog) {
    if let (Some(assets), Some(liabilities)) = (
        schema.value(FieldKey::AssetsTotal),
        schema.value(FieldKey::LiabilitiesTotal),
    ) {
        if assets != 0.0 && ((assets - liabilities) / assets).abs() <= LIABILITIES_ASSETS_MARGIN {
            schema.clear(FieldKey::LiabilitiesTotal);
            log.push(format!(
                "Discarded liabilities.total {:.0}: within 1% of assets.total {:.0}",
                liabilities, assets
            ));
        }
    }

    if let Some(assets) = schema.value(FieldKey::AssetsTotal) {
        let cash = schema.value(FieldKey::AssetsCash).unwrap_or(0.0);
        let securities = schema.value(FieldKey::AssetsMarketableSecurities).unwrap_or(0.0);
        if cash > assets || securities > assets {
            for key in [FieldKey::AssetsCash, FieldKey::AssetsMarketableSecurities] {
                if let Some(removed) = schema.clear(key) {
                    log.push(format!(
                        "Discarded {} {:.0}: cash or securities exceed assets.total {:.0}",
                        key, removed.value, assets
                    ));
                }
            }
        }
    }

    if let Some(revenue) = schema.value(FieldKey::RevenuesTotal) {
        let ceiling = revenue * INCOME_REVENUE_RATIO;
        let operating = schema.value(FieldKey::IncomeOperatingIncome).unwrap_or(f64::MIN);
        let net = schema.value(FieldKey::IncomeNetIncome).unwrap_or(f64::MIN);
        if operating > ceiling || net > ceiling {
            for key in [FieldKey::IncomeOperatingIncome, FieldKey::IncomeNetIncome] {
                if let Some(removed) = schema.clear(key) {
                    log.push(format!(
                        "Discarded {} {:.0}: income exceeds 1.2x revenues.total {:.0}",
                        key, removed.value, revenue
                    ));
                }
            }
        }

        if let Some(rnd) = schema.value(FieldKey::ExpensesResearchDevelopment) {
            if rnd > revenue {
                schema.clear(FieldKey::ExpensesResearchDevelopment);
                log.push(format!(
                    "Discarded expenses.research_development {:.0}: exceeds revenues.total {:.0}",
                    rnd, revenue
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ExtractionCandidate;

    fn schema_with(values: &[(FieldKey, f64)]) -> FinancialSchema {
        let mut schema = FinancialSchema::new();
        for (key, value) in values {
            schema.set(*key, ExtractionCandidate::new(*value, "test", 90, 0));
        }
        schema
    }

    fn filter(schema: &mut FinancialSchema) -> ParseLog {
        let mut log = ParseLog::new();
        filter_implausible(schema, &mut log);
        log
    }

    #[test]
    fn test_liabilities_close_to_assets_are_dropped() {
        let mut schema = schema_with(&[
            (FieldKey::AssetsTotal, 900_000_000_000.0),
            (FieldKey::LiabilitiesTotal, 899_500_000_000.0),
        ]);
        let log = filter(&mut schema);
        assert!(!schema.contains(FieldKey::LiabilitiesTotal));
        assert!(schema.contains(FieldKey::AssetsTotal));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_reasonable_liabilities_survive() {
        let mut schema = schema_with(&[(FieldKey::AssetsTotal, 100e9), (FieldKey::LiabilitiesTotal, 60e9)]);
        let log = filter(&mut schema);
        assert!(schema.contains(FieldKey::LiabilitiesTotal));
        assert!(log.is_empty());
    }

    #[test]
    fn test_cash_and_securities_bounded_by_assets() {
        let mut schema = schema_with(&[
            (FieldKey::AssetsTotal, 50e9),
            (FieldKey::AssetsCash, 10e9),
            (FieldKey::AssetsMarketableSecurities, 70e9),
        ]);
        filter(&mut schema);
        assert!(!schema.contains(FieldKey::AssetsCash));
        assert!(!schema.contains(FieldKey::AssetsMarketableSecurities));
    }

    #[test]
    fn test_income_bounded_by_revenue() {
        let mut schema = schema_with(&[
            (FieldKey::RevenuesTotal, 100e9),
            (FieldKey::IncomeOperatingIncome, 30e9),
            (FieldKey::IncomeNetIncome, 130e9),
            (FieldKey::ExpensesResearchDevelopment, 20e9),
        ]);
        filter(&mut schema);
        assert!(!schema.contains(FieldKey::IncomeOperatingIncome));
        assert!(!schema.contains(FieldKey::IncomeNetIncome));
        assert!(schema.contains(FieldKey::ExpensesResearchDevelopment));
    }

    #[test]
    fn test_research_bounded_by_revenue() {
        let mut schema = schema_with(&[
            (FieldKey::RevenuesTotal, 10e9),
            (FieldKey::ExpensesResearchDevelopment, 12e9),
        ]);
        filter(&mut schema);
        assert!(!schema.contains(FieldKey::ExpensesResearchDevelopment));
    }

    #[test]
    fn test_lone_values_are_untouched() {
        let mut schema = schema_with(&[(FieldKey::LiabilitiesTotal, 10e9), (FieldKey::IncomeNetIncome, 5e9)]);
        filter(&mut schema);
        assert_eq!(schema.populated_count(), 2);
    }
}
