use crate::core::{FieldKey, FinancialSchema, ParseLog};

const BALANCE_TOLERANCE: f64 = 0.05;
const NET_TO_OPERATING_RATIO: f64 = 1.5;

/// Advisory warnings for soft inconsistencies. Nothing is modified.
pub fn validate(schema: &FinancialSchema, log: &mut ParseLog) -> Vec<String> {
    let mut warnings = Vec::new();
    let value = |key| schema.value(key);

    if let (Some(assets), Some(liabilities), Some(equity)) = (
        value(FieldKey::AssetsTotal),
        value(FieldKey::LiabilitiesTotal),
        value(FieldKey::EquityTotal),
    ) {
        let difference = (assets - (liabilities + equity)).abs();
        if difference > assets.abs() * BALANCE_TOLERANCE {
            warnings.push(format!(
                "Balance sheet does not balance: assets {:.0} vs liabilities + equity {:.0} (off by {:.1}%)",
                assets,
                liabilities + equity,
                difference / assets.abs() * 100.0
            ));
        }
    }

    if let Some(gross_profit) = value(FieldKey::RevenuesGrossProfit) {
        if gross_profit < 0.0 {
            warnings.push(format!("Gross profit is negative: {:.0}", gross_profit));
        }
        if let Some(revenue) = value(FieldKey::RevenuesTotal) {
            if gross_profit > revenue {
                warnings.push(format!(
                    "Gross profit {:.0} exceeds revenue {:.0}",
                    gross_profit, revenue
                ));
            }
        }
    }

    if let (Some(operating), Some(gross_profit)) = (
        value(FieldKey::IncomeOperatingIncome),
        value(FieldKey::RevenuesGrossProfit),
    ) {
        if operating > gross_profit {
            warnings.push(format!(
                "Operating income {:.0} exceeds gross profit {:.0}",
                operating, gross_profit
            ));
        }
    }

    if let (Some(net), Some(operating)) = (value(FieldKey::IncomeNetIncome), value(FieldKey::IncomeOperatingIncome)) {
        // A net profit on an operating loss also trips this.
        if net > 0.0 && net > operating * NET_TO_OPERATING_RATIO {
            warnings.push(format!(
                "Net income {:.0} exceeds 1.5x operating income {:.0}",
                net, operating
            ));
        }
    }

    if let Some(assets) = value(FieldKey::AssetsTotal) {
        let cash = value(FieldKey::AssetsCash);
        let securities = value(FieldKey::AssetsMarketableSecurities);
        if cash.is_some() || securities.is_some() {
            let liquid = cash.unwrap_or(0.0) + securities.unwrap_or(0.0);
            if liquid > assets {
                warnings.push(format!(
                    "Cash and marketable securities {:.0} exceed total assets {:.0}",
                    liquid, assets
                ));
            }
        }
    }

    for warning in &warnings {
        log::warn!("{}", warning);
    }
    log.push(format!("Validation produced {} warning(s)", warnings.len()));
    warnings
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

    fn warnings_for(values: &[(FieldKey, f64)]) -> Vec<String> {
        validate(&schema_with(values), &mut ParseLog::new())
    }

    #[test]
    fn test_consistent_statements_have_no_warnings() {
        let warnings = warnings_for(&[
            (FieldKey::AssetsTotal, 100e9),
            (FieldKey::LiabilitiesTotal, 60e9),
            (FieldKey::EquityTotal, 41e9),
            (FieldKey::AssetsCash, 20e9),
            (FieldKey::RevenuesTotal, 80e9),
            (FieldKey::RevenuesGrossProfit, 30e9),
            (FieldKey::IncomeOperatingIncome, 20e9),
            (FieldKey::IncomeNetIncome, 15e9),
        ]);
        assert!(warnings.is_empty(), "{:?}", warnings);
    }

    #[test]
    fn test_imbalance_beyond_tolerance() {
        let warnings = warnings_for(&[
            (FieldKey::AssetsTotal, 100e9),
            (FieldKey::LiabilitiesTotal, 60e9),
            (FieldKey::EquityTotal, 30e9),
        ]);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Balance sheet"));
    }

    #[test]
    fn test_gross_profit_warnings() {
        assert_eq!(warnings_for(&[(FieldKey::RevenuesGrossProfit, -5e9)]).len(), 1);
        assert_eq!(
            warnings_for(&[(FieldKey::RevenuesTotal, 10e9), (FieldKey::RevenuesGrossProfit, 12e9)]).len(),
            1
        );
    }

    #[test]
    fn test_income_ordering_warnings() {
        let warnings = warnings_for(&[
            (FieldKey::RevenuesGrossProfit, 10e9),
            (FieldKey::IncomeOperatingIncome, 12e9),
            (FieldKey::IncomeNetIncome, 20e9),
        ]);
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_net_profit_on_operating_loss_is_flagged() {
        let warnings = warnings_for(&[(FieldKey::IncomeOperatingIncome, -2e9), (FieldKey::IncomeNetIncome, 1e9)]);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Net income"));

        let losses = warnings_for(&[(FieldKey::IncomeOperatingIncome, -2e9), (FieldKey::IncomeNetIncome, -1e9)]);
        assert!(losses.is_empty());
    }

    #[test]
    fn test_liquid_assets_exceed_total() {
        let warnings = warnings_for(&[
            (FieldKey::AssetsTotal, 10e9),
            (FieldKey::AssetsCash, 6e9),
            (FieldKey::AssetsMarketableSecurities, 5e9),
        ]);
        assert_eq!(warnings.len(), 1);
    }
}
