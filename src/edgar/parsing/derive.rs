use crate::core::config::ConfidenceConfig;
use crate::core::{ExtractionCandidate, FieldKey, FinancialSchema, ParseLog};

/// Fills empty aggregate slots from accounting identities. Existing values
/// are never overwritten.
pub fn derive_relationships(schema: &mut FinancialSchema, config: &ConfidenceConfig, log: &mut ParseLog) {
    derive_equity(schema, config, log);
    derive_gross_profit(schema, config, log);
    derive_free_cash_flow(schema, config, log);
}

fn inputs(schema: &FinancialSchema, a: FieldKey, b: FieldKey) -> Option<(f64, f64, usize)> {
    let first = schema.get(a)?;
    let second = schema.get(b)?;
    Some((first.value, second.value, first.page))
}

fn derive_equity(schema: &mut FinancialSchema, config: &ConfidenceConfig, log: &mut ParseLog) {
    if schema.contains(FieldKey::EquityTotal) {
        return;
    }
    let Some((assets, liabilities, page)) = inputs(schema, FieldKey::AssetsTotal, FieldKey::LiabilitiesTotal) else {
        return;
    };

    let equity = assets - liabilities;
    if equity > 0.0 {
        schema.set(
            FieldKey::EquityTotal,
            ExtractionCandidate::new(equity, "derived from assets − liabilities", config.derived, page),
        );
        log.push(format!("Derived equity.total = {:.0} from assets − liabilities", equity));
    } else {
        log.push(format!("Skipped equity derivation: assets − liabilities = {:.0}", equity));
    }
}

fn derive_gross_profit(schema: &mut FinancialSchema, config: &ConfidenceConfig, log: &mut ParseLog) {
    if schema.contains(FieldKey::RevenuesGrossProfit) {
        return;
    }
    let Some((revenue, cost, page)) = inputs(schema, FieldKey::RevenuesTotal, FieldKey::RevenuesCostOfRevenue) else {
        return;
    };

    let gross_profit = revenue - cost;
    if gross_profit > 0.0 && gross_profit < revenue {
        schema.set(
            FieldKey::RevenuesGrossProfit,
            ExtractionCandidate::new(
                gross_profit,
                "derived from revenue − cost of revenue",
                config.derived,
                page,
            ),
        );
        log.push(format!(
            "Derived revenues.gross_profit = {:.0} from revenue − cost of revenue",
            gross_profit
        ));
    } else {
        log.push(format!(
            "Skipped gross profit derivation: revenue − cost = {:.0} outside (0, revenue)",
            gross_profit
        ));
    }
}

/// Capex is subtracted by magnitude since filings print it with either sign.
fn derive_free_cash_flow(schema: &mut FinancialSchema, config: &ConfidenceConfig, log: &mut ParseLog) {
    if schema.contains(FieldKey::CashFlowFreeCashFlow) {
        return;
    }
    let Some((operating, capex, page)) = inputs(schema, FieldKey::CashFlowOperating, FieldKey::CashFlowCapex) else {
        return;
    };

    let free_cash_flow = operating - capex.abs();
    schema.set(
        FieldKey::CashFlowFreeCashFlow,
        ExtractionCandidate::new(
            free_cash_flow,
            "derived from operating cash flow − |capital expenditures|",
            config.derived_free_cash_flow,
            page,
        ),
    );
    log.push(format!(
        "Derived cash_flow.free_cash_flow = {:.0} from operating − |capex|",
        free_cash_flow
    ));
}
