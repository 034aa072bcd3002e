use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use super::types::ExtractionCandidate;

/// Addresses one slot of the [`FinancialSchema`] as `<category>.<slot>`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, Display, EnumString, IntoStaticStr,
)]
pub enum FieldKey {
    #[strum(serialize = "assets.total")]
    AssetsTotal,
    #[strum(serialize = "assets.current")]
    AssetsCurrent,
    #[strum(serialize = "assets.cash")]
    AssetsCash,
    #[strum(serialize = "assets.marketable_securities")]
    AssetsMarketableSecurities,
    #[strum(serialize = "assets.accounts_receivable")]
    AssetsAccountsReceivable,
    #[strum(serialize = "assets.inventory")]
    AssetsInventory,
    #[strum(serialize = "assets.property_equipment")]
    AssetsPropertyEquipment,
    #[strum(serialize = "assets.goodwill")]
    AssetsGoodwill,
    #[strum(serialize = "liabilities.total")]
    LiabilitiesTotal,
    #[strum(serialize = "liabilities.current")]
    LiabilitiesCurrent,
    #[strum(serialize = "liabilities.accounts_payable")]
    LiabilitiesAccountsPayable,
    #[strum(serialize = "liabilities.long_term_debt")]
    LiabilitiesLongTermDebt,
    #[strum(serialize = "equity.total")]
    EquityTotal,
    #[strum(serialize = "equity.retained_earnings")]
    EquityRetainedEarnings,
    #[strum(serialize = "revenues.total")]
    RevenuesTotal,
    #[strum(serialize = "revenues.cost_of_revenue")]
    RevenuesCostOfRevenue,
    #[strum(serialize = "revenues.gross_profit")]
    RevenuesGrossProfit,
    #[strum(serialize = "expenses.research_development")]
    ExpensesResearchDevelopment,
    #[strum(serialize = "expenses.selling_general_admin")]
    ExpensesSellingGeneralAdmin,
    #[strum(serialize = "expenses.operating_expenses")]
    ExpensesOperatingExpenses,
    #[strum(serialize = "expenses.interest_expense")]
    ExpensesInterestExpense,
    #[strum(serialize = "expenses.income_tax")]
    ExpensesIncomeTax,
    #[strum(serialize = "income.operating_income")]
    IncomeOperatingIncome,
    #[strum(serialize = "income.pretax_income")]
    IncomePretaxIncome,
    #[strum(serialize = "income.net_income")]
    IncomeNetIncome,
    #[strum(serialize = "cash_flow.operating")]
    CashFlowOperating,
    #[strum(serialize = "cash_flow.investing")]
    CashFlowInvesting,
    #[strum(serialize = "cash_flow.financing")]
    CashFlowFinancing,
    #[strum(serialize = "cash_flow.capex")]
    CashFlowCapex,
    #[strum(serialize = "cash_flow.free_cash_flow")]
    CashFlowFreeCashFlow,
}

impl FieldKey {
    pub fn path(&self) -> &'static str {
        (*self).into()
    }

    pub fn category(&self) -> &'static str {
        self.path().split('.').next().unwrap_or_default()
    }

    pub fn slot_name(&self) -> &'static str {
        self.path().split('.').nth(1).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assets {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    total: Option<ExtractionCandidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    current: Option<ExtractionCandidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cash: Option<ExtractionCandidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    marketable_securities: Option<ExtractionCandidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    accounts_receivable: Option<ExtractionCandidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inventory: Option<ExtractionCandidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    property_equipment: Option<ExtractionCandidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    goodwill: Option<ExtractionCandidate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Liabilities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    total: Option<ExtractionCandidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    current: Option<ExtractionCandidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    accounts_payable: Option<ExtractionCandidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    long_term_debt: Option<ExtractionCandidate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Equity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    total: Option<ExtractionCandidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    retained_earnings: Option<ExtractionCandidate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Revenues {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    total: Option<ExtractionCandidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cost_of_revenue: Option<ExtractionCandidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    gross_profit: Option<ExtractionCandidate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Expenses {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    research_development: Option<ExtractionCandidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    selling_general_admin: Option<ExtractionCandidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    operating_expenses: Option<ExtractionCandidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    interest_expense: Option<ExtractionCandidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    income_tax: Option<ExtractionCandidate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Income {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    operating_income: Option<ExtractionCandidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pretax_income: Option<ExtractionCandidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    net_income: Option<ExtractionCandidate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CashFlow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    operating: Option<ExtractionCandidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    investing: Option<ExtractionCandidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    financing: Option<ExtractionCandidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    capex: Option<ExtractionCandidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    free_cash_flow: Option<ExtractionCandidate>,
}

/// Seven fixed categories of optional slots. Slots are only ever replaced or
/// cleared whole; a stored candidate is never edited in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialSchema {
    assets: Assets,
    liabilities: Liabilities,
    equity: Equity,
    revenues: Revenues,
    expenses: Expenses,
    income: Income,
    cash_flow: CashFlow,
}

impl FinancialSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: FieldKey) -> Option<&ExtractionCandidate> {
        match key {
            FieldKey::AssetsTotal => self.assets.total.as_ref(),
            FieldKey::AssetsCurrent => self.assets.current.as_ref(),
            FieldKey::AssetsCash => self.assets.cash.as_ref(),
            FieldKey::AssetsMarketableSecurities => self.assets.marketable_securities.as_ref(),
            FieldKey::AssetsAccountsReceivable => self.assets.accounts_receivable.as_ref(),
            FieldKey::AssetsInventory => self.assets.inventory.as_ref(),
            FieldKey::AssetsPropertyEquipment => self.assets.property_equipment.as_ref(),
            FieldKey::AssetsGoodwill => self.assets.goodwill.as_ref(),
            FieldKey::LiabilitiesTotal => self.liabilities.total.as_ref(),
            FieldKey::LiabilitiesCurrent => self.liabilities.current.as_ref(),
            FieldKey::LiabilitiesAccountsPayable => self.liabilities.accounts_payable.as_ref(),
            FieldKey::LiabilitiesLongTermDebt => self.liabilities.long_term_debt.as_ref(),
            FieldKey::EquityTotal => self.equity.total.as_ref(),
            FieldKey::EquityRetainedEarnings => self.equity.retained_earnings.as_ref(),
            FieldKey::RevenuesTotal => self.revenues.total.as_ref(),
            FieldKey::RevenuesCostOfRevenue => self.revenues.cost_of_revenue.as_ref(),
            FieldKey::RevenuesGrossProfit => self.revenues.gross_profit.as_ref(),
            FieldKey::ExpensesResearchDevelopment => self.expenses.research_development.as_ref(),
            FieldKey::ExpensesSellingGeneralAdmin => self.expenses.selling_general_admin.as_ref(),
            FieldKey::ExpensesOperatingExpenses => self.expenses.operating_expenses.as_ref(),
            FieldKey::ExpensesInterestExpense => self.expenses.interest_expense.as_ref(),
            FieldKey::ExpensesIncomeTax => self.expenses.income_tax.as_ref(),
            FieldKey::IncomeOperatingIncome => self.income.operating_income.as_ref(),
            FieldKey::IncomePretaxIncome => self.income.pretax_income.as_ref(),
            FieldKey::IncomeNetIncome => self.income.net_income.as_ref(),
            FieldKey::CashFlowOperating => self.cash_flow.operating.as_ref(),
            FieldKey::CashFlowInvesting => self.cash_flow.investing.as_ref(),
            FieldKey::CashFlowFinancing => self.cash_flow.financing.as_ref(),
            FieldKey::CashFlowCapex => self.cash_flow.capex.as_ref(),
            FieldKey::CashFlowFreeCashFlow => self.cash_flow.free_cash_flow.as_ref(),
        }
    }

    fn slot_mut(&mut self, key: FieldKey) -> &mut Option<ExtractionCandidate> {
        match key {
            FieldKey::AssetsTotal => &mut self.assets.total,
            FieldKey::AssetsCurrent => &mut self.assets.current,
            FieldKey::AssetsCash => &mut self.assets.cash,
            FieldKey::AssetsMarketableSecurities => &mut self.assets.marketable_securities,
            FieldKey::AssetsAccountsReceivable => &mut self.assets.accounts_receivable,
            FieldKey::AssetsInventory => &mut self.assets.inventory,
            FieldKey::AssetsPropertyEquipment => &mut self.assets.property_equipment,
            FieldKey::AssetsGoodwill => &mut self.assets.goodwill,
            FieldKey::LiabilitiesTotal => &mut self.liabilities.total,
            FieldKey::LiabilitiesCurrent => &mut self.liabilities.current,
            FieldKey::LiabilitiesAccountsPayable => &mut self.liabilities.accounts_payable,
            FieldKey::LiabilitiesLongTermDebt => &mut self.liabilities.long_term_debt,
            FieldKey::EquityTotal => &mut self.equity.total,
            FieldKey::EquityRetainedEarnings => &mut self.equity.retained_earnings,
            FieldKey::RevenuesTotal => &mut self.revenues.total,
            FieldKey::RevenuesCostOfRevenue => &mut self.revenues.cost_of_revenue,
            FieldKey::RevenuesGrossProfit => &mut self.revenues.gross_profit,
            FieldKey::ExpensesResearchDevelopment => &mut self.expenses.research_development,
            FieldKey::ExpensesSellingGeneralAdmin => &mut self.expenses.selling_general_admin,
            FieldKey::ExpensesOperatingExpenses => &mut self.expenses.operating_expenses,
            FieldKey::ExpensesInterestExpense => &mut self.expenses.interest_expense,
            FieldKey::ExpensesIncomeTax => &mut self.expenses.income_tax,
            FieldKey::IncomeOperatingIncome => &mut self.income.operating_income,
            FieldKey::IncomePretaxIncome => &mut self.income.pretax_income,
            FieldKey::IncomeNetIncome => &mut self.income.net_income,
            FieldKey::CashFlowOperating => &mut self.cash_flow.operating,
            FieldKey::CashFlowInvesting => &mut self.cash_flow.investing,
            FieldKey::CashFlowFinancing => &mut self.cash_flow.financing,
            FieldKey::CashFlowCapex => &mut self.cash_flow.capex,
            FieldKey::CashFlowFreeCashFlow => &mut self.cash_flow.free_cash_flow,
        }
    }

    pub fn value(&self, key: FieldKey) -> Option<f64> {
        self.get(key).map(|c| c.value)
    }

    pub fn contains(&self, key: FieldKey) -> bool {
        self.get(key).is_some()
    }

    /// Replaces the whole slot, returning whatever it held before.
    pub fn set(&mut self, key: FieldKey, candidate: ExtractionCandidate) -> Option<ExtractionCandidate> {
        self.slot_mut(key).replace(candidate)
    }

    pub fn clear(&mut self, key: FieldKey) -> Option<ExtractionCandidate> {
        self.slot_mut(key).take()
    }

    /// Populated slots in declaration order.
    pub fn populated(&self) -> impl Iterator<Item = (FieldKey, &ExtractionCandidate)> + '_ {
        FieldKey::iter().filter_map(move |key| self.get(key).map(|c| (key, c)))
    }

    pub fn populated_count(&self) -> usize {
        self.populated().count()
    }
}
