use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::FieldKey;

pub const DEFAULT_MIN_VALUE: f64 = 100.0;
pub const DEFAULT_MAX_VALUE: f64 = 1e12;

/// Aggregates of the largest filers (bank balance sheets) run into trillions.
const AGGREGATE_MAX_VALUE: f64 = 1e13;

const CRITICAL_NAME_PARTS: &[&str] = &["revenue", "assets", "liabilities", "equity"];

/// One extraction target: where it lands in the schema, how its label reads,
/// and the magnitude range a believable value falls in.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub key: FieldKey,
    pub name: String,
    pub patterns: Vec<Regex>,
    pub exclusions: Vec<Regex>,
    pub min_value: f64,
    pub max_value: f64,
}

impl FieldSpec {
    pub fn new(key: FieldKey, name: &str, patterns: &[&str]) -> Result<Self> {
        Ok(Self {
            key,
            name: name.to_string(),
            patterns: compile(name, patterns)?,
            exclusions: Vec::new(),
            min_value: DEFAULT_MIN_VALUE,
            max_value: DEFAULT_MAX_VALUE,
        })
    }

    pub fn excluding(mut self, patterns: &[&str]) -> Result<Self> {
        self.exclusions = compile(&self.name, patterns)?;
        Ok(self)
    }

    pub fn with_bounds(mut self, min_value: f64, max_value: f64) -> Self {
        self.min_value = min_value;
        self.max_value = max_value;
        self
    }

    /// Large consolidated totals beat smaller footnote figures for these.
    pub fn is_critical(&self) -> bool {
        let name = self.name.to_lowercase();
        CRITICAL_NAME_PARTS.iter().any(|part| name.contains(part))
    }

    /// End offset of the label within `text`, if it names this field.
    pub fn match_label(&self, text: &str) -> Option<usize> {
        if self.exclusions.iter().any(|re| re.is_match(text)) {
            return None;
        }
        self.patterns
            .iter()
            .find_map(|re| re.find(text))
            .map(|m| m.end())
    }

    pub fn within_bounds(&self, value: f64) -> bool {
        let magnitude = value.abs();
        magnitude >= self.min_value && magnitude <= self.max_value
    }
}

fn compile(name: &str, patterns: &[&str]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(&format!("(?i){}", p))
                .with_context(|| format!("Invalid label pattern for {}: {}", name, p))
        })
        .collect()
}

struct FieldDef {
    key: FieldKey,
    name: &'static str,
    patterns: &'static [&'static str],
    exclusions: &'static [&'static str],
    max_value: f64,
}

const FIELD_TABLE: &[FieldDef] = &[
    FieldDef {
        key: FieldKey::AssetsTotal,
        name: "total_assets",
        patterns: &[r"^\s*total\s+assets\b"],
        exclusions: &[],
        max_value: AGGREGATE_MAX_VALUE,
    },
    FieldDef {
        key: FieldKey::AssetsCurrent,
        name: "current_assets",
        patterns: &[r"^\s*total\s+current\s+assets\b"],
        exclusions: &[],
        max_value: AGGREGATE_MAX_VALUE,
    },
    FieldDef {
        key: FieldKey::AssetsCash,
        name: "cash",
        patterns: &[
            r"^\s*cash\s+and\s+cash\s+equivalents\b",
            r"^\s*cash\s+and\s+equivalents\b",
            r"^\s*cash\b\s*(?:\$|\d|\(|$)",
        ],
        exclusions: &[r"restricted", r"beginning", r"provided|used\s+in|paid|flows?\b"],
        max_value: DEFAULT_MAX_VALUE,
    },
    FieldDef {
        key: FieldKey::AssetsMarketableSecurities,
        name: "marketable_securities",
        patterns: &[
            r"^\s*(?:current\s+)?marketable\s+securities\b",
            r"^\s*short[\s-]term\s+investments\b",
        ],
        exclusions: &[r"non-?current", r"purchases?|sales?\s+of|proceeds|maturities"],
        max_value: DEFAULT_MAX_VALUE,
    },
    FieldDef {
        key: FieldKey::AssetsAccountsReceivable,
        name: "accounts_receivable",
        patterns: &[
            r"^\s*accounts\s+receivable\b",
            r"^\s*trade\s+receivables\b",
            r"^\s*receivables\b",
        ],
        exclusions: &[r"change|increase|decrease"],
        max_value: DEFAULT_MAX_VALUE,
    },
    FieldDef {
        key: FieldKey::AssetsInventory,
        name: "inventory",
        patterns: &[r"^\s*inventor(?:y|ies)\b"],
        exclusions: &[r"change|increase|decrease|write"],
        max_value: DEFAULT_MAX_VALUE,
    },
    FieldDef {
        key: FieldKey::AssetsPropertyEquipment,
        name: "property_equipment",
        patterns: &[r"^\s*property,?\s+(?:plant\s+)?(?:and\s+|&\s+)?equipment\b"],
        exclusions: &[r"purchases?|payments|proceeds|sales?\s+of"],
        max_value: DEFAULT_MAX_VALUE,
    },
    FieldDef {
        key: FieldKey::AssetsGoodwill,
        name: "goodwill",
        patterns: &[r"^\s*goodwill\b"],
        exclusions: &[r"impairment|amortization"],
        max_value: DEFAULT_MAX_VALUE,
    },
    FieldDef {
        key: FieldKey::LiabilitiesTotal,
        name: "total_liabilities",
        patterns: &[r"^\s*total\s+liabilities\b"],
        exclusions: &[r"liabilities\s*(?:,|and|&)\s*(?:redeemable|temporary|stockholders|shareholders|equity|partners|members)"],
        max_value: AGGREGATE_MAX_VALUE,
    },
    FieldDef {
        key: FieldKey::LiabilitiesCurrent,
        name: "current_liabilities",
        patterns: &[r"^\s*total\s+current\s+liabilities\b"],
        exclusions: &[],
        max_value: AGGREGATE_MAX_VALUE,
    },
    FieldDef {
        key: FieldKey::LiabilitiesAccountsPayable,
        name: "accounts_payable",
        patterns: &[r"^\s*accounts\s+payable\b", r"^\s*trade\s+payables\b"],
        exclusions: &[r"change|increase|decrease"],
        max_value: DEFAULT_MAX_VALUE,
    },
    FieldDef {
        key: FieldKey::LiabilitiesLongTermDebt,
        name: "long_term_debt",
        patterns: &[r"^\s*long[\s-]term\s+debt\b", r"^\s*term\s+debt\b"],
        exclusions: &[r"current\s+portion|repayments?|proceeds|issuance"],
        max_value: DEFAULT_MAX_VALUE,
    },
    FieldDef {
        key: FieldKey::EquityTotal,
        name: "total_equity",
        patterns: &[
            r"^\s*total\s+(?:stockholders|shareholders)['’]?\s+equity\b",
            r"^\s*total\s+equity\b",
            r"^\s*total\s+(?:stockholders|shareholders)['’]?\s+(?:deficit|investment)\b",
        ],
        exclusions: &[r"liabilities"],
        max_value: AGGREGATE_MAX_VALUE,
    },
    FieldDef {
        key: FieldKey::EquityRetainedEarnings,
        name: "retained_earnings",
        patterns: &[r"^\s*retained\s+earnings\b", r"^\s*accumulated\s+deficit\b"],
        exclusions: &[],
        max_value: DEFAULT_MAX_VALUE,
    },
    FieldDef {
        key: FieldKey::RevenuesTotal,
        name: "total_revenue",
        patterns: &[
            r"^\s*total\s+(?:net\s+)?revenues?\b",
            r"^\s*(?:net\s+)?revenues?\b",
            r"^\s*total\s+net\s+sales\b",
            r"^\s*net\s+sales\b",
        ],
        exclusions: &[r"cost\s+of", r"deferred|unearned", r"%|percent"],
        max_value: DEFAULT_MAX_VALUE,
    },
    FieldDef {
        key: FieldKey::RevenuesCostOfRevenue,
        name: "cost_of_revenue",
        patterns: &[
            r"^\s*(?:total\s+)?cost\s+of\s+(?:net\s+)?(?:revenues?|sales|goods\s+sold)\b",
        ],
        exclusions: &[r"%|percent"],
        max_value: DEFAULT_MAX_VALUE,
    },
    FieldDef {
        key: FieldKey::RevenuesGrossProfit,
        name: "gross_profit",
        patterns: &[r"^\s*gross\s+(?:profit|margin)\b"],
        exclusions: &[r"%|percent"],
        max_value: DEFAULT_MAX_VALUE,
    },
    FieldDef {
        key: FieldKey::ExpensesResearchDevelopment,
        name: "research_development",
        patterns: &[
            r"^\s*research\s+and\s+development\b",
            r"^\s*research,\s+development\b",
            r"^\s*r\s*&\s*d\b",
        ],
        exclusions: &[r"%|percent"],
        max_value: DEFAULT_MAX_VALUE,
    },
    FieldDef {
        key: FieldKey::ExpensesSellingGeneralAdmin,
        name: "selling_general_admin",
        patterns: &[
            r"^\s*(?:selling|sales),\s+general\s+and\s+administrative\b",
            r"^\s*selling,\s+general\s+&\s+administrative\b",
            r"^\s*general\s+and\s+administrative\b",
        ],
        exclusions: &[r"%|percent"],
        max_value: DEFAULT_MAX_VALUE,
    },
    FieldDef {
        key: FieldKey::ExpensesOperatingExpenses,
        name: "operating_expenses",
        patterns: &[
            r"^\s*total\s+operating\s+expenses\b",
            r"^\s*total\s+costs\s+and\s+expenses\b",
        ],
        exclusions: &[],
        max_value: DEFAULT_MAX_VALUE,
    },
    FieldDef {
        key: FieldKey::ExpensesInterestExpense,
        name: "interest_expense",
        patterns: &[r"^\s*interest\s+expense\b"],
        exclusions: &[r"paid"],
        max_value: DEFAULT_MAX_VALUE,
    },
    FieldDef {
        key: FieldKey::ExpensesIncomeTax,
        name: "income_tax",
        patterns: &[
            r"^\s*provision\s+for\s+income\s+taxes\b",
            r"^\s*income\s+tax\s+(?:expense|provision)\b",
            r"^\s*(?:benefit\s+from\s+)?income\s+taxes\b",
        ],
        exclusions: &[r"before|deferred|payable|paid"],
        max_value: DEFAULT_MAX_VALUE,
    },
    FieldDef {
        key: FieldKey::IncomeOperatingIncome,
        name: "operating_income",
        patterns: &[
            r"^\s*(?:total\s+)?operating\s+(?:income|loss)\b",
            r"^\s*income\s+from\s+operations\b",
            r"^\s*(?:income\s+)?\(?loss\)?\s+from\s+operations\b",
        ],
        exclusions: &[r"%|percent|margin", r"carry-?forwards?"],
        max_value: DEFAULT_MAX_VALUE,
    },
    FieldDef {
        key: FieldKey::IncomePretaxIncome,
        name: "pretax_income",
        patterns: &[
            r"^\s*(?:income|earnings)\s+before\s+(?:provision\s+for\s+)?income\s+taxes\b",
            r"^\s*pre-?tax\s+income\b",
        ],
        exclusions: &[],
        max_value: DEFAULT_MAX_VALUE,
    },
    FieldDef {
        key: FieldKey::IncomeNetIncome,
        name: "net_income",
        patterns: &[
            r"^\s*net\s+income\b",
            r"^\s*net\s+earnings\b",
            r"^\s*net\s+\(?loss\)?\b",
        ],
        exclusions: &[r"per\s+(?:basic\s+|diluted\s+)?share", r"noncontrolling|non-controlling", r"comprehensive", r"%|percent|margin"],
        max_value: DEFAULT_MAX_VALUE,
    },
    FieldDef {
        key: FieldKey::CashFlowOperating,
        name: "operating_cash_flow",
        patterns: &[
            r"^\s*net\s+cash\s+(?:provided|generated|from|used)[^\n]{0,40}?operating\s+activities",
            r"^\s*cash\s+(?:generated|provided)\s+(?:by|from)\s+operat(?:ing|ions)",
        ],
        exclusions: &[],
        max_value: DEFAULT_MAX_VALUE,
    },
    FieldDef {
        key: FieldKey::CashFlowInvesting,
        name: "investing_cash_flow",
        patterns: &[
            r"^\s*net\s+cash\s+(?:provided|generated|from|used)[^\n]{0,40}?investing\s+activities",
            r"^\s*cash\s+(?:generated|provided|used)\s+(?:by|from|in)\s+investing",
        ],
        exclusions: &[],
        max_value: DEFAULT_MAX_VALUE,
    },
    FieldDef {
        key: FieldKey::CashFlowFinancing,
        name: "financing_cash_flow",
        patterns: &[
            r"^\s*net\s+cash\s+(?:provided|generated|from|used)[^\n]{0,40}?financing\s+activities",
            r"^\s*cash\s+(?:generated|provided|used)\s+(?:by|from|in)\s+financing",
        ],
        exclusions: &[],
        max_value: DEFAULT_MAX_VALUE,
    },
    FieldDef {
        key: FieldKey::CashFlowCapex,
        name: "capital_expenditures",
        patterns: &[
            r"^\s*capital\s+expenditures?\b",
            r"^\s*purchases?\s+of\s+property,?\s+(?:plant\s+)?(?:and\s+|&\s+)?equipment",
            r"^\s*payments\s+for\s+(?:acquisition\s+of\s+)?property,?\s+(?:plant\s+)?(?:and\s+|&\s+)?equipment",
            r"^\s*additions\s+to\s+property",
        ],
        exclusions: &[],
        max_value: DEFAULT_MAX_VALUE,
    },
];

static DEFAULT_FIELDS: Lazy<Vec<FieldSpec>> = Lazy::new(|| {
    FIELD_TABLE
        .iter()
        .map(|def| {
            FieldSpec::new(def.key, def.name, def.patterns)
                .and_then(|spec| spec.excluding(def.exclusions))
                .map(|spec| spec.with_bounds(DEFAULT_MIN_VALUE, def.max_value))
                .expect("built-in field patterns compile")
        })
        .collect()
});

/// The built-in extraction targets, in extraction order.
pub fn default_fields() -> &'static [FieldSpec] {
    &DEFAULT_FIELDS
}
