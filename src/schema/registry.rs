//! Built-in entity registry: the master and transaction tables of the
//! finance store, declared as statics so relation targets can reference
//! each other without an arena. Every has-many edge here is paired with a
//! belongs-to edge on the target; [`super::SchemaGraph::new`] verifies that
//! at startup.

use super::{EntityDef, FieldDef, RelationDef};
use super::FieldKind::{Boolean, Date, Decimal, Integer, Text};

/// All registered entities, in registration order.
pub static ENTITIES: &[&EntityDef] = &[
    &CALENDAR_MASTER,
    &ASSET_CATEGORY_MASTER,
    &ASSET_MASTER,
    &BANK_MASTER,
    &CREDIT_CARD_MASTER,
    &DEBIT_CARD_MASTER,
    &EMI_MASTER,
    &INSURANCE_MASTER,
    &EXPENSE_CATEGORY_MASTER,
    &EXPENSE_MASTER,
    &INCOME_CATEGORY_MASTER,
    &INCOME_MASTER,
    &INCOME_SOURCE_MASTER,
    &INVESTMENT_CATEGORY_MASTER,
    &INVESTMENT_MASTER,
    &EXPENSES,
    &INCOMES,
    &INVESTMENTS,
    &OPENING_BALANCES,
    &MARKET_DATA,
];

// One row per calendar day, pre-expanded into week/month/quarter/year
// buckets. The only entity without timestamp columns.
pub static CALENDAR_MASTER: EntityDef = EntityDef {
    name: "CalendarMaster",
    table: "MasterCalendar",
    timestamps: false,
    fields: &[
        FieldDef::required("date", Date),
        FieldDef::optional("day_id", Integer),
        FieldDef::optional("day_name", Text),
        FieldDef::optional("day_name_short", Text),
        FieldDef::optional("day_type", Text),
        FieldDef::optional("week_id", Integer),
        FieldDef::required("start_of_week", Date),
        FieldDef::required("end_of_week", Date),
        FieldDef::optional("week_name", Text),
        FieldDef::optional("month_id", Integer),
        FieldDef::optional("fy_month_id", Integer),
        FieldDef::required("start_of_month", Date),
        FieldDef::optional("day_of_month", Integer),
        FieldDef::required("end_of_month", Date),
        FieldDef::optional("month_name", Text),
        FieldDef::optional("month_name_short", Text),
        FieldDef::optional("quarter_id", Integer),
        FieldDef::optional("fy_quarter_id", Integer),
        FieldDef::required("start_of_quarter", Date),
        FieldDef::optional("day_of_quarter", Integer),
        FieldDef::required("end_of_quarter", Date),
        FieldDef::optional("quarter_name", Text),
        FieldDef::optional("fy_quarter_name", Text),
        FieldDef::optional("year_id", Integer),
        FieldDef::required("start_of_year", Date),
        FieldDef::optional("day_of_year", Integer),
        FieldDef::required("end_of_year", Date),
        FieldDef::optional("financial_year", Text),
        FieldDef::optional("assesment_year", Text),
    ],
    relations: &[
        RelationDef::has_many("assets", &ASSET_MASTER, "date_id"),
        RelationDef::has_many("EMIStartRecords", &EMI_MASTER, "emi_start_date_id"),
        RelationDef::has_many("EMIEndRecords", &EMI_MASTER, "emi_end_date_id"),
        RelationDef::has_many("insurances", &INSURANCE_MASTER, "date_id"),
        RelationDef::has_many("expenses", &EXPENSES, "date_id"),
        RelationDef::has_many("incomes", &INCOMES, "date_id"),
        RelationDef::has_many("investments", &INVESTMENTS, "date_id"),
        RelationDef::has_many("openingBalances", &OPENING_BALANCES, "date_id"),
        RelationDef::has_many("marketRecords", &MARKET_DATA, "date_id"),
    ],
};

pub static ASSET_CATEGORY_MASTER: EntityDef = EntityDef {
    name: "AssetCategoryMaster",
    table: "MasterAssetCategories",
    timestamps: true,
    fields: &[FieldDef::required("category", Text)],
    relations: &[RelationDef::has_many("assets", &ASSET_MASTER, "category_id")],
};

pub static ASSET_MASTER: EntityDef = EntityDef {
    name: "AssetMaster",
    table: "MasterAssets",
    timestamps: true,
    fields: &[
        FieldDef::required("date_id", Integer),
        FieldDef::optional("date", Date),
        FieldDef::optional("name", Text),
        FieldDef::optional("emi_id", Integer),
        FieldDef::optional("amount", Decimal),
        FieldDef::required("category_id", Integer),
    ],
    relations: &[
        RelationDef::belongs_to("calendarRecord", &CALENDAR_MASTER, "date_id"),
        RelationDef::belongs_to("emiRecord", &EMI_MASTER, "emi_id"),
        RelationDef::belongs_to("assetCategory", &ASSET_CATEGORY_MASTER, "category_id"),
        RelationDef::has_many("transactions", &EXPENSES, "asset_id"),
    ],
};

pub static BANK_MASTER: EntityDef = EntityDef {
    name: "BankMaster",
    table: "MasterBanks",
    timestamps: true,
    fields: &[
        FieldDef::optional("name", Text),
        FieldDef::optional("bank_branch", Text),
        FieldDef::optional("account_type", Text),
        FieldDef::optional("account_no", Text),
        FieldDef::optional("customer_id", Text),
        FieldDef::optional("ifsc_code", Text),
        FieldDef::optional("netbanking_username", Text),
    ],
    relations: &[
        RelationDef::has_many("creditCards", &CREDIT_CARD_MASTER, "bank_id"),
        RelationDef::has_many("debitCards", &DEBIT_CARD_MASTER, "bank_id"),
        RelationDef::has_many("expenses", &EXPENSES, "bank_id"),
        RelationDef::has_many("incomes", &INCOMES, "bank_id"),
        RelationDef::has_many("investments", &INVESTMENTS, "bank_id"),
        RelationDef::has_many("openingBalances", &OPENING_BALANCES, "bank_id"),
    ],
};

pub static CREDIT_CARD_MASTER: EntityDef = EntityDef {
    name: "CreditCardMaster",
    table: "MasterCreditCards",
    timestamps: true,
    fields: &[
        FieldDef::required("card_name", Text),
        FieldDef::required("card_type", Text),
        FieldDef::required("card_gateway_vendor", Text),
        FieldDef::required("bank_id", Integer),
        FieldDef::required("card_no", Text),
        FieldDef::required("card_expiry_month", Integer),
        FieldDef::required("card_expiry_year", Integer),
        FieldDef::required("card_cvv_code", Integer),
        FieldDef::required("credit_limit", Decimal),
        FieldDef::required("is_international", Boolean),
        FieldDef::required("ecom_limit", Decimal),
        FieldDef::required("tap_enabled", Boolean),
        FieldDef::required("tap_limit", Decimal),
        FieldDef::required("pos_limit", Decimal),
        FieldDef::required("international_limit", Decimal),
    ],
    relations: &[
        RelationDef::belongs_to("bankRecord", &BANK_MASTER, "bank_id"),
        RelationDef::has_many("emiRecords", &EMI_MASTER, "credit_card_id"),
    ],
};

pub static DEBIT_CARD_MASTER: EntityDef = EntityDef {
    name: "DebitCardMaster",
    table: "MasterDebitCards",
    timestamps: true,
    fields: &[
        FieldDef::optional("card_name", Text),
        FieldDef::optional("card_type", Text),
        FieldDef::optional("card_gateway_vendor", Text),
        FieldDef::required("bank_id", Integer),
        FieldDef::optional("card_no", Text),
        FieldDef::optional("card_expiry_month", Integer),
        FieldDef::optional("card_expiry_year", Integer),
        FieldDef::optional("card_cvv_code", Integer),
        FieldDef::optional("is_international", Boolean),
        FieldDef::optional("atm_limit", Decimal),
        FieldDef::optional("ecom_limit", Decimal),
        FieldDef::optional("tap_enabled", Boolean),
        FieldDef::optional("tap_limit", Decimal),
        FieldDef::optional("pos_limit", Decimal),
        FieldDef::optional("international_limit", Decimal),
    ],
    relations: &[RelationDef::belongs_to("bankRecord", &BANK_MASTER, "bank_id")],
};

pub static EMI_MASTER: EntityDef = EntityDef {
    name: "EMIMaster",
    table: "MasterEMI",
    timestamps: true,
    fields: &[
        FieldDef::required("credit_card_id", Integer),
        FieldDef::required("emi_start_date_id", Integer),
        FieldDef::required("emi_end_date_id", Integer),
        FieldDef::required("emi_start_date", Date),
        FieldDef::required("emi_end_date", Date),
        FieldDef::required("payable_term", Decimal),
        FieldDef::required("total_installments", Decimal),
        FieldDef::required("total_emi_payment", Decimal),
        FieldDef::required("total_product_cost", Decimal),
        FieldDef::required("interest", Decimal),
        FieldDef::required("total_interest_payable", Decimal),
        FieldDef::required("no_cost_emi_discount", Decimal),
        FieldDef::required("emi_amount", Decimal),
        FieldDef::required("processing_cost", Decimal),
        FieldDef::required("processing_gst_component", Decimal),
    ],
    relations: &[
        RelationDef::belongs_to("creditCard", &CREDIT_CARD_MASTER, "credit_card_id"),
        RelationDef::belongs_to("startCalendarDateRecord", &CALENDAR_MASTER, "emi_start_date_id"),
        RelationDef::belongs_to("endCalendarDateRecord", &CALENDAR_MASTER, "emi_end_date_id"),
        RelationDef::has_many("assets", &ASSET_MASTER, "emi_id"),
        RelationDef::has_many("transactions", &EXPENSES, "emi_id"),
    ],
};

pub static INSURANCE_MASTER: EntityDef = EntityDef {
    name: "InsuranceMaster",
    table: "MasterInsurances",
    timestamps: true,
    fields: &[
        FieldDef::optional("name", Text),
        FieldDef::optional("type", Text),
        FieldDef::optional("policy_no", Text),
        FieldDef::required("date_id", Integer),
        FieldDef::optional("purchase_date", Date),
        FieldDef::optional("amount_insured", Decimal),
        FieldDef::optional("cover_period_years", Decimal),
        FieldDef::optional("cover_period_start_date", Date),
        FieldDef::optional("cover_period_end_date", Date),
        FieldDef::optional("ncb_allowance", Decimal),
        FieldDef::optional("premium_payable_term_type", Text),
        FieldDef::optional("premium_payable", Decimal),
    ],
    relations: &[
        RelationDef::belongs_to("calendarRecord", &CALENDAR_MASTER, "date_id"),
        RelationDef::has_many("transactions", &EXPENSES, "insurance_id"),
    ],
};

pub static EXPENSE_CATEGORY_MASTER: EntityDef = EntityDef {
    name: "ExpenseCategoryMaster",
    table: "MasterExpenseCategories",
    timestamps: true,
    fields: &[FieldDef::required("category", Text)],
    relations: &[RelationDef::has_many("expenses", &EXPENSE_MASTER, "category_id")],
};

pub static EXPENSE_MASTER: EntityDef = EntityDef {
    name: "ExpenseMaster",
    table: "MasterExpenses",
    timestamps: true,
    fields: &[
        FieldDef::optional("name", Text),
        FieldDef::optional("type", Text),
        FieldDef::required("category_id", Integer),
    ],
    relations: &[
        RelationDef::belongs_to("expenseCategory", &EXPENSE_CATEGORY_MASTER, "category_id"),
        RelationDef::has_many("transactions", &EXPENSES, "master_id"),
    ],
};

pub static INCOME_CATEGORY_MASTER: EntityDef = EntityDef {
    name: "IncomeCategoryMaster",
    table: "MasterIncomeCategories",
    timestamps: true,
    fields: &[FieldDef::required("category", Text)],
    relations: &[
        RelationDef::has_many("incomes", &INCOME_MASTER, "category_id"),
        RelationDef::has_many("incomeSources", &INCOME_SOURCE_MASTER, "category_id"),
    ],
};

pub static INCOME_MASTER: EntityDef = EntityDef {
    name: "IncomeMaster",
    table: "MasterIncomes",
    timestamps: true,
    fields: &[
        FieldDef::optional("name", Text),
        FieldDef::optional("type", Text),
        FieldDef::optional("is_pf", Boolean),
        FieldDef::optional("is_tds", Boolean),
        FieldDef::optional("is_mediclaim", Boolean),
        FieldDef::required("category_id", Integer),
    ],
    relations: &[
        RelationDef::belongs_to("incomeCategory", &INCOME_CATEGORY_MASTER, "category_id"),
        RelationDef::has_many("transactions", &INCOMES, "master_id"),
    ],
};

pub static INCOME_SOURCE_MASTER: EntityDef = EntityDef {
    name: "IncomeSourceMaster",
    table: "MasterIncomeSources",
    timestamps: true,
    fields: &[
        FieldDef::required("source_name", Text),
        FieldDef::required("source_type", Text),
        FieldDef::required("category_id", Integer),
    ],
    relations: &[
        RelationDef::belongs_to("incomeCategory", &INCOME_CATEGORY_MASTER, "category_id"),
        RelationDef::has_many("transactions", &INCOMES, "source_id"),
    ],
};

pub static INVESTMENT_CATEGORY_MASTER: EntityDef = EntityDef {
    name: "InvestmentCategoryMaster",
    table: "MasterInvestmentCategories",
    timestamps: true,
    fields: &[
        FieldDef::required("category", Text),
        FieldDef::required("category_short", Text),
        FieldDef::required("risk_rank", Integer),
        FieldDef::required("risk_name", Text),
        FieldDef::required("tax_term_threshold_years", Integer),
    ],
    relations: &[RelationDef::has_many("investments", &INVESTMENT_MASTER, "category_id")],
};

pub static INVESTMENT_MASTER: EntityDef = EntityDef {
    name: "InvestmentMaster",
    table: "MasterInvestments",
    timestamps: true,
    fields: &[
        FieldDef::required("name", Text),
        FieldDef::required("short_name", Text),
        FieldDef::required("yahoo_ticker", Text),
        FieldDef::required("investment_sector", Text),
        FieldDef::required("category_id", Integer),
    ],
    relations: &[
        RelationDef::belongs_to("investmentCategory", &INVESTMENT_CATEGORY_MASTER, "category_id"),
        RelationDef::has_many("incomes", &INCOMES, "investment_id"),
        RelationDef::has_many("transactions", &INVESTMENTS, "master_id"),
        RelationDef::has_many("marketRecords", &MARKET_DATA, "master_id"),
    ],
};

pub static EXPENSES: EntityDef = EntityDef {
    name: "Expenses",
    table: "TransactionExpenses",
    timestamps: true,
    fields: &[
        FieldDef::required("date_id", Integer),
        FieldDef::required("date", Date),
        FieldDef::required("master_id", Integer),
        FieldDef::required("bank_id", Integer),
        FieldDef::optional("asset_id", Integer),
        FieldDef::optional("emi_id", Integer),
        FieldDef::optional("insurance_id", Integer),
        FieldDef::required("vendor", Text),
        FieldDef::required("remarks", Text),
        FieldDef::required("amount", Decimal),
        FieldDef::required("tax_allowable_amount", Decimal),
    ],
    relations: &[
        RelationDef::belongs_to("calendarRecord", &CALENDAR_MASTER, "date_id"),
        RelationDef::belongs_to("masterRecord", &EXPENSE_MASTER, "master_id"),
        RelationDef::belongs_to("bankRecord", &BANK_MASTER, "bank_id"),
        RelationDef::belongs_to("assetRecord", &ASSET_MASTER, "asset_id"),
        RelationDef::belongs_to("emiRecord", &EMI_MASTER, "emi_id"),
        RelationDef::belongs_to("insuranceRecord", &INSURANCE_MASTER, "insurance_id"),
    ],
};

pub static INCOMES: EntityDef = EntityDef {
    name: "Incomes",
    table: "TransactionIncomes",
    timestamps: true,
    fields: &[
        FieldDef::required("date_id", Integer),
        FieldDef::required("date", Date),
        FieldDef::required("master_id", Integer),
        FieldDef::required("source_id", Integer),
        FieldDef::required("bank_id", Integer),
        FieldDef::optional("investment_id", Integer),
        FieldDef::required("remarks", Text),
        FieldDef::required("amount", Decimal),
        FieldDef::required("taxable_amount", Decimal),
    ],
    relations: &[
        RelationDef::belongs_to("calendarRecord", &CALENDAR_MASTER, "date_id"),
        RelationDef::belongs_to("masterRecord", &INCOME_MASTER, "master_id"),
        RelationDef::belongs_to("sourceRecord", &INCOME_SOURCE_MASTER, "source_id"),
        RelationDef::belongs_to("bankRecord", &BANK_MASTER, "bank_id"),
        RelationDef::belongs_to("investmentRecord", &INVESTMENT_MASTER, "investment_id"),
    ],
};

pub static INVESTMENTS: EntityDef = EntityDef {
    name: "Investments",
    table: "TransactionInvestments",
    timestamps: true,
    fields: &[
        FieldDef::required("date_id", Integer),
        FieldDef::required("date", Date),
        FieldDef::required("master_id", Integer),
        FieldDef::required("bank_id", Integer),
        FieldDef::required("cost", Decimal),
        FieldDef::required("units", Decimal),
        FieldDef::required("amount", Decimal),
        FieldDef::required("tax_allowable_amount", Decimal),
    ],
    relations: &[
        RelationDef::belongs_to("calendarRecord", &CALENDAR_MASTER, "date_id"),
        RelationDef::belongs_to("masterRecord", &INVESTMENT_MASTER, "master_id"),
        RelationDef::belongs_to("bankRecord", &BANK_MASTER, "bank_id"),
    ],
};

pub static OPENING_BALANCES: EntityDef = EntityDef {
    name: "OpeningBalances",
    table: "TransactionOpeningBalances",
    timestamps: true,
    fields: &[
        FieldDef::required("date_id", Integer),
        FieldDef::required("date", Date),
        FieldDef::required("bank_id", Integer),
        FieldDef::required("opening_balance", Decimal),
    ],
    relations: &[
        RelationDef::belongs_to("calendarRecord", &CALENDAR_MASTER, "date_id"),
        RelationDef::belongs_to("bankRecord", &BANK_MASTER, "bank_id"),
    ],
};

pub static MARKET_DATA: EntityDef = EntityDef {
    name: "MarketData",
    table: "TransactionMarketData",
    timestamps: true,
    fields: &[
        FieldDef::required("date_id", Integer),
        FieldDef::required("date", Date),
        FieldDef::required("master_id", Integer),
        FieldDef::optional("open", Decimal),
        FieldDef::optional("high", Decimal),
        FieldDef::optional("low", Decimal),
        FieldDef::optional("close", Decimal),
        FieldDef::optional("adj_close", Decimal),
        FieldDef::optional("volume", Decimal),
    ],
    relations: &[
        RelationDef::belongs_to("calendarRecord", &CALENDAR_MASTER, "date_id"),
        RelationDef::belongs_to("masterRecord", &INVESTMENT_MASTER, "master_id"),
    ],
};
