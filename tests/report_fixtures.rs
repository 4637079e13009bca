mod common;

use common::read_fixture;
use statementkit::StatementKind;
use statementkit::parsing::report::ReportParser;

const BALANCE_SHEET_FIXTURE: &str = "reports/balance_sheet.htm";
const INCOME_STATEMENT_FIXTURE: &str = "reports/income_statement.htm";

#[test]
fn parse_balance_sheet_fixture() {
    let html = read_fixture(BALANCE_SHEET_FIXTURE);
    let report = ReportParser::new(StatementKind::BalanceSheet)
        .parse(&html)
        .unwrap();

    assert!(report.title.starts_with("CONSOLIDATED BALANCE SHEETS"));
    assert_eq!(report.duration, None);
    assert_eq!(report.dates, vec!["Sep. 26, 2020", "Sep. 28, 2019"]);
    assert!(report.issues.is_empty());

    // Marker rows carry no values and are not data rows.
    assert_eq!(report.rows.len(), 4);

    let cash = &report.rows[0];
    assert_eq!(cash.item, "Cash and cash equivalents");
    assert_eq!(
        cash.tag,
        "defref_us-gaap_CashAndCashEquivalentsAtCarryingValue"
    );
    assert_eq!(cash.values, vec!["$ 38,016", "$ 48,844"]);
    assert_eq!(cash.axis, "");
    assert_eq!(cash.abstract_marker, "defref_us-gaap_AssetsCurrentAbstract");
}

#[test]
fn balance_sheet_axis_carry_forward() {
    let html = read_fixture(BALANCE_SHEET_FIXTURE);
    let report = ReportParser::new(StatementKind::BalanceSheet)
        .parse(&html)
        .unwrap();

    // Rows above the axis marker have no axis; the row below it does. The
    // abstract marker set earlier keeps applying across the axis change.
    let total = &report.rows[2];
    assert_eq!(total.item, "Total current assets");
    assert_eq!(total.axis, "");

    let stock = &report.rows[3];
    assert_eq!(stock.item, "Common stock");
    assert_eq!(stock.axis, "defref_us-gaap_StatementClassOfStockAxis");
    assert_eq!(stock.abstract_marker, "defref_us-gaap_AssetsCurrentAbstract");
}

#[test]
fn parse_income_statement_fixture() {
    let html = read_fixture(INCOME_STATEMENT_FIXTURE);
    let report = ReportParser::new(StatementKind::IncomeStatement)
        .parse(&html)
        .unwrap();

    assert!(report.title.starts_with("CONSOLIDATED STATEMENTS OF OPERATIONS"));
    assert_eq!(report.duration.as_deref(), Some("12 Months Ended"));
    assert_eq!(
        report.dates,
        vec!["Sep. 26, 2020", "Sep. 28, 2019", "Sep. 29, 2018"]
    );
    assert!(report.issues.is_empty());

    assert_eq!(report.rows.len(), 3);
    let sales = &report.rows[0];
    assert_eq!(sales.item, "Net sales");
    assert_eq!(
        sales.tag,
        "defref_us-gaap_RevenueFromContractWithCustomerExcludingAssessedTax"
    );
    assert_eq!(sales.values.len(), 3);
    assert_eq!(sales.values[0], "$ 274,515");
    assert_eq!(
        sales.abstract_marker,
        "defref_us-gaap_IncomeStatementAbstract"
    );
}

#[test]
fn concept_tags_come_from_onclick_attributes() {
    let html = read_fixture(INCOME_STATEMENT_FIXTURE);
    let report = ReportParser::new(StatementKind::IncomeStatement)
        .parse(&html)
        .unwrap();

    let tags: Vec<&str> = report.tags().collect();
    assert_eq!(
        tags,
        vec![
            "defref_us-gaap_RevenueFromContractWithCustomerExcludingAssessedTax",
            "defref_us-gaap_CostOfGoodsAndServicesSold",
            "defref_us-gaap_GrossProfit",
        ]
    );
}
