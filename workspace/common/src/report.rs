use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Reporting window selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReportRange {
    /// Today, midnight to 23:59:59.999.
    Daily,
    /// Monday through Sunday of the current week.
    Weekly,
    /// Caller-supplied month offsets (0 = current month, 1 = previous...).
    Monthly,
}

/// Inclusive datetime window a report was computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Summed totals for a report window. Integer currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReportTotals {
    pub income: i64,
    pub expense: i64,
    /// `income - expense`.
    pub profit: i64,
}

/// One ledger movement included in a report's detail listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LedgerEntryDto {
    pub id: i32,
    pub amount: i64,
    pub description: String,
    pub date: NaiveDateTime,
}

/// A complete finance report: the window, the sums and the raw movements
/// they were derived from. Recomputed on every request, never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinanceReport {
    pub range: ReportRange,
    pub period: DateRange,
    pub totals: ReportTotals,
    pub income_details: Vec<LedgerEntryDto>,
    pub expense_details: Vec<LedgerEntryDto>,
}

impl FinanceReport {
    /// Assemble a report from the movements found inside `period`.
    pub fn from_entries(
        range: ReportRange,
        period: DateRange,
        income_details: Vec<LedgerEntryDto>,
        expense_details: Vec<LedgerEntryDto>,
    ) -> Self {
        let income: i64 = income_details.iter().map(|e| e.amount).sum();
        let expense: i64 = expense_details.iter().map(|e| e.amount).sum();
        Self {
            range,
            period,
            totals: ReportTotals {
                income,
                expense,
                profit: income - expense,
            },
            income_details,
            expense_details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entry(id: i32, amount: i64) -> LedgerEntryDto {
        LedgerEntryDto {
            id,
            amount,
            description: format!("entry {id}"),
            date: NaiveDate::from_ymd_opt(2024, 3, 6)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn totals_are_summed_and_profit_derived() {
        let period = DateRange {
            start: NaiveDate::from_ymd_opt(2024, 3, 6)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 3, 6)
                .unwrap()
                .and_hms_milli_opt(23, 59, 59, 999)
                .unwrap(),
        };
        let report = FinanceReport::from_entries(
            ReportRange::Daily,
            period,
            vec![entry(1, 5000), entry(2, 7000)],
            vec![entry(3, 3000)],
        );
        assert_eq!(report.totals.income, 12000);
        assert_eq!(report.totals.expense, 3000);
        assert_eq!(report.totals.profit, 9000);
    }

    #[test]
    fn report_detail_keys_serialize_camel_case() {
        let period = DateRange {
            start: NaiveDate::from_ymd_opt(2024, 3, 6)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 3, 6)
                .unwrap()
                .and_hms_milli_opt(23, 59, 59, 999)
                .unwrap(),
        };
        let report =
            FinanceReport::from_entries(ReportRange::Daily, period, vec![entry(1, 100)], vec![]);
        let value = serde_json::to_value(&report).unwrap();
        assert!(value.get("incomeDetails").is_some());
        assert!(value.get("expenseDetails").is_some());
        assert!(value.get("income_details").is_none());
    }

    #[test]
    fn range_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ReportRange::Weekly).unwrap(),
            "\"weekly\""
        );
    }
}
