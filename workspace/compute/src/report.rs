//! Finance reporting: date-windowed aggregation over income and expense
//! entries. Pure read-side; every report is recomputed from the stored
//! entries on each call.

use chrono::{Datelike, Days, Months, NaiveDate};
use common::{DateRange, FinanceReport, LedgerEntryDto, ReportRange};
use model::entities::{expense_entry, income_entry};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use tracing::{debug, instrument};

use crate::error::{ComputeError, Result};

/// Parameters for a report request. Month offsets are only meaningful for
/// the monthly range (0 = current month, 1 = previous, ...).
#[derive(Debug, Clone, Copy)]
pub struct ReportParams {
    pub range: ReportRange,
    pub month_start: Option<u32>,
    pub month_end: Option<u32>,
}

fn start_of_day(date: NaiveDate) -> Result<chrono::NaiveDateTime> {
    date.and_hms_opt(0, 0, 0)
        .ok_or_else(|| ComputeError::Date(format!("invalid start of day for {date}")))
}

fn end_of_day(date: NaiveDate) -> Result<chrono::NaiveDateTime> {
    date.and_hms_milli_opt(23, 59, 59, 999)
        .ok_or_else(|| ComputeError::Date(format!("invalid end of day for {date}")))
}

/// Today, midnight through 23:59:59.999.
pub fn daily_range(today: NaiveDate) -> Result<DateRange> {
    Ok(DateRange {
        start: start_of_day(today)?,
        end: end_of_day(today)?,
    })
}

/// Monday through Sunday of the week containing `today`. On a Sunday the
/// Monday lies six days back, matching the ISO week.
pub fn weekly_range(today: NaiveDate) -> Result<DateRange> {
    let days_from_monday = today.weekday().num_days_from_monday();
    let monday = today
        .checked_sub_days(Days::new(u64::from(days_from_monday)))
        .ok_or_else(|| ComputeError::Date("week start out of range".to_string()))?;
    let sunday = monday
        .checked_add_days(Days::new(6))
        .ok_or_else(|| ComputeError::Date("week end out of range".to_string()))?;
    Ok(DateRange {
        start: start_of_day(monday)?,
        end: end_of_day(sunday)?,
    })
}

/// First day of the month `start_offset` months back through the last day
/// of the month `end_offset` months back.
pub fn monthly_range(today: NaiveDate, start_offset: u32, end_offset: u32) -> Result<DateRange> {
    if start_offset < end_offset {
        return Err(ComputeError::Validation(
            "monthStart must not be more recent than monthEnd".to_string(),
        ));
    }

    let first_of_current = today
        .with_day(1)
        .ok_or_else(|| ComputeError::Date("invalid first of month".to_string()))?;
    let start = first_of_current
        .checked_sub_months(Months::new(start_offset))
        .ok_or_else(|| ComputeError::Date("month start out of range".to_string()))?;
    // Last day of the end month: first of the following month minus a day
    let end = first_of_current
        .checked_sub_months(Months::new(end_offset))
        .and_then(|d| d.checked_add_months(Months::new(1)))
        .and_then(|d| d.checked_sub_days(Days::new(1)))
        .ok_or_else(|| ComputeError::Date("month end out of range".to_string()))?;

    Ok(DateRange {
        start: start_of_day(start)?,
        end: end_of_day(end)?,
    })
}

/// Resolve the requested window relative to `today`.
pub fn resolve_range(params: ReportParams, today: NaiveDate) -> Result<DateRange> {
    match params.range {
        ReportRange::Daily => daily_range(today),
        ReportRange::Weekly => weekly_range(today),
        ReportRange::Monthly => monthly_range(
            today,
            params.month_start.unwrap_or(0),
            params.month_end.unwrap_or(0),
        ),
    }
}

/// Build the report for `today` as the reference date. Split out from
/// [`report`] so the window arithmetic is testable with a fixed date.
#[instrument(skip(db))]
pub async fn report_for_date(
    db: &DatabaseConnection,
    user_id: i32,
    params: ReportParams,
    today: NaiveDate,
) -> Result<FinanceReport> {
    let period = resolve_range(params, today)?;
    debug!(start = %period.start, end = %period.end, "Resolved report window");

    let incomes = income_entry::Entity::find()
        .filter(income_entry::Column::UserId.eq(user_id))
        .filter(income_entry::Column::Date.gte(period.start))
        .filter(income_entry::Column::Date.lte(period.end))
        .order_by_desc(income_entry::Column::Date)
        .all(db)
        .await?;

    let expenses = expense_entry::Entity::find()
        .filter(expense_entry::Column::UserId.eq(user_id))
        .filter(expense_entry::Column::Date.gte(period.start))
        .filter(expense_entry::Column::Date.lte(period.end))
        .order_by_desc(expense_entry::Column::Date)
        .all(db)
        .await?;

    let income_details = incomes
        .into_iter()
        .map(|e| LedgerEntryDto {
            id: e.id,
            amount: e.amount,
            description: e.description,
            date: e.date,
        })
        .collect();
    let expense_details = expenses
        .into_iter()
        .map(|e| LedgerEntryDto {
            id: e.id,
            amount: e.amount,
            description: e.description,
            date: e.date,
        })
        .collect();

    Ok(FinanceReport::from_entries(
        params.range,
        period,
        income_details,
        expense_details,
    ))
}

/// Build the report relative to the current local date.
pub async fn report(
    db: &DatabaseConnection,
    user_id: i32,
    params: ReportParams,
) -> Result<FinanceReport> {
    report_for_date(db, user_id, params, chrono::Local::now().date_naive()).await
}
