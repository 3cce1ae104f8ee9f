//! Player report rollups
//!
//! The report is returned as JSON. Rendering it to a document is left to the
//! client.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;

use super::player::PlayerDetail;
use crate::money::serialize_cents;

/// Full years between `birth_date` and `today`
pub fn age_on(birth_date: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    age.max(0)
}

/// Calendar month as `(year, month)`
pub type YearMonth = (i32, u32);

/// The `count` months ending with the month of `today`, oldest first
pub fn trailing_months(today: NaiveDate, count: u32) -> Vec<YearMonth> {
    let current = today.year() * 12 + today.month0() as i32;
    (0..count as i32)
        .rev()
        .map(|back| {
            let index = current - back;
            (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
        })
        .collect()
}

/// First day of the oldest month in the trailing window
pub fn window_start(today: NaiveDate, count: u32) -> NaiveDate {
    let (year, month) = trailing_months(today, count.max(1))[0];
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(today)
}

/// Expense sum of one calendar month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyExpense {
    /// `YYYY-MM`
    pub month: String,
    #[serde(serialize_with = "serialize_cents")]
    pub total: i64,
}

/// Lay `sums` over `months`, reporting months without expenses as zero
pub fn monthly_totals(months: &[YearMonth], sums: &[(i32, u32, i64)]) -> Vec<MonthlyExpense> {
    months
        .iter()
        .map(|&(year, month)| MonthlyExpense {
            month: format!("{:04}-{:02}", year, month),
            total: sums
                .iter()
                .filter(|(y, m, _)| *y == year && *m == month)
                .map(|(_, _, cents)| cents)
                .sum(),
        })
        .collect()
}

/// Mean value of one parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterAverage {
    pub parameter: String,
    pub average: f64,
}

/// Parameter means of one evaluation type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeAverages {
    pub evaluation_type: String,
    pub parameters: Vec<ParameterAverage>,
}

/// Group `(type, parameter, average)` rows by type, keeping row order
pub fn group_averages(rows: Vec<(String, String, f64)>) -> Vec<TypeAverages> {
    let mut groups: Vec<TypeAverages> = Vec::new();
    for (evaluation_type, parameter, average) in rows {
        let entry = ParameterAverage { parameter, average };
        match groups.last_mut() {
            Some(group) if group.evaluation_type == evaluation_type => group.parameters.push(entry),
            _ => groups.push(TypeAverages {
                evaluation_type,
                parameters: vec![entry],
            }),
        }
    }
    groups
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpenseSummary {
    #[serde(serialize_with = "serialize_cents")]
    pub amount: i64,
    pub description: String,
    pub occurred_on: NaiveDate,
}

/// One scored parameter of a recent evaluation
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationRow {
    pub evaluation_id: i32,
    pub evaluated_at: DateTime<Utc>,
    pub evaluation_type: String,
    pub parameter: String,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerReport {
    pub generated_at: DateTime<Utc>,
    pub player: PlayerDetail,
    pub age: i32,
    pub averages: Vec<TypeAverages>,
    pub monthly_expenses: Vec<MonthlyExpense>,
    #[serde(serialize_with = "serialize_cents")]
    pub total_spent: i64,
    pub last_expense: Option<ExpenseSummary>,
    pub recent_evaluations: Vec<EvaluationRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn age_counts_completed_years() {
        assert_eq!(age_on(date(2012, 6, 15), date(2025, 6, 14)), 12);
        assert_eq!(age_on(date(2012, 6, 15), date(2025, 6, 15)), 13);
        assert_eq!(age_on(date(2012, 2, 29), date(2025, 3, 1)), 13);
        assert_eq!(age_on(date(2030, 1, 1), date(2025, 1, 1)), 0);
    }

    #[test]
    fn trailing_months_cross_year_boundary() {
        assert_eq!(
            trailing_months(date(2025, 2, 20), 4),
            vec![(2024, 11), (2024, 12), (2025, 1), (2025, 2)]
        );
        assert_eq!(trailing_months(date(2025, 7, 1), 1), vec![(2025, 7)]);
        assert!(trailing_months(date(2025, 7, 1), 0).is_empty());
    }

    #[test]
    fn window_starts_on_first_day_of_oldest_month() {
        assert_eq!(window_start(date(2025, 2, 20), 4), date(2024, 11, 1));
        assert_eq!(window_start(date(2025, 2, 20), 0), date(2025, 2, 1));
    }

    #[test]
    fn empty_months_are_zero_filled() {
        let months = trailing_months(date(2025, 3, 10), 4);
        let totals = monthly_totals(&months, &[(2025, 1, 10_000), (2025, 3, 2_550)]);

        let rendered: Vec<(&str, i64)> =
            totals.iter().map(|m| (m.month.as_str(), m.total)).collect();
        assert_eq!(
            rendered,
            vec![
                ("2024-12", 0),
                ("2025-01", 10_000),
                ("2025-02", 0),
                ("2025-03", 2_550)
            ]
        );
    }

    #[test]
    fn averages_group_by_type_in_row_order() {
        let groups = group_averages(vec![
            ("fisico".into(), "resistencia".into(), 6.5),
            ("fisico".into(), "velocidad".into(), 8.0),
            ("tecnico".into(), "pase".into(), 7.25),
        ]);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].evaluation_type, "fisico");
        assert_eq!(groups[0].parameters.len(), 2);
        assert_eq!(groups[1].parameters[0].parameter, "pase");
        assert_eq!(groups[1].parameters[0].average, 7.25);
    }
}
