use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;
use thiserror::Error;

/// Storage and wire format of entry dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Widest axis built when no limit is configured, about ten years
pub const DEFAULT_MAX_DAYS: i64 = 3660;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChartError {
    #[error("no entries to chart")]
    Empty,

    #[error("invalid date '{value}', expected YYYY-MM-DD")]
    InvalidDate { value: String },

    #[error("entries span {days} days, at most {max_days} can be charted")]
    SpanTooLong { days: i64, max_days: i64 },
}

/// One observation joined from entries, activities and users
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ChartRow {
    pub entry_id: Option<i32>,
    pub user_id: i32,
    pub user_name: String,
    pub amount: i32,
    pub date: String,
    pub description: Option<String>,
}

/// How axis dates are rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateLabel {
    /// `MM-DD`. Drops the year, so labels repeat on ranges longer than a year.
    #[default]
    MonthDay,
    /// `YYYY-MM-DD`
    Iso,
}

impl DateLabel {
    fn format(self, date: NaiveDate) -> String {
        match self {
            DateLabel::MonthDay => date.format("%m-%d").to_string(),
            DateLabel::Iso => date.format(DATE_FORMAT).to_string(),
        }
    }
}

/// Dense per-user table. Every per-user vector has `date.len()` cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dataset {
    pub date: Vec<String>,
    pub amount: BTreeMap<i32, Vec<i32>>,
    pub entry_id: BTreeMap<i32, Vec<Option<i32>>>,
    pub description: BTreeMap<i32, Vec<Option<String>>>,
    pub user_id: Vec<i32>,
    pub name: BTreeMap<i32, String>,
}

/// Parse exactly `YYYY-MM-DD`. Signed or short years that chrono would accept are rejected.
pub fn parse_date(value: &str) -> Result<NaiveDate, ChartError> {
    let invalid = || ChartError::InvalidDate {
        value: value.to_string(),
    };

    let trimmed = value.trim();
    let well_formed = trimmed.len() == 10
        && trimmed.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return Err(invalid());
    }

    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| invalid())
}

/// Spread `rows` over every day between the earliest and latest row date.
///
/// Days without rows keep the defaults (amount 0, no entry id, no
/// description). When several rows land in the same `(user, day)` cell the
/// one that comes last in `rows` wins; amounts are not summed.
pub fn build_dataset(rows: &[ChartRow], label: DateLabel) -> Result<Dataset, ChartError> {
    build_dataset_within(rows, label, DEFAULT_MAX_DAYS)
}

/// [`build_dataset`] refusing axes longer than `max_days` days
pub fn build_dataset_within(rows: &[ChartRow], label: DateLabel, max_days: i64) -> Result<Dataset, ChartError> {
    let dates = rows
        .iter()
        .map(|row| parse_date(&row.date))
        .collect::<Result<Vec<_>, _>>()?;

    let (Some(&start), Some(&end)) = (dates.iter().min(), dates.iter().max()) else {
        return Err(ChartError::Empty);
    };

    let span = (end - start).num_days() + 1;
    if span > max_days {
        return Err(ChartError::SpanTooLong { days: span, max_days });
    }
    let days = span as usize;
    let axis: Vec<String> = start.iter_days().take(days).map(|d| label.format(d)).collect();

    let mut dataset = Dataset {
        date: axis,
        amount: BTreeMap::new(),
        entry_id: BTreeMap::new(),
        description: BTreeMap::new(),
        user_id: Vec::new(),
        name: BTreeMap::new(),
    };

    for row in rows {
        if dataset.name.contains_key(&row.user_id) {
            continue;
        }
        dataset.name.insert(row.user_id, row.user_name.clone());
        dataset.amount.insert(row.user_id, vec![0; days]);
        dataset.entry_id.insert(row.user_id, vec![None; days]);
        dataset.description.insert(row.user_id, vec![None; days]);
    }
    dataset.user_id = dataset.name.keys().copied().collect();

    for (row, date) in rows.iter().zip(&dates) {
        let cell = (*date - start).num_days() as usize;

        if let Some(amounts) = dataset.amount.get_mut(&row.user_id) {
            amounts[cell] = row.amount;
        }
        if let Some(descriptions) = dataset.description.get_mut(&row.user_id) {
            descriptions[cell] = row.description.clone().filter(|d| !d.is_empty());
        }
        if let Some(entry_ids) = dataset.entry_id.get_mut(&row.user_id) {
            entry_ids[cell] = row.entry_id.filter(|id| *id != 0);
        }
    }

    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(user_id: i32, date: &str, amount: i32) -> ChartRow {
        ChartRow {
            entry_id: Some(amount * 10 + user_id),
            user_id,
            user_name: format!("user{user_id}"),
            amount,
            date: date.to_string(),
            description: None,
        }
    }

    #[test]
    fn fills_gaps_between_first_and_last_day() {
        let rows = vec![row(1, "2024-01-01", 5), row(1, "2024-01-03", 7)];
        let dataset = build_dataset(&rows, DateLabel::MonthDay).unwrap();

        assert_eq!(dataset.date, vec!["01-01", "01-02", "01-03"]);
        assert_eq!(dataset.amount[&1], vec![5, 0, 7]);
        assert_eq!(dataset.entry_id[&1], vec![Some(51), None, Some(71)]);
        assert_eq!(dataset.description[&1], vec![None, None, None]);
        assert_eq!(dataset.user_id, vec![1]);
        assert_eq!(dataset.name[&1], "user1");
    }

    #[test]
    fn empty_rows_are_not_found() {
        assert_eq!(build_dataset(&[], DateLabel::MonthDay), Err(ChartError::Empty));
    }

    #[test]
    fn malformed_date_is_rejected() {
        let rows = vec![row(1, "2024-01-01", 5), row(1, "01/02/2024", 7)];
        assert_eq!(
            build_dataset(&rows, DateLabel::MonthDay),
            Err(ChartError::InvalidDate { value: "01/02/2024".into() })
        );
    }

    #[test]
    fn only_plain_four_digit_years_parse() {
        assert!(parse_date("2024-01-31").is_ok());
        for value in ["+12345-01-01", "-0001-01-01", "+2024-01-01", "2024-1-01", "24-01-01", "2024/01/01"] {
            assert_eq!(
                parse_date(value),
                Err(ChartError::InvalidDate { value: value.into() }),
                "{value}"
            );
        }
    }

    #[test]
    fn users_share_one_axis_and_are_sorted() {
        let rows = vec![
            row(9, "2024-03-02", 1),
            row(4, "2024-02-28", 2),
            row(9, "2024-03-01", 3),
            row(4, "2024-02-29", 4),
        ];
        let dataset = build_dataset(&rows, DateLabel::Iso).unwrap();

        assert_eq!(dataset.date, vec!["2024-02-28", "2024-02-29", "2024-03-01", "2024-03-02"]);
        assert_eq!(dataset.user_id, vec![4, 9]);
        assert_eq!(dataset.amount[&4], vec![2, 4, 0, 0]);
        assert_eq!(dataset.amount[&9], vec![0, 0, 3, 1]);
    }

    #[test]
    fn every_series_matches_axis_length() {
        let rows = vec![row(1, "2023-12-30", 1), row(2, "2024-01-02", 2), row(3, "2024-01-01", 3)];
        let dataset = build_dataset(&rows, DateLabel::MonthDay).unwrap();

        let expected = (parse_date("2024-01-02").unwrap() - parse_date("2023-12-30").unwrap()).num_days() + 1;
        assert_eq!(dataset.date.len() as i64, expected);
        for user in &dataset.user_id {
            assert_eq!(dataset.amount[user].len(), dataset.date.len());
            assert_eq!(dataset.entry_id[user].len(), dataset.date.len());
            assert_eq!(dataset.description[user].len(), dataset.date.len());
            assert!(dataset.name.contains_key(user));
        }
    }

    #[test]
    fn later_row_wins_on_same_cell() {
        let mut first = row(1, "2024-05-05", 3);
        first.description = Some("first".into());
        let mut second = row(1, "2024-05-05", 8);
        second.description = Some("second".into());

        let dataset = build_dataset(&[first, second.clone()], DateLabel::MonthDay).unwrap();
        assert_eq!(dataset.amount[&1], vec![8]);
        assert_eq!(dataset.description[&1], vec![Some("second".to_string())]);
        assert_eq!(dataset.entry_id[&1], vec![second.entry_id]);
    }

    #[test]
    fn blank_description_and_zero_id_become_null() {
        let mut r = row(1, "2024-01-01", 5);
        r.description = Some(String::new());
        r.entry_id = Some(0);
        let dataset = build_dataset(&[r], DateLabel::MonthDay).unwrap();
        assert_eq!(dataset.description[&1], vec![None]);
        assert_eq!(dataset.entry_id[&1], vec![None]);
    }

    #[test]
    fn name_comes_from_first_row() {
        let mut later = row(1, "2024-01-02", 1);
        later.user_name = "renamed".into();
        let dataset = build_dataset(&[row(1, "2024-01-01", 1), later], DateLabel::MonthDay).unwrap();
        assert_eq!(dataset.name[&1], "user1");
    }

    #[test]
    fn every_input_cell_lands_at_its_day() {
        let rows = vec![row(2, "2024-06-10", 4), row(1, "2024-06-01", 6), row(2, "2024-06-03", 9)];
        let dataset = build_dataset(&rows, DateLabel::Iso).unwrap();

        for r in &rows {
            let index = dataset.date.iter().position(|d| d == &r.date).unwrap();
            assert_eq!(dataset.amount[&r.user_id][index], r.amount);
            assert_eq!(dataset.entry_id[&r.user_id][index], r.entry_id);
        }
        let filled: usize = dataset.amount.values().flatten().filter(|a| **a != 0).count();
        assert_eq!(filled, rows.len());
    }

    #[test]
    fn building_twice_is_identical() {
        let rows = vec![row(3, "2024-01-05", 1), row(1, "2024-01-01", 2)];
        assert_eq!(
            build_dataset(&rows, DateLabel::MonthDay).unwrap(),
            build_dataset(&rows, DateLabel::MonthDay).unwrap()
        );
    }

    #[test]
    fn month_day_labels_repeat_across_years() {
        let rows = vec![row(1, "2023-01-01", 1), row(1, "2024-01-01", 2)];
        let dataset = build_dataset(&rows, DateLabel::MonthDay).unwrap();

        assert_eq!(dataset.date.len(), 366);
        assert_eq!(dataset.date.first().unwrap(), "01-01");
        assert_eq!(dataset.date.last().unwrap(), "01-01");
        assert_eq!(dataset.amount[&1][0], 1);
        assert_eq!(dataset.amount[&1][365], 2);
    }

    #[test]
    fn refuses_axis_wider_than_limit() {
        let rows = vec![row(1, "0001-01-01", 1), row(1, "9999-12-31", 2)];
        assert!(matches!(
            build_dataset(&rows, DateLabel::MonthDay),
            Err(ChartError::SpanTooLong { max_days: DEFAULT_MAX_DAYS, .. })
        ));

        let rows = vec![row(1, "2024-01-01", 1), row(1, "2024-01-10", 2)];
        assert_eq!(
            build_dataset_within(&rows, DateLabel::MonthDay, 9),
            Err(ChartError::SpanTooLong { days: 10, max_days: 9 })
        );
        assert_eq!(build_dataset_within(&rows, DateLabel::MonthDay, 10).unwrap().date.len(), 10);
    }

    #[test]
    fn serializes_user_keys_as_strings() {
        let dataset = build_dataset(&[row(7, "2024-01-01", 5)], DateLabel::MonthDay).unwrap();
        let value = serde_json::to_value(&dataset).unwrap();
        assert_eq!(value["amount"]["7"], serde_json::json!([5]));
        assert_eq!(value["user_id"], serde_json::json!([7]));
        assert_eq!(value["name"]["7"], "user7");
    }
}
