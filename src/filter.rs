//! City and date-range filtering over read-only tables.
//!
//! Filters never touch the base table; they return a view of borrowed rows.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::models::{AqiRecord, CityHourRecord, StationRecord};
use crate::store::Table;

/// City value meaning "no city filter".
pub const ALL_CITIES: &str = "All";

/// A record that can be placed on the calendar.
pub trait Dated {
    fn day(&self) -> Option<NaiveDate>;
}

/// A record that belongs to one city.
pub trait CityScoped {
    fn city(&self) -> &str;
}

impl Dated for AqiRecord {
    fn day(&self) -> Option<NaiveDate> {
        self.date
    }
}

impl Dated for StationRecord {
    fn day(&self) -> Option<NaiveDate> {
        self.date
    }
}

impl Dated for CityHourRecord {
    fn day(&self) -> Option<NaiveDate> {
        self.datetime.as_ref().map(NaiveDateTime::date)
    }
}

impl CityScoped for AqiRecord {
    fn city(&self) -> &str {
        &self.city
    }
}

impl CityScoped for CityHourRecord {
    fn city(&self) -> &str {
        &self.city
    }
}

/// Per-request filter. Both date bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterCriteria {
    pub city: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl FilterCriteria {
    pub fn new(city: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            city: city.into(),
            start_date,
            end_date,
        }
    }

    pub fn all_cities(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self::new(ALL_CITIES, start_date, end_date)
    }

    /// The city to match, or `None` when every city is selected.
    pub fn city_filter(&self) -> Option<&str> {
        (self.city != ALL_CITIES).then_some(self.city.as_str())
    }

    /// Rows without a date are always out of range. An inverted range
    /// matches nothing.
    pub fn contains_date(&self, date: Option<NaiveDate>) -> bool {
        date.is_some_and(|d| self.start_date <= d && d <= self.end_date)
    }

    pub fn matches_city(&self, city: &str) -> bool {
        self.city_filter().map_or(true, |selected| selected == city)
    }
}

/// Applies the date range only. Used for tables without a city column.
pub fn filter_by_date<'a, T: Dated>(table: &'a Table<T>, criteria: &FilterCriteria) -> Vec<&'a T> {
    table
        .iter()
        .filter(|row| criteria.contains_date(row.day()))
        .collect()
}

/// Applies the city predicate (exact, case-sensitive) and the date range.
pub fn filter<'a, T: Dated + CityScoped>(
    table: &'a Table<T>,
    criteria: &FilterCriteria,
) -> Vec<&'a T> {
    table
        .iter()
        .filter(|row| criteria.matches_city(row.city()) && criteria.contains_date(row.day()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rec(city: &str, date: Option<NaiveDate>, aqi: Option<f64>) -> AqiRecord {
        AqiRecord {
            city: city.to_string(),
            date,
            aqi,
        }
    }

    fn sample() -> Table<AqiRecord> {
        Table::from_rows(vec![
            rec("Delhi", Some(ymd(2020, 1, 1)), Some(300.0)),
            rec("Delhi", Some(ymd(2020, 1, 5)), Some(280.0)),
            rec("delhi", Some(ymd(2020, 1, 2)), Some(10.0)),
            rec("Mumbai", Some(ymd(2020, 1, 3)), None),
            rec("Mumbai", None, Some(90.0)),
        ])
    }

    #[test]
    fn test_all_cities_keeps_every_dated_row_in_range() {
        let table = sample();
        let criteria = FilterCriteria::all_cities(ymd(2020, 1, 1), ymd(2020, 1, 5));
        let rows = filter(&table, &criteria);
        assert_eq!(rows.len(), 4);
    }

    #[test]
    fn test_city_match_is_exact_and_case_sensitive() {
        let table = sample();
        let criteria = FilterCriteria::new("Delhi", ymd(2020, 1, 1), ymd(2020, 12, 31));
        let rows = filter(&table, &criteria);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.city == "Delhi"));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let table = sample();
        let criteria = FilterCriteria::new("Delhi", ymd(2020, 1, 5), ymd(2020, 1, 5));
        let rows = filter(&table, &criteria);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].aqi, Some(280.0));
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let table = sample();
        let criteria = FilterCriteria::all_cities(ymd(2020, 2, 1), ymd(2020, 1, 1));
        assert!(filter(&table, &criteria).is_empty());
    }

    #[test]
    fn test_null_dates_never_match() {
        let table = sample();
        let criteria = FilterCriteria::new("Mumbai", NaiveDate::MIN, NaiveDate::MAX);
        let rows = filter(&table, &criteria);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].date.is_some());
    }

    #[test]
    fn test_empty_table_filters_to_empty() {
        let table: Table<AqiRecord> = Table::empty();
        let criteria = FilterCriteria::all_cities(ymd(2020, 1, 1), ymd(2020, 1, 5));
        assert!(filter(&table, &criteria).is_empty());
    }

    #[test]
    fn test_filter_by_date_ignores_city() {
        let table = Table::from_rows(vec![
            StationRecord {
                station: "AP001".to_string(),
                date: Some(ymd(2020, 1, 1)),
                aqi: Some(50.0),
            },
            StationRecord {
                station: "DL001".to_string(),
                date: Some(ymd(2021, 1, 1)),
                aqi: Some(70.0),
            },
        ]);
        let criteria = FilterCriteria::new("Delhi", ymd(2020, 1, 1), ymd(2020, 6, 1));
        let rows = filter_by_date(&table, &criteria);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].station, "AP001");
    }

    #[test]
    fn test_hourly_rows_filter_on_calendar_date() {
        let table = Table::from_rows(vec![CityHourRecord {
            city: "Delhi".to_string(),
            datetime: ymd(2020, 1, 5).and_hms_opt(23, 0, 0),
            aqi: Some(200.0),
        }]);
        let criteria = FilterCriteria::all_cities(ymd(2020, 1, 1), ymd(2020, 1, 5));
        assert_eq!(filter(&table, &criteria).len(), 1);
    }

    #[test]
    fn test_base_table_is_untouched() {
        let table = sample();
        let before = table.clone();
        let criteria = FilterCriteria::new("Delhi", ymd(2020, 1, 1), ymd(2020, 1, 1));
        let _ = filter(&table, &criteria);
        assert_eq!(table, before);
    }
}
