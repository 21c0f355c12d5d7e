//! Time axes for characterized records.
//!
//! Characterization expands a single pulse emission into a series of rows covering
//! the time horizon. The rows are placed on a [`TimeGrid`] which pairs each calendar
//! date with the elapsed time in years since the emission.

use chrono::{Months, NaiveDate};
use num::Float;
use serde::{Deserialize, Serialize};

pub type FloatValue = f64;
/// Elapsed time since an emission, in years
pub type Time = f64;

/// Length of a year used to convert day offsets into elapsed years
pub const DAYS_PER_YEAR: FloatValue = 365.25;

/// Resolution of the time grid used for time-series metrics
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    /// One step per year, placed on the anniversaries of the emission date
    #[default]
    Yearly,
    /// One step per calendar day
    Daily,
}

impl Resolution {
    /// Width of a single step in years
    pub fn step(&self) -> Time {
        match self {
            Resolution::Yearly => 1.0,
            Resolution::Daily => 1.0 / DAYS_PER_YEAR,
        }
    }
}

/// A single point on a [`TimeGrid`]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GridPoint {
    pub date: NaiveDate,
    /// Elapsed years since the start of the grid
    pub elapsed: Time,
}

/// Dates and elapsed times spanning `[start, start + horizon years)`
#[derive(Clone, Debug, PartialEq)]
pub struct TimeGrid {
    points: Vec<GridPoint>,
    resolution: Resolution,
}

impl TimeGrid {
    /// Grid over `horizon_years` from `start`.
    ///
    /// Returns `None` if the end of the horizon is not a representable date.
    pub fn new(start: NaiveDate, horizon_years: u32, resolution: Resolution) -> Option<Self> {
        let end = add_years(start, horizon_years)?;
        let points = match resolution {
            Resolution::Yearly => (0..horizon_years)
                .map(|year| {
                    add_years(start, year).map(|date| GridPoint {
                        date,
                        elapsed: year as Time,
                    })
                })
                .collect::<Option<Vec<_>>>()?,
            Resolution::Daily => {
                let days = (end - start).num_days();
                start
                    .iter_days()
                    .take(days.max(0) as usize)
                    .enumerate()
                    .map(|(day, date)| GridPoint {
                        date,
                        elapsed: day as Time / DAYS_PER_YEAR,
                    })
                    .collect()
            }
        };

        Some(Self { points, resolution })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn iter(&self) -> impl Iterator<Item = &GridPoint> {
        self.points.iter()
    }
}

/// Add a whole number of years to a date.
///
/// 29 February maps onto 28 February in non-leap years. Returns `None` past the last
/// representable date.
pub fn add_years(date: NaiveDate, years: u32) -> Option<NaiveDate> {
    let months = years.checked_mul(12)?;
    date.checked_add_months(Months::new(months))
}

/// Linearly interpolate `y(x)` from tabulated points.
///
/// `xs` must be sorted ascending. Targets outside the tabulated range take the
/// nearest end value.
pub fn interpolate<T: Float>(xs: &[T], ys: &[T], x: T) -> T {
    debug_assert_eq!(xs.len(), ys.len());
    debug_assert!(!xs.is_empty());

    if x <= xs[0] {
        return ys[0];
    }
    let last = xs.len() - 1;
    if x >= xs[last] {
        return ys[last];
    }

    // First index with xs[i] > x
    let upper = xs.partition_point(|value| *value <= x);
    let lower = upper - 1;
    let weight = (x - xs[lower]) / (xs[upper] - xs[lower]);
    ys[lower] + weight * (ys[upper] - ys[lower])
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn yearly_grid_uses_anniversaries() {
        let grid = TimeGrid::new(date(2020, 1, 1), 3, Resolution::Yearly).unwrap();
        let dates: Vec<_> = grid.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![date(2020, 1, 1), date(2021, 1, 1), date(2022, 1, 1)]);
        assert_eq!(grid.iter().last().unwrap().elapsed, 2.0);
    }

    #[test]
    fn daily_grid_covers_leap_year() {
        let grid = TimeGrid::new(date(2020, 1, 1), 1, Resolution::Daily).unwrap();
        assert_eq!(grid.len(), 366);
        let second = grid.iter().nth(1).unwrap();
        assert_eq!(second.date, date(2020, 1, 2));
        assert!(is_close!(second.elapsed, 1.0 / DAYS_PER_YEAR));
    }

    #[test]
    fn add_years_handles_leap_day() {
        assert_eq!(add_years(date(2020, 2, 29), 1), Some(date(2021, 2, 28)));
        assert_eq!(add_years(date(2020, 2, 29), 4), Some(date(2024, 2, 29)));
    }

    #[test]
    fn add_years_past_last_date() {
        // Overflows the month count
        assert_eq!(add_years(date(2020, 1, 1), 400_000_000), None);
        // Beyond NaiveDate::MAX
        assert_eq!(add_years(date(2020, 1, 1), 300_000), None);
        assert!(add_years(date(2020, 1, 1), 200_000).is_some());

        assert!(TimeGrid::new(date(2020, 1, 1), 300_000, Resolution::Yearly).is_none());
        assert!(TimeGrid::new(date(2020, 1, 1), 300_000, Resolution::Daily).is_none());
    }

    #[test]
    fn interpolate_inside_and_outside_range() {
        let xs = [2020.0, 2030.0, 2040.0];
        let ys = [1.0, 2.0, 4.0];
        assert!(is_close!(interpolate(&xs, &ys, 2025.0), 1.5));
        assert!(is_close!(interpolate(&xs, &ys, 2030.0), 2.0));
        assert!(is_close!(interpolate(&xs, &ys, 2035.0), 3.0));
        assert!(is_close!(interpolate(&xs, &ys, 2000.0), 1.0));
        assert!(is_close!(interpolate(&xs, &ys, 2100.0), 4.0));
    }
}
