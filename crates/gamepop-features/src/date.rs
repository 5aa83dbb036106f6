//! Release-date decomposition.
//!
//! A release date becomes three numeric columns: calendar year, calendar
//! month, and whole days elapsed between the release and a fixed reference
//! date (the catalog snapshot date). Dates that cannot be parsed become
//! `NaN` in all three columns rather than an error.

use chrono::{Datelike as _, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Output column names, in output order.
pub const DATE_FEATURE_NAMES: [&str; 3] = ["release_year", "release_month", "days_since_release"];

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%b %d, %Y", "%d %b, %Y", "%B %d, %Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// The catalog snapshot date used when no other reference date is given.
#[must_use]
pub fn default_reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 31).unwrap_or(NaiveDate::MIN)
}

/// Parses a release date in any of the formats the catalog is known to use.
///
/// ```
/// use chrono::NaiveDate;
/// use gamepop_features::date::parse_release_date;
///
/// let expected = NaiveDate::from_ymd_opt(2021, 3, 4);
/// assert_eq!(parse_release_date("2021-03-04"), expected);
/// assert_eq!(parse_release_date("Mar 4, 2021"), expected);
/// assert_eq!(parse_release_date("4 Mar, 2021"), expected);
/// assert_eq!(parse_release_date("2021-03-04T12:30:00"), expected);
/// assert_eq!(parse_release_date("coming soon"), None);
/// ```
#[must_use]
pub fn parse_release_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Decomposes dates relative to a fixed reference date.
///
/// Fitting learns nothing; the reference date is fixed at construction and
/// the fitted value is the featurizer itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateFeaturizer {
    pub reference_date: NaiveDate,
}

impl Default for DateFeaturizer {
    fn default() -> Self {
        Self::new(default_reference_date())
    }
}

impl DateFeaturizer {
    #[must_use]
    pub const fn new(reference_date: NaiveDate) -> Self {
        Self { reference_date }
    }

    #[must_use]
    pub const fn fit(self) -> Self {
        self
    }

    /// Returns `[release_year, release_month, days_since_release]`.
    ///
    /// `days_since_release` is negative for dates after the reference date.
    ///
    /// ```
    /// use gamepop_features::date::DateFeaturizer;
    ///
    /// let featurizer = DateFeaturizer::default();
    /// assert_eq!(featurizer.transform_one("2025-03-31"), [2025.0, 3.0, 0.0]);
    /// assert_eq!(featurizer.transform_one("2025-03-01"), [2025.0, 3.0, 30.0]);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn transform_one(&self, raw: &str) -> [f64; 3] {
        let Some(date) = parse_release_date(raw) else {
            tracing::warn!(release_date = raw, "unparseable release date, treating as missing");
            return [f64::NAN; 3];
        };
        let days = self.reference_date.signed_duration_since(date).num_days();
        [
            f64::from(date.year()),
            f64::from(date.month()),
            days as f64,
        ]
    }

    pub fn transform<'a, I>(&self, dates: I) -> Vec<[f64; 3]>
    where
        I: IntoIterator<Item = &'a str>,
    {
        dates.into_iter().map(|d| self.transform_one(d)).collect()
    }
}
