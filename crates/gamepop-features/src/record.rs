//! Raw catalog rows and typed access to their columns.

use serde::{Deserialize, Serialize};

/// One game as it appears in the catalog, before any feature engineering.
///
/// Field defaults mirror the prediction request format: a missing price or
/// discount is free, a missing platform flag means Windows-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    #[serde(default)]
    pub price: f64,
    /// Release date as supplied; parsed by [`DateFeaturizer`](crate::date::DateFeaturizer).
    pub release_date: String,
    pub genres: Vec<String>,
    pub categories: Vec<String>,
    pub developers: Vec<String>,
    pub publishers: Vec<String>,
    #[serde(default)]
    pub discount: f64,
    #[serde(default)]
    pub required_age: i64,
    #[serde(default)]
    pub dlc_count: i64,
    #[serde(default = "default_windows")]
    pub windows: bool,
    #[serde(default)]
    pub mac: bool,
    #[serde(default)]
    pub linux: bool,
}

const fn default_windows() -> bool {
    true
}

/// A column of [`GameRecord`] that a pipeline step can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordColumn {
    Price,
    ReleaseDate,
    Genres,
    Categories,
    Developers,
    Publishers,
    Discount,
    RequiredAge,
    DlcCount,
    Windows,
    Mac,
    Linux,
}

/// The kind of value a column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum ColumnKind {
    #[display("numeric")]
    Numeric,
    #[display("text")]
    Text,
    #[display("label list")]
    Labels,
}

/// A borrowed cell of a [`GameRecord`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnValue<'a> {
    Numeric(f64),
    Text(&'a str),
    Labels(&'a [String]),
}

impl RecordColumn {
    /// Numeric columns left untouched by the default pipeline, in catalog order.
    pub const PASSTHROUGH: [Self; 6] = [
        Self::Discount,
        Self::RequiredAge,
        Self::DlcCount,
        Self::Windows,
        Self::Mac,
        Self::Linux,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::ReleaseDate => "release_date",
            Self::Genres => "genres",
            Self::Categories => "categories",
            Self::Developers => "developers",
            Self::Publishers => "publishers",
            Self::Discount => "discount",
            Self::RequiredAge => "required_age",
            Self::DlcCount => "dlc_count",
            Self::Windows => "windows",
            Self::Mac => "mac",
            Self::Linux => "linux",
        }
    }

    #[must_use]
    pub const fn kind(self) -> ColumnKind {
        match self {
            Self::ReleaseDate => ColumnKind::Text,
            Self::Genres | Self::Categories | Self::Developers | Self::Publishers => {
                ColumnKind::Labels
            }
            Self::Price
            | Self::Discount
            | Self::RequiredAge
            | Self::DlcCount
            | Self::Windows
            | Self::Mac
            | Self::Linux => ColumnKind::Numeric,
        }
    }

    /// Reads this column from `record`. Booleans read as 0.0 / 1.0.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn value(self, record: &GameRecord) -> ColumnValue<'_> {
        match self {
            Self::Price => ColumnValue::Numeric(record.price),
            Self::ReleaseDate => ColumnValue::Text(&record.release_date),
            Self::Genres => ColumnValue::Labels(&record.genres),
            Self::Categories => ColumnValue::Labels(&record.categories),
            Self::Developers => ColumnValue::Labels(&record.developers),
            Self::Publishers => ColumnValue::Labels(&record.publishers),
            Self::Discount => ColumnValue::Numeric(record.discount),
            Self::RequiredAge => ColumnValue::Numeric(record.required_age as f64),
            Self::DlcCount => ColumnValue::Numeric(record.dlc_count as f64),
            Self::Windows => ColumnValue::Numeric(f64::from(u8::from(record.windows))),
            Self::Mac => ColumnValue::Numeric(f64::from(u8::from(record.mac))),
            Self::Linux => ColumnValue::Numeric(f64::from(u8::from(record.linux))),
        }
    }

    #[must_use]
    pub fn numeric(self, record: &GameRecord) -> Option<f64> {
        match self.value(record) {
            ColumnValue::Numeric(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn text(self, record: &GameRecord) -> Option<&str> {
        match self.value(record) {
            ColumnValue::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn labels(self, record: &GameRecord) -> Option<&[String]> {
        match self.value(record) {
            ColumnValue::Labels(labels) => Some(labels),
            _ => None,
        }
    }
}
