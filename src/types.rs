//! # Common Types
//!
//! This module contains the types shared between the loader, the aggregation
//! engine, the view state and the chart renderer.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Column label used for genres that did not make the top-K cut.
pub const OTHER_GENRE: &str = "Other";

/// Number of genre columns kept in the genre mix when nothing else is configured.
pub const DEFAULT_TOP_K: usize = 8;

/// One catalog entry as read from the CSV file.
///
/// Every field is optional: a missing column or an empty cell is `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Row {
    /// Raw `type` column ("Movie", "TV Show", or anything else)
    pub content_type: Option<String>,
    /// Raw `date_added` column, free text
    pub date_added: Option<String>,
    /// Raw `listed_in` column, comma separated genres
    pub listed_in: Option<String>,
}

impl Row {
    pub fn new(content_type: &str, date_added: &str, listed_in: &str) -> Self {
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
        Self {
            content_type: non_empty(content_type),
            date_added: non_empty(date_added),
            listed_in: non_empty(listed_in),
        }
    }

    /// The recognized content type of this row, if any.
    pub fn kind(&self) -> Option<ContentType> {
        self.content_type.as_deref().and_then(ContentType::from_label)
    }

    /// Genre tokens of this row: split on commas, trimmed, empties dropped.
    pub fn genres(&self) -> impl Iterator<Item = &str> {
        self.listed_in
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

/// The two content types the dashboard distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    Movie,
    #[serde(rename = "TV Show")]
    TvShow,
}

impl ContentType {
    pub fn label(self) -> &'static str {
        match self {
            ContentType::Movie => "Movie",
            ContentType::TvShow => "TV Show",
        }
    }

    /// Exact match only; "movie" or "TV show" are not recognized.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Movie" => Some(ContentType::Movie),
            "TV Show" => Some(ContentType::TvShow),
            _ => None,
        }
    }
}

/// Content-type selector of the additions chart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentTypeFilter {
    #[default]
    All,
    Movie,
    #[serde(rename = "TV Show")]
    TvShow,
}

impl ContentTypeFilter {
    pub const ALL: [ContentTypeFilter; 3] = [
        ContentTypeFilter::All,
        ContentTypeFilter::Movie,
        ContentTypeFilter::TvShow,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ContentTypeFilter::All => "All",
            ContentTypeFilter::Movie => "Movie",
            ContentTypeFilter::TvShow => "TV Show",
        }
    }

    /// Whether a row passes this filter.
    pub fn matches(self, row: &Row) -> bool {
        match self {
            ContentTypeFilter::All => true,
            ContentTypeFilter::Movie => row.kind() == Some(ContentType::Movie),
            ContentTypeFilter::TvShow => row.kind() == Some(ContentType::TvShow),
        }
    }
}

impl fmt::Display for ContentTypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for ContentTypeFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(ContentTypeFilter::All),
            "movie" | "movies" => Ok(ContentTypeFilter::Movie),
            "tv show" | "tv-show" | "tv" | "tvshow" => Ok(ContentTypeFilter::TvShow),
            other => Err(format!(
                "unknown content type '{}', expected one of: all, movie, tv-show",
                other
            )),
        }
    }
}

/// Number of titles added in one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct YearCount {
    pub year: i32,
    pub titles: usize,
}

/// Movie and TV Show additions in one year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeYearCount {
    pub year: i32,
    #[serde(rename = "Movie")]
    pub movie: usize,
    #[serde(rename = "TV Show")]
    pub tv_show: usize,
}

/// Genre counts for one year, aligned with [`GenreMix::columns`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GenreMixRow {
    pub year: i32,
    /// One count per selected column, same order as the columns
    pub counts: Vec<usize>,
    /// Tokens outside the selected columns
    pub other: usize,
}

impl GenreMixRow {
    pub fn total(&self) -> usize {
        self.counts.iter().sum::<usize>() + self.other
    }
}

/// Per-year genre composition with a fixed top-K column set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct GenreMix {
    /// Selected genre labels, most frequent first
    pub columns: Vec<String>,
    /// One row per year, ascending
    pub series: Vec<GenreMixRow>,
}

impl GenreMix {
    /// No year has any data.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Copy of this mix with every year before `min_year` dropped.
    pub fn since(&self, min_year: Option<i32>) -> GenreMix {
        let series = match min_year {
            Some(min) => self.series.iter().filter(|r| r.year >= min).cloned().collect(),
            None => self.series.clone(),
        };
        GenreMix {
            columns: self.columns.clone(),
            series,
        }
    }

    /// Stacked layer labels: the selected columns followed by `Other`.
    pub fn layers(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(OTHER_GENRE))
    }
}

struct GenreMixRecord<'a> {
    columns: &'a [String],
    row: &'a GenreMixRow,
}

impl Serialize for GenreMixRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len() + 2))?;
        map.serialize_entry("year", &self.row.year)?;
        for (column, count) in self.columns.iter().zip(&self.row.counts) {
            map.serialize_entry(column, count)?;
        }
        map.serialize_entry(OTHER_GENRE, &self.row.other)?;
        map.end()
    }
}

impl Serialize for GenreMix {
    /// Serializes as `{"columns": [...], "series": [{"year": .., "<genre>": .., "Other": ..}]}`
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let records: Vec<GenreMixRecord<'_>> = self
            .series
            .iter()
            .map(|row| GenreMixRecord {
                columns: &self.columns,
                row,
            })
            .collect();
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("columns", &self.columns)?;
        map.serialize_entry("series", &records)?;
        map.end()
    }
}

/// Everything the dashboard derives from one row set and one filter state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub rows: usize,
    pub skipped_records: usize,
    pub content_filter: ContentTypeFilter,
    pub min_year: Option<i32>,
    pub additions_per_year: Vec<YearCount>,
    pub movies_vs_tv_per_year: Vec<TypeYearCount>,
    pub genre_mix_per_year: GenreMix,
}
