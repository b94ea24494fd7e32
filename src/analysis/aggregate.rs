//! Per-year reducers over the loaded catalog.
//!
//! Each reducer is a single pass over the rows with a hashmap accumulator. All
//! of them are total: malformed rows are skipped, never reported.

use std::collections::HashMap;

use crate::types::{
    ContentType, ContentTypeFilter, GenreMix, GenreMixRow, Row, TypeYearCount, YearCount,
};
use crate::utils::year_of;

/// Count titles added per year, keeping only rows that pass `filter`.
pub fn additions_per_year(rows: &[Row], filter: ContentTypeFilter) -> Vec<YearCount> {
    let mut per_year: HashMap<i32, usize> = HashMap::new();

    for row in rows {
        if !filter.matches(row) {
            continue;
        }
        if let Some(year) = year_of(row.date_added.as_deref()) {
            *per_year.entry(year).or_insert(0) += 1;
        }
    }

    let mut series: Vec<YearCount> = per_year
        .into_iter()
        .map(|(year, titles)| YearCount { year, titles })
        .collect();
    series.sort_by_key(|c| c.year);
    series
}

/// Split additions per year into Movie and TV Show counts.
///
/// A row with a valid year but an unrecognized type still creates the year's
/// bucket, it just does not increment either count.
pub fn movies_vs_tv_per_year(rows: &[Row]) -> Vec<TypeYearCount> {
    let mut per_year: HashMap<i32, TypeYearCount> = HashMap::new();

    for row in rows {
        let Some(year) = year_of(row.date_added.as_deref()) else {
            continue;
        };
        let bucket = per_year.entry(year).or_insert(TypeYearCount {
            year,
            ..Default::default()
        });
        match row.kind() {
            Some(ContentType::Movie) => bucket.movie += 1,
            Some(ContentType::TvShow) => bucket.tv_show += 1,
            None => {}
        }
    }

    let mut series: Vec<TypeYearCount> = per_year.into_values().collect();
    series.sort_by_key(|c| c.year);
    series
}

/// Global genre frequencies in first-seen order.
///
/// Every row counts here, including rows without a usable date.
pub fn genre_frequencies(rows: &[Row]) -> Vec<(String, usize)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut frequencies: Vec<(String, usize)> = Vec::new();

    for genre in rows.iter().flat_map(Row::genres) {
        match index.get(genre) {
            Some(&idx) => frequencies[idx].1 += 1,
            None => {
                index.insert(genre, frequencies.len());
                frequencies.push((genre.to_string(), 1));
            }
        }
    }

    frequencies
}

/// The `top_k` most frequent genres. Ties keep first-seen order.
pub fn top_genres(rows: &[Row], top_k: usize) -> Vec<String> {
    let mut ranked = genre_frequencies(rows);
    // sort_by is stable, which is what makes the tie-break deterministic
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.into_iter().take(top_k).map(|(genre, _)| genre).collect()
}

/// Per-year genre composition over a fixed top-K column set.
///
/// Tokens outside the selected columns are counted as `Other`. A row tagged
/// with several genres increments each of them for its year.
pub fn genre_mix_per_year(rows: &[Row], top_k: usize) -> GenreMix {
    let columns = top_genres(rows, top_k);
    let column_index: HashMap<&str, usize> = columns
        .iter()
        .enumerate()
        .map(|(idx, genre)| (genre.as_str(), idx))
        .collect();

    let mut per_year: HashMap<i32, GenreMixRow> = HashMap::new();

    for row in rows {
        let Some(year) = year_of(row.date_added.as_deref()) else {
            continue;
        };
        let record = per_year.entry(year).or_insert_with(|| GenreMixRow {
            year,
            counts: vec![0; columns.len()],
            other: 0,
        });
        for genre in row.genres() {
            match column_index.get(genre) {
                Some(&idx) => record.counts[idx] += 1,
                None => record.other += 1,
            }
        }
    }

    let mut series: Vec<GenreMixRow> = per_year.into_values().collect();
    series.sort_by_key(|r| r.year);

    GenreMix { columns, series }
}
