//! # Catalog Statistics Library
//!
//! `catalogstats` loads a CSV of streaming-catalog titles and derives the
//! per-year views shown by the dashboard.
//!
//! ## Features
//!
//! - Load the catalog from a local file or an HTTP(S) URL
//! - Titles added per year, optionally restricted to Movies or TV Shows
//! - Movie vs TV Show split per year
//! - Genre mix per year over the top-K genres, with everything else as "Other"
//! - Minimum-year and hovered-genre view filters
//! - Chart rendering with caching of rendered images
//!
//! ## Example
//!
//! ```
//! use catalogstats::analysis::{additions_per_year, genre_mix_per_year};
//! use catalogstats::types::{ContentTypeFilter, Row, YearCount};
//!
//! let rows = vec![
//!     Row::new("Movie", "1/1/2018", "Dramas, Comedies"),
//!     Row::new("TV Show", "6/6/2018", "Dramas"),
//! ];
//!
//! assert_eq!(
//!     additions_per_year(&rows, ContentTypeFilter::All),
//!     vec![YearCount { year: 2018, titles: 2 }]
//! );
//! assert_eq!(genre_mix_per_year(&rows, 8).columns, vec!["Dramas", "Comedies"]);
//! ```

pub mod analysis;
pub mod app;
pub mod config;
pub mod plotting;
pub mod types;
pub mod utils;

// Re-export main types for convenience
pub use app::App as CatalogStatsApp;
pub use types::{DashboardSummary, Row};
