pub mod aggregate;
mod cache;
pub mod loader;

pub use aggregate::{additions_per_year, genre_mix_per_year, movies_vs_tv_per_year};
pub use cache::CacheManager;
pub use loader::{load_rows_async, parse_rows, DataSource, LoadError, LoadReport, ParsedRows};
