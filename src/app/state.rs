use eframe::App as EApp;
use egui::TextureHandle;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, error};

use crate::analysis::{
    additions_per_year, genre_mix_per_year, load_rows_async, movies_vs_tv_per_year,
    CacheManager, DataSource, LoadError, LoadReport, ParsedRows,
};
use crate::plotting::ChartKind;
use crate::types::{
    ContentTypeFilter, DashboardSummary, GenreMix, Row, TypeYearCount, YearCount, DEFAULT_TOP_K,
};

/// Where the dashboard is in its load lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing requested yet
    #[default]
    Idle,
    Loading,
    /// Loaded (or failed) with no usable rows
    Empty,
    Ready,
}

/// Main application state: the loaded rows, the user's filters and the
/// aggregates derived from them.
#[derive(Clone)]
pub struct App {
    pub source: String,
    pub rows: Arc<Vec<Row>>,
    pub load_report: LoadReport,
    pub load_state: LoadState,
    pub error_message: Option<String>,
    pub content_filter: ContentTypeFilter,
    /// Lower bound applied to the genre-mix series; `None` shows every year
    pub min_year: Option<i32>,
    /// Genre emphasized in the genre-mix chart
    pub hovered_genre: Option<String>,
    pub top_k: usize,
    pub chart_size: (u32, u32),
    pub additions: Vec<YearCount>,
    pub type_split: Vec<TypeYearCount>,
    pub genre_mix: GenreMix,
    pub chart_textures: HashMap<ChartKind, TextureHandle>,
    pub update_needed: bool,
    additions_cache: CacheManager,
}

impl App {
    pub fn new(source: String, top_k: usize, chart_size: (u32, u32)) -> Self {
        Self {
            source,
            top_k,
            chart_size,
            ..Default::default()
        }
    }

    /// Mark the start of a (re)load.
    pub fn begin_loading(&mut self) {
        self.load_state = LoadState::Loading;
        self.error_message = None;
    }

    /// Load the configured source. The returned future does not touch `self`.
    pub fn load(&mut self) -> impl std::future::Future<Output = Result<ParsedRows, LoadError>> {
        self.begin_loading();
        load_rows_async(DataSource::parse(&self.source))
    }

    /// Replace the row set and recompute every aggregate from scratch.
    pub fn update_with_rows(&mut self, parsed: ParsedRows) {
        self.rows = Arc::new(parsed.rows);
        self.load_report = parsed.report;
        self.error_message = None;
        self.additions_cache.clear();
        self.hovered_genre = None;

        self.recompute();

        self.min_year = self.year_options().first().copied();
        self.load_state = if self.genre_mix.is_empty() {
            LoadState::Empty
        } else {
            LoadState::Ready
        };
    }

    /// Record a failed load: no data, not loading, no retry.
    pub fn fail_loading(&mut self, err: &LoadError) {
        error!("Failed to load {}: {}", self.source, err);
        self.update_with_rows(ParsedRows::default());
        self.error_message = Some(err.to_string());
    }

    /// Apply the outcome of [`App::load`].
    pub fn finish_loading(&mut self, result: Result<ParsedRows, LoadError>) {
        match result {
            Ok(parsed) => self.update_with_rows(parsed),
            Err(e) => self.fail_loading(&e),
        }
    }

    fn recompute(&mut self) {
        let rows = Arc::clone(&self.rows);
        let filter = self.content_filter;
        self.additions = self
            .additions_cache
            .get_or_compute(filter, || additions_per_year(&rows, filter))
            .to_vec();
        self.type_split = movies_vs_tv_per_year(&rows);
        self.genre_mix = genre_mix_per_year(&rows, self.top_k);
        self.update_needed = true;
        debug!(
            "Recomputed aggregates over {} rows ({} years)",
            rows.len(),
            self.type_split.len()
        );
    }

    /// Change the content-type filter; only the additions series depends on it.
    pub fn set_content_filter(&mut self, filter: ContentTypeFilter) {
        if filter == self.content_filter {
            return;
        }
        self.content_filter = filter;
        let rows = Arc::clone(&self.rows);
        self.additions = self
            .additions_cache
            .get_or_compute(filter, || additions_per_year(&rows, filter))
            .to_vec();
        debug!(
            "Content filter set to {} ({} filters cached)",
            filter,
            self.additions_cache.len()
        );
        self.update_needed = true;
    }

    pub fn set_min_year(&mut self, min_year: Option<i32>) {
        if min_year != self.min_year {
            self.min_year = min_year;
            self.update_needed = true;
        }
    }

    /// Returns whether the emphasized genre changed.
    pub fn set_hovered_genre(&mut self, genre: Option<String>) -> bool {
        if genre == self.hovered_genre {
            return false;
        }
        self.hovered_genre = genre;
        self.update_needed = true;
        true
    }

    /// The genre mix with the minimum-year post-filter applied.
    pub fn visible_genre_mix(&self) -> GenreMix {
        self.genre_mix.since(self.min_year)
    }

    /// Candidate years for the minimum-year selector, ascending.
    pub fn year_options(&self) -> Vec<i32> {
        self.genre_mix.series.iter().map(|r| r.year).collect()
    }

    /// Titles counted in the current additions series.
    pub fn total_titles(&self) -> usize {
        self.additions.iter().map(|c| c.titles).sum()
    }

    pub fn is_loading(&self) -> bool {
        self.load_state == LoadState::Loading
    }

    pub fn summary(&self) -> DashboardSummary {
        DashboardSummary {
            rows: self.rows.len(),
            skipped_records: self.load_report.skipped_records,
            content_filter: self.content_filter,
            min_year: self.min_year,
            additions_per_year: self.additions.clone(),
            movies_vs_tv_per_year: self.type_split.clone(),
            genre_mix_per_year: self.visible_genre_mix(),
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self {
            source: String::new(),
            rows: Arc::new(Vec::new()),
            load_report: LoadReport::default(),
            load_state: LoadState::Idle,
            error_message: None,
            content_filter: ContentTypeFilter::All,
            min_year: None,
            hovered_genre: None,
            top_k: DEFAULT_TOP_K,
            chart_size: (640, 360),
            additions: Vec::new(),
            type_split: Vec::new(),
            genre_mix: GenreMix::default(),
            chart_textures: HashMap::new(),
            update_needed: false,
            additions_cache: CacheManager::new(),
        }
    }
}

/// Thread-safe wrapper around App for use with eframe
pub struct AppWrapper {
    pub app: Arc<Mutex<App>>,
}

impl EApp for AppWrapper {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Ok(mut app) = self.app.lock() {
            super::ui::draw_ui(&mut app, ctx, Arc::clone(&self.app));
        } else {
            error!("Failed to acquire app lock in update");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn loaded_app() -> App {
        let mut app = App::default();
        app.update_with_rows(ParsedRows {
            rows: vec![
                Row::new("Movie", "1/1/2016", "Dramas"),
                Row::new("Movie", "1/1/2018", "Dramas, Comedies"),
                Row::new("TV Show", "6/6/2018", "Dramas"),
                Row::new("TV Show", "2020-03-01", "Kids' TV"),
            ],
            report: LoadReport::default(),
        });
        app
    }

    #[test]
    fn test_load_recomputes_everything() {
        let app = loaded_app();
        assert_eq!(app.load_state, LoadState::Ready);
        assert_eq!(app.total_titles(), 4);
        assert_eq!(app.type_split.len(), 3);
        assert_eq!(app.genre_mix.columns[0], "Dramas");
        assert_eq!(app.min_year, Some(2016));
        assert_eq!(app.year_options(), vec![2016, 2018, 2020]);
        assert!(app.update_needed);
    }

    #[test]
    fn test_content_filter_only_changes_additions() {
        let mut app = loaded_app();
        let genre_mix = app.genre_mix.clone();
        let type_split = app.type_split.clone();

        app.set_content_filter(ContentTypeFilter::TvShow);
        assert_eq!(
            app.additions,
            vec![
                YearCount { year: 2018, titles: 1 },
                YearCount { year: 2020, titles: 1 },
            ]
        );
        assert_eq!(app.genre_mix, genre_mix);
        assert_eq!(app.type_split, type_split);

        app.set_content_filter(ContentTypeFilter::All);
        assert_eq!(app.total_titles(), 4);
        assert_eq!(app.additions_cache.len(), 2);
    }

    #[test]
    fn test_min_year_is_a_post_filter() {
        let mut app = loaded_app();
        app.set_min_year(Some(2018));

        let visible = app.visible_genre_mix();
        assert_eq!(visible.series.iter().map(|r| r.year).collect::<Vec<_>>(), vec![2018, 2020]);
        assert_eq!(visible.columns, app.genre_mix.columns);
        // The full series is untouched
        assert_eq!(app.genre_mix.series.len(), 3);
    }

    #[test]
    fn test_hover_does_not_touch_aggregates() {
        let mut app = loaded_app();
        let summary = app.summary();
        app.update_needed = false;

        assert!(app.set_hovered_genre(Some("Comedies".to_string())));
        assert!(!app.set_hovered_genre(Some("Comedies".to_string())));
        assert!(app.update_needed);
        assert_eq!(app.summary(), summary);
    }

    #[test]
    fn test_reload_replaces_rows_and_clears_cache() {
        let mut app = loaded_app();
        app.set_content_filter(ContentTypeFilter::Movie);
        app.set_hovered_genre(Some("Dramas".to_string()));

        app.update_with_rows(ParsedRows {
            rows: vec![Row::new("Movie", "2021-07-01", "Anime Features")],
            report: LoadReport::default(),
        });

        assert_eq!(app.rows.len(), 1);
        assert_eq!(app.additions, vec![YearCount { year: 2021, titles: 1 }]);
        assert_eq!(app.additions_cache.len(), 1);
        assert_eq!(app.hovered_genre, None);
        assert_eq!(app.min_year, Some(2021));
    }

    #[test]
    fn test_no_usable_rows_is_empty_state() {
        let mut app = App::default();
        app.update_with_rows(ParsedRows {
            rows: vec![Row::new("Movie", "", "Dramas")],
            report: LoadReport::default(),
        });
        assert_eq!(app.load_state, LoadState::Empty);
        assert!(app.genre_mix.is_empty());
        assert_eq!(app.min_year, None);
        assert!(app.additions.is_empty());
    }

    #[tokio::test]
    async fn test_failed_load_leaves_empty_dataset() {
        let mut app = App::new("/nonexistent/titles.csv".to_string(), 8, (640, 360));
        let result = app.load().await;
        assert!(app.is_loading());

        app.finish_loading(result);
        assert_eq!(app.load_state, LoadState::Empty);
        assert!(app.rows.is_empty());
        assert!(app.error_message.is_some());
    }
}
