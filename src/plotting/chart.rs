use image::{DynamicImage, RgbImage, RgbaImage};
use lru::LruCache;
use once_cell::sync::Lazy;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

use super::styles::{
    genre_color, layer_opacity, ChartStyle, ChartTheme, ADDITIONS_COLOR, MOVIE_COLOR,
    TV_SHOW_COLOR,
};
use crate::app::App;
use crate::types::GenreMixRow;

/// Smallest width or height a chart can be rendered at.
pub const MIN_CHART_SIZE: u32 = 100;
/// Largest width or height a chart can be rendered at.
pub const MAX_CHART_SIZE: u32 = 8192;

const CACHE_TTL: Duration = Duration::from_secs(300);
const CACHE_CAPACITY: NonZeroUsize = match NonZeroUsize::new(16) {
    Some(n) => n,
    None => unreachable!(),
};

type Chart<'a, 'b> =
    ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("drawing failed: {0}")]
    Drawing(String),
    #[error(
        "chart size {0}x{1} is outside {}..={} px per side",
        MIN_CHART_SIZE,
        MAX_CHART_SIZE
    )]
    InvalidSize(u32, u32),
    #[error("failed to write image: {0}")]
    Image(#[from] image::ImageError),
}

// Helper function to wrap plotters errors
fn wrap_err<E: std::fmt::Display>(e: E) -> PlotError {
    PlotError::Drawing(e.to_string())
}

/// The three dashboard charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    Additions,
    TypeSplit,
    GenreMix,
}

impl ChartKind {
    pub const ALL: [ChartKind; 3] = [
        ChartKind::Additions,
        ChartKind::TypeSplit,
        ChartKind::GenreMix,
    ];

    pub fn title(self) -> &'static str {
        match self {
            ChartKind::Additions => "Titles added per year",
            ChartKind::TypeSplit => "Movies vs TV Shows per year",
            ChartKind::GenreMix => "Genre mix per year",
        }
    }

    /// File name used when exporting this chart.
    pub fn file_name(self) -> &'static str {
        match self {
            ChartKind::Additions => "additions.png",
            ChartKind::TypeSplit => "type_split.png",
            ChartKind::GenreMix => "genre_mix.png",
        }
    }
}

// Rendered charts, expiring after CACHE_TTL
static CHART_CACHE: Lazy<Mutex<LruCache<ChartCacheKey, (RgbaImage, Instant)>>> =
    Lazy::new(|| Mutex::new(LruCache::new(CACHE_CAPACITY)));

#[derive(Debug, Clone, Hash, Eq, PartialEq)]
struct ChartCacheKey {
    kind: ChartKind,
    data_hash: u64,
    hovered_genre: Option<String>,
    width: u32,
    height: u32,
}

impl ChartCacheKey {
    fn new(kind: ChartKind, app: &App, (width, height): (u32, u32)) -> Self {
        let mut hasher = DefaultHasher::new();
        let mut hovered_genre = None;
        match kind {
            ChartKind::Additions => {
                app.content_filter.hash(&mut hasher);
                app.additions.hash(&mut hasher);
            }
            ChartKind::TypeSplit => app.type_split.hash(&mut hasher),
            ChartKind::GenreMix => {
                app.visible_genre_mix().hash(&mut hasher);
                hovered_genre = app.hovered_genre.clone();
            }
        }

        Self {
            kind,
            data_hash: hasher.finish(),
            hovered_genre,
            width,
            height,
        }
    }
}

/// Render one chart for the current view state.
///
/// Identical requests within five minutes are served from an in-memory cache.
pub fn render_chart(
    kind: ChartKind,
    app: &App,
    size: (u32, u32),
) -> Result<RgbaImage, PlotError> {
    let (width, height) = size;
    if !is_valid_chart_size(size) {
        return Err(PlotError::InvalidSize(width, height));
    }

    let cache_key = ChartCacheKey::new(kind, app, size);
    if let Ok(mut cache) = CHART_CACHE.lock() {
        if let Some((image, rendered_at)) = cache.get(&cache_key) {
            if rendered_at.elapsed() < CACHE_TTL {
                debug!("Chart cache hit for {:?}", kind);
                return Ok(image.clone());
            }
        }
    }

    let image = draw_to_image(kind, app, size)?;

    if let Ok(mut cache) = CHART_CACHE.lock() {
        cache.put(cache_key, (image.clone(), Instant::now()));
    }

    Ok(image)
}

/// Whether both sides lie within `MIN_CHART_SIZE..=MAX_CHART_SIZE`.
pub fn is_valid_chart_size((width, height): (u32, u32)) -> bool {
    let side = MIN_CHART_SIZE..=MAX_CHART_SIZE;
    side.contains(&width) && side.contains(&height)
}

/// Render one chart and write it as a PNG.
pub fn save_chart_png(
    kind: ChartKind,
    app: &App,
    size: (u32, u32),
    path: &Path,
) -> Result<(), PlotError> {
    render_chart(kind, app, size)?.save(path)?;
    Ok(())
}

fn draw_to_image(
    kind: ChartKind,
    app: &App,
    (width, height): (u32, u32),
) -> Result<RgbaImage, PlotError> {
    let len = rgb_buffer_len(width, height).ok_or(PlotError::InvalidSize(width, height))?;
    let mut buffer = vec![0u8; len];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        match kind {
            ChartKind::Additions => draw_additions(app, &root)?,
            ChartKind::TypeSplit => draw_type_split(app, &root)?,
            ChartKind::GenreMix => draw_genre_mix(app, &root)?,
        }
        root.present().map_err(wrap_err)?;
    }

    let rgb = RgbImage::from_raw(width, height, buffer)
        .ok_or(PlotError::InvalidSize(width, height))?;
    Ok(DynamicImage::ImageRgb8(rgb).to_rgba8())
}

/// Bytes needed for an RGB bitmap, `None` on overflow.
pub(crate) fn rgb_buffer_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(3))
}

fn build_chart<'a, 'b>(
    root: &'a DrawingArea<BitMapBackend<'b>, Shift>,
    caption: &str,
    years: &[i32],
    y_max: f64,
) -> Result<Chart<'a, 'b>, PlotError> {
    let theme = ChartTheme::default();
    let style = ChartStyle::default();

    root.fill(&theme.background_color).map_err(wrap_err)?;

    let (x_min, x_max) = match (years.first(), years.last()) {
        (Some(first), Some(last)) => (*first as f64 - 0.5, *last as f64 + 0.5),
        _ => (0.0, 1.0),
    };
    let caption = if years.is_empty() {
        format!("{} (no data)", caption)
    } else {
        caption.to_string()
    };

    let mut chart = ChartBuilder::on(root)
        .caption(
            caption,
            ("sans-serif", style.caption_font_size)
                .into_font()
                .color(&theme.text_color),
        )
        .margin(style.margin)
        .set_label_area_size(LabelAreaPosition::Left, style.label_area_size)
        .set_label_area_size(LabelAreaPosition::Bottom, style.label_area_size)
        .build_cartesian_2d(x_min..x_max, 0f64..y_max)
        .map_err(wrap_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .light_line_style(TRANSPARENT)
        .bold_line_style(theme.grid_color)
        .axis_style(theme.axis_color)
        .label_style(
            ("sans-serif", style.font_size)
                .into_font()
                .color(&theme.text_color),
        )
        // One slot per year, so ask for one label per year
        .x_labels(years.len() + 1)
        .x_label_formatter(&|x: &f64| format_year(*x))
        .y_label_formatter(&|y: &f64| format_count(*y))
        .y_desc("Titles")
        .draw()
        .map_err(wrap_err)?;

    Ok(chart)
}

fn draw_legend<'a, 'b: 'a>(chart: &mut Chart<'a, 'b>) -> Result<(), PlotError> {
    let theme = ChartTheme::default();
    let style = ChartStyle::default();

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(theme.background_color)
        .border_style(theme.axis_color)
        .label_font(
            ("sans-serif", style.font_size)
                .into_font()
                .color(&theme.text_color),
        )
        .draw()
        .map_err(wrap_err)
}

fn draw_additions(app: &App, root: &DrawingArea<BitMapBackend, Shift>) -> Result<(), PlotError> {
    let half = ChartStyle::default().bar_width / 2.0;
    let years: Vec<i32> = app.additions.iter().map(|c| c.year).collect();
    let y_max = y_axis_max(app.additions.iter().map(|c| c.titles));
    let caption = format!("{} ({})", ChartKind::Additions.title(), app.content_filter);

    let mut chart = build_chart(root, &caption, &years, y_max)?;
    let color = ADDITIONS_COLOR.mix(0.85);

    chart
        .draw_series(app.additions.iter().map(|c| {
            let x = c.year as f64;
            Rectangle::new([(x - half, 0.0), (x + half, c.titles as f64)], color.filled())
        }))
        .map_err(wrap_err)?
        .label(app.content_filter.label())
        .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], color.filled()));

    draw_legend(&mut chart)
}

fn draw_type_split(app: &App, root: &DrawingArea<BitMapBackend, Shift>) -> Result<(), PlotError> {
    let half = ChartStyle::default().bar_width / 2.0;
    let years: Vec<i32> = app.type_split.iter().map(|c| c.year).collect();
    let y_max = y_axis_max(app.type_split.iter().flat_map(|c| [c.movie, c.tv_show]));

    let mut chart = build_chart(root, ChartKind::TypeSplit.title(), &years, y_max)?;
    let movie_color = MOVIE_COLOR.mix(0.85);
    let tv_color = TV_SHOW_COLOR.mix(0.85);

    // Movies on the left half of each year slot, TV shows on the right
    chart
        .draw_series(app.type_split.iter().map(|c| {
            let x = c.year as f64;
            Rectangle::new([(x - half, 0.0), (x, c.movie as f64)], movie_color.filled())
        }))
        .map_err(wrap_err)?
        .label("Movie")
        .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], movie_color.filled()));

    chart
        .draw_series(app.type_split.iter().map(|c| {
            let x = c.year as f64;
            Rectangle::new([(x, 0.0), (x + half, c.tv_show as f64)], tv_color.filled())
        }))
        .map_err(wrap_err)?
        .label("TV Show")
        .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], tv_color.filled()));

    draw_legend(&mut chart)
}

fn draw_genre_mix(app: &App, root: &DrawingArea<BitMapBackend, Shift>) -> Result<(), PlotError> {
    let half = ChartStyle::default().bar_width / 2.0;
    let mix = app.visible_genre_mix();
    let years: Vec<i32> = mix.series.iter().map(|r| r.year).collect();
    let y_max = y_axis_max(mix.series.iter().map(GenreMixRow::total));
    let hovered = app.hovered_genre.as_deref();

    let mut chart = build_chart(root, ChartKind::GenreMix.title(), &years, y_max)?;
    let stacks: Vec<Vec<(usize, usize)>> = mix.series.iter().map(stacked_segments).collect();

    for (layer_idx, layer) in mix.layers().enumerate() {
        let palette_idx = (layer_idx < mix.columns.len()).then_some(layer_idx);
        let color = genre_color(palette_idx).mix(layer_opacity(layer, hovered));

        chart
            .draw_series(mix.series.iter().zip(&stacks).map(|(row, stack)| {
                let x = row.year as f64;
                let (bottom, top) = stack[layer_idx];
                Rectangle::new([(x - half, bottom as f64), (x + half, top as f64)], color.filled())
            }))
            .map_err(wrap_err)?
            .label(layer)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], color.filled()));
    }

    draw_legend(&mut chart)
}

/// `(bottom, top)` of each stacked layer of a genre-mix row: the selected
/// columns in order, then `Other`.
pub(crate) fn stacked_segments(row: &GenreMixRow) -> Vec<(usize, usize)> {
    let mut base = 0;
    row.counts
        .iter()
        .chain(std::iter::once(&row.other))
        .map(|&count| {
            let segment = (base, base + count);
            base += count;
            segment
        })
        .collect()
}

/// Upper bound of the y axis: 10% headroom over the largest value, at least 1.
pub(crate) fn y_axis_max(values: impl Iterator<Item = usize>) -> f64 {
    let max = values.max().unwrap_or(0) as f64;
    (max * 1.1).max(1.0)
}

/// Year labels only at whole numbers.
pub(crate) fn format_year(x: f64) -> String {
    if (x - x.round()).abs() < 1e-6 {
        format!("{:.0}", x)
    } else {
        String::new()
    }
}

/// K/M formatting for large counts.
pub(crate) fn format_count(y: f64) -> String {
    if y.abs() >= 1_000_000.0 {
        format!("{:.1}M", y / 1_000_000.0)
    } else if y.abs() >= 1_000.0 {
        format!("{:.1}K", y / 1_000.0)
    } else {
        format!("{:.0}", y)
    }
}
