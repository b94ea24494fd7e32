mod chart;
pub mod styles;


pub use chart::{
    is_valid_chart_size, render_chart, save_chart_png, ChartKind, PlotError, MAX_CHART_SIZE,
    MIN_CHART_SIZE,
};
