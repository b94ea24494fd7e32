use plotters::style::{RGBAColor, RGBColor};

/// Chart theme configuration
pub struct ChartTheme {
    pub background_color: RGBAColor,
    pub text_color: RGBAColor,
    pub grid_color: RGBAColor,
    pub axis_color: RGBAColor,
}

impl Default for ChartTheme {
    fn default() -> Self {
        Self {
            background_color: RGBAColor(0, 0, 0, 0.94),
            text_color: RGBAColor(255, 255, 255, 0.8),
            grid_color: RGBAColor(255, 255, 255, 0.15),
            axis_color: RGBAColor(255, 255, 255, 0.8),
        }
    }
}

/// Chart style configuration
pub struct ChartStyle {
    pub caption_font_size: u32,
    pub font_size: u32,
    pub margin: u32,
    pub label_area_size: u32,
    /// Fraction of a year slot covered by its bar(s)
    pub bar_width: f64,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            caption_font_size: 24,
            font_size: 14,
            margin: 10,
            label_area_size: 50,
            bar_width: 0.8,
        }
    }
}

pub const ADDITIONS_COLOR: RGBColor = RGBColor(229, 9, 20);
pub const MOVIE_COLOR: RGBColor = RGBColor(135, 206, 250);
pub const TV_SHOW_COLOR: RGBColor = RGBColor(255, 165, 0);
pub const OTHER_COLOR: RGBColor = RGBColor(128, 128, 128);

/// Colours for the genre-mix layers, cycled when there are more columns.
pub const GENRE_PALETTE: [RGBColor; 8] = [
    RGBColor(228, 26, 28),
    RGBColor(55, 126, 184),
    RGBColor(77, 175, 74),
    RGBColor(152, 78, 163),
    RGBColor(255, 127, 0),
    RGBColor(255, 255, 51),
    RGBColor(166, 86, 40),
    RGBColor(247, 129, 191),
];

const EMPHASIZED_OPACITY: f64 = 0.9;
const DIMMED_OPACITY: f64 = 0.2;

/// Colour of genre-mix layer `index`, where `None` is the `Other` layer.
pub fn genre_color(index: Option<usize>) -> RGBColor {
    match index {
        Some(i) => GENRE_PALETTE[i % GENRE_PALETTE.len()],
        None => OTHER_COLOR,
    }
}

/// Opacity of a layer given the currently hovered genre, if any.
pub fn layer_opacity(layer: &str, hovered: Option<&str>) -> f64 {
    match hovered {
        Some(genre) if genre != layer => DIMMED_OPACITY,
        _ => EMPHASIZED_OPACITY,
    }
}
