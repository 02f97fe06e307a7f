use std::fmt;

use gloo_console::debug as console_debug;
use web_sys::Document;

/// Selector for the Streamlit application container in the host document.
pub const HOST_CONTAINER_SELECTOR: &str = ".stApp";

/// Weighted brightness below this value classifies a background as dark.
const DARK_BRIGHTNESS_CUTOFF: u32 = 128;

/// Light/dark classification of the host page background, used to pick the
/// sidebar color palette.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    /// Classifies a computed CSS background color string.
    ///
    /// The first three numeric runs are read as the R, G, B channels, so both
    /// `rgb(...)` and `rgba(...)` forms work. Channels clamp to 255, keeping
    /// the brightness math in range for arbitrary input. Anything that does
    /// not yield three channels classifies as light.
    pub fn from_background(color: &str) -> Self {
        match parse_rgb(color) {
            Some([r, g, b]) => {
                let brightness = (r * 299 + g * 587 + b * 114) / 1000;
                if brightness < DARK_BRIGHTNESS_CUTOFF {
                    Theme::Dark
                } else {
                    Theme::Light
                }
            }
            None => Theme::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        matches!(self, Theme::Dark)
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        };
        write!(f, "{}", name)
    }
}

/// Reads the host container's computed background color and classifies it.
///
/// Defaults to [`Theme::Light`] when the container is missing or the computed
/// style cannot be read; no failure escapes this function.
pub fn detect(document: &Document) -> Theme {
    let theme = container_background(document)
        .map(|color| Theme::from_background(&color))
        .unwrap_or(Theme::Light);

    console_debug!(format!("detected host theme: {theme}"));

    theme
}

fn container_background(document: &Document) -> Option<String> {
    let container = document.query_selector(HOST_CONTAINER_SELECTOR).ok()??;
    let window = document.default_view()?;
    let style = window.get_computed_style(&container).ok()??;

    style.get_property_value("background-color").ok()
}

fn parse_rgb(value: &str) -> Option<[u32; 3]> {
    let mut runs = value
        .split(|c: char| !c.is_ascii_digit())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<u32>().map_or(255, |channel| channel.min(255)));

    Some([runs.next()?, runs.next()?, runs.next()?])
}
