use anyhow::{Result, anyhow};
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlLinkElement};

use crate::js_error;
use crate::theme::{self, Theme};

/// Id of the injected `<style>` node carrying the CSS custom properties.
pub const STYLE_ELEMENT_ID: &str = "dynamic-sidebar-styles";

/// Id of the injected `<link>` node referencing the sidebar stylesheet.
pub const LINK_ELEMENT_ID: &str = "sidebar-css";

/// Location of the sidebar stylesheet relative to the host page.
pub const STYLESHEET_HREF: &str = "./static/sidebar.css";

/// Sidebar color palette, one per [`Theme`].
pub struct Palette {
    pub background: &'static str,
    pub text: &'static str,
    pub border: &'static str,
    pub shadow: &'static str,
    pub close_button: &'static str,
    pub close_button_hover: &'static str,
}

pub const LIGHT_PALETTE: Palette = Palette {
    background: "#ffffff",
    text: "#262730",
    border: "#e6eaf1",
    shadow: "rgba(0,0,0,0.1)",
    close_button: "#262730",
    close_button_hover: "rgba(0,0,0,0.05)",
};

pub const DARK_PALETTE: Palette = Palette {
    background: "#0e1117",
    text: "#fafafa",
    border: "#262730",
    shadow: "rgba(0,0,0,0.3)",
    close_button: "#fafafa",
    close_button_hover: "rgba(255,255,255,0.1)",
};

impl Palette {
    pub fn for_theme(theme: Theme) -> &'static Palette {
        if theme.is_dark() {
            &DARK_PALETTE
        } else {
            &LIGHT_PALETTE
        }
    }
}

/// Renders the `:root` custom-property block for the given width and theme.
pub fn css_variables(width: &str, theme: Theme) -> String {
    let palette = Palette::for_theme(theme);

    format!(
        r#":root {{
  --sidebar-width: {width};
  --sidebar-bg-color: {};
  --sidebar-text-color: {};
  --sidebar-border-color: {};
  --sidebar-shadow-color: {};
  --sidebar-close-btn-color: {};
  --sidebar-close-btn-hover-bg: {};
}}"#,
        palette.background,
        palette.text,
        palette.border,
        palette.shadow,
        palette.close_button,
        palette.close_button_hover,
    )
}

/// Ensures the custom-property style node and the stylesheet link exist in
/// the document head.
///
/// Idempotent on the style node id: once it exists, later calls change
/// nothing, even if the host theme has changed in the meantime.
pub fn inject(document: &Document, width: &str) -> Result<()> {
    if document.get_element_by_id(STYLE_ELEMENT_ID).is_some() {
        return Ok(());
    }

    let theme = theme::detect(document);
    let head = document
        .head()
        .ok_or_else(|| anyhow!("host document has no head"))?;

    let style = document.create_element("style").map_err(js_error)?;
    style.set_id(STYLE_ELEMENT_ID);
    style.set_text_content(Some(&css_variables(width, theme)));
    head.append_child(&style).map_err(js_error)?;

    let link: HtmlLinkElement = document
        .create_element("link")
        .map_err(js_error)?
        .dyn_into()
        .map_err(|_| anyhow!("link element has an unexpected type"))?;
    link.set_id(LINK_ELEMENT_ID);
    link.set_rel("stylesheet");
    link.set_href(STYLESHEET_HREF);
    head.append_child(&link).map_err(js_error)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variables_carry_the_requested_width() {
        let block = css_variables("300px", Theme::Light);
        assert!(block.contains("--sidebar-width: 300px;"));
    }

    #[test]
    fn light_theme_uses_light_palette() {
        let block = css_variables("250px", Theme::Light);
        assert!(block.contains("--sidebar-bg-color: #ffffff;"));
        assert!(block.contains("--sidebar-text-color: #262730;"));
        assert!(block.contains("--sidebar-close-btn-hover-bg: rgba(0,0,0,0.05);"));
    }

    #[test]
    fn dark_theme_uses_dark_palette() {
        let block = css_variables("250px", Theme::Dark);
        assert!(block.contains("--sidebar-bg-color: #0e1117;"));
        assert!(block.contains("--sidebar-text-color: #fafafa;"));
        assert!(block.contains("--sidebar-shadow-color: rgba(0,0,0,0.3);"));
    }

    #[test]
    fn palette_selection_follows_theme() {
        assert_eq!(
            Palette::for_theme(Theme::Dark).background,
            DARK_PALETTE.background
        );
        assert_eq!(
            Palette::for_theme(Theme::Light).background,
            LIGHT_PALETTE.background
        );
    }
}
