use std::fmt::Write as _;
use std::path::Path;

use px_core::config::ExportSettings;
use px_core::error::CoreError;
use px_core::frame::{GlyphColor, RenderedArt};

fn push_escaped(out: &mut String, ch: char) {
    match ch {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        '\'' => out.push_str("&#39;"),
        c => out.push(c),
    }
}

/// Page HTML autonome : fond, couleur et taille de police configurables.
///
/// Colored glyphs are wrapped in `<span style='color:#rrggbb'>`, one span
/// per run of identical colors.
///
/// # Example
/// ```
/// use px_core::config::ExportSettings;
/// use px_core::frame::{Glyph, RenderedArt};
/// use px_export::html::render_html;
/// let art = RenderedArt::from_cells(1, 1, vec![Glyph::plain('<')]).unwrap();
/// let html = render_html(&art, &ExportSettings::default());
/// assert!(html.contains("&lt;"));
/// assert!(html.starts_with("<html><body style='background:black;'>"));
/// ```
#[must_use]
pub fn render_html(art: &RenderedArt, cfg: &ExportSettings) -> String {
    let mut out = String::with_capacity(art.width() as usize * art.height() as usize * 2 + 128);
    let _ = write!(
        out,
        "<html><body style='background:{};'><pre style='color:{};font-size:{}px;'>",
        cfg.html_bg_color, cfg.html_fg_color, cfg.html_font_size
    );

    for (i, line) in art.lines().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let mut open: Option<GlyphColor> = None;
        for glyph in line {
            if glyph.color != open {
                if open.is_some() {
                    out.push_str("</span>");
                }
                if let Some(color) = glyph.color {
                    let (r, g, b) = color.to_rgb();
                    let _ = write!(out, "<span style='color:#{r:02x}{g:02x}{b:02x}'>");
                }
                open = glyph.color;
            }
            push_escaped(&mut out, glyph.ch);
        }
        if open.is_some() {
            out.push_str("</span>");
        }
    }

    out.push_str("</pre></body></html>");
    out
}

/// Écrit la page HTML.
///
/// # Errors
/// Returns `ExportFailure` if the file cannot be written.
pub fn write_html(art: &RenderedArt, path: &Path, cfg: &ExportSettings) -> Result<(), CoreError> {
    std::fs::write(path, render_html(art, cfg)).map_err(|e| CoreError::export(path, e))
}
