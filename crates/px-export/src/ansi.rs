use std::io::Write;
use std::path::Path;

use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use px_core::color::ColorClass;
use px_core::error::CoreError;
use px_core::frame::{GlyphColor, RenderedArt};

/// Couleur terminal d'un glyphe.
#[must_use]
pub fn terminal_color(color: GlyphColor) -> Color {
    match color {
        GlyphColor::Rgb(r, g, b) => Color::Rgb { r, g, b },
        GlyphColor::Class(ColorClass::Grey) => Color::DarkGrey,
        GlyphColor::Class(ColorClass::Blue) => Color::Blue,
        GlyphColor::Class(ColorClass::Green) => Color::Green,
        GlyphColor::Class(ColorClass::White) => Color::White,
    }
}

/// Écrit l'art avec séquences d'échappement ANSI.
///
/// Consecutive glyphs sharing a color share one escape sequence; every
/// line ends with a reset.
///
/// # Errors
/// Returns any I/O error from `out`.
pub fn write_ansi<W: Write>(art: &RenderedArt, out: &mut W) -> std::io::Result<()> {
    for line in art.lines() {
        let mut current: Option<GlyphColor> = None;
        for glyph in line {
            if glyph.color != current {
                match glyph.color {
                    Some(c) => queue!(out, SetForegroundColor(terminal_color(c)))?,
                    None => queue!(out, ResetColor)?,
                }
                current = glyph.color;
            }
            queue!(out, Print(glyph.ch))?;
        }
        queue!(out, ResetColor, Print('\n'))?;
    }
    out.flush()
}

/// ANSI rendering as a string, for terminal display.
///
/// # Example
/// ```
/// use px_core::frame::{Glyph, RenderedArt};
/// use px_export::ansi::render_ansi;
/// let art = RenderedArt::from_cells(2, 1, vec![Glyph::plain('a'), Glyph::plain('b')]).unwrap();
/// assert!(render_ansi(&art).contains("ab"));
/// ```
#[must_use]
pub fn render_ansi(art: &RenderedArt) -> String {
    let mut buf = Vec::new();
    if let Err(e) = write_ansi(art, &mut buf) {
        log::warn!("Rendu ANSI incomplet : {e}");
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Écrit le rendu ANSI dans un fichier.
///
/// # Errors
/// Returns `ExportFailure` if the file cannot be created or written.
pub fn write_ansi_file(art: &RenderedArt, path: &Path) -> Result<(), CoreError> {
    let file = std::fs::File::create(path).map_err(|e| CoreError::export(path, e))?;
    let mut writer = std::io::BufWriter::new(file);
    write_ansi(art, &mut writer).map_err(|e| CoreError::export(path, e))
}
