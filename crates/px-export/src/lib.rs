/// Export collaborators for pixscii.
///
/// Plain text, ANSI text, standalone HTML, rasterized PNG and JSON writers.
/// Each takes an immutable `RenderedArt`; failures surface as
/// `CoreError::ExportFailure`.
pub mod ansi;
pub mod html;
pub mod json;
pub mod rasterizer;
pub mod text;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use px_core::config::{ConversionParams, ExportFormat, ExportSettings};
use px_core::error::CoreError;
use px_core::frame::RenderedArt;

/// `stem` + `.` + the format's extension. The extension is always appended,
/// even when `stem` already has one.
///
/// # Example
/// ```
/// use px_core::config::ExportFormat;
/// use px_export::output_path;
/// use std::path::Path;
/// assert_eq!(output_path(Path::new("out/art"), ExportFormat::Html), Path::new("out/art.html"));
/// assert_eq!(output_path(Path::new("a.v2"), ExportFormat::Txt), Path::new("a.v2.txt"));
/// ```
#[must_use]
pub fn output_path(stem: &Path, format: ExportFormat) -> PathBuf {
    let mut name = OsString::from(stem.as_os_str());
    name.push(".");
    name.push(format.extension());
    PathBuf::from(name)
}

/// Écrit l'art dans le format demandé et retourne le chemin produit.
///
/// # Errors
/// Returns `ExportFailure` on any I/O, encoding, or font problem.
pub fn export(
    art: &RenderedArt,
    params: &ConversionParams,
    format: ExportFormat,
    stem: &Path,
    cfg: &ExportSettings,
) -> Result<PathBuf, CoreError> {
    if stem.as_os_str().is_empty() {
        return Err(CoreError::export(stem, "nom de fichier vide"));
    }
    let path = output_path(stem, format);
    match format {
        ExportFormat::Txt => text::write_text(art, &path)?,
        ExportFormat::Ansi => ansi::write_ansi_file(art, &path)?,
        ExportFormat::Html => html::write_html(art, &path, cfg)?,
        ExportFormat::Png => rasterizer::write_png(art, &path, cfg)?,
        ExportFormat::Json => json::write_json(art, params, &path)?,
    }
    log::info!("Export {:?} → {}", format, path.display());
    Ok(path)
}
