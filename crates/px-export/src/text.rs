use std::path::Path;

use px_core::error::CoreError;
use px_core::frame::RenderedArt;

/// Texte brut : lignes de glyphes jointes par `\n`.
///
/// # Errors
/// Returns `ExportFailure` if the file cannot be written.
pub fn write_text(art: &RenderedArt, path: &Path) -> Result<(), CoreError> {
    std::fs::write(path, art.to_plain_string()).map_err(|e| CoreError::export(path, e))
}
