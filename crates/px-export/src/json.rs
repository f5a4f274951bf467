use std::path::Path;

use px_core::config::ConversionParams;
use px_core::error::CoreError;
use px_core::frame::RenderedArt;
use serde::Serialize;

/// Enregistrement JSON : texte + paramètres qui l'ont produit.
#[derive(Serialize)]
struct ExportRecord<'a> {
    ascii: String,
    settings: &'a ConversionParams,
}

/// `{"ascii": ..., "settings": {...}}` as a string.
///
/// # Errors
/// Returns `ExportFailure` if serialization fails.
pub fn render_json(art: &RenderedArt, params: &ConversionParams) -> Result<String, CoreError> {
    let record = ExportRecord {
        ascii: art.to_plain_string(),
        settings: params,
    };
    serde_json::to_string_pretty(&record).map_err(|e| CoreError::export("<json>", e))
}

/// Écrit l'enregistrement JSON.
///
/// # Errors
/// Returns `ExportFailure` if serialization or the write fails.
pub fn write_json(
    art: &RenderedArt,
    params: &ConversionParams,
    path: &Path,
) -> Result<(), CoreError> {
    let body = render_json(art, params)?;
    std::fs::write(path, body).map_err(|e| CoreError::export(path, e))
}
