use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use px_core::config::{ConversionParams, ExportFormat, ExportSettings, Settings};
use px_core::error::CoreError;
use px_core::frame::RenderedArt;
use px_source::image::{SourceImage, open_source};

use crate::history::{History, HistoryEntry};
use crate::pipeline::Pipeline;

/// État d'une session : image source, paramètres courants, dernier rendu.
///
/// Every request goes through `&mut self`, so one conversion runs at a time.
/// A failed request leaves source, parameters, art and history untouched.
pub struct Session {
    source: Option<SourceImage>,
    params: ConversionParams,
    art: Option<RenderedArt>,
    history: History,
    pipeline: Pipeline,
    export: ExportSettings,
}

impl Session {
    /// Start from persisted settings. No image is loaded yet.
    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        Self {
            source: None,
            params: settings.conversion_params(),
            art: None,
            history: History::new(settings.history_max),
            pipeline: Pipeline::new(),
            export: settings.export.clone(),
        }
    }

    /// Current parameters.
    #[must_use]
    pub fn params(&self) -> &ConversionParams {
        &self.params
    }

    /// Last successful rendering.
    #[must_use]
    pub fn art(&self) -> Option<&RenderedArt> {
        self.art.as_ref()
    }

    /// Loaded source, if any.
    #[must_use]
    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref()
    }

    /// Conversion history.
    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Export options.
    #[must_use]
    pub fn export_settings(&self) -> &ExportSettings {
        &self.export
    }

    /// Replace parameters without converting (no image loaded yet).
    pub fn set_params(&mut self, mut params: ConversionParams) {
        params.clamp_all();
        self.params = params;
    }

    /// Charge une image puis la convertit avec les paramètres courants.
    ///
    /// # Errors
    /// `DecodeFailure` if the file cannot be read, or any conversion error.
    /// On error the previous image stays loaded.
    pub fn open(&mut self, path: &Path) -> Result<&RenderedArt, CoreError> {
        let source = open_source(path)?;
        let art = self.pipeline.convert(&source.grid, &self.params)?;
        log::info!(
            "Image ouverte : {} ({}×{}, {} frame(s))",
            path.display(),
            source.grid.width(),
            source.grid.height(),
            source.frame_count()
        );
        self.source = Some(source);
        Ok(self.commit(art, self.params.clone()))
    }

    /// Modifie les paramètres et reconvertit.
    ///
    /// The edit is applied to a copy, clamped, and only kept if the
    /// conversion succeeds. Without an image, the edit is stored as is.
    ///
    /// # Errors
    /// Any conversion error; parameters are then left unchanged.
    pub fn update(
        &mut self,
        edit: impl FnOnce(&mut ConversionParams),
    ) -> Result<Option<&RenderedArt>, CoreError> {
        let mut candidate = self.params.clone();
        edit(&mut candidate);
        candidate.clamp_all();

        let Some(source) = self.source.as_ref() else {
            self.params = candidate;
            return Ok(None);
        };
        let art = self.pipeline.convert(&source.grid, &candidate)?;
        Ok(Some(self.commit(art, candidate)))
    }

    /// Reconvertit avec les paramètres courants.
    ///
    /// # Errors
    /// `InvalidImage` when no image is loaded, or any conversion error.
    pub fn refresh(&mut self) -> Result<&RenderedArt, CoreError> {
        let source = self
            .source
            .as_ref()
            .ok_or_else(|| CoreError::InvalidImage("aucune image chargée".to_string()))?;
        let art = self.pipeline.convert(&source.grid, &self.params)?;
        Ok(self.commit(art, self.params.clone()))
    }

    fn commit(&mut self, art: RenderedArt, params: ConversionParams) -> &RenderedArt {
        self.history.push(HistoryEntry {
            art: art.clone(),
            params: params.clone(),
        });
        self.params = params;
        self.art.insert(art)
    }

    /// Revient au rendu précédent. `false` s'il n'y a rien à annuler.
    pub fn undo(&mut self) -> bool {
        let Some(prev) = self.history.undo() else {
            return false;
        };
        self.art = Some(prev.art.clone());
        self.params = prev.params.clone();
        true
    }

    /// Exporte le dernier rendu.
    ///
    /// # Errors
    /// `ExportFailure` if nothing has been rendered yet or the write fails.
    pub fn save(&self, format: ExportFormat, stem: &Path) -> Result<PathBuf, CoreError> {
        let art = self
            .art
            .as_ref()
            .ok_or_else(|| CoreError::export(stem, "aucun rendu à exporter"))?;
        px_export::export(art, &self.params, format, stem, &self.export)
    }

    /// Résumé lisible de l'état courant.
    #[must_use]
    pub fn info(&self) -> String {
        let mut out = String::new();
        match &self.source {
            Some(src) => {
                let _ = writeln!(
                    out,
                    "Image     : {} ({}×{}, {} frame(s))",
                    src.path.display(),
                    src.grid.width(),
                    src.grid.height(),
                    src.frame_count()
                );
            }
            None => out.push_str("Image     : aucune\n"),
        }
        let p = &self.params;
        let _ = writeln!(out, "Largeur   : {} (zoom {:.1})", p.width, p.zoom);
        let _ = writeln!(
            out,
            "Palette   : {} \"{}\"",
            p.charset.name(),
            p.palette().as_string()
        );
        let _ = writeln!(
            out,
            "Effet     : {} / couleurs {}",
            p.adjust.effect.label(),
            p.adjust.color_style.name()
        );
        let _ = writeln!(
            out,
            "Réglages  : contraste {:.1}, luminosité {:.1}, netteté {:.1}, flou {:.1}, contours {:.1}",
            p.adjust.contrast,
            p.adjust.brightness,
            p.adjust.sharpness,
            p.adjust.blur_radius,
            p.adjust.edge_intensity
        );
        if let Some(art) = &self.art {
            let _ = writeln!(out, "Rendu     : {}×{}", art.width(), art.height());
        }
        let _ = write!(
            out,
            "Historique: {}/{}",
            self.history.len(),
            self.history.max()
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use px_core::config::EffectMode;

    fn write_png(dir: &Path) -> PathBuf {
        let path = dir.join("src.png");
        let img = RgbImage::from_fn(80, 40, |x, _| {
            let v = (x * 3) as u8;
            Rgb([v, v, v])
        });
        img.save(&path).unwrap();
        path
    }

    fn session() -> Session {
        let mut settings = Settings::default();
        settings.width = 40;
        Session::new(&settings)
    }

    #[test]
    fn open_converts_and_records_history() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session();
        let art = s.open(&write_png(dir.path())).unwrap();
        assert_eq!(art.width(), 40);
        assert_eq!(s.history().len(), 1);
    }

    #[test]
    fn failed_open_keeps_previous_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session();
        s.open(&write_png(dir.path())).unwrap();
        let before = s.art().cloned();

        let err = s.open(&dir.path().join("missing.png")).unwrap_err();
        assert!(matches!(err, CoreError::DecodeFailure { .. }));
        assert_eq!(s.art().cloned(), before);
        assert_eq!(s.history().len(), 1);
    }

    #[test]
    fn update_then_undo_restores_art_and_params() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session();
        s.open(&write_png(dir.path())).unwrap();
        let first = s.art().cloned();

        s.update(|p| p.adjust.effect = EffectMode::Invert).unwrap();
        assert_eq!(s.params().adjust.effect, EffectMode::Invert);
        assert_ne!(s.art().cloned(), first);

        assert!(s.undo());
        assert_eq!(s.params().adjust.effect, EffectMode::None);
        assert_eq!(s.art().cloned(), first);
        assert!(!s.undo());
    }

    #[test]
    fn update_clamps_values() {
        let mut s = session();
        let out = s.update(|p| p.width = 5).unwrap();
        assert!(out.is_none());
        assert_eq!(s.params().width, 20);
    }

    #[test]
    fn refresh_without_image_is_an_error() {
        let mut s = session();
        assert!(matches!(s.refresh(), Err(CoreError::InvalidImage(_))));
    }

    #[test]
    fn save_without_art_is_export_failure() {
        let s = session();
        let err = s.save(ExportFormat::Txt, Path::new("out")).unwrap_err();
        assert!(matches!(err, CoreError::ExportFailure { .. }));
    }

    #[test]
    fn save_writes_with_extension() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session();
        s.open(&write_png(dir.path())).unwrap();
        let path = s.save(ExportFormat::Txt, &dir.path().join("art")).unwrap();
        assert!(path.ends_with("art.txt"));
        let text = std::fs::read_to_string(path).unwrap();
        assert_eq!(text.lines().count() as u32, s.art().unwrap().height());
    }

    #[test]
    fn info_mentions_image_and_history() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session();
        s.open(&write_png(dir.path())).unwrap();
        let info = s.info();
        assert!(info.contains("src.png"));
        assert!(info.contains("Historique: 1/5"));
    }
}
