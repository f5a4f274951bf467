use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::charset::CharSet;

/// Largeur de sortie par défaut, en caractères.
pub const DEFAULT_WIDTH: u32 = 100;
/// Default number of history snapshots kept by a session.
pub const DEFAULT_HISTORY: usize = 5;

/// Transformation et stratégie de réduction de canaux d'une conversion.
///
/// # Example
/// ```
/// use px_core::config::EffectMode;
/// assert!(EffectMode::Edge.reduces_to_luma());
/// assert!(!EffectMode::Sepia.reduces_to_luma());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectMode {
    /// Plain greyscale ramp.
    #[default]
    None,
    /// Same as `None`; kept as a distinct, selectable mode.
    Grayscale,
    /// Keep RGB, attach a color to each glyph.
    Colored,
    /// Canny edge mask.
    Edge,
    /// Gaussian blur.
    Blur,
    /// 255 - v.
    Invert,
    /// Sepia tone matrix, colored glyphs.
    Sepia,
    /// Glyphs tinted by their own luminance on a blue→red ramp.
    Heatmap,
}

impl EffectMode {
    /// All modes, in menu order.
    pub const ALL: [Self; 8] = [
        Self::None,
        Self::Grayscale,
        Self::Colored,
        Self::Edge,
        Self::Blur,
        Self::Invert,
        Self::Sepia,
        Self::Heatmap,
    ];

    /// True if the source is reduced to one luma channel before adjustment.
    #[must_use]
    pub fn reduces_to_luma(self) -> bool {
        !matches!(self, Self::Colored | Self::Sepia)
    }

    /// Identifiant court (CLI, fichiers).
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Grayscale => "grayscale",
            Self::Colored => "colored",
            Self::Edge => "edge",
            Self::Blur => "blur",
            Self::Invert => "invert",
            Self::Sepia => "sepia",
            Self::Heatmap => "heatmap",
        }
    }

    /// Menu label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::None => "No color",
            Self::Grayscale => "Grayscale",
            Self::Colored => "Colored",
            Self::Edge => "Edge detection",
            Self::Blur => "Blur effect",
            Self::Invert => "Inverted",
            Self::Sepia => "Sepia tone",
            Self::Heatmap => "Heatmap",
        }
    }

    /// Parse a mode name, case-insensitive.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(name.trim()))
    }
}

/// How colored glyphs pick their foreground.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorStyle {
    /// Four coarse classes by mean brightness.
    #[default]
    Default,
    /// Truecolor RGB of the sample.
    Vivid,
    /// Grey level of the sample's luma.
    Grayscale,
    /// 6×6×6 terminal color cube.
    Retro,
}

impl ColorStyle {
    /// All styles, in menu order.
    pub const ALL: [Self; 4] = [Self::Default, Self::Vivid, Self::Grayscale, Self::Retro];

    /// Identifiant court.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Vivid => "vivid",
            Self::Grayscale => "grayscale",
            Self::Retro => "retro",
        }
    }

    /// Parse a style name, case-insensitive.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.name().eq_ignore_ascii_case(name.trim()))
    }
}

/// Paramètres d'ajustement d'image, passés par valeur à chaque conversion.
///
/// Defaults are neutral. The pipeline applies them as given; shells call
/// [`AdjustParams::clamp_all`] on user input.
///
/// # Example
/// ```
/// use px_core::config::AdjustParams;
/// let p = AdjustParams::default();
/// assert!((p.contrast - 1.0).abs() < f32::EPSILON);
/// assert!(p.blur_radius.abs() < f32::EPSILON);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AdjustParams {
    /// Contrast factor, 1.0 = neutral.
    pub contrast: f32,
    /// Brightness factor, 1.0 = neutral.
    pub brightness: f32,
    /// Sharpness factor, 1.0 = neutral.
    pub sharpness: f32,
    /// Gaussian sigma for `Blur` mode, 0 = no-op.
    pub blur_radius: f32,
    /// Smoothing scale of the edge detector, > 0.
    pub edge_intensity: f32,
    /// Selected effect.
    pub effect: EffectMode,
    /// Foreground style of colored glyphs.
    pub color_style: ColorStyle,
}

impl Default for AdjustParams {
    fn default() -> Self {
        Self {
            contrast: 1.0,
            brightness: 1.0,
            sharpness: 1.0,
            blur_radius: 0.0,
            edge_intensity: 1.0,
            effect: EffectMode::None,
            color_style: ColorStyle::Default,
        }
    }
}

/// Borne un facteur ; NaN et ±∞ reprennent la valeur par défaut.
#[inline(always)]
fn clamp_factor(value: f32, min: f32, max: f32, default: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        default
    }
}

impl AdjustParams {
    /// Clamp every factor to its documented range.
    ///
    /// Non-finite factors are reset to their default.
    pub fn clamp_all(&mut self) {
        let d = Self::default();
        self.contrast = clamp_factor(self.contrast, 0.1, 3.0, d.contrast);
        self.brightness = clamp_factor(self.brightness, 0.1, 3.0, d.brightness);
        self.sharpness = clamp_factor(self.sharpness, 0.1, 3.0, d.sharpness);
        self.blur_radius = clamp_factor(self.blur_radius, 0.0, 50.0, d.blur_radius);
        self.edge_intensity = clamp_factor(self.edge_intensity, 0.1, 3.0, d.edge_intensity);
    }
}

/// Tout ce dont une conversion a besoin, hors pixels.
///
/// # Example
/// ```
/// use px_core::config::ConversionParams;
/// let p = ConversionParams::default();
/// assert_eq!(p.width, 100);
/// assert_eq!(p.palette().len(), 12);
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConversionParams {
    /// Output width in characters, before zoom.
    pub width: u32,
    /// Multiplier applied to `width`.
    pub zoom: f32,
    /// Selected character set.
    pub charset: CharSet,
    /// Ramp used when `charset` is `Custom`.
    pub custom_chars: String,
    /// Image adjustments and effect.
    pub adjust: AdjustParams,
}

impl Default for ConversionParams {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            zoom: 1.0,
            charset: CharSet::Basic,
            custom_chars: String::new(),
            adjust: AdjustParams::default(),
        }
    }
}

impl ConversionParams {
    /// Resolve the active palette.
    #[must_use]
    pub fn palette(&self) -> crate::charset::Palette {
        self.charset.palette(&self.custom_chars)
    }

    /// Clamp width, zoom and adjustment factors to their documented ranges.
    pub fn clamp_all(&mut self) {
        self.width = self.width.clamp(20, 300);
        self.zoom = clamp_factor(self.zoom, 0.5, 3.0, 1.0);
        self.adjust.clamp_all();
    }
}

/// Output format of an export.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Raw glyph lines.
    #[default]
    Txt,
    /// Glyph lines with ANSI color escapes.
    Ansi,
    /// `<pre>` block in an HTML page.
    Html,
    /// Rasterized PNG.
    Png,
    /// Text plus the parameters that produced it.
    Json,
}

impl ExportFormat {
    /// All formats.
    pub const ALL: [Self; 5] = [Self::Txt, Self::Ansi, Self::Html, Self::Png, Self::Json];

    /// File extension appended to the export stem.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Txt => "txt",
            Self::Ansi => "ans",
            Self::Html => "html",
            Self::Png => "png",
            Self::Json => "json",
        }
    }

    /// Parse a format name or extension, case-insensitive.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().trim_start_matches('.').to_ascii_lowercase();
        match name.as_str() {
            "txt" | "text" => Some(Self::Txt),
            "ans" | "ansi" => Some(Self::Ansi),
            "html" | "htm" => Some(Self::Html),
            "png" | "image" => Some(Self::Png),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Options des exporteurs.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ExportSettings {
    /// Default format for `save` without an explicit one.
    pub format: ExportFormat,
    /// CSS background of the HTML page.
    pub html_bg_color: String,
    /// CSS text color of the `<pre>` block.
    pub html_fg_color: String,
    /// Font size of the `<pre>` block, in px.
    pub html_font_size: u32,
    /// Glyph height of the PNG export, in px.
    pub image_font_size: f32,
    /// Monospace TTF/OTF used by the PNG export. None = search system paths.
    pub font_path: Option<PathBuf>,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            format: ExportFormat::Txt,
            html_bg_color: "black".into(),
            html_fg_color: "white".into(),
            html_font_size: 12,
            image_font_size: 10.0,
            font_path: None,
        }
    }
}

/// État persistant entre deux sessions.
///
/// # Example
/// ```
/// use px_core::config::Settings;
/// let s = Settings::default();
/// assert_eq!(s.width, 100);
/// assert!(s.custom_chars.is_empty());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    /// Output width in characters.
    pub width: u32,
    /// Zoom multiplier.
    pub zoom: f32,
    /// Last used effect.
    pub effect: EffectMode,
    /// Last used character set.
    pub charset: CharSet,
    /// User palette.
    pub custom_chars: String,
    /// Last used color style.
    pub color_style: ColorStyle,
    /// Maximum number of history snapshots.
    pub history_max: usize,
    /// Exporter options.
    pub export: ExportSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            zoom: 1.0,
            effect: EffectMode::None,
            charset: CharSet::Basic,
            custom_chars: String::new(),
            color_style: ColorStyle::Default,
            history_max: DEFAULT_HISTORY,
            export: ExportSettings::default(),
        }
    }
}

impl Settings {
    /// Clamp all numeric fields to their valid ranges.
    /// Called after TOML deserialization to prevent out-of-range values.
    pub fn clamp_all(&mut self) {
        self.width = self.width.clamp(20, 300);
        self.zoom = clamp_factor(self.zoom, 0.5, 3.0, 1.0);
        self.history_max = self.history_max.clamp(1, 100);
        self.export.html_font_size = self.export.html_font_size.clamp(4, 96);
        self.export.image_font_size = clamp_factor(
            self.export.image_font_size,
            4.0,
            96.0,
            ExportSettings::default().image_font_size,
        );
    }

    /// Starting parameters for a session: persisted fields, neutral adjustments.
    #[must_use]
    pub fn conversion_params(&self) -> ConversionParams {
        ConversionParams {
            width: self.width,
            zoom: self.zoom,
            charset: self.charset,
            custom_chars: self.custom_chars.clone(),
            adjust: AdjustParams {
                effect: self.effect,
                color_style: self.color_style,
                ..AdjustParams::default()
            },
        }
    }

    /// Capture the persisted fields of the parameters in use.
    pub fn remember(&mut self, params: &ConversionParams) {
        self.width = params.width;
        self.zoom = params.zoom;
        self.effect = params.adjust.effect;
        self.charset = params.charset;
        self.custom_chars.clone_from(&params.custom_chars);
        self.color_style = params.adjust.color_style;
    }
}

/// Structure TOML intermédiaire, toutes les valeurs optionnelles.
#[derive(Default, Deserialize, Serialize)]
struct SettingsFile {
    session: Option<SessionSection>,
    history: Option<HistorySection>,
    export: Option<ExportSection>,
}

#[derive(Default, Deserialize, Serialize)]
struct SessionSection {
    width: Option<u32>,
    zoom: Option<f32>,
    effect: Option<EffectMode>,
    charset: Option<CharSet>,
    custom_chars: Option<String>,
    color_style: Option<ColorStyle>,
}

#[derive(Default, Deserialize, Serialize)]
struct HistorySection {
    max_entries: Option<usize>,
}

#[derive(Default, Deserialize, Serialize)]
struct ExportSection {
    format: Option<ExportFormat>,
    html_bg_color: Option<String>,
    html_fg_color: Option<String>,
    html_font_size: Option<u32>,
    image_font_size: Option<f32>,
    font_path: Option<PathBuf>,
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
/// ```no_run
/// use px_core::config::load_settings;
/// use std::path::Path;
/// let settings = load_settings(Path::new("pixscii.toml")).unwrap();
/// ```
pub fn load_settings(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    parse_settings(&content).with_context(|| format!("Erreur de parsing TOML dans {}", path.display()))
}

/// Parse settings from TOML text, merged over defaults and clamped.
///
/// # Errors
/// Returns an error if the text is not valid settings TOML.
pub fn parse_settings(content: &str) -> Result<Settings> {
    let file: SettingsFile = toml::from_str(content)?;
    let mut settings = Settings::default();

    if let Some(s) = file.session {
        if let Some(v) = s.width {
            settings.width = v;
        }
        if let Some(v) = s.zoom {
            settings.zoom = v;
        }
        if let Some(v) = s.effect {
            settings.effect = v;
        }
        if let Some(v) = s.charset {
            settings.charset = v;
        }
        if let Some(v) = s.custom_chars {
            settings.custom_chars = v;
        }
        if let Some(v) = s.color_style {
            settings.color_style = v;
        }
    }

    if let Some(v) = file.history.and_then(|h| h.max_entries) {
        settings.history_max = v;
    }

    if let Some(e) = file.export {
        if let Some(v) = e.format {
            settings.export.format = v;
        }
        if let Some(v) = e.html_bg_color {
            settings.export.html_bg_color = v;
        }
        if let Some(v) = e.html_fg_color {
            settings.export.html_fg_color = v;
        }
        if let Some(v) = e.html_font_size {
            settings.export.html_font_size = v;
        }
        if let Some(v) = e.image_font_size {
            settings.export.image_font_size = v;
        }
        if e.font_path.is_some() {
            settings.export.font_path = e.font_path;
        }
    }

    settings.clamp_all();
    Ok(settings)
}

/// Like [`load_settings`], but never fails: a missing or malformed file
/// yields the defaults.
#[must_use]
pub fn load_settings_or_default(path: &Path) -> Settings {
    if !path.exists() {
        log::info!(
            "Fichier de réglages absent : {}. Utilisation des défauts.",
            path.display()
        );
        return Settings::default();
    }
    match load_settings(path) {
        Ok(settings) => {
            log::info!("Réglages chargés depuis {}", path.display());
            settings
        }
        Err(e) => {
            log::warn!("Réglages ignorés ({e:#}), utilisation des défauts.");
            Settings::default()
        }
    }
}

/// Serialize settings to TOML text.
///
/// # Errors
/// Returns an error if TOML serialization fails.
pub fn settings_to_toml(settings: &Settings) -> Result<String> {
    let file = SettingsFile {
        session: Some(SessionSection {
            width: Some(settings.width),
            zoom: Some(settings.zoom),
            effect: Some(settings.effect),
            charset: Some(settings.charset),
            custom_chars: Some(settings.custom_chars.clone()),
            color_style: Some(settings.color_style),
        }),
        history: Some(HistorySection {
            max_entries: Some(settings.history_max),
        }),
        export: Some(ExportSection {
            format: Some(settings.export.format),
            html_bg_color: Some(settings.export.html_bg_color.clone()),
            html_fg_color: Some(settings.export.html_fg_color.clone()),
            html_font_size: Some(settings.export.html_font_size),
            image_font_size: Some(settings.export.image_font_size),
            font_path: settings.export.font_path.clone(),
        }),
    };
    toml::to_string_pretty(&file).context("Sérialisation TOML des réglages")
}

/// Écrit les réglages sur disque.
///
/// # Errors
/// Returns an error if serialization or the write fails.
pub fn save_settings(path: &Path, settings: &Settings) -> Result<()> {
    let text = settings_to_toml(settings)?;
    std::fs::write(path, text).with_context(|| format!("Impossible d'écrire {}", path.display()))?;
    log::info!("Réglages enregistrés dans {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_overrides_only_given_fields() {
        let s = parse_settings(
            r#"
            [session]
            width = 150
            effect = "sepia"
            custom_chars = " -=#"
            "#,
        )
        .unwrap();
        assert_eq!(s.width, 150);
        assert_eq!(s.effect, EffectMode::Sepia);
        assert_eq!(s.custom_chars, " -=#");
        assert_eq!(s.charset, CharSet::Basic);
        assert_eq!(s.history_max, DEFAULT_HISTORY);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let s = parse_settings("[session]\nwidth = 5000\nzoom = 0.0\n").unwrap();
        assert_eq!(s.width, 300);
        assert!((s.zoom - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn non_finite_values_fall_back_to_defaults() {
        let s = parse_settings("[session]\nzoom = nan\n[export]\nimage_font_size = inf\n").unwrap();
        assert!((s.zoom - 1.0).abs() < f32::EPSILON);
        assert!((s.export.image_font_size - 10.0).abs() < f32::EPSILON);

        let mut p = ConversionParams::default();
        p.zoom = f32::NAN;
        p.adjust.contrast = f32::NAN;
        p.adjust.edge_intensity = f32::INFINITY;
        p.clamp_all();
        assert_eq!(p, ConversionParams::default());
    }

    #[test]
    fn malformed_text_is_an_error() {
        assert!(parse_settings("[session\nwidth = ").is_err());
        assert!(parse_settings("[session]\neffect = \"plasma\"").is_err());
    }

    #[test]
    fn missing_or_broken_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert_eq!(load_settings_or_default(&missing), Settings::default());

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "width = [").unwrap();
        assert_eq!(load_settings_or_default(&broken), Settings::default());
    }

    #[test]
    fn save_then_load_restores_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pixscii.toml");
        let mut s = Settings::default();
        s.width = 80;
        s.effect = EffectMode::Heatmap;
        s.charset = CharSet::Custom;
        s.custom_chars = " .oO@".into();
        s.export.format = ExportFormat::Html;
        save_settings(&path, &s).unwrap();
        assert_eq!(load_settings(&path).unwrap(), s);
    }

    #[test]
    fn remember_captures_persisted_fields() {
        let mut s = Settings::default();
        let mut p = s.conversion_params();
        p.width = 120;
        p.adjust.effect = EffectMode::Edge;
        p.adjust.contrast = 2.0;
        s.remember(&p);
        assert_eq!(s.width, 120);
        assert_eq!(s.effect, EffectMode::Edge);
        assert!((s.conversion_params().adjust.contrast - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn format_names_and_extensions() {
        for f in ExportFormat::ALL {
            assert_eq!(ExportFormat::from_name(f.extension()), Some(f));
        }
        assert_eq!(ExportFormat::from_name(".HTML"), Some(ExportFormat::Html));
    }

    #[test]
    fn only_colored_and_sepia_keep_rgb() {
        let rgb: Vec<_> = EffectMode::ALL
            .into_iter()
            .filter(|m| !m.reduces_to_luma())
            .collect();
        assert_eq!(rgb, vec![EffectMode::Colored, EffectMode::Sepia]);
    }
}
