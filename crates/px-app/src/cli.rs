use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use px_core::charset::CharSet;
use px_core::config::{ColorStyle, ConversionParams, EffectMode, ExportFormat};

/// pixscii — convertisseur image → art ASCII.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Image source (PNG, JPEG, BMP, GIF).
    #[arg(short, long)]
    pub image: Option<PathBuf>,

    /// Largeur de sortie en caractères (20–300).
    #[arg(short, long)]
    pub width: Option<u32>,

    /// Facteur de zoom (0.5–3.0).
    #[arg(long)]
    pub zoom: Option<f32>,

    /// Palette de caractères.
    #[arg(long, value_enum)]
    pub charset: Option<CharsetArg>,

    /// Caractères personnalisés, du plus sombre au plus clair (implique --charset custom).
    #[arg(long)]
    pub custom_chars: Option<String>,

    /// Mode d'effet.
    #[arg(long, value_enum)]
    pub effect: Option<EffectArg>,

    /// Style de couleur des modes colorés.
    #[arg(long, value_enum)]
    pub palette: Option<PaletteArg>,

    /// Contraste (0.1–3.0).
    #[arg(long)]
    pub contrast: Option<f32>,

    /// Luminosité (0.1–3.0).
    #[arg(long)]
    pub brightness: Option<f32>,

    /// Netteté (0.1–3.0).
    #[arg(long)]
    pub sharpness: Option<f32>,

    /// Rayon du flou gaussien (0–50), mode blur.
    #[arg(long)]
    pub blur_radius: Option<f32>,

    /// Lissage du détecteur de contours (0.1–3.0), mode edge.
    #[arg(long)]
    pub edge_intensity: Option<f32>,

    /// Exporter vers ce chemin (l'extension du format est ajoutée).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Format d'export. Défaut : celui du fichier de configuration.
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Jouer un GIF animé dans le terminal (Ctrl-C pour arrêter).
    #[arg(long, default_value_t = false)]
    pub animate: bool,

    /// Nombre de boucles de l'animation (défaut : infini).
    #[arg(long)]
    pub loops: Option<u32>,

    /// Session de commandes interactive.
    #[arg(long, default_value_t = false)]
    pub interactive: bool,

    /// Fichier de réglages TOML.
    #[arg(long, default_value = "pixscii.toml")]
    pub settings: PathBuf,

    /// Ne pas enregistrer les réglages à la sortie.
    #[arg(long, default_value_t = false)]
    pub no_save: bool,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    /// Validate flag combinations.
    ///
    /// # Errors
    /// Returns an error if no image is given outside interactive mode, or
    /// if `--animate` is used without an image.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.image.is_none() && !self.interactive {
            anyhow::bail!("Aucune image spécifiée. Utilisez --image ou --interactive.");
        }
        if self.animate && self.image.is_none() {
            anyhow::bail!("--animate requiert --image.");
        }
        Ok(())
    }

    /// Apply every flag that was given over `params`, then clamp.
    pub fn apply(&self, params: &mut ConversionParams) {
        if let Some(w) = self.width {
            params.width = w;
        }
        if let Some(z) = self.zoom {
            params.zoom = z;
        }
        if let Some(c) = self.charset {
            params.charset = c.into();
        }
        if let Some(ref chars) = self.custom_chars {
            params.custom_chars.clone_from(chars);
            if self.charset.is_none() {
                params.charset = CharSet::Custom;
            }
        }
        if let Some(e) = self.effect {
            params.adjust.effect = e.into();
        }
        if let Some(p) = self.palette {
            params.adjust.color_style = p.into();
        }
        if let Some(v) = self.contrast {
            params.adjust.contrast = v;
        }
        if let Some(v) = self.brightness {
            params.adjust.brightness = v;
        }
        if let Some(v) = self.sharpness {
            params.adjust.sharpness = v;
        }
        if let Some(v) = self.blur_radius {
            params.adjust.blur_radius = v;
        }
        if let Some(v) = self.edge_intensity {
            params.adjust.edge_intensity = v;
        }
        params.clamp_all();
    }
}

/// Built-in character sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CharsetArg {
    /// ` .,:;+*?%S#@` (12 niveaux).
    Basic,
    /// Rampe étendue de 92 caractères.
    Extended,
    /// Blocs Unicode ` ░▒▓█`.
    Blocks,
    /// Rampe basique inversée (fond clair).
    Inverted,
    /// Caractères de `--custom-chars`.
    Custom,
}

impl From<CharsetArg> for CharSet {
    fn from(c: CharsetArg) -> Self {
        match c {
            CharsetArg::Basic => CharSet::Basic,
            CharsetArg::Extended => CharSet::Extended,
            CharsetArg::Blocks => CharSet::Blocks,
            CharsetArg::Inverted => CharSet::Inverted,
            CharsetArg::Custom => CharSet::Custom,
        }
    }
}

/// Effect modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EffectArg {
    /// Aucun effet, niveaux de gris.
    None,
    /// Niveaux de gris.
    Grayscale,
    /// Glyphes colorés depuis les pixels RGB.
    Colored,
    /// Contours Canny.
    Edge,
    /// Flou gaussien (`--blur-radius`).
    Blur,
    /// Négatif.
    Invert,
    /// Teinte sépia, glyphes colorés.
    Sepia,
    /// Couleur selon la luminance (bleu → rouge).
    Heatmap,
}

impl From<EffectArg> for EffectMode {
    fn from(e: EffectArg) -> Self {
        match e {
            EffectArg::None => EffectMode::None,
            EffectArg::Grayscale => EffectMode::Grayscale,
            EffectArg::Colored => EffectMode::Colored,
            EffectArg::Edge => EffectMode::Edge,
            EffectArg::Blur => EffectMode::Blur,
            EffectArg::Invert => EffectMode::Invert,
            EffectArg::Sepia => EffectMode::Sepia,
            EffectArg::Heatmap => EffectMode::Heatmap,
        }
    }
}

/// Color styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PaletteArg {
    /// Classe de couleur grossière.
    Default,
    /// Couleur exacte du pixel.
    Vivid,
    /// Gris de même luminance.
    Grayscale,
    /// Cube 6×6×6.
    Retro,
}

impl From<PaletteArg> for ColorStyle {
    fn from(p: PaletteArg) -> Self {
        match p {
            PaletteArg::Default => ColorStyle::Default,
            PaletteArg::Vivid => ColorStyle::Vivid,
            PaletteArg::Grayscale => ColorStyle::Grayscale,
            PaletteArg::Retro => ColorStyle::Retro,
        }
    }
}

/// Export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// Texte brut.
    Txt,
    /// Texte avec séquences de couleur ANSI.
    Ansi,
    /// Page HTML autonome.
    Html,
    /// Image rasterisée.
    Png,
    /// Texte et paramètres.
    Json,
}

impl From<FormatArg> for ExportFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Txt => ExportFormat::Txt,
            FormatArg::Ansi => ExportFormat::Ansi,
            FormatArg::Html => ExportFormat::Html,
            FormatArg::Png => ExportFormat::Png,
            FormatArg::Json => ExportFormat::Json,
        }
    }
}
