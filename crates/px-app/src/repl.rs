use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use px_core::charset::CharSet;
use px_core::config::{ColorStyle, EffectMode, ExportFormat};
use px_core::frame::RenderedArt;

use crate::session::Session;

const HELP: &str = "\
Commandes :
  open PATH              charger une image
  width N | zoom F       taille de sortie
  charset NAME           basic, extended, blocks, inverted, custom
  custom CHARS           palette personnalisée (sombre → clair)
  effect NAME            none, grayscale, colored, edge, blur, invert, sepia, heatmap
  palette NAME           default, vivid, grayscale, retro
  contrast F | brightness F | sharpness F | blur F | edge F
  refresh | show | undo | history | info
  save [FORMAT] STEM     txt, ansi, html, png, json
  help | quit";

/// Une requête de la session interactive.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Charger une nouvelle image.
    Open(PathBuf),
    /// Output width in characters.
    Width(u32),
    /// Width multiplier.
    Zoom(f32),
    /// Built-in or custom character set.
    Charset(CharSet),
    /// Set the custom ramp and select it.
    Custom(String),
    /// Effect mode.
    Effect(EffectMode),
    /// Foreground style of colored glyphs.
    Palette(ColorStyle),
    Contrast(f32),
    Brightness(f32),
    Sharpness(f32),
    /// Gaussian sigma of `Blur` mode.
    Blur(f32),
    /// Smoothing scale of `Edge` mode.
    Edge(f32),
    /// Re-run the conversion with the current parameters.
    Refresh,
    /// Print the current art again.
    Show,
    /// Revenir à l'état précédent de l'historique.
    Undo,
    /// List history snapshots.
    History,
    /// Export the current art. `format: None` uses the configured format.
    Save {
        format: Option<ExportFormat>,
        stem: PathBuf,
    },
    /// Source, size and parameters.
    Info,
    Help,
    Quit,
}

fn number<T: std::str::FromStr>(arg: &str, what: &str) -> Result<T> {
    arg.trim()
        .parse()
        .map_err(|_| anyhow!("{what} : nombre attendu, reçu '{}'", arg.trim()))
}

fn required<'a>(arg: &'a str, usage: &str) -> Result<&'a str> {
    let arg = arg.trim();
    if arg.is_empty() {
        bail!("usage : {usage}");
    }
    Ok(arg)
}

impl Command {
    /// Parse one input line. Blank lines yield `None`.
    ///
    /// # Errors
    /// Unknown command, missing argument, or unparsable value.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim_end_matches(['\n', '\r']).trim_start();
        if line.trim().is_empty() {
            return Ok(None);
        }
        let (word, rest) = line.split_once(' ').unwrap_or((line, ""));

        let cmd = match word.to_ascii_lowercase().as_str() {
            "open" => Self::Open(PathBuf::from(required(rest, "open PATH")?)),
            "width" => Self::Width(number(required(rest, "width N")?, "width")?),
            "zoom" => Self::Zoom(number(required(rest, "zoom F")?, "zoom")?),
            "charset" => {
                let name = required(rest, "charset NAME")?;
                Self::Charset(
                    CharSet::from_name(name).ok_or_else(|| anyhow!("palette inconnue '{name}'"))?,
                )
            }
            // espaces significatifs : le premier caractère est souvent ' '
            "custom" => {
                if rest.is_empty() {
                    bail!("usage : custom CHARS");
                }
                Self::Custom(rest.to_string())
            }
            "effect" => {
                let name = required(rest, "effect NAME")?;
                Self::Effect(
                    EffectMode::from_name(name).ok_or_else(|| anyhow!("effet inconnu '{name}'"))?,
                )
            }
            "palette" => {
                let name = required(rest, "palette NAME")?;
                Self::Palette(
                    ColorStyle::from_name(name)
                        .ok_or_else(|| anyhow!("style de couleur inconnu '{name}'"))?,
                )
            }
            "contrast" => Self::Contrast(number(required(rest, "contrast F")?, "contrast")?),
            "brightness" => Self::Brightness(number(required(rest, "brightness F")?, "brightness")?),
            "sharpness" => Self::Sharpness(number(required(rest, "sharpness F")?, "sharpness")?),
            "blur" => Self::Blur(number(required(rest, "blur F")?, "blur")?),
            "edge" => Self::Edge(number(required(rest, "edge F")?, "edge")?),
            "refresh" => Self::Refresh,
            "show" => Self::Show,
            "undo" => Self::Undo,
            "history" => Self::History,
            "save" => {
                let args = required(rest, "save [FORMAT] STEM")?;
                // un premier mot qui n'est pas un format fait partie du nom
                match args
                    .split_once(' ')
                    .and_then(|(fmt, stem)| Some((ExportFormat::from_name(fmt)?, stem.trim())))
                {
                    Some((format, stem)) if !stem.is_empty() => Self::Save {
                        format: Some(format),
                        stem: PathBuf::from(stem),
                    },
                    _ => Self::Save {
                        format: None,
                        stem: PathBuf::from(args),
                    },
                }
            }
            "info" => Self::Info,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => bail!("commande inconnue '{other}' (help pour la liste)"),
        };
        Ok(Some(cmd))
    }
}

/// Suite de la boucle après une commande.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    /// Lire la ligne suivante.
    Continue,
    /// Fin de session.
    Quit,
}

/// Affiche l'art : ANSI s'il est coloré, texte brut sinon.
///
/// # Errors
/// Returns any I/O error from `out`.
pub fn display<W: Write>(art: &RenderedArt, out: &mut W) -> std::io::Result<()> {
    if art.is_colored() {
        px_export::ansi::write_ansi(art, out)
    } else {
        writeln!(out, "{}", art.to_plain_string())?;
        out.flush()
    }
}

fn show_update<W: Write>(art: Option<&RenderedArt>, out: &mut W) -> Result<()> {
    match art {
        Some(art) => display(art, out)?,
        None => writeln!(out, "Réglage enregistré (aucune image chargée).")?,
    }
    Ok(())
}

/// Exécute une commande sur la session.
///
/// # Errors
/// Conversion, export, or I/O errors. The session is left as it was.
pub fn execute<W: Write>(session: &mut Session, cmd: Command, out: &mut W) -> Result<Flow> {
    match cmd {
        Command::Open(path) => {
            let art = session.open(&path)?;
            display(art, out)?;
        }
        Command::Width(n) => show_update(session.update(|p| p.width = n)?, out)?,
        Command::Zoom(z) => show_update(session.update(|p| p.zoom = z)?, out)?,
        Command::Charset(c) => show_update(session.update(|p| p.charset = c)?, out)?,
        Command::Custom(chars) => show_update(
            session.update(|p| {
                p.custom_chars = chars;
                p.charset = CharSet::Custom;
            })?,
            out,
        )?,
        Command::Effect(e) => show_update(session.update(|p| p.adjust.effect = e)?, out)?,
        Command::Palette(s) => show_update(session.update(|p| p.adjust.color_style = s)?, out)?,
        Command::Contrast(v) => show_update(session.update(|p| p.adjust.contrast = v)?, out)?,
        Command::Brightness(v) => show_update(session.update(|p| p.adjust.brightness = v)?, out)?,
        Command::Sharpness(v) => show_update(session.update(|p| p.adjust.sharpness = v)?, out)?,
        Command::Blur(v) => show_update(session.update(|p| p.adjust.blur_radius = v)?, out)?,
        Command::Edge(v) => show_update(session.update(|p| p.adjust.edge_intensity = v)?, out)?,
        Command::Refresh => {
            let art = session.refresh()?;
            display(art, out)?;
        }
        Command::Show => match session.art() {
            Some(art) => display(art, out)?,
            None => writeln!(out, "Aucun rendu. Utilisez 'open PATH'.")?,
        },
        Command::Undo => {
            if session.undo() {
                if let Some(art) = session.art() {
                    display(art, out)?;
                }
            } else {
                writeln!(out, "Rien à annuler.")?;
            }
        }
        Command::History => {
            let history = session.history();
            if history.is_empty() {
                writeln!(out, "Historique vide.")?;
            }
            for (i, entry) in history.iter().enumerate() {
                writeln!(
                    out,
                    "{:>2}. {}×{}  largeur {}  {}  {}",
                    i + 1,
                    entry.art.width(),
                    entry.art.height(),
                    entry.params.width,
                    entry.params.adjust.effect.name(),
                    entry.params.charset.name()
                )?;
            }
        }
        Command::Save { format, stem } => {
            let format = format.unwrap_or(session.export_settings().format);
            let path = session
                .save(format, &stem)
                .with_context(|| format!("export {}", format.extension()))?;
            writeln!(out, "Enregistré : {}", path.display())?;
        }
        Command::Info => writeln!(out, "{}", session.info())?,
        Command::Help => writeln!(out, "{HELP}")?,
        Command::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

/// Boucle de commandes : une ligne = une requête. Les erreurs sont affichées
/// et la boucle continue. EOF termine la session.
///
/// # Errors
/// Only I/O errors on `input`/`out` end the loop with an error.
pub fn run<R: BufRead, W: Write>(session: &mut Session, input: R, out: &mut W) -> Result<()> {
    writeln!(out, "pixscii — 'help' pour la liste des commandes.")?;
    let mut lines = input.lines();
    loop {
        write!(out, "pixscii> ")?;
        out.flush()?;
        let Some(line) = lines.next() else {
            writeln!(out)?;
            break;
        };
        let line = line.context("lecture de l'entrée")?;

        let flow = match Command::parse(&line) {
            Ok(None) => Flow::Continue,
            Ok(Some(cmd)) => execute(session, cmd, out).unwrap_or_else(|e| {
                log::warn!("Commande échouée : {e:#}");
                let _ = writeln!(out, "Erreur : {e:#}");
                Flow::Continue
            }),
            Err(e) => {
                writeln!(out, "Erreur : {e}")?;
                Flow::Continue
            }
        };
        if flow == Flow::Quit {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use px_core::config::Settings;
    use std::io::Cursor;

    fn session() -> Session {
        let mut settings = Settings::default();
        settings.width = 30;
        Session::new(&settings)
    }

    fn png(dir: &std::path::Path) -> PathBuf {
        let path = dir.join("in.png");
        RgbImage::from_fn(60, 30, |x, y| Rgb([(x * 4) as u8, (y * 8) as u8, 90]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn parses_commands_with_arguments() {
        assert_eq!(Command::parse("width 80").unwrap(), Some(Command::Width(80)));
        assert_eq!(
            Command::parse("effect Sepia").unwrap(),
            Some(Command::Effect(EffectMode::Sepia))
        );
        assert_eq!(
            Command::parse("save html out/art").unwrap(),
            Some(Command::Save {
                format: Some(ExportFormat::Html),
                stem: PathBuf::from("out/art"),
            })
        );
        assert_eq!(Command::parse("   ").unwrap(), None);
    }

    #[test]
    fn save_stem_may_contain_spaces() {
        assert_eq!(
            Command::parse("save my art").unwrap(),
            Some(Command::Save {
                format: None,
                stem: PathBuf::from("my art"),
            })
        );
        assert_eq!(
            Command::parse("save png my art").unwrap(),
            Some(Command::Save {
                format: Some(ExportFormat::Png),
                stem: PathBuf::from("my art"),
            })
        );
        assert_eq!(
            Command::parse("save json").unwrap(),
            Some(Command::Save {
                format: None,
                stem: PathBuf::from("json"),
            })
        );
    }

    #[test]
    fn custom_keeps_leading_space() {
        assert_eq!(
            Command::parse("custom  .oO\n").unwrap(),
            Some(Command::Custom(" .oO".to_string()))
        );
    }

    #[test]
    fn bad_input_is_reported() {
        assert!(Command::parse("width abc").is_err());
        assert!(Command::parse("effect sparkle").is_err());
        assert!(Command::parse("frobnicate").is_err());
        assert!(Command::parse("open").is_err());
    }

    #[test]
    fn session_survives_errors() {
        let dir = tempfile::tempdir().unwrap();
        let script = format!(
            "open {}\nopen /nope.png\nwidth 40\nundo\nundo\nhistory\nquit\nwidth 50\n",
            png(dir.path()).display()
        );
        let mut s = session();
        let mut out = Vec::new();
        run(&mut s, Cursor::new(script), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Erreur"));
        assert!(text.contains("Rien à annuler."));
        // undo returned to width 30; the command after quit never ran
        assert_eq!(s.params().width, 30);
    }

    #[test]
    fn save_uses_default_format() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session();
        let mut out = Vec::new();
        execute(&mut s, Command::Open(png(dir.path())), &mut out).unwrap();
        let stem = dir.path().join("art");
        execute(
            &mut s,
            Command::Save {
                format: None,
                stem: stem.clone(),
            },
            &mut out,
        )
        .unwrap();
        assert!(dir.path().join("art.txt").is_file());
    }

    #[test]
    fn quit_stops_the_loop() {
        let mut s = session();
        let mut out = Vec::new();
        assert_eq!(execute(&mut s, Command::Quit, &mut out).unwrap(), Flow::Quit);
    }
}
