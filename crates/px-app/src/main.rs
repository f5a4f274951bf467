use std::io::Write;
use std::sync::atomic::Ordering;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};
use px_app::{animation, cli, repl, session};
use px_core::config::{load_settings_or_default, save_settings};

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    // 3. Valider les options
    cli.validate()?;

    // 4. Charger les réglages, puis appliquer les overrides CLI
    let mut settings = load_settings_or_default(&cli.settings);
    let mut session = session::Session::new(&settings);
    let mut params = session.params().clone();
    cli.apply(&mut params);
    session.set_params(params);

    // 5. Source initiale
    if let Some(ref path) = cli.image {
        session
            .open(path)
            .with_context(|| format!("Conversion de {}", path.display()))?;
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    // 6. Animation GIF (boucle coopérative, Ctrl-C pour arrêter)
    if cli.animate {
        play_animation(&session, cli.loops, &mut out)?;
    }

    // 7. Export
    if let Some(ref stem) = cli.output {
        let format = cli
            .format
            .map_or(session.export_settings().format, Into::into);
        let path = session.save(format, stem)?;
        log::info!("Export terminé : {}", path.display());
        writeln!(out, "Enregistré : {}", path.display())?;
    }

    // 8. Session interactive ou affichage direct
    if cli.interactive {
        if let Some(art) = session.art() {
            repl::display(art, &mut out)?;
        }
        let stdin = std::io::stdin();
        repl::run(&mut session, stdin.lock(), &mut out)?;
    } else if !cli.animate
        && cli.output.is_none()
        && let Some(art) = session.art()
    {
        repl::display(art, &mut out)?;
    }

    // 9. Persister les réglages
    if !cli.no_save {
        settings.remember(session.params());
        if let Err(e) = save_settings(&cli.settings, &settings) {
            log::warn!("Réglages non enregistrés : {e:#}");
        }
    }

    Ok(())
}

/// Joue le GIF chargé dans le terminal, ou affiche l'image fixe.
fn play_animation<W: Write>(
    session: &session::Session,
    loops: Option<u32>,
    out: &mut W,
) -> Result<()> {
    let Some(gif) = session.source().and_then(|s| s.animation.as_ref()) else {
        log::warn!("--animate : la source n'est pas un GIF animé");
        if let Some(art) = session.art() {
            repl::display(art, out)?;
        }
        return Ok(());
    };

    let stop = animation::install_stop_flag()?;
    let mut io_error = None;
    animation::play(gif, session.params(), &stop, loops, |_, art| {
        let res = queue!(out, MoveTo(0, 0), Clear(ClearType::All))
            .and_then(|()| repl::display(art, out));
        if let Err(e) = res {
            io_error = Some(e);
            stop.store(true, Ordering::SeqCst);
        }
    })?;

    if let Some(e) = io_error {
        return Err(e).context("Affichage de l'animation");
    }
    Ok(())
}
