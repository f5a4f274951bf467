use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use px_core::config::ConversionParams;
use px_core::error::CoreError;
use px_core::frame::RenderedArt;
use px_source::image::GifSource;

use crate::pipeline::Pipeline;

/// Granularité du sommeil entre deux frames : le drapeau d'arrêt est relu à ce rythme.
const STOP_POLL: Duration = Duration::from_millis(20);

/// Installe un handler Ctrl-C qui lève le drapeau retourné.
///
/// # Errors
/// Returns an error if a handler is already installed.
pub fn install_stop_flag() -> anyhow::Result<Arc<AtomicBool>> {
    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    })?;
    Ok(stop)
}

fn sleep_unless_stopped(delay: Duration, stop: &AtomicBool) {
    let mut left = delay;
    while !left.is_zero() && !stop.load(Ordering::SeqCst) {
        let step = left.min(STOP_POLL);
        std::thread::sleep(step);
        left = left.saturating_sub(step);
    }
}

/// Lecture coopérative d'un GIF : convertit, affiche, attend, recommence.
///
/// Frames are converted once, on first display, and reused on later loops.
/// `loops = None` plays until `stop` is raised. Returns the number of frames
/// handed to `sink`.
///
/// # Errors
/// The first conversion error aborts playback.
pub fn play<F>(
    gif: &GifSource,
    params: &ConversionParams,
    stop: &AtomicBool,
    loops: Option<u32>,
    mut sink: F,
) -> Result<usize, CoreError>
where
    F: FnMut(usize, &RenderedArt),
{
    let mut pipeline = Pipeline::new();
    let mut rendered: Vec<Option<RenderedArt>> = vec![None; gif.frame_count()];
    let mut shown = 0usize;
    let mut loop_idx = 0u32;

    log::info!(
        "Lecture GIF : {} frames, boucles {}",
        gif.frame_count(),
        loops.map_or_else(|| "∞".to_string(), |n| n.to_string())
    );

    while loops.is_none_or(|n| loop_idx < n) {
        for (i, slot) in rendered.iter_mut().enumerate() {
            if stop.load(Ordering::SeqCst) {
                log::debug!("Lecture interrompue après {shown} frames");
                return Ok(shown);
            }
            if slot.is_none()
                && let Some(frame) = gif.frame(i)
            {
                *slot = Some(pipeline.convert(frame, params)?);
            }
            let Some(art) = slot.as_ref() else { continue };
            sink(i, art);
            shown += 1;
            sleep_unless_stopped(gif.delay(i), stop);
        }
        loop_idx = loop_idx.saturating_add(1);
    }
    Ok(shown)
}
