/// Presentation shell for pixscii.
///
/// Conversion pipeline entry point, session state with bounded history,
/// cooperative GIF playback, the line-oriented command loop and the CLI
/// definition used by the `pixscii` binary.
pub mod animation;
pub mod cli;
pub mod history;
pub mod pipeline;
pub mod repl;
pub mod session;

pub use pipeline::{Pipeline, convert};
pub use session::Session;
