//! Speech sink trait and engine selection.

pub mod command;
#[cfg(test)]
pub mod mock;

use crate::error::Result;

pub use command::CommandSink;

/// A voice offered by a speech engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    /// Display name
    pub name: String,
    /// Identifier passed back to [`SpeechSink::set_voice`]
    pub id: String,
    /// Language codes the voice speaks
    pub languages: Vec<String>,
}

/// Something that turns text into speech.
///
/// Configure voice and rate before narration starts; a session does not
/// reconfigure the sink once it is reading.
pub trait SpeechSink {
    /// Speak `text`, blocking until it has been spoken.
    fn speak(&mut self, text: &str) -> Result<()>;

    /// Voices available to [`set_voice`](SpeechSink::set_voice).
    fn voices(&self) -> Result<Vec<Voice>>;

    /// Select a voice by id.
    fn set_voice(&mut self, id: &str) -> Result<()>;

    /// Set the speaking rate in words per minute.
    fn set_rate(&mut self, words_per_minute: u32) -> Result<()>;

    /// Engine name for display.
    fn name(&self) -> &str;
}

/// Create the speech sink for this machine.
pub fn create_sink() -> Result<Box<dyn SpeechSink>> {
    Ok(Box::new(CommandSink::detect()?))
}
