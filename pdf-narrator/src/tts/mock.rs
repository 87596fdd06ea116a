//! Recording speech sink for tests.

use super::{SpeechSink, Voice};
use crate::error::{NarratorError, Result};

/// Records everything it is asked to speak.
#[derive(Debug, Default)]
pub struct RecordingSink {
    /// Utterances in the order they were spoken
    pub spoken: Vec<String>,
    pub voice: Option<String>,
    pub rate: Option<u32>,
    /// Make every `speak` call fail
    pub fail_speech: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_speech: true,
            ..Self::default()
        }
    }
}

impl SpeechSink for RecordingSink {
    fn speak(&mut self, text: &str) -> Result<()> {
        if self.fail_speech {
            return Err(NarratorError::SpeechEngine("mock failure".to_string()));
        }
        self.spoken.push(text.to_string());
        Ok(())
    }

    fn voices(&self) -> Result<Vec<Voice>> {
        Ok(vec![Voice {
            name: "Mock".to_string(),
            id: "mock".to_string(),
            languages: vec!["en".to_string()],
        }])
    }

    fn set_voice(&mut self, id: &str) -> Result<()> {
        self.voice = Some(id.to_string());
        Ok(())
    }

    fn set_rate(&mut self, words_per_minute: u32) -> Result<()> {
        self.rate = Some(words_per_minute);
        Ok(())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
