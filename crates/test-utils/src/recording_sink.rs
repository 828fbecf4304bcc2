use std::sync::Mutex;

use retrig::engine::ProgressSink;

/// A progress sink that records every message for later assertions.
#[derive(Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    /// Number of recorded messages containing `needle`.
    pub fn count_containing(&self, needle: &str) -> usize {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.contains(needle))
            .count()
    }
}

impl ProgressSink for RecordingSink {
    fn write(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}
