//! Event types for soundstage

/// Engine lifecycle notifications, delivered over a crossbeam channel.
///
/// Emitted from the control side and the stream error callback only, never
/// from the render hot path.
#[derive(Debug, Clone, PartialEq)]
pub enum SoundstageEvent {
    EngineStarted,
    EngineStopped,
    /// The output device/driver reported a stream failure. The engine does
    /// not retry; policy belongs to the caller.
    StreamError { error: String },
}

impl SoundstageEvent {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::StreamError { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(!SoundstageEvent::EngineStarted.is_error());
        assert!(!SoundstageEvent::EngineStopped.is_error());
        let err = SoundstageEvent::StreamError {
            error: "device lost".into(),
        };
        assert!(err.is_error());
    }
}
