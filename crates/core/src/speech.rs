//! Voice input adapter contract.
//!
//! Transcription engines live outside this crate; the orchestrator only sees
//! the event stream defined here. Events are delivered over an mpsc channel
//! so the driver can funnel them through the same serialized loop that
//! handles manual edits and navigation — a final transcription can never race
//! a page turn.

use crate::session::{InterviewSession, SessionError};
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SpeechError {
    #[error("No sound detected. Please try again.")]
    NoMatch,
    #[error("No sound detected. Time expired.")]
    Timeout,
    #[error("Error occurred while recording sound.")]
    AudioError,
    #[error("Microphone permission is required.")]
    PermissionDenied,
    #[error("An error occurred. Please try again.")]
    Other,
}

/// One activation delivers zero or more `Partial` events, then at most one
/// `Final`, then `End`. `Error` terminates the activation early.
#[derive(Debug, Clone, PartialEq)]
pub enum SpeechEvent {
    Ready,
    Partial(String),
    Final(String),
    End,
    Error(SpeechError),
}

pub trait SpeechInput {
    /// Begins listening; events flow into `events` until `stop` or `End`.
    fn start(&mut self, events: mpsc::Sender<SpeechEvent>) -> Result<(), SpeechError>;

    /// Stops listening. Idempotent.
    fn stop(&mut self);
}

/// Scoped activation of a [`SpeechInput`]: stops the engine when dropped, so
/// teardown happens on every exit path, including cancellation.
pub struct CaptureGuard<'a, S: SpeechInput + ?Sized> {
    input: &'a mut S,
}

impl<'a, S: SpeechInput + ?Sized> CaptureGuard<'a, S> {
    pub fn begin(
        input: &'a mut S,
        events: mpsc::Sender<SpeechEvent>,
    ) -> Result<Self, SpeechError> {
        input.start(events)?;
        Ok(Self { input })
    }
}

impl<S: SpeechInput + ?Sized> std::fmt::Debug for CaptureGuard<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureGuard").finish_non_exhaustive()
    }
}

impl<S: SpeechInput + ?Sized> Drop for CaptureGuard<'_, S> {
    fn drop(&mut self) {
        self.input.stop();
    }
}

/// Routes one transcription event into the session's current answer slot.
///
/// Partial and final transcriptions overwrite the buffer just like manual
/// edits; whichever write arrives last wins. Returns `true` when the
/// activation is over (`Final`, `End`, or `Error`).
pub fn apply_speech_event(
    session: &mut InterviewSession,
    event: SpeechEvent,
) -> Result<bool, SessionError> {
    match event {
        SpeechEvent::Ready => Ok(false),
        SpeechEvent::Partial(text) => {
            session.set_current_answer(text)?;
            Ok(false)
        }
        SpeechEvent::Final(text) => {
            session.set_current_answer(text)?;
            Ok(true)
        }
        SpeechEvent::End => Ok(true),
        SpeechEvent::Error(e) => {
            tracing::warn!(error = %e, "voice input failed");
            Ok(true)
        }
    }
}
