//! Core of the simulated job interview system: configuration and domain
//! types, prompt construction, response parsing, the session state machine,
//! and the contracts required from the generation service, the persistence
//! store, and the voice input source.

pub mod generation;
pub mod model;
pub mod parser;
pub mod prompts;
pub mod session;
pub mod speech;
pub mod store;

pub use generation::{GenerationError, GenerationRequest, GptClient, TextGeneration};
pub use model::{
    ConfigValidationError, Difficulty, Evaluation, Language, QuestionAnswer, SessionConfig,
    SessionRecord,
};
pub use session::{InterviewSession, Phase, SessionError, SessionState, SessionView};
pub use speech::{apply_speech_event, CaptureGuard, SpeechError, SpeechEvent, SpeechInput};
pub use store::{InterviewStore, SqliteStore, StoreError};
