//! The interview session state machine.
//!
//! All session mutation happens through `&mut InterviewSession`, which gives
//! every operation exclusive access: navigation, generation completion, and
//! evaluation completion can never interleave within one session. Collaborators
//! are passed per call, so the machine holds no client or store of its own and
//! tests drive it with mocks.
//!
//! Dropping an in-flight `start`/`advance` future abandons the generation call
//! without touching session state; the driver then discards the session.

use crate::generation::{GenerationError, GenerationRequest, TextGeneration};
use crate::model::{Evaluation, QuestionAnswer, SessionConfig};
use crate::parser;
use crate::prompts;
use crate::store::{InterviewStore, StoreError};
use tokio::sync::watch;

const QUESTION_MAX_TOKENS: u32 = 1500;
const QUESTION_TEMPERATURE: f32 = 0.7;
const EVALUATION_MAX_TOKENS: u32 = 2000;
// Lower temperature for more consistent evaluation.
const EVALUATION_TEMPERATURE: f32 = 0.3;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    AwaitingConfig,
    GeneratingQuestions,
    InProgress {
        questions: Vec<String>,
        answers: Vec<String>,
        current: usize,
    },
    Evaluating {
        transcript: Vec<QuestionAnswer>,
    },
    Completed {
        evaluation: Evaluation,
        record_id: i64,
    },
    Failed {
        reason: String,
    },
}

/// Coarse phase of the session, used in views and error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    AwaitingConfig,
    GeneratingQuestions,
    InProgress,
    Evaluating,
    Completed,
    Failed,
}

/// Snapshot of the session published to observers after every mutation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionView {
    pub phase: Phase,
    pub current_question: Option<String>,
    pub current_index: usize,
    pub total_questions: usize,
    pub current_answer: String,
    pub failure: Option<String>,
    pub evaluation: Option<Evaluation>,
    pub record_id: Option<i64>,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("{op} is not allowed while the session is {phase:?}")]
    InvalidState { op: &'static str, phase: Phase },
    #[error("question {0} has not been answered yet")]
    MissingAnswer(usize),
    #[error("already at the first question")]
    AtFirstQuestion,
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Persistence(#[from] StoreError),
}

pub struct InterviewSession {
    config: Option<SessionConfig>,
    state: SessionState,
    view_tx: watch::Sender<SessionView>,
}

impl Default for InterviewSession {
    fn default() -> Self {
        Self::new()
    }
}

impl InterviewSession {
    pub fn new() -> Self {
        let (view_tx, _) = watch::channel(SessionView::default());
        Self {
            config: None,
            state: SessionState::AwaitingConfig,
            view_tx,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Observers receive a fresh [`SessionView`] after every mutation.
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.view_tx.subscribe()
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            SessionState::AwaitingConfig => Phase::AwaitingConfig,
            SessionState::GeneratingQuestions => Phase::GeneratingQuestions,
            SessionState::InProgress { .. } => Phase::InProgress,
            SessionState::Evaluating { .. } => Phase::Evaluating,
            SessionState::Completed { .. } => Phase::Completed,
            SessionState::Failed { .. } => Phase::Failed,
        }
    }

    pub fn view(&self) -> SessionView {
        let mut view = SessionView {
            phase: self.phase(),
            ..SessionView::default()
        };
        match &self.state {
            SessionState::InProgress {
                questions,
                answers,
                current,
            } => {
                view.current_question = Some(questions[*current].clone());
                view.current_index = *current;
                view.total_questions = questions.len();
                view.current_answer = answers[*current].clone();
            }
            SessionState::Evaluating { transcript } => {
                view.total_questions = transcript.len();
            }
            SessionState::Completed {
                evaluation,
                record_id,
            } => {
                view.evaluation = Some(evaluation.clone());
                view.record_id = Some(*record_id);
            }
            SessionState::Failed { reason } => {
                view.failure = Some(reason.clone());
            }
            SessionState::AwaitingConfig | SessionState::GeneratingQuestions => {}
        }
        view
    }

    fn publish(&self) {
        self.view_tx.send_replace(self.view());
    }

    fn fail(&mut self, reason: String) {
        tracing::error!(%reason, "interview session failed");
        self.state = SessionState::Failed { reason };
        self.publish();
    }

    /// Begins a session: generates questions and enters the Q&A loop.
    ///
    /// Valid only before any questions were requested.
    pub async fn start<G>(&mut self, generator: &G, config: SessionConfig) -> Result<(), SessionError>
    where
        G: TextGeneration + Sync,
    {
        if !matches!(self.state, SessionState::AwaitingConfig) {
            return Err(SessionError::InvalidState {
                op: "start",
                phase: self.phase(),
            });
        }
        self.generate_questions(generator, config).await
    }

    /// Re-attempts question generation after a failure.
    pub async fn retry<G>(&mut self, generator: &G, config: SessionConfig) -> Result<(), SessionError>
    where
        G: TextGeneration + Sync,
    {
        if !matches!(self.state, SessionState::Failed { .. }) {
            return Err(SessionError::InvalidState {
                op: "retry",
                phase: self.phase(),
            });
        }
        self.generate_questions(generator, config).await
    }

    async fn generate_questions<G>(
        &mut self,
        generator: &G,
        config: SessionConfig,
    ) -> Result<(), SessionError>
    where
        G: TextGeneration + Sync,
    {
        self.state = SessionState::GeneratingQuestions;
        self.publish();

        let request = GenerationRequest {
            prompt: prompts::question_prompt(&config),
            max_tokens: QUESTION_MAX_TOKENS,
            temperature: QUESTION_TEMPERATURE,
        };
        let raw = match generator.complete(&request).await {
            Ok(raw) => raw,
            Err(e) => {
                self.fail(e.to_string());
                return Err(e.into());
            }
        };

        let questions = parser::parse_questions(&raw);
        if questions.is_empty() {
            let e = GenerationError::EmptyResponse;
            self.fail(e.to_string());
            return Err(e.into());
        }
        if questions.len() != config.question_count {
            // Valid per the parser contract; worth a trace for diagnosis.
            tracing::debug!(
                requested = config.question_count,
                received = questions.len(),
                "generation returned a different question count"
            );
        }

        let count = questions.len();
        self.config = Some(config);
        self.state = SessionState::InProgress {
            questions,
            answers: vec![String::new(); count],
            current: 0,
        };
        self.publish();
        Ok(())
    }

    /// Overwrites the answer buffer for the current question. Last write wins,
    /// whether it comes from manual edits or transcription events.
    pub fn set_current_answer(&mut self, text: impl Into<String>) -> Result<(), SessionError> {
        let phase = self.phase();
        match &mut self.state {
            SessionState::InProgress {
                answers, current, ..
            } => {
                answers[*current] = text.into();
            }
            _ => {
                return Err(SessionError::InvalidState {
                    op: "set_current_answer",
                    phase,
                })
            }
        }
        self.publish();
        Ok(())
    }

    /// Moves back one question. The earlier slot's buffered answer becomes the
    /// active text again.
    pub fn retreat(&mut self) -> Result<(), SessionError> {
        let phase = self.phase();
        match &mut self.state {
            SessionState::InProgress { current, .. } => {
                if *current == 0 {
                    return Err(SessionError::AtFirstQuestion);
                }
                *current -= 1;
            }
            _ => return Err(SessionError::InvalidState { op: "retreat", phase }),
        }
        self.publish();
        Ok(())
    }

    /// Moves forward one question, or completes the interview from the last
    /// one: every answer must be non-blank, then the transcript is evaluated
    /// and the finished session saved.
    pub async fn advance<G, S>(&mut self, generator: &G, store: &S) -> Result<(), SessionError>
    where
        G: TextGeneration + Sync,
        S: InterviewStore + Sync,
    {
        let phase = self.phase();
        let SessionState::InProgress {
            questions,
            answers,
            current,
        } = &mut self.state
        else {
            return Err(SessionError::InvalidState { op: "advance", phase });
        };

        if *current + 1 < questions.len() {
            *current += 1;
            self.publish();
            return Ok(());
        }

        // Completion precondition: reported without any state change.
        if let Some(blank) = answers.iter().position(|a| a.trim().is_empty()) {
            return Err(SessionError::MissingAnswer(blank + 1));
        }

        let questions = std::mem::take(questions);
        let answers = std::mem::take(answers);
        let transcript: Vec<QuestionAnswer> = questions
            .into_iter()
            .zip(answers)
            .map(|(question, answer)| QuestionAnswer { question, answer })
            .collect();
        self.evaluate(generator, store, transcript).await
    }

    async fn evaluate<G, S>(
        &mut self,
        generator: &G,
        store: &S,
        transcript: Vec<QuestionAnswer>,
    ) -> Result<(), SessionError>
    where
        G: TextGeneration + Sync,
        S: InterviewStore + Sync,
    {
        let Some(config) = self.config.clone() else {
            return Err(SessionError::InvalidState {
                op: "advance",
                phase: self.phase(),
            });
        };

        self.state = SessionState::Evaluating {
            transcript: transcript.clone(),
        };
        self.publish();

        let request = GenerationRequest {
            prompt: prompts::evaluation_prompt(&config, &transcript),
            max_tokens: EVALUATION_MAX_TOKENS,
            temperature: EVALUATION_TEMPERATURE,
        };
        let raw = match generator.complete(&request).await {
            Ok(raw) => raw,
            Err(e) => {
                self.fail(e.to_string());
                return Err(e.into());
            }
        };

        // Parsing never fails: malformed text degrades to a default evaluation.
        let evaluation = parser::parse_evaluation(&raw);

        let record_id = match store.save(&config, &transcript, &evaluation) {
            Ok(id) => id,
            Err(e) => {
                self.fail(e.to_string());
                return Err(e.into());
            }
        };

        tracing::info!(
            record_id,
            score = evaluation.overall_score,
            "interview session completed"
        );
        self.state = SessionState::Completed {
            evaluation,
            record_id,
        };
        self.publish();
        Ok(())
    }
}
