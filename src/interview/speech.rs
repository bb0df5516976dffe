//! Speech capture as an explicit `idle -> listening -> idle` state machine.
//!
//! The platform recognizer (the browser's continuous speech-recognition API
//! or any other engine) sits behind [`Recognizer`]. A fresh instance is built
//! for every start because restarting a stopped instance is unreliable. The
//! host forwards platform events through [`SpeechCapture::on_result`],
//! [`SpeechCapture::on_error`] and [`SpeechCapture::poll_watchdog`].

use std::fmt;
use std::time::{Duration, Instant};

use log::{info, warn, error};
use thiserror::Error;

pub const NO_SPEECH_TIMEOUT: Duration = Duration::from_secs(5);

pub const UNSUPPORTED_MESSAGE: &str = "Speech recognition is not supported in your browser.";
pub const START_FAILED_MESSAGE: &str = "Error starting speech recognition. Please try again.";
pub const NO_SPEECH_MESSAGE: &str = "No speech detected. Please speak clearly.";

/// Platform error code that the watchdog already covers.
const NO_SPEECH_CODE: &str = "no-speech";

#[derive(Error, Debug)]
pub enum SpeechError {
    #[error("Recognizer failed to start: {0}")]
    StartFailed(String),
}

pub trait Recognizer: Send {
    fn start(&mut self) -> Result<(), SpeechError>;
    fn stop(&mut self);
}

/// Builds a recognizer, or `None` when the platform has no speech API.
pub type RecognizerFactory = Box<dyn Fn() -> Option<Box<dyn Recognizer>> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionSegment {
    pub text: String,
    pub is_final: bool,
}

impl RecognitionSegment {
    pub fn interim(text: impl Into<String>) -> Self {
        Self { text: text.into(), is_final: false }
    }

    pub fn finalized(text: impl Into<String>) -> Self {
        Self { text: text.into(), is_final: true }
    }
}

enum CaptureState {
    Idle,
    Listening {
        recognizer: Box<dyn Recognizer>,
        watchdog_deadline: Option<Instant>,
    },
}

pub struct SpeechCapture {
    factory: RecognizerFactory,
    state: CaptureState,
    transcript: String,
    error: Option<String>,
    no_speech_timeout: Duration,
}

impl fmt::Debug for SpeechCapture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpeechCapture")
            .field("listening", &self.is_listening())
            .field("transcript", &self.transcript)
            .field("error", &self.error)
            .finish()
    }
}

impl SpeechCapture {
    pub fn new(factory: RecognizerFactory) -> Self {
        Self {
            factory,
            state: CaptureState::Idle,
            transcript: String::new(),
            error: None,
            no_speech_timeout: NO_SPEECH_TIMEOUT,
        }
    }

    pub fn with_no_speech_timeout(mut self, timeout: Duration) -> Self {
        self.no_speech_timeout = timeout;
        self
    }

    pub fn is_listening(&self) -> bool {
        matches!(self.state, CaptureState::Listening { .. })
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn start_listening(&mut self) -> bool {
        self.start_listening_at(Instant::now())
    }

    /// Returns `false` if already listening or if capture could not start.
    pub fn start_listening_at(&mut self, now: Instant) -> bool {
        if self.is_listening() {
            return false;
        }

        let Some(mut recognizer) = (self.factory)() else {
            self.error = Some(UNSUPPORTED_MESSAGE.to_string());
            return false;
        };

        self.error = None;
        self.transcript.clear();

        if let Err(e) = recognizer.start() {
            error!("Error starting speech recognition: {}", e);
            self.error = Some(START_FAILED_MESSAGE.to_string());
            return false;
        }

        info!("🎙️ Speech capture started");
        self.state = CaptureState::Listening {
            recognizer,
            watchdog_deadline: Some(now + self.no_speech_timeout),
        };
        true
    }

    /// Halts capture and leaves a paragraph break for the next segment.
    pub fn stop_listening(&mut self) {
        if let CaptureState::Listening { mut recognizer, .. } =
            std::mem::replace(&mut self.state, CaptureState::Idle)
        {
            recognizer.stop();
            self.transcript.push_str("\n\n");
            info!("Speech capture stopped");
        }
    }

    pub fn reset_transcript(&mut self) {
        self.transcript.clear();
        if self.is_listening() {
            self.stop_listening();
            self.start_listening();
        }
    }

    /// Appends finalized segments only; interim hypotheses are ignored.
    pub fn on_result(&mut self, segments: &[RecognitionSegment]) {
        let CaptureState::Listening { watchdog_deadline, .. } = &mut self.state else {
            return;
        };
        *watchdog_deadline = None;

        let finalized: String = segments
            .iter()
            .filter(|s| s.is_final)
            .map(|s| s.text.as_str())
            .collect();

        // Each finalized result is followed by exactly one space.
        let finalized = finalized.trim();
        if !finalized.is_empty() {
            self.transcript.push_str(finalized);
            self.transcript.push(' ');
        }
    }

    pub fn on_error(&mut self, code: &str) {
        if let CaptureState::Listening { mut recognizer, .. } =
            std::mem::replace(&mut self.state, CaptureState::Idle)
        {
            recognizer.stop();
        }

        if code == NO_SPEECH_CODE {
            warn!("Speech recognition reported no speech");
        } else {
            error!("Speech recognition error: {}", code);
            self.error = Some(format!("Speech recognition error: {}", code));
        }
    }

    /// Stops listening if nothing was heard within the no-speech window.
    pub fn poll_watchdog(&mut self, now: Instant) {
        let expired = match &self.state {
            CaptureState::Listening { watchdog_deadline: Some(deadline), .. } => now >= *deadline,
            _ => false,
        };
        if !expired {
            return;
        }

        if let CaptureState::Listening { watchdog_deadline, .. } = &mut self.state {
            *watchdog_deadline = None;
        }

        if self.transcript.is_empty() {
            warn!("No speech detected within {:?}", self.no_speech_timeout);
            self.error = Some(NO_SPEECH_MESSAGE.to_string());
            self.stop_listening();
        }
    }
}

impl Drop for SpeechCapture {
    fn drop(&mut self) {
        if let CaptureState::Listening { recognizer, .. } = &mut self.state {
            recognizer.stop();
        }
    }
}
