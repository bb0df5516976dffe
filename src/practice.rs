//! View logic for the practice screens.
//!
//! Each view is a plain state object: the host renders from the accessors
//! and forwards user actions to the operations. Network calls go through
//! [`CoachApi`]; the timer and speech capture are owned by the view and torn
//! down with it.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone};
use log::{info, warn, error};

use crate::client::CoachApi;
use crate::database::InterviewSession;
use crate::interview::{CountdownHandle, RecognizerFactory, SpeechCapture};
use crate::parsing::Evaluation;
use crate::resume::PDF_MIME;

pub const DURATION_CHOICES_MINUTES: [u32; 4] = [1, 2, 3, 5];
pub const DEFAULT_DURATION_MINUTES: u32 = 2;

/// The countdown is highlighted below this many seconds.
const LOW_TIME_SECONDS: u32 = 16;

pub const TOPIC_REQUIRED_MESSAGE: &str = "Please enter a topic";
pub const QUESTION_FAILED_MESSAGE: &str = "Failed to generate question. Please try again.";
pub const EVALUATION_FAILED_MESSAGE: &str = "Failed to evaluate answer. Please try again.";
pub const FOLLOW_UP_FAILED_MESSAGE: &str = "Failed to generate follow-up question. Please try again.";
pub const INVALID_FILE_MESSAGE: &str = "Please upload a valid PDF file";
pub const NO_FILE_MESSAGE: &str = "Please select a PDF file first";
pub const RESUME_FAILED_MESSAGE: &str = "Failed to process resume. Please try again.";
pub const HISTORY_FAILED_MESSAGE: &str = "Failed to load session history. Please try again later.";

/// Topic form, recording controls and evaluation display.
pub struct PracticeView {
    api: Arc<dyn CoachApi>,
    topic: String,
    question: Option<String>,
    duration_minutes: u32,
    timer: CountdownHandle,
    speech: SpeechCapture,
    evaluation: Option<Evaluation>,
    error: Option<String>,
    evaluation_error: Option<String>,
}

impl PracticeView {
    pub fn new(api: Arc<dyn CoachApi>, recognizers: RecognizerFactory) -> Self {
        Self {
            api,
            topic: String::new(),
            question: None,
            duration_minutes: DEFAULT_DURATION_MINUTES,
            timer: CountdownHandle::new(DEFAULT_DURATION_MINUTES * 60),
            speech: SpeechCapture::new(recognizers),
            evaluation: None,
            error: None,
            evaluation_error: None,
        }
    }

    pub fn set_topic(&mut self, topic: impl Into<String>) {
        self.topic = topic.into();
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn question(&self) -> Option<&str> {
        self.question.as_deref()
    }

    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    fn duration_secs(&self) -> u32 {
        self.duration_minutes * 60
    }

    pub fn timer(&self) -> &CountdownHandle {
        &self.timer
    }

    pub fn speech(&self) -> &SpeechCapture {
        &self.speech
    }

    /// Event sink for the platform recognizer.
    pub fn speech_mut(&mut self) -> &mut SpeechCapture {
        &mut self.speech
    }

    pub fn transcript(&self) -> &str {
        self.speech.transcript()
    }

    pub fn evaluation(&self) -> Option<&Evaluation> {
        self.evaluation.as_ref()
    }

    /// Banner text; view errors take precedence over speech errors.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref().or_else(|| self.speech.error())
    }

    pub fn evaluation_error(&self) -> Option<&str> {
        self.evaluation_error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
        self.evaluation_error = None;
        self.speech.clear_error();
    }

    pub fn time_is_low(&self) -> bool {
        self.timer.remaining() < LOW_TIME_SECONDS
    }

    /// Recording is disabled once the countdown has run out.
    pub fn can_record(&self) -> bool {
        self.speech.is_listening() || self.timer.remaining() > 0
    }

    /// Starts practice on a question picked elsewhere, e.g. from a resume.
    pub fn load_question(&mut self, question: impl Into<String>) {
        self.speech.stop_listening();
        self.speech.reset_transcript();
        self.evaluation = None;
        self.question = Some(question.into());
        self.timer.reset(self.duration_secs());
    }

    pub async fn generate_question(&mut self) {
        let topic = self.topic.trim().to_string();
        if topic.is_empty() {
            self.error = Some(TOPIC_REQUIRED_MESSAGE.to_string());
            return;
        }

        self.error = None;

        match self.api.generate_question(&topic).await {
            Ok(question) => {
                info!("🎯 New question for topic {}", topic);
                self.question = Some(question);
                self.timer.reset(self.duration_secs());
                self.timer.start();
            }
            Err(e) => {
                error!("Error generating question: {}", e);
                let message = e.server_message().unwrap_or(QUESTION_FAILED_MESSAGE);
                self.error = Some(message.to_string());
            }
        }
    }

    /// Returns `false` when the change is ignored.
    pub fn set_duration(&mut self, minutes: u32) -> bool {
        if self.timer.is_active() || self.speech.is_listening() {
            return false;
        }
        if !DURATION_CHOICES_MINUTES.contains(&minutes) {
            warn!("Unsupported answer duration: {} minutes", minutes);
            return false;
        }

        self.duration_minutes = minutes;
        self.timer.reset(self.duration_secs());
        true
    }

    pub fn toggle_recording(&mut self) {
        if self.speech.is_listening() {
            self.speech.stop_listening();
            self.timer.stop();
            return;
        }
        if !self.can_record() {
            return;
        }

        self.speech.reset_transcript();
        self.error = None;

        if self.speech.start_listening() {
            self.timer.reset(self.duration_secs());
            self.timer.start();
        }
    }

    /// Clears the recorded answer.
    pub fn clear_transcript(&mut self) {
        self.speech.reset_transcript();
    }

    pub async fn evaluate(&mut self) {
        let answer = self.speech.transcript().trim().to_string();
        if answer.is_empty() {
            return;
        }

        self.evaluation_error = None;
        let question = self.question.clone().unwrap_or_default();

        match self.api.evaluate_answer(&question, &answer).await {
            Ok(evaluation) => {
                info!("📊 Answer scored {}/10", evaluation.score);
                self.evaluation = Some(evaluation);
                if self.speech.is_listening() {
                    self.speech.stop_listening();
                }
                self.timer.stop();
            }
            Err(e) => {
                error!("Error evaluating answer: {}", e);
                self.evaluation_error = Some(EVALUATION_FAILED_MESSAGE.to_string());
            }
        }
    }

    pub async fn follow_up(&mut self) {
        let answer = self.speech.transcript().trim().to_string();
        if answer.is_empty() {
            return;
        }

        let question = self.question.clone().unwrap_or_default();

        match self.api.generate_follow_up(&question, &answer).await {
            Ok(next) => {
                self.question = Some(next);
                self.speech.reset_transcript();
                self.evaluation = None;
                self.timer.reset(self.duration_secs());
                self.timer.start();
            }
            Err(e) => {
                error!("Error generating follow-up question: {}", e);
                self.error = Some(FOLLOW_UP_FAILED_MESSAGE.to_string());
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    /// e.g. `resume.pdf (0.25 MB)`
    pub fn label(&self) -> String {
        format!("{} ({:.2} MB)", self.name, self.bytes.len() as f64 / 1024.0 / 1024.0)
    }
}

pub struct ResumeUploaderView {
    api: Arc<dyn CoachApi>,
    file: Option<SelectedFile>,
    questions: Vec<String>,
    error: Option<String>,
}

impl ResumeUploaderView {
    pub fn new(api: Arc<dyn CoachApi>) -> Self {
        Self {
            api,
            file: None,
            questions: Vec::new(),
            error: None,
        }
    }

    pub fn selected(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn can_upload(&self) -> bool {
        self.file.is_some()
    }

    /// Only PDFs are accepted; anything else clears the selection.
    pub fn select_file(&mut self, name: impl Into<String>, mime: &str, bytes: Vec<u8>) -> bool {
        if mime != PDF_MIME {
            self.error = Some(INVALID_FILE_MESSAGE.to_string());
            self.file = None;
            return false;
        }

        self.error = None;
        self.file = Some(SelectedFile { name: name.into(), bytes });
        true
    }

    pub async fn upload(&mut self) {
        let Some(file) = self.file.clone() else {
            self.error = Some(NO_FILE_MESSAGE.to_string());
            return;
        };

        self.error = None;

        match self.api.generate_from_resume(&file.name, file.bytes).await {
            Ok(questions) => {
                info!("📄 Received {} questions from resume", questions.len());
                self.questions = questions;
            }
            Err(e) => {
                error!("Error uploading resume: {}", e);
                let message = e.server_message().unwrap_or(RESUME_FAILED_MESSAGE);
                self.error = Some(message.to_string());
            }
        }
    }

    /// The question to hand to [`PracticeView::load_question`].
    pub fn choose(&self, index: usize) -> Option<&str> {
        self.questions.get(index).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    pub question: String,
    pub answer: String,
    pub feedback: String,
    pub score: String,
    pub date: String,
}

impl HistoryRow {
    pub fn from_session<Tz: TimeZone>(session: &InterviewSession, tz: &Tz) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        Self {
            question: session.question.clone(),
            answer: session.answer.clone(),
            feedback: session.feedback.clone(),
            score: format_score(session.score),
            date: format_date(&session.created_at.with_timezone(tz)),
        }
    }
}

pub fn format_score(score: i32) -> String {
    format!("{}/10", score)
}

/// e.g. `March 5, 2024, 02:07 PM`
pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format("%B %-d, %Y, %I:%M %p").to_string()
}

pub struct HistoryView {
    api: Arc<dyn CoachApi>,
    sessions: Vec<InterviewSession>,
    loading: bool,
    error: Option<String>,
}

impl HistoryView {
    pub fn new(api: Arc<dyn CoachApi>) -> Self {
        Self {
            api,
            sessions: Vec::new(),
            loading: true,
            error: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn sessions(&self) -> &[InterviewSession] {
        &self.sessions
    }

    pub async fn load(&mut self) {
        self.loading = true;

        match self.api.list_sessions().await {
            Ok(sessions) => {
                self.sessions = sessions;
                self.error = None;
            }
            Err(e) => {
                error!("Error fetching sessions: {}", e);
                self.error = Some(HISTORY_FAILED_MESSAGE.to_string());
            }
        }

        self.loading = false;
    }

    /// Rows rendered in the local time zone, newest first.
    pub fn rows(&self) -> Vec<HistoryRow> {
        self.sessions
            .iter()
            .map(|s| HistoryRow::from_session(s, &Local))
            .collect()
    }
}
