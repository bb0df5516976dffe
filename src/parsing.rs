//! Extraction of structured data from free-form model replies.
//!
//! Models wrap their answers in prose, markdown fences, or stray quotes, so
//! every parser here is best-effort. JSON payloads are located through a
//! [`SpanExtractor`]; the default [`GreedySpan`] matches from the first
//! opening bracket to the last closing one.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

static OBJECT_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{.*\}").unwrap());
static ARRAY_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\[.*\]").unwrap());
static SURROUNDING_QUOTES: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^["']|["']$"#).unwrap());
static LEADING_PUNCTUATION: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^[^\w\s"']+"#).unwrap());
static TRAILING_PUNCTUATION: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[^\w\s"']+$"#).unwrap());
static ENUMERATION_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(?:\d+\s*[.)]|[-*•])\s*").unwrap());

pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 10;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("No JSON object found in AI response")]
    NoJsonObject,
    #[error("Malformed JSON in AI response: {0}")]
    MalformedJson(#[from] serde_json::Error),
    #[error("AI response is missing a valid \"{0}\" field")]
    MissingField(&'static str),
    #[error("AI response was empty")]
    Empty,
}

/// Locates embedded JSON inside model text.
pub trait SpanExtractor {
    fn object_span<'a>(&self, text: &'a str) -> Option<&'a str>;
    fn array_span<'a>(&self, text: &'a str) -> Option<&'a str>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GreedySpan;

impl SpanExtractor for GreedySpan {
    fn object_span<'a>(&self, text: &'a str) -> Option<&'a str> {
        OBJECT_SPAN.find(text).map(|m| m.as_str())
    }

    fn array_span<'a>(&self, text: &'a str) -> Option<&'a str> {
        ARRAY_SPAN.find(text).map(|m| m.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub score: u8,
    pub feedback: String,
}

/// Trims and drops one leading and one trailing double quote.
pub fn parse_question(raw: &str) -> String {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('"').unwrap_or(trimmed);
    trimmed.strip_suffix('"').unwrap_or(trimmed).to_string()
}

pub fn parse_evaluation(raw: &str) -> Result<Evaluation, ParseError> {
    parse_evaluation_with(&GreedySpan, raw)
}

pub fn parse_evaluation_with<E: SpanExtractor>(extractor: &E, raw: &str) -> Result<Evaluation, ParseError> {
    let span = extractor.object_span(raw).ok_or(ParseError::NoJsonObject)?;
    let value: Value = serde_json::from_str(span)?;

    let score = value
        .get("score")
        .and_then(score_from_value)
        .ok_or(ParseError::MissingField("score"))?;

    let feedback = value
        .get("feedback")
        .and_then(Value::as_str)
        .map(|f| f.trim().to_string())
        .ok_or(ParseError::MissingField("feedback"))?;

    Ok(Evaluation { score, feedback })
}

/// Accepts integers, floats and numeric strings; clamps into 1..=10.
fn score_from_value(value: &Value) -> Option<u8> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !number.is_finite() {
        return None;
    }
    Some(number.round().clamp(MIN_SCORE as f64, MAX_SCORE as f64) as u8)
}

pub fn parse_follow_up(raw: &str) -> Result<String, ParseError> {
    let text = SURROUNDING_QUOTES.replace_all(raw.trim(), "");
    let text = text.trim();
    let text = LEADING_PUNCTUATION.replace(text, "");
    let (body, trailing) = match TRAILING_PUNCTUATION.find(&text) {
        Some(m) => (&text[..m.start()], m.as_str()),
        None => (&text[..], ""),
    };
    let mut question = body.trim().to_string();

    if question.is_empty() {
        return Err(ParseError::Empty);
    }

    // Any closing run collapses to one question mark, fullwidth if the model used one.
    question.push(if trailing.contains('？') { '？' } else { '?' });
    Ok(question)
}

/// Never fails: falls back to question-looking lines, possibly none.
pub fn parse_resume_questions(raw: &str) -> Vec<String> {
    parse_resume_questions_with(&GreedySpan, raw)
}

pub fn parse_resume_questions_with<E: SpanExtractor>(extractor: &E, raw: &str) -> Vec<String> {
    if let Some(questions) = json_string_array(raw.trim()) {
        return questions;
    }
    if let Some(questions) = extractor.array_span(raw).and_then(json_string_array) {
        return questions;
    }
    question_lines(raw)
}

fn json_string_array(text: &str) -> Option<Vec<String>> {
    let values: Vec<Value> = serde_json::from_str(text).ok()?;
    Some(
        values
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s.trim().to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect(),
    )
}

fn question_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(|line| {
            let line = ENUMERATION_PREFIX.replace(line, "");
            line.trim().trim_end_matches(',').trim_matches('"').trim().to_string()
        })
        .filter(|line| line.ends_with('?'))
        .collect()
}
