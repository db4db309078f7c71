//! Wire format of the recognizer's JSON payloads.
//!
//! Vosk reports a running utterance as `{"partial": "..."}` and a closed
//! one as `{"text": "...", "result": [{"word", "start", "end", ...}]}`.
//! Parse failures are surfaced as errors so the worker can skip the frame.

use anyhow::{Context, Result};
use serde::Deserialize;

use super::{RecognitionOutcome, WordTiming};

#[derive(Debug, Deserialize)]
struct PartialPayload {
    #[serde(default)]
    partial: String,
}

#[derive(Debug, Deserialize)]
struct FinalPayload {
    #[serde(default)]
    text: String,
    #[serde(default)]
    result: Vec<WordEntry>,
}

#[derive(Debug, Deserialize)]
struct WordEntry {
    word: String,
    start: f32,
    end: f32,
}

pub fn parse_partial(json: &str) -> Result<RecognitionOutcome> {
    let payload: PartialPayload =
        serde_json::from_str(json).context("undecodable partial result")?;
    Ok(RecognitionOutcome::Partial {
        text: payload.partial,
    })
}

pub fn parse_final(json: &str) -> Result<RecognitionOutcome> {
    let payload: FinalPayload = serde_json::from_str(json).context("undecodable final result")?;
    let words = payload
        .result
        .into_iter()
        .map(|entry| WordTiming {
            text: entry.word,
            start: entry.start,
            end: entry.end,
        })
        .collect();
    Ok(RecognitionOutcome::Final {
        text: payload.text,
        words,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial() {
        let outcome = parse_partial(r#"{"partial": "open the"}"#).unwrap();
        assert_eq!(
            outcome,
            RecognitionOutcome::Partial {
                text: "open the".to_string()
            }
        );
    }

    #[test]
    fn test_parse_final_with_word_timings() {
        let json = r#"{
            "text": "open the door",
            "result": [
                {"word": "open", "start": 0.0, "end": 0.2, "conf": 0.98},
                {"word": "the", "start": 0.2, "end": 0.3, "conf": 0.99},
                {"word": "door", "start": 0.3, "end": 0.6, "conf": 0.97}
            ]
        }"#;

        match parse_final(json).unwrap() {
            RecognitionOutcome::Final { text, words } => {
                assert_eq!(text, "open the door");
                assert_eq!(words.len(), 3);
                assert_eq!(words[0].text, "open");
                assert_eq!(words[0].start, 0.0);
                assert_eq!(words[2].end, 0.6);
            }
            other => panic!("expected final outcome, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        assert_eq!(
            parse_partial("{}").unwrap(),
            RecognitionOutcome::Partial {
                text: String::new()
            }
        );
        assert_eq!(
            parse_final("{}").unwrap(),
            RecognitionOutcome::Final {
                text: String::new(),
                words: Vec::new()
            }
        );
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(parse_partial("not json").is_err());
        assert!(parse_final(r#"{"text": 42}"#).is_err());
    }
}
