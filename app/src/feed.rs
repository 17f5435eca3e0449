// In app/src/feed.rs

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Duration, Utc};
use core_types::OscillatorReading;
use serde::Deserialize;

/// One parsed line of a JSON-lines indicator feed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedLine {
    /// When the update happened. Lines without a time are spaced by the replay step.
    pub at: Option<DateTime<Utc>>,
    /// `None` while the indicator is still warming up.
    pub reading: Option<OscillatorReading>,
}

#[derive(Debug, Deserialize)]
struct RawLine {
    at: Option<DateTime<Utc>>,
    oscillator: Option<f64>,
    signal: Option<f64>,
}

/// Parses one line of the feed.
///
/// A line is `null`, or an object with an optional RFC 3339 `at` and either both of
/// `oscillator` and `signal` or neither (a warm-up update). Blank lines yield `Ok(None)`
/// so callers can skip them.
pub fn parse_line(line: &str) -> Result<Option<FeedLine>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let raw: Option<RawLine> =
        serde_json::from_str(line).with_context(|| format!("Malformed feed line: {line}"))?;
    let Some(raw) = raw else {
        return Ok(Some(FeedLine { at: None, reading: None }));
    };

    let reading = match (raw.oscillator, raw.signal) {
        (Some(oscillator), Some(signal)) => Some(OscillatorReading::new(oscillator, signal)),
        (None, None) => None,
        _ => bail!("Feed line has only one of oscillator and signal: {line}"),
    };
    Ok(Some(FeedLine { at: raw.at, reading }))
}

/// Assigns a replay time to every feed line.
///
/// Stamped lines use their own time. Unstamped lines follow the previous one by `step`; the
/// very first unstamped line starts at `origin`. Time may never run backwards.
#[derive(Debug, Clone)]
pub struct ReplayCursor {
    origin: DateTime<Utc>,
    step: Duration,
    last: Option<DateTime<Utc>>,
}

impl ReplayCursor {
    pub fn new(origin: DateTime<Utc>, step: Duration) -> Self {
        Self {
            origin,
            step,
            last: None,
        }
    }

    pub fn next(&mut self, at: Option<DateTime<Utc>>) -> Result<DateTime<Utc>> {
        let next = match (at, self.last) {
            (Some(at), Some(last)) if at < last => {
                bail!("Feed time went backwards: {at} is before {last}")
            }
            (Some(at), _) => at,
            (None, Some(last)) => last + self.step,
            (None, None) => self.origin,
        };
        self.last = Some(next);
        Ok(next)
    }
}
