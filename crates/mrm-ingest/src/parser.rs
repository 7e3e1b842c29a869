//! `DECISION:` block parser.
//!
//! ```text
//! DECISION:
//! Date: 2026-01-26
//! Action: BUY
//! Ticker: ROP
//! Limit: $400.00
//! Shares: 10
//! Track: 3
//! Signal: Target Hit
//! Thesis: Intact
//! Notes: Quality compounder at valuation floor
//! ```
//!
//! Header: a line that reads `DECISION:` or `DECISION <n>:`
//! (case-insensitive, surrounding whitespace ignored). A block runs until the
//! next line starting with `DECISION` or end of text. Body lines split at the
//! first colon; unknown keys and lines without a colon are ignored.

use mrm_ledger::{dates::normalize_date, micros_from_f64, parse_micros, Micros};

use crate::{Decision, DecisionAction};

fn is_header(upper: &str) -> bool {
    let Some(rest) = upper.strip_prefix("DECISION") else {
        return false;
    };
    let rest = rest.trim_start().trim_start_matches(|c: char| c.is_ascii_digit());
    matches!(rest.trim(), ":")
}

fn starts_block_boundary(upper: &str) -> bool {
    upper.starts_with("DECISION")
}

/// `$1,234.50` → 1234.50; zero when unparseable.
fn parse_limit(raw: &str) -> Micros {
    let cleaned: String = raw.chars().filter(|c| *c != '$' && *c != ',').collect();
    let cleaned = cleaned.trim();
    if let Ok(m) = parse_micros(cleaned) {
        return m;
    }
    cleaned
        .parse::<f64>()
        .ok()
        .and_then(|v| micros_from_f64(v).ok())
        .unwrap_or(Micros::ZERO)
}

/// `10`, `10.0`, `10.7` → 10; zero when unparseable.
fn parse_shares(raw: &str) -> i64 {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v.trunc() as i64,
        _ => 0,
    }
}

#[derive(Default)]
struct BlockFields {
    date: Option<String>,
    action: Option<String>,
    ticker: Option<String>,
    limit: Option<String>,
    shares: Option<String>,
    track: Option<String>,
    signal: Option<String>,
    thesis: Option<String>,
    notes: Option<String>,
}

impl BlockFields {
    fn set(&mut self, line: &str) {
        let Some((key, value)) = line.split_once(':') else {
            return;
        };
        let value = value.trim().to_string();
        let slot = match key.trim().to_ascii_lowercase().as_str() {
            "date" => &mut self.date,
            "action" => &mut self.action,
            "ticker" => &mut self.ticker,
            "limit" => &mut self.limit,
            "shares" => &mut self.shares,
            "track" => &mut self.track,
            "signal" => &mut self.signal,
            "thesis" => &mut self.thesis,
            "notes" => &mut self.notes,
            _ => return,
        };
        *slot = Some(value);
    }

    fn into_decision(self) -> Option<Decision> {
        let action = self.action.map(|a| a.to_ascii_uppercase()).filter(|a| !a.is_empty())?;
        let ticker = self.ticker.map(|t| t.to_ascii_uppercase()).filter(|t| !t.is_empty())?;
        Some(Decision {
            date: self.date.as_deref().and_then(normalize_date),
            action: DecisionAction::parse(&action),
            ticker,
            limit: self.limit.as_deref().map(parse_limit).unwrap_or(Micros::ZERO),
            shares: self.shares.as_deref().map(parse_shares).unwrap_or(0),
            track: self.track.unwrap_or_default(),
            signal: self.signal.unwrap_or_default(),
            thesis: self.thesis.unwrap_or_default(),
            notes: self.notes.unwrap_or_default(),
        })
    }
}

/// Parse every decision block in `text`, in order. Blocks without both an
/// action and a ticker are dropped.
pub fn parse_decisions(text: &str) -> Vec<Decision> {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");

    let mut out = Vec::new();
    let mut current: Option<BlockFields> = None;
    for line in text.lines() {
        let upper = line.trim().to_ascii_uppercase();
        if starts_block_boundary(&upper) {
            if let Some(done) = current.take() {
                out.extend(done.into_decision());
            }
            if is_header(&upper) {
                current = Some(BlockFields::default());
            }
            continue;
        }
        if let Some(block) = current.as_mut() {
            block.set(line);
        }
    }
    if let Some(done) = current {
        out.extend(done.into_decision());
    }

    tracing::debug!(blocks = out.len(), "decision blocks parsed");
    out
}
