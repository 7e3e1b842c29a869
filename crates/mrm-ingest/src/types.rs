use chrono::NaiveDate;
use mrm_ledger::Micros;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum DecisionAction {
    Buy,
    Add,
    None,
    Hold,
    Watch,
    Ignore,
    Other(String),
}

impl DecisionAction {
    /// Parse an already upper-cased action word.
    pub fn parse(raw: &str) -> DecisionAction {
        match raw {
            "BUY" => DecisionAction::Buy,
            "ADD" => DecisionAction::Add,
            "NONE" => DecisionAction::None,
            "HOLD" => DecisionAction::Hold,
            "WATCH" => DecisionAction::Watch,
            "IGNORE" => DecisionAction::Ignore,
            other => DecisionAction::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            DecisionAction::Buy => "BUY",
            DecisionAction::Add => "ADD",
            DecisionAction::None => "NONE",
            DecisionAction::Hold => "HOLD",
            DecisionAction::Watch => "WATCH",
            DecisionAction::Ignore => "IGNORE",
            DecisionAction::Other(s) => s,
        }
    }

    /// Deliberate no-order decisions.
    pub fn is_passive(&self) -> bool {
        matches!(
            self,
            DecisionAction::None
                | DecisionAction::Hold
                | DecisionAction::Watch
                | DecisionAction::Ignore
        )
    }

    pub fn is_order_producing(&self) -> bool {
        matches!(self, DecisionAction::Buy | DecisionAction::Add)
    }
}

impl std::fmt::Display for DecisionAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed decision block. Fields are as written; nothing is validated
/// yet except that action and ticker are present.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Decision {
    /// `None` when the block has no date or an unreadable one.
    pub date: Option<NaiveDate>,
    pub action: DecisionAction,
    pub ticker: String,
    /// Zero when missing or unparseable.
    pub limit: Micros,
    /// Truncated toward zero; zero when missing or unparseable.
    pub shares: i64,
    /// Raw track cell; checked against 1/2/3 during validation.
    pub track: String,
    pub signal: String,
    pub thesis: String,
    pub notes: String,
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Accepted,
    Skipped,
    Rejected,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DecisionOutcome {
    pub ticker: String,
    pub action: DecisionAction,
    pub verdict: Verdict,
    pub reason: String,
    /// Set once the decision got far enough to be keyed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub outcomes: Vec<DecisionOutcome>,
    pub added: usize,
    pub skipped: usize,
    pub rejected: usize,
    pub reservation_start: Micros,
    pub reservation_left: Micros,
}

impl IngestReport {
    pub(crate) fn push(&mut self, outcome: DecisionOutcome) {
        match outcome.verdict {
            Verdict::Accepted => self.added += 1,
            Verdict::Skipped => self.skipped += 1,
            Verdict::Rejected => self.rejected += 1,
        }
        self.outcomes.push(outcome);
    }

    /// Total cost reserved by accepted decisions.
    pub fn reserved(&self) -> Micros {
        self.reservation_start - self.reservation_left
    }
}

// ---------------------------------------------------------------------------
// Cash reservation
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReservationError {
    pub required: Micros,
    pub available: Micros,
}

impl std::fmt::Display for ReservationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "insufficient cash (need ${}, have ${})",
            self.required.fmt_cents(),
            self.available.fmt_cents()
        )
    }
}

impl std::error::Error for ReservationError {}

/// Running balance for one ingestion call. Starts at ledger cash and only
/// ever decreases; dropped at the end of the call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CashReservation {
    available: Micros,
}

impl CashReservation {
    pub fn new(available: Micros) -> Self {
        Self { available }
    }

    pub fn available(&self) -> Micros {
        self.available
    }

    /// Reserve `cost` or leave the balance untouched.
    pub fn reserve(&mut self, cost: Micros) -> Result<(), ReservationError> {
        if cost > self.available {
            return Err(ReservationError {
                required: cost,
                available: self.available,
            });
        }
        self.available -= cost;
        Ok(())
    }
}
