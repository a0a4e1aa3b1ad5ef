use std::time::Duration;

use super::cadence::Cadence;

pub const DEFAULT_TYPING_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RevealPhase {
    Idle,
    Revealing,
    Done,
}

/// Emitted after every reveal step.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum RevealSignal {
    /// Still revealing; carries the prefix shown so far.
    Progress(String),
    /// The step that revealed the last character. Observers that react to
    /// progress (scrolling) stay quiet for it.
    Settled,
}

/// Reveals a message one character per tick.
///
/// `tick` is the pure step; `next_tick` drives it from a cadence task that
/// lives only while a reveal is running.
#[derive(Debug)]
pub struct TypingPresenter {
    interval: Duration,
    source: String,
    // Byte offset just past each character of `source`.
    boundaries: Vec<usize>,
    revealed: usize,
    phase: RevealPhase,
    cadence: Option<Cadence>,
}

impl TypingPresenter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            source: String::new(),
            boundaries: Vec::new(),
            revealed: 0,
            phase: RevealPhase::Idle,
            cadence: None,
        }
    }

    /// Starts revealing `message` from its first character, discarding any
    /// reveal in progress.
    pub fn present(&mut self, message: impl Into<String>) {
        self.cadence = None;
        self.load(message.into());
        self.revealed = 0;
        self.phase = if self.boundaries.is_empty() {
            RevealPhase::Done
        } else {
            RevealPhase::Revealing
        };
    }

    /// Shows `message` in full at once.
    pub fn bypass(&mut self, message: impl Into<String>) {
        self.cadence = None;
        self.load(message.into());
        self.revealed = self.boundaries.len();
        self.phase = RevealPhase::Done;
    }

    /// Drops the current message and stops the cadence.
    pub fn stop(&mut self) {
        self.cadence = None;
        self.source.clear();
        self.boundaries.clear();
        self.revealed = 0;
        self.phase = RevealPhase::Idle;
    }

    /// Reveals one more character. Does nothing unless a reveal is running.
    pub fn tick(&mut self) -> Option<RevealSignal> {
        if self.phase != RevealPhase::Revealing {
            return None;
        }
        self.revealed += 1;
        if self.revealed >= self.boundaries.len() {
            self.revealed = self.boundaries.len();
            self.phase = RevealPhase::Done;
            self.cadence = None;
            return Some(RevealSignal::Settled);
        }
        Some(RevealSignal::Progress(self.revealed_text().to_string()))
    }

    /// Waits for the next cadence tick and applies it.
    ///
    /// Pending forever while nothing is being revealed, so it can sit in a
    /// `select!` next to other event sources. Cancel safe.
    pub async fn next_tick(&mut self) -> RevealSignal {
        loop {
            if self.phase != RevealPhase::Revealing {
                return std::future::pending().await;
            }
            let interval = self.interval;
            let cadence = self
                .cadence
                .get_or_insert_with(|| Cadence::start(interval));
            if !cadence.tick().await {
                self.cadence = None;
                continue;
            }
            if let Some(signal) = self.tick() {
                return signal;
            }
        }
    }

    pub fn revealed_text(&self) -> &str {
        match self.revealed {
            0 => "",
            n => &self.source[..self.boundaries[n - 1]],
        }
    }

    pub fn message(&self) -> &str {
        &self.source
    }

    pub fn revealed_len(&self) -> usize {
        self.revealed
    }

    pub fn phase(&self) -> RevealPhase {
        self.phase
    }

    pub fn is_done(&self) -> bool {
        self.phase == RevealPhase::Done
    }

    fn load(&mut self, message: String) {
        self.boundaries = message
            .char_indices()
            .map(|(start, ch)| start + ch.len_utf8())
            .collect();
        self.source = message;
    }
}

impl Default for TypingPresenter {
    fn default() -> Self {
        Self::new(DEFAULT_TYPING_INTERVAL)
    }
}
