mod cadence;
mod presenter;

pub use presenter::{RevealPhase, RevealSignal, TypingPresenter, DEFAULT_TYPING_INTERVAL};
