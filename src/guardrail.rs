//! Keyword shortcuts answered without retrieval or generation.
//!
//! Checked in order: identity, PRAXIS meaning, greeting. The first match
//! wins. Identity and meaning match on substrings; greetings only match the
//! whole (normalized) message, so "hi, where did he study?" still goes to
//! retrieval.

/// Which shortcut answered a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guardrail {
    Identity,
    PraxisMeaning,
    Greeting,
}

const IDENTITY_KEYWORDS: &[&str] = &["who are you", "what is your name", "your name"];
const PRAXIS_KEYWORDS: &[&str] = &["praxis means", "what is praxis", "what does praxis stand for"];
const GREETINGS: &[&str] = &["hi", "hello", "hlo", "hey", "what's up", "yo"];

pub const IDENTITY_REPLY: &str =
    "My name is PRAXIS. I am a custom AI assistant created by Prabhu for his portfolio.";
pub const PRAXIS_REPLY: &str =
    "PRAXIS stands for Prabhu's Reactive Analytical & Experiential Intelligence System.";
pub const GREETING_REPLY: &str = "Hello! How can I assist you with information about Prabhu today?";

impl Guardrail {
    /// The canned reply for this shortcut.
    pub fn reply(self) -> &'static str {
        match self {
            Guardrail::Identity => IDENTITY_REPLY,
            Guardrail::PraxisMeaning => PRAXIS_REPLY,
            Guardrail::Greeting => GREETING_REPLY,
        }
    }
}

/// Lower-case and trim a raw user message.
pub fn normalize(message: &str) -> String {
    message.trim().to_lowercase()
}

/// Match an already-normalized message against the shortcut sets.
pub fn check(normalized: &str) -> Option<Guardrail> {
    if IDENTITY_KEYWORDS.iter().any(|k| normalized.contains(k)) {
        return Some(Guardrail::Identity);
    }
    if PRAXIS_KEYWORDS.iter().any(|k| normalized.contains(k)) {
        return Some(Guardrail::PraxisMeaning);
    }
    if GREETINGS.contains(&normalized) {
        return Some(Guardrail::Greeting);
    }
    None
}
