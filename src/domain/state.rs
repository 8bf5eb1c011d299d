use serde::{Deserialize, Serialize};
use std::fmt;

/// Turn sequencer phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnPhase {
    /// Waiting for a command
    Idle,
    /// Strategist is evaluating the request
    Strategize,
    /// Guardian is screening the request
    Guard,
    /// Reading the command as a transfer intent
    ExtractIntent,
    /// No transfer requested; Executor stands by
    NoIntent,
    /// Balance check, fee quote, broadcast
    Execute,
}

impl TurnPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnPhase::Idle => "IDLE",
            TurnPhase::Strategize => "STRATEGIZE",
            TurnPhase::Guard => "GUARD",
            TurnPhase::ExtractIntent => "EXTRACT_INTENT",
            TurnPhase::NoIntent => "NO_INTENT",
            TurnPhase::Execute => "EXECUTE",
        }
    }

    /// Check if this phase can transition to another phase
    pub fn can_transition_to(&self, target: TurnPhase) -> bool {
        use TurnPhase::*;

        match (self, target) {
            (Idle, Strategize) => true,
            (Strategize, Guard) => true,
            (Guard, ExtractIntent) => true,
            (ExtractIntent, NoIntent) => true,
            (ExtractIntent, Execute) => true,
            (NoIntent, Idle) => true,
            (Execute, Idle) => true,

            // Abort after a collaborator failure
            (Strategize, Idle) => true,
            (Guard, Idle) => true,

            _ => false,
        }
    }

    /// Is a turn currently in flight?
    pub fn is_active(&self) -> bool {
        !matches!(self, TurnPhase::Idle)
    }
}

impl fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Phase transition event (for logging/debugging)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseTransition {
    pub from: TurnPhase,
    pub to: TurnPhase,
    pub reason: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl PhaseTransition {
    pub fn new(from: TurnPhase, to: TurnPhase, reason: impl Into<String>) -> Self {
        Self {
            from,
            to,
            reason: reason.into(),
            timestamp: chrono::Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_transitions() {
        use TurnPhase::*;

        assert!(Idle.can_transition_to(Strategize));
        assert!(Strategize.can_transition_to(Guard));
        assert!(Guard.can_transition_to(ExtractIntent));
        assert!(ExtractIntent.can_transition_to(NoIntent));
        assert!(ExtractIntent.can_transition_to(Execute));
        assert!(NoIntent.can_transition_to(Idle));
        assert!(Execute.can_transition_to(Idle));

        assert!(!Idle.can_transition_to(Execute));
        assert!(!Strategize.can_transition_to(ExtractIntent));
        assert!(!ExtractIntent.can_transition_to(Idle));
        assert!(!Execute.can_transition_to(NoIntent));
    }
}
