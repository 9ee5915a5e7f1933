use crate::deploy::Direction;
use crate::error::DeployError;
use crate::registry::ObjectKey;

/// Structured per-record outcome emitted by the executor.
#[derive(Debug, Clone, PartialEq)]
pub enum DeployEvent {
    Applied {
        direction: Direction,
        object: ObjectKey,
        qualified: String,
    },
    ConditionNotMet {
        direction: Direction,
        object: ObjectKey,
        qualified: String,
    },
    SkippedEmpty {
        direction: Direction,
        object: ObjectKey,
    },
    StatementFailed {
        direction: Direction,
        object: ObjectKey,
        message: String,
    },
}

impl DeployEvent {
    pub fn object(&self) -> &ObjectKey {
        match self {
            DeployEvent::Applied { object, .. }
            | DeployEvent::ConditionNotMet { object, .. }
            | DeployEvent::SkippedEmpty { object, .. }
            | DeployEvent::StatementFailed { object, .. } => object,
        }
    }
}

/// Sink for executor events, in a way that works for both CLI and library
/// usage.
pub trait Reporter {
    fn applied(&self, direction: Direction, object: &ObjectKey, qualified: &str);
    fn condition_not_met(&self, direction: Direction, object: &ObjectKey, qualified: &str);
    fn skipped_empty(&self, direction: Direction, object: &ObjectKey);
    fn statement_failed(&self, direction: Direction, object: &ObjectKey, error: &DeployError);
}

/// Reporter that collects events for later inspection.
#[derive(Default)]
pub struct CollectingReporter {
    events: std::sync::Mutex<Vec<DeployEvent>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DeployEvent> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: DeployEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl Reporter for CollectingReporter {
    fn applied(&self, direction: Direction, object: &ObjectKey, qualified: &str) {
        self.push(DeployEvent::Applied {
            direction,
            object: object.clone(),
            qualified: qualified.to_string(),
        });
    }

    fn condition_not_met(&self, direction: Direction, object: &ObjectKey, qualified: &str) {
        self.push(DeployEvent::ConditionNotMet {
            direction,
            object: object.clone(),
            qualified: qualified.to_string(),
        });
    }

    fn skipped_empty(&self, direction: Direction, object: &ObjectKey) {
        self.push(DeployEvent::SkippedEmpty {
            direction,
            object: object.clone(),
        });
    }

    fn statement_failed(&self, direction: Direction, object: &ObjectKey, error: &DeployError) {
        self.push(DeployEvent::StatementFailed {
            direction,
            object: object.clone(),
            message: error.to_string(),
        });
    }
}

/// Reporter that discards all events.
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn applied(&self, _direction: Direction, _object: &ObjectKey, _qualified: &str) {}
    fn condition_not_met(&self, _direction: Direction, _object: &ObjectKey, _qualified: &str) {}
    fn skipped_empty(&self, _direction: Direction, _object: &ObjectKey) {}
    fn statement_failed(&self, _direction: Direction, _object: &ObjectKey, _error: &DeployError) {}
}

/// Reporter that prints to stdout/stderr with colors.
#[cfg(feature = "cli")]
pub struct CliReporter;

#[cfg(feature = "cli")]
impl Reporter for CliReporter {
    fn applied(&self, direction: Direction, object: &ObjectKey, qualified: &str) {
        use owo_colors::OwoColorize;
        println!(
            "  {} {} {}: {}",
            "✓".green().bold(),
            direction.past_tense(),
            object.object_type.to_lowercase().yellow(),
            qualified.cyan()
        );
    }

    fn condition_not_met(&self, _direction: Direction, object: &ObjectKey, qualified: &str) {
        use owo_colors::OwoColorize;
        println!(
            "  {} condition not met for {}: {}",
            "→".cyan(),
            object.object_type.to_lowercase().yellow(),
            qualified.cyan()
        );
    }

    fn skipped_empty(&self, _direction: Direction, object: &ObjectKey) {
        use owo_colors::OwoColorize;
        println!("  {} {} is empty, skipping", "→".cyan(), object.to_string().cyan());
    }

    fn statement_failed(&self, direction: Direction, object: &ObjectKey, error: &DeployError) {
        use owo_colors::OwoColorize;
        eprintln!(
            "  {} failed to {} {}: {}",
            "✗".red().bold(),
            direction.verb().to_lowercase(),
            object.to_string().cyan(),
            error.to_string().red()
        );
    }
}
