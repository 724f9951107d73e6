use thiserror::Error;

use super::event::{Route, UpdateEvent};

/// Observer capability category.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ObserverCategory {
    /// Receives every update that does not cross the threshold.
    #[default]
    General,
    /// Receives only threshold crossings, and exclusively.
    ThresholdAlert,
}

impl ObserverCategory {
    pub fn accepts(self, route: Route) -> bool {
        matches!(
            (self, route),
            (ObserverCategory::General, Route::General)
                | (ObserverCategory::ThresholdAlert, Route::ThresholdAlert)
        )
    }
}

/// Failure reported by an observer. The hub logs it and moves on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("observer {observer} failed: {message}")]
pub struct ObserverError {
    pub observer: String,
    pub message: String,
}

impl ObserverError {
    pub fn new(observer: impl Into<String>, message: impl Into<String>) -> Self {
        ObserverError {
            observer: observer.into(),
            message: message.into(),
        }
    }
}

/// Receives update events from a [`NotificationHub`](super::NotificationHub).
pub trait Observer: Send + Sync {
    fn category(&self) -> ObserverCategory {
        ObserverCategory::General
    }

    /// Handles one event. Errors never reach the code that caused the update.
    fn update(&self, event: &UpdateEvent) -> Result<(), ObserverError>;

    /// Label used in logs.
    fn name(&self) -> &str {
        "observer"
    }
}
