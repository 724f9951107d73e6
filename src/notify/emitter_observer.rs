use std::sync::Mutex;

use event_emitter_rs::EventEmitter;

use super::event::{Route, UpdateEvent};
use super::observer::{Observer, ObserverCategory, ObserverError};

/// Emitter event name for general updates.
pub const RECORD_UPDATED: &str = "RecordUpdated";
/// Emitter event name for threshold crossings.
pub const THRESHOLD_CROSSED: &str = "ThresholdCrossed";

/// Observer that relays events to an [`EventEmitter`] for in-process
/// subscribers. Payloads are the event as JSON.
///
/// The emitter runs listeners on its own threads, so subscribers see events
/// shortly after dispatch rather than during it.
///
/// ```ignore
/// let relay = EmitterObserver::new(ObserverCategory::General);
/// relay.on(RECORD_UPDATED, |json| println!("updated: {}", json));
/// manager.attach(Arc::new(relay));
/// ```
pub struct EmitterObserver {
    category: ObserverCategory,
    emitter: Mutex<EventEmitter>,
}

impl EmitterObserver {
    pub fn new(category: ObserverCategory) -> Self {
        Self::with_emitter(EventEmitter::new(), category)
    }

    pub fn with_emitter(emitter: EventEmitter, category: ObserverCategory) -> Self {
        EmitterObserver {
            category,
            emitter: Mutex::new(emitter),
        }
    }

    /// Register a listener for [`RECORD_UPDATED`] or [`THRESHOLD_CROSSED`].
    pub fn on<F>(&self, event: &str, listener: F) -> Result<(), ObserverError>
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        let mut emitter = self
            .emitter
            .lock()
            .map_err(|_| ObserverError::new("emitter", "emitter lock poisoned"))?;
        emitter.on(event, listener);
        Ok(())
    }

    pub fn event_name(route: Route) -> &'static str {
        match route {
            Route::General => RECORD_UPDATED,
            Route::ThresholdAlert => THRESHOLD_CROSSED,
        }
    }
}

impl Observer for EmitterObserver {
    fn category(&self) -> ObserverCategory {
        self.category
    }

    fn update(&self, event: &UpdateEvent) -> Result<(), ObserverError> {
        let payload =
            serde_json::to_string(event).map_err(|e| ObserverError::new("emitter", e.to_string()))?;
        let mut emitter = self
            .emitter
            .lock()
            .map_err(|_| ObserverError::new("emitter", "emitter lock poisoned"))?;
        emitter.emit(Self::event_name(event.route()), payload);
        Ok(())
    }

    fn name(&self) -> &str {
        "emitter"
    }
}
