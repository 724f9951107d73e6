use std::sync::{Arc, Mutex};

use record_keeper::{Observer, ObserverCategory, ObserverError, Route, UpdateEvent, Value};

/// Observer that keeps every event it receives.
pub struct Recorder {
    category: ObserverCategory,
    events: Mutex<Vec<UpdateEvent>>,
}

impl Recorder {
    pub fn general() -> Arc<Self> {
        Self::new(ObserverCategory::General)
    }

    pub fn alerts() -> Arc<Self> {
        Self::new(ObserverCategory::ThresholdAlert)
    }

    pub fn new(category: ObserverCategory) -> Arc<Self> {
        Arc::new(Recorder {
            category,
            events: Mutex::new(Vec::new()),
        })
    }

    pub fn events(&self) -> Vec<UpdateEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn routes(&self) -> Vec<Route> {
        self.events().iter().map(UpdateEvent::route).collect()
    }

    /// The `quantity` value each received event applied.
    pub fn quantities(&self) -> Vec<i64> {
        self.events()
            .iter()
            .filter_map(|event| event.fields().get("quantity").and_then(Value::as_i64))
            .collect()
    }
}

impl Observer for Recorder {
    fn category(&self) -> ObserverCategory {
        self.category
    }

    fn update(&self, event: &UpdateEvent) -> Result<(), ObserverError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "recorder"
    }
}

/// Observer that always fails.
pub struct Broken;

impl Observer for Broken {
    fn update(&self, _event: &UpdateEvent) -> Result<(), ObserverError> {
        Err(ObserverError::new("broken", "mail server unreachable"))
    }

    fn name(&self) -> &str {
        "broken"
    }
}
