use serde::Serialize;

use crate::error::Result;
use crate::manager::RecordManager;
use crate::record::{Record, RecordId, Schema};
use crate::value::Fields;

/// Which observer category an update event is routed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// Every observer except the threshold-alert ones.
    General,
    /// Only threshold-alert observers.
    ThresholdAlert,
}

impl Route {
    /// Classifies an update of `schema` from `previous` to `current`.
    ///
    /// The update routes to threshold-alert observers only when the quantity
    /// member moves from at or above `threshold` to below it. Non-numeric
    /// values never cross.
    pub fn classify(schema: &Schema, previous: &Fields, current: &Fields, threshold: f64) -> Route {
        let Some(member) = schema.quantity_field() else {
            return Route::General;
        };

        let before = previous.get(member).and_then(|value| value.as_f64());
        let after = current.get(member).and_then(|value| value.as_f64());

        match (before, after) {
            (Some(before), Some(after)) if before >= threshold && after < threshold => {
                Route::ThresholdAlert
            }
            _ => Route::General,
        }
    }
}

/// The result of one applied update, handed to observers.
#[derive(Clone, Debug, Serialize)]
pub struct UpdateEvent {
    #[serde(skip)]
    record: Record,
    record_id: RecordId,
    entity_type: &'static str,
    primary_key: String,
    previous: Fields,
    fields: Fields,
    route: Route,
}

impl UpdateEvent {
    pub(crate) fn new(
        record: Record,
        primary_key: String,
        previous: Fields,
        fields: Fields,
        route: Route,
    ) -> Self {
        UpdateEvent {
            record_id: record.id(),
            entity_type: record.entity_type(),
            record,
            primary_key,
            previous,
            fields,
            route,
        }
    }

    /// Handle to the updated record.
    pub fn record(&self) -> &Record {
        &self.record
    }

    /// The manager that applied the update.
    pub fn manager(&self) -> Result<RecordManager> {
        self.record.manager()
    }

    pub fn record_id(&self) -> RecordId {
        self.record_id
    }

    pub fn entity_type(&self) -> &'static str {
        self.entity_type
    }

    /// Primary key after the update.
    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    /// Snapshot before the update.
    pub fn previous(&self) -> &Fields {
        &self.previous
    }

    /// Snapshot the update applied.
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn is_threshold_alert(&self) -> bool {
        self.route == Route::ThresholdAlert
    }
}
