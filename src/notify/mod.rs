//! Notifications - observers of record updates.
//!
//! Every applied update produces an [`UpdateEvent`] carrying its own [`Route`].
//! The [`NotificationHub`] hands it to the observers whose
//! [`ObserverCategory`] accepts that route:
//!
//! - threshold crossings go to threshold-alert observers only;
//! - every other update goes to all observers except the threshold-alert ones.

#[cfg(feature = "emitter")]
mod emitter_observer;
mod event;
mod hub;
mod log_observer;
mod observer;

#[cfg(feature = "emitter")]
pub use emitter_observer::{EmitterObserver, RECORD_UPDATED, THRESHOLD_CROSSED};
pub use event::{Route, UpdateEvent};
pub use hub::{DispatchReport, NotificationHub};
pub use log_observer::LogObserver;
pub use observer::{Observer, ObserverCategory, ObserverError};
