//! Record manager - identity map, unit of work and update dispatch.
//!
//! ## Example
//!
//! ```ignore
//! use record_keeper::{fields, RecordManager, Schema};
//!
//! static PRODUCT: Schema =
//!     Schema::new("product", &["sku", "name", "quantity"], "sku").with_quantity("quantity");
//!
//! let manager = RecordManager::open("inventory.json", &[&PRODUCT])?;
//! let widget = manager.create("product", fields! { "sku" => "A-1", "name" => "Widget", "quantity" => 0 })?;
//! widget.set("quantity", 20)?;
//! manager.flush()?;
//! ```

mod builder;
mod entities;
mod identity;
mod manager;

pub use builder::{ManagerBuilder, ManagerConfig, DEFAULT_THRESHOLD};
pub use entities::EntityRepository;
pub use identity::PrimaryKey;
pub use manager::{Origin, RecordManager};

pub(crate) use manager::Shared;
