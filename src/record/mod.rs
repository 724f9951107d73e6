//! Records - schema-checked field bags bound to their owning manager.
//!
//! An entity type is declared once as a constant [`Schema`]. Records of that
//! type only ever carry the declared members; reads and writes of anything
//! else fail with [`RecordError::UnknownMember`](crate::RecordError::UnknownMember).

mod entity;
mod record;
mod schema;

pub use entity::Entity;
pub use record::{Record, RecordId};
pub use schema::{Schema, SchemaRegistry};
