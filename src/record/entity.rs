use super::record::Record;
use super::schema::Schema;

/// A typed wrapper over a [`Record`] of one entity type.
///
/// Implementors add domain operations that compute a complete new snapshot and
/// hand it to [`Record::update`] once, never one update per incremental step.
///
/// ```ignore
/// pub struct Product(Record);
///
/// impl Entity for Product {
///     const SCHEMA: &'static Schema = &PRODUCT;
///     fn from_record(record: Record) -> Self { Product(record) }
///     fn record(&self) -> &Record { &self.0 }
/// }
/// ```
pub trait Entity: Sized {
    const SCHEMA: &'static Schema;

    fn from_record(record: Record) -> Self;

    fn record(&self) -> &Record;

    fn into_record(self) -> Record {
        self.record().clone()
    }
}
