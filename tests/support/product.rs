use record_keeper::{fields, Entity, Fields, Record, Result, Schema, Value};

pub const PRODUCT: Schema =
    Schema::new("product", &["sku", "name", "quantity"], "sku").with_quantity("quantity");

pub const SUPPLIER: Schema = Schema::new("supplier", &["code", "name"], "code");

pub fn product(sku: &str, name: &str, quantity: i64) -> Fields {
    fields! { "sku" => sku, "name" => name, "quantity" => quantity }
}

pub fn supplier(code: &str, name: &str) -> Fields {
    fields! { "code" => code, "name" => name }
}

/// Stock-keeping entity. Each stock movement is a single snapshot update.
pub struct Product(Record);

impl Entity for Product {
    const SCHEMA: &'static Schema = &PRODUCT;

    fn from_record(record: Record) -> Self {
        Product(record)
    }

    fn record(&self) -> &Record {
        &self.0
    }
}

impl Product {
    pub fn sku(&self) -> Result<String> {
        self.0.primary_key()
    }

    pub fn quantity(&self) -> Result<i64> {
        Ok(self.0.get("quantity")?.as_i64().unwrap_or_default())
    }

    pub fn increase(&self, amount: i64) -> Result<()> {
        self.adjust(amount)
    }

    pub fn decrease(&self, amount: i64) -> Result<()> {
        self.adjust(-amount)
    }

    pub fn rename_sku(&self, sku: &str) -> Result<()> {
        self.0.set("sku", sku)?;
        Ok(())
    }

    fn adjust(&self, delta: i64) -> Result<()> {
        let mut fields = self.0.snapshot()?;
        let quantity = fields
            .get("quantity")
            .and_then(Value::as_i64)
            .unwrap_or_default();
        fields.insert("quantity".to_string(), Value::Int(quantity + delta));
        self.0.update(fields)?;
        Ok(())
    }
}
