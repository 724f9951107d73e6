use std::fmt;

use crate::error::{RecordError, Result};
use crate::value::{Fields, Value};

/// Declaration of an entity type: its name, member set, primary-key member
/// and optional quantity member watched by the threshold rule.
///
/// Schemas are built as constants so a primary key that is not a declared
/// member, or a member declared twice, fails to compile:
///
/// ```ignore
/// pub const PRODUCT: Schema = Schema::new("product", &["sku", "name", "quantity"], "sku")
///     .with_quantity("quantity");
/// ```
pub struct Schema {
    name: &'static str,
    members: &'static [&'static str],
    primary_key: &'static str,
    quantity: Option<&'static str>,
}

impl Schema {
    pub const fn new(
        name: &'static str,
        members: &'static [&'static str],
        primary_key: &'static str,
    ) -> Self {
        assert!(!members.is_empty(), "schema must declare at least one member");

        let mut i = 0;
        while i < members.len() {
            let mut j = i + 1;
            while j < members.len() {
                assert!(
                    !eq_ignore_case(members[i], members[j]),
                    "schema declares a member twice"
                );
                j += 1;
            }
            i += 1;
        }

        assert!(
            declares(members, primary_key),
            "primary key must be a declared member"
        );

        Schema {
            name,
            members,
            primary_key,
            quantity: None,
        }
    }

    /// Designates the numeric member the threshold rule watches.
    pub const fn with_quantity(self, member: &'static str) -> Self {
        assert!(
            declares(self.members, member),
            "quantity field must be a declared member"
        );
        Schema {
            name: self.name,
            members: self.members,
            primary_key: self.primary_key,
            quantity: Some(member),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn members(&self) -> &'static [&'static str] {
        self.members
    }

    pub fn primary_key(&self) -> &'static str {
        self.primary_key
    }

    pub fn quantity_field(&self) -> Option<&'static str> {
        self.quantity
    }

    /// Resolves `field` to its declared spelling, ignoring case.
    pub fn member(&self, field: &str) -> Option<&'static str> {
        self.members
            .iter()
            .copied()
            .find(|member| member.eq_ignore_ascii_case(field))
    }

    pub fn has_member(&self, field: &str) -> bool {
        self.member(field).is_some()
    }

    /// Validates that `fields` carries exactly the declared members, each
    /// once and with a durable value, and returns it keyed by declared
    /// spelling, in declaration order.
    pub fn normalize(&self, fields: Fields) -> Result<Fields> {
        let mut given = Fields::with_capacity(fields.len());
        for (name, value) in fields {
            let member = self.member(&name).ok_or_else(|| self.unknown_member(&name))?;
            if let Value::Float(n) = &value {
                if !n.is_finite() {
                    return Err(RecordError::NonFiniteValue {
                        entity_type: self.name.to_string(),
                        member: member.to_string(),
                    });
                }
            }
            if given.insert(member.to_string(), value).is_some() {
                return Err(RecordError::DuplicateMember {
                    entity_type: self.name.to_string(),
                    member: member.to_string(),
                });
            }
        }

        let mut normalized = Fields::with_capacity(self.members.len());
        for member in self.members {
            let value = given
                .swap_remove(*member)
                .ok_or_else(|| RecordError::MissingMember {
                    entity_type: self.name.to_string(),
                    member: member.to_string(),
                })?;
            normalized.insert(member.to_string(), value);
        }
        Ok(normalized)
    }

    /// The primary-key value of a normalized snapshot.
    pub fn key_of(&self, fields: &Fields) -> String {
        fields
            .get(self.primary_key)
            .map(Value::to_key)
            .unwrap_or_default()
    }

    pub(crate) fn unknown_member(&self, field: &str) -> RecordError {
        RecordError::UnknownMember {
            entity_type: self.name.to_string(),
            member: field.to_string(),
        }
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("members", &self.members)
            .field("primary_key", &self.primary_key)
            .field("quantity", &self.quantity)
            .finish()
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Schema {}

const fn declares(members: &[&str], field: &str) -> bool {
    let mut i = 0;
    while i < members.len() {
        if eq_ignore_case(members[i], field) {
            return true;
        }
        i += 1;
    }
    false
}

const fn eq_ignore_case(a: &str, b: &str) -> bool {
    let a = a.as_bytes();
    let b = b.as_bytes();
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i].to_ascii_lowercase() != b[i].to_ascii_lowercase() {
            return false;
        }
        i += 1;
    }
    true
}

/// The entity types a manager knows how to hold and rehydrate.
#[derive(Clone, Debug, Default)]
pub struct SchemaRegistry {
    schemas: Vec<&'static Schema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a schema. Re-registering the same name is a no-op.
    pub fn register(&mut self, schema: &'static Schema) {
        if self.get(schema.name()).is_none() {
            self.schemas.push(schema);
        }
    }

    pub fn get(&self, entity_type: &str) -> Option<&'static Schema> {
        self.schemas
            .iter()
            .copied()
            .find(|schema| schema.name() == entity_type)
    }

    pub fn require(&self, entity_type: &str) -> Result<&'static Schema> {
        self.get(entity_type)
            .ok_or_else(|| RecordError::UnknownEntityType(entity_type.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static Schema> + '_ {
        self.schemas.iter().copied()
    }
}
