use std::fmt;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

use super::store::StoreError;

/// A stored record: a flat JSON object carrying its own `id` and `type`.
pub type Item = Map<String, Value>;

pub const ID_FIELD: &str = "id";
pub const TYPE_FIELD: &str = "type";

/// Discriminator sharing one keyspace between entity kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    User,
    Product,
    Order,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::User => "user",
            EntityType::Product => "product",
            EntityType::Order => "order",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(EntityType::User),
            "product" => Some(EntityType::Product),
            "order" => Some(EntityType::Order),
            _ => None,
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite primary key: partition `id`, discriminator `type`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityKey {
    pub id: String,
    pub entity_type: EntityType,
}

impl EntityKey {
    pub fn new(id: impl Into<String>, entity_type: EntityType) -> Self {
        Self {
            id: id.into(),
            entity_type,
        }
    }

    pub fn from_item(item: &Item) -> Result<Self, StoreError> {
        let id = item
            .get(ID_FIELD)
            .and_then(Value::as_str)
            .ok_or(StoreError::MissingKey(ID_FIELD))?;
        let entity_type = item
            .get(TYPE_FIELD)
            .and_then(Value::as_str)
            .and_then(EntityType::parse)
            .ok_or(StoreError::MissingKey(TYPE_FIELD))?;
        Ok(Self::new(id, entity_type))
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.entity_type, self.id)
    }
}

/// Typed view over an [`Item`] of one entity kind.
pub trait Entity: Serialize + DeserializeOwned {
    const TYPE: EntityType;

    /// Partition key value for this record.
    fn key_id(&self) -> &str;

    fn key(&self) -> EntityKey {
        EntityKey::new(self.key_id(), Self::TYPE)
    }

    fn to_item(&self) -> Result<Item, StoreError> {
        match serde_json::to_value(self)? {
            Value::Object(mut item) => {
                item.insert(ID_FIELD.to_string(), Value::String(self.key_id().to_string()));
                item.insert(TYPE_FIELD.to_string(), Value::String(Self::TYPE.as_str().to_string()));
                Ok(item)
            }
            _ => Err(StoreError::Corrupt(format!("{} did not serialize to an object", Self::TYPE))),
        }
    }

    fn from_item(item: Item) -> Result<Self, StoreError> {
        Ok(serde_json::from_value(Value::Object(item))?)
    }
}

/// Selection applied by `scan`: one entity type, optionally one owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanFilter {
    pub entity_type: EntityType,
    pub owner: Option<(String, String)>,
}

impl ScanFilter {
    pub fn of(entity_type: EntityType) -> Self {
        Self {
            entity_type,
            owner: None,
        }
    }

    pub fn owned_by(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.owner = Some((field.into(), value.into()));
        self
    }

    pub fn matches(&self, item: &Item) -> bool {
        let type_matches = item.get(TYPE_FIELD).and_then(Value::as_str) == Some(self.entity_type.as_str());
        let owner_matches = match &self.owner {
            Some((field, value)) => item.get(field).and_then(Value::as_str) == Some(value.as_str()),
            None => true,
        };
        type_matches && owner_matches
    }
}
