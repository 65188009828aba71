//! Entity Projection
//!
//! Stateless views over the coordinators' current snapshots. Each entity
//! projects one snapshot field (or a small derived computation) into a typed
//! display value plus a sparse attribute map. Projections are pure: given the
//! same snapshot they return the same value, and an absent input yields an
//! explicit [`EntityValue::Unknown`] rather than a fabricated zero, so a
//! consumer can render "unavailable" distinctly from a true zero reading.
//!
//! Entity roles form a small closed set:
//! - **sensor** / **binary sensor**: read-only projections
//! - **switch**: state read from the snapshot, toggled via the client
//! - **button**: one-shot action, no state at all
//!
//! Switches and buttons bypass the coordinators entirely (see [`control`]);
//! the next poll cycle reflects whatever the action changed.

pub mod binary_sensor;
pub mod control;
pub mod sensor;

use crate::config::UpsConfig;
use crate::coordinator::{InfraSnapshot, StorageSnapshot, SystemSnapshot};
use serde::{Serialize, Serializer};

/// Displayable value of an entity.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityValue {
    /// The backing field is absent from the current snapshot.
    Unknown,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Serialize for EntityValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            EntityValue::Unknown => serializer.serialize_none(),
            EntityValue::Bool(v) => serializer.serialize_bool(*v),
            EntityValue::Int(v) => serializer.serialize_i64(*v),
            EntityValue::Float(v) => serializer.serialize_f64(*v),
            EntityValue::Text(v) => serializer.serialize_str(v),
        }
    }
}

impl EntityValue {
    pub fn from_bool(value: Option<bool>) -> Self {
        value.map_or(EntityValue::Unknown, EntityValue::Bool)
    }

    pub fn from_int<T: Into<i64>>(value: Option<T>) -> Self {
        value.map_or(EntityValue::Unknown, |v| EntityValue::Int(v.into()))
    }

    pub fn from_u64(value: Option<u64>) -> Self {
        // Snapshot byte counts fit i64 in practice; saturate rather than wrap.
        value.map_or(EntityValue::Unknown, |v| {
            EntityValue::Int(i64::try_from(v).unwrap_or(i64::MAX))
        })
    }

    pub fn from_float(value: Option<f64>) -> Self {
        value.map_or(EntityValue::Unknown, EntityValue::Float)
    }

    pub fn from_text(value: Option<&str>) -> Self {
        value.map_or(EntityValue::Unknown, |v| EntityValue::Text(v.to_string()))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, EntityValue::Unknown)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Sensor,
    BinarySensor,
    Switch,
    Button,
}

/// Sparse attribute map: keys are only present when the underlying optional
/// value exists. Built via explicit presence checks, never reflection.
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// One projected entity state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityState {
    pub id: String,
    pub name: String,
    pub kind: EntityKind,
    pub value: EntityValue,
    #[serde(skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
}

impl EntityState {
    pub fn new(kind: EntityKind, id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            value: EntityValue::Unknown,
            attributes: Attributes::new(),
        }
    }

    pub fn with_value(mut self, value: EntityValue) -> Self {
        self.value = value;
        self
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }
}

/// Insert `key` only when `value` is present.
pub(crate) fn attr_opt<T: Serialize>(attrs: &mut Attributes, key: &str, value: Option<T>) {
    if let Some(value) = value {
        if let Ok(json) = serde_json::to_value(value) {
            attrs.insert(key.to_string(), json);
        }
    }
}

/// Project every entity from whatever snapshots exist right now.
///
/// A missing snapshot simply contributes no entities; per-entity unknowns
/// only appear once the owning snapshot exists but lacks the specific field.
pub fn project_all(
    system: Option<&SystemSnapshot>,
    storage: Option<&StorageSnapshot>,
    infra: Option<&InfraSnapshot>,
    ups_config: &UpsConfig,
) -> Vec<EntityState> {
    let mut entities = Vec::new();
    if let Some(system) = system {
        entities.extend(sensor::system_sensors(system, ups_config));
        entities.extend(binary_sensor::system_binary_sensors(system));
        entities.extend(control::system_controls(system));
    }
    if let Some(storage) = storage {
        entities.extend(sensor::storage_sensors(storage));
        entities.extend(binary_sensor::storage_binary_sensors(storage));
        entities.extend(control::storage_controls(storage));
    }
    if let Some(infra) = infra {
        entities.extend(sensor::infra_sensors(infra));
        entities.extend(binary_sensor::infra_binary_sensors(infra));
    }
    entities
}

/// Lowercase a display name into an entity-id fragment.
pub(crate) fn slug(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}
