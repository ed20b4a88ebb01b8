//! Domain types for impact analysis.
//!
//! This module contains the value types shared by every stage of the engine:
//! entity identity, graph node/edge records, and the ordered severity scales
//! (dependency type, change type, impact level).

mod path;

pub use path::{DependencyPath, PathRisk};

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Separator between entity type and id in the stable key form.
pub const ENTITY_KEY_SEPARATOR: char = ':';

/// Identity of a graph node.
///
/// Equality and hashing consider only `(entity_type, id)`; the display name
/// is metadata and never affects identity.
#[derive(Debug, Clone, Serialize)]
pub struct EntityRef {
    /// Kind of entity (e.g., "service", "table")
    pub entity_type: String,

    /// Identifier, unique within the entity type
    pub id: String,

    /// Human-readable name (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl EntityRef {
    /// Create a new entity reference without a display name
    pub fn new(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            id: id.into(),
            name: None,
        }
    }

    /// Attach a display name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Stable `"{type}:{id}"` key used to build path identifiers.
    #[must_use]
    pub fn stable_key(&self) -> String {
        format!("{}{}{}", self.entity_type, ENTITY_KEY_SEPARATOR, self.id)
    }
}

impl PartialEq for EntityRef {
    fn eq(&self, other: &Self) -> bool {
        self.entity_type == other.entity_type && self.id == other.id
    }
}

impl Eq for EntityRef {}

impl Hash for EntityRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.entity_type.hash(state);
        self.id.hash(state);
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.entity_type, ENTITY_KEY_SEPARATOR, self.id)
    }
}

/// Parses the stable key form. Only the first `:` separates type from id,
/// so ids may themselves contain colons.
impl FromStr for EntityRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once(ENTITY_KEY_SEPARATOR) {
            Some((entity_type, id)) if !entity_type.is_empty() && !id.is_empty() => {
                Ok(Self::new(entity_type, id))
            }
            _ => Err(Error::InvalidEntityRef(s.to_string())),
        }
    }
}

/// Minimum criticality level
pub const MIN_CRITICALITY: u8 = 1;

/// Maximum criticality level
pub const MAX_CRITICALITY: u8 = 5;

/// Default criticality level (Medium)
pub const DEFAULT_CRITICALITY: u8 = 3;

/// Business criticality of a node, bounded to 1-5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Criticality(u8);

impl Criticality {
    /// Create a criticality level, validating the 1-5 range.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidCriticality` if `level` is outside 1-5.
    pub fn new(level: u8) -> Result<Self> {
        if (MIN_CRITICALITY..=MAX_CRITICALITY).contains(&level) {
            Ok(Self(level))
        } else {
            Err(Error::InvalidCriticality(level))
        }
    }

    /// Numeric level
    #[must_use]
    pub fn level(self) -> u8 {
        self.0
    }
}

impl Default for Criticality {
    fn default() -> Self {
        Self(DEFAULT_CRITICALITY)
    }
}

impl fmt::Display for Criticality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strength of a dependency edge, ordered from weakest to strongest.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DependencyType {
    /// Relationship of unknown strength
    #[default]
    Unknown,

    /// Optional or soft dependency
    Weak,

    /// Ordinary dependency
    Normal,

    /// Dependent cannot function correctly without the dependency
    Strong,

    /// Dependent fails outright without the dependency
    Critical,
}

impl DependencyType {
    /// Lowercase name used in JSON and CLI output
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Weak => "weak",
            Self::Normal => "normal",
            Self::Strong => "strong",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of change being applied to the root entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    /// Purely additive change (new field, new endpoint)
    Additive,

    /// Behavior or shape changes that stay backwards compatible
    Modification,

    /// Backwards-incompatible change
    Breaking,

    /// Entity is removed entirely
    Removal,
}

impl ChangeType {
    /// Lowercase name used in JSON and CLI output
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Additive => "additive",
            Self::Modification => "modification",
            Self::Breaking => "breaking",
            Self::Removal => "removal",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discrete impact severity, ordered `None < Low < Medium < High < Critical`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ImpactLevel {
    /// No impact computed
    #[default]
    None,

    /// Low impact
    Low,

    /// Medium impact
    Medium,

    /// High impact
    High,

    /// Critical impact
    Critical,
}

impl ImpactLevel {
    /// Lowercase name used in JSON and CLI output
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node of the impact graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    /// Entity this node represents
    pub entity: EntityRef,

    /// Business criticality
    pub criticality: Criticality,
}

impl GraphNode {
    /// Create a node with the given criticality
    pub fn new(entity: EntityRef, criticality: Criticality) -> Self {
        Self {
            entity,
            criticality,
        }
    }
}

/// A directed dependency edge: `to` is affected when `from` changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    /// Source entity
    pub from: EntityRef,

    /// Target entity (may be absent from the graph's nodes)
    pub to: EntityRef,

    /// Strength of the dependency
    pub dependency_type: DependencyType,
}

impl GraphEdge {
    /// Create a new edge
    pub fn new(from: EntityRef, to: EntityRef, dependency_type: DependencyType) -> Self {
        Self {
            from,
            to,
            dependency_type,
        }
    }
}
