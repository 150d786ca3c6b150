// src/core/model/mod.rs
//! In-memory code relationship model: entities, their members and the
//! relationships between them, plus the scenarios built from call edges.

mod entity;
mod relative;
mod scenario;

pub use entity::{Entity, EntityKind, Field, Method, Visibility};
pub use relative::{RelationshipType, Relative};
pub use scenario::{Interaction, Scenario};
