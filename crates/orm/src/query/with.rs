//! Query Builder relationship requests

use super::builder::{Query, SelectMode};
use crate::error::{ModelError, ModelResult};
use crate::model::Entity;
use crate::relationships::RelationshipDescriptor;

impl<E: Entity, S: SelectMode> Query<E, S> {
    /// Request a relationship to be batch-loaded after the base query.
    /// Requesting the same name twice is a no-op.
    pub fn with(mut self, relationship: &'static str) -> Self {
        self.relations.insert(relationship);
        self
    }

    /// Returns true if `relationship` was requested
    pub fn has_relation(&self, relationship: &str) -> bool {
        self.relations.contains(relationship)
    }

    /// Requested relationship names, sorted
    pub fn relations(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.relations.iter().copied()
    }

    /// Descriptors of the requested relationships in the entity's declared
    /// order; fails on any name the entity does not declare
    pub(crate) fn requested_relationships(&self) -> ModelResult<Vec<&'static RelationshipDescriptor>> {
        if let Some(unknown) = self
            .relations
            .iter()
            .find(|name| E::relationship(name).is_none())
        {
            return Err(ModelError::UnknownRelationship {
                entity: E::table_name().to_string(),
                name: unknown.to_string(),
            });
        }

        Ok(E::relationships()
            .iter()
            .filter(|rel| self.relations.contains(rel.name))
            .collect())
    }
}
