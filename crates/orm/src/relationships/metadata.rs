//! Relationship descriptors

use serde::Serialize;

/// Kind of association between a source entity and a target table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RelationshipKind {
    HasMany,
    HasOne,
    BelongsTo,
    ManyToMany,
}

impl RelationshipKind {
    /// Returns true if each parent may own several target rows
    pub fn is_collection(self) -> bool {
        matches!(self, Self::HasMany | Self::ManyToMany)
    }

    /// Returns true if loading goes through a junction table
    pub fn requires_pivot(self) -> bool {
        matches!(self, Self::ManyToMany)
    }
}

/// Junction table of a many-to-many relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PivotTable {
    pub table: &'static str,
    /// Junction column referencing the source's `local_key`
    pub source_key: &'static str,
    /// Junction column referencing the target's `foreign_key`
    pub target_key: &'static str,
}

/// Static description of one relationship of an entity.
///
/// Key meaning per kind:
/// - `HasMany` / `HasOne`: `foreign_key` is on the target, `local_key` on the source.
/// - `BelongsTo`: inverted; `foreign_key` is on the source and references the
///   target's `local_key`.
/// - `ManyToMany`: `local_key` is on the source, `foreign_key` is the target
///   column the junction's `target_key` references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RelationshipDescriptor {
    /// Accessor name used by `with` and by the result accessors
    pub name: &'static str,
    pub kind: RelationshipKind,
    pub target_table: &'static str,
    /// Target columns in the target entity's declared order
    pub target_columns: &'static [&'static str],
    pub foreign_key: &'static str,
    pub local_key: &'static str,
    pub pivot: Option<PivotTable>,
}

impl RelationshipDescriptor {
    /// Target rows reference the source through `foreign_key`
    pub const fn has_many(
        name: &'static str,
        target_table: &'static str,
        target_columns: &'static [&'static str],
        foreign_key: &'static str,
        local_key: &'static str,
    ) -> Self {
        Self {
            name,
            kind: RelationshipKind::HasMany,
            target_table,
            target_columns,
            foreign_key,
            local_key,
            pivot: None,
        }
    }

    /// Like `has_many`, with at most one target row per source
    pub const fn has_one(
        name: &'static str,
        target_table: &'static str,
        target_columns: &'static [&'static str],
        foreign_key: &'static str,
        local_key: &'static str,
    ) -> Self {
        Self {
            kind: RelationshipKind::HasOne,
            ..Self::has_many(name, target_table, target_columns, foreign_key, local_key)
        }
    }

    /// `foreign_key` lives on the source and points at the target's `owner_key`
    pub const fn belongs_to(
        name: &'static str,
        target_table: &'static str,
        target_columns: &'static [&'static str],
        foreign_key: &'static str,
        owner_key: &'static str,
    ) -> Self {
        Self {
            kind: RelationshipKind::BelongsTo,
            ..Self::has_many(name, target_table, target_columns, foreign_key, owner_key)
        }
    }

    /// Source and target linked through the `pivot` junction table
    pub const fn many_to_many(
        name: &'static str,
        target_table: &'static str,
        target_columns: &'static [&'static str],
        pivot: PivotTable,
        target_key: &'static str,
        local_key: &'static str,
    ) -> Self {
        Self {
            kind: RelationshipKind::ManyToMany,
            pivot: Some(pivot),
            ..Self::has_many(name, target_table, target_columns, target_key, local_key)
        }
    }

    /// Column on the parent record whose value selects the related rows
    pub fn parent_key(&self) -> &'static str {
        match self.kind {
            RelationshipKind::BelongsTo => self.foreign_key,
            _ => self.local_key,
        }
    }

    /// Qualified column the batch query filters on and groups by
    pub fn match_column(&self) -> String {
        match (self.kind, self.pivot) {
            (RelationshipKind::ManyToMany, Some(pivot)) => {
                format!("{}.{}", pivot.table, pivot.source_key)
            }
            (RelationshipKind::BelongsTo, _) => format!("{}.{}", self.target_table, self.local_key),
            _ => format!("{}.{}", self.target_table, self.foreign_key),
        }
    }
}
