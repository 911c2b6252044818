//! Query Builder ORDER BY operations

use super::builder::{Query, SelectMode};
use super::types::{OrderDirection, OrderSpec};
use crate::model::Entity;

impl<E: Entity, S: SelectMode> Query<E, S> {
    /// Order by `field`. Ordering on a field that is already ordered replaces
    /// its direction and keeps its original position.
    pub fn order_by(mut self, field: E::Field, direction: OrderDirection) -> Self {
        match self.order_by.iter_mut().find(|spec| spec.field == field) {
            Some(existing) => existing.direction = direction,
            None => self.order_by.push(OrderSpec { field, direction }),
        }
        self
    }

    /// Shorthand for `order_by(field, OrderDirection::Asc)`
    pub fn order_by_asc(self, field: E::Field) -> Self {
        self.order_by(field, OrderDirection::Asc)
    }

    /// Shorthand for `order_by(field, OrderDirection::Desc)`
    pub fn order_by_desc(self, field: E::Field) -> Self {
        self.order_by(field, OrderDirection::Desc)
    }
}
