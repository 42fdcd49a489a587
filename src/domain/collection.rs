//! Pure operations on an in-memory collection: id assignment, upsert, removal.

use super::entities::ContentEntity;
use super::error::DomainError;

/// How [`upsert`] placed the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Inserted,
    Replaced { position: usize },
}

/// Next identifier for an insert: one more than the largest id present, or 1
/// for an empty collection.
pub fn next_id<E: ContentEntity>(items: &[E]) -> Result<u64, DomainError> {
    let max = items.iter().map(ContentEntity::id).max().unwrap_or(0);
    max.checked_add(1)
        .ok_or_else(|| DomainError::invariant(format!("{} id space exhausted", E::KIND)))
}

/// Replace the entry sharing `entity`'s id in place, or assign a fresh id and
/// append. Returns the entity as stored.
pub fn upsert<E: ContentEntity>(
    items: &mut Vec<E>,
    mut entity: E,
) -> Result<(E, Placement), DomainError> {
    if let Some(position) = items.iter().position(|item| item.id() == entity.id()) {
        items[position] = entity.clone();
        return Ok((entity, Placement::Replaced { position }));
    }

    entity.set_id(next_id(items)?);
    items.push(entity.clone());
    Ok((entity, Placement::Inserted))
}

/// Drop every entry with `id`. Returns whether anything was removed.
pub fn remove_by_id<E: ContentEntity>(items: &mut Vec<E>, id: u64) -> bool {
    let before = items.len();
    items.retain(|item| item.id() != id);
    items.len() != before
}
