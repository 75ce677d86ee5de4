//! Ownership rules for mutating forum content

use uuid::Uuid;

/// Whether `actor` may update or delete a resource owned by `owner`.
///
/// Callers turn a `false` into their own forbidden error.
pub fn can_mutate(actor: Uuid, owner: Uuid) -> bool {
    actor == owner
}
