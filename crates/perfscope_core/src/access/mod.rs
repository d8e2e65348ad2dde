//! Visibility and ownership decisions.
//!
//! # Responsibility
//! - Turn an actor plus request parameters into an effective [`scope::Scope`].
//! - Decide whether one actor may read or mutate attachment metadata.
//!
//! # Invariants
//! - Decisions are pure functions of already-loaded records.
//! - Cross-actor access is granted only through `Role::can_act_as_manager`.
//! - A non-manager can never widen their own scope through request
//!   parameters.

pub mod scope;
pub mod upload_guard;

use crate::model::actor::{Actor, ActorId};

/// Whether `actor` is `owner_id` or may act as a manager over them.
pub fn owns_or_manages(actor: &Actor, owner_id: ActorId) -> bool {
    actor.id == owner_id || actor.can_act_as_manager()
}
