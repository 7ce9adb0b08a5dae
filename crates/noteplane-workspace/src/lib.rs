//! Noteplane Workspace: tenant context, note board, and the refresh
//! pipeline tying them to the identity context.
//!
//! [`Workspace`] is the entry point: it owns all three contexts and runs
//! each mutation as mutate → invalidate → refetch (see [`refresh`]).

mod error;
pub mod notes;
pub mod refresh;
pub mod tenant;
pub mod workspace;

pub use notes::{NoteBoard, NoteService};
pub use refresh::{Mutation, Stale};
pub use tenant::{TenantContext, TenantService};
pub use workspace::Workspace;
