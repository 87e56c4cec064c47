//! Client-side state shared across commands: who is logged in, and which
//! project is open.
//!
//! Both contexts are plain values mutated through `&mut self` and mirrored
//! into an injected [`StateStore`](crate::store::StateStore).

mod project;
mod session;

pub use project::{FetchTicket, ProjectContext, ProjectState, PROJECT_CONTEXT_KEY};
pub use session::{SessionContext, SessionError};
