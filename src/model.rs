pub mod focus;
pub mod session;

pub use session::{AnimState, SwitcherSession, TrackedItem};
