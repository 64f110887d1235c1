//! Conversation context for Friday.
//!
//! A bounded, time-expiring window of recent exchanges plus the policy that
//! decides whether to keep listening for a follow-up.

pub mod clock;
pub mod context;
pub mod state;

pub use clock::{Clock, ManualClock, SystemClock};
pub use context::{ContextSnapshot, ConversationContext};
pub use state::ContextPhase;
