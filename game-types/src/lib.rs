pub mod admin;
pub mod errors;
pub mod leaderboard;
pub mod person;
pub mod requests;
pub mod round;
pub mod session;

// Re-export all types
pub use admin::*;
pub use errors::*;
pub use leaderboard::*;
pub use person::*;
pub use requests::*;
pub use round::*;
pub use session::*;

/// Maximum number of questions a session may ask in one round.
pub const MAX_QUESTIONS: u32 = 20;

pub type RoundId = String;
pub type SessionId = String;
pub type PersonId = String;
