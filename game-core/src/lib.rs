pub mod answer;
pub mod catalog;
pub mod device;
pub mod disclosure;
pub mod guess;
pub mod intent;
pub mod leaderboard;
pub mod normalize;
pub mod round;
pub mod session;

// Re-export main components
pub use answer::*;
pub use catalog::*;
pub use device::*;
pub use disclosure::*;
pub use guess::*;
pub use intent::*;
pub use leaderboard::*;
pub use normalize::*;
pub use round::*;
pub use session::*;
