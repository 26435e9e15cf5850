pub mod person_repository;
pub mod round_repository;
pub mod session_repository;
pub mod username_repository;

pub use person_repository::PersonRepository;
pub use round_repository::RoundRepository;
pub use session_repository::SessionRepository;
pub use username_repository::UsernameRepository;
