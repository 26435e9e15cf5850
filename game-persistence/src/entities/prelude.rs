pub use super::device_sessions::Entity as DeviceSessions;
pub use super::guess_events::Entity as GuessEvents;
pub use super::persons::Entity as Persons;
pub use super::question_events::Entity as QuestionEvents;
pub use super::rounds::Entity as Rounds;
pub use super::usernames::Entity as Usernames;
