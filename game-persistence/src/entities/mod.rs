pub mod prelude;

pub mod device_sessions;
pub mod guess_events;
pub mod persons;
pub mod question_events;
pub mod rounds;
pub mod usernames;
