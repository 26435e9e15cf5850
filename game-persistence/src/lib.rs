pub mod connection;
pub mod entities;
pub mod repositories;

use sea_orm::{DatabaseConnection, DbErr};

use repositories::{PersonRepository, RoundRepository, SessionRepository, UsernameRepository};

/// Owns the connection and hands out repositories over it
#[derive(Clone)]
pub struct DatabaseManager {
    connection: DatabaseConnection,
}

impl DatabaseManager {
    pub async fn connect(database_url: &str) -> Result<Self, DbErr> {
        let connection = connection::connect_and_migrate(database_url).await?;
        Ok(Self { connection })
    }

    pub fn from_connection(connection: DatabaseConnection) -> Self {
        Self { connection }
    }

    pub fn persons(&self) -> PersonRepository {
        PersonRepository::new(self.connection.clone())
    }

    pub fn rounds(&self) -> RoundRepository {
        RoundRepository::new(self.connection.clone())
    }

    pub fn sessions(&self) -> SessionRepository {
        SessionRepository::new(self.connection.clone())
    }

    pub fn usernames(&self) -> UsernameRepository {
        UsernameRepository::new(self.connection.clone())
    }
}
