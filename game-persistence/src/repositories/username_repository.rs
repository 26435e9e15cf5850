use anyhow::Result;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, SqlErr,
};
use tracing::info;

use crate::entities::{prelude::*, usernames};
use game_core::normalize_username;
use game_types::GameError;

pub struct UsernameRepository {
    db: DatabaseConnection,
}

impl UsernameRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get(&self, device_hash: &str) -> Result<Option<String>> {
        let row = Usernames::find_by_id(device_hash.to_string())
            .one(&self.db)
            .await?;
        Ok(row.map(|row| row.username))
    }

    /// Claim a username for a device, replacing its previous one. Names are
    /// unique after normalization across devices.
    pub async fn set(&self, device_hash: &str, username: &str, now: DateTime<Utc>) -> Result<String> {
        let username = username.trim().to_string();
        let normalized = normalize_username(&username);

        let holder = Usernames::find()
            .filter(usernames::Column::UsernameNormalized.eq(normalized.as_str()))
            .one(&self.db)
            .await?;
        if holder.is_some_and(|row| row.device_id_hash != device_hash) {
            return Err(GameError::UsernameTaken.into());
        }

        let model = usernames::ActiveModel {
            device_id_hash: Set(device_hash.to_string()),
            username: Set(username.clone()),
            username_normalized: Set(normalized),
            updated_at: Set(now),
        };

        let result = Usernames::insert(model)
            .on_conflict(
                OnConflict::column(usernames::Column::DeviceIdHash)
                    .update_columns([
                        usernames::Column::Username,
                        usernames::Column::UsernameNormalized,
                        usernames::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await;

        match result {
            Ok(_) => {
                info!("Username set to '{}'", username);
                Ok(username)
            }
            // Lost a race for the same name
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(GameError::UsernameTaken.into())
            }
            Err(err) => Err(err.into()),
        }
    }
}
