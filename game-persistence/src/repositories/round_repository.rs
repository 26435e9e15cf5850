use anyhow::Result;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue::Set, DatabaseConnection, EntityTrait};
use tracing::{info, warn};

use super::person_repository::model_to_person;
use crate::entities::{prelude::*, rounds};
use game_core::{PersonCatalog, Round};
use game_types::{AssignRoundRequest, GameError, Person, RoundAssignment, RoundStatus};

pub struct RoundRepository {
    db: DatabaseConnection,
}

fn parse_status(value: Option<&str>) -> Option<RoundStatus> {
    let value = value?;
    let status = RoundStatus::parse(value);
    if status.is_none() {
        warn!("Ignoring unknown round status override '{}'", value);
    }
    status
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

impl RoundRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Freeze the person for a round the first time anyone plays it.
    /// A row that already exists keeps its assignment.
    pub async fn ensure_round(&self, round: &Round, person: &Person, now: DateTime<Utc>) -> Result<()> {
        let model = rounds::ActiveModel {
            id: Set(round.id()),
            person_id: Set(person.id.clone()),
            opens_at: Set(round.opens_at),
            closes_at: Set(round.closes_at),
            status_override: Set(None),
            hint_text: Set(non_empty(Some(person.hint.clone()))),
            created_at: Set(now),
        };

        let inserted = Rounds::insert(model)
            .on_conflict(
                OnConflict::column(rounds::Column::Id)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        if inserted > 0 {
            info!("Round {} assigned to {}", round.id(), person.id);
        }
        Ok(())
    }

    pub async fn status_override(&self, round_id: &str) -> Result<Option<RoundStatus>> {
        let row = Rounds::find_by_id(round_id.to_string()).one(&self.db).await?;
        Ok(row.and_then(|row| parse_status(row.status_override.as_deref())))
    }

    pub async fn get_assignment(&self, round_id: &str) -> Result<Option<RoundAssignment>> {
        let Some(row) = Rounds::find_by_id(round_id.to_string()).one(&self.db).await? else {
            return Ok(None);
        };
        let person = Persons::find_by_id(row.person_id.clone()).one(&self.db).await?;

        Ok(Some(RoundAssignment {
            round_id: row.id,
            person_id: row.person_id,
            person_name: person.map(|p| p.display_name),
            hint_text: row.hint_text,
            status_override: parse_status(row.status_override.as_deref()),
            opens_at: row.opens_at.timestamp_millis(),
            closes_at: row.closes_at.timestamp_millis(),
        }))
    }

    /// Create or replace the assignment of a round
    pub async fn assign(
        &self,
        round_id: &str,
        window: (DateTime<Utc>, DateTime<Utc>),
        request: AssignRoundRequest,
        now: DateTime<Utc>,
    ) -> Result<RoundAssignment> {
        let person = Persons::find_by_id(request.person_id.clone())
            .one(&self.db)
            .await?
            .ok_or(GameError::PersonNotFound)?;

        let (opens_at, closes_at) = window;
        let hint_text = non_empty(request.hint_text);
        let status_override = request.status_override;

        let model = rounds::ActiveModel {
            id: Set(round_id.to_string()),
            person_id: Set(person.id.clone()),
            opens_at: Set(opens_at),
            closes_at: Set(closes_at),
            status_override: Set(status_override.map(|s| s.as_str().to_string())),
            hint_text: Set(hint_text.clone()),
            created_at: Set(now),
        };

        Rounds::insert(model)
            .on_conflict(
                OnConflict::column(rounds::Column::Id)
                    .update_columns([
                        rounds::Column::PersonId,
                        rounds::Column::OpensAt,
                        rounds::Column::ClosesAt,
                        rounds::Column::StatusOverride,
                        rounds::Column::HintText,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        info!("Round {} reassigned to {}", round_id, person.id);
        Ok(RoundAssignment {
            round_id: round_id.to_string(),
            person_id: person.id,
            person_name: Some(person.display_name),
            hint_text,
            status_override,
            opens_at: opens_at.timestamp_millis(),
            closes_at: closes_at.timestamp_millis(),
        })
    }

    /// Person for a round: the stored assignment when there is one, the
    /// catalog's hashed pick otherwise. Matching data missing from the stored
    /// person is filled from the catalog pick.
    pub async fn resolve_person(&self, round_id: &str, catalog: &PersonCatalog) -> Result<Person> {
        let fallback = catalog.assigned_for(round_id);

        let Some(row) = Rounds::find_by_id(round_id.to_string()).one(&self.db).await? else {
            return Ok(fallback.clone());
        };

        let stored = Persons::find_by_id(row.person_id.clone()).one(&self.db).await?;
        let mut person = match stored.map(model_to_person) {
            Some(person) => person,
            None => {
                warn!(
                    "Round {} points at missing person {}, using catalog",
                    round_id, row.person_id
                );
                fallback.clone()
            }
        };

        if person.aliases.is_empty() && person.id == fallback.id {
            person.aliases = fallback.aliases.clone();
        }
        if person.yes_keywords.is_empty() && person.no_keywords.is_empty() && person.id == fallback.id {
            person.yes_keywords = fallback.yes_keywords.clone();
            person.no_keywords = fallback.no_keywords.clone();
        }
        if person.image_url.is_empty() {
            person.image_url = fallback.image_url.clone();
        }
        if let Some(hint) = non_empty(row.hint_text) {
            person.hint = hint;
        }

        Ok(person)
    }
}
