use anyhow::Result;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue::Set, DatabaseConnection, EntityTrait, QueryOrder, QuerySelect};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::entities::{persons, prelude::*};
use game_core::{slugify, split_csv};
use game_types::{CreatePersonRequest, CreatedPerson, Person, PersonSummary};

/// Admin listings never return more rows than this
pub const PERSON_LIST_LIMIT: u64 = 200;

/// Matching data kept in `persons.metadata_json`
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct PersonMetadata {
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub yes_keywords: Vec<String>,
    #[serde(default)]
    pub no_keywords: Vec<String>,
}

impl PersonMetadata {
    pub(crate) fn parse(json: Option<&str>) -> Self {
        json.and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default()
    }
}

pub(crate) fn model_to_person(model: persons::Model) -> Person {
    let metadata = PersonMetadata::parse(model.metadata_json.as_deref());
    Person {
        id: model.id,
        display_name: model.display_name,
        reveal_text: model.reveal_text,
        image_url: model.image_url.unwrap_or_default(),
        aliases: metadata.aliases,
        hint: model.hint_text,
        yes_keywords: metadata.yes_keywords,
        no_keywords: metadata.no_keywords,
        is_icelander: model.is_icelander,
    }
}

pub struct PersonRepository {
    db: DatabaseConnection,
}

impl PersonRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn active_model(person: &Person, slug: String, now: DateTime<Utc>) -> Result<persons::ActiveModel> {
        let metadata = PersonMetadata {
            aliases: person.aliases.clone(),
            yes_keywords: person.yes_keywords.clone(),
            no_keywords: person.no_keywords.clone(),
        };

        Ok(persons::ActiveModel {
            id: Set(person.id.clone()),
            display_name: Set(person.display_name.clone()),
            slug: Set(slug),
            reveal_text: Set(person.reveal_text.clone()),
            image_url: Set(Some(person.image_url.clone()).filter(|url| !url.is_empty())),
            hint_text: Set(person.hint.clone()),
            is_icelander: Set(person.is_icelander),
            metadata_json: Set(Some(serde_json::to_string(&metadata)?)),
            created_at: Set(now),
        })
    }

    /// Insert the built-in catalog. Existing rows are left untouched.
    pub async fn seed_defaults(&self, defaults: &[Person], now: DateTime<Utc>) -> Result<u64> {
        let models = defaults
            .iter()
            .map(|person| Self::active_model(person, person.id.clone(), now))
            .collect::<Result<Vec<_>>>()?;

        if models.is_empty() {
            return Ok(0);
        }

        let inserted = Persons::insert_many(models)
            .on_conflict(
                OnConflict::column(persons::Column::Id)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        if inserted > 0 {
            info!("Seeded {} default persons", inserted);
        }
        Ok(inserted)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Person>> {
        let model = Persons::find_by_id(id.to_string()).one(&self.db).await?;
        Ok(model.map(model_to_person))
    }

    /// Newest first
    pub async fn list(&self) -> Result<Vec<PersonSummary>> {
        let rows = Persons::find()
            .order_by_desc(persons::Column::CreatedAt)
            .order_by_asc(persons::Column::Id)
            .limit(PERSON_LIST_LIMIT)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| PersonSummary {
                id: row.id,
                display_name: row.display_name,
                reveal_text: row.reveal_text,
                image_url: row.image_url.unwrap_or_default(),
                created_at: row.created_at.timestamp_millis(),
            })
            .collect())
    }

    pub async fn create(&self, request: CreatePersonRequest, now: DateTime<Utc>) -> Result<CreatedPerson> {
        let id = Uuid::new_v4().to_string();
        let slug = format!("{}-{}", slugify(&request.display_name), &id[..8]);

        let person = Person {
            id: id.clone(),
            display_name: request.display_name.trim().to_string(),
            reveal_text: request.reveal_text.trim().to_string(),
            image_url: request.image_url.trim().to_string(),
            aliases: split_csv(request.aliases_csv.as_deref()),
            hint: request
                .hint
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
            yes_keywords: split_csv(request.yes_keywords_csv.as_deref()),
            no_keywords: split_csv(request.no_keywords_csv.as_deref()),
            is_icelander: request.is_icelander,
        };

        Persons::insert(Self::active_model(&person, slug, now)?)
            .exec(&self.db)
            .await?;

        info!("Created person {} ({})", person.display_name, person.id);
        Ok(CreatedPerson {
            id,
            display_name: person.display_name,
        })
    }
}
