use chrono::{DateTime, Utc};
use tracing::info;

use crate::auth::AdminAuth;
use crate::error::ServiceError;
use crate::validation;
use game_core::RoundCalculator;
use game_persistence::DatabaseManager;
use game_types::{
    AssignRoundRequest, CreatePersonRequest, CreatedPerson, GameError, PersonSummary,
    RoundAssignment, SubmissionList,
};

/// Persons, round assignments and submission review behind the admin token
pub struct AdminService {
    db: DatabaseManager,
    auth: AdminAuth,
    calculator: RoundCalculator,
}

impl AdminService {
    pub fn new(db: DatabaseManager, auth: AdminAuth, calculator: RoundCalculator) -> Self {
        Self {
            db,
            auth,
            calculator,
        }
    }

    pub fn authorize(&self, authorization: Option<&str>) -> Result<(), ServiceError> {
        self.auth.authorize(authorization)?;
        Ok(())
    }

    pub async fn list_persons(&self) -> Result<Vec<PersonSummary>, ServiceError> {
        Ok(self.db.persons().list().await?)
    }

    pub async fn create_person(
        &self,
        request: CreatePersonRequest,
        now: DateTime<Utc>,
    ) -> Result<CreatedPerson, ServiceError> {
        let request = validation::create_person(request)?;
        let created = self.db.persons().create(request, now).await?;
        info!("Created person {} ({})", created.id, created.display_name);
        Ok(created)
    }

    pub async fn get_round(&self, round_id: &str) -> Result<RoundAssignment, ServiceError> {
        let key = validation::round_id(round_id)?;
        self.db
            .rounds()
            .get_assignment(&key.to_string())
            .await?
            .ok_or(ServiceError::Game(GameError::RoundNotFound))
    }

    pub async fn assign_round(
        &self,
        round_id: &str,
        request: AssignRoundRequest,
        now: DateTime<Utc>,
    ) -> Result<RoundAssignment, ServiceError> {
        let key = validation::round_id(round_id)?;
        let request = validation::assign_round(request)?;

        let assignment = self
            .db
            .rounds()
            .assign(&key.to_string(), self.calculator.window(key), request, now)
            .await?;
        info!(
            "Round {} assigned to person {}",
            assignment.round_id, assignment.person_id
        );
        Ok(assignment)
    }

    pub async fn list_submissions(
        &self,
        round_id: Option<&str>,
        limit: Option<u64>,
        flagged_only: bool,
    ) -> Result<SubmissionList, ServiceError> {
        let round_id = match round_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(round_id) => Some(validation::round_id(round_id)?.to_string()),
            None => None,
        };
        let limit = validation::submission_limit(limit)?;

        let events = self
            .db
            .sessions()
            .list_submissions(round_id.as_deref(), limit, flagged_only)
            .await?;
        Ok(SubmissionList { round_id, events })
    }
}
