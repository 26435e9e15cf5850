#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use game_core::PersonCatalog;
use game_persistence::{DatabaseManager, connection::connect_to_memory_database};
use game_server::admin::AdminService;
use game_server::auth::AdminAuth;
use game_server::game_service::{GameService, GameSettings};
use game_types::{Person, SessionView, StartSessionRequest};

pub const ADMIN_TOKEN: &str = "test-admin-token";
pub const ROUND_ID: &str = "2024-05-01";

/// 2024-05-01 at the given UTC hour and minute
pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, hour, minute, 0).unwrap()
}

/// Inside the open window of 2024-05-01
pub fn open_time() -> DateTime<Utc> {
    at(13, 0)
}

pub fn assigned_person(round_id: &str) -> Person {
    PersonCatalog::default().assigned_for(round_id).clone()
}

pub fn forced_settings() -> GameSettings {
    GameSettings {
        force_round_open: true,
        ..GameSettings::default()
    }
}

/// Game and admin services over a fresh in-memory database
pub struct TestServerSetup {
    pub db: DatabaseManager,
    pub game: Arc<GameService>,
    pub admin: Arc<AdminService>,
}

impl TestServerSetup {
    pub async fn new() -> Self {
        Self::with_settings(GameSettings::default(), Some(ADMIN_TOKEN)).await
    }

    pub async fn with_settings(settings: GameSettings, admin_token: Option<&str>) -> Self {
        let connection = connect_to_memory_database()
            .await
            .expect("in-memory database");
        let db = DatabaseManager::from_connection(connection);

        let game = GameService::new(db.clone(), settings);
        game.prepare(open_time()).await.expect("seed persons");
        let admin = AdminService::new(db.clone(), AdminAuth::new(admin_token), settings.calculator);

        Self {
            db,
            game: Arc::new(game),
            admin: Arc::new(admin),
        }
    }

    pub fn from_game(db: DatabaseManager, game: GameService) -> Self {
        let calculator = game.settings().calculator;
        Self {
            admin: Arc::new(AdminService::new(
                db.clone(),
                AdminAuth::new(Some(ADMIN_TOKEN)),
                calculator,
            )),
            db,
            game: Arc::new(game),
        }
    }

    pub async fn start_session(&self, device_id: &str, now: DateTime<Utc>) -> SessionView {
        self.game
            .start_session(
                StartSessionRequest {
                    device_id: Some(device_id.to_string()),
                    ..StartSessionRequest::default()
                },
                now,
            )
            .await
            .expect("start session")
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
