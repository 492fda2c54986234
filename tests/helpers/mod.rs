#![allow(dead_code)]
#![allow(unused_imports)]
pub mod test_db;

pub use test_db::*;

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::{Arc, Mutex};

use printdesk::bootstrap::{build_services, Services};
use printdesk::config::Config;
use printdesk::domain::entities::{NewUser, Session, User, UserRole};
use printdesk::domain::ports::{Clock, UserRepository};
use printdesk::infrastructure::http::middleware::AuthenticatedUser;
use printdesk::infrastructure::persistence::Database;

/// Clock pinned to an instant the test controls.
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn at(now: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(now),
        })
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now = *now + by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// 09:00 in Kolkata on a Monday.
pub fn business_morning() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 4, 3, 30, 0).unwrap()
}

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        admin_username: "admin".to_string(),
        admin_password: "Adm1n!Passw0rd".to_string(),
        session_duration_hours: 9,
        frontend_url: "https://printdesk.test".to_string(),
        business_timezone: chrono_tz::Asia::Kolkata,
        sla_check_interval_minutes: 15,
        otel_exporter_endpoint: None,
        service_name: "printdesk-test".to_string(),
        metrics_port: 0,
    }
}

/// Services over a fresh database, reading time from a fixed clock.
pub struct TestApp {
    pub test_db: TestDb,
    pub clock: Arc<FixedClock>,
    pub services: Services,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::starting_at(business_morning()).await
    }

    pub async fn starting_at(now: DateTime<Utc>) -> Self {
        let test_db = TestDb::new().await;
        let clock = FixedClock::at(now);
        let services = build_services(test_db.db.clone(), &test_config(), clock.clone());
        Self {
            test_db,
            clock,
            services,
        }
    }

    pub fn db(&self) -> &Database {
        &self.test_db.db
    }

    pub fn clock_now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub async fn user(&self, username: &str, role: UserRole) -> User {
        create_test_user(self.db(), username, role).await
    }

    pub async fn caller(&self, username: &str, role: UserRole) -> AuthenticatedUser {
        let user = self.user(username, role).await;
        as_caller(&user)
    }

    /// Types of the notifications `user_id` has received, newest first.
    pub async fn notification_types(&self, user_id: i64) -> Vec<String> {
        self.services
            .state
            .notification_service
            .list_notifications(user_id, false, Some(100), None)
            .await
            .expect("Failed to list notifications")
            .notifications
            .into_iter()
            .map(|n| n.notification_type.as_str().to_string())
            .collect()
    }
}

pub async fn create_test_user(db: &Database, username: &str, role: UserRole) -> User {
    db.create_user(&NewUser {
        username: username.to_string(),
        email: None,
        full_name: format!("{} {}", role, username),
        role,
        password_hash: "test_hash".to_string(),
    })
    .await
    .expect("Failed to create test user")
}

pub fn as_caller(user: &User) -> AuthenticatedUser {
    let token = format!("token-{}", user.id);
    AuthenticatedUser {
        user: user.clone(),
        session: Session::new(user.id, token.clone(), 9),
        token,
    }
}
