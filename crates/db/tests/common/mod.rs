//! Shared setup for the repository integration tests.
//!
//! Each test gets its own in-memory SQLite database with the full schema.
//! The pool holds exactly one connection: every `sqlite::memory:`
//! connection is a separate database.

#![allow(dead_code)]

use rust_decimal_macros::dec;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use procura_core::request::{NewPurchaseRequest, NewRequestItem};
use procura_core::workflow::UserRole;
use procura_db::migration::{Migrator, MigratorTrait};
use procura_db::{
    AttachmentRepository, NewUser, PurchaseRequestRepository, UserRepository, WorkflowRepository,
};
use procura_shared::types::{RequestId, UserId};

pub async fn setup_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(opts)
        .await
        .expect("Failed to open in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

/// One user per role, plus a second staff member.
pub struct Users {
    pub staff: UserId,
    pub other_staff: UserId,
    pub approver1: UserId,
    pub approver2: UserId,
    pub finance: UserId,
    pub admin: UserId,
}

pub struct TestContext {
    pub db: DatabaseConnection,
    pub users: Users,
    pub user_repo: UserRepository,
    pub requests: PurchaseRequestRepository,
    pub workflow: WorkflowRepository,
    pub attachments: AttachmentRepository,
}

impl TestContext {
    pub async fn new() -> Self {
        let db = setup_db().await;
        let user_repo = UserRepository::new(db.clone());

        let users = Users {
            staff: create_user(&user_repo, "alice", UserRole::Staff).await,
            other_staff: create_user(&user_repo, "bob", UserRole::Staff).await,
            approver1: create_user(&user_repo, "carol", UserRole::Approver1).await,
            approver2: create_user(&user_repo, "dave", UserRole::Approver2).await,
            finance: create_user(&user_repo, "erin", UserRole::Finance).await,
            admin: create_user(&user_repo, "root", UserRole::Admin).await,
        };

        Self {
            requests: PurchaseRequestRepository::new(db.clone()),
            workflow: WorkflowRepository::new(db.clone()),
            attachments: AttachmentRepository::new(db.clone()),
            user_repo,
            users,
            db,
        }
    }

    /// Creates the standard sample request as `staff`.
    pub async fn submit_sample(&self) -> RequestId {
        let detail = self
            .requests
            .create(self.users.staff, sample_request())
            .await
            .expect("Failed to create request");
        RequestId::from_uuid(detail.request.id)
    }
}

pub async fn create_user(repo: &UserRepository, username: &str, role: UserRole) -> UserId {
    let user = repo
        .create(NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            full_name: format!("{username} (test)"),
            role,
        })
        .await
        .expect("Failed to create user");
    UserId::from_uuid(user.id)
}

/// A 2900.00 request with two line items.
pub fn sample_request() -> NewPurchaseRequest {
    NewPurchaseRequest {
        title: "Office Equipment Purchase".to_string(),
        description: "New laptops and office chairs for the development team".to_string(),
        amount: dec!(2900.00),
        quantity: 4,
        department: Some("IT".to_string()),
        vendor_name: Some("TechCorp Solutions".to_string()),
        category: Some("hardware".to_string()),
        urgency: Some("high".to_string()),
        items: vec![
            NewRequestItem {
                item_name: "Laptop Computer".to_string(),
                price: dec!(1200.00),
                quantity: 2,
            },
            NewRequestItem {
                item_name: "Office Chair".to_string(),
                price: dec!(250.00),
                quantity: 2,
            },
        ],
    }
}
