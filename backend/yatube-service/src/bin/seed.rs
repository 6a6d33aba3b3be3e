//! Seed groups and an optional user into the Yatube database
//! Run with: cargo run --bin seed
//!
//! Environment:
//! - `DATABASE_URL`
//! - `YATUBE_SEED_GROUPS`: `slug|Title|Description` entries separated by `;`
//! - `YATUBE_SEED_USERNAME` / `YATUBE_SEED_PASSWORD`: optional account

use std::sync::Arc;

use anyhow::Context;
use db_pool::{create_pool, DbConfig};
use yatube_service::db::{PgStore, Store};
use yatube_service::models::UserPayload;
use yatube_service::services::{GroupService, UserService};
use yatube_service::AppError;

const DEFAULT_GROUPS: &str =
    "cats|Cats|Everything about cats;books|Books|What we are reading;travel|Travel|Trips and places";

struct GroupSeed {
    slug: String,
    title: String,
    description: String,
}

fn parse_groups(raw: &str) -> anyhow::Result<Vec<GroupSeed>> {
    raw.split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let mut parts = entry.splitn(3, '|');
            let slug = parts.next().unwrap_or_default().trim();
            let title = parts
                .next()
                .map(str::trim)
                .with_context(|| format!("group entry '{}' has no title", entry))?;
            let description = parts.next().unwrap_or_default().trim();
            Ok(GroupSeed {
                slug: slug.to_string(),
                title: title.to_string(),
                description: description.to_string(),
            })
        })
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .init();

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://localhost/yatube".to_string());

    println!("Connecting to database...");
    let pool = create_pool(DbConfig {
        service_name: "yatube-seed".to_string(),
        database_url,
        max_connections: 1,
        ..DbConfig::default()
    })
    .await
    .context("failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run migrations")?;
    println!("Connected and migrated.");

    let store: Arc<dyn Store> = Arc::new(PgStore::new(pool));

    let raw = std::env::var("YATUBE_SEED_GROUPS").unwrap_or_else(|_| DEFAULT_GROUPS.to_string());
    let groups = GroupService::new(store.clone());
    for seed in parse_groups(&raw)? {
        match groups.create(&seed.title, &seed.slug, &seed.description).await {
            Ok(group) => println!("Created group #{} '{}'", group.id, group.slug),
            Err(AppError::Validation(errors)) => {
                println!("Skipped group '{}': {}", seed.slug, errors)
            }
            Err(e) => return Err(anyhow::anyhow!("failed to create group '{}': {}", seed.slug, e)),
        }
    }

    if let Ok(username) = std::env::var("YATUBE_SEED_USERNAME") {
        let password = std::env::var("YATUBE_SEED_PASSWORD")
            .context("YATUBE_SEED_PASSWORD is required with YATUBE_SEED_USERNAME")?;
        let users = UserService::new(store.clone());
        match users
            .register(UserPayload {
                username: Some(Some(username.clone())),
                password: Some(Some(password)),
            })
            .await
        {
            Ok(user) => println!("Created user #{} '{}'", user.id, user.username),
            Err(AppError::Validation(errors)) => {
                println!("Skipped user '{}': {}", username, errors)
            }
            Err(e) => return Err(anyhow::anyhow!("failed to create user '{}': {}", username, e)),
        }
    }

    println!("\n========================================");
    println!("Seed complete");
    println!("========================================");
    Ok(())
}
