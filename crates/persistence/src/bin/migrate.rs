#![deny(warnings)]

use persistence::{default_sqlite_url, list_documents, RESPONSES, SESSIONS, SESSION_STATES};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| default_sqlite_url().to_string());
    let pool = persistence::init_db(&url).await?;
    let sessions = list_documents(&pool, SESSIONS).await?.len();
    let responses = list_documents(&pool, RESPONSES).await?.len();
    let states = list_documents(&pool, SESSION_STATES).await?.len();
    println!(
        "DB migrated at {} | sessions: {} | responses: {} | participants: {}",
        url, sessions, responses, states
    );
    Ok(())
}
