use geoledger::client::local_db::{LocalDatabase, LocalReplicaStore, CUSTOMERS_KEY};
use geoledger::client::offline::SyncQueue;
use geoledger::client::Config;
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Database file from the first argument, else from the environment
    let path = match std::env::args().nth(1) {
        Some(path) => PathBuf::from(path),
        None => Config::from_env()?.database_path(),
    };

    println!("🔍 INSPECTING LOCAL STORE");
    println!("=========================");
    println!("Database: {}", path.display());

    if !path.exists() {
        println!("❌ No local database at that path");
        println!("💡 Set GEOLEDGER_DATA_DIR or pass the database file as an argument");
        return Ok(());
    }

    let db = Arc::new(LocalDatabase::open(&path).await?);
    let stats = db.get_stats().await?;
    println!("\n📊 Documents: {}", stats.document_count);
    println!("👥 Customers in replica: {}", stats.customer_count);
    println!("📬 Queued changes: {}", stats.pending_operations);

    match db.get_last_sync_time().await? {
        Some(at) => println!("🕒 Last sync: {}", at.to_rfc3339()),
        None => println!("⚠️  Never synced"),
    }

    let replica = LocalReplicaStore::new(db.clone());
    let customers = replica.get(CUSTOMERS_KEY).await?.unwrap_or_default();
    let unconfirmed = customers.iter().filter(|c| c.id.is_temp()).count();
    if unconfirmed > 0 {
        println!("\n⏳ {} customers not yet confirmed by the server", unconfirmed);
    }

    let queue = SyncQueue::new(db);
    let queued = queue.all().await?;
    if !queued.is_empty() {
        println!("\n📋 Sync queue (oldest first):");
        for entry in &queued {
            let intent = &entry.intent;
            print!(
                "   {} {:?} {} (attempts: {})",
                intent.operation_id, intent.kind, intent.target_id, entry.attempts
            );
            match &entry.last_error {
                Some(error) => println!(" ❌ {}", error),
                None => println!(),
            }
        }
    }

    Ok(())
}
