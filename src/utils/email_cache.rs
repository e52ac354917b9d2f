use anyhow::{Result, anyhow};
use moka::future::Cache;
use once_cell::sync::Lazy;
use std::time::Duration;

use crate::store::identity::IdentityStore;

/// true  => email is TAKEN
/// false => email is AVAILABLE (usually we store only taken)
pub static EMAIL_CACHE: Lazy<Cache<String, bool>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(500_000) // tune based on memory
        .time_to_live(Duration::from_secs(86400)) // 24h TTL
        .build()
});

/// Mark a single email as taken
pub async fn mark_taken(email: &str) {
    EMAIL_CACHE.insert(email.to_lowercase(), true).await;
}

/// Check if an email is taken
pub async fn is_taken(email: &str) -> bool {
    EMAIL_CACHE.get(&email.to_lowercase()).await.unwrap_or(false)
}

/// Drop an email from the cache (an upsert changed the address)
pub async fn forget(email: &str) {
    EMAIL_CACHE.invalidate(&email.to_lowercase()).await;
}

/// Batch mark emails as taken
async fn batch_mark(emails: &[String]) {
    let futures: Vec<_> = emails
        .iter()
        .map(|email| EMAIL_CACHE.insert(email.to_lowercase(), true))
        .collect();

    // Await all insertions concurrently
    futures::future::join_all(futures).await;
}

/// Load every stored account email into the in-memory cache (batched)
pub async fn warmup_email_cache(identity: &IdentityStore, batch_size: usize) -> Result<()> {
    let accounts = identity
        .list_accounts()
        .map_err(|e| anyhow!("account scan failed: {}", e))?;

    let mut batch = Vec::with_capacity(batch_size);
    let mut total_count = 0usize;

    for account in accounts {
        batch.push(account.email);
        total_count += 1;

        if batch.len() >= batch_size {
            batch_mark(&batch).await;
            batch.clear();
        }
    }

    // Insert any remaining emails
    if !batch.is_empty() {
        batch_mark(&batch).await;
    }

    tracing::info!("Email cache warmup complete: {} accounts", total_count);

    Ok(())
}
