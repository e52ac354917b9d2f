use anyhow::{Result, anyhow};
use autoscale_cuckoo_filter::CuckooFilter;
use once_cell::sync::Lazy;
use std::sync::RwLock;

use crate::store::identity::IdentityStore;

/// Expected capacity and false-positive rate.
/// Tune these based on real account counts.
const FILTER_CAPACITY: usize = 100_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

static EMAIL_FILTER: Lazy<RwLock<CuckooFilter<String>>> =
    Lazy::new(|| RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)));

#[inline]
fn normalize(email: &str) -> String {
    email.to_lowercase()
}

/// Check if an email might be taken (false positives possible)
pub fn might_exist(email: &str) -> bool {
    let email = normalize(email);
    EMAIL_FILTER
        .read()
        .expect("email filter poisoned")
        .contains(&email)
}

/// Insert a single email into the filter
pub fn insert(email: &str) {
    let email = normalize(email);
    EMAIL_FILTER
        .write()
        .expect("email filter poisoned")
        .add(&email);
}

/// Remove an email from the filter (an upsert changed the address)
pub fn remove(email: &str) {
    let email = normalize(email);
    EMAIL_FILTER
        .write()
        .expect("email filter poisoned")
        .remove(&email);
}

/// Warm up the email filter from the accounts partition, batched
pub async fn warmup_email_filter(identity: &IdentityStore, batch_size: usize) -> Result<()> {
    let accounts = identity
        .list_accounts()
        .map_err(|e| anyhow!("account scan failed: {}", e))?;

    let mut batch = Vec::with_capacity(batch_size);
    let mut total = 0usize;

    for account in accounts {
        batch.push(normalize(&account.email));
        total += 1;

        if batch.len() == batch_size {
            insert_batch(&batch);
            batch.clear();
        }
    }

    if !batch.is_empty() {
        insert_batch(&batch);
    }

    tracing::info!("Email filter warmup complete: {} accounts", total);
    Ok(())
}

/// Insert a batch of normalized emails
fn insert_batch(emails: &[String]) {
    let mut filter = EMAIL_FILTER.write().expect("email filter poisoned");

    for email in emails {
        filter.add(email);
    }
}
