use anyhow::{Result, anyhow};
use autoscale_cuckoo_filter::CuckooFilter;
use futures::StreamExt;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::sync::RwLock;

/// Expected number of distinct unknown badges and false-positive rate.
/// A handful of unregistered badges per office is the norm, so this is
/// generous.
const FILTER_CAPACITY: usize = 50_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

static SERIAL_FILTER: Lazy<RwLock<CuckooFilter<String>>> =
    Lazy::new(|| RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)));

#[inline]
fn normalize(serial_id: &str) -> String {
    serial_id.trim().to_uppercase()
}

/// Whether the serial might already sit in the review queue. False positives
/// possible; a `false` is definitive and lets the gateway skip the lookup.
pub fn might_be_queued(serial_id: &str) -> bool {
    let serial_id = normalize(serial_id);
    SERIAL_FILTER
        .read()
        .expect("serial filter poisoned")
        .contains(&serial_id)
}

/// Record a newly queued serial in the filter.
pub fn insert(serial_id: &str) {
    let serial_id = normalize(serial_id);
    SERIAL_FILTER
        .write()
        .expect("serial filter poisoned")
        .add(&serial_id);
}

/// Drop a serial whose pending entry was resolved or deleted.
pub fn remove(serial_id: &str) {
    let serial_id = normalize(serial_id);
    SERIAL_FILTER
        .write()
        .expect("serial filter poisoned")
        .remove(&serial_id);
}

/// Warm up the filter from the pending queue using streaming + batching.
pub async fn warmup_serial_filter(pool: &MySqlPool, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (String,)>(
        "SELECT serial_id FROM unknown_serial_ids WHERE status = 'pending'",
    )
    .fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total = 0usize;

    while let Some(row) = stream.next().await {
        let (serial_id,) = row.map_err(|e| anyhow!("DB row fetch failed: {}", e))?;

        batch.push(normalize(&serial_id));
        total += 1;

        if batch.len() == batch_size {
            insert_batch(&batch);
            batch.clear();
        }
    }

    if !batch.is_empty() {
        insert_batch(&batch);
    }

    log::info!("Serial filter warmup complete: {} pending serials", total);
    Ok(())
}

fn insert_batch(serials: &[String]) {
    let mut filter = SERIAL_FILTER.write().expect("serial filter poisoned");

    for serial_id in serials {
        filter.add(serial_id);
    }
}
