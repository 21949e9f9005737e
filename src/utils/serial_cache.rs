use anyhow::Result;
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::time::Duration;

/// true => a pending review entry exists for this serial. Only positives are
/// stored; absence means "ask the database". Attendance rows are never
/// cached here, only the review queue membership.
pub static SERIAL_CACHE: Lazy<Cache<String, bool>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(100_000)
        .time_to_live(Duration::from_secs(86400)) // 24h TTL
        .build()
});

#[inline]
fn normalize(serial_id: &str) -> String {
    serial_id.trim().to_uppercase()
}

pub async fn mark_queued(serial_id: &str) {
    SERIAL_CACHE.insert(normalize(serial_id), true).await;
}

pub async fn is_queued(serial_id: &str) -> bool {
    SERIAL_CACHE.get(&normalize(serial_id)).await.unwrap_or(false)
}

/// Evict after the pending entry is accepted, rejected or deleted.
pub async fn evict(serial_id: &str) {
    SERIAL_CACHE.invalidate(&normalize(serial_id)).await;
}

async fn batch_mark(serials: &[String]) {
    let futures: Vec<_> = serials
        .iter()
        .map(|s| SERIAL_CACHE.insert(normalize(s), true))
        .collect();

    futures::future::join_all(futures).await;
}

/// Load recently detected pending serials into the cache (batched).
pub async fn warmup_serial_cache(pool: &MySqlPool, days: u32, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (String,)>(
        r#"
        SELECT serial_id
        FROM unknown_serial_ids
        WHERE status = 'pending' AND detected_at >= NOW() - INTERVAL ? DAY
        ORDER BY detected_at DESC
        "#,
    )
    .bind(days)
    .fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total_count = 0usize;

    while let Some(row) = stream.next().await {
        let (serial_id,) = row?;
        batch.push(serial_id);
        total_count += 1;

        if batch.len() >= batch_size {
            batch_mark(&batch).await;
            batch.clear();
        }
    }

    if !batch.is_empty() {
        batch_mark(&batch).await;
    }

    log::info!(
        "Serial cache warmup complete: {} pending serials (last {} days)",
        total_count,
        days
    );

    Ok(())
}
