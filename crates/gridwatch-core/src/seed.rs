//! First-start bootstrap of the line registry.

use gridwatch_types::NewLine;
use tracing::{debug, info};

use crate::store::{LineRegistry, StoreError};

/// Insert `lines` if the registry is empty.
///
/// Returns the number of lines inserted; zero when the registry already
/// held data. Running it again is a no-op.
///
/// # Errors
///
/// Returns the store error if the registry cannot be counted or written.
pub async fn seed_lines<R: LineRegistry>(registry: &R, lines: &[NewLine]) -> Result<u64, StoreError> {
    let existing = registry.count().await?;
    if existing > 0 {
        debug!(existing, "Registry already populated, skipping seed");
        return Ok(0);
    }

    info!(count = lines.len(), "No lines found, seeding initial data");
    let inserted = registry.insert_many(lines).await?;
    info!(inserted, "Initial lines seeded");
    Ok(inserted)
}
