//! Destination integrity bracket.
//!
//! Before the first table, foreign-key and uniqueness enforcement and
//! autocommit are turned off on the destination session. After the last
//! table, or after a failure, enforcement is turned back on and the session
//! commits. Without a destination (dry run) every step is a no-op.

use crate::db::Destination;
use crate::error::MigrateResult;
use tracing::{info, warn};

/// Turn destination enforcement off.
pub async fn disable(destination: Option<&mut (dyn Destination + '_)>) -> MigrateResult<()> {
    let Some(dest) = destination else {
        return Ok(());
    };
    dest.disable_constraints().await?;
    info!("Destination constraints disabled");
    Ok(())
}

/// Turn destination enforcement back on and commit.
///
/// The commit is attempted even when re-enabling fails; the first error is
/// returned.
pub async fn restore(destination: Option<&mut (dyn Destination + '_)>) -> MigrateResult<()> {
    let Some(dest) = destination else {
        return Ok(());
    };

    let enabled = dest.enable_constraints().await;
    let committed = dest.commit().await;
    enabled?;
    committed?;

    info!("Destination constraints restored");
    Ok(())
}

/// Restore the destination after `result` and return `result`.
///
/// A restore failure only surfaces when the run itself succeeded; otherwise it
/// is logged and the run's error is returned.
pub async fn restore_after<T>(
    destination: Option<&mut (dyn Destination + '_)>,
    result: MigrateResult<T>,
) -> MigrateResult<T> {
    let restored = restore(destination).await;
    match (result, restored) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => Err(e),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(restore_err)) => {
            warn!(error = %restore_err, "Failed to restore destination constraints");
            Err(e)
        }
    }
}
