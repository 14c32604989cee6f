//! Graceful shutdown of background tasks.

use log::warn;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use crate::config::PROGRESS_SHUTDOWN_TIMEOUT;

/// Stops the progress reporter and waits for it to exit.
///
/// The task gets [`PROGRESS_SHUTDOWN_TIMEOUT`] to notice the cancellation;
/// after that it is aborted.
pub async fn shutdown_gracefully(cancel: CancellationToken, progress_task: Option<JoinHandle<()>>) {
    cancel.cancel();
    let Some(mut progress_task) = progress_task else {
        return;
    };

    match timeout(PROGRESS_SHUTDOWN_TIMEOUT, &mut progress_task).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("Progress reporter ended abnormally: {e}"),
        Err(_) => {
            warn!("Progress reporter did not stop in time, aborting it");
            progress_task.abort();
        }
    }
}
