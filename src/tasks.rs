use std::sync::LazyLock;

use log::info;
use tokio::spawn;
use tokio_util::task::TaskTracker;

/// Tracks background document and transcription tasks so shutdown can drain
/// them instead of tearing the runtime down underneath them.
pub static TASK_TRACKER: LazyLock<TaskTracker> = LazyLock::new(TaskTracker::new);

pub fn shutdown_tasks() {
    let tracker = TASK_TRACKER.clone();
    info!("waiting for {} background task(s)", tracker.len());
    tracker.close();
    spawn(async move {
        tracker.wait().await;
        info!("background tasks finished");
    });
}
