use tokio::select;
use tokio_util::sync::CancellationToken;

/// Turns an interrupt into a teardown of the editing session. An
/// interrupted editor abandons its pending autosave; only the graceful
/// end-of-input path flushes.
pub async fn cancel_on_interrupt(cancellation: CancellationToken) {
    select! {
        _ = tokio::signal::ctrl_c() => {
            cancellation.cancel();
        },
    };
}
