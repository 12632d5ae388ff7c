use std::sync::Arc;
use std::time::Duration;

use console_logging::console_debug;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::{EngineEvent, EventSink, StreamApi};

const MIN_INTERVAL: Duration = Duration::from_millis(100);

/// Poll system info once right away, then every `interval`, until cancelled.
pub(crate) async fn poll_system(
    api: Arc<dyn StreamApi>,
    interval: Duration,
    cancel: CancellationToken,
    sink: Arc<dyn EventSink>,
) {
    let mut ticker = tokio::time::interval(interval.max(MIN_INTERVAL));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }
        let sample = tokio::select! {
            _ = cancel.cancelled() => break,
            sample = api.system_info() => sample,
        };
        sink.emit(EngineEvent::SystemSample(sample));
    }
    console_debug!("system monitor poller stopped");
}
