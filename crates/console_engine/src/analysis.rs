use std::sync::Arc;
use std::time::Duration;

use console_core::{ChannelEvent, Frame, ReadyState, SessionId, StreamId};
use console_logging::{console_debug, console_trace, console_warn};
use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::api::FrameStream;
use crate::{ApiError, EngineEvent, EventSink, FailureKind, StreamApi};

/// Pump one analysis channel into the sink until it ends or `cancel` fires.
///
/// Connect failures are reported with `ReadyState::Connecting`, failures
/// after the channel opened with `ReadyState::Open`. After cancellation
/// nothing more is emitted for the session.
pub(crate) async fn stream_analysis(
    api: Arc<dyn StreamApi>,
    session: SessionId,
    stream_id: StreamId,
    idle_timeout: Option<Duration>,
    cancel: CancellationToken,
    sink: Arc<dyn EventSink>,
) {
    let emit = |event: ChannelEvent| sink.emit(EngineEvent::Analysis { session, event });

    let opened = tokio::select! {
        _ = cancel.cancelled() => {
            console_debug!("analysis session {} cancelled while connecting", session);
            return;
        }
        opened = api.open_analysis_channel(stream_id) => opened,
    };
    let mut frames = match opened {
        Ok(frames) => frames,
        Err(err) => {
            console_warn!("analysis channel for stream {} failed: {}", stream_id, err);
            emit(ChannelEvent::Error {
                ready_state: ReadyState::Connecting,
                message: err.to_string(),
            });
            return;
        }
    };

    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => {
                console_debug!("analysis session {} cancelled", session);
                return;
            }
            next = next_frame(&mut frames, idle_timeout) => next,
        };
        match next {
            Some(Ok(Frame::Done)) => {
                emit(ChannelEvent::Frame(Frame::Done));
                return;
            }
            Some(Ok(frame)) => {
                console_trace!("analysis session {} frame {:?}", session, frame);
                emit(ChannelEvent::Frame(frame));
            }
            Some(Err(err)) => {
                console_warn!("analysis session {} broke off: {}", session, err);
                emit(ChannelEvent::Error {
                    ready_state: ReadyState::Open,
                    message: err.to_string(),
                });
                return;
            }
            None => {
                console_debug!("analysis session {} closed by server", session);
                emit(ChannelEvent::Closed);
                return;
            }
        }
    }
}

async fn next_frame(
    frames: &mut FrameStream,
    idle_timeout: Option<Duration>,
) -> Option<Result<Frame, ApiError>> {
    let Some(idle) = idle_timeout else {
        return frames.next().await;
    };
    match tokio::time::timeout(idle, frames.next()).await {
        Ok(next) => next,
        Err(_) => Some(Err(ApiError::new(
            FailureKind::Timeout,
            format!("no event within {}s", idle.as_secs_f32()),
        ))),
    }
}
