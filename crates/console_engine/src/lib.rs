//! Console engine: backend REST client, event-stream decoding and the
//! background thread that executes core effects.
mod analysis;
mod api;
mod engine;
mod monitor;
mod settings;
mod sink;
mod sse;
mod types;
mod wire;

pub use api::{ApiClient, FrameStream, StreamApi};
pub use engine::EngineHandle;
pub use settings::ApiSettings;
pub use sink::{ChannelEventSink, EventSink};
pub use sse::{classify_payload, SseDecoder};
pub use types::{ApiError, EngineEvent, FailureKind, StreamPage};
