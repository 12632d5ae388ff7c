use std::collections::VecDeque;
use std::path::Path;
use std::pin::Pin;

use bytes::Bytes;
use console_core::{
    CatalogEntry, CreateRequest, FilterKey, Frame, StreamId, SystemSnapshot,
};
use console_logging::{console_debug, console_warn};
use futures_util::stream::{self, Stream};
use futures_util::StreamExt;
use reqwest::header::ACCEPT;
use reqwest::multipart::{Form, Part};
use url::Url;

use crate::sse::{classify_payload, SseDecoder};
use crate::wire::{
    decode_envelope, envelope_message, CatalogDto, CreateBody, CreatedDto, ListBody, PagedDto,
    SystemInfoDto,
};
use crate::{ApiError, ApiSettings, FailureKind, StreamPage};

/// Frames of one analysis channel, in arrival order. The stream ends when
/// the server closes the connection.
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<Frame, ApiError>> + Send>>;

type ByteStream = Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>;

/// The backend operations the console needs.
#[async_trait::async_trait]
pub trait StreamApi: Send + Sync {
    async fn list_streams(
        &self,
        page: u32,
        page_size: u32,
        filter: &FilterKey,
    ) -> Result<StreamPage, ApiError>;

    async fn list_catalog(&self) -> Result<Vec<CatalogEntry>, ApiError>;

    /// Store a local file on the backend and return the path it was stored under.
    async fn upload_asset(&self, source: &Path) -> Result<String, ApiError>;

    async fn create_stream(&self, request: &CreateRequest) -> Result<StreamId, ApiError>;

    async fn resolve_playback_url(&self, id: StreamId) -> Result<String, ApiError>;

    async fn system_info(&self) -> Result<SystemSnapshot, ApiError>;

    async fn open_analysis_channel(&self, id: StreamId) -> Result<FrameStream, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    base: Url,
    settings: ApiSettings,
    client: reqwest::Client,
    /// No overall deadline: analysis channels stay open as long as the server talks.
    stream_client: reqwest::Client,
}

impl ApiClient {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        let base = Url::parse(&settings.base_url)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::new(
                FailureKind::InvalidUrl,
                format!("{} cannot be used as a base url", settings.base_url),
            ));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        let stream_client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self {
            base,
            settings,
            client,
            stream_client,
        })
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::new(FailureKind::InvalidUrl, "base url cannot have a path"))?
            .pop_if_empty()
            .extend(path.split('/').filter(|segment| !segment.is_empty()));
        Ok(url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Bytes, ApiError> {
        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            let detail = response
                .text()
                .await
                .ok()
                .and_then(|body| envelope_message(&body))
                .unwrap_or_else(|| status.to_string());
            return Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                detail,
            ));
        }
        response.bytes().await.map_err(map_reqwest_error)
    }
}

#[async_trait::async_trait]
impl StreamApi for ApiClient {
    async fn list_streams(
        &self,
        page: u32,
        page_size: u32,
        filter: &FilterKey,
    ) -> Result<StreamPage, ApiError> {
        let url = match filter.category_id() {
            Some(category) => self.endpoint(&format!("stream/list-by-scenario/{category}"))?,
            None => self.endpoint("stream/list")?,
        };
        let body = ListBody {
            page_num: page,
            page_size,
            keyword: filter.keyword(),
        };
        console_debug!("POST {} page={} size={}", url, page, page_size);
        let bytes = self
            .send(self.client.post(url).json(&body))
            .await
            .inspect_err(|err| console_warn!("listing page {} failed: {}", page, err))?;
        decode_envelope::<PagedDto>(&bytes).map(StreamPage::from)
    }

    async fn list_catalog(&self) -> Result<Vec<CatalogEntry>, ApiError> {
        let url = self.endpoint("stream/catalog")?;
        console_debug!("GET {}", url);
        let bytes = self.send(self.client.get(url)).await?;
        let entries: Vec<CatalogDto> = decode_envelope(&bytes)?;
        Ok(entries.into_iter().map(CatalogEntry::from).collect())
    }

    async fn upload_asset(&self, source: &Path) -> Result<String, ApiError> {
        let metadata = tokio::fs::metadata(source)
            .await
            .map_err(|err| io_error(source, err))?;
        if metadata.len() > self.settings.max_upload_bytes {
            return Err(ApiError::new(
                FailureKind::TooLarge {
                    max_bytes: self.settings.max_upload_bytes,
                    actual: metadata.len(),
                },
                source.display().to_string(),
            ));
        }
        let contents = tokio::fs::read(source)
            .await
            .map_err(|err| io_error(source, err))?;
        let file_name = source
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload")
            .to_string();

        let url = self.endpoint("stream/upload")?;
        console_debug!("POST {} file={} bytes={}", url, file_name, contents.len());
        let form = Form::new().part("file", Part::bytes(contents).file_name(file_name));
        let bytes = self
            .send(self.client.post(url).multipart(form))
            .await
            .inspect_err(|err| console_warn!("upload of {} failed: {}", source.display(), err))?;
        decode_envelope(&bytes)
    }

    async fn create_stream(&self, request: &CreateRequest) -> Result<StreamId, ApiError> {
        let url = self.endpoint("stream/create")?;
        console_debug!("POST {} name={}", url, request.name);
        let bytes = self
            .send(self.client.post(url).json(&CreateBody::from(request)))
            .await
            .inspect_err(|err| console_warn!("create of {} failed: {}", request.name, err))?;
        decode_envelope::<CreatedDto>(&bytes).map(|created| created.id())
    }

    async fn resolve_playback_url(&self, id: StreamId) -> Result<String, ApiError> {
        let url = self.endpoint(&format!("stream/view/{id}"))?;
        console_debug!("GET {}", url);
        let bytes = self.send(self.client.get(url)).await?;
        decode_envelope(&bytes)
    }

    async fn system_info(&self) -> Result<SystemSnapshot, ApiError> {
        let url = self.endpoint("system-monitor/system/info")?;
        let bytes = self.send(self.client.get(url)).await?;
        decode_envelope::<SystemInfoDto>(&bytes).map(SystemSnapshot::from)
    }

    async fn open_analysis_channel(&self, id: StreamId) -> Result<FrameStream, ApiError> {
        let url = self.endpoint(&format!("stream/analysis/{id}"))?;
        console_debug!("GET {} (event stream)", url);
        let response = self
            .stream_client
            .get(url)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        Ok(frames(
            Box::pin(response.bytes_stream()),
            SseDecoder::with_limit(self.settings.max_event_bytes),
        ))
    }
}

struct FrameReader {
    bytes: Option<ByteStream>,
    decoder: SseDecoder,
    pending: VecDeque<Frame>,
    failed: Option<ApiError>,
}

/// Decode a raw body into frames as chunks arrive. A trailing event without
/// its terminating blank line is dropped. Frames decoded before an error are
/// yielded first; the stream ends after the error.
fn frames(bytes: ByteStream, decoder: SseDecoder) -> FrameStream {
    let reader = FrameReader {
        bytes: Some(bytes),
        decoder,
        pending: VecDeque::new(),
        failed: None,
    };
    Box::pin(stream::unfold(reader, |mut reader| async move {
        loop {
            if let Some(frame) = reader.pending.pop_front() {
                return Some((Ok(frame), reader));
            }
            if let Some(err) = reader.failed.take() {
                reader.bytes = None;
                return Some((Err(err), reader));
            }
            match reader.bytes.as_mut()?.next().await {
                Some(Ok(chunk)) => {
                    let mut payloads = Vec::new();
                    let fed = reader.decoder.feed(&chunk, &mut payloads);
                    reader
                        .pending
                        .extend(payloads.into_iter().map(classify_payload));
                    reader.failed = fed.err();
                }
                Some(Err(err)) => reader.failed = Some(map_reqwest_error(err)),
                None => return None,
            }
        }
    }))
}

fn io_error(path: &Path, err: std::io::Error) -> ApiError {
    ApiError::new(FailureKind::Io, format!("{}: {err}", path.display()))
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_builder() {
        return ApiError::new(FailureKind::InvalidUrl, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
