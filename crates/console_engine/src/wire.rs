//! Backend JSON shapes and their mapping onto core types.

use std::collections::BTreeMap;

use console_core::{
    infer_transport_type, CatalogEntry, CreateRequest, GpuLoad, StreamId, StreamRecord,
    SystemSnapshot, TransportType,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ApiError, FailureKind, StreamPage};

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

/// Decode `{ code, message, data }` and return `data` as `T`.
pub(crate) fn decode_envelope<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    let envelope: Envelope = serde_json::from_slice(body)
        .map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))?;

    if let Some(code) = envelope.code {
        if !(200..300).contains(&code) {
            return Err(ApiError::new(
                FailureKind::Backend { code },
                envelope.message.unwrap_or_default(),
            ));
        }
    }

    let data = match envelope.data {
        Some(Value::Null) | None => {
            return Err(ApiError::new(FailureKind::MissingData, "envelope has no data"))
        }
        Some(data) => data,
    };
    serde_json::from_value(data).map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))
}

/// The `message` of an envelope-shaped error body, if there is one.
pub(crate) fn envelope_message(body: &str) -> Option<String> {
    serde_json::from_str::<Envelope>(body)
        .ok()
        .and_then(|envelope| envelope.message)
        .filter(|message| !message.trim().is_empty())
}

#[derive(Debug, Serialize)]
pub(crate) struct ListBody<'a> {
    pub page_num: u32,
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PagedDto {
    #[serde(default)]
    total: u64,
    #[serde(default)]
    records: Vec<StreamDto>,
}

impl From<PagedDto> for StreamPage {
    fn from(dto: PagedDto) -> Self {
        Self {
            total: dto.total,
            records: dto.records.into_iter().map(StreamRecord::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct StreamDto {
    id: StreamId,
    #[serde(default)]
    name: String,
    #[serde(default)]
    stream_path: String,
    #[serde(default)]
    stream_type: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    created_at: Option<serde_json::Number>,
    #[serde(default)]
    scenario_id: Option<i64>,
    #[serde(default)]
    scenario_name: Option<String>,
}

impl From<StreamDto> for StreamRecord {
    fn from(dto: StreamDto) -> Self {
        let transport_type = dto
            .stream_type
            .as_deref()
            .and_then(TransportType::from_tag)
            .unwrap_or_else(|| infer_transport_type(&dto.stream_path));
        let created_at = dto
            .created_at
            .and_then(|n| n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)))
            .unwrap_or_default();
        Self {
            id: dto.id,
            name: dto.name,
            transport_path: dto.stream_path,
            transport_type,
            description: dto.description.filter(|d| !d.is_empty()),
            created_at,
            scenario_id: dto.scenario_id,
            scenario_name: dto.scenario_name,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CatalogDto {
    scenario_id: i64,
    #[serde(default)]
    scenario_name: String,
    #[serde(default)]
    scenario_count: u64,
}

impl From<CatalogDto> for CatalogEntry {
    fn from(dto: CatalogDto) -> Self {
        Self {
            category_id: dto.scenario_id,
            category_name: dto.scenario_name,
            count: dto.scenario_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateBody<'a> {
    name: &'a str,
    description: Option<&'a str>,
    algo_id: Option<i64>,
    scenario_id: i64,
    stream_type: &'static str,
    stream_path: &'a str,
}

impl<'a> From<&'a CreateRequest> for CreateBody<'a> {
    fn from(request: &'a CreateRequest) -> Self {
        Self {
            name: &request.name,
            description: request.description.as_deref(),
            algo_id: request.algo_id,
            scenario_id: request.scenario_id,
            stream_type: request.stream_type.as_str(),
            stream_path: &request.stream_path,
        }
    }
}

/// `create` answers with the new id; some deployments return the full row.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum CreatedDto {
    Id(StreamId),
    Record { id: StreamId },
}

impl CreatedDto {
    pub(crate) fn id(&self) -> StreamId {
        match self {
            CreatedDto::Id(id) | CreatedDto::Record { id } => *id,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct MemoryDto {
    #[serde(default)]
    total_gb: f64,
    #[serde(default)]
    used_gb: f64,
    #[serde(default)]
    percent: f64,
}

#[derive(Debug, Deserialize)]
struct GpuDto {
    #[serde(default)]
    name: String,
    #[serde(default)]
    load_percent: f64,
    #[serde(default)]
    memory_percent: f64,
}

#[derive(Debug, Default, Deserialize)]
struct HostDto {
    #[serde(default)]
    hostname: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SystemInfoDto {
    #[serde(default)]
    cpu_percent: f64,
    #[serde(default)]
    cpu_cores: u32,
    #[serde(default)]
    load_avg: Vec<f64>,
    #[serde(default)]
    memory: MemoryDto,
    /// Keyed by GPU index as a string.
    #[serde(default)]
    gpu: Option<BTreeMap<String, GpuDto>>,
    #[serde(default)]
    system: HostDto,
}

impl From<SystemInfoDto> for SystemSnapshot {
    fn from(dto: SystemInfoDto) -> Self {
        let mut gpus: Vec<(String, GpuDto)> = dto.gpu.unwrap_or_default().into_iter().collect();
        gpus.sort_by(|(a, _), (b, _)| match (a.parse::<u32>(), b.parse::<u32>()) {
            (Ok(a), Ok(b)) => a.cmp(&b),
            _ => a.cmp(b),
        });
        Self {
            hostname: dto.system.hostname,
            cpu_percent: dto.cpu_percent,
            cpu_cores: dto.cpu_cores,
            load_avg: dto.load_avg,
            memory_percent: dto.memory.percent,
            memory_used_gb: dto.memory.used_gb,
            memory_total_gb: dto.memory.total_gb,
            gpus: gpus
                .into_iter()
                .map(|(_, gpu)| GpuLoad {
                    name: gpu.name,
                    load_percent: gpu.load_percent,
                    memory_percent: gpu.memory_percent,
                })
                .collect(),
        }
    }
}
