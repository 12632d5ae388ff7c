use console_app::event_to_msg;
use console_app::render::{format_created_at, system_line};
use console_core::{ChannelEvent, FilterKey, Frame, GpuLoad, Msg, PageRequest, SystemSnapshot};
use console_engine::{ApiError, EngineEvent, FailureKind, StreamPage};
use pretty_assertions::assert_eq;

fn request() -> PageRequest {
    PageRequest {
        epoch: 2,
        page: 3,
        page_size: 12,
        filter: FilterKey::category(1),
    }
}

#[test]
fn page_results_keep_epoch_and_page() {
    let loaded = event_to_msg(EngineEvent::PageLoaded {
        request: request(),
        result: Ok(StreamPage {
            records: Vec::new(),
            total: 40,
        }),
    });
    assert_eq!(
        loaded,
        Msg::PageLoaded {
            epoch: 2,
            page: 3,
            records: Vec::new(),
            total: 40,
        }
    );

    let failed = event_to_msg(EngineEvent::PageLoaded {
        request: request(),
        result: Err(ApiError {
            kind: FailureKind::HttpStatus(502),
            message: "Bad Gateway".to_string(),
        }),
    });
    assert_eq!(
        failed,
        Msg::PageFailed {
            epoch: 2,
            page: 3,
            message: "http status 502: Bad Gateway".to_string(),
        }
    );
}

#[test]
fn analysis_events_pass_through_untouched() {
    let event = ChannelEvent::Frame(Frame::Data("car".to_string()));
    assert_eq!(
        event_to_msg(EngineEvent::Analysis {
            session: 9,
            event: event.clone(),
        }),
        Msg::AnalysisEvent { session: 9, event }
    );
}

#[test]
fn created_at_renders_as_utc_minutes() {
    assert_eq!(format_created_at(1_700_000_000), "2023-11-14 22:13");
    assert_eq!(format_created_at(0), "-");
}

#[test]
fn system_line_lists_gpus() {
    let snapshot = SystemSnapshot {
        hostname: "edge-01".to_string(),
        cpu_percent: 12.0,
        cpu_cores: 4,
        load_avg: vec![0.5],
        memory_percent: 50.0,
        memory_used_gb: 4.0,
        memory_total_gb: 8.0,
        gpus: vec![GpuLoad {
            name: "gpu0".to_string(),
            load_percent: 80.0,
            memory_percent: 40.0,
        }],
    };
    assert_eq!(
        system_line(&snapshot),
        "edge-01 cpu 12.0% (4 cores, load 0.50) mem 50.0% (4.0/8.0 GB) | gpu0 80% mem 40%"
    );
}
