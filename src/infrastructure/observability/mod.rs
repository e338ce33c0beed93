//! Observability infrastructure - Prometheus metrics

mod metrics;

pub use metrics::{
    create_metrics_router, init_metrics, record_admission, record_extraction,
    record_http_request, record_upload_rejected, PrometheusMetrics,
};
