use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus exporter and register all application metrics.
/// Returns a `PrometheusHandle` whose `render()` method produces the
/// text/plain Prometheus scrape payload.
pub fn init_metrics() -> PrometheusHandle {
    let builder = PrometheusBuilder::new();
    let handle = builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // Pre-register counters so they appear even before the first increment.
    counter!("trades_ingested_total").absolute(0);
    counter!("trades_duplicate_total").absolute(0);
    counter!("trades_rejected_total").absolute(0);
    counter!("trades_unavailable_total").absolute(0);
    counter!("alerts_emitted_total").absolute(0);
    counter!("markets_settled_total").absolute(0);
    counter!("positions_settled_total").absolute(0);
    counter!("settlements_refused_total").absolute(0);

    // Pre-register gauges at zero.
    gauge!("open_positions").set(0.0);

    // Histogram is lazily created on first record; force creation.
    histogram!("ledger_apply_seconds").record(0.0);

    handle
}
