use std::sync::Arc;
use std::time::Instant;

use tracing::error;
use tracing_gec_sink::config::GecConfig;
use tracing_gec_sink::layer::GecLayer;
use tracing_gec_sink::noop_sink::NoopSink;
use tracing_gec_sink::types::ErrorTypeRegistry;
use tracing_gec_sink::writer::ErrorRecordWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

fn main() {
    // NoopSink: measures normalization and stack capture without file I/O.
    let config = GecConfig::new("load", "bench", "localhost", "/dev/null");
    let writer = Arc::new(ErrorRecordWriter::with_sink(
        &config,
        ErrorTypeRegistry::default(),
        Arc::new(NoopSink),
    ));
    let subscriber = Registry::default().with(GecLayer::new(Arc::clone(&writer)));
    tracing::subscriber::set_global_default(subscriber).expect("set global subscriber");

    let n: u64 = 10_000;
    let start = Instant::now();

    for i in 0..n {
        error!(iteration = i, "load test error");
    }

    let elapsed = start.elapsed();
    println!("noop sink: recorded {} events in {:?} (~{:.0} ev/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );
}
