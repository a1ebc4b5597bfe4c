use std::error::Error;

use tracing::{error, info, info_span, warn};
use tracing_gec_sink::config::GecConfig;
use tracing_gec_sink::context;
use tracing_gec_sink::init::init_tracing;

#[derive(Debug, thiserror::Error)]
#[error("order {order_id} could not be priced")]
struct PricingError {
    order_id: u64,
    #[source]
    source: std::num::ParseIntError,
}

fn main() -> Result<(), Box<dyn Error>> {
    // GEC_PROJECT and GEC_OUTPUT_DIR are required; fall back to a demo setup.
    let config = GecConfig::from_env().unwrap_or_else(|_| {
        GecConfig::new("demo-shop", "dev", "localhost", std::env::temp_dir().join("gec"))
    });
    let writer = init_tracing(&config)?;

    info!(dir = %config.output_directory.display(), "writing error records");

    context::put("requestId", "req-1234");
    let span = info_span!("checkout", user_id = 42);
    let _entered = span.enter();

    warn!("inventory service slow");
    error!("payment provider rejected card");

    let err = PricingError {
        order_id: 7,
        source: "12a".parse::<u32>().unwrap_err(),
    };
    error!(error = &err as &dyn Error, "checkout failed");
    context::clear();

    println!(
        "written={} failed={}",
        writer.written_records.load(std::sync::atomic::Ordering::Relaxed),
        writer.failed_records.load(std::sync::atomic::Ordering::Relaxed),
    );
    Ok(())
}
