use crate::infrastructure::config::AppEnv;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_logging(env: AppEnv) {
    // RUST_LOG wins over the per-environment default
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(env.default_log_level()));

    let registry = tracing_subscriber::registry().with(filter);

    match env {
        AppEnv::Local => registry.with(fmt::layer().pretty()).init(),
        AppEnv::Dev | AppEnv::Prod => registry.with(fmt::layer().json()).init(),
    }
}
