use actix_cors::Cors;
use actix_web::{App, HttpServer, http::header, web};
use anyhow::Context;
use compiler_gateway::application::auth_service::CredentialStore;
use compiler_gateway::application::compile_service::CompileProxy;
use compiler_gateway::data::postgres::PostgresUserRepository;
use compiler_gateway::infrastructure::compiler_client::HttpCompiler;
use compiler_gateway::infrastructure::config::{Config, HttpConfig};
use compiler_gateway::infrastructure::logging::init_logging;
use compiler_gateway::presentation::handlers::AppState;
use compiler_gateway::presentation::middleware::{
    CatchPanicMiddleware, REQUEST_ID_HEADER, RequestIdMiddleware, TimingMiddleware,
};
use compiler_gateway::presentation::routes;
use std::sync::Arc;
use tracing::{debug, info, warn};

fn cors(http: &HttpConfig) -> Cors {
    match &http.cors_allowed_origin {
        Some(origin) => Cors::default()
            .allowed_origin(origin)
            .allowed_methods(vec!["GET", "POST"])
            .allowed_header(header::CONTENT_TYPE)
            .expose_headers(vec![REQUEST_ID_HEADER])
            .max_age(3600),
        None => Cors::default(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv_result = dotenv::dotenv();

    let config = Config::from_env().context("failed to load configuration")?;

    init_logging(config.env);
    if let Err(e) = dotenv_result {
        warn!(error = %e, "No .env file loaded, using process environment only");
    }
    info!(env = %config.env, "Starting compiler gateway");
    debug!("Debug messages enabled");

    info!("Connecting to user store");
    let repository = PostgresUserRepository::connect(&config.database).await?;
    repository.init_schema().await?;
    let credentials = CredentialStore::new(Arc::new(repository));

    info!(endpoint = %config.compiler.endpoint, "Creating compiler client");
    let compiler = HttpCompiler::new(&config.compiler).context("failed to build HTTP client")?;
    let compile_proxy = CompileProxy::new(Arc::new(compiler));

    let state = web::Data::new(AppState {
        compile_proxy,
        credentials,
    });

    let http = config.http.clone();
    let cors_config = http.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(CatchPanicMiddleware)
            .wrap(TimingMiddleware)
            .wrap(RequestIdMiddleware)
            .wrap(cors(&cors_config))
            .configure(routes::configure)
    })
    .client_request_timeout(http.timeout)
    .keep_alive(http.idle_timeout)
    .bind(&http.address)
    .with_context(|| format!("failed to bind {}", http.address))?;

    info!(
        address = %http.address,
        routes = %"GET /health, POST /run, POST /users, GET /users, POST /users/login",
        "Starting HTTP server"
    );
    server.run().await?;

    warn!("Server stopped");
    Ok(())
}
