use std::{process, sync::Arc};

use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

use vetrina::{
    application::{
        error::AppError,
        repos::{ProfileLinksRepo, SessionsRepo, TemplateStore},
        sessions::SessionService,
        templates::{CustomizerRegistry, PublicProfileService, SelectionService, TemplateService},
    },
    cache::{CacheTier, LocalTier, RedisTier, TierChain},
    config::{self, Settings},
    infra::{db::PostgresStore, error::InfraError, http, telemetry},
};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    let command = cli
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Migrate(_) => run_migrate(settings).await,
    }
}

async fn run_serve(settings: Settings) -> Result<(), AppError> {
    let store = Arc::new(connect_store(&settings).await?);

    let mut tiers: Vec<Arc<dyn CacheTier>> = Vec::new();
    match settings.cache.redis_url.as_deref() {
        Some(url) => match RedisTier::connect(url, settings.cache.redis_op_timeout) {
            Ok(tier) => tiers.push(Arc::new(tier)),
            Err(error) => {
                warn!(error = %error, "redis tier unavailable at startup, continuing with the local tier only");
            }
        },
        None => info!("no redis url configured, using the local tier only"),
    }
    tiers.push(Arc::new(LocalTier::new(settings.cache.local_staleness)));
    let chain = TierChain::new(tiers);

    let templates = Arc::new(TemplateService::new(
        store.clone() as Arc<dyn TemplateStore>,
        chain.clone(),
        settings.cache.session_capacity,
        settings.cache.flight_wait_cap,
    ));
    let selection = SelectionService::new(chain);
    let public_profiles = PublicProfileService::new(
        store.clone() as Arc<dyn ProfileLinksRepo>,
        store.clone() as Arc<dyn TemplateStore>,
    );
    let sessions = SessionService::new(
        store.clone() as Arc<dyn SessionsRepo>,
        settings.auth.profile_lookup_cap,
    );

    let state = http::ApiState {
        sessions,
        templates,
        selection,
        public_profiles,
        customizer: Arc::new(CustomizerRegistry::new()),
    };

    http::serve(settings.server.addr, state).await
}

async fn run_migrate(settings: Settings) -> Result<(), AppError> {
    let store = connect_store(&settings).await?;
    store.run_migrations().await.map_err(AppError::from)?;
    info!("migrations applied");
    Ok(())
}

async fn connect_store(settings: &Settings) -> Result<PostgresStore, AppError> {
    let url = settings.database.url.as_deref().ok_or_else(|| {
        AppError::from(InfraError::configuration(
            "database.url is required, set it in vetrina.toml or VETRINA__DATABASE__URL",
        ))
    })?;
    Ok(PostgresStore::connect(url, settings.database.max_connections.get()).await?)
}
