use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemorySubmissionRepository};
use crate::routes::with_registration_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use student_intake::config::{AppConfig, AppEnvironment};
use student_intake::error::AppError;
use student_intake::telemetry;
use student_intake::workflows::registration::RegistrationService;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(data_file) = args.data_file.take() {
        config.registration.data_file = Some(data_file);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = match &config.registration.data_file {
        Some(path) => InMemorySubmissionRepository::open(path)?,
        None => {
            if config.environment != AppEnvironment::Test {
                warn!("no data file configured; submissions are lost on restart");
            }
            InMemorySubmissionRepository::default()
        }
    };

    let access = config.admin_access();
    if access.is_open() {
        warn!("APP_ADMIN_TOKEN not set; staff routes are unauthenticated");
    }

    let settings = config.registration_settings();
    info!(
        strategy = ?settings.codes.strategy,
        policy = ?settings.codes.policy,
        media = settings.media.base_url(),
        "registration service configured"
    );
    let service = Arc::new(RegistrationService::new(Arc::new(repository), settings));

    let app = with_registration_routes(service, access)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "student intake service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
