// File: services/mindmend_backend/src/app.rs
use axum::{routing::get, Router};
use mindmend_common::{MindmendError, ScheduleStore};
use mindmend_config::AppConfig;
use mindmend_scheduling::{routes as scheduling_routes, SchedulingState};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Builds the full application router: scheduling routes under `/api`, plus
/// Swagger UI at `/api/docs` when the `openapi` feature is enabled.
pub fn build_router(
    config: Arc<AppConfig>,
    store: Arc<dyn ScheduleStore>,
) -> Result<Router, MindmendError> {
    let state = Arc::new(SchedulingState::new(config, store)?);

    let api_router = Router::new()
        .route("/", get(|| async { "Welcome to the MindMend API!" }))
        .merge(scheduling_routes(state));

    #[allow(unused_mut)] // only mutated with the openapi feature
    let mut app = Router::new().nest("/api", api_router);

    #[cfg(feature = "openapi")]
    {
        use mindmend_scheduling::doc::SchedulingApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "MindMend API",
                version = "0.1.0",
                description = "Therapist scheduling and cancellation refunds",
                license(name = "MIT", url = "https://opensource.org/licenses/MIT")
            ),
            servers((url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(SchedulingApiDoc::openapi());
        tracing::info!("Adding Swagger UI at /api/docs");

        app = app.merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc));
    }

    Ok(app.layer(TraceLayer::new_for_http()))
}
