//! HTTP router configuration

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::runtime::{
    HttpChatRuntime,
    handlers::{
        chat, daily_costs, dashboard_usage, health::mark_started, health_check, list_dashboards,
        list_tools, metrics_endpoint, recent_errors, recent_logs, usage_stats,
    },
};

impl HttpChatRuntime {
    /// Create the Axum router with all endpoints and middleware
    pub fn router(self) -> Router {
        mark_started();
        let config = self.config.clone();

        let admin_routes = Router::new()
            .route("/admin/stats", get(usage_stats))
            .route("/admin/daily-costs", get(daily_costs))
            .route("/admin/dashboard-usage", get(dashboard_usage))
            .route("/admin/logs", get(recent_logs))
            .route("/admin/errors", get(recent_errors));

        let mut router = Router::new()
            .route("/chat", post(chat))
            .route("/tools", get(list_tools))
            .route("/dashboards", get(list_dashboards))
            .route("/health", get(health_check))
            .route("/metrics", get(metrics_endpoint))
            .merge(admin_routes)
            .with_state(self)
            .layer(RequestBodyLimitLayer::new(config.max_body_size))
            .layer(TraceLayer::new_for_http());

        if config.enable_cors {
            router = router.layer(CorsLayer::permissive());
        }

        router
    }
}
