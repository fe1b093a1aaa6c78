//! Tool and dashboard listings.

use axum::{extract::State, response::Json};

use crate::runtime::{
    HttpChatRuntime,
    types::{DashboardSummary, DashboardsResponse, ToolsResponse},
};

/// GET /tools - every registered tool, in registration order
pub async fn list_tools(State(runtime): State<HttpChatRuntime>) -> Json<ToolsResponse> {
    Json(ToolsResponse {
        tools: runtime.tools().list_definitions(),
    })
}

/// GET /dashboards - the catalog, flagged with whether this site enables each one
pub async fn list_dashboards(State(runtime): State<HttpChatRuntime>) -> Json<DashboardsResponse> {
    let dashboards = runtime
        .dashboards
        .iter()
        .map(|(id, manifest)| DashboardSummary {
            manifest: manifest.clone(),
            enabled: runtime.is_dashboard_enabled(id),
        })
        .collect();
    Json(DashboardsResponse { dashboards })
}
