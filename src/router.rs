use crate::auth::auth_middleware;
use crate::handlers::{
    admin::{delete_user, get_users},
    auth::{admin_login, login, register},
    cash_register::{close_register, get_register_history, get_today_register, open_register},
    health::health_check,
    incomes::{get_today_incomes, post_expense, post_income},
    orders::{create_order, get_orders},
    recipes::{create_recipe, delete_recipe, get_recipes, update_recipe},
    reports::get_report,
    supplies::{create_supply, delete_supply, get_supplies, update_supply},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    // Everything past login requires a bearer token; the middleware puts
    // the verified claims in the request extensions.
    let protected = Router::new()
        // Supply ledger
        .route("/insumos", post(create_supply))
        .route("/insumos", get(get_supplies))
        .route("/insumos/:id", put(update_supply))
        .route("/insumos/:id", delete(delete_supply))
        // Recipe book
        .route("/recetas", post(create_recipe))
        .route("/recetas", get(get_recipes))
        .route("/recetas/:id", put(update_recipe))
        .route("/recetas/:id", delete(delete_recipe))
        // Daily cash register
        .route("/caja/hoy", get(get_today_register))
        .route("/caja/abrir", post(open_register))
        .route("/caja/cerrar", post(close_register))
        .route("/caja/historial", get(get_register_history))
        // Income and expense ledger
        .route("/finanzas/ingreso", post(post_income))
        .route("/finanzas/movimientos/hoy", get(get_today_incomes))
        .route("/finanzas/egreso", post(post_expense))
        // Orders
        .route("/pedidos", post(create_order))
        .route("/pedidos", get(get_orders))
        // Finance reports
        .route("/reportes", get(get_report))
        // Tenant administration
        .route("/admin/users", get(get_users))
        .route("/admin/users/:id", delete(delete_user))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let router = Router::new()
        // Public routes
        .route("/health", get(health_check))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/admin/login", post(admin_login))
        .merge(protected)
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // Prometheus metrics are not wired in tests: the recorder is a process
    // global and repeated registration panics across test binaries.
    #[cfg(not(test))]
    let router = {
        let (prometheus_layer, metric_handle) = axum_prometheus::PrometheusMetricLayer::pair();
        router
            .route("/metrics", get(move || async move { metric_handle.render() }))
            .layer(prometheus_layer)
    };

    router
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
