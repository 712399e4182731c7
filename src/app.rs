use axum::{
    extract::DefaultBodyLimit,
    handler::Handler,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method,
    },
    middleware,
    routing::{get, post, MethodRouter},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::roles::{RoleRequirement, ADMINS, CUSTOMER_WRITERS, QUOTING_WRITERS, TEMPLATE_WRITERS};
use crate::auth::SERVICE_KEY_HEADER;
use crate::config::SecurityConfig;
use crate::handlers::{internal, public, session};
use crate::middleware::{require_roles, require_service_key, require_session};
use crate::state::AppState;
use crate::types::ServiceKind;

/// Router for the service named in `state.config.service`
pub fn app(state: AppState) -> Router {
    let service = state.service();
    let config = state.config.clone();

    let mut router = Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .merge(internal_routes(service, &state));

    if let Some(routes) = session_routes(service, &state) {
        router = router.merge(routes);
    }

    router = router.layer(DefaultBodyLimit::max(config.api.max_request_size_bytes));
    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

/// POST route behind a role gate
fn gated<H, T>(handler: H, requirement: RoleRequirement) -> MethodRouter<AppState>
where
    H: Handler<T, AppState>,
    T: 'static,
{
    post(handler).route_layer(middleware::from_fn_with_state(requirement, require_roles))
}

fn internal_routes(service: ServiceKind, state: &AppState) -> Router<AppState> {
    use internal::{customers, policies, quoting, templates, users};

    let routes = match service {
        ServiceKind::Users => Router::new()
            .route("/api/users", get(users::list_users).merge(gated(users::create_user, ADMINS)))
            .route("/api/users/:id", get(users::get_user)),
        ServiceKind::CustomerService => Router::new()
            .route(
                "/api/customers",
                get(customers::list_customers).merge(gated(customers::create_customer, CUSTOMER_WRITERS)),
            )
            .route("/api/policies", get(policies::list_policies))
            .route(
                "/api/policies/individual",
                get(policies::list_individual_policies)
                    .merge(gated(policies::create_individual_policy, CUSTOMER_WRITERS)),
            )
            .route(
                "/api/policies/group",
                get(policies::list_group_policies).merge(gated(policies::create_group_policy, CUSTOMER_WRITERS)),
            ),
        ServiceKind::Quoting => Router::new()
            .route(
                "/api/quotes",
                get(quoting::list_quotes).merge(gated(quoting::create_quote, QUOTING_WRITERS)),
            )
            .route(
                "/api/applicants",
                get(quoting::list_applicants).merge(gated(quoting::create_applicant, QUOTING_WRITERS)),
            )
            .route(
                "/api/groups",
                get(quoting::list_groups).merge(gated(quoting::create_group, QUOTING_WRITERS)),
            ),
        ServiceKind::BenefitDesigner => Router::new()
            .route(
                "/api/templates",
                get(templates::list_templates).merge(gated(templates::create_template, TEMPLATE_WRITERS)),
            )
            .route("/api/templates/:id", get(templates::get_template)),
    };

    routes.route_layer(middleware::from_fn_with_state(state.clone(), require_service_key))
}

fn session_routes(service: ServiceKind, state: &AppState) -> Option<Router<AppState>> {
    let routes = match service {
        ServiceKind::Users => Router::new()
            .route("/api/auth/service-token", post(session::service_token))
            .route("/api/auth/session", get(session::session)),
        ServiceKind::CustomerService => Router::new().route("/api/portfolio", get(session::portfolio)),
        ServiceKind::Quoting => Router::new().route("/api/templates-proxy", get(session::templates_proxy)),
        ServiceKind::BenefitDesigner => return None,
    };

    Some(routes.route_layer(middleware::from_fn_with_state(state.clone(), require_session)))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, HeaderName::from_static(SERVICE_KEY_HEADER)])
}
