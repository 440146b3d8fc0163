//! Route table. Everything but `/health` and `/metrics` lives under `/api`.

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{action, analysis, auth, collision, market, resources, system, topic};
use crate::metrics;
use crate::state::AppState;

pub fn router(state: AppState, cors_origins: &[String]) -> Router {
    let api = Router::new()
        .merge(auth_routes())
        .nest("/collision", collision_routes())
        .nest("/action", action_routes())
        .nest("/thinking/topic", topic_routes())
        .nest("/thinking/analysis", analysis_routes())
        .nest("/market", market_routes())
        .route("/resources/tags", get(resources::tags))
        .route("/resources/covers", get(resources::preset_covers));

    Router::new()
        .nest("/api", api)
        .route("/health", get(system::health))
        .route("/metrics", get(system::metrics))
        .route_layer(middleware::from_fn_with_state(
            state.metrics.clone(),
            metrics::track,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors(cors_origins))
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/codes", get(auth::codes))
        .route("/user/info", get(auth::user_info))
}

fn collision_routes() -> Router<AppState> {
    use collision::*;

    Router::new()
        .route("/discussions", get(list_discussions).post(create_discussion))
        .route(
            "/discussions/{id}",
            get(discussion_detail)
                .put(update_discussion)
                .delete(delete_discussion),
        )
        .route("/discussions/{id}/like", post(like_discussion))
        .route("/discussions/{id}/favorite", post(favorite_discussion))
        .route("/discussions/{id}/comments", get(list_comments).post(create_comment))
        .route("/comments/{id}/like", post(like_comment))
        .route("/hot-tags", get(hot_tags))
        .route("/active-users", get(active_users))
        .route("/meetups", get(list_meetups).post(create_meetup))
        .route("/meetups/{id}", get(meetup_detail))
        .route("/meetups/{id}/interest", post(toggle_interest))
        .route("/meetups/{id}/apply", post(apply_meetup))
        .route("/meetups/{id}/applications", get(meetup_applications))
        .route("/meetups/{id}/status", put(update_meetup_status))
        .route("/meetup-applications/{id}", put(review_application))
        .route("/meetup-cities", get(meetup_cities))
        .route("/consultations", get(list_consultations).post(create_consultation))
        .route("/consultations/{id}", get(consultation_detail))
        .route("/consultations/{id}/apply", post(apply_consultation))
        .route("/consultations/{id}/select", post(select_expert))
        .route("/consultations/{id}/applications", get(consultation_applications))
        .route("/consultations/{id}/status", put(update_consultation_status))
        .route("/experts", get(recommended_experts))
        .route("/consultation-stats", get(consultation_stats))
}

fn action_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(action::create).delete(action::delete))
        .route("/list", get(action::list))
        .route("/my", get(action::my))
        .route("/statistics", get(action::statistics))
        .route("/from-analysis", post(action::create_from_analysis))
        .route("/by-topic/{topic_id}", get(action::by_topic))
        .route("/by-analysis/{analysis_id}", get(action::by_analysis))
        .route("/{id}", get(action::detail).put(action::update))
        .route("/{id}/completion", put(action::update_completion))
        .route("/{id}/status", put(action::update_status))
        .route("/{id}/complete", post(action::complete))
        .route("/{id}/cancel", post(action::cancel))
        .route("/{id}/follow-up", post(action::add_follow_up))
        .route("/{id}/follow-ups", get(action::follow_ups))
}

fn topic_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(topic::create).delete(topic::delete))
        .route("/list", get(topic::list))
        .route("/my", get(topic::my))
        .route("/statistics", get(topic::statistics))
        .route("/{id}", get(topic::detail).put(topic::update))
        .route("/{id}/status", post(topic::update_status))
        .route("/{id}/select-model", post(topic::select_model))
        .route("/{id}/remove-model", post(topic::remove_model))
        .route("/{id}/complete", post(topic::complete))
        .route("/{id}/archive", post(topic::archive))
        .route("/{id}/reopen", post(topic::reopen))
}

fn analysis_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(analysis::create)
                .put(analysis::update)
                .delete(analysis::delete),
        )
        .route("/list", get(analysis::list))
        .route("/my", get(analysis::my))
        .route("/current", get(analysis::current))
        .route("/latest", get(analysis::latest))
        .route("/set-current", post(analysis::set_current))
        .route("/by-topic/{topic_id}", get(analysis::by_topic))
        .route("/history/{topic_id}/{model_id}", get(analysis::history))
        .route("/{id}", get(analysis::detail))
}

fn market_routes() -> Router<AppState> {
    Router::new()
        .route("/model", post(market::create))
        .route("/model/list", get(market::list))
        .route("/model/recommended", get(market::recommended))
        .route("/model/my", get(market::my))
        .route("/model/publish", post(market::publish))
        .route("/model/unpublish/{id}", post(market::unpublish))
        .route("/model/code/{code}", get(market::by_code))
        .route(
            "/model/{id}",
            get(market::detail).put(market::update).delete(market::delete),
        )
        .route("/model/{id}/adopt", post(market::adopt))
        .route("/model/{id}/purchase", post(market::purchase))
        .route("/model/{id}/fork", post(market::fork))
        .route("/model/{id}/like", post(market::like))
        .route("/category", post(market::create_category))
        .route("/category/list", get(market::categories))
        .route("/category/tree", get(market::category_tree))
        .route("/category/children/{id}", get(market::category_children))
        .route("/category/path/{id}", get(market::category_path))
        .route("/category/move", post(market::move_category))
        .route(
            "/category/{id}",
            get(market::category)
                .put(market::update_category)
                .delete(market::delete_category),
        )
}

/// Any origin when none are configured. Listed origins may send the
/// refresh cookie.
fn cors(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "ignoring malformed CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true)
}
