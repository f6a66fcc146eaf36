pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::state::AppState;
use crate::{auth, render, resumes, sharing, users, versions};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Auth
        .route("/auth/signup", post(auth::handlers::handle_sign_up))
        .route("/auth/signin", post(auth::handlers::handle_sign_in))
        .route("/auth/signout", post(auth::handlers::handle_sign_out))
        .route(
            "/auth/reset-password",
            post(auth::handlers::handle_reset_password),
        )
        .route(
            "/auth/oauth/callback",
            get(auth::handlers::handle_oauth_callback),
        )
        .route(
            "/auth/oauth/:provider",
            get(auth::handlers::handle_oauth_sign_in),
        )
        .route("/auth/session", get(auth::handlers::handle_get_session))
        .route("/auth/refresh", post(auth::handlers::handle_refresh))
        .route("/auth/sessions", get(auth::handlers::handle_list_sessions))
        .route(
            "/auth/sessions/:id",
            delete(auth::handlers::handle_revoke_session),
        )
        // Resumes
        .route(
            "/resumes",
            post(resumes::handlers::handle_create).get(resumes::handlers::handle_list),
        )
        .route("/resumes/search", get(resumes::handlers::handle_search))
        .route("/resumes/import", post(resumes::handlers::handle_import))
        .route(
            "/resumes/bulk-export",
            post(resumes::handlers::handle_bulk_export),
        )
        // PDF rendering; storage-independent, shares the /resumes prefix for
        // API compatibility.
        .route(
            "/resumes/export",
            post(render::handlers::handle_export_pdf),
        )
        .route(
            "/resumes/:id",
            get(resumes::handlers::handle_get_by_id)
                .put(resumes::handlers::handle_update)
                .delete(resumes::handlers::handle_delete),
        )
        .route(
            "/resumes/:id/duplicate",
            post(resumes::handlers::handle_duplicate),
        )
        .route("/resumes/:id/export", get(resumes::handlers::handle_export))
        // Versions
        .route(
            "/resumes/:id/versions",
            get(versions::handlers::handle_list).post(versions::handlers::handle_create),
        )
        .route(
            "/resumes/:id/versions/:version_id",
            get(versions::handlers::handle_get_by_id),
        )
        .route(
            "/resumes/:id/versions/:version_id/restore",
            post(versions::handlers::handle_restore),
        )
        // Sharing
        .route("/resumes/:id/share", post(sharing::handlers::handle_share))
        .route(
            "/resumes/:id/unshare",
            post(sharing::handlers::handle_unshare),
        )
        .route(
            "/resumes/:id/analytics",
            get(sharing::handlers::handle_analytics),
        )
        .route("/public/:slug", get(sharing::handlers::handle_get_public))
        // Users
        .route(
            "/users/me",
            get(users::handlers::handle_get_profile)
                .put(users::handlers::handle_update_profile)
                .delete(users::handlers::handle_delete_account),
        )
        .route("/users/me/stats", get(users::handlers::handle_get_stats))
        .with_state(state)
}
