//! Index page rendering

use std::sync::Arc;

use askama_axum::Template;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use tracing::{error, warn};

use crate::server::AppState;
use crate::store::{self, NamespaceInfo};

#[derive(Template)]
#[template(path = "pages/index.html")]
pub struct IndexTemplate {
    pub title: String,
    pub heading: String,
    pub subheading: String,
    pub namespaces: Vec<NamespaceInfo>,
}

/// Render the namespace listing for the output root.
///
/// The scan runs fresh on every request. A failure to list the root surfaces
/// as a 500 with the raw error text; per-namespace walk issues only degrade
/// the listing and are logged.
pub async fn index(State(state): State<Arc<AppState>>) -> Response {
    tracing::debug!("Generating index template");

    let listing = match store::list_namespaces(&state.out_dir) {
        Ok(listing) => listing,
        Err(e) => {
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
    };

    for issue in &listing.issues {
        warn!("namespace scan issue: {issue}");
    }

    let template = IndexTemplate {
        title: "Namespaces".to_string(),
        heading: "Namespaces".to_string(),
        subheading: "Generated configs read from the output directory.".to_string(),
        namespaces: listing.namespaces,
    };

    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Template rendering error: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Template rendering error",
            )
                .into_response()
        }
    }
}
