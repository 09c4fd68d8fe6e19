//! `GET /health`: process liveness plus which store backs the pages.
//! Never opens a database connection, so it stays green while MySQL is down.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::http::server::AppState;

#[derive(Debug, Serialize)]
pub struct Liveness {
    pub service: &'static str,
    pub version: &'static str,
    pub store: &'static str,
}

async fn liveness(State(state): State<Arc<AppState>>) -> Json<Liveness> {
    Json(Liveness {
        service: "phonebook",
        version: env!("CARGO_PKG_VERSION"),
        store: state.store.backend(),
    })
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(liveness))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryPhoneBook;
    use crate::error::StoreError;
    use crate::session::SessionKey;

    #[tokio::test]
    async fn reports_store_backend_without_querying_it() {
        let store = Arc::new(InMemoryPhoneBook::new());
        store
            .fail_with(Some(StoreError::Unavailable("down".into())))
            .await;
        let state = Arc::new(AppState::new(store, SessionKey::new("k")));

        let Json(body) = liveness(State(state)).await;
        assert_eq!(body.service, "phonebook");
        assert_eq!(body.store, "memory");
        assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
    }
}
