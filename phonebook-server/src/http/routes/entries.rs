//! Phone book pages: listing, add, update and delete
//!
//! Update and delete are two-step. The confirmation page stores the target id
//! in the session; the submit route consumes it. Every submit redirects home
//! and reports the outcome as a flash message.

use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, rejection::PathRejection, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use serde::Deserialize;

use crate::error::StoreError;
use crate::http::server::AppState;
use crate::http::views;
use crate::models::{EntryFields, PhoneBookEntry};
use crate::session::{Flash, FlashLevel, Session};

pub const ADDED: &str = "A new phone number has been added";
pub const NOT_ADDED: &str = "A new phone number cannot be added";
pub const UPDATED: &str = "A phone number has been updated";
pub const NOT_UPDATED: &str = "A phone number cannot be updated";
pub const DELETED: &str = "A phone number has been deleted";
pub const NOT_DELETED: &str = "A phone number cannot be deleted";

/// Fields posted by the add, update and delete forms
#[derive(Debug, Default, Deserialize)]
pub struct EntryForm {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub save: Option<String>,
    pub update: Option<String>,
    pub delete: Option<String>,
}

impl EntryForm {
    /// All three entry fields, if every one was submitted
    pub fn fields(&self) -> Option<EntryFields> {
        Some(EntryFields {
            name: self.name.clone()?,
            phone: self.phone.clone()?,
            address: self.address.clone()?,
        })
    }
}

/// The submitted form, if `action` names a non-empty field in it
fn submitted(
    form: Result<Form<EntryForm>, FormRejection>,
    action: fn(&EntryForm) -> &Option<String>,
) -> Option<EntryForm> {
    let Form(form) = form.ok()?;
    action(&form)
        .as_deref()
        .is_some_and(|value| !value.is_empty())
        .then_some(form)
}

/// Ids in confirmation paths are non-negative integers; anything else is not found
fn entry_id(id: Result<Path<u32>, PathRejection>) -> Option<i64> {
    id.ok().map(|Path(id)| i64::from(id))
}

fn home() -> Redirect {
    Redirect::to("/")
}

fn log_store_error(operation: &'static str, err: &StoreError) {
    if err.is_transient() {
        tracing::warn!(operation, error = %err, "phone book store unavailable");
    } else {
        tracing::error!(operation, error = %err, "phone book store operation failed");
    }
}

/// Flash the outcome of a write
fn report(
    session: &mut Session,
    operation: &'static str,
    outcome: Result<(), StoreError>,
    success: &str,
    failure: &str,
) {
    match outcome {
        Ok(()) => session.flash(FlashLevel::Success, success),
        Err(err) => {
            log_store_error(operation, &err);
            session.flash(FlashLevel::Error, failure);
        }
    }
}

/// Read failures render as "no entries"
async fn read_or_empty(state: &AppState, id: Option<i64>) -> Vec<PhoneBookEntry> {
    state.store.read(id).await.unwrap_or_else(|err| {
        log_store_error("read", &err);
        Vec::new()
    })
}

fn render(mut session: Session, page: impl FnOnce(&[Flash]) -> Html<String>) -> Response {
    let flashes = session.take_flashes();
    let html = page(&flashes);
    (session, html).into_response()
}

/// GET / - list all entries
async fn index(State(state): State<Arc<AppState>>, session: Session) -> Response {
    let entries = read_or_empty(&state, None).await;
    render(session, |flashes| views::index(&entries, flashes))
}

/// GET /add/ - empty creation form
async fn add_form(session: Session) -> Response {
    render(session, views::add_form)
}

/// POST /addphone - insert when the form carries `save`
async fn add_phone(
    State(state): State<Arc<AppState>>,
    mut session: Session,
    form: Result<Form<EntryForm>, FormRejection>,
) -> (Session, Redirect) {
    let Some(form) = submitted(form, |f| &f.save) else {
        return (session, home());
    };

    let Some(fields) = form.fields() else {
        tracing::warn!("add submitted without name, phone or address");
        session.flash(FlashLevel::Error, NOT_ADDED);
        return (session, home());
    };

    let outcome = state.store.insert(&fields).await.map(|id| {
        tracing::info!(id, "phone book entry added");
    });
    report(&mut session, "insert", outcome, ADDED, NOT_ADDED);

    (session, home())
}

/// GET /update/{id}/ - confirmation form, remembers `id` as pending update
async fn update_confirm(
    State(state): State<Arc<AppState>>,
    mut session: Session,
    id: Result<Path<u32>, PathRejection>,
) -> Response {
    let Some(id) = entry_id(id) else {
        return not_found(session).await;
    };
    let Some(entry) = read_or_empty(&state, Some(id)).await.into_iter().next() else {
        return (session, home()).into_response();
    };

    session.await_update(id);
    render(session, |flashes| views::update_form(&entry, flashes))
}

/// POST /updatephone - apply the pending update
async fn update_phone(
    State(state): State<Arc<AppState>>,
    mut session: Session,
    form: Result<Form<EntryForm>, FormRejection>,
) -> (Session, Redirect) {
    let Some(form) = submitted(form, |f| &f.update) else {
        return (session, home());
    };
    let Some(id) = session.take_update() else {
        tracing::warn!("update submitted without a pending confirmation");
        return (session, home());
    };

    let Some(fields) = form.fields() else {
        tracing::warn!(id, "update submitted without name, phone or address");
        session.flash(FlashLevel::Error, NOT_UPDATED);
        return (session, home());
    };

    let outcome = state.store.update(id, &fields).await.map(|()| {
        tracing::info!(id, "phone book entry updated");
    });
    report(&mut session, "update", outcome, UPDATED, NOT_UPDATED);

    (session, home())
}

/// GET /delete/{id}/ - confirmation page, remembers `id` as pending delete
async fn delete_confirm(
    State(state): State<Arc<AppState>>,
    mut session: Session,
    id: Result<Path<u32>, PathRejection>,
) -> Response {
    let Some(id) = entry_id(id) else {
        return not_found(session).await;
    };
    let Some(entry) = read_or_empty(&state, Some(id)).await.into_iter().next() else {
        return (session, home()).into_response();
    };

    session.await_delete(id);
    render(session, |flashes| views::delete_form(&entry, flashes))
}

/// POST /deletephone - apply the pending delete
async fn delete_phone(
    State(state): State<Arc<AppState>>,
    mut session: Session,
    form: Result<Form<EntryForm>, FormRejection>,
) -> (Session, Redirect) {
    if submitted(form, |f| &f.delete).is_none() {
        return (session, home());
    }
    let Some(id) = session.take_delete() else {
        tracing::warn!("delete submitted without a pending confirmation");
        return (session, home());
    };

    let outcome = state.store.delete(id).await.map(|()| {
        tracing::info!(id, "phone book entry deleted");
    });
    report(&mut session, "delete", outcome, DELETED, NOT_DELETED);

    (session, home())
}

/// GET on a submit route: nothing to do
async fn redirect_home() -> Redirect {
    home()
}

/// Fallback for unmatched paths
pub async fn not_found(mut session: Session) -> Response {
    let flashes = session.take_flashes();
    (StatusCode::NOT_FOUND, session, views::error_page(&flashes)).into_response()
}

/// Phone book routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/add", get(add_form))
        .route("/add/", get(add_form))
        .route("/addphone", get(redirect_home).post(add_phone))
        .route("/update/{id}", get(update_confirm))
        .route("/update/{id}/", get(update_confirm))
        .route("/updatephone", get(redirect_home).post(update_phone))
        .route("/delete/{id}", get(delete_confirm))
        .route("/delete/{id}/", get(delete_confirm))
        .route("/deletephone", get(redirect_home).post(delete_phone))
}
