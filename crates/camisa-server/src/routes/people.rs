//! `/api/person` handlers.
//!
//! Person mutations never trigger a broadcast; only shirt data is announced
//! to connected clients.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use camisa_core::{NewPerson, Person, PersonUpdate};

use crate::error::ApiError;
use crate::server::AppState;

/// POST /api/person
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<NewPerson>,
) -> Result<impl IntoResponse, ApiError> {
    if body.name.is_empty() {
        return Err(ApiError::MissingFields);
    }
    let person = state.store.create_person(&body.name)?;
    Ok((StatusCode::CREATED, Json(person)))
}

/// GET /api/person
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Person>>, ApiError> {
    Ok(Json(state.store.list_people()?))
}

/// PUT /api/person/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<PersonUpdate>,
) -> Result<Json<Person>, ApiError> {
    if body.name.is_empty() {
        return Err(ApiError::MissingFields);
    }
    let person = state
        .store
        .update_person(&id, &body.name)?
        .ok_or(ApiError::NotFound("person"))?;
    Ok(Json(person))
}

/// DELETE /api/person/{id}
///
/// A person still referenced by shirts cannot be deleted; the foreign key
/// violation surfaces as a 409.
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Person>, ApiError> {
    let deleted = state.store.delete_person(&id).map_err(|err| {
        if err.is_constraint_violation() {
            ApiError::PersonInUse
        } else {
            ApiError::from(err)
        }
    })?;
    let deleted = deleted.ok_or(ApiError::NotFound("person"))?;
    Ok(Json(deleted))
}
