//! `/api/shirt` handlers.
//!
//! Create, update, and delete all announce `shirt-modification` over the
//! hub, but only after the row change has been persisted. Uploads are
//! buffered in memory and written to the media store only once the request
//! passes field validation.

use axum::Json;
use axum::extract::multipart::Multipart;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::warn;

use camisa_core::{NewShirt, Shirt, ShirtPatch};

use crate::error::ApiError;
use crate::server::AppState;

/// An uploaded image held in memory until validation passes.
struct Upload {
    file_name: String,
    content_type: String,
    bytes: axum::body::Bytes,
}

/// Multipart fields accepted by create and update.
#[derive(Default)]
struct ShirtForm {
    title: Option<String>,
    link: Option<String>,
    size: Option<String>,
    price_in_cents: Option<i64>,
    person_id: Option<String>,
    status: Option<i64>,
    image: Option<Upload>,
}

async fn read_form(mut multipart: Multipart) -> Result<ShirtForm, ApiError> {
    let mut form = ShirtForm::default();
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(ToOwned::to_owned) else {
            continue;
        };
        match name.as_str() {
            "image" => {
                let file_name = field.file_name().unwrap_or_default().to_owned();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_owned();
                let bytes = field.bytes().await?;
                form.image = Some(Upload {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            "title" => form.title = Some(field.text().await?),
            "link" => form.link = Some(field.text().await?),
            "size" => form.size = Some(field.text().await?),
            "personId" => form.person_id = Some(field.text().await?),
            // Non-numeric values are dropped, not rejected.
            "priceInCents" => form.price_in_cents = field.text().await?.trim().parse().ok(),
            "status" => form.status = field.text().await?.trim().parse().ok(),
            _ => {}
        }
    }
    Ok(form)
}

/// Numeric path parameter, or a 400.
fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse().map_err(|_| ApiError::InvalidId(raw.to_owned()))
}

/// Best-effort removal of a stored image; failure is logged, not returned.
fn discard_upload(state: &AppState, name: &str) {
    if let Err(err) = state.media.delete(name) {
        warn!(file = name, error = %err, "failed to remove stored image");
    }
}

/// POST /api/shirt
pub async fn create(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_form(multipart).await?;
    let (Some(title), Some(person_id)) = (
        form.title.filter(|t| !t.is_empty()),
        form.person_id.filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::MissingFields);
    };

    let image_url = match &form.image {
        Some(upload) => Some(state.media.save(
            &upload.file_name,
            &upload.content_type,
            &upload.bytes,
        )?),
        None => None,
    };

    let new = NewShirt {
        title,
        link: form.link,
        image_url: image_url.clone(),
        size: form.size,
        price_in_cents: form.price_in_cents,
        person_id: person_id.clone(),
    };
    let created = state.store.create_shirt(&new).map_err(|err| {
        // A failed insert must not leave the uploaded file behind.
        if let Some(name) = &image_url {
            discard_upload(&state, name);
        }
        if err.is_constraint_violation() {
            ApiError::UnknownPerson(person_id.clone())
        } else {
            ApiError::from(err)
        }
    })?;

    state.notifier.shirt_modified().await;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/shirt
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Shirt>>, ApiError> {
    Ok(Json(state.store.list_shirts()?))
}

/// GET /api/shirt/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Shirt>, ApiError> {
    let id = parse_id(&id)?;
    let shirt = state
        .store
        .get_shirt(id)?
        .ok_or(ApiError::NotFound("shirt"))?;
    Ok(Json(shirt))
}

/// GET /api/shirt/by-person/{person_id}
pub async fn by_person(
    State(state): State<AppState>,
    Path(person_id): Path<String>,
) -> Result<Json<Vec<Shirt>>, ApiError> {
    Ok(Json(state.store.shirts_by_person(&person_id)?))
}

/// PUT /api/shirt/{id}
///
/// All fields are optional. A new image replaces the stored one: the old
/// file is unlinked only after the row points at the new name.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<Shirt>, ApiError> {
    let id = parse_id(&id)?;
    let form = read_form(multipart).await?;

    let existing = state
        .store
        .get_shirt(id)?
        .ok_or(ApiError::NotFound("shirt"))?;

    let new_image = match &form.image {
        Some(upload) => Some(state.media.save(
            &upload.file_name,
            &upload.content_type,
            &upload.bytes,
        )?),
        None => None,
    };

    let patch = ShirtPatch {
        title: form.title,
        link: form.link,
        image_url: new_image.clone(),
        size: form.size,
        price_in_cents: form.price_in_cents,
        person_id: form.person_id,
        status: form.status,
    };
    let updated = match state.store.update_shirt(id, &patch) {
        Ok(Some(shirt)) => shirt,
        Ok(None) => {
            if let Some(name) = &new_image {
                discard_upload(&state, name);
            }
            return Err(ApiError::NotFound("shirt"));
        }
        Err(err) => {
            if let Some(name) = &new_image {
                discard_upload(&state, name);
            }
            return Err(if err.is_constraint_violation() {
                ApiError::UnknownPerson(patch.person_id.clone().unwrap_or_default())
            } else {
                ApiError::from(err)
            });
        }
    };

    if let (Some(_), Some(old)) = (&new_image, &existing.image_url) {
        discard_upload(&state, old);
    }

    state.notifier.shirt_modified().await;
    Ok(Json(updated))
}

/// DELETE /api/shirt/{id}
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Shirt>, ApiError> {
    let id = parse_id(&id)?;
    let deleted = state
        .store
        .delete_shirt(id)?
        .ok_or(ApiError::NotFound("shirt"))?;
    if let Some(name) = &deleted.image_url {
        discard_upload(&state, name);
    }
    state.notifier.shirt_modified().await;
    Ok(Json(deleted))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
