use content::{
    ContentPresentationFactory, ContentService, ContentUpdateModel, DocumentPatcher, PatchStatus,
    UpdateModelFactory,
};
use json_patch::ContentPatchRequest;
use poem::{
    error::BadRequest,
    handler,
    http::{HeaderMap, StatusCode},
    web::{Data, Json, Path},
    Error, IntoResponse, Response, Result,
};
use uuid::Uuid;

use crate::state::State;

const USER_KEY_HEADER: &str = "x-user-key";

#[handler]
pub(crate) async fn handler_get(
    state: Data<&State>,
    Path(key): Path<Uuid>,
) -> Result<Json<ContentUpdateModel>> {
    tracing::debug!(key = %key, "get");

    let content = state
        .store
        .get(key)
        .await
        .ok_or_else(|| Error::from_status(StatusCode::NOT_FOUND))?;
    let model = ContentPresentationFactory
        .create_update_request_model(&content)
        .await;
    Ok(Json(model))
}

#[handler]
pub(crate) async fn handler_patch(
    state: Data<&State>,
    Path(key): Path<Uuid>,
    headers: &HeaderMap,
    Json(request): Json<ContentPatchRequest>,
) -> Result<Response> {
    let acting_user = acting_user(headers)?;
    tracing::debug!(
        key = %key,
        acting_user = %acting_user,
        variants = ?DocumentPatcher::affected_variants(&request),
        "patch"
    );

    let attempt = state.patcher.apply_patch(key, &request, acting_user).await;
    match attempt.into_result() {
        Ok(model) => {
            if !state.store.save(key, &model) {
                return Ok(StatusCode::NOT_FOUND.into());
            }
            Ok(Json(model).into_response())
        }
        Err(PatchStatus::NotFound) => Ok(StatusCode::NOT_FOUND.into()),
        Err(_) => Ok(StatusCode::BAD_REQUEST.into()),
    }
}

/// The user on whose behalf the request is made, nil when anonymous.
fn acting_user(headers: &HeaderMap) -> Result<Uuid> {
    match headers.get(USER_KEY_HEADER) {
        Some(value) => value
            .to_str()
            .map_err(BadRequest)?
            .parse::<Uuid>()
            .map_err(BadRequest),
        None => Ok(Uuid::nil()),
    }
}
