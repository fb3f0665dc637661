use axum::extract::{Path, State};
use axum::Json;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::model::{Hostel, Room};
use crate::{repo, HOUSING_TAG};

/// expose the room and hostel OpenAPI to parent module
pub fn housing_router() -> OpenApiRouter<crate::State> {
    OpenApiRouter::new()
        .routes(routes!(list_rooms))
        .routes(routes!(get_room))
        .routes(routes!(list_hostels))
        .routes(routes!(get_hostel))
}

/// List rooms
#[utoipa::path(get, path = "/rooms", responses((status = OK, body = Vec<Room>)), tag = HOUSING_TAG, security(
    ("hostel_jwt" = [])
))]
async fn list_rooms(
    _user: CurrentUser,
    State(crate::State { pool, .. }): State<crate::State>,
) -> Result<Json<Vec<Room>>, ApiError> {
    let mut conn = pool.get().await?;
    Ok(Json(repo::list_rooms(&mut conn).await?))
}

/// Get room
#[utoipa::path(get, path = "/rooms/{room_no}", responses((status = OK, body = Room), (status = NOT_FOUND)), tag = HOUSING_TAG, security(
    ("hostel_jwt" = [])
),
params(
    ("room_no" = String, Path, description = "Room number"),
)
)]
async fn get_room(
    _user: CurrentUser,
    State(crate::State { pool, .. }): State<crate::State>,
    Path(room_no): Path<String>,
) -> Result<Json<Room>, ApiError> {
    let mut conn = pool.get().await?;
    repo::find_room(&mut conn, &room_no)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Room"))
}

/// List hostels
#[utoipa::path(get, path = "/hostels", responses((status = OK, body = Vec<Hostel>)), tag = HOUSING_TAG, security(
    ("hostel_jwt" = [])
))]
async fn list_hostels(
    _user: CurrentUser,
    State(crate::State { pool, .. }): State<crate::State>,
) -> Result<Json<Vec<Hostel>>, ApiError> {
    let mut conn = pool.get().await?;
    Ok(Json(repo::list_hostels(&mut conn).await?))
}

/// Get hostel
#[utoipa::path(get, path = "/hostels/{hostel_no}", responses((status = OK, body = Hostel), (status = NOT_FOUND)), tag = HOUSING_TAG, security(
    ("hostel_jwt" = [])
),
params(
    ("hostel_no" = i32, Path, description = "Hostel number"),
)
)]
async fn get_hostel(
    _user: CurrentUser,
    State(crate::State { pool, .. }): State<crate::State>,
    Path(hostel_no): Path<i32>,
) -> Result<Json<Hostel>, ApiError> {
    let mut conn = pool.get().await?;
    repo::find_hostel(&mut conn, hostel_no)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Hostel"))
}
