use axum::extract::State;
use axum::Json;
use chrono::Utc;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::model::{Attendance, AttendanceRow, NewAttendance};
use crate::validate::ValidatedJson;
use crate::{repo, ATTENDANCE_TAG};

const RECENT_LIMIT: i64 = 100;

/// expose the attendance OpenAPI to parent module
pub fn attendance_router() -> OpenApiRouter<crate::State> {
    OpenApiRouter::new().routes(routes!(list_attendance, mark_attendance))
}

/// Latest attendance events, newest first
#[utoipa::path(get, path = "/attendance", responses((status = OK, body = Vec<Attendance>)), tag = ATTENDANCE_TAG, security(
    ("hostel_jwt" = [])
))]
async fn list_attendance(
    _user: CurrentUser,
    State(crate::State { pool, .. }): State<crate::State>,
) -> Result<Json<Vec<Attendance>>, ApiError> {
    let mut conn = pool.get().await?;
    Ok(Json(repo::recent_attendance(&mut conn, RECENT_LIMIT).await?))
}

/// Record an attendance event
///
/// The timestamp is assigned by the server at write time.
#[utoipa::path(post, path = "/attendance", request_body = NewAttendance, responses((status = OK, body = Attendance)), tag = ATTENDANCE_TAG, security(
    ("hostel_jwt" = [])
))]
async fn mark_attendance(
    CurrentUser(user): CurrentUser,
    State(crate::State { pool, .. }): State<crate::State>,
    ValidatedJson(event): ValidatedJson<NewAttendance>,
) -> Result<Json<Attendance>, ApiError> {
    let row = AttendanceRow {
        location: event.location,
        time_stamp: Utc::now().naive_utc(),
        attendance_type: event.attendance_type,
        studentid: event.studentid,
        employeessn: event.employeessn,
    };
    let mut conn = pool.get().await?;
    let record = repo::append_attendance(&mut conn, &row)
        .await
        .map_err(ApiError::from_insert)?;
    tracing::info!(
        id = record.id,
        studentid = %record.studentid,
        kind = %record.attendance_type,
        recorded_by = user.id,
        "attendance recorded"
    );
    Ok(Json(record))
}
