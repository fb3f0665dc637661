use axum::extract::{Path, State};
use axum::Json;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::model::Student;
use crate::{repo, STUDENT_TAG};

/// expose the student OpenAPI to parent module
pub fn student_router() -> OpenApiRouter<crate::State> {
    OpenApiRouter::new()
        .routes(routes!(list_students))
        .routes(routes!(get_student))
}

/// List students
#[utoipa::path(get, path = "/students", responses((status = OK, body = Vec<Student>)), tag = STUDENT_TAG, security(
    ("hostel_jwt" = [])
))]
async fn list_students(
    _user: CurrentUser,
    State(crate::State { pool, .. }): State<crate::State>,
) -> Result<Json<Vec<Student>>, ApiError> {
    let mut conn = pool.get().await?;
    Ok(Json(repo::list_students(&mut conn).await?))
}

/// Get student
#[utoipa::path(get, path = "/students/{id}", responses((status = OK, body = Student), (status = NOT_FOUND)), tag = STUDENT_TAG, security(
    ("hostel_jwt" = [])
),
params(
    ("id" = String, Path, description = "Student id"),
)
)]
async fn get_student(
    _user: CurrentUser,
    State(crate::State { pool, .. }): State<crate::State>,
    Path(id): Path<String>,
) -> Result<Json<Student>, ApiError> {
    let mut conn = pool.get().await?;
    repo::find_student(&mut conn, &id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Student"))
}
