use axum::extract::{Path, State};
use axum::Json;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::model::Employee;
use crate::{repo, STAFF_TAG};

/// expose the employee OpenAPI to parent module
pub fn staff_router() -> OpenApiRouter<crate::State> {
    OpenApiRouter::new()
        .routes(routes!(list_employees))
        .routes(routes!(get_employee))
}

/// List employees
#[utoipa::path(get, path = "/employees", responses((status = OK, body = Vec<Employee>)), tag = STAFF_TAG, security(
    ("hostel_jwt" = [])
))]
async fn list_employees(
    _user: CurrentUser,
    State(crate::State { pool, .. }): State<crate::State>,
) -> Result<Json<Vec<Employee>>, ApiError> {
    let mut conn = pool.get().await?;
    Ok(Json(repo::list_employees(&mut conn).await?))
}

/// Get employee
#[utoipa::path(get, path = "/employees/{ssn}", responses((status = OK, body = Employee), (status = NOT_FOUND)), tag = STAFF_TAG, security(
    ("hostel_jwt" = [])
),
params(
    ("ssn" = String, Path, description = "Employee SSN"),
)
)]
async fn get_employee(
    _user: CurrentUser,
    State(crate::State { pool, .. }): State<crate::State>,
    Path(ssn): Path<String>,
) -> Result<Json<Employee>, ApiError> {
    let mut conn = pool.get().await?;
    repo::find_employee(&mut conn, &ssn)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Employee"))
}
