use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::auth::{verify_password, CurrentUser, DUMMY_HASH};
use crate::error::ApiError;
use crate::model::{LoginRequest, UserProfile};
use crate::validate::ValidatedJson;
use crate::{repo, AUTH_TAG};

/// expose the session OpenAPI to parent module
pub fn session_router() -> OpenApiRouter<crate::State> {
    OpenApiRouter::new()
        .routes(routes!(login))
        .routes(routes!(me))
}

/// Exchange email and password for a bearer token
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = OK, body = AuthBody),
        (status = UNAUTHORIZED, description = "Incorrect email or password")
    ),
    tag = AUTH_TAG
)]
async fn login(
    State(crate::State { pool, keys }): State<crate::State>,
    ValidatedJson(credentials): ValidatedJson<LoginRequest>,
) -> Result<Json<AuthBody>, ApiError> {
    let user = {
        let mut conn = pool.get().await?;
        repo::find_user_by_email(&mut conn, &credentials.email).await?
    };
    // unknown email and wrong password must be indistinguishable, in timing too
    let stored = user.as_ref().map_or(DUMMY_HASH, |user| user.password.as_str());
    let matched = verify_password(&credentials.password, stored);
    let user = match user {
        Some(user) if matched => user,
        _ => {
            tracing::debug!("login: rejected credentials");
            return Err(ApiError::WrongCredentials);
        }
    };

    let access_token = keys.issue(&user.email)?;
    tracing::info!(user_id = user.id, role = %user.role, "login");
    Ok(Json(AuthBody {
        access_token,
        token_type: "bearer".to_string(),
        user: user.into(),
    }))
}

/// Current user profile
#[utoipa::path(get, path = "/me", responses((status = OK, body = UserProfile)), tag = AUTH_TAG, security(
    ("hostel_jwt" = [])
))]
async fn me(CurrentUser(user): CurrentUser) -> Json<UserProfile> {
    Json(user.into())
}

#[derive(Debug, ToSchema, Serialize, Deserialize)]
pub struct AuthBody {
    pub access_token: String,
    pub token_type: String,
    pub user: UserProfile,
}
