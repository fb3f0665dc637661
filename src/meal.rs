use axum::extract::State;
use axum::Json;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::model::{DayOfWeek, MealChoice, MealChoiceRow, MealMenu, NewMealChoice};
use crate::validate::{ValidatedJson, ValidatedQuery};
use crate::{repo, MEAL_TAG};

const RECENT_LIMIT: i64 = 50;

const DATE_TIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Parse an ISO 8601 date or date-time. Offsets are normalised to UTC; a bare
/// date means midnight.
pub fn parse_meal_date(raw: &str) -> Result<NaiveDateTime, ApiError> {
    let raw = raw.trim();
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Ok(with_offset.naive_utc());
    }
    if let Some(naive) = DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
    {
        return Ok(naive);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN))
        .map_err(|_| {
            ApiError::Validation(format!(
                "date: '{raw}' is not an ISO 8601 date or date-time"
            ))
        })
}

#[derive(Deserialize, Validate)]
pub struct MenuFilter {
    pub day: Option<DayOfWeek>,
}

#[derive(Deserialize, Validate)]
pub struct ChoiceFilter {
    #[validate(length(max = 50))]
    pub studentid: Option<String>,
}

/// expose the public menu OpenAPI to parent module
pub fn menu_router() -> OpenApiRouter<crate::State> {
    OpenApiRouter::new().routes(routes!(get_menu))
}

/// expose the meal choice OpenAPI to parent module
pub fn choice_router() -> OpenApiRouter<crate::State> {
    OpenApiRouter::new().routes(routes!(list_choices, opt_out))
}

/// Meal menu, optionally for a single day
#[utoipa::path(
    get,
    path = "/mealmenu",
    responses((status = OK, body = Vec<MealMenu>)),
    tag = MEAL_TAG,
    params(
        ("day" = Option<DayOfWeek>, Query, description = "Day of week, e.g. MON"),
    )
)]
async fn get_menu(
    State(crate::State { pool, .. }): State<crate::State>,
    ValidatedQuery(MenuFilter { day }): ValidatedQuery<MenuFilter>,
) -> Result<Json<Vec<MealMenu>>, ApiError> {
    let mut conn = pool.get().await?;
    Ok(Json(repo::list_menu(&mut conn, day).await?))
}

/// Latest meal choices, newest date first
#[utoipa::path(get, path = "/choice", responses((status = OK, body = Vec<MealChoice>)), tag = MEAL_TAG, security(
    ("hostel_jwt" = [])
),
params(
    ("studentid" = Option<String>, Query, description = "Only choices of this student"),
)
)]
async fn list_choices(
    _user: CurrentUser,
    State(crate::State { pool, .. }): State<crate::State>,
    ValidatedQuery(ChoiceFilter { studentid }): ValidatedQuery<ChoiceFilter>,
) -> Result<Json<Vec<MealChoice>>, ApiError> {
    let studentid = studentid.filter(|id| !id.is_empty());
    let mut conn = pool.get().await?;
    Ok(Json(
        repo::recent_choices(&mut conn, studentid.as_deref(), RECENT_LIMIT).await?,
    ))
}

/// Record a meal choice
#[utoipa::path(post, path = "/choice", request_body = NewMealChoice, responses((status = OK, body = MealChoice), (status = BAD_REQUEST)), tag = MEAL_TAG, security(
    ("hostel_jwt" = [])
))]
async fn opt_out(
    CurrentUser(user): CurrentUser,
    State(crate::State { pool, .. }): State<crate::State>,
    ValidatedJson(choice): ValidatedJson<NewMealChoice>,
) -> Result<Json<MealChoice>, ApiError> {
    let row = MealChoiceRow {
        date: parse_meal_date(&choice.date)?,
        meal_time: choice.meal_time,
        opted_out: choice.opted_out,
        studentid: choice.studentid,
    };
    let mut conn = pool.get().await?;
    let record = repo::append_choice(&mut conn, &row)
        .await
        .map_err(ApiError::from_insert)?;
    tracing::info!(
        optid = record.optid,
        studentid = %record.studentid,
        meal_time = %record.meal_time,
        opted_out = record.opted_out,
        recorded_by = user.id,
        "meal choice recorded"
    );
    Ok(Json(record))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn at(date: (i32, u32, u32), time: (u32, u32, u32)) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(date.0, date.1, date.2)
            .unwrap()
            .and_hms_opt(time.0, time.1, time.2)
            .unwrap()
    }

    #[test]
    fn bare_date_is_midnight() {
        assert_eq!(
            parse_meal_date("2024-11-20").unwrap(),
            at((2024, 11, 20), (0, 0, 0))
        );
    }

    #[test]
    fn accepts_naive_date_times() {
        assert_eq!(
            parse_meal_date("2024-11-20T08:30:00").unwrap(),
            at((2024, 11, 20), (8, 30, 0))
        );
        assert_eq!(
            parse_meal_date("2024-11-20 08:30:00").unwrap(),
            at((2024, 11, 20), (8, 30, 0))
        );
        assert_eq!(
            parse_meal_date("2024-11-20T08:30").unwrap(),
            at((2024, 11, 20), (8, 30, 0))
        );
        let fractional = parse_meal_date("2024-11-20T08:30:00.250").unwrap();
        assert_eq!(fractional.and_utc().timestamp_subsec_millis(), 250);
    }

    #[test]
    fn offsets_are_normalised_to_utc() {
        assert_eq!(
            parse_meal_date("2024-11-20T08:30:00+02:00").unwrap(),
            at((2024, 11, 20), (6, 30, 0))
        );
        assert_eq!(
            parse_meal_date("2024-11-20T08:30:00Z").unwrap(),
            at((2024, 11, 20), (8, 30, 0))
        );
    }

    #[test]
    fn non_iso_input_is_a_validation_failure() {
        for raw in ["20/11/2024", "tomorrow", "", "2024-13-01", "2024-11-20T25:00:00"] {
            match parse_meal_date(raw) {
                Err(ApiError::Validation(msg)) => assert!(msg.starts_with("date:")),
                other => panic!("{raw:?} parsed as {other:?}"),
            }
        }
    }
}
