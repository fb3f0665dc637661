use axum::extract::State;
use axum::Json;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use diesel_async::AsyncPgConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::model::{HostelType, MealTime};
use crate::validate::ValidatedQuery;
use crate::{repo, ANALYTICS_TAG};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RoomCounts {
    pub rooms: i64,
    pub occupied: i64,
}

/// Raw counts for one UTC calendar day. Opt-outs are record counts, so
/// duplicates can exceed the student total before clamping.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DailyCounts {
    pub total_students: i64,
    pub present_students: i64,
    pub breakfast_optouts: i64,
    pub lunch_optouts: i64,
    pub dinner_optouts: i64,
    pub boys: RoomCounts,
    pub girls: RoomCounts,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct AttendanceSplit {
    pub present: u32,
    pub absent: u32,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct MealOptout {
    pub breakfast: u32,
    pub lunch: u32,
    pub dinner: u32,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct HostelOccupancy {
    pub boys: u32,
    pub girls: u32,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub attendance: AttendanceSplit,
    pub meal_optout: MealOptout,
    pub hostel_occupancy: HostelOccupancy,
}

/// `part / whole` as a whole percentage, rounded half up. An empty `whole`
/// yields 0.
pub fn percentage(part: i64, whole: i64) -> u32 {
    if whole <= 0 {
        return 0;
    }
    let part = part.clamp(0, whole);
    ((part * 200 + whole) / (whole * 2)) as u32
}

impl DailyCounts {
    pub fn summarize(&self) -> AnalyticsResponse {
        let present = percentage(self.present_students, self.total_students);
        AnalyticsResponse {
            attendance: AttendanceSplit {
                present,
                absent: 100 - present,
            },
            meal_optout: MealOptout {
                breakfast: percentage(self.breakfast_optouts, self.total_students),
                lunch: percentage(self.lunch_optouts, self.total_students),
                dinner: percentage(self.dinner_optouts, self.total_students),
            },
            hostel_occupancy: HostelOccupancy {
                boys: percentage(self.boys.occupied, self.boys.rooms),
                girls: percentage(self.girls.occupied, self.girls.rooms),
            },
        }
    }
}

/// Half-open `[midnight, next midnight)` window of `day` in UTC.
pub fn day_window(day: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = day.and_time(NaiveTime::MIN);
    (start, start + TimeDelta::days(1))
}

pub async fn load_counts(
    conn: &mut AsyncPgConnection,
    day: NaiveDate,
) -> Result<DailyCounts, ApiError> {
    let (start, end) = day_window(day);
    let mut counts = DailyCounts {
        total_students: repo::count_students(conn).await?,
        present_students: repo::count_present_students(conn, start, end).await?,
        ..DailyCounts::default()
    };
    for (meal_time, records) in repo::count_opt_outs(conn, start, end).await? {
        match meal_time {
            MealTime::Breakfast => counts.breakfast_optouts = records,
            MealTime::Lunch => counts.lunch_optouts = records,
            MealTime::Dinner => counts.dinner_optouts = records,
        }
    }
    for (kind, slot) in [
        (HostelType::Boys, &mut counts.boys),
        (HostelType::Girls, &mut counts.girls),
    ] {
        slot.rooms = repo::count_rooms(conn, kind).await?;
        slot.occupied = repo::count_occupied_rooms(conn, kind).await?;
    }
    Ok(counts)
}

#[derive(Deserialize, Validate)]
pub struct AnalyticsQuery {
    pub date: Option<NaiveDate>,
}

/// expose the analytics OpenAPI to parent module
pub fn analytics_router() -> OpenApiRouter<crate::State> {
    OpenApiRouter::new().routes(routes!(get_analytics))
}

/// Daily analytics
#[utoipa::path(get, path = "/analytics", responses((status = OK, body = AnalyticsResponse)), tag = ANALYTICS_TAG, security(
    ("hostel_jwt" = [])
),
params(
    ("date" = Option<NaiveDate>, Query, description = "UTC day to report on, defaults to today"),
)
)]
async fn get_analytics(
    _user: CurrentUser,
    State(crate::State { pool, .. }): State<crate::State>,
    ValidatedQuery(AnalyticsQuery { date }): ValidatedQuery<AnalyticsQuery>,
) -> Result<Json<AnalyticsResponse>, ApiError> {
    let day = date.unwrap_or_else(|| Utc::now().date_naive());
    let mut conn = pool.get().await?;
    let counts = load_counts(&mut conn, day).await?;
    tracing::debug!(%day, ?counts, "analytics");
    Ok(Json(counts.summarize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_students_means_nobody_present() {
        let report = DailyCounts::default().summarize();
        assert_eq!(report.attendance, AttendanceSplit { present: 0, absent: 100 });
        assert_eq!(
            report.meal_optout,
            MealOptout {
                breakfast: 0,
                lunch: 0,
                dinner: 0
            }
        );
    }

    #[test]
    fn hostel_type_without_rooms_reports_zero() {
        let report = DailyCounts {
            girls: RoomCounts {
                rooms: 0,
                occupied: 0,
            },
            boys: RoomCounts {
                rooms: 4,
                occupied: 4,
            },
            ..DailyCounts::default()
        }
        .summarize();
        assert_eq!(report.hostel_occupancy, HostelOccupancy { boys: 100, girls: 0 });
    }

    #[test]
    fn one_of_two_students_present() {
        let report = DailyCounts {
            total_students: 2,
            present_students: 1,
            ..DailyCounts::default()
        }
        .summarize();
        assert_eq!(report.attendance, AttendanceSplit { present: 50, absent: 50 });
    }

    #[test]
    fn six_of_ten_boys_rooms_occupied() {
        let report = DailyCounts {
            boys: RoomCounts {
                rooms: 10,
                occupied: 6,
            },
            ..DailyCounts::default()
        }
        .summarize();
        assert_eq!(report.hostel_occupancy.boys, 60);
    }

    #[test]
    fn opt_outs_are_shares_of_all_students() {
        let report = DailyCounts {
            total_students: 40,
            breakfast_optouts: 10,
            lunch_optouts: 1,
            dinner_optouts: 40,
            ..DailyCounts::default()
        }
        .summarize();
        assert_eq!(
            report.meal_optout,
            MealOptout {
                breakfast: 25,
                lunch: 3,
                dinner: 100
            }
        );
    }

    #[test]
    fn repeated_opt_outs_count_as_records() {
        let report = DailyCounts {
            total_students: 2,
            breakfast_optouts: 2,
            lunch_optouts: 5,
            ..DailyCounts::default()
        }
        .summarize();
        assert_eq!(report.meal_optout.breakfast, 100);
        assert_eq!(report.meal_optout.lunch, 100);
    }

    #[test]
    fn rounds_half_up() {
        assert_eq!(percentage(1, 8), 13); // 12.5
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 200), 1); // 0.5
        assert_eq!(percentage(1, 201), 0);
    }

    #[test]
    fn percentage_never_exceeds_whole() {
        assert_eq!(percentage(5, 4), 100);
        assert_eq!(percentage(-1, 4), 0);
        assert_eq!(percentage(3, 0), 0);
    }

    #[test]
    fn window_is_one_utc_day() {
        let day = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let (start, end) = day_window(day);
        assert_eq!(start.to_string(), "2024-12-31 00:00:00");
        assert_eq!(end.to_string(), "2025-01-01 00:00:00");
    }

    #[test]
    fn response_uses_camel_case_keys() {
        let json = serde_json::to_value(DailyCounts::default().summarize()).unwrap();
        assert_eq!(json["attendance"]["absent"], 100);
        assert_eq!(json["mealOptout"]["dinner"], 0);
        assert_eq!(json["hostelOccupancy"]["girls"], 0);
    }
}
