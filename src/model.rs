use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use diesel::{Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::schema::{
    attendance, choice, employees, hostels, mealmenu, room, student, users,
};

/// Raised when a stored or submitted value is outside a closed enumeration.
#[derive(Debug, thiserror::Error)]
#[error("unknown {kind} value '{value}'")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

/// Declares a closed enumeration stored as `VARCHAR` and exchanged as its
/// upper-case wire name.
macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
            AsExpression, FromSqlRow,
        )]
        #[diesel(sql_type = Text)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(UnknownVariant {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl ToSql<Text, Pg> for $name {
            fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
                std::io::Write::write_all(out, self.as_str().as_bytes())?;
                Ok(IsNull::No)
            }
        }

        impl FromSql<Text, Pg> for $name {
            fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
                let raw = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
                Ok(raw.parse()?)
            }
        }
    };
}

text_enum! {
    /// Login role of a [`User`].
    UserRole {
        Admin => "ADMIN",
        MessStaff => "MESS_STAFF",
        Student => "STUDENT",
    }
}

text_enum! {
    EmployeeRole {
        Admin => "ADMIN",
        MessStaff => "MESS_STAFF",
        Security => "SECURITY",
        Warden => "WARDEN",
    }
}

text_enum! {
    HostelType {
        Boys => "BOYS",
        Girls => "GIRLS",
    }
}

text_enum! {
    /// Direction of an attendance event.
    AttendanceType {
        In => "IN",
        Out => "OUT",
    }
}

text_enum! {
    MealTime {
        Breakfast => "BREAKFAST",
        Lunch => "LUNCH",
        Dinner => "DINNER",
    }
}

text_enum! {
    DayOfWeek {
        Mon => "MON",
        Tue => "TUE",
        Wed => "WED",
        Thu => "THU",
        Fri => "FRI",
        Sat => "SAT",
        Sun => "SUN",
    }
}

/// Login identity. The password hash never leaves the server; responses
/// render [`UserProfile`] instead.
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(Pg))]
pub struct User {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub password: String,
    pub role: UserRole,
    pub room_number: Option<String>,
    pub employee_ssn: Option<String>,
    pub student_id: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub room_number: Option<String>,
    pub employee_ssn: Option<String>,
    pub student_id: Option<String>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            room_number: user.room_number,
            employee_ssn: user.employee_ssn,
            student_id: user.student_id,
        }
    }
}

#[derive(ToSchema, Serialize, Selectable, Queryable, Debug)]
#[diesel(table_name = student)]
#[diesel(check_for_backend(Pg))]
pub struct Student {
    pub studentid: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub hostel_no: i32,
    pub room_no: String,
}

#[derive(ToSchema, Serialize, Selectable, Queryable, Debug)]
#[diesel(table_name = employees)]
#[diesel(check_for_backend(Pg))]
pub struct Employee {
    pub ssn: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub role: EmployeeRole,
}

#[derive(ToSchema, Serialize, Selectable, Queryable, Debug)]
#[diesel(table_name = hostels)]
#[diesel(check_for_backend(Pg))]
pub struct Hostel {
    pub hostel_no: i32,
    pub hostel_name: String,
    pub total_floors: i32,
    pub total_rooms: i32,
    #[serde(rename = "type")]
    pub hostel_type: HostelType,
}

#[derive(ToSchema, Serialize, Selectable, Queryable, Debug)]
#[diesel(table_name = room)]
#[diesel(check_for_backend(Pg))]
pub struct Room {
    pub room_no: String,
    pub capacity: i32,
    pub floor: i32,
    pub hostel_no: i32,
}

#[derive(ToSchema, Serialize, Selectable, Queryable, Debug)]
#[diesel(table_name = attendance)]
#[diesel(check_for_backend(Pg))]
pub struct Attendance {
    pub id: i32,
    pub location: String,
    pub time_stamp: NaiveDateTime,
    #[serde(rename = "type")]
    pub attendance_type: AttendanceType,
    pub studentid: String,
    pub employeessn: Option<String>,
}

/// Attendance row as written; `time_stamp` is always stamped by the server.
#[derive(Insertable, Debug)]
#[diesel(table_name = attendance)]
pub struct AttendanceRow {
    pub location: String,
    pub time_stamp: NaiveDateTime,
    pub attendance_type: AttendanceType,
    pub studentid: String,
    pub employeessn: Option<String>,
}

#[derive(ToSchema, Serialize, Selectable, Queryable, Debug)]
#[diesel(table_name = choice)]
#[diesel(check_for_backend(Pg))]
pub struct MealChoice {
    pub optid: i32,
    pub date: NaiveDateTime,
    pub meal_time: MealTime,
    pub opted_out: bool,
    pub studentid: String,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = choice)]
pub struct MealChoiceRow {
    pub date: NaiveDateTime,
    pub meal_time: MealTime,
    pub opted_out: bool,
    pub studentid: String,
}

#[derive(ToSchema, Serialize, Selectable, Queryable, Debug)]
#[diesel(table_name = mealmenu)]
#[diesel(check_for_backend(Pg))]
pub struct MealMenu {
    pub poolid: i32,
    pub category: String,
    pub day: DayOfWeek,
    pub meal_time: MealTime,
    pub menu_item: String,
}

#[derive(ToSchema, Default, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 255))]
    pub email: String,
    pub password: String,
}

#[derive(ToSchema, Deserialize, Validate, Debug)]
pub struct NewAttendance {
    #[validate(length(min = 1, max = 255))]
    pub location: String,
    #[serde(rename = "type")]
    pub attendance_type: AttendanceType,
    #[validate(length(min = 1, max = 50))]
    pub studentid: String,
    #[validate(length(min = 1, max = 50))]
    pub employeessn: Option<String>,
}

#[derive(ToSchema, Deserialize, Validate, Debug)]
pub struct NewMealChoice {
    /// ISO 8601 date or date-time, e.g. `2024-11-20` or `2024-11-20T08:00:00`.
    pub date: String,
    pub meal_time: MealTime,
    pub opted_out: bool,
    #[validate(length(min = 1, max = 50))]
    pub studentid: String,
}
