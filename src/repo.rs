use chrono::NaiveDateTime;
use diesel::dsl::{count, count_distinct, insert_into};
use diesel::pg::Pg;
use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, QueryResult, SelectableHelper};
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::model::{
    Attendance, AttendanceRow, AttendanceType, DayOfWeek, Employee, Hostel, HostelType,
    MealChoice, MealChoiceRow, MealMenu, MealTime, Room, Student, User,
};
use crate::schema::{
    attendance, choice, employees, hostels, mealmenu, room, roomassignedto, student, users,
};

pub async fn find_user_by_email(
    conn: &mut AsyncPgConnection,
    email: &str,
) -> QueryResult<Option<User>> {
    users::table
        .filter(users::email.eq(email))
        .select(User::as_select())
        .first(conn)
        .await
        .optional()
}

pub async fn list_students(conn: &mut AsyncPgConnection) -> QueryResult<Vec<Student>> {
    student::table
        .order(student::studentid.asc())
        .select(Student::as_select())
        .load(conn)
        .await
}

pub async fn find_student(
    conn: &mut AsyncPgConnection,
    id: &str,
) -> QueryResult<Option<Student>> {
    student::table
        .find(id)
        .select(Student::as_select())
        .first(conn)
        .await
        .optional()
}

pub async fn list_employees(conn: &mut AsyncPgConnection) -> QueryResult<Vec<Employee>> {
    employees::table
        .order(employees::ssn.asc())
        .select(Employee::as_select())
        .load(conn)
        .await
}

pub async fn find_employee(
    conn: &mut AsyncPgConnection,
    ssn: &str,
) -> QueryResult<Option<Employee>> {
    employees::table
        .find(ssn)
        .select(Employee::as_select())
        .first(conn)
        .await
        .optional()
}

pub async fn list_hostels(conn: &mut AsyncPgConnection) -> QueryResult<Vec<Hostel>> {
    hostels::table
        .order(hostels::hostel_no.asc())
        .select(Hostel::as_select())
        .load(conn)
        .await
}

pub async fn find_hostel(
    conn: &mut AsyncPgConnection,
    hostel_no: i32,
) -> QueryResult<Option<Hostel>> {
    hostels::table
        .find(hostel_no)
        .select(Hostel::as_select())
        .first(conn)
        .await
        .optional()
}

pub async fn list_rooms(conn: &mut AsyncPgConnection) -> QueryResult<Vec<Room>> {
    room::table
        .order(room::room_no.asc())
        .select(Room::as_select())
        .load(conn)
        .await
}

pub async fn find_room(conn: &mut AsyncPgConnection, room_no: &str) -> QueryResult<Option<Room>> {
    room::table
        .find(room_no)
        .select(Room::as_select())
        .first(conn)
        .await
        .optional()
}

/// Newest first; equal timestamps fall back to the higher id.
pub async fn recent_attendance(
    conn: &mut AsyncPgConnection,
    limit: i64,
) -> QueryResult<Vec<Attendance>> {
    attendance::table
        .order((attendance::time_stamp.desc(), attendance::id.desc()))
        .limit(limit)
        .select(Attendance::as_select())
        .load(conn)
        .await
}

pub async fn append_attendance(
    conn: &mut AsyncPgConnection,
    row: &AttendanceRow,
) -> QueryResult<Attendance> {
    insert_into(attendance::table)
        .values(row)
        .returning(Attendance::as_returning())
        .get_result(conn)
        .await
}

pub async fn list_menu(
    conn: &mut AsyncPgConnection,
    day: Option<DayOfWeek>,
) -> QueryResult<Vec<MealMenu>> {
    let mut query = mealmenu::table.into_boxed::<Pg>();
    if let Some(day) = day {
        query = query.filter(mealmenu::day.eq(day));
    }
    query
        .order(mealmenu::poolid.asc())
        .select(MealMenu::as_select())
        .load(conn)
        .await
}

/// Newest date first; equal dates fall back to the higher optid.
pub async fn recent_choices(
    conn: &mut AsyncPgConnection,
    studentid: Option<&str>,
    limit: i64,
) -> QueryResult<Vec<MealChoice>> {
    let mut query = choice::table.into_boxed::<Pg>();
    if let Some(studentid) = studentid {
        query = query.filter(choice::studentid.eq(studentid));
    }
    query
        .order((choice::date.desc(), choice::optid.desc()))
        .limit(limit)
        .select(MealChoice::as_select())
        .load(conn)
        .await
}

pub async fn append_choice(
    conn: &mut AsyncPgConnection,
    row: &MealChoiceRow,
) -> QueryResult<MealChoice> {
    insert_into(choice::table)
        .values(row)
        .returning(MealChoice::as_returning())
        .get_result(conn)
        .await
}

pub async fn count_students(conn: &mut AsyncPgConnection) -> QueryResult<i64> {
    student::table.count().get_result(conn).await
}

/// Distinct students with at least one IN event in `[start, end)`.
pub async fn count_present_students(
    conn: &mut AsyncPgConnection,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> QueryResult<i64> {
    attendance::table
        .filter(attendance::attendance_type.eq(AttendanceType::In))
        .filter(attendance::time_stamp.ge(start))
        .filter(attendance::time_stamp.lt(end))
        .select(count_distinct(attendance::studentid))
        .get_result(conn)
        .await
}

/// Opted-out choice records per meal time dated in `[start, end)`. Repeated
/// rows for one student count once each. Meal times with no opt-outs are
/// absent from the result.
pub async fn count_opt_outs(
    conn: &mut AsyncPgConnection,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> QueryResult<Vec<(MealTime, i64)>> {
    choice::table
        .filter(choice::opted_out.eq(true))
        .filter(choice::date.ge(start))
        .filter(choice::date.lt(end))
        .group_by(choice::meal_time)
        .select((choice::meal_time, count(choice::optid)))
        .load(conn)
        .await
}

pub async fn count_rooms(conn: &mut AsyncPgConnection, kind: HostelType) -> QueryResult<i64> {
    room::table
        .inner_join(hostels::table)
        .filter(hostels::hostel_type.eq(kind))
        .count()
        .get_result(conn)
        .await
}

/// Rooms of `kind` holding at least one active assignment.
pub async fn count_occupied_rooms(
    conn: &mut AsyncPgConnection,
    kind: HostelType,
) -> QueryResult<i64> {
    roomassignedto::table
        .inner_join(room::table.inner_join(hostels::table))
        .filter(roomassignedto::is_active.eq(true))
        .filter(hostels::hostel_type.eq(kind))
        .select(count_distinct(room::room_no))
        .get_result(conn)
        .await
}
