use std::collections::HashMap;

use async_graphql::{Context, Enum, InputObject, Object, SimpleObject, ID};
use chrono::{NaiveDate, NaiveTime};
use entity::{attendance_record, employee};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder,
};
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::common::{
    database, db_error, id_of, now, optional_text, parse_uuid, percentage, require_editor,
    require_viewer, validation_error, write_error,
};
use crate::employees::ensure_employee_exists;

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
    HalfDay,
}

impl From<attendance_record::Status> for AttendanceStatus {
    fn from(value: attendance_record::Status) -> Self {
        match value {
            attendance_record::Status::Present => AttendanceStatus::Present,
            attendance_record::Status::Late => AttendanceStatus::Late,
            attendance_record::Status::Absent => AttendanceStatus::Absent,
            attendance_record::Status::HalfDay => AttendanceStatus::HalfDay,
        }
    }
}

impl From<AttendanceStatus> for attendance_record::Status {
    fn from(value: AttendanceStatus) -> Self {
        match value {
            AttendanceStatus::Present => attendance_record::Status::Present,
            AttendanceStatus::Late => attendance_record::Status::Late,
            AttendanceStatus::Absent => attendance_record::Status::Absent,
            AttendanceStatus::HalfDay => attendance_record::Status::HalfDay,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct AttendanceEntry {
    pub id: ID,
    pub employee_id: ID,
    pub employee_code: String,
    pub employee_name: String,
    pub work_date: NaiveDate,
    pub check_in: Option<NaiveTime>,
    pub check_out: Option<NaiveTime>,
    pub status: AttendanceStatus,
    pub note: Option<String>,
    pub minutes_worked: i64,
    /// Worked time formatted as `9h 0m`.
    pub hours_worked: String,
}

impl AttendanceEntry {
    fn from_parts(record: attendance_record::Model, person: Option<&employee::Model>) -> Self {
        let minutes = minutes_worked(record.check_in, record.check_out);
        Self {
            id: id_of(record.id),
            employee_id: id_of(record.employee_id),
            employee_code: person.map(|p| p.employee_id.clone()).unwrap_or_default(),
            employee_name: person.map(|p| p.name.clone()).unwrap_or_default(),
            work_date: record.work_date,
            check_in: record.check_in,
            check_out: record.check_out,
            status: record.status.into(),
            note: record.note,
            minutes_worked: minutes,
            hours_worked: format_duration(minutes),
        }
    }
}

#[derive(Clone, Debug, PartialEq, SimpleObject)]
pub struct AttendanceSummary {
    pub date: NaiveDate,
    pub total: i64,
    pub present: i64,
    pub late: i64,
    pub absent: i64,
    pub half_day: i64,
    pub present_rate: f64,
    pub late_rate: f64,
    pub absent_rate: f64,
    pub half_day_rate: f64,
}

#[derive(InputObject, Clone)]
pub struct MarkAttendanceInput {
    pub employee_id: ID,
    pub work_date: NaiveDate,
    pub check_in: Option<NaiveTime>,
    pub check_out: Option<NaiveTime>,
    pub status: AttendanceStatus,
    pub note: Option<String>,
}

#[derive(Default)]
pub struct AttendanceQuery;

#[Object]
impl AttendanceQuery {
    async fn attendance(
        &self,
        ctx: &Context<'_>,
        date: NaiveDate,
        status: Option<AttendanceStatus>,
    ) -> async_graphql::Result<Vec<AttendanceEntry>> {
        require_viewer(ctx)?;
        let db = database(ctx)?;
        let span = info_span!("hr.attendance.list", %date);
        async move {
            let mut query = attendance_record::Entity::find()
                .filter(attendance_record::Column::WorkDate.eq(date));
            if let Some(status) = status {
                let status: attendance_record::Status = status.into();
                query = query.filter(attendance_record::Column::Status.eq(status));
            }
            let records = query
                .order_by_asc(attendance_record::Column::CheckIn)
                .all(db.as_ref())
                .await
                .map_err(db_error)?;
            let people = employees_by_id(db.as_ref(), records.iter().map(|r| r.employee_id)).await?;
            let mut entries: Vec<AttendanceEntry> = records
                .into_iter()
                .map(|record| {
                    let person = people.get(&record.employee_id);
                    AttendanceEntry::from_parts(record, person)
                })
                .collect();
            entries.sort_by(|a, b| a.employee_code.cmp(&b.employee_code));
            Ok(entries)
        }
        .instrument(span)
        .await
    }

    async fn attendance_summary(
        &self,
        ctx: &Context<'_>,
        date: NaiveDate,
    ) -> async_graphql::Result<AttendanceSummary> {
        require_viewer(ctx)?;
        let db = database(ctx)?;
        let statuses = statuses_on(db.as_ref(), date).await?;
        Ok(summarize(date, &statuses))
    }
}

#[derive(Default)]
pub struct AttendanceMutation;

#[Object]
impl AttendanceMutation {
    async fn mark_attendance(
        &self,
        ctx: &Context<'_>,
        input: MarkAttendanceInput,
    ) -> async_graphql::Result<AttendanceEntry> {
        require_editor(ctx)?;
        let db = database(ctx)?;
        let employee_id = parse_uuid(&input.employee_id)?;
        if let (Some(check_in), Some(check_out)) = (input.check_in, input.check_out) {
            if check_out < check_in {
                return Err(validation_error("checkOut must not be before checkIn"));
            }
        }
        let note = optional_text("note", input.note.clone(), 1024)?;
        let person = ensure_employee_exists(db.as_ref(), employee_id).await?;
        let span = info_span!("hr.attendance.mark", employee = %person.employee_id, date = %input.work_date);
        async move {
            let existing = attendance_record::Entity::find()
                .filter(attendance_record::Column::EmployeeId.eq(employee_id))
                .filter(attendance_record::Column::WorkDate.eq(input.work_date))
                .one(db.as_ref())
                .await
                .map_err(db_error)?;
            let timestamp = now();
            let record = match existing {
                Some(row) => {
                    let mut active: attendance_record::ActiveModel = row.into();
                    active.check_in = Set(input.check_in);
                    active.check_out = Set(input.check_out);
                    active.status = Set(input.status.into());
                    active.note = Set(note);
                    active.updated_at = Set(timestamp);
                    active.update(db.as_ref()).await.map_err(db_error)?
                }
                None => attendance_record::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    employee_id: Set(employee_id),
                    work_date: Set(input.work_date),
                    check_in: Set(input.check_in),
                    check_out: Set(input.check_out),
                    status: Set(input.status.into()),
                    note: Set(note),
                    created_at: Set(timestamp),
                    updated_at: Set(timestamp),
                }
                .insert(db.as_ref())
                .await
                .map_err(|err| {
                    write_error(err, || {
                        format!(
                            "Attendance for {} on {} was recorded concurrently",
                            person.employee_id, input.work_date
                        )
                    })
                })?,
            };
            Ok(AttendanceEntry::from_parts(record, Some(&person)))
        }
        .instrument(span)
        .await
    }

    async fn delete_attendance(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<bool> {
        require_editor(ctx)?;
        let db = database(ctx)?;
        let record_id = parse_uuid(&id)?;
        let res = attendance_record::Entity::delete_by_id(record_id)
            .exec(db.as_ref())
            .await
            .map_err(db_error)?;
        Ok(res.rows_affected > 0)
    }
}

pub(crate) async fn statuses_on(
    db: &DatabaseConnection,
    date: NaiveDate,
) -> async_graphql::Result<Vec<attendance_record::Status>> {
    let rows = attendance_record::Entity::find()
        .filter(attendance_record::Column::WorkDate.eq(date))
        .all(db)
        .await
        .map_err(db_error)?;
    Ok(rows.into_iter().map(|row| row.status).collect())
}

pub(crate) async fn employees_by_id(
    db: &DatabaseConnection,
    ids: impl Iterator<Item = Uuid>,
) -> async_graphql::Result<HashMap<Uuid, employee::Model>> {
    let mut ids: Vec<Uuid> = ids.collect();
    ids.sort();
    ids.dedup();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = employee::Entity::find()
        .filter(employee::Column::Id.is_in(ids))
        .all(db)
        .await
        .map_err(db_error)?;
    Ok(rows.into_iter().map(|row| (row.id, row)).collect())
}

/// Minutes between check-in and check-out; zero unless both are present
/// and in order.
pub(crate) fn minutes_worked(check_in: Option<NaiveTime>, check_out: Option<NaiveTime>) -> i64 {
    match (check_in, check_out) {
        (Some(start), Some(end)) if end >= start => (end - start).num_minutes(),
        _ => 0,
    }
}

pub(crate) fn format_duration(minutes: i64) -> String {
    format!("{}h {}m", minutes / 60, minutes % 60)
}

pub(crate) fn summarize(date: NaiveDate, statuses: &[attendance_record::Status]) -> AttendanceSummary {
    use attendance_record::Status;

    let mut counts: HashMap<Status, i64> = HashMap::new();
    for status in statuses {
        *counts.entry(*status).or_insert(0) += 1;
    }
    let total = statuses.len() as i64;
    let count = |status: Status| counts.get(&status).copied().unwrap_or(0);
    AttendanceSummary {
        date,
        total,
        present: count(Status::Present),
        late: count(Status::Late),
        absent: count(Status::Absent),
        half_day: count(Status::HalfDay),
        present_rate: percentage(count(Status::Present), total),
        late_rate: percentage(count(Status::Late), total),
        absent_rate: percentage(count(Status::Absent), total),
        half_day_rate: percentage(count(Status::HalfDay), total),
    }
}
