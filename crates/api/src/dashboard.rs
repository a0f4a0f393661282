use std::collections::HashMap;

use async_graphql::{Context, Object, SimpleObject, ID};
use chrono::{NaiveDate, Utc};
use entity::{attendance_record, department, employee};
use sea_orm::{EntityTrait, QueryOrder};
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::attendance::statuses_on;
use crate::common::{database, db_error, id_of, percentage, require_viewer};
use crate::departments::count_by_department;
use crate::payroll::{period_start, records_for_period, total_net_cents, total_overflow};

pub(crate) const UNASSIGNED: &str = "Unassigned";

#[derive(Clone, Debug, PartialEq, SimpleObject)]
pub struct DashboardSnapshot {
    pub date: NaiveDate,
    pub total_employees: i64,
    pub department_count: i64,
    /// Employees marked present or late on `date`.
    pub present_today: i64,
    pub absent_today: i64,
    pub half_day_today: i64,
    pub payroll_period: NaiveDate,
    pub monthly_payroll_cents: i64,
}

#[derive(Clone, Debug, PartialEq, SimpleObject)]
pub struct DepartmentHeadcount {
    pub department_id: Option<ID>,
    pub department: String,
    pub employee_count: i64,
    pub share: f64,
}

#[derive(Default)]
pub struct DashboardQuery;

#[Object]
impl DashboardQuery {
    /// Headline numbers for the landing page. `date` defaults to today (UTC).
    async fn dashboard(
        &self,
        ctx: &Context<'_>,
        date: Option<NaiveDate>,
    ) -> async_graphql::Result<DashboardSnapshot> {
        require_viewer(ctx)?;
        let db = database(ctx)?;
        let date = date.unwrap_or_else(|| Utc::now().date_naive());
        let span = info_span!("hr.dashboard", %date);
        async move {
            let employees = employee::Entity::find()
                .all(db.as_ref())
                .await
                .map_err(db_error)?;
            let departments = department::Entity::find()
                .all(db.as_ref())
                .await
                .map_err(db_error)?;
            let statuses = statuses_on(db.as_ref(), date).await?;
            let period = period_start(date);
            let payroll = records_for_period(db.as_ref(), period).await?;
            let monthly = total_net_cents(&payroll).ok_or_else(|| total_overflow(period))?;
            Ok(snapshot(
                date,
                employees.len() as i64,
                departments.len() as i64,
                &statuses,
                period,
                monthly,
            ))
        }
        .instrument(span)
        .await
    }

    async fn headcount_by_department(
        &self,
        ctx: &Context<'_>,
    ) -> async_graphql::Result<Vec<DepartmentHeadcount>> {
        require_viewer(ctx)?;
        let db = database(ctx)?;
        let departments = department::Entity::find()
            .order_by_asc(department::Column::Name)
            .all(db.as_ref())
            .await
            .map_err(db_error)?;
        let employees = employee::Entity::find()
            .all(db.as_ref())
            .await
            .map_err(db_error)?;
        let counts = count_by_department(&employees);
        let names: Vec<(Uuid, String)> = departments.into_iter().map(|d| (d.id, d.name)).collect();
        Ok(headcount(&names, &counts, employees.len() as i64))
    }
}

fn snapshot(
    date: NaiveDate,
    total_employees: i64,
    department_count: i64,
    statuses: &[attendance_record::Status],
    payroll_period: NaiveDate,
    monthly_payroll_cents: i64,
) -> DashboardSnapshot {
    use attendance_record::Status;

    let count = |wanted: &[Status]| statuses.iter().filter(|s| wanted.contains(s)).count() as i64;
    DashboardSnapshot {
        date,
        total_employees,
        department_count,
        present_today: count(&[Status::Present, Status::Late]),
        absent_today: count(&[Status::Absent]),
        half_day_today: count(&[Status::HalfDay]),
        payroll_period,
        monthly_payroll_cents,
    }
}

/// One row per department in the given order, then an "Unassigned" row when
/// some employees have no department.
fn headcount(
    departments: &[(Uuid, String)],
    counts: &HashMap<Option<Uuid>, i64>,
    total: i64,
) -> Vec<DepartmentHeadcount> {
    let mut rows: Vec<DepartmentHeadcount> = departments
        .iter()
        .map(|(id, name)| {
            let employee_count = counts.get(&Some(*id)).copied().unwrap_or(0);
            DepartmentHeadcount {
                department_id: Some(id_of(*id)),
                department: name.clone(),
                employee_count,
                share: percentage(employee_count, total),
            }
        })
        .collect();
    let unassigned = counts.get(&None).copied().unwrap_or(0);
    if unassigned > 0 {
        rows.push(DepartmentHeadcount {
            department_id: None,
            department: UNASSIGNED.to_string(),
            employee_count: unassigned,
            share: percentage(unassigned, total),
        });
    }
    rows
}
