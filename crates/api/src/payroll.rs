use async_graphql::{Context, Enum, InputObject, MaybeUndefined, Object, SimpleObject, ID};
use chrono::{Datelike, NaiveDate};
use entity::payroll_record;
use platform_api::internal_error;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder,
};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::attendance::employees_by_id;
use crate::common::{
    conflict_error, database, db_error, id_of, maybe_value, not_found, now, parse_uuid,
    percentage, require_editor, require_viewer, validation_error, write_error,
};
use crate::employees::ensure_employee_exists;

const DEFAULT_CURRENCY: &str = "USD";
/// Per-component ceiling; keeps a month of records far from `i64` limits.
const MAX_AMOUNT_CENTS: i64 = 1_000_000_000_000_000;

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum PayrollStatus {
    Pending,
    Processing,
    Processed,
}

impl From<payroll_record::Status> for PayrollStatus {
    fn from(value: payroll_record::Status) -> Self {
        match value {
            payroll_record::Status::Pending => PayrollStatus::Pending,
            payroll_record::Status::Processing => PayrollStatus::Processing,
            payroll_record::Status::Processed => PayrollStatus::Processed,
        }
    }
}

impl From<PayrollStatus> for payroll_record::Status {
    fn from(value: PayrollStatus) -> Self {
        match value {
            PayrollStatus::Pending => payroll_record::Status::Pending,
            PayrollStatus::Processing => payroll_record::Status::Processing,
            PayrollStatus::Processed => payroll_record::Status::Processed,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct PayrollEntry {
    pub id: ID,
    pub employee_id: ID,
    pub employee_code: String,
    pub employee_name: String,
    pub period: NaiveDate,
    pub pay_date: Option<NaiveDate>,
    pub basic_salary_cents: i64,
    pub allowances_cents: i64,
    pub deductions_cents: i64,
    pub net_salary_cents: i64,
    pub currency: String,
    pub status: PayrollStatus,
}

impl PayrollEntry {
    fn from_parts(record: payroll_record::Model, code: String, name: String) -> Self {
        Self {
            id: id_of(record.id),
            employee_id: id_of(record.employee_id),
            employee_code: code,
            employee_name: name,
            period: record.period,
            pay_date: record.pay_date,
            basic_salary_cents: record.basic_salary_cents,
            allowances_cents: record.allowances_cents,
            deductions_cents: record.deductions_cents,
            net_salary_cents: record.net_salary_cents,
            currency: record.currency,
            status: record.status.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, SimpleObject)]
pub struct PayrollSummary {
    pub period: NaiveDate,
    pub total_net_cents: i64,
    pub record_count: i64,
    pub processed_count: i64,
    pub completion_rate: f64,
    pub average_net_cents: i64,
}

#[derive(InputObject, Clone)]
pub struct NewPayrollInput {
    pub employee_id: ID,
    /// Any day in the pay month.
    pub period: NaiveDate,
    pub pay_date: Option<NaiveDate>,
    pub basic_salary_cents: i64,
    pub allowances_cents: Option<i64>,
    pub deductions_cents: Option<i64>,
    pub currency: Option<String>,
    pub status: Option<PayrollStatus>,
}

#[derive(InputObject, Clone)]
pub struct UpdatePayrollInput {
    pub id: ID,
    #[graphql(default)]
    pub pay_date: MaybeUndefined<NaiveDate>,
    pub basic_salary_cents: Option<i64>,
    pub allowances_cents: Option<i64>,
    pub deductions_cents: Option<i64>,
    pub currency: Option<String>,
    pub status: Option<PayrollStatus>,
}

#[derive(Default)]
pub struct PayrollQuery;

#[Object]
impl PayrollQuery {
    async fn payroll(
        &self,
        ctx: &Context<'_>,
        period: NaiveDate,
        status: Option<PayrollStatus>,
    ) -> async_graphql::Result<Vec<PayrollEntry>> {
        require_viewer(ctx)?;
        let db = database(ctx)?;
        let period = period_start(period);
        let span = info_span!("hr.payroll.list", %period);
        async move {
            let mut query = payroll_record::Entity::find()
                .filter(payroll_record::Column::Period.eq(period));
            if let Some(status) = status {
                let status: payroll_record::Status = status.into();
                query = query.filter(payroll_record::Column::Status.eq(status));
            }
            let records = query
                .order_by_desc(payroll_record::Column::NetSalaryCents)
                .all(db.as_ref())
                .await
                .map_err(db_error)?;
            let people = employees_by_id(db.as_ref(), records.iter().map(|r| r.employee_id)).await?;
            Ok(records
                .into_iter()
                .map(|record| {
                    let (code, name) = people
                        .get(&record.employee_id)
                        .map(|p| (p.employee_id.clone(), p.name.clone()))
                        .unwrap_or_default();
                    PayrollEntry::from_parts(record, code, name)
                })
                .collect())
        }
        .instrument(span)
        .await
    }

    async fn payroll_summary(
        &self,
        ctx: &Context<'_>,
        period: NaiveDate,
    ) -> async_graphql::Result<PayrollSummary> {
        require_viewer(ctx)?;
        let db = database(ctx)?;
        let period = period_start(period);
        let records = records_for_period(db.as_ref(), period).await?;
        summarize_payroll(period, &records).ok_or_else(|| total_overflow(period))
    }
}

#[derive(Default)]
pub struct PayrollMutation;

#[Object]
impl PayrollMutation {
    async fn create_payroll_record(
        &self,
        ctx: &Context<'_>,
        input: NewPayrollInput,
    ) -> async_graphql::Result<PayrollEntry> {
        let current = require_editor(ctx)?;
        let db = database(ctx)?;
        let employee_id = parse_uuid(&input.employee_id)?;
        let period = period_start(input.period);
        let allowances = input.allowances_cents.unwrap_or(0);
        let deductions = input.deductions_cents.unwrap_or(0);
        let net = net_salary(input.basic_salary_cents, allowances, deductions)
            .map_err(validation_error)?;
        let currency = normalize_currency(input.currency.as_deref()).map_err(validation_error)?;
        let person = ensure_employee_exists(db.as_ref(), employee_id).await?;

        let duplicate = payroll_record::Entity::find()
            .filter(payroll_record::Column::EmployeeId.eq(employee_id))
            .filter(payroll_record::Column::Period.eq(period))
            .one(db.as_ref())
            .await
            .map_err(db_error)?;
        if duplicate.is_some() {
            return Err(conflict_error(format!(
                "Payroll for {} in {} already exists",
                person.employee_id,
                period.format("%Y-%m")
            )));
        }

        let timestamp = now();
        let record = payroll_record::ActiveModel {
            id: Set(Uuid::new_v4()),
            employee_id: Set(employee_id),
            period: Set(period),
            pay_date: Set(input.pay_date),
            basic_salary_cents: Set(input.basic_salary_cents),
            allowances_cents: Set(allowances),
            deductions_cents: Set(deductions),
            net_salary_cents: Set(net),
            currency: Set(currency),
            status: Set(input.status.unwrap_or(PayrollStatus::Pending).into()),
            created_at: Set(timestamp),
            updated_at: Set(timestamp),
        }
        .insert(db.as_ref())
        .await
        .map_err(|err| {
            write_error(err, || {
                format!(
                    "Payroll for {} in {} already exists",
                    person.employee_id,
                    period.format("%Y-%m")
                )
            })
        })?;
        info!(employee = %person.employee_id, %period, by = %current.subject, "payroll record created");
        Ok(PayrollEntry::from_parts(record, person.employee_id, person.name))
    }

    async fn update_payroll_record(
        &self,
        ctx: &Context<'_>,
        input: UpdatePayrollInput,
    ) -> async_graphql::Result<PayrollEntry> {
        require_editor(ctx)?;
        let db = database(ctx)?;
        let record_id = parse_uuid(&input.id)?;
        let existing = payroll_record::Entity::find_by_id(record_id)
            .one(db.as_ref())
            .await
            .map_err(db_error)?
            .ok_or_else(|| not_found("Payroll record"))?;

        let basic = input.basic_salary_cents.unwrap_or(existing.basic_salary_cents);
        let allowances = input.allowances_cents.unwrap_or(existing.allowances_cents);
        let deductions = input.deductions_cents.unwrap_or(existing.deductions_cents);
        let net = net_salary(basic, allowances, deductions).map_err(validation_error)?;

        let mut active: payroll_record::ActiveModel = existing.clone().into();
        active.basic_salary_cents = Set(basic);
        active.allowances_cents = Set(allowances);
        active.deductions_cents = Set(deductions);
        active.net_salary_cents = Set(net);
        if let Some(pay_date) = maybe_value(&input.pay_date) {
            active.pay_date = Set(pay_date);
        }
        if input.currency.is_some() {
            active.currency =
                Set(normalize_currency(input.currency.as_deref()).map_err(validation_error)?);
        }
        if let Some(status) = input.status {
            active.status = Set(status.into());
        }
        active.updated_at = Set(now());
        let record = active.update(db.as_ref()).await.map_err(db_error)?;

        let person = ensure_employee_exists(db.as_ref(), existing.employee_id).await?;
        Ok(PayrollEntry::from_parts(record, person.employee_id, person.name))
    }

    async fn delete_payroll_record(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<bool> {
        require_editor(ctx)?;
        let db = database(ctx)?;
        let record_id = parse_uuid(&id)?;
        let res = payroll_record::Entity::delete_by_id(record_id)
            .exec(db.as_ref())
            .await
            .map_err(db_error)?;
        Ok(res.rows_affected > 0)
    }
}

pub(crate) async fn records_for_period(
    db: &DatabaseConnection,
    period: NaiveDate,
) -> async_graphql::Result<Vec<payroll_record::Model>> {
    payroll_record::Entity::find()
        .filter(payroll_record::Column::Period.eq(period))
        .all(db)
        .await
        .map_err(db_error)
}

/// First day of the month containing `date`.
pub(crate) fn period_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

pub(crate) fn net_salary(basic: i64, allowances: i64, deductions: i64) -> Result<i64, String> {
    if basic < 0 || allowances < 0 || deductions < 0 {
        return Err("Salary amounts must not be negative".into());
    }
    if basic > MAX_AMOUNT_CENTS || allowances > MAX_AMOUNT_CENTS || deductions > MAX_AMOUNT_CENTS {
        return Err(format!("Salary amounts must not exceed {MAX_AMOUNT_CENTS} cents"));
    }
    let gross = basic
        .checked_add(allowances)
        .ok_or_else(|| "Salary amounts are too large".to_string())?;
    if deductions > gross {
        return Err("Deductions must not exceed basic salary plus allowances".into());
    }
    Ok(gross - deductions)
}

pub(crate) fn normalize_currency(raw: Option<&str>) -> Result<String, String> {
    let Some(code) = raw.map(str::trim).filter(|c| !c.is_empty()) else {
        return Ok(DEFAULT_CURRENCY.to_string());
    };
    let code = code.to_ascii_uppercase();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(format!("{} is not a three-letter currency code", code));
    }
    Ok(code)
}

/// Sum of net salaries, `None` when it does not fit in an `i64`.
pub(crate) fn total_net_cents(records: &[payroll_record::Model]) -> Option<i64> {
    records
        .iter()
        .try_fold(0i64, |acc, r| acc.checked_add(r.net_salary_cents))
}

pub(crate) fn total_overflow(period: NaiveDate) -> async_graphql::Error {
    internal_error(anyhow::anyhow!(
        "net payroll total for {} overflows",
        period.format("%Y-%m")
    ))
}

pub(crate) fn summarize_payroll(
    period: NaiveDate,
    records: &[payroll_record::Model],
) -> Option<PayrollSummary> {
    let record_count = records.len() as i64;
    let total_net_cents = total_net_cents(records)?;
    let processed_count = records
        .iter()
        .filter(|r| r.status == payroll_record::Status::Processed)
        .count() as i64;
    Some(PayrollSummary {
        period,
        total_net_cents,
        record_count,
        processed_count,
        completion_rate: percentage(processed_count, record_count),
        average_net_cents: if record_count == 0 {
            0
        } else {
            total_net_cents / record_count
        },
    })
}
