use async_graphql::{Context, Enum, InputObject, Object, SimpleObject, ID};
use chrono::{DateTime, NaiveDate, Utc};
use entity::{employee, employee_field};
use sea_orm::sea_query::{Alias, Expr, Func, Query};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ConnectionTrait, DatabaseConnection, EntityTrait,
    IdenStatic, Iterable, QueryOrder, Statement, TransactionTrait, Value,
};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::auth::HrRole;
use crate::common::{
    conflict_error, database, db_error, looks_like_email, not_found, now, parse_uuid,
    require_editor, require_role, require_viewer, required_text, validation_error, write_error,
};

const MAX_FIELD_NAME: usize = 63;

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum FieldKind {
    Text,
    Email,
    Date,
    Number,
}

impl From<employee_field::FieldType> for FieldKind {
    fn from(value: employee_field::FieldType) -> Self {
        match value {
            employee_field::FieldType::Text => FieldKind::Text,
            employee_field::FieldType::Email => FieldKind::Email,
            employee_field::FieldType::Date => FieldKind::Date,
            employee_field::FieldType::Number => FieldKind::Number,
        }
    }
}

impl From<FieldKind> for employee_field::FieldType {
    fn from(value: FieldKind) -> Self {
        match value {
            FieldKind::Text => employee_field::FieldType::Text,
            FieldKind::Email => employee_field::FieldType::Email,
            FieldKind::Date => employee_field::FieldType::Date,
            FieldKind::Number => employee_field::FieldType::Number,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "EmployeeField")]
pub struct EmployeeFieldNode {
    pub name: String,
    pub label: String,
    pub field_type: FieldKind,
    pub created_at: DateTime<Utc>,
}

impl From<employee_field::Model> for EmployeeFieldNode {
    fn from(model: employee_field::Model) -> Self {
        Self {
            name: model.name,
            label: model.label,
            field_type: model.field_type.into(),
            created_at: model.created_at.into(),
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct CustomFieldValue {
    pub name: String,
    pub label: String,
    pub field_type: FieldKind,
    /// Stored value rendered as text; `null` when unset.
    pub value: Option<String>,
}

#[derive(InputObject, Clone)]
pub struct AddEmployeeFieldInput {
    pub name: String,
    pub label: String,
    pub field_type: FieldKind,
}

#[derive(Default)]
pub struct FieldQuery;

#[Object]
impl FieldQuery {
    async fn employee_fields(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<EmployeeFieldNode>> {
        require_viewer(ctx)?;
        let db = database(ctx)?;
        let rows = load_fields(db.as_ref()).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn employee_custom_values(
        &self,
        ctx: &Context<'_>,
        employee_id: ID,
    ) -> async_graphql::Result<Vec<CustomFieldValue>> {
        require_viewer(ctx)?;
        let db = database(ctx)?;
        let employee_id = parse_uuid(&employee_id)?;
        employee::Entity::find_by_id(employee_id)
            .one(db.as_ref())
            .await
            .map_err(db_error)?
            .ok_or_else(|| not_found("Employee"))?;
        let fields = load_fields(db.as_ref()).await?;
        read_custom_values(db.as_ref(), employee_id, fields).await
    }
}

#[derive(Default)]
pub struct FieldMutation;

#[Object]
impl FieldMutation {
    async fn add_employee_field(
        &self,
        ctx: &Context<'_>,
        input: AddEmployeeFieldInput,
    ) -> async_graphql::Result<EmployeeFieldNode> {
        let current = require_role(ctx, HrRole::Admin)?;
        let db = database(ctx)?;
        let name = normalize_field_name(&input.name).map_err(validation_error)?;
        let label = required_text("label", &input.label, 128)?;
        let field_type: employee_field::FieldType = input.field_type.into();

        let registered = employee_field::Entity::find_by_id(name.clone())
            .one(db.as_ref())
            .await
            .map_err(db_error)?;
        if registered.is_some() {
            return Err(conflict_error(format!("Field {} already exists", name)));
        }

        let span = info_span!("hr.fields.add", field = %name, kind = field_type.sql_type());
        async move {
            let txn = db.begin().await.map_err(db_error)?;
            let model = employee_field::ActiveModel {
                name: Set(name.clone()),
                label: Set(label),
                field_type: Set(field_type),
                created_at: Set(now()),
            }
            .insert(&txn)
            .await
            .map_err(|err| write_error(err, || format!("Field {} already exists", name)))?;
            let ddl = Statement::from_string(
                txn.get_database_backend(),
                add_column_sql(&name, field_type),
            );
            txn.execute(ddl).await.map_err(db_error)?;
            txn.commit().await.map_err(db_error)?;
            info!(by = %current.subject, "employee field added");
            Ok(model.into())
        }
        .instrument(span)
        .await
    }

    async fn set_employee_custom_value(
        &self,
        ctx: &Context<'_>,
        employee_id: ID,
        field: String,
        value: Option<String>,
    ) -> async_graphql::Result<CustomFieldValue> {
        require_editor(ctx)?;
        let db = database(ctx)?;
        let employee_id = parse_uuid(&employee_id)?;
        let definition = employee_field::Entity::find_by_id(field.trim().to_string())
            .one(db.as_ref())
            .await
            .map_err(db_error)?
            .ok_or_else(|| not_found("Employee field"))?;
        let stored = coerce_custom_value(definition.field_type, value.as_deref())
            .map_err(validation_error)?;

        let mut update = Query::update();
        update
            .table(employee::Entity)
            .value(Alias::new(definition.name.as_str()), stored)
            .value(employee::Column::UpdatedAt, now())
            .and_where(Expr::col(employee::Column::Id).eq(employee_id));
        let backend = db.get_database_backend();
        let res = db
            .execute(backend.build(&update))
            .await
            .map_err(db_error)?;
        if res.rows_affected() == 0 {
            return Err(not_found("Employee"));
        }

        let mut values = read_custom_values(db.as_ref(), employee_id, vec![definition]).await?;
        values.pop().ok_or_else(|| not_found("Employee field"))
    }
}

async fn load_fields(db: &DatabaseConnection) -> async_graphql::Result<Vec<employee_field::Model>> {
    employee_field::Entity::find()
        .order_by_asc(employee_field::Column::CreatedAt)
        .order_by_asc(employee_field::Column::Name)
        .all(db)
        .await
        .map_err(db_error)
}

async fn read_custom_values(
    db: &DatabaseConnection,
    employee_id: Uuid,
    fields: Vec<employee_field::Model>,
) -> async_graphql::Result<Vec<CustomFieldValue>> {
    if fields.is_empty() {
        return Ok(vec![]);
    }
    let mut select = Query::select();
    for field in &fields {
        select.expr_as(
            Func::cast_as(Expr::col(Alias::new(field.name.as_str())), Alias::new("text")),
            Alias::new(field.name.as_str()),
        );
    }
    select
        .from(employee::Entity)
        .and_where(Expr::col(employee::Column::Id).eq(employee_id));
    let backend = db.get_database_backend();
    let Some(row) = db
        .query_one(backend.build(&select))
        .await
        .map_err(db_error)?
    else {
        return Err(not_found("Employee"));
    };

    let mut values = Vec::with_capacity(fields.len());
    for field in fields {
        let value: Option<String> = row.try_get("", &field.name).map_err(db_error)?;
        values.push(CustomFieldValue {
            value,
            field_type: field.field_type.into(),
            name: field.name,
            label: field.label,
        });
    }
    Ok(values)
}

/// Trims and lowercases a proposed column name, then checks it is a plain
/// identifier that does not shadow a built-in employee column.
pub(crate) fn normalize_field_name(raw: &str) -> Result<String, String> {
    let name = raw.trim().to_lowercase();
    let mut chars = name.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_lowercase());
    let rest_ok = chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if !starts_with_letter || !rest_ok || name.len() > MAX_FIELD_NAME {
        return Err(format!(
            "Field name must start with a letter and contain only a-z, 0-9 or _ (max {} characters)",
            MAX_FIELD_NAME
        ));
    }
    if employee::Column::iter().any(|column| column.as_str() == name) {
        return Err(format!("{} is a built-in employee column", name));
    }
    Ok(name)
}

pub(crate) fn add_column_sql(name: &str, field_type: employee_field::FieldType) -> String {
    format!(
        "ALTER TABLE employee_master ADD COLUMN \"{}\" {}",
        name,
        field_type.sql_type()
    )
}

/// Converts client input into a typed value for the custom column. Blank
/// input clears the column.
pub(crate) fn coerce_custom_value(
    field_type: employee_field::FieldType,
    raw: Option<&str>,
) -> Result<Value, String> {
    use employee_field::FieldType;

    let raw = raw.map(str::trim).filter(|v| !v.is_empty());
    let Some(raw) = raw else {
        return Ok(match field_type {
            FieldType::Text | FieldType::Email => Option::<String>::None.into(),
            FieldType::Date => Option::<NaiveDate>::None.into(),
            FieldType::Number => Option::<f64>::None.into(),
        });
    };
    match field_type {
        FieldType::Text => Ok(raw.to_string().into()),
        FieldType::Email => {
            if looks_like_email(raw) {
                Ok(raw.to_lowercase().into())
            } else {
                Err(format!("{} is not a valid email address", raw))
            }
        }
        FieldType::Date => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Into::into)
            .map_err(|_| format!("{} is not a date (expected YYYY-MM-DD)", raw)),
        FieldType::Number => match raw.parse::<f64>() {
            Ok(number) if number.is_finite() => Ok(number.into()),
            _ => Err(format!("{} is not a number", raw)),
        },
    }
}
