use std::collections::HashMap;

use async_graphql::{ComplexObject, Context, InputObject, MaybeUndefined, Object, SimpleObject, ID};
use chrono::{DateTime, Utc};
use entity::{department, employee};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::common::{
    conflict_error, database, db_error, id_of, maybe_id, not_found, now, optional_text,
    parse_optional_id, parse_uuid, require_editor, require_viewer, required_text, write_error,
};
use crate::employees::{ensure_employee_exists, EmployeeNode, NOT_ASSIGNED};

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "Department", complex)]
pub struct DepartmentNode {
    pub id: ID,
    pub name: String,
    pub description: Option<String>,
    pub head_employee_id: Option<ID>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[graphql(skip)]
    pub(crate) model: department::Model,
}

impl From<department::Model> for DepartmentNode {
    fn from(model: department::Model) -> Self {
        Self {
            id: id_of(model.id),
            name: model.name.clone(),
            description: model.description.clone(),
            head_employee_id: model.head_employee_id.map(id_of),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
            model,
        }
    }
}

#[ComplexObject]
impl DepartmentNode {
    async fn head(&self, ctx: &Context<'_>) -> async_graphql::Result<Option<EmployeeNode>> {
        let Some(head_id) = self.model.head_employee_id else {
            return Ok(None);
        };
        let db = database(ctx)?;
        let record = employee::Entity::find_by_id(head_id)
            .one(db.as_ref())
            .await
            .map_err(db_error)?;
        Ok(record.map(EmployeeNode::from))
    }

    async fn employees(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<EmployeeNode>> {
        let db = database(ctx)?;
        let rows = employee::Entity::find()
            .filter(employee::Column::DepartmentId.eq(self.model.id))
            .order_by_asc(employee::Column::EmployeeId)
            .all(db.as_ref())
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(EmployeeNode::from).collect())
    }
}

/// Row of the department overview: head details and live headcount.
#[derive(Clone, Debug, SimpleObject)]
pub struct DepartmentSummary {
    pub id: ID,
    pub name: String,
    pub description: Option<String>,
    pub head_employee_id: Option<ID>,
    pub head_name: String,
    pub head_image: Option<String>,
    pub employee_count: i64,
}

#[derive(Clone, Debug, SimpleObject)]
pub struct DepartmentDetail {
    pub department: DepartmentNode,
    pub head: Option<EmployeeNode>,
    /// Employees of the department other than its head.
    pub members: Vec<EmployeeNode>,
}

#[derive(Clone, Debug, SimpleObject)]
pub struct DepartmentStats {
    pub department_count: i64,
    pub total_employees: i64,
}

#[derive(InputObject, Clone)]
pub struct NewDepartmentInput {
    pub name: String,
    pub description: Option<String>,
    pub head_employee_id: Option<ID>,
}

#[derive(InputObject, Clone)]
pub struct UpdateDepartmentInput {
    pub id: ID,
    pub name: Option<String>,
    pub description: Option<String>,
    #[graphql(default)]
    pub head_employee_id: MaybeUndefined<ID>,
}

#[derive(Default)]
pub struct DepartmentQuery;

#[Object]
impl DepartmentQuery {
    async fn departments(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<DepartmentSummary>> {
        require_viewer(ctx)?;
        let db = database(ctx)?;
        let span = info_span!("hr.departments.list");
        async move {
            let departments = department::Entity::find()
                .order_by_asc(department::Column::Name)
                .all(db.as_ref())
                .await
                .map_err(db_error)?;
            let employees = employee::Entity::find()
                .all(db.as_ref())
                .await
                .map_err(db_error)?;
            Ok(summarize_departments(departments, &employees))
        }
        .instrument(span)
        .await
    }

    async fn department(
        &self,
        ctx: &Context<'_>,
        id: ID,
    ) -> async_graphql::Result<Option<DepartmentDetail>> {
        require_viewer(ctx)?;
        let db = database(ctx)?;
        let department_id = parse_uuid(&id)?;
        let Some(record) = department::Entity::find_by_id(department_id)
            .one(db.as_ref())
            .await
            .map_err(db_error)?
        else {
            return Ok(None);
        };
        let head = match record.head_employee_id {
            Some(head_id) => employee::Entity::find_by_id(head_id)
                .one(db.as_ref())
                .await
                .map_err(db_error)?,
            None => None,
        };
        let mut query = employee::Entity::find()
            .filter(employee::Column::DepartmentId.eq(department_id));
        if let Some(head_id) = record.head_employee_id {
            query = query.filter(employee::Column::Id.ne(head_id));
        }
        let members = query
            .order_by_asc(employee::Column::EmployeeId)
            .all(db.as_ref())
            .await
            .map_err(db_error)?;
        Ok(Some(DepartmentDetail {
            department: record.into(),
            head: head.map(EmployeeNode::from),
            members: members.into_iter().map(EmployeeNode::from).collect(),
        }))
    }

    async fn department_stats(&self, ctx: &Context<'_>) -> async_graphql::Result<DepartmentStats> {
        require_viewer(ctx)?;
        let db = database(ctx)?;
        let departments = department::Entity::find()
            .all(db.as_ref())
            .await
            .map_err(db_error)?;
        let employees = employee::Entity::find()
            .all(db.as_ref())
            .await
            .map_err(db_error)?;
        let summaries = summarize_departments(departments, &employees);
        Ok(DepartmentStats {
            department_count: summaries.len() as i64,
            total_employees: summaries.iter().map(|s| s.employee_count).sum(),
        })
    }
}

#[derive(Default)]
pub struct DepartmentMutation;

#[Object]
impl DepartmentMutation {
    async fn create_department(
        &self,
        ctx: &Context<'_>,
        input: NewDepartmentInput,
    ) -> async_graphql::Result<DepartmentNode> {
        require_editor(ctx)?;
        let db = database(ctx)?;
        let name = required_text("name", &input.name, 128)?;
        let description = optional_text("description", input.description, 2048)?;
        let head_employee_id = parse_optional_id("headEmployeeId", &input.head_employee_id)?;
        ensure_name_available(db.as_ref(), &name, None).await?;
        if let Some(head_id) = head_employee_id {
            ensure_employee_exists(db.as_ref(), head_id).await?;
        }
        let timestamp = now();
        let model = department::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.clone()),
            description: Set(description),
            head_employee_id: Set(head_employee_id),
            created_at: Set(timestamp),
            updated_at: Set(timestamp),
        }
        .insert(db.as_ref())
        .await
        .map_err(|err| write_error(err, || format!("Department {} already exists", name)))?;
        info!(department = %model.name, "department created");
        Ok(model.into())
    }

    async fn update_department(
        &self,
        ctx: &Context<'_>,
        input: UpdateDepartmentInput,
    ) -> async_graphql::Result<DepartmentNode> {
        require_editor(ctx)?;
        let db = database(ctx)?;
        let department_id = parse_uuid(&input.id)?;
        let existing = department::Entity::find_by_id(department_id)
            .one(db.as_ref())
            .await
            .map_err(db_error)?
            .ok_or_else(|| not_found("Department"))?;
        let mut active: department::ActiveModel = existing.into();
        if let Some(name) = &input.name {
            let name = required_text("name", name, 128)?;
            ensure_name_available(db.as_ref(), &name, Some(department_id)).await?;
            active.name = Set(name);
        }
        if input.description.is_some() {
            active.description = Set(optional_text("description", input.description.clone(), 2048)?);
        }
        if let Some(head) = maybe_id("headEmployeeId", &input.head_employee_id)? {
            if let Some(head_id) = head {
                ensure_employee_exists(db.as_ref(), head_id).await?;
            }
            active.head_employee_id = Set(head);
        }
        active.updated_at = Set(now());
        let model = active.update(db.as_ref()).await.map_err(db_error)?;
        Ok(model.into())
    }

    async fn delete_department(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<bool> {
        require_editor(ctx)?;
        let db = database(ctx)?;
        let department_id = parse_uuid(&id)?;
        let txn = db.begin().await.map_err(db_error)?;
        employee::Entity::update_many()
            .col_expr(employee::Column::DepartmentId, Expr::value(Option::<Uuid>::None))
            .filter(employee::Column::DepartmentId.eq(department_id))
            .exec(&txn)
            .await
            .map_err(db_error)?;
        let res = department::Entity::delete_by_id(department_id)
            .exec(&txn)
            .await
            .map_err(db_error)?;
        txn.commit().await.map_err(db_error)?;
        Ok(res.rows_affected > 0)
    }
}

async fn ensure_name_available(
    db: &DatabaseConnection,
    name: &str,
    except: Option<Uuid>,
) -> async_graphql::Result<()> {
    let mut query = department::Entity::find().filter(department::Column::Name.eq(name));
    if let Some(id) = except {
        query = query.filter(department::Column::Id.ne(id));
    }
    if query.one(db).await.map_err(db_error)?.is_some() {
        return Err(conflict_error(format!("Department {} already exists", name)));
    }
    Ok(())
}

/// Counts employees per department in a single pass over the employee rows.
pub(crate) fn count_by_department(employees: &[employee::Model]) -> HashMap<Option<Uuid>, i64> {
    let mut counts = HashMap::new();
    for row in employees {
        *counts.entry(row.department_id).or_insert(0) += 1;
    }
    counts
}

fn summarize_departments(
    departments: Vec<department::Model>,
    employees: &[employee::Model],
) -> Vec<DepartmentSummary> {
    let counts = count_by_department(employees);
    let by_id: HashMap<Uuid, &employee::Model> = employees.iter().map(|e| (e.id, e)).collect();
    departments
        .into_iter()
        .map(|dept| {
            let head = dept.head_employee_id.and_then(|id| by_id.get(&id));
            DepartmentSummary {
                id: id_of(dept.id),
                employee_count: counts.get(&Some(dept.id)).copied().unwrap_or(0),
                head_employee_id: dept.head_employee_id.map(id_of),
                head_name: head
                    .map(|h| h.name.clone())
                    .unwrap_or_else(|| NOT_ASSIGNED.to_string()),
                head_image: head.and_then(|h| h.image.clone()),
                name: dept.name,
                description: dept.description,
            }
        })
        .collect()
}
