use async_graphql::{Context, InputObject, Object, SimpleObject, ID};
use chrono::{DateTime, Utc};
use entity::{company_asset, designation, employee, employee_asset, employee_type};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use uuid::Uuid;

use crate::common::{
    conflict_error, database, db_error, id_of, now, optional_text, parse_uuid, require_editor,
    require_viewer, required_text, write_error,
};

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "Designation")]
pub struct DesignationNode {
    pub id: ID,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<designation::Model> for DesignationNode {
    fn from(model: designation::Model) -> Self {
        Self {
            id: id_of(model.id),
            name: model.name,
            description: model.description,
            created_at: model.created_at.into(),
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "EmployeeType")]
pub struct EmployeeTypeNode {
    pub id: ID,
    pub name: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<employee_type::Model> for EmployeeTypeNode {
    fn from(model: employee_type::Model) -> Self {
        Self {
            id: id_of(model.id),
            name: model.name,
            image_url: model.image_url,
            created_at: model.created_at.into(),
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "CompanyAsset")]
pub struct CompanyAssetNode {
    pub id: ID,
    pub name: String,
    pub serial_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<company_asset::Model> for CompanyAssetNode {
    fn from(model: company_asset::Model) -> Self {
        Self {
            id: id_of(model.id),
            name: model.name,
            serial_number: model.serial_number,
            created_at: model.created_at.into(),
        }
    }
}

#[derive(InputObject, Clone)]
pub struct NewDesignationInput {
    pub name: String,
    pub description: Option<String>,
}

#[derive(InputObject, Clone)]
pub struct NewEmployeeTypeInput {
    pub name: String,
    pub image_url: Option<String>,
}

#[derive(InputObject, Clone)]
pub struct NewCompanyAssetInput {
    pub name: String,
    pub serial_number: Option<String>,
}

#[derive(Default)]
pub struct LookupQuery;

#[Object]
impl LookupQuery {
    async fn designations(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<DesignationNode>> {
        require_viewer(ctx)?;
        let db = database(ctx)?;
        let rows = designation::Entity::find()
            .order_by_asc(designation::Column::Name)
            .all(db.as_ref())
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn employee_types(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<EmployeeTypeNode>> {
        require_viewer(ctx)?;
        let db = database(ctx)?;
        let rows = employee_type::Entity::find()
            .order_by_asc(employee_type::Column::Name)
            .all(db.as_ref())
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn company_assets(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<CompanyAssetNode>> {
        require_viewer(ctx)?;
        let db = database(ctx)?;
        let rows = company_asset::Entity::find()
            .order_by_asc(company_asset::Column::Name)
            .all(db.as_ref())
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[derive(Default)]
pub struct LookupMutation;

#[Object]
impl LookupMutation {
    async fn create_designation(
        &self,
        ctx: &Context<'_>,
        input: NewDesignationInput,
    ) -> async_graphql::Result<DesignationNode> {
        require_editor(ctx)?;
        let db = database(ctx)?;
        let name = required_text("name", &input.name, 128)?;
        let taken = designation::Entity::find()
            .filter(designation::Column::Name.eq(name.as_str()))
            .one(db.as_ref())
            .await
            .map_err(db_error)?;
        if taken.is_some() {
            return Err(conflict_error(format!("Designation {} already exists", name)));
        }
        let model = designation::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.clone()),
            description: Set(optional_text("description", input.description, 1024)?),
            created_at: Set(now()),
        }
        .insert(db.as_ref())
        .await
        .map_err(|err| write_error(err, || format!("Designation {} already exists", name)))?;
        Ok(model.into())
    }

    async fn delete_designation(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<bool> {
        require_editor(ctx)?;
        let db = database(ctx)?;
        let designation_id = parse_uuid(&id)?;
        let txn = db.begin().await.map_err(db_error)?;
        employee::Entity::update_many()
            .col_expr(employee::Column::DesignationId, Expr::value(Option::<Uuid>::None))
            .filter(employee::Column::DesignationId.eq(designation_id))
            .exec(&txn)
            .await
            .map_err(db_error)?;
        let res = designation::Entity::delete_by_id(designation_id)
            .exec(&txn)
            .await
            .map_err(db_error)?;
        txn.commit().await.map_err(db_error)?;
        Ok(res.rows_affected > 0)
    }

    async fn create_employee_type(
        &self,
        ctx: &Context<'_>,
        input: NewEmployeeTypeInput,
    ) -> async_graphql::Result<EmployeeTypeNode> {
        require_editor(ctx)?;
        let db = database(ctx)?;
        let name = required_text("name", &input.name, 128)?;
        let taken = employee_type::Entity::find()
            .filter(employee_type::Column::Name.eq(name.as_str()))
            .one(db.as_ref())
            .await
            .map_err(db_error)?;
        if taken.is_some() {
            return Err(conflict_error(format!("Employee type {} already exists", name)));
        }
        let model = employee_type::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.clone()),
            image_url: Set(optional_text("imageUrl", input.image_url, 1024)?),
            created_at: Set(now()),
        }
        .insert(db.as_ref())
        .await
        .map_err(|err| write_error(err, || format!("Employee type {} already exists", name)))?;
        Ok(model.into())
    }

    async fn delete_employee_type(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<bool> {
        require_editor(ctx)?;
        let db = database(ctx)?;
        let type_id = parse_uuid(&id)?;
        let txn = db.begin().await.map_err(db_error)?;
        employee::Entity::update_many()
            .col_expr(employee::Column::EmployeeTypeId, Expr::value(Option::<Uuid>::None))
            .filter(employee::Column::EmployeeTypeId.eq(type_id))
            .exec(&txn)
            .await
            .map_err(db_error)?;
        let res = employee_type::Entity::delete_by_id(type_id)
            .exec(&txn)
            .await
            .map_err(db_error)?;
        txn.commit().await.map_err(db_error)?;
        Ok(res.rows_affected > 0)
    }

    async fn create_company_asset(
        &self,
        ctx: &Context<'_>,
        input: NewCompanyAssetInput,
    ) -> async_graphql::Result<CompanyAssetNode> {
        require_editor(ctx)?;
        let db = database(ctx)?;
        let model = company_asset::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(required_text("name", &input.name, 128)?),
            serial_number: Set(optional_text("serialNumber", input.serial_number, 128)?),
            created_at: Set(now()),
        }
        .insert(db.as_ref())
        .await
        .map_err(db_error)?;
        Ok(model.into())
    }

    async fn delete_company_asset(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<bool> {
        require_editor(ctx)?;
        let db = database(ctx)?;
        let asset_id = parse_uuid(&id)?;
        let txn = db.begin().await.map_err(db_error)?;
        employee_asset::Entity::delete_many()
            .filter(employee_asset::Column::AssetId.eq(asset_id))
            .exec(&txn)
            .await
            .map_err(db_error)?;
        let res = company_asset::Entity::delete_by_id(asset_id)
            .exec(&txn)
            .await
            .map_err(db_error)?;
        txn.commit().await.map_err(db_error)?;
        Ok(res.rows_affected > 0)
    }
}
