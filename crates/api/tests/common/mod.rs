#![allow(dead_code)]

use std::sync::Arc;

use api::auth::{CurrentUser, HrRole};
use api::schema::{build_schema, seed_hr_demo, AppSchema, SeededHrRecords};
use async_graphql::{Request, Response, ServerError, Value as GqlValue, Variables};
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use serde_json::Value;

pub type HrSchema = async_graphql::Schema<
    api::schema::QueryRoot,
    api::schema::MutationRoot,
    async_graphql::EmptySubscription,
>;

pub struct HrTestContext {
    pub db: Arc<DatabaseConnection>,
    pub schema: HrSchema,
    pub seeded: Option<SeededHrRecords>,
}

impl HrTestContext {
    pub async fn new() -> Self {
        let conn = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&conn, None).await.unwrap();
        let db = Arc::new(conn);
        let AppSchema(schema) = build_schema(db.clone());
        Self {
            db,
            schema,
            seeded: None,
        }
    }

    pub async fn new_seeded() -> Self {
        let mut ctx = Self::new().await;
        ctx.seeded = Some(seed_hr_demo(ctx.db.as_ref()).await.unwrap());
        ctx
    }

    pub fn seeded(&self) -> &SeededHrRecords {
        self.seeded.as_ref().expect("context was not seeded")
    }

    pub fn employee_id(&self, code: &str) -> String {
        self.seeded()
            .employee_code(code)
            .unwrap_or_else(|| panic!("seed employee {code}"))
            .id
            .to_string()
    }

    pub fn department_id(&self, name: &str) -> String {
        self.seeded()
            .department_named(name)
            .unwrap_or_else(|| panic!("seed department {name}"))
            .id
            .to_string()
    }

    /// Runs as an HR editor.
    pub async fn exec(&self, query: &str, vars: Value) -> Response {
        self.exec_as(Some(HrRole::Hr), query, vars).await
    }

    pub async fn exec_as(&self, role: Option<HrRole>, query: &str, vars: Value) -> Response {
        let mut request = Request::new(query).variables(Variables::from_json(vars));
        if let Some(role) = role {
            request = request.data(CurrentUser::new(
                format!("{}@hrm.test", role.as_str().to_lowercase()),
                vec![role],
            ));
        }
        self.schema.execute(request).await
    }

    /// Executes as HR and returns `data.hr` after asserting there were no errors.
    pub async fn hr_data(&self, query: &str, vars: Value) -> Value {
        let resp = self.exec(query, vars).await;
        assert!(resp.errors.is_empty(), "unexpected errors: {:?}", resp.errors);
        resp.data.into_json().unwrap()["hr"].clone()
    }
}

pub fn has_error_code(errors: &[ServerError], code: &str) -> bool {
    errors
        .iter()
        .any(|e| matches_code(e.extensions.as_ref(), code))
}

fn matches_code(values: Option<&async_graphql::ErrorExtensionValues>, code: &str) -> bool {
    match values.and_then(|ext| ext.get("code")) {
        Some(GqlValue::String(s)) => s == code,
        Some(GqlValue::Enum(name)) => name.as_str() == code,
        _ => false,
    }
}
