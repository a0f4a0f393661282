use std::sync::Arc;

use async_graphql::{Context, EmptySubscription, MergedObject, Object, Schema, SimpleObject};
use sea_orm::DatabaseConnection;

use crate::attendance::{AttendanceMutation, AttendanceQuery};
use crate::common::require_viewer;
use crate::dashboard::DashboardQuery;
use crate::departments::{DepartmentMutation, DepartmentQuery};
use crate::employees::{EmployeeMutation, EmployeeQuery};
use crate::fields::{FieldMutation, FieldQuery};
use crate::lookups::{LookupMutation, LookupQuery};
use crate::payroll::{PayrollMutation, PayrollQuery};
use crate::performance::{PerformanceMutation, PerformanceQuery};

pub use crate::seed::{seed_hr_demo, SeededHrRecords};

const MAX_QUERY_DEPTH: usize = 16;

pub struct AppSchema(pub Schema<QueryRoot, MutationRoot, EmptySubscription>);

pub fn build_schema(db: Arc<DatabaseConnection>) -> AppSchema {
    let schema = Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(db)
        .limit_depth(MAX_QUERY_DEPTH)
        .finish();
    AppSchema(schema)
}

/// SDL of the schema; resolvers are not run so no connection is needed.
pub fn schema_sdl() -> String {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .finish()
        .sdl()
}

pub struct QueryRoot;
pub struct MutationRoot;

#[derive(MergedObject, Default)]
pub struct HrQuery(
    EmployeeQuery,
    DepartmentQuery,
    LookupQuery,
    FieldQuery,
    AttendanceQuery,
    PayrollQuery,
    PerformanceQuery,
    DashboardQuery,
);

#[derive(MergedObject, Default)]
pub struct HrMutation(
    EmployeeMutation,
    DepartmentMutation,
    LookupMutation,
    FieldMutation,
    AttendanceMutation,
    PayrollMutation,
    PerformanceMutation,
);

#[derive(Clone, Debug, SimpleObject)]
pub struct MePayload {
    pub subject: String,
    pub roles: Vec<String>,
}

#[Object]
impl QueryRoot {
    /// Identity carried by the verified bearer token.
    async fn me(&self, ctx: &Context<'_>) -> async_graphql::Result<MePayload> {
        let current = require_viewer(ctx)?;
        Ok(MePayload {
            roles: current.roles.iter().map(|r| r.as_str().to_string()).collect(),
            subject: current.subject,
        })
    }

    async fn hr(&self) -> HrQuery {
        HrQuery::default()
    }
}

#[Object]
impl MutationRoot {
    async fn hr(&self) -> HrMutation {
        HrMutation::default()
    }
}
