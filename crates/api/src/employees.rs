use std::collections::{HashMap, HashSet};

use async_graphql::{
    ComplexObject, Context, Enum, InputObject, MaybeUndefined, Object, SimpleObject, ID,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use entity::{
    attendance_record, company_asset, department, designation, employee, employee_asset,
    employee_type, payroll_record, performance_review,
};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::common::{
    conflict_error, database, db_error, id_of, maybe_id, maybe_value, not_found, now,
    optional_email, optional_text, page_bounds, parse_optional_id, parse_uuid, require_editor,
    require_viewer, required_text, validation_error,
};
use crate::departments::DepartmentNode;
use crate::lookups::{CompanyAssetNode, DesignationNode, EmployeeTypeNode};

pub(crate) const NOT_ASSIGNED: &str = "Not assigned";

/// Upper bound on reporting-line walks; deeper chains are treated as cycles.
const MAX_REPORTING_DEPTH: usize = 64;

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum Gender {
    Male,
    Female,
    Others,
}

impl From<employee::Gender> for Gender {
    fn from(value: employee::Gender) -> Self {
        match value {
            employee::Gender::Male => Gender::Male,
            employee::Gender::Female => Gender::Female,
            employee::Gender::Others => Gender::Others,
        }
    }
}

impl From<Gender> for employee::Gender {
    fn from(value: Gender) -> Self {
        match value {
            Gender::Male => employee::Gender::Male,
            Gender::Female => employee::Gender::Female,
            Gender::Others => employee::Gender::Others,
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum Education {
    NoFormalEducation,
    PrimarySchool,
    DiplomaCertificate,
    Undergraduate,
    Postgraduate,
    Doctoral,
}

impl From<employee::Education> for Education {
    fn from(value: employee::Education) -> Self {
        match value {
            employee::Education::NoFormalEducation => Education::NoFormalEducation,
            employee::Education::PrimarySchool => Education::PrimarySchool,
            employee::Education::DiplomaCertificate => Education::DiplomaCertificate,
            employee::Education::Undergraduate => Education::Undergraduate,
            employee::Education::Postgraduate => Education::Postgraduate,
            employee::Education::Doctoral => Education::Doctoral,
        }
    }
}

impl From<Education> for employee::Education {
    fn from(value: Education) -> Self {
        match value {
            Education::NoFormalEducation => employee::Education::NoFormalEducation,
            Education::PrimarySchool => employee::Education::PrimarySchool,
            Education::DiplomaCertificate => employee::Education::DiplomaCertificate,
            Education::Undergraduate => employee::Education::Undergraduate,
            Education::Postgraduate => employee::Education::Postgraduate,
            Education::Doctoral => employee::Education::Doctoral,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct BankDetails {
    pub account_name: Option<String>,
    pub account_number: Option<String>,
    pub bank_name: Option<String>,
    pub ifsc_code: Option<String>,
}

#[derive(Clone, Debug, SimpleObject)]
pub struct OnboardingChecklist {
    pub id_card_issued: bool,
    pub photo: bool,
    pub offer_letter: bool,
    pub background_verification: bool,
    pub biometrics: bool,
    pub all_documents: bool,
    pub complete: bool,
}

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "Employee", complex)]
pub struct EmployeeNode {
    pub id: ID,
    pub employee_id: String,
    pub name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub mobile_number: Option<String>,
    pub personal_mail_id: Option<String>,
    pub official_mail_id: Option<String>,
    pub current_address: Option<String>,
    pub permanent_address: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_number: Option<String>,
    pub gender: Option<Gender>,
    pub highest_education: Option<Education>,
    pub employee_type_id: Option<ID>,
    pub date_of_joining: Option<NaiveDate>,
    pub department_id: Option<ID>,
    pub branch_name: Option<String>,
    pub designation_id: Option<ID>,
    pub reporting_manager_id: Option<ID>,
    pub shift_from: Option<NaiveTime>,
    pub shift_to: Option<NaiveTime>,
    pub bank: BankDetails,
    pub onboarding: OnboardingChecklist,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[graphql(skip)]
    pub(crate) model: employee::Model,
}

impl From<employee::Model> for EmployeeNode {
    fn from(model: employee::Model) -> Self {
        let onboarding = OnboardingChecklist {
            id_card_issued: model.hr_id_card_issue,
            photo: model.hr_photo,
            offer_letter: model.hr_offer_letter,
            background_verification: model.hr_background_verf,
            biometrics: model.hr_biomatrix,
            all_documents: model.hr_all_documents,
            complete: model.hr_id_card_issue
                && model.hr_photo
                && model.hr_offer_letter
                && model.hr_background_verf
                && model.hr_biomatrix
                && model.hr_all_documents,
        };
        Self {
            id: id_of(model.id),
            employee_id: model.employee_id.clone(),
            name: model.name.clone(),
            date_of_birth: model.date_of_birth,
            mobile_number: model.mobile_number.clone(),
            personal_mail_id: model.personal_mail_id.clone(),
            official_mail_id: model.official_mail_id.clone(),
            current_address: model.current_address.clone(),
            permanent_address: model.permanent_address.clone(),
            emergency_contact_name: model.emergency_contact_name.clone(),
            emergency_contact_number: model.emergency_contact_number.clone(),
            gender: model.gender.map(Gender::from),
            highest_education: model.highest_education.map(Education::from),
            employee_type_id: model.employee_type_id.map(id_of),
            date_of_joining: model.date_of_joining,
            department_id: model.department_id.map(id_of),
            branch_name: model.branch_name.clone(),
            designation_id: model.designation_id.map(id_of),
            reporting_manager_id: model.reporting_manager_id.map(id_of),
            shift_from: model.shift_from,
            shift_to: model.shift_to,
            bank: BankDetails {
                account_name: model.account_name.clone(),
                account_number: model.account_number.clone(),
                bank_name: model.bank_name.clone(),
                ifsc_code: model.ifsc_code.clone(),
            },
            onboarding,
            image: model.image.clone(),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
            model,
        }
    }
}

#[ComplexObject]
impl EmployeeNode {
    async fn department(&self, ctx: &Context<'_>) -> async_graphql::Result<Option<DepartmentNode>> {
        let Some(department_id) = self.model.department_id else {
            return Ok(None);
        };
        let db = database(ctx)?;
        let record = department::Entity::find_by_id(department_id)
            .one(db.as_ref())
            .await
            .map_err(db_error)?;
        Ok(record.map(DepartmentNode::from))
    }

    async fn designation(
        &self,
        ctx: &Context<'_>,
    ) -> async_graphql::Result<Option<DesignationNode>> {
        let Some(designation_id) = self.model.designation_id else {
            return Ok(None);
        };
        let db = database(ctx)?;
        let record = designation::Entity::find_by_id(designation_id)
            .one(db.as_ref())
            .await
            .map_err(db_error)?;
        Ok(record.map(DesignationNode::from))
    }

    async fn employee_type(
        &self,
        ctx: &Context<'_>,
    ) -> async_graphql::Result<Option<EmployeeTypeNode>> {
        let Some(type_id) = self.model.employee_type_id else {
            return Ok(None);
        };
        let db = database(ctx)?;
        let record = employee_type::Entity::find_by_id(type_id)
            .one(db.as_ref())
            .await
            .map_err(db_error)?;
        Ok(record.map(EmployeeTypeNode::from))
    }

    async fn reporting_manager(
        &self,
        ctx: &Context<'_>,
    ) -> async_graphql::Result<Option<EmployeeNode>> {
        let Some(manager_id) = self.model.reporting_manager_id else {
            return Ok(None);
        };
        let db = database(ctx)?;
        let record = employee::Entity::find_by_id(manager_id)
            .one(db.as_ref())
            .await
            .map_err(db_error)?;
        Ok(record.map(EmployeeNode::from))
    }

    async fn direct_reports(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<EmployeeNode>> {
        let db = database(ctx)?;
        let rows = employee::Entity::find()
            .filter(employee::Column::ReportingManagerId.eq(self.model.id))
            .order_by_asc(employee::Column::EmployeeId)
            .all(db.as_ref())
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(EmployeeNode::from).collect())
    }

    async fn assets(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<CompanyAssetNode>> {
        let db = database(ctx)?;
        load_assets_for(db.as_ref(), self.model.id).await
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct EmployeeListItem {
    pub id: ID,
    pub employee_id: String,
    pub name: String,
    pub mobile_number: Option<String>,
    pub designation: String,
    pub department: String,
    pub image: Option<String>,
    pub reporting_manager_id: Option<ID>,
    pub reporting_manager_name: String,
    pub reporting_manager_image: Option<String>,
}

impl EmployeeListItem {
    /// Case-insensitive substring match over the fields shown in the directory.
    /// `needle` must already be lowercase.
    fn matches(&self, needle: &str) -> bool {
        let fields = [
            Some(self.employee_id.as_str()),
            Some(self.name.as_str()),
            self.mobile_number.as_deref(),
            Some(self.designation.as_str()),
            Some(self.department.as_str()),
            Some(self.reporting_manager_name.as_str()),
        ];
        fields
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

#[derive(InputObject, Default, Clone)]
pub struct EmployeeFilter {
    pub q: Option<String>,
    pub department_id: Option<ID>,
    pub designation_id: Option<ID>,
    pub manager_id: Option<ID>,
}

#[derive(InputObject, Default, Clone)]
pub struct BankDetailsInput {
    pub account_name: Option<String>,
    pub account_number: Option<String>,
    pub bank_name: Option<String>,
    pub ifsc_code: Option<String>,
}

#[derive(InputObject, Default, Clone)]
pub struct OnboardingInput {
    pub id_card_issued: Option<bool>,
    pub photo: Option<bool>,
    pub offer_letter: Option<bool>,
    pub background_verification: Option<bool>,
    pub biometrics: Option<bool>,
    pub all_documents: Option<bool>,
}

#[derive(InputObject, Clone)]
pub struct NewEmployeeInput {
    pub employee_id: String,
    pub name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub mobile_number: Option<String>,
    pub personal_mail_id: Option<String>,
    pub official_mail_id: Option<String>,
    pub current_address: Option<String>,
    pub permanent_address: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_number: Option<String>,
    pub gender: Option<Gender>,
    pub highest_education: Option<Education>,
    pub employee_type_id: Option<ID>,
    pub date_of_joining: Option<NaiveDate>,
    pub department_id: Option<ID>,
    pub branch_name: Option<String>,
    pub designation_id: Option<ID>,
    pub reporting_manager_id: Option<ID>,
    pub shift_from: Option<NaiveTime>,
    pub shift_to: Option<NaiveTime>,
    pub bank: Option<BankDetailsInput>,
    pub onboarding: Option<OnboardingInput>,
    pub image: Option<String>,
    pub asset_ids: Option<Vec<ID>>,
}

/// Partial update. Absent fields are left alone; `null` clears nullable
/// references and dates, and blank strings clear text fields.
#[derive(InputObject, Clone)]
pub struct UpdateEmployeeInput {
    pub id: ID,
    pub employee_id: Option<String>,
    pub name: Option<String>,
    #[graphql(default)]
    pub date_of_birth: MaybeUndefined<NaiveDate>,
    pub mobile_number: Option<String>,
    pub personal_mail_id: Option<String>,
    pub official_mail_id: Option<String>,
    pub current_address: Option<String>,
    pub permanent_address: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_number: Option<String>,
    #[graphql(default)]
    pub gender: MaybeUndefined<Gender>,
    #[graphql(default)]
    pub highest_education: MaybeUndefined<Education>,
    #[graphql(default)]
    pub employee_type_id: MaybeUndefined<ID>,
    #[graphql(default)]
    pub date_of_joining: MaybeUndefined<NaiveDate>,
    #[graphql(default)]
    pub department_id: MaybeUndefined<ID>,
    pub branch_name: Option<String>,
    #[graphql(default)]
    pub designation_id: MaybeUndefined<ID>,
    #[graphql(default)]
    pub reporting_manager_id: MaybeUndefined<ID>,
    #[graphql(default)]
    pub shift_from: MaybeUndefined<NaiveTime>,
    #[graphql(default)]
    pub shift_to: MaybeUndefined<NaiveTime>,
    pub bank: Option<BankDetailsInput>,
    pub onboarding: Option<OnboardingInput>,
    pub image: Option<String>,
}

#[derive(Default)]
pub struct EmployeeQuery;

#[Object]
impl EmployeeQuery {
    async fn employees(
        &self,
        ctx: &Context<'_>,
        first: Option<i32>,
        offset: Option<i32>,
        filter: Option<EmployeeFilter>,
    ) -> async_graphql::Result<Vec<EmployeeListItem>> {
        require_viewer(ctx)?;
        let db = database(ctx)?;
        let (limit, skip) = page_bounds(first, offset);
        let filter = filter.unwrap_or_default();
        let needle = filter
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);

        let mut query = employee::Entity::find();
        if let Some(id) = parse_optional_id("departmentId", &filter.department_id)? {
            query = query.filter(employee::Column::DepartmentId.eq(id));
        }
        if let Some(id) = parse_optional_id("designationId", &filter.designation_id)? {
            query = query.filter(employee::Column::DesignationId.eq(id));
        }
        if let Some(id) = parse_optional_id("managerId", &filter.manager_id)? {
            query = query.filter(employee::Column::ReportingManagerId.eq(id));
        }
        query = query.order_by_asc(employee::Column::EmployeeId);

        let span = info_span!("hr.employees.list", has_q = needle.is_some(), first = limit);
        async move {
            match needle {
                // Joined fields (department, manager) take part in the match,
                // so filtering happens after enrichment.
                Some(needle) => {
                    let rows = query.all(db.as_ref()).await.map_err(db_error)?;
                    let items = enrich_employees(db.as_ref(), rows).await?;
                    Ok(items
                        .into_iter()
                        .filter(|item| item.matches(&needle))
                        .skip(skip as usize)
                        .take(limit as usize)
                        .collect())
                }
                None => {
                    let rows = query
                        .limit(limit)
                        .offset(skip)
                        .all(db.as_ref())
                        .await
                        .map_err(db_error)?;
                    enrich_employees(db.as_ref(), rows).await
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn employee(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<Option<EmployeeNode>> {
        require_viewer(ctx)?;
        let db = database(ctx)?;
        let employee_id = parse_uuid(&id)?;
        let record = employee::Entity::find_by_id(employee_id)
            .one(db.as_ref())
            .await
            .map_err(db_error)?;
        Ok(record.map(EmployeeNode::from))
    }

    async fn employee_by_code(
        &self,
        ctx: &Context<'_>,
        employee_id: String,
    ) -> async_graphql::Result<Option<EmployeeNode>> {
        require_viewer(ctx)?;
        let db = database(ctx)?;
        let record = employee::Entity::find()
            .filter(employee::Column::EmployeeId.eq(employee_id.trim()))
            .one(db.as_ref())
            .await
            .map_err(db_error)?;
        Ok(record.map(EmployeeNode::from))
    }
}

#[derive(Default)]
pub struct EmployeeMutation;

#[Object]
impl EmployeeMutation {
    async fn create_employee(
        &self,
        ctx: &Context<'_>,
        input: NewEmployeeInput,
    ) -> async_graphql::Result<EmployeeNode> {
        let current = require_editor(ctx)?;
        let db = database(ctx)?;
        let model = create_employee_internal(db.as_ref(), input).await?;
        info!(employee = %model.employee_id, by = %current.subject, "employee created");
        Ok(model.into())
    }

    async fn update_employee(
        &self,
        ctx: &Context<'_>,
        input: UpdateEmployeeInput,
    ) -> async_graphql::Result<EmployeeNode> {
        require_editor(ctx)?;
        let db = database(ctx)?;
        let model = update_employee_internal(db.as_ref(), input).await?;
        Ok(model.into())
    }

    async fn delete_employee(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<bool> {
        let current = require_editor(ctx)?;
        let db = database(ctx)?;
        let employee_id = parse_uuid(&id)?;
        let deleted = delete_employee_internal(db.as_ref(), employee_id).await?;
        if deleted {
            info!(%employee_id, by = %current.subject, "employee deleted");
        }
        Ok(deleted)
    }

    async fn set_employee_assets(
        &self,
        ctx: &Context<'_>,
        employee_id: ID,
        asset_ids: Vec<ID>,
    ) -> async_graphql::Result<Vec<CompanyAssetNode>> {
        require_editor(ctx)?;
        let db = database(ctx)?;
        let employee_id = parse_uuid(&employee_id)?;
        employee::Entity::find_by_id(employee_id)
            .one(db.as_ref())
            .await
            .map_err(db_error)?
            .ok_or_else(|| not_found("Employee"))?;
        let asset_ids = parse_asset_ids(&asset_ids)?;
        ensure_assets_exist(db.as_ref(), &asset_ids).await?;
        let txn = db.begin().await.map_err(db_error)?;
        replace_assets(&txn, employee_id, &asset_ids, now()).await?;
        txn.commit().await.map_err(db_error)?;
        load_assets_for(db.as_ref(), employee_id).await
    }
}

#[derive(Clone, Copy, Debug)]
enum Reference {
    Department(Uuid),
    Designation(Uuid),
    EmployeeType(Uuid),
    Manager(Uuid),
}

impl Reference {
    fn label(self) -> &'static str {
        match self {
            Reference::Department(_) => "department",
            Reference::Designation(_) => "designation",
            Reference::EmployeeType(_) => "employee type",
            Reference::Manager(_) => "reporting manager",
        }
    }
}

async fn ensure_reference_exists(
    db: &DatabaseConnection,
    reference: Reference,
) -> async_graphql::Result<()> {
    let exists = match reference {
        Reference::Department(id) => department::Entity::find_by_id(id)
            .one(db)
            .await
            .map_err(db_error)?
            .is_some(),
        Reference::Designation(id) => designation::Entity::find_by_id(id)
            .one(db)
            .await
            .map_err(db_error)?
            .is_some(),
        Reference::EmployeeType(id) => employee_type::Entity::find_by_id(id)
            .one(db)
            .await
            .map_err(db_error)?
            .is_some(),
        Reference::Manager(id) => employee::Entity::find_by_id(id)
            .one(db)
            .await
            .map_err(db_error)?
            .is_some(),
    };
    if !exists {
        return Err(validation_error(format!(
            "Referenced {} does not exist",
            reference.label()
        )));
    }
    Ok(())
}

pub(crate) async fn ensure_employee_exists(
    db: &DatabaseConnection,
    employee_id: Uuid,
) -> async_graphql::Result<employee::Model> {
    employee::Entity::find_by_id(employee_id)
        .one(db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| validation_error("Referenced employee does not exist"))
}

async fn ensure_code_available(
    db: &DatabaseConnection,
    code: &str,
) -> async_graphql::Result<()> {
    let existing = employee::Entity::find()
        .filter(employee::Column::EmployeeId.eq(code))
        .one(db)
        .await
        .map_err(db_error)?;
    if existing.is_some() {
        return Err(conflict_error(format!("Employee ID {} already exists", code)));
    }
    Ok(())
}

/// Rejects a manager assignment that would make `employee_id` report to
/// itself, directly or through the chain above `manager_id`.
async fn ensure_no_reporting_cycle(
    db: &DatabaseConnection,
    employee_id: Uuid,
    manager_id: Uuid,
) -> async_graphql::Result<()> {
    if employee_id == manager_id {
        return Err(validation_error("An employee cannot report to themselves"));
    }
    let mut seen = HashSet::new();
    let mut cursor = Some(manager_id);
    while let Some(current) = cursor {
        if current == employee_id || !seen.insert(current) || seen.len() > MAX_REPORTING_DEPTH {
            return Err(validation_error("Reporting line would form a cycle"));
        }
        cursor = employee::Entity::find_by_id(current)
            .one(db)
            .await
            .map_err(db_error)?
            .and_then(|row| row.reporting_manager_id);
    }
    Ok(())
}

fn parse_asset_ids(ids: &[ID]) -> async_graphql::Result<Vec<Uuid>> {
    let mut parsed = Vec::with_capacity(ids.len());
    for id in ids {
        let uuid =
            Uuid::parse_str(id.as_str()).map_err(|_| validation_error("Invalid assetIds entry"))?;
        if !parsed.contains(&uuid) {
            parsed.push(uuid);
        }
    }
    Ok(parsed)
}

async fn ensure_assets_exist(db: &DatabaseConnection, ids: &[Uuid]) -> async_graphql::Result<()> {
    if ids.is_empty() {
        return Ok(());
    }
    let found = company_asset::Entity::find()
        .filter(company_asset::Column::Id.is_in(ids.to_vec()))
        .all(db)
        .await
        .map_err(db_error)?;
    if found.len() != ids.len() {
        return Err(validation_error("Referenced company asset does not exist"));
    }
    Ok(())
}

async fn replace_assets<C>(
    conn: &C,
    employee_id: Uuid,
    asset_ids: &[Uuid],
    assigned_at: DateTimeWithTimeZone,
) -> async_graphql::Result<()>
where
    C: ConnectionTrait,
{
    employee_asset::Entity::delete_many()
        .filter(employee_asset::Column::EmployeeId.eq(employee_id))
        .exec(conn)
        .await
        .map_err(db_error)?;
    if asset_ids.is_empty() {
        return Ok(());
    }
    let rows = asset_ids.iter().map(|asset_id| employee_asset::ActiveModel {
        employee_id: Set(employee_id),
        asset_id: Set(*asset_id),
        assigned_at: Set(assigned_at),
    });
    employee_asset::Entity::insert_many(rows)
        .exec_without_returning(conn)
        .await
        .map_err(db_error)?;
    Ok(())
}

async fn load_assets_for(
    db: &DatabaseConnection,
    employee_id: Uuid,
) -> async_graphql::Result<Vec<CompanyAssetNode>> {
    let links = employee_asset::Entity::find()
        .filter(employee_asset::Column::EmployeeId.eq(employee_id))
        .all(db)
        .await
        .map_err(db_error)?;
    if links.is_empty() {
        return Ok(vec![]);
    }
    let ids: Vec<Uuid> = links.iter().map(|link| link.asset_id).collect();
    let assets = company_asset::Entity::find()
        .filter(company_asset::Column::Id.is_in(ids))
        .order_by_asc(company_asset::Column::Name)
        .all(db)
        .await
        .map_err(db_error)?;
    Ok(assets.into_iter().map(CompanyAssetNode::from).collect())
}

async fn create_employee_internal(
    db: &DatabaseConnection,
    input: NewEmployeeInput,
) -> async_graphql::Result<employee::Model> {
    let code = required_text("employeeId", &input.employee_id, 64)?;
    let name = required_text("name", &input.name, 256)?;
    let personal_mail_id = optional_email("personalMailId", input.personal_mail_id)?;
    let official_mail_id = optional_email("officialMailId", input.official_mail_id)?;
    let department_id = parse_optional_id("departmentId", &input.department_id)?;
    let designation_id = parse_optional_id("designationId", &input.designation_id)?;
    let employee_type_id = parse_optional_id("employeeTypeId", &input.employee_type_id)?;
    let reporting_manager_id = parse_optional_id("reportingManagerId", &input.reporting_manager_id)?;
    let asset_ids = parse_asset_ids(input.asset_ids.as_deref().unwrap_or_default())?;

    ensure_code_available(db, &code).await?;
    let references = [
        department_id.map(Reference::Department),
        designation_id.map(Reference::Designation),
        employee_type_id.map(Reference::EmployeeType),
        reporting_manager_id.map(Reference::Manager),
    ];
    for reference in references.into_iter().flatten() {
        ensure_reference_exists(db, reference).await?;
    }
    ensure_assets_exist(db, &asset_ids).await?;

    let bank = input.bank.unwrap_or_default();
    let onboarding = input.onboarding.unwrap_or_default();
    let timestamp = now();
    let employee_id = Uuid::new_v4();
    let active = employee::ActiveModel {
        id: Set(employee_id),
        employee_id: Set(code),
        name: Set(name),
        date_of_birth: Set(input.date_of_birth),
        mobile_number: Set(optional_text("mobileNumber", input.mobile_number, 32)?),
        personal_mail_id: Set(personal_mail_id),
        official_mail_id: Set(official_mail_id),
        current_address: Set(optional_text("currentAddress", input.current_address, 1024)?),
        permanent_address: Set(optional_text("permanentAddress", input.permanent_address, 1024)?),
        emergency_contact_name: Set(optional_text(
            "emergencyContactName",
            input.emergency_contact_name,
            256,
        )?),
        emergency_contact_number: Set(optional_text(
            "emergencyContactNumber",
            input.emergency_contact_number,
            32,
        )?),
        gender: Set(input.gender.map(Into::into)),
        highest_education: Set(input.highest_education.map(Into::into)),
        employee_type_id: Set(employee_type_id),
        date_of_joining: Set(input.date_of_joining),
        department_id: Set(department_id),
        branch_name: Set(optional_text("branchName", input.branch_name, 128)?),
        designation_id: Set(designation_id),
        reporting_manager_id: Set(reporting_manager_id),
        shift_from: Set(input.shift_from),
        shift_to: Set(input.shift_to),
        account_name: Set(optional_text("accountName", bank.account_name, 256)?),
        account_number: Set(optional_text("accountNumber", bank.account_number, 64)?),
        bank_name: Set(optional_text("bankName", bank.bank_name, 128)?),
        ifsc_code: Set(optional_text("ifscCode", bank.ifsc_code, 32)?),
        hr_id_card_issue: Set(onboarding.id_card_issued.unwrap_or(false)),
        hr_photo: Set(onboarding.photo.unwrap_or(false)),
        hr_offer_letter: Set(onboarding.offer_letter.unwrap_or(false)),
        hr_background_verf: Set(onboarding.background_verification.unwrap_or(false)),
        hr_biomatrix: Set(onboarding.biometrics.unwrap_or(false)),
        hr_all_documents: Set(onboarding.all_documents.unwrap_or(false)),
        image: Set(optional_text("image", input.image, 1024)?),
        created_at: Set(timestamp),
        updated_at: Set(timestamp),
    };

    let txn = db.begin().await.map_err(db_error)?;
    employee::Entity::insert(active)
        .exec_without_returning(&txn)
        .await
        .map_err(db_error)?;
    replace_assets(&txn, employee_id, &asset_ids, timestamp).await?;
    txn.commit().await.map_err(db_error)?;

    employee::Entity::find_by_id(employee_id)
        .one(db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found("Employee"))
}

async fn update_employee_internal(
    db: &DatabaseConnection,
    input: UpdateEmployeeInput,
) -> async_graphql::Result<employee::Model> {
    let employee_id = parse_uuid(&input.id)?;
    let existing = employee::Entity::find_by_id(employee_id)
        .one(db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found("Employee"))?;

    let mut active: employee::ActiveModel = existing.clone().into();
    if let Some(code) = &input.employee_id {
        let code = required_text("employeeId", code, 64)?;
        if code != existing.employee_id {
            ensure_code_available(db, &code).await?;
        }
        active.employee_id = Set(code);
    }
    if let Some(name) = &input.name {
        active.name = Set(required_text("name", name, 256)?);
    }
    if let Some(value) = maybe_value(&input.date_of_birth) {
        active.date_of_birth = Set(value);
    }
    if input.mobile_number.is_some() {
        active.mobile_number = Set(optional_text("mobileNumber", input.mobile_number.clone(), 32)?);
    }
    if input.personal_mail_id.is_some() {
        active.personal_mail_id =
            Set(optional_email("personalMailId", input.personal_mail_id.clone())?);
    }
    if input.official_mail_id.is_some() {
        active.official_mail_id =
            Set(optional_email("officialMailId", input.official_mail_id.clone())?);
    }
    if input.current_address.is_some() {
        active.current_address =
            Set(optional_text("currentAddress", input.current_address.clone(), 1024)?);
    }
    if input.permanent_address.is_some() {
        active.permanent_address =
            Set(optional_text("permanentAddress", input.permanent_address.clone(), 1024)?);
    }
    if input.emergency_contact_name.is_some() {
        active.emergency_contact_name = Set(optional_text(
            "emergencyContactName",
            input.emergency_contact_name.clone(),
            256,
        )?);
    }
    if input.emergency_contact_number.is_some() {
        active.emergency_contact_number = Set(optional_text(
            "emergencyContactNumber",
            input.emergency_contact_number.clone(),
            32,
        )?);
    }
    if let Some(value) = maybe_value(&input.gender) {
        active.gender = Set(value.map(Into::into));
    }
    if let Some(value) = maybe_value(&input.highest_education) {
        active.highest_education = Set(value.map(Into::into));
    }
    if let Some(value) = maybe_id("employeeTypeId", &input.employee_type_id)? {
        if let Some(id) = value {
            ensure_reference_exists(db, Reference::EmployeeType(id)).await?;
        }
        active.employee_type_id = Set(value);
    }
    if let Some(value) = maybe_value(&input.date_of_joining) {
        active.date_of_joining = Set(value);
    }
    if let Some(value) = maybe_id("departmentId", &input.department_id)? {
        if let Some(id) = value {
            ensure_reference_exists(db, Reference::Department(id)).await?;
        }
        active.department_id = Set(value);
    }
    if input.branch_name.is_some() {
        active.branch_name = Set(optional_text("branchName", input.branch_name.clone(), 128)?);
    }
    if let Some(value) = maybe_id("designationId", &input.designation_id)? {
        if let Some(id) = value {
            ensure_reference_exists(db, Reference::Designation(id)).await?;
        }
        active.designation_id = Set(value);
    }
    if let Some(value) = maybe_id("reportingManagerId", &input.reporting_manager_id)? {
        if let Some(manager_id) = value {
            ensure_reference_exists(db, Reference::Manager(manager_id)).await?;
            ensure_no_reporting_cycle(db, employee_id, manager_id).await?;
        }
        active.reporting_manager_id = Set(value);
    }
    if let Some(value) = maybe_value(&input.shift_from) {
        active.shift_from = Set(value);
    }
    if let Some(value) = maybe_value(&input.shift_to) {
        active.shift_to = Set(value);
    }
    if let Some(bank) = input.bank {
        if bank.account_name.is_some() {
            active.account_name = Set(optional_text("accountName", bank.account_name, 256)?);
        }
        if bank.account_number.is_some() {
            active.account_number = Set(optional_text("accountNumber", bank.account_number, 64)?);
        }
        if bank.bank_name.is_some() {
            active.bank_name = Set(optional_text("bankName", bank.bank_name, 128)?);
        }
        if bank.ifsc_code.is_some() {
            active.ifsc_code = Set(optional_text("ifscCode", bank.ifsc_code, 32)?);
        }
    }
    if let Some(onboarding) = input.onboarding {
        if let Some(flag) = onboarding.id_card_issued {
            active.hr_id_card_issue = Set(flag);
        }
        if let Some(flag) = onboarding.photo {
            active.hr_photo = Set(flag);
        }
        if let Some(flag) = onboarding.offer_letter {
            active.hr_offer_letter = Set(flag);
        }
        if let Some(flag) = onboarding.background_verification {
            active.hr_background_verf = Set(flag);
        }
        if let Some(flag) = onboarding.biometrics {
            active.hr_biomatrix = Set(flag);
        }
        if let Some(flag) = onboarding.all_documents {
            active.hr_all_documents = Set(flag);
        }
    }
    if input.image.is_some() {
        active.image = Set(optional_text("image", input.image.clone(), 1024)?);
    }
    active.updated_at = Set(now());
    active.update(db).await.map_err(db_error)
}

async fn delete_employee_internal(
    db: &DatabaseConnection,
    employee_id: Uuid,
) -> async_graphql::Result<bool> {
    let txn = db.begin().await.map_err(db_error)?;
    employee::Entity::update_many()
        .col_expr(
            employee::Column::ReportingManagerId,
            Expr::value(Option::<Uuid>::None),
        )
        .filter(employee::Column::ReportingManagerId.eq(employee_id))
        .exec(&txn)
        .await
        .map_err(db_error)?;
    department::Entity::update_many()
        .col_expr(
            department::Column::HeadEmployeeId,
            Expr::value(Option::<Uuid>::None),
        )
        .filter(department::Column::HeadEmployeeId.eq(employee_id))
        .exec(&txn)
        .await
        .map_err(db_error)?;
    attendance_record::Entity::delete_many()
        .filter(attendance_record::Column::EmployeeId.eq(employee_id))
        .exec(&txn)
        .await
        .map_err(db_error)?;
    payroll_record::Entity::delete_many()
        .filter(payroll_record::Column::EmployeeId.eq(employee_id))
        .exec(&txn)
        .await
        .map_err(db_error)?;
    performance_review::Entity::delete_many()
        .filter(performance_review::Column::EmployeeId.eq(employee_id))
        .exec(&txn)
        .await
        .map_err(db_error)?;
    employee_asset::Entity::delete_many()
        .filter(employee_asset::Column::EmployeeId.eq(employee_id))
        .exec(&txn)
        .await
        .map_err(db_error)?;
    let res = employee::Entity::delete_by_id(employee_id)
        .exec(&txn)
        .await
        .map_err(db_error)?;
    txn.commit().await.map_err(db_error)?;
    Ok(res.rows_affected > 0)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ManagerSummary {
    pub name: String,
    pub image: Option<String>,
}

/// Loads names for the referenced lookups and joins them onto each row.
pub(crate) async fn enrich_employees(
    db: &DatabaseConnection,
    rows: Vec<employee::Model>,
) -> async_graphql::Result<Vec<EmployeeListItem>> {
    if rows.is_empty() {
        return Ok(vec![]);
    }
    let designation_ids: HashSet<Uuid> = rows.iter().filter_map(|r| r.designation_id).collect();
    let department_ids: HashSet<Uuid> = rows.iter().filter_map(|r| r.department_id).collect();
    let manager_ids: HashSet<Uuid> = rows.iter().filter_map(|r| r.reporting_manager_id).collect();

    let designations: HashMap<Uuid, String> = if designation_ids.is_empty() {
        HashMap::new()
    } else {
        designation::Entity::find()
            .filter(designation::Column::Id.is_in(designation_ids))
            .all(db)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(|d| (d.id, d.name))
            .collect()
    };
    let departments: HashMap<Uuid, String> = if department_ids.is_empty() {
        HashMap::new()
    } else {
        department::Entity::find()
            .filter(department::Column::Id.is_in(department_ids))
            .all(db)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(|d| (d.id, d.name))
            .collect()
    };
    let managers: HashMap<Uuid, ManagerSummary> = if manager_ids.is_empty() {
        HashMap::new()
    } else {
        employee::Entity::find()
            .filter(employee::Column::Id.is_in(manager_ids))
            .all(db)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(|m| {
                (
                    m.id,
                    ManagerSummary {
                        name: m.name,
                        image: m.image,
                    },
                )
            })
            .collect()
    };
    Ok(build_list_items(rows, &designations, &departments, &managers))
}

fn build_list_items(
    rows: Vec<employee::Model>,
    designations: &HashMap<Uuid, String>,
    departments: &HashMap<Uuid, String>,
    managers: &HashMap<Uuid, ManagerSummary>,
) -> Vec<EmployeeListItem> {
    rows.into_iter()
        .map(|row| {
            let lookup = |map: &HashMap<Uuid, String>, key: Option<Uuid>| {
                key.and_then(|k| map.get(&k).cloned()).unwrap_or_default()
            };
            let manager = row.reporting_manager_id.and_then(|id| managers.get(&id));
            EmployeeListItem {
                id: id_of(row.id),
                designation: lookup(designations, row.designation_id),
                department: lookup(departments, row.department_id),
                reporting_manager_id: row.reporting_manager_id.map(id_of),
                reporting_manager_name: manager
                    .map(|m| m.name.clone())
                    .unwrap_or_else(|| NOT_ASSIGNED.to_string()),
                reporting_manager_image: manager.and_then(|m| m.image.clone()),
                employee_id: row.employee_id,
                name: row.name,
                mobile_number: row.mobile_number,
                image: row.image,
            }
        })
        .collect()
}
