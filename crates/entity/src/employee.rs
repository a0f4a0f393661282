use sea_orm::entity::prelude::*;

/// A row of the employee master table. Custom columns registered through
/// `employee_field` live on the same table but are not part of this model.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "employee_master")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub employee_id: String,
    pub name: String,
    pub date_of_birth: Option<Date>,
    pub mobile_number: Option<String>,
    pub personal_mail_id: Option<String>,
    pub official_mail_id: Option<String>,
    pub current_address: Option<String>,
    pub permanent_address: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_number: Option<String>,
    pub gender: Option<Gender>,
    pub highest_education: Option<Education>,
    #[sea_orm(indexed)]
    pub employee_type_id: Option<Uuid>,
    pub date_of_joining: Option<Date>,
    #[sea_orm(indexed)]
    pub department_id: Option<Uuid>,
    pub branch_name: Option<String>,
    #[sea_orm(indexed)]
    pub designation_id: Option<Uuid>,
    #[sea_orm(indexed)]
    pub reporting_manager_id: Option<Uuid>,
    pub shift_from: Option<Time>,
    pub shift_to: Option<Time>,
    pub account_name: Option<String>,
    pub account_number: Option<String>,
    pub bank_name: Option<String>,
    pub ifsc_code: Option<String>,
    pub hr_id_card_issue: bool,
    pub hr_photo: bool,
    pub hr_offer_letter: bool,
    pub hr_background_verf: bool,
    pub hr_biomatrix: bool,
    pub hr_all_documents: bool,
    pub image: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::department::Entity",
        from = "Column::DepartmentId",
        to = "super::department::Column::Id",
        on_delete = "SetNull"
    )]
    Department,
    #[sea_orm(
        belongs_to = "super::designation::Entity",
        from = "Column::DesignationId",
        to = "super::designation::Column::Id",
        on_delete = "SetNull"
    )]
    Designation,
    #[sea_orm(
        belongs_to = "super::employee_type::Entity",
        from = "Column::EmployeeTypeId",
        to = "super::employee_type::Column::Id",
        on_delete = "SetNull"
    )]
    EmployeeType,
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ReportingManagerId",
        to = "Column::Id",
        on_delete = "SetNull"
    )]
    ReportingManager,
    #[sea_orm(has_many = "super::attendance_record::Entity")]
    AttendanceRecord,
    #[sea_orm(has_many = "super::payroll_record::Entity")]
    PayrollRecord,
    #[sea_orm(has_many = "super::performance_review::Entity")]
    PerformanceReview,
}

impl Related<super::department::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Department.def()
    }
}

impl Related<super::designation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Designation.def()
    }
}

impl Related<super::employee_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EmployeeType.def()
    }
}

impl Related<super::attendance_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AttendanceRecord.def()
    }
}

impl Related<super::payroll_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PayrollRecord.def()
    }
}

impl Related<super::performance_review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PerformanceReview.def()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveActiveEnum, Eq, PartialEq)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
pub enum Gender {
    #[sea_orm(string_value = "MALE")]
    Male,
    #[sea_orm(string_value = "FEMALE")]
    Female,
    #[sea_orm(string_value = "OTHERS")]
    Others,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveActiveEnum, Eq, PartialEq)]
#[sea_orm(rs_type = "String", db_type = "String(Some(32))")]
pub enum Education {
    #[sea_orm(string_value = "NO_FORMAL_EDUCATION")]
    NoFormalEducation,
    #[sea_orm(string_value = "PRIMARY_SCHOOL")]
    PrimarySchool,
    #[sea_orm(string_value = "DIPLOMA_CERTIFICATE")]
    DiplomaCertificate,
    #[sea_orm(string_value = "UNDERGRADUATE")]
    Undergraduate,
    #[sea_orm(string_value = "POSTGRADUATE")]
    Postgraduate,
    #[sea_orm(string_value = "DOCTORAL")]
    Doctoral,
}

impl ActiveModelBehavior for ActiveModel {}
