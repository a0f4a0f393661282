use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "attendance_record")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub employee_id: Uuid,
    #[sea_orm(indexed)]
    pub work_date: Date,
    pub check_in: Option<Time>,
    pub check_out: Option<Time>,
    pub status: Status,
    pub note: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::EmployeeId",
        to = "super::employee::Column::Id",
        on_delete = "Cascade"
    )]
    Employee,
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveActiveEnum, Eq, PartialEq, Hash)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
pub enum Status {
    #[sea_orm(string_value = "PRESENT")]
    Present,
    #[sea_orm(string_value = "LATE")]
    Late,
    #[sea_orm(string_value = "ABSENT")]
    Absent,
    #[sea_orm(string_value = "HALF_DAY")]
    HalfDay,
}

impl ActiveModelBehavior for ActiveModel {}
