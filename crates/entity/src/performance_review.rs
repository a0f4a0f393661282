use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "performance_review")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub employee_id: Uuid,
    pub review_date: Date,
    pub overall_score: i16,
    pub kpi_score: i16,
    pub goals_completed: i32,
    pub goals_total: i32,
    pub rating: Rating,
    pub notes_md: Option<String>,
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

#[derive(Copy, Clone, Debug, EnumIter, DeriveActiveEnum, Eq, PartialEq)]
#[sea_orm(rs_type = "String", db_type = "String(Some(24))")]
pub enum Rating {
    #[sea_orm(string_value = "EXCELLENT")]
    Excellent,
    #[sea_orm(string_value = "VERY_GOOD")]
    VeryGood,
    #[sea_orm(string_value = "GOOD")]
    Good,
    #[sea_orm(string_value = "AVERAGE")]
    Average,
    #[sea_orm(string_value = "NEEDS_IMPROVEMENT")]
    NeedsImprovement,
}

impl ActiveModelBehavior for ActiveModel {}
