use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "company_asset")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub serial_number: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::employee_asset::Entity")]
    EmployeeAsset,
}

impl Related<super::employee_asset::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EmployeeAsset.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
