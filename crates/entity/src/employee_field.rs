use sea_orm::entity::prelude::*;

/// Metadata for a custom column appended to `employee_master`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "employee_field")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub name: String,
    pub label: String,
    pub field_type: FieldType,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[derive(Copy, Clone, Debug, EnumIter, DeriveActiveEnum, Eq, PartialEq)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
pub enum FieldType {
    #[sea_orm(string_value = "TEXT")]
    Text,
    #[sea_orm(string_value = "EMAIL")]
    Email,
    #[sea_orm(string_value = "DATE")]
    Date,
    #[sea_orm(string_value = "NUMBER")]
    Number,
}

impl FieldType {
    /// Column type used when the field is added to the employee table.
    pub fn sql_type(self) -> &'static str {
        match self {
            FieldType::Text | FieldType::Email => "text",
            FieldType::Date => "date",
            FieldType::Number => "numeric",
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
