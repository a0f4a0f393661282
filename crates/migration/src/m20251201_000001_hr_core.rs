use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DatabaseBackend;

#[derive(DeriveIden)]
enum Department {
    Table,
    Id,
    Name,
    Description,
    HeadEmployeeId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Designation {
    Table,
    Id,
    Name,
    Description,
    CreatedAt,
}

#[derive(DeriveIden)]
enum EmployeeType {
    Table,
    Id,
    Name,
    ImageUrl,
    CreatedAt,
}

#[derive(DeriveIden)]
enum CompanyAsset {
    Table,
    Id,
    Name,
    SerialNumber,
    CreatedAt,
}

#[derive(DeriveIden)]
enum EmployeeMaster {
    Table,
    Id,
    EmployeeId,
    Name,
    DateOfBirth,
    MobileNumber,
    PersonalMailId,
    OfficialMailId,
    CurrentAddress,
    PermanentAddress,
    EmergencyContactName,
    EmergencyContactNumber,
    Gender,
    HighestEducation,
    EmployeeTypeId,
    DateOfJoining,
    DepartmentId,
    BranchName,
    DesignationId,
    ReportingManagerId,
    ShiftFrom,
    ShiftTo,
    AccountName,
    AccountNumber,
    BankName,
    IfscCode,
    HrIdCardIssue,
    HrPhoto,
    HrOfferLetter,
    HrBackgroundVerf,
    HrBiomatrix,
    HrAllDocuments,
    Image,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum EmployeeAsset {
    Table,
    EmployeeId,
    AssetId,
    AssignedAt,
}

#[derive(DeriveIden)]
enum EmployeeField {
    Table,
    Name,
    Label,
    FieldType,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Department::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Department::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Department::Name).string_len(128).not_null())
                    .col(ColumnDef::new(Department::Description).text())
                    .col(ColumnDef::new(Department::HeadEmployeeId).uuid())
                    .col(
                        ColumnDef::new(Department::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Department::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_department_name")
                    .table(Department::Table)
                    .col(Department::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Designation::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Designation::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Designation::Name).string_len(128).not_null())
                    .col(ColumnDef::new(Designation::Description).text())
                    .col(
                        ColumnDef::new(Designation::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_designation_name")
                    .table(Designation::Table)
                    .col(Designation::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EmployeeType::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(EmployeeType::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(EmployeeType::Name).string_len(64).not_null())
                    .col(ColumnDef::new(EmployeeType::ImageUrl).string_len(512))
                    .col(
                        ColumnDef::new(EmployeeType::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_employee_type_name")
                    .table(EmployeeType::Table)
                    .col(EmployeeType::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CompanyAsset::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(CompanyAsset::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(CompanyAsset::Name).string_len(128).not_null())
                    .col(ColumnDef::new(CompanyAsset::SerialNumber).string_len(128))
                    .col(
                        ColumnDef::new(CompanyAsset::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EmployeeMaster::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(EmployeeMaster::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(EmployeeMaster::EmployeeId).string_len(64).not_null())
                    .col(ColumnDef::new(EmployeeMaster::Name).string_len(256).not_null())
                    .col(ColumnDef::new(EmployeeMaster::DateOfBirth).date())
                    .col(ColumnDef::new(EmployeeMaster::MobileNumber).string_len(32))
                    .col(ColumnDef::new(EmployeeMaster::PersonalMailId).string_len(320))
                    .col(ColumnDef::new(EmployeeMaster::OfficialMailId).string_len(320))
                    .col(ColumnDef::new(EmployeeMaster::CurrentAddress).text())
                    .col(ColumnDef::new(EmployeeMaster::PermanentAddress).text())
                    .col(ColumnDef::new(EmployeeMaster::EmergencyContactName).string_len(256))
                    .col(ColumnDef::new(EmployeeMaster::EmergencyContactNumber).string_len(32))
                    .col(ColumnDef::new(EmployeeMaster::Gender).string_len(16))
                    .col(ColumnDef::new(EmployeeMaster::HighestEducation).string_len(32))
                    .col(ColumnDef::new(EmployeeMaster::EmployeeTypeId).uuid())
                    .col(ColumnDef::new(EmployeeMaster::DateOfJoining).date())
                    .col(ColumnDef::new(EmployeeMaster::DepartmentId).uuid())
                    .col(ColumnDef::new(EmployeeMaster::BranchName).string_len(128))
                    .col(ColumnDef::new(EmployeeMaster::DesignationId).uuid())
                    .col(ColumnDef::new(EmployeeMaster::ReportingManagerId).uuid())
                    .col(ColumnDef::new(EmployeeMaster::ShiftFrom).time())
                    .col(ColumnDef::new(EmployeeMaster::ShiftTo).time())
                    .col(ColumnDef::new(EmployeeMaster::AccountName).string_len(256))
                    .col(ColumnDef::new(EmployeeMaster::AccountNumber).string_len(64))
                    .col(ColumnDef::new(EmployeeMaster::BankName).string_len(128))
                    .col(ColumnDef::new(EmployeeMaster::IfscCode).string_len(32))
                    .col(&mut checklist_flag(EmployeeMaster::HrIdCardIssue))
                    .col(&mut checklist_flag(EmployeeMaster::HrPhoto))
                    .col(&mut checklist_flag(EmployeeMaster::HrOfferLetter))
                    .col(&mut checklist_flag(EmployeeMaster::HrBackgroundVerf))
                    .col(&mut checklist_flag(EmployeeMaster::HrBiomatrix))
                    .col(&mut checklist_flag(EmployeeMaster::HrAllDocuments))
                    .col(ColumnDef::new(EmployeeMaster::Image).string_len(1024))
                    .col(
                        ColumnDef::new(EmployeeMaster::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EmployeeMaster::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employee_department")
                            .from(EmployeeMaster::Table, EmployeeMaster::DepartmentId)
                            .to(Department::Table, Department::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employee_designation")
                            .from(EmployeeMaster::Table, EmployeeMaster::DesignationId)
                            .to(Designation::Table, Designation::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employee_type")
                            .from(EmployeeMaster::Table, EmployeeMaster::EmployeeTypeId)
                            .to(EmployeeType::Table, EmployeeType::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employee_manager")
                            .from(EmployeeMaster::Table, EmployeeMaster::ReportingManagerId)
                            .to(EmployeeMaster::Table, EmployeeMaster::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_employee_code")
                    .table(EmployeeMaster::Table)
                    .col(EmployeeMaster::EmployeeId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_employee_department")
                    .table(EmployeeMaster::Table)
                    .col(EmployeeMaster::DepartmentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_employee_manager")
                    .table(EmployeeMaster::Table)
                    .col(EmployeeMaster::ReportingManagerId)
                    .to_owned(),
            )
            .await?;

        // SQLite cannot add constraints after the fact; the API clears heads on delete.
        if manager.get_database_backend() != DatabaseBackend::Sqlite {
            manager
                .create_foreign_key(
                    ForeignKey::create()
                        .name("fk_department_head")
                        .from(Department::Table, Department::HeadEmployeeId)
                        .to(EmployeeMaster::Table, EmployeeMaster::Id)
                        .on_delete(ForeignKeyAction::SetNull)
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_table(
                Table::create()
                    .table(EmployeeAsset::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(EmployeeAsset::EmployeeId).uuid().not_null())
                    .col(ColumnDef::new(EmployeeAsset::AssetId).uuid().not_null())
                    .col(
                        ColumnDef::new(EmployeeAsset::AssignedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(EmployeeAsset::EmployeeId)
                            .col(EmployeeAsset::AssetId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employee_asset_employee")
                            .from(EmployeeAsset::Table, EmployeeAsset::EmployeeId)
                            .to(EmployeeMaster::Table, EmployeeMaster::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employee_asset_asset")
                            .from(EmployeeAsset::Table, EmployeeAsset::AssetId)
                            .to(CompanyAsset::Table, CompanyAsset::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EmployeeField::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EmployeeField::Name)
                            .string_len(63)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EmployeeField::Label).string_len(128).not_null())
                    .col(ColumnDef::new(EmployeeField::FieldType).string_len(16).not_null())
                    .col(
                        ColumnDef::new(EmployeeField::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EmployeeField::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EmployeeAsset::Table).if_exists().to_owned())
            .await?;
        if manager.get_database_backend() != DatabaseBackend::Sqlite {
            manager
                .drop_foreign_key(
                    ForeignKey::drop()
                        .name("fk_department_head")
                        .table(Department::Table)
                        .to_owned(),
                )
                .await?;
        }
        manager
            .drop_table(Table::drop().table(EmployeeMaster::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CompanyAsset::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EmployeeType::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Designation::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Department::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

fn checklist_flag(column: EmployeeMaster) -> ColumnDef {
    ColumnDef::new(column)
        .boolean()
        .not_null()
        .default(false)
        .to_owned()
}
