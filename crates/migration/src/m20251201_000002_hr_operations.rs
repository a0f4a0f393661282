use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum EmployeeMaster {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum AttendanceRecord {
    Table,
    Id,
    EmployeeId,
    WorkDate,
    CheckIn,
    CheckOut,
    Status,
    Note,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PayrollRecord {
    Table,
    Id,
    EmployeeId,
    Period,
    PayDate,
    BasicSalaryCents,
    AllowancesCents,
    DeductionsCents,
    NetSalaryCents,
    Currency,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PerformanceReview {
    Table,
    Id,
    EmployeeId,
    ReviewDate,
    OverallScore,
    KpiScore,
    GoalsCompleted,
    GoalsTotal,
    Rating,
    NotesMd,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AttendanceRecord::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AttendanceRecord::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(AttendanceRecord::EmployeeId).uuid().not_null())
                    .col(ColumnDef::new(AttendanceRecord::WorkDate).date().not_null())
                    .col(ColumnDef::new(AttendanceRecord::CheckIn).time())
                    .col(ColumnDef::new(AttendanceRecord::CheckOut).time())
                    .col(
                        ColumnDef::new(AttendanceRecord::Status)
                            .string_len(16)
                            .not_null()
                            .default("PRESENT"),
                    )
                    .col(ColumnDef::new(AttendanceRecord::Note).text())
                    .col(
                        ColumnDef::new(AttendanceRecord::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceRecord::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_attendance_employee")
                            .from(AttendanceRecord::Table, AttendanceRecord::EmployeeId)
                            .to(EmployeeMaster::Table, EmployeeMaster::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_attendance_employee_day")
                    .table(AttendanceRecord::Table)
                    .col(AttendanceRecord::EmployeeId)
                    .col(AttendanceRecord::WorkDate)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_attendance_day")
                    .table(AttendanceRecord::Table)
                    .col(AttendanceRecord::WorkDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PayrollRecord::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PayrollRecord::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(PayrollRecord::EmployeeId).uuid().not_null())
                    .col(ColumnDef::new(PayrollRecord::Period).date().not_null())
                    .col(ColumnDef::new(PayrollRecord::PayDate).date())
                    .col(&mut money(PayrollRecord::BasicSalaryCents))
                    .col(&mut money(PayrollRecord::AllowancesCents))
                    .col(&mut money(PayrollRecord::DeductionsCents))
                    .col(&mut money(PayrollRecord::NetSalaryCents))
                    .col(
                        ColumnDef::new(PayrollRecord::Currency)
                            .string_len(3)
                            .not_null()
                            .default("USD"),
                    )
                    .col(
                        ColumnDef::new(PayrollRecord::Status)
                            .string_len(16)
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(
                        ColumnDef::new(PayrollRecord::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PayrollRecord::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payroll_employee")
                            .from(PayrollRecord::Table, PayrollRecord::EmployeeId)
                            .to(EmployeeMaster::Table, EmployeeMaster::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_payroll_employee_period")
                    .table(PayrollRecord::Table)
                    .col(PayrollRecord::EmployeeId)
                    .col(PayrollRecord::Period)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PerformanceReview::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PerformanceReview::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(PerformanceReview::EmployeeId).uuid().not_null())
                    .col(ColumnDef::new(PerformanceReview::ReviewDate).date().not_null())
                    .col(ColumnDef::new(PerformanceReview::OverallScore).small_integer().not_null())
                    .col(ColumnDef::new(PerformanceReview::KpiScore).small_integer().not_null())
                    .col(
                        ColumnDef::new(PerformanceReview::GoalsCompleted)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PerformanceReview::GoalsTotal)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(PerformanceReview::Rating).string_len(24).not_null())
                    .col(ColumnDef::new(PerformanceReview::NotesMd).text())
                    .col(
                        ColumnDef::new(PerformanceReview::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PerformanceReview::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_review_employee")
                            .from(PerformanceReview::Table, PerformanceReview::EmployeeId)
                            .to(EmployeeMaster::Table, EmployeeMaster::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_review_employee")
                    .table(PerformanceReview::Table)
                    .col(PerformanceReview::EmployeeId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PerformanceReview::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PayrollRecord::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AttendanceRecord::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

fn money(column: PayrollRecord) -> ColumnDef {
    ColumnDef::new(column)
        .big_integer()
        .not_null()
        .default(0)
        .to_owned()
}
