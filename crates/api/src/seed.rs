use chrono::{NaiveDate, NaiveTime, Utc};
use entity::{
    attendance_record, company_asset, department, designation, employee, employee_asset,
    employee_type, payroll_record, performance_review,
};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use crate::payroll::net_salary;

/// Rows inserted by [`seed_hr_demo`], for tests and tooling that need ids.
pub struct SeededHrRecords {
    pub departments: Vec<department::Model>,
    pub designations: Vec<designation::Model>,
    pub employee_types: Vec<employee_type::Model>,
    pub assets: Vec<company_asset::Model>,
    pub employees: Vec<employee::Model>,
}

impl SeededHrRecords {
    pub fn employee_code(&self, code: &str) -> Option<&employee::Model> {
        self.employees.iter().find(|e| e.employee_id == code)
    }

    pub fn department_named(&self, name: &str) -> Option<&department::Model> {
        self.departments.iter().find(|d| d.name == name)
    }

    pub fn designation_named(&self, name: &str) -> Option<&designation::Model> {
        self.designations.iter().find(|d| d.name == name)
    }

    pub fn asset_named(&self, name: &str) -> Option<&company_asset::Model> {
        self.assets.iter().find(|a| a.name == name)
    }
}

struct SeedEmployee {
    code: &'static str,
    name: &'static str,
    mobile: &'static str,
    email: &'static str,
    department: &'static str,
    designation: &'static str,
    gender: employee::Gender,
    joined: (i32, u32, u32),
}

const DEPARTMENTS: [(&str, &str); 5] = [
    ("Engineering", "Builds and runs the product"),
    ("Marketing", "Brand, campaigns and content"),
    ("HR", "People operations"),
    ("Sales", "Customer acquisition"),
    ("Finance", "Accounting and payroll"),
];

const DESIGNATIONS: [&str; 5] = [
    "Senior Developer",
    "Marketing Manager",
    "HR Specialist",
    "Software Engineer",
    "Content Strategist",
];

const EMPLOYEE_TYPES: [&str; 3] = ["Full Time", "Part Time", "Contract"];

const ASSETS: [(&str, &str); 3] = [
    ("Laptop", "LT-0001"),
    ("ID Card", "ID-0001"),
    ("Monitor", "MN-0001"),
];

const EMPLOYEES: [SeedEmployee; 5] = [
    SeedEmployee {
        code: "EMP001",
        name: "Alice Johnson",
        mobile: "+1-555-0101",
        email: "alice.johnson@hrm.test",
        department: "Engineering",
        designation: "Senior Developer",
        gender: employee::Gender::Female,
        joined: (2021, 3, 15),
    },
    SeedEmployee {
        code: "EMP002",
        name: "Bob Smith",
        mobile: "+1-555-0102",
        email: "bob.smith@hrm.test",
        department: "Marketing",
        designation: "Marketing Manager",
        gender: employee::Gender::Male,
        joined: (2020, 7, 1),
    },
    SeedEmployee {
        code: "EMP003",
        name: "Carol Wilson",
        mobile: "+1-555-0103",
        email: "carol.wilson@hrm.test",
        department: "HR",
        designation: "HR Specialist",
        gender: employee::Gender::Female,
        joined: (2022, 1, 10),
    },
    SeedEmployee {
        code: "EMP004",
        name: "David Brown",
        mobile: "+1-555-0104",
        email: "david.brown@hrm.test",
        department: "Engineering",
        designation: "Software Engineer",
        gender: employee::Gender::Male,
        joined: (2023, 5, 22),
    },
    SeedEmployee {
        code: "EMP005",
        name: "Emma Davis",
        mobile: "+1-555-0105",
        email: "emma.davis@hrm.test",
        department: "Marketing",
        designation: "Content Strategist",
        gender: employee::Gender::Female,
        joined: (2023, 9, 4),
    },
];

/// (code, status, check in, check out) for 2024-01-24.
const ATTENDANCE: [(&str, attendance_record::Status, Option<(u32, u32)>, Option<(u32, u32)>); 5] = [
    ("EMP001", attendance_record::Status::Present, Some((9, 0)), Some((18, 0))),
    ("EMP002", attendance_record::Status::Late, Some((9, 15)), Some((18, 15))),
    ("EMP003", attendance_record::Status::Present, Some((8, 45)), Some((17, 45))),
    ("EMP004", attendance_record::Status::Absent, None, None),
    ("EMP005", attendance_record::Status::HalfDay, Some((10, 30)), Some((15, 0))),
];

/// (code, basic, allowances, deductions, status) in whole currency units for January 2024.
const PAYROLL: [(&str, i64, i64, i64, payroll_record::Status); 5] = [
    ("EMP001", 75_000, 15_000, 8_000, payroll_record::Status::Processed),
    ("EMP002", 65_000, 12_000, 7_000, payroll_record::Status::Processed),
    ("EMP003", 60_000, 10_000, 6_500, payroll_record::Status::Processed),
    ("EMP004", 70_000, 14_000, 7_500, payroll_record::Status::Processing),
    ("EMP005", 68_000, 13_000, 7_200, payroll_record::Status::Pending),
];

/// (code, overall, kpi, goals completed, goals total, rating, review date).
const REVIEWS: [(&str, i16, i16, i32, i32, performance_review::Rating, (i32, u32, u32)); 3] = [
    ("EMP001", 92, 95, 8, 10, performance_review::Rating::Excellent, (2024, 1, 15)),
    ("EMP002", 88, 90, 7, 9, performance_review::Rating::VeryGood, (2024, 1, 10)),
    ("EMP003", 85, 87, 6, 8, performance_review::Rating::Good, (2024, 1, 20)),
];

/// Inserts the demo organisation in one transaction. Fails when the demo
/// employees are already present.
pub async fn seed_hr_demo(db: &DatabaseConnection) -> Result<SeededHrRecords, DbErr> {
    let already = employee::Entity::find()
        .filter(employee::Column::EmployeeId.eq(EMPLOYEES[0].code))
        .one(db)
        .await?;
    if already.is_some() {
        return Err(DbErr::Custom("demo data already seeded".into()));
    }

    let seeded_at: DateTimeWithTimeZone = Utc::now().into();
    let txn = db.begin().await?;

    let mut departments = Vec::new();
    for (name, description) in DEPARTMENTS {
        let model = department::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.into()),
            description: Set(Some(description.into())),
            head_employee_id: Set(None),
            created_at: Set(seeded_at),
            updated_at: Set(seeded_at),
        }
        .insert(&txn)
        .await?;
        departments.push(model);
    }

    let mut designations = Vec::new();
    for name in DESIGNATIONS {
        let model = designation::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.into()),
            description: Set(None),
            created_at: Set(seeded_at),
        }
        .insert(&txn)
        .await?;
        designations.push(model);
    }

    let mut employee_types = Vec::new();
    for name in EMPLOYEE_TYPES {
        let model = employee_type::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.into()),
            image_url: Set(None),
            created_at: Set(seeded_at),
        }
        .insert(&txn)
        .await?;
        employee_types.push(model);
    }

    let mut assets = Vec::new();
    for (name, serial) in ASSETS {
        let model = company_asset::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.into()),
            serial_number: Set(Some(serial.into())),
            created_at: Set(seeded_at),
        }
        .insert(&txn)
        .await?;
        assets.push(model);
    }

    let department_id = |name: &str| departments.iter().find(|d| d.name == name).map(|d| d.id);
    let designation_id = |name: &str| designations.iter().find(|d| d.name == name).map(|d| d.id);
    let full_time = employee_types.first().map(|t| t.id);

    let mut employees = Vec::new();
    for seed in &EMPLOYEES {
        let (y, m, d) = seed.joined;
        let model = employee::ActiveModel {
            id: Set(Uuid::new_v4()),
            employee_id: Set(seed.code.into()),
            name: Set(seed.name.into()),
            date_of_birth: Set(None),
            mobile_number: Set(Some(seed.mobile.into())),
            personal_mail_id: Set(None),
            official_mail_id: Set(Some(seed.email.into())),
            current_address: Set(None),
            permanent_address: Set(None),
            emergency_contact_name: Set(None),
            emergency_contact_number: Set(None),
            gender: Set(Some(seed.gender)),
            highest_education: Set(Some(employee::Education::Undergraduate)),
            employee_type_id: Set(full_time),
            date_of_joining: Set(Some(date(y, m, d)?)),
            department_id: Set(department_id(seed.department)),
            branch_name: Set(Some("Head Office".into())),
            designation_id: Set(designation_id(seed.designation)),
            reporting_manager_id: Set(None),
            shift_from: Set(Some(time(9, 0)?)),
            shift_to: Set(Some(time(18, 0)?)),
            account_name: Set(Some(seed.name.into())),
            account_number: Set(None),
            bank_name: Set(None),
            ifsc_code: Set(None),
            hr_id_card_issue: Set(true),
            hr_photo: Set(true),
            hr_offer_letter: Set(true),
            hr_background_verf: Set(true),
            hr_biomatrix: Set(true),
            hr_all_documents: Set(seed.code != "EMP005"),
            image: Set(None),
            created_at: Set(seeded_at),
            updated_at: Set(seeded_at),
        }
        .insert(&txn)
        .await?;
        employees.push(model);
    }

    let find = |code: &str| {
        employees
            .iter()
            .find(|e| e.employee_id == code)
            .map(|e| e.id)
            .ok_or_else(|| DbErr::Custom(format!("seed employee {} missing", code)))
    };
    let alice = find("EMP001")?;
    let bob = find("EMP002")?;

    // Reporting lines and department heads need the employees to exist first.
    for (report, manager) in [("EMP004", alice), ("EMP005", bob)] {
        let mut active: employee::ActiveModel = employee::Entity::find_by_id(find(report)?)
            .one(&txn)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(report.into()))?
            .into();
        active.reporting_manager_id = Set(Some(manager));
        active.update(&txn).await?;
    }
    for (name, head) in [("Engineering", alice), ("Marketing", bob)] {
        let dept = departments
            .iter_mut()
            .find(|d| d.name == name)
            .ok_or_else(|| DbErr::RecordNotFound(name.into()))?;
        let mut active: department::ActiveModel = dept.clone().into();
        active.head_employee_id = Set(Some(head));
        *dept = active.update(&txn).await?;
    }

    if let Some(laptop) = assets.first() {
        employee_asset::ActiveModel {
            employee_id: Set(alice),
            asset_id: Set(laptop.id),
            assigned_at: Set(seeded_at),
        }
        .insert(&txn)
        .await?;
    }

    let work_date = date(2024, 1, 24)?;
    for (code, status, check_in, check_out) in ATTENDANCE {
        attendance_record::ActiveModel {
            id: Set(Uuid::new_v4()),
            employee_id: Set(find(code)?),
            work_date: Set(work_date),
            check_in: Set(check_in.map(|(h, m)| time(h, m)).transpose()?),
            check_out: Set(check_out.map(|(h, m)| time(h, m)).transpose()?),
            status: Set(status),
            note: Set(None),
            created_at: Set(seeded_at),
            updated_at: Set(seeded_at),
        }
        .insert(&txn)
        .await?;
    }

    let period = date(2024, 1, 1)?;
    for (code, basic, allowances, deductions, status) in PAYROLL {
        let (basic, allowances, deductions) = (basic * 100, allowances * 100, deductions * 100);
        let net = net_salary(basic, allowances, deductions).map_err(DbErr::Custom)?;
        payroll_record::ActiveModel {
            id: Set(Uuid::new_v4()),
            employee_id: Set(find(code)?),
            period: Set(period),
            pay_date: Set(Some(date(2024, 1, 31)?)),
            basic_salary_cents: Set(basic),
            allowances_cents: Set(allowances),
            deductions_cents: Set(deductions),
            net_salary_cents: Set(net),
            currency: Set("USD".into()),
            status: Set(status),
            created_at: Set(seeded_at),
            updated_at: Set(seeded_at),
        }
        .insert(&txn)
        .await?;
    }

    for (code, overall, kpi, completed, total, rating, (y, m, d)) in REVIEWS {
        performance_review::ActiveModel {
            id: Set(Uuid::new_v4()),
            employee_id: Set(find(code)?),
            review_date: Set(date(y, m, d)?),
            overall_score: Set(overall),
            kpi_score: Set(kpi),
            goals_completed: Set(completed),
            goals_total: Set(total),
            rating: Set(rating),
            notes_md: Set(None),
            created_at: Set(seeded_at),
            updated_at: Set(seeded_at),
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;

    // Re-read so callers see the reporting lines set above.
    let employees = employee::Entity::find()
        .filter(employee::Column::Id.is_in(employees.iter().map(|e| e.id).collect::<Vec<_>>()))
        .all(db)
        .await?;
    info!(employees = employees.len(), "seeded HR demo data");

    Ok(SeededHrRecords {
        departments,
        designations,
        employee_types,
        assets,
        employees,
    })
}

fn date(year: i32, month: u32, day: u32) -> Result<NaiveDate, DbErr> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| DbErr::Custom(format!("invalid seed date {}-{}-{}", year, month, day)))
}

fn time(hour: u32, minute: u32) -> Result<NaiveTime, DbErr> {
    NaiveTime::from_hms_opt(hour, minute, 0)
        .ok_or_else(|| DbErr::Custom(format!("invalid seed time {}:{}", hour, minute)))
}
