pub mod attendance_record;
pub mod company_asset;
pub mod department;
pub mod designation;
pub mod employee;
pub mod employee_asset;
pub mod employee_field;
pub mod employee_type;
pub mod payroll_record;
pub mod performance_review;
