mod common;

use common::{has_error_code, HrTestContext};
use serde_json::json;

const DAY: &str = "2024-01-24";

#[tokio::test]
async fn attendance_day_view_and_summary() {
    let ctx = HrTestContext::new_seeded().await;
    let query = r#"
        query Day($date: NaiveDate!) { hr {
            attendance(date: $date) { employeeCode employeeName status minutesWorked hoursWorked }
            attendanceSummary(date: $date) {
                total present late absent halfDay presentRate lateRate absentRate halfDayRate
            }
        } }
    "#;
    let data = ctx.hr_data(query, json!({ "date": DAY })).await;
    let rows = data["attendance"].as_array().unwrap();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0]["employeeCode"], "EMP001");
    assert_eq!(rows[0]["hoursWorked"], "9h 0m");
    assert_eq!(rows[1]["status"], "LATE");
    assert_eq!(rows[3]["status"], "ABSENT");
    assert_eq!(rows[3]["minutesWorked"], 0);
    assert_eq!(rows[4]["hoursWorked"], "4h 30m");

    let summary = &data["attendanceSummary"];
    assert_eq!(summary["total"], 5);
    assert_eq!(summary["present"], 2);
    assert_eq!(summary["late"], 1);
    assert_eq!(summary["absent"], 1);
    assert_eq!(summary["halfDay"], 1);
    assert_eq!(summary["presentRate"], 40.0);
    assert_eq!(summary["halfDayRate"], 20.0);

    let filtered = r#"
        query { hr { attendance(date: "2024-01-24", status: PRESENT) { employeeCode } } }
    "#;
    let data = ctx.hr_data(filtered, json!({})).await;
    assert_eq!(
        data["attendance"],
        json!([{ "employeeCode": "EMP001" }, { "employeeCode": "EMP003" }])
    );

    let empty = ctx
        .hr_data(query, json!({ "date": "2024-01-25" }))
        .await;
    assert_eq!(empty["attendanceSummary"]["total"], 0);
    assert_eq!(empty["attendanceSummary"]["presentRate"], 0.0);
}

#[tokio::test]
async fn marking_attendance_upserts_per_day() {
    let ctx = HrTestContext::new_seeded().await;
    let mark = r#"
        mutation Mark($input: MarkAttendanceInput!) {
            hr { markAttendance(input: $input) { id status hoursWorked employeeName } }
        }
    "#;
    let david = ctx.employee_id("EMP004");
    let data = ctx
        .hr_data(
            mark,
            json!({ "input": {
                "employeeId": david, "workDate": DAY, "status": "LATE",
                "checkIn": "11:00:00", "checkOut": "19:15:00", "note": "Doctor visit"
            } }),
        )
        .await;
    let marked = &data["markAttendance"];
    assert_eq!(marked["status"], "LATE");
    assert_eq!(marked["hoursWorked"], "8h 15m");
    assert_eq!(marked["employeeName"], "David Brown");

    let summary = ctx
        .hr_data(
            r#"query { hr { attendanceSummary(date: "2024-01-24") { total late absent } } }"#,
            json!({}),
        )
        .await;
    assert_eq!(summary["attendanceSummary"]["total"], 5);
    assert_eq!(summary["attendanceSummary"]["late"], 2);
    assert_eq!(summary["attendanceSummary"]["absent"], 0);

    let resp = ctx
        .exec(
            mark,
            json!({ "input": {
                "employeeId": david, "workDate": "2024-01-26", "status": "PRESENT",
                "checkIn": "18:00:00", "checkOut": "09:00:00"
            } }),
        )
        .await;
    assert!(has_error_code(&resp.errors, "VALIDATION"));

    let resp = ctx
        .exec(
            mark,
            json!({ "input": {
                "employeeId": "0a0b0c0d-0000-4000-8000-000000000000",
                "workDate": DAY, "status": "PRESENT"
            } }),
        )
        .await;
    assert!(has_error_code(&resp.errors, "VALIDATION"));

    let id = marked["id"].as_str().unwrap().to_string();
    let data = ctx
        .hr_data(
            r#"mutation Delete($id: ID!) { hr { deleteAttendance(id: $id) } }"#,
            json!({ "id": id }),
        )
        .await;
    assert_eq!(data["deleteAttendance"], true);
}

#[tokio::test]
async fn payroll_month_view_and_summary() {
    let ctx = HrTestContext::new_seeded().await;
    let query = r#"
        query Month($period: NaiveDate!) { hr {
            payroll(period: $period) { employeeCode netSalaryCents status currency }
            payrollSummary(period: $period) {
                period totalNetCents recordCount processedCount completionRate averageNetCents
            }
        } }
    "#;
    // Any day of the month selects the whole period.
    let data = ctx.hr_data(query, json!({ "period": "2024-01-17" })).await;
    let rows = data["payroll"].as_array().unwrap();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0]["employeeCode"], "EMP001");
    assert_eq!(rows[0]["netSalaryCents"], 8_200_000);
    assert_eq!(rows[0]["currency"], "USD");

    let summary = &data["payrollSummary"];
    assert_eq!(summary["period"], "2024-01-01");
    assert_eq!(summary["totalNetCents"], 36_580_000);
    assert_eq!(summary["recordCount"], 5);
    assert_eq!(summary["processedCount"], 3);
    assert_eq!(summary["completionRate"], 60.0);
    assert_eq!(summary["averageNetCents"], 7_316_000);

    let pending = ctx
        .hr_data(
            r#"query { hr { payroll(period: "2024-01-01", status: PENDING) { employeeCode } } }"#,
            json!({}),
        )
        .await;
    assert_eq!(pending["payroll"], json!([{ "employeeCode": "EMP005" }]));
}

#[tokio::test]
async fn payroll_records_compute_net_and_stay_unique() {
    let ctx = HrTestContext::new_seeded().await;
    let create = r#"
        mutation Create($input: NewPayrollInput!) {
            hr { createPayrollRecord(input: $input) { id period netSalaryCents status currency } }
        }
    "#;
    let carol = ctx.employee_id("EMP003");
    let data = ctx
        .hr_data(
            create,
            json!({ "input": {
                "employeeId": carol, "period": "2024-02-15",
                "basicSalaryCents": 6_000_000, "allowancesCents": 1_000_000,
                "deductionsCents": 650_000, "currency": "eur"
            } }),
        )
        .await;
    let record = &data["createPayrollRecord"];
    assert_eq!(record["period"], "2024-02-01");
    assert_eq!(record["netSalaryCents"], 6_350_000);
    assert_eq!(record["status"], "PENDING");
    assert_eq!(record["currency"], "EUR");
    let id = record["id"].as_str().unwrap().to_string();

    let resp = ctx
        .exec(
            create,
            json!({ "input": { "employeeId": carol, "period": "2024-02-28", "basicSalaryCents": 1 } }),
        )
        .await;
    assert!(has_error_code(&resp.errors, "CONFLICT"));

    let invalid = vec![
        json!({ "employeeId": carol, "period": "2024-03-01", "basicSalaryCents": -5 }),
        json!({ "employeeId": carol, "period": "2024-03-01", "basicSalaryCents": 100, "deductionsCents": 101 }),
        json!({ "employeeId": carol, "period": "2024-03-01", "basicSalaryCents": 100, "currency": "EURO" }),
    ];
    for input in invalid {
        let resp = ctx.exec(create, json!({ "input": input })).await;
        assert!(
            has_error_code(&resp.errors, "VALIDATION"),
            "expected VALIDATION for {input}: {:?}",
            resp.errors
        );
    }

    let update = r#"
        mutation Update($input: UpdatePayrollInput!) {
            hr { updatePayrollRecord(input: $input) { netSalaryCents status payDate } }
        }
    "#;
    let data = ctx
        .hr_data(
            update,
            json!({ "input": {
                "id": id, "allowancesCents": 2_000_000, "status": "PROCESSED", "payDate": "2024-02-29"
            } }),
        )
        .await;
    assert_eq!(data["updatePayrollRecord"]["netSalaryCents"], 7_350_000);
    assert_eq!(data["updatePayrollRecord"]["status"], "PROCESSED");
    assert_eq!(data["updatePayrollRecord"]["payDate"], "2024-02-29");

    let resp = ctx
        .exec(update, json!({ "input": { "id": id, "deductionsCents": 99_000_000 } }))
        .await;
    assert!(has_error_code(&resp.errors, "VALIDATION"));

    let data = ctx
        .hr_data(
            r#"mutation Delete($id: ID!) { hr { deletePayrollRecord(id: $id) } }"#,
            json!({ "id": id }),
        )
        .await;
    assert_eq!(data["deletePayrollRecord"], true);
}

#[tokio::test]
async fn performance_reviews_and_summary() {
    let ctx = HrTestContext::new_seeded().await;
    let query = r#"
        query { hr {
            performanceReviews { employeeCode department overallScore rating goalCompletionRate }
            performanceSummary {
                reviewCount averageScore goalsCompleted goalsTotal goalCompletionRate excellentCount
            }
        } }
    "#;
    let data = ctx.hr_data(query, json!({})).await;
    let reviews = data["performanceReviews"].as_array().unwrap();
    // Newest first.
    assert_eq!(reviews[0]["employeeCode"], "EMP003");
    assert_eq!(reviews[1]["employeeCode"], "EMP001");
    assert_eq!(reviews[1]["department"], "Engineering");
    assert_eq!(reviews[1]["rating"], "EXCELLENT");
    assert_eq!(reviews[1]["goalCompletionRate"], 80.0);

    let summary = &data["performanceSummary"];
    assert_eq!(summary["reviewCount"], 3);
    assert_eq!(summary["averageScore"], 88.3);
    assert_eq!(summary["goalsCompleted"], 21);
    assert_eq!(summary["goalsTotal"], 27);
    assert_eq!(summary["goalCompletionRate"], 77.8);
    assert_eq!(summary["excellentCount"], 1);
}

#[tokio::test]
async fn performance_review_lifecycle() {
    let ctx = HrTestContext::new_seeded().await;
    let create = r#"
        mutation Create($input: NewPerformanceReviewInput!) {
            hr { createPerformanceReview(input: $input) { id rating overallScore employeeName } }
        }
    "#;
    let emma = ctx.employee_id("EMP005");
    let data = ctx
        .hr_data(
            create,
            json!({ "input": {
                "employeeId": emma, "reviewDate": "2024-01-28", "overallScore": 74,
                "kpiScore": 70, "goalsCompleted": 4, "goalsTotal": 6
            } }),
        )
        .await;
    let review = &data["createPerformanceReview"];
    assert_eq!(review["rating"], "GOOD");
    assert_eq!(review["employeeName"], "Emma Davis");
    let id = review["id"].as_str().unwrap().to_string();

    let invalid = vec![
        json!({ "employeeId": emma, "reviewDate": "2024-01-28", "overallScore": 101, "kpiScore": 1, "goalsCompleted": 0, "goalsTotal": 0 }),
        json!({ "employeeId": emma, "reviewDate": "2024-01-28", "overallScore": 50, "kpiScore": -1, "goalsCompleted": 0, "goalsTotal": 0 }),
        json!({ "employeeId": emma, "reviewDate": "2024-01-28", "overallScore": 50, "kpiScore": 50, "goalsCompleted": 5, "goalsTotal": 4 }),
    ];
    for input in invalid {
        let resp = ctx.exec(create, json!({ "input": input })).await;
        assert!(has_error_code(&resp.errors, "VALIDATION"), "{input}: {:?}", resp.errors);
    }

    let update = r#"
        mutation Update($input: UpdatePerformanceReviewInput!) {
            hr { updatePerformanceReview(input: $input) { overallScore goalsCompleted rating } }
        }
    "#;
    let data = ctx
        .hr_data(
            update,
            json!({ "input": { "id": id, "overallScore": 91, "goalsCompleted": 6, "rating": "EXCELLENT" } }),
        )
        .await;
    assert_eq!(data["updatePerformanceReview"]["overallScore"], 91);
    assert_eq!(data["updatePerformanceReview"]["rating"], "EXCELLENT");

    let resp = ctx
        .exec(update, json!({ "input": { "id": id, "goalsCompleted": 7 } }))
        .await;
    assert!(has_error_code(&resp.errors, "VALIDATION"));

    let data = ctx
        .hr_data(
            r#"query Reviews($id: ID) { hr { performanceReviews(employeeId: $id) { employeeCode } } }"#,
            json!({ "id": emma }),
        )
        .await;
    assert_eq!(data["performanceReviews"].as_array().unwrap().len(), 1);

    let data = ctx
        .hr_data(
            r#"mutation Delete($id: ID!) { hr { deletePerformanceReview(id: $id) } }"#,
            json!({ "id": id }),
        )
        .await;
    assert_eq!(data["deletePerformanceReview"], true);
}

#[tokio::test]
async fn dashboard_headline_numbers() {
    let ctx = HrTestContext::new_seeded().await;
    let query = r#"
        query Dash($date: NaiveDate) { hr {
            dashboard(date: $date) {
                totalEmployees departmentCount presentToday absentToday halfDayToday
                payrollPeriod monthlyPayrollCents
            }
            headcountByDepartment { department employeeCount share }
        } }
    "#;
    let data = ctx.hr_data(query, json!({ "date": DAY })).await;
    let dash = &data["dashboard"];
    assert_eq!(dash["totalEmployees"], 5);
    assert_eq!(dash["departmentCount"], 5);
    assert_eq!(dash["presentToday"], 3);
    assert_eq!(dash["absentToday"], 1);
    assert_eq!(dash["halfDayToday"], 1);
    assert_eq!(dash["payrollPeriod"], "2024-01-01");
    assert_eq!(dash["monthlyPayrollCents"], 36_580_000);

    let headcount = data["headcountByDepartment"].as_array().unwrap();
    let engineering = headcount
        .iter()
        .find(|row| row["department"] == "Engineering")
        .unwrap();
    assert_eq!(engineering["employeeCount"], 2);
    assert_eq!(engineering["share"], 40.0);
    assert!(!headcount.iter().any(|row| row["department"] == "Unassigned"));
}

#[tokio::test]
async fn empty_database_dashboard_is_zeroed() {
    let ctx = HrTestContext::new().await;
    let data = ctx
        .hr_data(
            r#"query { hr { dashboard(date: "2024-01-24") { totalEmployees presentToday monthlyPayrollCents } headcountByDepartment { department } } }"#,
            json!({}),
        )
        .await;
    assert_eq!(data["dashboard"]["totalEmployees"], 0);
    assert_eq!(data["dashboard"]["presentToday"], 0);
    assert_eq!(data["dashboard"]["monthlyPayrollCents"], 0);
    assert!(data["headcountByDepartment"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn oversized_salaries_cannot_break_monthly_totals() {
    let ctx = HrTestContext::new_seeded().await;
    let create = r#"
        mutation Create($input: NewPayrollInput!) {
            hr { createPayrollRecord(input: $input) { netSalaryCents } }
        }
    "#;
    for code in ["EMP001", "EMP002"] {
        let resp = ctx
            .exec(
                create,
                json!({ "input": {
                    "employeeId": ctx.employee_id(code), "period": "2031-03-01",
                    "basicSalaryCents": 6_000_000_000_000_000_000i64
                } }),
            )
            .await;
        assert!(has_error_code(&resp.errors, "VALIDATION"), "{code}: {:?}", resp.errors);
    }

    let ceiling = 1_000_000_000_000_000i64;
    for code in ["EMP001", "EMP002"] {
        ctx.hr_data(
            create,
            json!({ "input": {
                "employeeId": ctx.employee_id(code), "period": "2031-03-01",
                "basicSalaryCents": ceiling, "allowancesCents": ceiling
            } }),
        )
        .await;
    }
    let data = ctx
        .hr_data(
            r#"query { hr {
                payrollSummary(period: "2031-03-01") { totalNetCents averageNetCents }
                dashboard(date: "2031-03-15") { monthlyPayrollCents }
            } }"#,
            json!({}),
        )
        .await;
    assert_eq!(data["payrollSummary"]["totalNetCents"], 4 * ceiling);
    assert_eq!(data["payrollSummary"]["averageNetCents"], 2 * ceiling);
    assert_eq!(data["dashboard"]["monthlyPayrollCents"], 4 * ceiling);
}

#[tokio::test]
async fn score_only_update_rederives_rating() {
    let ctx = HrTestContext::new_seeded().await;
    let data = ctx
        .hr_data(
            r#"mutation Create($input: NewPerformanceReviewInput!) {
                hr { createPerformanceReview(input: $input) { id rating } }
            }"#,
            json!({ "input": {
                "employeeId": ctx.employee_id("EMP004"), "reviewDate": "2024-01-29",
                "overallScore": 95, "kpiScore": 90, "goalsCompleted": 5, "goalsTotal": 5
            } }),
        )
        .await;
    assert_eq!(data["createPerformanceReview"]["rating"], "EXCELLENT");
    let id = data["createPerformanceReview"]["id"].as_str().unwrap().to_string();

    let update = r#"
        mutation Update($input: UpdatePerformanceReviewInput!) {
            hr { updatePerformanceReview(input: $input) { overallScore rating } }
        }
    "#;
    let data = ctx
        .hr_data(update, json!({ "input": { "id": id, "overallScore": 30 } }))
        .await;
    assert_eq!(data["updatePerformanceReview"]["overallScore"], 30);
    assert_eq!(data["updatePerformanceReview"]["rating"], "NEEDS_IMPROVEMENT");

    let data = ctx
        .hr_data(update, json!({ "input": { "id": id, "overallScore": 72 } }))
        .await;
    assert_eq!(data["updatePerformanceReview"]["rating"], "GOOD");

    // An explicit rating still wins, and a goals-only edit keeps it.
    let data = ctx
        .hr_data(
            update,
            json!({ "input": { "id": id, "overallScore": 72, "rating": "VERY_GOOD" } }),
        )
        .await;
    assert_eq!(data["updatePerformanceReview"]["rating"], "VERY_GOOD");
    let data = ctx
        .hr_data(update, json!({ "input": { "id": id, "kpiScore": 10 } }))
        .await;
    assert_eq!(data["updatePerformanceReview"]["rating"], "VERY_GOOD");
}

#[tokio::test]
async fn concurrent_duplicate_payroll_creates_yield_one_conflict() {
    let ctx = HrTestContext::new_seeded().await;
    let create = r#"
        mutation Create($input: NewPayrollInput!) {
            hr { createPayrollRecord(input: $input) { id } }
        }
    "#;
    let vars = json!({ "input": {
        "employeeId": ctx.employee_id("EMP005"), "period": "2032-07-01",
        "basicSalaryCents": 500_000
    } });
    let (first, second) = tokio::join!(ctx.exec(create, vars.clone()), ctx.exec(create, vars));

    let outcomes = [&first, &second];
    let created = outcomes.iter().filter(|r| r.errors.is_empty()).count();
    let conflicts = outcomes
        .iter()
        .filter(|r| has_error_code(&r.errors, "CONFLICT"))
        .count();
    assert_eq!((created, conflicts), (1, 1), "{:?} / {:?}", first.errors, second.errors);

    let data = ctx
        .hr_data(
            r#"query { hr { payroll(period: "2032-07-01") { employeeCode } } }"#,
            json!({}),
        )
        .await;
    assert_eq!(data["payroll"].as_array().unwrap().len(), 1);
}
