mod common;

use api::auth::HrRole;
use common::{has_error_code, HrTestContext};
use serde_json::{json, Value};

const LIST: &str = r#"
    query List($first: Int, $offset: Int, $filter: EmployeeFilter) {
        hr { employees(first: $first, offset: $offset, filter: $filter) {
            id employeeId name designation department reportingManagerName
        } }
    }
"#;

const CREATE: &str = r#"
    mutation Create($input: NewEmployeeInput!) {
        hr { createEmployee(input: $input) {
            id employeeId name officialMailId departmentId
            department { name }
            onboarding { complete }
        } }
    }
"#;

const UPDATE: &str = r#"
    mutation Update($input: UpdateEmployeeInput!) {
        hr { updateEmployee(input: $input) { id name reportingManagerId branchName } }
    }
"#;

fn codes(rows: &Value) -> Vec<String> {
    rows.as_array()
        .unwrap()
        .iter()
        .map(|row| row["employeeId"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn list_joins_lookups_and_defaults_manager() {
    let ctx = HrTestContext::new_seeded().await;
    let data = ctx.hr_data(LIST, json!({})).await;
    let rows = &data["employees"];
    assert_eq!(
        codes(rows),
        vec!["EMP001", "EMP002", "EMP003", "EMP004", "EMP005"]
    );
    assert_eq!(rows[0]["department"], "Engineering");
    assert_eq!(rows[0]["designation"], "Senior Developer");
    assert_eq!(rows[0]["reportingManagerName"], "Not assigned");
    assert_eq!(rows[3]["reportingManagerName"], "Alice Johnson");
    assert_eq!(rows[4]["reportingManagerName"], "Bob Smith");
}

#[tokio::test]
async fn search_matches_joined_fields_case_insensitively() {
    let ctx = HrTestContext::new_seeded().await;

    let data = ctx
        .hr_data(LIST, json!({ "filter": { "q": "ENGINEERING" } }))
        .await;
    assert_eq!(codes(&data["employees"]), vec!["EMP001", "EMP004"]);

    let data = ctx
        .hr_data(LIST, json!({ "filter": { "q": "bob smith" } }))
        .await;
    // Bob himself plus Emma, who reports to him.
    assert_eq!(codes(&data["employees"]), vec!["EMP002", "EMP005"]);

    let data = ctx
        .hr_data(LIST, json!({ "filter": { "q": "not assigned" }, "first": 2 }))
        .await;
    assert_eq!(codes(&data["employees"]), vec!["EMP001", "EMP002"]);

    let data = ctx
        .hr_data(LIST, json!({ "filter": { "q": "0103" } }))
        .await;
    assert_eq!(codes(&data["employees"]), vec!["EMP003"]);
}

#[tokio::test]
async fn filters_by_department_and_manager() {
    let ctx = HrTestContext::new_seeded().await;
    let marketing = ctx.department_id("Marketing");
    let data = ctx
        .hr_data(LIST, json!({ "filter": { "departmentId": marketing } }))
        .await;
    assert_eq!(codes(&data["employees"]), vec!["EMP002", "EMP005"]);

    let alice = ctx.employee_id("EMP001");
    let data = ctx
        .hr_data(LIST, json!({ "filter": { "managerId": alice } }))
        .await;
    assert_eq!(codes(&data["employees"]), vec!["EMP004"]);

    let data = ctx
        .hr_data(LIST, json!({ "first": 2, "offset": 3 }))
        .await;
    assert_eq!(codes(&data["employees"]), vec!["EMP004", "EMP005"]);
}

#[tokio::test]
async fn employee_detail_resolves_relations() {
    let ctx = HrTestContext::new_seeded().await;
    let query = r#"
        query One($code: String!) {
            hr { employeeByCode(employeeId: $code) {
                id name gender
                department { name }
                designation { name }
                employeeType { name }
                reportingManager { employeeId }
                directReports { employeeId }
                assets { name }
                bank { accountName }
                onboarding { allDocuments complete }
            } }
        }
    "#;
    let data = ctx.hr_data(query, json!({ "code": "EMP001" })).await;
    let alice = &data["employeeByCode"];
    assert_eq!(alice["gender"], "FEMALE");
    assert_eq!(alice["department"]["name"], "Engineering");
    assert_eq!(alice["designation"]["name"], "Senior Developer");
    assert_eq!(alice["employeeType"]["name"], "Full Time");
    assert!(alice["reportingManager"].is_null());
    assert_eq!(alice["directReports"][0]["employeeId"], "EMP004");
    assert_eq!(alice["assets"][0]["name"], "Laptop");
    assert_eq!(alice["bank"]["accountName"], "Alice Johnson");
    assert_eq!(alice["onboarding"]["complete"], true);

    let data = ctx.hr_data(query, json!({ "code": "EMP005" })).await;
    let emma = &data["employeeByCode"];
    assert_eq!(emma["reportingManager"]["employeeId"], "EMP002");
    assert_eq!(emma["onboarding"]["allDocuments"], false);
    assert_eq!(emma["onboarding"]["complete"], false);

    let data = ctx.hr_data(query, json!({ "code": "EMP999" })).await;
    assert!(data["employeeByCode"].is_null());
}

#[tokio::test]
async fn create_and_update_employee() {
    let ctx = HrTestContext::new_seeded().await;
    let engineering = ctx.department_id("Engineering");
    let data = ctx
        .hr_data(
            CREATE,
            json!({
                "input": {
                    "employeeId": " EMP006 ",
                    "name": "Frank Miller",
                    "officialMailId": "Frank.Miller@HRM.test",
                    "departmentId": engineering,
                    "gender": "MALE",
                    "highestEducation": "POSTGRADUATE",
                    "dateOfJoining": "2024-02-01",
                    "onboarding": {
                        "idCardIssued": true, "photo": true, "offerLetter": true,
                        "backgroundVerification": true, "biometrics": true, "allDocuments": true
                    }
                }
            }),
        )
        .await;
    let created = &data["createEmployee"];
    assert_eq!(created["employeeId"], "EMP006");
    assert_eq!(created["officialMailId"], "frank.miller@hrm.test");
    assert_eq!(created["department"]["name"], "Engineering");
    assert_eq!(created["onboarding"]["complete"], true);
    let id = created["id"].as_str().unwrap().to_string();

    let alice = ctx.employee_id("EMP001");
    let data = ctx
        .hr_data(
            UPDATE,
            json!({ "input": { "id": id, "reportingManagerId": alice, "branchName": "Remote" } }),
        )
        .await;
    assert_eq!(data["updateEmployee"]["reportingManagerId"], alice.as_str());
    assert_eq!(data["updateEmployee"]["branchName"], "Remote");
    assert_eq!(data["updateEmployee"]["name"], "Frank Miller");

    // Explicit null clears the manager; omitted fields are untouched.
    let data = ctx
        .hr_data(UPDATE, json!({ "input": { "id": id, "reportingManagerId": null } }))
        .await;
    assert!(data["updateEmployee"]["reportingManagerId"].is_null());
    assert_eq!(data["updateEmployee"]["branchName"], "Remote");
}

#[tokio::test]
async fn create_rejects_invalid_input() {
    let ctx = HrTestContext::new_seeded().await;
    let cases = vec![
        (json!({ "employeeId": "EMP001", "name": "Dup" }), "CONFLICT"),
        (json!({ "employeeId": "EMP010", "name": "   " }), "VALIDATION"),
        (json!({ "employeeId": "", "name": "No Code" }), "VALIDATION"),
        (
            json!({ "employeeId": "EMP011", "name": "Bad Mail", "personalMailId": "nope" }),
            "VALIDATION",
        ),
        (
            json!({
                "employeeId": "EMP012",
                "name": "Ghost Dept",
                "departmentId": "7f1e1d8e-0000-4000-8000-000000000000"
            }),
            "VALIDATION",
        ),
        (
            json!({ "employeeId": "EMP013", "name": "Bad Id", "designationId": "not-a-uuid" }),
            "VALIDATION",
        ),
    ];
    for (input, code) in cases {
        let resp = ctx.exec(CREATE, json!({ "input": input })).await;
        assert!(
            has_error_code(&resp.errors, code),
            "expected {code} for {input}: {:?}",
            resp.errors
        );
    }
}

#[tokio::test]
async fn reporting_lines_cannot_loop() {
    let ctx = HrTestContext::new_seeded().await;
    let alice = ctx.employee_id("EMP001");
    let david = ctx.employee_id("EMP004");

    let resp = ctx
        .exec(UPDATE, json!({ "input": { "id": alice, "reportingManagerId": alice } }))
        .await;
    assert!(has_error_code(&resp.errors, "VALIDATION"));

    // David already reports to Alice.
    let resp = ctx
        .exec(UPDATE, json!({ "input": { "id": alice, "reportingManagerId": david } }))
        .await;
    assert!(has_error_code(&resp.errors, "VALIDATION"));
}

#[tokio::test]
async fn delete_detaches_reports_and_department_heads() {
    let ctx = HrTestContext::new_seeded().await;
    let alice = ctx.employee_id("EMP001");
    let delete = r#"mutation Delete($id: ID!) { hr { deleteEmployee(id: $id) } }"#;
    let data = ctx.hr_data(delete, json!({ "id": alice })).await;
    assert_eq!(data["deleteEmployee"], true);

    let data = ctx.hr_data(delete, json!({ "id": alice })).await;
    assert_eq!(data["deleteEmployee"], false);

    let query = r#"
        query { hr {
            employeeByCode(employeeId: "EMP004") { reportingManagerId }
            departments { name headEmployeeId headName employeeCount }
            attendance(date: "2024-01-24") { employeeCode }
        } }
    "#;
    let data = ctx.hr_data(query, json!({})).await;
    assert!(data["employeeByCode"]["reportingManagerId"].is_null());
    let engineering = data["departments"]
        .as_array()
        .unwrap()
        .iter()
        .find(|d| d["name"] == "Engineering")
        .unwrap()
        .clone();
    assert!(engineering["headEmployeeId"].is_null());
    assert_eq!(engineering["headName"], "Not assigned");
    assert_eq!(engineering["employeeCount"], 1);
    assert!(!data["attendance"]
        .as_array()
        .unwrap()
        .iter()
        .any(|row| row["employeeCode"] == "EMP001"));
}

#[tokio::test]
async fn assets_are_replaced_wholesale() {
    let ctx = HrTestContext::new_seeded().await;
    let carol = ctx.employee_id("EMP003");
    let monitor = ctx.seeded().asset_named("Monitor").unwrap().id.to_string();
    let card = ctx.seeded().asset_named("ID Card").unwrap().id.to_string();
    let set = r#"
        mutation Set($employeeId: ID!, $assetIds: [ID!]!) {
            hr { setEmployeeAssets(employeeId: $employeeId, assetIds: $assetIds) { name } }
        }
    "#;
    let data = ctx
        .hr_data(set, json!({ "employeeId": carol, "assetIds": [monitor, card, monitor] }))
        .await;
    let names: Vec<&str> = data["setEmployeeAssets"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["ID Card", "Monitor"]);

    let data = ctx
        .hr_data(set, json!({ "employeeId": carol, "assetIds": [] }))
        .await;
    assert!(data["setEmployeeAssets"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn roles_gate_reads_and_writes() {
    let ctx = HrTestContext::new_seeded().await;
    let resp = ctx.exec_as(None, LIST, json!({})).await;
    assert!(has_error_code(&resp.errors, "UNAUTHENTICATED"));

    let resp = ctx.exec_as(Some(HrRole::Viewer), LIST, json!({})).await;
    assert!(resp.errors.is_empty());

    let resp = ctx
        .exec_as(
            Some(HrRole::Viewer),
            CREATE,
            json!({ "input": { "employeeId": "EMP020", "name": "Viewer Made" } }),
        )
        .await;
    assert!(has_error_code(&resp.errors, "FORBIDDEN"));

    let resp = ctx
        .exec(
            r#"query { hr { employee(id: "not-a-uuid") { id } } }"#,
            json!({}),
        )
        .await;
    assert!(has_error_code(&resp.errors, "BAD_REQUEST"));

    let resp = ctx.exec_as(Some(HrRole::Admin), "query { me { subject roles } }", json!({})).await;
    assert!(resp.errors.is_empty());
    let me = resp.data.into_json().unwrap()["me"].clone();
    assert_eq!(me["subject"], "admin@hrm.test");
    assert_eq!(me["roles"], json!(["ADMIN"]));
}
