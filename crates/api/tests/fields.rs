mod common;

use api::auth::HrRole;
use common::{has_error_code, HrTestContext};
use serde_json::{json, Value};

const ADD: &str = r#"
    mutation Add($input: AddEmployeeFieldInput!) {
        hr { addEmployeeField(input: $input) { name label fieldType } }
    }
"#;

const SET: &str = r#"
    mutation Set($employeeId: ID!, $field: String!, $value: String) {
        hr { setEmployeeCustomValue(employeeId: $employeeId, field: $field, value: $value) {
            name fieldType value
        } }
    }
"#;

const VALUES: &str = r#"
    query Values($employeeId: ID!) {
        hr { employeeCustomValues(employeeId: $employeeId) { name label value } }
    }
"#;

async fn add_field(ctx: &HrTestContext, name: &str, label: &str, kind: &str) -> Value {
    let resp = ctx
        .exec_as(
            Some(HrRole::Admin),
            ADD,
            json!({ "input": { "name": name, "label": label, "fieldType": kind } }),
        )
        .await;
    assert!(resp.errors.is_empty(), "unexpected errors: {:?}", resp.errors);
    resp.data.into_json().unwrap()["hr"]["addEmployeeField"].clone()
}

#[tokio::test]
async fn only_admins_can_alter_the_employee_table() {
    let ctx = HrTestContext::new_seeded().await;
    let vars = json!({ "input": { "name": "blood_group", "label": "Blood group", "fieldType": "TEXT" } });
    let resp = ctx.exec(ADD, vars.clone()).await;
    assert!(has_error_code(&resp.errors, "FORBIDDEN"));

    let resp = ctx.exec_as(Some(HrRole::Admin), ADD, vars).await;
    assert!(resp.errors.is_empty(), "unexpected errors: {:?}", resp.errors);
    let data = ctx
        .hr_data("query { hr { employeeFields { name label fieldType } } }", json!({}))
        .await;
    assert_eq!(
        data["employeeFields"],
        json!([{ "name": "blood_group", "label": "Blood group", "fieldType": "TEXT" }])
    );
}

#[tokio::test]
async fn field_names_are_validated() {
    let ctx = HrTestContext::new_seeded().await;
    add_field(&ctx, "badge_number", "Badge", "NUMBER").await;
    let cases = vec![
        ("badge_number", "CONFLICT"),
        ("mobile_number", "VALIDATION"),
        ("9lives", "VALIDATION"),
        ("name; DROP TABLE employee_master", "VALIDATION"),
        ("with space", "VALIDATION"),
    ];
    for (name, code) in cases {
        let resp = ctx
            .exec_as(
                Some(HrRole::Admin),
                ADD,
                json!({ "input": { "name": name, "label": "x", "fieldType": "TEXT" } }),
            )
            .await;
        assert!(
            has_error_code(&resp.errors, code),
            "expected {code} for {name}: {:?}",
            resp.errors
        );
    }
}

#[tokio::test]
async fn custom_values_round_trip_per_type() {
    let ctx = HrTestContext::new_seeded().await;
    let field = add_field(&ctx, "Work_Email", "Work email", "EMAIL").await;
    assert_eq!(field["name"], "work_email");
    add_field(&ctx, "visa_expiry", "Visa expiry", "DATE").await;
    add_field(&ctx, "shoe_size", "Shoe size", "NUMBER").await;

    let carol = ctx.employee_id("EMP003");
    let data = ctx.hr_data(VALUES, json!({ "employeeId": carol })).await;
    let values = data["employeeCustomValues"].as_array().unwrap();
    assert_eq!(values.len(), 3);
    assert!(values.iter().all(|v| v["value"].is_null()));

    let data = ctx
        .hr_data(
            SET,
            json!({ "employeeId": carol, "field": "work_email", "value": "Carol@Corp.test" }),
        )
        .await;
    assert_eq!(data["setEmployeeCustomValue"]["value"], "carol@corp.test");
    assert_eq!(data["setEmployeeCustomValue"]["fieldType"], "EMAIL");

    let data = ctx
        .hr_data(
            SET,
            json!({ "employeeId": carol, "field": "visa_expiry", "value": "2026-03-31" }),
        )
        .await;
    assert_eq!(data["setEmployeeCustomValue"]["value"], "2026-03-31");

    let data = ctx
        .hr_data(
            SET,
            json!({ "employeeId": carol, "field": "shoe_size", "value": "42.5" }),
        )
        .await;
    assert_eq!(data["setEmployeeCustomValue"]["value"], "42.5");

    let data = ctx.hr_data(VALUES, json!({ "employeeId": carol })).await;
    let emails: Vec<&Value> = data["employeeCustomValues"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|v| v["name"] == "work_email")
        .collect();
    assert_eq!(emails[0]["value"], "carol@corp.test");
    assert_eq!(emails[0]["label"], "Work email");

    let data = ctx
        .hr_data(
            SET,
            json!({ "employeeId": carol, "field": "work_email", "value": null }),
        )
        .await;
    assert!(data["setEmployeeCustomValue"]["value"].is_null());

    // Other employees are untouched.
    let alice = ctx.employee_id("EMP001");
    let data = ctx.hr_data(VALUES, json!({ "employeeId": alice })).await;
    assert!(data["employeeCustomValues"]
        .as_array()
        .unwrap()
        .iter()
        .all(|v| v["value"].is_null()));
}

#[tokio::test]
async fn custom_values_are_type_checked() {
    let ctx = HrTestContext::new_seeded().await;
    add_field(&ctx, "work_email", "Work email", "EMAIL").await;
    add_field(&ctx, "visa_expiry", "Visa expiry", "DATE").await;
    add_field(&ctx, "shoe_size", "Shoe size", "NUMBER").await;
    let carol = ctx.employee_id("EMP003");

    let cases = vec![
        ("work_email", "not-an-email", "VALIDATION"),
        ("visa_expiry", "31/03/2026", "VALIDATION"),
        ("shoe_size", "large", "VALIDATION"),
        ("unknown_field", "x", "NOT_FOUND"),
    ];
    for (field, value, code) in cases {
        let resp = ctx
            .exec(SET, json!({ "employeeId": carol, "field": field, "value": value }))
            .await;
        assert!(
            has_error_code(&resp.errors, code),
            "expected {code} for {field}={value}: {:?}",
            resp.errors
        );
    }

    let resp = ctx
        .exec(
            SET,
            json!({
                "employeeId": "0a0b0c0d-0000-4000-8000-000000000000",
                "field": "shoe_size",
                "value": "40"
            }),
        )
        .await;
    assert!(has_error_code(&resp.errors, "NOT_FOUND"));
}

#[tokio::test]
async fn employees_still_work_after_columns_are_added() {
    let ctx = HrTestContext::new_seeded().await;
    add_field(&ctx, "t_shirt_size", "T-shirt size", "TEXT").await;
    let create = r#"
        mutation { hr { createEmployee(input: { employeeId: "EMP050", name: "New Hire" }) { id } } }
    "#;
    let data = ctx.hr_data(create, json!({})).await;
    let id = data["createEmployee"]["id"].as_str().unwrap().to_string();

    let data = ctx.hr_data(VALUES, json!({ "employeeId": id })).await;
    assert_eq!(data["employeeCustomValues"][0]["name"], "t_shirt_size");
    assert!(data["employeeCustomValues"][0]["value"].is_null());

    let data = ctx
        .hr_data("query { hr { employees { employeeId } } }", json!({}))
        .await;
    assert_eq!(data["employees"].as_array().unwrap().len(), 6);
}
