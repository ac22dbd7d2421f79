//! Router tests over in-memory ports

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tower::ServiceExt;

use domain_admissions::ports::mock::MockStudentPort;
use domain_expenses::ports::mock::MockExpensePort;
use domain_fees::ports::mock::InMemoryFeeStore;
use domain_fees::FeeSettings;
use interface_api::auth::{create_token, ADMIN_ROLE};
use interface_api::config::ApiConfig;
use interface_api::{create_router, AppPorts, AppState};
use test_utils::{EnrollmentFixtures, SettingsFixtures};

struct TestApp {
    router: Router,
    fees: Arc<InMemoryFeeStore>,
    token: String,
}

impl TestApp {
    fn new(settings: Option<FeeSettings>) -> Self {
        let config = ApiConfig::default();
        let fees = Arc::new(match settings {
            Some(settings) => InMemoryFeeStore::with_settings(settings),
            None => InMemoryFeeStore::new(),
        });
        let ports = AppPorts {
            students: Arc::new(MockStudentPort::new()),
            settings: fees.clone(),
            obligations: fees.clone(),
            enrollments: fees.clone(),
            expenses: Arc::new(MockExpensePort::new()),
        };
        let token = create_token("admin", vec![ADMIN_ROLE.to_string()], &config.jwt_secret, 300)
            .unwrap();

        Self {
            router: create_router(AppState::new(config, ports)),
            fees,
            token,
        }
    }

    fn standard() -> Self {
        Self::new(Some(SettingsFixtures::standard()))
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token));
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        send(&self.router, builder.body(body).unwrap()).await
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body)).await
    }

    async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(body)).await
    }

    async fn admit(&self, class: &str) -> (StatusCode, Value) {
        self.post("/api/v1/students", admission_body(class)).await
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, value)
}

fn admission_body(class: &str) -> Value {
    json!({
        "firstName": "Aarav",
        "lastName": "Sharma",
        "dateOfBirth": "2016-03-21",
        "gender": "MALE",
        "classEnrolled": class,
        "section": "A",
        "guardianName": "Rohit Sharma",
        "guardianPhone": "9876543210",
        "guardianEmail": "rohit.sharma@example.com",
        "admissionDate": "2024-06-10"
    })
}

fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).unwrap(),
        Value::Number(n) => Decimal::from_str(&n.to_string()).unwrap(),
        other => panic!("not a decimal: {}", other),
    }
}

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::standard();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let request = Request::builder().uri("/health/ready").body(Body::empty()).unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checks"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_api_requires_token() {
    let app = TestApp::standard();
    let request = Request::builder()
        .uri("/api/v1/students")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let request = Request::builder()
        .uri("/api/v1/students")
        .header(header::AUTHORIZATION, "Bearer not-a-token")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_issues_usable_token() {
    let app = TestApp::standard();
    let login = |password: &str| {
        Request::builder()
            .method(Method::POST)
            .uri("/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({"username": "admin", "password": password}).to_string(),
            ))
            .unwrap()
    };

    let (status, _) = send(&app.router, login("wrong")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let defaults = ApiConfig::default();
    let (status, body) = send(&app.router, login(defaults.admin_password.as_str())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tokenType"], "Bearer");

    let token = body["accessToken"].as_str().unwrap();
    let request = Request::builder()
        .uri("/api/v1/settings")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_admission_creates_student_and_schedule() {
    let app = TestApp::standard();

    let (status, body) = app.admit("Class 5").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["student"]["admissionNumber"], "ADM-2024-0001");
    assert_eq!(body["feeSchedule"]["financialYear"], "2024-25");
    assert_eq!(body["feeSchedule"]["created"].as_array().unwrap().len(), 12);

    let id = body["student"]["id"].as_str().unwrap();
    let (status, statement) = app.get(&format!("/api/v1/students/{}/fees", id)).await;
    assert_eq!(status, StatusCode::OK);

    let obligations = statement["obligations"].as_array().unwrap();
    assert_eq!(obligations.len(), 12);
    assert_eq!(decimal(&statement["totalDue"]), dec!(62500));
    assert_eq!(obligations[0]["dueDate"], "2024-04-01");
    assert_eq!(obligations[11]["dueDate"], "2025-03-01");

    let june = obligations.iter().find(|o| o["month"] == 6).unwrap();
    assert_eq!(decimal(&june["totalAmount"]), dec!(7500));
    let with_admission_fee = obligations
        .iter()
        .filter(|o| !decimal(&o["admissionFee"]).is_zero())
        .count();
    assert_eq!(with_admission_fee, 1);
}

#[tokio::test]
async fn test_admission_rejects_unpriced_class() {
    let app = TestApp::standard();

    let (status, body) = app.admit("Class 9").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["message"].as_str().unwrap().contains("Class 9"));

    let (_, students) = app.get("/api/v1/students").await;
    assert!(students.as_array().unwrap().is_empty());
    assert_eq!(app.fees.obligation_count().await, 0);
}

#[tokio::test]
async fn test_admission_without_settings() {
    let app = TestApp::new(None);
    let (status, _) = app.admit("Class 5").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admission_validation_details() {
    let app = TestApp::standard();

    let mut body = admission_body("Class 5");
    body["guardianEmail"] = json!("not-an-email");
    let (status, response) = app.post("/api/v1/students", body).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response["details"][0].as_str().unwrap().starts_with("guardian_email"));

    let (status, response) = app.post("/api/v1/students", json!({"firstName": "Aarav"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "bad_request");
}

#[tokio::test]
async fn test_student_update_and_deactivate() {
    let app = TestApp::standard();
    let (_, admitted) = app.admit("Class 5").await;
    let uri = format!("/api/v1/students/{}", admitted["student"]["id"].as_str().unwrap());

    let (status, updated) = app.put(&uri, json!({"classEnrolled": "Class 10"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["classEnrolled"], "Class 10");

    let (status, _) = app.put(&uri, json!({"classEnrolled": "Class 11"})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, deactivated) = app.send(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deactivated["isActive"], false);

    let (status, _) = app.put(&uri, json!({"section": "B"})).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_manual_generation_is_idempotent() {
    let app = TestApp::standard();
    let enrollment = EnrollmentFixtures::class_5_june();
    let student_id = uuid::Uuid::from(enrollment.student_id);
    app.fees.add_enrollment(enrollment).await;

    let request = json!({"studentId": student_id, "academicYear": 2025});
    let (status, first) = app.post("/api/v1/fees/monthly", request.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["financialYear"], "2025-26");
    assert_eq!(first["created"].as_array().unwrap().len(), 12);

    let (status, second) = app.post("/api/v1/fees/monthly", request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(second["created"].as_array().unwrap().is_empty());
    assert_eq!(second["skipped"].as_array().unwrap().len(), 12);
    assert_eq!(app.fees.obligation_count().await, 12);
}

#[tokio::test]
async fn test_manual_generation_rejects_out_of_range_year() {
    let app = TestApp::standard();
    let enrollment = EnrollmentFixtures::class_5_june();
    let student_id = uuid::Uuid::from(enrollment.student_id);
    app.fees.add_enrollment(enrollment).await;

    let request = json!({"studentId": student_id, "academicYear": i32::MAX});
    let (status, body) = app.post("/api/v1/fees/monthly", request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(app.fees.obligation_count().await, 0);
}

#[tokio::test]
async fn test_manual_generation_unknown_student() {
    let app = TestApp::standard();
    let request = json!({"studentId": uuid::Uuid::new_v4()});
    let (status, body) = app.post("/api/v1/fees/monthly", request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_payment_updates_obligation() {
    let app = TestApp::standard();
    let (_, admitted) = app.admit("Class 5").await;
    let id = admitted["student"]["id"].as_str().unwrap();
    let (_, statement) = app.get(&format!("/api/v1/students/{}/fees", id)).await;
    let april_id = statement["obligations"][0]["id"].as_str().unwrap().to_string();
    let payments_uri = format!("/api/v1/fees/{}/payments", april_id);

    let (status, receipt) = app
        .post(
            &payments_uri,
            json!({"amount": "2000", "method": "UPI", "paidOn": "2024-04-05"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(receipt["obligation"]["status"], "PARTIALLY_PAID");
    assert_eq!(decimal(&receipt["obligation"]["balanceDue"]), dec!(3000));

    let (status, rejected) = app
        .post(&payments_uri, json!({"amount": "3500", "method": "CASH"}))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(rejected["message"].as_str().unwrap().contains("exceeds"));

    let (status, payments) = app.get(&payments_uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payments.as_array().unwrap().len(), 1);
    assert_eq!(payments[0]["receiptNumber"], receipt["payment"]["receiptNumber"]);

    let (status, _) = app
        .get(&format!("/api/v1/fees/{}/payments", uuid::Uuid::new_v4()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_settings_replace_and_lookup() {
    let app = TestApp::new(None);

    let (status, _) = app.get("/api/v1/settings").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, settings) = app
        .put(
            "/api/v1/settings/class-fees",
            json!({"classFees": [
                {"className": "Class 1", "tuitionFee": "4000", "admissionFee": "2000"},
                {"className": "Class 2", "tuitionFee": "4200", "admissionFee": "2000"}
            ]}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(settings["currency"], "INR");
    assert_eq!(settings["classFees"].as_array().unwrap().len(), 2);

    let (status, _) = app
        .put(
            "/api/v1/settings/transport-bands",
            json!({"transportBands": [
                {"minDistanceKm": "0", "maxDistanceKm": "5", "monthlyFee": "800"},
                {"minDistanceKm": "5.01", "maxDistanceKm": "10", "monthlyFee": "1200"}
            ]}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, fee) = app.get("/api/v1/settings/transport-fee?distanceKm=7").await;
    assert_eq!(decimal(&fee["monthlyFee"]), dec!(1200));

    let (_, fee) = app.get("/api/v1/settings/transport-fee?distanceKm=25").await;
    assert!(fee["monthlyFee"].is_null());

    let (status, _) = app
        .put(
            "/api/v1/settings/class-fees",
            json!({"classFees": [
                {"className": "Class 1", "tuitionFee": "4000", "admissionFee": "2000"},
                {"className": "class 1", "tuitionFee": "4500", "admissionFee": "2000"}
            ]}),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_expense_lifecycle() {
    let app = TestApp::standard();

    let (status, utilities) = app
        .post(
            "/api/v1/expenses",
            json!({
                "category": "UTILITIES",
                "description": "Electricity bill",
                "amount": "3200",
                "expenseDate": "2024-07-05"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .post(
            "/api/v1/expenses",
            json!({
                "category": "SALARY",
                "description": "July salaries",
                "amount": "45000",
                "expenseDate": "2024-07-31",
                "paidTo": "Staff"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, salaries) = app.get("/api/v1/expenses?category=SALARY").await;
    assert_eq!(salaries.as_array().unwrap().len(), 1);

    let (status, summary) = app.get("/api/v1/expenses/summary?from=2024-07-01&to=2024-07-31").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["months"].as_array().unwrap().len(), 1);
    assert_eq!(decimal(&summary["total"]["amount"]), dec!(48200));

    let (status, _) = app.get("/api/v1/expenses?from=2024-08-01&to=2024-07-01").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let uri = format!("/api/v1/expenses/{}", utilities["id"].as_str().unwrap());
    let (status, _) = app.send(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.send(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_zero_expense_rejected() {
    let app = TestApp::standard();
    let (status, _) = app
        .post(
            "/api/v1/expenses",
            json!({
                "category": "OTHER",
                "description": "Nothing",
                "amount": "0",
                "expenseDate": "2024-07-05"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_token_without_admin_role_is_forbidden() {
    let app = TestApp::standard();
    let token = create_token("clerk", vec![], &ApiConfig::default().jwt_secret, 300).unwrap();
    let request = Request::builder()
        .uri("/api/v1/expenses")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");
}
