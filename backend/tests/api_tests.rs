use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use serde_json::Value;
use tower::ServiceExt;

use gym_admin_backend::config::MembershipRules;
use gym_admin_backend::domain::FixedClock;
use gym_admin_backend::storage::InMemoryMemberRepository;
use gym_admin_backend::{create_router, AppState};

fn setup_router() -> Router {
    let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
    let state = AppState::new(
        Arc::new(InMemoryMemberRepository::new()),
        Arc::new(FixedClock::new(today)),
        MembershipRules::default(),
    );
    create_router(state, "http://localhost:8080").unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get(router: &Router, query: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .uri(format!("/exec?{}", query))
        .body(Body::empty())
        .unwrap();
    send(router, request).await
}

async fn post_form(router: &Router, form: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/exec")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap();
    send(router, request).await
}

const ADD_ASHA: &str = "action=addMember&name=Asha%20Rao&number=555-0100&membershipType=Premium\
                        &duration=1&membershipFees=1000&paymentType=Full";

#[tokio::test]
async fn test_liveness_without_action() {
    let router = setup_router();

    let (status, body) = get(&router, "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Gym admin service is running correctly");

    let (_, body) = get(&router, "action=somethingElse").await;
    assert_eq!(body["message"], "Gym admin service is running correctly");
}

#[tokio::test]
async fn test_member_lifecycle() {
    let router = setup_router();

    let (status, body) = get(&router, ADD_ASHA).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Member added successfully");

    let (status, body) = get(&router, ADD_ASHA).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Membership with this number already exists");

    let (status, body) = post_form(&router, "action=addDailyPass&number=555%200100").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Daily pass added successfully. ₹70 added to membership fees.");

    let (status, body) = get(&router, "action=extendMembership&number=5550100&duration=2&paymentDate=today").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Membership extended successfully");

    let (status, body) = get(&router, "action=getMemberDetails&number=5550100").await;
    assert_eq!(status, StatusCode::OK);
    let details = &body["data"];
    assert_eq!(details["name"], "Asha Rao");
    assert_eq!(details["phoneNumber"], "555-0100");
    assert_eq!(details["membershipType"], "Premium");
    assert_eq!(details["duration"], "3 Month(s)");
    assert_eq!(details["startDate"], "6/15/2025");
    assert_eq!(details["endDate"], "9/15/2025");
    assert_eq!(details["paymentDueDate"], "9/15/2025");
    assert_eq!(details["membershipFees"], 1070.0);
    assert_eq!(details["totalPaid"], 1070.0);
}

#[tokio::test]
async fn test_customer_registration_and_activation() {
    let router = setup_router();

    let form = "action=addCustomer&name=Dev&number=98765%2043210&specialNotes=Evening%20batch";
    let (status, body) = post_form(&router, form).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Customer information submitted successfully");

    let (status, body) = post_form(&router, form).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        "This phone number is already registered. Please use a different number or contact us if you need assistance."
    );

    let (_, body) = get(&router, "action=getDashboardData").await;
    assert_eq!(body["data"]["stats"]["activationPending"], 1);
    assert_eq!(body["data"]["pendingActivations"]["list"][0]["specialNotes"], "Evening batch");

    let (status, body) = get(
        &router,
        "action=activateMember&number=9876543210&membershipType=Student&duration=1\
         &membershipFees=800&paymentType=Partial&nextPayment=300&paymentDueDate=2025-06-20",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Member activated successfully");

    let (_, body) = get(&router, "action=getDashboardData&dateRange=monthly").await;
    let data = &body["data"];
    assert_eq!(data["stats"]["activeMembers"], 1);
    assert_eq!(data["stats"]["activationPending"], 0);
    assert_eq!(data["stats"]["totalMembershipCost"], 800.0);
    assert_eq!(data["payments"]["count"], 1);
    assert_eq!(data["payments"]["totalAmount"], 300.0);
    assert_eq!(data["payments"]["list"][0]["daysUntilPayment"], 5);
    assert_eq!(data["payments"]["list"][0]["paymentDueDate"], "6/20/2025");

    let (status, body) = get(&router, "action=markPaymentPaid&number=9876543210").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Payment marked as paid successfully");

    let (_, body) = get(&router, "action=getMemberDetails&number=98765-43210").await;
    assert_eq!(body["data"]["paymentType"], "Full");
    assert_eq!(body["data"]["totalPaid"], 300.0);
    assert_eq!(body["data"]["nextPayment"], 800.0);
    assert_eq!(body["data"]["lastPaymentDate"], "6/15/2025");
}

#[tokio::test]
async fn test_check_number() {
    let router = setup_router();
    get(&router, ADD_ASHA).await;

    let (status, body) = get(&router, "action=checkNumber&number=(555)%200100").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Number exists");

    let (status, body) = get(&router, "action=checkNumber&number=5550199").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Number not found");
}

#[tokio::test]
async fn test_failures_are_enveloped() {
    let router = setup_router();

    let (status, body) = get(&router, "action=addDailyPass&number=5550199").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Member with this number not found");
    assert!(body["timestamp"].is_string());

    let (status, body) = get(&router, "action=markPaymentPaid&number=5550100&paymentDate=tomorrow").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Invalid payment date");

    let (status, body) = get(&router, "action=getDashboardData&dateRange=custom&startDate=2025-06-30&endDate=2025-06-01").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);

    let (status, body) = get(&router, "action=addMember&name=Asha&number=5550100&membershipType=Gold&duration=1&membershipFees=10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Unknown membership type 'Gold'");
}

#[tokio::test]
async fn test_expired_members_empty() {
    let router = setup_router();
    get(&router, ADD_ASHA).await;

    let (status, body) = get(&router, "action=getExpiredMembers").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"], serde_json::json!([]));
}
