//! # Admin Action Endpoint
//!
//! The dashboard talks to a single endpoint and picks the operation with the
//! `action` parameter. Parameters may arrive in the query string or as a
//! form body. Every outcome, including failures, is an [`ApiResponse`]
//! envelope so the client can always show `message`.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Form,
};
use serde::Serialize;
use shared::ApiResponse;
use tracing::{error, info, warn};

use super::mappers::MemberMapper;
use super::params::{Action, ActionParams};
use crate::domain::MembershipError;
use crate::AppState;

/// Reply to a request without a recognised action
pub const LIVENESS_MESSAGE: &str = "Gym admin service is running correctly";

const CUSTOMER_DUPLICATE_MESSAGE: &str =
    "This phone number is already registered. Please use a different number or contact us if you need assistance.";

fn respond<T: Serialize>(status: StatusCode, body: ApiResponse<T>) -> Response {
    (status, Json(body)).into_response()
}

fn message_response(success: bool, message: impl Into<String>) -> Response {
    respond(StatusCode::OK, ApiResponse::<serde_json::Value>::message(success, message))
}

/// Entry point for both GET and POST
pub async fn handle_action(
    State(state): State<AppState>,
    Query(query): Query<ActionParams>,
    form: Option<Form<ActionParams>>,
) -> Response {
    let params = match form {
        Some(Form(form)) => query.merge(form),
        None => query,
    };

    let Some(action) = params.action() else {
        info!("No recognised action ({:?}), answering liveness check", params.action);
        return message_response(true, LIVENESS_MESSAGE);
    };

    info!("➡️ {} (number: {})", action, params.number.as_deref().unwrap_or("-"));

    match run_action(&state, action, &params).await {
        Ok(response) => response,
        Err(err) => failure_response(action, err),
    }
}

async fn run_action(state: &AppState, action: Action, params: &ActionParams) -> Result<Response, MembershipError> {
    let members = &state.membership_service;

    let response = match action {
        Action::AddMember => {
            let result = members.add_member(params.to_add_member_command()?).await?;
            message_response(true, result.success_message)
        }
        Action::AddCustomer => {
            let result = members.add_customer(params.to_add_customer_command()?).await?;
            message_response(true, result.success_message)
        }
        Action::ActivateMember => {
            let result = members.activate_member(params.to_activate_member_command()?).await?;
            message_response(true, result.success_message)
        }
        Action::ExtendMembership => {
            let result = members
                .extend_membership(params.to_extend_membership_command()?)
                .await?;
            message_response(true, result.success_message)
        }
        Action::AddDailyPass => {
            let result = members.add_daily_pass(params.phone()?).await?;
            message_response(true, result.success_message)
        }
        Action::MarkPaymentPaid => {
            let result = members
                .mark_payment_paid(params.to_mark_payment_paid_command()?)
                .await?;
            message_response(true, result.success_message)
        }
        Action::CheckNumber => {
            let exists = members.check_phone_number(params.phone()?).await?;
            let message = if exists { "Number exists" } else { "Number not found" };
            message_response(exists, message)
        }
        Action::GetMemberDetails => {
            let record = members.get_member_details(params.phone()?).await?;
            respond(StatusCode::OK, ApiResponse::data(MemberMapper::to_details_dto(record)))
        }
        Action::GetDashboardData => {
            let report = state
                .dashboard_service
                .get_dashboard_data(params.to_dashboard_query()?)
                .await?;
            respond(StatusCode::OK, ApiResponse::data(MemberMapper::to_dashboard_dto(report)))
        }
        Action::GetExpiredMembers => {
            let expired = state.dashboard_service.get_expired_members().await?;
            respond(StatusCode::OK, ApiResponse::data(MemberMapper::to_expired_list_dto(expired)))
        }
    };

    Ok(response)
}

/// Translate a domain failure into an envelope.
///
/// Failures go out as HTTP 200 with `success: false`: the dashboard only
/// reads the envelope of an OK response, and it must show `message`.
fn failure_response(action: Action, err: MembershipError) -> Response {
    let message = match &err {
        MembershipError::DuplicateKey { .. } if action == Action::AddCustomer => {
            CUSTOMER_DUPLICATE_MESSAGE.to_string()
        }
        MembershipError::DuplicateKey { .. } | MembershipError::NotFound { .. } => err.to_string(),
        MembershipError::Validation(message) => message.clone(),
        MembershipError::Storage(cause) => format!("{}: {:#}", action.failure_prefix(), cause),
    };

    if matches!(err, MembershipError::Storage(_)) {
        error!("❌ {} failed: {}", action, message);
    } else {
        warn!("{} rejected: {}", action, message);
    }

    respond(StatusCode::OK, ApiResponse::<serde_json::Value>::failure(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_failures_are_ok_envelopes() {
        let cases = [
            (
                Action::AddMember,
                MembershipError::DuplicateKey { phone: "1".to_string() },
                "Membership with this number already exists",
            ),
            (
                Action::AddCustomer,
                MembershipError::DuplicateKey { phone: "1".to_string() },
                CUSTOMER_DUPLICATE_MESSAGE,
            ),
            (
                Action::AddDailyPass,
                MembershipError::NotFound { phone: "1".to_string() },
                "Member with this number not found",
            ),
            (
                Action::MarkPaymentPaid,
                MembershipError::validation("Invalid payment date"),
                "Invalid payment date",
            ),
            (
                Action::ExtendMembership,
                MembershipError::Storage(anyhow!("disk full")),
                "Error extending membership: disk full",
            ),
        ];

        for (action, err, message) in cases {
            let response = failure_response(action, err);
            assert_eq!(response.status(), StatusCode::OK);
            let body = body_json(response).await;
            assert_eq!(body["success"], false);
            assert_eq!(body["message"], message);
            assert!(body["timestamp"].is_string());
            assert!(body.get("data").is_none());
        }
    }
}
