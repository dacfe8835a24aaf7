use chrono::Utc;

use crate::{
    dto::requests::{CreateReportRequest, GenerateReportRequest, RejectRequest},
    error::{AppError, AppResult},
    middleware::auth::{Session, ensure_head_admin},
    models::{Member, MemberStatus, Report, ReportRequest, RequestStatus, Role, new_id},
    response::{ApiResponse, Meta},
    services::{
        notification_service::{Audience, notify},
        stock_request_service::reason_suffix,
    },
    state::AppState,
};

fn ensure_status(request: &ReportRequest, expected: RequestStatus) -> AppResult<()> {
    if request.status != expected {
        return Err(AppError::precondition(format!(
            "Report request is {}, expected {}",
            request.status, expected
        )));
    }
    Ok(())
}

pub async fn create_report_request(
    state: &AppState,
    session: &Session,
    payload: CreateReportRequest,
) -> AppResult<ApiResponse<ReportRequest>> {
    ensure_head_admin(session)?;
    if payload.date_from > payload.date_to {
        return Err(AppError::validation(
            "Start date must not be after end date",
        ));
    }
    let reseller = state
        .store
        .repo::<Member>()
        .find(&payload.reseller_id)
        .await
        .ok()
        .filter(|m| m.role == Role::Reseller && m.status == MemberStatus::Active)
        .ok_or_else(|| AppError::validation("Reports can only be requested from active resellers"))?;

    let request = ReportRequest {
        id: new_id("RR"),
        reseller_id: reseller.id.clone(),
        reseller_name: reseller.username.clone(),
        report_type: payload.report_type,
        date_from: payload.date_from,
        date_to: payload.date_to,
        notes: payload.notes,
        requested_by: session.username.clone(),
        status: RequestStatus::Pending,
        rejection_reason: None,
        created_at: Utc::now(),
    };
    let request = state.store.repo::<ReportRequest>().create(request).await?;
    tracing::info!(request_id = %request.id, reseller = %request.reseller_name, "report request created");

    if let Err(err) = notify(
        state,
        Audience::User(&request.reseller_id),
        "Report Request",
        format!(
            "Head Admin requested a {} report for {} to {}",
            request.report_type, request.date_from, request.date_to
        ),
    )
    .await
    {
        tracing::warn!(error = %err, "notification failed");
    }

    Ok(ApiResponse::success("Report request sent", request, Some(Meta::empty())))
}

/// Head admins see every request; resellers see the requests targeted at them.
pub async fn list_report_requests(
    state: &AppState,
    session: &Session,
) -> AppResult<ApiResponse<Vec<ReportRequest>>> {
    let mut items: Vec<ReportRequest> = state
        .store
        .repo::<ReportRequest>()
        .load()
        .await
        .into_iter()
        .filter(|r| session.is_head_admin() || r.targets(&session.member_id, &session.username))
        .collect();
    items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(ApiResponse::list("Report requests", items))
}

pub async fn approve_report_request(
    state: &AppState,
    session: &Session,
    id: &str,
) -> AppResult<ApiResponse<ReportRequest>> {
    ensure_head_admin(session)?;
    let repo = state.store.repo::<ReportRequest>();
    let mut request = repo.find(id).await?;
    ensure_status(&request, RequestStatus::Pending)?;
    request.status = RequestStatus::Approved;
    let request = repo.update(request).await?;

    if let Err(err) = notify(
        state,
        Audience::User(&request.reseller_id),
        "Report Request Approved",
        format!("Your {} report request is ready to be generated", request.report_type),
    )
    .await
    {
        tracing::warn!(error = %err, "notification failed");
    }
    Ok(ApiResponse::success("Report request approved", request, Some(Meta::empty())))
}

pub async fn reject_report_request(
    state: &AppState,
    session: &Session,
    id: &str,
    payload: RejectRequest,
) -> AppResult<ApiResponse<ReportRequest>> {
    ensure_head_admin(session)?;
    let repo = state.store.repo::<ReportRequest>();
    let mut request = repo.find(id).await?;
    ensure_status(&request, RequestStatus::Pending)?;
    request.status = RequestStatus::Rejected;
    request.rejection_reason = payload.reason();
    let request = repo.update(request).await?;

    if let Err(err) = notify(
        state,
        Audience::User(&request.reseller_id),
        "Report Request Rejected",
        format!(
            "Your {} report request was rejected{}",
            request.report_type,
            reason_suffix(request.rejection_reason.as_deref())
        ),
    )
    .await
    {
        tracing::warn!(error = %err, "notification failed");
    }
    Ok(ApiResponse::success("Report request rejected", request, Some(Meta::empty())))
}

/// Stores a report for an approved request and completes the request. The
/// report is written first; a failed request update is reported, not rolled back.
pub async fn generate_report(
    state: &AppState,
    session: &Session,
    request_id: &str,
    payload: GenerateReportRequest,
) -> AppResult<ApiResponse<Report>> {
    let requests = state.store.repo::<ReportRequest>();
    let mut request = requests.find(request_id).await?;
    if !session.is_head_admin() && !request.targets(&session.member_id, &session.username) {
        return Err(AppError::Forbidden);
    }
    ensure_status(&request, RequestStatus::Approved)?;
    payload.payload.validate_for(request.report_type)?;

    let report = Report {
        id: new_id("RPT"),
        request_id: request.id.clone(),
        report_type: request.report_type,
        date_from: request.date_from,
        date_to: request.date_to,
        generated_by: session.username.clone(),
        generated_at: Utc::now(),
        notes: payload.notes,
        payload: payload.payload,
    };
    let report = state.store.repo::<Report>().create(report).await?;

    request.status = RequestStatus::Completed;
    requests.update(request).await?;
    tracing::info!(report_id = %report.id, request_id = %report.request_id, by = %session.username, "report generated");

    if let Err(err) = notify(
        state,
        Audience::Role(Role::HeadAdmin),
        "Report Generated",
        format!("{} submitted the {} report", session.username, report.report_type),
    )
    .await
    {
        tracing::warn!(error = %err, "notification failed");
    }

    Ok(ApiResponse::success("Report generated", report, Some(Meta::empty())))
}

pub async fn list_reports(
    state: &AppState,
    session: &Session,
) -> AppResult<ApiResponse<Vec<Report>>> {
    let mut items: Vec<Report> = state
        .store
        .repo::<Report>()
        .load()
        .await
        .into_iter()
        .filter(|r| session.is_head_admin() || r.generated_by == session.username)
        .collect();
    items.sort_by(|a, b| b.generated_at.cmp(&a.generated_at));
    Ok(ApiResponse::list("Reports", items))
}

pub async fn get_report(
    state: &AppState,
    session: &Session,
    id: &str,
) -> AppResult<ApiResponse<Report>> {
    let report = state.store.repo::<Report>().find(id).await?;
    if !session.is_head_admin() && report.generated_by != session.username {
        return Err(AppError::Forbidden);
    }
    Ok(ApiResponse::success("Report", report, None))
}
