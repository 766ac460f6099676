use crate::issues;
use crate::issues::Coords;
use crate::issues::Issue;
use crate::issues::IssueFilter;
use crate::issues::NewIssue;
use crate::issues::Status;
use crate::session::OfficialUser;
use crate::session::SessionUser;
use crate::state::AppState;
use crate::templates;

use axum::extract::Form;
use axum::extract::Multipart;
use axum::extract::Path as AxumPath;
use axum::extract::Query;
use axum::extract::State;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::Redirect;
use base64::encode_config;
use serde::Deserialize;
use time::OffsetDateTime;

const CITIZEN_FILTERS: [IssueFilter; 4] = [
    IssueFilter::All,
    IssueFilter::Status(Status::Pending),
    IssueFilter::Status(Status::InProgress),
    IssueFilter::Status(Status::Resolved),
];

const OFFICIAL_FILTERS: [IssueFilter; 5] = [
    IssueFilter::All,
    IssueFilter::Status(Status::Pending),
    IssueFilter::Status(Status::InProgress),
    IssueFilter::Status(Status::Resolved),
    IssueFilter::Unassigned,
];

pub(crate) async fn home(State(state): State<AppState>) -> templates::HomeTemplate {
    let issues = issues::load_issues(&state.store);
    templates::HomeTemplate {
        user_name: super::auth::user_name(&state),
        app_name: state.config.app_name,
        markers: map_markers(&issues),
    }
}

pub(crate) async fn report_form(
    SessionUser(_user): SessionUser,
    State(state): State<AppState>,
) -> templates::ReportTemplate {
    let issues = issues::load_issues(&state.store);
    templates::ReportTemplate {
        user_name: super::auth::user_name(&state),
        app_name: state.config.app_name,
        markers: map_markers(&issues),
    }
}

pub(crate) async fn report_submit(
    SessionUser(_user): SessionUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Redirect, (StatusCode, &'static str)> {
    let mut title = String::new();
    let mut location = String::new();
    let mut description = String::new();
    let mut lat = None;
    let mut lng = None;
    let mut photo = None;

    while let Some(field) = multipart.next_field().await.map_err(form_error)? {
        match field.name().unwrap_or_default() {
            "title" => title = field.text().await.map_err(form_error)?,
            "location" => location = field.text().await.map_err(form_error)?,
            "description" => description = field.text().await.map_err(form_error)?,
            "lat" => lat = field.text().await.map_err(form_error)?.trim().parse().ok(),
            "lng" => lng = field.text().await.map_err(form_error)?.trim().parse().ok(),
            "photo" => {
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(form_error)?;
                if !bytes.is_empty() {
                    photo = photo_data_url(&bytes, content_type.as_deref());
                }
            }
            _ => {}
        }
    }

    let title = title.trim().to_string();
    if title.is_empty() {
        // Blank required input: skip the submission, no error page.
        return Ok(Redirect::to("/report"));
    }

    let coords = match (lat, lng) {
        (Some(lat), Some(lng)) => Some(Coords { lat, lng }),
        _ => None,
    };
    let issue = Issue::new(
        issues::issue_id(),
        OffsetDateTime::now_utc(),
        NewIssue {
            title,
            description: description.trim().to_string(),
            location: location.trim().to_string(),
            coords,
            photo,
        },
    );

    issues::update_issues(&state.store, |list| issues::create(list, issue)).map_err(|err| {
        eprintln!("failed to save issue report: {err}");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error")
    })?;

    Ok(Redirect::to("/dashboard"))
}

fn form_error(err: MultipartError) -> (StatusCode, &'static str) {
    eprintln!("failed to read report form: {err}");
    (StatusCode::BAD_REQUEST, "malformed form")
}

/// Unsupported attachment types are dropped rather than rejected; the report
/// still goes through without a photo.
fn photo_data_url(bytes: &[u8], content_type: Option<&str>) -> Option<String> {
    let content_type = content_type?;
    if !matches!(
        content_type,
        "image/png" | "image/jpeg" | "image/gif" | "image/webp"
    ) {
        return None;
    }
    Some(format!(
        "data:{content_type};base64,{}",
        encode_config(bytes, base64::STANDARD)
    ))
}

#[derive(Debug, Deserialize)]
pub(crate) struct FilterQuery {
    status: Option<String>,
}

pub(crate) async fn dashboard(
    SessionUser(user): SessionUser,
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> templates::DashboardTemplate {
    let filter = match IssueFilter::parse(query.status.as_deref().unwrap_or("All")) {
        // The citizen view filters by status only; Unassigned is official-side.
        IssueFilter::Unassigned => IssueFilter::All,
        other => other,
    };
    let issues = issues::load_issues(&state.store);
    let filtered = issues::filter_issues(&issues, filter);
    templates::DashboardTemplate {
        app_name: state.config.app_name,
        user_name: user.name,
        totals: issues::status_totals(&issues),
        filters: filter_links("/dashboard", &CITIZEN_FILTERS, filter),
        issues: issue_cards(&filtered, "/dashboard"),
    }
}

pub(crate) async fn official_dashboard(
    OfficialUser(user): OfficialUser,
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> templates::OfficialDashboardTemplate {
    let filter = IssueFilter::parse(query.status.as_deref().unwrap_or("All"));
    let issues = issues::load_issues(&state.store);
    let filtered = issues::filter_issues(&issues, filter);
    templates::OfficialDashboardTemplate {
        app_name: state.config.app_name,
        user_name: user.name,
        department: user.department.unwrap_or_default(),
        totals: issues::status_totals(&issues),
        filters: filter_links("/official", &OFFICIAL_FILTERS, filter),
        issues: issue_cards(&filtered, "/official"),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ActionForm {
    next: Option<String>,
}

pub(crate) async fn issue_upvote(
    SessionUser(_user): SessionUser,
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    Form(form): Form<ActionForm>,
) -> Result<Redirect, (StatusCode, &'static str)> {
    issues::update_issues(&state.store, |issues| issues::upvote(issues, &id)).map_err(|err| {
        eprintln!("failed to upvote issue {id}: {err}");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error")
    })?;
    Ok(redirect_back(form.next.as_deref(), "/dashboard"))
}

pub(crate) async fn issue_advance(
    SessionUser(_user): SessionUser,
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    Form(form): Form<ActionForm>,
) -> Result<Redirect, (StatusCode, &'static str)> {
    issues::update_issues(&state.store, |issues| issues::advance_status(issues, &id)).map_err(
        |err| {
            eprintln!("failed to advance issue {id}: {err}");
            (StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        },
    )?;
    Ok(redirect_back(form.next.as_deref(), "/dashboard"))
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentForm {
    text: String,
    next: Option<String>,
}

pub(crate) async fn issue_comment(
    SessionUser(_user): SessionUser,
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    Form(form): Form<CommentForm>,
) -> Result<Redirect, (StatusCode, &'static str)> {
    issues::update_issues(&state.store, |issues| {
        issues::comment(issues, &id, &form.text)
    })
    .map_err(|err| {
        eprintln!("failed to comment on issue {id}: {err}");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error")
    })?;
    Ok(redirect_back(form.next.as_deref(), "/dashboard"))
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssignForm {
    assignee: String,
    next: Option<String>,
}

pub(crate) async fn issue_assign(
    OfficialUser(_user): OfficialUser,
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    Form(form): Form<AssignForm>,
) -> Result<Redirect, (StatusCode, &'static str)> {
    issues::update_issues(&state.store, |issues| {
        issues::assign(issues, &id, &form.assignee)
    })
    .map_err(|err| {
        eprintln!("failed to assign issue {id}: {err}");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error")
    })?;
    Ok(redirect_back(form.next.as_deref(), "/official"))
}

pub(crate) async fn issue_resolve(
    OfficialUser(_user): OfficialUser,
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    Form(form): Form<ActionForm>,
) -> Result<Redirect, (StatusCode, &'static str)> {
    issues::update_issues(&state.store, |issues| issues::resolve(issues, &id)).map_err(|err| {
        eprintln!("failed to resolve issue {id}: {err}");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error")
    })?;
    Ok(redirect_back(form.next.as_deref(), "/official"))
}

fn redirect_back(next: Option<&str>, fallback: &str) -> Redirect {
    let target = sanitize_next(next).unwrap_or_else(|| fallback.to_string());
    Redirect::to(&target)
}

fn sanitize_next(next: Option<&str>) -> Option<String> {
    let next = next?.trim();
    if next.is_empty() {
        return None;
    }
    if !next.starts_with('/') || next.starts_with("//") || next.contains("://") {
        return None;
    }
    Some(next.to_string())
}

fn map_markers(issues: &[Issue]) -> Vec<templates::MapMarker> {
    issues
        .iter()
        .filter_map(|issue| {
            let coords = issue.coords?;
            Some(templates::MapMarker {
                lat: coords.lat,
                lng: coords.lng,
                title: issue.title.clone(),
                location: issue.location.clone(),
                status: issue.status.label().to_string(),
            })
        })
        .collect()
}

fn filter_links(
    base: &str,
    options: &[IssueFilter],
    active: IssueFilter,
) -> Vec<templates::FilterLink> {
    options
        .iter()
        .map(|&option| templates::FilterLink {
            label: option.label().to_string(),
            href: match option {
                IssueFilter::All => base.to_string(),
                other => format!("{base}?status={}", other.label().replace(' ', "%20")),
            },
            active: option == active,
        })
        .collect()
}

fn issue_cards(issues: &[Issue], next: &str) -> Vec<templates::IssueCard> {
    issues
        .iter()
        .map(|issue| templates::IssueCard {
            id: issue.id.clone(),
            title: issue.title.clone(),
            description: issue.description.clone(),
            place: place_label(issue),
            status: issue.status.label().to_string(),
            status_class: status_class(issue.status).to_string(),
            upvotes: issue.upvotes,
            comments: issue.comments.clone(),
            photo: issue.photo.clone().unwrap_or_default(),
            assignee: issue.assignee.clone().unwrap_or_default(),
            next: next.to_string(),
        })
        .collect()
}

/// Location text when present, otherwise the picked coordinates.
fn place_label(issue: &Issue) -> String {
    if !issue.location.trim().is_empty() {
        return issue.location.clone();
    }
    match issue.coords {
        Some(coords) => format!("{:.4}, {:.4}", coords.lat, coords.lng),
        None => String::new(),
    }
}

fn status_class(status: Status) -> &'static str {
    match status {
        Status::Pending => "pending",
        Status::InProgress => "progress",
        Status::Resolved => "resolved",
    }
}
