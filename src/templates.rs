use crate::issues::StatusTotals;

use askama::Template;
use askama_web::WebTemplate;

#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub(crate) struct HomeTemplate {
    pub(crate) app_name: String,
    pub(crate) user_name: String,
    pub(crate) markers: Vec<MapMarker>,
}

#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub(crate) struct LoginTemplate {
    pub(crate) app_name: String,
    pub(crate) user_name: String,
    pub(crate) error: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "official_login.html")]
pub(crate) struct OfficialLoginTemplate {
    pub(crate) app_name: String,
    pub(crate) user_name: String,
    pub(crate) error: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "report.html")]
pub(crate) struct ReportTemplate {
    pub(crate) app_name: String,
    pub(crate) user_name: String,
    pub(crate) markers: Vec<MapMarker>,
}

#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub(crate) struct DashboardTemplate {
    pub(crate) app_name: String,
    pub(crate) user_name: String,
    pub(crate) totals: StatusTotals,
    pub(crate) filters: Vec<FilterLink>,
    pub(crate) issues: Vec<IssueCard>,
}

#[derive(Template, WebTemplate)]
#[template(path = "official_dashboard.html")]
pub(crate) struct OfficialDashboardTemplate {
    pub(crate) app_name: String,
    pub(crate) user_name: String,
    pub(crate) department: String,
    pub(crate) totals: StatusTotals,
    pub(crate) filters: Vec<FilterLink>,
    pub(crate) issues: Vec<IssueCard>,
}

/// Marker data handed to the map widget through hidden DOM nodes.
pub(crate) struct MapMarker {
    pub(crate) lat: f64,
    pub(crate) lng: f64,
    pub(crate) title: String,
    pub(crate) location: String,
    pub(crate) status: String,
}

pub(crate) struct FilterLink {
    pub(crate) label: String,
    pub(crate) href: String,
    pub(crate) active: bool,
}

/// One issue as rendered on a dashboard. Optional fields arrive as empty
/// strings so the templates stay free of unwrapping logic.
pub(crate) struct IssueCard {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) place: String,
    pub(crate) status: String,
    pub(crate) status_class: String,
    pub(crate) upvotes: u32,
    pub(crate) comments: Vec<String>,
    pub(crate) photo: String,
    pub(crate) assignee: String,
    pub(crate) next: String,
}
