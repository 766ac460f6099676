use crate::store;
use crate::store::Store;

use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::Deserialize;
use serde::Serialize;
use time::Duration;
use time::OffsetDateTime;

/// A single citizen-submitted civic complaint record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Issue {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) location: String,
    #[serde(default)]
    pub(crate) coords: Option<Coords>,
    pub(crate) status: Status,
    pub(crate) upvotes: u32,
    pub(crate) comments: Vec<String>,
    #[serde(default)]
    pub(crate) photo: Option<String>,
    #[serde(default)]
    pub(crate) assignee: Option<String>,
    #[serde(with = "time::serde::timestamp::milliseconds")]
    pub(crate) created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub(crate) struct Coords {
    pub(crate) lat: f64,
    pub(crate) lng: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum Status {
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Resolved,
}

impl Status {
    /// Next value in the cyclic order Pending -> In Progress -> Resolved.
    pub(crate) fn next(self) -> Self {
        match self {
            Status::Pending => Status::InProgress,
            Status::InProgress => Status::Resolved,
            Status::Resolved => Status::Pending,
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::InProgress => "In Progress",
            Status::Resolved => "Resolved",
        }
    }
}

/// Fields a citizen submits when reporting an issue. Everything else is
/// defaulted by `Issue::new`.
#[derive(Debug, Clone)]
pub(crate) struct NewIssue {
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) location: String,
    pub(crate) coords: Option<Coords>,
    pub(crate) photo: Option<String>,
}

impl Issue {
    pub(crate) fn new(id: String, created_at: OffsetDateTime, form: NewIssue) -> Self {
        Self {
            id,
            title: form.title,
            description: form.description,
            location: form.location,
            coords: form.coords,
            status: Status::Pending,
            upvotes: 0,
            comments: Vec::new(),
            photo: form.photo,
            assignee: None,
            created_at,
        }
    }
}

pub(crate) fn issue_id() -> String {
    issue_id_with_rng(&mut rand::thread_rng())
}

/// Random ids carry enough entropy to avoid collisions within a session;
/// they are not cryptographic.
pub(crate) fn issue_id_with_rng<R: Rng>(rng: &mut R) -> String {
    std::iter::repeat_with(|| rng.sample(Alphanumeric))
        .take(12)
        .map(char::from)
        .collect()
}

fn map_issue<F>(issues: Vec<Issue>, id: &str, mut f: F) -> Vec<Issue>
where
    F: FnMut(&mut Issue),
{
    issues
        .into_iter()
        .map(|mut issue| {
            if issue.id == id {
                f(&mut issue);
            }
            issue
        })
        .collect()
}

/// Prepends the new issue, so the collection stays newest-first.
pub(crate) fn create(mut issues: Vec<Issue>, issue: Issue) -> Vec<Issue> {
    issues.insert(0, issue);
    issues
}

pub(crate) fn upvote(issues: Vec<Issue>, id: &str) -> Vec<Issue> {
    map_issue(issues, id, |issue| issue.upvotes += 1)
}

pub(crate) fn advance_status(issues: Vec<Issue>, id: &str) -> Vec<Issue> {
    map_issue(issues, id, |issue| issue.status = issue.status.next())
}

pub(crate) fn resolve(issues: Vec<Issue>, id: &str) -> Vec<Issue> {
    map_issue(issues, id, |issue| issue.status = Status::Resolved)
}

/// Overwrites the assignee; an empty or blank label unassigns.
pub(crate) fn assign(issues: Vec<Issue>, id: &str, label: &str) -> Vec<Issue> {
    let label = label.trim();
    let assignee = if label.is_empty() {
        None
    } else {
        Some(label.to_string())
    };
    map_issue(issues, id, |issue| issue.assignee = assignee.clone())
}

/// Appends a comment; empty or whitespace-only text is a no-op.
pub(crate) fn comment(issues: Vec<Issue>, id: &str, text: &str) -> Vec<Issue> {
    let text = text.trim();
    if text.is_empty() {
        return issues;
    }
    map_issue(issues, id, |issue| issue.comments.push(text.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IssueFilter {
    All,
    Status(Status),
    Unassigned,
}

impl IssueFilter {
    /// Unknown filter strings fall back to `All`.
    pub(crate) fn parse(raw: &str) -> Self {
        match raw {
            "Pending" => IssueFilter::Status(Status::Pending),
            "In Progress" => IssueFilter::Status(Status::InProgress),
            "Resolved" => IssueFilter::Status(Status::Resolved),
            "Unassigned" => IssueFilter::Unassigned,
            _ => IssueFilter::All,
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            IssueFilter::All => "All",
            IssueFilter::Status(status) => status.label(),
            IssueFilter::Unassigned => "Unassigned",
        }
    }

    pub(crate) fn matches(self, issue: &Issue) -> bool {
        match self {
            IssueFilter::All => true,
            IssueFilter::Status(status) => issue.status == status,
            IssueFilter::Unassigned => issue
                .assignee
                .as_deref()
                .map_or(true, |assignee| assignee.trim().is_empty()),
        }
    }
}

/// Order-preserving projection of the collection.
pub(crate) fn filter_issues(issues: &[Issue], filter: IssueFilter) -> Vec<Issue> {
    issues
        .iter()
        .filter(|issue| filter.matches(issue))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StatusTotals {
    pub(crate) all: usize,
    pub(crate) pending: usize,
    pub(crate) in_progress: usize,
    pub(crate) resolved: usize,
}

pub(crate) fn status_totals(issues: &[Issue]) -> StatusTotals {
    let count =
        |status: Status| issues.iter().filter(|issue| issue.status == status).count();
    StatusTotals {
        all: issues.len(),
        pending: count(Status::Pending),
        in_progress: count(Status::InProgress),
        resolved: count(Status::Resolved),
    }
}

/// Two example records planted on first run, matching the demo data the
/// dashboards expect.
pub(crate) fn seed_issues(now: OffsetDateTime) -> Vec<Issue> {
    vec![
        Issue {
            id: "i1".to_string(),
            title: "Pothole in Sector 5".to_string(),
            description: "Large pothole causing traffic.".to_string(),
            location: "Sector 5, Salt Lake".to_string(),
            coords: Some(Coords {
                lat: 22.579,
                lng: 88.431,
            }),
            status: Status::Pending,
            upvotes: 3,
            comments: vec!["Needs urgent fix".to_string()],
            photo: None,
            assignee: None,
            created_at: now - Duration::days(1),
        },
        Issue {
            id: "i2".to_string(),
            title: "Broken streetlight in Gariahat".to_string(),
            description: "Dark stretch, safety concern.".to_string(),
            location: "Gariahat crossing".to_string(),
            coords: Some(Coords {
                lat: 22.52,
                lng: 88.365,
            }),
            status: Status::InProgress,
            upvotes: 5,
            comments: Vec::new(),
            photo: None,
            assignee: None,
            created_at: now - Duration::hours(1),
        },
    ]
}

/// Loads the issue collection, seeding the example records when it is
/// absent, corrupt, or empty.
pub(crate) fn load_issues(store: &Store) -> Vec<Issue> {
    let issues: Vec<Issue> = store.load(store::ISSUES_KEY, Vec::new);
    if issues.is_empty() {
        let seeded = seed_issues(OffsetDateTime::now_utc());
        if let Err(err) = store.save(store::ISSUES_KEY, &seeded) {
            eprintln!("failed to seed issue collection: {err}");
        }
        return seeded;
    }
    issues
}

/// Read-mutate-write command used by every issue action: the collection is
/// re-read under the store lock, transformed, and written back wholesale.
pub(crate) fn update_issues<F>(store: &Store, f: F) -> std::io::Result<Vec<Issue>>
where
    F: FnOnce(Vec<Issue>) -> Vec<Issue>,
{
    store.update(store::ISSUES_KEY, Vec::new, |issues: Vec<Issue>| {
        let issues = if issues.is_empty() {
            seed_issues(OffsetDateTime::now_utc())
        } else {
            issues
        };
        f(issues)
    })
}
