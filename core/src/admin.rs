use crate::Tournament;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Membership requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn label(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "Pending",
            RequestStatus::Approved => "Approved",
            RequestStatus::Rejected => "Rejected",
        }
    }

    /// Cycle used by the status filter: all → pending → approved → rejected → all.
    pub fn cycle(filter: Option<Self>) -> Option<Self> {
        match filter {
            None => Some(RequestStatus::Pending),
            Some(RequestStatus::Pending) => Some(RequestStatus::Approved),
            Some(RequestStatus::Approved) => Some(RequestStatus::Rejected),
            Some(RequestStatus::Rejected) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipPlan {
    Monthly,
    Annual,
    Family,
}

impl MembershipPlan {
    pub fn label(&self) -> &'static str {
        match self {
            MembershipPlan::Monthly => "Monthly",
            MembershipPlan::Annual => "Annual",
            MembershipPlan::Family => "Family",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipRequest {
    pub id: String,
    pub applicant: String,
    pub email: String,
    pub plan: MembershipPlan,
    pub submitted_on: NaiveDate,
    #[serde(default)]
    pub status: RequestStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestFilter {
    pub status: Option<RequestStatus>,
    pub query: String,
}

impl RequestFilter {
    pub fn matches(&self, request: &MembershipRequest) -> bool {
        if self.status.is_some_and(|s| s != request.status) {
            return false;
        }
        let query = self.query.trim().to_lowercase();
        query.is_empty()
            || request.applicant.to_lowercase().contains(&query)
            || request.email.to_lowercase().contains(&query)
    }
}

/// Requests passing `filter`, newest first.
pub fn filter_requests<'a>(
    requests: &'a [MembershipRequest],
    filter: &RequestFilter,
) -> Vec<&'a MembershipRequest> {
    let mut out: Vec<&MembershipRequest> = requests.iter().filter(|r| filter.matches(r)).collect();
    out.sort_by(|a, b| {
        b.submitted_on
            .cmp(&a.submitted_on)
            .then_with(|| a.id.cmp(&b.id))
    });
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

/// Approve or reject a pending request. Held in memory only.
pub fn review(
    requests: &mut [MembershipRequest],
    id: &str,
    decision: Decision,
) -> Result<RequestStatus, AdminError> {
    let request = requests
        .iter_mut()
        .find(|r| r.id == id)
        .ok_or_else(|| AdminError::RequestNotFound(id.to_string()))?;
    if request.status != RequestStatus::Pending {
        return Err(AdminError::AlreadyReviewed {
            id: id.to_string(),
            status: request.status,
        });
    }
    request.status = match decision {
        Decision::Approve => RequestStatus::Approved,
        Decision::Reject => RequestStatus::Rejected,
    };
    Ok(request.status)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminError {
    RequestNotFound(String),
    AlreadyReviewed { id: String, status: RequestStatus },
}

impl fmt::Display for AdminError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminError::RequestNotFound(id) => write!(f, "no membership request {id}"),
            AdminError::AlreadyReviewed { id, status } => {
                write!(f, "request {id} is already {}", status.label().to_lowercase())
            }
        }
    }
}

impl std::error::Error for AdminError {}

// ---------------------------------------------------------------------------
// Tournament listing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TournamentStatus {
    Upcoming,
    InProgress,
    Finished,
}

impl TournamentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TournamentStatus::Upcoming => "Upcoming",
            TournamentStatus::InProgress => "In progress",
            TournamentStatus::Finished => "Finished",
        }
    }

    pub fn cycle(filter: Option<Self>) -> Option<Self> {
        match filter {
            None => Some(TournamentStatus::Upcoming),
            Some(TournamentStatus::Upcoming) => Some(TournamentStatus::InProgress),
            Some(TournamentStatus::InProgress) => Some(TournamentStatus::Finished),
            Some(TournamentStatus::Finished) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TournamentFilter {
    pub status: Option<TournamentStatus>,
    pub category: Option<String>,
}

/// Tournaments passing `filter` on `today`, by start date.
pub fn filter_tournaments<'a>(
    tournaments: &'a [Tournament],
    filter: &TournamentFilter,
    today: NaiveDate,
) -> Vec<&'a Tournament> {
    let mut out: Vec<&Tournament> = tournaments
        .iter()
        .filter(|t| filter.status.is_none_or(|s| t.status(today) == s))
        .filter(|t| filter.category.as_ref().is_none_or(|c| &t.category == c))
        .collect();
    out.sort_by(|a, b| a.start_date.cmp(&b.start_date).then_with(|| a.name.cmp(&b.name)));
    out
}

// ---------------------------------------------------------------------------
// Rankings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub player: String,
    pub category: String,
    pub points: u32,
    #[serde(default)]
    pub tournaments_played: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedEntry<'a> {
    pub position: usize,
    pub entry: &'a RankingEntry,
}

/// Ranking for one category. Equal points share a position (1, 2, 2, 4).
pub fn ranking_table<'a>(entries: &'a [RankingEntry], category: &str) -> Vec<RankedEntry<'a>> {
    let mut sorted: Vec<&RankingEntry> = entries.iter().filter(|e| e.category == category).collect();
    sorted.sort_by(|a, b| b.points.cmp(&a.points).then_with(|| a.player.cmp(&b.player)));

    let mut table: Vec<RankedEntry> = Vec::with_capacity(sorted.len());
    for (i, entry) in sorted.into_iter().enumerate() {
        let position = match table.last() {
            Some(prev) if prev.entry.points == entry.points => prev.position,
            _ => i + 1,
        };
        table.push(RankedEntry { position, entry });
    }
    table
}

/// Distinct categories, sorted.
pub fn categories<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = names.into_iter().map(str::to_string).collect();
    out.sort();
    out.dedup();
    out
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    /// Zero-based, clamped into range.
    pub page: usize,
    pub total_pages: usize,
    pub total: usize,
}

pub fn paginate<T>(items: &[T], page: usize, per_page: usize) -> Page<'_, T> {
    let per_page = per_page.max(1);
    let total = items.len();
    let total_pages = total.div_ceil(per_page).max(1);
    let page = page.min(total_pages - 1);
    let start = (page * per_page).min(total);
    let end = (start + per_page).min(total);
    Page { items: &items[start..end], page, total_pages, total }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
