use thiserror::Error;

use crate::entities;
use crate::ports::VerificationsRepository;

const RECENT_LIMIT: i64 = 10;

#[derive(Error, Debug)]
pub enum VerificationQueryError {
    #[error("Verification not found")]
    NotFound,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Debug, Clone)]
pub struct HistoryPage {
    pub verifications: Vec<entities::Verification>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub total_pages: u64,
}

/// Owner-scoped history, newest first.
pub async fn history<R: VerificationsRepository>(
    repo: &mut R,
    user_id: &entities::UserId,
    page: entities::PageRequest,
) -> anyhow::Result<HistoryPage> {
    let paged = repo.list(user_id, &page).await?;
    Ok(HistoryPage {
        verifications: paged.values,
        page: page.page(),
        page_size: page.size(),
        total: paged.total,
        total_pages: page.total_pages(paged.total),
    })
}

/// Nonexistence and foreign ownership are both NotFound.
pub async fn get_by_id<R: VerificationsRepository>(
    repo: &mut R,
    user_id: &entities::UserId,
    id: entities::VerificationId,
) -> Result<entities::Verification, VerificationQueryError> {
    repo.get_by_id(user_id, id)
        .await?
        .ok_or(VerificationQueryError::NotFound)
}

#[derive(Debug, Clone)]
pub struct DashboardStats {
    pub total_verified: u64,
    pub authentic: u64,
    pub suspicious: u64,
    pub forged: u64,
    /// Everything not yet terminal, PENDING and PROCESSING alike.
    pub pending: u64,
    pub recent: Vec<entities::Verification>,
}

pub async fn dashboard_stats<R: VerificationsRepository>(
    repo: &mut R,
    user_id: &entities::UserId,
) -> anyhow::Result<DashboardStats> {
    let counts = repo.status_counts(user_id).await?;
    let recent = repo.recent(user_id, RECENT_LIMIT).await?;

    // Derived, not queried: the tested contract is the arithmetic identity.
    let pending = counts
        .total
        .saturating_sub(counts.authentic + counts.suspicious + counts.forged);

    Ok(DashboardStats {
        total_verified: counts.total,
        authentic: counts.authentic,
        suspicious: counts.suspicious,
        forged: counts.forged,
        pending,
        recent,
    })
}
