use crate::commands::{CreateReport, ReviewReport};
use crate::content::{Report, ReportStatus};
use crate::error::NexusResult;
use crate::services::AuthenticatedUser;
use crate::store::SharedStore;

#[derive(Clone)]
pub struct Moderation {
    store: SharedStore,
}

impl Moderation {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn report(&self, reporter_id: i64, report: &CreateReport) -> NexusResult<Report> {
        let report = self.store.create_report(reporter_id, report).await?;
        tracing::info!(
            report_id = report.id,
            reporter_id,
            target = %report.target_type,
            target_id = report.target_id,
            "[Moderation] report filed"
        );
        Ok(report)
    }

    pub async fn list(&self, actor: &AuthenticatedUser, status: Option<ReportStatus>) -> NexusResult<Vec<Report>> {
        actor.require_moderator()?;
        self.store.list_reports(status).await
    }

    /// A report is reviewed once; reviewed reports are final.
    pub async fn review(&self, actor: &AuthenticatedUser, id: i64, review: &ReviewReport) -> NexusResult<Report> {
        actor.require_moderator()?;
        let report = self.store.review_report(id, actor.id, review).await?;
        tracing::info!(report_id = id, status = %report.status, by = actor.id, "[Moderation] report reviewed");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::error::NexusError;
    use crate::memory::MemoryStore;
    use crate::target::{Target, TargetType};
    use crate::user::UserRole;

    #[tokio::test]
    async fn moderators_review_pending_reports() {
        let moderation = Moderation::new(Arc::new(MemoryStore::new()));
        let reporter = AuthenticatedUser { id: 1, role: UserRole::User };
        let moderator = AuthenticatedUser { id: 2, role: UserRole::Moderator };

        let report = moderation
            .report(
                reporter.id,
                &CreateReport { target: Target::new(TargetType::Post, 9), reason: "spam".into() },
            )
            .await
            .unwrap();
        assert_eq!(report.status, ReportStatus::Pending);

        assert!(matches!(moderation.list(&reporter, None).await, Err(NexusError::Forbidden(_))));
        assert_eq!(moderation.list(&moderator, Some(ReportStatus::Pending)).await.unwrap().len(), 1);

        let review = ReviewReport { status: ReportStatus::Accepted, resolution: Some("removed".into()) };
        let reviewed = moderation.review(&moderator, report.id, &review).await.unwrap();
        assert_eq!(reviewed.status, ReportStatus::Accepted);
        assert_eq!(reviewed.moderator_id, Some(moderator.id));
        assert!(moderation.list(&moderator, Some(ReportStatus::Pending)).await.unwrap().is_empty());

        let again = moderation.review(&moderator, report.id, &review).await;
        assert!(matches!(again, Err(NexusError::Conflict(_))));
        assert!(matches!(moderation.review(&moderator, 404, &review).await, Err(NexusError::NotFound(_))));
    }
}
