use log::info;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::{error, success::Download};
use crate::modules::{
    achievement::{
        model::{AchievementDraft, AchievementQuery, NewAchievement, Review},
        repository::AchievementRepository,
        schema::{AchievementEntity, AchievementStatus},
    },
    file::{schema::FileUsage, service::FileService},
    sub_role::service::SubRoleService,
    user::{model::UserResponse, schema::UserRole},
};

/// HOD and above, or Faculty holding the approval permission.
pub fn is_reviewer(actor: &UserResponse) -> bool {
    actor.role.is_hod_or_above()
        || (actor.role == UserRole::Faculty && actor.can_approve_achievements)
}

/// Departments a reviewer may act on: `None` means all of them.
fn review_scope(actor: &UserResponse) -> Result<Option<&str>, error::SystemError> {
    if actor.role.is_institution_wide() {
        return Ok(None);
    }
    actor
        .sub_role
        .as_deref()
        .map(Some)
        .ok_or_else(|| error::SystemError::forbidden("You are not attached to a department"))
}

#[derive(Clone)]
pub struct AchievementService {
    repo: Arc<dyn AchievementRepository + Send + Sync>,
    files: FileService,
    sub_roles: SubRoleService,
}

impl AchievementService {
    pub fn with_dependencies(
        repo: Arc<dyn AchievementRepository + Send + Sync>,
        files: FileService,
        sub_roles: SubRoleService,
    ) -> Self {
        info!("AchievementService initialized with dependencies");
        AchievementService { repo, files, sub_roles }
    }

    async fn find(&self, id: Uuid) -> Result<AchievementEntity, error::SystemError> {
        self.repo
            .find_by_id(&id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Achievement not found"))
    }

    pub async fn submit(
        &self,
        student: &UserResponse,
        draft: AchievementDraft,
    ) -> Result<AchievementEntity, error::SystemError> {
        if !student.role.is_student() {
            return Err(error::SystemError::forbidden("Only students can submit achievements"));
        }
        let department = student
            .sub_role
            .clone()
            .ok_or_else(|| error::SystemError::bad_request("Your account has no department"))?;

        let file_id = match draft.proof {
            Some(proof) => Some(self.files.store(proof, student.id, FileUsage::Achievement).await?.id),
            None => None,
        };

        let created = self
            .repo
            .create(&NewAchievement {
                student_id: student.id,
                title: draft.title,
                description: draft.description,
                category: draft.category,
                department,
                file_id,
            })
            .await;

        match created {
            Ok(achievement) => {
                info!("Achievement {} submitted by {}", achievement.id, student.id);
                Ok(achievement)
            }
            Err(e) => {
                if let Some(file_id) = file_id {
                    self.files.remove(&file_id).await?;
                }
                Err(e)
            }
        }
    }

    pub async fn mine(&self, student: &UserResponse) -> Result<Vec<AchievementEntity>, error::SystemError> {
        self.repo.find_by_student(&student.id).await
    }

    /// Reviewer listing. A department code that resolves to nothing yields an empty list.
    pub async fn list(
        &self,
        actor: &UserResponse,
        query: AchievementQuery,
    ) -> Result<Vec<AchievementEntity>, error::SystemError> {
        if !is_reviewer(actor) {
            return Err(error::SystemError::forbidden("You cannot review achievements"));
        }
        let scope = review_scope(actor)?;

        let department = match query.department.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            Some(code) => match self.sub_roles.resolve(code).await? {
                Some(sub_role) => Some(sub_role.code),
                None => return Ok(Vec::new()),
            },
            None => scope.map(str::to_string),
        };

        if let (Some(scope), Some(department)) = (scope, department.as_deref()) {
            if scope != department {
                return Err(error::SystemError::forbidden(
                    "You can only review achievements of your own department",
                ));
            }
        }

        self.repo
            .list(
                department.as_deref(),
                query.status,
                query.limit.unwrap_or(50),
                query.offset.unwrap_or(0),
            )
            .await
    }

    pub async fn review(
        &self,
        actor: &UserResponse,
        id: Uuid,
        status: AchievementStatus,
        remarks: Option<String>,
    ) -> Result<AchievementEntity, error::SystemError> {
        if status == AchievementStatus::Pending {
            return Err(error::SystemError::bad_request("A review must approve or reject"));
        }
        if !is_reviewer(actor) {
            return Err(error::SystemError::forbidden("You cannot review achievements"));
        }

        let achievement = self.find(id).await?;
        if let Some(scope) = review_scope(actor)? {
            if scope != achievement.department {
                return Err(error::SystemError::forbidden(
                    "You can only review achievements of your own department",
                ));
            }
        }

        let review = Review {
            status,
            reviewed_by: actor.id,
            remarks: remarks.map(|r| r.trim().to_string()).filter(|r| !r.is_empty()),
        };
        let reviewed = self.repo.review(&id, &review).await?.ok_or_else(|| {
            error::SystemError::bad_request("Only pending achievements can be reviewed")
        })?;

        info!("Achievement {} marked {:?} by {}", id, status, actor.id);
        Ok(reviewed)
    }

    /// Proof file, for the student and anyone allowed to review the achievement.
    pub async fn proof(&self, actor: &UserResponse, id: Uuid) -> Result<Download, error::SystemError> {
        let achievement = self.find(id).await?;
        let allowed = actor.id == achievement.student_id
            || (is_reviewer(actor)
                && review_scope(actor)?.map_or(true, |scope| scope == achievement.department));
        if !allowed {
            return Err(error::SystemError::forbidden("You cannot view this proof"));
        }
        let file_id = achievement
            .file_id
            .ok_or_else(|| error::SystemError::not_found("No proof was attached"))?;
        self.files.download(&file_id, None).await
    }

    pub async fn delete(&self, actor: &UserResponse, id: Uuid) -> Result<(), error::SystemError> {
        let achievement = self.find(id).await?;

        let owner_while_pending =
            actor.id == achievement.student_id && achievement.status == AchievementStatus::Pending;
        let manager = actor.role.is_admin()
            || (actor.role == UserRole::Hod && actor.governs(&achievement.department));
        if !owner_while_pending && !manager {
            return Err(error::SystemError::forbidden("This achievement can no longer be deleted"));
        }

        self.repo.delete(&id).await?;
        if let Some(file_id) = achievement.file_id {
            self.files.remove(&file_id).await?;
        }
        info!("Achievement {} deleted by {}", id, actor.id);
        Ok(())
    }

    /// Pending achievements awaiting `actor`, or `None` for non-reviewers.
    pub async fn pending_count(&self, actor: &UserResponse) -> Result<Option<i64>, error::SystemError> {
        if !is_reviewer(actor) {
            return Ok(None);
        }
        let Ok(scope) = review_scope(actor) else {
            return Ok(Some(0));
        };
        Ok(Some(self.repo.count_pending(scope).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::file::model::UploadConfig;
    use crate::modules::sub_role::model::CreateSubRoleModel;
    use crate::test::{member, upload, MemoryAchievements, MemoryFiles, MemoryStorage, MemorySubRoles};

    async fn service() -> AchievementService {
        let files = FileService::new(
            Arc::new(MemoryFiles::default()),
            Arc::new(MemoryStorage::default()),
            UploadConfig::default(),
        );
        let sub_roles = SubRoleService::with_dependencies(Arc::new(MemorySubRoles::default()));
        for code in ["CSE", "IT"] {
            sub_roles
                .create(CreateSubRoleModel {
                    code: code.into(),
                    name: code.into(),
                    allowed_roles: vec![UserRole::Student, UserRole::Faculty, UserRole::Hod],
                })
                .await
                .unwrap();
        }
        AchievementService::with_dependencies(Arc::new(MemoryAchievements::default()), files, sub_roles)
    }

    fn draft(with_proof: bool) -> AchievementDraft {
        AchievementDraft {
            title: "Hackathon winner".into(),
            description: None,
            category: "Technical".into(),
            proof: with_proof.then(|| upload("certificate.png", "image/png", b"png")),
        }
    }

    fn query(department: Option<&str>) -> AchievementQuery {
        AchievementQuery {
            department: department.map(str::to_string),
            status: None,
            limit: None,
            offset: None,
        }
    }

    #[tokio::test]
    async fn submission_starts_pending_in_students_department() {
        let svc = service().await;
        let student = member(UserRole::Student, Some("CSE"), Some("2022"));

        let created = svc.submit(&student, draft(true)).await.unwrap();
        assert_eq!(created.status, AchievementStatus::Pending);
        assert_eq!(created.department, "CSE");
        assert!(created.file_id.is_some());
        assert_eq!(svc.mine(&student).await.unwrap().len(), 1);

        let faculty = member(UserRole::Faculty, Some("CSE"), None);
        assert!(matches!(
            svc.submit(&faculty, draft(false)).await,
            Err(error::SystemError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn only_pending_achievements_transition() {
        let svc = service().await;
        let student = member(UserRole::Student, Some("CSE"), Some("2022"));
        let hod = member(UserRole::Hod, Some("CSE"), None);
        let created = svc.submit(&student, draft(false)).await.unwrap();

        let approved = svc
            .review(&hod, created.id, AchievementStatus::Approved, Some(" well done ".into()))
            .await
            .unwrap();
        assert_eq!(approved.status, AchievementStatus::Approved);
        assert_eq!(approved.reviewed_by, Some(hod.id));
        assert_eq!(approved.remarks.as_deref(), Some("well done"));

        let err = svc.review(&hod, created.id, AchievementStatus::Rejected, None).await.unwrap_err();
        assert!(matches!(err, error::SystemError::BadRequest(_)));
    }

    #[tokio::test]
    async fn reviewers_stay_within_their_department() {
        let svc = service().await;
        let student = member(UserRole::Student, Some("CSE"), Some("2022"));
        let created = svc.submit(&student, draft(false)).await.unwrap();

        let it_hod = member(UserRole::Hod, Some("IT"), None);
        let err = svc.review(&it_hod, created.id, AchievementStatus::Approved, None).await.unwrap_err();
        assert!(matches!(err, error::SystemError::Forbidden(_)));

        let plain_faculty = member(UserRole::Faculty, Some("CSE"), None);
        let err = svc
            .review(&plain_faculty, created.id, AchievementStatus::Approved, None)
            .await
            .unwrap_err();
        assert!(matches!(err, error::SystemError::Forbidden(_)));

        let mut approver = member(UserRole::Faculty, Some("CSE"), None);
        approver.can_approve_achievements = true;
        svc.review(&approver, created.id, AchievementStatus::Rejected, None).await.unwrap();
    }

    #[tokio::test]
    async fn listing_by_department() {
        let svc = service().await;
        svc.submit(&member(UserRole::Student, Some("CSE"), Some("2022")), draft(false)).await.unwrap();
        svc.submit(&member(UserRole::Student, Some("IT"), Some("2022")), draft(false)).await.unwrap();

        let dean = member(UserRole::Dean, None, None);
        assert_eq!(svc.list(&dean, query(None)).await.unwrap().len(), 2);
        assert_eq!(svc.list(&dean, query(Some("it"))).await.unwrap().len(), 1);
        assert!(svc.list(&dean, query(Some("UNKNOWN"))).await.unwrap().is_empty());

        let hod = member(UserRole::Hod, Some("CSE"), None);
        assert_eq!(svc.list(&hod, query(None)).await.unwrap().len(), 1);
        assert!(matches!(svc.list(&hod, query(Some("IT"))).await, Err(error::SystemError::Forbidden(_))));

        assert_eq!(svc.pending_count(&hod).await.unwrap(), Some(1));
        assert_eq!(svc.pending_count(&dean).await.unwrap(), Some(2));
        let student = member(UserRole::Student, Some("CSE"), Some("2022"));
        assert_eq!(svc.pending_count(&student).await.unwrap(), None);
    }

    #[tokio::test]
    async fn owner_deletes_only_while_pending() {
        let svc = service().await;
        let student = member(UserRole::Student, Some("CSE"), Some("2022"));
        let hod = member(UserRole::Hod, Some("CSE"), None);

        let first = svc.submit(&student, draft(true)).await.unwrap();
        svc.delete(&student, first.id).await.unwrap();

        let second = svc.submit(&student, draft(false)).await.unwrap();
        svc.review(&hod, second.id, AchievementStatus::Approved, None).await.unwrap();
        assert!(matches!(svc.delete(&student, second.id).await, Err(error::SystemError::Forbidden(_))));
        svc.delete(&hod, second.id).await.unwrap();
        assert!(svc.mine(&student).await.unwrap().is_empty());
    }
}
