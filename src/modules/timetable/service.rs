use log::{info, warn};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::{error, success::Download};
use crate::modules::{
    audience::{Audience, TargetRule, Viewer},
    file::{schema::FileUsage, service::FileService},
    sub_role::{schema::SubRoleEntity, service::SubRoleService},
    timetable::{
        model::{TimetableDraft, TimetableValues},
        repository::TimetableRepository,
        schema::TimetableEntity,
    },
    user::{model::UserResponse, schema::UserRole},
};

fn is_manager(role: UserRole) -> bool {
    matches!(role, UserRole::Hod | UserRole::Admin | UserRole::SuperAdmin)
}

pub fn can_upload(actor: &UserResponse) -> bool {
    actor.can_upload_timetable || is_manager(actor.role)
}

/// Every role the department admits, with the batch applied to students.
pub fn department_audience(department: &SubRoleEntity, batch: Option<&str>) -> Vec<TargetRule> {
    department
        .allowed_roles
        .iter()
        .map(|role| {
            let rule = TargetRule::role(*role).with_sub_role(department.code.clone());
            match batch {
                Some(batch) if role.is_student() => rule.with_batch(batch),
                _ => rule,
            }
        })
        .collect()
}

#[derive(Clone)]
pub struct TimetableService {
    repo: Arc<dyn TimetableRepository + Send + Sync>,
    files: FileService,
    sub_roles: SubRoleService,
}

impl TimetableService {
    pub fn with_dependencies(
        repo: Arc<dyn TimetableRepository + Send + Sync>,
        files: FileService,
        sub_roles: SubRoleService,
    ) -> Self {
        info!("TimetableService initialized with dependencies");
        TimetableService { repo, files, sub_roles }
    }

    async fn visible_by_id(&self, id: Uuid, viewer: &Viewer) -> Result<TimetableEntity, error::SystemError> {
        self.repo
            .find_by_id(&id)
            .await?
            .filter(|t| t.audience().is_visible_to(viewer, t.uploaded_by))
            .ok_or_else(|| error::SystemError::not_found("Timetable not found"))
    }

    /// Creates the timetable of a (department, batch), or replaces the existing one.
    ///
    /// The new blob is stored first and the row updated; only then is the old
    /// blob dropped. A failed old-blob delete is logged, never rolled back.
    pub async fn upload(
        &self,
        actor: &UserResponse,
        draft: TimetableDraft,
    ) -> Result<TimetableEntity, error::SystemError> {
        if !can_upload(actor) {
            return Err(error::SystemError::forbidden("You cannot upload timetables"));
        }

        let department = self.sub_roles.resolve(&draft.department).await?.ok_or_else(|| {
            error::SystemError::bad_request(format!("Unknown department '{}'", draft.department))
        })?;
        if !actor.governs(&department.code) {
            return Err(error::SystemError::forbidden(
                "Timetables can only be uploaded for your own department",
            ));
        }

        let batch = draft.batch.as_deref().map(str::trim).filter(|b| !b.is_empty());
        let rules =
            draft.rules.unwrap_or_else(|| department_audience(&department, batch));
        let audience = Audience::new(rules, draft.individuals)?;
        let existing = self.repo.find_by_target(&department.code, batch).await?;

        let file = self.files.store(draft.file, actor.id, FileUsage::DeptDocument).await?;
        let values = TimetableValues {
            title: draft.title,
            department: department.code.clone(),
            batch: batch.map(str::to_string),
            file_id: file.id,
            uploaded_by: actor.id,
            audience,
        };

        let saved = match &existing {
            Some(old) => self.repo.replace(&old.id, &values).await,
            None => self.repo.create(&values).await,
        };
        let saved = match saved {
            Ok(saved) => saved,
            Err(e) => {
                self.files.remove(&file.id).await?;
                return Err(e);
            }
        };

        if let Some(old) = existing {
            if let Err(e) = self.files.remove(&old.file_id).await {
                warn!("Old timetable file {} of {} left behind: {}", old.file_id, old.id, e);
            }
            info!("Timetable {} replaced by {}", saved.id, actor.id);
        } else {
            info!("Timetable {} created by {}", saved.id, actor.id);
        }
        Ok(saved)
    }

    pub async fn visible(&self, viewer: &Viewer) -> Result<Vec<TimetableEntity>, error::SystemError> {
        self.repo.find_visible(viewer).await
    }

    /// Pinned timetables the viewer can still see.
    pub async fn pinned(&self, viewer: &Viewer) -> Result<Vec<TimetableEntity>, error::SystemError> {
        let pinned = self.repo.find_pinned(&viewer.id).await?;
        Ok(pinned.into_iter().filter(|t| t.audience().is_visible_to(viewer, t.uploaded_by)).collect())
    }

    pub async fn pin(&self, viewer: &Viewer, id: Uuid) -> Result<(), error::SystemError> {
        let timetable = self.visible_by_id(id, viewer).await?;
        self.repo.pin(&viewer.id, &timetable.id).await
    }

    pub async fn unpin(&self, viewer: &Viewer, id: Uuid) -> Result<(), error::SystemError> {
        if !self.repo.unpin(&viewer.id, &id).await? {
            return Err(error::SystemError::not_found("Timetable is not pinned"));
        }
        Ok(())
    }

    pub async fn attachment(&self, viewer: &Viewer, id: Uuid) -> Result<Download, error::SystemError> {
        let timetable = self.visible_by_id(id, viewer).await?;
        self.files.download(&timetable.file_id, None).await
    }

    pub async fn delete(&self, actor: &UserResponse, id: Uuid) -> Result<(), error::SystemError> {
        let timetable = self
            .repo
            .find_by_id(&id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Timetable not found"))?;

        if actor.id != timetable.uploaded_by && !is_manager(actor.role) {
            return Err(error::SystemError::forbidden("Only the uploader can delete this timetable"));
        }

        self.repo.delete(&id).await?;
        self.files.remove(&timetable.file_id).await?;
        info!("Timetable {} deleted by {}", id, actor.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::file::model::UploadConfig;
    use crate::modules::sub_role::model::CreateSubRoleModel;
    use crate::test::{
        member, upload, MemoryFiles, MemoryStorage, MemorySubRoles, MemoryTimetables,
    };

    struct Fixture {
        timetables: TimetableService,
        storage: Arc<MemoryStorage>,
    }

    async fn fixture() -> Fixture {
        let storage = Arc::new(MemoryStorage::default());
        let files = FileService::new(
            Arc::new(MemoryFiles::default()),
            storage.clone(),
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
        Fixture {
            timetables: TimetableService::with_dependencies(
                Arc::new(MemoryTimetables::default()),
                files,
                sub_roles,
            ),
            storage,
        }
    }

    fn draft(department: &str, batch: Option<&str>, body: &[u8]) -> TimetableDraft {
        TimetableDraft {
            title: "Odd semester".into(),
            department: department.into(),
            batch: batch.map(str::to_string),
            rules: None,
            individuals: vec![],
            file: upload("timetable.pdf", "application/pdf", body),
        }
    }

    #[tokio::test]
    async fn reupload_replaces_row_and_blob() {
        let f = fixture().await;
        let hod = member(UserRole::Hod, Some("CSE"), None);

        let first = f.timetables.upload(&hod, draft("cse", Some("2022"), b"v1")).await.unwrap();
        let second = f.timetables.upload(&hod, draft("CSE", Some("2022"), b"v2")).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_ne!(first.file_id, second.file_id);
        assert_eq!(f.storage.len(), 1);

        let student = member(UserRole::Student, Some("CSE"), Some("2022")).viewer();
        let download = f.timetables.attachment(&student, second.id).await.unwrap();
        assert_eq!(download.bytes, b"v2");
    }

    #[tokio::test]
    async fn replace_survives_old_blob_delete_failure() {
        let f = fixture().await;
        let hod = member(UserRole::Hod, Some("CSE"), None);
        f.timetables.upload(&hod, draft("CSE", None, b"v1")).await.unwrap();
        f.storage.fail_deletes(true);

        let second = f.timetables.upload(&hod, draft("CSE", None, b"v2")).await.unwrap();
        assert_eq!(f.storage.len(), 2);
        assert_eq!(second.department, "CSE");
    }

    #[tokio::test]
    async fn default_audience_is_the_department_and_batch() {
        let f = fixture().await;
        let hod = member(UserRole::Hod, Some("CSE"), None);
        let timetable = f.timetables.upload(&hod, draft("CSE", Some("2022"), b"v1")).await.unwrap();

        let cse_2022 = member(UserRole::Student, Some("CSE"), Some("2022")).viewer();
        let cse_2023 = member(UserRole::Student, Some("CSE"), Some("2023")).viewer();
        let cse_faculty = member(UserRole::Faculty, Some("CSE"), None).viewer();
        let it_student = member(UserRole::Student, Some("IT"), Some("2022")).viewer();

        assert_eq!(f.timetables.visible(&cse_2022).await.unwrap().len(), 1);
        assert_eq!(f.timetables.visible(&cse_faculty).await.unwrap().len(), 1);
        assert!(f.timetables.visible(&cse_2023).await.unwrap().is_empty());
        assert!(matches!(
            f.timetables.attachment(&it_student, timetable.id).await,
            Err(error::SystemError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn uploaders_need_permission_and_matching_department() {
        let f = fixture().await;

        let faculty = member(UserRole::Faculty, Some("CSE"), None);
        let err = f.timetables.upload(&faculty, draft("CSE", None, b"x")).await.unwrap_err();
        assert!(matches!(err, error::SystemError::Forbidden(_)));

        let mut coordinator = member(UserRole::Faculty, Some("CSE"), None);
        coordinator.can_upload_timetable = true;
        f.timetables.upload(&coordinator, draft("CSE", None, b"x")).await.unwrap();
        let err = f.timetables.upload(&coordinator, draft("IT", None, b"x")).await.unwrap_err();
        assert!(matches!(err, error::SystemError::Forbidden(_)));

        let admin = member(UserRole::Admin, None, None);
        f.timetables.upload(&admin, draft("IT", None, b"x")).await.unwrap();
        let err = f.timetables.upload(&admin, draft("NOPE", None, b"x")).await.unwrap_err();
        assert!(matches!(err, error::SystemError::BadRequest(_)));
    }

    #[tokio::test]
    async fn pins_follow_visibility_and_deletion() {
        let f = fixture().await;
        let hod = member(UserRole::Hod, Some("CSE"), None);
        let timetable = f.timetables.upload(&hod, draft("CSE", None, b"x")).await.unwrap();

        let student = member(UserRole::Student, Some("CSE"), Some("2022")).viewer();
        let outsider = member(UserRole::Student, Some("IT"), Some("2022")).viewer();

        f.timetables.pin(&student, timetable.id).await.unwrap();
        f.timetables.pin(&student, timetable.id).await.unwrap();
        assert_eq!(f.timetables.pinned(&student).await.unwrap().len(), 1);
        assert!(f.timetables.pin(&outsider, timetable.id).await.is_err());

        f.timetables.delete(&hod, timetable.id).await.unwrap();
        assert!(f.timetables.pinned(&student).await.unwrap().is_empty());
        assert_eq!(f.storage.len(), 0);
    }

    #[test]
    fn department_audience_targets_batch_for_students_only() {
        let dept = SubRoleEntity {
            id: Uuid::now_v7(),
            code: "ECE".into(),
            name: "Electronics".into(),
            allowed_roles: vec![UserRole::Student, UserRole::Faculty],
            created_at: chrono::Utc::now(),
        };
        let rules = department_audience(&dept, Some("2021"));
        assert_eq!(rules[0], TargetRule::role(UserRole::Student).with_sub_role("ECE").with_batch("2021"));
        assert_eq!(rules[1], TargetRule::role(UserRole::Faculty).with_sub_role("ECE"));
    }
}
