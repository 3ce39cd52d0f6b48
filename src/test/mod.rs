//! In-memory repositories and blob store for service tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use chrono::Utc;
use sqlx::types::Json;
use uuid::Uuid;

use crate::api::error;
use crate::modules::{
    achievement::{
        model::{NewAchievement, Review},
        repository::AchievementRepository,
        schema::{AchievementEntity, AchievementStatus},
    },
    audience::Viewer,
    drive::{model::NewDriveItem, repository::DriveRepository, schema::DriveItemEntity},
    file::{
        model::NewFile,
        repository::FileRepository,
        schema::FileEntity,
        storage::{generate_key, StorageAdapter},
    },
    notice::{
        model::NewNotice,
        repository::NoticeRepository,
        schema::{NoticeEntity, NoticeKind},
    },
    sub_role::{model::InsertSubRole, repository::SubRoleRepository, schema::SubRoleEntity},
    timetable::{model::TimetableValues, repository::TimetableRepository, schema::TimetableEntity},
    user::{model::UserResponse, schema::UserRole},
    workshop::{model::NewWorkshop, repository::WorkshopRepository, schema::WorkshopEntity},
};
use crate::utils::UploadedFile;

pub fn upload(name: &str, mime_type: &str, bytes: &[u8]) -> UploadedFile {
    UploadedFile { filename: name.into(), mime_type: mime_type.into(), bytes: bytes.to_vec() }
}

/// A fresh account with no extra permissions.
pub fn member(role: UserRole, sub_role: Option<&str>, batch: Option<&str>) -> UserResponse {
    UserResponse {
        id: Uuid::now_v7(),
        username: format!("{}-{}", role.as_str().to_lowercase(), Uuid::now_v7()),
        role,
        sub_role: sub_role.map(str::to_string),
        batch: batch.map(str::to_string),
        can_upload_timetable: false,
        can_approve_achievements: false,
    }
}

#[derive(Default)]
pub struct MemoryStorage {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    fail_deletes: AtomicBool,
}

impl MemoryStorage {
    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl StorageAdapter for MemoryStorage {
    async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, error::SystemError> {
        let key = generate_key(original_name);
        self.blobs.lock().unwrap().insert(key.clone(), bytes.to_vec());
        Ok(key)
    }

    async fn read(&self, key: &str) -> Result<Vec<u8>, error::SystemError> {
        self.blobs
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| error::SystemError::not_found("Stored file is missing"))
    }

    async fn copy(&self, key: &str) -> Result<String, error::SystemError> {
        let bytes = self.read(key).await?;
        self.save(key, &bytes).await
    }

    async fn delete(&self, key: &str) -> Result<(), error::SystemError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(std::io::Error::other("blob store unavailable").into());
        }
        self.blobs
            .lock()
            .unwrap()
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| error::SystemError::not_found("Stored file is missing"))
    }
}

#[derive(Default)]
pub struct MemoryFiles {
    rows: Mutex<HashMap<Uuid, FileEntity>>,
}

#[async_trait::async_trait]
impl FileRepository for MemoryFiles {
    async fn create(&self, file: &NewFile) -> Result<FileEntity, error::SystemError> {
        let entity = FileEntity {
            id: Uuid::now_v7(),
            storage_key: file.storage_key.clone(),
            original_name: file.original_name.clone(),
            mime_type: file.mime_type.clone(),
            size: file.size,
            uploaded_by: file.uploaded_by,
            usage: file.usage,
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn find_by_id(&self, file_id: &Uuid) -> Result<Option<FileEntity>, error::SystemError> {
        Ok(self.rows.lock().unwrap().get(file_id).cloned())
    }

    async fn delete(&self, file_id: &Uuid) -> Result<(), error::SystemError> {
        self.rows.lock().unwrap().remove(file_id);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemorySubRoles {
    rows: Mutex<Vec<SubRoleEntity>>,
    held: Mutex<Vec<Uuid>>,
}

impl MemorySubRoles {
    /// Marks a sub-role as assigned to some user, like the users.sub_role_id foreign key.
    pub fn hold(&self, id: Uuid) {
        self.held.lock().unwrap().push(id);
    }
}

#[async_trait::async_trait]
impl SubRoleRepository for MemorySubRoles {
    async fn find_by_code(&self, code: &str) -> Result<Option<SubRoleEntity>, error::SystemError> {
        Ok(self.rows.lock().unwrap().iter().find(|s| s.code == code).cloned())
    }

    async fn list(&self) -> Result<Vec<SubRoleEntity>, error::SystemError> {
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn create(&self, sub_role: &InsertSubRole) -> Result<SubRoleEntity, error::SystemError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|s| s.code == sub_role.code) {
            return Err(error::SystemError::Conflict(None));
        }
        let entity = SubRoleEntity {
            id: Uuid::now_v7(),
            code: sub_role.code.clone(),
            name: sub_role.name.clone(),
            allowed_roles: sub_role.allowed_roles.clone(),
            created_at: Utc::now(),
        };
        rows.push(entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError> {
        if self.held.lock().unwrap().contains(id) {
            return Err(error::SystemError::Conflict(Some(error::DbErrorMeta {
                code: Some("23503".into()),
                constraint: Some("users_sub_role_id_fkey".into()),
                message: "sub-role is still referenced".into(),
            })));
        }
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|s| &s.id != id);
        Ok(rows.len() != before)
    }
}

#[derive(Default)]
pub struct MemoryDriveItems {
    rows: Mutex<Vec<DriveItemEntity>>,
}

impl MemoryDriveItems {
    fn update(
        &self,
        id: &Uuid,
        change: impl FnOnce(&mut DriveItemEntity),
    ) -> Result<DriveItemEntity, error::SystemError> {
        let mut rows = self.rows.lock().unwrap();
        let item = rows
            .iter_mut()
            .find(|i| &i.id == id)
            .ok_or_else(|| error::SystemError::not_found("Item not found"))?;
        change(item);
        item.updated_at = Utc::now();
        Ok(item.clone())
    }
}

#[async_trait::async_trait]
impl DriveRepository for MemoryDriveItems {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<DriveItemEntity>, error::SystemError> {
        Ok(self.rows.lock().unwrap().iter().find(|i| &i.id == id).cloned())
    }

    async fn find_sibling(
        &self,
        owner_id: &Uuid,
        parent_id: Option<Uuid>,
        name: &str,
    ) -> Result<Option<DriveItemEntity>, error::SystemError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|i| &i.owner_id == owner_id && i.parent_id == parent_id && i.name == name)
            .cloned())
    }

    async fn list_children(
        &self,
        owner_id: &Uuid,
        parent_id: Option<Uuid>,
    ) -> Result<Vec<DriveItemEntity>, error::SystemError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|i| &i.owner_id == owner_id && i.parent_id == parent_id)
            .cloned()
            .collect())
    }

    async fn create(&self, item: &NewDriveItem) -> Result<DriveItemEntity, error::SystemError> {
        let now = Utc::now();
        let entity = DriveItemEntity {
            id: Uuid::now_v7(),
            owner_id: item.owner_id,
            parent_id: item.parent_id,
            name: item.name.clone(),
            kind: item.kind,
            file_id: item.file_id,
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push(entity.clone());
        Ok(entity)
    }

    async fn rename(&self, id: &Uuid, name: &str) -> Result<DriveItemEntity, error::SystemError> {
        self.update(id, |item| item.name = name.to_string())
    }

    async fn set_parent(
        &self,
        id: &Uuid,
        parent_id: Option<Uuid>,
    ) -> Result<DriveItemEntity, error::SystemError> {
        self.update(id, |item| item.parent_id = parent_id)
    }

    async fn delete(&self, id: &Uuid) -> Result<(), error::SystemError> {
        self.rows.lock().unwrap().retain(|i| &i.id != id);
        Ok(())
    }

    async fn search(
        &self,
        owner_id: &Uuid,
        query: &str,
        limit: i64,
    ) -> Result<Vec<DriveItemEntity>, error::SystemError> {
        let needle = query.to_lowercase();
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|i| &i.owner_id == owner_id && i.name.to_lowercase().contains(&needle))
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryNotices {
    rows: Mutex<Vec<NoticeEntity>>,
}

#[async_trait::async_trait]
impl NoticeRepository for MemoryNotices {
    async fn create(&self, notice: &NewNotice) -> Result<NoticeEntity, error::SystemError> {
        let entity = NoticeEntity {
            id: Uuid::now_v7(),
            kind: notice.kind,
            title: notice.title.clone(),
            body: notice.body.clone(),
            uploaded_by: notice.uploaded_by,
            audience: Json(notice.audience.rules.clone()),
            individuals: notice.audience.individuals.clone(),
            file_id: notice.file_id,
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().push(entity.clone());
        Ok(entity)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<NoticeEntity>, error::SystemError> {
        Ok(self.rows.lock().unwrap().iter().find(|n| &n.id == id).cloned())
    }

    async fn find_visible(
        &self,
        kind: NoticeKind,
        viewer: &Viewer,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<NoticeEntity>, error::SystemError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|n| n.kind == kind && n.audience().is_visible_to(viewer, n.uploaded_by))
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn find_sent(
        &self,
        kind: NoticeKind,
        uploaded_by: &Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<NoticeEntity>, error::SystemError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|n| n.kind == kind && &n.uploaded_by == uploaded_by)
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|n| &n.id != id);
        Ok(rows.len() != before)
    }
}

#[derive(Default)]
pub struct MemoryTimetables {
    rows: Mutex<Vec<TimetableEntity>>,
    pins: Mutex<Vec<(Uuid, Uuid)>>,
}

fn timetable_from(id: Uuid, values: &TimetableValues) -> TimetableEntity {
    let now = Utc::now();
    TimetableEntity {
        id,
        title: values.title.clone(),
        department: values.department.clone(),
        batch: values.batch.clone(),
        file_id: values.file_id,
        uploaded_by: values.uploaded_by,
        audience: Json(values.audience.rules.clone()),
        individuals: values.audience.individuals.clone(),
        created_at: now,
        updated_at: now,
    }
}

#[async_trait::async_trait]
impl TimetableRepository for MemoryTimetables {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<TimetableEntity>, error::SystemError> {
        Ok(self.rows.lock().unwrap().iter().find(|t| &t.id == id).cloned())
    }

    async fn find_by_target(
        &self,
        department: &str,
        batch: Option<&str>,
    ) -> Result<Option<TimetableEntity>, error::SystemError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.department == department && t.batch.as_deref() == batch)
            .cloned())
    }

    async fn create(&self, values: &TimetableValues) -> Result<TimetableEntity, error::SystemError> {
        let entity = timetable_from(Uuid::now_v7(), values);
        self.rows.lock().unwrap().push(entity.clone());
        Ok(entity)
    }

    async fn replace(
        &self,
        id: &Uuid,
        values: &TimetableValues,
    ) -> Result<TimetableEntity, error::SystemError> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| error::SystemError::not_found("Timetable not found"))?;
        let created_at = row.created_at;
        *row = timetable_from(*id, values);
        row.created_at = created_at;
        Ok(row.clone())
    }

    async fn find_visible(&self, viewer: &Viewer) -> Result<Vec<TimetableEntity>, error::SystemError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.audience().is_visible_to(viewer, t.uploaded_by))
            .cloned()
            .collect())
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError> {
        self.pins.lock().unwrap().retain(|(_, t)| t != id);
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|t| &t.id != id);
        Ok(rows.len() != before)
    }

    async fn pin(&self, user_id: &Uuid, timetable_id: &Uuid) -> Result<(), error::SystemError> {
        let mut pins = self.pins.lock().unwrap();
        if !pins.contains(&(*user_id, *timetable_id)) {
            pins.push((*user_id, *timetable_id));
        }
        Ok(())
    }

    async fn unpin(&self, user_id: &Uuid, timetable_id: &Uuid) -> Result<bool, error::SystemError> {
        let mut pins = self.pins.lock().unwrap();
        let before = pins.len();
        pins.retain(|pin| pin != &(*user_id, *timetable_id));
        Ok(pins.len() != before)
    }

    async fn find_pinned(&self, user_id: &Uuid) -> Result<Vec<TimetableEntity>, error::SystemError> {
        let pinned: Vec<Uuid> = self
            .pins
            .lock()
            .unwrap()
            .iter()
            .filter(|(user, _)| user == user_id)
            .map(|(_, timetable)| *timetable)
            .collect();
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|t| pinned.contains(&t.id))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryAchievements {
    rows: Mutex<Vec<AchievementEntity>>,
}

#[async_trait::async_trait]
impl AchievementRepository for MemoryAchievements {
    async fn create(&self, achievement: &NewAchievement) -> Result<AchievementEntity, error::SystemError> {
        let entity = AchievementEntity {
            id: Uuid::now_v7(),
            student_id: achievement.student_id,
            title: achievement.title.clone(),
            description: achievement.description.clone(),
            category: achievement.category.clone(),
            department: achievement.department.clone(),
            file_id: achievement.file_id,
            status: AchievementStatus::Pending,
            reviewed_by: None,
            reviewed_at: None,
            remarks: None,
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().push(entity.clone());
        Ok(entity)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<AchievementEntity>, error::SystemError> {
        Ok(self.rows.lock().unwrap().iter().find(|a| &a.id == id).cloned())
    }

    async fn find_by_student(&self, student_id: &Uuid) -> Result<Vec<AchievementEntity>, error::SystemError> {
        Ok(self.rows.lock().unwrap().iter().filter(|a| &a.student_id == student_id).cloned().collect())
    }

    async fn list(
        &self,
        department: Option<&str>,
        status: Option<AchievementStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AchievementEntity>, error::SystemError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|a| department.map_or(true, |d| a.department == d))
            .filter(|a| status.map_or(true, |s| a.status == s))
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn review(
        &self,
        id: &Uuid,
        review: &Review,
    ) -> Result<Option<AchievementEntity>, error::SystemError> {
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows.iter_mut().find(|a| &a.id == id && a.status == AchievementStatus::Pending)
        else {
            return Ok(None);
        };
        row.status = review.status;
        row.reviewed_by = Some(review.reviewed_by);
        row.reviewed_at = Some(Utc::now());
        row.remarks = review.remarks.clone();
        Ok(Some(row.clone()))
    }

    async fn count_pending(&self, department: Option<&str>) -> Result<i64, error::SystemError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.status == AchievementStatus::Pending)
            .filter(|a| department.map_or(true, |d| a.department == d))
            .count() as i64)
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|a| &a.id != id);
        Ok(rows.len() != before)
    }
}

#[derive(Default)]
pub struct MemoryWorkshops {
    rows: Mutex<Vec<WorkshopEntity>>,
}

#[async_trait::async_trait]
impl WorkshopRepository for MemoryWorkshops {
    async fn create(&self, workshop: &NewWorkshop) -> Result<WorkshopEntity, error::SystemError> {
        let entity = WorkshopEntity {
            id: Uuid::now_v7(),
            title: workshop.title.clone(),
            description: workshop.description.clone(),
            department: workshop.department.clone(),
            venue: workshop.venue.clone(),
            held_on: workshop.held_on,
            organized_by: workshop.organized_by,
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().push(entity.clone());
        Ok(entity)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<WorkshopEntity>, error::SystemError> {
        Ok(self.rows.lock().unwrap().iter().find(|w| &w.id == id).cloned())
    }

    async fn list(&self, department: Option<&str>) -> Result<Vec<WorkshopEntity>, error::SystemError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|w| department.map_or(true, |d| w.department == d))
            .cloned()
            .collect())
    }

    async fn find_by_organizer(&self, organizer: &Uuid) -> Result<Vec<WorkshopEntity>, error::SystemError> {
        Ok(self.rows.lock().unwrap().iter().filter(|w| &w.organized_by == organizer).cloned().collect())
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|w| &w.id != id);
        Ok(rows.len() != before)
    }
}
