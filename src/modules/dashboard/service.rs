use log::info;
use serde::Serialize;

use crate::api::error;
use crate::constants::DASHBOARD_SECTION_SIZE;
use crate::modules::{
    achievement::service::AchievementService,
    notice::{
        schema::{NoticeEntity, NoticeKind},
        service::NoticeService,
    },
    timetable::{schema::TimetableEntity, service::TimetableService},
    user::model::UserResponse,
};

#[derive(Serialize)]
pub struct DashboardResponse {
    pub profile: UserResponse,
    pub announcements: Vec<NoticeEntity>,
    pub circulars: Vec<NoticeEntity>,
    pub materials: Vec<NoticeEntity>,
    pub pinned_timetables: Vec<TimetableEntity>,
    /// Only present for users who can review achievements.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_achievements: Option<i64>,
}

#[derive(Clone)]
pub struct DashboardService {
    notices: NoticeService,
    timetables: TimetableService,
    achievements: AchievementService,
}

impl DashboardService {
    pub fn with_dependencies(
        notices: NoticeService,
        timetables: TimetableService,
        achievements: AchievementService,
    ) -> Self {
        info!("DashboardService initialized with dependencies");
        DashboardService { notices, timetables, achievements }
    }

    pub async fn summary(&self, user: UserResponse) -> Result<DashboardResponse, error::SystemError> {
        let viewer = user.viewer();
        let size = DASHBOARD_SECTION_SIZE;

        let (announcements, circulars, materials, pinned_timetables, pending_achievements) = tokio::try_join!(
            self.notices.visible(NoticeKind::Announcement, &viewer, size, 0),
            self.notices.visible(NoticeKind::Circular, &viewer, size, 0),
            self.notices.visible(NoticeKind::Material, &viewer, size, 0),
            self.timetables.pinned(&viewer),
            self.achievements.pending_count(&user),
        )?;

        Ok(DashboardResponse {
            profile: user,
            announcements,
            circulars,
            materials,
            pinned_timetables,
            pending_achievements,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::modules::{
        audience::TargetRule,
        file::{model::UploadConfig, service::FileService},
        notice::model::NoticeDraft,
        sub_role::service::SubRoleService,
        user::schema::UserRole,
    };
    use crate::test::{
        member, MemoryAchievements, MemoryFiles, MemoryNotices, MemoryStorage, MemorySubRoles,
        MemoryTimetables,
    };

    fn services() -> (NoticeService, DashboardService) {
        let files = FileService::new(
            Arc::new(MemoryFiles::default()),
            Arc::new(MemoryStorage::default()),
            UploadConfig::default(),
        );
        let sub_roles = SubRoleService::with_dependencies(Arc::new(MemorySubRoles::default()));
        let notices = NoticeService::with_dependencies(Arc::new(MemoryNotices::default()), files.clone());
        let timetables = TimetableService::with_dependencies(
            Arc::new(MemoryTimetables::default()),
            files.clone(),
            sub_roles.clone(),
        );
        let achievements =
            AchievementService::with_dependencies(Arc::new(MemoryAchievements::default()), files, sub_roles);
        (notices.clone(), DashboardService::with_dependencies(notices, timetables, achievements))
    }

    #[tokio::test]
    async fn sections_are_capped_and_role_aware() {
        let (notices, dashboard) = services();
        let dean = member(UserRole::Dean, None, None);
        for i in 0..7 {
            let draft = NoticeDraft {
                title: format!("Notice {i}"),
                body: None,
                rules: vec![TargetRule::everyone()],
                individuals: vec![],
                attachment: None,
            };
            notices.publish(NoticeKind::Announcement, &dean, draft).await.unwrap();
        }

        let student = member(UserRole::Student, Some("CSE"), Some("2022"));
        let summary = dashboard.summary(student.clone()).await.unwrap();
        assert_eq!(summary.profile.id, student.id);
        assert_eq!(summary.announcements.len(), DASHBOARD_SECTION_SIZE as usize);
        assert!(summary.circulars.is_empty());
        assert!(summary.pending_achievements.is_none());

        let summary = dashboard.summary(dean).await.unwrap();
        assert_eq!(summary.pending_achievements, Some(0));
    }
}
