use serde::{Deserialize, Serialize};
use sqlx::{
    prelude::{FromRow, Type},
    types::Json,
};
use uuid::Uuid;

use crate::modules::{
    audience::{Audience, TargetRule},
    file::schema::FileUsage,
    user::schema::UserRole,
};

/// The four flavours of targeted document. They share one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(type_name = "notice_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Announcement,
    Circular,
    Material,
    Pdf,
}

impl NoticeKind {
    pub fn can_publish(&self, role: UserRole) -> bool {
        match self {
            NoticeKind::Announcement | NoticeKind::Pdf => !role.is_student(),
            NoticeKind::Circular => role.is_hod_or_above() || role == UserRole::Officers,
            NoticeKind::Material => matches!(role, UserRole::Faculty | UserRole::Hod),
        }
    }

    pub fn requires_file(&self) -> bool {
        matches!(self, NoticeKind::Material | NoticeKind::Pdf)
    }

    pub fn file_usage(&self) -> FileUsage {
        match self {
            NoticeKind::Material => FileUsage::DeptDocument,
            _ => FileUsage::Announcement,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NoticeKind::Announcement => "Announcement",
            NoticeKind::Circular => "Circular",
            NoticeKind::Material => "Material",
            NoticeKind::Pdf => "PDF",
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NoticeEntity {
    pub id: Uuid,
    pub kind: NoticeKind,
    pub title: String,
    pub body: Option<String>,
    pub uploaded_by: Uuid,
    pub audience: Json<Vec<TargetRule>>,
    pub individuals: Vec<Uuid>,
    pub file_id: Option<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl NoticeEntity {
    pub fn audience(&self) -> Audience {
        Audience { rules: self.audience.0.clone(), individuals: self.individuals.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publisher_roles_per_kind() {
        assert!(NoticeKind::Announcement.can_publish(UserRole::Officers));
        assert!(!NoticeKind::Announcement.can_publish(UserRole::Student));

        assert!(NoticeKind::Circular.can_publish(UserRole::Hod));
        assert!(NoticeKind::Circular.can_publish(UserRole::Officers));
        assert!(!NoticeKind::Circular.can_publish(UserRole::Faculty));

        assert!(NoticeKind::Material.can_publish(UserRole::Faculty));
        assert!(!NoticeKind::Material.can_publish(UserRole::Admin));

        assert!(NoticeKind::Pdf.can_publish(UserRole::Dean));
        assert!(!NoticeKind::Pdf.can_publish(UserRole::Student));
    }
}
