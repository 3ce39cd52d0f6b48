use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{api::error, modules::user::schema::UserRole};

/// Role half of a targeting rule. `All` opens the document to everyone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetRole {
    All,
    #[serde(untagged)]
    Role(UserRole),
}

/// A `(role, sub_role?, batch?)` tuple. Missing sub-role or batch means "every".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRule {
    pub role: TargetRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch: Option<String>,
}

fn normalize_part(value: Option<String>, uppercase: bool) -> Option<String> {
    let value = value?.trim().to_string();
    if value.is_empty() || value.eq_ignore_ascii_case("all") {
        return None;
    }
    Some(if uppercase { value.to_uppercase() } else { value })
}

impl TargetRule {
    pub fn everyone() -> Self {
        TargetRule { role: TargetRole::All, sub_role: None, batch: None }
    }

    pub fn role(role: UserRole) -> Self {
        TargetRule { role: TargetRole::Role(role), sub_role: None, batch: None }
    }

    pub fn with_sub_role(mut self, code: impl Into<String>) -> Self {
        self.sub_role = Some(code.into());
        self
    }

    pub fn with_batch(mut self, batch: impl Into<String>) -> Self {
        self.batch = Some(batch.into());
        self
    }

    /// Folds the "All"/blank spellings into `None` and upper-cases department codes.
    pub fn normalized(self) -> Self {
        TargetRule {
            role: self.role,
            sub_role: normalize_part(self.sub_role, true),
            batch: normalize_part(self.batch, false),
        }
    }

    pub fn matches(&self, viewer: &Viewer) -> bool {
        let role = match self.role {
            TargetRole::All => return true,
            TargetRole::Role(role) => role,
        };
        if role != viewer.role {
            return false;
        }

        let sub_role_ok = match &self.sub_role {
            None => true,
            Some(code) => viewer.sub_role.as_deref() == Some(code.as_str()),
        };

        let batch_ok = match (&self.batch, viewer.role.is_student()) {
            (Some(batch), true) => viewer.batch.as_deref() == Some(batch.as_str()),
            _ => true,
        };

        sub_role_ok && batch_ok
    }
}

/// The identity a visibility decision is made for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewer {
    pub id: Uuid,
    pub role: UserRole,
    pub sub_role: Option<String>,
    pub batch: Option<String>,
}

/// Targeting attached to a document: rule list plus an explicit allowlist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Audience {
    #[serde(default)]
    pub rules: Vec<TargetRule>,
    #[serde(default)]
    pub individuals: Vec<Uuid>,
}

impl Audience {
    pub fn new(rules: Vec<TargetRule>, individuals: Vec<Uuid>) -> Result<Self, error::SystemError> {
        if rules.is_empty() && individuals.is_empty() {
            return Err(error::SystemError::bad_request(
                "At least one audience rule or recipient is required",
            ));
        }

        let mut normalized: Vec<TargetRule> = Vec::with_capacity(rules.len());
        for rule in rules.into_iter().map(TargetRule::normalized) {
            if !normalized.contains(&rule) {
                normalized.push(rule);
            }
        }

        let mut individuals = individuals;
        individuals.sort();
        individuals.dedup();

        Ok(Audience { rules: normalized, individuals })
    }

    pub fn is_visible_to(&self, viewer: &Viewer, uploaded_by: Uuid) -> bool {
        uploaded_by == viewer.id
            || self.individuals.contains(&viewer.id)
            || self.rules.iter().any(|rule| rule.matches(viewer))
    }
}
