//! Feature flag domain model and the revision approval state machine.
//!
//! A flag owns an ordered list of revisions; a revision has no existence
//! outside its flag. At most one revision is `Live` at any time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Value type of a flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagType {
    Boolean,
    Json,
    String,
    Number,
}

impl FromStr for FlagType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "boolean" => Ok(FlagType::Boolean),
            "json" => Ok(FlagType::Json),
            "string" => Ok(FlagType::String),
            "number" => Ok(FlagType::Number),
            _ => Err(format!("Unknown flag type: {}", s)),
        }
    }
}

impl std::fmt::Display for FlagType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlagType::Boolean => write!(f, "boolean"),
            FlagType::Json => write!(f, "json"),
            FlagType::String => write!(f, "string"),
            FlagType::Number => write!(f, "number"),
        }
    }
}

/// A targeting condition attached to a revision.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct Rule {
    #[validate(length(min = 1, message = "Rule predicate is required"))]
    pub predicate: String,
    #[validate(length(min = 1, message = "Rule value is required"))]
    pub value: String,
    #[validate(length(min = 1, message = "Rule env is required"))]
    pub env: String,
}

/// Lifecycle status of a revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevisionStatus {
    Draft,
    Live,
}

/// A proposed or active value+rules snapshot for a flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Revision {
    pub id: Uuid,
    pub default_value: String,
    pub rules: Vec<Rule>,
    pub status: RevisionStatus,
    /// Author of the revision.
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Revision {
    /// Creates a new Draft revision authored by `user_id`.
    pub fn new(default_value: String, rules: Vec<Rule>, user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            default_value,
            rules,
            status: RevisionStatus::Draft,
            user_id,
            created_at: Utc::now(),
        }
    }
}

/// A named, typed configuration toggle scoped to an organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FeatureFlag {
    pub id: Uuid,
    pub organization_id: Uuid,
    /// Creator of the flag.
    pub user_id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub flag_type: FlagType,
    pub version: i32,
    pub revisions: Vec<Revision>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl FeatureFlag {
    /// Creates a flag at version 1 with a single seeded Draft revision.
    pub fn new(
        name: String,
        flag_type: FlagType,
        default_value: String,
        rules: Vec<Rule>,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            organization_id,
            user_id,
            name,
            flag_type,
            version: 1,
            revisions: vec![Revision::new(default_value, rules, user_id)],
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// The currently live revision, if any.
    pub fn live_revision(&self) -> Option<&Revision> {
        self.revisions
            .iter()
            .find(|r| r.status == RevisionStatus::Live)
    }

    /// Promotes the revision with id `revision_id` to Live.
    ///
    /// Demotion and promotion happen in a single pass over the list in
    /// index order: a revision that was Live is first demoted, and the
    /// target is promoted only if it is not Live at that point in the
    /// pass. Re-approving the currently live revision therefore leaves it
    /// Live. The version counter increments unconditionally, even when the
    /// target id is not present in the list.
    pub fn approve_revision(&mut self, revision_id: Uuid) {
        for revision in &mut self.revisions {
            if revision.status == RevisionStatus::Live {
                revision.status = RevisionStatus::Draft;
            }
            if revision.id == revision_id && revision.status != RevisionStatus::Live {
                revision.status = RevisionStatus::Live;
            }
        }
        self.version += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flag_with_revisions(count: usize) -> FeatureFlag {
        let user_id = Uuid::new_v4();
        let mut flag = FeatureFlag::new(
            "checkout-redesign".to_string(),
            FlagType::Boolean,
            "false".to_string(),
            vec![],
            Uuid::new_v4(),
            user_id,
        );
        for i in 1..count {
            flag.revisions
                .push(Revision::new(format!("value-{}", i), vec![], user_id));
        }
        flag
    }

    fn live_count(flag: &FeatureFlag) -> usize {
        flag.revisions
            .iter()
            .filter(|r| r.status == RevisionStatus::Live)
            .count()
    }

    #[test]
    fn test_new_flag_seeds_one_draft_revision() {
        let flag = flag_with_revisions(1);
        assert_eq!(flag.version, 1);
        assert_eq!(flag.revisions.len(), 1);
        assert_eq!(flag.revisions[0].status, RevisionStatus::Draft);
        assert!(flag.live_revision().is_none());
    }

    #[test]
    fn test_approve_promotes_target_and_demotes_previous() {
        let mut flag = flag_with_revisions(3);
        let first = flag.revisions[0].id;
        let second = flag.revisions[1].id;

        flag.approve_revision(first);
        assert_eq!(live_count(&flag), 1);
        assert_eq!(flag.live_revision().unwrap().id, first);
        assert_eq!(flag.version, 2);

        flag.approve_revision(second);
        assert_eq!(live_count(&flag), 1);
        assert_eq!(flag.live_revision().unwrap().id, second);
        assert_eq!(flag.revisions[0].status, RevisionStatus::Draft);
        assert_eq!(flag.version, 3);
    }

    #[test]
    fn test_reapprove_live_revision_is_status_idempotent() {
        let mut flag = flag_with_revisions(2);
        let target = flag.revisions[1].id;

        flag.approve_revision(target);
        flag.approve_revision(target);

        // Status unchanged, but the version counter still moves.
        assert_eq!(live_count(&flag), 1);
        assert_eq!(flag.live_revision().unwrap().id, target);
        assert_eq!(flag.version, 3);
    }

    #[test]
    fn test_approve_unknown_id_demotes_but_promotes_nothing() {
        let mut flag = flag_with_revisions(2);
        let target = flag.revisions[0].id;
        flag.approve_revision(target);
        assert_eq!(live_count(&flag), 1);

        flag.approve_revision(Uuid::new_v4());
        assert_eq!(live_count(&flag), 0);
        assert_eq!(flag.version, 3);
    }

    #[test]
    fn test_flag_type_round_trip() {
        for (s, t) in [
            ("boolean", FlagType::Boolean),
            ("json", FlagType::Json),
            ("string", FlagType::String),
            ("number", FlagType::Number),
        ] {
            assert_eq!(FlagType::from_str(s).unwrap(), t);
            assert_eq!(t.to_string(), s);
            assert_eq!(serde_json::to_string(&t).unwrap(), format!("\"{}\"", s));
        }
        assert!(FlagType::from_str("float").is_err());
    }

    #[test]
    fn test_flag_serializes_type_field() {
        let flag = flag_with_revisions(1);
        let json = serde_json::to_value(&flag).unwrap();
        assert_eq!(json["type"], "boolean");
        assert!(json.get("deleted_at").is_none());
    }

    #[test]
    fn test_rule_validation() {
        let rule = Rule {
            predicate: "country == \"BR\"".to_string(),
            value: "true".to_string(),
            env: "production".to_string(),
        };
        assert!(rule.validate().is_ok());

        let empty = Rule {
            predicate: String::new(),
            value: "true".to_string(),
            env: "production".to_string(),
        };
        assert!(empty.validate().is_err());
    }
}
