//! Domain record kinds and their field split

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use stride_core::Collection;
use uuid::Uuid;

/// A domain record kind: names its collection and the two halves of its
/// field split. Metadata stays queryable plaintext; the payload is sealed.
pub trait RecordKind {
    const COLLECTION: Collection;
    type Meta: Serialize + DeserializeOwned + Clone + std::fmt::Debug + Send + Sync;
    type Payload: Serialize + DeserializeOwned + Clone + std::fmt::Debug + Send + Sync;
}

// ── user_settings ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct UserSettings;

/// The one row per account carrying the key-derivation material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsMeta {
    /// Base64 key-derivation salt; immutable outside passphrase rotation.
    pub encryption_salt: String,
    /// Verification token blob.
    pub encryption_check: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsData {
    pub daily_target: u32,
    pub category_balance_bonus: u32,
}

impl Default for SettingsData {
    fn default() -> Self {
        Self {
            daily_target: 50,
            category_balance_bonus: 25,
        }
    }
}

impl RecordKind for UserSettings {
    const COLLECTION: Collection = Collection::UserSettings;
    type Meta = SettingsMeta;
    type Payload = SettingsData;
}

// ── categories ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Category;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryMeta {
    pub order_num: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryData {
    pub name: String,
    pub color: String,
    pub icon: String,
}

impl RecordKind for Category {
    const COLLECTION: Collection = Collection::Categories;
    type Meta = CategoryMeta;
    type Payload = CategoryData;
}

// ── habits ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Habit;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitMeta {
    pub category_id: Uuid,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitData {
    pub name: String,
    /// Effort weight the user picked for this habit.
    pub points: u32,
}

impl RecordKind for Habit {
    const COLLECTION: Collection = Collection::Habits;
    type Meta = HabitMeta;
    type Payload = HabitData;
}

// ── completions ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Completion;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionMeta {
    pub habit_id: Uuid,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionData {
    pub completed: bool,
    pub points: u32,
}

impl RecordKind for Completion {
    const COLLECTION: Collection = Collection::Completions;
    type Meta = CompletionMeta;
    type Payload = CompletionData;
}

// ── goals ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Goal;

/// Goal cadence, yearly down to weekly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    Yearly,
    Quarterly,
    Monthly,
    Weekly,
}

impl GoalType {
    /// The cadence a child of this goal uses, if any.
    pub fn child_type(&self) -> Option<GoalType> {
        match self {
            GoalType::Yearly => Some(GoalType::Quarterly),
            GoalType::Quarterly => Some(GoalType::Monthly),
            GoalType::Monthly => Some(GoalType::Weekly),
            GoalType::Weekly => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GoalType::Yearly => "Yearly Goal",
            GoalType::Quarterly => "Quarterly Milestone",
            GoalType::Monthly => "Monthly Target",
            GoalType::Weekly => "Weekly Task",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Active,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalMeta {
    pub goal_type: GoalType,
    pub parent_id: Option<Uuid>,
    pub linked_habit_id: Option<Uuid>,
    pub target_min: Option<i64>,
    pub target_max: Option<i64>,
    pub status: GoalStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalData {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Manual completion percentage for leaf goals; parents derive theirs.
    #[serde(default)]
    pub progress: Option<u8>,
    #[serde(default)]
    pub intention_when: Option<String>,
    #[serde(default)]
    pub intention_where: Option<String>,
}

impl RecordKind for Goal {
    const COLLECTION: Collection = Collection::Goals;
    type Meta = GoalMeta;
    type Payload = GoalData;
}

// ── reflections ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Reflection;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReflectionMeta {
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReflectionData {
    pub grateful: String,
    pub lessons: String,
}

impl RecordKind for Reflection {
    const COLLECTION: Collection = Collection::Reflections;
    type Meta = ReflectionMeta;
    type Payload = ReflectionData;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_type_hierarchy() {
        assert_eq!(GoalType::Yearly.child_type(), Some(GoalType::Quarterly));
        assert_eq!(GoalType::Quarterly.child_type(), Some(GoalType::Monthly));
        assert_eq!(GoalType::Monthly.child_type(), Some(GoalType::Weekly));
        assert_eq!(GoalType::Weekly.child_type(), None);
    }

    #[test]
    fn test_goal_type_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(GoalType::Quarterly).unwrap(),
            serde_json::json!("quarterly")
        );
        assert_eq!(
            serde_json::to_value(GoalStatus::Active).unwrap(),
            serde_json::json!("active")
        );
    }

    #[test]
    fn test_default_settings() {
        let settings = SettingsData::default();
        assert_eq!(settings.daily_target, 50);
        assert_eq!(settings.category_balance_bonus, 25);
    }

    #[test]
    fn test_goal_data_tolerates_sparse_payloads() {
        // Older sealed payloads may predate optional fields.
        let data: GoalData = serde_json::from_str(r#"{"name": "Run a marathon"}"#).unwrap();
        assert_eq!(data.name, "Run a marathon");
        assert_eq!(data.progress, None);
    }
}
