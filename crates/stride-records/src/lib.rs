//! stride-records: the record codec
//!
//! Every domain record splits into plaintext metadata (the columns the
//! store filters and sorts on) and an encrypted payload holding all
//! user-authored content:
//!
//! ```text
//! collection    metadata (plaintext)                       payload (sealed)
//! ───────────   ────────────────────────────────────────   ──────────────────────────
//! user_settings encryption_salt, encryption_check          daily_target, balance bonus
//! categories    order_num                                  name, color, icon
//! habits        category_id, active                        name, points
//! completions   habit_id, date                             completed, points
//! goals         goal_type, parent_id, linked_habit_id,     name, description, progress,
//!               target_min, target_max, status             intention_when/where
//! reflections   date                                       grateful, lessons
//! ```
//!
//! The payload only ever crosses the envelope cipher under the session
//! key; a blob that fails to authenticate marks that one record corrupt
//! and never aborts the batch it arrived in.

pub mod codec;
pub mod error;
pub mod model;
pub mod tree;

pub use codec::{decode, decode_batch, encode, merge_payload, reseal_merged, Decoded};
pub use error::{CodecError, RecordDecodeError};
pub use model::{
    Category, CategoryData, CategoryMeta, Completion, CompletionData, CompletionMeta, Goal,
    GoalData, GoalMeta, GoalStatus, GoalType, Habit, HabitData, HabitMeta, RecordKind, Reflection,
    ReflectionData, ReflectionMeta, SettingsData, SettingsMeta, UserSettings,
};
pub use tree::GoalArena;
