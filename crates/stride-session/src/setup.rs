//! Account encryption setup

use secrecy::{ExposeSecret, SecretString};
use stride_core::{Collection, StrideConfig};
use stride_crypto::{create_check, generate_salt, validate_passphrase, RecoveryBundle};
use stride_records::{
    encode, Category, CategoryData, CategoryMeta, SettingsData, SettingsMeta, UserSettings,
};
use stride_store::{Filter, RecordStore};

use crate::error::SessionError;
use crate::session::{derive, Session};

/// Categories seeded for every new account: (name, color, icon).
pub const DEFAULT_CATEGORIES: [(&str, &str, &str); 5] = [
    ("Health", "#10B981", "❤️"),
    ("Relationships", "#F59E0B", "👥"),
    ("Professional", "#3B82F6", "💼"),
    ("Wealth", "#8B5CF6", "💰"),
    ("Personal", "#EC4899", "⭐"),
];

/// What setup hands back: the live session and the recovery bundle to
/// offer for export. The bundle is built exactly once, here.
#[derive(Debug)]
pub struct SetupOutcome {
    pub session: Session,
    pub recovery: RecoveryBundle,
}

/// First-run setup: derive a key from a fresh salt, store the
/// verification token and default records, return the recovery bundle.
///
/// The passphrase must pass policy and match its confirmation before any
/// key material is generated; neither failure reaches the store.
pub async fn setup<S: RecordStore>(
    store: &S,
    config: &StrideConfig,
    account_id: &str,
    passphrase: &SecretString,
    confirm: &SecretString,
) -> Result<SetupOutcome, SessionError> {
    let policy = validate_passphrase(passphrase.expose_secret());
    if !policy.is_valid() {
        return Err(SessionError::Policy {
            missing: policy.missing,
        });
    }
    if passphrase.expose_secret() != confirm.expose_secret() {
        return Err(SessionError::Mismatch);
    }

    let existing = store
        .select(Collection::UserSettings, account_id, &Filter::new())
        .await?;
    if !existing.is_empty() {
        return Err(SessionError::AlreadySetUp);
    }

    let salt = generate_salt();
    let key = derive(passphrase, &salt, config.crypto.pbkdf2_iterations).await?;
    let encryption_check = create_check(&key)?;

    let settings_meta = SettingsMeta {
        encryption_salt: salt.clone(),
        encryption_check: encryption_check.clone(),
    };
    let settings_row = encode::<UserSettings>(
        account_id,
        &settings_meta,
        &SettingsData::default(),
        &key,
    )?;
    store.insert(Collection::UserSettings, settings_row).await?;

    for (i, (name, color, icon)) in DEFAULT_CATEGORIES.iter().enumerate() {
        let row = encode::<Category>(
            account_id,
            &CategoryMeta {
                order_num: i as u32 + 1,
            },
            &CategoryData {
                name: (*name).into(),
                color: (*color).into(),
                icon: (*icon).into(),
            },
            &key,
        )?;
        store.insert(Collection::Categories, row).await?;
    }

    let recovery = RecoveryBundle::build(account_id, &salt, &encryption_check);
    tracing::info!(account = account_id, "encryption setup complete");

    Ok(SetupOutcome {
        session: Session::new(account_id, key),
        recovery,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use stride_crypto::Requirement;
    use stride_store::MemoryStore;

    fn test_config() -> StrideConfig {
        let mut config = StrideConfig::default();
        config.crypto.pbkdf2_iterations = 1_000;
        config
    }

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    #[tokio::test]
    async fn test_setup_rejects_weak_passphrase() {
        let store = MemoryStore::new();
        let result = setup(
            &store,
            &test_config(),
            "u1",
            &secret("weak"),
            &secret("weak"),
        )
        .await;

        match result {
            Err(SessionError::Policy { missing }) => {
                assert!(missing.contains(&Requirement::MinLength));
            }
            other => panic!("expected Policy error, got {other:?}"),
        }
        assert!(store.is_empty(), "policy failures never reach the store");
    }

    #[tokio::test]
    async fn test_setup_rejects_mismatched_confirmation() {
        let store = MemoryStore::new();
        let result = setup(
            &store,
            &test_config(),
            "u1",
            &secret("CorrectHorse12!"),
            &secret("DifferentHorse12!"),
        )
        .await;

        assert!(matches!(result, Err(SessionError::Mismatch)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_setup_seeds_settings_and_categories() {
        let store = MemoryStore::new();
        let outcome = setup(
            &store,
            &test_config(),
            "u1",
            &secret("CorrectHorse12!"),
            &secret("CorrectHorse12!"),
        )
        .await
        .unwrap();

        let settings = store
            .select(Collection::UserSettings, "u1", &Filter::new())
            .await
            .unwrap();
        assert_eq!(settings.len(), 1);

        let categories = store
            .select(Collection::Categories, "u1", &Filter::new())
            .await
            .unwrap();
        assert_eq!(categories.len(), DEFAULT_CATEGORIES.len());

        assert_eq!(outcome.recovery.user_id, "u1");
        assert_eq!(outcome.session.account_id(), "u1");
    }

    #[tokio::test]
    async fn test_setup_twice_is_rejected() {
        let store = MemoryStore::new();
        let config = test_config();
        let pass = secret("CorrectHorse12!");

        setup(&store, &config, "u1", &pass, &pass).await.unwrap();
        let result = setup(&store, &config, "u1", &pass, &pass).await;

        assert!(matches!(result, Err(SessionError::AlreadySetUp)));
    }
}
