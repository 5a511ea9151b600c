//! stride: privacy-first habit and goal tracking CLI
//!
//! Key-lifecycle commands:
//!   setup                - create the encryption passphrase for an account
//!   unlock               - check a passphrase (and warm the device cache)
//!   status               - show encryption and device-cache state
//!   rotate               - change the passphrase, re-encrypting all records
//!   recovery export      - write the recovery file for safekeeping
//!   recovery restore     - re-establish access from a recovery file
//!   device forget        - drop cached credentials from this device
//!
//! Data commands (all records encrypted at rest):
//!   habit add/list/done, goal add/list, reflect

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use secrecy::SecretString;
use std::path::PathBuf;

use stride_core::config::{config_dir, data_dir};
use stride_core::StrideConfig;
use stride_crypto::{passphrase_strength, validate_passphrase, RecoveryBundle};
use stride_device::{DeviceCache, FileKv};
use stride_records::{
    Category, Completion, CompletionData, CompletionMeta, Goal, GoalArena, GoalData, GoalMeta,
    GoalStatus, GoalType, Habit, HabitData, HabitMeta, Reflection, ReflectionData, ReflectionMeta,
};
use stride_session::{repo, rotate_passphrase, setup, unlock, unlock_from_device, Session, SessionError};
use stride_store::{Filter, JsonFileStore};

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "stride",
    version,
    about = "Privacy-first habit and goal tracker",
    long_about = "stride: habit/goal tracking with all user content encrypted on this device \
                  before it reaches storage"
)]
struct Cli {
    /// Path to stride.toml configuration file
    #[arg(long, short = 'c', env = "STRIDE_CONFIG")]
    config: Option<PathBuf>,

    /// Account identifier
    #[arg(long, env = "STRIDE_ACCOUNT", default_value = "local")]
    account: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the encryption passphrase and seed default records
    Setup {
        /// Remember the passphrase on this device (personal devices only)
        #[arg(long)]
        remember: bool,
        /// Directory to write the recovery file into (default: data dir)
        #[arg(long)]
        recovery_dir: Option<PathBuf>,
    },

    /// Verify the passphrase and optionally remember it on this device
    Unlock {
        /// Remember the passphrase on this device (personal devices only)
        #[arg(long)]
        remember: bool,
    },

    /// Show encryption and device-cache status
    Status,

    /// Change the passphrase, re-encrypting every record
    Rotate,

    /// Recovery file management
    Recovery {
        #[command(subcommand)]
        action: RecoveryAction,
    },

    /// Device credential cache management
    Device {
        #[command(subcommand)]
        action: DeviceAction,
    },

    /// Habit management
    Habit {
        #[command(subcommand)]
        action: HabitAction,
    },

    /// Goal management
    Goal {
        #[command(subcommand)]
        action: GoalAction,
    },

    /// Record today's reflection
    Reflect {
        /// What you are grateful for
        grateful: String,
        /// Lessons from the day
        lessons: String,
    },
}

#[derive(Subcommand, Debug)]
enum RecoveryAction {
    /// Write the recovery file (salt + verification token)
    Export {
        /// Directory to write into (default: data dir)
        dir: Option<PathBuf>,
    },
    /// Restore account access from a recovery file
    Restore {
        /// Path to a previously exported recovery file
        file: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum DeviceAction {
    /// Drop cached credentials from this device
    Forget,
    /// Show whether this device remembers credentials
    Status,
}

#[derive(Subcommand, Debug)]
enum HabitAction {
    /// Add a habit under a category
    Add {
        name: String,
        /// Effort points (5 easy, 10 medium, 20 hard)
        #[arg(long, default_value_t = 10)]
        points: u32,
        /// Category name (default: first category)
        #[arg(long)]
        category: Option<String>,
    },
    /// List active habits
    List,
    /// Mark a habit done for today
    Done { name: String },
}

#[derive(Subcommand, Debug)]
enum GoalAction {
    /// Add a goal
    Add {
        name: String,
        /// yearly, quarterly, monthly, or weekly
        #[arg(long, default_value = "yearly")]
        cadence: String,
        /// Parent goal name, for sub-goals
        #[arg(long)]
        parent: Option<String>,
    },
    /// Show the goal tree with derived progress
    List,
}

// ── entry point ────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let store = JsonFileStore::new(
        config
            .store
            .data_file
            .clone()
            .unwrap_or_else(|| data_dir().join("records.json")),
    );
    let cache = DeviceCache::new(FileKv::new(
        config
            .device
            .auth_file
            .clone()
            .unwrap_or_else(|| config_dir().join("device_auth.json")),
    ));
    let account = cli.account.as_str();

    match cli.command {
        Commands::Setup {
            remember,
            recovery_dir,
        } => cmd_setup(&store, &config, &cache, account, remember, recovery_dir).await,
        Commands::Unlock { remember } => {
            cmd_unlock(&store, &config, &cache, account, remember).await
        }
        Commands::Status => cmd_status(&store, &config, &cache, account).await,
        Commands::Rotate => cmd_rotate(&store, &config, &cache, account).await,
        Commands::Recovery { action } => match action {
            RecoveryAction::Export { dir } => cmd_recovery_export(&store, account, dir).await,
            RecoveryAction::Restore { file } => {
                cmd_recovery_restore(&store, &config, &file).await
            }
        },
        Commands::Device { action } => match action {
            DeviceAction::Forget => {
                cache.clear();
                println!("Device credentials cleared.");
                Ok(())
            }
            DeviceAction::Status => {
                match cache.stored_at() {
                    Some(at) if cache.exists(account) => {
                        println!("This device remembers credentials for '{account}' (stored {at}).");
                    }
                    Some(_) => println!("This device holds credentials for another account."),
                    None => println!("No credentials remembered on this device."),
                }
                Ok(())
            }
        },
        Commands::Habit { action } => {
            let session = obtain_session(&store, &config, &cache, account).await?;
            match action {
                HabitAction::Add {
                    name,
                    points,
                    category,
                } => cmd_habit_add(&store, &session, name, points, category).await,
                HabitAction::List => cmd_habit_list(&store, &session).await,
                HabitAction::Done { name } => cmd_habit_done(&store, &session, &name).await,
            }
        }
        Commands::Goal { action } => {
            let session = obtain_session(&store, &config, &cache, account).await?;
            match action {
                GoalAction::Add {
                    name,
                    cadence,
                    parent,
                } => cmd_goal_add(&store, &session, name, &cadence, parent).await,
                GoalAction::List => cmd_goal_list(&store, &session).await,
            }
        }
        Commands::Reflect { grateful, lessons } => {
            let session = obtain_session(&store, &config, &cache, account).await?;
            repo::insert::<Reflection, _>(
                &store,
                &session,
                &ReflectionMeta {
                    date: chrono::Local::now().date_naive(),
                },
                &ReflectionData { grateful, lessons },
            )
            .await?;
            println!("Reflection saved.");
            Ok(())
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<StrideConfig> {
    let path = path
        .map(PathBuf::from)
        .unwrap_or_else(|| config_dir().join("stride.toml"));

    if !path.exists() {
        return Ok(StrideConfig::default());
    }
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("reading config: {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("parsing config: {}", path.display()))
}

// ── passphrase entry ───────────────────────────────────────────────────────────

fn prompt_passphrase(prompt: &str) -> Result<SecretString> {
    let passphrase = rpassword::prompt_password(prompt).context("reading passphrase")?;
    Ok(SecretString::from(passphrase))
}

/// Prompt for a new passphrase with confirmation, showing the policy
/// checklist on rejection. Loops until the input passes or the user
/// aborts with an empty entry.
fn prompt_new_passphrase() -> Result<(SecretString, SecretString)> {
    use secrecy::ExposeSecret;

    loop {
        let passphrase = prompt_passphrase("New passphrase (empty to abort): ")?;
        if passphrase.expose_secret().is_empty() {
            bail!("aborted");
        }

        let check = validate_passphrase(passphrase.expose_secret());
        if !check.is_valid() {
            eprintln!("Passphrase does not meet the requirements:");
            for missing in &check.missing {
                eprintln!("  ✗ {missing}");
            }
            continue;
        }
        eprintln!(
            "Strength: {}/100",
            passphrase_strength(passphrase.expose_secret())
        );

        let confirm = prompt_passphrase("Confirm passphrase: ")?;
        if passphrase.expose_secret() != confirm.expose_secret() {
            eprintln!("Passphrases do not match; try again.");
            continue;
        }
        return Ok((passphrase, confirm));
    }
}

/// Unlock via the device cache, falling back to (up to three) prompts.
async fn obtain_session(
    store: &JsonFileStore,
    config: &StrideConfig,
    cache: &DeviceCache<FileKv>,
    account: &str,
) -> Result<Session> {
    if let Some(session) = unlock_from_device(store, config, cache, account).await? {
        return Ok(session);
    }

    for _ in 0..3 {
        let passphrase = prompt_passphrase("Passphrase: ")?;
        match unlock(store, config, account, &passphrase).await {
            Ok(session) => return Ok(session),
            Err(SessionError::WrongPassphrase) => {
                eprintln!("Incorrect passphrase. Please try again.");
            }
            Err(e) => return Err(e.into()),
        }
    }
    bail!("too many failed attempts");
}

// ── key-lifecycle commands ─────────────────────────────────────────────────────

async fn cmd_setup(
    store: &JsonFileStore,
    config: &StrideConfig,
    cache: &DeviceCache<FileKv>,
    account: &str,
    remember: bool,
    recovery_dir: Option<PathBuf>,
) -> Result<()> {
    println!("This passphrase encrypts all your data. It is separate from any account");
    println!("password, and without it (or your recovery file) the data is unreadable.");

    let (passphrase, confirm) = prompt_new_passphrase()?;
    let outcome = setup(store, config, account, &passphrase, &confirm).await?;

    let dir = recovery_dir.unwrap_or_else(data_dir);
    std::fs::create_dir_all(&dir)?;
    let path = outcome.recovery.write_to(&dir)?;
    println!("Recovery file written to {}.", path.display());
    println!("Store it somewhere safe. Without it and your passphrase, lost data stays lost.");

    if remember {
        println!("Remembering the passphrase on this device. This is reversible obfuscation,");
        println!("not encryption: only do this on a personal, trusted device.");
        cache.store(account, &passphrase);
    }

    println!("Setup complete.");
    Ok(())
}

async fn cmd_unlock(
    store: &JsonFileStore,
    config: &StrideConfig,
    cache: &DeviceCache<FileKv>,
    account: &str,
    remember: bool,
) -> Result<()> {
    let passphrase = prompt_passphrase("Passphrase: ")?;
    match unlock(store, config, account, &passphrase).await {
        Ok(_) => {
            println!("Passphrase verified.");
            if remember {
                println!("Remembering the passphrase on this device (obfuscated, not encrypted).");
                cache.store(account, &passphrase);
            }
            Ok(())
        }
        Err(SessionError::WrongPassphrase) => bail!("incorrect passphrase"),
        Err(e) => Err(e.into()),
    }
}

async fn cmd_status(
    store: &JsonFileStore,
    config: &StrideConfig,
    cache: &DeviceCache<FileKv>,
    account: &str,
) -> Result<()> {
    use stride_core::Collection;
    use stride_store::RecordStore;

    let settings = store
        .select(Collection::UserSettings, account, &Filter::new())
        .await?;
    if settings.is_empty() {
        println!("Account '{account}': not set up (run `stride setup`).");
        return Ok(());
    }
    println!("Account '{account}': encryption configured.");
    println!("  KDF iterations: {}", config.crypto.pbkdf2_iterations);

    for collection in [
        Collection::Categories,
        Collection::Habits,
        Collection::Completions,
        Collection::Goals,
        Collection::Reflections,
    ] {
        let rows = store.select(collection, account, &Filter::new()).await?;
        println!("  {collection}: {} record(s)", rows.len());
    }

    if cache.exists(account) {
        println!("  Device cache: passphrase remembered on this device.");
    } else {
        println!("  Device cache: not remembered.");
    }
    Ok(())
}

async fn cmd_rotate(
    store: &JsonFileStore,
    config: &StrideConfig,
    cache: &DeviceCache<FileKv>,
    account: &str,
) -> Result<()> {
    let session = obtain_session(store, config, cache, account).await?;

    println!("Choose a new passphrase. Every record will be re-encrypted.");
    let (passphrase, confirm) = prompt_new_passphrase()?;
    let (_, recovery) = rotate_passphrase(store, config, session, &passphrase, &confirm).await?;

    // The old cached credential (if any) is now stale.
    cache.clear();

    let dir = data_dir();
    std::fs::create_dir_all(&dir)?;
    let path = recovery.write_to(&dir)?;
    println!("Passphrase changed. New recovery file written to {}.", path.display());
    println!("Previous recovery files no longer work; replace them with this one.");
    Ok(())
}

async fn cmd_recovery_export(
    store: &JsonFileStore,
    account: &str,
    dir: Option<PathBuf>,
) -> Result<()> {
    use serde_json::Value;
    use stride_core::Collection;
    use stride_store::RecordStore;

    let rows = store
        .select(Collection::UserSettings, account, &Filter::new())
        .await?;
    let row = rows
        .first()
        .context("account is not set up; nothing to export")?;

    let salt = row
        .fields
        .get("encryption_salt")
        .and_then(Value::as_str)
        .context("settings row has no salt")?;
    let check = row
        .fields
        .get("encryption_check")
        .and_then(Value::as_str)
        .context("settings row has no verification token")?;

    let bundle = RecoveryBundle::build(account, salt, check);
    let dir = dir.unwrap_or_else(data_dir);
    std::fs::create_dir_all(&dir)?;
    let path = bundle.write_to(&dir)?;
    println!("Recovery file written to {}.", path.display());
    Ok(())
}

async fn cmd_recovery_restore(
    store: &JsonFileStore,
    config: &StrideConfig,
    file: &std::path::Path,
) -> Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("reading recovery file: {}", file.display()))?;
    let bundle = RecoveryBundle::from_json(&json)?;

    println!("Restoring account '{}' from recovery file.", bundle.user_id);
    let passphrase = prompt_passphrase("Passphrase: ")?;

    match stride_session::recover(store, config, &bundle, &passphrase).await {
        Ok(session) => {
            println!("Access restored for '{}'.", session.account_id());
            Ok(())
        }
        Err(SessionError::WrongPassphrase) => {
            bail!("that passphrase does not match this recovery file")
        }
        Err(e) => Err(e.into()),
    }
}

// ── data commands ──────────────────────────────────────────────────────────────

async fn cmd_habit_add(
    store: &JsonFileStore,
    session: &Session,
    name: String,
    points: u32,
    category: Option<String>,
) -> Result<()> {
    let categories = repo::list::<Category, _>(store, session, &Filter::new()).await?;
    let mut categories: Vec<_> = categories.into_iter().filter_map(Result::ok).collect();
    categories.sort_by_key(|c| c.meta.order_num);

    let target = match category {
        Some(wanted) => categories
            .into_iter()
            .find(|c| c.payload.name.eq_ignore_ascii_case(&wanted))
            .with_context(|| format!("no category named '{wanted}'"))?,
        None => categories.into_iter().next().context("no categories")?,
    };

    repo::insert::<Habit, _>(
        store,
        session,
        &HabitMeta {
            category_id: target.id,
            active: true,
        },
        &HabitData {
            name: name.clone(),
            points,
        },
    )
    .await?;

    println!("Added '{name}' ({points} pts) under {}.", target.payload.name);
    Ok(())
}

async fn cmd_habit_list(store: &JsonFileStore, session: &Session) -> Result<()> {
    let categories = repo::list::<Category, _>(store, session, &Filter::new()).await?;
    let names: std::collections::HashMap<_, _> = categories
        .iter()
        .filter_map(|r| r.as_ref().ok())
        .map(|c| (c.id, c.payload.name.clone()))
        .collect();

    let habits =
        repo::list::<Habit, _>(store, session, &Filter::new().eq("active", true)).await?;
    if habits.is_empty() {
        println!("No active habits.");
        return Ok(());
    }

    for result in habits {
        match result {
            Ok(habit) => {
                let category = names
                    .get(&habit.meta.category_id)
                    .map(String::as_str)
                    .unwrap_or("?");
                println!(
                    "  {} ({} pts) [{}]",
                    habit.payload.name, habit.payload.points, category
                );
            }
            Err(e) => println!("  <could not decrypt record {}>", e.id),
        }
    }
    Ok(())
}

async fn cmd_habit_done(store: &JsonFileStore, session: &Session, name: &str) -> Result<()> {
    let habits =
        repo::list::<Habit, _>(store, session, &Filter::new().eq("active", true)).await?;
    let habit = habits
        .into_iter()
        .filter_map(Result::ok)
        .find(|h| h.payload.name.eq_ignore_ascii_case(name))
        .with_context(|| format!("no active habit named '{name}'"))?;

    repo::insert::<Completion, _>(
        store,
        session,
        &CompletionMeta {
            habit_id: habit.id,
            date: chrono::Local::now().date_naive(),
        },
        &CompletionData {
            completed: true,
            points: habit.payload.points,
        },
    )
    .await?;

    println!("Done: {} (+{} pts)", habit.payload.name, habit.payload.points);
    Ok(())
}

async fn cmd_goal_add(
    store: &JsonFileStore,
    session: &Session,
    name: String,
    cadence: &str,
    parent: Option<String>,
) -> Result<()> {
    let goal_type = match cadence {
        "yearly" => GoalType::Yearly,
        "quarterly" => GoalType::Quarterly,
        "monthly" => GoalType::Monthly,
        "weekly" => GoalType::Weekly,
        other => bail!("unknown cadence '{other}' (yearly/quarterly/monthly/weekly)"),
    };

    let parent_id = match parent {
        Some(wanted) => {
            let goals = repo::list::<Goal, _>(store, session, &Filter::new())
                .await?;
            Some(
                goals
                    .into_iter()
                    .filter_map(Result::ok)
                    .find(|g| g.payload.name.eq_ignore_ascii_case(&wanted))
                    .with_context(|| format!("no goal named '{wanted}'"))?
                    .id,
            )
        }
        None => None,
    };

    repo::insert::<Goal, _>(
        store,
        session,
        &GoalMeta {
            goal_type,
            parent_id,
            linked_habit_id: None,
            target_min: None,
            target_max: None,
            status: GoalStatus::Active,
        },
        &GoalData {
            name: name.clone(),
            description: None,
            progress: None,
            intention_when: None,
            intention_where: None,
        },
    )
    .await?;

    println!("Added {} '{name}'.", goal_type.label());
    Ok(())
}

async fn cmd_goal_list(store: &JsonFileStore, session: &Session) -> Result<()> {
    let (arena, failures) = repo::load_goal_arena(store, session).await?;
    for failure in &failures {
        println!("  <could not decrypt goal {}>", failure.id);
    }
    if arena.is_empty() {
        println!("No goals yet.");
        return Ok(());
    }

    let today = chrono::Local::now().date_naive();
    for root in arena.roots() {
        print_goal(&arena, root.id, 0);
        if let Some(focus) = arena.current_focus(root.id, today) {
            println!("    → current focus: {}", focus.payload.name);
        }
    }
    Ok(())
}

fn print_goal(arena: &GoalArena, id: uuid::Uuid, depth: usize) {
    let Some(goal) = arena.get(id) else { return };
    let marker = match goal.meta.status {
        GoalStatus::Completed => "✓",
        GoalStatus::Active => "·",
    };
    println!(
        "{}{} {} [{}%] ({})",
        "  ".repeat(depth + 1),
        marker,
        goal.payload.name,
        arena.progress_of(id),
        goal.meta.goal_type.label(),
    );
    for child in arena.children_of(id) {
        print_goal(arena, child.id, depth + 1);
    }
}
