//! stride-session: the key-lifecycle engine
//!
//! Control flow:
//! ```text
//! setup    passphrase ──policy──► fresh salt ──PBKDF2──► session key
//!          verification token + default records sealed and stored,
//!          recovery bundle handed back for export
//!
//! unlock   passphrase (typed, or from the device cache)
//!          ──PBKDF2 over the stored salt──► candidate key
//!          verification token decides: Session, or WrongPassphrase
//!
//! session  the Session value IS the context: account id + key, passed to
//!          every codec call, replaced (never mutated) on rotation,
//!          dropped on lock/sign-out (dropping zeroizes the key)
//! ```
//!
//! Key derivation is the dominant suspension point and runs on the
//! blocking pool; seal/open run inline. Nothing here is cancellable
//! mid-flight: a caller that times out abandons the future and surfaces
//! an error, it does not abort the primitive.

pub mod error;
pub mod recover;
pub mod repo;
pub mod rotate;
pub mod session;
pub mod setup;
pub mod unlock;

pub use error::SessionError;
pub use recover::recover;
pub use rotate::rotate_passphrase;
pub use session::Session;
pub use setup::{setup, SetupOutcome, DEFAULT_CATEGORIES};
pub use unlock::{unlock, unlock_from_device};
