//! File-backed persistence
//!
//! - [`FileArtifactStore`]: append-only artifacts, one directory per tenant
//! - [`RegistrationFile`]: remote agent registrations across restarts
//! - [`TrustFile`]: trust scores across restarts

pub mod file_store;
pub mod registrations;
pub mod trust_file;

pub use file_store::FileArtifactStore;
pub use registrations::RegistrationFile;
pub use trust_file::TrustFile;
