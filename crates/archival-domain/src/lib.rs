// archival-domain library entry point
pub mod config_file;
pub mod error;
pub mod index_table;
pub mod job;
pub mod night;
pub use config_file::ResolvedConfig;
pub use error::DomainError;
pub use index_table::{IndexTableDescriptor, IndexTableSet};
pub use job::{JobKind, JobSpec};
pub use night::Night;
