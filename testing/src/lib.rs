pub mod error;
mod framework;
mod negotiation_record;
pub mod sample;
mod test_directory;

pub use error::{FrameworkError, ProtocolError};
pub use framework::{Framework, Party};
pub use negotiation_record::{Agreement, NegotiationRecord, NegotiationStage, NegotiationSummary};
pub use sample::{register_sample_negotiators, Hardliner};
pub use test_directory::{prepare_test_dir, profile_path, test_assets_dir};
