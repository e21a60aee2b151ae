mod analysis;
mod certificate_type;
mod confidence_score;
mod status;
mod verification;
mod verification_id;

pub use analysis::AnalysisOutcome;
pub use certificate_type::{CertificateType, CertificateTypeTryFromError};
pub use confidence_score::{ConfidenceScore, ConfidenceScoreTryFromError};
pub use status::{VerificationStatus, VerificationStatusTryFromError};
pub use verification::Verification;
pub use verification_id::VerificationId;
