pub mod field;
pub mod payload;
pub mod secret;

pub use field::{parse_canonical, to_decimal, FieldElement, FieldError};
pub use payload::VerifierPayload;
pub use secret::{ReceiptSecret, ReportTag};
