//! Domain models for the mess gate

pub mod cut;
pub mod member;
pub mod payment;
pub mod scan;
pub mod staff_token;

// Re-export for convenience
pub use cut::{AppliedBy, MessClosure, MessCut, NewMessClosure, NewMessCut};
pub use member::{Member, MemberStatus};
pub use payment::{NewPaymentCycle, PaymentCycle, PaymentStatus};
pub use scan::{Meal, NewScanEvent, ScanEvent, ScanResult};
pub use staff_token::StaffToken;
