//! Repositories for database operations

pub mod cut;
pub mod member;
pub mod payment;
pub mod scan_event;
pub mod settings;
pub mod staff_token;

// Re-export for convenience
pub use cut::CutRepository;
pub use member::MemberRepository;
pub use payment::PaymentRepository;
pub use scan_event::ScanEventRepository;
pub use settings::SettingsRepository;
pub use staff_token::StaffTokenRepository;
