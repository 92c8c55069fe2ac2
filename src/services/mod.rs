//! Gateway services: the mint workflow, notifications and signature checks

pub mod mint;
pub mod notifier;
pub mod signature;

pub use mint::{CallbackOutcome, MintService, PaymentCallback, CONFIRMED_STATUSES};
pub use notifier::{
    deliver, spawn_delivery, LogNotifier, MintNotice, MintNotifier, NotifyError, NotifyOutcome,
    WebhookNotifier,
};
pub use signature::CallbackVerifier;
