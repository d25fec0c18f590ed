mod webhook_signature;

pub use webhook_signature::{calculate_webhook_signature, verify_webhook_signature};
