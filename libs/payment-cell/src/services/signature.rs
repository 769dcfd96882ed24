use chrono::Utc;
use rand::Rng;
use ring::constant_time::verify_slices_are_equal;
use sha2::{Digest, Sha512};

use crate::models::PaymentStatus;

/// Order id for a new gateway transaction: `GENTING-{epoch_millis}-{8 hex}`.
/// The random suffix keeps ids unique even within one clock tick.
pub fn generate_order_id() -> String {
    let suffix: u32 = rand::thread_rng().gen();
    format!("GENTING-{}-{:08x}", Utc::now().timestamp_millis(), suffix)
}

/// Recomputes the Midtrans notification signature:
/// `SHA-512(order_id || status_code || gross_amount || server_key)` as
/// lowercase hex.
pub fn compute_signature(
    order_id: &str,
    status_code: &str,
    gross_amount: &str,
    server_key: &str,
) -> String {
    let mut hasher = Sha512::new();
    hasher.update(order_id.as_bytes());
    hasher.update(status_code.as_bytes());
    hasher.update(gross_amount.as_bytes());
    hasher.update(server_key.as_bytes());

    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Constant-time check of a supplied notification signature. This is the
/// only authentication on inbound payment state changes.
pub fn verify_signature(
    order_id: &str,
    status_code: &str,
    gross_amount: &str,
    server_key: &str,
    supplied: &str,
) -> bool {
    let expected = compute_signature(order_id, status_code, gross_amount, server_key);
    verify_slices_are_equal(expected.as_bytes(), supplied.as_bytes()).is_ok()
}

/// Deterministic mapping from gateway transaction state to a payment status.
/// Total over all inputs; anything unrecognized stays pending.
pub fn map_transaction_status(
    transaction_status: &str,
    fraud_status: Option<&str>,
) -> PaymentStatus {
    match transaction_status {
        "capture" => match fraud_status {
            Some("accept") => PaymentStatus::Success,
            _ => PaymentStatus::Challenge,
        },
        "settlement" => PaymentStatus::Success,
        "cancel" | "deny" | "expire" => PaymentStatus::Failed,
        "pending" => PaymentStatus::Pending,
        _ => PaymentStatus::Pending,
    }
}
