use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

static LAST_ISSUED: AtomicI64 = AtomicI64::new(0);

const ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// New order reference in the `ORD-<base36 millis>` shape reps read out over the phone.
/// Ids issued by one process are strictly increasing, even within a millisecond.
pub fn new_order_id() -> String {
    let now = Utc::now().timestamp_millis();
    let previous = LAST_ISSUED
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(now.max(last + 1)))
        .unwrap_or(now);
    order_id_from_millis(now.max(previous + 1))
}

pub fn order_id_from_millis(millis: i64) -> String {
    format!("ORD-{}", to_base36(millis.max(0) as u64))
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::new();
    while value > 0 {
        digits.push(ALPHABET[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();

    // ALPHABET is ASCII
    String::from_utf8_lossy(&digits).into_owned()
}
