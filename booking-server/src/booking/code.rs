//! Booking code generation
//!
//! Human-readable codes of the form `BK<base36 millis><6 hex chars>`.
//! Uniqueness is best-effort here; the service layer collision-checks
//! against the ledger and retries a bounded number of times.

use chrono::Utc;
use rand::Rng;

const PREFIX: &str = "BK";
const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Generate one candidate booking code
pub fn generate_code() -> String {
    let millis = Utc::now().timestamp_millis().max(0) as u64;
    let mut random = [0u8; 3];
    rand::thread_rng().fill(&mut random);
    format!(
        "{PREFIX}{}{}",
        base36_upper(millis),
        hex::encode_upper(random)
    )
}

fn base36_upper(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).expect("base36 digits are ASCII")
}
