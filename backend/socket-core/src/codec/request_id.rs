use models::{ModelError, RequestId};

use std::time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;

const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Width of a `u128` written in base 36.
const RANDOM_WIDTH: usize = 25;

/// Generate a fresh request id.
///
/// The id is the current time in milliseconds followed by random digits, both
/// in lowercase base 36, cut to [`RequestId::LEN`] characters. Uniqueness
/// among outstanding requests is enforced by the correlation registry, not
/// here.
pub fn generate_request_id() -> Result<RequestId, ModelError> {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default();

    let mut id = to_base36(millis);
    id.push_str(&format!(
        "{:0>width$}",
        to_base36(Uuid::new_v4().as_u128()),
        width = RANDOM_WIDTH
    ));
    id.truncate(RequestId::LEN);

    RequestId::parse(id)
}

pub(crate) fn to_base36(mut value: u128) -> String {
    if value == 0 {
        return String::from("0");
    }

    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36_DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();

    digits.into_iter().map(char::from).collect()
}
