use serde_json::Value;

const DJB2_SEED: i64 = 5381;
const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Fingerprint of an arbitrary JSON value: djb2 over its serialized text,
/// absolute value rendered in base 36.
pub fn fingerprint(value: &Value) -> String {
    // Serializing a `Value` cannot fail: every map key is already a string.
    let text = serde_json::to_string(value).unwrap_or_default();
    to_base36(djb2(&text).unsigned_abs())
}

/// Fingerprint of a raw submission. The raw text is hashed as a JSON string
/// value, so quotes and escapes take part in the hash.
pub fn fingerprint_raw(raw: &str) -> String {
    fingerprint(&Value::String(raw.to_string()))
}

/// djb2 over UTF-16 code units.
///
/// Each step computes `(acc << 5) + acc + c` where only the shifted term is
/// truncated to 32 bits. The accumulator therefore stays congruent to the
/// 32-bit wrapping sequence at every step while the final value keeps its
/// untruncated magnitude, which is what previously stored fingerprints hold.
pub fn djb2(text: &str) -> i64 {
    text.encode_utf16().fold(DJB2_SEED, |acc, unit| {
        let shifted = ((acc as i32) << 5) as i64;
        shifted.wrapping_add(acc).wrapping_add(unit as i64)
    })
}

pub fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36_DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SCENARIO: &str = r#"{"competitor":{"name":"A","dead":false,"damageDealt":100,"attackCount":5},"opponent":{"name":"B","dead":true,"damageDealt":50,"attackCount":3}}"#;

    #[test]
    fn base36_rendering() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(5381), "45h");
    }

    #[test]
    fn empty_raw_input_hashes_the_quoted_string() {
        assert_eq!(fingerprint_raw(""), "3hmfd");
        assert_eq!(fingerprint(&json!("")), fingerprint_raw(""));
    }

    #[test]
    fn matches_previously_stored_fingerprints() {
        assert_eq!(fingerprint_raw(SCENARIO), "6m8v3zk");
        assert_eq!(fingerprint_raw("line\nbreak\t\"q\"\\"), "4l1x451");
    }

    #[test]
    fn hashes_utf16_code_units() {
        assert_eq!(fingerprint_raw("héllo ☃ 𝄞"), "1r27jrq");
    }

    #[test]
    fn object_fingerprint_keeps_key_order() {
        let parsed: Value = serde_json::from_str(SCENARIO).unwrap();
        assert_eq!(fingerprint(&parsed), "43cqhmc");
    }

    #[test]
    fn deterministic() {
        let a = fingerprint_raw(SCENARIO);
        let b = fingerprint_raw(SCENARIO);
        assert_eq!(a, b);
        assert_ne!(a, fingerprint_raw(&format!("{SCENARIO} ")));
    }
}
