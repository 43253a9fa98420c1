//! Canonical comparison keys for free-text asset codes.
//!
//! Two codes are duplicates when their keys are equal, which makes the check
//! insensitive to case, to the choice of separator (`\ / - _`) and to leading
//! zeros in numeric segments: `HMSI/ELK/001` and `hmsi-elk-1` collide.

const SEPARATORS: [char; 4] = ['\\', '/', '-', '_'];

pub fn normalize_code(code: &str) -> String {
    code.to_lowercase()
        .split(|c| SEPARATORS.contains(&c))
        .map(normalize_segment)
        .collect::<Vec<_>>()
        .join("/")
}

fn normalize_segment(segment: &str) -> String {
    let segment = segment.trim();
    if !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit()) {
        // Stripped textually so arbitrarily long serials never overflow.
        let digits = segment.trim_start_matches('0');
        if digits.is_empty() {
            "0".to_string()
        } else {
            digits.to_string()
        }
    } else {
        segment.to_string()
    }
}

pub fn is_duplicate(a: &str, b: &str) -> bool {
    normalize_code(a) == normalize_code(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separator_and_zero_insensitive() {
        assert_eq!(normalize_code("HMSI/ELK/001"), "hmsi/elk/1");
        assert_eq!(normalize_code("hmsi-elk-1"), "hmsi/elk/1");
        assert!(is_duplicate("HMSI/ELK/001", "hmsi-elk-1"));
        assert!(is_duplicate("Lab\\Cam_07", "lab/cam/7"));
    }

    #[test]
    fn test_empty_and_zero() {
        assert_eq!(normalize_code(""), "");
        assert_eq!(normalize_code("000"), "0");
        assert_eq!(normalize_code("A/00"), "a/0");
    }

    #[test]
    fn test_whitespace_trimmed_per_segment() {
        assert_eq!(normalize_code(" ELK / 01 "), "elk/1");
        assert_eq!(normalize_code("proj ector-2"), "proj ector/2");
    }

    #[test]
    fn test_distinct_codes_stay_distinct() {
        assert!(!is_duplicate("ELK/1", "ELK/10"));
        assert!(!is_duplicate("ELK1", "ELK/1"));
        assert!(!is_duplicate("ELK/1A", "ELK/1"));
    }

    #[test]
    fn test_long_serial_does_not_overflow() {
        let code = format!("SN-000{}", "9".repeat(40));
        assert_eq!(normalize_code(&code), format!("sn/{}", "9".repeat(40)));
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "",
            "HMSI/ELK/001",
            " a - 007 _ b ",
            "--",
            "X\\\\0",
            "Kamera_Canon-0012/ Lensa ",
            "ÄBC-01",
            "  ",
            "12 34",
        ];
        for code in samples {
            let once = normalize_code(code);
            assert_eq!(normalize_code(&once), once, "not idempotent for {:?}", code);
        }
    }
}
