use ferrous_policy_domain::{is_valid_domain, normalize_domain};

// ============================================================================
// normalize_domain
// ============================================================================

#[test]
fn test_normalize_lowercases_and_strips_trailing_dot() {
    assert_eq!(normalize_domain("EXAMPLE.com."), "example.com");
    assert_eq!(normalize_domain("Ads.Example.COM"), "ads.example.com");
}

#[test]
fn test_normalize_trims_whitespace() {
    assert_eq!(normalize_domain("  example.com \t"), "example.com");
}

#[test]
fn test_normalize_is_idempotent() {
    for input in ["EXAMPLE.com.", "a.b.c..", "  Mixed.Case.Org. ", "", "."] {
        let once = normalize_domain(input);
        assert_eq!(normalize_domain(&once), once, "input: {:?}", input);
    }
}

#[test]
fn test_normalize_blank_is_empty() {
    assert_eq!(normalize_domain(""), "");
    assert_eq!(normalize_domain("   "), "");
    assert_eq!(normalize_domain("..."), "");
}

// ============================================================================
// is_valid_domain
// ============================================================================

#[test]
fn test_valid_domains() {
    assert!(is_valid_domain("example.com"));
    assert!(is_valid_domain("ads.example.com"));
    assert!(is_valid_domain("a-b.c0.io"));
    assert!(is_valid_domain("1.2.3.4"));
    assert!(is_valid_domain("xn--bcher-kva.example"));
}

#[test]
fn test_requires_a_dot() {
    assert!(!is_valid_domain("localhost"));
    assert!(!is_valid_domain("com"));
}

#[test]
fn test_rejects_empty_and_empty_labels() {
    assert!(!is_valid_domain(""));
    assert!(!is_valid_domain(".com"));
    assert!(!is_valid_domain("example..com"));
    assert!(!is_valid_domain("example.com."));
}

#[test]
fn test_rejects_bad_label_boundaries() {
    assert!(!is_valid_domain("-ads.example.com"));
    assert!(!is_valid_domain("ads-.example.com"));
    assert!(!is_valid_domain("ads.example.com-"));
}

#[test]
fn test_rejects_invalid_characters() {
    assert!(!is_valid_domain("ad_s.example.com"));
    assert!(!is_valid_domain("ads.example.com/path"));
    assert!(!is_valid_domain("*.example.com"));
    assert!(!is_valid_domain("ads example.com"));
}

#[test]
fn test_label_length_limit() {
    let ok = format!("{}.com", "a".repeat(63));
    let too_long = format!("{}.com", "a".repeat(64));
    assert!(is_valid_domain(&ok));
    assert!(!is_valid_domain(&too_long));
}

#[test]
fn test_total_length_limit() {
    // 4 labels of 63 chars + 3 dots = 255
    let label = "a".repeat(63);
    let long = format!("{label}.{label}.{label}.{label}");
    assert!(!is_valid_domain(&long));

    let label61 = "a".repeat(61);
    let max = format!("{label}.{label}.{label}.{label61}");
    assert_eq!(max.len(), 253);
    assert!(is_valid_domain(&max));
}
