use ferrous_policy_domain::{
    Action, BlocklistUrl, ListFormat, ListSource, PolicyResult, BLACKLIST_NAME, WHITELIST_NAME,
};

#[test]
fn test_list_source_from_config() {
    let cfg = BlocklistUrl::new("ads", "https://example.org/ads.txt", ListFormat::Hosts);
    let source = ListSource::from_config(&cfg);

    assert_eq!(source.name.as_ref(), "ads");
    assert_eq!(source.url.as_ref(), "https://example.org/ads.txt");
    assert_eq!(source.format, ListFormat::Hosts);
    assert!(source.last_update.is_none());
    assert!(source.last_error.is_none());
    assert_eq!(source.domain_count, 0);
    assert!(source.is_healthy());
}

#[test]
fn test_failure_keeps_previous_count() {
    let cfg = BlocklistUrl::new("ads", "https://example.org/ads.txt", ListFormat::Auto);
    let mut source = ListSource::from_config(&cfg);

    source.record_success(42);
    assert_eq!(source.domain_count, 42);
    assert!(source.last_update.is_some());

    source.record_failure("HTTP 503");
    assert_eq!(source.domain_count, 42);
    assert_eq!(source.last_error.as_deref(), Some("HTTP 503"));
    assert!(!source.is_healthy());

    source.record_success(7);
    assert!(source.is_healthy());
    assert_eq!(source.domain_count, 7);
}

#[test]
fn test_policy_result_constructors() {
    let allow = PolicyResult::allow();
    assert_eq!(allow.action, Action::Allow);
    assert_eq!(allow.list_name, "");
    assert!(allow.rule.is_empty());

    let white = PolicyResult::whitelisted("safe.example.com".to_string());
    assert_eq!(white.list_name, WHITELIST_NAME);

    let black = PolicyResult::blacklisted(Action::Log, "ads.example.com".to_string());
    assert_eq!(black.action, Action::Log);
    assert_eq!(black.list_name, BLACKLIST_NAME);
}

#[test]
fn test_action_and_format_from_str() {
    assert_eq!("BLOCK".parse::<Action>().unwrap(), Action::Block);
    assert_eq!("log".parse::<Action>().unwrap(), Action::Log);
    assert!("drop".parse::<Action>().is_err());

    assert_eq!("hosts".parse::<ListFormat>().unwrap(), ListFormat::Hosts);
    assert_eq!("ABP".parse::<ListFormat>().unwrap(), ListFormat::Adblock);
    assert_eq!("".parse::<ListFormat>().unwrap(), ListFormat::Auto);
    assert!("csv".parse::<ListFormat>().is_err());
}
