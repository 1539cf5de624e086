use super::*;

#[test]
fn relative_paths_pass_unchanged() {
    assert_eq!(safe_return_url("/admin/zones", DEFAULT_RETURN_PATH), "/admin/zones");
    assert_eq!(safe_return_url("/authority?tab=alerts", "/x"), "/authority?tab=alerts");
}

#[test]
fn protocol_relative_is_rejected() {
    assert_eq!(safe_return_url("//evil.com", DEFAULT_RETURN_PATH), DEFAULT_RETURN_PATH);
}

#[test]
fn absolute_urls_are_rejected() {
    assert_eq!(safe_return_url("http://evil.com", "/home"), "/home");
    assert_eq!(safe_return_url("javascript:alert(1)", "/home"), "/home");
}

#[test]
fn backslash_and_control_tricks_are_rejected() {
    assert_eq!(safe_return_url("/\\evil.com", "/home"), "/home");
    assert_eq!(safe_return_url("/\tevil", "/home"), "/home");
}

#[test]
fn empty_is_rejected() {
    assert_eq!(safe_return_url("", "/home"), "/home");
}
