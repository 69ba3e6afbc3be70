use super::utils::JosecCli;

#[test]
#[ignore]
fn test_jwa_key_types() {
    let lines = JosecCli::run_str(&["jwa", "-k"]);
    assert_eq!(lines, "RSA\nEC\nOKP\noct\n");
}

#[test]
#[ignore]
fn test_jwa_multiple_lists() {
    let lines = JosecCli::run_str(&["jwa", "-s", "-k"]);
    let lines: Vec<_> = lines.lines().collect();
    assert_eq!(&lines[..4], ["RSA", "EC", "OKP", "oct"]);
    assert_eq!(lines[4], "ES256");
    assert_eq!(lines.last(), Some(&"none"));
}

#[test]
#[ignore]
fn test_jwa_without_options() {
    let stderr = JosecCli::fail(&["jwa"]);
    assert!(stderr.contains("🚩 exit with error"));
    assert!(stderr.contains("jwa: no options were specified"), "{stderr}");
}
