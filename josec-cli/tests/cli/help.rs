use super::utils::JosecCli;

#[test]
#[ignore]
fn test_help() {
    let lines = JosecCli::run_str(&["help"]);
    assert!(lines.contains("josec cli to generate keys"));
    assert!(lines.contains("Usage:"));
    assert!(lines.contains("Commands:"));
    assert!(lines.contains("Options:"));
}

#[test]
#[ignore]
fn test_help_jws() {
    let lines = JosecCli::run_str(&["help", "jws"]);
    assert!(lines.contains("sign, verify and inspect JSON Web Signatures"));
    assert!(lines.contains("sign"));
    assert!(lines.contains("verify"));
    assert!(lines.contains("parse"));
}

#[test]
#[ignore]
fn test_help_jwe_aliases() {
    let lines = JosecCli::run_str(&["help", "jwe"]);
    assert!(lines.contains("[aliases: enc]"));
    assert!(lines.contains("[aliases: dec]"));
}

#[test]
#[ignore]
fn test_version() {
    let line = JosecCli::run_str(&["version"]);
    assert_eq!(
        line,
        format!(
            "josec version {} (under MIT LICENSE)\n",
            env!("CARGO_PKG_VERSION")
        )
    );
}
