use super::utils::{JosecCli, arg};

#[test]
#[ignore]
fn test_jws_sign_verify_parse() {
    let dir = tempfile::tempdir().unwrap();
    let key = dir.path().join("key.json");
    let public = dir.path().join("public.json");
    JosecCli::run(&[
        "jwk", "generate", "-t", "EC", "-c", "P-384", "--kid", "sig", "--alg", "ES384", "-o",
        arg(&key),
    ]);
    JosecCli::run(&[
        "jwk", "generate", "-t", "EC", "-c", "P-384", "--kid", "sig", "--alg", "ES384", "-o",
        arg(&public), "-p",
    ]);

    let token = JosecCli::run_with_stdin(
        &["jws", "sign", "-a", "ES384", "-k", arg(&key), "-H", r#"{"typ":"JWT"}"#],
        b"hello josec",
    );
    assert_eq!(token.iter().filter(|&&b| b == b'.').count(), 2);

    let payload = JosecCli::run_with_stdin(
        &["jws", "verify", "-a", "ES384", "-k", arg(&key)],
        &token,
    );
    assert_eq!(payload, b"hello josec");

    // the public key does not match the private one, so kid matching fails
    let stderr = {
        let message = dir.path().join("message.jws");
        std::fs::write(&message, &token).unwrap();
        JosecCli::fail(&["jws", "verify", "-m", "-k", arg(&public), arg(&message)])
    };
    assert!(stderr.contains("failed to verify message"), "{stderr}");

    let token = String::from_utf8(token).unwrap();
    let parsed = JosecCli::run_str(&["jws", "parse", token.as_str()]);
    assert!(parsed.starts_with("Payload: hello josec\nJWS: {\n"));
    assert!(parsed.contains("Signature 0: {\n"));
    assert!(parsed.contains(r#""typ": "JWT""#));
}

#[test]
#[ignore]
fn test_jws_verify_requires_algorithm() {
    let stderr = JosecCli::fail(&["jws", "verify", "-k", "key.json"]);
    assert!(
        stderr.contains("algorithm is required unless key ID matching is enabled"),
        "{stderr}"
    );
}
