use super::utils::{JosecCli, arg};

#[test]
#[ignore]
fn test_jwe_encrypt_decrypt() {
    let dir = tempfile::tempdir().unwrap();
    let key = dir.path().join("key.pem");
    JosecCli::run(&["jwk", "generate", "-t", "RSA", "-O", "pem", "-o", arg(&key)]);

    let message = JosecCli::run_with_stdin(
        &[
            "jwe", "enc", "-k", arg(&key), "-F", "pem", "-K", "RSA-OAEP-256", "-c",
            "A128CBC-HS256", "-z",
        ],
        b"secret payload",
    );
    assert_eq!(message.iter().filter(|&&b| b == b'.').count(), 4);

    let payload = JosecCli::run_with_stdin(
        &["jwe", "dec", "-k", arg(&key), "-F", "pem"],
        &message,
    );
    assert_eq!(payload, b"secret payload");

    let payload = JosecCli::run_with_stdin(
        &["jwe", "decrypt", "-k", arg(&key), "-F", "pem", "-K", "RSA-OAEP-256"],
        &message,
    );
    assert_eq!(payload, b"secret payload");

    let stderr = {
        let input = dir.path().join("message.jwe");
        std::fs::write(&input, &message).unwrap();
        JosecCli::fail(&["jwe", "dec", "-k", arg(&key), "-F", "pem", "-K", "RSA1_5", arg(&input)])
    };
    assert!(stderr.contains("failed to decrypt message"), "{stderr}");
}

#[test]
#[ignore]
fn test_jwe_invalid_algorithms() {
    let stderr = JosecCli::fail(&["jwe", "enc", "-k", "key.json", "-K", "RSA-OAEP-384", "-c", "A512GCM"]);
    assert!(stderr.contains("key_encryption: invalid key encryption algorithm"), "{stderr}");
    assert!(stderr.contains("content_encryption: invalid content encryption algorithm"), "{stderr}");
}
