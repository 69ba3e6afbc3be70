use super::utils::{JosecCli, arg};

#[test]
#[ignore]
fn test_jwk_generate_json() {
    let out = JosecCli::run(&["jwk", "generate", "-t", "EC", "-c", "P-256", "--kid", "k1"]);
    let key: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(key["kty"], "EC");
    assert_eq!(key["crv"], "P-256");
    assert_eq!(key["kid"], "k1");
    assert!(key.get("d").is_some());
}

#[test]
#[ignore]
fn test_jwk_generate_public_pem_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("key.pem");
    let out = JosecCli::run(&[
        "jwk",
        "generate",
        "-t",
        "OKP",
        "-c",
        "Ed25519",
        "-p",
        "-O",
        "pem",
        "-o",
        arg(&path),
    ]);
    assert!(out.is_empty());

    let pem = std::fs::read_to_string(&path).unwrap();
    assert!(pem.starts_with("-----BEGIN PUBLIC KEY-----"));
}

#[test]
#[ignore]
fn test_jwk_generate_invalid_config() {
    let stderr = JosecCli::fail(&["jwk", "generate", "-t", "EC", "-c", "Ed25519", "-s", "300"]);
    assert!(stderr.contains("key_size: key size must be a multiple of 256"), "{stderr}");

    let stderr = JosecCli::fail(&["jwk", "generate", "-t", "OKP", "-c", "X448"]);
    assert!(stderr.contains("'Ed448' and 'X448' are not supported"), "{stderr}");
}
