//! Integration tests for the `mandate` binary.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const CLIENT_KEY: &str = "0x0000000000000000000000000000000000000000000000000000000000000001";
const SERVER_KEY: &str = "0x0000000000000000000000000000000000000000000000000000000000000002";
const CLIENT_ADDR: &str = "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf";
const SERVER_ADDR: &str = "0x2B5AD5c4795c026514f8317c7a215E218DcCD6cF";

fn mandate_cmd() -> Command {
    Command::new(env!("CARGO_BIN_EXE_mandate"))
}

fn run(args: &[&str]) -> Output {
    mandate_cmd()
        .args(args)
        .output()
        .expect("failed to run mandate")
}

fn path_str(p: &Path) -> &str {
    p.to_str().unwrap()
}

struct Fixture {
    tmp: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("client.key"), CLIENT_KEY).unwrap();
        std::fs::write(tmp.path().join("server.key"), SERVER_KEY).unwrap();
        std::fs::write(
            tmp.path().join("swap.json"),
            r#"{
                "chainId": 1,
                "tokenIn": "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48",
                "tokenOut": "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2",
                "amountIn": "100000000",
                "minOut": "165000",
                "recipient": "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
            }"#,
        )
        .unwrap();
        Self { tmp }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.tmp.path().join(name)
    }

    fn create(&self, name: &str, deadline: &str) -> PathBuf {
        let out = self.path(name);
        let output = run(&[
            "create",
            "--client",
            &format!("eip155:1:{CLIENT_ADDR}"),
            "--server",
            &format!("eip155:1:{SERVER_ADDR}"),
            "--deadline",
            deadline,
            "--intent",
            "swap 100 USDC for ETH",
            "--kind",
            "swap@1",
            "--payload",
            path_str(&self.path("swap.json")),
            "--out",
            path_str(&out),
        ]);
        assert!(
            output.status.success(),
            "create failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        out
    }

    fn sign(&self, file: &Path, role: &str, key: &str, extra: &[&str]) -> Output {
        let key_path = self.path(key);
        let mut args = vec![
            "sign",
            path_str(file),
            "--role",
            role,
            "--key",
            path_str(&key_path),
            "--in-place",
        ];
        args.extend_from_slice(extra);
        run(&args)
    }

    fn signed(&self, name: &str) -> PathBuf {
        let file = self.create(name, "+15m");
        assert!(self.sign(&file, "server", "server.key", &[]).status.success());
        assert!(self.sign(&file, "client", "client.key", &[]).status.success());
        file
    }
}

#[test]
fn test_keygen_writes_private_key() {
    let tmp = TempDir::new().unwrap();
    let key = tmp.path().join("keys").join("agent.key");

    let output = run(&["keygen", "--out", path_str(&key)]);
    assert!(output.status.success(), "keygen should succeed");
    assert!(key.exists());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("address: 0x"), "should print address");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&key).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600, "private key should have mode 0600");
    }

    let again = run(&["keygen", "--out", path_str(&key)]);
    assert!(!again.status.success(), "should fail without --force");

    let forced = run(&["keygen", "--out", path_str(&key), "--force"]);
    assert!(forced.status.success(), "should succeed with --force");
}

#[test]
fn test_create_sign_verify_roundtrip() {
    let fx = Fixture::new();
    let file = fx.signed("m.json");

    let output = run(&[
        "verify",
        path_str(&file),
        "--require-client",
        CLIENT_ADDR,
        "--require-server",
        &SERVER_ADDR.to_lowercase(),
        "--kind",
        "swap@1",
        "--json",
    ]);
    assert!(
        output.status.success(),
        "verify failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let receipt: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(receipt["ok"], true);
    assert_eq!(receipt["parties"]["client"], CLIENT_ADDR);
    assert_eq!(receipt["signatures"]["server"]["recovered"], SERVER_ADDR);
    assert_eq!(receipt["core"]["kind"], "swap@1");
}

#[test]
fn test_verify_unsigned_exits_signature_missing() {
    let fx = Fixture::new();
    let file = fx.create("m.json", "+15m");

    let output = run(&["verify", path_str(&file), "--quiet"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty(), "quiet mode prints nothing");
}

#[test]
fn test_verify_tampered_exits_hash_mismatch() {
    let fx = Fixture::new();
    let file = fx.signed("m.json");

    let mut doc: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&file).unwrap()).unwrap();
    doc["intent"] = serde_json::json!("swap 1000 USDC for ETH");
    std::fs::write(&file, serde_json::to_vec(&doc).unwrap()).unwrap();

    let output = run(&["verify", path_str(&file)]);
    assert_eq!(output.status.code(), Some(4));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("hash mismatch"), "stderr: {stderr}");
}

#[test]
fn test_verify_wrong_party_exits_identity_mismatch() {
    let fx = Fixture::new();
    let file = fx.signed("m.json");

    let output = run(&["verify", path_str(&file), "--require-client", SERVER_ADDR]);
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn test_verify_past_deadline() {
    let fx = Fixture::new();
    let file = fx.signed("m.json");

    let output = run(&["verify", path_str(&file), "--now", "+1h"]);
    assert_eq!(output.status.code(), Some(5));
}

#[test]
fn test_verify_policy_file() {
    let fx = Fixture::new();
    let file = fx.signed("m.json");

    let policy = fx.path("policy.yaml");
    std::fs::write(
        &policy,
        format!("require_client: \"{CLIENT_ADDR}\"\nexpect_kind: transfer@1\n"),
    )
    .unwrap();
    let output = run(&["verify", path_str(&file), "--policy", path_str(&policy)]);
    assert_eq!(output.status.code(), Some(1), "wrong kind is rejected");

    // Flags override the policy
    let output = run(&[
        "verify",
        path_str(&file),
        "--policy",
        path_str(&policy),
        "--kind",
        "swap@1",
    ]);
    assert!(output.status.success());
}

#[test]
fn test_eip712_sign_needs_chain_id() {
    let fx = Fixture::new();
    let file = fx.create("m.json", "+15m");

    let output = fx.sign(&file, "server", "server.key", &["--alg", "eip712"]);
    assert_eq!(output.status.code(), Some(1));

    let output = fx.sign(
        &file,
        "server",
        "server.key",
        &["--alg", "eip712", "--chain-id", "1", "--domain-name", "Mandates"],
    );
    assert!(output.status.success());
    assert!(fx.sign(&file, "client", "client.key", &[]).status.success());

    let output = run(&["verify", path_str(&file)]);
    assert_eq!(output.status.code(), Some(1), "eip712 verify needs a domain");

    let output = run(&[
        "verify",
        path_str(&file),
        "--chain-id",
        "1",
        "--domain-name",
        "Mandates",
    ]);
    assert!(
        output.status.success(),
        "verify failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn test_hash_is_stable_across_signing() {
    let fx = Fixture::new();
    let file = fx.create("m.json", "2030-01-01T00:00:00Z");

    let before = run(&["hash", path_str(&file)]);
    assert!(before.status.success());
    let before = String::from_utf8_lossy(&before.stdout).trim().to_string();
    assert!(before.starts_with("0x") && before.len() == 66);

    assert!(fx.sign(&file, "server", "server.key", &[]).status.success());
    let after = run(&["hash", path_str(&file)]);
    assert_eq!(String::from_utf8_lossy(&after.stdout).trim(), before);

    let canonical = run(&["hash", path_str(&file), "--canonical"]);
    let canonical = String::from_utf8_lossy(&canonical.stdout);
    assert!(canonical.starts_with(r#"{"client":"eip155:1:"#));
    assert!(!canonical.contains("signatures"));
}

#[test]
fn test_create_rejects_bad_payload() {
    let fx = Fixture::new();
    std::fs::write(fx.path("bad.json"), r#"{"chainId": 1}"#).unwrap();

    let output = run(&[
        "create",
        "--client",
        &format!("eip155:1:{CLIENT_ADDR}"),
        "--server",
        &format!("eip155:1:{SERVER_ADDR}"),
        "--deadline",
        "+15m",
        "--kind",
        "swap@1",
        "--payload",
        path_str(&fx.path("bad.json")),
    ]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("swap@1"), "stderr: {stderr}");
}

#[test]
fn test_publish_fetch_roundtrip() {
    let fx = Fixture::new();
    let file = fx.signed("m.json");
    let store_url = format!("file://{}", path_str(&fx.path("store")));

    let output = run(&["publish", path_str(&file), "--store", &store_url]);
    assert!(
        output.status.success(),
        "publish failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let id = String::from_utf8_lossy(&output.stdout).trim().to_string();
    assert!(id.starts_with("sha256:"));

    let fetched = fx.path("fetched.json");
    let output = run(&["fetch", &id, "--store", &store_url, "--out", path_str(&fetched)]);
    assert!(output.status.success());

    let output = run(&["verify", path_str(&fetched), "--quiet"]);
    assert!(output.status.success());

    let missing = format!("sha256:{}", "0".repeat(64));
    let output = run(&["fetch", &missing, "--store", &store_url]);
    assert_eq!(output.status.code(), Some(6));
}
