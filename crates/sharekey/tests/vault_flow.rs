//! End-to-end flows over an on-disk index: create a share, hand out weaker
//! secrets, and drive the control surface with JSON.

use sharekey::store::SqliteStore;
use sharekey::{ControlEvent, PrivilegeLevel, Secret, Vault, VaultConfig, VaultError};
use sharekey_core::ErrorKind;
use sharekey_testkit::fixtures::ShareSecrets;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn sqlite_vault(dir: &tempfile::TempDir) -> Vault<SqliteStore> {
    let store = SqliteStore::open(dir.path().join("index.db")).unwrap();
    Vault::new(store, VaultConfig::default())
}

#[tokio::test]
async fn owner_records_and_read_only_peer_verifies() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();

    // Owner side
    let owner_vault = sqlite_vault(&dir);
    let owner = owner_vault.create_folder("/home/owner/share").await.unwrap();
    owner_vault
        .record_file(&owner, "photos/cat.jpg", b"size=1024")
        .await
        .unwrap();
    let read_only_text = owner
        .derive(PrivilegeLevel::ReadOnly)
        .unwrap()
        .encode()
        .to_string();
    drop(owner_vault);

    // A peer that only received the read-only string, on the same index
    let peer_vault = sqlite_vault(&dir);
    let read_only = Secret::decode(&read_only_text).unwrap();
    let verified = peer_vault
        .verify_file(&read_only, "photos/cat.jpg")
        .await
        .unwrap();
    assert_eq!(verified.path, "photos/cat.jpg");
    assert_eq!(&verified.meta[..], b"size=1024");

    // ...but cannot write
    let err = peer_vault
        .record_file(&read_only, "photos/dog.jpg", b"size=1")
        .await
        .unwrap_err();
    assert!(matches!(err, VaultError::Secret(ref e) if e.kind() == ErrorKind::Level));
}

#[tokio::test]
async fn control_surface_joins_and_leaves() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let handler = sqlite_vault(&dir).into_control_handler();
    let share = ShareSecrets::from_seed(11);

    let add = format!(
        r#"{{"command":"add_folder","secret":"{}","path":"/srv/mirror"}}"#,
        share.download.encode()
    );
    let event: ControlEvent = serde_json::from_str(&handler.handle_json(&add).await.unwrap()).unwrap();
    assert_eq!(
        event,
        ControlEvent::folder_added(&share.owner.folder_id(), "/srv/mirror", PrivilegeLevel::Download)
    );

    let record = handler
        .registry()
        .folder(&share.owner.folder_id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.level, PrivilegeLevel::Download);

    let remove = format!(
        r#"{{"command":"remove_folder","secret":"{}"}}"#,
        share.read_only.encode()
    );
    let event: ControlEvent =
        serde_json::from_str(&handler.handle_json(&remove).await.unwrap()).unwrap();
    assert_eq!(event, ControlEvent::folder_removed(&share.owner.folder_id()));
    assert!(handler.registry().folders().await.unwrap().is_empty());
}

#[tokio::test]
async fn control_surface_reports_bad_secrets() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let handler = sqlite_vault(&dir).into_control_handler();

    // One substituted character
    let mut text = ShareSecrets::from_seed(12).read_only.encode().to_string();
    let last = text.pop().unwrap();
    text.push(if last == '1' { '2' } else { '1' });

    let add = format!(
        r#"{{"command":"add_folder","secret":"{}","path":"/srv/x"}}"#,
        text
    );
    let json = handler.handle_json(&add).await.unwrap();
    let event: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(event["event"], "error");
    assert_eq!(event["kind"], "format");
    assert!(!json.contains(&text));
}

#[tokio::test]
async fn control_policy_comes_from_vault_config() {
    init_tracing();
    let config = VaultConfig::from_json(r#"{"control":{"add_folder_min":"read_only"}}"#).unwrap();
    let store = SqliteStore::open_memory().unwrap();
    let handler = Vault::new(store, config).into_control_handler();
    let share = ShareSecrets::from_seed(13);

    let add = format!(
        r#"{{"command":"add_folder","secret":"{}","path":"/srv/x"}}"#,
        share.download.encode()
    );
    let event: serde_json::Value =
        serde_json::from_str(&handler.handle_json(&add).await.unwrap()).unwrap();
    assert_eq!(event["kind"], "level");
}

#[tokio::test]
async fn every_level_names_the_same_folder() {
    let store = SqliteStore::open_memory().unwrap();
    let vault = Vault::new(store, VaultConfig::default());
    let share = ShareSecrets::from_seed(14);

    let first = vault.add_folder(&share.download, "/a").await.unwrap();
    for level in PrivilegeLevel::ALL {
        assert_eq!(vault.add_folder(share.at(level), "/b").await.unwrap(), first);
    }

    // The first join is kept
    let folders = vault.folders().await.unwrap();
    assert_eq!(folders.len(), 1);
    assert_eq!(folders[0].path, "/a");
    assert_eq!(folders[0].level, PrivilegeLevel::Download);
}
