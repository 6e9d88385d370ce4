//! Test fixtures and helpers.
//!
//! Common setup code for integration tests. Secrets come from a seeded
//! `StdRng`, so a given seed always yields the same share.

use rand::rngs::StdRng;
use rand::SeedableRng;

use sharekey::{Vault, VaultConfig};
use sharekey_core::{PrivilegeLevel, Secret};
use sharekey_store::MemoryStore;

/// Generate the owner secret for `seed`.
pub fn seeded_owner(seed: u64) -> Secret {
    Secret::generate(PrivilegeLevel::Owner, &mut StdRng::seed_from_u64(seed))
        .expect("seeded generation draws a valid scalar")
}

/// A share's secret at every level, derived from one seeded owner.
#[derive(Debug, Clone)]
pub struct ShareSecrets {
    pub owner: Secret,
    pub read_write: Secret,
    pub read_only: Secret,
    pub download: Secret,
}

impl ShareSecrets {
    /// Derive the full chain from the owner for `seed`.
    pub fn from_seed(seed: u64) -> Self {
        let owner = seeded_owner(seed);
        let derive = |level| owner.derive(level).expect("owner covers every level");
        Self {
            read_write: derive(PrivilegeLevel::ReadWrite),
            read_only: derive(PrivilegeLevel::ReadOnly),
            download: derive(PrivilegeLevel::Download),
            owner,
        }
    }

    /// The secret at `level`.
    pub fn at(&self, level: PrivilegeLevel) -> &Secret {
        match level {
            PrivilegeLevel::Owner => &self.owner,
            PrivilegeLevel::ReadWrite => &self.read_write,
            PrivilegeLevel::ReadOnly => &self.read_only,
            PrivilegeLevel::Download => &self.download,
        }
    }
}

/// A test fixture with a seeded share and a vault over a memory store.
pub struct TestFixture {
    pub secrets: ShareSecrets,
    pub vault: Vault<MemoryStore>,
}

impl TestFixture {
    /// Create a fixture whose share comes from `seed`. The folder is not
    /// joined yet.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            secrets: ShareSecrets::from_seed(seed),
            vault: Vault::new(MemoryStore::new(), VaultConfig::default()),
        }
    }

    /// Create a fixture and join its folder with the owner secret.
    pub async fn joined(seed: u64) -> Self {
        let fixture = Self::with_seed(seed);
        fixture
            .vault
            .add_folder(&fixture.secrets.owner, &format!("/fixture/{}", seed))
            .await
            .expect("memory store accepts the folder");
        fixture
    }

    /// The secret at `level`.
    pub fn secret(&self, level: PrivilegeLevel) -> &Secret {
        self.secrets.at(level)
    }
}

/// Create share secrets for several independent shares.
pub fn multi_share_secrets(count: usize) -> Vec<ShareSecrets> {
    (0..count as u64).map(ShareSecrets::from_seed).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_is_deterministic() {
        assert_eq!(seeded_owner(1), seeded_owner(1));
        assert_ne!(seeded_owner(1), seeded_owner(2));
    }

    #[test]
    fn test_chain_levels() {
        let secrets = ShareSecrets::from_seed(3);
        for level in PrivilegeLevel::ALL {
            assert_eq!(secrets.at(level).level(), level);
            assert_eq!(secrets.at(level).folder_id(), secrets.owner.folder_id());
        }
    }

    #[tokio::test]
    async fn test_joined_fixture_has_folder() {
        let fixture = TestFixture::joined(4).await;
        let folders = fixture.vault.folders().await.unwrap();
        assert_eq!(folders.len(), 1);
        assert_eq!(folders[0].level, PrivilegeLevel::Owner);
    }

    #[test]
    fn test_multi_share() {
        let shares = multi_share_secrets(3);
        assert_ne!(shares[0].owner.folder_id(), shares[1].owner.folder_id());
        assert_ne!(shares[1].owner.folder_id(), shares[2].owner.folder_id());
    }
}
