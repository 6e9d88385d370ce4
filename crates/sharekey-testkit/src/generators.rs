//! Proptest generators for property-based testing.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use sharekey_core::{FolderId, PathId, PrivilegeLevel, Secret};

/// Generate a privilege level.
pub fn level() -> impl Strategy<Value = PrivilegeLevel> {
    prop::sample::select(PrivilegeLevel::ALL.to_vec())
}

/// Generate a signing level (`Owner` or `ReadWrite`).
pub fn signing_level() -> impl Strategy<Value = PrivilegeLevel> {
    prop_oneof![Just(PrivilegeLevel::Owner), Just(PrivilegeLevel::ReadWrite)]
}

/// Generate a signing secret from a random seed.
pub fn signing_secret() -> impl Strategy<Value = Secret> {
    (any::<u64>(), signing_level()).prop_map(|(seed, level)| {
        Secret::generate(level, &mut StdRng::seed_from_u64(seed))
            .expect("seeded generation draws a valid scalar")
    })
}

/// Generate a secret of any level, derived from a random signing secret.
pub fn secret() -> impl Strategy<Value = Secret> {
    (signing_secret(), level())
        .prop_map(|(root, level)| root.derive(level).expect("signing secrets cover every level"))
}

/// Generate a random FolderId.
pub fn folder_id() -> impl Strategy<Value = FolderId> {
    any::<[u8; 32]>().prop_map(FolderId::from_bytes)
}

/// Generate a random PathId.
pub fn path_id() -> impl Strategy<Value = PathId> {
    any::<[u8; 32]>().prop_map(PathId::from_bytes)
}

/// Generate a relative file path.
pub fn file_path() -> impl Strategy<Value = String> {
    "[a-z0-9_]{1,12}(/[a-z0-9_.]{1,12}){0,3}".prop_map(String::from)
}

/// Generate file metadata bytes of specified max length.
pub fn meta(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Parameters for generating a secret and deriving from it.
#[derive(Debug, Clone)]
pub struct SecretParams {
    pub seed: u64,
    pub root_level: PrivilegeLevel,
    pub target: PrivilegeLevel,
}

impl Arbitrary for SecretParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (any::<u64>(), signing_level(), level())
            .prop_map(|(seed, root_level, target)| SecretParams {
                seed,
                root_level,
                target,
            })
            .boxed()
    }
}

/// Build the root secret and its derivation at the target level.
pub fn secrets_from_params(params: &SecretParams) -> (Secret, Secret) {
    let root = Secret::generate(params.root_level, &mut StdRng::seed_from_u64(params.seed))
        .expect("seeded generation draws a valid scalar");
    let derived = root
        .derive(params.target)
        .expect("signing secrets cover every level");
    (root, derived)
}
