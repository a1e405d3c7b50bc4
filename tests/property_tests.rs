//! Property-based tests for the container pipeline.

use go2pack::container::{self, ContainerError};
use go2pack::header::TAG_LEN;
use go2pack::{AssetType, ContentHash, Registry};
use proptest::prelude::*;

fn registry() -> Registry {
    Registry::from_master_key([0x5A; 32])
}

fn asset_type() -> impl Strategy<Value = AssetType> {
    prop::sample::select(AssetType::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_roundtrip(data in prop::collection::vec(any::<u8>(), 0..4096), t in asset_type()) {
        let reg = registry();
        let enc = container::encode(&reg, &data, t).expect("encode should not fail");
        let dec = container::decode(&reg, &enc.container).expect("decode should not fail");
        prop_assert_eq!(dec.asset_type, t);
        prop_assert_eq!(dec.data, data);
    }

    #[test]
    fn prop_hash_is_of_raw_bytes(data in prop::collection::vec(any::<u8>(), 0..1024), t in asset_type()) {
        let enc = container::encode(&registry(), &data, t).expect("encode should not fail");
        prop_assert_eq!(enc.hash, ContentHash::of(&data));
    }

    #[test]
    fn prop_flipped_ciphertext_byte_is_detected(
        data in prop::collection::vec(any::<u8>(), 0..512),
        t in asset_type(),
        pos in any::<prop::sample::Index>(),
        mask in 1u8..=255,
    ) {
        let reg = registry();
        let mut buf = container::encode(&reg, &data, t).expect("encode should not fail").container;
        let i = TAG_LEN + pos.index(buf.len() - TAG_LEN);
        buf[i] ^= mask;
        let err = container::decode(&reg, &buf).expect_err("tampered container must not decode");
        prop_assert!(matches!(err, ContainerError::DecryptionFailed(_) | ContainerError::CorruptStream(_)));
    }

    #[test]
    fn prop_unknown_prefix_rejected(
        tag in prop::array::uniform5(any::<u8>()),
        rest in prop::collection::vec(any::<u8>(), 0..64),
    ) {
        prop_assume!(AssetType::ALL.iter().all(|t| t.tag().as_bytes() != &tag));
        let mut buf = tag.to_vec();
        buf.extend_from_slice(&rest);
        let err = container::decode(&registry(), &buf).expect_err("foreign tag must not decode");
        prop_assert!(matches!(err, ContainerError::UnknownTag(_)));
    }

    #[test]
    fn prop_short_buffer_malformed(buf in prop::collection::vec(any::<u8>(), 0..TAG_LEN)) {
        let err = container::decode(&registry(), &buf).expect_err("short buffer must not decode");
        prop_assert!(
            matches!(err, ContainerError::MalformedContainer { len } if len == buf.len()),
            "unexpected error: {}", err
        );
    }
}
