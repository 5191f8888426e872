//! Binary codec.
//!
//! Layout: `b"VZSK"`, little-endian `u16` version, then the [`SkeletonDoc`]
//! as bincode (fixed-width little-endian integers, `u64` length prefixes,
//! fields in declaration order, joints as the flat pre-order record list).
//! Trailing bytes are rejected.

use bincode::Options;

use crate::error::{Result, SkeletonError};
use crate::serial::{SkeletonDoc, FORMAT_VERSION};
use crate::skeleton::Skeleton;

pub const MAGIC: [u8; 4] = *b"VZSK";
const HEADER_LEN: usize = MAGIC.len() + 2;
/// Upper bound on payload size accepted by the decoder.
const MAX_PAYLOAD_BYTES: u64 = 64 * 1024 * 1024;

fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .reject_trailing_bytes()
        .with_limit(MAX_PAYLOAD_BYTES)
}

pub fn to_bytes(skeleton: &Skeleton) -> Result<Vec<u8>> {
    doc_to_bytes(&SkeletonDoc::from_skeleton(skeleton))
}

pub fn from_bytes(bytes: &[u8]) -> Result<Skeleton> {
    doc_from_bytes(bytes)?.to_skeleton()
}

pub fn doc_to_bytes(doc: &SkeletonDoc) -> Result<Vec<u8>> {
    let payload = options()
        .serialize(doc)
        .map_err(|e| SkeletonError::Encode {
            reason: e.to_string(),
        })?;
    let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    out.extend_from_slice(&payload);
    Ok(out)
}

/// Parse without building a skeleton.
pub fn doc_from_bytes(bytes: &[u8]) -> Result<SkeletonDoc> {
    if bytes.len() < HEADER_LEN {
        return Err(SkeletonError::decode(format!(
            "binary skeleton truncated: {} bytes",
            bytes.len()
        )));
    }
    let (header, payload) = bytes.split_at(HEADER_LEN);
    if header[..MAGIC.len()] != MAGIC {
        return Err(SkeletonError::decode("missing binary skeleton magic"));
    }
    let version = u16::from_le_bytes([header[4], header[5]]);
    if version != FORMAT_VERSION {
        return Err(SkeletonError::decode(format!(
            "unsupported binary skeleton version {version}"
        )));
    }
    options()
        .deserialize(payload)
        .map_err(|e| SkeletonError::decode(format!("invalid binary skeleton: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::joint::JointNode;

    fn bytes() -> Vec<u8> {
        let mut skel = Skeleton::new("bin");
        let root = skel.add_root(JointNode::new("r", "root"));
        skel.add_child(root, JointNode::new("c", "child")).unwrap();
        to_bytes(&skel).unwrap()
    }

    #[test]
    fn header_comes_first() {
        let b = bytes();
        assert_eq!(&b[..4], b"VZSK");
        assert_eq!(u16::from_le_bytes([b[4], b[5]]), FORMAT_VERSION);
    }

    #[test]
    fn rejects_bad_magic_truncation_and_trailing_bytes() {
        let mut bad_magic = bytes();
        bad_magic[0] = b'X';
        assert!(matches!(
            from_bytes(&bad_magic),
            Err(SkeletonError::Decode { .. })
        ));

        let b = bytes();
        assert!(matches!(
            from_bytes(&b[..3]),
            Err(SkeletonError::Decode { .. })
        ));
        assert!(matches!(
            from_bytes(&b[..b.len() - 1]),
            Err(SkeletonError::Decode { .. })
        ));

        let mut trailing = bytes();
        trailing.push(0);
        assert!(matches!(
            from_bytes(&trailing),
            Err(SkeletonError::Decode { .. })
        ));
    }

    #[test]
    fn thousand_joint_chain_round_trips() {
        let mut skel = Skeleton::new("deep");
        let mut parent = skel.add_root(JointNode::new("j0", "j0"));
        for i in 1..1000 {
            let node = JointNode::new(format!("j{i}"), format!("j{i}"));
            parent = skel.add_child(parent, node).unwrap();
        }
        let back = from_bytes(&to_bytes(&skel).unwrap()).unwrap();
        assert_eq!(back.len(), 1000);
        let tip = back.lookup("j999").unwrap();
        assert_eq!(back.depth(tip).unwrap(), 1000);
    }

    #[test]
    fn rejects_future_version() {
        let mut b = bytes();
        b[4] = 2;
        assert!(matches!(from_bytes(&b), Err(SkeletonError::Decode { .. })));
    }
}
