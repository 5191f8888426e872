//! JSON text codec.

use crate::error::{Result, SkeletonError};
use crate::serial::SkeletonDoc;
use crate::skeleton::Skeleton;

pub fn to_json_string(skeleton: &Skeleton) -> Result<String> {
    doc_to_json(&SkeletonDoc::from_skeleton(skeleton))
}

pub fn from_json_str(s: &str) -> Result<Skeleton> {
    doc_from_json(s)?.to_skeleton()
}

pub fn doc_to_json(doc: &SkeletonDoc) -> Result<String> {
    serde_json::to_string_pretty(doc).map_err(|e| SkeletonError::Encode {
        reason: e.to_string(),
    })
}

/// Parse without building a skeleton.
pub fn doc_from_json(s: &str) -> Result<SkeletonDoc> {
    serde_json::from_str(s)
        .map_err(|e| SkeletonError::decode(format!("invalid skeleton JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::joint::JointNode;

    #[test]
    fn encodes_flat_preorder_records() {
        let mut skel = Skeleton::new("skel1");
        let root = JointNode::new("vj0", "root").with_translation([0.0, 1.0, 0.0]);
        let root = skel.add_root(root);
        skel.add_child(root, JointNode::new("vj00", "lhip"))
            .unwrap();

        let json = to_json_string(&skel).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["format"], "vizij-skeleton");
        assert_eq!(value["id"], "skel1");
        assert_eq!(value["jointSids"], serde_json::Value::Null);
        assert_eq!(value["joints"][0]["sid"], "root");
        assert_eq!(value["joints"][0]["translation"][1], 1.0);
        assert_eq!(value["joints"][0]["childCount"], 1);
        assert_eq!(value["joints"][1]["id"], "vj00");
    }

    #[test]
    fn deep_chain_round_trips() {
        let mut skel = Skeleton::new("chain");
        let mut tip = skel.add_root(JointNode::new("j0", "j0"));
        for i in 1..300 {
            let name = format!("j{i}");
            tip = skel
                .add_child(tip, JointNode::new(name.as_str(), name.as_str()))
                .unwrap();
        }
        let back = from_json_str(&to_json_string(&skel).unwrap()).unwrap();
        assert_eq!(back.len(), 300);
        assert_eq!(back.depth(back.lookup("j299").unwrap()).unwrap(), 300);
    }

    #[test]
    fn missing_field_is_a_decode_error() {
        let json = r#"{
            "format": "vizij-skeleton",
            "version": 1,
            "id": "s",
            "jointSids": null,
            "joints": [
                { "id": "a", "sid": "a", "translation": [0,0,0], "scale": [1,1,1], "childCount": 0 }
            ]
        }"#;
        let err = from_json_str(json).unwrap_err();
        assert!(matches!(err, SkeletonError::Decode { .. }));
        assert!(err.to_string().contains("rotation"));
    }

    #[test]
    fn wrong_arity_is_a_decode_error() {
        let json = r#"{
            "format": "vizij-skeleton", "version": 1, "id": "s", "jointSids": null,
            "joints": [
                { "id": "a", "sid": "a", "translation": [0,0], "rotation": [0,0,0,1],
                  "scale": [1,1,1], "childCount": 0 }
            ]
        }"#;
        assert!(matches!(
            from_json_str(json),
            Err(SkeletonError::Decode { .. })
        ));
    }
}
