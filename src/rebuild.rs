//! Prepares Kubernetes manifests saved from etcd for re-creation.
//!
//! The API server rejects objects that still carry server-populated fields,
//! so those are removed and everything else is written back in its original
//! order.

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};
use tracing::{debug, info};

use crate::Result;

pub const DEFAULT_MANIFEST_DIR: &str = "/root/etcd";

pub const METADATA_FIELDS: &[&str] = &["creationTimestamp", "generation", "resourceVersion", "uid"];
pub const TOP_LEVEL_FIELDS: &[&str] = &["status"];

/// Path of the manifest saved for `name` under `dir`.
pub fn manifest_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.yaml", name))
}

fn remove_keys(mapping: &mut Mapping, keys: &[&str], scope: &str) -> usize {
    let mut removed = 0;
    for key in keys {
        // `shift_remove` keeps the order of the remaining keys.
        if mapping.shift_remove(*key).is_some() {
            removed += 1;
        } else {
            debug!("{}{} not present", scope, key);
        }
    }
    removed
}

/// Removes `metadata.{creationTimestamp,generation,resourceVersion,uid}` and
/// the top-level `status`. Returns how many fields were removed. Absent
/// fields and non-mapping documents are left alone.
pub fn strip_rebuild_fields(doc: &mut Value) -> usize {
    let Some(root) = doc.as_mapping_mut() else {
        return 0;
    };

    let mut removed = 0;
    if let Some(metadata) = root.get_mut("metadata").and_then(Value::as_mapping_mut) {
        removed += remove_keys(metadata, METADATA_FIELDS, "metadata.");
    }
    removed += remove_keys(root, TOP_LEVEL_FIELDS, "");
    removed
}

/// Rewrites the manifest at `path` in place.
pub fn edit_manifest(path: &Path) -> Result<usize> {
    let input = fs::read_to_string(path)?;
    let mut doc: Value = serde_yaml::from_str(&input)?;
    let removed = strip_rebuild_fields(&mut doc);
    fs::write(path, serde_yaml::to_string(&doc)?)?;
    info!("Removed {} fields from {}", removed, path.display());
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MANIFEST: &str = r#"apiVersion: apps/v1
kind: Deployment
metadata:
  name: cray-bss
  namespace: services
  creationTimestamp: "2021-06-01T00:00:00Z"
  generation: 4
  labels:
    app: cray-bss
  resourceVersion: "123456"
  uid: 0b6c2f4e-1111-2222-3333-444455556666
spec:
  replicas: 3
  template:
    spec:
      containers:
      - name: bss
        image: cray-bss:1.0
status:
  readyReplicas: 3
"#;

    const STRIPPED: &str = r#"apiVersion: apps/v1
kind: Deployment
metadata:
  name: cray-bss
  namespace: services
  labels:
    app: cray-bss
spec:
  replicas: 3
  template:
    spec:
      containers:
      - name: bss
        image: cray-bss:1.0
"#;

    #[test]
    fn test_strip_removes_exactly_the_rebuild_fields() {
        let mut doc: Value = serde_yaml::from_str(MANIFEST).unwrap();
        assert_eq!(strip_rebuild_fields(&mut doc), 5);

        let expected: Value = serde_yaml::from_str(STRIPPED).unwrap();
        assert_eq!(doc, expected);

        let keys: Vec<&str> = doc
            .get("metadata")
            .and_then(Value::as_mapping)
            .unwrap()
            .keys()
            .filter_map(Value::as_str)
            .collect();
        assert_eq!(keys, vec!["name", "namespace", "labels"]);

        let top: Vec<&str> = doc.as_mapping().unwrap().keys().filter_map(Value::as_str).collect();
        assert_eq!(top, vec!["apiVersion", "kind", "metadata", "spec"]);
    }

    #[test]
    fn test_missing_fields_are_ignored() {
        let mut doc: Value = serde_yaml::from_str("kind: ConfigMap\nmetadata:\n  name: x\n").unwrap();
        assert_eq!(strip_rebuild_fields(&mut doc), 0);
        assert_eq!(doc, serde_yaml::from_str::<Value>("kind: ConfigMap\nmetadata:\n  name: x\n").unwrap());

        let mut scalar = Value::String("not a manifest".to_string());
        assert_eq!(strip_rebuild_fields(&mut scalar), 0);
    }

    #[test]
    fn test_edit_manifest_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = manifest_path(dir.path(), "cray-bss");
        assert!(path.ends_with("cray-bss.yaml"));
        fs::write(&path, MANIFEST).unwrap();

        assert_eq!(edit_manifest(&path).unwrap(), 5);

        let written: Value = serde_yaml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let expected: Value = serde_yaml::from_str(STRIPPED).unwrap();
        assert_eq!(written, expected);
    }
}
