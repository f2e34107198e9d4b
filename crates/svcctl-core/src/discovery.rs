//! Instance discovery
//!
//! Enumerates `<root>/instances/<kind>/<name>` directories. Only directories
//! count (a symlink to a directory counts too); stray files are ignored.
//! Results are sorted so bulk operations and reports run in a stable order.

use crate::error::DiscoveryError;
use crate::instance::InstanceId;
use std::path::Path;
use svcctl_config::paths;
use tracing::debug;

/// Instance kinds present under `<root>/instances`
pub fn list_instance_kinds(root: &Path) -> Result<Vec<String>, DiscoveryError> {
    list_subdirs(&paths::instances_dir(root))
}

/// Instance names present under `<root>/instances/<kind>`
pub fn list_instances(root: &Path, kind: &str) -> Result<Vec<String>, DiscoveryError> {
    list_subdirs(&paths::kind_dir(root, kind))
}

/// Every `(kind, name)` pair, ordered by kind then name
pub fn discover_all(root: &Path) -> Result<Vec<InstanceId>, DiscoveryError> {
    let mut ids = Vec::new();
    for kind in list_instance_kinds(root)? {
        for name in list_instances(root, &kind)? {
            ids.push(InstanceId::new(kind.clone(), name));
        }
    }
    debug!(count = ids.len(), "Discovered instances");
    Ok(ids)
}

fn list_subdirs(dir: &Path) -> Result<Vec<String>, DiscoveryError> {
    let to_error = |source| DiscoveryError {
        path: dir.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(to_error)? {
        let entry = entry.map_err(to_error)?;
        if !entry.path().is_dir() {
            continue;
        }
        // Non UTF-8 names cannot be addressed from the command line
        if let Ok(name) = entry.file_name().into_string() {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn mkdir(root: &Path, rel: &str) {
        std::fs::create_dir_all(root.join(rel)).unwrap();
    }

    #[test]
    fn test_missing_instances_root_is_an_error() {
        let root = TempDir::new().unwrap();
        let err = list_instance_kinds(root.path()).unwrap_err();
        assert_eq!(err.path, paths::instances_dir(root.path()));
        assert!(discover_all(root.path()).is_err());
    }

    #[test]
    fn test_lists_directories_only_sorted() {
        let root = TempDir::new().unwrap();
        mkdir(root.path(), "instances/netprobe/b2");
        mkdir(root.path(), "instances/netprobe/a1");
        mkdir(root.path(), "instances/logstash/ship");
        std::fs::write(root.path().join("instances/README"), "").unwrap();
        std::fs::write(root.path().join("instances/netprobe/notes.txt"), "").unwrap();

        assert_eq!(
            list_instance_kinds(root.path()).unwrap(),
            vec!["logstash", "netprobe"]
        );
        assert_eq!(
            list_instances(root.path(), "netprobe").unwrap(),
            vec!["a1", "b2"]
        );
    }

    #[test]
    fn test_discover_all_orders_by_kind_then_name() {
        let root = TempDir::new().unwrap();
        mkdir(root.path(), "instances/netprobe/b2");
        mkdir(root.path(), "instances/netprobe/a1");
        mkdir(root.path(), "instances/logstash/ship");
        mkdir(root.path(), "instances/empty_kind");

        let ids = discover_all(root.path()).unwrap();
        assert_eq!(
            ids,
            vec![
                InstanceId::new("logstash", "ship"),
                InstanceId::new("netprobe", "a1"),
                InstanceId::new("netprobe", "b2"),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_instance_dir_is_discovered() {
        let root = TempDir::new().unwrap();
        mkdir(root.path(), "instances/netprobe");
        mkdir(root.path(), "elsewhere/a1");
        std::os::unix::fs::symlink(
            root.path().join("elsewhere/a1"),
            root.path().join("instances/netprobe/a1"),
        )
        .unwrap();

        assert_eq!(list_instances(root.path(), "netprobe").unwrap(), vec!["a1"]);
    }
}
