//! Replica attributes visible to `ls` and changeable through `modrepl`.

use crate::error::{ShellError, ShellResult};

/// Key that asks the service to apply a replica change with admin rights.
pub(crate) const ADMIN_OVERRIDE_KEY: &str = "irodsAdmin";

/// Query attribute names and the modification keys they map to, in display
/// order.
pub(crate) const ATTRIBUTES: [(&str, &str); 22] = [
    ("COLL_ID", "collId"),
    ("DATA_CREATE_TIME", "dataCreate"),
    ("DATA_CHECKSUM", "chksum"),
    ("DATA_EXPIRY", "dataExpiry"),
    ("DATA_ID", "dataId"),
    ("DATA_REPL_STATUS", "replStatus"),
    ("DATA_MAP_ID", "dataMapId"),
    ("DATA_MODE", "dataMode"),
    ("DATA_NAME", "dataName"),
    ("DATA_OWNER_NAME", "dataOwner"),
    ("DATA_OWNER_ZONE", "dataOwnerZone"),
    ("DATA_PATH", "filePath"),
    ("DATA_REPL_NUM", "replNum"),
    ("DATA_SIZE", "dataSize"),
    ("DATA_STATUS", "statusString"),
    ("DATA_TYPE_NAME", "dataType"),
    ("DATA_VERSION", "version"),
    ("DATA_MODIFY_TIME", "dataModify"),
    ("DATA_COMMENTS", "dataComments"),
    ("DATA_RESC_HIER", "resc_hier"),
    ("DATA_RESC_ID", "rescId"),
    ("DATA_RESC_NAME", "rescName"),
];

/// Attributes that identify a replica and therefore cannot be rewritten.
pub(crate) const DENYLIST: [&str; 6] = [
    "COLL_ID",
    "DATA_ID",
    "DATA_MAP_ID",
    "DATA_NAME",
    "DATA_RESC_HIER",
    "DATA_RESC_NAME",
];

pub(crate) fn public_names() -> impl Iterator<Item = &'static str> {
    ATTRIBUTES.iter().map(|(name, _)| *name)
}

/// Internal key for `name`, provided it is known and not denylisted.
pub(crate) fn resolve_modifiable_attribute(name: &str) -> ShellResult<&'static str> {
    ATTRIBUTES
        .iter()
        .find(|(public, _)| *public == name)
        .filter(|(public, _)| !DENYLIST.contains(public))
        .map(|(_, key)| *key)
        .ok_or_else(|| ShellError::InvalidAttribute {
            name: name.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn public_names_are_unique_and_cover_denylist() {
        let names: HashSet<_> = public_names().collect();
        assert_eq!(names.len(), ATTRIBUTES.len());
        assert!(DENYLIST.iter().all(|denied| names.contains(denied)));
    }

    #[test]
    fn modifiable_attributes_resolve_to_keys() -> ShellResult<()> {
        assert_eq!(resolve_modifiable_attribute("DATA_COMMENTS")?, "dataComments");
        assert_eq!(resolve_modifiable_attribute("DATA_PATH")?, "filePath");
        assert_eq!(resolve_modifiable_attribute("DATA_RESC_ID")?, "rescId");
        Ok(())
    }

    #[test]
    fn every_denylisted_attribute_is_refused() {
        for denied in DENYLIST {
            assert!(matches!(
                resolve_modifiable_attribute(denied),
                Err(ShellError::InvalidAttribute { .. })
            ));
        }
    }

    #[test]
    fn unknown_attributes_are_refused() {
        assert!(resolve_modifiable_attribute("DATA_RESC_GROUP_NAME").is_err());
        assert!(resolve_modifiable_attribute("data_comments").is_err());
        assert!(resolve_modifiable_attribute("").is_err());
    }
}
