use serde::{Deserialize, Deserializer};

/// Reads a string field where JSON `null` means the same as an absent key.
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
