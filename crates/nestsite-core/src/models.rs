//! Domain models for NestSite.
//!
//! These are the core types shared across all crates.

pub mod agency;
pub mod content;
pub mod domain;
pub mod host;
pub mod media;
pub mod membership;
pub mod pricing;
pub mod property;
pub mod room;
pub mod tenant;
pub mod theme;
pub mod user;

/// Deserialize a field where an explicit `null` means "clear" and an
/// absent field means "unchanged": `null` → `Some(None)`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::property::UpdateProperty;

    #[test]
    fn null_clears_and_absent_keeps() {
        let patch: UpdateProperty =
            serde_json::from_str(r#"{"tagline": null, "address": "Via Roma 1"}"#).unwrap();
        assert_eq!(patch.tagline, Some(None));
        assert_eq!(patch.address, Some(Some("Via Roma 1".into())));
        assert_eq!(patch.description, None);
    }
}
