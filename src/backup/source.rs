//! Named backup sources.
//!
//! Sources are configured as a YAML mapping from name to directory. The
//! mapping order is the processing order of a run, so it is deserialized
//! into a `Vec` rather than a hash map.

use crate::backup::validate::validate_valid_archive_base_name;
use bon::Builder;
use derive_more::{Deref, From};
use getset::Getters;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt::Formatter;
use std::path::{Path, PathBuf};
use std::result;
use validator::{Validate, ValidationError, ValidationErrors};

/// One named directory to back up.
#[derive(Clone, Debug, PartialEq, Eq, Builder, Getters)]
#[getset(get = "pub")]
pub struct Source {
    #[builder(into)]
    name: String,
    #[builder(into)]
    path: PathBuf,
}

impl Source {
    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

/// Sources in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq, From, Deref)]
pub struct Sources(Vec<Source>);

impl Validate for Sources {
    fn validate(&self) -> result::Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let mut seen = HashSet::new();
        for source in &self.0 {
            if source.name.is_empty() {
                errors.add(
                    "sources",
                    ValidationError::new("InvalidSourceName")
                        .with_message("source name must not be empty".into()),
                );
                continue;
            }
            if let Err(e) = validate_valid_archive_base_name(&source.name) {
                errors.add("sources", e);
            }
            if !seen.insert(source.name.as_str()) {
                errors.add(
                    "sources",
                    ValidationError::new("DuplicateSourceName")
                        .with_message(format!("duplicate source name {:?}", source.name).into()),
                );
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl Serialize for Sources {
    fn serialize<S: Serializer>(&self, serializer: S) -> result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for source in &self.0 {
            map.serialize_entry(&source.name, &source.path)?;
        }
        map.end()
    }
}

struct SourcesVisitor;

impl<'de> Visitor<'de> for SourcesVisitor {
    type Value = Sources;

    fn expecting(&self, formatter: &mut Formatter) -> std::fmt::Result {
        formatter.write_str("a mapping of source name to directory path")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> result::Result<Self::Value, A::Error> {
        let mut sources = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((name, path)) = access.next_entry::<String, PathBuf>()? {
            sources.push(Source { name, path });
        }
        Ok(Sources(sources))
    }

    fn visit_unit<E: serde::de::Error>(self) -> result::Result<Self::Value, E> {
        Ok(Sources::default())
    }
}

impl<'de> Deserialize<'de> for Sources {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> result::Result<Self, D::Error> {
        deserializer.deserialize_any(SourcesVisitor)
    }
}

/// Result of checking one source without archiving it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCheck<'a> {
    pub source: &'a Source,
    pub exists: bool,
}

impl SourceCheck<'_> {
    pub fn path(&self) -> &Path {
        self.source.path()
    }
}

impl Sources {
    /// Existence check used by dry runs; touches nothing on disk.
    pub fn check(&self) -> Vec<SourceCheck<'_>> {
        self.0
            .iter()
            .map(|source| SourceCheck {
                source,
                exists: source.exists(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_deserialize_preserves_declaration_order() {
        let yaml = "zeta: /z\nalpha: /a\nmiddle: /m\n";
        let sources: Sources = serde_yml::from_str(yaml).unwrap();
        let names: Vec<_> = sources.iter().map(|s| s.name().as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "middle"]);
        assert_eq!(sources[1].path(), Path::new("/a"));
    }

    #[test]
    fn test_serialize_round_trips_as_mapping() {
        let sources = Sources::from(vec![
            Source::builder().name("b").path("/b").build(),
            Source::builder().name("a").path("/a").build(),
        ]);
        let yaml = serde_yml::to_string(&sources).unwrap();
        assert!(yaml.find("b:").unwrap() < yaml.find("a:").unwrap());
        let parsed: Sources = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(parsed, sources);
    }

    #[test]
    fn test_empty_mapping_is_allowed() {
        let sources: Sources = serde_yml::from_str("{}").unwrap();
        assert!(sources.is_empty());
        assert!(sources.validate().is_ok());
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let sources = Sources::from(vec![
            Source::builder().name("docs").path("/a").build(),
            Source::builder().name("docs").path("/b").build(),
        ]);
        assert!(sources.validate().is_err());
    }

    #[test]
    fn test_unsafe_names_are_rejected() {
        let sources = Sources::from(vec![Source::builder().name("a/b").path("/a").build()]);
        assert!(sources.validate().is_err());

        let sources = Sources::from(vec![Source::builder().name("").path("/a").build()]);
        assert!(sources.validate().is_err());
    }

    #[test]
    fn test_check_reports_existence() {
        let temp_dir = TempDir::new().unwrap();
        let sources = Sources::from(vec![
            Source::builder().name("present").path(temp_dir.path()).build(),
            Source::builder()
                .name("absent")
                .path(temp_dir.path().join("missing"))
                .build(),
        ]);

        let checks = sources.check();
        assert_eq!(checks.len(), 2);
        assert!(checks[0].exists);
        assert!(!checks[1].exists);
        assert_eq!(checks[1].path(), temp_dir.path().join("missing"));
    }
}
