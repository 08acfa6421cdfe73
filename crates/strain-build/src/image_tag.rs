//! # Image Tags
//!
//! Each buildable service stores its full image reference under its own
//! strain key. Before a build, the tag part of that reference is replaced
//! with one derived from the platform version, a prefix, the build time,
//! and optionally a short random suffix:
//!
//! ```text
//! docker.io/org/openedx:olive  ->  docker.io/org/openedx:v15.3.7-olive20240315-1015-a1b2
//! ```
//!
//! The previous tag is discarded; only the repository part is kept.

use std::collections::BTreeMap;
use std::fmt::{self, Write as _};

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use rand::Rng;

use crate::error::BuildError;

/// Prefix placed between the platform version and the timestamp.
pub const DEFAULT_TAG_PREFIX: &str = "openedx";

/// `strftime` format of the timestamp.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M";

/// Length of the random suffix when one is requested.
pub const DEFAULT_RANDOM_SUFFIX_LENGTH: usize = 4;

const SUFFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Immutable service id → strain key table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceImageKeys {
    entries: BTreeMap<String, String>,
}

impl Default for ServiceImageKeys {
    fn default() -> Self {
        Self::from_pairs([
            ("openedx", "DOCKER_IMAGE_OPENEDX"),
            ("mfe", "MFE_DOCKER_IMAGE"),
            ("aspects-superset", "DOCKER_IMAGE_SUPERSET"),
        ])
    }
}

impl ServiceImageKeys {
    /// Build a table from `(service, key)` pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            entries: pairs
                .into_iter()
                .map(|(s, k)| (s.to_string(), k.to_string()))
                .collect(),
        }
    }

    /// The strain key holding `service`'s image.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::UnknownService`] listing the known services.
    pub fn key_for(&self, service: &str) -> Result<&str, BuildError> {
        self.entries
            .get(service)
            .map(String::as_str)
            .ok_or_else(|| BuildError::UnknownService {
                service: service.to_string(),
                known: self.services().collect::<Vec<_>>().join(", "),
            })
    }

    /// Known service ids, sorted.
    pub fn services(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

/// How a generated tag is assembled after the platform version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagTemplate {
    /// Text placed right before the timestamp, usually the release name.
    pub prefix: String,
    /// `strftime` format for the build time.
    pub timestamp_format: String,
    /// Length of the random suffix, or `None` for no suffix.
    pub random_suffix_length: Option<usize>,
}

impl Default for TagTemplate {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_TAG_PREFIX.to_string(),
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            random_suffix_length: None,
        }
    }
}

impl TagTemplate {
    /// Render `<version>-<prefix><timestamp>[-<random>]`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidTimestampFormat`] if the format has an
    /// unknown specifier, or [`BuildError::InvalidImage`] if the result is
    /// not a valid image tag.
    pub fn render(&self, version: &str, stamp: &TagStamp) -> Result<String, BuildError> {
        let bad_format = || BuildError::InvalidTimestampFormat {
            format: self.timestamp_format.clone(),
        };
        let items: Vec<Item<'_>> = StrftimeItems::new(&self.timestamp_format).collect();
        if items.iter().any(|item| matches!(item, Item::Error)) {
            return Err(bad_format());
        }

        let mut tag = format!("{version}-{}", self.prefix);
        write!(tag, "{}", stamp.at.format_with_items(items.iter())).map_err(|_| bad_format())?;
        if let Some(random) = &stamp.random {
            tag.push('-');
            tag.push_str(random);
        }

        if !is_valid_tag(&tag) {
            return Err(BuildError::InvalidImage {
                image: tag,
                reason: "generated tag has characters outside [A-Za-z0-9_.-] or is too long"
                    .to_string(),
            });
        }
        Ok(tag)
    }
}

/// The time and randomness a tag is generated from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagStamp {
    pub at: DateTime<Utc>,
    /// Lowercase alphanumeric suffix, if the template asks for one.
    pub random: Option<String>,
}

impl TagStamp {
    /// A stamp for the current instant, with a suffix sized for `template`.
    pub fn now(template: &TagTemplate) -> Self {
        Self {
            at: Utc::now(),
            random: template.random_suffix_length.map(random_suffix),
        }
    }
}

/// `len` characters drawn from `[a-z0-9]`.
pub fn random_suffix(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| char::from(SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())]))
        .collect()
}

/// An image reference split into repository and tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub repository: String,
    pub tag: Option<String>,
}

impl ImageRef {
    /// Parse `repository[:tag][@digest]`. A digest is discarded.
    ///
    /// A `:` before the last `/` belongs to a registry port, not a tag.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidImage`] for an empty repository or tag.
    pub fn parse(image: &str) -> Result<Self, BuildError> {
        let invalid = |reason: &str| BuildError::InvalidImage {
            image: image.to_string(),
            reason: reason.to_string(),
        };

        let image_part = image.trim();
        let without_digest = image_part.split('@').next().unwrap_or(image_part);
        let name_start = without_digest.rfind('/').map_or(0, |i| i + 1);

        let (repository, tag) = match without_digest[name_start..].rfind(':') {
            Some(i) => {
                let colon = name_start + i;
                (
                    &without_digest[..colon],
                    Some(without_digest[colon + 1..].to_string()),
                )
            }
            None => (without_digest, None),
        };

        if repository.is_empty() {
            return Err(invalid("empty repository"));
        }
        if tag.as_deref() == Some("") {
            return Err(invalid("empty tag"));
        }
        Ok(Self {
            repository: repository.to_string(),
            tag,
        })
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tag {
            Some(tag) => write!(f, "{}:{tag}", self.repository),
            None => f.write_str(&self.repository),
        }
    }
}

/// Replace `image`'s tag with one rendered from `template`.
///
/// # Errors
///
/// Returns [`BuildError::InvalidImage`] if `image` does not parse, or any
/// error from [`TagTemplate::render`].
pub fn dynamic_image_tag(
    image: &str,
    version: &str,
    template: &TagTemplate,
    stamp: &TagStamp,
) -> Result<String, BuildError> {
    let parsed = ImageRef::parse(image)?;
    let tag = template.render(version, stamp)?;
    Ok(format!("{}:{tag}", parsed.repository))
}

// Docker's tag grammar: [A-Za-z0-9_][A-Za-z0-9_.-]{0,127}
fn is_valid_tag(tag: &str) -> bool {
    let mut bytes = tag.bytes();
    tag.len() <= 128
        && matches!(bytes.next(), Some(b) if b == b'_' || b.is_ascii_alphanumeric())
        && bytes.all(|b| matches!(b, b'_' | b'.' | b'-') || b.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn stamp(random: Option<&str>) -> TagStamp {
        TagStamp {
            at: Utc.with_ymd_and_hms(2024, 3, 15, 10, 15, 42).unwrap(),
            random: random.map(str::to_string),
        }
    }

    fn olive() -> TagTemplate {
        TagTemplate {
            prefix: "olive".to_string(),
            ..TagTemplate::default()
        }
    }

    #[test]
    fn tag_from_version_prefix_and_time() {
        assert_eq!(
            dynamic_image_tag("docker.io/org/openedx:olive", "v15.3.7", &olive(), &stamp(None))
                .unwrap(),
            "docker.io/org/openedx:v15.3.7-olive20240315-1015"
        );
    }

    #[test]
    fn random_suffix_is_appended() {
        assert_eq!(
            dynamic_image_tag("org/openedx:olive", "v15.3.7", &olive(), &stamp(Some("a1b2")))
                .unwrap(),
            "org/openedx:v15.3.7-olive20240315-1015-a1b2"
        );
    }

    #[test]
    fn default_template_uses_openedx_prefix() {
        assert_eq!(
            TagTemplate::default().render("v18.1.0", &stamp(None)).unwrap(),
            "v18.1.0-openedx20240315-1015"
        );
    }

    #[test]
    fn custom_timestamp_format() {
        let template = TagTemplate {
            prefix: String::new(),
            timestamp_format: "%Y%m%d%H%M%S".to_string(),
            random_suffix_length: None,
        };
        assert_eq!(
            template.render("v16.0.0", &stamp(None)).unwrap(),
            "v16.0.0-20240315101542"
        );
    }

    #[test]
    fn unknown_specifier_is_rejected() {
        let template = TagTemplate {
            timestamp_format: "%Y%!".to_string(),
            ..TagTemplate::default()
        };
        let err = template.render("v16.0.0", &stamp(None)).unwrap_err();
        assert!(matches!(err, BuildError::InvalidTimestampFormat { .. }), "got: {err}");
    }

    #[test]
    fn format_producing_slashes_is_rejected() {
        let template = TagTemplate {
            timestamp_format: "%Y/%m".to_string(),
            ..TagTemplate::default()
        };
        let err = template.render("v16.0.0", &stamp(None)).unwrap_err();
        assert!(matches!(err, BuildError::InvalidImage { .. }), "got: {err}");
    }

    #[test]
    fn stamp_suffix_follows_template() {
        assert_eq!(TagStamp::now(&TagTemplate::default()).random, None);

        let template = TagTemplate {
            random_suffix_length: Some(6),
            ..TagTemplate::default()
        };
        let random = TagStamp::now(&template).random.unwrap();
        assert_eq!(random.len(), 6);
        assert!(random
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()));
    }

    #[test]
    fn registry_port_is_not_a_tag() {
        let parsed = ImageRef::parse("registry.local:5000/org/openedx").unwrap();
        assert_eq!(parsed.repository, "registry.local:5000/org/openedx");
        assert_eq!(parsed.tag, None);

        assert_eq!(
            dynamic_image_tag(
                "registry.local:5000/org/openedx:palm",
                "v16.1.2",
                &olive(),
                &stamp(None)
            )
            .unwrap(),
            "registry.local:5000/org/openedx:v16.1.2-olive20240315-1015"
        );
    }

    #[test]
    fn untagged_image_gets_a_tag() {
        assert_eq!(
            dynamic_image_tag("org/mfe", "v15.3.7", &olive(), &stamp(None)).unwrap(),
            "org/mfe:v15.3.7-olive20240315-1015"
        );
    }

    #[test]
    fn digest_is_dropped() {
        let parsed = ImageRef::parse("org/openedx:olive@sha256:abcdef").unwrap();
        assert_eq!(parsed.to_string(), "org/openedx:olive");
    }

    #[test]
    fn rejects_empty_parts() {
        assert!(ImageRef::parse(":olive").is_err());
        assert!(ImageRef::parse("org/openedx:").is_err());
        assert!(ImageRef::parse("").is_err());
    }

    #[test]
    fn service_table_lookup() {
        let keys = ServiceImageKeys::default();
        assert_eq!(keys.key_for("openedx").unwrap(), "DOCKER_IMAGE_OPENEDX");
        assert_eq!(keys.key_for("mfe").unwrap(), "MFE_DOCKER_IMAGE");
        assert_eq!(keys.key_for("aspects-superset").unwrap(), "DOCKER_IMAGE_SUPERSET");

        let err = keys.key_for("forum").unwrap_err().to_string();
        assert!(err.contains("unknown service 'forum'"));
        assert!(err.contains("aspects-superset, mfe, openedx"));
    }

    #[test]
    fn injected_table_replaces_defaults() {
        let keys = ServiceImageKeys::from_pairs([("forum", "FORUM_DOCKER_IMAGE")]);
        assert_eq!(keys.key_for("forum").unwrap(), "FORUM_DOCKER_IMAGE");
        assert!(keys.key_for("openedx").is_err());
    }
}
