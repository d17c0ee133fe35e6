//! Structured module identity parsed from a display name.

use serde::{Deserialize, Serialize};

/// Suffix carried by satellite modules that only hold localized resources.
pub const RESOURCES_SUFFIX: &str = ".resources";

/// Suffix carried by generated serializer modules.
pub const XML_SERIALIZERS_SUFFIX: &str = ".XmlSerializers";

/// The identity of a requested module.
///
/// A display name has the shape `Bare.Name, Version=1.0.0.0, Culture=neutral,
/// PublicKeyToken=0123456789abcdef`. Only the bare name is required; the
/// qualifiers are optional and unknown qualifiers are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleIdentity {
    /// Bare module name, used to build the candidate file name.
    pub name: String,
    /// `Version=` qualifier, if present.
    pub version: Option<String>,
    /// `Culture=` qualifier, if present.
    pub culture: Option<String>,
    /// `PublicKeyToken=` qualifier, if present.
    pub public_key_token: Option<String>,
}

impl ModuleIdentity {
    /// Parse a display name. Never fails: anything before the first comma
    /// is the bare name.
    pub fn parse(display_name: &str) -> Self {
        let mut parts = display_name.split(',');
        let name = parts.next().unwrap_or_default().trim().to_string();

        let mut identity = Self {
            name,
            version: None,
            culture: None,
            public_key_token: None,
        };

        for part in parts {
            let Some((key, value)) = part.split_once('=') else {
                continue;
            };
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key.trim().to_ascii_lowercase().as_str() {
                "version" => identity.version = Some(value.to_string()),
                "culture" => identity.culture = Some(value.to_string()),
                "publickeytoken" => identity.public_key_token = Some(value.to_string()),
                _ => {}
            }
        }

        identity
    }

    /// Whether this is a satellite module holding only localized resources.
    pub fn is_satellite(&self) -> bool {
        ends_with_ignore_case(&self.name, RESOURCES_SUFFIX)
    }

    /// Whether this is a generated serializer module.
    pub fn is_generated_serializer(&self) -> bool {
        ends_with_ignore_case(&self.name, XML_SERIALIZERS_SUFFIX)
    }

    /// Whether the bare name names a single file inside a directory.
    ///
    /// Empty names, `.`/`..`, and names with path separators or a drive
    /// prefix would escape the directory they are joined onto.
    pub fn is_file_stem(&self) -> bool {
        !matches!(self.name.as_str(), "" | "." | "..")
            && !self.name.contains(['/', '\\', ':'])
    }

    /// File name of this module for the given platform extension.
    ///
    /// The extension is appended rather than substituted because bare names
    /// routinely contain dots (`Vendor.Product.Component`).
    pub fn file_name(&self, extension: &str) -> String {
        let extension = extension.trim_start_matches('.');
        if extension.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{extension}", self.name)
        }
    }
}

impl std::fmt::Display for ModuleIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(ref version) = self.version {
            write!(f, ", Version={version}")?;
        }
        if let Some(ref culture) = self.culture {
            write!(f, ", Culture={culture}")?;
        }
        if let Some(ref token) = self.public_key_token {
            write!(f, ", PublicKeyToken={token}")?;
        }
        Ok(())
    }
}

fn ends_with_ignore_case(value: &str, suffix: &str) -> bool {
    value.len() >= suffix.len()
        && value
            .get(value.len() - suffix.len()..)
            .is_some_and(|tail| tail.eq_ignore_ascii_case(suffix))
}
