//! Type names and their wire encoding.
//!
//! A type is identified by a `Profile.ClassName` pair. On the wire the Core
//! profile is implicit (`Relationship`) and every other profile is a lower
//! case prefix (`software_Package`). A few class names collide with words the
//! object model reserves and are substituted in both directions
//! (`Package` ⇄ `SpdxPackage`).

use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use rustc_hash::FxHashMap;

use crate::vocab::CORE_PROFILE;

/// Profiles of the SPDX 3 model.
pub const PROFILES: &[&str] = &[
    "Core",
    "Software",
    "Security",
    "SimpleLicensing",
    "ExpandedLicensing",
    "Dataset",
    "AI",
    "Build",
    "Lite",
    "Extension",
];

lazy_static! {
    /// Wire word -> model word.
    static ref RESERVED_WORDS: FxHashMap<&'static str, &'static str> = [
        ("Package", "SpdxPackage"),
        ("package", "spdxPackage"),
        ("File", "SpdxFile"),
        ("file", "spdxFile"),
    ]
    .into_iter()
    .collect();

    /// Model word -> wire word.
    static ref REVERSE_WORDS: FxHashMap<&'static str, &'static str> =
        RESERVED_WORDS.iter().map(|(wire, model)| (*model, *wire)).collect();

    /// Lower case wire prefix -> profile name.
    static ref PROFILE_PREFIXES: FxHashMap<String, &'static str> = PROFILES
        .iter()
        .map(|profile| (profile.to_lowercase(), *profile))
        .collect();
}

/// Maps a wire word to the object model's word.
pub fn model_word(word: &str) -> &str {
    RESERVED_WORDS.get(word).copied().unwrap_or(word)
}

/// Maps an object model word back to its wire word.
pub fn wire_word(word: &str) -> &str {
    REVERSE_WORDS.get(word).copied().unwrap_or(word)
}

/// Resolves a lower case wire prefix (`software`) to its profile (`Software`).
pub fn profile_for_prefix(prefix: &str) -> Option<&'static str> {
    PROFILE_PREFIXES.get(prefix).copied()
}

/// A `Profile.ClassName` type name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeName {
    profile: String,
    class: String,
}

impl TypeName {
    /// Creates a type name from a profile and model class name.
    pub fn new(profile: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            profile: profile.into(),
            class: class.into(),
        }
    }

    /// Creates a Core profile type name.
    pub fn core(class: impl Into<String>) -> Self {
        Self::new(CORE_PROFILE, class)
    }

    /// Returns the profile name.
    pub fn profile(&self) -> &str {
        &self.profile
    }

    /// Returns the model class name.
    pub fn class(&self) -> &str {
        &self.class
    }

    /// True for types in the Core profile.
    pub fn is_core(&self) -> bool {
        self.profile == CORE_PROFILE
    }

    /// True if this is the Core type named `class`.
    pub fn is_core_class(&self, class: &str) -> bool {
        self.is_core() && self.class == class
    }

    /// Parses a wire type string (`software_Package`, `Relationship`).
    ///
    /// Returns `None` for an unknown profile prefix. Whether the class exists
    /// is a schema question, see
    /// [`JsonLdSchema::is_known_type`](crate::schema::JsonLdSchema::is_known_type).
    pub fn from_wire(wire: &str) -> Option<Self> {
        match wire.split_once('_') {
            Some((prefix, class)) => {
                let profile = profile_for_prefix(model_word(prefix))?;
                Some(Self::new(profile, model_word(class)))
            }
            None => Some(Self::core(model_word(wire))),
        }
    }

    /// Encodes this type name as a wire type string.
    pub fn to_wire(&self) -> String {
        let class = wire_word(&self.class);
        if self.is_core() {
            class.to_string()
        } else {
            format!("{}_{}", self.profile.to_lowercase(), class)
        }
    }

    /// Derives a type name from a class URI
    /// (`https://spdx.org/rdf/3.0.1/terms/Software/Package` -> `Software.SpdxPackage`).
    pub fn from_class_uri(uri: &str) -> Option<Self> {
        let (namespace, class) = uri.rsplit_once('/')?;
        let profile = namespace.rsplit('/').next()?;
        if profile.is_empty() || class.is_empty() {
            return None;
        }
        Some(Self::new(model_word(profile), model_word(class)))
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.profile, self.class)
    }
}

/// Error parsing a dotted type name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTypeNameError(pub String);

impl fmt::Display for ParseTypeNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid type name {:?}, expected Profile.ClassName", self.0)
    }
}

impl std::error::Error for ParseTypeNameError {}

impl FromStr for TypeName {
    type Err = ParseTypeNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('.') {
            Some((profile, class)) if !profile.is_empty() && !class.is_empty() => {
                Ok(Self::new(profile, class))
            }
            _ => Err(ParseTypeNameError(s.to_string())),
        }
    }
}
