//! Configuration schema definitions.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::palette::ColorPalette;

/// Key of the fallback entry in `formats` and `types`.
pub const DEFAULT_KEY: &str = "default";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RigConfig {
    #[serde(default)]
    pub naming: NamingConfig,
    #[serde(default)]
    pub palette: ColorPalette,
}

/// One element of a naming format.
///
/// Tokens are matched by value. Unrecognized tokens survive deserialization so
/// the resolver can report them against the node being named.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NameToken {
    Sep,
    Location,
    Type,
    Name,
    Component,
    Unknown(String),
}

impl NameToken {
    pub fn as_str(&self) -> &str {
        match self {
            NameToken::Sep => "sep",
            NameToken::Location => "location",
            NameToken::Type => "type",
            NameToken::Name => "name",
            NameToken::Component => "component",
            NameToken::Unknown(raw) => raw,
        }
    }
}

impl From<String> for NameToken {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "sep" => NameToken::Sep,
            "location" => NameToken::Location,
            "type" => NameToken::Type,
            "name" => NameToken::Name,
            "component" => NameToken::Component,
            _ => NameToken::Unknown(raw),
        }
    }
}

impl From<&str> for NameToken {
    fn from(raw: &str) -> Self {
        NameToken::from(raw.to_string())
    }
}

impl From<NameToken> for String {
    fn from(token: NameToken) -> Self {
        token.as_str().to_string()
    }
}

impl fmt::Display for NameToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Naming template: how build names are assembled per node kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NamingConfig {
    pub separator: String,
    pub locations: Vec<String>,
    #[serde(default)]
    pub mirror_map: BTreeMap<String, String>,
    /// Node-kind name -> type token.
    pub types: BTreeMap<String, String>,
    /// Node-kind name -> token list; must contain `default`.
    pub formats: BTreeMap<String, Vec<NameToken>>,
}

impl NamingConfig {
    /// Token list for a kind, falling back to the `default` format.
    pub fn format_for(&self, kind: &str) -> Option<&[NameToken]> {
        self.formats
            .get(kind)
            .or_else(|| self.formats.get(DEFAULT_KEY))
            .map(Vec::as_slice)
    }

    /// Type token for a kind, falling back to the `default` type.
    pub fn type_token(&self, kind: &str) -> Option<&str> {
        self.types
            .get(kind)
            .or_else(|| self.types.get(DEFAULT_KEY))
            .map(String::as_str)
    }

    pub fn is_valid_location(&self, location: &str) -> bool {
        self.locations.iter().any(|l| l == location)
    }

    /// Opposite-side location code (`L` <-> `R`).
    pub fn mirror_location(&self, location: &str) -> Option<&str> {
        self.mirror_map.get(location).map(String::as_str)
    }
}

fn tokens(list: &[&str]) -> Vec<NameToken> {
    list.iter().map(|&t| NameToken::from(t)).collect()
}

impl Default for NamingConfig {
    fn default() -> Self {
        let types = [
            (DEFAULT_KEY, "null"),
            ("Component", "cmp"),
            ("Container", ""),
            ("Layer", ""),
            ("HierarchyGroup", "hrc"),
            ("SrtBuffer", "srtBuffer"),
            ("Locator", "loc"),
            ("Joint", "def"),
            ("SceneItem", "null"),
            ("Curve", "crv"),
            ("Control", "ctrl"),
            ("OrientationConstraint", "oriCns"),
            ("PoseConstraint", "poseCns"),
            ("PositionConstraint", "posCns"),
            ("ScaleConstraint", "sclCns"),
            ("SolverOperator", "solverOp"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let formats = [
            ("Container", tokens(&["name"])),
            ("Layer", tokens(&["name"])),
            ("Component", tokens(&["name", "sep", "location", "sep", "type"])),
            (DEFAULT_KEY, tokens(&["name", "sep", "location", "sep", "type"])),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let mirror_map = [("L", "R"), ("R", "L"), ("M", "M")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        Self {
            separator: "_".to_string(),
            locations: vec!["L".to_string(), "R".to_string(), "M".to_string()],
            mirror_map,
            types,
            formats,
        }
    }
}
