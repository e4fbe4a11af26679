//! The transformation catalog: every built-in plugin as a typed variant,
//! plus an opaque `Custom` variant for caller-defined descriptors.

use serde::Deserialize;
use serde_json::Value;

use crate::error::SvoptError;

/// Configuration for `convertPathData`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathDataConfig {
    /// Decimal places kept in coordinates.
    pub precision: u8,
}

impl Default for PathDataConfig {
    fn default() -> Self {
        Self { precision: 2 }
    }
}

/// Configuration for `removeAttrs`.
///
/// Patterns are attribute names, with a trailing `*` allowed as a prefix
/// wildcard (`data-*`). Fill- and stroke-related attributes are never
/// removed, whatever the patterns say.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RemoveAttrsConfig {
    pub patterns: Vec<String>,
}

impl Default for RemoveAttrsConfig {
    fn default() -> Self {
        Self {
            patterns: vec!["class".into(), "data-name".into(), "data-*".into()],
        }
    }
}

/// A transformation from the catalog.
///
/// Identity is the catalog name (see [`Plugin::name`]); two values with the
/// same name are the same transformation under the engine's
/// last-occurrence-wins override rule, even when their configs differ.
#[derive(Debug, Clone, PartialEq)]
pub enum Plugin {
    RemoveComments,
    RemoveDoctype,
    RemoveXmlProcInst,
    RemoveMetadata,
    RemoveTitle,
    RemoveDesc,
    RemoveEditorsNsData,
    RemoveEmptyAttrs,
    RemoveHiddenElems,
    RemoveEmptyText,
    RemoveEmptyContainers,
    ConvertStyleToAttrs,
    ConvertColors,
    ConvertPathData(PathDataConfig),
    ConvertTransform,
    RemoveUnknownsAndDefaults,
    RemoveNonInheritableGroupAttrs,
    RemoveUselessStrokeAndFill,
    MergePaths,
    RemoveDimensions,
    RemoveViewBox,
    SortAttrs,
    RemoveAttrs(RemoveAttrsConfig),
    /// A caller-defined transformation, carried verbatim. The engine has no
    /// executor for these; an active one is an unknown-transformation error.
    Custom {
        name: String,
        params: serde_json::Map<String, Value>,
    },
}

impl Plugin {
    /// The catalog name, which is also the plugin's identity.
    pub fn name(&self) -> &str {
        match self {
            Plugin::RemoveComments => "removeComments",
            Plugin::RemoveDoctype => "removeDoctype",
            Plugin::RemoveXmlProcInst => "removeXMLProcInst",
            Plugin::RemoveMetadata => "removeMetadata",
            Plugin::RemoveTitle => "removeTitle",
            Plugin::RemoveDesc => "removeDesc",
            Plugin::RemoveEditorsNsData => "removeEditorsNSData",
            Plugin::RemoveEmptyAttrs => "removeEmptyAttrs",
            Plugin::RemoveHiddenElems => "removeHiddenElems",
            Plugin::RemoveEmptyText => "removeEmptyText",
            Plugin::RemoveEmptyContainers => "removeEmptyContainers",
            Plugin::ConvertStyleToAttrs => "convertStyleToAttrs",
            Plugin::ConvertColors => "convertColors",
            Plugin::ConvertPathData(_) => "convertPathData",
            Plugin::ConvertTransform => "convertTransform",
            Plugin::RemoveUnknownsAndDefaults => "removeUnknownsAndDefaults",
            Plugin::RemoveNonInheritableGroupAttrs => "removeNonInheritableGroupAttrs",
            Plugin::RemoveUselessStrokeAndFill => "removeUselessStrokeAndFill",
            Plugin::MergePaths => "mergePaths",
            Plugin::RemoveDimensions => "removeDimensions",
            Plugin::RemoveViewBox => "removeViewBox",
            Plugin::SortAttrs => "sortAttrs",
            Plugin::RemoveAttrs(_) => "removeAttrs",
            Plugin::Custom { name, .. } => name,
        }
    }

    /// Build a plugin from a descriptor name and optional parameter value.
    /// Unknown names become [`Plugin::Custom`], carried verbatim; parameters
    /// of known plugins must match that plugin's typed config.
    pub fn from_descriptor(name: &str, params: Option<Value>) -> Result<Plugin, SvoptError> {
        fn config<T: Default + for<'de> Deserialize<'de>>(
            params: Option<Value>,
        ) -> Result<T, serde_json::Error> {
            match params {
                Some(v) => serde_json::from_value(v),
                None => Ok(T::default()),
            }
        }

        Ok(match name {
            "removeComments" => Plugin::RemoveComments,
            "removeDoctype" => Plugin::RemoveDoctype,
            "removeXMLProcInst" => Plugin::RemoveXmlProcInst,
            "removeMetadata" => Plugin::RemoveMetadata,
            "removeTitle" => Plugin::RemoveTitle,
            "removeDesc" => Plugin::RemoveDesc,
            "removeEditorsNSData" => Plugin::RemoveEditorsNsData,
            "removeEmptyAttrs" => Plugin::RemoveEmptyAttrs,
            "removeHiddenElems" => Plugin::RemoveHiddenElems,
            "removeEmptyText" => Plugin::RemoveEmptyText,
            "removeEmptyContainers" => Plugin::RemoveEmptyContainers,
            "convertStyleToAttrs" => Plugin::ConvertStyleToAttrs,
            "convertColors" => Plugin::ConvertColors,
            "convertPathData" => Plugin::ConvertPathData(config(params)?),
            "convertTransform" => Plugin::ConvertTransform,
            "removeUnknownsAndDefaults" => Plugin::RemoveUnknownsAndDefaults,
            "removeNonInheritableGroupAttrs" => Plugin::RemoveNonInheritableGroupAttrs,
            "removeUselessStrokeAndFill" => Plugin::RemoveUselessStrokeAndFill,
            "mergePaths" => Plugin::MergePaths,
            "removeDimensions" => Plugin::RemoveDimensions,
            "removeViewBox" => Plugin::RemoveViewBox,
            "sortAttrs" => Plugin::SortAttrs,
            "removeAttrs" => Plugin::RemoveAttrs(config(params)?),
            _ => Plugin::Custom {
                name: name.to_string(),
                params: match params {
                    Some(Value::Object(map)) => map,
                    Some(other) => {
                        let mut map = serde_json::Map::new();
                        map.insert("value".into(), other);
                        map
                    }
                    None => serde_json::Map::new(),
                },
            },
        })
    }
}

/// A plugin plus its enabled flag: one entry of an ordered plugin list.
/// Lists may repeat a name; order is significant and later entries override
/// earlier ones with the same name.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginSpec {
    pub plugin: Plugin,
    pub active: bool,
}

impl PluginSpec {
    pub fn enabled(plugin: Plugin) -> Self {
        Self {
            plugin,
            active: true,
        }
    }

    pub fn disabled(plugin: Plugin) -> Self {
        Self {
            plugin,
            active: false,
        }
    }

    /// Parse a JSON descriptor: `{"name": "...", "params": {...}, "active": bool}`
    /// (`params` and `active` optional, `active` defaults to true).
    pub fn from_json(json: &str) -> Result<PluginSpec, SvoptError> {
        #[derive(Deserialize)]
        #[serde(deny_unknown_fields)]
        struct RawDescriptor {
            name: String,
            #[serde(default)]
            params: Option<Value>,
            #[serde(default = "default_true")]
            active: bool,
        }
        fn default_true() -> bool {
            true
        }

        let raw: RawDescriptor = serde_json::from_str(json)?;
        Ok(PluginSpec {
            plugin: Plugin::from_descriptor(&raw.name, raw.params)?,
            active: raw.active,
        })
    }
}

/// The safe tier: structural and metadata cleanup that cannot change
/// rendering. Order is fixed; later passes assume earlier ones already ran
/// (mergePaths relies on attribute cleanup, removeEmptyContainers on the
/// element removals before it).
pub fn safe_tier() -> Vec<Plugin> {
    vec![
        Plugin::RemoveComments,
        Plugin::RemoveDoctype,
        Plugin::RemoveXmlProcInst,
        Plugin::RemoveMetadata,
        Plugin::RemoveTitle,
        Plugin::RemoveDesc,
        Plugin::RemoveEditorsNsData,
        Plugin::RemoveEmptyAttrs,
        Plugin::RemoveHiddenElems,
        Plugin::RemoveEmptyText,
        Plugin::RemoveEmptyContainers,
        Plugin::ConvertStyleToAttrs,
        Plugin::ConvertColors,
        Plugin::ConvertPathData(PathDataConfig::default()),
        Plugin::ConvertTransform,
        Plugin::RemoveUnknownsAndDefaults,
        Plugin::RemoveNonInheritableGroupAttrs,
        Plugin::RemoveUselessStrokeAndFill,
        Plugin::MergePaths,
        Plugin::RemoveDimensions,
    ]
}

/// The aggressive tier, appended after the safe tier: trades small visual
/// risk for size. Attribute sorting runs after all attribute cleanup.
pub fn aggressive_tier() -> Vec<Plugin> {
    vec![
        Plugin::SortAttrs,
        Plugin::RemoveAttrs(RemoveAttrsConfig::default()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_round_trip_names() {
        for plugin in safe_tier().into_iter().chain(aggressive_tier()) {
            let rebuilt = Plugin::from_descriptor(plugin.name(), None).unwrap();
            assert_eq!(rebuilt.name(), plugin.name());
        }
    }

    #[test]
    fn json_descriptor_defaults_active() {
        let spec = PluginSpec::from_json(r#"{"name": "removeComments"}"#).unwrap();
        assert!(spec.active);
        assert_eq!(spec.plugin, Plugin::RemoveComments);
    }

    #[test]
    fn json_descriptor_with_params() {
        let spec =
            PluginSpec::from_json(r#"{"name": "convertPathData", "params": {"precision": 4}}"#)
                .unwrap();
        assert_eq!(
            spec.plugin,
            Plugin::ConvertPathData(PathDataConfig { precision: 4 })
        );
    }

    #[test]
    fn json_descriptor_unknown_name_is_custom() {
        let spec =
            PluginSpec::from_json(r#"{"name": "myPlugin", "params": {"k": 1}, "active": false}"#)
                .unwrap();
        assert!(!spec.active);
        match spec.plugin {
            Plugin::Custom { name, params } => {
                assert_eq!(name, "myPlugin");
                assert_eq!(params.get("k"), Some(&Value::from(1)));
            }
            other => panic!("expected custom plugin, got {:?}", other),
        }
    }

    #[test]
    fn json_descriptor_rejects_bad_json() {
        assert!(PluginSpec::from_json("{not json").is_err());
        assert!(PluginSpec::from_json(r#"{"params": {}}"#).is_err());
    }

    #[test]
    fn tier_contents() {
        let safe = safe_tier();
        assert_eq!(safe.first().unwrap().name(), "removeComments");
        assert_eq!(safe.last().unwrap().name(), "removeDimensions");
        assert!(!safe.iter().any(|p| p.name() == "removeViewBox"));
        assert!(!safe.iter().any(|p| p.name() == "sortAttrs"));
        assert_eq!(aggressive_tier().first().unwrap().name(), "sortAttrs");
    }
}
