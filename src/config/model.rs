use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::build::{LayoutRegistry, build_config, build_stream_config};
use crate::foundation::error::{LayoutError, LayoutResult};
use crate::layout::composite::CompositeLayout;
use crate::layout::contract::Layout;
use crate::layout::leaf::Field;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ConfigDef {
    #[serde(default)]
    pub(crate) shared: BTreeMap<String, LayoutDef>,
    pub(crate) layout: LayoutDef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub(crate) enum LayoutDef {
    Literal {
        text: String,
    },
    Field {
        field: Field,
    },
    ThreadName,
    Sequence {
        #[serde(default)]
        separator: String,
        parts: Vec<LayoutDef>,
    },
    Composite {
        #[serde(default)]
        header: Option<Box<LayoutDef>>,
        #[serde(default)]
        body: Option<Box<LayoutDef>>,
        #[serde(default)]
        footer: Option<Box<LayoutDef>>,
    },
    Ref {
        name: String,
    },
}

/// JSON description of a layout tree.
///
/// `shared` entries are built once and aliased wherever the main `layout` tree refers to them
/// with `{"kind": "ref", "name": ...}`.
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    def: ConfigDef,
}

impl LayoutConfig {
    /// Parse a layout config from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> LayoutResult<Self> {
        let def: ConfigDef = serde_json::from_reader(r)
            .map_err(|e| LayoutError::serde(format!("parse layout config JSON: {e}")))?;
        Ok(Self { def })
    }

    /// Parse a layout config from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> LayoutResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            LayoutError::io(format!("open layout config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Parse a layout config from a JSON string.
    pub fn from_json_str(s: &str) -> LayoutResult<Self> {
        Self::from_reader(s.as_bytes())
    }

    /// Check structural rules without building anything.
    pub fn validate(&self) -> LayoutResult<()> {
        validate_config(&self.def, &LayoutRegistry::new())
    }

    /// Validate and build the layout tree. The result is not yet initialized.
    pub fn build(&self) -> LayoutResult<Arc<dyn Layout>> {
        self.build_with(&mut LayoutRegistry::new())
    }

    /// Build against a registry that may already hold programmatic layouts.
    ///
    /// Shared entries from the config are added to `registry`.
    pub fn build_with(&self, registry: &mut LayoutRegistry) -> LayoutResult<Arc<dyn Layout>> {
        validate_config(&self.def, registry)?;
        build_config(&self.def, registry)
    }

    /// Validate and build a root for [`crate::StreamTarget`].
    ///
    /// A non-composite root layout is wrapped as the body of a composite without header or footer.
    pub fn build_stream(&self) -> LayoutResult<Arc<CompositeLayout>> {
        self.build_stream_with(&mut LayoutRegistry::new())
    }

    /// [`LayoutConfig::build_stream`] against a pre-seeded registry.
    pub fn build_stream_with(
        &self,
        registry: &mut LayoutRegistry,
    ) -> LayoutResult<Arc<CompositeLayout>> {
        validate_config(&self.def, registry)?;
        build_stream_config(&self.def, registry)
    }
}

pub(crate) fn validate_config(def: &ConfigDef, registry: &LayoutRegistry) -> LayoutResult<()> {
    for (name, shared) in &def.shared {
        if name.trim().is_empty() {
            return Err(LayoutError::configuration("shared layout names must be non-empty"));
        }
        if registry.get(name).is_some() {
            return Err(LayoutError::configuration(format!(
                "shared layout '{name}' is already registered"
            )));
        }
        validate_def(shared, &format!("shared.{name}"), &|_: &str| false)?;
    }

    let known = |name: &str| def.shared.contains_key(name) || registry.get(name).is_some();
    validate_def(&def.layout, "layout", &known)
}

fn validate_def(def: &LayoutDef, path: &str, known: &dyn Fn(&str) -> bool) -> LayoutResult<()> {
    match def {
        LayoutDef::Literal { .. } | LayoutDef::ThreadName => Ok(()),
        LayoutDef::Field { field } => match field {
            Field::Property(name) if name.is_empty() => Err(LayoutError::configuration(format!(
                "{path}: property name must be non-empty"
            ))),
            _ => Ok(()),
        },
        LayoutDef::Sequence { parts, .. } => {
            for (idx, part) in parts.iter().enumerate() {
                validate_def(part, &format!("{path}.parts[{idx}]"), known)?;
            }
            Ok(())
        }
        LayoutDef::Composite {
            header,
            body,
            footer,
        } => {
            let Some(body) = body else {
                return Err(LayoutError::configuration(format!(
                    "{path}: composite layout requires a body"
                )));
            };
            validate_def(body, &format!("{path}.body"), known)?;
            if let Some(header) = header {
                validate_def(header, &format!("{path}.header"), known)?;
            }
            if let Some(footer) = footer {
                validate_def(footer, &format!("{path}.footer"), known)?;
            }
            Ok(())
        }
        LayoutDef::Ref { name } => {
            if known(name) {
                Ok(())
            } else {
                Err(LayoutError::configuration(format!(
                    "{path}: unknown layout reference '{name}'"
                )))
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/model.rs"]
mod tests;
