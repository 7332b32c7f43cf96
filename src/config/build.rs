use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::model::{ConfigDef, LayoutDef};
use crate::foundation::error::{LayoutError, LayoutResult};
use crate::layout::composite::CompositeLayout;
use crate::layout::contract::Layout;
use crate::layout::leaf::{FieldLayout, LiteralLayout, ThreadNameLayout};
use crate::layout::sequence::SequenceLayout;

/// Named layouts that config trees can reference.
///
/// Every lookup of the same name returns the same `Arc`, so a shared layout is a single instance
/// no matter how many composites point at it.
#[derive(Debug, Default)]
pub struct LayoutRegistry {
    entries: BTreeMap<String, Arc<dyn Layout>>,
}

impl LayoutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `layout` under `name`. Names are unique.
    pub fn register(&mut self, name: impl Into<String>, layout: Arc<dyn Layout>) -> LayoutResult<()> {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return Err(LayoutError::configuration(format!(
                "layout '{name}' is already registered"
            )));
        }
        self.entries.insert(name, layout);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Layout>> {
        self.entries.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub(crate) fn build_config(
    def: &ConfigDef,
    registry: &mut LayoutRegistry,
) -> LayoutResult<Arc<dyn Layout>> {
    register_shared(def, registry)?;
    build_def(&def.layout, registry)
}

/// Build a root suitable for an output stream: a composite root is kept as is, any other root
/// becomes the body of a header-less, footer-less composite.
pub(crate) fn build_stream_config(
    def: &ConfigDef,
    registry: &mut LayoutRegistry,
) -> LayoutResult<Arc<CompositeLayout>> {
    register_shared(def, registry)?;
    let root = match &def.layout {
        LayoutDef::Composite {
            header,
            body,
            footer,
        } => build_composite(header.as_deref(), body.as_deref(), footer.as_deref(), registry)?,
        other => CompositeLayout::new(build_def(other, registry)?),
    };
    Ok(Arc::new(root))
}

fn register_shared(def: &ConfigDef, registry: &mut LayoutRegistry) -> LayoutResult<()> {
    for (name, shared) in &def.shared {
        let layout = build_def(shared, registry)?;
        tracing::debug!(name = %name, layout = %layout.id(), kind = layout.kind(), "registered shared layout");
        registry.register(name.clone(), layout)?;
    }
    Ok(())
}

fn build_composite(
    header: Option<&LayoutDef>,
    body: Option<&LayoutDef>,
    footer: Option<&LayoutDef>,
    registry: &LayoutRegistry,
) -> LayoutResult<CompositeLayout> {
    let mut layout = CompositeLayout::unbound();
    if let Some(body) = body {
        layout = layout.with_body(build_def(body, registry)?);
    }
    if let Some(header) = header {
        layout = layout.with_header(build_def(header, registry)?);
    }
    if let Some(footer) = footer {
        layout = layout.with_footer(build_def(footer, registry)?);
    }
    Ok(layout)
}

fn build_def(def: &LayoutDef, registry: &LayoutRegistry) -> LayoutResult<Arc<dyn Layout>> {
    let layout: Arc<dyn Layout> = match def {
        LayoutDef::Literal { text } => Arc::new(LiteralLayout::new(text.clone())),
        LayoutDef::Field { field } => Arc::new(FieldLayout::new(field.clone())),
        LayoutDef::ThreadName => Arc::new(ThreadNameLayout::new()),
        LayoutDef::Sequence { separator, parts } => {
            let parts = parts
                .iter()
                .map(|p| build_def(p, registry))
                .collect::<LayoutResult<Vec<_>>>()?;
            Arc::new(SequenceLayout::new(parts).with_separator(separator.clone()))
        }
        LayoutDef::Composite {
            header,
            body,
            footer,
        } => Arc::new(build_composite(
            header.as_deref(),
            body.as_deref(),
            footer.as_deref(),
            registry,
        )?),
        LayoutDef::Ref { name } => registry.get(name).cloned().ok_or_else(|| {
            LayoutError::configuration(format!("unknown layout reference '{name}'"))
        })?,
    };
    Ok(layout)
}

#[cfg(test)]
#[path = "../../tests/unit/config/build.rs"]
mod tests;
