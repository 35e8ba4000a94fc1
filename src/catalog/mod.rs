//! Query catalogs: which series an exporter fetches and what its CSV
//! columns are called.
//!
//! Query and label text is written as a [`Template`] with a `${target}` slot.
//! Templates are parsed once, so a slot that appears twice in a query is
//! filled twice by construction.

pub mod container;
pub mod istio;
pub mod ncn;

use std::fmt;

use crate::{ExportError, Result};

const SLOT_OPEN: &str = "${";
const SLOT_CLOSE: char = '}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Service name, node instance, or whatever the catalog iterates over.
    Target,
}

impl Slot {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "target" => Some(Slot::Target),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Text(String),
    Slot(Slot),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    parts: Vec<Part>,
}

impl Template {
    /// Parses `text`, treating every `${name}` as a slot. Unknown names and
    /// unterminated slots are rejected.
    pub fn parse(text: &str) -> Result<Self> {
        let mut parts = Vec::new();
        let mut rest = text;

        while let Some(open) = rest.find(SLOT_OPEN) {
            if open > 0 {
                parts.push(Part::Text(rest[..open].to_string()));
            }
            let after = &rest[open + SLOT_OPEN.len()..];
            let close = after.find(SLOT_CLOSE).ok_or_else(|| {
                ExportError::Template(format!("unterminated slot in `{}`", text))
            })?;
            let name = &after[..close];
            let slot = Slot::from_name(name).ok_or_else(|| {
                ExportError::Template(format!("unknown slot `{}` in `{}`", name, text))
            })?;
            parts.push(Part::Slot(slot));
            rest = &after[close + 1..];
        }
        if !rest.is_empty() {
            parts.push(Part::Text(rest.to_string()));
        }

        Ok(Self { parts })
    }

    /// Number of slots the template fills on render.
    pub fn slot_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|p| matches!(p, Part::Slot(_)))
            .count()
    }

    pub fn render(&self, target: &str) -> String {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                Part::Text(text) => out.push_str(text),
                Part::Slot(Slot::Target) => out.push_str(target),
            }
        }
        out
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.parts {
            match part {
                Part::Text(text) => f.write_str(text)?,
                Part::Slot(Slot::Target) => f.write_str("${target}")?,
            }
        }
        Ok(())
    }
}

/// A query template paired with the template for its column label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricTemplate {
    pub query: Template,
    pub label: Template,
}

impl MetricTemplate {
    pub fn parse(query: &str, label: &str) -> Result<Self> {
        Ok(Self {
            query: Template::parse(query)?,
            label: Template::parse(label)?,
        })
    }

    pub fn render(&self, target: &str) -> CatalogEntry {
        CatalogEntry {
            query: self.query.render(target),
            label: self.label.render(target),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub query: String,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn labels(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.label.clone()).collect()
    }
}

impl From<Vec<CatalogEntry>> for Catalog {
    fn from(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }
}

/// Renders every template for every target, targets in the outer loop.
/// Entry `t * templates.len() + i` belongs to `targets[t]` and `templates[i]`.
pub fn build_catalog<S: AsRef<str>>(templates: &[MetricTemplate], targets: &[S]) -> Catalog {
    let entries = targets
        .iter()
        .flat_map(|target| templates.iter().map(move |t| t.render(target.as_ref())))
        .collect();
    Catalog { entries }
}
