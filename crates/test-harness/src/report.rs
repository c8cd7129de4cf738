//! Structured text reports of a build.
//!
//! Plain text rather than JSON so a failing scenario prints something a
//! reader can scan.

use std::fmt;

use cuff_assembly::BuildManifest;

/// A complete build report.
pub struct BuildReport {
    pub templates: Vec<TemplateEntry>,
    pub instances: Vec<InstanceEntry>,
    pub unions: Vec<(String, usize)>,
    pub links: Vec<String>,
    pub point_sources: usize,
}

pub struct TemplateEntry {
    pub pseudonym: String,
    pub part: String,
    pub selections: Vec<String>,
}

pub struct InstanceEntry {
    pub label: String,
    pub id: String,
    pub pseudonym: String,
    pub retained: Vec<String>,
}

impl BuildReport {
    pub fn from_manifest(manifest: &BuildManifest) -> Self {
        Self {
            templates: manifest
                .templates
                .iter()
                .map(|t| TemplateEntry {
                    pseudonym: t.pseudonym.clone(),
                    part: t.part.to_string(),
                    selections: t.catalog.iter().map(|e| e.label.clone()).collect(),
                })
                .collect(),
            instances: manifest
                .instances
                .iter()
                .map(|i| InstanceEntry {
                    label: i.label.clone(),
                    id: i.id.to_string(),
                    pseudonym: i.pseudonym.clone(),
                    retained: i.retained.clone(),
                })
                .collect(),
            unions: manifest
                .unions
                .iter()
                .map(|(label, members)| (label.clone(), members.len()))
                .collect(),
            links: manifest.material_links.iter().map(|l| l.label.clone()).collect(),
            point_sources: manifest.point_sources.len(),
        }
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str("=== Cuff Assembly Report ===\n\n");

        out.push_str(&format!("Templates ({}):\n", self.templates.len()));
        for t in &self.templates {
            out.push_str(&format!("  {} \"{}\"\n", t.part, t.pseudonym));
            for (i, sel) in t.selections.iter().enumerate() {
                out.push_str(&format!("      [{i}] {sel}\n"));
            }
        }

        out.push_str(&format!(
            "\nInstances ({}, {} point sources):\n",
            self.instances.len(),
            self.point_sources
        ));
        for i in &self.instances {
            out.push_str(&format!("  {} \"{}\" of {}\n", i.id, i.label, i.pseudonym));
            if !i.retained.is_empty() {
                out.push_str(&format!("      retained: {}\n", i.retained.join(", ")));
            }
        }

        if !self.unions.is_empty() {
            out.push_str("\nUnions:\n");
            for (label, count) in &self.unions {
                out.push_str(&format!("  {label}: {count} member(s)\n"));
            }
        }

        if !self.links.is_empty() {
            out.push_str(&format!("\nMaterial links ({}):\n", self.links.len()));
            for link in &self.links {
                out.push_str(&format!("  {link}\n"));
            }
        }
        out
    }
}

impl fmt::Display for BuildReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}
