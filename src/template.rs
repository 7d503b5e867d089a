// twrpgen/src/template.rs

//! Device-tree artifact rendering.
//!
//! Templates are embedded into the binary at compile time via `include_str!`
//! and rendered with Handlebars. The renderer is a pure function of template
//! plus context; it knows nothing about fstab semantics.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use handlebars::Handlebars;
use serde::Serialize;

/// Embedded template set. Output file name = template name.
pub const TEMPLATES: &[(&str, &str)] = &[
    ("Android.mk", include_str!("../templates/Android.mk.hbs")),
    ("BoardConfig.mk", include_str!("../templates/BoardConfig.mk.hbs")),
    ("device.mk", include_str!("../templates/device.mk.hbs")),
];

/// Key/value facts the templates are populated with.
#[derive(Debug, Serialize)]
pub struct DeviceContext {
    pub codename: String,
    pub manufacturer: String,
    /// One of `arm64`, `arm`, `x86_64`, `x86`.
    pub arch: String,
    pub has_dtbo: bool,
    pub has_vendor: bool,
    pub has_logical: bool,
}

pub struct TemplateRenderer {
    registry: Handlebars<'static>,
}

impl TemplateRenderer {
    pub fn new() -> Result<Self> {
        let mut registry = Handlebars::new();
        for (name, source) in TEMPLATES {
            registry
                .register_template_string(name, *source)
                .with_context(|| format!("Invalid embedded template {name}"))?;
        }
        Ok(Self { registry })
    }

    pub fn render<T: Serialize>(&self, name: &str, ctx: &T) -> Result<String> {
        self.registry
            .render(name, ctx)
            .with_context(|| format!("Failed to render template {name}"))
    }

    /// Render `name` and write it under `out_dir`, creating the directory if
    /// needed. Returns the path of the written file.
    pub fn render_to_file<T: Serialize>(&self, out_dir: &Path, name: &str, ctx: &T) -> Result<PathBuf> {
        let rendered = self.render(name, ctx)?;
        fs::create_dir_all(out_dir)
            .with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;

        let out_path = out_dir.join(name);
        fs::write(&out_path, rendered)
            .with_context(|| format!("Failed to write {}", out_path.display()))?;
        log::info!("Rendered {}", out_path.display());
        Ok(out_path)
    }
}
