// src/core/diagram/html_index.rs
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use serde::Serialize;
use tera::{Context, Tera};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{UmlError, Result};

const INDEX_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{{ title }}</title>
<style>
body { display: flex; font-family: Arial, sans-serif; }
#fileList { width: 20%; background-color: #f4f4f4; padding: 10px; overflow-y: auto; }
#contentPane { width: 80%; padding: 10px; }
#fileList a { display: block; margin: 5px 0; text-decoration: none; color: #333; }
#fileList a:hover { text-decoration: underline; }
img { max-width: 100%; height: auto; }
</style>
</head>
<body>
<div id="fileList">
{% for image in images %}<a href="#{{ image.anchor }}">{{ image.name }}</a>
{% endfor %}</div>
<div id="contentPane">
{% for image in images %}<h2 id="{{ image.anchor }}">{{ image.name }}</h2>
<img src="images/{{ image.name }}" alt="{{ image.name }}">
{% endfor %}</div>
</body>
</html>
"##;

const IMAGE_EXTENSIONS: &[&str] = &["png", "svg", "jpg"];

#[derive(Debug, Clone, Serialize)]
struct ImageEntry {
    name: String,
    anchor: String,
}

/// Builds a single browsable page over all rendered diagrams
pub struct HtmlIndexGenerator {
    tera: Tera,
}

impl HtmlIndexGenerator {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_template("index.html", INDEX_TEMPLATE)?;
        Ok(Self { tera })
    }

    /// Copy every image under `output_dir` into `<html_dir>/images` and write
    /// `<html_dir>/index.html`
    pub fn generate(&self, project_name: &str, output_dir: &Path, html_dir: &Path) -> Result<PathBuf> {
        if !output_dir.is_dir() {
            return Err(UmlError::FileSystem(format!(
                "The output directory does not exist or is not a directory: {}",
                output_dir.display()
            )));
        }

        let images_dir = html_dir.join("images");
        std::fs::create_dir_all(&images_dir)?;

        let images = find_images(output_dir, html_dir);
        let mut entries = Vec::with_capacity(images.len());
        let mut used = HashSet::new();
        for image in &images {
            let Some(name) = unique_image_name(image, &mut used) else {
                continue;
            };
            std::fs::copy(image, images_dir.join(&name))?;
            debug!("Copied {} into the HTML index", name);
            entries.push(ImageEntry { anchor: name.replace(|c: char| !c.is_ascii_alphanumeric(), "-"), name });
        }

        let mut context = Context::new();
        context.insert("title", &format!("{} UML Diagrams", project_name));
        context.insert("images", &entries);
        let html = self.tera.render("index.html", &context)?;

        let index = html_dir.join("index.html");
        std::fs::write(&index, html)?;
        info!("HTML documentation generated at {} ({} images)", index.display(), entries.len());
        Ok(index)
    }
}

/// File name for `image` inside the flat images directory; later images that
/// share a name get `_2`, `_3`, ... before the extension
fn unique_image_name(image: &Path, used: &mut HashSet<String>) -> Option<String> {
    let name = image.file_name()?.to_string_lossy().to_string();
    if used.insert(name.clone()) {
        return Some(name);
    }
    let stem = image.file_stem()?.to_string_lossy().to_string();
    let ext = image.extension().map(|e| e.to_string_lossy().to_string()).unwrap_or_default();
    let mut n = 2;
    loop {
        let candidate = format!("{}_{}.{}", stem, n, ext);
        if used.insert(candidate.clone()) {
            return Some(candidate);
        }
        n += 1;
    }
}

/// Images under `dir`, sorted by path, skipping anything already inside the
/// HTML directory
fn find_images(dir: &Path, html_dir: &Path) -> Vec<PathBuf> {
    let mut images: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| !path.starts_with(html_dir))
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map_or(false, |ext| IMAGE_EXTENSIONS.contains(&ext))
        })
        .collect();
    images.sort();
    images
}
