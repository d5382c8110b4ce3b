//! Catalog pages: listing/search, upload form and image detail.

use pixly_db::models::{Image, ImageMetadata};

use super::{escape, layout, PageContext};
use crate::flash::Flash;

const HOME: &str = r#"<h1>Image Catalog</h1>
<form method="GET" action="/" class="search">
<input type="search" name="search" value="{search}" placeholder="Search by name, notes or metadata">
<button type="submit">Search</button>
</form>
{summary}
{results}
"#;

/// Listing page, optionally filtered by `search`.
pub fn home(images: &[Image], search: Option<&str>, flashes: &[Flash]) -> String {
    let search = search.unwrap_or("");

    let summary = if search.is_empty() {
        String::new()
    } else {
        format!(
            "<p class=\"summary\">{} result(s) for &quot;{}&quot; <a href=\"/\">Clear</a></p>",
            images.len(),
            escape(search)
        )
    };

    let results = if images.is_empty() {
        "<p class=\"empty\">No images found</p>".to_string()
    } else {
        let items: String = images.iter().map(gallery_item).collect();
        format!("<ul class=\"gallery\">\n{items}</ul>")
    };

    let content = PageContext::new()
        .with_text("search", search)
        .with_html("summary", summary)
        .with_html("results", results)
        .substitute(HOME);
    layout("Catalog", flashes, &content)
}

fn gallery_item(image: &Image) -> String {
    PageContext::new()
        .with_text("id", image.id.to_string())
        .with_text("name", &image.image_name)
        .with_text("url", &image.storage_url)
        .with_text("uploaded_by", &image.uploaded_by)
        .substitute(
            "<li><a href=\"/image/{id}\"><img src=\"{url}\" alt=\"{name}\" loading=\"lazy\">\
             <span class=\"name\">{name}</span></a> <span class=\"by\">by {uploaded_by}</span></li>\n",
        )
}

const ADD_IMAGE: &str = r#"<h1>Upload a New Image</h1>
<form method="POST" action="/addimage" enctype="multipart/form-data">
<label for="image_name">Image name</label>
<input id="image_name" name="image_name" required>
<label for="uploaded_by">Uploaded by</label>
<input id="uploaded_by" name="uploaded_by">
<label for="notes">Notes</label>
<textarea id="notes" name="notes" rows="4"></textarea>
<label for="file">Image file</label>
<input id="file" type="file" name="file" accept="image/*" required>
<p><button type="submit">Upload</button></p>
</form>
"#;

pub fn add_image(flashes: &[Flash]) -> String {
    layout("Add Image", flashes, ADD_IMAGE)
}

const DETAIL: &str = r#"<div class="photo-details">
<h1>{name}</h1>
<img src="{url}" alt="{name}">
<dl>
<dt>Uploaded by</dt><dd>{uploaded_by}</dd>
<dt>Filename</dt><dd>{filename}</dd>
<dt>Notes</dt><dd>{notes}</dd>
<dt>Added</dt><dd>{created_at}</dd>
<dt>Updated</dt><dd>{updated_at}</dd>
</dl>
<p class="actions"><a href="/image/{id}/edit">Edit Image</a></p>
<form method="POST" action="/image/{id}/delete">
<button type="submit">Delete Image</button>
</form>
</div>
<h2>Metadata</h2>
{metadata}
<form method="POST" action="/image/{id}/metadata" class="metadata-form">
<label for="meta_name">Name</label>
<input id="meta_name" name="name" required>
<label for="meta_value">Value</label>
<input id="meta_value" name="value">
<p><button type="submit">Add Metadata</button></p>
</form>
"#;

/// Detail page for one image and its annotations.
pub fn detail(image: &Image, metadata: &[ImageMetadata], flashes: &[Flash]) -> String {
    let content = PageContext::new()
        .with_text("id", image.id.to_string())
        .with_text("name", &image.image_name)
        .with_text("url", &image.storage_url)
        .with_text("uploaded_by", &image.uploaded_by)
        .with_text("filename", &image.filename)
        .with_text("notes", &image.notes)
        .with_text("created_at", &image.created_at)
        .with_text("updated_at", &image.updated_at)
        .with_html("metadata", metadata_table(image, metadata))
        .substitute(DETAIL);
    layout(&image.image_name, flashes, &content)
}

fn metadata_table(image: &Image, metadata: &[ImageMetadata]) -> String {
    if metadata.is_empty() {
        return "<p class=\"empty\">No metadata</p>".to_string();
    }

    let rows: String = metadata
        .iter()
        .map(|m| {
            PageContext::new()
                .with_text("image_id", image.id.to_string())
                .with_text("id", m.id.to_string())
                .with_text("name", &m.name)
                .with_text("value", &m.value)
                .substitute(
                    "<tr><td>{name}</td><td>{value}</td><td>\
                     <form method=\"POST\" action=\"/image/{image_id}/metadata/{id}/delete\">\
                     <button type=\"submit\">Remove</button></form></td></tr>\n",
                )
        })
        .collect();

    format!(
        "<table class=\"metadata\">\n<tr><th>Name</th><th>Value</th><th></th></tr>\n{rows}</table>"
    )
}
