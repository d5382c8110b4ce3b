//! Edit flow pages: choose tone and border, preview and pick a size,
//! then confirm the upload.

use pixly_core::{Border, EditParams, ImageSize, Tone};
use pixly_db::models::Image;

use super::{layout, options, PageContext};
use crate::flash::Flash;

const EDIT_FORM: &str = r#"<h1>Edit {name}</h1>
<div class="preview"><img src="{url}" alt="{name}"></div>
<form method="POST" action="/image/{id}/edit">
<label for="tone">Tone</label>
<select id="tone" name="tone">
{tone_options}</select>
<label for="border">Border</label>
<select id="border" name="border">
{border_options}</select>
<p><button type="submit">Preview Edit</button></p>
</form>
<p><a href="/image/{id}">Back to image</a></p>
"#;

pub fn edit_form(image: &Image, current: &EditParams, flashes: &[Flash]) -> String {
    let content = PageContext::new()
        .with_text("id", image.id.to_string())
        .with_text("name", &image.image_name)
        .with_text("url", &image.storage_url)
        .with_html("tone_options", tone_options(current.tone))
        .with_html("border_options", border_options(current.border))
        .substitute(EDIT_FORM);
    layout(&format!("Edit {}", image.image_name), flashes, &content)
}

const PREVIEW: &str = r#"<h1>Preview: {name}</h1>
<div class="preview"><img src="/image/{id}/render?{render_query}" alt="Edited {name}"></div>
<p>Tone: {tone_label} | Border: {border_label}</p>
<form method="GET" action="/uploadedit">
<input type="hidden" name="image_id" value="{id}">
<input type="hidden" name="tone" value="{tone}">
<input type="hidden" name="border" value="{border}">
<label for="size">Image Size</label>
<select id="size" name="size">
{size_options}</select>
<p><button type="submit">Upload Changes</button></p>
</form>
<p><a href="/image/{id}/edit">Back to edit</a></p>
"#;

/// Preview of a tone/border edit with the size choice still open.
pub fn preview(image: &Image, params: &EditParams, flashes: &[Flash]) -> String {
    let content = PageContext::new()
        .with_text("id", image.id.to_string())
        .with_text("name", &image.image_name)
        .with_text("render_query", params.to_query())
        .with_text("tone", params.tone.as_str())
        .with_text("border", params.border.as_str())
        .with_text("tone_label", params.tone.label())
        .with_text("border_label", params.border.label())
        .with_html("size_options", size_options(params.size))
        .substitute(PREVIEW);
    layout("Preview Edit", flashes, &content)
}

const UPLOAD_EDIT: &str = r#"<div class="photo-details">
<h1>Upload Edited Image</h1>
{summary}
</div>
<form method="POST" action="/uploadedit">
{hidden}<p><button type="submit">Upload Image!</button></p>
</form>
"#;

const STAGED: &str = r#"<div class="preview"><img src="/image/{id}/render?{render_query}" alt="Edited {name}"></div>
<dl>
<dt>Image</dt><dd><a href="/image/{id}">{name}</a></dd>
<dt>Tone</dt><dd>{tone_label}</dd>
<dt>Border</dt><dd>{border_label}</dd>
<dt>Size</dt><dd>{size_label}</dd>
</dl>
"#;

/// Final confirmation step; `staged` is absent when no edit was carried in.
pub fn upload_edit(staged: Option<(&Image, &EditParams)>, flashes: &[Flash]) -> String {
    let (summary, hidden) = match staged {
        Some((image, params)) => {
            let summary = PageContext::new()
                .with_text("id", image.id.to_string())
                .with_text("name", &image.image_name)
                .with_text("render_query", params.to_query())
                .with_text("tone_label", params.tone.label())
                .with_text("border_label", params.border.label())
                .with_text("size_label", params.size.label())
                .substitute(STAGED);
            let hidden = PageContext::new()
                .with_text("id", image.id.to_string())
                .with_text("tone", params.tone.as_str())
                .with_text("border", params.border.as_str())
                .with_text("size", params.size.as_str())
                .substitute(
                    "<input type=\"hidden\" name=\"image_id\" value=\"{id}\">\n\
                     <input type=\"hidden\" name=\"tone\" value=\"{tone}\">\n\
                     <input type=\"hidden\" name=\"border\" value=\"{border}\">\n\
                     <input type=\"hidden\" name=\"size\" value=\"{size}\">\n",
                );
            (summary, hidden)
        }
        None => (
            "<p class=\"empty\">No edit is staged. Pick an image from the \
             <a href=\"/\">catalog</a> and edit it first.</p>"
                .to_string(),
            String::new(),
        ),
    };

    let content = PageContext::new()
        .with_html("summary", summary)
        .with_html("hidden", hidden)
        .substitute(UPLOAD_EDIT);
    layout("Upload Edit", flashes, &content)
}

fn tone_options(selected: Tone) -> String {
    options(&Tone::ALL, selected, |t| t.as_str(), |t| t.label())
}

fn border_options(selected: Border) -> String {
    options(&Border::ALL, selected, |b| b.as_str(), |b| b.label())
}

fn size_options(selected: ImageSize) -> String {
    options(&ImageSize::ALL, selected, |s| s.as_str(), |s| s.label())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixly_core::ImageId;

    fn image() -> Image {
        Image {
            id: ImageId::new(),
            image_name: "sunset".into(),
            uploaded_by: "ana".into(),
            notes: String::new(),
            filename: "sunset.png".into(),
            storage_url: "/media/x/sunset.png".into(),
            created_at: "2024-01-01T00:00:00Z".into(),
            updated_at: "2024-01-01T00:00:00Z".into(),
        }
    }

    #[test]
    fn edit_form_marks_current_choices() {
        let params = EditParams {
            tone: Tone::Sepia,
            border: Border::Thick,
            ..EditParams::default()
        };
        let html = edit_form(&image(), &params, &[]);
        assert!(html.contains("<form method=\"POST\""));
        assert!(html.contains(">Tone</label>"));
        assert!(html.contains(">Border</label>"));
        assert!(html.contains(r#"<option value="sepia" selected>"#));
        assert!(html.contains(r#"<option value="thick" selected>"#));
        assert!(html.contains(r#"<option value="original">"#));
    }

    #[test]
    fn preview_points_at_upload_edit() {
        let img = image();
        let params = EditParams {
            tone: Tone::Cool,
            border: Border::Thin,
            ..EditParams::default()
        };
        let html = preview(&img, &params, &[]);
        assert!(html.contains(r#"action="/uploadedit""#));
        assert!(html.contains("Image Size"));
        assert!(html.contains("Upload Changes"));
        assert!(html.contains(&format!(
            "/image/{}/render?tone=cool&amp;border=thin&amp;size=original",
            img.id
        )));
        assert!(html.contains(r#"name="tone" value="cool""#));
    }

    #[test]
    fn upload_edit_with_and_without_staged_edit() {
        let html = upload_edit(None, &[]);
        assert!(html.contains("<form method=\"POST\""));
        assert!(html.contains("photo-details"));
        assert!(html.contains("Upload Image!"));
        assert!(html.contains("No edit is staged"));

        let img = image();
        let params = EditParams {
            size: ImageSize::Small,
            ..EditParams::default()
        };
        let html = upload_edit(Some((&img, &params)), &[]);
        assert!(html.contains(&format!(r#"name="image_id" value="{}""#, img.id)));
        assert!(html.contains(r#"name="size" value="small""#));
        assert!(html.contains("Small (300px)"));
    }
}
