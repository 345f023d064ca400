//! Assembly of the background test page: font faces, the embedded image and
//! the layout markup around them.

use crate::Result;
use base64::Engine as Base64Engine;
use log::debug;
use std::io::ErrorKind;
use std::path::Path;

/// One `@font-face` declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontFace {
    pub family: String,
    pub src: String,
    pub format: String,
    pub weight: u16,
    pub style: String,
}

impl FontFace {
    fn woff2(family: &str, src: &str) -> Self {
        Self {
            family: family.to_string(),
            src: src.to_string(),
            format: "woff2".to_string(),
            weight: 400,
            style: "normal".to_string(),
        }
    }
}

/// The heading face first, then the body face.
pub fn default_font_faces() -> Vec<FontFace> {
    vec![
        FontFace::woff2(
            "Audiowide",
            "https://fonts.gstatic.com/s/audiowide/v9/l7gdbjpo0cum0ckerdtama.woff2",
        ),
        FontFace::woff2(
            "Rajdhani",
            "https://fonts.gstatic.com/s/rajdhani/v10/LDIxapCSOBg7z1y0fUBxlA.woff2",
        ),
    ]
}

/// Render the faces as CSS. The URLs are left to the browser to fetch.
pub fn font_face_css(faces: &[FontFace]) -> String {
    let mut css = String::new();
    for face in faces {
        css.push_str(&format!(
            "@font-face {{\n  font-family: '{}';\n  src: url(\"{}\") format('{}');\n  font-weight: {};\n  font-style: {};\n}}\n",
            face.family, face.src, face.format, face.weight, face.style
        ));
    }
    css
}

/// MIME type for an image path, judged by extension.
pub fn image_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/jpeg",
    }
}

/// Read `path` into a `data:` URL.
///
/// Returns `Ok(None)` when the file does not exist; every other I/O failure
/// is an error.
pub fn image_data_url(path: &Path) -> Result<Option<String>> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    debug!("Encoding {} ({} bytes)", path.display(), bytes.len());
    let b64 = Base64Engine::encode(&base64::engine::general_purpose::STANDARD, &bytes);
    Ok(Some(format!("data:{};base64,{}", image_mime(path), b64)))
}

/// Build the full page: blurred, darkened background image under a radial
/// vignette, with a centred heading on top.
///
/// `heading` is inserted as markup, not escaped.
pub fn build_document(css: &str, image_src: &str, heading: &str) -> String {
    let template = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Timer Page Test</title>
    <style>
{{CSS}}
        body {
            margin: 0;
            padding: 0;
            min-height: 100vh;
            background-color: #000;
            color: white;
            font-family: 'Rajdhani', sans-serif;
        }
    </style>
</head>
<body>
    <div id="background" style="position: fixed; inset: 0; z-index: 0;">
        <img src="{{IMAGE_SRC}}" style="width: 100%; height: 100%; object-fit: cover; filter: blur(10px) brightness(0.6);" />
        <div style="position: absolute; inset: 0; background: radial-gradient(circle at center, transparent 0%, #050505 100%); opacity: 0.6;"></div>
    </div>

    <div id="content" style="position: relative; z-index: 10; padding: 50px; text-align: center;">
        <h1 style="font-family: 'Audiowide'; font-size: 3rem; color: #00f3ff;">{{HEADING}}</h1>
    </div>
</body>
</html>
"#;

    // Substitute markers instead of format! so the CSS braces need no escaping.
    // The image goes last: a data URL cannot contain the other markers.
    template
        .replace("{{CSS}}", css)
        .replace("{{HEADING}}", heading)
        .replace("{{IMAGE_SRC}}", image_src)
}
