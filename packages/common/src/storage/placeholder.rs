use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// Background colour of placeholder artifacts.
pub const PLACEHOLDER_FILL: &str = "#E50900";

/// Build a self-contained `data:` URL for a placeholder image.
///
/// The image is a 1024x1024 SVG with a solid fill and `logical_name` drawn in
/// the middle. Characters other than ASCII letters and digits are replaced by
/// spaces so the label never needs escaping.
pub fn placeholder_data_url(logical_name: &str) -> String {
    let label: String = logical_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect();
    let svg = format!(
        concat!(
            r#"<svg width="1024" height="1024" xmlns="http://www.w3.org/2000/svg">"#,
            r#"<rect width="100%" height="100%" fill="{fill}"/>"#,
            r#"<text x="50%" y="50%" font-family="Arial" font-size="48" fill="white" "#,
            r#"text-anchor="middle" dy=".3em">{label}</text>"#,
            "</svg>"
        ),
        fill = PLACEHOLDER_FILL,
        label = label.trim(),
    );
    format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg))
}
