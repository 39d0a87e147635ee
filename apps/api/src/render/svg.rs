//! SVG serialization of a `VectorDocument`.

use std::fmt::Write;

use crate::render::composer::{ImageFit, Primitive, TextAnchor, VectorDocument};

pub fn escape_xml(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn to_svg(doc: &VectorDocument) -> String {
    let mut svg = String::new();
    let mut defs = String::new();
    let mut body = String::new();
    let mut clip_id = 0;

    for primitive in &doc.primitives {
        // Writing into a String cannot fail.
        let _ = match primitive {
            Primitive::Rect {
                x,
                y,
                w,
                h,
                radius,
                fill,
            } => {
                let rounded = if *radius > 0.0 {
                    format!(r#" rx="{radius}" ry="{radius}""#)
                } else {
                    String::new()
                };
                writeln!(
                    body,
                    r#"<rect x="{x}" y="{y}" width="{w}" height="{h}"{rounded} fill="{}"/>"#,
                    escape_xml(fill)
                )
            }
            Primitive::Image {
                x,
                y,
                w,
                h,
                href,
                fit,
                radius,
                clip_path,
            } => {
                let aspect = match fit {
                    ImageFit::Cover => "xMidYMid slice",
                    ImageFit::Contain => "xMidYMid meet",
                };
                let clip = if clip_path.is_some() || *radius > 0.0 {
                    clip_id += 1;
                    let shape = match clip_path {
                        Some(d) => format!(r#"<path d="{d}"/>"#),
                        None => format!(
                            r#"<rect x="{x}" y="{y}" width="{w}" height="{h}" rx="{radius}" ry="{radius}"/>"#
                        ),
                    };
                    let _ = writeln!(defs, r#"<clipPath id="clip-{clip_id}">{shape}</clipPath>"#);
                    format!(r#" clip-path="url(#clip-{clip_id})""#)
                } else {
                    String::new()
                };
                writeln!(
                    body,
                    r#"<image href="{}" x="{x}" y="{y}" width="{w}" height="{h}" preserveAspectRatio="{aspect}"{clip}/>"#,
                    escape_xml(href)
                )
            }
            Primitive::Text {
                x,
                y,
                text,
                font_family,
                font_size,
                font_weight,
                letter_spacing,
                fill,
                anchor,
            } => {
                let anchor = match anchor {
                    TextAnchor::Start => "start",
                    TextAnchor::Middle => "middle",
                };
                let spacing = if *letter_spacing != 0.0 {
                    format!(r#" letter-spacing="{letter_spacing}""#)
                } else {
                    String::new()
                };
                writeln!(
                    body,
                    r#"<text x="{x}" y="{y}" font-family="{}" font-size="{font_size}" font-weight="{font_weight}"{spacing} fill="{}" text-anchor="{anchor}">{}</text>"#,
                    escape_xml(font_family),
                    escape_xml(fill),
                    escape_xml(text)
                )
            }
        };
    }

    let (width, height) = (doc.width, doc.height);
    let _ = writeln!(svg, r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    );
    if !defs.is_empty() {
        let _ = write!(svg, "<defs>\n{defs}</defs>\n");
    }
    svg.push_str(&body);
    svg.push_str("</svg>\n");
    svg
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
