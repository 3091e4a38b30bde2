//! HTML preview of the resume sheet.
//!
//! All user text goes through `escape_html`. The sheet is what the client
//! rasterizes for export, so its markup and print CSS are sized for A4.

use crate::resume::models::ResumeForm;

const PRINT_CSS: &str = r#"
@page { size: A4; margin: 18mm; }
html, body { height: 100%; margin: 0; padding: 0; }
body { font-family: 'Montserrat', Arial, sans-serif; color: #222; -webkit-print-color-adjust: exact; }
.resume-sheet { width: 210mm; min-height: 297mm; box-sizing: border-box; padding: 18mm; background: #fff; color: #111; font-size: 11.5pt; line-height: 1.35; }
.resume-header { display: flex; justify-content: space-between; text-align: left; margin-bottom: 8px; }
.name { font-size: 24px; margin: 0 0 4px 0; letter-spacing: 0.4px; }
.contact { font-size: 11pt; color: #555; margin-bottom: 10px; }
.photo { width: 96px; height: 96px; object-fit: cover; border-radius: 50%; }
.section-title { font-size: 12.5px; margin: 12px 0 6px 0; color: #0a3f66; text-transform: uppercase; letter-spacing: 0.6px; }
.section p { margin: 0 0 8px 0; font-size: 15px; }
.education-list, .skills-list { margin: 0 0 8px 0; padding-left: 18px; }
"#;

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn multiline(s: &str) -> String {
    escape_html(s).replace('\n', "<br>")
}

/// Builds the `.resume-sheet` fragment. `photo_url` is inserted as-is into the
/// `src` attribute after escaping.
pub fn build_resume_html(form: &ResumeForm, photo_url: Option<&str>) -> String {
    let form = form.normalized();
    let mut html = String::with_capacity(2048);

    html.push_str("<div class=\"resume-sheet\">\n");
    html.push_str("<header class=\"resume-header\">\n<div class=\"header-left\">\n");
    html.push_str(&format!(
        "<h1 class=\"name\">{}</h1>\n",
        escape_html(&form.display_name())
    ));
    html.push_str(&format!(
        "<div class=\"contact\">{} &nbsp; | &nbsp; {}</div>\n",
        escape_html(&form.email),
        escape_html(&form.phone)
    ));
    html.push_str("</div>\n");
    if let Some(url) = photo_url {
        html.push_str(&format!(
            "<div class=\"header-photo\"><img class=\"photo\" src=\"{}\" alt=\"Profile Photo\"></div>\n",
            escape_html(url)
        ));
    }
    html.push_str("</header>\n");

    push_text_section(&mut html, "summary", "Professional Summary", &form.summary);
    push_text_section(&mut html, "experience", "Work Experience", &form.experience);

    if !form.education.is_empty() {
        html.push_str("<section class=\"section education\">\n");
        html.push_str("<h2 class=\"section-title\">Education</h2>\n<ul class=\"education-list\">\n");
        for edu in &form.education {
            let year = if edu.year.is_empty() {
                String::new()
            } else {
                format!(" <span class=\"edu-year\">({})</span>", escape_html(&edu.year))
            };
            html.push_str(&format!(
                "<li><strong>{}:</strong> {}{}</li>\n",
                escape_html(&edu.level),
                escape_html(&edu.details),
                year
            ));
        }
        html.push_str("</ul>\n</section>\n");
    }

    html.push_str("<section class=\"section skills\">\n");
    html.push_str("<h2 class=\"section-title\">Skills &amp; Expertise</h2>\n<ul class=\"skills-list\">\n");
    for skill in &form.skills {
        html.push_str(&format!("<li>{}</li>\n", escape_html(skill)));
    }
    html.push_str("</ul>\n</section>\n</div>\n");

    html
}

fn push_text_section(html: &mut String, class: &str, title: &str, body: &str) {
    html.push_str(&format!(
        "<section class=\"section {class}\">\n<h2 class=\"section-title\">{title}</h2>\n<p>{}</p>\n</section>\n",
        multiline(body)
    ));
}

/// Wraps a sheet in a standalone HTML document with the print stylesheet.
pub fn render_document(title: &str, sheet: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>{PRINT_CSS}</style>\n</head>\n<body>\n{sheet}</body>\n</html>\n",
        escape_html(title)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resume::models::EducationEntry;
    use crate::resume::validation::tests::valid_form;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
    }

    #[test]
    fn test_user_text_is_escaped() {
        let mut form = valid_form();
        form.summary = "<script>alert(1)</script>".to_string();
        let html = build_resume_html(&form, None);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_newlines_become_breaks() {
        let mut form = valid_form();
        form.experience = "Acme\nGlobex".to_string();
        assert!(build_resume_html(&form, None).contains("<p>Acme<br>Globex</p>"));
    }

    #[test]
    fn test_education_section_only_when_present() {
        let form = valid_form();
        assert!(!build_resume_html(&form, None).contains("Education"));

        let mut form = valid_form();
        form.education = vec![
            EducationEntry {
                level: "Tertiary".to_string(),
                details: "MIT, BSc".to_string(),
                year: "2015".to_string(),
            },
            EducationEntry {
                level: "Primary".to_string(),
                details: "Elm Street".to_string(),
                year: String::new(),
            },
        ];
        let html = build_resume_html(&form, None);
        assert!(html.contains(
            "<li><strong>Tertiary:</strong> MIT, BSc <span class=\"edu-year\">(2015)</span></li>"
        ));
        assert!(html.contains("<li><strong>Primary:</strong> Elm Street</li>"));
    }

    #[test]
    fn test_header_has_suffix_contact_and_photo() {
        let mut form = valid_form();
        form.suffix = Some("III".to_string());
        let html = build_resume_html(&form, Some("/api/v1/photos/abc"));
        assert!(html.contains("<h1 class=\"name\">Jane Q. Doe-Smith, III</h1>"));
        assert!(html.contains("jane@example.com &nbsp; | &nbsp; +1 (555) 123-4567"));
        assert!(html.contains("src=\"/api/v1/photos/abc\""));
    }

    #[test]
    fn test_skills_listed_in_order() {
        let html = build_resume_html(&valid_form(), None);
        let rust = html.find("<li>Rust</li>").unwrap();
        let k8s = html.find("<li>Kubernetes</li>").unwrap();
        assert!(rust < k8s);
    }

    #[test]
    fn test_render_document_wraps_sheet() {
        let doc = render_document("Jane <Doe>", "<div class=\"resume-sheet\"></div>\n");
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<title>Jane &lt;Doe&gt;</title>"));
        assert!(doc.contains("@page { size: A4"));
    }
}
