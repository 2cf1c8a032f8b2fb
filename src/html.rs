use regex::Regex;

lazy_static::lazy_static! {
    static ref BOLD: Regex = Regex::new(r"\*\*(.+?)\*\*").expect("bold pattern");
    static ref LINK: Regex = Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("link pattern");
}

const WRAPPER_STYLE: &str =
    "font-family:-apple-system,BlinkMacSystemFont,Segoe UI,Roboto,sans-serif;max-width:600px;line-height:1.5;color:#222";

/// Render the markdown subset summarizers produce as an HTML email body.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut in_list = false;

    for line in markdown.lines() {
        let line = line.trim();
        let bullet = line.strip_prefix("- ").or_else(|| line.strip_prefix("* "));

        if bullet.is_none() && in_list {
            out.push("</ul>".into());
            in_list = false;
        }

        if let Some(text) = line.strip_prefix("### ") {
            out.push(format!(
                r#"<h3 style="color:#1a1a2e;margin:18px 0 8px 0;font-size:16px">{}</h3>"#,
                inline(text)
            ));
        } else if let Some(text) = line.strip_prefix("## ") {
            out.push(format!(
                r#"<h2 style="color:#1a1a2e;margin:20px 0 10px 0;font-size:18px">{}</h2>"#,
                inline(text)
            ));
        } else if let Some(text) = bullet {
            if !in_list {
                out.push(r#"<ul style="padding-left:20px">"#.into());
                in_list = true;
            }
            out.push(format!(r#"<li style="margin:6px 0">{}</li>"#, inline(text)));
        } else if line.is_empty() {
            out.push("<br>".into());
        } else {
            out.push(format!(r#"<p style="margin:4px 0">{}</p>"#, inline(line)));
        }
    }
    if in_list {
        out.push("</ul>".into());
    }

    format!("<div style=\"{WRAPPER_STYLE}\">\n{}\n</div>", out.join("\n"))
}

fn inline(text: &str) -> String {
    let bolded = BOLD.replace_all(text, "<b>$1</b>");
    LINK.replace_all(&bolded, r#"<a href="$2">$1</a>"#).into_owned()
}
