//! Presentation: a pure `(analysis, view) → HTML` renderer.
//!
//! Two peer layouts render the same [`SermonAnalysis`]:
//!
//! - **Summary card**: one evangelism card with the first illustration as its
//!   background, up to three numbered points and a one-sentence teaser, then
//!   the core theme and full invitation below.
//! - **Infographic**: a header, a timeline pairing each point with its own
//!   illustration (sides alternate), the core theme as a quote, and keyword
//!   tags.
//!
//! [`render_page`] wraps both in one standalone document with a CSS-only
//! toggle, so switching layouts never re-runs the pipeline.

use crate::analysis::{SermonAnalysis, ViewType, MAX_POINTS};
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write as _;

/// Card background when no illustration exists.
pub const CARD_PLACEHOLDER: &str =
    "https://images.unsplash.com/photo-1506744038136-46273834b3fb?q=80&w=2000";

/// Infographic image when a point has no illustration.
pub const INFOGRAPHIC_PLACEHOLDER: &str = "https://via.placeholder.com/600";

const STYLE: &str = r#"
body { margin: 0; font-family: Georgia, "Noto Serif KR", serif; background: #f4f1ec; color: #1f2937; }
.toggle { display: flex; gap: .5rem; justify-content: center; padding: 1.5rem; }
.toggle input { display: none; }
.toggle label { padding: .5rem 1.25rem; border-radius: 999px; background: #fff; cursor: pointer; font-weight: 700; }
.view { display: none; }
#view-summary-card:checked ~ .toggle label[for="view-summary-card"],
#view-infographic:checked ~ .toggle label[for="view-infographic"] { background: #4338ca; color: #fff; }
#view-summary-card:checked ~ .views .summary-card,
#view-infographic:checked ~ .views .infographic { display: block; }
.summary-card .card { position: relative; max-width: 32rem; aspect-ratio: 4 / 6; margin: 2rem auto; border-radius: 3rem; overflow: hidden; border: 12px solid rgba(255,255,255,.8); }
.summary-card .card > img { position: absolute; inset: 0; width: 100%; height: 100%; object-fit: cover; }
.summary-card .overlay { position: absolute; inset: 0; padding: 2.5rem; display: flex; flex-direction: column; justify-content: flex-end; color: #fff; background: linear-gradient(rgba(0,0,0,.4), transparent, rgba(0,0,0,.8)); }
.summary-card .points li { margin-bottom: 1rem; list-style: none; }
.summary-card .points .num { font-size: .7rem; margin-right: .5rem; }
.summary-card .teaser { border-top: 1px solid rgba(255,255,255,.2); padding-top: 1.25rem; font-style: italic; }
.summary-card .details { max-width: 42rem; margin: 0 auto 3rem; padding: 2rem; background: #fff; border-radius: 2.5rem; }
.infographic { max-width: 56rem; margin: 2rem auto; background: #fff; border-radius: 4rem; overflow: hidden; }
.infographic header { padding: 4rem 3rem; text-align: center; color: #fff; background: linear-gradient(135deg, #312e81, #4338ca); }
.infographic .point { display: flex; gap: 3rem; align-items: center; padding: 3rem 5rem; }
.infographic .point.reverse { flex-direction: row-reverse; }
.infographic .point > * { flex: 1; }
.infographic .point img { width: 100%; max-width: 20rem; aspect-ratio: 1; object-fit: cover; border-radius: 3.5rem; }
.infographic blockquote { margin: 3rem auto; max-width: 42rem; text-align: center; font-size: 1.75rem; font-style: italic; font-weight: 900; }
.infographic .keywords { padding: 2.5rem; text-align: center; background: #f9fafb; }
.infographic .keywords span { display: inline-block; margin: .25rem; padding: .5rem 1.25rem; border: 1px solid #e5e7eb; border-radius: 999px; font-size: .7rem; text-transform: uppercase; }
"#;

/// Render one layout as an HTML fragment.
pub fn render_view(analysis: &SermonAnalysis, view: ViewType) -> String {
    match view {
        ViewType::SummaryCard => render_summary_card(analysis),
        ViewType::Infographic => render_infographic(analysis),
    }
}

/// Render a standalone HTML document holding both layouts, `active` shown.
pub fn render_page(analysis: &SermonAnalysis, active: ViewType) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    let _ = writeln!(out, "<title>{}</title>", encode_text(&analysis.title));
    let _ = writeln!(out, "<style>{STYLE}</style>\n</head>\n<body>");

    for view in [ViewType::SummaryCard, ViewType::Infographic] {
        let checked = if view == active { " checked" } else { "" };
        let _ = writeln!(
            out,
            "<input type=\"radio\" name=\"view\" id=\"view-{}\" hidden{checked}>",
            view.slug()
        );
    }

    out.push_str("<nav class=\"toggle\">\n");
    for view in [ViewType::SummaryCard, ViewType::Infographic] {
        let _ = writeln!(
            out,
            "<label for=\"view-{}\">{}</label>",
            view.slug(),
            view.label()
        );
    }
    out.push_str("</nav>\n<main class=\"views\">\n");
    out.push_str(&render_summary_card(analysis));
    out.push_str(&render_infographic(analysis));
    out.push_str("</main>\n</body>\n</html>\n");
    out
}

/// The evangelism message up to its first full stop, followed by `...`.
pub fn teaser(message: &str) -> String {
    let first = message.split('.').next().unwrap_or_default();
    format!("{}...", first.trim())
}

fn render_summary_card(a: &SermonAnalysis) -> String {
    let main_image = a
        .image_at(0)
        .map(|i| i.src())
        .unwrap_or_else(|| CARD_PLACEHOLDER.to_string());

    let mut out = String::new();
    out.push_str("<section class=\"view summary-card\">\n<div class=\"card\">\n");
    let _ = writeln!(out, "<img src=\"{}\" alt=\"\">", attr(&main_image));
    out.push_str("<div class=\"overlay\">\n<p class=\"badge\">Sunday Grace</p>\n");
    let _ = writeln!(out, "<h3>{}</h3>", text(&a.title));
    let _ = writeln!(out, "<p class=\"scripture\">{}</p>", text(&a.scripture));

    out.push_str("<ol class=\"points\">\n");
    for (idx, point) in a.summary_points.iter().take(MAX_POINTS).enumerate() {
        let _ = writeln!(
            out,
            "<li><h4><span class=\"num\">0{}</span>{}</h4><p>{}</p></li>",
            idx + 1,
            text(&point.title),
            text(&point.description)
        );
    }
    out.push_str("</ol>\n");
    let _ = writeln!(
        out,
        "<p class=\"teaser\">\"{}\"</p>",
        text(&teaser(&a.evangelism_message))
    );
    out.push_str("</div>\n</div>\n");

    out.push_str("<div class=\"details\">\n");
    let _ = writeln!(
        out,
        "<section><h4>The heart of the message</h4><p class=\"core-theme\">{}</p></section>",
        text(&a.core_theme)
    );
    let _ = writeln!(
        out,
        "<section><h4>Today's invitation</h4><p class=\"evangelism\">\"{}\"</p></section>",
        text(&a.evangelism_message)
    );
    out.push_str("</div>\n</section>\n");
    out
}

fn render_infographic(a: &SermonAnalysis) -> String {
    let mut out = String::new();
    out.push_str("<section class=\"view infographic\">\n<header>\n");
    let _ = writeln!(out, "<h2>{}</h2>", text(&a.title));
    let _ = writeln!(out, "<p class=\"scripture\">{}</p>", text(&a.scripture));
    out.push_str("</header>\n<div class=\"timeline\">\n");

    for (idx, point) in a.summary_points.iter().enumerate() {
        let side = if idx % 2 == 0 { "" } else { " reverse" };
        let image = a
            .image_at(idx)
            .map(|i| i.src())
            .unwrap_or_else(|| INFOGRAPHIC_PLACEHOLDER.to_string());
        let _ = writeln!(out, "<article class=\"point{side}\">");
        let _ = writeln!(
            out,
            "<div><h5>Message 0{n}</h5><h4>{}</h4><p>{}</p></div>",
            text(&point.title),
            text(&point.description),
            n = idx + 1
        );
        let _ = writeln!(
            out,
            "<figure><img src=\"{}\" alt=\"Point {}\"></figure>",
            attr(&image),
            idx + 1
        );
        out.push_str("</article>\n");
    }

    let _ = writeln!(
        out,
        "<blockquote>\"{}\"</blockquote>\n</div>",
        text(&a.core_theme)
    );

    out.push_str("<footer class=\"keywords\">\n");
    for keyword in &a.keywords {
        let _ = writeln!(out, "<span>#{}</span>", text(keyword));
    }
    out.push_str("</footer>\n</section>\n");
    out
}

fn text(s: &str) -> std::borrow::Cow<'_, str> {
    encode_text(s)
}

fn attr(s: &str) -> std::borrow::Cow<'_, str> {
    encode_double_quoted_attribute(s)
}
