//! HTML rendering for the trip form and the result page

use std::fmt::Write as _;

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, html};

use crate::models::{Place, PlaceCatalog};
use crate::planner::{TripForm, TripPlan};

/// Banner shown above the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    Success(String),
    Error(String),
}

const STYLE: &str = "
body { font-family: system-ui, sans-serif; max-width: 860px; margin: 2rem auto; padding: 0 1rem; color: #222; }
form { display: grid; grid-template-columns: 1fr 1fr; gap: .75rem 1rem; margin-bottom: 1.5rem; }
label { display: flex; flex-direction: column; font-size: .9rem; gap: .25rem; }
input { padding: .45rem; font-size: 1rem; }
button { grid-column: span 2; padding: .6rem; font-size: 1rem; cursor: pointer; }
.banner { padding: .75rem 1rem; border-radius: 6px; margin: 1rem 0; }
.success { background: #e6f6ea; border: 1px solid #7cc48f; }
.error { background: #fdecea; border: 1px solid #e08b83; }
.places li { margin-bottom: .5rem; }
.address { color: #666; font-size: .9rem; }
";

/// Escape text for use in HTML body and attribute positions
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn is_web_url(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn web_url_or_anchor(url: CowStr<'_>) -> CowStr<'_> {
    if is_web_url(&url) {
        url
    } else {
        CowStr::Borrowed("#")
    }
}

/// Render model markdown as HTML. Raw HTML in the input is shown as text and
/// link targets other than http(s) become `#`.
#[must_use]
pub fn markdown_to_html(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: web_url_or_anchor(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: web_url_or_anchor(dest_url),
            title,
            id,
        }),
        other => other,
    });

    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

/// Full page: form, optional banner and, after a successful run, the plan
#[must_use]
pub fn render(form: &TripForm, banner: Option<&Banner>, plan: Option<&TripPlan>) -> String {
    let mut body = String::new();
    body.push_str("<h1>✈️ AI Travel Planner</h1>\n");
    body.push_str(&render_form(form));

    if let Some(banner) = banner {
        body.push_str(&render_banner(banner));
    }
    if let Some(plan) = plan {
        body.push_str(&render_plan(plan));
    }

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>AI Travel Planner</title>\n<style>{STYLE}</style>\n</head>\n<body>\n{body}</body>\n</html>\n"
    )
}

fn render_form(form: &TripForm) -> String {
    format!(
        r#"<form method="post" action="/plan">
<label style="grid-column: span 2">Destination
<input type="text" name="destination" placeholder="e.g. Pune" value="{destination}"></label>
<label>Start date<input type="date" name="start_date" value="{start}"></label>
<label>End date<input type="date" name="end_date" value="{end}"></label>
<label>Number of travelers<input type="number" name="party_size" min="1" value="{party}"></label>
<label>Budget<input type="text" name="budget" placeholder="e.g. 50,000 INR" value="{budget}"></label>
<button type="submit">Generate Travel Plan</button>
</form>
"#,
        destination = escape(&form.destination),
        start = escape(&form.start_date),
        end = escape(&form.end_date),
        party = escape(&form.party_size),
        budget = escape(&form.budget),
    )
}

fn render_banner(banner: &Banner) -> String {
    let (class, text) = match banner {
        Banner::Success(text) => ("success", text),
        Banner::Error(text) => ("error", text),
    };
    format!("<div class=\"banner {class}\">{}</div>\n", escape(text))
}

fn render_plan(plan: &TripPlan) -> String {
    let mut out = String::new();
    out.push_str("<h2>📝 Your Itinerary</h2>\n<section class=\"itinerary\">\n");
    out.push_str(&markdown_to_html(plan.itinerary.as_str()));
    out.push_str("</section>\n");
    out.push_str(&render_catalog(&plan.catalog));
    out
}

fn render_catalog(catalog: &PlaceCatalog) -> String {
    let mut out = String::new();
    for (category, places) in catalog.iter() {
        let _ = write!(out, "<h3>{}</h3>\n<ul class=\"places\">\n", category.page_heading());
        for place in places {
            out.push_str(&render_place(place));
        }
        out.push_str("</ul>\n");
    }
    out
}

fn render_place(place: &Place) -> String {
    format!(
        "<li><strong>{name}</strong> (⭐ {rating}) <a href=\"{url}\" target=\"_blank\" rel=\"noopener\">Google Maps</a><br><span class=\"address\">{address}</span></li>\n",
        name = escape(&place.name),
        rating = place.rating,
        url = escape(&place.map_url),
        address = escape(&place.address),
    )
}

/// Banner for the dispatch outcome of a finished plan
#[must_use]
pub fn dispatch_banner(plan: &TripPlan) -> Banner {
    match plan.dispatch.error() {
        None => Banner::Success("Travel plan sent to your WhatsApp.".to_string()),
        Some(error) => Banner::Error(format!("Failed to send WhatsApp message: {error}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::DispatchStatus;
    use crate::models::{Category, Itinerary, Rating};
    use crate::planner::testing::pune_trip;

    fn plan(dispatch: DispatchStatus) -> TripPlan {
        let place = Place {
            name: "Shaniwar Wada".to_string(),
            address: "Shaniwar Peth, Pune".to_string(),
            rating: Rating::Score(4.4),
            map_url: "https://www.google.com/maps/search/?api=1&query=Shaniwar+Wada".to_string(),
        };
        TripPlan {
            request: pune_trip(),
            catalog: PlaceCatalog {
                attractions: vec![place],
                ..PlaceCatalog::default()
            },
            itinerary: Itinerary::new("## Day 1\n- Visit **Shaniwar Wada**"),
            dispatch,
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_markdown_renders_headings_and_links() {
        let html = markdown_to_html("## Day 1\n- [Google Maps](https://maps.example/a)");
        assert!(html.contains("<h2>Day 1</h2>"));
        assert!(html.contains(r#"<a href="https://maps.example/a">Google Maps</a>"#));
    }

    #[test]
    fn test_markdown_escapes_raw_html() {
        let html = markdown_to_html("Hello <script>alert(1)</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_markdown_drops_script_link_targets() {
        let html = markdown_to_html(
            "[Book now](javascript:alert(1)) and [data](data:text/html,hi) and [Taj](https://maps.example/taj)",
        );
        assert!(!html.contains("javascript:"));
        assert!(!html.contains("data:text"));
        assert!(html.contains(r##"<a href="#">Book now</a>"##));
        assert!(html.contains(r#"<a href="https://maps.example/taj">Taj</a>"#));
    }

    #[test]
    fn test_form_keeps_submitted_values() {
        let form = TripForm {
            destination: "Goa \"beach\"".to_string(),
            ..TripForm::default()
        };
        let page = render(&form, None, None);
        assert!(page.contains(r#"value="Goa &quot;beach&quot;""#));
        assert!(page.contains(r#"action="/plan""#));
    }

    #[test]
    fn test_result_page_lists_every_category() {
        let plan = plan(DispatchStatus::Sent { chunks: 1 });
        let page = render(&TripForm::from(&plan.request), Some(&dispatch_banner(&plan)), Some(&plan));

        assert!(page.contains("<h2>Day 1</h2>"));
        assert!(page.contains("<strong>Shaniwar Wada</strong> (⭐ 4.4)"));
        for category in Category::ALL {
            assert!(page.contains(category.page_heading()));
        }
        assert!(page.contains("banner success"));
    }

    #[test]
    fn test_dispatch_failure_banner() {
        let plan = plan(DispatchStatus::Failed {
            error: "HTTP 401 Unauthorized".to_string(),
            delivered: 0,
            attempted: 1,
        });
        assert_eq!(
            dispatch_banner(&plan),
            Banner::Error("Failed to send WhatsApp message: HTTP 401 Unauthorized".to_string())
        );
    }
}
