//! # HTML
//!
//! Turns a [`View`] into a complete page: sidebar with the six pages, header, blocks, footer.
//! Charts are plain CSS bars so the page needs no scripts. All data text is escaped.

use crate::{
    analytics::Bin,
    pages::{Block, Metric, Page, View},
};

const STYLE: &str = "
body { margin: 0; font-family: sans-serif; display: flex; color: #222; }
nav { width: 200px; min-height: 100vh; background: #f0f2f6; padding: 1rem; box-sizing: border-box; }
nav a { display: block; padding: .4rem .6rem; color: #222; text-decoration: none; border-radius: 4px; }
nav a.active { background: #1f77b4; color: #fff; }
nav form { margin-top: 1.5rem; }
main { flex: 1; padding: 1.5rem 2rem; max-width: 1100px; }
.metrics { display: grid; grid-template-columns: repeat(4, 1fr); gap: 1rem; }
.metric { background: #fafafa; border: 1px solid #eee; border-radius: 6px; padding: .8rem; }
.metric .label { font-size: .85rem; color: #666; }
.metric .value { font-size: 1.5rem; font-weight: bold; }
.chart { margin: 1rem 0; }
.bar { display: flex; align-items: center; margin: 2px 0; font-size: .85rem; }
.bar .name { width: 220px; overflow: hidden; white-space: nowrap; text-overflow: ellipsis; }
.bar .fill { background: #1f77b4; height: 14px; margin-right: .5rem; }
.warning { background: #fff8e1; border-left: 4px solid #f0ad4e; padding: .8rem; margin: 1rem 0; }
.error { background: #fdecea; border-left: 4px solid #d9534f; padding: .8rem; margin: 1rem 0; }
table { border-collapse: collapse; width: 100%; font-size: .85rem; }
th, td { border-bottom: 1px solid #eee; padding: .3rem .5rem; text-align: left; }
.table-wrap { max-height: 400px; overflow-y: auto; }
footer { margin-top: 2rem; color: #888; font-size: .8rem; }
";

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

pub fn render(view: &View) -> String {
    let mut body = String::new();
    for block in &view.blocks {
        render_block(&mut body, block);
    }

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title} | Retail Analytics</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         {nav}<main>\n<h1>{header}</h1>\n{body}<footer>Retail Analytics Dashboard</footer>\n</main>\n\
         </body>\n</html>\n",
        title = escape(view.page.title()),
        nav = render_nav(view.page),
        header = escape(view.header),
    )
}

fn render_nav(active: Page) -> String {
    let mut nav = String::from("<nav>\n<h2>Retail Analytics</h2>\n");
    for page in Page::ALL {
        let class = if page == active { " class=\"active\"" } else { "" };
        nav.push_str(&format!(
            "<a href=\"/{}\"{class}>{}</a>\n",
            page.slug(),
            escape(page.title())
        ));
    }
    nav.push_str("<form method=\"post\" action=\"/refresh\"><button type=\"submit\">Refresh data</button></form>\n");
    nav.push_str("</nav>\n");
    nav
}

fn render_block(out: &mut String, block: &Block) {
    match block {
        Block::Heading(text) => out.push_str(&format!("<h2>{}</h2>\n", escape(text))),
        Block::Prose(text) => render_prose(out, text),
        Block::Metrics(metrics) => render_metrics(out, metrics),
        Block::Divider => out.push_str("<hr>\n"),
        Block::Bars { title, bars } => render_bars(out, title, bars, false),
        Block::Shares { title, slices } => render_bars(out, title, slices, true),
        Block::Histogram { title, axis, bins } => render_histogram(out, title, axis, bins),
        Block::Table {
            title,
            columns,
            rows,
        } => render_table(out, title, columns, rows),
        Block::Warning(text) => out.push_str(&format!("<div class=\"warning\">{}</div>\n", escape(text))),
        Block::Error(text) => out.push_str(&format!("<div class=\"error\">{}</div>\n", escape(text))),
    }
}

/// `### ` lines become headings, blank lines split paragraphs, `**x**` is bold.
fn render_prose(out: &mut String, text: &str) {
    for paragraph in text.split("\n\n") {
        let paragraph = paragraph.trim();
        if let Some(heading) = paragraph.strip_prefix("### ") {
            out.push_str(&format!("<h3>{}</h3>\n", escape(heading)));
        } else if !paragraph.is_empty() {
            out.push_str(&format!("<p>{}</p>\n", bold(&escape(paragraph))));
        }
    }
}

fn bold(text: &str) -> String {
    text.split("**")
        .enumerate()
        .map(|(i, part)| {
            if i % 2 == 1 {
                format!("<strong>{part}</strong>")
            } else {
                part.to_string()
            }
        })
        .collect()
}

fn render_metrics(out: &mut String, metrics: &[Metric]) {
    out.push_str("<div class=\"metrics\">\n");
    for metric in metrics {
        out.push_str(&format!(
            "<div class=\"metric\"><div class=\"label\">{}</div><div class=\"value\">{}</div></div>\n",
            escape(metric.label),
            escape(&metric.value)
        ));
    }
    out.push_str("</div>\n");
}

fn render_bars(out: &mut String, title: &str, bars: &[(String, f64)], as_share: bool) {
    let max = bars.iter().map(|(_, v)| *v).fold(0.0, f64::max);
    let total: f64 = bars.iter().map(|(_, v)| *v).sum();

    out.push_str(&format!("<div class=\"chart\">\n<h4>{}</h4>\n", escape(title)));
    for (name, value) in bars {
        let width = if max > 0.0 { value / max * 100.0 } else { 0.0 };
        let shown = if as_share {
            let share = if total > 0.0 { value / total * 100.0 } else { 0.0 };
            format!("{share:.1}%")
        } else if value.fract() == 0.0 {
            format!("{value:.0}")
        } else {
            format!("{value:.2}")
        };

        out.push_str(&format!(
            "<div class=\"bar\"><span class=\"name\">{}</span>\
             <span class=\"fill\" style=\"width: {width:.1}%\"></span>{shown}</div>\n",
            escape(name)
        ));
    }
    out.push_str("</div>\n");
}

fn render_histogram(out: &mut String, title: &str, axis: &str, bins: &[Bin]) {
    let bars: Vec<(String, f64)> = bins
        .iter()
        .map(|bin| (format!("{:.1} - {:.1}", bin.start, bin.end), bin.count as f64))
        .collect();

    render_bars(out, &format!("{title} ({axis})"), &bars, false);
}

fn render_table(out: &mut String, title: &str, columns: &[&str], rows: &[Vec<String>]) {
    out.push_str(&format!("<h3>{}</h3>\n<div class=\"table-wrap\"><table>\n<tr>", escape(title)));
    for column in columns {
        out.push_str(&format!("<th>{}</th>", escape(column)));
    }
    out.push_str("</tr>\n");

    for row in rows {
        out.push_str("<tr>");
        for cell in row {
            out.push_str(&format!("<td>{}</td>", escape(cell)));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</table></div>\n");
}
