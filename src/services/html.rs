//! 渲染块 HTML 组装
//! 把解析结果拼成渲染面板使用的 HTML 片段，正文原样插入，标题转义

use crate::services::parser::{RenderedBlock, SectionKind};
use html_escape::encode_text;
use serde::{Deserialize, Serialize};

/// MathJax 3 的默认加载地址
pub const DEFAULT_TYPESET_SCRIPT_URL: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/mathjax/3.2.0/es5/tex-mml-chtml.js";

/// HTML 渲染配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HtmlRenderConfig {
    pub typeset_script_url: String,
    pub page_title: String,
}

impl Default for HtmlRenderConfig {
    fn default() -> Self {
        Self {
            typeset_script_url: DEFAULT_TYPESET_SCRIPT_URL.to_string(),
            page_title: "Elemento".to_string(),
        }
    }
}

fn push_block(html: &mut String, block: &RenderedBlock) {
    let title = block.title.as_deref().map(encode_text);
    let section = match (block.kind, title) {
        (SectionKind::Problem, Some(title)) => format!(
            "<section class=\"problem\"><h2>{}</h2><div class=\"body\">{}</div></section>",
            title, block.body
        ),
        (SectionKind::FinalAnswer, Some(title)) => format!(
            "<section class=\"final-answer\"><h3>{}</h3><div class=\"body centered\">{}</div></section>",
            title, block.body
        ),
        (SectionKind::Step, Some(title)) => format!(
            "<section class=\"step\"><h3>{}</h3><div class=\"body\">{}</div></section>",
            title, block.body
        ),
        _ => format!(
            "<section class=\"plain\"><div class=\"body\">{}</div></section>",
            block.body
        ),
    };
    html.push_str(&section);
}

/// 渲染解题片段，块的顺序与输入一致
pub fn render_fragment(blocks: &[RenderedBlock]) -> String {
    let mut html = String::from("<div class=\"solution\">");
    for block in blocks {
        push_block(&mut html, block);
    }
    html.push_str("</div>");
    html
}

/// 渲染独立页面，加载排版引擎
pub fn render_page(
    problem: Option<&str>,
    blocks: &[RenderedBlock],
    config: &HtmlRenderConfig,
) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", encode_text(&config.page_title)));
    html.push_str(&format!(
        "<script async src=\"{}\"></script>\n",
        html_escape::encode_double_quoted_attribute(&config.typeset_script_url)
    ));
    html.push_str("</head>\n<body>\n");
    if let Some(problem) = problem {
        html.push_str(&format!("<h1 class=\"question\">{}</h1>\n", encode_text(problem)));
    }
    html.push_str(&render_fragment(blocks));
    html.push_str("\n</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::parser::parse;

    #[test]
    fn test_render_fragment_sections() {
        let blocks = parse("**Problem Statement:** p**Step 1: Expand**\na**Final Answer:** 2");
        let html = render_fragment(&blocks);

        assert!(html.starts_with("<div class=\"solution\">"));
        assert!(html.contains("<section class=\"problem\"><h2>Problem Statement</h2><div class=\"body\">p</div></section>"));
        assert!(html.contains("<h3>Step 1: Expand</h3><div class=\"body\">a</div>"));
        assert!(html.contains("<section class=\"final-answer\"><h3>Final Answer</h3>"));
        assert!(html.ends_with("</div>"));

        let problem = html.find("problem").unwrap();
        let step = html.find("step").unwrap();
        let answer = html.find("final-answer").unwrap();
        assert!(problem < step && step < answer);
    }

    #[test]
    fn test_plain_block_has_no_heading() {
        let html = render_fragment(&parse("just text"));
        assert_eq!(
            html,
            "<div class=\"solution\"><section class=\"plain\"><div class=\"body\">just text</div></section></div>"
        );
    }

    #[test]
    fn test_title_is_escaped_body_is_not() {
        let blocks = parse("**Step 1: compare a<b**\nx<br>y");
        let html = render_fragment(&blocks);
        assert!(html.contains("<h3>Step 1: compare a&lt;b</h3>"));
        assert!(html.contains("x<br>y"));
    }

    #[test]
    fn test_render_page() {
        let config = HtmlRenderConfig::default();
        let html = render_page(Some("Is 1 < 2?"), &parse("yes"), &config);

        assert!(html.contains(DEFAULT_TYPESET_SCRIPT_URL));
        assert!(html.contains("<h1 class=\"question\">Is 1 &lt; 2?</h1>"));
        assert!(html.contains("<title>Elemento</title>"));
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_fragment(&[]), "<div class=\"solution\"></div>");
    }
}
