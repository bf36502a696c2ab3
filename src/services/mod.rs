// 服务模块
// 提供解题文本解析、改写与 HTML 组装

pub mod html;
pub mod parser;
pub mod rewrite;

pub use parser::{
    classify,
    parse,
    split_sections,
    RenderedBlock,
    RenderedSolution,
    SectionKind,
    SolutionMetadata,
    SolutionParser,
    SolutionParserConfig,
    FINAL_ANSWER_MARKER,
    PROBLEM_MARKER,
};

pub use rewrite::{
    rewrite,
    RewriteRule,
    DEFAULT_LINE_BREAK,
    PIPELINE,
};

pub use html::{
    render_fragment,
    render_page,
    HtmlRenderConfig,
    DEFAULT_TYPESET_SCRIPT_URL,
};
