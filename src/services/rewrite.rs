//! 数学内容改写流水线
//! 把后端返回的解题文本改写成排版引擎（MathJax）可直接渲染的规范标记

use regex::{Captures, Regex};
use std::sync::OnceLock;

/// 默认换行标记，渲染面板不识别普通换行符
pub const DEFAULT_LINE_BREAK: &str = "<br>";

/// 单条改写规则
///
/// 规则之间相互独立，按 [`PIPELINE`] 中的顺序依次执行。
/// 后面的规则可能会匹配到前面规则产生的文本，所以顺序不能调换。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteRule {
    /// 去掉所有 `**` 加粗标记
    StripEmphasis,
    /// `align*` 环境改写为包在 `\[ \]` 中的 `aligned` 环境
    AlignEnvironment,
    /// 规范化 `\( \)` 与 `\[ \]` 定界符，仅匹配单行
    MathDelimiters,
    /// 保留 `\sin`、`\cos`、`\tan`
    TrigFunctions,
    /// 按单层花括号重新校验 `\frac{a}{b}`
    Fractions,
    /// 单字符上下标补全花括号：`_x` → `_{x}`，`^x` → `^{x}`
    ScriptBraces,
    /// 保留 `\approx`、`\times`
    Operators,
    /// 编号条目前插入换行
    NumberedItems,
    /// 普通换行符替换为换行标记
    LineBreaks,
}

/// 固定的规则执行顺序
pub const PIPELINE: [RewriteRule; 9] = [
    RewriteRule::StripEmphasis,
    RewriteRule::AlignEnvironment,
    RewriteRule::MathDelimiters,
    RewriteRule::TrigFunctions,
    RewriteRule::Fractions,
    RewriteRule::ScriptBraces,
    RewriteRule::Operators,
    RewriteRule::NumberedItems,
    RewriteRule::LineBreaks,
];

fn inline_math_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\\\((.*?)\\\)").unwrap())
}

fn display_math_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\\\[(.*?)\\\]").unwrap())
}

fn trig_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\\(sin|cos|tan)").unwrap())
}

fn fraction_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\\frac\{([^}]*)\}\{([^}]*)\}").unwrap())
}

fn subscript_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"_([A-Za-z0-9_])").unwrap())
}

fn superscript_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\^([A-Za-z0-9_])").unwrap())
}

fn operator_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\\(approx|times)").unwrap())
}

fn numbered_item_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([0-9]+\.)\s").unwrap())
}

impl RewriteRule {
    /// 规则名称，用于日志和命令输出
    pub fn name(&self) -> &'static str {
        match self {
            RewriteRule::StripEmphasis => "strip_emphasis",
            RewriteRule::AlignEnvironment => "align_environment",
            RewriteRule::MathDelimiters => "math_delimiters",
            RewriteRule::TrigFunctions => "trig_functions",
            RewriteRule::Fractions => "fractions",
            RewriteRule::ScriptBraces => "script_braces",
            RewriteRule::Operators => "operators",
            RewriteRule::NumberedItems => "numbered_items",
            RewriteRule::LineBreaks => "line_breaks",
        }
    }

    /// 对文本执行本规则，不匹配时原样返回
    pub fn apply(&self, text: &str, line_break: &str) -> String {
        match self {
            RewriteRule::StripEmphasis => text.replace("**", ""),
            RewriteRule::AlignEnvironment => text
                .replace(r"\begin{align*}", r"\[\begin{aligned}")
                .replace(r"\end{align*}", r"\end{aligned}\]"),
            RewriteRule::MathDelimiters => {
                let result = inline_math_pattern().replace_all(text, r"\(${1}\)");
                display_math_pattern()
                    .replace_all(&result, r"\[${1}\]")
                    .into_owned()
            }
            RewriteRule::TrigFunctions => trig_pattern().replace_all(text, r"\${1}").into_owned(),
            RewriteRule::Fractions => fraction_pattern()
                .replace_all(text, r"\frac{${1}}{${2}}")
                .into_owned(),
            RewriteRule::ScriptBraces => {
                let result = subscript_pattern().replace_all(text, "_{${1}}");
                superscript_pattern()
                    .replace_all(&result, "^{${1}}")
                    .into_owned()
            }
            RewriteRule::Operators => operator_pattern().replace_all(text, r"\${1}").into_owned(),
            RewriteRule::NumberedItems => numbered_item_pattern()
                .replace_all(text, |caps: &Captures| {
                    format!("{}{} ", line_break, &caps[1])
                })
                .into_owned(),
            RewriteRule::LineBreaks => text.replace('\n', line_break),
        }
    }
}

/// 按固定顺序执行全部改写规则
pub fn rewrite(text: &str, line_break: &str) -> String {
    PIPELINE.iter().fold(text.to_string(), |acc, rule| {
        let next = rule.apply(&acc, line_break);
        if next != acc {
            log::trace!("改写规则 {} 生效", rule.name());
        }
        next
    })
}
