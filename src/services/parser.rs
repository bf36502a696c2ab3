//! 解题文本解析引擎
//! 按 `**Problem Statement:**` / `**Step N:**` / `**Final Answer:**` 标记切分后端返回的解题文本，
//! 为每一段分类并执行数学内容改写

use crate::services::rewrite::{rewrite, DEFAULT_LINE_BREAK};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// 题目陈述段落的起始标记
pub const PROBLEM_MARKER: &str = "**Problem Statement:";
/// 最终答案段落的起始标记
pub const FINAL_ANSWER_MARKER: &str = "**Final Answer:";

const PROBLEM_HEADING: &str = "**Problem Statement:**";
const FINAL_ANSWER_HEADING: &str = "**Final Answer:**";
const EMPHASIS: &str = "**";

/// 段落类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Problem,
    Step,
    FinalAnswer,
    Plain,
}

impl SectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Problem => "problem",
            SectionKind::Step => "step",
            SectionKind::FinalAnswer => "final_answer",
            SectionKind::Plain => "plain",
        }
    }
}

/// 解析输出的最小单元
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedBlock {
    pub kind: SectionKind,
    pub title: Option<String>,
    pub body: String,
}

/// 解析结果统计信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolutionMetadata {
    pub total_blocks: usize,
    pub step_count: usize,
    pub has_problem_statement: bool,
    pub has_final_answer: bool,
    pub rendered_at: chrono::DateTime<chrono::Utc>,
}

/// 一次完整渲染的结果
///
/// `problem` 只作为上下文携带，不参与改写。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedSolution {
    pub id: String,
    pub problem: Option<String>,
    pub blocks: Vec<RenderedBlock>,
    pub metadata: SolutionMetadata,
}

/// 解析器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolutionParserConfig {
    pub line_break: String,
    pub problem_caption: String,
    pub final_answer_caption: String,
}

impl Default for SolutionParserConfig {
    fn default() -> Self {
        Self {
            line_break: DEFAULT_LINE_BREAK.to_string(),
            problem_caption: "Problem Statement".to_string(),
            final_answer_caption: "Final Answer".to_string(),
        }
    }
}

fn section_start_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\*\*(?:Step [0-9]+:|Problem Statement:|Final Answer:)").unwrap()
    })
}

fn step_marker_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\*\*Step [0-9]+:").unwrap())
}

/// 在每个段落标记之前切分，标记保留在其后的段落中
///
/// 丢弃长度为零的片段；文本中存在标记时，只含空白的片段也一并丢弃。
/// 没有任何标记时整段文本原样作为一个片段。
pub fn split_sections(raw: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut has_marker = false;

    for mat in section_start_pattern().find_iter(raw) {
        has_marker = true;
        if mat.start() > start {
            segments.push(&raw[start..mat.start()]);
            start = mat.start();
        }
    }

    if start < raw.len() {
        segments.push(&raw[start..]);
    }

    if has_marker {
        segments.retain(|segment| !segment.trim().is_empty());
    }

    segments
}

/// 按前缀判断段落类型，先判断题目陈述和最终答案，再判断步骤
pub fn classify(segment: &str) -> SectionKind {
    if segment.starts_with(PROBLEM_MARKER) {
        SectionKind::Problem
    } else if segment.starts_with(FINAL_ANSWER_MARKER) {
        SectionKind::FinalAnswer
    } else if step_marker_pattern().is_match(segment) {
        SectionKind::Step
    } else {
        SectionKind::Plain
    }
}

/// 去掉标题后紧跟的所有空白和空行
fn trim_heading_gap(rest: &str) -> &str {
    rest.trim_start()
}

/// 拆出步骤标题和正文
///
/// 首行的加粗区间闭合时，标题取加粗区间内的文字，其余部分都是正文；
/// 否则整行（去掉加粗标记）作为标题，后续各行作为正文。
fn split_step_heading(segment: &str) -> (String, &str) {
    let first_line_end = segment.find('\n').unwrap_or(segment.len());
    let first_line = &segment[..first_line_end];

    if let Some(inner) = first_line.strip_prefix(EMPHASIS) {
        if let Some(close) = inner.find(EMPHASIS) {
            let title = inner[..close].trim().to_string();
            let rest = &segment[EMPHASIS.len() * 2 + close..];
            return (title, trim_heading_gap(rest));
        }
    }

    let title = first_line.replace(EMPHASIS, "").trim().to_string();
    let body = segment.get(first_line_end + 1..).unwrap_or("");
    (title, body)
}

/// 去掉固定标题，加粗区间未在冒号后闭合时只去掉起始标记
fn strip_heading<'a>(segment: &'a str, heading: &str, marker: &str) -> &'a str {
    let rest = segment
        .strip_prefix(heading)
        .or_else(|| segment.strip_prefix(marker))
        .unwrap_or(segment);
    trim_heading_gap(rest)
}

/// 解题文本解析器
#[derive(Debug, Clone, Default)]
pub struct SolutionParser {
    config: SolutionParserConfig,
}

impl SolutionParser {
    pub fn new() -> Self {
        Self::with_config(SolutionParserConfig::default())
    }

    pub fn with_config(config: SolutionParserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolutionParserConfig {
        &self.config
    }

    /// 解析原始解题文本，输出与段落一一对应的渲染块
    pub fn parse(&self, raw: &str) -> Vec<RenderedBlock> {
        let segments = split_sections(raw);
        log::debug!("解题文本切分为 {} 段", segments.len());

        segments
            .into_iter()
            .map(|segment| self.render_segment(segment))
            .collect()
    }

    /// 只执行改写流水线
    pub fn rewrite(&self, text: &str) -> String {
        rewrite(text, &self.config.line_break)
    }

    /// 解析并附带题目上下文和统计信息
    pub fn render(&self, problem: Option<&str>, raw: &str) -> RenderedSolution {
        let blocks = self.parse(raw);
        let metadata = SolutionMetadata {
            total_blocks: blocks.len(),
            step_count: blocks.iter().filter(|b| b.kind == SectionKind::Step).count(),
            has_problem_statement: blocks.iter().any(|b| b.kind == SectionKind::Problem),
            has_final_answer: blocks.iter().any(|b| b.kind == SectionKind::FinalAnswer),
            rendered_at: chrono::Utc::now(),
        };

        RenderedSolution {
            id: uuid::Uuid::new_v4().to_string(),
            problem: problem.map(str::to_string),
            blocks,
            metadata,
        }
    }

    fn render_segment(&self, segment: &str) -> RenderedBlock {
        let kind = classify(segment);
        let (title, body) = match kind {
            SectionKind::Problem => (
                Some(self.config.problem_caption.clone()),
                self.rewrite(strip_heading(segment, PROBLEM_HEADING, PROBLEM_MARKER)),
            ),
            SectionKind::FinalAnswer => (
                Some(self.config.final_answer_caption.clone()),
                self.rewrite(strip_heading(segment, FINAL_ANSWER_HEADING, FINAL_ANSWER_MARKER)),
            ),
            SectionKind::Step => {
                let (title, body) = split_step_heading(segment);
                (Some(title), self.rewrite(body))
            }
            SectionKind::Plain => (None, self.rewrite(segment)),
        };

        RenderedBlock { kind, title, body }
    }
}

/// 使用默认配置解析
pub fn parse(raw: &str) -> Vec<RenderedBlock> {
    SolutionParser::new().parse(raw)
}
