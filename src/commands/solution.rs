//! 解题渲染命令
//! 提供给前端调用的渲染接口，失败时返回错误描述字符串

use crate::config::AppConfig;
use crate::services::html::{render_fragment, HtmlRenderConfig};
use crate::services::parser::{RenderedBlock, RenderedSolution, SolutionParser};
use crate::services::rewrite::PIPELINE;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 渲染状态，所有命令共享
#[derive(Debug, Clone, Default)]
pub struct RendererState {
    pub parser: Arc<SolutionParser>,
    pub html: HtmlRenderConfig,
}

impl RendererState {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            parser: Arc::new(SolutionParser::with_config(config.parser.clone())),
            html: config.html.clone(),
        }
    }
}

/// 渲染单个解答
pub async fn render_solution(
    state: &RendererState,
    content: String,
    problem: Option<String>,
) -> Result<RenderedSolutionDto, String> {
    let solution = state.parser.render(problem.as_deref(), &content);
    Ok(solution.into())
}

/// 渲染为 HTML 片段
pub async fn render_solution_html(
    state: &RendererState,
    content: String,
) -> Result<String, String> {
    let blocks = state.parser.parse(&content);
    Ok(render_fragment(&blocks))
}

/// 批量渲染，每个解答在独立的阻塞任务中解析，结果顺序与输入一致
pub async fn render_solutions(
    state: &RendererState,
    inputs: Vec<SolutionInput>,
) -> Result<Vec<RenderedSolutionDto>, String> {
    let tasks = inputs.into_iter().map(|input| {
        let parser = Arc::clone(&state.parser);
        tokio::task::spawn_blocking(move || {
            parser.render(input.problem.as_deref(), &input.content)
        })
    });

    let mut results = Vec::new();
    for joined in join_all(tasks).await {
        let solution = joined.map_err(|e| format!("渲染任务失败: {}", e))?;
        results.push(solution.into());
    }

    log::debug!("批量渲染完成，共 {} 个解答", results.len());
    Ok(results)
}

/// 只执行数学内容改写
pub async fn rewrite_math(
    state: &RendererState,
    content: String,
) -> Result<String, String> {
    Ok(state.parser.rewrite(&content))
}

/// 按执行顺序列出改写规则
pub async fn list_rewrite_rules() -> Result<Vec<String>, String> {
    Ok(PIPELINE.iter().map(|rule| rule.name().to_string()).collect())
}

// ==================== DTO 类型定义 ====================

/// 解答输入 DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolutionInput {
    pub content: String,
    pub problem: Option<String>,
}

/// 渲染块 DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedBlockDto {
    pub kind: String,
    pub title: Option<String>,
    pub body: String,
}

impl From<RenderedBlock> for RenderedBlockDto {
    fn from(b: RenderedBlock) -> Self {
        Self {
            kind: b.kind.as_str().to_string(),
            title: b.title,
            body: b.body,
        }
    }
}

/// 渲染结果 DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedSolutionDto {
    pub id: String,
    pub problem: Option<String>,
    pub blocks: Vec<RenderedBlockDto>,
    pub total_blocks: usize,
    pub step_count: usize,
    pub has_problem_statement: bool,
    pub has_final_answer: bool,
    pub rendered_at: String,
}

impl From<RenderedSolution> for RenderedSolutionDto {
    fn from(s: RenderedSolution) -> Self {
        Self {
            id: s.id,
            problem: s.problem,
            blocks: s.blocks.into_iter().map(Into::into).collect(),
            total_blocks: s.metadata.total_blocks,
            step_count: s.metadata.step_count,
            has_problem_statement: s.metadata.has_problem_statement,
            has_final_answer: s.metadata.has_final_answer,
            rendered_at: s.metadata.rendered_at.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOLUTION: &str = "**Problem Statement:** Solve 2x = 4\n**Step 1:** Divide by 2\n**Final Answer:** x = 2";

    #[tokio::test]
    async fn test_render_solution() {
        let state = RendererState::default();
        let result = render_solution(&state, SOLUTION.to_string(), Some("2x = 4".to_string())).await;
        assert!(result.is_ok());

        let dto = result.unwrap();
        assert_eq!(dto.problem.as_deref(), Some("2x = 4"));
        assert_eq!(dto.total_blocks, 3);
        assert_eq!(dto.step_count, 1);
        assert!(dto.has_problem_statement);
        assert!(dto.has_final_answer);
        let kinds: Vec<&str> = dto.blocks.iter().map(|b| b.kind.as_str()).collect();
        assert_eq!(kinds, vec!["problem", "step", "final_answer"]);
        assert!(chrono::DateTime::parse_from_rfc3339(&dto.rendered_at).is_ok());
    }

    #[tokio::test]
    async fn test_render_solution_html() {
        let state = RendererState::default();
        let html = render_solution_html(&state, SOLUTION.to_string()).await.unwrap();
        assert!(html.contains("<h3>Step 1:</h3>"));
    }

    #[tokio::test]
    async fn test_render_solutions_keeps_order() {
        let state = RendererState::default();
        let inputs = vec![
            SolutionInput { content: "**Step 1:** a".to_string(), problem: None },
            SolutionInput { content: String::new(), problem: Some("empty".to_string()) },
            SolutionInput { content: "**Final Answer:** b".to_string(), problem: None },
        ];

        let results = render_solutions(&state, inputs).await.unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].blocks[0].kind, "step");
        assert!(results[1].blocks.is_empty());
        assert_eq!(results[1].problem.as_deref(), Some("empty"));
        assert!(!results[0].has_problem_statement);
        assert_eq!(results[2].blocks[0].kind, "final_answer");
    }

    #[tokio::test]
    async fn test_rewrite_math_uses_config() {
        let mut config = AppConfig::default();
        config.parser.line_break = "<br/>".to_string();
        let state = RendererState::from_config(&config);

        let rewritten = rewrite_math(&state, "x_1\ny^2".to_string()).await.unwrap();
        assert_eq!(rewritten, "x_{1}<br/>y^{2}");
    }

    #[tokio::test]
    async fn test_list_rewrite_rules() {
        let rules = list_rewrite_rules().await.unwrap();
        assert_eq!(rules.len(), 9);
        assert_eq!(rules[5], "script_braces");
    }
}
