// 命令模块
// 提供供前端调用的命令接口

pub mod solution;

pub use solution::{
    render_solution,
    render_solution_html,
    render_solutions,
    rewrite_math,
    list_rewrite_rules,
    RendererState,
    SolutionInput,
    RenderedBlockDto,
    RenderedSolutionDto,
};
