use anyhow::{bail, Context, Result};
use elemento::commands::{self, RendererState};
use elemento::config::AppConfig;
use elemento::logging::init_logging;
use elemento::services::render_page;
use std::io::Read;
use std::path::PathBuf;
use std::{env, process};

const USAGE: &str = "用法: elemento [--json | --html | --page] [--problem <题目>] [--config <配置文件>] [文件]";

#[derive(Debug, Clone, Copy, PartialEq)]
enum OutputFormat {
    Json,
    Html,
    Page,
}

#[derive(Debug)]
struct CliArgs {
    format: OutputFormat,
    problem: Option<String>,
    config_path: Option<PathBuf>,
    input_path: Option<PathBuf>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<CliArgs> {
    let mut cli = CliArgs {
        format: OutputFormat::Json,
        problem: None,
        config_path: None,
        input_path: None,
    };

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--json" => cli.format = OutputFormat::Json,
            "--html" => cli.format = OutputFormat::Html,
            "--page" => cli.format = OutputFormat::Page,
            "--problem" => {
                cli.problem = Some(args.next().context("--problem 缺少参数")?);
            }
            "--config" => {
                cli.config_path = Some(PathBuf::from(args.next().context("--config 缺少参数")?));
            }
            flag if flag.starts_with("--") => bail!("未知参数: {}\n{}", flag, USAGE),
            path => {
                if cli.input_path.is_some() {
                    bail!("只能指定一个输入文件\n{}", USAGE);
                }
                cli.input_path = Some(PathBuf::from(path));
            }
        }
    }

    Ok(cli)
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("读取文件失败: {}", path.display())),
        None => {
            let mut content = String::new();
            std::io::stdin()
                .read_to_string(&mut content)
                .context("读取标准输入失败")?;
            Ok(content)
        }
    }
}

async fn run() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("{}", USAGE);
        return Ok(());
    }
    let cli = parse_args(args)?;

    let config = match &cli.config_path {
        Some(path) => AppConfig::load_from_path(path)?
            .with_context(|| format!("配置文件不存在: {}", path.display()))?,
        None => AppConfig::default(),
    };
    init_logging(config.log_level_filter()?)?;

    let state = RendererState::from_config(&config);
    let content = read_input(cli.input_path.as_ref())?;
    log::info!("读取解题文本 {} 字节", content.len());

    let output = match cli.format {
        OutputFormat::Json => {
            let dto = commands::render_solution(&state, content, cli.problem)
                .await
                .map_err(anyhow::Error::msg)?;
            serde_json::to_string_pretty(&dto)?
        }
        OutputFormat::Html => commands::render_solution_html(&state, content)
            .await
            .map_err(anyhow::Error::msg)?,
        OutputFormat::Page => {
            let blocks = state.parser.parse(&content);
            render_page(cli.problem.as_deref(), &blocks, &state.html)
        }
    };

    println!("{}", output);
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("错误: {:#}", e);
        process::exit(1);
    }
}
