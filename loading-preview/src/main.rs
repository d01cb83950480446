//! # Loading Preview
//!
//! 无界面的预览宿主：按种类或 JSON 预设构建渲染器，用模拟时钟推进，
//! 把每帧的绘制调用以 JSON 或摘要形式输出到 stdout。日志走 stderr。
//!
//! ## 用法
//!
//! ```bash
//! cargo run -p loading-preview -- list
//! cargo run -p loading-preview -- render gear --frames 30 --format summary
//! cargo run -p loading-preview -- render 4 --preset presets/swap.json
//! cargo run -p loading-preview -- render fish --config preview.json --verbose
//! ```

mod config;
mod render;

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use loading_drawable::{
    DrawableError, LoadingDrawable, Rect, RendererConfig, RendererKind, create, create_with,
};
use tracing::{info, level_filters::LevelFilter};

use config::{OutputFormat, PreviewConfig};
use render::record_frames;

#[derive(Parser)]
#[command(name = "loading-preview")]
#[command(about = "加载动画预览工具 - 输出每帧的绘制调用")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// 列出全部渲染器种类
    List,

    /// 渲染若干帧
    Render {
        /// 渲染器名称（如 gear、day_night）或整数 id
        kind: String,

        /// JSON 预设文件
        #[arg(short, long)]
        preset: Option<PathBuf>,

        /// 帧数
        #[arg(short = 'n', long)]
        frames: Option<usize>,

        /// 帧率
        #[arg(long)]
        fps: Option<f32>,

        /// 绘制区域宽度
        #[arg(long)]
        width: Option<f32>,

        /// 绘制区域高度
        #[arg(long)]
        height: Option<f32>,

        /// 输出格式
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// 宿主配置文件
        #[arg(short, long, default_value = "preview.json")]
        config: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("loading-preview error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::List => list_kinds(),
        Commands::Render {
            kind,
            preset,
            frames,
            fps,
            width,
            height,
            format,
            config,
        } => {
            let mut preview = PreviewConfig::load(&config);
            // 命令行覆盖配置文件
            if let Some(frames) = frames {
                preview.frames = frames;
            }
            if let Some(fps) = fps {
                preview.fps = fps;
            }
            if width.is_some() {
                preview.width = width;
            }
            if height.is_some() {
                preview.height = height;
            }
            if let Some(format) = format {
                preview.output = format;
            }
            preview.validate()?;

            let kind: RendererKind = kind.parse()?;
            let drawable = build_drawable(kind, preset.as_deref())?;
            render(drawable, &preview)
        }
    }
}

fn list_kinds() -> anyhow::Result<()> {
    println!("{:>3}  {:<14} {:<14} {:>9}  {:>7}", "id", "name", "family", "duration", "size");
    for kind in RendererKind::ALL {
        let renderer = create(kind);
        println!(
            "{:>3}  {:<14} {:<14} {:>7}ms  {:>3}x{:<3}",
            kind.id(),
            kind.name(),
            format!("{:?}", kind.family()),
            renderer.duration().as_millis(),
            renderer.width(),
            renderer.height()
        );
    }
    Ok(())
}

/// 构建可绘制对象，有预设时按预设配置
fn build_drawable(
    kind: RendererKind,
    preset: Option<&std::path::Path>,
) -> anyhow::Result<LoadingDrawable> {
    let Some(path) = preset else {
        return Ok(LoadingDrawable::from_kind(kind));
    };

    let json = fs::read_to_string(path)
        .with_context(|| format!("读取预设失败: {}", path.display()))?;
    let config = RendererConfig::from_json(&json)
        .with_context(|| format!("解析预设失败: {}", path.display()))?;
    if config.kind() != kind {
        return Err(DrawableError::ConfigKindMismatch {
            expected: kind.name().to_string(),
            found: config.kind().name().to_string(),
        }
        .into());
    }
    info!(preset = %path.display(), kind = %kind, "应用预设");
    Ok(LoadingDrawable::new(create_with(&config)))
}

fn render(mut drawable: LoadingDrawable, preview: &PreviewConfig) -> anyhow::Result<()> {
    let width = preview.width.unwrap_or(drawable.intrinsic_width());
    let height = preview.height.unwrap_or(drawable.intrinsic_height());
    info!(
        kind = %drawable.renderer().kind(),
        width,
        height,
        frames = preview.frames,
        fps = preview.fps,
        "开始录制"
    );

    let records = record_frames(
        &mut drawable,
        Rect::from_size(width, height),
        preview.frames,
        preview.fps,
    )?;

    match preview.output {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&records).context("序列化帧失败")?;
            println!("{json}");
        }
        OutputFormat::Summary => {
            for record in &records {
                println!("{}", record.summary());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_render() {
        let cli = Cli::try_parse_from([
            "loading-preview",
            "render",
            "gear",
            "--frames",
            "12",
            "--format",
            "summary",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Render {
                kind,
                frames,
                format,
                ..
            } => {
                assert_eq!(kind, "gear");
                assert_eq!(frames, Some(12));
                assert_eq!(format, Some(OutputFormat::Summary));
            }
            Commands::List => panic!("expected render"),
        }
    }

    #[test]
    fn test_build_drawable_without_preset() {
        let drawable = build_drawable(RendererKind::Fish, None).unwrap();
        assert_eq!(drawable.renderer().kind(), RendererKind::Fish);
    }

    #[test]
    fn test_build_drawable_missing_preset() {
        let result = build_drawable(
            RendererKind::Gear,
            Some(std::path::Path::new("no/such/preset.json")),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_kind_is_error() {
        assert!("not_a_kind".parse::<RendererKind>().is_err());
        assert!("99".parse::<RendererKind>().is_err());
    }
}
