//! # xtask - 开发辅助工具
//!
//! 提供本地质量门禁与开发辅助命令。
//!
//! ## 命令
//!
//! - `check-all`: 运行 fmt、clippy、test
//! - `cov-core`: 运行 loading-drawable 覆盖率
//! - `preset-check`: 检查 presets/ 下的渲染器预设

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use loading_drawable::{
    LoadingDrawable, RecordingCanvas, Rect, RendererConfig, create,
};
use walkdir::WalkDir;
use xshell::{Shell, cmd};

/// 预设检查时模拟的帧数
const PRESET_CHECK_FRAMES: usize = 90;

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        eprintln!("xtask error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let sub = args.next().unwrap_or_else(|| "help".to_string());

    match sub.as_str() {
        "check-all" => {
            let sh = Shell::new()?;

            eprintln!("\n==> cargo fmt --all -- --check");
            cmd!(sh, "cargo fmt --all -- --check").run()?;

            eprintln!("\n==> cargo clippy --workspace --all-targets");
            cmd!(sh, "cargo clippy --workspace --all-targets").run()?;

            eprintln!("\n==> cargo test --workspace");
            cmd!(sh, "cargo test --workspace").run()?;
        }
        "cov-core" => {
            let sh = Shell::new()?;
            ensure_cargo_llvm_cov_available(&sh)?;

            eprintln!("\n==> cargo llvm-cov -p loading-drawable --html");
            cmd!(sh, "cargo llvm-cov -p loading-drawable --html").run()?;

            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        "preset-check" => {
            let path = args.next();
            preset_check(path.as_deref())?;
        }
        "help" | "-h" | "--help" => {
            print_help();
        }
        other => anyhow::bail!("unknown xtask subcommand: {other}"),
    }

    Ok(())
}

fn ensure_cargo_llvm_cov_available(sh: &Shell) -> anyhow::Result<()> {
    match cmd!(sh, "cargo llvm-cov --version").quiet().read() {
        Ok(_) => Ok(()),
        Err(_) => anyhow::bail!(
            "cargo llvm-cov 不可用。\n\
请先安装：\n\
  - cargo install cargo-llvm-cov\n\
  - rustup component add llvm-tools-preview\n\
然后重试。"
        ),
    }
}

fn print_help() {
    eprintln!(
        r#"xtask - 开发辅助工具

USAGE:
  cargo xtask <command>

COMMANDS:
  check-all       运行 fmt、clippy、test 门禁检查
  cov-core        运行 loading-drawable 覆盖率报告
  preset-check    检查渲染器预设

PRESET-CHECK:
  cargo xtask preset-check [path]

  不带参数：检查 presets/ 下所有 .json 文件
  带路径参数：检查指定文件或目录

  检查内容：
    - JSON 能否解析为渲染器配置
    - 配置能否应用到对应渲染器
    - 模拟若干帧后绘制调用的 save/restore 是否配对

ALIASES (in .cargo/config.toml):
  cargo check-all     -> cargo xtask check-all
  cargo cov-core      -> cargo xtask cov-core
  cargo preset-check  -> cargo xtask preset-check
"#
    );
}

//=============================================================================
// preset-check 命令实现
//=============================================================================

/// 默认预设目录（相对于 workspace root）
const PRESETS_DIR: &str = "presets";

/// 单个预设的问题
struct PresetProblem {
    file: PathBuf,
    message: String,
}

/// 执行预设检查
fn preset_check(path: Option<&str>) -> anyhow::Result<()> {
    let root = PathBuf::from(path.unwrap_or(PRESETS_DIR));
    if !root.exists() {
        anyhow::bail!(
            "路径不存在: {}\n请在 workspace 根目录运行，或指定预设路径",
            root.display()
        );
    }

    let files = collect_preset_files(&root);
    if files.is_empty() {
        eprintln!("未找到预设文件（.json）");
        return Ok(());
    }

    eprintln!("==> 检查 {} 个预设文件...\n", files.len());

    let mut problems = Vec::new();
    for file in &files {
        if let Err(message) = check_preset_file(file) {
            problems.push(PresetProblem {
                file: file.clone(),
                message,
            });
        }
    }

    eprintln!("─────────────────────────────────────────────────────");
    eprintln!("检查完成: {} 个预设", files.len());
    eprintln!();
    for problem in &problems {
        eprintln!("[ERROR] {}: {}", problem.file.display(), problem.message);
    }

    if problems.is_empty() {
        eprintln!("✅ 检查通过，无错误");
        Ok(())
    } else {
        eprintln!("❌ {} 个错误", problems.len());
        anyhow::bail!("预设检查发现错误");
    }
}

/// 收集预设文件，按路径排序
fn collect_preset_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    files
}

/// 检查单个预设文件
fn check_preset_file(file: &Path) -> Result<(), String> {
    let json = std::fs::read_to_string(file).map_err(|e| format!("无法读取文件 - {e}"))?;
    check_preset(&json)?;
    eprintln!("[OK] {}", file.display());
    Ok(())
}

/// 解析、应用并试跑一段预设
fn check_preset(json: &str) -> Result<(), String> {
    let config = RendererConfig::from_json(json).map_err(|e| e.to_string())?;

    let mut renderer = create(config.kind());
    renderer.configure(&config).map_err(|e| e.to_string())?;

    let bounds = Rect::from_size(renderer.width(), renderer.height());
    let step = renderer.duration() / 30;
    let mut drawable = LoadingDrawable::new(renderer);
    drawable.on_bounds_changed(bounds);
    drawable.start();

    let mut canvas = RecordingCanvas::new();
    for frame in 0..PRESET_CHECK_FRAMES {
        drawable.advance(step.max(Duration::from_millis(1)));
        drawable.paint(&mut canvas);
        if canvas.depth() != 0 {
            return Err(format!("第 {frame} 帧 save/restore 不配对"));
        }
        canvas.take_ops();
    }
    Ok(())
}
