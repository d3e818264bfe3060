// GestureCue - 主入口文件

use clap::Parser;
use gesturecue::assets::AssetCatalog;
use gesturecue::config;
use gesturecue::detection::DetectionEngine;
use gesturecue::error::{AppError, AppResult};
use gesturecue::logging;
use gesturecue::runner::{self, RunOptions, SessionReport};
use gesturecue::sinks::audio::{CommandAudioSink, NullAudioSink};
use gesturecue::sinks::display::ConsoleDisplaySink;
use gesturecue::sinks::AudioSink;
use gesturecue::source::ReplaySource;
use gesturecue::utils::{generate_id, get_app_data_dir, resolve_relative};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "gesturecue", about = "手势识别稳定化与音效触发")]
struct Args {
    /// 配置文件路径（默认: <数据目录>/config.json）
    #[arg(long)]
    config: Option<PathBuf>,
    /// 数据目录（日志、配置、资源的基准目录）
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// 回放文件（JSON lines），覆盖配置中的 source.replay_path
    #[arg(long)]
    replay: Option<PathBuf>,
    /// 最多处理的帧数
    #[arg(long)]
    max_ticks: Option<u64>,
    /// 结束时写入会话统计（JSON）
    #[arg(long)]
    stats: Option<PathBuf>,
    /// 关闭音效播放
    #[arg(long)]
    no_audio: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let app_dir = args.data_dir.clone().unwrap_or_else(get_app_data_dir);

    if let Err(e) = std::fs::create_dir_all(&app_dir) {
        eprintln!("创建应用数据目录失败: {}", e);
    }

    let config_path = args.config.clone().unwrap_or_else(|| app_dir.join("config.json"));
    let config_result = config::init_config(&config_path);
    let app_config = config::get_config();

    // guard 必须保持存活，否则异步日志线程会退出
    let _log_guard = logging::init_logging(&app_dir, &app_config.log_level);

    // 配置先于日志加载，其结果在日志就绪后补记
    match config_result {
        Ok(origin) => origin.report(&config_path),
        Err(e) => warn!("配置初始化失败，使用默认配置: {}", e),
    }

    info!("GestureCue 启动中... 数据目录: {:?}", app_dir);

    if let Err(e) = run(args, app_dir).await {
        error!("运行失败: {}", e);
        eprintln!("运行失败: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args, app_dir: PathBuf) -> AppResult<()> {
    let app_config = config::get_config();
    let session_id = generate_id();
    let started_at = chrono::Local::now();
    info!("[MAIN] 会话: {}", session_id);

    let replay_path = args
        .replay
        .or_else(|| app_config.source.replay_path.clone())
        .map(|p| resolve_relative(&app_dir, &p))
        .ok_or_else(|| AppError::SourceUnavailable("未配置识别源（--replay 或 source.replay_path）".to_string()))?;

    // 识别源不可用时直接退出，不启动循环
    let mut source = ReplaySource::open(&replay_path).await?;

    let assets = AssetCatalog::from_config(&app_config.assets, &app_dir)?;
    let audio: Box<dyn AudioSink> = if args.no_audio || !app_config.audio.enabled {
        Box::new(NullAudioSink)
    } else {
        Box::new(CommandAudioSink::from_config(&app_config.audio))
    };
    let mut engine = DetectionEngine::new(
        &app_config.engine,
        assets,
        audio,
        Box::new(ConsoleDisplaySink::stdout()),
    )?;

    let cancel_flag = Arc::new(AtomicBool::new(false));
    {
        let cancel_flag = cancel_flag.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("[MAIN] 收到中断信号，停止检测");
                cancel_flag.store(true, Ordering::SeqCst);
            }
        });
    }

    let options = RunOptions {
        frame_interval_ms: app_config.source.frame_interval_ms,
        max_ticks: args.max_ticks.or(app_config.source.max_ticks),
    };
    let stats = runner::run(&mut source, &mut engine, &options, cancel_flag).await?;

    if let Some(path) = args.stats {
        SessionReport::new(session_id, started_at, stats).write(&path)?;
    }

    info!("GestureCue 已退出");
    Ok(())
}
