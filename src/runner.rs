// 运行循环
//
// 严格串行：一帧完整处理（平滑 → 稳定 → 仲裁 → 输出）后才请求下一帧。
// 帧之间按 frame_interval 挂起；取消标志在每帧开始前检查。

use crate::detection::{DetectionEngine, SessionStats, Timestamp};
use crate::error::AppResult;
use crate::source::ClassifierSource;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// 单调时钟，毫秒
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }

    pub fn now_ms(&self) -> Timestamp {
        self.origin.elapsed().as_millis() as Timestamp
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// 帧间隔，0 表示不限速
    pub frame_interval_ms: u64,
    /// 最多处理的帧数（含跳过的帧）
    pub max_ticks: Option<u64>,
}

/// 驱动识别源直到结束、达到帧数上限或被取消
pub async fn run<S: ClassifierSource>(
    source: &mut S,
    engine: &mut DetectionEngine,
    options: &RunOptions,
    cancel_flag: Arc<AtomicBool>,
) -> AppResult<SessionStats> {
    info!("[RUNNER] === 开始检测循环 === 帧间隔={}ms, 帧数上限={:?}",
        options.frame_interval_ms, options.max_ticks);

    let clock = MonotonicClock::new();
    let mut interval = (options.frame_interval_ms > 0).then(|| {
        let mut interval = tokio::time::interval(Duration::from_millis(options.frame_interval_ms));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    });

    engine.start();

    let mut ticks: u64 = 0;
    loop {
        if cancel_flag.load(Ordering::SeqCst) {
            info!("[RUNNER] 检测循环被取消");
            break;
        }
        if options.max_ticks.is_some_and(|max| ticks >= max) {
            info!("[RUNNER] 达到帧数上限: {}", ticks);
            break;
        }
        if let Some(interval) = interval.as_mut() {
            interval.tick().await;
        }
        ticks += 1;

        let tick = match source.next_prediction().await {
            Ok(Some(tick)) => tick,
            Ok(None) => {
                info!("[RUNNER] 识别源已结束");
                break;
            }
            Err(e) => {
                warn!("[RUNNER] 获取预测失败，跳过本帧: {}", e);
                engine.record_skipped_tick();
                continue;
            }
        };

        let now = tick.timestamp.unwrap_or_else(|| clock.now_ms());
        match engine.process_tick(&tick.predictions, now) {
            Ok(decision) => debug!("[RUNNER] t={} {:?}", now, decision),
            Err(e) => {
                warn!("[RUNNER] 跳过本帧: {}", e);
                engine.record_skipped_tick();
            }
        }
    }

    let stats = engine.stats().clone();
    info!("[RUNNER] === 检测循环结束 === 总帧数={}, 跳过={}, 确认={}, 冷却压制={}, 输出失败={}",
        stats.total_ticks, stats.skipped_ticks, stats.confirmations,
        stats.suppressed_by_cooldown, stats.sink_failures);
    Ok(stats)
}

/// 会话报告（写入统计文件）
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub session_id: String,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    pub stats: SessionStats,
}

impl SessionReport {
    pub fn new(session_id: String, started_at: DateTime<Local>, stats: SessionStats) -> Self {
        Self {
            session_id,
            started_at,
            finished_at: Local::now(),
            stats,
        }
    }

    pub fn write(&self, path: &Path) -> AppResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("[RUNNER] 会话统计已写入: {}", path.display());
        Ok(())
    }
}
