// 检测引擎：平滑 → 稳定 → 仲裁 → 输出
//
// 每个类别的状态在首次出现时创建，引擎存活期间不会淘汰。
// 所有状态只在处理线程内修改，一帧处理完才接受下一帧。

use super::arbiter::{ArbiterState, DisplayArbiter, DisplayDecision, Effects};
use super::sample::{Prediction, PredictionSample, Timestamp};
use super::smoother::SmoothingBuffer;
use super::stabilizer::{HoldState, Stabilizer};
use super::stats::SessionStats;
use crate::assets::AssetCatalog;
use crate::config::EngineConfig;
use crate::error::AppResult;
use crate::sinks::{AudioSink, DisplaySink, Scene};
use std::collections::HashMap;
use tracing::{info, trace, warn};

/// 单个类别的全部状态
#[derive(Debug, Clone)]
pub struct ClassState {
    pub buffer: SmoothingBuffer,
    pub hold: HoldState,
}

impl ClassState {
    fn new(buffer_size: usize) -> Self {
        Self {
            buffer: SmoothingBuffer::new(buffer_size),
            hold: HoldState::default(),
        }
    }
}

pub struct DetectionEngine {
    buffer_size: usize,
    classes: HashMap<String, ClassState>,
    stabilizer: Stabilizer,
    arbiter: DisplayArbiter,
    assets: AssetCatalog,
    audio: Box<dyn AudioSink>,
    display: Box<dyn DisplaySink>,
    stats: SessionStats,
}

impl DetectionEngine {
    pub fn new(
        config: &EngineConfig,
        assets: AssetCatalog,
        audio: Box<dyn AudioSink>,
        display: Box<dyn DisplaySink>,
    ) -> AppResult<Self> {
        config.validate()?;
        info!("[ENGINE] 置信区间=[{}, {}], 保持={}ms, 冷却={}ms, 平滑窗口={}, 画面锁定={}ms, 中性去抖={}ms",
            config.confidence_threshold, config.max_threshold,
            config.hold_time_ms, config.cooldown_ms, config.buffer_size,
            config.display_hold_duration_ms, config.neutral_hold_duration_ms);

        Ok(Self {
            buffer_size: config.buffer_size,
            classes: HashMap::new(),
            stabilizer: Stabilizer::from_config(config),
            arbiter: DisplayArbiter::from_config(config),
            assets,
            audio,
            display,
            stats: SessionStats::default(),
        })
    }

    /// 启动时先显示中性画面
    pub fn start(&mut self) {
        info!("[ENGINE] 初始画面: {}", self.assets.neutral_label());
        if let Some(image) = self.assets.neutral_image() {
            if let Err(e) = self.display.render(&Scene::Neutral, Some(image)) {
                warn!("[DISPLAY] 初始中性画面显示失败: {}", e);
                self.stats.sink_failures += 1;
            }
        }
    }

    /// 处理一帧的全部预测：取最高项后交给 `process`
    ///
    /// 预测为空时返回 `AppError::Sample`，不修改任何状态。
    pub fn process_tick(&mut self, predictions: &[Prediction], now: Timestamp) -> AppResult<DisplayDecision> {
        let sample = PredictionSample::from_top(predictions, now)?;
        Ok(self.process(&sample))
    }

    /// 处理单个样本
    pub fn process(&mut self, sample: &PredictionSample) -> DisplayDecision {
        self.stats.total_ticks += 1;

        let buffer_size = self.buffer_size;
        let class = self
            .classes
            .entry(sample.label.clone())
            .or_insert_with(|| ClassState::new(buffer_size));

        let smoothed = class.buffer.push(sample.probability);
        trace!("[ENGINE] t={} {} 原始={:.3} 平滑={:.3}",
            sample.timestamp, sample.label, sample.probability, smoothed);

        let mut fx = Effects {
            audio: &mut *self.audio,
            display: &mut *self.display,
            assets: &self.assets,
            stats: &mut self.stats,
        };
        self.arbiter.tick(
            &sample.label,
            smoothed,
            sample.timestamp,
            &mut class.hold,
            &self.stabilizer,
            &mut fx,
        )
    }

    /// 记录一次被跳过的帧（预测失败）
    pub fn record_skipped_tick(&mut self) {
        self.stats.skipped_ticks += 1;
    }

    pub fn current_detected_class(&self) -> Option<&str> {
        self.arbiter.state().current_detected_class.as_deref()
    }

    pub fn arbiter_state(&self) -> &ArbiterState {
        self.arbiter.state()
    }

    /// 类别当前的平滑概率（从未出现过的类别为 None）
    pub fn smoothed(&self, label: &str) -> Option<f64> {
        self.classes.get(label).and_then(|c| c.buffer.average())
    }

    pub fn hold_state(&self, label: &str) -> Option<&HoldState> {
        self.classes.get(label).map(|c| &c.hold)
    }

    pub fn known_labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self.classes.keys().map(String::as_str).collect();
        labels.sort_unstable();
        labels
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }
}
