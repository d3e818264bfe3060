// 稳定器：把“瞬时置信”变成“确认且去抖”的检测
//
// 每个类别维护 hold_start（本轮连续处于置信区间的起点）和 last_played（上次确认时间）。
// 持续时间达到 hold_time 且不在冷却期内才确认；一轮达到 hold_time 后无论是否确认
// 都清空 hold_start，下一次确认必须重新累计完整的 hold_time。

use super::sample::Timestamp;
use crate::config::EngineConfig;
use tracing::debug;

/// 置信区间 [confidence, max]，两端均包含
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub confidence: f64,
    pub max: f64,
}

impl Thresholds {
    pub fn contains(&self, probability: f64) -> bool {
        probability >= self.confidence && probability <= self.max
    }
}

/// 单个类别的保持/冷却状态
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HoldState {
    pub hold_start: Option<Timestamp>,
    pub last_played: Option<Timestamp>,
}

/// 未确认的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pending {
    /// 平滑后的概率不在置信区间内，累计清零
    OutOfBand,
    /// 仍在累计
    Accumulating { elapsed_ms: u64 },
    /// 已达到 hold_time 但仍在冷却期
    CoolingDown { remaining_ms: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Qualifies,
    NotQualifying(Pending),
}

#[derive(Debug, Clone)]
pub struct Stabilizer {
    thresholds: Thresholds,
    hold_time_ms: u64,
    cooldown_ms: u64,
}

impl Stabilizer {
    pub fn new(thresholds: Thresholds, hold_time_ms: u64, cooldown_ms: u64) -> Self {
        Self { thresholds, hold_time_ms, cooldown_ms }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            Thresholds {
                confidence: config.confidence_threshold,
                max: config.max_threshold,
            },
            config.hold_time_ms,
            config.cooldown_ms,
        )
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// 评估一帧平滑后的概率并更新 hold_start
    ///
    /// last_played 由调用方在确认后写入。
    pub fn evaluate(&self, hold: &mut HoldState, smoothed: f64, now: Timestamp) -> Verdict {
        if !self.thresholds.contains(smoothed) {
            hold.hold_start = None;
            return Verdict::NotQualifying(Pending::OutOfBand);
        }

        let start = *hold.hold_start.get_or_insert(now);
        let elapsed_ms = now.saturating_sub(start);
        if elapsed_ms < self.hold_time_ms {
            return Verdict::NotQualifying(Pending::Accumulating { elapsed_ms });
        }

        hold.hold_start = None;

        match hold.last_played {
            Some(last) if now.saturating_sub(last) <= self.cooldown_ms => {
                let remaining_ms = self.cooldown_ms - now.saturating_sub(last);
                debug!("[STABILIZER] 达到保持时间但仍在冷却期，剩余 {}ms", remaining_ms);
                Verdict::NotQualifying(Pending::CoolingDown { remaining_ms })
            }
            _ => Verdict::Qualifies,
        }
    }

    /// 只更新累计，不做确认判定（画面锁定期内使用）
    ///
    /// 不在置信区间时清空 hold_start，否则从 now 开始（或继续）累计。
    pub fn track(&self, hold: &mut HoldState, smoothed: f64, now: Timestamp) {
        if self.thresholds.contains(smoothed) {
            hold.hold_start.get_or_insert(now);
        } else {
            hold.hold_start = None;
        }
    }

    /// 清空累计（没有音效映射的类别不参与确认）
    pub fn reset_hold(&self, hold: &mut HoldState) {
        hold.hold_start = None;
    }
}
