// 会话统计

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    /// 已处理的帧数
    pub total_ticks: u64,
    /// 因预测失败跳过的帧数
    pub skipped_ticks: u64,
    /// 确认（触发音效）次数
    pub confirmations: u64,
    /// 达到保持时间但被冷却期压制的次数
    pub suppressed_by_cooldown: u64,
    /// 从已确认画面切回中性画面的次数
    pub neutral_transitions: u64,
    /// 播放/渲染失败次数
    pub sink_failures: u64,
}
