// 画面仲裁器：全局唯一的“当前显示哪个类别”
//
// 状态：
// - NEUTRAL: 无确认类别
// - ACCUMULATING(label): 某类别处于置信区间，仅显示实时状态文字
// - HOLDING(label): 刚确认，display_hold 时间内忽略所有新样本
//
// HOLDING 期间稳定器只做累计/清零（Stabilizer::track），不确认：
// 跌出置信区间的类别照常清空 hold_start，锁定结束后必须重新累计。

use super::sample::Timestamp;
use super::stabilizer::{HoldState, Pending, Stabilizer, Verdict};
use super::stats::SessionStats;
use crate::assets::AssetCatalog;
use crate::config::EngineConfig;
use crate::sinks::{AudioSink, DisplaySink, Scene};
use std::path::Path;
use tracing::{debug, info, warn};

/// 无检测时的状态文字
pub const NO_DETECTION_TEXT: &str = "No detection";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArbiterState {
    pub current_detected_class: Option<String>,
    pub last_detection_time: Timestamp,
    pub last_neutral_time: Timestamp,
}

/// 单帧仲裁结果
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayDecision {
    /// 保持上一画面不变（锁定期内，或中性去抖期内）
    HoldingPrevious { label: Option<String> },
    /// 切换到中性画面
    ShowNeutral,
    /// 处于置信区间但尚未确认，仅更新状态文字
    ShowDetected { label: String, confidence: f64 },
    /// 本帧确认，已触发音效并切换画面
    Confirmed { label: String, confidence: f64 },
}

/// 仲裁器执行副作用所需的上下文
pub struct Effects<'a> {
    pub audio: &'a mut dyn AudioSink,
    pub display: &'a mut dyn DisplaySink,
    pub assets: &'a AssetCatalog,
    pub stats: &'a mut SessionStats,
}

impl Effects<'_> {
    fn status(&mut self, text: &str) {
        if let Err(e) = self.display.render_status_text(text) {
            warn!("[DISPLAY] 状态文字更新失败: {}", e);
            self.stats.sink_failures += 1;
        }
    }

    /// 只有存在对应图片时才切换画面
    fn render(&mut self, scene: &Scene, image: Option<&Path>) {
        let Some(image) = image else {
            return;
        };
        if let Err(e) = self.display.render(scene, Some(image)) {
            warn!("[DISPLAY] 画面切换失败: {}", e);
            self.stats.sink_failures += 1;
        }
    }

    fn play(&mut self, label: &str, clip: &Path) {
        if let Err(e) = self.audio.play(label, clip) {
            // 播放失败不回滚确认状态，冷却期照常生效
            warn!("[AUDIO] 播放失败: {}", e);
            self.stats.sink_failures += 1;
        }
    }
}

#[derive(Debug, Clone)]
pub struct DisplayArbiter {
    state: ArbiterState,
    display_hold_ms: u64,
    neutral_hold_ms: u64,
}

impl DisplayArbiter {
    pub fn new(display_hold_ms: u64, neutral_hold_ms: u64) -> Self {
        Self {
            state: ArbiterState::default(),
            display_hold_ms,
            neutral_hold_ms,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.display_hold_duration_ms, config.neutral_hold_duration_ms)
    }

    pub fn state(&self) -> &ArbiterState {
        &self.state
    }

    /// 处理一帧平滑后的样本
    pub fn tick(
        &mut self,
        label: &str,
        smoothed: f64,
        now: Timestamp,
        hold: &mut HoldState,
        stabilizer: &Stabilizer,
        fx: &mut Effects<'_>,
    ) -> DisplayDecision {
        // 锁定期：无论哪个类别的样本都不触发，只更新累计
        if let Some(current) = &self.state.current_detected_class {
            if now.saturating_sub(self.state.last_detection_time) < self.display_hold_ms {
                if fx.assets.sound_for(label).is_some() {
                    stabilizer.track(hold, smoothed, now);
                } else {
                    stabilizer.reset_hold(hold);
                }
                fx.status(&format!("Detected: {}", current));
                return DisplayDecision::HoldingPrevious { label: Some(current.clone()) };
            }
        }

        let assets = fx.assets;

        if smoothed < stabilizer.thresholds().confidence {
            stabilizer.evaluate(hold, smoothed, now);

            let debounce_passed = now.saturating_sub(self.state.last_neutral_time) > self.neutral_hold_ms;
            if self.state.current_detected_class.is_none() || debounce_passed {
                fx.status(NO_DETECTION_TEXT);
                fx.render(&Scene::Neutral, assets.neutral_image());
                if let Some(previous) = self.state.current_detected_class.take() {
                    info!("[ARBITER] {} -> 中性画面", previous);
                    fx.stats.neutral_transitions += 1;
                }
                self.state.last_neutral_time = now;
                return DisplayDecision::ShowNeutral;
            }
            return DisplayDecision::HoldingPrevious {
                label: self.state.current_detected_class.clone(),
            };
        }

        fx.status(&format!("Detected: {} ({:.1}%)", label, smoothed * 100.0));

        let Some(clip) = assets.sound_for(label) else {
            stabilizer.reset_hold(hold);
            return DisplayDecision::ShowDetected { label: label.to_string(), confidence: smoothed };
        };

        match stabilizer.evaluate(hold, smoothed, now) {
            Verdict::Qualifies => {
                info!("[ARBITER] 确认类别: {} (平滑置信度 {:.3}, t={}ms)", label, smoothed, now);
                fx.play(label, clip);
                hold.last_played = Some(now);
                fx.render(&Scene::Detected(label.to_string()), assets.image_for(label));
                self.state.current_detected_class = Some(label.to_string());
                self.state.last_detection_time = now;
                fx.stats.confirmations += 1;
                DisplayDecision::Confirmed { label: label.to_string(), confidence: smoothed }
            }
            Verdict::NotQualifying(pending) => {
                if let Pending::CoolingDown { remaining_ms } = pending {
                    debug!("[ARBITER] {} 冷却中，剩余 {}ms", label, remaining_ms);
                    fx.stats.suppressed_by_cooldown += 1;
                }
                DisplayDecision::ShowDetected { label: label.to_string(), confidence: smoothed }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::stabilizer::Thresholds;
    use crate::sinks::recording::{RecordingAudioSink, RecordingDisplaySink};

    struct Harness {
        arbiter: DisplayArbiter,
        stabilizer: Stabilizer,
        assets: AssetCatalog,
        audio: RecordingAudioSink,
        display: RecordingDisplaySink,
        stats: SessionStats,
        hold: HoldState,
    }

    impl Harness {
        fn new(hold_time: u64, cooldown: u64, display_hold: u64, neutral_hold: u64) -> Self {
            Self {
                arbiter: DisplayArbiter::new(display_hold, neutral_hold),
                stabilizer: Stabilizer::new(Thresholds { confidence: 0.9, max: 1.0 }, hold_time, cooldown),
                assets: AssetCatalog::new("Neutraal")
                    .with_sound("A", "a.mp3")
                    .with_image("A", "a.png")
                    .with_image("Neutraal", "neutraal.png"),
                audio: RecordingAudioSink::default(),
                display: RecordingDisplaySink::default(),
                stats: SessionStats::default(),
                hold: HoldState::default(),
            }
        }

        fn tick(&mut self, label: &str, smoothed: f64, now: Timestamp) -> DisplayDecision {
            let mut fx = Effects {
                audio: &mut self.audio,
                display: &mut self.display,
                assets: &self.assets,
                stats: &mut self.stats,
            };
            self.arbiter.tick(label, smoothed, now, &mut self.hold, &self.stabilizer, &mut fx)
        }
    }

    #[test]
    fn test_immediate_confirmation() {
        let mut h = Harness::new(0, 0, 0, 500);
        let decision = h.tick("A", 0.95, 0);

        assert_eq!(decision, DisplayDecision::Confirmed { label: "A".to_string(), confidence: 0.95 });
        assert_eq!(h.audio.played(), vec!["A"]);
        assert_eq!(h.display.last_scene(), Some(Scene::Detected("A".to_string())));
        assert_eq!(h.arbiter.state().current_detected_class.as_deref(), Some("A"));
        assert_eq!(h.hold.last_played, Some(0));
        assert_eq!(h.stats.confirmations, 1);
    }

    #[test]
    fn test_accumulating_shows_live_status() {
        let mut h = Harness::new(2000, 4000, 5000, 500);
        let decision = h.tick("A", 0.95, 100);

        assert!(matches!(decision, DisplayDecision::ShowDetected { .. }));
        assert_eq!(h.display.last_status().as_deref(), Some("Detected: A (95.0%)"));
        assert!(h.arbiter.state().current_detected_class.is_none());
        assert!(h.audio.played().is_empty());
    }

    #[test]
    fn test_display_hold_freezes() {
        let mut h = Harness::new(0, 0, 5000, 500);
        h.tick("A", 0.95, 1000);

        let decision = h.tick("B", 0.99, 3000);
        assert_eq!(decision, DisplayDecision::HoldingPrevious { label: Some("A".to_string()) });
        assert_eq!(h.display.last_status().as_deref(), Some("Detected: A"));

        let decision = h.tick("A", 0.1, 5999);
        assert!(matches!(decision, DisplayDecision::HoldingPrevious { .. }));

        // 锁定期结束
        assert_eq!(h.tick("A", 0.1, 6000), DisplayDecision::ShowNeutral);
        assert!(h.arbiter.state().current_detected_class.is_none());
        assert_eq!(h.stats.neutral_transitions, 1);
    }

    #[test]
    fn test_out_of_band_during_display_hold_resets_accumulation() {
        let mut h = Harness::new(2000, 0, 5000, 0);
        h.tick("A", 0.95, 0);
        assert_eq!(h.hold.hold_start, Some(0));

        // 另一类别确认后进入锁定期
        h.arbiter.state.current_detected_class = Some("B".to_string());
        h.arbiter.state.last_detection_time = 2010;

        h.tick("A", 0.10, 3000);
        assert_eq!(h.hold.hold_start, None);

        // 锁定结束后单帧不足以确认
        assert!(matches!(h.tick("A", 0.95, 7100), DisplayDecision::ShowDetected { .. }));
        assert_eq!(h.hold.hold_start, Some(7100));
        assert!(h.audio.played().is_empty());
    }

    #[test]
    fn test_in_band_during_display_hold_keeps_accumulating() {
        let mut h = Harness::new(2000, 0, 5000, 0);
        h.arbiter.state.current_detected_class = Some("B".to_string());
        h.arbiter.state.last_detection_time = 0;

        for t in (1000..5000).step_by(500) {
            let decision = h.tick("A", 0.95, t);
            assert_eq!(decision, DisplayDecision::HoldingPrevious { label: Some("B".to_string()) });
        }
        assert_eq!(h.hold.hold_start, Some(1000));
        assert!(h.audio.played().is_empty());

        // 锁定结束时已累计超过 hold_time
        assert!(matches!(h.tick("A", 0.95, 5000), DisplayDecision::Confirmed { .. }));
        assert_eq!(h.audio.played(), vec!["A"]);
    }

    #[test]
    fn test_display_failure_keeps_state() {
        let mut h = Harness::new(0, 0, 5000, 0);
        h.display = RecordingDisplaySink::failing();

        let decision = h.tick("A", 0.95, 10);
        assert!(matches!(decision, DisplayDecision::Confirmed { .. }));
        assert_eq!(h.arbiter.state().current_detected_class.as_deref(), Some("A"));
        assert_eq!(h.arbiter.state().last_detection_time, 10);
        assert_eq!(h.audio.played(), vec!["A"]);
        // 状态文字与画面各失败一次
        assert_eq!(h.stats.sink_failures, 2);
        assert_eq!(h.display.render_count(), 1);

        // 失败后照常继续
        h.tick("B", 0.99, 100);
        assert_eq!(h.stats.sink_failures, 3);
    }

    #[test]
    fn test_neutral_debounce() {
        let mut h = Harness::new(0, 0, 0, 500);

        // 初始无类别，直接切中性
        assert_eq!(h.tick("A", 0.2, 100), DisplayDecision::ShowNeutral);
        assert_eq!(h.arbiter.state().last_neutral_time, 100);

        h.tick("A", 0.95, 200);
        assert_eq!(h.arbiter.state().current_detected_class.as_deref(), Some("A"));

        // 距上次中性 400ms，不足 500ms，保持
        assert_eq!(
            h.tick("A", 0.2, 500),
            DisplayDecision::HoldingPrevious { label: Some("A".to_string()) }
        );
        // 恰好 500ms 仍不切换（严格大于）
        assert!(matches!(h.tick("A", 0.2, 600), DisplayDecision::HoldingPrevious { .. }));
        assert_eq!(h.tick("A", 0.2, 601), DisplayDecision::ShowNeutral);
        assert_eq!(h.display.last_scene(), Some(Scene::Neutral));
        assert_eq!(h.display.last_status().as_deref(), Some(NO_DETECTION_TEXT));
    }

    #[test]
    fn test_below_threshold_resets_hold() {
        let mut h = Harness::new(2000, 0, 0, 0);
        h.tick("A", 0.95, 0);
        assert_eq!(h.hold.hold_start, Some(0));
        h.tick("A", 0.5, 100);
        assert_eq!(h.hold.hold_start, None);
    }

    #[test]
    fn test_label_without_sound_never_confirms() {
        let mut h = Harness::new(0, 0, 0, 0);
        let decision = h.tick("B", 0.99, 0);
        assert!(matches!(decision, DisplayDecision::ShowDetected { .. }));
        assert_eq!(h.hold.hold_start, None);
        assert!(h.audio.played().is_empty());
    }

    #[test]
    fn test_play_failure_keeps_bookkeeping() {
        let mut h = Harness::new(0, 4000, 0, 0);
        h.audio = RecordingAudioSink::failing();

        let decision = h.tick("A", 0.95, 10);
        assert!(matches!(decision, DisplayDecision::Confirmed { .. }));
        assert_eq!(h.hold.last_played, Some(10));
        assert_eq!(h.arbiter.state().current_detected_class.as_deref(), Some("A"));
        assert_eq!(h.stats.sink_failures, 1);

        // 冷却期照常生效
        assert!(matches!(h.tick("A", 0.95, 20), DisplayDecision::ShowDetected { .. }));
        assert_eq!(h.stats.suppressed_by_cooldown, 1);
    }

    #[test]
    fn test_no_image_skips_render() {
        let mut h = Harness::new(0, 0, 0, 0);
        h.assets = AssetCatalog::new("Neutraal").with_sound("A", "a.mp3");

        h.tick("A", 0.95, 0);
        h.tick("A", 0.1, 10);
        assert_eq!(h.display.render_count(), 0);
        assert_eq!(h.audio.played(), vec!["A"]);
    }
}
