//! Synthetic payloads installed when a fetch fails.
//!
//! The stores keep the screen populated when the backend is unreachable;
//! these are the values they fall back to, together with the error texts
//! they record. Anything time-relative is computed from the `now` passed in.

use chrono::{DateTime, Duration, Utc};
use lampwatch_api::models::{
    DeviceSettings, DeviceStatus, EmotionData, EmotionSample, EyeData, PostureData,
    PostureDistribution, PostureHistory, PostureImage, PostureImprovement, TimeRange,
};

pub const PLACEHOLDER_IMAGE: &str = "/static/mobile/placeholder.jpg";

// ── Error texts ──────────────────────────────────────────────────────

pub const DEVICE_INFO_ERROR: &str = "获取设备信息失败";
pub const DEVICE_STATUS_ERROR: &str = "获取设备状态失败，使用模拟数据";
pub const DEVICE_SETTINGS_ERROR: &str = "获取设备设置失败，使用模拟数据";
pub const UPDATE_SETTINGS_ERROR: &str = "更新设备设置失败";
pub const POSTURE_ERROR: &str = "获取坐姿数据失败，使用模拟数据";
pub const DISTRIBUTION_ERROR: &str = "获取坐姿时间分布数据失败，使用模拟数据";
pub const IMAGES_ERROR: &str = "获取坐姿图像记录失败，使用模拟数据";
pub const EYE_ERROR: &str = "获取用眼数据失败，使用模拟数据";
pub const EMOTION_ERROR: &str = "获取情绪数据失败，使用模拟数据";
pub const USER_INFO_ERROR: &str = "获取用户信息失败";
pub const UPDATE_USER_ERROR: &str = "更新用户设置失败";
pub const NOTIFICATIONS_ERROR: &str = "获取通知设置失败";
pub const UPDATE_NOTIFICATIONS_ERROR: &str = "更新通知设置失败";
pub const LAMP_STATUS_ERROR: &str = "获取台灯状态失败";
pub const REMINDER_ERROR: &str = "发送提醒失败";

pub fn history_error(range: TimeRange) -> String {
    format!("获取{}坐姿数据失败，使用模拟数据", range.label())
}

// ── Device ───────────────────────────────────────────────────────────

pub fn device_status(now: DateTime<Utc>) -> DeviceStatus {
    DeviceStatus {
        online: true,
        last_seen: Some(now),
        battery_level: Some(85),
        charging: true,
        ..DeviceStatus::default()
    }
}

pub fn device_settings() -> DeviceSettings {
    DeviceSettings {
        brightness: 70,
        color_temperature: 5500,
        auto_adjust: true,
        ..DeviceSettings::default()
    }
}

// ── Posture ──────────────────────────────────────────────────────────

pub fn posture(now: DateTime<Utc>) -> PostureData {
    PostureData {
        current_score: Some(85.0),
        warn_count: 3,
        average_score: Some(78.0),
        last_detected: Some(now),
        ..PostureData::default()
    }
}

pub fn posture_history(range: TimeRange) -> PostureHistory {
    let (good, mild, bad, rate, slot, message) = match range {
        TimeRange::Day => ("3.2", "1.2", "0.6", "64", "下午3-5点", "今天坐姿良好，请继续保持。"),
        TimeRange::Week => (
            "18.5",
            "7.3",
            "4.2",
            "62",
            "周四下午",
            "本周坐姿改善效果明显，请继续保持良好习惯。",
        ),
        TimeRange::Month => (
            "72.4",
            "31.6",
            "16.0",
            "60",
            "下午时段",
            "本月总体坐姿较好，但下午时段仍需注意。",
        ),
    };
    PostureHistory {
        good_time: good.into(),
        mild_time: mild.into(),
        bad_time: bad.into(),
        good_rate: rate.into(),
        problem_time_slot: slot.into(),
        improvement_message: message.into(),
    }
}

pub fn posture_distribution(range: TimeRange) -> PostureDistribution {
    let buckets: [u8; 12] = match range {
        TimeRange::Day => [2, 1, 0, 3, 4, 2, 1, 0, 5, 3, 1, 0],
        TimeRange::Week => [3, 2, 1, 5, 7, 4, 2, 1, 8, 6, 3, 1],
        TimeRange::Month => [4, 3, 2, 6, 8, 5, 3, 2, 9, 7, 4, 2],
    };
    buckets.into_iter().map(f64::from).collect()
}

/// `limit` placeholder frames for `page`, one hour apart going back from
/// `now`. Scores are a fixed spread in `0..100`.
pub fn posture_images(page: u32, limit: u32, now: DateTime<Utc>) -> Vec<PostureImage> {
    (0..limit)
        .map(|i| PostureImage {
            id: format!("img_{page}_{i}"),
            url: PLACEHOLDER_IMAGE.into(),
            thumbnail: None,
            timestamp: Some(now - Duration::hours(i64::from(i))),
            score: Some(f64::from((page * 37 + i * 53) % 100)),
            posture_type: None,
            is_good_posture: None,
            note: None,
        })
        .collect()
}

pub fn posture_improvement() -> PostureImprovement {
    PostureImprovement {
        problem_time_slot: "下午3-5点".into(),
        improvement_message: "本周坐姿改善效果明显，请继续保持良好习惯。".into(),
    }
}

// ── Eye / emotion ────────────────────────────────────────────────────

pub fn eye(now: DateTime<Utc>) -> EyeData {
    EyeData {
        eye_distance: Some(45.0),
        screen_time: 7200,
        break_reminder: Some("每30分钟".into()),
        last_warning: Some(now - Duration::minutes(15)),
        ..EyeData::default()
    }
}

pub fn emotion(now: DateTime<Utc>) -> EmotionData {
    EmotionData {
        current_emotion: Some("happy".into()),
        confidence: Some(0.92),
        history: vec![
            EmotionSample {
                time: Some(now - Duration::minutes(30)),
                emotion: "neutral".into(),
                duration: 1200,
            },
            EmotionSample {
                time: Some(now - Duration::minutes(15)),
                emotion: "happy".into(),
                duration: 900,
            },
        ],
    }
}
