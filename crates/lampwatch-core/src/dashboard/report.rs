// ── Report rendering ──
//
// Turns an `AnalysisReport` into titled text sections and derives the
// advice paragraphs from the headline numbers.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use lampwatch_api::dashboard::{AnalysisReport, ReportKind};
use serde::Serialize;

const UNKNOWN: &str = "未知";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedReport {
    pub kind: ReportKind,
    /// `日报告 (2025-05-01)`
    pub title: String,
    pub sections: Vec<ReportSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSection {
    pub heading: String,
    pub lines: Vec<String>,
}

impl ReportSection {
    fn new(heading: &str, lines: Vec<String>) -> Self {
        Self {
            heading: heading.to_owned(),
            lines,
        }
    }
}

impl std::fmt::Display for RenderedReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.title)?;
        for section in &self.sections {
            writeln!(f)?;
            writeln!(f, "[{}]", section.heading)?;
            for line in &section.lines {
                writeln!(f, "  {line}")?;
            }
        }
        Ok(())
    }
}

pub fn render(kind: ReportKind, report: &AnalysisReport) -> RenderedReport {
    let date = report
        .timestamp
        .map_or_else(|| UNKNOWN.to_owned(), |t| t.format("%Y-%m-%d").to_string());
    let posture = &report.posture_data;
    let emotion = &report.emotion_data;
    let focus = &report.focus_data;
    let worst_day = posture.worst_day.as_deref().unwrap_or(UNKNOWN);
    let best_hour = focus.best_hour.as_deref().unwrap_or(UNKNOWN);
    let distribution = format_distribution(&emotion.distribution);

    let (title, sections) = match kind {
        ReportKind::Daily => (
            format!("日报告 ({date})"),
            vec![
                ReportSection::new(
                    "坐姿情况",
                    vec![
                        format!("今日坐姿不良次数: {} 次", posture.daily_average),
                        format!("本周累计: {} 次", posture.total_issues),
                    ],
                ),
                ReportSection::new(
                    "情绪状态",
                    vec![
                        format!("主要情绪: {}", emotion.main_emotion),
                        format!("情绪分布: {distribution}"),
                    ],
                ),
                ReportSection::new(
                    "专注度分析",
                    vec![
                        format!("今日平均专注度: {}%", focus.average),
                        format!("最高专注度: {}% ({best_hour})", focus.max),
                        format!("最低专注度: {}%", focus.min),
                    ],
                ),
                ReportSection::new(
                    "建议",
                    vec![daily_suggestions(
                        posture.daily_average,
                        &emotion.main_emotion,
                        focus.average,
                    )],
                ),
            ],
        ),
        ReportKind::Weekly => (
            format!("周报告 ({date})"),
            vec![
                ReportSection::new(
                    "坐姿情况",
                    vec![
                        format!("本周坐姿不良总次数: {} 次", posture.total_issues),
                        format!("日均坐姿不良次数: {} 次", posture.daily_average),
                        format!("坐姿最差的日子: {worst_day}"),
                    ],
                ),
                ReportSection::new(
                    "情绪状态",
                    vec![
                        format!("一周主要情绪: {}", emotion.main_emotion),
                        format!("情绪分布: {distribution}"),
                    ],
                ),
                ReportSection::new(
                    "专注度分析",
                    vec![
                        format!("周平均专注度: {}%", focus.average),
                        format!("最佳学习时间段: {best_hour} (专注度 {}%)", focus.max),
                    ],
                ),
                ReportSection::new(
                    "本周总结",
                    vec![weekly_summary(
                        posture.daily_average,
                        &emotion.main_emotion,
                        focus.average,
                    )],
                ),
                ReportSection::new(
                    "改进建议",
                    vec![weekly_suggestions(
                        posture.daily_average,
                        &emotion.main_emotion,
                        focus.average,
                    )],
                ),
            ],
        ),
    };

    RenderedReport {
        kind,
        title,
        sections,
    }
}

/// `平静(45%), 快乐(30%)`
pub fn format_distribution(distribution: &BTreeMap<String, f64>) -> String {
    distribution
        .iter()
        .map(|(emotion, pct)| format!("{emotion}({pct}%)"))
        .collect::<Vec<_>>()
        .join(", ")
}

// ── Advice ───────────────────────────────────────────────────────────

pub fn daily_suggestions(posture_issues: f64, main_emotion: &str, avg_focus: f64) -> String {
    let mut out = Vec::with_capacity(3);

    out.push(if posture_issues > 4.0 {
        "坐姿需要改善，建议增加休息次数，调整椅子和桌子高度。"
    } else if posture_issues > 2.0 {
        "坐姿情况一般，注意保持正确坐姿，每45分钟起来活动一下。"
    } else {
        "坐姿情况良好，继续保持。"
    });

    match main_emotion {
        "生气" | "悲伤" => out.push("今日情绪较低落，建议安排一些轻松的活动，帮助调节心情。"),
        "困惑" => out.push("孩子今日学习时有些困惑，可能需要额外的学习辅导。"),
        "快乐" | "平静" => out.push("今日情绪良好，是深入学习的好时机。"),
        _ => {}
    }

    out.push(if avg_focus < 50.0 {
        "今日专注度较低，建议检查学习环境是否有干扰因素，或考虑调整学习计划。"
    } else if avg_focus < 70.0 {
        "专注度一般，可以尝试番茄钟工作法来提高专注力。"
    } else {
        "今日专注度良好，可以安排更具挑战性的学习任务。"
    });

    out.join(" ")
}

pub fn weekly_summary(avg_posture: f64, main_emotion: &str, avg_focus: f64) -> String {
    let mut summary = String::from("本周");

    summary.push_str(if avg_posture > 3.0 {
        "坐姿情况不佳，"
    } else if avg_posture > 1.5 {
        "坐姿情况一般，"
    } else {
        "坐姿情况良好，"
    });

    match main_emotion {
        "快乐" | "平静" => summary.push_str("情绪状态积极，"),
        "专注" => summary.push_str("学习专注度高，"),
        other => {
            let _ = write!(summary, "情绪以{other}为主，");
        }
    }

    summary.push_str(if avg_focus > 75.0 {
        "整体学习效率很高。"
    } else if avg_focus > 60.0 {
        "学习效率尚可。"
    } else {
        "学习专注度有待提高。"
    });

    summary
}

pub fn weekly_suggestions(avg_posture: f64, main_emotion: &str, avg_focus: f64) -> String {
    let mut out = Vec::new();

    if avg_posture > 3.0 {
        out.push("建议购买符合人体工学的椅子和桌子，定期提醒孩子保持正确坐姿。");
    } else if avg_posture > 1.5 {
        out.push("适当增加运动时间，强化核心肌群，有助于保持良好坐姿。");
    }

    if matches!(main_emotion, "生气" | "悲伤" | "困惑") {
        out.push("多与孩子沟通，了解学习中的困难，必要时提供专业辅导。");
    }

    if avg_focus < 65.0 {
        out.push("检查学习环境，减少干扰因素，可以尝试白噪音助于集中注意力。");
        out.push("建立规律的作息时间表，将最需要专注的任务安排在精力最充沛的时段。");
    }

    if out.is_empty() {
        return "本周表现良好，继续保持当前的学习和生活习惯。".into();
    }
    out.join(" ")
}

#[cfg(test)]
mod tests {
    use lampwatch_api::dashboard::{ReportEmotion, ReportFocus, ReportPosture};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn daily_suggestions_cover_all_three_areas() {
        let text = daily_suggestions(5.0, "困惑", 45.0);
        assert_eq!(
            text,
            "坐姿需要改善，建议增加休息次数，调整椅子和桌子高度。 \
             孩子今日学习时有些困惑，可能需要额外的学习辅导。 \
             今日专注度较低，建议检查学习环境是否有干扰因素，或考虑调整学习计划。"
        );
    }

    #[test]
    fn daily_suggestions_skip_unknown_emotions() {
        let text = daily_suggestions(1.0, "惊讶", 80.0);
        assert_eq!(
            text,
            "坐姿情况良好，继续保持。 今日专注度良好，可以安排更具挑战性的学习任务。"
        );
    }

    #[test]
    fn weekly_summary_thresholds() {
        assert_eq!(
            weekly_summary(2.0, "平静", 80.0),
            "本周坐姿情况一般，情绪状态积极，整体学习效率很高。"
        );
        assert_eq!(
            weekly_summary(3.5, "悲伤", 50.0),
            "本周坐姿情况不佳，情绪以悲伤为主，学习专注度有待提高。"
        );
        assert_eq!(
            weekly_summary(1.0, "专注", 61.0),
            "本周坐姿情况良好，学习专注度高，学习效率尚可。"
        );
    }

    #[test]
    fn weekly_suggestions_default_when_nothing_to_say() {
        assert_eq!(
            weekly_suggestions(1.0, "快乐", 90.0),
            "本周表现良好，继续保持当前的学习和生活习惯。"
        );
        assert_eq!(weekly_suggestions(2.0, "困惑", 60.0).matches('。').count(), 4);
    }

    #[test]
    fn weekly_report_sections() {
        let report = AnalysisReport {
            timestamp: None,
            posture_data: ReportPosture {
                daily_average: 2.4,
                total_issues: 17.0,
                worst_day: Some("周四".into()),
            },
            emotion_data: ReportEmotion {
                main_emotion: "平静".into(),
                distribution: BTreeMap::from([("平静".to_owned(), 45.0)]),
            },
            focus_data: ReportFocus {
                average: 72.0,
                max: 91.0,
                min: 40.0,
                best_hour: Some("10:00".into()),
            },
        };

        let rendered = render(ReportKind::Weekly, &report);
        assert_eq!(rendered.title, "周报告 (未知)");
        assert_eq!(rendered.sections.len(), 5);
        assert_eq!(rendered.sections[0].lines[0], "本周坐姿不良总次数: 17 次");
        assert_eq!(rendered.sections[0].lines[2], "坐姿最差的日子: 周四");
        assert_eq!(rendered.sections[1].lines[1], "情绪分布: 平静(45%)");
        assert_eq!(rendered.sections[2].lines[1], "最佳学习时间段: 10:00 (专注度 91%)");
        assert!(rendered.to_string().contains("[本周总结]"));
    }
}
