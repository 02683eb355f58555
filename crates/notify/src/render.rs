use kizashi_core::score::entity::AlertEvent;

/// # Summary
/// 把一个周期的告警渲染为通知标题与正文。
///
/// # Logic
/// 1. 标题包含周期编号与告警数量。
/// 2. 正文每行一个标的：`SYMBOL: previous -> current (+delta)`，按输入顺序。
///
/// # Returns
/// 无告警时返回 None。
pub fn render_alerts(cycle: u64, alerts: &[AlertEvent]) -> Option<(String, String)> {
    if alerts.is_empty() {
        return None;
    }
    let subject = format!("Sentiment change: {} symbol(s) in cycle {}", alerts.len(), cycle);
    let content = alerts
        .iter()
        .map(|a| {
            let delta = a.current - a.previous;
            let arrow = if delta.is_sign_negative() { "▼" } else { "▲" };
            format!(
                "{} {}: {} -> {} ({:+})",
                arrow,
                a.symbol,
                a.previous.normalize(),
                a.current.normalize(),
                delta.normalize()
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    Some((subject, content))
}
