// ==========================================
// 原木下料优化系统 - 方案输出
// ==========================================
// 格式: 文本（人工阅读） / JSON（系统对接）
// ==========================================

use crate::domain::plan::{CuttingPlan, PlanReport};
use crate::engine::error::PlanResult;
use crate::engine::orchestrator::ModeComparison;
use anyhow::Context;
use std::fmt::Write as _;

/// 文本格式方案
pub fn render_text(plan: &CuttingPlan) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "目标模式: {}", plan.mode);
    if let Some(set) = &plan.selected_set {
        let _ = writeln!(out, "选中原木组: {}", set);
    }

    let _ = writeln!(out, "下料方案:");
    if plan.lines.is_empty() {
        let _ = writeln!(out, "  （无切割）");
    }
    for line in &plan.lines {
        let _ = writeln!(
            out,
            "  板材 {} (长度 {}) ← 原木 {} × {}",
            line.board_index,
            line.board_length,
            line.log_descriptor(),
            line.count
        );
    }

    let _ = writeln!(out, "需求满足:");
    for f in &plan.fulfilment {
        let _ = writeln!(
            out,
            "  板材 {}: 需求 {} / 产出 {} / 超产 {}",
            f.board_index, f.demand, f.produced, f.surplus
        );
    }

    let _ = writeln!(out, "原木利用:");
    for u in &plan.log_usage {
        let _ = writeln!(
            out,
            "  {}#{}: {:.2} / {:.2} ({:.1}%)",
            u.set_key,
            u.log_index,
            u.length_used,
            u.length_available,
            u.utilisation * 100.0
        );
    }

    let _ = writeln!(out, "总出板数: {}", plan.total_boards_cut);
    if let Some(wastage) = plan.total_wastage {
        let _ = writeln!(out, "材积损耗: {:.2}", wastage);
    }
    let _ = writeln!(out, "目标函数值: {:.4}", plan.objective_value);
    out
}

/// JSON 格式方案
pub fn render_json(report: &PlanReport) -> PlanResult<String> {
    Ok(serde_json::to_string_pretty(report).context("方案 JSON 序列化失败")?)
}

/// 多模式对比（文本）
pub fn render_comparison(results: &[ModeComparison]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<34} {:>8} {:>12} {:>12}  {}", "模式", "出板数", "损耗", "目标值", "选中组/错误");

    for r in results {
        match (&r.plan, &r.error) {
            (Some(plan), _) => {
                let wastage = plan
                    .total_wastage
                    .map(|w| format!("{:.2}", w))
                    .unwrap_or_else(|| "-".to_string());
                let set = plan
                    .selected_set
                    .as_ref()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "-".to_string());
                let _ = writeln!(
                    out,
                    "{:<34} {:>8} {:>12} {:>12.4}  {}",
                    r.mode.as_str(),
                    plan.total_boards_cut,
                    wastage,
                    plan.objective_value,
                    set
                );
            }
            (None, error) => {
                let _ = writeln!(
                    out,
                    "{:<34} {:>8} {:>12} {:>12}  {}",
                    r.mode.as_str(),
                    "-",
                    "-",
                    "-",
                    error.as_deref().unwrap_or("未知错误")
                );
            }
        }
    }
    out
}

/// 多模式对比（JSON）
pub fn render_comparison_json(results: &[ModeComparison]) -> PlanResult<String> {
    Ok(serde_json::to_string_pretty(results).context("对比结果 JSON 序列化失败")?)
}
