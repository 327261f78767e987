// ==========================================
// 原木下料优化系统 - LP 文件导出
// ==========================================
// 格式: CPLEX LP（可用 CBC / HiGHS / GLPK 等读取复核）
// 命名: cut_s{组}_b{板材}_l{原木} / select_s{组}
// ==========================================

use crate::engine::error::PlanResult;
use crate::engine::model::{LinearExpr, MilpModel, Sense, VarKind};
use anyhow::Context;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tracing::info;

/// 渲染为 LP 文本
pub fn write_lp(model: &MilpModel) -> String {
    let mut out = String::new();
    let names: Vec<String> = model.variables().iter().map(|v| v.key.to_string()).collect();

    let _ = writeln!(out, "\\ sawmill-planner model, mode = {}", model.mode());
    let _ = writeln!(
        out,
        "{}",
        match model.sense() {
            Sense::Maximize => "Maximize",
            Sense::Minimize => "Minimize",
        }
    );
    let _ = writeln!(out, " obj: {}", render_expr(model.objective(), &names, true));

    let _ = writeln!(out, "Subject To");
    for c in model.constraints() {
        let _ = writeln!(
            out,
            " {}: {} {} {}",
            c.tag,
            render_expr(&c.expr, &names, false),
            c.cmp.symbol(),
            c.rhs - c.expr.constant
        );
    }

    let _ = writeln!(out, "Bounds");
    for (v, name) in model.variables().iter().zip(&names) {
        if v.kind == VarKind::Binary {
            continue;
        }
        match v.upper {
            Some(upper) => {
                let _ = writeln!(out, " {} <= {} <= {}", v.lower, name, upper);
            }
            None => {
                let _ = writeln!(out, " {} >= {}", name, v.lower);
            }
        }
    }

    write_section(&mut out, "General", model, &names, VarKind::Integer);
    write_section(&mut out, "Binary", model, &names, VarKind::Binary);
    let _ = writeln!(out, "End");
    out
}

/// 写入 LP 文件
pub fn export_lp(model: &MilpModel, path: &Path) -> PlanResult<()> {
    fs::write(path, write_lp(model))
        .with_context(|| format!("写入 LP 文件失败: {}", path.display()))?;
    info!(path = %path.display(), "LP 模型已导出");
    Ok(())
}

fn write_section(out: &mut String, title: &str, model: &MilpModel, names: &[String], kind: VarKind) {
    let selected: Vec<&str> = model
        .variables()
        .iter()
        .zip(names)
        .filter(|(v, _)| v.kind == kind)
        .map(|(_, n)| n.as_str())
        .collect();
    if selected.is_empty() {
        return;
    }
    let _ = writeln!(out, "{}", title);
    for name in selected {
        let _ = writeln!(out, " {}", name);
    }
}

/// 表达式渲染（约束左端不含常数项）
fn render_expr(expr: &LinearExpr, names: &[String], with_constant: bool) -> String {
    let mut out = String::new();
    for (i, (var, coef)) in expr.terms.iter().enumerate() {
        let name = names.get(var.index()).map(String::as_str).unwrap_or("?");
        let sign = if *coef < 0.0 { "-" } else { "+" };
        if i == 0 {
            if *coef < 0.0 {
                out.push_str("- ");
            }
        } else {
            let _ = write!(out, " {} ", sign);
        }
        let _ = write!(out, "{} {}", coef.abs(), name);
    }
    if with_constant && expr.constant != 0.0 {
        let sign = if expr.constant < 0.0 { "-" } else { "+" };
        let _ = write!(out, " {} {}", sign, expr.constant.abs());
    }
    if out.is_empty() {
        out.push('0');
    }
    out
}
