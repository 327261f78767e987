// ==========================================
// 原木下料优化系统 - 下料方案领域模型
// ==========================================
// 职责: 求解结果的业务表达（方案行、汇总、需求满足、原木利用）
// 红线: 只是求解快照,不可反向修改库存
// ==========================================

use crate::domain::types::{ObjectiveMode, SetKey};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// PlanLine - 方案行
// ==========================================
// 含义: 从 (原木组, 原木类) 中切出 count 块 board_index 号板材
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanLine {
    pub board_index: usize,           // 板材下标
    pub board_length: f64,            // 板材长度
    pub set_key: SetKey,              // 原木组
    pub log_index: usize,             // 组内原木下标
    pub log_length: f64,              // 原木长度
    pub log_diameter: Option<f64>,    // 原木直径
    pub count: u64,                   // 切割块数（> 0）
}

impl PlanLine {
    /// 原木描述
    pub fn log_descriptor(&self) -> String {
        match self.log_diameter {
            Some(d) => format!("{}#{} (长度 {}, 直径 {})", self.set_key, self.log_index, self.log_length, d),
            None => format!("{}#{} (长度 {})", self.set_key, self.log_index, self.log_length),
        }
    }
}

// ==========================================
// DemandFulfilment - 需求满足情况
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandFulfilment {
    pub board_index: usize,
    pub demand: u32,
    pub produced: u64,
    pub surplus: u64, // 超产块数
}

// ==========================================
// LogUsage - 原木长度利用
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogUsage {
    pub set_key: SetKey,
    pub log_index: usize,
    pub length_used: f64,
    pub length_available: f64,
    pub utilisation: f64, // 0.0 - 1.0
}

// ==========================================
// CuttingPlan - 下料方案
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuttingPlan {
    pub mode: ObjectiveMode,                  // 目标模式
    pub selected_set: Option<SetKey>,         // 选中的原木组（选择模式）
    pub lines: Vec<PlanLine>,                 // 非零方案行
    pub total_boards_cut: u64,                // 总出板数
    pub total_wastage: Option<f64>,           // 材积损耗（体积模式）
    pub objective_value: f64,                 // 目标函数值
    pub fulfilment: Vec<DemandFulfilment>,    // 需求满足（按板材下标）
    pub log_usage: Vec<LogUsage>,             // 原木利用（仅选中组）
}

impl CuttingPlan {
    /// 指定板材的出板数
    pub fn produced_for(&self, board_index: usize) -> u64 {
        self.lines
            .iter()
            .filter(|l| l.board_index == board_index)
            .map(|l| l.count)
            .sum()
    }

    /// 总超产块数
    pub fn total_surplus(&self) -> u64 {
        self.fulfilment.iter().map(|f| f.surplus).sum()
    }
}

// ==========================================
// PlanReport - 对外输出包装（带运行元信息）
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub solver: String,
    pub plan: CuttingPlan,
}

impl PlanReport {
    pub fn new(plan: CuttingPlan, solver: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            solver: solver.into(),
            plan,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(board_index: usize, count: u64) -> PlanLine {
        PlanLine {
            board_index,
            board_length: 10.0,
            set_key: SetKey::new("A"),
            log_index: 0,
            log_length: 25.0,
            log_diameter: None,
            count,
        }
    }

    #[test]
    fn test_produced_for() {
        let plan = CuttingPlan {
            mode: ObjectiveMode::MaximizeCount,
            selected_set: None,
            lines: vec![line(0, 2), line(1, 1), line(0, 3)],
            total_boards_cut: 6,
            total_wastage: None,
            objective_value: 6.0,
            fulfilment: vec![],
            log_usage: vec![],
        };
        assert_eq!(plan.produced_for(0), 5);
        assert_eq!(plan.produced_for(1), 1);
        assert_eq!(plan.produced_for(2), 0);
    }

    #[test]
    fn test_log_descriptor() {
        let mut l = line(0, 1);
        assert_eq!(l.log_descriptor(), "A#0 (长度 25)");
        l.log_diameter = Some(0.4);
        assert_eq!(l.log_descriptor(), "A#0 (长度 25, 直径 0.4)");
    }
}
