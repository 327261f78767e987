// ==========================================
// 原木下料优化系统 - 配置层
// ==========================================
// 职责: 规划参数加载与校验,支持多级覆写
// 存储: JSON 配置文件
// ==========================================

pub mod planner_config;

// 重导出
pub use planner_config::{OutputFormat, PlannerConfig, CONFIG_ENV_VAR};
