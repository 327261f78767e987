// ==========================================
// 原木下料优化系统 - 规划配置
// ==========================================
// 存储: JSON 文件
// 加载顺序: --config → $SAWMILL_PLANNER_CONFIG → 用户配置目录 → 内置默认
// 覆写: 命令行参数覆盖文件取值
// ==========================================

use crate::domain::types::ObjectiveMode;
use crate::engine::error::{PlanError, PlanResult};
use crate::engine::interpreter::DEFAULT_ROUNDING_TOLERANCE;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

/// 配置文件路径环境变量
pub const CONFIG_ENV_VAR: &str = "SAWMILL_PLANNER_CONFIG";

/// 用户配置目录下的相对路径
const CONFIG_DIR_NAME: &str = "sawmill-planner";
const CONFIG_FILE_NAME: &str = "config.json";

// ==========================================
// OutputFormat - 输出格式
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("未知输出格式: {}（可选: text, json）", other)),
        }
    }
}

// ==========================================
// PlannerConfig - 规划配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub mode: ObjectiveMode,
    /// 最小化损耗模式是否附加体积容量约束
    pub wastage_volume_cap: bool,
    pub rounding_tolerance: f64,
    pub output_format: OutputFormat,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            mode: ObjectiveMode::MaximizeCount,
            wastage_volume_cap: true,
            rounding_tolerance: DEFAULT_ROUNDING_TOLERANCE,
            output_format: OutputFormat::Text,
        }
    }
}

impl PlannerConfig {
    /// 按加载顺序读取配置
    pub fn load(explicit: Option<&Path>) -> PlanResult<Self> {
        let env_value = std::env::var(CONFIG_ENV_VAR).ok();
        Self::load_from_sources(explicit, env_value.as_deref(), Self::default_path())
    }

    /// 按给定来源读取配置
    ///
    /// 显式路径与环境变量路径必须存在;默认路径不存在时使用内置默认
    pub fn load_from_sources(
        explicit: Option<&Path>,
        env_value: Option<&str>,
        default_path: Option<PathBuf>,
    ) -> PlanResult<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        if let Some(value) = env_value.map(str::trim).filter(|v| !v.is_empty()) {
            return Self::from_file(Path::new(value));
        }

        match default_path {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => {
                debug!("未找到配置文件，使用内置默认配置");
                Ok(Self::default())
            }
        }
    }

    /// 用户配置目录下的默认路径
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    pub fn from_file(path: &Path) -> PlanResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| PlanError::Config(format!("读取配置文件失败 {}: {}", path.display(), e)))?;
        let config = Self::from_json_str(&raw)?;
        info!(path = %path.display(), mode = %config.mode, "配置已加载");
        Ok(config)
    }

    pub fn from_json_str(raw: &str) -> PlanResult<Self> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|e| PlanError::Config(format!("配置 JSON 解析失败: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// 取整容差须在 (0, 0.5) 内
    pub fn validate(&self) -> PlanResult<()> {
        let tol = self.rounding_tolerance;
        if !(tol > 0.0 && tol < 0.5) {
            return Err(PlanError::Config(format!(
                "rounding_tolerance 须在 (0, 0.5) 内，当前为 {}",
                tol
            )));
        }
        Ok(())
    }
}
