// ==========================================
// 原木下料优化系统 - 命令行入口
// ==========================================
// 输入: 板材表 + 原木表（CSV / Excel）
// 输出: 下料方案（stdout） / 日志（stderr）
// 退出码: 0 成功 / 2 数据错误 / 3 无可行解 / 4 模型或不变量错误 / 1 其他
// ==========================================

use clap::Parser;
use sawmill_planner::config::{OutputFormat, PlannerConfig};
use sawmill_planner::engine::{export_lp, CuttingPlanner, GoodLpSolver, MilpSolver, PlanError};
use sawmill_planner::importer::{InventoryImporter, InventoryImporterImpl};
use sawmill_planner::{logging, report, ObjectiveMode, PlanReport};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "sawmill-planner", version, about = "原木下料优化系统 - 混合整数规划建模与求解")]
struct Cli {
    /// 板材需求表（Board_Length, Board_Width, Board_Thickness, Demand）
    #[arg(long)]
    boards: PathBuf,

    /// 原木表（Log_Length[, Log_Diameter, Quantity]）或原木组表（含 Set 列）
    #[arg(long)]
    logs: PathBuf,

    /// 目标模式（覆盖配置文件）
    #[arg(long)]
    mode: Option<ObjectiveMode>,

    /// 配置文件路径
    #[arg(long)]
    config: Option<PathBuf>,

    /// 最小化损耗模式下不附加体积容量约束
    #[arg(long)]
    no_wastage_volume_cap: bool,

    /// 输出格式: text | json
    #[arg(long)]
    format: Option<OutputFormat>,

    /// 导出 LP 模型文件
    #[arg(long, value_name = "FILE")]
    export_lp: Option<PathBuf>,

    /// 对比全部目标模式
    #[arg(long)]
    compare: bool,

    /// JSON 格式日志
    #[arg(long)]
    log_json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.log_json {
        logging::init_json();
    } else {
        logging::init();
    }

    info!("{} v{}", sawmill_planner::APP_NAME, sawmill_planner::VERSION);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let kind = e.kind();
            error!(kind = ?kind, "{}", e);
            eprintln!("错误: {}", e);
            ExitCode::from(kind.exit_code())
        }
    }
}

fn run(cli: Cli) -> Result<(), PlanError> {
    // 1. 配置（命令行覆盖文件）
    let mut config = PlannerConfig::load(cli.config.as_deref())?;
    if let Some(mode) = cli.mode {
        config.mode = mode;
    }
    if cli.no_wastage_volume_cap {
        config.wastage_volume_cap = false;
    }
    if let Some(format) = cli.format {
        config.output_format = format;
    }
    config.validate()?;

    // 2. 导入
    let importer = InventoryImporterImpl::default();
    let inventory = importer.import_auto(&cli.boards, &cli.logs)?;

    let planner = CuttingPlanner::from_config(GoodLpSolver::new(), &config);

    // 3. 导出 LP（可选）
    if let Some(path) = &cli.export_lp {
        let model = planner.build(&inventory, config.mode)?;
        export_lp(&model, path)?;
    }

    // 4. 规划
    if cli.compare {
        let results = planner.compare_modes(&inventory, &ObjectiveMode::ALL);
        let output = match config.output_format {
            OutputFormat::Text => report::render_comparison(&results),
            OutputFormat::Json => report::render_comparison_json(&results)?,
        };
        println!("{}", output);
        return Ok(());
    }

    let plan = planner.plan(&inventory, config.mode)?;
    let output = match config.output_format {
        OutputFormat::Text => report::render_text(&plan),
        OutputFormat::Json => {
            report::render_json(&PlanReport::new(plan, planner.solver().name()))?
        }
    };
    println!("{}", output);
    Ok(())
}
