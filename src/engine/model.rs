// ==========================================
// 原木下料优化系统 - MILP 中间表示
// ==========================================
// 职责: 与求解器无关的混合整数线性规划模型
// 能力: 声明变量（连续/整数/0-1）、添加线性约束、设置目标
// 红线: 变量以结构化键标识,不使用字符串变量名
// ==========================================

use crate::domain::types::ObjectiveMode;
use crate::engine::error::{PlanError, PlanResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// 数值比较容差（约束检查）
const FEASIBILITY_TOLERANCE: f64 = 1e-6;

// ==========================================
// 变量
// ==========================================

/// 变量句柄（模型内下标）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VarId(pub usize);

impl VarId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarKind {
    Continuous,
    Integer,
    Binary,
}

/// 切割变量键: (原木组, 板材, 原木)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CutKey {
    pub set: usize,
    pub board: usize,
    pub log: usize,
}

impl CutKey {
    pub fn new(set: usize, board: usize, log: usize) -> Self {
        Self { set, board, log }
    }
}

/// 变量业务键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VarKey {
    Cut(CutKey),
    Select(usize),
}

impl fmt::Display for VarKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarKey::Cut(k) => write!(f, "cut_s{}_b{}_l{}", k.set, k.board, k.log),
            VarKey::Select(s) => write!(f, "select_s{}", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub key: VarKey,
    pub kind: VarKind,
    pub lower: f64,
    pub upper: Option<f64>,
}

// ==========================================
// 线性表达式
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearExpr {
    pub terms: Vec<(VarId, f64)>,
    pub constant: f64,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn constant(value: f64) -> Self {
        Self {
            terms: Vec::new(),
            constant: value,
        }
    }

    /// 追加一项 coef·var
    pub fn add_term(&mut self, var: VarId, coef: f64) {
        self.terms.push((var, coef));
    }

    pub fn with_term(mut self, var: VarId, coef: f64) -> Self {
        self.add_term(var, coef);
        self
    }

    /// 变量在表达式中的合并系数
    pub fn coefficient_of(&self, var: VarId) -> f64 {
        self.terms
            .iter()
            .filter(|(v, _)| *v == var)
            .map(|(_, c)| c)
            .sum()
    }

    pub fn contains(&self, var: VarId) -> bool {
        self.terms.iter().any(|(v, _)| *v == var)
    }

    /// 代入变量取值求值
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.constant
            + self
                .terms
                .iter()
                .map(|(v, c)| c * values.get(v.0).copied().unwrap_or(0.0))
                .sum::<f64>()
    }
}

// ==========================================
// 约束
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparison {
    LessEq,
    GreaterEq,
    Equal,
}

impl Comparison {
    pub fn symbol(&self) -> &'static str {
        match self {
            Comparison::LessEq => "<=",
            Comparison::GreaterEq => ">=",
            Comparison::Equal => "=",
        }
    }

    /// lhs ⋈ rhs 是否成立（容差内）
    pub fn holds(&self, lhs: f64, rhs: f64, tolerance: f64) -> bool {
        match self {
            Comparison::LessEq => lhs <= rhs + tolerance,
            Comparison::GreaterEq => lhs >= rhs - tolerance,
            Comparison::Equal => (lhs - rhs).abs() <= tolerance,
        }
    }
}

/// 约束业务标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintTag {
    LengthCapacity { set: usize, log: usize },
    VolumeCapacity { set: usize, log: usize },
    Demand { board: usize },
    SingleSelection,
}

impl fmt::Display for ConstraintTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintTag::LengthCapacity { set, log } => write!(f, "length_s{}_l{}", set, log),
            ConstraintTag::VolumeCapacity { set, log } => write!(f, "volume_s{}_l{}", set, log),
            ConstraintTag::Demand { board } => write!(f, "demand_b{}", board),
            ConstraintTag::SingleSelection => write!(f, "single_selection"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub tag: ConstraintTag,
    pub expr: LinearExpr,
    pub cmp: Comparison,
    pub rhs: f64,
}

impl Constraint {
    /// 在给定取值下是否满足
    pub fn is_satisfied(&self, values: &[f64], tolerance: f64) -> bool {
        self.cmp.holds(self.expr.evaluate(values), self.rhs, tolerance)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sense {
    Maximize,
    Minimize,
}

// ==========================================
// MilpModel - 完整模型
// ==========================================
#[derive(Debug, Clone)]
pub struct MilpModel {
    mode: ObjectiveMode,
    sense: Sense,
    variables: Vec<Variable>,
    constraints: Vec<Constraint>,
    objective: LinearExpr,
    cut_index: HashMap<CutKey, VarId>,
    cut_order: Vec<(CutKey, VarId)>,
    select_index: HashMap<usize, VarId>,
}

impl MilpModel {
    pub fn new(mode: ObjectiveMode) -> Self {
        let sense = if mode.is_minimization() {
            Sense::Minimize
        } else {
            Sense::Maximize
        };

        Self {
            mode,
            sense,
            variables: Vec::new(),
            constraints: Vec::new(),
            objective: LinearExpr::new(),
            cut_index: HashMap::new(),
            cut_order: Vec::new(),
            select_index: HashMap::new(),
        }
    }

    // ==========================================
    // 构建接口
    // ==========================================

    /// 声明变量
    ///
    /// 0-1 变量的界固定为 [0, 1]
    pub fn add_variable(
        &mut self,
        key: VarKey,
        kind: VarKind,
        lower: f64,
        upper: Option<f64>,
    ) -> VarId {
        let id = VarId(self.variables.len());
        let (lower, upper) = match kind {
            VarKind::Binary => (0.0, Some(1.0)),
            _ => (lower, upper),
        };

        self.variables.push(Variable {
            key,
            kind,
            lower,
            upper,
        });

        match key {
            VarKey::Cut(cut) => {
                self.cut_index.insert(cut, id);
                self.cut_order.push((cut, id));
            }
            VarKey::Select(set) => {
                self.select_index.insert(set, id);
            }
        }

        id
    }

    pub fn add_constraint(
        &mut self,
        tag: ConstraintTag,
        expr: LinearExpr,
        cmp: Comparison,
        rhs: f64,
    ) {
        self.constraints.push(Constraint {
            tag,
            expr,
            cmp,
            rhs,
        });
    }

    pub fn set_objective(&mut self, sense: Sense, expr: LinearExpr) {
        self.sense = sense;
        self.objective = expr;
    }

    // ==========================================
    // 查询接口
    // ==========================================

    pub fn mode(&self) -> ObjectiveMode {
        self.mode
    }

    pub fn sense(&self) -> Sense {
        self.sense
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, id: VarId) -> Option<&Variable> {
        self.variables.get(id.0)
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    pub fn cut_var(&self, key: &CutKey) -> Option<VarId> {
        self.cut_index.get(key).copied()
    }

    pub fn select_var(&self, set: usize) -> Option<VarId> {
        self.select_index.get(&set).copied()
    }

    /// 切割变量（按声明顺序: 组 → 板材 → 原木）
    pub fn cut_vars(&self) -> &[(CutKey, VarId)] {
        &self.cut_order
    }

    /// 选择变量（按组下标升序）
    pub fn select_vars(&self) -> Vec<(usize, VarId)> {
        let mut vars: Vec<(usize, VarId)> =
            self.select_index.iter().map(|(s, v)| (*s, *v)).collect();
        vars.sort_unstable();
        vars
    }

    pub fn constraints_tagged(&self, tag: ConstraintTag) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter().filter(move |c| c.tag == tag)
    }

    /// 给定取值下不满足的约束
    pub fn violated_constraints(&self, values: &[f64]) -> Vec<&Constraint> {
        self.constraints
            .iter()
            .filter(|c| !c.is_satisfied(values, FEASIBILITY_TOLERANCE))
            .collect()
    }

    // ==========================================
    // 结构自检
    // ==========================================

    /// 校验模型结构
    ///
    /// - 表达式引用的变量均已声明,系数有限
    /// - 每个切割变量出现在其 (组, 原木) 的长度约束中
    /// - 选择模式下该长度约束的右端由该组选择变量门控
    /// - 选择模式下恰有一条单选约束
    pub fn validate(&self) -> PlanResult<()> {
        for variable in &self.variables {
            let upper_ok = variable.upper.map_or(true, |u| u.is_finite() && u >= variable.lower);
            if !variable.lower.is_finite() || !upper_ok {
                return Err(PlanError::Model(format!("变量 {} 的界非法", variable.key)));
            }
        }

        self.check_expr("objective", &self.objective)?;
        for constraint in &self.constraints {
            self.check_expr(&constraint.tag.to_string(), &constraint.expr)?;
            if !constraint.rhs.is_finite() {
                return Err(PlanError::Model(format!("约束 {} 右端非有限值", constraint.tag)));
            }
        }

        if self.cut_order.is_empty() {
            return Err(PlanError::Model("模型没有切割变量".to_string()));
        }

        let selection = self.mode.uses_selection();
        for (key, var) in &self.cut_order {
            let tag = ConstraintTag::LengthCapacity {
                set: key.set,
                log: key.log,
            };
            let capacity = self
                .constraints_tagged(tag)
                .find(|c| c.expr.coefficient_of(*var) > 0.0)
                .ok_or_else(|| {
                    PlanError::Model(format!(
                        "切割变量 {} 未受长度约束",
                        VarKey::Cut(*key)
                    ))
                })?;

            if selection {
                let select = self.select_var(key.set).ok_or_else(|| {
                    PlanError::Model(format!("原木组 {} 缺少选择变量", key.set))
                })?;
                // 零容量原木（数量或长度为 0）的选择系数为 0，该行已将切割量压到 0
                if capacity.expr.coefficient_of(select) > 0.0 || capacity.rhs != 0.0 {
                    return Err(PlanError::Model(format!(
                        "约束 {} 未由选择变量门控",
                        capacity.tag
                    )));
                }
            }
        }

        let single_count = self
            .constraints_tagged(ConstraintTag::SingleSelection)
            .count();
        let expected = usize::from(selection);
        if single_count != expected {
            return Err(PlanError::Model(format!(
                "单选约束数量为 {}，应为 {}",
                single_count, expected
            )));
        }

        Ok(())
    }

    fn check_expr(&self, owner: &str, expr: &LinearExpr) -> PlanResult<()> {
        if !expr.constant.is_finite() {
            return Err(PlanError::Model(format!("{} 常数项非有限值", owner)));
        }
        for (var, coef) in &expr.terms {
            if var.0 >= self.variables.len() {
                return Err(PlanError::Model(format!("{} 引用未声明变量 #{}", owner, var.0)));
            }
            if !coef.is_finite() {
                return Err(PlanError::Model(format!("{} 含非有限系数", owner)));
            }
        }
        Ok(())
    }
}
