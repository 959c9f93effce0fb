//! Conversion plans
//!
//! A plan lists the READ steps of the source model followed by the WRITE
//! steps of the target model. Building one is pure: no I/O, and identical
//! inputs give identical plans.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::lm::LogicalModel;

/// Pipeline phase of a plan step or trace event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Phase {
    Read,
    Write,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Read => write!(f, "READ"),
            Phase::Write => write!(f, "WRITE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStep {
    pub phase: Phase,
    pub source: String,
    pub target: String,
    pub detail: String,
}

impl PlanStep {
    pub fn new(
        phase: Phase,
        source: impl Into<String>,
        target: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            phase,
            source: source.into(),
            target: target.into(),
            detail: detail.into(),
        }
    }
}

/// Ordered execution plan for one source/target model pair
///
/// The models travel with the plan so it can be executed without re-parsing;
/// they are not part of the textual form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionPlan {
    pub km_model: String,
    pub source_lm: String,
    pub target_lm: String,
    #[serde(skip)]
    pub source_model: LogicalModel,
    #[serde(skip)]
    pub target_model: LogicalModel,
    pub steps: Vec<PlanStep>,
}

impl ConversionPlan {
    pub fn read_steps(&self) -> impl Iterator<Item = &PlanStep> {
        self.steps.iter().filter(|s| s.phase == Phase::Read)
    }

    pub fn write_steps(&self) -> impl Iterator<Item = &PlanStep> {
        self.steps.iter().filter(|s| s.phase == Phase::Write)
    }

    /// Pretty-printed `{kmModel, sourceLm, targetLm, steps}` document
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

pub struct ConversionPlanner;

impl ConversionPlanner {
    /// One READ step per source DATA and INSPECTION, then one WRITE step per
    /// target DATA. Target inspections produce no step.
    pub fn build(km_name: &str, source: &LogicalModel, target: &LogicalModel) -> ConversionPlan {
        let reads_data = source.data_declarations.iter().map(|d| {
            PlanStep::new(
                Phase::Read,
                &d.source_object,
                &d.class_name,
                format!("direction={}", d.direction),
            )
        });
        let reads_inspection = source
            .inspections
            .iter()
            .map(|i| PlanStep::new(Phase::Read, &i.source_object, &i.class_name, "inspection"));
        let writes = target.data_declarations.iter().map(|d| {
            PlanStep::new(
                Phase::Write,
                &d.class_name,
                &d.source_object,
                format!("direction={}", d.direction),
            )
        });

        let steps: Vec<PlanStep> = reads_data.chain(reads_inspection).chain(writes).collect();
        debug!(
            km = km_name,
            source_lm = %source.name,
            target_lm = %target.name,
            steps = steps.len(),
            "Built conversion plan"
        );

        ConversionPlan {
            km_model: km_name.to_string(),
            source_lm: source.name.clone(),
            target_lm: target.name.clone(),
            source_model: source.clone(),
            target_model: target.clone(),
            steps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lm::{DataDeclaration, InspectionDeclaration, MappingDirection};
    use pretty_assertions::assert_eq;

    fn source() -> LogicalModel {
        let mut lm = LogicalModel::new("SRC");
        lm.data_declarations.push(DataDeclaration::new("A", "T_A", "Ns.A"));
        let mut b = DataDeclaration::new("B", "T_B", "Ns.B");
        b.direction = MappingDirection::InputOnly;
        lm.data_declarations.push(b);
        lm.inspections
            .push(InspectionDeclaration::new("I", "T_I", "Ns.Node"));
        lm
    }

    fn target() -> LogicalModel {
        let mut lm = LogicalModel::new("TGT");
        lm.data_declarations.push(DataDeclaration::new("A2", "OUT_A", "Ns.A"));
        lm.inspections
            .push(InspectionDeclaration::new("I2", "OUT_I", "Ns.Node"));
        lm
    }

    #[test]
    fn test_step_order_and_count() {
        let plan = ConversionPlanner::build("KM", &source(), &target());
        assert_eq!(plan.steps.len(), 2 + 1 + 1);
        assert_eq!(
            plan.steps,
            vec![
                PlanStep::new(Phase::Read, "T_A", "Ns.A", "direction=BIDIRECTIONAL"),
                PlanStep::new(Phase::Read, "T_B", "Ns.B", "direction=INPUT_ONLY"),
                PlanStep::new(Phase::Read, "T_I", "Ns.Node", "inspection"),
                PlanStep::new(Phase::Write, "Ns.A", "OUT_A", "direction=BIDIRECTIONAL"),
            ]
        );
        assert_eq!(plan.read_steps().count(), 3);
        assert_eq!(plan.write_steps().count(), 1);
    }

    #[test]
    fn test_build_is_deterministic() {
        let a = ConversionPlanner::build("KM", &source(), &target());
        let b = ConversionPlanner::build("KM", &source(), &target());
        assert_eq!(a, b);
    }

    #[test]
    fn test_json_form() {
        let plan = ConversionPlanner::build("KM", &source(), &target());
        let value: serde_json::Value = serde_json::from_str(&plan.to_json().unwrap()).unwrap();
        assert_eq!(value["kmModel"], "KM");
        assert_eq!(value["sourceLm"], "SRC");
        assert_eq!(value["targetLm"], "TGT");
        assert_eq!(value["steps"][0]["phase"], "READ");
        assert_eq!(value["steps"][3]["phase"], "WRITE");
        assert!(value.get("sourceModel").is_none());
    }
}
