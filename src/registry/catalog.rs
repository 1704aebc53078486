//! @ai:module:intent Built-in catalog of job-shop models and MiniZinc solvers
//! @ai:module:layer domain
//! @ai:module:public_api builtin_models, builtin_solvers, DEFAULT_SOLVER
//! @ai:module:stateless true

use crate::registry::{ModelDescriptor, ModelFamily, SolverEntry};
use std::path::PathBuf;

/// Solver used when the requested one is unavailable.
pub const DEFAULT_SOLVER: &str = "org.gecode.gecode";

const OP_LIMIT_CATEGORY: &str = "Limited Operators";
const WORKERS_CATEGORY: &str = "Worker Skills";
const MAINTENANCE_CATEGORY: &str = "Machine Maintenance";

fn model(
    id: &str,
    name: &str,
    description: &str,
    family: ModelFamily,
    category: &str,
) -> ModelDescriptor {
    ModelDescriptor {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        family,
        category: category.to_string(),
        file: PathBuf::from(family.dataset_folder()).join(format!("{id}.mzn")),
    }
}

/// @ai:intent The nine model variants shipped with the models folder
/// @ai:effects pure
pub fn builtin_models() -> Vec<ModelDescriptor> {
    vec![
        model(
            "jobshop_op_limit_1",
            "Limited Operators - Free Search",
            "Job shop with k operators. No seq_search annotation.",
            ModelFamily::OpLimit,
            OP_LIMIT_CATEGORY,
        ),
        model(
            "jobshop_op_limit_2",
            "Limited Operators - dom_w_deg + first_fail",
            "Start times with dom_w_deg, operators with first_fail.",
            ModelFamily::OpLimit,
            OP_LIMIT_CATEGORY,
        ),
        model(
            "jobshop_op_limit_3",
            "Limited Operators - Operator First",
            "Operators branched first with first_fail.",
            ModelFamily::OpLimit,
            OP_LIMIT_CATEGORY,
        ),
        model(
            "jobshop_workers_skills_1",
            "Worker Skills - Free Search",
            "Workers specialised by skill. Free search.",
            ModelFamily::WorkersSkills,
            WORKERS_CATEGORY,
        ),
        model(
            "jobshop_workers_skills_2",
            "Worker Skills - dom_w_deg + first_fail",
            "Start times with dom_w_deg, assignment with first_fail.",
            ModelFamily::WorkersSkills,
            WORKERS_CATEGORY,
        ),
        model(
            "jobshop_maintenance_1",
            "Maintenance - Direct Solve",
            "Job shop with maintenance windows. Direct search.",
            ModelFamily::Maintenance,
            MAINTENANCE_CATEGORY,
        ),
        model(
            "jobshop_maintenance_2",
            "Maintenance - First-Fail",
            "Maintenance windows. first_fail with indomain_min.",
            ModelFamily::Maintenance,
            MAINTENANCE_CATEGORY,
        ),
        model(
            "jobshop_maintenance_3",
            "Maintenance - Input Order Random",
            "Maintenance windows. input_order with indomain_random.",
            ModelFamily::Maintenance,
            MAINTENANCE_CATEGORY,
        ),
        model(
            "jobshop_maintenance_4",
            "Maintenance - Search by Job",
            "Maintenance windows. Sequential search job by job.",
            ModelFamily::Maintenance,
            MAINTENANCE_CATEGORY,
        ),
    ]
}

/// @ai:intent Solvers offered for comparisons, with display names
/// @ai:effects pure
pub fn builtin_solvers() -> Vec<SolverEntry> {
    [
        (DEFAULT_SOLVER, "Gecode"),
        ("org.chuffed.chuffed", "Chuffed"),
        ("org.minizinc.mip.coin-bc", "COIN-BC"),
        ("org.minizinc.mip.highs", "HiGHS"),
    ]
    .into_iter()
    .map(|(id, name)| SolverEntry {
        id: id.to_string(),
        name: name.to_string(),
    })
    .collect()
}
