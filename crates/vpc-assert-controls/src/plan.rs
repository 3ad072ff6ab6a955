// crates/vpc-assert-controls/src/plan.rs
// ============================================================================
// Module: Plan Assembly
// Description: Ordered assembly of every control into an evaluation plan.
// Purpose: Provide the single entry point from module inputs to a plan.
// Dependencies: vpc-assert-config, vpc-assert-core
// ============================================================================

//! ## Overview
//! Controls are always emitted in [`CONTROL_NAMES`] order so reports are
//! stable. A [`ControlSelection`] narrows the plan without changing that
//! order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use vpc_assert_config::ModuleInputs;
use vpc_assert_core::ControlPlan;
use vpc_assert_core::EvaluationPlan;

use crate::context::BuildContext;
use crate::error::BuilderError;
use crate::network;
use crate::outputs;
use crate::psc;
use crate::router;
use crate::routes;
use crate::subnetwork;

// ============================================================================
// SECTION: Control Catalog
// ============================================================================

/// Every control in plan order.
pub const CONTROL_NAMES: [&str; 10] = [
    outputs::CONTROL,
    network::CONTROL,
    subnetwork::CONTROL,
    router::CONTROL,
    routes::DEFAULT_ROUTE_CONTROL,
    routes::RESTRICTED_ROUTE_CONTROL,
    routes::PRIVATE_ROUTE_CONTROL,
    routes::TAGGED_NAT_ROUTE_CONTROL,
    routes::USER_ROUTES_CONTROL,
    psc::CONTROL,
];

/// Subset of controls to build.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ControlSelection {
    /// Selected names; `None` selects every control.
    names: Option<BTreeSet<String>>,
}

impl ControlSelection {
    /// Selects every control.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            names: None,
        }
    }

    /// Selects the named controls; an empty list selects every control.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::UnknownControl`] for names outside the catalog.
    pub fn only<I, S>(names: I) -> Result<Self, BuilderError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut selected = BTreeSet::new();
        for name in names {
            let name = name.into();
            if !CONTROL_NAMES.contains(&name.as_str()) {
                return Err(BuilderError::UnknownControl(name));
            }
            selected.insert(name);
        }
        if selected.is_empty() {
            return Ok(Self::all());
        }
        Ok(Self {
            names: Some(selected),
        })
    }

    /// Returns true when `control` is selected.
    #[must_use]
    pub fn includes(&self, control: &str) -> bool {
        self.names.as_ref().is_none_or(|names| names.contains(control))
    }
}

// ============================================================================
// SECTION: Assembly
// ============================================================================

/// Builds the evaluation plan for module inputs.
///
/// # Errors
///
/// Returns [`BuilderError`] when the inputs cannot describe a consistent
/// network.
pub fn build_plan(
    inputs: &ModuleInputs,
    selection: &ControlSelection,
) -> Result<EvaluationPlan, BuilderError> {
    let ctx = BuildContext::new(inputs)?;
    let mut controls: Vec<ControlPlan> = Vec::with_capacity(CONTROL_NAMES.len());
    for name in CONTROL_NAMES {
        if !selection.includes(name) {
            continue;
        }
        controls.push(build_control(&ctx, name)?);
    }
    Ok(EvaluationPlan {
        controls,
    })
}

/// Builds one control by name.
fn build_control(ctx: &BuildContext<'_>, name: &str) -> Result<ControlPlan, BuilderError> {
    let plan = match name {
        outputs::CONTROL => outputs::build(ctx),
        network::CONTROL => network::build(ctx),
        subnetwork::CONTROL => subnetwork::build(ctx),
        router::CONTROL => router::build(ctx),
        routes::DEFAULT_ROUTE_CONTROL => routes::build_default(ctx),
        routes::RESTRICTED_ROUTE_CONTROL => routes::build_restricted(ctx),
        routes::PRIVATE_ROUTE_CONTROL => routes::build_private(ctx),
        routes::TAGGED_NAT_ROUTE_CONTROL => routes::build_tagged_nat(ctx),
        routes::USER_ROUTES_CONTROL => routes::build_user_routes(ctx),
        psc::CONTROL => psc::build(ctx)?,
        other => return Err(BuilderError::UnknownControl(other.to_string())),
    };
    Ok(plan)
}
