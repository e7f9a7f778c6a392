//! Account-plan resolution
//!
//! Ledger queries filter by account code. Only leaf (level 4) accounts are
//! used: higher levels are rollups of the leaves and would count the same
//! activity more than once.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::client::{ApiRequest, HttpTransport};
use crate::error::{EtlError, EtlResult};
use crate::models::{AccountPlanItem, ItemsEnvelope};

/// Chart-of-accounts endpoint
pub const PLAN_ENDPOINT: &str = "plan_cuenta";

/// Level of the most granular accounts
pub const LEAF_LEVEL: i64 = 4;

/// Leaf accounts of one company
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountPlan {
    codes: Vec<String>,
    names: HashMap<String, String>,
}

impl AccountPlan {
    /// Keep the leaf accounts from a chart of accounts, in API order
    pub fn from_items(items: Vec<AccountPlanItem>) -> Self {
        let mut plan = Self::default();
        for item in items {
            if item.level() != Some(LEAF_LEVEL) || item.codigo.is_empty() {
                continue;
            }
            plan.names.insert(item.codigo.clone(), item.nombre);
            plan.codes.push(item.codigo);
        }
        plan
    }

    /// Codes joined with commas, as the ledger endpoint expects
    pub fn comma_joined(&self) -> String {
        self.codes.join(",")
    }

    /// Name of a leaf account
    pub fn name_for(&self, code: &str) -> Option<&str> {
        self.names.get(code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// Fetches and filters a company's chart of accounts
pub struct AccountPlanResolver<'a> {
    transport: &'a dyn HttpTransport,
}

impl<'a> AccountPlanResolver<'a> {
    /// Create a new resolver
    pub fn new(transport: &'a dyn HttpTransport) -> Self {
        Self { transport }
    }

    /// Resolve the leaf accounts of a company
    ///
    /// Any failure to obtain the plan, including a plan without leaf
    /// accounts, is reported as [`EtlError::PlanUnavailable`].
    pub fn resolve_accounts(&self, company_id: &str) -> EtlResult<AccountPlan> {
        let request = ApiRequest::new(PLAN_ENDPOINT).param("rut_empresa", company_id);

        let response = self.transport.get(&request).map_err(|e| {
            warn!(company = company_id, error = %e, "account plan request failed");
            EtlError::plan_unavailable(company_id, e.to_string())
        })?;

        if !response.is_success() {
            warn!(company = company_id, status = response.status, "account plan request rejected");
            return Err(EtlError::plan_unavailable(
                company_id,
                format!("HTTP {}", response.status),
            ));
        }

        let envelope: ItemsEnvelope<AccountPlanItem> = response
            .json()
            .map_err(|e| EtlError::plan_unavailable(company_id, e.to_string()))?;

        let plan = AccountPlan::from_items(envelope.into_items());
        if plan.is_empty() {
            return Err(EtlError::plan_unavailable(
                company_id,
                "no level-4 accounts in the chart of accounts",
            ));
        }

        debug!(company = company_id, accounts = plan.len(), "account plan resolved");
        Ok(plan)
    }
}
