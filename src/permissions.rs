//! Permission catalog and the default permission set of every built-in role.
//!
//! The default table drives role bootstrap: each entry becomes one enabled
//! `role_permissions` row when a role is seeded for a tenant.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::enums::RolesEnum;

macro_rules! permissions {
    ($($variant:ident => $key:literal),+ $(,)?) => {
        /// Every permission key known to the platform.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        pub enum PermissionsEnum {
            $(
                #[serde(rename = $key)]
                $variant,
            )+
        }

        impl PermissionsEnum {
            pub const ALL: &'static [PermissionsEnum] = &[$(PermissionsEnum::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(PermissionsEnum::$variant => $key,)+
                }
            }

            pub fn parse(key: &str) -> Option<Self> {
                match key {
                    $($key => Some(PermissionsEnum::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

permissions! {
    AdminDashboardView => "ADMIN_DASHBOARD_VIEW",
    OrgPaymentView => "ORG_PAYMENT_VIEW",
    OrgPaymentAddEdit => "ORG_PAYMENT_ADD_EDIT",
    OrgIncomesView => "ORG_INCOMES_VIEW",
    OrgIncomesEdit => "ORG_INCOMES_EDIT",
    OrgExpensesView => "ORG_EXPENSES_VIEW",
    OrgExpensesEdit => "ORG_EXPENSES_EDIT",
    EmployeeExpensesView => "EMPLOYEE_EXPENSES_VIEW",
    EmployeeExpensesEdit => "EMPLOYEE_EXPENSES_EDIT",
    OrgProposalsView => "ORG_PROPOSALS_VIEW",
    OrgProposalsEdit => "ORG_PROPOSALS_EDIT",
    OrgTimeOffView => "ORG_TIME_OFF_VIEW",
    OrgEmployeesView => "ORG_EMPLOYEES_VIEW",
    OrgEmployeesEdit => "ORG_EMPLOYEES_EDIT",
    OrgCandidatesView => "ORG_CANDIDATES_VIEW",
    OrgCandidatesEdit => "ORG_CANDIDATES_EDIT",
    OrgUsersView => "ORG_USERS_VIEW",
    OrgUsersEdit => "ORG_USERS_EDIT",
    OrgInviteView => "ORG_INVITE_VIEW",
    OrgInviteEdit => "ORG_INVITE_EDIT",
    OrgContactView => "ORG_CONTACT_VIEW",
    OrgContactEdit => "ORG_CONTACT_EDIT",
    AllOrgView => "ALL_ORG_VIEW",
    AllOrgEdit => "ALL_ORG_EDIT",
    PolicyView => "POLICY_VIEW",
    PolicyEdit => "POLICY_EDIT",
    ChangeSelectedEmployee => "CHANGE_SELECTED_EMPLOYEE",
    ChangeSelectedOrganization => "CHANGE_SELECTED_ORGANIZATION",
    ChangeRolesPermissions => "CHANGE_ROLES_PERMISSIONS",
    IntegrationView => "INTEGRATION_VIEW",
    IntegrationEdit => "INTEGRATION_EDIT",
}

impl std::fmt::Display for PermissionsEnum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

use PermissionsEnum::*;

const ADMIN_DEFAULTS: &[PermissionsEnum] = &[
    AdminDashboardView,
    OrgPaymentView,
    OrgPaymentAddEdit,
    OrgIncomesView,
    OrgIncomesEdit,
    OrgExpensesView,
    OrgExpensesEdit,
    EmployeeExpensesView,
    EmployeeExpensesEdit,
    OrgProposalsView,
    OrgProposalsEdit,
    OrgTimeOffView,
    OrgEmployeesView,
    OrgEmployeesEdit,
    OrgCandidatesView,
    OrgCandidatesEdit,
    OrgUsersView,
    OrgUsersEdit,
    OrgInviteView,
    OrgInviteEdit,
    OrgContactView,
    OrgContactEdit,
    AllOrgView,
    AllOrgEdit,
    PolicyView,
    PolicyEdit,
    ChangeSelectedEmployee,
    ChangeSelectedOrganization,
    IntegrationView,
    IntegrationEdit,
];

const DATA_ENTRY_DEFAULTS: &[PermissionsEnum] = &[
    OrgExpensesView,
    OrgExpensesEdit,
    OrgIncomesView,
    OrgIncomesEdit,
];

const EMPLOYEE_DEFAULTS: &[PermissionsEnum] =
    &[AdminDashboardView, OrgProposalsView, OrgTimeOffView];

const CANDIDATE_DEFAULTS: &[PermissionsEnum] = &[OrgCandidatesView];

const MANAGER_DEFAULTS: &[PermissionsEnum] = &[
    AdminDashboardView,
    OrgEmployeesView,
    OrgProposalsView,
    OrgTimeOffView,
    OrgInviteView,
    OrgInviteEdit,
    OrgContactView,
];

const VIEWER_DEFAULTS: &[PermissionsEnum] = &[
    AdminDashboardView,
    OrgPaymentView,
    OrgIncomesView,
    OrgExpensesView,
    OrgProposalsView,
    OrgTimeOffView,
    OrgEmployeesView,
    OrgCandidatesView,
    OrgUsersView,
    OrgInviteView,
    OrgContactView,
    AllOrgView,
    PolicyView,
    IntegrationView,
];

/// Default permissions granted to `role` when it is seeded for a tenant.
pub fn default_role_permissions(role: RolesEnum) -> &'static [PermissionsEnum] {
    match role {
        RolesEnum::SuperAdmin => PermissionsEnum::ALL,
        RolesEnum::Admin => ADMIN_DEFAULTS,
        RolesEnum::DataEntry => DATA_ENTRY_DEFAULTS,
        RolesEnum::Employee => EMPLOYEE_DEFAULTS,
        RolesEnum::Candidate => CANDIDATE_DEFAULTS,
        RolesEnum::Manager => MANAGER_DEFAULTS,
        RolesEnum::Viewer => VIEWER_DEFAULTS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;
    use std::collections::HashSet;

    #[test]
    fn employee_defaults_are_exact() {
        assert_eq!(
            default_role_permissions(RolesEnum::Employee),
            &[AdminDashboardView, OrgProposalsView, OrgTimeOffView]
        );
    }

    #[test]
    fn super_admin_holds_every_permission() {
        let all: HashSet<_> = PermissionsEnum::ALL.iter().collect();
        let granted: HashSet<_> = default_role_permissions(RolesEnum::SuperAdmin)
            .iter()
            .collect();
        assert_eq!(all, granted);
    }

    #[test]
    fn only_super_admin_can_change_role_permissions() {
        for role in RolesEnum::iter().filter(|r| *r != RolesEnum::SuperAdmin) {
            assert!(!default_role_permissions(role).contains(&ChangeRolesPermissions));
        }
    }

    #[test]
    fn default_tables_have_no_duplicates() {
        for role in RolesEnum::iter() {
            let entries = default_role_permissions(role);
            let unique: HashSet<_> = entries.iter().collect();
            assert_eq!(unique.len(), entries.len(), "duplicate entry for {role}");
        }
    }

    #[test]
    fn keys_parse_back() {
        for permission in PermissionsEnum::ALL {
            assert_eq!(PermissionsEnum::parse(permission.as_str()), Some(*permission));
        }
        assert_eq!(PermissionsEnum::parse("NOPE"), None);
    }
}
