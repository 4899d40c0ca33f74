//! Roles and the operation authorization table.

use serde::{Deserialize, Serialize};

/// The closed set of roles the application understands. Other role strings
/// in a token are kept on the account but grant nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Mahasiswa,
    PembimbingInstansi,
    DosenPembimbing,
    Koordinator,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::Mahasiswa,
        Role::PembimbingInstansi,
        Role::DosenPembimbing,
        Role::Koordinator,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Mahasiswa => "mahasiswa",
            Role::PembimbingInstansi => "pembimbing-instansi",
            Role::DosenPembimbing => "dosen-pembimbing",
            Role::Koordinator => "koordinator",
        }
    }

    pub fn parse(raw: &str) -> Option<Role> {
        Role::ALL.into_iter().find(|role| role.as_str() == raw)
    }

    /// Known roles among `raw`, in order, without duplicates.
    pub fn from_claims<S: AsRef<str>>(raw: &[S]) -> Vec<Role> {
        let mut roles = Vec::new();
        for role in raw.iter().filter_map(|r| Role::parse(r.as_ref())) {
            if !roles.contains(&role) {
                roles.push(role);
            }
        }
        roles
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every API operation that is subject to authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    AccountCreate,
    AccountList,
    StudentCreate,
    StudentUpdate,
    StudentRead,
    StudentProgressRead,
    ReportCreate,
    ReportUpdate,
    ReportRead,
    GuidanceCreate,
    GuidanceUpdate,
    GuidanceRead,
    EvaluationCreate,
    EvaluationUpdate,
    EvaluationRead,
    SupervisorCreate,
    SupervisorUpdate,
    SupervisorRead,
    SessionRead,
    StatisticsRead,
}

impl Operation {
    pub fn allowed_roles(&self) -> &'static [Role] {
        use Operation::*;
        match self {
            AccountCreate | AccountList | StudentRead | StudentProgressRead | ReportRead
            | GuidanceRead | EvaluationRead | SupervisorRead | SessionRead => &Role::ALL,
            StudentCreate | StudentUpdate | ReportCreate | ReportUpdate => &[Role::Mahasiswa],
            GuidanceCreate | GuidanceUpdate => &[Role::DosenPembimbing],
            EvaluationCreate | EvaluationUpdate | SupervisorCreate | SupervisorUpdate => {
                &[Role::PembimbingInstansi]
            }
            StatisticsRead => &[Role::Koordinator],
        }
    }

    pub fn permits(&self, roles: &[Role]) -> bool {
        self.allowed_roles().iter().any(|r| roles.contains(r))
    }

    pub fn name(&self) -> &'static str {
        use Operation::*;
        match self {
            AccountCreate => "account create",
            AccountList => "account list",
            StudentCreate => "student create",
            StudentUpdate => "student update",
            StudentRead => "student read",
            StudentProgressRead => "student progress read",
            ReportCreate => "report create",
            ReportUpdate => "report update",
            ReportRead => "report read",
            GuidanceCreate => "guidance create",
            GuidanceUpdate => "guidance update",
            GuidanceRead => "guidance read",
            EvaluationCreate => "evaluation create",
            EvaluationUpdate => "evaluation update",
            EvaluationRead => "evaluation read",
            SupervisorCreate => "supervisor create",
            SupervisorUpdate => "supervisor update",
            SupervisorRead => "supervisor read",
            SessionRead => "session read",
            StatisticsRead => "statistics read",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_names() {
        for role in Role::ALL {
            assert_eq!(Role::parse(role.as_str()), Some(role));
            assert_eq!(
                serde_json::to_value(role).unwrap(),
                serde_json::Value::String(role.as_str().to_string())
            );
        }
        assert_eq!(Role::parse("admin"), None);
    }

    #[test]
    fn test_from_claims_ignores_unknown_and_duplicates() {
        let roles = Role::from_claims(&["offline_access", "mahasiswa", "uma_authorization", "mahasiswa"]);
        assert_eq!(roles, vec![Role::Mahasiswa]);
    }

    #[test]
    fn test_authorization_table() {
        assert!(Operation::EvaluationCreate.permits(&[Role::PembimbingInstansi]));
        assert!(!Operation::EvaluationCreate.permits(&[Role::Mahasiswa]));
        assert!(Operation::GuidanceCreate.permits(&[Role::DosenPembimbing]));
        assert!(!Operation::GuidanceCreate.permits(&[Role::Koordinator]));
        assert!(Operation::StatisticsRead.permits(&[Role::Koordinator]));
        assert!(!Operation::StatisticsRead.permits(&[Role::DosenPembimbing]));
        assert!(Operation::ReportCreate.permits(&[Role::Mahasiswa]));
        assert!(Operation::StudentRead.permits(&[Role::DosenPembimbing]));
        assert!(!Operation::AccountCreate.permits(&[]));
    }
}
