//! Page access rules for the web client.
//!
//! This is a UX helper only. The API enforces roles on its own through
//! [`Operation`](super::Operation).

use serde::Serialize;

use super::Role;

/// Page path patterns and the role that may open them. A `[segment]` in a
/// pattern matches any single non-empty path segment.
const PAGES: &[(&str, Role)] = &[
    ("/mahasiswa", Role::Mahasiswa),
    ("/mahasiswa/daily-report", Role::Mahasiswa),
    ("/mahasiswa/bimbingan", Role::Mahasiswa),
    ("/pembimbing-instansi", Role::PembimbingInstansi),
    ("/pembimbing-instansi/daftar-mahasiswa", Role::PembimbingInstansi),
    ("/pembimbing-instansi/mahasiswa/[id]", Role::PembimbingInstansi),
    ("/dosen-pembimbing", Role::DosenPembimbing),
    ("/dosen-pembimbing/daftar-mahasiswa", Role::DosenPembimbing),
    ("/dosen-pembimbing/mahasiswa/[name]/daily-report", Role::DosenPembimbing),
    ("/dosen-pembimbing/mahasiswa/[name]/bimbingan-kp", Role::DosenPembimbing),
    ("/koordinator", Role::Koordinator),
    ("/koordinator/daftar-mahasiswa", Role::Koordinator),
    ("/koordinator/mahasiswa/[name]", Role::Koordinator),
    ("/koordinator/mahasiswa/[name]/bimbingan-kp", Role::Koordinator),
];

pub const UNAUTHORIZED_PATH: &str = "/unauthorized";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "path", rename_all = "lowercase")]
pub enum GuardOutcome {
    /// The identity client has not finished initializing.
    Loading,
    Redirect(String),
    Render,
}

/// Decides what a protected page shows.
pub fn guard(allowed: &[Role], initialized: bool, roles: &[Role]) -> GuardOutcome {
    if !initialized {
        return GuardOutcome::Loading;
    }
    if roles.iter().any(|r| allowed.contains(r)) {
        GuardOutcome::Render
    } else {
        GuardOutcome::Redirect(UNAUTHORIZED_PATH.to_string())
    }
}

fn matches_pattern(pattern: &str, path: &str) -> bool {
    let path = path.trim_end_matches('/');
    let path = if path.is_empty() { "/" } else { path };

    let mut want = pattern.split('/');
    let mut got = path.split('/');
    loop {
        match (want.next(), got.next()) {
            (None, None) => return true,
            (Some(w), Some(g)) if w.starts_with('[') && w.ends_with(']') => {
                if g.is_empty() {
                    return false;
                }
            }
            (Some(w), Some(g)) if w == g => {}
            _ => return false,
        }
    }
}

/// Roles allowed on `path`, or `None` for pages without a role gate.
pub fn page_roles(path: &str) -> Option<Vec<Role>> {
    let roles: Vec<Role> = PAGES
        .iter()
        .filter(|(pattern, _)| matches_pattern(pattern, path))
        .map(|(_, role)| *role)
        .collect();
    (!roles.is_empty()).then_some(roles)
}

/// Guard outcome for a concrete page path. Ungated pages always render once
/// the client is initialized.
pub fn guard_path(path: &str, initialized: bool, roles: &[Role]) -> GuardOutcome {
    match page_roles(path) {
        Some(allowed) => guard(&allowed, initialized, roles),
        None if !initialized => GuardOutcome::Loading,
        None => GuardOutcome::Render,
    }
}

/// Page patterns the given roles may open.
pub fn accessible_pages(roles: &[Role]) -> Vec<&'static str> {
    PAGES
        .iter()
        .filter(|(_, role)| roles.contains(role))
        .map(|(pattern, _)| *pattern)
        .collect()
}

/// Where a freshly logged-in user is sent.
pub fn landing_path(roles: &[Role]) -> &'static str {
    let has = |role| roles.contains(&role);
    if has(Role::Koordinator) {
        "/koordinator"
    } else if has(Role::Mahasiswa) {
        "/mahasiswa"
    } else if has(Role::PembimbingInstansi) && has(Role::DosenPembimbing) {
        "/pick-role"
    } else if has(Role::PembimbingInstansi) {
        "/pembimbing-instansi"
    } else if has(Role::DosenPembimbing) {
        "/dosen-pembimbing"
    } else {
        "/unassign"
    }
}
