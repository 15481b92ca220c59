//! Panel access. The one capability check used for listing and opening.

/// Every panel the dashboard knows about, in card order.
pub const PANELS: &[&str] = &[
    "painel2", "painel3", "painel4", "painel5", "painel6", "painel7", "painel8", "painel9",
    "painel10", "painel11", "painel12", "painel13",
];

/// Granted panel ids plus the admin flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Permissions {
    pub panels: Vec<String>,
    pub is_admin: bool,
}

impl Permissions {
    pub fn can_access(&self, panel: &str) -> bool {
        can_access(panel, &self.panels, self.is_admin)
    }

    /// Known panels this user may open, in card order.
    pub fn visible_panels(&self) -> Vec<&'static str> {
        PANELS.iter().copied().filter(|p| self.can_access(p)).collect()
    }
}

/// Admins see everything; everyone else needs the panel in their grant list.
pub fn can_access(panel: &str, permissions: &[String], is_admin: bool) -> bool {
    is_admin || permissions.iter().any(|p| p == panel)
}

pub fn is_known_panel(panel: &str) -> bool {
    PANELS.contains(&panel)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_sees_everything() {
        let perms = Permissions { panels: Vec::new(), is_admin: true };
        assert!(perms.can_access("painel7"));
        assert_eq!(perms.visible_panels().len(), PANELS.len());
    }

    #[test]
    fn others_see_only_granted_panels() {
        let perms = Permissions {
            panels: vec!["painel3".into(), "painel2".into(), "painel99".into()],
            is_admin: false,
        };
        assert!(perms.can_access("painel2"));
        assert!(!perms.can_access("painel4"));
        assert_eq!(perms.visible_panels(), vec!["painel2", "painel3"]);
    }

    #[test]
    fn unknown_panels_are_not_known() {
        assert!(is_known_panel("painel13"));
        assert!(!is_known_panel("painel1"));
    }
}
