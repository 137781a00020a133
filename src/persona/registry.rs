//! Bundled defaults: the persona catalog and trigger table shipped with the crate.

use super::types::PersonaRole;

/// Default persona catalog (TOML).
pub const BUNDLED_PERSONAS: &str = include_str!("../../config/personas.toml");

/// Default trigger-phrase table (TOML).
pub const BUNDLED_TRIGGERS: &str = include_str!("../../config/triggers.toml");

/// Summary of a known role for listings.
#[derive(Debug, Clone)]
pub struct RoleListing {
    pub role: PersonaRole,
    pub description: &'static str,
}

/// Describe every known role.
pub fn list_roles() -> Vec<RoleListing> {
    PersonaRole::all()
        .iter()
        .map(|role| RoleListing {
            role: *role,
            description: match role {
                PersonaRole::Facilitator => "Keeps the discussion moving and draws others in",
                PersonaRole::Strategist => "Frames goals, options and trade-offs",
                PersonaRole::Engineer => "Focuses on how things get built and shipped",
                PersonaRole::Skeptic => "Questions risks and weak assumptions",
                PersonaRole::Researcher => "Brings evidence and prior art",
                PersonaRole::Designer => "Speaks for users and their experience",
                PersonaRole::Newcomer => "Learner who asks for clarification",
                PersonaRole::Generalist => "Fallback role with neutral phrasing",
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_files_present() {
        assert!(BUNDLED_PERSONAS.contains("[[personas]]"));
        assert!(BUNDLED_TRIGGERS.contains("[default]"));
    }

    #[test]
    fn test_list_roles_covers_all() {
        let list = list_roles();
        assert_eq!(list.len(), PersonaRole::all().len());
        assert!(list.iter().all(|l| !l.description.is_empty()));
    }
}
