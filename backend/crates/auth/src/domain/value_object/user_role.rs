use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Clinic roles, stored in `usuarios.rol` by their code
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[display("coordinador")]
    Coordinador,
    #[display("admin")]
    Admin,
    #[display("psicologo")]
    Psicologo,
    #[display("becario")]
    Becario,
    #[display("paciente")]
    Paciente,
}

impl UserRole {
    pub const ALL: [UserRole; 5] = [
        UserRole::Coordinador,
        UserRole::Admin,
        UserRole::Psicologo,
        UserRole::Becario,
        UserRole::Paciente,
    ];

    /// Roles allowed to browse the user directory
    pub const DIRECTORY_READERS: &'static [UserRole] = &[UserRole::Coordinador, UserRole::Admin];

    #[inline]
    pub const fn code(&self) -> &'static str {
        use UserRole::*;
        match self {
            Coordinador => "coordinador",
            Admin => "admin",
            Psicologo => "psicologo",
            Becario => "becario",
            Paciente => "paciente",
        }
    }

    /// Case-insensitive; unknown codes yield `None`
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::ALL
            .into_iter()
            .find(|role| role.code().eq_ignore_ascii_case(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_from_code() {
        assert_eq!(UserRole::from_code("coordinador"), Some(UserRole::Coordinador));
        assert_eq!(UserRole::from_code("Admin"), Some(UserRole::Admin));
        assert_eq!(UserRole::from_code(" psicologo "), Some(UserRole::Psicologo));
        assert_eq!(UserRole::from_code("becario"), Some(UserRole::Becario));
        assert_eq!(UserRole::from_code("paciente"), Some(UserRole::Paciente));
        assert_eq!(UserRole::from_code("superuser"), None);
        assert_eq!(UserRole::from_code(""), None);
    }

    #[test]
    fn test_user_role_display_matches_code() {
        for role in UserRole::ALL {
            assert_eq!(role.to_string(), role.code());
            assert_eq!(
                serde_json::to_string(&role).unwrap(),
                format!("\"{}\"", role.code())
            );
        }
    }

    #[test]
    fn test_user_role_checks() {
        assert!(UserRole::DIRECTORY_READERS.contains(&UserRole::Admin));
        assert!(!UserRole::DIRECTORY_READERS.contains(&UserRole::Psicologo));
    }
}
