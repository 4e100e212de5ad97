//! UI strings per locale.

use twd_core::config::Locale;

/// Every user-facing string of the view.
#[derive(Debug, PartialEq, Eq)]
pub struct Strings {
    pub partner: &'static str,
    pub description: &'static str,
    pub sign_in_button: &'static str,
    pub signing_in: &'static str,
    pub sign_in_error_title: &'static str,
    pub sign_in_error_body: &'static str,
    pub sign_in_cancelled: &'static str,
    pub sign_in_denied: &'static str,
    pub open_url_hint: &'static str,
    pub waiting_for_browser: &'static str,
    pub profile_title: &'static str,
    pub display_name: &'static str,
    pub email: &'static str,
    pub user_id: &'static str,
    pub profile_image: &'static str,
    pub sign_out_button: &'static str,
    pub signing_out: &'static str,
    pub signed_out: &'static str,
    pub revoke_failed: &'static str,
    pub sign_out_error_title: &'static str,
    pub sign_out_error_body: &'static str,
    pub hint_sign_in: &'static str,
    pub hint_sign_out: &'static str,
    pub hint_open_url: &'static str,
    pub hint_quit: &'static str,
    pub hint_cancel: &'static str,
    pub hint_dismiss: &'static str,
}

pub static EN: Strings = Strings {
    partner: "by twitch",
    description: "See interesting data about the world of Twitch",
    sign_in_button: "Sign in with Twitch",
    signing_in: "Signing in...",
    sign_in_error_title: "Sign-in error",
    sign_in_error_body: "An error occurred while trying to sign in",
    sign_in_cancelled: "Sign-in cancelled",
    sign_in_denied: "Access was not granted",
    open_url_hint: "If the browser did not open, visit:",
    waiting_for_browser: "Waiting for the browser...",
    profile_title: "Profile",
    display_name: "Name",
    email: "Email",
    user_id: "Id",
    profile_image: "Avatar",
    sign_out_button: "Sign out",
    signing_out: "Signing out...",
    signed_out: "Signed out",
    revoke_failed: "Signed out locally; the token could not be revoked",
    sign_out_error_title: "Sign-out error",
    sign_out_error_body: "An error occurred while trying to sign out",
    hint_sign_in: "sign in",
    hint_sign_out: "sign out",
    hint_open_url: "open avatar",
    hint_quit: "quit",
    hint_cancel: "cancel",
    hint_dismiss: "dismiss",
};

pub static PT_BR: Strings = Strings {
    partner: "by twitch",
    description: "Veja dados interessantes sobre o mundo da Twitch",
    sign_in_button: "Entrar com Twitch",
    signing_in: "Entrando...",
    sign_in_error_title: "Erro SignIn",
    sign_in_error_body: "Ocorreu um erro ao tentar logar no app",
    sign_in_cancelled: "Login cancelado",
    sign_in_denied: "Acesso não autorizado",
    open_url_hint: "Se o navegador não abriu, acesse:",
    waiting_for_browser: "Aguardando o navegador...",
    profile_title: "Perfil",
    display_name: "Nome",
    email: "Email",
    user_id: "Id",
    profile_image: "Avatar",
    sign_out_button: "Sair",
    signing_out: "Saindo...",
    signed_out: "Você saiu",
    revoke_failed: "Sessão encerrada; não foi possível revogar o token",
    sign_out_error_title: "Erro SignOut",
    sign_out_error_body: "Ocorreu um erro ao tentar sair do app",
    hint_sign_in: "entrar",
    hint_sign_out: "sair",
    hint_open_url: "abrir avatar",
    hint_quit: "fechar",
    hint_cancel: "cancelar",
    hint_dismiss: "ok",
};

pub fn strings(locale: Locale) -> &'static Strings {
    match locale {
        Locale::En => &EN,
        Locale::PtBr => &PT_BR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strings_for_locale() {
        assert_eq!(strings(Locale::En).sign_in_button, "Sign in with Twitch");
        assert_eq!(strings(Locale::PtBr).signing_in, "Entrando...");
        assert_eq!(strings(Locale::PtBr).sign_in_error_title, "Erro SignIn");
    }
}
