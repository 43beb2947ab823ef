use std::process::ExitCode;

use anyhow::Result;
use mae_core::SessionState;

use super::{App, output, prompt};

pub async fn login(app: &App, email: &str, password: Option<String>) -> Result<ExitCode> {
    let password = prompt::password(password)?;
    let connected = app.connect().await?;

    let session = connected.session.login(email, &password).await?;
    output::success(&format!("Connecté en tant que {}", session.identity.email));
    Ok(ExitCode::SUCCESS)
}

pub async fn signup(app: &App, email: &str, password: Option<String>) -> Result<ExitCode> {
    let password = prompt::password(password)?;
    let connected = app.connect().await?;

    let message = connected.session.signup(email, &password).await?;
    output::success(&message);
    output::info("Vous pouvez maintenant vous connecter avec `mae login`.");
    Ok(ExitCode::SUCCESS)
}

pub async fn logout(app: &App) -> Result<ExitCode> {
    app.local().await.logout().await?;
    output::success("Déconnecté");
    Ok(ExitCode::SUCCESS)
}

pub async fn whoami(app: &App) -> Result<ExitCode> {
    match app.local().await.state().await {
        SessionState::Authenticated(session) => {
            println!("{} ({})", session.identity.email, session.identity.id);
            Ok(ExitCode::SUCCESS)
        }
        _ => {
            output::login_required();
            Ok(super::login_required())
        }
    }
}
