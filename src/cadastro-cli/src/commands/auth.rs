use crate::session::Session;
use anyhow::{Context, Result};
use cadastro_sdk::CadastroClient;
use dialoguer::{Input, Password};

/// Log in and persist the access token to the session file
pub async fn login(
    client: &CadastroClient,
    session: &Session,
    email: Option<String>,
) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => Input::<String>::new()
            .with_prompt("Email")
            .interact_text()
            .context("Failed to read email")?,
    };
    let password = Password::new()
        .with_prompt("Password")
        .interact()
        .context("Failed to read password")?;

    let token = client
        .login(&email, &password)
        .await
        .context("Login failed")?;

    session.store_token(&token.access_token)?;
    println!(
        "Logged in as {email}; token stored at {}",
        session.path().display()
    );
    Ok(())
}

/// Drop the stored session, if any
pub fn logout(session: &Session) -> Result<()> {
    if session.clear()? {
        println!("Logged out.");
    } else {
        println!("No stored session.");
    }
    Ok(())
}
