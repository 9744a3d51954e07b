use starnote_core::AppContext;

use crate::cli::AccountCommands;
use crate::error::CliError;

pub async fn run_account(context: &AppContext, command: AccountCommands) -> Result<(), CliError> {
    match command {
        AccountCommands::Register {
            username,
            password,
            email,
        } => {
            let session = context
                .accounts()?
                .register(&username, email.as_deref(), &password)
                .await?;
            println!("Registered {} on the sync server", session.username);
        }
        AccountCommands::Login { username, password } => {
            let session = context.accounts()?.login(&username, &password).await?;
            let email_label = session.email.as_deref().unwrap_or("(no email)");
            println!("Signed in as {} {email_label}", session.username);
        }
        AccountCommands::Logout => {
            if context.logout()? {
                println!("Signed out of the sync server");
            } else {
                println!("Not signed in");
            }
        }
        AccountCommands::Status => {
            let server = context
                .config()
                .api_base_url
                .as_deref()
                .unwrap_or("(not configured)");
            match context.current_session()? {
                Some(session) => println!(
                    "Signed in as {} (user id {}) on {server}",
                    session.username, session.user_id
                ),
                None => println!("Not signed in. Server: {server}"),
            }
        }
        AccountCommands::Update { username, email } => {
            let user = context
                .accounts()?
                .update_profile(username, email)
                .await?;
            let email_label = user.email.as_deref().unwrap_or("(no email)");
            println!("Profile updated: {} {email_label}", user.username);
        }
    }
    Ok(())
}
