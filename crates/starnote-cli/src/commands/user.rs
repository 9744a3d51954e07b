use starnote_core::AppContext;

use crate::cli::UserCommands;
use crate::error::CliError;

pub fn run_user(context: &AppContext, command: UserCommands) -> Result<(), CliError> {
    let users = context.users();
    match command {
        UserCommands::Register {
            username,
            password,
            email,
        } => {
            let user = users.register(&username, email.as_deref(), &password)?;
            users.set_current_user(&user)?;
            println!("Registered and signed in as {}", user.username);
        }
        UserCommands::Login { username, password } => {
            let user = users.login(&username, &password)?;
            println!("Signed in as {}", user.username);
        }
        UserCommands::Logout => {
            users.clear_current_user()?;
            println!("Signed out");
        }
        UserCommands::Whoami => match users.current_user()? {
            Some(user) => match user.email.as_deref() {
                Some(email) => println!("{} <{email}>", user.username),
                None => println!("{}", user.username),
            },
            None => println!("Not signed in."),
        },
        UserCommands::Passwd { old, new } => {
            let user = users.current_user()?.ok_or(CliError::NoCurrentUser)?;
            users.update_password(&user.username, &old, &new)?;
            println!("Password updated for {}", user.username);
        }
        UserCommands::Delete { username } => {
            users.delete(&username)?;
            println!("Deleted {}", username.trim());
        }
        UserCommands::List => {
            let current = users.current_user()?.map(|user| user.id);
            for user in users.list()? {
                let marker = if current.as_deref() == Some(user.id.as_str()) {
                    "*"
                } else {
                    " "
                };
                println!("{marker} {}", user.username);
            }
        }
    }
    Ok(())
}
