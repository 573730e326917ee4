use anyhow::{bail, Context, Result};
use clap::builder::styling::{AnsiColor, Color, Style};
use clap::builder::Styles;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use jobs_server::config::USER_DB_FILE_NAME;
use jobs_server::user::{SqliteUserStore, UserManager, UserRole};

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

fn get_styles() -> Styles {
    let accent = Style::new()
        .bold()
        .underline()
        .fg_color(Some(Color::Ansi(AnsiColor::Cyan)));
    Styles::styled()
        .usage(accent)
        .header(accent)
        .literal(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .invalid(Style::new().bold().fg_color(Some(Color::Ansi(AnsiColor::Red))))
        .error(Style::new().bold().fg_color(Some(Color::Ansi(AnsiColor::Red))))
        .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightBlack))))
}

/// Manages users, passwords and roles of a jobs server user database.
#[derive(Parser)]
#[command(styles=get_styles())]
struct CliArgs {
    /// Path to the user database file, or to the directory holding it.
    #[clap(value_parser = parse_path)]
    pub path: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Creates a user with the given handle.
    AddUser { user_handle: String },

    /// Creates a password authentication for the given user.
    /// Fails if the user already has a password set.
    AddLogin {
        user_handle: String,
        password: String,
    },

    /// Change the password of a user, fails if no password was set.
    UpdateLogin {
        user_handle: String,
        password: String,
    },

    /// Deletes the password authentication for a given user.
    DeleteLogin { user_handle: String },

    /// Shows authentication information of a given user.
    Show { user_handle: String },

    /// Verifies the password of a given user, it doesn't make any
    /// persistent change, nor it creates any token, it just
    /// compares the password hash.
    CheckPassword {
        user_handle: String,
        password: String,
    },

    /// Shows all user handles.
    UserHandles,

    /// Lists the available roles and their permissions.
    ListRoles,

    /// Assigns a role (Admin, Editor, Viewer) to a user.
    AddRole { user_handle: String, role: String },

    /// Removes a role from a user.
    RemoveRole { user_handle: String, role: String },
}

fn parse_role(role: &str) -> Result<UserRole> {
    match UserRole::from_str(role) {
        Some(role) => Ok(role),
        None => bail!(
            "Invalid role '{}'. Valid roles are: {}",
            role,
            UserRole::ALL
                .iter()
                .map(|r| r.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

fn require_user_id(user_manager: &UserManager, user_handle: &str) -> Result<usize> {
    user_manager
        .get_user_id(user_handle)?
        .with_context(|| format!("User '{}' not found", user_handle))
}

fn show_user(user_manager: &UserManager, user_handle: &str) -> Result<()> {
    let user_id = require_user_id(user_manager, user_handle)?;
    let user_credentials = user_manager.get_user_credentials(user_handle)?;
    let user_tokens = user_manager.get_user_tokens(user_handle)?;

    println!("User {} (id {})", user_handle, user_id);
    println!("\nUser Credentials:");
    println!("{:#?}", user_credentials);

    println!("\nAuth Tokens:");
    for token in user_tokens.iter() {
        println!("{:#?}", token);
    }

    let roles = user_manager.get_user_roles(user_id)?;
    println!("\nRoles:");
    if roles.is_empty() {
        println!("  (no roles assigned)");
    }
    for role in roles.iter() {
        println!("  - {}", role);
    }

    let permissions = user_manager.get_user_permissions(user_id)?;
    println!("\nResolved Permissions:");
    if permissions.is_empty() {
        println!("  (no permissions)");
    }
    for permission in permissions.iter() {
        println!("  - {:?}", permission);
    }
    Ok(())
}

fn execute_command(command: Command, user_manager: &UserManager) -> Result<()> {
    match command {
        Command::AddUser { user_handle } => {
            let user_id = user_manager.add_user(&user_handle)?;
            println!("Created user '{}' with id {}", user_handle, user_id);
        }
        Command::AddLogin {
            user_handle,
            password,
        } => {
            user_manager.create_password_credentials(&user_handle, &password)?;
            println!("Password set for '{}'", user_handle);
        }
        Command::UpdateLogin {
            user_handle,
            password,
        } => {
            user_manager.update_password_credentials(&user_handle, &password)?;
            println!("Password updated for '{}'", user_handle);
        }
        Command::DeleteLogin { user_handle } => {
            user_manager.delete_password_credentials(&user_handle)?;
            println!("Password removed for '{}'", user_handle);
        }
        Command::Show { user_handle } => show_user(user_manager, &user_handle)?,
        Command::CheckPassword {
            user_handle,
            password,
        } => {
            let user_credentials = user_manager
                .get_user_credentials(&user_handle)?
                .with_context(|| format!("User {} not found.", user_handle))?;
            let password_credentials = user_credentials
                .username_password
                .with_context(|| format!("User {} has no password set.", user_handle))?;
            let msg = match password_credentials.verify(&password) {
                Ok(true) => "The password provided is correct!".to_string(),
                Ok(false) => "Wrong password.".to_string(),
                Err(err) => format!(
                    "Could not verify the password, something went wrong: {}",
                    err
                ),
            };
            println!("{}", msg);
        }
        Command::UserHandles => {
            for handle in user_manager.get_all_user_handles()? {
                println!("{}", handle);
            }
        }
        Command::ListRoles => {
            println!("Available Roles:\n");
            for role in UserRole::ALL.iter() {
                println!("Role: {}", role);
                println!("Permissions:");
                for permission in role.permissions() {
                    println!("  - {:?}", permission);
                }
                println!();
            }
        }
        Command::AddRole { user_handle, role } => {
            let role_enum = parse_role(&role)?;
            let user_id = require_user_id(user_manager, &user_handle)?;
            user_manager.add_user_role(user_id, role_enum)?;
            println!("Role '{}' added to user '{}'", role_enum, user_handle);
        }
        Command::RemoveRole { user_handle, role } => {
            let role_enum = parse_role(&role)?;
            let user_id = require_user_id(user_manager, &user_handle)?;
            user_manager.remove_user_role(user_id, role_enum)?;
            println!("Role '{}' removed from user '{}'", role_enum, user_handle);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();
    let db_path = if cli_args.path.is_dir() {
        cli_args.path.join(USER_DB_FILE_NAME)
    } else {
        cli_args.path
    };
    let user_store = SqliteUserStore::new(&db_path)
        .with_context(|| format!("Could not open user database at {:?}", db_path))?;
    let user_manager = UserManager::new(Box::new(user_store));

    execute_command(cli_args.command, &user_manager)
}
