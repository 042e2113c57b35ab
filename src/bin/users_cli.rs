use clap::{Parser, Subcommand};
use std::process::ExitCode;

use users_service::client::{HttpUsersApi, UserDashboard, UserForm};
use users_service::models::UserRecord;

#[derive(Parser)]
#[command(name = "users-cli")]
#[command(about = "Manage users through a running users service")]
#[command(version)]
struct Cli {
    #[arg(long, env = "USERS_API_URL", default_value = "http://localhost:5000", help = "Base URL of the users service")]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct UserFields {
    #[arg(long)]
    name: String,
    #[arg(long)]
    age: String,
    #[arg(long)]
    city: String,
    #[arg(long)]
    email: String,
    #[arg(long, default_value = "", help = "Comma-separated, e.g. \"reading, coding\"")]
    hobbies: String,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "List all users")]
    List,
    #[command(about = "Create a user")]
    Create(UserFields),
    #[command(about = "Replace every field of a user")]
    Update {
        id: String,
        #[command(flatten)]
        fields: UserFields,
    },
    #[command(about = "Delete a user")]
    Delete { id: String },
}

fn fill(form: &mut UserForm, fields: UserFields) {
    form.name = fields.name;
    form.age = fields.age;
    form.city = fields.city;
    form.email = fields.email;
    form.hobbies = fields.hobbies;
}

fn print_users(users: &[UserRecord]) {
    println!("All Users ({})", users.len());
    if users.is_empty() {
        println!("No users found.");
    }
    for user in users {
        println!("{}  {} ({}), {}, {}", user.id, user.name, user.age, user.city, user.email);
        if !user.hobbies.is_empty() {
            println!("    hobbies: {}", user.hobbies.join(", "));
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("warn"));
    let cli = Cli::parse();

    let mut dashboard = UserDashboard::new(HttpUsersApi::new(&cli.api_url));

    let ok = match cli.command {
        Commands::List => dashboard.refresh().await,
        Commands::Create(fields) => {
            fill(dashboard.form_mut(), fields);
            dashboard.submit().await
        }
        Commands::Update { id, fields } => {
            // The form can only enter edit mode for a listed user
            if !dashboard.refresh().await {
                false
            } else if !dashboard.begin_edit(&id) {
                eprintln!("❌ User not found: {}", id);
                return ExitCode::FAILURE;
            } else {
                fill(dashboard.form_mut(), fields);
                dashboard.submit().await
            }
        }
        Commands::Delete { id } => dashboard.delete(&id).await,
    };

    if let Some(message) = dashboard.success_message() {
        println!("✅ {}", message);
    }
    if let Some(message) = dashboard.error_message() {
        eprintln!("❌ {}", message);
    }
    if ok {
        print_users(dashboard.users());
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
