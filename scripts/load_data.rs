//! Load data script for staffdesk
//!
//! Populates the local namespace with:
//! - A demo administrator (admin@staffdesk.local / admin123), unless that email is taken
//! - Demo employees on top of the bootstrap roster, skipping emails already present
//! Run: cargo run --bin load_data -- --latency-ms 0

use std::sync::Arc;

use clap::Parser;

use staffdesk::config::Settings;
use staffdesk::models::{EmployeeStatus, NewEmployee};
use staffdesk::notify::TracingNotifier;
use staffdesk::storage::Storage;
use staffdesk::{telemetry, App, Backend};

#[derive(Parser)]
#[command(name = "load_data", about = "Seed staffdesk with demo data")]
struct Cli {
    #[command(flatten)]
    settings: Settings,
}

const DEMO_ADMIN: (&str, &str, &str) = ("Demo Admin", "admin@staffdesk.local", "admin123");

fn demo_employee(
    first_name: &str,
    last_name: &str,
    department: &str,
    role: &str,
    status: EmployeeStatus,
    date_joined: &str,
) -> NewEmployee {
    NewEmployee {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: format!(
            "{}.{}@company.com",
            first_name.to_lowercase(),
            last_name.to_lowercase()
        ),
        phone: "+1 (555) 010-0000".to_string(),
        department: department.to_string(),
        role: role.to_string(),
        status,
        date_joined: date_joined.to_string(),
        avatar: None,
    }
}

/// Register the demo administrator. Registering opens a session, which is
/// closed again; a login that was already open is left alone.
async fn seed_admin(app: &App) -> bool {
    let (name, email, password) = DEMO_ADMIN;
    let registered = app.session.register(name, email, password).await;
    if registered {
        app.session.logout();
    }
    registered
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let _log_guard = telemetry::init(&cli.settings);

    let storage = Storage::open(&cli.settings.data_path())?;
    let backend = Backend::new(storage.clone())
        .with_latency(cli.settings.latency())
        .with_notifier(Arc::new(TracingNotifier));
    let app = App::start(backend)?;

    let (_, email, password) = DEMO_ADMIN;
    if seed_admin(&app).await {
        println!("✅ Registered demo administrator {email} (password: {password})");
    } else {
        println!("ℹ️  Demo administrator {email} not registered (already exists or storage failed)");
    }

    let demo = vec![
        demo_employee("Emily", "Clark", "Engineering", "Frontend Developer", EmployeeStatus::Active, "2023-06-12"),
        demo_employee("Omar", "Haddad", "Finance", "Accountant", EmployeeStatus::Active, "2023-08-01"),
        demo_employee("Lucia", "Fernandez", "HR", "HR Specialist", EmployeeStatus::Active, "2024-01-08"),
        demo_employee("Kenji", "Watanabe", "Engineering", "DevOps Engineer", EmployeeStatus::Inactive, "2022-11-21"),
        demo_employee("Amara", "Okafor", "Sales", "Account Executive", EmployeeStatus::Active, "2024-03-18"),
    ];

    let mut added = 0;
    for employee in demo {
        let exists = app
            .roster
            .employees()
            .iter()
            .any(|existing| existing.email == employee.email);
        if exists {
            continue;
        }
        if app.roster.add_employee(employee).await {
            added += 1;
        }
    }

    storage.flush()?;
    println!(
        "✅ Added {added} demo employees; roster now holds {}",
        app.roster.employees().len()
    );
    Ok(())
}
