//! staffdesk CLI
//!
//! Drives the session and roster stores against the local Sled namespace.
//! The session survives between invocations, so `login` once and then run
//! the roster commands.
//!
//! Usage:
//!   cargo run --bin load_data                 # optional demo data
//!   cargo run --bin staffdesk -- login -e admin@staffdesk.local -p admin123
//!   cargo run --bin staffdesk -- list --search engineering

use std::sync::Arc;

use clap::{Parser, Subcommand};

use staffdesk::config::Settings;
use staffdesk::models::{Employee, EmployeePatch, EmployeeStatus, NewEmployee};
use staffdesk::notify::{Notice, Notifier, Severity};
use staffdesk::stats::DashboardStats;
use staffdesk::storage::Storage;
use staffdesk::{telemetry, validation, App, Backend};

#[derive(Parser)]
#[command(name = "staffdesk")]
#[command(about = "Employee administration over a local key-value store", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    settings: Settings,
}

#[derive(Subcommand)]
enum Commands {
    Register {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    Logout,
    /// Show the logged-in administrator
    Whoami,
    UpdateProfile {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
    },
    ChangePassword {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
        #[arg(long)]
        confirm: String,
    },
    Add {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(short, long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(short, long)]
        department: String,
        #[arg(short, long)]
        role: String,
        #[arg(short, long, default_value = "active")]
        status: EmployeeStatus,
        /// YYYY-MM-DD
        #[arg(long)]
        date_joined: String,
        #[arg(long)]
        avatar: Option<String>,
    },
    Update {
        #[arg(short, long)]
        id: String,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(short, long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(short, long)]
        department: Option<String>,
        #[arg(short, long)]
        role: Option<String>,
        #[arg(short, long)]
        status: Option<EmployeeStatus>,
        #[arg(long)]
        date_joined: Option<String>,
        #[arg(long)]
        avatar: Option<String>,
        /// Remove the avatar
        #[arg(long, conflicts_with = "avatar")]
        clear_avatar: bool,
    },
    Delete {
        #[arg(short, long)]
        id: String,
    },
    Get {
        #[arg(short, long)]
        id: String,
    },
    List {
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long)]
        json: bool,
    },
    Stats {
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    /// Everything but the account entry points needs a session.
    fn requires_session(&self) -> bool {
        !matches!(
            self,
            Commands::Register { .. } | Commands::Login { .. } | Commands::Logout
        )
    }
}

/// Prints every notice as it is raised.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        match notice.severity {
            Severity::Info => println!("✅ {}: {}", notice.title, notice.description),
            Severity::Destructive => println!("❌ {}: {}", notice.title, notice.description),
        }
    }
}

fn print_employee(employee: &Employee) {
    println!(
        "{:<15} {:<22} {:<30} {:<14} {:<24} {:<9} {}",
        employee.id,
        employee.full_name(),
        employee.email,
        employee.department,
        employee.role,
        employee.status,
        employee.date_joined
    );
}

fn print_roster(employees: &[Employee], json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(employees)?);
        return Ok(());
    }
    if employees.is_empty() {
        println!("No employees found matching your search.");
    }
    for employee in employees {
        print_employee(employee);
    }
    Ok(())
}

fn outcome(ok: bool) -> Result<(), Box<dyn std::error::Error>> {
    if ok {
        Ok(())
    } else {
        Err("operation failed".into())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let _log_guard = telemetry::init(&cli.settings);

    let storage = Storage::open(&cli.settings.data_path())?;
    let backend = Backend::new(storage.clone())
        .with_latency(cli.settings.latency())
        .with_notifier(Arc::new(ConsoleNotifier));
    let app = App::start(backend)?;

    if cli.command.requires_session() && !app.session.is_authenticated() {
        return Err("not logged in; run `staffdesk login` first".into());
    }

    let result = run(&app, cli.command).await;
    storage.flush()?;
    result
}

async fn run(app: &App, command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Register { name, email, password } => {
            validation::validate_registration(&name, &email, &password)?;
            outcome(app.session.register(&name, &email, &password).await)
        }
        Commands::Login { email, password } => {
            validation::validate_login(&email, &password)?;
            outcome(app.session.login(&email, &password).await)
        }
        Commands::Logout => {
            app.session.logout();
            Ok(())
        }
        Commands::Whoami => {
            if let Some(admin) = app.session.admin() {
                println!("{} <{}> (account {})", admin.name, admin.email, admin.id);
            }
            Ok(())
        }
        Commands::UpdateProfile { name, email } => {
            validation::validate_profile(&name, &email)?;
            outcome(app.session.update_profile(&name, &email).await)
        }
        Commands::ChangePassword { current, new, confirm } => {
            outcome(app.session.change_password(&current, &new, &confirm).await)
        }
        Commands::Add {
            first_name,
            last_name,
            email,
            phone,
            department,
            role,
            status,
            date_joined,
            avatar,
        } => {
            let employee = NewEmployee {
                first_name,
                last_name,
                email,
                phone,
                department,
                role,
                status,
                date_joined,
                avatar,
            };
            validation::validate_new_employee(&employee)?;
            let ok = app.roster.add_employee(employee).await;
            if ok {
                if let Some(added) = app.roster.employees().last() {
                    println!("📥 Employee id: {}", added.id);
                }
            }
            outcome(ok)
        }
        Commands::Update {
            id,
            first_name,
            last_name,
            email,
            phone,
            department,
            role,
            status,
            date_joined,
            avatar,
            clear_avatar,
        } => {
            let avatar = if clear_avatar { Some(None) } else { avatar.map(Some) };
            let patch = EmployeePatch {
                first_name,
                last_name,
                email,
                phone,
                department,
                role,
                status,
                date_joined,
                avatar,
            };
            if patch.is_empty() {
                return Err("nothing to update; pass at least one field".into());
            }
            validation::validate_patch(&patch)?;
            outcome(app.roster.update_employee(&id, &patch).await)
        }
        Commands::Delete { id } => outcome(app.roster.delete_employee(&id).await),
        Commands::Get { id } => {
            match app.roster.get_employee(&id) {
                Some(employee) => println!("{}", serde_json::to_string_pretty(&employee)?),
                None => {
                    // Unknown ids fall back to the full list
                    println!("🔍 Employee {id} not found");
                    print_roster(&app.roster.employees(), false)?;
                }
            }
            Ok(())
        }
        Commands::List { search, json } => {
            let employees = match search {
                Some(term) => app.roster.search(&term),
                None => app.roster.employees(),
            };
            print_roster(&employees, json)
        }
        Commands::Stats { json } => {
            let stats = DashboardStats::compute(&app.roster.employees());
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
                return Ok(());
            }
            println!("Total employees:    {}", stats.total);
            println!("Active employees:   {}", stats.active);
            println!("Inactive employees: {}", stats.inactive);
            println!("Departments:        {}", stats.department_count());
            for department in &stats.departments {
                println!("  {:<20} {}", department.name, department.count);
            }
            println!("Recent employees:");
            for employee in &stats.recent {
                print_employee(employee);
            }
            Ok(())
        }
    }
}
