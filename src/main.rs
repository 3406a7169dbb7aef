use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::*;
use serde_json::Value;

use school_console::api::{ApiClient, UploadFile};
use school_console::core::{get_subscriber, init_subscriber, AppConfig, AppError};
use school_console::dashboards::{load_dashboard, Dashboard};
use school_console::forms::{EntityKind, FieldInput, FormController, ListSource, SubmitOutcome};
use school_console::loader::{fetch_choices, ReferenceList};
use school_console::models::enums::UserRole;
use school_console::models::Choice;
use school_console::notify::ConsoleNotifier;
use school_console::session::{FileSessionStore, SessionContext};
use school_console::uploads::{
    AutoConfirm, Confirmer, UploadController, UploadKind, UploadOutcome, UploadPreview,
};

/// Administrative console for the school-management backend
#[derive(Parser, Debug)]
#[command(name = "school_console")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Directory holding base.yaml and the per-environment files
    #[arg(long, default_value = "configuration")]
    config_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage the stored sign-in session
    #[command(subcommand)]
    Session(SessionCommands),

    /// List schools
    Schools,

    /// List branches, optionally only those of one school
    Branches {
        #[arg(long)]
        school_id: Option<String>,
    },

    /// List users of a school with a given role
    Users {
        #[arg(long)]
        school_id: String,

        /// PRINCIPAL, TEACHER, PARENT, ADMIN or STUDENT
        #[arg(long)]
        role: UserRole,
    },

    /// Fill in and submit a registration form
    Register {
        /// school, branch, user, student, parent or relationship
        entity: EntityKind,

        /// Field value as name=value; repeat for each field
        #[arg(long = "set", value_parser = parse_key_val)]
        values: Vec<(String, String)>,
    },

    /// Bulk-import a file
    Upload {
        /// school-setup, families, attendance, student-enrollments,
        /// question-papers or report-cards
        kind: UploadKind,

        file: PathBuf,

        /// Extra form field as name=value (report-cards: schoolId, yearId, term)
        #[arg(long = "field", value_parser = parse_key_val)]
        fields: Vec<(String, String)>,

        /// Commit after validation without asking
        #[arg(short, long)]
        yes: bool,
    },

    /// Show the dashboard for the signed-in user
    Dashboard,
}

#[derive(Subcommand, Debug)]
enum SessionCommands {
    /// Store a bearer token and the user it belongs to
    Save {
        #[arg(long)]
        token: String,

        /// Raw user object as JSON
        #[arg(long)]
        user: Option<String>,
    },

    /// Print who is signed in
    Show,

    /// Forget the stored session
    Clear,
}

fn parse_key_val(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{}'", raw))?;
    Ok((key.trim().to_string(), value.to_string()))
}

/// Shows the dry-run result and reads y/N from stdin.
struct StdinConfirmer;

impl Confirmer for StdinConfirmer {
    fn confirm(&self, preview: &UploadPreview) -> bool {
        println!("{}", "Validation result".bold());
        println!("{}", preview.render());
        print!("Commit this upload? [y/N] ");
        if std::io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match std::io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            Err(_) => false,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = AppConfig::from_dir(cli.config_dir.clone()).context("Failed to load configuration")?;

    let file_appender = tracing_appender::rolling::daily(&config.telemetry.log_dir, "school_console");
    let subscriber = get_subscriber(
        "school_console".into(),
        config.telemetry.level.clone(),
        file_appender,
    );
    init_subscriber(subscriber)?;

    let store = FileSessionStore::new(&config.session.store_path);
    let session = SessionContext::restore(&store).unwrap_or_else(|e| {
        tracing::warn!(error.cause_chain = ?e, error.message = %e, "ignoring unreadable session file");
        SessionContext::anonymous()
    });
    let api = ApiClient::new(&config.api, session.clone())?;
    let page_size = config.api.page_size;

    let succeeded = match cli.command {
        Commands::Session(command) => run_session(command, &session, &store)?,
        Commands::Schools => {
            print_choices(collect_choices(&api, ListSource::Schools, None, page_size).await?);
            true
        }
        Commands::Branches { school_id } => {
            let choices =
                collect_choices(&api, ListSource::BranchesOfSchool, school_id.as_deref(), page_size)
                    .await?;
            print_choices(choices);
            true
        }
        Commands::Users { school_id, role } => {
            let choices =
                collect_choices(&api, ListSource::UsersOfSchool(role), Some(school_id.as_str()), page_size)
                    .await?;
            print_choices(choices);
            true
        }
        Commands::Register { entity, values } => run_register(&api, entity, values, page_size).await?,
        Commands::Upload {
            kind,
            file,
            fields,
            yes,
        } => run_upload(&api, kind, file, fields, yes).await?,
        Commands::Dashboard => {
            print_dashboard(load_dashboard(&api, &session).await?);
            true
        }
    };

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn run_session(
    command: SessionCommands,
    session: &SessionContext,
    store: &FileSessionStore,
) -> anyhow::Result<bool> {
    match command {
        SessionCommands::Save { token, user } => {
            let user: Option<Value> = user
                .map(|raw| serde_json::from_str(&raw))
                .transpose()
                .context("--user must be a JSON object")?;
            session.sign_in(token, user);
            session.persist(store)?;
            println!("{}", "Session saved".green());
        }
        SessionCommands::Show => {
            if !session.is_authenticated() {
                println!("{}", "Not signed in".yellow());
                return Ok(true);
            }
            println!("Signed in");
            println!("  user id: {}", session.user_id().unwrap_or_else(|| "-".to_string()));
            println!(
                "  dashboard: {}",
                session.role().map(|role| role.as_str()).unwrap_or("none")
            );
        }
        SessionCommands::Clear => {
            session.sign_out();
            session.persist(store)?;
            println!("{}", "Session cleared".green());
        }
    }
    Ok(true)
}

/// Loads every page of a reference list, failing instead of showing an empty one.
async fn collect_choices(
    api: &ApiClient,
    source: ListSource,
    scope: Option<&str>,
    page_size: u32,
) -> Result<Vec<Choice>, AppError> {
    let mut list = match source {
        ListSource::UsersOfSchool(_) => ReferenceList::unpaged(page_size, source.empty_message()),
        _ => ReferenceList::paged(page_size, source.empty_message()),
    };
    let mut next = match scope {
        Some(scope) => list.rescope(scope),
        None => list.activate(),
    };
    while let Some(ticket) = next {
        let result = fetch_choices(api, source, ticket.scope.as_deref(), ticket.page).await;
        if let Err(e) = &result {
            return Err(e.clone());
        }
        list.complete(&ticket, result);
        next = list.load_more();
    }
    if list.items().is_empty() {
        println!("{}", source.empty_message().yellow());
    }
    Ok(list.items().to_vec())
}

fn print_choices(choices: Vec<Choice>) {
    for choice in choices {
        println!("{:>6}  {}", choice.id.bold(), choice.label);
    }
}

async fn run_register(
    api: &ApiClient,
    entity: EntityKind,
    mut values: Vec<(String, String)>,
    page_size: u32,
) -> anyhow::Result<bool> {
    let mut form = FormController::new(entity, page_size);
    let schema = entity.schema();
    form.open(api).await;

    // The scope goes first so its dependents are loaded before they are set.
    values.sort_by_key(|(name, _)| !schema.is_scope(name));
    for (name, value) in values {
        form.input(api, &name, FieldInput::Text(value)).await?;
        if schema.is_scope(&name) {
            for dependent in schema.dependents {
                form.load_remaining(api, dependent.field).await;
            }
        }
    }
    if let Some(scope) = schema.scope {
        form.load_remaining(api, scope).await;
    }

    match form.submit(api, &ConsoleNotifier).await {
        SubmitOutcome::Submitted { response, .. } => {
            if !response.is_null() {
                println!("{}", serde_json::to_string_pretty(&response)?);
            }
            Ok(true)
        }
        SubmitOutcome::Invalid(errors) => {
            eprintln!("{}", "The form has errors:".red().bold());
            for (field, message) in errors {
                eprintln!("  {}: {}", field.bold(), message);
            }
            Ok(false)
        }
        SubmitOutcome::Busy | SubmitOutcome::Failed { .. } => Ok(false),
    }
}

async fn run_upload(
    api: &ApiClient,
    kind: UploadKind,
    path: PathBuf,
    fields: Vec<(String, String)>,
    yes: bool,
) -> anyhow::Result<bool> {
    let bytes = std::fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .context("File path has no usable file name")?
        .to_string();

    let mut controller = UploadController::new(kind);
    controller.select(UploadFile { file_name, bytes });
    for (key, value) in fields {
        controller.set_extra(&key, value)?;
    }

    let confirmer: Box<dyn Confirmer> = if yes {
        Box::new(AutoConfirm(true))
    } else {
        Box::new(StdinConfirmer)
    };
    let outcome = controller.run(api, confirmer.as_ref(), &ConsoleNotifier).await;
    Ok(match outcome {
        UploadOutcome::Completed { .. } => true,
        UploadOutcome::Cancelled { .. } => {
            println!("{}", "Upload cancelled, nothing was committed".yellow());
            true
        }
        UploadOutcome::Rejected { .. } | UploadOutcome::Busy | UploadOutcome::Failed { .. } => false,
    })
}

fn print_dashboard(dashboard: Dashboard) {
    println!("{}", "-----------------------------------------".green());
    println!("{} dashboard", dashboard.role().as_str().bold());
    println!("{}", "-----------------------------------------".green());
    let data = match dashboard {
        Dashboard::Student { data, .. } | Dashboard::Teacher { data, .. } => data,
        Dashboard::Parent { user } | Dashboard::Admin { user } => user,
    };
    match serde_json::to_string_pretty(&data) {
        Ok(text) => println!("{}", text),
        Err(e) => tracing::error!(error.cause_chain = ?e, error.message = %e, "dashboard could not be printed"),
    }
}
