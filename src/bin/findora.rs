use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use findora::auth::{SessionSnapshot, User};
use findora::guard::{AdminGate, GuardOutcome};
use findora::items::RecencyFilter;
use findora::prelude::*;
use findora::setup::initialize_system;
use findora::ui::{LogNavigator, ToastLevel};
use findora::views::{AdminView, ImageFile, ProfileView, SearchView, UploadForm, UploadPermission, UploadView};

#[derive(Parser, Debug)]
#[clap(name = "findora", version)]
#[clap(about = "Findora lost-and-found client", long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct Credentials {
    #[clap(long)]
    email: String,

    #[clap(long)]
    password: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search registered items
    Search {
        /// Match against item name and place found
        #[clap(long)]
        term: Option<String>,

        /// Only items from the last seven days
        #[clap(long)]
        recent: bool,
    },
    /// Register a found item
    Upload {
        #[clap(flatten)]
        credentials: Credentials,

        #[clap(long)]
        name: String,

        #[clap(long)]
        phone: String,

        #[clap(long)]
        place_found: String,

        /// Where the owner can collect the item
        #[clap(long)]
        location: String,

        /// Photo of the item
        #[clap(long)]
        image: Option<PathBuf>,
    },
    /// Show, and optionally update, your profile
    Profile {
        #[clap(flatten)]
        credentials: Credentials,

        #[clap(long)]
        full_name: Option<String>,

        #[clap(long)]
        phone: Option<String>,
    },
    /// Moderate items (administrators only)
    Admin {
        #[clap(flatten)]
        credentials: Credentials,

        #[clap(subcommand)]
        action: AdminAction,
    },
    /// Create the image bucket and check table access
    Setup,
}

#[derive(Subcommand, Debug)]
enum AdminAction {
    /// List every item
    List,
    /// Delete an item by id
    Delete { id: String },
}

/// Prints notifications to stderr
struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, toast: Toast) {
        let label = match toast.level {
            ToastLevel::Success => "ok",
            ToastLevel::Info => "info",
            ToastLevel::Warning => "warning",
            ToastLevel::Error => "error",
        };
        eprintln!("[{}] {}", label, toast.message);
    }
}

fn content_type(path: &std::path::Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

fn print_items(items: &[LostItem]) {
    for item in items {
        println!(
            "{}  {}  found at {}  collect at {}  phone {}  ({})",
            item.id,
            item.name,
            item.place_found,
            item.location_to_collect,
            item.phone,
            item.created_at.format("%Y-%m-%d")
        );
    }
}

fn print_state(state: ViewState<Vec<LostItem>>) {
    match state {
        ViewState::Loading => println!("Loading..."),
        ViewState::Empty(message) => println!("{}", message),
        ViewState::Ready(items) => print_items(&items),
    }
}

async fn sign_in(app: &App, credentials: &Credentials) -> anyhow::Result<User> {
    app.session
        .sign_in(&credentials.email, &credentials.password)
        .await
        .context("sign in failed")?;

    app.client()
        .auth()
        .get_session()
        .map(|session| session.user)
        .context("no session after sign in")
}

async fn run(app: &App, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Search { term, recent } => {
            let mut view = SearchView::new(app.ctx.clone());
            if let Some(term) = term {
                view.set_term(&term);
            }
            if recent {
                view.set_filter(RecencyFilter::Recent);
            }
            view.load().await?;
            print_state(view.state(chrono::Utc::now()));
        }
        Commands::Upload {
            credentials,
            name,
            phone,
            place_found,
            location,
            image,
        } => {
            let user = sign_in(app, &credentials).await?;

            let image = match image {
                Some(path) => {
                    let bytes = tokio::fs::read(&path)
                        .await
                        .with_context(|| format!("could not read {}", path.display()))?;
                    let file_name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_default();
                    let mut file = ImageFile::new(&file_name, bytes);
                    if let Some(content_type) = content_type(&path) {
                        file = file.with_content_type(content_type);
                    }
                    Some(file)
                }
                None => None,
            };

            let mut view = UploadView::new(app.ctx.clone());
            if view.check_permission(Some(&user)).await == UploadPermission::Denied {
                anyhow::bail!("upload permission denied");
            }

            let form = UploadForm {
                name,
                phone,
                place_found,
                location_to_collect: location,
                image,
            };
            if let Some(item) = view.submit(Some(&user), &form).await? {
                println!("{}", item.id);
            }
        }
        Commands::Profile {
            credentials,
            full_name,
            phone,
        } => {
            let user = sign_in(app, &credentials).await?;
            let mut view = ProfileView::new(app.ctx.clone());
            view.load(&user).await?;

            if full_name.is_some() || phone.is_some() {
                let current = view.profile().cloned();
                let full_name = full_name
                    .or_else(|| current.as_ref().and_then(|p| p.full_name.clone()))
                    .unwrap_or_default();
                let phone = phone
                    .or_else(|| current.as_ref().and_then(|p| p.phone.clone()))
                    .unwrap_or_default();
                view.update(&full_name, &phone).await?;
            }

            let profile = view.profile();
            println!("id:    {}", user.id);
            println!("email: {}", user.email.as_deref().unwrap_or(""));
            println!(
                "name:  {}",
                profile.and_then(|p| p.full_name.as_deref()).unwrap_or("")
            );
            println!(
                "phone: {}",
                profile.and_then(|p| p.phone.as_deref()).unwrap_or("")
            );
            if view.show_admin_banner() {
                println!("You have administrator access.");
            }
            print_state(view.items());
        }
        Commands::Admin { credentials, action } => {
            sign_in(app, &credentials).await?;
            let session = app.client().auth().get_session();
            let snapshot = SessionSnapshot::resolved(session);

            let mut gate = AdminGate::new(Arc::new(app.client().clone()), app.ctx.notifier.clone());
            if gate.verify(&snapshot).await != GuardOutcome::Allow {
                anyhow::bail!("administrator access required");
            }

            let mut view = AdminView::new(app.ctx.clone());
            view.load().await?;
            match action {
                AdminAction::List => print_state(view.state()),
                AdminAction::Delete { id } => view.delete(&id).await?,
            }
        }
        Commands::Setup => {
            initialize_system(app.client(), app.ctx.notifier.as_ref()).await;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let config = Config::from_env();
    let app = App::start(config, Arc::new(StderrNotifier), Arc::new(LogNavigator)).await;

    let result = run(&app, cli.command).await;

    if app.client().auth().get_session().is_some() && app.session.sign_out().await.is_err() {
        log::warn!("session was not revoked");
    }
    app.shutdown().await;

    if let Err(err) = result {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
