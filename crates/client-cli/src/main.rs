use std::path::PathBuf;
use std::sync::Arc;

use adforge::api::ImageUpload;
use adforge::config::Config;
use adforge::format::{format_file_size, format_optional_date};
use adforge::session::{landing_route, Access};
use adforge::{ApiClient, ApiError, ConsoleNotifier, FileStore, SessionStore};
use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use shared::{
    ContentPlanRequest, Generation, GenerationStatus, MarketingGoal, MarketingPlanRequest, NewAccount,
    NewProject, Page, ProductImage, ProductRenderRequest, Project, ProjectUpdate, RenderType,
    SeoContentRequest, TextToImageRequest,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "adforge")]
#[command(about = "AI marketing content from the terminal: projects, product images and generations")]
#[command(version)]
struct Cli {
    /// API base URL (overrides config and ADFORGE_API_URL)
    #[arg(long, global = true)]
    server: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in
    Login {
        /// Username or email
        username: Option<String>,
        #[arg(long)]
        password: Option<String>,
        /// Route to continue to after signing in
        #[arg(long)]
        return_to: Option<String>,
    },
    /// Create an account and sign in
    Register {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },
    /// Sign out and forget the stored token
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Overview of projects and recent generations
    Dashboard,
    /// Manage projects
    Projects {
        #[command(subcommand)]
        action: ProjectAction,
    },
    /// Manage product images of a project
    Images {
        #[command(subcommand)]
        action: ImageAction,
    },
    /// Generate marketing content
    Generate {
        #[command(subcommand)]
        kind: GenerateKind,
        /// Save returned images into this directory
        #[arg(long, global = true)]
        download: Option<PathBuf>,
    },
    /// Browse past generations
    Generations {
        #[command(subcommand)]
        action: GenerationAction,
    },
    /// Administrative views (superusers)
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ProjectAction {
    List {
        #[arg(long, default_value_t = 0)]
        skip: u32,
        #[arg(long, default_value_t = 50)]
        limit: u32,
    },
    Show { id: i64 },
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        audience: Option<String>,
    },
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        audience: Option<String>,
    },
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum ImageAction {
    List { project_id: i64 },
    Upload {
        project_id: i64,
        files: Vec<PathBuf>,
        /// Mark the first uploaded file as the primary image
        #[arg(long)]
        primary: bool,
    },
    Delete { project_id: i64, image_id: i64 },
    /// Make an image the project's primary image
    Primary { project_id: i64, image_id: i64 },
}

#[derive(Subcommand)]
enum GenerateKind {
    TextToImage {
        prompt: String,
        #[arg(long, default_value = "Realistic")]
        style: String,
        #[arg(long, default_value = "Square (1:1)")]
        aspect_ratio: String,
        #[arg(long)]
        project: Option<i64>,
    },
    ProductRender {
        image: PathBuf,
        #[arg(long, value_enum, default_value_t = RenderArg::Render3d)]
        render_type: RenderArg,
        #[arg(long, default_value = "")]
        instructions: String,
        #[arg(long)]
        project: Option<i64>,
    },
    Seo {
        description: String,
        #[arg(long = "keyword")]
        keywords: Vec<String>,
        #[arg(long, default_value = "general")]
        platform: String,
        #[arg(long)]
        project: Option<i64>,
    },
    ContentPlan {
        product_info: String,
        #[arg(long)]
        audience: String,
        #[arg(long = "goal", required = true)]
        goals: Vec<String>,
        #[arg(long, default_value = "monthly")]
        timeframe: String,
        #[arg(long)]
        project: Option<i64>,
    },
    MarketingPlan {
        product_info: String,
        #[arg(long)]
        audience: String,
        #[arg(long, value_enum)]
        goal: GoalArg,
        #[arg(long)]
        budget: String,
        #[arg(long)]
        timeline: String,
        #[arg(long)]
        project: Option<i64>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RenderArg {
    #[value(name = "3d")]
    Render3d,
    Professional,
}

#[derive(Clone, Copy, ValueEnum)]
enum GoalArg {
    Outreach,
    Sales,
    Branding,
}

#[derive(Subcommand)]
enum GenerationAction {
    List {
        #[arg(long, default_value_t = 0)]
        skip: u32,
        #[arg(long, default_value_t = 50)]
        limit: u32,
    },
    Show {
        id: i64,
        #[arg(long)]
        download: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    Stats,
    /// Upstream API key status
    Keys,
    /// Rotate to the next upstream API key
    Rotate,
    /// Reset an upstream API key (1-based index)
    ResetKey { index: u32 },
    Users {
        #[arg(long, default_value_t = 0)]
        skip: u32,
        #[arg(long, default_value_t = 100)]
        limit: u32,
    },
    /// Activate or deactivate a user
    ToggleUser { id: i64 },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Set a configuration value
    Set {
        /// Configuration key (server, timeout)
        key: String,
        /// Configuration value
        value: String,
    },
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },
    /// Show all configuration
    Show,
    /// Get the config file path
    Path,
}

/// A failure that has already been shown to the user
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct Reported(String);

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "adforge=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(Cli::parse()).await {
        Err(e) if e.is::<Reported>() => {
            tracing::debug!("Command failed: {}", e);
            std::process::exit(1);
        }
        other => other,
    }
}

async fn run(cli: Cli) -> Result<()> {
    let command = cli.command.unwrap_or(Commands::Dashboard);

    let config = Config::load().unwrap_or_default();
    let client_config = config.client_config(cli.server, cli.timeout);
    tracing::debug!("Using API at {}", client_config.base_url);

    let storage = Arc::new(FileStore::open(Config::session_path()?)?);
    let api = ApiClient::new(client_config, storage, Arc::new(ConsoleNotifier))?;
    let session = SessionStore::new(api);

    match command {
        Commands::Login {
            username,
            password,
            return_to,
        } => {
            let username = match username {
                Some(u) => u,
                None => inquire::Text::new("Username or email:").prompt()?,
            };
            let password = match password {
                Some(p) => p,
                None => inquire::Password::new("Password:")
                    .without_confirmation()
                    .prompt()?,
            };
            // The session store has already shown the failure
            session
                .login(&username, &password)
                .await
                .map_err(|e| Reported(e.to_string()))?;
            println!("Continue at {}", landing_route(return_to.as_deref()));
        }
        Commands::Register {
            email,
            username,
            full_name,
            password,
        } => {
            let account = NewAccount {
                email: prompt_if_missing(email, "Email:")?,
                username: prompt_if_missing(username, "Username:")?,
                full_name,
                password: match password {
                    Some(p) => p,
                    None => inquire::Password::new("Password:").prompt()?,
                },
            };
            session
                .register(&account)
                .await
                .map_err(|e| Reported(e.to_string()))?;
            println!("Continue at {}", landing_route(None));
        }
        Commands::Logout => {
            session.logout()?;
        }
        Commands::Whoami => {
            session.initialize().await?;
            match session.user() {
                Some(user) => {
                    println!("\x1b[32m✓ Logged in\x1b[0m");
                    println!("User: {} <{}>", user.display_name(), user.email);
                    println!("Server: {}", session.api().base_url());
                    if user.is_superuser {
                        println!("Role: admin");
                    }
                }
                None => {
                    println!("\x1b[33m✗ Not logged in\x1b[0m");
                    println!("Run '\x1b[1madforge login\x1b[0m' to authenticate");
                }
            }
        }
        Commands::Dashboard => {
            if require(&session, "/dashboard").await? {
                show_dashboard(&session).await?;
            }
        }
        Commands::Projects { action } => {
            if require(&session, "/projects").await? {
                handle_project_command(&session, action).await?;
            }
        }
        Commands::Images { action } => {
            if require(&session, "/projects").await? {
                handle_image_command(&session, action).await?;
            }
        }
        Commands::Generate { kind, download } => {
            if require(&session, "/generate").await? {
                handle_generate_command(&session, kind, download).await?;
            }
        }
        Commands::Generations { action } => {
            if require(&session, "/analytics").await? {
                handle_generation_command(&session, action).await?;
            }
        }
        Commands::Admin { action } => {
            if require(&session, "/settings").await? {
                handle_admin_command(&session, action).await?;
            }
        }
        Commands::Config { action } => {
            handle_config_command(action)?;
        }
    }

    Ok(())
}

fn prompt_if_missing(value: Option<String>, label: &str) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None => Ok(inquire::Text::new(label).prompt()?),
    }
}

/// Validate the stored session and check access to `route`
async fn require(session: &SessionStore, route: &str) -> Result<bool> {
    session.initialize().await?;
    match session.guard(route) {
        Access::Allowed => Ok(true),
        Access::Loading => {
            eprintln!("Session is still loading, try again.");
            Ok(false)
        }
        Access::Challenge { from } => {
            eprintln!("\x1b[33m🔐 Not logged in.\x1b[0m");
            eprintln!(
                "   Run '\x1b[1madforge login --return-to {}\x1b[0m' to authenticate.",
                from
            );
            Ok(false)
        }
    }
}

/// Show a call-site failure and turn it into the command's error.
/// Cross-cutting failures were already shown by the client's notifier.
fn report(err: ApiError, what: &str) -> anyhow::Error {
    tracing::debug!("{} failed: {:?}", what, err);
    let message = err.user_message(&format!("Failed to {}", what));
    if let ApiError::Status { .. } | ApiError::Decode(_) | ApiError::Io(_) = err {
        eprintln!("\x1b[31m✗ {}\x1b[0m", message);
    }
    Reported(message).into()
}

async fn show_dashboard(session: &SessionStore) -> Result<()> {
    let api = session.api();
    if let Some(user) = session.user() {
        println!("\x1b[1mWelcome back, {}!\x1b[0m", user.display_name());
    }

    let projects = api
        .projects()
        .list(Page::first(50))
        .await
        .map_err(|e| report(e, "load projects"))?;
    println!("Projects: {}", projects.len());

    let generations = api
        .content()
        .generations(Page::first(5))
        .await
        .map_err(|e| report(e, "load generations"))?;
    if generations.is_empty() {
        println!("No generations yet. Try '\x1b[1madforge generate text-to-image\x1b[0m'.");
    } else {
        println!();
        println!("Recent generations:");
        for generation in &generations {
            print_generation_row(generation);
        }
    }
    Ok(())
}

async fn handle_project_command(session: &SessionStore, action: ProjectAction) -> Result<()> {
    let projects = session.api().projects();
    match action {
        ProjectAction::List { skip, limit } => {
            let list = projects
                .list(Page { skip, limit })
                .await
                .map_err(|e| report(e, "load projects"))?;
            if list.is_empty() {
                println!("No projects yet.");
            }
            for project in &list {
                println!(
                    "{:>5}  {:<30}  {:<16}  {}",
                    project.id,
                    project.name,
                    project.product_category.as_deref().unwrap_or("-"),
                    format_optional_date(project.created_at.as_deref())
                );
            }
        }
        ProjectAction::Show { id } => {
            let project = projects.get(id).await.map_err(|e| report(e, "load project"))?;
            print_project(&project);
        }
        ProjectAction::Create {
            name,
            description,
            category,
            audience,
        } => {
            let new = NewProject {
                name,
                description,
                product_category: category,
                target_audience: audience,
                brand_guidelines: None,
            };
            let project = projects
                .create(&new)
                .await
                .map_err(|e| report(e, "create project"))?;
            println!("\x1b[32m✅ Created project {} ({})\x1b[0m", project.name, project.id);
        }
        ProjectAction::Update {
            id,
            name,
            description,
            category,
            audience,
        } => {
            let update = ProjectUpdate {
                name,
                description,
                product_category: category,
                target_audience: audience,
                brand_guidelines: None,
            };
            if update.is_empty() {
                anyhow::bail!("Nothing to update. Pass at least one of --name, --description, --category, --audience");
            }
            let project = projects
                .update(id, &update)
                .await
                .map_err(|e| report(e, "update project"))?;
            println!("\x1b[32m✅ Updated project {}\x1b[0m", project.name);
        }
        ProjectAction::Delete { id } => {
            let msg = projects.delete(id).await.map_err(|e| report(e, "delete project"))?;
            println!("\x1b[32m✅ {}\x1b[0m", msg.message);
        }
    }
    Ok(())
}

async fn handle_image_command(session: &SessionStore, action: ImageAction) -> Result<()> {
    let projects = session.api().projects();
    match action {
        ImageAction::List { project_id } => {
            let images = projects
                .images(project_id)
                .await
                .map_err(|e| report(e, "load images"))?;
            print_images(&images);
        }
        ImageAction::Upload {
            project_id,
            files,
            primary,
        } => {
            let mut failed = 0;
            for (index, path) in files.into_iter().enumerate() {
                let upload = ImageUpload {
                    path,
                    is_primary: primary && index == 0,
                };
                match projects.upload_image(project_id, &upload).await {
                    Ok(image) => println!(
                        "\x1b[32m✅ Uploaded {} ({})\x1b[0m",
                        image.original_filename,
                        format_file_size(image.file_size.unwrap_or(0))
                    ),
                    Err(e) => {
                        report(e, &format!("upload {}", upload.path.display()));
                        failed += 1;
                    }
                }
            }
            if failed > 0 {
                return Err(Reported(format!("{} upload(s) failed", failed)).into());
            }
        }
        ImageAction::Delete { project_id, image_id } => {
            let msg = projects
                .delete_image(project_id, image_id)
                .await
                .map_err(|e| report(e, "delete image"))?;
            println!("\x1b[32m✅ {}\x1b[0m", msg.message);
        }
        ImageAction::Primary { project_id, image_id } => {
            let mut images = projects
                .images(project_id)
                .await
                .map_err(|e| report(e, "load images"))?;
            projects
                .set_primary_image(project_id, image_id)
                .await
                .map_err(|e| report(e, "update primary image"))?;
            match apply_primary(&mut images, project_id, image_id) {
                Ok(()) => {
                    println!("\x1b[32m✅ Primary image updated!\x1b[0m");
                    print_images(&images);
                }
                Err(stale) => eprintln!("\x1b[33m{}\x1b[0m", stale),
            }
        }
    }
    Ok(())
}

/// Mirror an accepted primary change onto the list fetched before it
fn apply_primary(images: &mut [ProductImage], project_id: i64, image_id: i64) -> Result<(), String> {
    if shared::mark_primary(images, image_id) {
        Ok(())
    } else {
        Err(format!(
            "Image {} was set as primary, but the image list is stale. Run 'adforge images list {}' to refresh.",
            image_id, project_id
        ))
    }
}

async fn handle_generate_command(
    session: &SessionStore,
    kind: GenerateKind,
    download: Option<PathBuf>,
) -> Result<()> {
    let content = session.api().content();
    eprintln!("\x1b[90mGenerating... this can take a minute\x1b[0m");

    let result = match kind {
        GenerateKind::TextToImage {
            prompt,
            style,
            aspect_ratio,
            project,
        } => {
            let request = TextToImageRequest {
                prompt,
                style,
                aspect_ratio,
                project_id: project,
            };
            content.text_to_image(&request).await
        }
        GenerateKind::ProductRender {
            image,
            render_type,
            instructions,
            project,
        } => {
            let request = ProductRenderRequest {
                render_type: match render_type {
                    RenderArg::Render3d => RenderType::Render3d,
                    RenderArg::Professional => RenderType::ProfessionalProduct,
                },
                instructions,
                project_id: project,
            };
            content.product_render(&request, &image).await
        }
        GenerateKind::Seo {
            description,
            keywords,
            platform,
            project,
        } => {
            let request = SeoContentRequest {
                product_description: description,
                target_keywords: keywords,
                platform,
                project_id: project,
            };
            content.seo_content(&request).await
        }
        GenerateKind::ContentPlan {
            product_info,
            audience,
            goals,
            timeframe,
            project,
        } => {
            let request = ContentPlanRequest {
                product_info,
                target_audience: audience,
                goals,
                timeframe,
                project_id: project,
            };
            content.content_plan(&request).await
        }
        GenerateKind::MarketingPlan {
            product_info,
            audience,
            goal,
            budget,
            timeline,
            project,
        } => {
            let request = MarketingPlanRequest {
                product_info,
                target_audience: audience,
                goal: match goal {
                    GoalArg::Outreach => MarketingGoal::Outreach,
                    GoalArg::Sales => MarketingGoal::Sales,
                    GoalArg::Branding => MarketingGoal::Branding,
                },
                budget_range: budget,
                timeline,
                project_id: project,
            };
            content.marketing_plan(&request).await
        }
    };

    let generation = result.map_err(|e| report(e, "generate content"))?;
    show_generation(session, &generation, download.as_deref()).await
}

async fn handle_generation_command(session: &SessionStore, action: GenerationAction) -> Result<()> {
    let content = session.api().content();
    match action {
        GenerationAction::List { skip, limit } => {
            let list = content
                .generations(Page { skip, limit })
                .await
                .map_err(|e| report(e, "load generations"))?;
            if list.is_empty() {
                println!("No generations yet.");
            }
            list.iter().for_each(print_generation_row);
            Ok(())
        }
        GenerationAction::Show { id, download } => {
            let generation = content
                .generation(id)
                .await
                .map_err(|e| report(e, "load generation"))?;
            show_generation(session, &generation, download.as_deref()).await
        }
    }
}

async fn show_generation(
    session: &SessionStore,
    generation: &Generation,
    download: Option<&std::path::Path>,
) -> Result<()> {
    print_generation(generation);
    if generation.status == GenerationStatus::Failed {
        return Err(Reported(generation.error().unwrap_or("Generation failed").to_string()).into());
    }
    match download {
        Some(dir) => save_images(session, generation, dir).await,
        None => Ok(()),
    }
}

async fn handle_admin_command(session: &SessionStore, action: AdminAction) -> Result<()> {
    let admin = session.api().admin();
    match action {
        AdminAction::Stats => {
            let stats = admin.stats().await.map_err(|e| report(e, "load stats"))?;
            println!("Users:       {} ({} active)", stats.total_users, stats.active_users);
            println!("Projects:    {}", stats.total_projects);
            println!("Generations: {}", stats.total_generations);
            let keys = &stats.api_key_status;
            println!(
                "API keys:    {} total, {} active, {} rate limited, {} erroring",
                keys.total_keys, keys.active_keys, keys.rate_limited_keys, keys.error_keys
            );
        }
        AdminAction::Keys => {
            let status = admin
                .api_key_status()
                .await
                .map_err(|e| report(e, "load API key status"))?;
            for (index, key) in status.keys.iter().enumerate() {
                println!("{:>3}  {}", index + 1, key);
            }
            println!("{} of {} keys active", status.active_keys, status.total_keys);
        }
        AdminAction::Rotate => {
            let rotation = admin
                .rotate_api_key()
                .await
                .map_err(|e| report(e, "rotate API key"))?;
            println!(
                "\x1b[32m✅ {}\x1b[0m (...{} -> ...{})",
                rotation.message,
                rotation.previous_key.as_deref().unwrap_or("?"),
                rotation.current_key.as_deref().unwrap_or("?")
            );
        }
        AdminAction::ResetKey { index } => {
            let msg = admin
                .reset_api_key(index)
                .await
                .map_err(|e| report(e, "reset API key"))?;
            println!("\x1b[32m✅ {}\x1b[0m", msg.message);
        }
        AdminAction::Users { skip, limit } => {
            let users = admin
                .users(Page { skip, limit })
                .await
                .map_err(|e| report(e, "load users"))?;
            for user in &users {
                println!(
                    "{:>5}  {:<20}  {:<30}  {}{}",
                    user.id,
                    user.username,
                    user.email,
                    if user.is_active { "active" } else { "inactive" },
                    if user.is_superuser { ", admin" } else { "" }
                );
            }
        }
        AdminAction::ToggleUser { id } => {
            let msg = admin
                .toggle_user_active(id)
                .await
                .map_err(|e| report(e, "update user"))?;
            println!("\x1b[32m✅ {}\x1b[0m", msg.message);
        }
    }
    Ok(())
}

async fn save_images(session: &SessionStore, generation: &Generation, dir: &std::path::Path) -> Result<()> {
    let images = generation.images();
    if images.is_empty() {
        eprintln!("No images to download.");
        return Ok(());
    }

    let mut failed = 0;
    for (index, image) in images.iter().enumerate() {
        let ext = adforge::api::image_extension(image);
        let dest = dir.join(format!("generation-{}-{}.{}", generation.id, index + 1, ext));
        match session.api().content().download(image, &dest).await {
            Ok(size) => println!(
                "\x1b[32m✅ Image downloaded to {} ({})\x1b[0m",
                dest.display(),
                format_file_size(size)
            ),
            Err(e) => {
                eprintln!("\x1b[31m✗ Failed to download image: {}\x1b[0m", e);
                failed += 1;
            }
        }
    }
    if failed > 0 {
        return Err(Reported(format!("{} download(s) failed", failed)).into());
    }
    Ok(())
}

fn print_project(project: &Project) {
    println!("\x1b[1m{}\x1b[0m (#{})", project.name, project.id);
    if let Some(description) = &project.description {
        println!("{}", description);
    }
    println!("Category: {}", project.product_category.as_deref().unwrap_or("-"));
    println!("Audience: {}", project.target_audience.as_deref().unwrap_or("-"));
    if let Some(guidelines) = &project.brand_guidelines {
        println!("Brand:    {}", guidelines);
    }
    println!("Created:  {}", format_optional_date(project.created_at.as_deref()));
    if !project.product_images.is_empty() {
        println!();
        print_images(&project.product_images);
    }
}

fn print_images(images: &[ProductImage]) {
    if images.is_empty() {
        println!("No images.");
        return;
    }
    for image in images {
        let dims = match (image.width, image.height) {
            (Some(w), Some(h)) => format!("{}x{}", w, h),
            _ => "-".to_string(),
        };
        println!(
            "{} {:>5}  {:<32}  {:>10}  {}",
            if image.is_primary { "★" } else { " " },
            image.id,
            image.original_filename,
            format_file_size(image.file_size.unwrap_or(0)),
            dims
        );
    }
}

fn print_generation_row(generation: &Generation) {
    println!(
        "{:>5}  {:<26}  {:<10}  {}",
        generation.id,
        generation.content_type.label(),
        format!("{:?}", generation.status).to_lowercase(),
        format_optional_date(generation.created_at.as_deref())
    );
}

fn print_generation(generation: &Generation) {
    println!(
        "\x1b[1m{}\x1b[0m #{} ({})",
        generation.content_type.label(),
        generation.id,
        format!("{:?}", generation.status).to_lowercase()
    );
    if generation.status == GenerationStatus::Failed {
        eprintln!(
            "\x1b[31m✗ {}\x1b[0m",
            generation.error().unwrap_or("Generation failed")
        );
        return;
    }
    if let Some(model) = &generation.model_used {
        let secs = generation.processing_time.unwrap_or(0);
        println!("\x1b[90m{} · {}s\x1b[0m", model, secs);
    }
    if let Some(text) = &generation.generated_content {
        println!();
        println!("{}", text);
    }
    let images = generation.images();
    if !images.is_empty() {
        println!();
        println!(
            "Successfully generated {} image{}!",
            images.len(),
            if images.len() > 1 { "s" } else { "" }
        );
    }
}

fn handle_config_command(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Set { key, value } => {
            let mut config = Config::load().unwrap_or_default();
            match key.as_str() {
                "server" => config.remote.server = Some(value),
                "timeout" => config.remote.timeout_secs = Some(value.parse()?),
                _ => anyhow::bail!("Unknown config key: {}. Valid keys: server, timeout", key),
            }
            config.save()?;
            println!("Configuration saved");
        }
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = match key.as_str() {
                "server" => config.remote.server.unwrap_or_default(),
                "timeout" => config
                    .remote
                    .timeout_secs
                    .map(|t| t.to_string())
                    .unwrap_or_default(),
                _ => anyhow::bail!("Unknown config key: {}", key),
            };
            println!("{}", value);
        }
        ConfigAction::Show => {
            let config = Config::load()?;
            let resolved = config.client_config(None, None);
            println!("server: {}", resolved.base_url);
            println!("timeout: {}s", resolved.timeout.as_secs());
            println!("session: {}", Config::session_path()?.display());
        }
        ConfigAction::Path => {
            let path = Config::config_path()?;
            println!("{}", path.display());
        }
    }
    Ok(())
}
