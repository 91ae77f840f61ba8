use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use time::OffsetDateTime;

use ecomission::badges;
use ecomission::config::ConfigError;
use ecomission::date::format_relative_date_now;
use ecomission::forms::mission::MAX_IMAGES;
use ecomission::forms::{CarbonCalculatorForm, MissionForm, ProfileForm, ValidationErrors};
use ecomission::geocode::{GeocodeError, KakaoGeocoder};
use ecomission::missions::{parse_history_id, unique_tags};
use ecomission::redirect::{self, GateDecision};
use ecomission::submit::{MissionSubmitter, SubmitError};
use ecomission::tours::{self, CarbonRating, RouteFilter};
use ecomission::types::Gender;
use ecomission::upload::{AbortController, AbortSignal, BatchReport, ImageSlots, UploadFile, until_aborted, upload_batch};
use ecomission::{ApiClient, ApiError, ClientConfig, FileTokenStore, SessionContext};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Submit(#[from] SubmitError),
    #[error(transparent)]
    Geocode(#[from] GeocodeError),
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("not logged in; run `ecomission login` first")]
    NotLoggedIn,
    #[error("invalid history id: {0}")]
    InvalidHistoryId(String),
    #[error("no eco route with id {0}")]
    UnknownRoute(String),
    #[error("invalid gender `{0}` (expected male or female)")]
    InvalidGender(String),
    #[error("failed to read {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("{failed} of {total} uploads did not complete")]
    IncompleteUpload { failed: usize, total: usize },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("interrupted")]
    Interrupted,
}

#[derive(Parser, Debug)]
#[command(name = "ecomission", about = "Eco-tourism missions client")]
struct Cli {
    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login(LoginCommand),
    Logout,
    /// Load and print the current session.
    Whoami,
    Profile(ProfileArgs),
    Missions(MissionsCommand),
    /// Community feed of completed missions.
    Feed,
    History {
        history_id: String,
    },
    /// Toggle the like on a feed entry.
    Like {
        history_id: String,
    },
    Badges,
    /// Upload images and print their public URLs.
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    Routes(RoutesCommand),
    /// Validate a carbon calculator form read from a JSON file.
    Carbon {
        #[arg(long, conflicts_with = "file")]
        new: bool,
        file: Option<PathBuf>,
    },
    /// Evaluate the login gate and redirect helpers for a path.
    Gate {
        path: String,
        #[arg(long)]
        query: Option<String>,
        #[arg(long)]
        token_cookie: Option<String>,
    },
}

#[derive(Args, Debug)]
struct LoginCommand {
    /// Where to land after login; only same-site paths are honored.
    #[arg(long)]
    redirect_url: Option<String>,

    #[command(subcommand)]
    command: LoginSubcommand,
}

#[derive(Subcommand, Debug)]
enum LoginSubcommand {
    Demo {
        #[arg(long, env = "ECOMISSION_DEMO_EMAIL")]
        email: String,
        #[arg(long, env = "ECOMISSION_DEMO_PASSWORD")]
        password: String,
    },
    /// Exchange an OAuth authorization code.
    KakaoCode {
        code: String,
        #[arg(long)]
        redirect_uri: Option<String>,
    },
    /// Log in with a provider access token.
    KakaoToken { access_token: String },
}

#[derive(Args, Debug)]
struct ProfileArgs {
    #[arg(long, default_value = "")]
    nickname: String,
    #[arg(long, default_value = "")]
    birth_year: String,
    #[arg(long, value_parser = parse_gender)]
    gender: Option<Gender>,
    #[arg(long, default_value = "")]
    address: String,
    /// New profile image; uploaded before saving.
    #[arg(long, conflicts_with = "remove_image")]
    image: Option<PathBuf>,
    #[arg(long)]
    remove_image: bool,
}

#[derive(Args, Debug)]
struct MissionsCommand {
    #[command(subcommand)]
    command: MissionsSubcommand,
}

#[derive(Subcommand, Debug)]
enum MissionsSubcommand {
    List {
        #[arg(long)]
        tag: Option<String>,
    },
    Tags,
    /// My completed missions.
    Mine,
    Submit(SubmitArgs),
}

#[derive(Args, Debug)]
struct SubmitArgs {
    mission_id: i64,
    #[arg(long)]
    content: String,
    #[arg(long, allow_negative_numbers = true)]
    latitude: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    longitude: Option<f64>,
    #[arg(long)]
    sigungu_id: Option<String>,
    /// Already uploaded image URL; repeatable.
    #[arg(long = "image-url")]
    image_urls: Vec<String>,
    /// Local image to upload first; repeatable.
    #[arg(long = "image")]
    images: Vec<PathBuf>,
}

#[derive(Args, Debug)]
struct RoutesCommand {
    #[command(subcommand)]
    command: RoutesSubcommand,
}

#[derive(Subcommand, Debug)]
enum RoutesSubcommand {
    List {
        #[arg(long)]
        region: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long, value_enum)]
        max_carbon: Option<CarbonRating>,
        #[arg(long)]
        season: Option<String>,
    },
    Show {
        id: String,
    },
}

struct CliContext {
    config: ClientConfig,
    session: SessionContext,
    client: ApiClient,
    /// Fires on Ctrl-C for the lifetime of the command.
    interrupt: AbortSignal,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };
    tracing_subscriber::fmt().with_writer(std::io::stderr).with_max_level(level).init();

    match cli.command {
        Command::Routes(routes) => run_routes(routes),
        Command::Carbon { new, file } => run_carbon(new, file.as_deref()).await,
        Command::Gate { path, query, token_cookie } => {
            run_gate(&path, query.as_deref(), token_cookie.as_deref());
            Ok(())
        }
        command => {
            let controller = AbortController::new();
            let ctx = connect(controller.signal())?;
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("interrupt received; cancelling");
                    controller.abort();
                }
            });
            until_aborted(&ctx.interrupt, run_backend(&ctx, command))
                .await
                .unwrap_or(Err(CliError::Interrupted))
        }
    }
}

fn connect(interrupt: AbortSignal) -> Result<CliContext, CliError> {
    let config = ClientConfig::from_env()?;
    let store = Arc::new(FileTokenStore::new(config.token_path.clone()));
    let session = SessionContext::new(store);
    let client = ApiClient::new(&config, session.clone())?;
    tracing::debug!(api = %config.api_base_url, token_path = %config.token_path.display(), "client configured");
    Ok(CliContext { config, session, client, interrupt })
}

async fn run_backend(ctx: &CliContext, command: Command) -> Result<(), CliError> {
    match command {
        Command::Login(login) => run_login(ctx, login).await,
        Command::Logout => {
            if let Err(e) = ctx.client.logout().await {
                tracing::warn!(error = %e, "backend logout failed");
            }
            println!("logged out");
            Ok(())
        }
        Command::Whoami => {
            let state = ctx.session.hydrate(&ctx.client).await;
            match (state.user, state.last_error) {
                (Some(user), _) => print_json(&user),
                (None, Some(error)) => {
                    eprintln!("profile unavailable: {error}");
                    Ok(())
                }
                (None, None) => Err(CliError::NotLoggedIn),
            }
        }
        Command::Profile(args) => run_profile(ctx, args).await,
        Command::Missions(missions) => run_missions(ctx, missions).await,
        Command::Feed => {
            for item in ctx.client.mission_feed().await? {
                let liked = if item.is_liked { "♥" } else { "♡" };
                println!(
                    "#{:<6} {:<12} {:<20} {liked} {:<4} {}",
                    item.id,
                    item.user.nickname,
                    item.mission.name,
                    item.like_count,
                    format_relative_date_now(&item.created_at),
                );
            }
            Ok(())
        }
        Command::History { history_id } => {
            let id = history_id_arg(&history_id)?;
            print_json(&ctx.client.mission_history(id).await?)
        }
        Command::Like { history_id } => {
            let id = history_id_arg(&history_id)?;
            require_login(ctx)?;
            print_json(&ctx.client.toggle_like(id).await?)
        }
        Command::Badges => run_badges(ctx).await,
        Command::Upload { files } => {
            require_login(ctx)?;
            let mut slots = ImageSlots::new(files.len());
            let report = upload_files(ctx, &mut slots, &files).await?;
            print_report(&report);
            ensure_complete(&report, files.len())
        }
        Command::Routes(_) | Command::Carbon { .. } | Command::Gate { .. } => Ok(()),
    }
}

fn require_login(ctx: &CliContext) -> Result<(), CliError> {
    if ctx.session.has_token() { Ok(()) } else { Err(CliError::NotLoggedIn) }
}

fn history_id_arg(raw: &str) -> Result<i64, CliError> {
    parse_history_id(raw).ok_or_else(|| CliError::InvalidHistoryId(raw.to_owned()))
}

fn parse_gender(raw: &str) -> Result<Gender, CliError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "male" => Ok(Gender::Male),
        "female" => Ok(Gender::Female),
        _ => Err(CliError::InvalidGender(raw.to_owned())),
    }
}

// =============================================================================
// AUTH
// =============================================================================

async fn run_login(ctx: &CliContext, login: LoginCommand) -> Result<(), CliError> {
    let response = match login.command {
        LoginSubcommand::Demo { email, password } => ctx.client.demo_login(&email, &password).await?,
        LoginSubcommand::KakaoCode { code, redirect_uri } => {
            ctx.client.kakao_login(&code, redirect_uri.as_deref()).await?
        }
        LoginSubcommand::KakaoToken { access_token } => ctx.client.kakao_login_with_token(&access_token).await?,
    };
    let destination = redirect::resolve_post_login_destination(&response.user, login.redirect_url.as_deref());
    println!("logged in as {} (#{})", response.user.nickname, response.user.id);
    println!("next: {destination}");
    Ok(())
}

async fn run_profile(ctx: &CliContext, args: ProfileArgs) -> Result<(), CliError> {
    let state = ctx.session.hydrate(&ctx.client).await;
    let current = state.user.ok_or(CliError::NotLoggedIn)?;

    let uploaded_image_url = match &args.image {
        Some(path) => {
            let mut slots = ImageSlots::new(1);
            let report = upload_files(ctx, &mut slots, std::slice::from_ref(path)).await?;
            ensure_complete(&report, 1)?;
            slots.into_urls().into_iter().next()
        }
        None => None,
    };

    let form = ProfileForm {
        nickname: args.nickname,
        birth_year: args.birth_year,
        gender: args.gender,
        address: args.address,
        uploaded_image_url,
        remove_image: args.remove_image,
    };
    let update = form.merge(Some(&current), OffsetDateTime::now_utc().year());
    print_json(&ctx.client.update_profile(&update).await?)
}

// =============================================================================
// MISSIONS
// =============================================================================

async fn run_missions(ctx: &CliContext, missions: MissionsCommand) -> Result<(), CliError> {
    match missions.command {
        MissionsSubcommand::List { tag } => {
            for mission in ctx.client.missions(tag.as_deref()).await? {
                println!(
                    "{:<4} [{}] {} (-{:.1} kg CO2e)",
                    mission.id, mission.tag, mission.name, mission.reward_carbon_emission
                );
            }
            Ok(())
        }
        MissionsSubcommand::Tags => {
            let missions = ctx.client.missions(None).await?;
            for tag in unique_tags(&missions) {
                println!("{tag}");
            }
            Ok(())
        }
        MissionsSubcommand::Mine => {
            require_login(ctx)?;
            print_json(&ctx.client.my_mission_histories().await?)
        }
        MissionsSubcommand::Submit(args) => run_submit(ctx, args).await,
    }
}

async fn run_submit(ctx: &CliContext, args: SubmitArgs) -> Result<(), CliError> {
    require_login(ctx)?;

    let mut form = MissionForm {
        mission_id: args.mission_id,
        content: args.content,
        latitude: args.latitude,
        longitude: args.longitude,
        sigungu_id: args.sigungu_id,
        image_urls: args.image_urls,
    };
    // Fail on form errors before spending uploads on a rejected proof.
    let mut precheck = form.clone();
    precheck.image_urls.clear();
    precheck.validate()?;

    if !args.images.is_empty() {
        let mut slots = ImageSlots::with_urls(MAX_IMAGES, std::mem::take(&mut form.image_urls));
        let report = upload_files(ctx, &mut slots, &args.images).await?;
        print_report(&report);
        ensure_complete(&report, args.images.len())?;
        form.image_urls = slots.into_urls();
    }

    let geocoder = Arc::new(KakaoGeocoder::new(&ctx.config)?);
    let submitter = MissionSubmitter::new(ctx.session.clone(), geocoder, Arc::new(ctx.client.clone()));
    let completion = submitter.submit(&form).await?;
    println!("mission recorded as history #{}", completion.history_id);
    if let Some(badge) = completion.reward_badge {
        println!("badge unlocked: {}", badge.name);
    }
    Ok(())
}

// =============================================================================
// UPLOADS
// =============================================================================

async fn upload_files(ctx: &CliContext, slots: &mut ImageSlots, paths: &[PathBuf]) -> Result<BatchReport, CliError> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let file = UploadFile::from_path(path)
            .await
            .map_err(|source| CliError::Io { path: path.clone(), source })?;
        files.push(file);
    }

    let report = upload_batch(&ctx.client, ctx.client.http(), slots, files, Some(&ctx.interrupt)).await;
    Ok(report)
}

fn print_report(report: &BatchReport) {
    for url in &report.uploaded {
        println!("uploaded {url}");
    }
    for failure in &report.failed {
        eprintln!("failed {}: {}", failure.file_name, failure.error);
    }
    for name in &report.rejected {
        eprintln!("skipped {name}: image limit reached");
    }
    for name in &report.cancelled {
        eprintln!("cancelled {name}");
    }
}

fn ensure_complete(report: &BatchReport, total: usize) -> Result<(), CliError> {
    if report.is_complete() {
        return Ok(());
    }
    let failed = report.failed.len() + report.rejected.len() + report.cancelled.len();
    Err(CliError::IncompleteUpload { failed, total })
}

// =============================================================================
// BADGES
// =============================================================================

async fn run_badges(ctx: &CliContext) -> Result<(), CliError> {
    let state = ctx.session.hydrate(&ctx.client).await;
    let user = state.user.ok_or(CliError::NotLoggedIn)?;

    let all = ctx.client.all_badges().await?;
    let owned = ctx.client.user_badges(user.id).await?;
    let collection = badges::collection(&all, &owned);
    let progress = badges::progress(&collection);

    println!("{}/{} badges ({}%)", progress.unlocked, progress.total, progress.percent);
    for badge in &collection {
        let marker = match (badge.is_primary, badge.unlocked) {
            (true, _) => "★",
            (false, true) => "●",
            (false, false) => "○",
        };
        println!("{marker} {:<20} {}", badge.badge.name, badge.unlocked_label());
    }
    Ok(())
}

// =============================================================================
// OFFLINE COMMANDS
// =============================================================================

fn run_routes(routes: RoutesCommand) -> Result<(), CliError> {
    let catalog = tours::catalog()?;
    match routes.command {
        RoutesSubcommand::List { region, category, max_carbon, season } => {
            let filter = RouteFilter { region, category, max_carbon, season };
            for route in tours::search(&catalog, &filter) {
                println!(
                    "{:<3} {:<16} {:<12} {:?} {:>7} views  {}",
                    route.id, route.name, route.location, route.carbon_rating, route.view_count, route.season
                );
            }
            Ok(())
        }
        RoutesSubcommand::Show { id } => {
            let route = tours::find(&catalog, &id).ok_or_else(|| CliError::UnknownRoute(id.clone()))?;
            print_json(route)
        }
    }
}

async fn run_carbon(new: bool, file: Option<&Path>) -> Result<(), CliError> {
    let form = match file {
        Some(path) if !new => {
            let raw = tokio::fs::read_to_string(path)
                .await
                .map_err(|source| CliError::Io { path: path.to_path_buf(), source })?;
            serde_json::from_str::<CarbonCalculatorForm>(&raw)?
        }
        _ => {
            return print_json(&CarbonCalculatorForm::new_session());
        }
    };

    match form.validate() {
        Ok(calculation) => {
            println!("session   {}", calculation.session_id);
            println!("personnel {}", calculation.personnel);
            println!("legs      {}", calculation.routes.len());
            println!("nights    {}", calculation.total_nights());
            Ok(())
        }
        Err(errors) => {
            for (field, messages) in errors.iter() {
                eprintln!("{field}: {}", messages.join(", "));
            }
            Err(errors.into())
        }
    }
}

fn run_gate(path: &str, query: Option<&str>, token_cookie: Option<&str>) {
    match redirect::login_gate(path, token_cookie) {
        GateDecision::Continue => println!("continue"),
        GateDecision::Redirect(to) => println!("redirect {to}"),
    }
    println!("login url: {}", redirect::login_url_for(Some(path), query));
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
