use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use snippetvault::app::AppContext;
use snippetvault::domain::{AvatarUpload, RegisterForm, Snippet, SnippetDraft, SnippetQuery, TagSet};
use snippetvault::http::{Navigator, LOGIN_PATH};
use snippetvault::observability::init_tracing;
use snippetvault::storage::{Preferences, ThemeMode};
use snippetvault::{initialize, Config};

#[derive(Parser, Debug)]
#[command(name = "snippetvault", version, about = "Store, tag, search and share code snippets")]
struct Cli {
    /// Config file (defaults to snippetvault.toml in the data directory)
    #[arg(long, global = true, env = "SNIPPETVAULT_CONFIG")]
    config: Option<PathBuf>,

    /// API root, e.g. http://localhost:8000/api/v1
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account and sign in
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        full_name: String,
        #[arg(long, env = "SNIPPETVAULT_PASSWORD", hide_env_values = true)]
        password: String,
        /// Avatar image file
        #[arg(long)]
        avatar: Option<PathBuf>,
    },
    /// Sign in with username or email
    Login {
        identifier: String,
        #[arg(long, env = "SNIPPETVAULT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out and forget the local session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List your snippets
    List(ListArgs),
    /// Show one snippet
    Show {
        id: String,
        /// Read from the public listing instead of your own snippets
        #[arg(long)]
        public: bool,
    },
    /// Create a snippet
    Create(DraftArgs),
    /// Edit a snippet; omitted fields keep their current value
    Edit {
        id: String,
        #[command(flatten)]
        draft: EditArgs,
    },
    /// Delete a snippet
    Delete { id: String },
    /// Toggle favorite on a snippet
    Favorite { id: String },
    /// List favorite snippets
    Favorites {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// List your tags
    Tags {
        /// Include usage counts
        #[arg(long)]
        stats: bool,
    },
    /// Browse public snippets
    Public(ListArgs),
    /// Copy a public snippet into your collection
    Fork { id: String },
    /// Dashboard statistics
    Stats,
    /// Profile management
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Recent searches
    #[command(subcommand)]
    History(HistoryCommand),
    /// Theme preferences
    Theme {
        /// light, dark or auto
        mode: Option<ThemeMode>,
        /// Flip between light and dark
        #[arg(long, conflicts_with = "mode")]
        toggle: bool,
        #[arg(long)]
        accent: Option<String>,
    },
}

#[derive(Args, Debug)]
struct ListArgs {
    #[arg(long, default_value_t = 1)]
    page: u32,
    #[arg(long)]
    limit: Option<u32>,
    #[arg(long)]
    search: Option<String>,
    /// Filter by tag (repeatable)
    #[arg(long = "tag")]
    tags: Vec<String>,
    #[arg(long)]
    language: Option<String>,
    /// Created on or after, YYYY-MM-DD
    #[arg(long)]
    from: Option<NaiveDate>,
    /// Created on or before, YYYY-MM-DD
    #[arg(long)]
    to: Option<NaiveDate>,
}

#[derive(Args, Debug)]
struct DraftArgs {
    #[arg(long)]
    title: String,
    /// Read code from this file ("-" for stdin)
    #[arg(long, conflicts_with = "code")]
    file: Option<PathBuf>,
    #[arg(long)]
    code: Option<String>,
    #[arg(long, default_value = "javascript")]
    language: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long = "tag")]
    tags: Vec<String>,
    #[arg(long)]
    public: bool,
}

#[derive(Args, Debug)]
struct EditArgs {
    #[arg(long)]
    title: Option<String>,
    #[arg(long, conflicts_with = "code")]
    file: Option<PathBuf>,
    #[arg(long)]
    code: Option<String>,
    #[arg(long)]
    language: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// Replace all tags (repeatable)
    #[arg(long = "tag")]
    tags: Option<Vec<String>>,
    #[arg(long)]
    public: Option<bool>,
}

#[derive(Subcommand, Debug)]
enum ProfileCommand {
    /// Show the server's copy of your profile
    Show,
    /// Update display name and/or email
    Update {
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Change password
    Password {
        #[arg(long)]
        old: String,
        #[arg(long)]
        new: String,
        #[arg(long)]
        confirm: String,
    },
    /// Replace avatar image
    Avatar { path: PathBuf },
}

#[derive(Subcommand, Debug)]
enum HistoryCommand {
    /// Show recent searches, newest first
    List,
    /// Suggest recent searches matching the input
    Suggest { input: String },
    /// Forget all recent searches
    Clear,
}

/// Stands in for the view router: a redirect to login becomes a hint.
#[derive(Debug, Default)]
struct CliNavigator;

impl Navigator for CliNavigator {
    fn current_path(&self) -> String {
        "/".to_string()
    }

    fn navigate_to(&self, path: &str) {
        if path == LOGIN_PATH {
            eprintln!("Session expired. Run `snippetvault login` to sign in again.");
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.trim_end_matches('/').to_string();
    }
    init_tracing(&config);

    let ctx = initialize(&config, Arc::new(CliNavigator)).context("opening local storage")?;
    run(&ctx, &cli).await
}

async fn run(ctx: &AppContext, cli: &Cli) -> Result<()> {
    match &cli.command {
        Command::Register {
            username,
            email,
            full_name,
            password,
            avatar,
        } => {
            let avatar = avatar.as_deref().map(read_avatar).transpose()?;
            ctx.session
                .register(RegisterForm {
                    username: username.clone(),
                    email: email.clone(),
                    full_name: full_name.clone(),
                    password: password.clone(),
                    avatar,
                })
                .await;
            print_session(ctx, cli.json)
        }
        Command::Login { identifier, password } => {
            ctx.session.login(identifier, password).await;
            print_session(ctx, cli.json)
        }
        Command::Logout => {
            ctx.session.logout().await;
            println!("Signed out.");
            Ok(())
        }
        Command::Whoami => match ctx.session.snapshot().user {
            Some(user) => emit(cli.json, &user, || {
                format!("{} <{}> ({})", user.username, user.email, user.full_name)
            }),
            None if ctx.session.snapshot().is_verified => {
                println!("Signed in (profile not cached).");
                Ok(())
            }
            None => bail!("Not signed in."),
        },
        Command::List(args) => {
            let query = args.to_query(false);
            record_search(ctx, &query.search);
            ctx.snippets.get_snippets(&query).await;
            print_list(ctx, cli.json)
        }
        Command::Show { id, public } => {
            let snippet = if *public {
                ctx.snippets.get_public_snippet_by_id(id).await?
            } else {
                ctx.snippets
                    .get_snippet_by_id(id)
                    .await
                    .ok_or_else(|| store_error(ctx))?
            };
            emit(cli.json, &snippet, || render_snippet(&snippet))
        }
        Command::Create(args) => {
            let draft = args.to_draft()?;
            let snippet = ctx
                .snippets
                .create_snippet(&draft)
                .await
                .ok_or_else(|| store_error(ctx))?;
            emit(cli.json, &snippet, || format!("Created {}", snippet.id))
        }
        Command::Edit { id, draft } => {
            let current = ctx
                .snippets
                .get_snippet_by_id(id)
                .await
                .ok_or_else(|| store_error(ctx))?;
            let draft = draft.apply(SnippetDraft::from(&current))?;
            let snippet = ctx
                .snippets
                .update_snippet(id, &draft)
                .await
                .ok_or_else(|| store_error(ctx))?;
            emit(cli.json, &snippet, || format!("Updated {}", snippet.id))
        }
        Command::Delete { id } => {
            if !ctx.snippets.delete_snippet(id).await {
                return Err(store_error(ctx));
            }
            println!("Deleted {id}");
            Ok(())
        }
        Command::Favorite { id } => {
            let status = ctx
                .snippets
                .toggle_favorite(id)
                .await
                .ok_or_else(|| store_error(ctx))?;
            let verb = if status.is_favorited { "Favorited" } else { "Unfavorited" };
            println!("{verb} {id} ({} total)", status.favorite_count);
            Ok(())
        }
        Command::Favorites { page, limit } => {
            ctx.snippets.get_favorite_snippets(*page, *limit).await;
            print_list(ctx, cli.json)
        }
        Command::Tags { stats } => {
            if *stats {
                let stats = ctx.snippets.get_tag_stats().await;
                emit(cli.json, &stats, || {
                    stats
                        .iter()
                        .map(|s| format!("{:>5}  {}", s.count, s.tag))
                        .collect::<Vec<_>>()
                        .join("\n")
                })
            } else {
                let tags = ctx.snippets.get_all_tags().await;
                emit(cli.json, &tags, || tags.join("\n"))
            }
        }
        Command::Public(args) => {
            let query = args.to_query(true);
            record_search(ctx, &query.search);
            let page = ctx.snippets.get_public_snippets(&query).await?;
            emit(cli.json, &page.snippets, || render_rows(&page.snippets))
        }
        Command::Fork { id } => {
            let fork = ctx.snippets.fork_public_snippet(id).await?;
            emit(cli.json, &fork, || {
                format!("Forked into {}. Edit with `snippetvault edit {}`.", fork.id, fork.id)
            })
        }
        Command::Stats => {
            let stats = ctx.snippets.get_snippet_stats().await?;
            emit(cli.json, &stats, || {
                let mut out = format!(
                    "Snippets: {}\nStorage:  {} chars",
                    stats.total_snippets, stats.storage_usage.total
                );
                for lang in &stats.most_used_languages {
                    out.push_str(&format!("\n  {:<12} {}", lang.language, lang.count));
                }
                out
            })
        }
        Command::Profile(command) => run_profile(ctx, command, cli.json).await,
        Command::History(command) => run_history(ctx, command),
        Command::Theme {
            mode,
            toggle,
            accent,
        } => {
            let mut prefs = ctx.preferences();
            if let Some(mode) = mode {
                prefs.mode = *mode;
            }
            if *toggle {
                prefs.mode = prefs.mode.toggle();
            }
            if let Some(accent) = accent {
                prefs.accent = accent.clone();
            }
            if mode.is_some() || *toggle || accent.is_some() {
                prefs.save(ctx.storage.as_ref())?;
            }
            print_theme(&prefs);
            Ok(())
        }
    }
}

async fn run_profile(ctx: &AppContext, command: &ProfileCommand, json: bool) -> Result<()> {
    let user = match command {
        ProfileCommand::Show => ctx.profile.get_profile().await?,
        ProfileCommand::Update { full_name, email } => {
            ctx.profile
                .update_profile(full_name.as_deref(), email.as_deref())
                .await?
        }
        ProfileCommand::Password { old, new, confirm } => {
            ctx.profile.update_password(old, new, confirm).await?;
            println!("Password updated.");
            return Ok(());
        }
        ProfileCommand::Avatar { path } => ctx.profile.update_avatar(&read_avatar(path)?).await?,
    };
    emit(json, &user, || {
        format!(
            "{} <{}>\n{}\navatar: {}",
            user.username,
            user.email,
            user.full_name,
            user.avatar_url.as_deref().unwrap_or("-")
        )
    })
}

fn run_history(ctx: &AppContext, command: &HistoryCommand) -> Result<()> {
    let mut history = ctx.search_history();
    match command {
        HistoryCommand::List => history.terms().iter().for_each(|t| println!("{t}")),
        HistoryCommand::Suggest { input } => {
            history.suggest(input).iter().for_each(|t| println!("{t}"));
        }
        HistoryCommand::Clear => {
            history.clear()?;
            println!("Search history cleared.");
        }
    }
    Ok(())
}

impl ListArgs {
    fn to_query(&self, public: bool) -> SnippetQuery {
        let base = if public {
            SnippetQuery::public()
        } else {
            SnippetQuery::default()
        };
        SnippetQuery {
            page: self.page.max(1),
            limit: self.limit.unwrap_or(base.limit),
            search: self.search.clone().unwrap_or_default(),
            tags: self.tags.clone(),
            language: self.language.clone().unwrap_or_default(),
            from: self.from,
            to: self.to,
        }
    }
}

impl DraftArgs {
    fn to_draft(&self) -> Result<SnippetDraft> {
        let code = match (&self.file, &self.code) {
            (Some(path), _) => read_code(path)?,
            (None, Some(code)) => code.clone(),
            (None, None) => bail!("Provide --code or --file"),
        };
        Ok(SnippetDraft {
            title: self.title.clone(),
            code,
            code_language: self.language.clone(),
            description: self.description.clone(),
            tags: TagSet::try_from_raw(&self.tags)?,
            is_public: self.public,
        })
    }
}

impl EditArgs {
    fn apply(&self, mut draft: SnippetDraft) -> Result<SnippetDraft> {
        if let Some(title) = &self.title {
            draft.title.clone_from(title);
        }
        if let Some(path) = &self.file {
            draft.code = read_code(path)?;
        } else if let Some(code) = &self.code {
            draft.code.clone_from(code);
        }
        if let Some(language) = &self.language {
            draft.code_language.clone_from(language);
        }
        if let Some(description) = &self.description {
            draft.description.clone_from(description);
        }
        if let Some(tags) = &self.tags {
            draft.tags = TagSet::try_from_raw(tags)?;
        }
        if let Some(public) = self.public {
            draft.is_public = public;
        }
        Ok(draft)
    }
}

fn read_code(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        return std::io::read_to_string(std::io::stdin()).context("reading code from stdin");
    }
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn read_avatar(path: &Path) -> Result<AvatarUpload> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow!("{} is not a file", path.display()))?;
    Ok(AvatarUpload::new(file_name, bytes))
}

fn record_search(ctx: &AppContext, term: &str) {
    if term.trim().is_empty() {
        return;
    }
    if let Err(e) = ctx.search_history().record(term) {
        tracing::warn!(error = %e, "failed to record search");
    }
}

fn store_error(ctx: &AppContext) -> anyhow::Error {
    let message = ctx
        .snippets
        .snapshot()
        .error
        .unwrap_or_else(|| "Request failed".to_string());
    anyhow!(message)
}

fn emit<T: Serialize + ?Sized>(json: bool, value: &T, text: impl FnOnce() -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text());
    }
    Ok(())
}

fn print_session(ctx: &AppContext, json: bool) -> Result<()> {
    let state = ctx.session.snapshot();
    if let Some(message) = state.error {
        bail!(message);
    }
    match state.user {
        Some(user) => emit(json, &user, || format!("Signed in as {}", user.username)),
        None => bail!("Not signed in."),
    }
}

fn print_list(ctx: &AppContext, json: bool) -> Result<()> {
    let state = ctx.snippets.snapshot();
    if let Some(message) = state.error {
        bail!(message);
    }
    emit(json, &state.snippets, || {
        let p = state.pagination;
        format!(
            "{}\npage {}/{} ({} total)",
            render_rows(&state.snippets),
            p.page,
            p.total_pages,
            p.total
        )
    })
}

fn render_rows(snippets: &[Snippet]) -> String {
    if snippets.is_empty() {
        return "No snippets.".to_string();
    }
    snippets
        .iter()
        .map(|s| {
            let star = if s.is_favorited { "*" } else { " " };
            format!(
                "{star} {:<24} {:<32} {:<12} {}",
                s.id,
                s.title,
                s.code_language,
                s.tags.join(",")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_snippet(snippet: &Snippet) -> String {
    let mut out = format!("{}  [{}]\n", snippet.title, snippet.code_language);
    if !snippet.tags.is_empty() {
        out.push_str(&format!("tags: {}\n", snippet.tags.join(", ")));
    }
    if !snippet.description.is_empty() {
        out.push_str(&format!("{}\n", snippet.description));
    }
    out.push('\n');
    out.push_str(&snippet.code);
    out
}

fn print_theme(prefs: &Preferences) {
    println!("mode: {}\naccent: {}", prefs.mode, prefs.accent);
}
