use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use indicatif::ProgressBar;
use miette::{IntoDiagnostic, Result};
use tracing_subscriber::EnvFilter;

use ugs_core::{BadgeParams, BadgeResult, OutputFormat, UgsConfig, CONFIG_PATH_ENV};
use ugs_notify::auth::{resolve_secret, CredentialStore, EnvCredentials};
use ugs_notify::endpoint::{EndpointConfig, EndpointOverrides};
use ugs_notify::log::{BuildLog, ConsoleLog};
use ugs_notify::proxy::{build_proxy, ProxyCredentials};
use ugs_notify::transport::HttpTransport;
use ugs_notify::{BadgeNotifier, PostBadge};

#[derive(Parser)]
#[command(
    name = "ugs-badge",
    version,
    about = "Post build badges to an Unreal Game Sync metadata server",
    long_about = "Post build badges to an Unreal Game Sync metadata server.\n\n\
                   Run once per build outcome from your CI pipeline. Server defaults\n\
                   live in .ugs-badge.toml; everything else comes from the command line.\n\n\
                   Examples:\n  \
                     ugs-badge post --project //UE5/Main/Game --changelist 1234 \\\n    \
                       --result success --name Editor --url $BUILD_URL\n  \
                     ugs-badge init        Create a .ugs-badge.toml config file\n  \
                     ugs-badge doctor      Check your setup"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: .ugs-badge.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        long_help = "Output format for command results.\n\n\
                       Formats:\n  \
                         text  Human-readable summary (default)\n  \
                         json  Machine-readable JSON with camelCase keys"
    )]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    verbose: bool,

    /// When to use colors
    #[arg(long, global = true, default_value = "auto")]
    color: ColorChoice,
}

#[derive(Subcommand)]
enum Command {
    /// Post a build badge for a changelist
    #[command(long_about = "Post a build badge for a changelist.\n\n\
        Sends one POST to {api-url}/api/build. A rejected or failed post is\n\
        reported but does not fail the command unless --fail-on-error is given.\n\n\
        Examples:\n  ugs-badge post --project //UE5/Main/Game --changelist 1234 --result starting --name Editor --url https://ci/job/1\n  ugs-badge post ... --result failure --fail-on-error")]
    Post {
        /// UGS project path (e.g. //UE5/Main/Samples/Game)
        #[arg(long)]
        project: Option<String>,

        /// Changelist the badge belongs to
        #[arg(long, value_parser = clap::value_parser!(u32).range(..=i64::from(i32::MAX)))]
        changelist: u32,

        /// Build outcome: starting, failure, warning, success or skipped
        #[arg(long)]
        result: Option<BadgeResult>,

        /// Badge name shown in UGS
        #[arg(long)]
        name: Option<String>,

        /// Link opened when the badge is clicked
        #[arg(long)]
        url: Option<String>,

        /// Metadata server base URL (overrides the config file)
        #[arg(long)]
        api_url: Option<String>,

        /// Credential id for Basic authentication (overrides the config file)
        #[arg(
            long,
            long_help = "Credential id for Basic authentication.\n\n\
                The secret is read from UGS_CREDENTIAL_<ID> or the [credentials]\n\
                table of .ugs-badge.toml. Overrides [server].credential_id."
        )]
        credential_id: Option<String>,

        /// Exit with an error if the server rejects the badge or cannot be reached
        #[arg(long)]
        fail_on_error: bool,
    },
    /// Create a default .ugs-badge.toml configuration file
    #[command(long_about = "Create a default .ugs-badge.toml configuration file.\n\n\
        Generates a commented-out template with all available options.\n\
        Fails if .ugs-badge.toml already exists.")]
    Init,
    /// Check your ugs-badge setup
    #[command(long_about = "Check your ugs-badge setup.\n\n\
        Runs diagnostics for the config file, server url, credential, and proxy\n\
        without contacting the server. Use --format json for machine-readable output.")]
    Doctor,
    /// Generate shell completion scripts
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Clone, PartialEq, Eq, ValueEnum)]
enum ColorChoice {
    /// Auto-detect based on terminal
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

fn print_welcome(use_color: bool) {
    let version = env!("CARGO_PKG_VERSION");

    if use_color {
        println!("\x1b[1mugs-badge\x1b[0m v{version} — build badges for Unreal Game Sync\n");

        println!("Quick start:");
        println!("  \x1b[36mugs-badge init\x1b[0m      Create a .ugs-badge.toml config file");
        println!("  \x1b[36mugs-badge doctor\x1b[0m    Check your setup\n");

        println!("All commands:");
        println!("  \x1b[32mpost\x1b[0m      Post a build badge for a changelist");
        println!("  \x1b[32minit\x1b[0m      Create default configuration");
        println!("  \x1b[32mdoctor\x1b[0m    Check your setup and environment\n");
    } else {
        println!("ugs-badge v{version} — build badges for Unreal Game Sync\n");

        println!("Quick start:");
        println!("  ugs-badge init      Create a .ugs-badge.toml config file");
        println!("  ugs-badge doctor    Check your setup\n");

        println!("All commands:");
        println!("  post      Post a build badge for a changelist");
        println!("  init      Create default configuration");
        println!("  doctor    Check your setup and environment\n");
    }

    println!("Run 'ugs-badge <command> --help' for details.");
}

/// Build log that prints above the spinner while a post is in flight.
struct SpinnerLog {
    bar: ProgressBar,
}

impl BuildLog for SpinnerLog {
    fn info(&self, line: &str) {
        self.bar.println(line);
    }

    fn error(&self, line: &str) {
        self.bar.println(format!("ERROR: {line}"));
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("ugs_badge=debug,ugs_notify=debug,ugs_core=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"))
    };
    // Ignore the error if a subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[derive(serde::Serialize)]
struct CheckResult {
    name: &'static str,
    status: &'static str,
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
}

impl CheckResult {
    fn pass(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            status: "pass",
            detail: detail.into(),
            hint: None,
        }
    }

    fn fail(name: &'static str, detail: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            name,
            status: "fail",
            detail: detail.into(),
            hint: Some(hint.into()),
        }
    }

    fn info(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            status: "info",
            detail: detail.into(),
            hint: None,
        }
    }

    fn symbol(&self) -> &'static str {
        match self.status {
            "pass" => "\u{2713}",
            "fail" => "\u{2717}",
            _ => "~",
        }
    }

    fn colored_symbol(&self) -> String {
        match self.status {
            "pass" => "\x1b[32m\u{2713}\x1b[0m".into(),
            "fail" => "\x1b[31m\u{2717}\x1b[0m".into(),
            _ => "\x1b[33m~\x1b[0m".into(),
        }
    }
}

fn run_doctor(
    config: &UgsConfig,
    config_path: Option<&Path>,
    credentials: &dyn CredentialStore,
    format: OutputFormat,
    use_color: bool,
) -> Result<bool> {
    let mut checks: Vec<CheckResult> = Vec::new();

    // 1. Config file
    match config_path {
        Some(path) => checks.push(CheckResult::pass(
            "config_file",
            format!("{} loaded", path.display()),
        )),
        None => checks.push(CheckResult::info(
            "config_file",
            "no .ugs-badge.toml (run 'ugs-badge init' to create one)",
        )),
    }

    // 2. Server url
    let endpoint = EndpointConfig::resolve(&EndpointOverrides::default(), &config.server)
        .and_then(|c| c.endpoint_url());
    match endpoint {
        Ok(url) => checks.push(CheckResult::pass("api_url", format!("posting to {url}"))),
        Err(e) => checks.push(CheckResult::fail(
            "api_url",
            e.to_string(),
            "set api_url under [server], export UGS_API_URL, or pass --api-url to post",
        )),
    }

    // 3. Credential
    match ugs_core::non_empty(&config.server.credential_id) {
        Some(id) => match resolve_secret(credentials, id) {
            Ok(_) => checks.push(CheckResult::pass(
                "credential",
                format!("{id} resolved"),
            )),
            Err(e) => checks.push(CheckResult::fail(
                "credential",
                e.to_string(),
                format!(
                    "export {}=user:password or add it under [credentials]",
                    ugs_notify::auth::env_var_name(id)
                ),
            )),
        },
        None => checks.push(CheckResult::info(
            "credential",
            "none configured (posts are anonymous)",
        )),
    }

    // 4. Proxy
    match &config.proxy {
        Some(proxy) => match build_proxy(proxy) {
            Ok(_) => {
                let auth = match ProxyCredentials::from_config(proxy) {
                    Some(ProxyCredentials::Basic { .. }) => "basic auth",
                    Some(ProxyCredentials::Domain { .. }) => "domain auth",
                    None => "no auth",
                };
                checks.push(CheckResult::pass(
                    "proxy",
                    format!("{}:{} ({auth})", proxy.host, proxy.port),
                ));
            }
            Err(e) => checks.push(CheckResult::fail(
                "proxy",
                e.to_string(),
                "fix the [proxy] table in .ugs-badge.toml",
            )),
        },
        None => {
            let env_proxy = ["HTTPS_PROXY", "https_proxy", "HTTP_PROXY", "http_proxy"]
                .iter()
                .find_map(|k| std::env::var(k).ok().filter(|v| !v.is_empty()));
            match env_proxy {
                Some(p) => checks.push(CheckResult::info("proxy", format!("from environment: {p}"))),
                None => checks.push(CheckResult::info("proxy", "direct connection")),
            }
        }
    }

    // Output
    match format {
        OutputFormat::Json => {
            let version = env!("CARGO_PKG_VERSION");
            let json = serde_json::json!({
                "version": version,
                "checks": checks,
            });
            println!("{}", serde_json::to_string_pretty(&json).into_diagnostic()?);
        }
        OutputFormat::Text => {
            let version = env!("CARGO_PKG_VERSION");
            println!("ugs-badge v{version} — Environment Check\n");

            for check in &checks {
                let sym = if use_color {
                    check.colored_symbol()
                } else {
                    check.symbol().to_string()
                };
                let label = check.name.replace('_', " ");
                println!("  {sym} {label:<12} {}", check.detail);
                if let Some(hint) = &check.hint {
                    println!("    hint: {hint}");
                }
            }

            let passed = checks.iter().filter(|c| c.status == "pass").count();
            let failed = checks.iter().filter(|c| c.status == "fail").count();
            let info = checks.iter().filter(|c| c.status == "info").count();
            println!("\n{passed} checks passed, {failed} failed, {info} info");
        }
    }

    Ok(checks.iter().all(|c| c.status != "fail"))
}

const DEFAULT_CONFIG: &str = r#"# ugs-badge configuration

[server]
# Base URL of the UGS metadata server; badges go to <api_url>/api/build
# api_url = "http://ugs.example.com/"
# Credential used for Basic authentication (see [credentials])
# credential_id = "ugs"

[credentials]
# id = "user:password" or an opaque token
# Prefer UGS_CREDENTIAL_<ID> environment variables in CI.
# ugs = "builder:secret"

# Outbound proxy. Without this table HTTP_PROXY / HTTPS_PROXY / NO_PROXY apply.
# [proxy]
# host = "proxy.example.com"
# port = 3128
# no_proxy = ["localhost", "*.internal.example.com"]
# username = 'CORP\builder'
# password = "secret"
"#;

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .expect("miette handler");
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let explicit_config = cli
        .config
        .clone()
        .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));
    let cwd = std::env::current_dir().into_diagnostic()?;
    let (config, config_path) = UgsConfig::discover(explicit_config.as_deref(), &cwd)?;
    let config = config.with_env_overrides(|key| std::env::var(key).ok());

    let use_color = match cli.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => std::io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    };

    if let Some(path) = &config_path {
        tracing::debug!(path = %path.display(), "loaded config");
    }

    match cli.command {
        None => {
            print_welcome(use_color);
        }
        Some(Command::Post {
            project,
            changelist,
            result,
            name,
            url,
            api_url,
            credential_id,
            fail_on_error,
        }) => {
            let step = PostBadge {
                badge: BadgeParams {
                    project,
                    changelist,
                    result,
                    name,
                    url,
                },
                endpoint: EndpointOverrides {
                    api_url,
                    credential_id,
                    fail_on_error,
                },
            };

            let spinner = if std::io::stderr().is_terminal() {
                let pb = ProgressBar::new_spinner();
                pb.set_style(
                    indicatif::ProgressStyle::with_template("{spinner:.cyan} {msg} ({elapsed})")
                        .into_diagnostic()?,
                );
                pb.set_message("Posting badge...");
                pb.enable_steady_tick(std::time::Duration::from_millis(120));
                Some(pb)
            } else {
                None
            };
            let log: Arc<dyn BuildLog> = match &spinner {
                Some(bar) => Arc::new(SpinnerLog { bar: bar.clone() }),
                None => Arc::new(ConsoleLog),
            };

            let transport = HttpTransport::new(config.proxy.as_ref())?;
            let notifier = BadgeNotifier::new(
                transport,
                config.server.clone(),
                Arc::new(EnvCredentials::new(config.credentials.clone())),
                log,
            );

            let outcome = notifier.post(&step).await.inspect_err(|_e| {
                if let Some(pb) = &spinner {
                    pb.finish_and_clear();
                }
            })?;

            if let Some(pb) = spinner {
                pb.finish_and_clear();
            }

            match cli.format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&outcome).into_diagnostic()?
                    );
                }
                OutputFormat::Text => println!("{outcome}"),
            }
        }
        Some(Command::Init) => {
            let path = Path::new(ugs_core::DEFAULT_CONFIG_FILE);
            if path.exists() {
                miette::bail!("{} already exists", ugs_core::DEFAULT_CONFIG_FILE);
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!(
                "Created {} with default configuration",
                ugs_core::DEFAULT_CONFIG_FILE
            );
        }
        Some(Command::Doctor) => {
            let credentials = EnvCredentials::new(config.credentials.clone());
            let healthy = run_doctor(
                &config,
                config_path.as_deref(),
                &credentials,
                cli.format,
                use_color,
            )?;
            if !healthy {
                std::process::exit(1);
            }
        }
        Some(Command::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "ugs-badge", &mut std::io::stdout());
        }
    }

    Ok(())
}
