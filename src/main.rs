use anyhow::Context;
use ghnotify::console::{ConsoleJsonPreview, ConsoleTextPreview};
use ghnotify::discord::DiscordWebhook;
use ghnotify::notify::{self, Dispatcher, Outcome};
use ghnotify::{config::Config, github::GithubContext};

use std::{env, io, path::PathBuf, process};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
enum Format {
    Text,
    Json {
        #[structopt(short, long, help = "do not pretty print json")]
        compact: bool,
    },
}

#[derive(Debug, StructOpt)]
enum Cmd {
    ///Posts the notification to the webhook (the default)
    Send,
    ///Composes the notification and prints it instead of posting it
    Preview {
        #[structopt(subcommand)]
        format: Format,
    },
}

#[derive(Debug, StructOpt)]
#[structopt(
    name = "ghnotify",
    about = "Posts GitHub workflow events to a Discord webhook"
)]
struct Opt {
    /// TOML file with default inputs, INPUT_* variables take precedence
    #[structopt(short, long, parse(from_os_str))]
    config_path: Option<PathBuf>,
    /// Defaults to $GITHUB_EVENT_NAME
    #[structopt(long)]
    event_name: Option<String>,
    /// Defaults to $GITHUB_EVENT_PATH
    #[structopt(short, long, parse(from_os_str))]
    event_file: Option<PathBuf>,
    #[structopt(subcommand)]
    cmd: Option<Cmd>,
}

fn env_var(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn run(opt: Opt) -> anyhow::Result<()> {
    let file_config = match &opt.config_path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("cannot load {}", path.display()))?,
        None => Config::default(),
    };
    let config = file_config.merge(Config::from_env(env_var)?);
    config.webhook_url()?;

    let github_ctx = GithubContext::resolve(env_var, opt.event_name, opt.event_file)?;
    let ctx = github_ctx.event_context()?;

    let mut dispatcher: Box<dyn Dispatcher> = match opt.cmd.unwrap_or(Cmd::Send) {
        Cmd::Send => Box::new(DiscordWebhook::new(config.timeout())?),
        Cmd::Preview {
            format: Format::Text,
        } => Box::new(ConsoleTextPreview::stdout()),
        Cmd::Preview {
            format: Format::Json { compact },
        } => Box::new(ConsoleJsonPreview::stdout(compact)),
    };

    notify::notify(&config, &ctx, dispatcher.as_mut())?;
    Ok(())
}

fn main() {
    env_logger::init();
    let opt = Opt::from_args();
    let outcome = Outcome::from(run(opt));
    process::exit(outcome.report(&mut io::stdout()));
}
