mod cmd;
mod util;

use argp::FromArgs;
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

#[derive(FromArgs, PartialEq, Eq, Debug)]
/// Generate Open Graph preview images for blog posts.
struct TopLevel {
    #[argp(subcommand)]
    command: SubCommand,
}

#[derive(FromArgs, PartialEq, Eq, Debug)]
#[argp(subcommand)]
enum SubCommand {
    Build(cmd::build::Args),
    Paths(cmd::paths::Args),
}

#[tokio::main]
async fn main() {
    let env_filter = EnvFilter::builder()
        // Default to info level
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::fmt().with_env_filter(env_filter).with_writer(std::io::stderr).init();

    let args: TopLevel = argp::parse_args_or_exit(argp::DEFAULT);
    let result = match args.command {
        SubCommand::Build(args) => cmd::build::run(args).await,
        SubCommand::Paths(args) => cmd::paths::run(args),
    };
    if let Err(e) = result {
        tracing::error!("{e:?}");
        std::process::exit(1);
    }
}
