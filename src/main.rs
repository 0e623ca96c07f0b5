mod cli;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("STASSH_LOG", "warn")).init();
    cli::run()
}
