mod fields;
mod launch;
mod output;
mod theme;

use anyhow::{Context, Result, bail};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use fields::{DirectFields, FieldArgs, ForwardFields, JumpFields};
use output::Columns;
use stassh::config::{AppConfig, load_config};
use stassh::{Profile, Store};
use std::io;
use std::path::PathBuf;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("GIT_COMMIT_HASH"),
    ", tag ",
    env!("GIT_TAG"),
    ")"
);

#[derive(Parser)]
#[command(
    name = "stassh",
    version,
    long_version = LONG_VERSION,
    about = "Manage SSH connection profiles"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Directory holding the profile files.
    #[arg(long, global = true, env = "STASSH_DATA_DIR")]
    data_dir: Option<PathBuf>,
    #[arg(long, global = true, env = "STASSH_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Direct connections (`ssh user@host`).
    #[command(subcommand)]
    Direct(ProfileCommand<DirectFields>),
    /// Local port forwards (`ssh -N -L`).
    #[command(subcommand)]
    Forward(ProfileCommand<ForwardFields>),
    /// Connections through a jump host (`ssh -J`).
    #[command(subcommand)]
    Jump(ProfileCommand<JumpFields>),
    Completions(CompletionsArgs),
}

#[derive(Subcommand)]
enum ProfileCommand<F: FieldArgs> {
    List(ListArgs),
    Add(F),
    Update(EditArgs<F>),
    Remove(IndexArgs),
    /// Copy a profile, apply any given fields and add it.
    Duplicate(EditArgs<F>),
    Move(MoveArgs),
    /// Print the ssh command line.
    Show(ShowArgs),
    Connect(ConnectArgs),
}

#[derive(Args)]
struct ListArgs {
    #[arg(long)]
    filter: Option<String>,
}

#[derive(Args)]
struct IndexArgs {
    #[arg(long)]
    index: usize,
}

#[derive(Args)]
struct EditArgs<F: FieldArgs> {
    #[arg(long)]
    index: usize,
    #[command(flatten)]
    fields: F,
}

#[derive(Args)]
struct MoveArgs {
    #[arg(long)]
    from: usize,
    #[arg(long)]
    to: usize,
}

#[derive(Args)]
struct ShowArgs {
    #[arg(long)]
    index: usize,
    /// Quote every token for a POSIX shell.
    #[arg(long)]
    quoted: bool,
}

#[derive(Args)]
struct ConnectArgs {
    #[arg(long)]
    index: usize,
    /// Terminal emulator command line to run ssh in, e.g. "xterm -e".
    #[arg(long)]
    terminal: Option<String>,
    /// Print what would be executed instead of running it.
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args)]
struct CompletionsArgs {
    #[arg(value_enum)]
    shell: Shell,
}

struct AppContext {
    config: AppConfig,
    data_dir: PathBuf,
}

impl AppContext {
    fn open<P: Profile>(&self) -> Result<Store<P>> {
        let backend = self.config.backend(P::KIND, &self.data_dir);
        let path = backend.path().to_path_buf();
        Store::open(backend).with_context(|| format!("unable to load {}", path.display()))
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Completions(args) = &cli.command {
        generate_completions(args.shell);
        return Ok(());
    }

    let config = load_config(cli.config)?;
    let data_dir = config.data_dir(cli.data_dir)?;
    let context = AppContext { config, data_dir };

    match cli.command {
        Commands::Direct(command) => run_profile_command(&context, command),
        Commands::Forward(command) => run_profile_command(&context, command),
        Commands::Jump(command) => run_profile_command(&context, command),
        Commands::Completions(_) => unreachable!(),
    }
}

fn run_profile_command<F>(context: &AppContext, command: ProfileCommand<F>) -> Result<()>
where
    F: FieldArgs,
    F::Profile: Columns,
{
    let mut store = context.open::<F::Profile>()?;
    let label = <F::Profile as Profile>::KIND.label();

    match command {
        ProfileCommand::List(args) => {
            let indices = store.filter(args.filter.as_deref().unwrap_or_default());
            let theme = theme::CliTheme::from_config(&context.config.theme);
            output::print_profiles(&store, &indices, &theme);
        }
        ProfileCommand::Add(fields) => {
            if fields.name().is_none_or(|name| name.trim().is_empty()) {
                bail!("--name is required to add a {label}");
            }
            let profile = fields.build();
            let name = profile.name().to_string();
            store.add(profile)?;
            println!("Added {label} '{}' at index {}", name, store.len() - 1);
        }
        ProfileCommand::Update(args) => {
            if args.fields.is_empty() {
                bail!("nothing to update; pass at least one field");
            }
            let mut profile = store.get(args.index)?.clone();
            args.fields.apply(&mut profile);
            let name = profile.name().to_string();
            store.update(args.index, profile)?;
            println!("Updated {label} '{}'", name);
        }
        ProfileCommand::Remove(args) => {
            let removed = store.delete(args.index)?;
            println!("Removed {label} '{}'", removed.name());
        }
        ProfileCommand::Duplicate(args) => {
            let mut copy = store.duplicate(args.index)?;
            args.fields.apply(&mut copy);
            let name = copy.name().to_string();
            store.add(copy)?;
            println!("Added {label} '{}' at index {}", name, store.len() - 1);
        }
        ProfileCommand::Move(args) => {
            store.move_entry(args.from, args.to)?;
            println!("Moved {label} from index {} to {}", args.from, args.to);
        }
        ProfileCommand::Show(args) => {
            let command = store.get(args.index)?.command();
            if args.quoted {
                println!("{}", command.shell_line());
            } else {
                println!("{command}");
            }
        }
        ProfileCommand::Connect(args) => {
            let command = store.get(args.index)?.command();
            let terminal = args
                .terminal
                .as_deref()
                .or(context.config.terminal.as_deref());
            if args.dry_run {
                let argv = launch::launch_argv(&command, terminal)?;
                println!("{}", shell_words::join(argv));
            } else {
                launch::launch(&command, terminal)?;
            }
        }
    }
    Ok(())
}

fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "stassh", &mut io::stdout());
}
