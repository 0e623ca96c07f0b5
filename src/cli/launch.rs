use anyhow::{Context, Result, anyhow, bail};
use log::info;
use stassh::SshCommand;
use std::process::{Command, Stdio};

/// Full argument vector to execute: the `ssh` invocation, prefixed by the
/// terminal emulator command line when one is given.
pub fn launch_argv(command: &SshCommand, terminal: Option<&str>) -> Result<Vec<String>> {
    let mut argv = match terminal {
        Some(terminal) => shell_words::split(terminal)
            .with_context(|| format!("unable to parse terminal command {terminal:?}"))?,
        None => Vec::new(),
    };
    if terminal.is_some() && argv.is_empty() {
        bail!("terminal command is empty");
    }
    argv.extend(command.argv());
    Ok(argv)
}

/// Runs the command. Without a terminal `ssh` takes over this one and the
/// call returns when it exits; with a terminal the emulator is started
/// detached.
pub fn launch(command: &SshCommand, terminal: Option<&str>) -> Result<()> {
    let argv = launch_argv(command, terminal)?;
    info!("Running: {}", shell_words::join(&argv));

    let (program, args) = argv
        .split_first()
        .ok_or_else(|| anyhow!("nothing to run"))?;
    let mut process = Command::new(program);
    process.args(args);

    if terminal.is_some() {
        process
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("failed to start terminal {program}"))?;
        return Ok(());
    }

    let status = process
        .status()
        .with_context(|| format!("failed to execute {program}"))?;
    if !status.success() {
        return Err(anyhow!("{} exited with status {}", program, status));
    }
    Ok(())
}
