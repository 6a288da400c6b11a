use std::process::ExitCode;

use clap::Parser;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;
use vend_eng::config::Args;
use vend_eng::csv::{ResponseWriter, read_commands, read_inventory};
use vend_eng::{Machine, MachineHandle};

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse().unwrap()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut machine = Machine::new(args.machine_config()?);
    machine.provision_bank(args.initial_coins)?;

    for result in read_inventory(&args.inventory)? {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                warn!("{e}");
                continue;
            }
        };
        if let Err(e) = machine.provision_slot(row.slot, row.item, row.stock) {
            warn!(slot = row.slot, "{e}");
        }
    }

    let (handle, task) = MachineHandle::spawn(machine);
    let mut writer = ResponseWriter::stdout();

    for result in read_commands(&args.commands)? {
        match result {
            Ok(request) => {
                let response = handle.call(request.clone()).await?;
                writer.write(&request, &response)?;
            }
            Err(e) => {
                warn!("{e}");
            }
        }
    }

    drop(handle);
    task.await?;
    writer.finish()?;

    Ok(())
}
