use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use crate::logo;
use crate::persist;
use crate::state::{Delta, WorkerCommand};

/// Background thread for file IO. Runs until the command sender is dropped.
pub fn spawn_worker(tx: Sender<Delta>, cmd_rx: Receiver<WorkerCommand>) -> JoinHandle<()> {
    thread::spawn(move || {
        for cmd in cmd_rx {
            let delta = handle_command(cmd);
            if tx.send(delta).is_err() {
                break;
            }
        }
        debug!("worker stopped");
    })
}

pub fn handle_command(cmd: WorkerCommand) -> Delta {
    match cmd {
        WorkerCommand::LoadLogo { generation, path } => {
            let result = logo::read_logo_data_url(&path).map_err(|err| {
                warn!(generation, error = %err, "logo load failed");
                format!("{err:#}")
            });
            Delta::LogoLoaded { generation, result }
        }
        WorkerCommand::SaveSnapshot {
            path,
            revision,
            snapshot,
        } => match persist::save_snapshot(&path, &snapshot) {
            Ok(()) => Delta::SnapshotSaved { revision },
            Err(err) => {
                warn!(revision, error = %err, "snapshot save failed");
                Delta::SnapshotFailed {
                    revision,
                    error: format!("{err:#}"),
                }
            }
        },
    }
}
