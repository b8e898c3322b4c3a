use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use crate::fixtures_fetch;
use crate::fpl_fetch;
use crate::state::{Delta, ProviderCommand};

/// Runs blocking fetches off the UI thread. Each command produces exactly
/// one terminal delta (loaded or failed); there is no cancellation, so a
/// result arriving after the user moved on is applied and simply not
/// visible.
pub fn spawn_provider(tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    thread::spawn(move || {
        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                ProviderCommand::FetchFixtures => {
                    let _ = tx.send(Delta::Log(
                        "[INFO] Fetching matchweek fixtures and standings".to_string(),
                    ));
                    match fixtures_fetch::fetch_matchweek_bundle() {
                        Ok(bundle) => {
                            let _ = tx.send(Delta::FixturesLoaded {
                                matchweek: bundle.matchweek,
                                fixtures: bundle.fixtures,
                                table: bundle.table,
                            });
                        }
                        Err(err) => {
                            // Full chain to the console; one flat message to the UI.
                            let _ = tx.send(Delta::Log(format!(
                                "[WARN] Fixtures fetch failed: {err:#}"
                            )));
                            let _ = tx.send(Delta::FixturesFailed(err.to_string()));
                        }
                    }
                }
                ProviderCommand::FetchFplData => {
                    let _ = tx.send(Delta::Log("[INFO] Fetching FPL bulk data".to_string()));
                    match fpl_fetch::fetch_fpl_bundle() {
                        Ok(bundle) => {
                            let _ = tx.send(Delta::FplLoaded {
                                players: bundle.players,
                                teams: bundle.teams,
                            });
                        }
                        Err(err) => {
                            let _ = tx
                                .send(Delta::Log(format!("[WARN] FPL fetch failed: {err:#}")));
                            let _ = tx.send(Delta::FplFailed(err.to_string()));
                        }
                    }
                }
            }
        }
    });
}
