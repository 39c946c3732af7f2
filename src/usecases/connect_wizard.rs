//! Interactive wizard that links the WhatsApp account: QR scan or pairing
//! code, then polling until the backend reports the device as connected.
//!
//! The backend confirms pairing on its own schedule; the wizard never declares
//! success from the login call itself, only from a polled status report.

use std::{io, thread, time::Duration};

use crate::{
    domain::wizard::ConnectWizard,
    infra::secrets::redact_text,
    sync::{GowaBackend, SyncHub},
};

/// How long the pairing-code path waits for a status confirmation before
/// falling back to the menu. The code itself does not expire client-side.
const PAIR_WAIT_SECS: u64 = 120;

pub trait WizardTerminal {
    fn print_line(&mut self, line: &str) -> io::Result<()>;
    fn prompt_line(&mut self, prompt: &str) -> io::Result<Option<String>>;
}

pub struct StdTerminal;

impl WizardTerminal for StdTerminal {
    fn print_line(&mut self, line: &str) -> io::Result<()> {
        println!("{line}");
        Ok(())
    }

    fn prompt_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        use std::io::Write;

        print!("{prompt}");
        io::stdout().flush()?;

        let mut line = String::new();
        let bytes = io::stdin().read_line(&mut line)?;
        if bytes == 0 {
            return Ok(None);
        }

        Ok(Some(line.trim().to_owned()))
    }
}

/// Seam for the one-second wizard heartbeat so tests run without sleeping.
pub trait WizardPacer {
    fn pause(&mut self, duration: Duration);
}

pub struct ThreadPacer;

impl WizardPacer for ThreadPacer {
    fn pause(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardOutcome {
    Connected,
    Cancelled,
    Failed { reason: String },
}

enum WaitResult {
    Connected,
    GaveUp,
}

pub fn run_connect_wizard<B: GowaBackend>(
    terminal: &mut dyn WizardTerminal,
    hub: &SyncHub<B>,
    pacer: &mut dyn WizardPacer,
    poll_interval: Duration,
) -> io::Result<WizardOutcome> {
    let mut wizard = ConnectWizard::default();
    wizard.status_reported(hub.refresh_status().connected);

    loop {
        if wizard.is_connected() {
            match connected_menu(terminal, hub, &mut wizard)? {
                Some(outcome) => return Ok(outcome),
                None => continue,
            }
        }

        terminal.print_line("WhatsApp account is not linked.")?;
        let Some(choice) = terminal.prompt_line("Link via [qr/phone/quit]: ")? else {
            terminal.print_line("Input cancelled (EOF).")?;
            return Ok(WizardOutcome::Cancelled);
        };

        match choice.to_ascii_lowercase().as_str() {
            "qr" => match hub.connect_qr() {
                Ok(issued) => {
                    wizard.qr_issued(issued.qr_link.clone(), issued.qr_duration);
                    terminal.print_line(&format!(
                        "Scan this QR code with WhatsApp on your phone: {}",
                        issued.qr_link
                    ))?;
                }
                Err(error) if error.is_already_logged_in() => {
                    terminal.print_line("The backend reports an active login. Rechecking.")?;
                    wizard.status_reported(hub.refresh_status().connected);
                }
                Err(error) => {
                    let reason = redact_text(&error.to_string());
                    wizard.fail(reason.clone());
                    terminal.print_line(&format!("Linking failed: {reason}"))?;
                    return Ok(WizardOutcome::Failed { reason });
                }
            },
            "phone" => {
                let Some(phone) = terminal.prompt_line("Phone number (with country code): ")?
                else {
                    terminal.print_line("Input cancelled (EOF).")?;
                    return Ok(WizardOutcome::Cancelled);
                };

                match hub.connect_with_code(&phone) {
                    Ok(issued) => {
                        wizard.pair_code_issued(issued.pair_code.clone());
                        terminal.print_line(&format!(
                            "Enter this code in WhatsApp > Linked Devices: {}",
                            issued.pair_code
                        ))?;
                    }
                    Err(error) if error.is_already_logged_in() => {
                        terminal.print_line("The backend reports an active login. Rechecking.")?;
                        wizard.status_reported(hub.refresh_status().connected);
                    }
                    Err(error) => {
                        let reason = redact_text(&error.to_string());
                        wizard.fail(reason.clone());
                        terminal.print_line(&format!("Linking failed: {reason}"))?;
                        return Ok(WizardOutcome::Failed { reason });
                    }
                }
            }
            "quit" => return Ok(WizardOutcome::Cancelled),
            other => {
                terminal.print_line(&format!("Unknown choice: {other}"))?;
                continue;
            }
        }

        if wizard.is_connected() {
            continue;
        }

        if let WaitResult::GaveUp =
            wait_for_confirmation(terminal, hub, pacer, poll_interval, &mut wizard)?
        {
            wizard.reset();
        }
    }
}

/// Ticks the wizard once per second and re-polls status at the configured
/// interval until the backend confirms the link, the QR countdown runs out,
/// or the pairing-code grace period ends.
fn wait_for_confirmation<B: GowaBackend>(
    terminal: &mut dyn WizardTerminal,
    hub: &SyncHub<B>,
    pacer: &mut dyn WizardPacer,
    poll_interval: Duration,
    wizard: &mut ConnectWizard,
) -> io::Result<WaitResult> {
    let poll_secs = poll_interval.as_secs().max(1);
    let mut waited = 0u64;

    loop {
        pacer.pause(Duration::from_secs(1));
        waited += 1;
        wizard.tick();

        if waited % poll_secs == 0 {
            wizard.status_reported(hub.refresh_status().connected);
            if wizard.is_connected() {
                terminal.print_line("WhatsApp account linked.")?;
                return Ok(WaitResult::Connected);
            }
        }

        if wizard.qr_remaining_secs() == Some(0) {
            terminal.print_line("The QR code expired. Request a fresh one.")?;
            return Ok(WaitResult::GaveUp);
        }

        if wizard.qr_remaining_secs().is_none() && waited >= PAIR_WAIT_SECS {
            terminal.print_line("Still not linked. The pairing code may have been refused.")?;
            return Ok(WaitResult::GaveUp);
        }
    }
}

/// Returns `Some(outcome)` to finish the wizard, `None` to fall back to the
/// method menu after a disconnect.
fn connected_menu<B: GowaBackend>(
    terminal: &mut dyn WizardTerminal,
    hub: &SyncHub<B>,
    wizard: &mut ConnectWizard,
) -> io::Result<Option<WizardOutcome>> {
    loop {
        terminal.print_line("WhatsApp account is linked.")?;
        let Some(choice) = terminal.prompt_line("[disconnect/recheck/done]: ")? else {
            return Ok(Some(WizardOutcome::Connected));
        };

        match choice.to_ascii_lowercase().as_str() {
            "done" => return Ok(Some(WizardOutcome::Connected)),
            "recheck" => {
                let status = hub.refresh_status();
                if !status.connected {
                    terminal.print_line("The backend no longer reports a link.")?;
                    wizard.disconnected();
                    return Ok(None);
                }
            }
            "disconnect" => match hub.logout_device() {
                Ok(()) => {
                    terminal.print_line("Device unlinked.")?;
                    wizard.disconnected();
                    return Ok(None);
                }
                Err(error) => {
                    terminal
                        .print_line(&format!("Unlink failed: {}", redact_text(&error.to_string())))?;
                }
            },
            other => terminal.print_line(&format!("Unknown choice: {other}"))?,
        }
    }
}
