//! State machine for the WhatsApp connection wizard.
//!
//! Transition to `Connected` is driven externally by polled app status, not by
//! the login path itself: the backend confirms pairing, the wizard only
//! observes it. Errors are a first-class state so every transition is
//! exhaustive.

const DEFAULT_QR_DURATION_SECS: u32 = 120;

/// How the operator chose to link the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectMethod {
    QrCode,
    PairingCode,
}

/// A QR image handed out by the backend, with its visual expiry countdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrTicket {
    pub link: String,
    pub remaining_secs: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WizardState {
    #[default]
    MethodSelect,
    Connecting {
        method: ConnectMethod,
        qr: Option<QrTicket>,
        pair_code: Option<String>,
    },
    Connected,
    Failed {
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConnectWizard {
    state: WizardState,
}

impl ConnectWizard {
    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.state, WizardState::Connected)
    }

    /// The backend issued a QR link; start the expiry countdown.
    pub fn qr_issued(&mut self, link: String, duration_secs: Option<u32>) {
        self.state = WizardState::Connecting {
            method: ConnectMethod::QrCode,
            qr: Some(QrTicket {
                link,
                remaining_secs: duration_secs.unwrap_or(DEFAULT_QR_DURATION_SECS),
            }),
            pair_code: None,
        };
    }

    /// The backend issued a pairing code; no countdown on this path.
    pub fn pair_code_issued(&mut self, code: String) {
        self.state = WizardState::Connecting {
            method: ConnectMethod::PairingCode,
            qr: None,
            pair_code: Some(code),
        };
    }

    /// One-second tick; the QR countdown never drops below zero. Expiry is
    /// visual only and does not change state.
    pub fn tick(&mut self) {
        if let WizardState::Connecting { qr: Some(qr), .. } = &mut self.state {
            qr.remaining_secs = qr.remaining_secs.saturating_sub(1);
        }
    }

    pub fn qr_remaining_secs(&self) -> Option<u32> {
        match &self.state {
            WizardState::Connecting { qr: Some(qr), .. } => Some(qr.remaining_secs),
            _ => None,
        }
    }

    /// Feed a polled status snapshot. A connected report completes the wizard
    /// regardless of which path was in flight.
    pub fn status_reported(&mut self, connected: bool) {
        if connected {
            self.state = WizardState::Connected;
        }
    }

    pub fn fail(&mut self, reason: impl Into<String>) {
        self.state = WizardState::Failed {
            reason: reason.into(),
        };
    }

    /// Clears any QR/pairing state and returns to method selection.
    pub fn reset(&mut self) {
        self.state = WizardState::MethodSelect;
    }

    /// Disconnect from the connected state back to method selection.
    pub fn disconnected(&mut self) {
        self.state = WizardState::MethodSelect;
    }
}
