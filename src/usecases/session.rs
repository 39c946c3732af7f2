//! Operator session lifecycle: login, restore from disk, and logout, plus the
//! shared tracker other components observe for phase and status changes.

use std::sync::{
    mpsc::{self, Receiver, Sender},
    Mutex,
};

use thiserror::Error;

use crate::{
    domain::{
        session::{Credentials, Session, SessionPhase},
        status::{now_unix_ms, ConnectionStatus},
    },
    gowa::SharedCredentials,
    infra::{error::AppError, session_store::SessionStore},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeError {
    /// The backend answered 401 for this credential pair.
    Unauthorized,
    Unavailable,
}

/// Validates a credential pair against the backend without signing the shared
/// handle.
pub trait SessionProbe {
    fn probe(&self, credentials: &Credentials) -> Result<(), ProbeError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub session: Option<Session>,
    pub status: ConnectionStatus,
}

/// Current session state plus a broadcast channel for observers. Writers are
/// the session operations and the status poller; readers take snapshots or
/// subscribe.
#[derive(Debug, Default)]
pub struct SessionTracker {
    inner: Mutex<TrackerInner>,
}

#[derive(Debug, Default)]
struct TrackerInner {
    snapshot: SessionSnapshot,
    subscribers: Vec<Sender<SessionSnapshot>>,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner
            .lock()
            .map(|inner| inner.snapshot.clone())
            .unwrap_or_default()
    }

    pub fn subscribe(&self) -> Receiver<SessionSnapshot> {
        let (tx, rx) = mpsc::channel();
        if let Ok(mut inner) = self.inner.lock() {
            inner.subscribers.push(tx);
        }
        rx
    }

    pub fn on_validating(&self) {
        self.update(|snapshot| snapshot.phase = SessionPhase::Validating);
    }

    pub fn on_login(&self, session: Session) {
        self.update(|snapshot| {
            snapshot.phase = SessionPhase::Authenticated;
            snapshot.session = Some(session);
        });
    }

    pub fn on_status(&self, status: ConnectionStatus) {
        self.update(|snapshot| snapshot.status = status);
    }

    /// Resets to the unauthenticated snapshot, connection status included.
    pub fn on_logout(&self) {
        self.update(|snapshot| *snapshot = SessionSnapshot::default());
    }

    fn update(&self, apply: impl FnOnce(&mut SessionSnapshot)) {
        let Ok(mut inner) = self.inner.lock() else {
            return;
        };

        apply(&mut inner.snapshot);
        let snapshot = inner.snapshot.clone();
        inner
            .subscribers
            .retain(|subscriber| subscriber.send(snapshot.clone()).is_ok());
    }
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("the backend rejected the credentials")]
    InvalidCredentials,
    #[error("the backend is unreachable, try again later")]
    BackendUnavailable,
    #[error(transparent)]
    Storage(#[from] AppError),
}

/// Validates the pair against the backend, persists the session, and signs the
/// shared credential handle.
pub fn login(
    probe: &dyn SessionProbe,
    store: &SessionStore,
    shared: &SharedCredentials,
    tracker: &SessionTracker,
    username: &str,
    password: &str,
) -> Result<Session, LoginError> {
    tracker.on_validating();
    let credentials = Credentials {
        username: username.to_owned(),
        password: password.to_owned(),
    };

    if let Err(error) = probe.probe(&credentials) {
        tracker.on_logout();
        return Err(match error {
            ProbeError::Unauthorized => LoginError::InvalidCredentials,
            ProbeError::Unavailable => LoginError::BackendUnavailable,
        });
    }

    let session = Session::for_login(username, now_unix_ms().to_string());
    store.save(&session, &credentials)?;
    shared.set_active(credentials);
    tracker.on_login(session.clone());

    Ok(session)
}

/// Revives a persisted session. A definitive 401 clears the stored pair; an
/// unreachable backend is not proof the pair went bad, so the session is
/// restored as-is and the next authenticated request settles it.
pub fn restore(
    probe: &dyn SessionProbe,
    store: &SessionStore,
    shared: &SharedCredentials,
    tracker: &SessionTracker,
) -> Result<Option<Session>, AppError> {
    let Some(persisted) = store.load()? else {
        return Ok(None);
    };

    tracker.on_validating();
    match probe.probe(&persisted.credentials) {
        Err(ProbeError::Unauthorized) => {
            tracing::warn!(
                username = %persisted.session.username,
                "stored credentials are no longer accepted, clearing session"
            );
            store.clear()?;
            tracker.on_logout();
            Ok(None)
        }
        Ok(()) | Err(ProbeError::Unavailable) => {
            shared.set_active(persisted.credentials);
            tracker.on_login(persisted.session.clone());
            Ok(Some(persisted.session))
        }
    }
}

/// Local sign-out: forgets the persisted pair and falls back to the configured
/// default credentials. The WhatsApp device link is untouched.
pub fn logout(
    store: &SessionStore,
    shared: &SharedCredentials,
    tracker: &SessionTracker,
) -> Result<(), AppError> {
    store.clear()?;
    shared.clear_active();
    tracker.on_logout();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use crate::{domain::session::Role, infra::storage_layout::StorageLayout};

    struct StubProbe {
        result: Result<(), ProbeError>,
        probed: RefCell<Vec<Credentials>>,
    }

    impl StubProbe {
        fn with_result(result: Result<(), ProbeError>) -> Self {
            Self {
                result,
                probed: RefCell::new(Vec::new()),
            }
        }
    }

    impl SessionProbe for StubProbe {
        fn probe(&self, credentials: &Credentials) -> Result<(), ProbeError> {
            self.probed.borrow_mut().push(credentials.clone());
            self.result
        }
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        store: SessionStore,
        shared: SharedCredentials,
        tracker: SessionTracker,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().expect("temp dir");
            let layout = StorageLayout {
                config_dir: dir.path().to_path_buf(),
                state_dir: dir.path().join("state"),
            };
            layout.ensure_dirs().expect("dirs should be created");

            Self {
                store: SessionStore::with_layout(layout),
                shared: SharedCredentials::new(Credentials {
                    username: "admin".to_owned(),
                    password: "admin".to_owned(),
                }),
                tracker: SessionTracker::new(),
                _dir: dir,
            }
        }
    }

    #[test]
    fn successful_login_persists_and_activates_the_pair() {
        let fixture = Fixture::new();
        let probe = StubProbe::with_result(Ok(()));

        let session = login(
            &probe,
            &fixture.store,
            &fixture.shared,
            &fixture.tracker,
            "bob",
            "hunter2",
        )
        .expect("login should succeed");

        assert_eq!(session.username, "bob");
        assert_eq!(session.role, Role::User);
        assert_eq!(fixture.shared.current().username, "bob");
        assert!(fixture
            .store
            .load()
            .expect("load should succeed")
            .is_some());

        let snapshot = fixture.tracker.snapshot();
        assert_eq!(snapshot.phase, SessionPhase::Authenticated);
        assert_eq!(snapshot.session.map(|s| s.username), Some("bob".to_owned()));
    }

    #[test]
    fn rejected_login_leaves_no_trace() {
        let fixture = Fixture::new();
        let probe = StubProbe::with_result(Err(ProbeError::Unauthorized));

        let err = login(
            &probe,
            &fixture.store,
            &fixture.shared,
            &fixture.tracker,
            "bob",
            "wrong",
        )
        .expect_err("login must fail");

        assert!(matches!(err, LoginError::InvalidCredentials));
        assert_eq!(fixture.store.load().expect("load should succeed"), None);
        assert_eq!(fixture.shared.current().username, "admin");
        assert_eq!(
            fixture.tracker.snapshot().phase,
            SessionPhase::Unauthenticated
        );
    }

    #[test]
    fn unreachable_backend_maps_to_backend_unavailable() {
        let fixture = Fixture::new();
        let probe = StubProbe::with_result(Err(ProbeError::Unavailable));

        let err = login(
            &probe,
            &fixture.store,
            &fixture.shared,
            &fixture.tracker,
            "bob",
            "hunter2",
        )
        .expect_err("login must fail");

        assert!(matches!(err, LoginError::BackendUnavailable));
    }

    #[test]
    fn restore_with_nothing_persisted_is_a_clean_none() {
        let fixture = Fixture::new();
        let probe = StubProbe::with_result(Ok(()));

        let restored = restore(&probe, &fixture.store, &fixture.shared, &fixture.tracker)
            .expect("restore should succeed");

        assert_eq!(restored, None);
        assert!(probe.probed.borrow().is_empty());
    }

    #[test]
    fn restore_revives_a_valid_persisted_session() {
        let fixture = Fixture::new();
        login(
            &StubProbe::with_result(Ok(())),
            &fixture.store,
            &fixture.shared,
            &fixture.tracker,
            "bob",
            "hunter2",
        )
        .expect("login should succeed");
        fixture.shared.clear_active();

        let probe = StubProbe::with_result(Ok(()));
        let restored = restore(&probe, &fixture.store, &fixture.shared, &fixture.tracker)
            .expect("restore should succeed")
            .expect("session should be restored");

        assert_eq!(restored.username, "bob");
        assert_eq!(fixture.shared.current().username, "bob");
        assert_eq!(probe.probed.borrow()[0].password, "hunter2");
    }

    #[test]
    fn restore_clears_the_store_on_a_definitive_rejection() {
        let fixture = Fixture::new();
        login(
            &StubProbe::with_result(Ok(())),
            &fixture.store,
            &fixture.shared,
            &fixture.tracker,
            "bob",
            "hunter2",
        )
        .expect("login should succeed");
        fixture.shared.clear_active();

        let probe = StubProbe::with_result(Err(ProbeError::Unauthorized));
        let restored = restore(&probe, &fixture.store, &fixture.shared, &fixture.tracker)
            .expect("restore should succeed");

        assert_eq!(restored, None);
        assert_eq!(fixture.store.load().expect("load should succeed"), None);
        assert_eq!(fixture.shared.current().username, "admin");
    }

    #[test]
    fn restore_keeps_the_session_when_the_backend_is_unreachable() {
        let fixture = Fixture::new();
        login(
            &StubProbe::with_result(Ok(())),
            &fixture.store,
            &fixture.shared,
            &fixture.tracker,
            "bob",
            "hunter2",
        )
        .expect("login should succeed");

        let probe = StubProbe::with_result(Err(ProbeError::Unavailable));
        let restored = restore(&probe, &fixture.store, &fixture.shared, &fixture.tracker)
            .expect("restore should succeed");

        assert!(restored.is_some());
        assert!(fixture
            .store
            .load()
            .expect("load should succeed")
            .is_some());
    }

    #[test]
    fn logout_clears_store_handle_and_tracker() {
        let fixture = Fixture::new();
        login(
            &StubProbe::with_result(Ok(())),
            &fixture.store,
            &fixture.shared,
            &fixture.tracker,
            "bob",
            "hunter2",
        )
        .expect("login should succeed");
        fixture
            .tracker
            .on_status(ConnectionStatus {
                connected: true,
                qr_code: None,
                pair_code: None,
            });

        logout(&fixture.store, &fixture.shared, &fixture.tracker).expect("logout should succeed");

        assert_eq!(fixture.store.load().expect("load should succeed"), None);
        assert_eq!(fixture.shared.current().username, "admin");
        let snapshot = fixture.tracker.snapshot();
        assert_eq!(snapshot.phase, SessionPhase::Unauthenticated);
        assert!(!snapshot.status.connected);
        assert_eq!(snapshot.session, None);
    }

    #[test]
    fn subscribers_observe_phase_transitions() {
        let fixture = Fixture::new();
        let updates = fixture.tracker.subscribe();

        login(
            &StubProbe::with_result(Ok(())),
            &fixture.store,
            &fixture.shared,
            &fixture.tracker,
            "bob",
            "hunter2",
        )
        .expect("login should succeed");

        let first = updates.try_recv().expect("validating update");
        assert_eq!(first.phase, SessionPhase::Validating);
        let second = updates.try_recv().expect("authenticated update");
        assert_eq!(second.phase, SessionPhase::Authenticated);
    }
}
