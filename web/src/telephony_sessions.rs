use dashmap::DashMap;
use domain::telephony::SessionState;
use domain::Id;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

struct SessionHandle {
    state: watch::Receiver<SessionState>,
    cancel: CancellationToken,
}

/// Live telephony sessions by id. Clients poll a session's state and may cancel
/// it; the polling task itself owns the sending side of the state channel.
#[derive(Clone, Default)]
pub struct TelephonySessions {
    sessions: Arc<DashMap<Id, SessionHandle>>,
}

impl TelephonySessions {
    pub fn register(&self, state: watch::Receiver<SessionState>, cancel: CancellationToken) -> Id {
        let id = Id::new_v4();
        self.sessions.insert(id, SessionHandle { state, cancel });
        id
    }

    pub fn state(&self, id: Id) -> Option<SessionState> {
        self.sessions
            .get(&id)
            .map(|handle| handle.state.borrow().clone())
    }

    /// Stops the session's polling and forgets it. Returns the last state seen.
    pub fn cancel(&self, id: Id) -> Option<SessionState> {
        let (_, handle) = self.sessions.remove(&id)?;
        handle.cancel.cancel();
        let last = handle.state.borrow().clone();
        Some(last)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_follows_the_channel() {
        let sessions = TelephonySessions::default();
        let (tx, rx) = watch::channel(SessionState::Initiating);
        let id = sessions.register(rx, CancellationToken::new());

        tx.send_replace(SessionState::InProgress {
            sid: "CA1".to_owned(),
        });

        assert_eq!(
            sessions.state(id),
            Some(SessionState::InProgress {
                sid: "CA1".to_owned()
            })
        );
    }

    #[test]
    fn cancel_signals_the_token_and_forgets_the_session() {
        let sessions = TelephonySessions::default();
        let (_tx, rx) = watch::channel(SessionState::Initiating);
        let cancel = CancellationToken::new();
        let id = sessions.register(rx, cancel.clone());

        assert_eq!(sessions.cancel(id), Some(SessionState::Initiating));
        assert!(cancel.is_cancelled());
        assert!(sessions.state(id).is_none());
        assert!(sessions.is_empty());
    }

    #[test]
    fn unknown_sessions_have_no_state() {
        let sessions = TelephonySessions::default();

        assert!(sessions.state(Id::new_v4()).is_none());
        assert!(sessions.cancel(Id::new_v4()).is_none());
    }
}
