use anyhow::{anyhow, bail};

use sao_negotiator_component::{
    Action, BoxedNegotiator, NegotiationState, SessionSettings, TurnEvent,
};

/// Drives single negotiator through one session, keeping its state between events.
pub struct NegotiationSession {
    negotiator: BoxedNegotiator,
    state: Option<NegotiationState>,
    finished: bool,
}

impl NegotiationSession {
    pub fn new(negotiator: BoxedNegotiator) -> NegotiationSession {
        NegotiationSession {
            negotiator,
            state: None,
            finished: false,
        }
    }

    pub fn start(&mut self, settings: &SessionSettings) -> anyhow::Result<()> {
        if self.state.is_some() {
            bail!("Session already started.");
        }
        self.state = Some(self.negotiator.start(settings)?);
        self.finished = false;
        Ok(())
    }

    /// Passes event to negotiator. Returns action for `TurnEvent::YourTurn`.
    ///
    /// Failed negotiator loses its state, and the session can't be continued.
    pub fn handle(&mut self, event: &TurnEvent) -> anyhow::Result<Option<Action>> {
        if self.finished {
            bail!("Session already ended. Can't handle event: {}.", event);
        }

        let state = self
            .state
            .take()
            .ok_or_else(|| anyhow!("Session not started or broken by previous error."))?;
        let (action, state) = self.negotiator.decide(state, event)?;
        self.state = Some(state);

        match (event, &action) {
            (TurnEvent::YourTurn { .. }, None) => {
                bail!("Negotiator didn't respond to {}.", event)
            }
            (TurnEvent::SessionEnded, _) => self.finished = true,
            _ => (),
        }
        Ok(action)
    }

    pub fn state(&self) -> Option<&NegotiationState> {
        self.state.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}
