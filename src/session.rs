// The public entry point: owns the current state and routes everything through it.

use std::time::Instant;

use tracing::{error, info, trace, warn};

use crate::error::Error;
use crate::letters::Letter;
use crate::state::{Layers, Proxy, State};
use crate::types::{Canvases, InputEvent};

pub struct Session {
    state: State,
    proxy: Proxy,
}

impl Session {
    pub fn new(proxy: Proxy) -> Self {
        Self { state: State::Uninitialised, proxy }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn layers(&self) -> Option<&Layers> {
        self.state.layers()
    }

    pub fn letter(&self) -> Option<Letter> {
        self.state.letter()
    }

    /// True when the current state wants another tick on the next display refresh.
    pub fn frame_requested(&self) -> bool {
        self.proxy.frame_requested()
    }

    pub fn rebuilds(&self) -> u64 {
        self.proxy.rebuilds()
    }

    /// Build the layers and show the first letter. A second call only warns.
    pub fn initialise(&mut self, canvases: Canvases) -> Result<(), Error> {
        if !matches!(self.state, State::Uninitialised) {
            warn!(state = self.state.name(), "already initialised");
            return Ok(());
        }
        self.transition(|_, proxy| State::initialise(proxy, &canvases))
    }

    /// Route one input event to the current state.
    pub fn handle(&mut self, event: InputEvent) -> Result<(), Error> {
        trace!(kind = ?event.kind(), passive = event.kind().passive(), state = self.state.name(), "input");
        self.transition(|state, proxy| dispatch(state, proxy, event))
    }

    /// One display refresh. Runs only if a tick was requested, and always
    /// against whatever state is current now.
    pub fn animate(&mut self, now: Instant) -> Result<(), Error> {
        if !self.proxy.take_frame_request() {
            return Ok(());
        }
        self.transition(|state, proxy| match state {
            State::MouseStroke(mut drawing) => {
                drawing.tick(proxy, now);
                Ok(State::MouseStroke(drawing))
            }
            State::TouchStroke(mut touch) => {
                touch.tick(proxy, now);
                Ok(State::TouchStroke(touch))
            }
            State::Clearing(clearing) => clearing.tick(proxy),
            idle @ (State::Uninitialised | State::Ready(_)) => Ok(idle),
        })
    }

    /// Deliver a trailing haptic pulse once its cooldown has run out.
    pub fn poll_haptics(&mut self, now: Instant) {
        self.proxy.haptics_mut().poll(now);
    }

    fn transition(
        &mut self,
        step: impl FnOnce(State, &mut Proxy) -> Result<State, Error>,
    ) -> Result<(), Error> {
        let current = std::mem::replace(&mut self.state, State::Uninitialised);
        let from = current.name();
        let rebuilds = self.proxy.rebuilds();
        match step(current, &mut self.proxy) {
            Ok(next) => {
                // Ready -> Ready through a resize or refresh still counts.
                let rebuilt = self.proxy.rebuilds() != rebuilds;
                if next.name() != from || rebuilt {
                    info!(from, to = next.name(), rebuilt, "state changed");
                }
                self.state = next;
                Ok(())
            }
            Err(e) => {
                // The old state was consumed; the host has to initialise again.
                error!(from, error = %e, "transition failed, session reset");
                Err(e)
            }
        }
    }
}

/// Every state answers every input kind, even if only with "no change".
fn dispatch(state: State, proxy: &mut Proxy, event: InputEvent) -> Result<State, Error> {
    use InputEvent as E;

    match state {
        State::Uninitialised => Ok(State::Uninitialised),

        State::Ready(ready) => match event {
            E::Resize(canvases) => ready.resize(proxy, &canvases),
            E::MouseDown(input) => ready.on_mouse_down(proxy, input),
            E::TouchStart(input) => ready.on_touch_start(proxy, &input),
            E::MouseMove(_) | E::MouseUp(_) | E::TouchMove(_) | E::TouchEnd(_) | E::TouchCancel(_) => {
                Ok(State::Ready(ready))
            }
        },

        State::MouseStroke(mut drawing) => match event {
            E::Resize(canvases) => drawing.abandon(proxy, &canvases),
            E::MouseMove(input) => {
                drawing.move_to_client(input.client);
                Ok(State::MouseStroke(drawing))
            }
            E::MouseUp(_) => Ok(drawing.finish(proxy)),
            E::MouseDown(_) | E::TouchStart(_) | E::TouchMove(_) | E::TouchEnd(_) | E::TouchCancel(_) => {
                Ok(State::MouseStroke(drawing))
            }
        },

        State::TouchStroke(mut touch) => match event {
            E::Resize(canvases) => touch.abandon(proxy, &canvases),
            E::TouchMove(input) => {
                touch.on_move(&input);
                Ok(State::TouchStroke(touch))
            }
            E::TouchEnd(input) | E::TouchCancel(input) => Ok(touch.on_release(proxy, &input)),
            E::MouseDown(_) | E::MouseMove(_) | E::MouseUp(_) | E::TouchStart(_) => {
                Ok(State::TouchStroke(touch))
            }
        },

        State::Clearing(clearing) => match event {
            E::Resize(canvases) => clearing.resize(proxy, &canvases),
            E::MouseDown(_)
            | E::MouseMove(_)
            | E::MouseUp(_)
            | E::TouchStart(_)
            | E::TouchMove(_)
            | E::TouchEnd(_)
            | E::TouchCancel(_) => Ok(State::Clearing(clearing)),
        },
    }
}
