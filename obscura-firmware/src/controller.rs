//! Central exhibition controller
//!
//! Owns the state machine, the visitor session, the dwell policy, and
//! the workflow sequencer. Tasks feed it conditioned input events,
//! host commands, and ticks; it answers with state transitions and a
//! queue of outbound link messages. Nothing here touches hardware.

use heapless::Vec;

use obscura_core::config::InstallationConfig;
use obscura_core::dwell::{DwellMonitor, LinkMonitor};
use obscura_core::session::Session;
use obscura_core::state::{ErrorKind, Event, State};
use obscura_core::workflow::{project_target, Advance, Pipeline};
use obscura_protocol::{ControllerMessage, HostCommand, StepReport, TouchZone, WorkflowStep};

use crate::channels::InputEvent;

/// Outbound messages queued per controller call
const OUTBOX_SIZE: usize = 8;

/// Controller state for coordinating subsystems
pub struct Controller<'a> {
    /// Current exhibition state
    state: State,
    /// Per-visitor session record
    session: Session,
    /// Installation configuration
    config: &'a InstallationConfig,
    /// State dwell timeout tracking
    dwell: DwellMonitor,
    /// Render host link health
    link: LinkMonitor,
    /// Workflow sequencer
    pipeline: Pipeline,
    /// Messages queued for the link TX task
    outbox: Vec<ControllerMessage, OUTBOX_SIZE>,
    /// Captions need re-rendering
    dirty: bool,
    /// Last tick timestamp (ms)
    last_tick_ms: u32,
}

impl<'a> Controller<'a> {
    /// Create a new controller in the boot state
    pub fn new(config: &'a InstallationConfig) -> Self {
        Self {
            state: State::Boot,
            session: Session::new(),
            config,
            dwell: DwellMonitor::new(config.timeouts.clone()),
            link: LinkMonitor::new(),
            pipeline: Pipeline::new(),
            outbox: Vec::new(),
            dirty: true,
            last_tick_ms: 0,
        }
    }

    /// Complete the boot sequence
    pub fn boot_complete(&mut self) {
        self.apply(Event::BootComplete);
    }

    /// Get current state
    pub fn state(&self) -> State {
        self.state
    }

    /// Get the visitor session
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Get the installation config
    pub fn config(&self) -> &'a InstallationConfig {
        self.config
    }

    /// Get the workflow sequencer
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Take the dirty flag; true means captions need re-rendering
    pub fn take_dirty(&mut self) -> bool {
        core::mem::take(&mut self.dirty)
    }

    /// Drain queued outbound messages
    pub fn drain_outbox(&mut self) -> impl Iterator<Item = ControllerMessage> + '_ {
        // heapless::Vec has no drain; rotate through a fresh vec
        core::mem::take(&mut self.outbox).into_iter()
    }

    /// Record a heartbeat from the render host
    pub fn heartbeat_received(&mut self) {
        self.link.heartbeat_received();
    }

    /// Process a conditioned input event from the telescope hardware
    pub fn process_input(&mut self, input: InputEvent) {
        match input {
            InputEvent::CityDial { detents } => self.handle_city_dial(detents),
            InputEvent::ParamDial { detents } => self.handle_param_dial(detents),
            InputEvent::CityPress => self.handle_city_press(),
            InputEvent::ParamPress => self.handle_param_press(),
            InputEvent::Heading { centideg } => self.handle_heading(centideg),
            InputEvent::SensorFault(kind) => self.apply(Event::ErrorDetected(kind)),
        }
    }

    fn handle_city_dial(&mut self, detents: i32) {
        if detents == 0 {
            return;
        }
        self.dwell.activity();
        match self.state {
            State::CitySelection => {
                self.session.step_city(detents, self.config.cities.len());
                self.dirty = true;
                self.push_status();
            }
            State::ParameterInput => {
                self.session.adjust_distance(detents, &self.config.dials);
                self.dirty = true;
                self.push_status();
            }
            // The attract caption promises any dial turn wakes the piece
            State::WaitingInteraction => self.apply(Event::NewSessionRequested),
            _ => {}
        }
    }

    fn handle_param_dial(&mut self, detents: i32) {
        if detents == 0 {
            return;
        }
        self.dwell.activity();
        match self.state {
            State::ParameterInput => {
                self.session.adjust_time_offset(detents, &self.config.dials);
                self.dirty = true;
                self.push_status();
            }
            State::WaitingInteraction => self.apply(Event::NewSessionRequested),
            _ => {}
        }
    }

    fn handle_city_press(&mut self) {
        self.dwell.activity();
        match self.state {
            State::CitySelection => self.apply(Event::CityChosen),
            State::ResultDisplay => self.apply(Event::ResultAcknowledged),
            State::WaitingInteraction => self.apply(Event::NewSessionRequested),
            _ => {}
        }
    }

    fn handle_param_press(&mut self) {
        self.dwell.activity();
        match self.state {
            State::ParameterInput => self.apply(Event::ParametersLocked),
            State::FetchConfirm => self.apply(Event::FetchConfirmed),
            State::WaitingInteraction => self.apply(Event::NewSessionRequested),
            _ => {}
        }
    }

    fn handle_heading(&mut self, centideg: u16) {
        // The bearing tracks the telescope only until the visitor locks
        // the exposure
        if self.state.accepts_dial_input() {
            self.session.set_bearing_cd(centideg);
            if self.state == State::ParameterInput {
                self.dirty = true;
                self.push_status();
            }
        }
    }

    /// Process a command from the render host
    pub fn process_host(&mut self, cmd: HostCommand) {
        match cmd {
            HostCommand::Zone(zone) => self.handle_zone(zone),
            // Ping is answered by the RX task; the heartbeat reaches us
            // through heartbeat_received()
            HostCommand::Ping => {}
            HostCommand::StepDone { step, report } => {
                if self.state.workflow_active() {
                    let advance = self.pipeline.report(step, report);
                    self.handle_advance(advance);
                }
            }
            HostCommand::Env(env) => {
                self.session.set_env(env);
                self.dirty = true;
            }
            HostCommand::WorkflowComplete { artwork_id } => {
                if self.state.workflow_active() {
                    self.session.set_artwork_id(artwork_id);
                    self.apply(Event::WorkflowComplete);
                }
            }
            HostCommand::WorkflowFailed { step: _ } => {
                if self.state.workflow_active() {
                    self.pipeline.abort();
                    self.apply(Event::ErrorDetected(ErrorKind::WorkflowFailed));
                }
            }
        }
    }

    fn handle_zone(&mut self, zone: TouchZone) {
        self.dwell.activity();
        match (self.state, zone) {
            (_, TouchZone::StaffReset) => self.apply(Event::ResetRequested),
            (State::CitySelection, TouchZone::CityNext) => {
                self.session.step_city(1, self.config.cities.len());
                self.dirty = true;
                self.push_status();
            }
            (State::CitySelection, TouchZone::CitySelect) => self.apply(Event::CityChosen),
            (State::ParameterInput, TouchZone::LockParameters) => {
                self.apply(Event::ParametersLocked)
            }
            (State::FetchConfirm, TouchZone::ConfirmFetch) => self.apply(Event::FetchConfirmed),
            (State::FetchConfirm, TouchZone::DeclineFetch) => self.apply(Event::FetchDeclined),
            (State::ResultDisplay, TouchZone::Artwork) => self.apply(Event::ResultAcknowledged),
            (State::WaitingInteraction, zone) if zone.is_session_zone() => {
                self.apply(Event::NewSessionRequested)
            }
            _ => {}
        }
    }

    /// Periodic tick; drives timeouts, link health, and step budgets
    pub fn tick(&mut self, now_ms: u32) {
        let delta = now_ms.wrapping_sub(self.last_tick_ms);
        self.last_tick_ms = now_ms;

        let was_resetting = self.state == State::Resetting;

        self.link.update_time(delta);
        if let Some(kind) = self.link.check() {
            if !self.state.is_error() && self.state != State::Boot {
                self.apply(Event::ErrorDetected(kind));
            }
        }

        if let Some(event) = self.dwell.update_time(self.state, delta) {
            self.apply(event);
        }

        let advance = self.pipeline.update_time(delta);
        self.handle_advance(advance);

        // Teardown is local; one tick in Resetting is enough for the
        // abort message to be queued before the screen resets
        if was_resetting {
            self.apply(Event::ResetComplete);
        }
    }

    fn handle_advance(&mut self, advance: Advance) {
        match advance {
            Advance::NoChange => {}
            Advance::Next(step) => {
                self.dirty = true;
                self.send(ControllerMessage::Progress {
                    step,
                    percent: self.pipeline.percent(),
                });
            }
            Advance::Finished => {
                // The artwork id still has to arrive via WorkflowComplete
                self.dirty = true;
            }
            Advance::Failed(_step) => {
                // Tell the host to stop whatever it is still doing
                self.send(ControllerMessage::AbortSession);
                self.apply(Event::ErrorDetected(ErrorKind::WorkflowFailed));
            }
        }
    }

    /// Apply an event to the state machine, running entry actions
    fn apply(&mut self, event: Event) {
        let next = self.state.transition(event);
        if next == self.state {
            return;
        }

        self.state = next;
        self.dwell.state_entered();
        self.dirty = true;

        match next {
            State::Processing => self.begin_workflow(),
            State::Resetting => self.begin_reset(),
            _ => {}
        }

        self.push_status();
    }

    /// Entry action for Processing: run the local projection step and
    /// hand the rest of the workflow to the render host
    fn begin_workflow(&mut self) {
        self.pipeline.start();

        let params = self.session.params();
        let target = project_target(
            self.session.origin(self.config),
            params.bearing_cd,
            params.distance_m,
        );

        let advance = self.pipeline.report(WorkflowStep::ComputeTarget, StepReport::Ok);
        self.send(ControllerMessage::StartWorkflow(
            self.session.workflow_request(target),
        ));
        self.handle_advance(advance);
    }

    /// Entry action for Resetting: drop the session on both sides
    fn begin_reset(&mut self) {
        self.pipeline.abort();
        self.session.reset();
        self.send(ControllerMessage::AbortSession);
    }

    fn push_status(&mut self) {
        let msg = ControllerMessage::Status {
            state_code: self.state.wire_code(),
            city_index: self.session.city_index(),
            params: self.session.params(),
        };
        self.send(msg);
    }

    fn send(&mut self, msg: ControllerMessage) {
        // Dropping on overflow is safe: every message is either
        // superseded by the next status or re-sent on the next render
        let _ = self.outbox.push(msg);
    }
}
