use crate::error::Error;

pub(crate) mod connecting;
pub(crate) mod draining;
pub(crate) mod init;
pub(crate) mod listening;

pub trait State {
    fn next(self: Box<Self>) -> Result<Box<dyn State>, Error>;

    fn name(&self) -> &'static str;

    fn is_finished(&self) -> bool {
        false
    }
}

/// Terminal state, reached only when configured to exit once drained.
pub struct Finished;

impl State for Finished {
    fn next(self: Box<Self>) -> Result<Box<dyn State>, Error> {
        Ok(self)
    }

    fn name(&self) -> &'static str {
        "finished"
    }

    fn is_finished(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use crossbeam::channel::{unbounded, Sender};
    use matches::assert_matches;

    use net::stream::{
        test::{scripted, Script, ScriptedStream},
        FrameSource,
    };
    use pacing::test::{state, Call, RecordingSurface};

    use crate::{error::Error, session::Session, transport::Connector};

    use super::{init::Init, State};

    struct ScriptedConnector(Option<ScriptedStream>);

    impl Connector for ScriptedConnector {
        fn connect(&mut self) -> Result<Box<dyn FrameSource + Send>, net::Error> {
            match self.0.take() {
                Some(stream) => Ok(Box::new(stream)),
                None => Err(net::Error::RetriesExhausted("ws://scripted".to_owned())),
            }
        }
    }

    struct Harness {
        surface: RecordingSurface,
        script: Script,
        ticks: Sender<Instant>,
        state: Option<Box<dyn State>>,
    }

    impl Harness {
        fn new(surface: RecordingSurface, exit_when_drained: bool) -> Self {
            let (script, stream) = scripted();
            let (ticks, ticks_rx) = unbounded();
            let session = Session::with_ticks(Box::new(surface.clone()), ticks_rx);
            let connector = Box::new(ScriptedConnector(Some(stream)));

            Self {
                surface,
                script,
                ticks,
                state: Some(Init::init(session, connector, exit_when_drained)),
            }
        }

        /// Starts up and consumes the `Connected` event.
        fn listening(surface: RecordingSurface, exit_when_drained: bool) -> Self {
            let mut harness = Self::new(surface, exit_when_drained);
            assert_eq!(harness.step(), "connecting");
            assert_eq!(harness.step(), "listening");
            assert_eq!(harness.step(), "listening");
            harness
        }

        fn step(&mut self) -> &'static str {
            let state = self.state.take().expect("state");
            let next = state.next().expect("next");
            let name = next.name();
            self.state = Some(next);
            name
        }

        fn tick(&mut self) -> &'static str {
            self.ticks.send(Instant::now()).expect("tick");
            self.step()
        }

        fn receive(&mut self, text: &str) -> &'static str {
            self.script.text(text);
            self.step()
        }
    }

    #[test]
    fn shows_init_panel_before_connecting() {
        let surface = RecordingSurface::new();
        let mut harness = Harness::new(surface.clone(), false);

        assert_eq!(harness.step(), "connecting");
        assert_eq!(surface.calls(), vec![Call::HideAll, Call::ShowInit]);
    }

    #[test]
    fn paces_states_then_exits_once_drained() {
        let surface = RecordingSurface::new();
        let mut harness = Harness::listening(surface.clone(), true);

        assert_eq!(harness.receive("red"), "listening");
        assert_eq!(surface.shown(), vec![state("red")]);

        assert_eq!(harness.receive("green"), "listening");
        assert_eq!(surface.shown(), vec![state("red")]);

        assert_eq!(harness.tick(), "listening");
        assert_eq!(surface.shown(), vec![state("red")]);
        assert_eq!(harness.tick(), "listening");
        assert_eq!(surface.shown(), vec![state("red"), state("green")]);

        harness.script.close();
        assert_eq!(harness.step(), "draining");

        // green still owns one dwell period.
        assert_eq!(harness.tick(), "draining");
        assert_eq!(harness.step(), "finished");
        assert!(harness.state.as_ref().expect("state").is_finished());
    }

    #[test]
    fn drains_queue_after_disconnect() {
        let surface = RecordingSurface::new();
        let mut harness = Harness::listening(surface.clone(), false);

        harness.receive("a");
        harness.receive("b");
        harness.receive("c");
        harness.script.close();
        assert_eq!(harness.step(), "draining");

        for _ in 0..5 {
            assert_eq!(harness.tick(), "draining");
        }

        assert_eq!(surface.shown(), vec![state("a"), state("b"), state("c")]);
        assert!(!harness.state.as_ref().expect("state").is_finished());
    }

    #[test]
    fn unregistered_panel_does_not_stop_the_loop() {
        let surface = RecordingSurface::with_panels(["red"]);
        let mut harness = Harness::listening(surface.clone(), false);

        assert_eq!(harness.receive("blue"), "listening");
        assert!(surface.shown().is_empty());

        assert_eq!(harness.receive("red"), "listening");
        assert_eq!(surface.shown(), vec![state("red")]);
    }

    #[test]
    fn connect_failure_is_fatal() {
        let (_ticks, ticks_rx) = unbounded();
        let session = Session::with_ticks(Box::new(RecordingSurface::new()), ticks_rx);
        let state = Init::init(session, Box::new(ScriptedConnector(None)), false);

        let connecting = state.next().expect("init");
        assert_matches!(connecting.next().err(), Some(Error::Connect(_)));
    }
}
