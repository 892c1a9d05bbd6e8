use std::{
    io::{self, Read},
    net::{SocketAddr, TcpListener, TcpStream},
    thread,
    time::Duration,
};

use crossbeam::channel::{Receiver, RecvTimeoutError};
use log::{debug, error, info, trace, warn};
use rayon::{ThreadPool, ThreadPoolBuilder};
use tiny_http::{Method, Request, Response, Server};

use config::HubConfig;
use net::session::Session;
use pacing::StateId;

use crate::{broadcast::Broadcaster, error::Error};

pub(crate) const WS_PATH: &str = "/api/ws";
pub(crate) const SEND_PATH: &str = "/api/send";

/// Largest request body read from a publisher.
const MAX_BODY: u64 = 4096;
/// How long a display waits for a state before checking it is still there.
const STATE_POLL: Duration = Duration::from_millis(200);
const PEER_POLL: Duration = Duration::from_millis(20);

/// The state arbiter: takes states from publishers and pushes them to every
/// connected display.
pub(crate) struct Hub {
    subscribers: TcpListener,
    publishers: Server,
    broadcaster: Broadcaster,
    workers: usize,
    timeout: Duration,
}

impl Hub {
    pub(crate) fn bind(config: &HubConfig) -> Result<Self, Error> {
        let subscribers = TcpListener::bind((config.host.as_str(), config.port))?;
        let publishers = Server::http((config.host.as_str(), config.publish_port))
            .map_err(|err| Error::Http(err.to_string()))?;

        let hub = Self {
            subscribers,
            publishers,
            broadcaster: Broadcaster::new(config.subscriber_capacity),
            workers: config.workers,
            timeout: config.timeout(),
        };

        let (display_addr, publish_addr) = hub.local_addrs()?;
        info!("serving displays on {display_addr} and publishers on {publish_addr}");
        Ok(hub)
    }

    /// Addresses of the display and publisher listeners.
    pub(crate) fn local_addrs(&self) -> Result<(SocketAddr, SocketAddr), Error> {
        let publish_addr = self.publishers.server_addr().to_ip().ok_or_else(|| {
            io::Error::new(io::ErrorKind::Unsupported, "publisher listener has no ip")
        })?;
        Ok((self.subscribers.local_addr()?, publish_addr))
    }

    /// Serves both listeners. Only returns if setting up the workers fails.
    pub(crate) fn run(self) -> Result<(), Error> {
        let Self {
            subscribers,
            publishers,
            broadcaster,
            workers,
            timeout,
        } = self;

        let publish_pool = pool("publish", workers)?;
        let subscribe_pool = pool("subscribe", workers)?;

        let publish_broadcaster = broadcaster.clone();
        thread::Builder::new()
            .name("publish-accept".to_owned())
            .spawn(move || accept_publishers(publishers, publish_broadcaster, publish_pool))?;

        accept_subscribers(subscribers, broadcaster, subscribe_pool, timeout);
        Ok(())
    }
}

fn pool(name: &'static str, workers: usize) -> Result<ThreadPool, Error> {
    Ok(ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(move |x| format!("{name}-{x}"))
        .build()?)
}

fn accept_publishers(server: Server, broadcaster: Broadcaster, pool: ThreadPool) {
    for request in server.incoming_requests() {
        trace!("{} {} from {:?}", request.method(), request.url(), request.remote_addr());
        let broadcaster = broadcaster.clone();
        pool.spawn(move || handle_publish(request, &broadcaster));
    }
    error!("publisher listener stopped");
}

fn accept_subscribers(
    listener: TcpListener,
    broadcaster: Broadcaster,
    pool: ThreadPool,
    timeout: Duration,
) {
    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                let broadcaster = broadcaster.clone();
                pool.spawn(move || serve_subscriber(stream, &broadcaster, timeout));
            }
            Err(err) => error!("subscribers.accept: {err}"),
        }
    }
}

fn handle_publish(mut request: Request, broadcaster: &Broadcaster) {
    let mut body = String::new();
    let read = request.as_reader().take(MAX_BODY).read_to_string(&mut body);
    let (status, message) = match read {
        Ok(_) => route(request.method(), request.url(), &body, broadcaster),
        Err(err) => (400, format!("unreadable body: {err}")),
    };

    let response = Response::from_string(message).with_status_code(status);
    if let Err(err) = request.respond(response) {
        debug!("request.respond: {err}");
    }
}

/// Publishes the state in `body` if the request is a `POST` to
/// [`SEND_PATH`]. Returns the status and body of the response; on success
/// the body is the number of displays reached.
fn route(method: &Method, url: &str, body: &str, broadcaster: &Broadcaster) -> (u16, String) {
    let path = url.split('?').next().unwrap_or(url);
    if path != SEND_PATH {
        return (404, format!("nothing at {path}"));
    }
    if *method != Method::Post {
        return (405, format!("{SEND_PATH} only accepts POST"));
    }

    match StateId::new(body.trim()) {
        Ok(state) => {
            let reached = broadcaster.publish(&state);
            debug!("published {state}, reached {reached} displays");
            (200, reached.to_string())
        }
        Err(err) => {
            warn!("rejected state {body:?}: {err}");
            (400, err.to_string())
        }
    }
}

fn serve_subscriber(stream: TcpStream, broadcaster: &Broadcaster, timeout: Duration) {
    // Subscribed before the handshake so nothing published after the display
    // sees the upgrade response is missed.
    let (id, states) = broadcaster.subscribe();

    match Session::accept(stream, WS_PATH, timeout) {
        Ok(session) => {
            info!(
                "display {} subscribed as {id}, {} subscribed",
                session.peer_addr(),
                broadcaster.len()
            );
            forward_states(session, &states);
        }
        Err(err) => warn!("subscriber handshake: {err}"),
    }

    broadcaster.unsubscribe(id);
}

fn forward_states(mut session: Session, states: &Receiver<String>) {
    loop {
        match states.recv_timeout(STATE_POLL) {
            Ok(state) => {
                trace!("sending {state} to {}", session.peer_addr());
                if let Err(err) = session.send_text(&state) {
                    info!("display {} gone: {err}", session.peer_addr());
                    return;
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                if session.poll_closed(PEER_POLL) {
                    info!("display {} left", session.peer_addr());
                    return;
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    if let Err(err) = session.shutdown() {
        debug!("session.shutdown: {err}");
    }
}

#[cfg(test)]
mod tests {
    use std::{
        net::{TcpListener, TcpStream},
        thread,
        time::Duration,
    };

    use matches::assert_matches;
    use tiny_http::Method;

    use config::HubConfig;
    use net::stream::{Frame, FrameSource, WsStream};

    use crate::broadcast::Broadcaster;

    use super::{route, serve_subscriber, Hub, SEND_PATH, WS_PATH};

    fn loopback() -> HubConfig {
        HubConfig {
            host: "127.0.0.1".to_owned(),
            port: 0,
            publish_port: 0,
            workers: 2,
            ..HubConfig::default()
        }
    }

    fn send(addr: std::net::SocketAddr, body: &str) -> String {
        ureq::post(&format!("http://{addr}{SEND_PATH}"))
            .send_string(body)
            .expect("accepted")
            .into_string()
            .expect("body")
    }

    #[test]
    fn routes_only_posts_to_send() {
        let broadcaster = Broadcaster::new(8);
        let (_, states) = broadcaster.subscribe();

        assert_eq!(
            route(&Method::Post, SEND_PATH, "red\n", &broadcaster),
            (200, "1".to_owned())
        );
        assert_eq!(
            route(&Method::Post, "/api/send?from=test", "green", &broadcaster).0,
            200
        );
        assert_eq!(route(&Method::Post, SEND_PATH, "", &broadcaster).0, 400);
        assert_eq!(route(&Method::Post, SEND_PATH, "two words", &broadcaster).0, 400);
        assert_eq!(route(&Method::Get, SEND_PATH, "amber", &broadcaster).0, 405);
        assert_eq!(route(&Method::Post, "/send", "amber", &broadcaster).0, 404);

        assert_eq!(states.try_iter().collect::<Vec<_>>(), vec!["red", "green"]);
    }

    #[test]
    fn relays_published_states_to_displays() {
        let hub = Hub::bind(&loopback()).expect("bind");
        let (display_addr, publish_addr) = hub.local_addrs().expect("addrs");
        thread::spawn(move || hub.run());

        let mut display =
            WsStream::connect(&format!("ws://{display_addr}{WS_PATH}")).expect("connect");

        assert_eq!(send(publish_addr, "red"), "1");
        assert_eq!(send(publish_addr, "green"), "1");

        assert_eq!(
            display.read_frame().expect("frame"),
            Frame::Text("red".to_owned())
        );
        assert_eq!(
            display.read_frame().expect("frame"),
            Frame::Text("green".to_owned())
        );
    }

    #[test]
    fn rejects_invalid_states_over_http() {
        let hub = Hub::bind(&loopback()).expect("bind");
        let (_, publish_addr) = hub.local_addrs().expect("addrs");
        thread::spawn(move || hub.run());

        let response = ureq::post(&format!("http://{publish_addr}{SEND_PATH}")).send_string("");
        assert_matches!(response, Err(ureq::Error::Status(400, _)));
    }

    #[test]
    fn silent_connection_does_not_hold_the_only_worker() {
        let config = HubConfig {
            workers: 1,
            timeout_ms: 100,
            ..loopback()
        };
        let hub = Hub::bind(&config).expect("bind");
        let (display_addr, publish_addr) = hub.local_addrs().expect("addrs");
        thread::spawn(move || hub.run());

        let _silent = TcpStream::connect(display_addr).expect("connect");
        let mut display =
            WsStream::connect(&format!("ws://{display_addr}{WS_PATH}")).expect("connect");

        assert_eq!(send(publish_addr, "red"), "1");
        assert_eq!(
            display.read_frame().expect("frame"),
            Frame::Text("red".to_owned())
        );
    }

    #[test]
    fn departed_display_is_unsubscribed() {
        let broadcaster = Broadcaster::new(8);
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("local_addr");

        let server_broadcaster = broadcaster.clone();
        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().expect("accept");
            serve_subscriber(stream, &server_broadcaster, Duration::from_secs(5));
        });

        let display = WsStream::connect(&format!("ws://{addr}{WS_PATH}")).expect("connect");
        assert_eq!(broadcaster.len(), 1);

        drop(display);
        server.join().expect("server");
        assert_eq!(broadcaster.len(), 0);
    }

    #[test]
    fn rejects_displays_on_other_paths() {
        let hub = Hub::bind(&loopback()).expect("bind");
        let (display_addr, _) = hub.local_addrs().expect("addrs");
        thread::spawn(move || hub.run());

        assert_matches!(
            WsStream::connect(&format!("ws://{display_addr}/elsewhere")),
            Err(net::Error::WebSocket(_))
        );
    }
}
