use std::collections::HashMap;
use std::sync::mpsc::{self, Sender, TryRecvError};
use std::time::Duration;

use async_io::{Timer, block_on};
use tracing::{debug, warn};
use zbus::{Connection, interface};
use zvariant::{ObjectPath, OwnedValue, Value};

use super::descriptor::{Artwork, SessionDescriptor, SharedDescriptor};
use crate::engine::{EngineCmd, RemoteCmd, TransportState};

const MPRIS_PATH: &str = "/org/mpris/MediaPlayer2";
const NO_TRACK: &str = "/org/mpris/MediaPlayer2/TrackList/NoTrack";
const NOTIFY_POLL: Duration = Duration::from_millis(100);

/// Wakes the bus thread so it emits `PropertiesChanged`.
#[derive(Clone)]
pub struct MprisHandle {
    notify: Sender<()>,
}

impl MprisHandle {
    pub fn notify(&self) {
        let _ = self.notify.send(());
    }
}

fn track_object_path(d: &SessionDescriptor) -> String {
    match d.track_id {
        Some(id) => format!("/org/cadenza/track/{id}"),
        None => NO_TRACK.to_string(),
    }
}

fn playback_status_str(state: TransportState) -> &'static str {
    match state {
        TransportState::Idle => "Stopped",
        TransportState::Playing => "Playing",
        TransportState::Loaded | TransportState::Paused => "Paused",
    }
}

fn owned<'a>(v: impl Into<Value<'a>>) -> Option<OwnedValue> {
    OwnedValue::try_from(v.into()).ok()
}

fn micros(d: Duration) -> i64 {
    i64::try_from(d.as_micros()).unwrap_or(i64::MAX)
}

pub(super) fn metadata_map(d: &SessionDescriptor) -> HashMap<String, OwnedValue> {
    let mut map = HashMap::new();
    let mut put = |key: &str, value: Option<OwnedValue>| {
        if let Some(v) = value {
            map.insert(key.to_string(), v);
        }
    };

    if let Ok(path) = ObjectPath::try_from(track_object_path(d)) {
        put("mpris:trackid", owned(path));
    }
    if d.track_id.is_none() {
        return map;
    }

    put("xesam:title", d.title.clone().and_then(owned));
    if let Some(artist) = &d.artist {
        put("xesam:artist", owned(vec![artist.clone()]));
    }
    put("xesam:album", d.album.clone().and_then(owned));
    put("xesam:url", d.url.clone().and_then(owned));
    if !d.duration.is_zero() {
        put("mpris:length", owned(micros(d.duration)));
    }
    if let Artwork::Resolved(path) = &d.artwork {
        put("mpris:artUrl", owned(crate::library::file_uri(path)));
    }
    map
}

struct RootIface {
    tx: Sender<EngineCmd>,
    identity: String,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {}

    fn quit(&self) {
        let _ = self.tx.send(EngineCmd::Remote(RemoteCmd::Quit));
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> String {
        self.identity.clone()
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec!["file".to_string()]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec![]
    }
}

struct PlayerIface {
    tx: Sender<EngineCmd>,
    state: SharedDescriptor,
}

impl PlayerIface {
    fn remote(&self, cmd: RemoteCmd) {
        let _ = self.tx.send(EngineCmd::Remote(cmd));
    }

    fn snapshot(&self) -> SessionDescriptor {
        self.state.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        self.remote(RemoteCmd::Next);
    }

    fn previous(&self) {
        self.remote(RemoteCmd::Previous);
    }

    fn play(&self) {
        self.remote(RemoteCmd::Play);
    }

    fn pause(&self) {
        self.remote(RemoteCmd::Pause);
    }

    fn play_pause(&self) {
        self.remote(RemoteCmd::PlayPause);
    }

    fn stop(&self) {
        self.remote(RemoteCmd::Stop);
    }

    /// Relative seek, microseconds.
    fn seek(&self, offset: i64) {
        self.remote(RemoteCmd::SeekBy(offset));
    }

    /// Ignored unless `track_id` names the current track.
    fn set_position(&self, track_id: ObjectPath<'_>, position: i64) {
        let current = track_object_path(&self.snapshot());
        if track_id.as_str() != current || position < 0 {
            return;
        }
        self.remote(RemoteCmd::SetPosition(Duration::from_micros(
            position.unsigned_abs(),
        )));
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        let Ok(s) = self.state.lock() else {
            return "Stopped";
        };
        playback_status_str(s.state)
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        metadata_map(&self.snapshot())
    }

    #[zbus(property(emits_changed_signal = "false"))]
    fn position(&self) -> i64 {
        micros(self.snapshot().position)
    }

    #[zbus(property)]
    fn rate(&self) -> f64 {
        f64::from(self.snapshot().speed)
    }

    #[zbus(property)]
    fn minimum_rate(&self) -> f64 {
        0.25
    }

    #[zbus(property)]
    fn maximum_rate(&self) -> f64 {
        4.0
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_seek(&self) -> bool {
        self.snapshot().track_id.is_some()
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        true
    }
}

/// Serve the MPRIS interfaces on a dedicated thread. The thread exits once
/// every clone of the returned handle is dropped.
pub fn spawn_mpris(identity: String, tx: Sender<EngineCmd>, state: SharedDescriptor) -> MprisHandle {
    let (notify_tx, notify_rx) = mpsc::channel::<()>();

    std::thread::spawn(move || {
        block_on(async move {
            let connection = match Connection::session().await {
                Ok(c) => c,
                Err(e) => {
                    warn!(error = %e, "MPRIS: failed to connect to session bus");
                    return;
                }
            };

            let bus_name = format!("org.mpris.MediaPlayer2.{identity}");
            if let Err(e) = connection.request_name(bus_name.as_str()).await {
                warn!(name = %bus_name, error = %e, "MPRIS: failed to acquire name");
                return;
            }

            let object_server = connection.object_server();

            let root = RootIface {
                tx: tx.clone(),
                identity,
            };
            if let Err(e) = object_server.at(MPRIS_PATH, root).await {
                warn!(error = %e, "MPRIS: failed to register root iface");
                return;
            }

            if let Err(e) = object_server
                .at(MPRIS_PATH, PlayerIface { tx, state })
                .await
            {
                warn!(error = %e, "MPRIS: failed to register player iface");
                return;
            }

            let iface = match object_server
                .interface::<_, PlayerIface>(MPRIS_PATH)
                .await
            {
                Ok(i) => i,
                Err(e) => {
                    warn!(error = %e, "MPRIS: player iface lookup failed");
                    return;
                }
            };
            debug!(name = %bus_name, "MPRIS: serving");

            loop {
                Timer::after(NOTIFY_POLL).await;

                let mut changed = false;
                loop {
                    match notify_rx.try_recv() {
                        Ok(()) => changed = true,
                        Err(TryRecvError::Empty) => break,
                        Err(TryRecvError::Disconnected) => return,
                    }
                }
                if !changed {
                    continue;
                }

                let emitter = iface.signal_emitter();
                let player = iface.get().await;
                let _ = player.playback_status_changed(emitter).await;
                let _ = player.metadata_changed(emitter).await;
                let _ = player.rate_changed(emitter).await;
                let _ = player.can_seek_changed(emitter).await;
            }
        });
    });

    MprisHandle { notify: notify_tx }
}
