use futures::{
    StreamExt, future,
    stream::{BoxStream, select_all},
};
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use super::PlayerInfo;
use crate::services::mpris::{
    EventSender, MediaEvent, PlayerEvent, PlayerId, proxy::MediaPlayer2PlayerProxy,
};

enum Change {
    Properties,
    Seeked(i64),
}

/// Forwards a player's bus notifications into the media event channel.
pub(crate) struct PlayerMonitor;

impl PlayerMonitor {
    /// Start monitoring a player's properties and `Seeked` signal.
    ///
    /// The returned task runs until it is aborted or the event channel closes.
    pub fn start(
        player_id: PlayerId,
        proxy: MediaPlayer2PlayerProxy<'static>,
        events: EventSender,
    ) -> JoinHandle<()> {
        tokio::spawn(Self::monitor(player_id, proxy, events))
    }

    #[instrument(skip(proxy, events), fields(player = %player_id))]
    async fn monitor(
        player_id: PlayerId,
        proxy: MediaPlayer2PlayerProxy<'static>,
        events: EventSender,
    ) {
        let mut streams: Vec<BoxStream<'static, Change>> = vec![
            Self::watch(proxy.receive_playback_status_changed().await),
            Self::watch(proxy.receive_metadata_changed().await),
            Self::watch(proxy.receive_can_play_changed().await),
            Self::watch(proxy.receive_can_control_changed().await),
            Self::watch(proxy.receive_can_go_next_changed().await),
            Self::watch(proxy.receive_can_go_previous_changed().await),
        ];

        match proxy.receive_seeked().await {
            Ok(seeked) => streams.push(
                seeked
                    .filter_map(|signal| {
                        let position = signal.args().ok().map(|args| *args.position());
                        future::ready(position.map(Change::Seeked))
                    })
                    .boxed(),
            ),
            Err(e) => warn!("Failed to subscribe to Seeked: {e}"),
        }

        let mut changes = select_all(streams);

        let send = |event: PlayerEvent| {
            events
                .send(MediaEvent::Player {
                    id: player_id.clone(),
                    event,
                })
                .is_ok()
        };

        if !send(PlayerEvent::Refreshed(PlayerInfo::from_cache(&proxy))) {
            return;
        }

        while let Some(change) = changes.next().await {
            let event = match change {
                Change::Properties => PlayerEvent::Refreshed(PlayerInfo::from_cache(&proxy)),
                Change::Seeked(position) => PlayerEvent::Seeked(position),
            };

            if !send(event) {
                break;
            }
        }

        debug!("Property monitoring ended");
    }

    fn watch<S>(stream: S) -> BoxStream<'static, Change>
    where
        S: futures::Stream + Send + 'static,
    {
        stream.map(|_| Change::Properties).boxed()
    }
}
