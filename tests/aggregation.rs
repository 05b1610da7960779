//! End-to-end tests of the media service against an in-memory bus.

#![cfg_attr(test, allow(clippy::unwrap_used))]

mod common;

use std::time::Duration;

use common::{FakeBus, id, info, settle, start};
use mediabar::{
    config::MediaConfig,
    services::mpris::{MediaEvent, PlaybackState, PlayerCommand, PlayerEvent},
};
use tokio::time::sleep;

mod selection {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn first_available_player_is_selected_on_start() {
        let bus = FakeBus::with_players(&[
            ("vlc", info(PlaybackState::Paused, "Muse", "Starlight")),
            ("mpv", info(PlaybackState::Paused, "Air", "Alone in Kyoto")),
        ]);

        let service = start(&bus, &MediaConfig::default()).await;

        assert_eq!(service.current_player(), Some(id("vlc")));
        let display = service.display();
        assert_eq!(display.title, "Muse - Starlight");
        assert_eq!(display.index_label, "[1/2]");
        service.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn playing_player_takes_over() {
        let bus = FakeBus::with_players(&[
            ("vlc", info(PlaybackState::Playing, "Muse", "Starlight")),
            ("mpv", info(PlaybackState::Paused, "Air", "Alone in Kyoto")),
        ]);
        let service = start(&bus, &MediaConfig::default()).await;
        assert_eq!(service.current_player(), Some(id("vlc")));

        bus.update("mpv", info(PlaybackState::Playing, "Air", "Alone in Kyoto"));
        settle().await;

        assert_eq!(service.current_player(), Some(id("mpv")));
        assert_eq!(service.display().title, "Air - Alone in Kyoto");
        service.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn switching_players_restarts_the_marquee() {
        let long = "An Extraordinarily Long Song Title That Needs Scrolling";
        let bus = FakeBus::with_players(&[
            ("vlc", info(PlaybackState::Playing, "Band", long)),
            ("mpv", info(PlaybackState::Paused, "Other Band", long)),
        ]);
        let service = start(&bus, &MediaConfig::default()).await;

        sleep(Duration::from_secs(7)).await;
        let scrolled = service.display();
        assert!(!scrolled.visible_title.starts_with("Band - "));

        bus.update("mpv", info(PlaybackState::Playing, "Other Band", long));
        settle().await;

        let display = service.display();
        assert_eq!(display.player, Some(id("mpv")));
        assert!(display.visible_title.starts_with("Other Band - "));
        service.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn select_next_cycles_available_players() {
        let bus = FakeBus::with_players(&[
            ("a", info(PlaybackState::Paused, "A", "one")),
            ("b", info(PlaybackState::Paused, "B", "two")),
            ("c", info(PlaybackState::Paused, "C", "three")),
        ]);
        let service = start(&bus, &MediaConfig::default()).await;

        let mut seen = vec![service.current_player().unwrap()];
        for _ in 0..3 {
            service.select_next().unwrap();
            settle().await;
            seen.push(service.current_player().unwrap());
        }

        assert_eq!(seen, vec![id("a"), id("b"), id("c"), id("a")]);
        service.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn ignored_players_are_never_selected() {
        let bus = FakeBus::with_players(&[
            ("spotify", info(PlaybackState::Playing, "Muse", "Uprising")),
            ("vlc", info(PlaybackState::Paused, "Muse", "Starlight")),
        ]);
        let config = MediaConfig {
            ignored_players: "'Spotify'".to_string(),
            ..MediaConfig::default()
        };

        let service = start(&bus, &config).await;

        assert_eq!(service.current_player(), Some(id("vlc")));
        assert_eq!(service.display().index_label, "[1/1]");
        service.shutdown().await;
    }
}

mod lifecycle {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn players_appear_and_vanish() {
        let bus = FakeBus::with_players(&[]);
        let service = start(&bus, &MediaConfig::default()).await;
        assert_eq!(service.current_player(), None);

        bus.appear("vlc", info(PlaybackState::Playing, "Muse", "Starlight"));
        settle().await;
        assert_eq!(service.current_player(), Some(id("vlc")));
        assert_eq!(service.players().len(), 1);

        bus.vanish("vlc");
        settle().await;
        assert_eq!(service.current_player(), None);
        assert!(service.players().is_empty());
        assert_eq!(service.display().player, None);
        service.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn vanished_current_player_hands_over() {
        let bus = FakeBus::with_players(&[
            ("vlc", info(PlaybackState::Playing, "Muse", "Starlight")),
            ("mpv", info(PlaybackState::Paused, "Air", "Alone in Kyoto")),
        ]);
        let service = start(&bus, &MediaConfig::default()).await;

        bus.vanish("vlc");
        settle().await;

        assert_eq!(service.current_player(), Some(id("mpv")));
        service.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stopped_player_is_dropped_after_grace() {
        let bus = FakeBus::with_players(&[(
            "vlc",
            info(PlaybackState::Playing, "Muse", "Starlight"),
        )]);
        let service = start(&bus, &MediaConfig::default()).await;

        bus.update("vlc", info(PlaybackState::Stopped, "Muse", "Starlight"));
        settle().await;
        assert_eq!(service.current_player(), Some(id("vlc")));

        sleep(Duration::from_millis(2100)).await;
        assert_eq!(service.current_player(), None);
        service.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn brief_stop_keeps_the_player() {
        let bus = FakeBus::with_players(&[(
            "vlc",
            info(PlaybackState::Playing, "Muse", "Starlight"),
        )]);
        let service = start(&bus, &MediaConfig::default()).await;

        bus.update("vlc", info(PlaybackState::Stopped, "Muse", "Starlight"));
        sleep(Duration::from_secs(1)).await;
        bus.update("vlc", info(PlaybackState::Playing, "Muse", "Starlight"));
        sleep(Duration::from_secs(3)).await;

        assert_eq!(service.current_player(), Some(id("vlc")));
        assert_eq!(service.display().state, PlaybackState::Playing);
        service.shutdown().await;
    }
}

mod position {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn seek_updates_the_display() {
        let bus = FakeBus::with_players(&[(
            "vlc",
            info(PlaybackState::Paused, "Muse", "Starlight"),
        )]);
        let service = start(&bus, &MediaConfig::default()).await;
        settle().await;

        bus.post(MediaEvent::Player {
            id: id("vlc"),
            event: PlayerEvent::Seeked(90_000_000),
        });
        settle().await;

        let display = service.display();
        assert_eq!(display.position, 90_000_000);
        assert_eq!(display.position_ratio, Some(0.5));
        service.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn seek_on_other_player_leaves_display_alone() {
        let bus = FakeBus::with_players(&[
            ("vlc", info(PlaybackState::Paused, "Muse", "Starlight")),
            ("mpv", info(PlaybackState::Paused, "Air", "Alone in Kyoto")),
        ]);
        let service = start(&bus, &MediaConfig::default()).await;
        settle().await;

        bus.post(MediaEvent::Player {
            id: id("mpv"),
            event: PlayerEvent::Seeked(60_000_000),
        });
        settle().await;

        assert_eq!(service.current_player(), Some(id("vlc")));
        assert_eq!(service.display().position, 0);
        service.shutdown().await;
    }
}

mod commands {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn commands_reach_the_current_player() {
        let bus = FakeBus::with_players(&[
            ("vlc", info(PlaybackState::Playing, "Muse", "Starlight")),
            ("mpv", info(PlaybackState::Paused, "Air", "Alone in Kyoto")),
        ]);
        let service = start(&bus, &MediaConfig::default()).await;

        service.play_pause().unwrap();
        service.next().unwrap();
        settle().await;

        assert_eq!(
            bus.commands("vlc"),
            vec![PlayerCommand::PlayPause, PlayerCommand::Next]
        );
        assert!(bus.commands("mpv").is_empty());
        service.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn commands_without_player_are_dropped() {
        let bus = FakeBus::with_players(&[]);
        let service = start(&bus, &MediaConfig::default()).await;

        service.previous().unwrap();
        settle().await;

        assert_eq!(service.current_player(), None);
        service.shutdown().await;
    }
}
