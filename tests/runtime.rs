mod common;

mod tests {
    use embassy_futures::block_on;
    use embassy_time::{Duration, Instant};
    use myrtio_rgbct_light::frame::tags;
    use myrtio_rgbct_light::{
        DriverError, DriverIntent, EffectDeclaration, EffectState, FixtureConfig, FixtureModel,
        FixtureRuntime, IntentChannel, LightState, LinkEvent, PowerStatus, SceneId, SceneTrigger,
    };

    use super::common::{RecordingTransport, frame};

    fn id(raw: u8) -> SceneId {
        SceneId::new(raw).unwrap()
    }

    fn warm() -> LightState {
        LightState::new()
            .with_power(true)
            .with_kelvin(3200.0)
            .with_brightness(1.0)
    }

    #[test]
    fn test_runtime_drains_intents_in_order() {
        let channel = IntentChannel::<4>::new();
        let fixture = FixtureConfig::new("Desk", FixtureModel::Base).assemble().unwrap();
        let mut runtime =
            FixtureRuntime::from_fixture(channel.receiver(), RecordingTransport::connected(), fixture);

        channel.try_send(DriverIntent::State(warm())).unwrap();
        channel
            .try_send(DriverIntent::State(warm().with_brightness(0.5)))
            .unwrap();

        let processed = block_on(runtime.process_pending(Instant::from_millis(0)));
        assert_eq!(processed, 2);
        assert_eq!(
            runtime.driver().transport().writes,
            [
                frame(tags::POWER, &[0x01]),
                frame(tags::CCT, &[100, 32]),
                frame(tags::CCT, &[50]),
            ]
        );
    }

    #[test]
    fn test_effect_activation_and_manual_override() {
        let channel = IntentChannel::<4>::new();
        let fixture = FixtureConfig::new("Key", FixtureModel::Rgb62).assemble().unwrap();
        let mut runtime =
            FixtureRuntime::from_fixture(channel.receiver(), RecordingTransport::connected(), fixture);

        let scene = runtime.effect_by_name("Neewer FX • Explosion").unwrap();
        assert_eq!(scene, id(4));

        block_on(runtime.process(DriverIntent::ActivateEffect(scene), Instant::from_millis(0)))
            .unwrap();
        assert_eq!(runtime.engine().active_scene(), Some(scene));
        assert_eq!(runtime.driver().active_scene(), Some(scene));
        assert_eq!(runtime.driver().transport().tags(), [tags::POWER, tags::SCENE]);

        block_on(runtime.process(DriverIntent::State(warm()), Instant::from_millis(10))).unwrap();
        assert_eq!(runtime.engine().state(), EffectState::Idle);
        assert_eq!(runtime.driver().active_scene(), None);
        assert_eq!(runtime.driver().transport().tags().last(), Some(&tags::CCT));
    }

    #[test]
    fn test_unknown_effect() {
        let channel = IntentChannel::<2>::new();
        let fixture = FixtureConfig::new("Desk", FixtureModel::Base).assemble().unwrap();
        let mut runtime =
            FixtureRuntime::from_fixture(channel.receiver(), RecordingTransport::connected(), fixture);

        assert_eq!(
            block_on(runtime.process(DriverIntent::ActivateEffect(id(5)), Instant::from_millis(0))),
            Err(DriverError::UnknownEffect)
        );
        assert!(runtime.driver().transport().writes.is_empty());
    }

    #[test]
    fn test_repeating_effect_is_resent_on_tick() {
        let effects = [EffectDeclaration::new("Flash", 6)
            .with_trigger(SceneTrigger::Repeat(Duration::from_millis(1000)))];
        let config = FixtureConfig {
            effects: &effects,
            ..FixtureConfig::new("Desk", FixtureModel::Base)
        };
        let channel = IntentChannel::<2>::new();
        let mut runtime = FixtureRuntime::from_fixture(
            channel.receiver(),
            RecordingTransport::connected(),
            config.assemble().unwrap(),
        );

        block_on(runtime.process(DriverIntent::ActivateEffect(id(6)), Instant::from_millis(0)))
            .unwrap();
        runtime.driver_mut().transport_mut().clear();

        block_on(runtime.tick(Instant::from_millis(500))).unwrap();
        assert!(runtime.driver().transport().writes.is_empty());

        block_on(runtime.tick(Instant::from_millis(1000))).unwrap();
        assert_eq!(runtime.driver().transport().writes, [frame(tags::SCENE, &[6])]);

        block_on(runtime.process(DriverIntent::DeactivateEffect, Instant::from_millis(1100)))
            .unwrap();
        block_on(runtime.tick(Instant::from_millis(2000))).unwrap();
        assert_eq!(runtime.driver().transport().writes.len(), 1);
    }

    #[test]
    fn test_disconnect_stops_effect() {
        let channel = IntentChannel::<2>::new();
        let fixture = FixtureConfig::new("Key", FixtureModel::Rgb62).assemble().unwrap();
        let mut runtime =
            FixtureRuntime::from_fixture(channel.receiver(), RecordingTransport::connected(), fixture);

        block_on(runtime.process(DriverIntent::ActivateEffect(id(2)), Instant::from_millis(0)))
            .unwrap();
        block_on(runtime.process(
            DriverIntent::Link(LinkEvent::Disconnected),
            Instant::from_millis(5),
        ))
        .unwrap();
        assert_eq!(runtime.engine().state(), EffectState::Idle);
    }

    #[test]
    fn test_failed_intent_does_not_stop_drain() {
        let channel = IntentChannel::<4>::new();
        let fixture = FixtureConfig::new("Desk", FixtureModel::Base).assemble().unwrap();
        let mut runtime =
            FixtureRuntime::from_fixture(channel.receiver(), RecordingTransport::connected(), fixture);

        channel.try_send(DriverIntent::ActivateEffect(id(9))).unwrap();
        channel.try_send(DriverIntent::State(warm())).unwrap();

        assert_eq!(block_on(runtime.process_pending(Instant::from_millis(0))), 2);
        assert_eq!(runtime.driver().transport().tags(), [tags::POWER, tags::CCT]);
    }

    #[test]
    fn test_notification_and_status_intents() {
        let channel = IntentChannel::<4>::new();
        let fixture = FixtureConfig::new("Key", FixtureModel::Rgb62).assemble().unwrap();
        let mut runtime =
            FixtureRuntime::from_fixture(channel.receiver(), RecordingTransport::connected(), fixture);

        channel
            .try_send(DriverIntent::Link(LinkEvent::NotificationsReady))
            .unwrap();
        channel
            .try_send(DriverIntent::RefreshStatus {
                include_channel: false,
            })
            .unwrap();
        channel
            .try_send(DriverIntent::notification(&[0x78, 0x02, 0x01, 0x02]).unwrap())
            .unwrap();
        channel
            .try_send(DriverIntent::notification(&[0x78]).unwrap())
            .unwrap();

        assert_eq!(block_on(runtime.process_pending(Instant::from_millis(0))), 4);
        assert_eq!(
            runtime.driver().transport().tags(),
            [tags::POWER_STATUS_REQUEST, tags::CHANNEL_STATUS_REQUEST]
        );
        assert_eq!(runtime.driver().power_status(), Some(PowerStatus::Standby));

        assert!(DriverIntent::notification(&[0; 32]).is_none());
    }

    #[test]
    fn test_failed_scene_send_stops_effect() {
        let channel = IntentChannel::<2>::new();
        let fixture = FixtureConfig::new("Key", FixtureModel::Rgb62).assemble().unwrap();
        let mut runtime = FixtureRuntime::from_fixture(
            channel.receiver(),
            RecordingTransport::disconnected(),
            fixture,
        );

        assert_eq!(
            block_on(runtime.process(DriverIntent::ActivateEffect(id(4)), Instant::from_millis(0))),
            Err(DriverError::NotConnected)
        );
        assert_eq!(runtime.engine().state(), EffectState::Idle);

        runtime.driver_mut().transport_mut().connected = true;
        block_on(runtime.process(
            DriverIntent::Link(LinkEvent::Connected),
            Instant::from_millis(10),
        ))
        .unwrap();
        block_on(runtime.tick(Instant::from_millis(20))).unwrap();
        block_on(runtime.tick(Instant::from_millis(5000))).unwrap();
        assert!(runtime.driver().transport().writes.is_empty());

        block_on(runtime.process(
            DriverIntent::ActivateEffect(id(4)),
            Instant::from_millis(5010),
        ))
        .unwrap();
        assert_eq!(runtime.driver().transport().tags(), [tags::POWER, tags::SCENE]);
        assert_eq!(runtime.engine().active_scene(), Some(id(4)));
    }

    #[test]
    fn test_failed_repeat_stops_effect() {
        let effects = [EffectDeclaration::new("Flash", 6)
            .with_trigger(SceneTrigger::Repeat(Duration::from_millis(1000)))];
        let config = FixtureConfig {
            effects: &effects,
            ..FixtureConfig::new("Desk", FixtureModel::Base)
        };
        let channel = IntentChannel::<2>::new();
        let mut runtime = FixtureRuntime::from_fixture(
            channel.receiver(),
            RecordingTransport::connected(),
            config.assemble().unwrap(),
        );

        block_on(runtime.process(DriverIntent::ActivateEffect(id(6)), Instant::from_millis(0)))
            .unwrap();
        runtime.driver_mut().transport_mut().connected = false;

        assert_eq!(
            block_on(runtime.tick(Instant::from_millis(1000))),
            Err(DriverError::NotConnected)
        );
        assert_eq!(runtime.engine().state(), EffectState::Idle);
    }

    #[test]
    fn test_status_refreshed_when_notifications_ready() {
        let channel = IntentChannel::<2>::new();
        let fixture = FixtureConfig::new("Key", FixtureModel::Rgb62).assemble().unwrap();
        let mut runtime =
            FixtureRuntime::from_fixture(channel.receiver(), RecordingTransport::connected(), fixture);

        block_on(runtime.process(
            DriverIntent::Link(LinkEvent::NotificationsReady),
            Instant::from_millis(0),
        ))
        .unwrap();
        assert_eq!(
            runtime.driver().transport().tags(),
            [tags::POWER_STATUS_REQUEST, tags::CHANNEL_STATUS_REQUEST]
        );
    }

    #[test]
    fn test_status_refreshed_after_writes() {
        let channel = IntentChannel::<2>::new();
        let fixture = FixtureConfig::new("Key", FixtureModel::Rgb62).assemble().unwrap();
        let mut runtime =
            FixtureRuntime::from_fixture(channel.receiver(), RecordingTransport::connected(), fixture);
        runtime
            .driver_mut()
            .on_link_event(LinkEvent::NotificationsReady);

        block_on(runtime.process(DriverIntent::State(warm()), Instant::from_millis(0))).unwrap();
        assert_eq!(
            runtime.driver().transport().tags(),
            [
                tags::POWER,
                tags::CCT,
                tags::POWER_STATUS_REQUEST,
                tags::CHANNEL_STATUS_REQUEST,
            ]
        );

        runtime
            .driver_mut()
            .handle_notification(&[0x78, 0x02, 0x01, 0x01])
            .unwrap();
        runtime
            .driver_mut()
            .handle_notification(&[0x78, 0x01, 0x01, 0x00])
            .unwrap();
        runtime.driver_mut().transport_mut().clear();

        // Unchanged updates write nothing and query nothing
        block_on(runtime.process(DriverIntent::State(warm()), Instant::from_millis(10))).unwrap();
        assert!(runtime.driver().transport().writes.is_empty());

        // Standby is followed by a power query only
        block_on(runtime.process(
            DriverIntent::State(warm().with_power(false)),
            Instant::from_millis(20),
        ))
        .unwrap();
        assert_eq!(
            runtime.driver().transport().tags(),
            [tags::POWER, tags::POWER_STATUS_REQUEST]
        );
    }

    #[test]
    fn test_configured_tint_survives_host_updates() {
        let config = FixtureConfig {
            green_magenta_bias: -20.0,
            ..FixtureConfig::new("Key", FixtureModel::Rgb62)
        };
        let channel = IntentChannel::<2>::new();
        let mut runtime = FixtureRuntime::from_fixture(
            channel.receiver(),
            RecordingTransport::connected(),
            config.assemble().unwrap(),
        );

        let white = LightState::new()
            .with_power(true)
            .with_kelvin(4400.0)
            .with_brightness(0.8);
        block_on(runtime.process(DriverIntent::State(white), Instant::from_millis(0))).unwrap();
        assert_eq!(
            runtime.driver().transport().writes.last(),
            Some(&frame(tags::CCT, &[80, 44, 30]))
        );
    }

    #[test]
    fn test_next_waits_for_intent() {
        let channel = IntentChannel::<2>::new();
        let fixture = FixtureConfig::new("Desk", FixtureModel::Base).assemble().unwrap();
        let mut runtime =
            FixtureRuntime::from_fixture(channel.receiver(), RecordingTransport::connected(), fixture);

        channel.try_send(DriverIntent::State(warm())).unwrap();
        block_on(runtime.next(Instant::from_millis(0))).unwrap();
        assert_eq!(runtime.driver().transport().writes.len(), 2);
    }
}
