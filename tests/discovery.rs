mod tests {
    use myrtio_rgbct_light::discovery::{
        ADVERTISED_NAME, CHARACTERISTIC_UUID, NOTIFY_CHARACTERISTIC_UUID, SERVICE_UUID,
        is_command_characteristic, is_fixture_advertisement, is_notify_characteristic,
    };

    #[test]
    fn test_advertised_name() {
        assert!(is_fixture_advertisement(ADVERTISED_NAME));
        assert!(is_fixture_advertisement("neewer-rgb660"));
        assert!(is_fixture_advertisement("NEEWER-RGB660\0\0"));
        assert!(!is_fixture_advertisement("NEEWER-RGB480"));
        assert!(!is_fixture_advertisement(""));
    }

    #[test]
    fn test_uuids() {
        assert_eq!(
            SERVICE_UUID.to_string(),
            "69400001-b5a3-f393-e0a9-e50e24dcca99"
        );
        assert_eq!(
            CHARACTERISTIC_UUID.to_string(),
            "69400002-b5a3-f393-e0a9-e50e24dcca99"
        );
        assert!(is_command_characteristic(&CHARACTERISTIC_UUID));
        assert!(!is_command_characteristic(&NOTIFY_CHARACTERISTIC_UUID));
        assert!(is_notify_characteristic(&NOTIFY_CHARACTERISTIC_UUID));
        assert_ne!(SERVICE_UUID, CHARACTERISTIC_UUID);
    }
}
