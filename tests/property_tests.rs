//! Property-based tests for classification and icon selection.

use crypttui::device::{
    DeviceState, EncryptedDevice, LsblkNode, LsblkReport, MappedVolume, Transport,
    classify_report,
};
use crypttui::ui::IconSet;
use proptest::prelude::*;

fn arb_transport_column() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some(String::new())),
        Just(Some("usb".to_string())),
        Just(Some("nvme".to_string())),
        Just(Some("sata".to_string())),
        Just(Some("mmc".to_string())),
        "[a-zA-Z0-9_]{0,12}".prop_map(Some),
    ]
}

fn arb_node() -> impl Strategy<Value = LsblkNode> {
    (
        prop::option::of("[a-z0-9/]{1,24}"),
        prop::option::of(prop_oneof![
            Just("crypto_LUKS".to_string()),
            Just("ext4".to_string()),
            Just("vfat".to_string()),
            Just(String::new()),
        ]),
        prop::option::of("[A-Za-z0-9 ]{0,16}"),
        arb_transport_column(),
        prop::option::of("[a-z/]{0,24}"),
    )
        .prop_map(|(path, fstype, partlabel, tran, mountpoint)| LsblkNode {
            path,
            fstype,
            partlabel,
            tran,
            mountpoint,
            ..LsblkNode::default()
        })
}

fn arb_report() -> impl Strategy<Value = LsblkReport> {
    prop::collection::vec(
        (arb_node(), prop::collection::vec(arb_node(), 0..4)).prop_map(|(mut drive, kids)| {
            drive.children = Some(kids);
            drive
        }),
        0..5,
    )
    .prop_map(|blockdevices| LsblkReport { blockdevices })
}

proptest! {
    /// Every classified device came from a node carrying the LUKS marker
    /// and a path; nothing else ever leaks into the list.
    #[test]
    fn classified_devices_are_all_luks(report in arb_report()) {
        let devices = classify_report(&report);

        let luks_paths: Vec<&str> = report
            .blockdevices
            .iter()
            .flat_map(|drive| {
                std::iter::once(drive).chain(drive.children.iter().flatten())
            })
            .filter(|node| node.fstype.as_deref() == Some("crypto_LUKS"))
            .filter_map(|node| node.path.as_deref())
            .collect();

        for device in &devices {
            prop_assert!(luks_paths.contains(&device.drive_path.as_str()));
        }
    }

    /// A device is in exactly one of the three states.
    #[test]
    fn device_state_is_exclusive(
        mapped in prop::option::of(("[a-z0-9/]{1,20}", prop::option::of("[a-z/]{1,20}")))
    ) {
        let device = EncryptedDevice {
            drive_path: "/dev/sdx1".to_string(),
            partlabel: None,
            transport: Transport::Usb,
            mapped: mapped.map(|(path, mount_point)| MappedVolume { path, mount_point }),
        };

        match device.state() {
            DeviceState::Locked => prop_assert!(device.mapped.is_none()),
            DeviceState::Unlocked => {
                let mapped = device.mapped.as_ref().unwrap();
                prop_assert!(mapped.mount_point.is_none());
            }
            DeviceState::Mounted(at) => {
                let mapped = device.mapped.as_ref().unwrap();
                prop_assert_eq!(mapped.mount_point.as_deref(), Some(at));
            }
        }
    }

    /// Icon selection is total over arbitrary TRAN strings: whatever lsblk
    /// reports, the list always gets a glyph.
    #[test]
    fn every_transport_string_gets_an_icon(tran in prop::option::of(".{0,16}")) {
        let transport = Transport::from_optional(tran.as_deref());
        let icon = IconSet::default().icon_for(&transport);
        prop_assert!(!icon.is_empty());
    }

    /// Known transports parse case-insensitively; everything else lands in
    /// the catch-all variant.
    #[test]
    fn known_transports_parse_case_insensitively(upper in prop::bool::ANY) {
        for (name, expected) in [
            ("usb", Transport::Usb),
            ("nvme", Transport::Nvme),
            ("sata", Transport::Sata),
            ("mmc", Transport::Mmc),
        ] {
            let s = if upper { name.to_uppercase() } else { name.to_string() };
            prop_assert_eq!(Transport::from_optional(Some(&s)), expected);
        }
    }
}
