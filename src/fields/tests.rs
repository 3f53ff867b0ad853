use super::*;
use crate::utf8_safe::display_width;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

#[test]
fn layout_rows_follow_key_order() {
    for (row, key) in layout::LAYOUT.iter().zip(FieldKey::ALL) {
        assert_eq!(row.key, key);
    }
    let registry = FieldRegistry::new();
    let keys: Vec<FieldKey> = registry.snapshot().iter().map(|f| f.key).collect();
    assert_eq!(keys, FieldKey::ALL.to_vec());
}

#[test]
fn fields_fit_the_minimum_terminal() {
    for field in FieldRegistry::new().snapshot() {
        assert!(usize::from(field.x) + field.width <= 80, "{:?}", field.key);
        assert!(field.y < 24 && field.label.y < 24, "{:?}", field.key);
        assert!(field.label.x + display_width(field.label.text) as u16 <= field.x);
    }
}

#[test]
fn placeholders_before_first_update() {
    let registry = FieldRegistry::new();
    assert_eq!(registry.get(FieldKey::Height).value, "?m");
    assert_eq!(registry.get(FieldKey::Battery).value, "?%");
    assert_eq!(registry.get(FieldKey::DerivedSpeed).value, "?m/s");
    assert_eq!(registry.get(FieldKey::Yaw).value, "?°");
    assert_eq!(registry.get(FieldKey::Ssid).value, "?");
}

#[test]
fn set_value_replaces_one_field() {
    let registry = FieldRegistry::new();
    registry.set_value(FieldKey::Battery, "87%");
    assert_eq!(registry.get(FieldKey::Battery).value, "87%");
    assert_eq!(registry.get(FieldKey::WifiStrength).value, "?%");
}

#[test]
fn padded_value_is_exactly_field_width() {
    let registry = FieldRegistry::new();
    registry.set_value(FieldKey::Height, "1.5m");
    registry.set_value(FieldKey::Firmware, "01.04.92.01-extra");
    for field in registry.snapshot() {
        assert_eq!(display_width(&field.padded_value()), field.width, "{:?}", field.key);
    }
    assert_eq!(registry.get(FieldKey::Height).padded_value(), "1.5m ");
    assert_eq!(registry.get(FieldKey::Firmware).padded_value(), "01.04.92.0");
}

#[test]
fn static_labels_carry_attributes() {
    let [title, mvo, imu] = static_labels();
    assert_eq!(title.text, "TelloTerm");
    assert!(title.style.reverse);
    assert!(mvo.style.bold && imu.style.bold);
    assert_eq!((mvo.y, imu.y), (14, 17));
}

#[test]
fn reader_never_sees_a_mixed_batch() {
    let registry = Arc::new(FieldRegistry::new());
    let stop = Arc::new(AtomicBool::new(false));

    let writer = {
        let registry = registry.clone();
        let stop = stop.clone();
        thread::spawn(move || {
            let mut generation = 0u32;
            while !stop.load(Ordering::Relaxed) {
                generation += 1;
                let tag = generation.to_string();
                registry.update(FieldKey::ALL.iter().map(|key| (*key, tag.clone())));
            }
        })
    };

    for _ in 0..2_000 {
        let snapshot = registry.snapshot();
        let first = &snapshot[0].value;
        if first.starts_with('?') {
            continue;
        }
        assert!(
            snapshot.iter().all(|field| &field.value == first),
            "mixed batch observed"
        );
    }
    stop.store(true, Ordering::Relaxed);
    writer.join().expect("writer thread");
}
