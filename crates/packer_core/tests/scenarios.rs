//! End-to-end scenarios S1-S6 from the design spec: trivial packing,
//! co-prime periods, offset/start_frame pins, group cohesion, and the
//! infeasible case.

use packer_core::normalize::PackerConfig;
use packer_core::object::GroupBuilder;
use packer_core::{PackerError, PointObject, PointOrGroup};

fn pack(objects: Vec<PointOrGroup>, frame_size_bytes: u32, num_frames: u32) -> packer_core::PackedResult {
    let config = PackerConfig::new(frame_size_bytes, "scenario_out.xlsx").with_num_frames(num_frames);
    packer_core::Packer::new(objects, config)
        .pack()
        .expect("scenario expected to pack successfully")
}

#[test]
fn s1_trivial_single_point_every_frame_at_bit_zero() {
    let result = pack(vec![PointObject::new("A", 8, 1).into()], 2, 4);

    assert_eq!(result.outcome.max_end, 8);
    let row = &result.tables.schedule[0];
    assert!(row.occurrence.iter().all(|&present| present));

    for frame in 0..4 {
        assert_eq!(result.tables.memory_map[0][frame], "A");
        assert_eq!(result.tables.memory_map[7][frame], "A");
        assert_eq!(result.tables.memory_map[8][frame], "");
    }
}

#[test]
fn s2_two_coprime_periods_never_overlap() {
    let objects = vec![
        PointObject::new("A", 16, 2).into(),
        PointObject::new("B", 16, 4).into(),
    ];
    let result = pack(objects, 1, 4);

    assert_eq!(result.outcome.max_end, 32);

    for frame in 0..4usize {
        let a_present = result.tables.schedule[0].occurrence[frame];
        let b_present = result.tables.schedule[1].occurrence[frame];
        let occupied_bits = result.tables.memory_map.iter().filter(|row| !row[frame].is_empty()).count();
        // If memory_map clobbered an overlapping placement, occupied_bits
        // would undercount the sum of the present objects' sizes.
        let expected = (a_present as usize) * 16 + (b_present as usize) * 16;
        assert_eq!(occupied_bits, expected, "frame {frame}: A present={a_present}, B present={b_present}");
    }
}

#[test]
fn s3_pinned_offset_places_object_at_exact_bit_once() {
    let result = pack(
        vec![PointObject::new("A", 32, 32).with_offset_bytes(8).into()],
        1000,
        32,
    );

    let occurrence = &result.tables.schedule[0].occurrence;
    assert_eq!(occurrence.iter().filter(|&&p| p).count(), 1);
    assert!(occurrence[0]);

    for bit in 64..96 {
        assert_eq!(result.tables.memory_map[bit][0], "A");
    }
}

#[test]
fn s4_pinned_start_frame_appears_only_there() {
    let result = pack(
        vec![PointObject::new("B", 16, 32).with_start_frame(4).into()],
        1000,
        32,
    );

    let occurrence = &result.tables.schedule[0].occurrence;
    for (frame, &present) in occurrence.iter().enumerate() {
        assert_eq!(present, frame == 4);
    }
}

#[test]
fn s5_group_members_cohere_and_sit_contiguous() {
    let group = GroupBuilder::new(
        16,
        vec![
            PointObject::new("A", 16, 1),
            PointObject::new("B", 32, 1),
            PointObject::new("C", 8, 1),
        ],
    )
    .start_frame(1)
    .offset_bytes(8)
    .build();

    let result = pack(vec![group.into()], 1000, 32);

    for frame in [1usize, 17] {
        assert_eq!(result.tables.frame_order[frame], vec!["A", "B", "C"]);
    }

    for bit in 64..80 {
        assert_eq!(result.tables.memory_map[bit][1], "A");
    }
    for bit in 80..112 {
        assert_eq!(result.tables.memory_map[bit][1], "B");
    }
    for bit in 112..120 {
        assert_eq!(result.tables.memory_map[bit][1], "C");
    }
}

#[test]
fn s6_both_pinned_at_same_offset_is_infeasible() {
    let objects = vec![
        PointObject::new("A", 8, 1).with_offset_bytes(0).into(),
        PointObject::new("B", 8, 1).with_offset_bytes(0).into(),
    ];
    let config = PackerConfig::new(2, "scenario_out.xlsx").with_num_frames(4);
    let err = packer_core::Packer::new(objects, config).pack().unwrap_err();
    assert!(matches!(err, PackerError::Stage1Infeasible { .. }));
}

#[test]
fn s7_non_divisor_period_is_rejected_at_validation() {
    let config = PackerConfig::new(1000, "scenario_out.xlsx").with_num_frames(32);
    let err = packer_core::Packer::new(vec![PointObject::new("A", 8, 5).into()], config)
        .pack()
        .unwrap_err();
    assert!(matches!(
        err,
        PackerError::Validation {
            rule: packer_core::ValidationRule::PeriodDividesNumFrames,
            ..
        }
    ));
}
