//! Pose mapping and transform refresh on the two-hand fixture rig.
//!
//! Run with: cargo bench -p vizij-skeleton-core

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vizij_skeleton_core::{FingerDof, HandConfig, HandDof, HandPoseMapper, Side, Skeleton};

fn hands() -> Skeleton {
    let json = vizij_test_fixtures::skeletons::json("hands")
        .expect("hands fixture");
    Skeleton::from_json(&json).expect("decode hands fixture")
}

fn bench_pose_mapping(c: &mut Criterion) {
    let mapper = HandPoseMapper::new(HandConfig::default()).expect("default config");
    let fist: HandDof = vizij_test_fixtures::hand_poses::load("fist")
        .expect("fist fixture");
    let half = HandDof::neutral().with_long_fingers(FingerDof::new(0.05, 0.7, 0.9));

    let mut skel = hands();
    c.bench_function("apply_hand_pose both hands", |b| {
        let mut flip = false;
        b.iter(|| {
            flip = !flip;
            let dof = if flip { &fist } else { &half };
            for side in Side::ALL {
                mapper
                    .apply_hand_pose(&mut skel, side, black_box(dof))
                    .expect("pose applies");
            }
        })
    });

    let mut skel = hands();
    let tips: Vec<_> = ["l_index3", "r_index3", "l_thumb3", "r_thumb3"]
        .iter()
        .map(|sid| skel.lookup(sid).expect("tip joint"))
        .collect();
    c.bench_function("pose + lazy fingertip reads", |b| {
        b.iter(|| {
            mapper
                .apply_hand_pose(&mut skel, Side::Right, &fist)
                .expect("pose applies");
            for &tip in &tips {
                black_box(skel.world_position(tip).expect("world position"));
            }
        })
    });

    let mut skel = hands();
    c.bench_function("pose + full world refresh", |b| {
        b.iter(|| {
            mapper
                .apply_hand_pose(&mut skel, Side::Left, &fist)
                .expect("pose applies");
            skel.update_world_transforms().expect("refresh");
        })
    });
}

criterion_group!(benches, bench_pose_mapping);
criterion_main!(benches);
