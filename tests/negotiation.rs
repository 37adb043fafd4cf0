use glam::{Quat, Vec3};
use ik_negotiation::ik::{BoneSettings, Chain, NegotiationSolver, ParentSignal, RotationOutcome};
use ik_negotiation::Config;

/// `count` bones laid out along -Z, one unit apart, each reaching one unit.
fn straight_chain(count: usize, target: Vec3) -> Chain {
    Chain::builder()
        .bone(BoneSettings::new(Vec3::ZERO))
        .bones((1..count).map(|_| BoneSettings::new(Vec3::NEG_Z)))
        .target(target)
        .build()
        .unwrap()
}

#[test]
fn tip_reaches_target_at_its_extent() {
    let mut chain = straight_chain(1, Vec3::new(0.0, 0.0, -1.0));

    let result = NegotiationSolver::step(&mut chain, 1.0 / 60.0);

    assert!(result.tip_reached);
    assert!(chain.tip().target_reached());
    assert_eq!(result.frame, 1);
}

#[test]
fn restriction_climbs_one_link_per_frame() {
    for count in 2..=6 {
        // The tip faces -Z while the target sits off to its side.
        let tip_z = -((count - 1) as f32);
        let mut chain = straight_chain(count, Vec3::new(5.0, 0.0, tip_z));

        for frame in 1..count {
            NegotiationSolver::step(&mut chain, 0.0);
            let expected = frame == count - 1;
            assert_eq!(
                chain.root().restrict_parent(),
                expected,
                "chain of {count}, frame {frame}"
            );
        }

        NegotiationSolver::step(&mut chain, 0.0);
        assert!(chain.root().restrict_parent());
        assert!(chain.bones().iter().take(count - 1).all(|b| b.restrict_parent()));
    }
}

#[test]
fn bone_at_its_range_limit_never_turns_further() {
    let mut chain = Chain::builder()
        .bone(BoneSettings::new(Vec3::ZERO).max_rotation_angle(30.0))
        .target(Vec3::new(5.0, 0.0, 0.0))
        .build()
        .unwrap();
    chain
        .set_bone_rotation(0, Quat::from_rotation_y(31f32.to_radians()))
        .unwrap();
    let locked = chain.root().rotation();

    for target in [
        Vec3::new(5.0, 0.0, 0.0),
        Vec3::new(-5.0, 0.0, 0.0),
        Vec3::new(0.0, 5.0, -1.0),
        Vec3::new(0.0, 0.0, -5.0),
    ] {
        chain.set_target(Some(target));
        let result = NegotiationSolver::step(&mut chain, 1.0);
        assert_eq!(result.outcomes, vec![RotationOutcome::RangeExhausted]);
        assert_eq!(chain.root().rotation(), locked);
    }
}

#[test]
fn turning_stops_once_range_is_used_up() {
    let mut chain = Chain::builder()
        .bone(BoneSettings::new(Vec3::ZERO).max_rotation_angle(30.0))
        .target(Vec3::new(5.0, 0.0, 0.0))
        .build()
        .unwrap();

    let mut frozen = None;
    for _ in 0..200 {
        NegotiationSolver::step(&mut chain, 0.1);
        let rotation = chain.root().rotation();
        match frozen {
            Some(locked) => assert_eq!(rotation, locked),
            None if chain.root().rotation_from_rest() >= 30.0 => frozen = Some(rotation),
            None => {}
        }
    }

    assert!(frozen.is_some());
    // one frame turns at most 5% of the remaining 90 degrees
    assert!(chain.root().rotation_from_rest() <= 30.0 + 4.5 + 1e-3);
}

#[test]
fn retract_signal_turns_parent_away_from_target() {
    // The tip has no range at all and the target sits inside its reach, so it
    // asks its parent to both restrict and retract.
    let target = Vec3::new(0.0, 0.0, -1.4);
    let mut chain = Chain::builder()
        .bone(BoneSettings::new(Vec3::ZERO))
        .bone(BoneSettings::new(Vec3::NEG_Z).max_rotation_angle(0.0))
        .target(target)
        .build()
        .unwrap();

    NegotiationSolver::step(&mut chain, 1.0);
    assert_eq!(chain.root().signal(), ParentSignal::new(true, true));

    let result = NegotiationSolver::step(&mut chain, 1.0);

    assert_eq!(result.outcomes[0], RotationOutcome::Retracted);
    let toward = (target - chain.root().position()).normalize();
    assert!(chain.root().forward().dot(toward) < 0.5);
}

#[test]
fn missed_target_depends_on_which_side_of_the_extent() {
    let mut chain = Chain::builder()
        .bone(BoneSettings::new(Vec3::ZERO).extent_offset(2.0))
        .target(Vec3::new(0.0, 0.0, -1.0))
        .build()
        .unwrap();
    assert!(NegotiationSolver::missed_target(&chain, 0).unwrap());

    chain.set_target(Some(Vec3::new(0.0, 0.0, -3.0)));
    assert!(!NegotiationSolver::missed_target(&chain, 0).unwrap());

    chain.set_target(Some(Vec3::new(1.0, 0.0, -1.0)));
    assert!(!NegotiationSolver::missed_target(&chain, 0).unwrap());
}

#[test]
fn bone_with_child_never_misses() {
    let chain = straight_chain(2, Vec3::new(0.0, 0.0, -0.5));
    assert!(!NegotiationSolver::missed_target(&chain, 0).unwrap());
    assert!(NegotiationSolver::missed_target(&chain, 1).is_ok());
}

#[test]
fn parent_holds_while_child_is_on_target() {
    let mut chain = straight_chain(2, Vec3::new(0.0, 0.0, -2.0));
    NegotiationSolver::step(&mut chain, 1.0);
    assert!(chain.tip().target_reached());

    let before = chain.root().rotation();
    let result = NegotiationSolver::step(&mut chain, 1.0);

    assert_eq!(result.outcomes[0], RotationOutcome::HeldForChild);
    assert_eq!(chain.root().rotation(), before);
}

#[test]
fn misaligned_tip_that_is_neither_reached_nor_restricted_restricts_parent() {
    // The two tip guards cover this state through the alignment test, so the
    // parent's signals are rewritten rather than left stale.
    let mut chain = straight_chain(2, Vec3::new(0.0, 4.0, -1.0));
    chain.bones().iter().for_each(|b| assert!(!b.restrict_parent()));

    NegotiationSolver::step(&mut chain, 0.0);

    assert!(!chain.tip().target_reached());
    assert!(!NegotiationSolver::is_rotation_restricted(chain.tip()));
    assert_eq!(chain.root().signal(), ParentSignal::RESTRICT);
}

#[test]
fn single_bone_swings_onto_target() {
    let mut chain = straight_chain(1, Vec3::new(1.0, 0.0, 0.0));

    let reached = (0..20).any(|_| NegotiationSolver::step(&mut chain, 1.0).tip_reached);

    assert!(reached);
}

#[test]
fn bundled_arm_config_runs() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/arm.toml");
    let config = Config::from_file(path).unwrap();
    let mut chain = config.build_chain().unwrap();
    assert_eq!(chain.bone_count(), 4);
    assert_eq!(chain.tip().name(), "hand");

    for _ in 0..config.simulation.frames {
        NegotiationSolver::step(&mut chain, config.simulation.delta_time);
    }

    assert_eq!(chain.frame(), u64::from(config.simulation.frames));
    for bone in chain.bones() {
        assert!(bone.rotation().is_normalized());
        assert!(bone.position().is_finite());
    }
}
